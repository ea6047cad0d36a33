//! Stream session controller.
//!
//! One [StreamSession] owns one open commentary request from connect to
//! terminal state: it consumes the event stream, hands audio payloads to
//! the scheduler, appends text payloads to the transcript, and resolves
//! exactly once as Completed, Failed or Superseded.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use itertools::Itertools;
use reqwest::Url;
use tokio_util::sync::CancellationToken;

use crate::decoder::decode_fragment;
use crate::event::{Event, EventBus};
use crate::scheduler::FragmentScheduler;
use crate::sse::{CommentaryEvent, EventFramer};
use crate::transcript::{NarrationStatus, TranscriptAction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Transport connection not yet established
    Opening,

    /// Consuming events
    Active,

    /// Service sent its completion marker; scheduled audio plays out
    Completed,

    /// Transport or service failure; scheduled audio plays out
    Failed,

    /// Forcibly terminated by the arbiter; audio hard-stopped
    Superseded,
}

/// What a finished session leaves behind.
#[derive(Debug)]
pub struct SessionOutcome {
    pub state: SessionState,
    pub transcript: Vec<String>,
}

/// Byte-chunk source feeding a session. The production transport wraps a
/// reqwest response; tests script chunks directly.
#[async_trait]
pub trait EventTransport: Send {
    /// Next transport chunk, `None` once the peer closed the stream.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

pub struct HttpTransport {
    response: reqwest::Response,
}

impl HttpTransport {
    pub fn new(response: reqwest::Response) -> Self {
        Self { response }
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        let chunk = self.response.chunk().await?;
        Ok(chunk)
    }
}

/// Markers that end a session's normal event flow.
enum TerminalMarker {
    Done,
    ServiceError(String),
}

pub struct StreamSession {
    scheduler: Arc<FragmentScheduler>,
    bus: EventBus,
    cancel: CancellationToken,
    state: SessionState,
    transcript: Vec<String>,
}

impl StreamSession {
    pub fn new(
        scheduler: Arc<FragmentScheduler>,
        bus: EventBus,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            scheduler,
            bus,
            cancel,
            state: SessionState::Opening,
            transcript: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Open the stream and consume it to a terminal state. The transport
    /// is closed on every exit path by dropping it.
    pub async fn run(self, client: &reqwest::Client, url: Url) -> SessionOutcome {
        debug!("Opening commentary stream at {url}");

        let connect = async {
            let response = client.get(url).send().await?.error_for_status()?;
            Ok::<_, reqwest::Error>(response)
        };

        let cancel = self.cancel.clone();
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return self.superseded();
            }
            result = connect => match result {
                Ok(response) => response,
                Err(e) => return self.failed(format!("Failed to open commentary stream: {e}")),
            },
        };

        self.drive(HttpTransport::new(response)).await
    }

    /// Consume an established transport. Public seam so tests can feed
    /// scripted chunks without a server.
    pub async fn drive(mut self, mut transport: impl EventTransport) -> SessionOutcome {
        self.state = SessionState::Active;
        let mut framer = EventFramer::new();
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return self.superseded();
                }
                chunk = transport.next_chunk() => {
                    let events = match chunk {
                        Ok(Some(bytes)) => match framer.push(&bytes) {
                            Ok(events) => events,
                            Err(e) => {
                                return self.failed(format!("Malformed event stream: {e:#}"));
                            }
                        },
                        Ok(None) => {
                            return self.failed(
                                "Commentary stream closed before its terminal marker".to_string(),
                            );
                        }
                        Err(e) => {
                            return self.failed(format!("Commentary transport failed: {e:#}"));
                        }
                    };

                    let mut events = events.into_iter();
                    while let Some(event) = events.next() {
                        if let Some(marker) = self.handle_event(event) {
                            let discarded = events.count();
                            if discarded > 0 {
                                debug!(
                                    "Discarding {discarded} buffered events after terminal marker"
                                );
                            }
                            return match marker {
                                TerminalMarker::Done => self.completed(),
                                TerminalMarker::ServiceError(message) => self.failed(message),
                            };
                        }
                    }
                }
            }
        }
    }

    /// Route one event. Audio and text payloads may share an event and
    /// both are processed; a decode failure drops the fragment but never
    /// the session.
    fn handle_event(&mut self, event: CommentaryEvent) -> Option<TerminalMarker> {
        let CommentaryEvent {
            audio,
            text,
            done,
            error,
        } = event;

        if let Some(encoded) = audio {
            match decode_fragment(&encoded) {
                Ok(fragment) => {
                    self.scheduler.submit(fragment);
                }
                Err(e) => {
                    warn!("Dropping undecodable audio fragment: {e:#}");
                }
            }
        }

        if let Some(text) = text {
            self.transcript.push(text.clone());
            self.bus
                .send(Event::Transcript(TranscriptAction::Chunk { text }));
        }

        if let Some(message) = error {
            return Some(TerminalMarker::ServiceError(message));
        }

        if done.is_some() {
            return Some(TerminalMarker::Done);
        }

        None
    }

    fn completed(mut self) -> SessionOutcome {
        self.state = SessionState::Completed;
        info!(
            "Commentary session completed: {}",
            self.transcript.iter().join("")
        );

        self.bus.send(Event::Transcript(TranscriptAction::Status {
            status: NarrationStatus::Ready,
        }));

        self.outcome()
    }

    fn failed(mut self, message: String) -> SessionOutcome {
        self.state = SessionState::Failed;
        warn!("Commentary session failed: {message}");

        // Already-scheduled audio keeps playing; the game is never
        // interrupted by a narration failure.
        self.bus.send(Event::Transcript(TranscriptAction::Status {
            status: NarrationStatus::Error(message),
        }));

        self.outcome()
    }

    fn superseded(mut self) -> SessionOutcome {
        self.state = SessionState::Superseded;
        debug!("Commentary session superseded, halting scheduled audio");

        // A superseded session must fall silent immediately, unlike the
        // success and failure paths.
        self.scheduler.stop_all();

        self.outcome()
    }

    fn outcome(self) -> SessionOutcome {
        SessionOutcome {
            state: self.state,
            transcript: self.transcript,
        }
    }
}
