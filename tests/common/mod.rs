//! Test infrastructure for movecast-rs integration tests.
//!
//! Provides a manual playback rig, commentary stream builders and event
//! collection helpers for testing the narration pipeline without a real
//! audio backend or commentary service.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tokio::sync::broadcast::error::TryRecvError;

// Re-export key types from the main crate
pub use movecast_rs::arbiter::{CommentaryAction, SessionArbiter};
pub use movecast_rs::commentary::{CommentaryRequest, Player, Trigger};
pub use movecast_rs::constants::SOURCE_SAMPLE_RATE;
pub use movecast_rs::decoder::AudioFragment;
pub use movecast_rs::engine::manual::ManualEngine;
pub use movecast_rs::event::{Event, EventBus, Subscriber};
pub use movecast_rs::scheduler::FragmentScheduler;
pub use movecast_rs::session::{SessionState, StreamSession};
pub use movecast_rs::transcript::{NarrationStatus, TranscriptAction};

/// A scheduler wired to a manually driven engine.
pub struct PlaybackRig {
    pub engine: Arc<ManualEngine>,
    pub scheduler: Arc<FragmentScheduler>,
}

impl PlaybackRig {
    pub fn new() -> Self {
        let engine = ManualEngine::new();
        let scheduler = FragmentScheduler::new(engine.clone());
        Self { engine, scheduler }
    }
}

impl Default for PlaybackRig {
    fn default() -> Self {
        Self::new()
    }
}

/// A silent fragment lasting `seconds` at the source sample rate.
pub fn fragment_secs(seconds: f64) -> AudioFragment {
    let count = (seconds * SOURCE_SAMPLE_RATE as f64).round() as usize;
    AudioFragment::new(vec![0.0; count], SOURCE_SAMPLE_RATE)
}

/// Base64 PCM16 payload of `sample_count` silent samples.
pub fn audio_payload(sample_count: usize) -> String {
    BASE64.encode(vec![0u8; sample_count * 2])
}

/// Builds a server-sent-events body from raw JSON payload strings.
pub fn sse_body(payloads: &[String]) -> String {
    payloads
        .iter()
        .map(|payload| format!("data: {payload}\n\n"))
        .collect()
}

/// Creates a mock CommentaryRequest for testing.
pub fn mock_request(san_move: &str, eval_change: Option<i32>) -> CommentaryRequest {
    CommentaryRequest {
        san_move: san_move.to_string(),
        player: Player::White,
        evaluation: Some(50),
        eval_change,
        fen: None,
        move_number: Some(1),
    }
}

/// Collects all events from a subscriber within a timeout period.
/// Returns events in the order they were received.
pub async fn collect_events(subscriber: &mut Subscriber, timeout: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        match subscriber.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) => {
                if tokio::time::Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            Err(TryRecvError::Lagged(n)) => {
                eprintln!("Warning: subscriber lagged, missed {n} events");
            }
            Err(TryRecvError::Closed) => break,
        }
    }

    events
}

/// Extracts narration statuses from a collected event list.
pub fn statuses(events: &[Event]) -> Vec<NarrationStatus> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Transcript(TranscriptAction::Status { status }) => Some(status.clone()),
            _ => None,
        })
        .collect()
}

/// Extracts transcript chunks from a collected event list.
pub fn transcript_chunks(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Transcript(TranscriptAction::Chunk { text }) => Some(text.clone()),
            _ => None,
        })
        .collect()
}
