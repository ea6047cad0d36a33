//! Session arbiter.
//!
//! At most one commentary session is live at a time. Starting a new one
//! (introduction or per-move commentary) supersedes the current session
//! completely — transport closed, audio hard-stopped, clock reset —
//! before the new session can reserve its first fragment.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::commentary::{commentary_url, introduction_url, CommentaryRequest};
use crate::config::Config;
use crate::event::{Event, EventBus};
use crate::scheduler::FragmentScheduler;
use crate::session::{SessionOutcome, StreamSession};

#[derive(Clone, Debug)]
pub enum CommentaryAction {
    /// Narrate the game introduction for the two agents
    StartIntroduction { white: String, black: String },

    /// Narrate one completed move
    Narrate { request: CommentaryRequest },

    /// Silence narration immediately and leave no session active
    Stop,
}

struct CurrentSession {
    cancel: CancellationToken,
    task: JoinHandle<SessionOutcome>,
}

pub struct SessionArbiter {
    scheduler: Arc<FragmentScheduler>,
    bus: EventBus,
    client: reqwest::Client,
    commentary_url: String,
    current: Option<CurrentSession>,
}

impl SessionArbiter {
    pub fn new(scheduler: Arc<FragmentScheduler>, bus: EventBus, commentary_url: String) -> Self {
        Self {
            scheduler,
            bus,
            client: reqwest::Client::new(),
            commentary_url,
            current: None,
        }
    }

    pub async fn handle_action(&mut self, action: CommentaryAction) {
        match action {
            CommentaryAction::StartIntroduction { white, black } => {
                self.start_introduction(&white, &black).await;
            }
            CommentaryAction::Narrate { request } => {
                self.start_commentary(request).await;
            }
            CommentaryAction::Stop => {
                self.stop().await;
            }
        }
    }

    pub async fn start_introduction(&mut self, white: &str, black: &str) {
        info!("Requesting introduction for {white} vs {black}");

        match introduction_url(&self.commentary_url, white, black) {
            Ok(url) => self.start_session(url).await,
            Err(e) => error!("Cannot build introduction request: {e:#}"),
        }
    }

    pub async fn start_commentary(&mut self, request: CommentaryRequest) {
        info!(
            "Requesting commentary for move {} by {}",
            request.san_move, request.player
        );

        match commentary_url(&self.commentary_url, &request) {
            Ok(url) => self.start_session(url).await,
            Err(e) => error!("Cannot build commentary request: {e:#}"),
        }
    }

    /// Silence narration and leave no session active.
    pub async fn stop(&mut self) {
        self.supersede_current().await;
    }

    /// True while a session task has been started and not yet superseded.
    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    async fn start_session(&mut self, url: reqwest::Url) {
        self.supersede_current().await;

        let cancel = CancellationToken::new();
        let session = StreamSession::new(self.scheduler.clone(), self.bus.clone(), cancel.clone());
        let client = self.client.clone();

        let task = tokio::spawn(async move { session.run(&client, url).await });

        self.current = Some(CurrentSession { cancel, task });
    }

    /// Force the current session (if any) out of `Active`, wait for its
    /// controller to wind down, then hard-stop the timeline. The stop is
    /// unconditional: even a completed session may still have audible
    /// audio, and sessions must never overlap.
    async fn supersede_current(&mut self) {
        if let Some(current) = self.current.take() {
            current.cancel.cancel();

            match current.task.await {
                Ok(outcome) => {
                    debug!("Previous session ended as {:?}", outcome.state);
                }
                Err(e) => {
                    error!("Commentary session task failed: {e}");
                }
            }
        }

        self.scheduler.stop_all();
    }
}

pub fn init(bus: &EventBus, scheduler: Arc<FragmentScheduler>, config: &Config) {
    let mut arbiter = SessionArbiter::new(
        scheduler,
        bus.clone(),
        config.commentary_url.clone(),
    );

    let bus = bus.clone();
    tokio::spawn(async move {
        let mut subscriber = bus.subscribe();

        loop {
            let event = subscriber.recv().await;

            if let Event::Commentary(action) = event {
                arbiter.handle_action(action).await;
            }
        }
    });
}
