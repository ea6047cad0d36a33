//! Caller-visible transcript and status sink.
//!
//! The game-loop side only ever sees narration as a text stream plus a
//! terminal status; this consumer renders both to the log.

use crate::event::{Event, EventBus};

#[derive(Clone, Debug, PartialEq)]
pub enum NarrationStatus {
    Ready,
    Error(String),
}

#[derive(Clone, Debug)]
pub enum TranscriptAction {
    /// Incremental transcript text to append
    Chunk { text: String },

    /// Terminal status of the current narration
    Status { status: NarrationStatus },
}

pub fn init(bus: &EventBus) {
    let bus = bus.clone();
    tokio::spawn(async move {
        let mut subscriber = bus.subscribe();

        loop {
            let event = subscriber.recv().await;

            if let Event::Transcript(action) = event {
                match action {
                    TranscriptAction::Chunk { text } => {
                        info!("Commentary: {text}");
                    }
                    TranscriptAction::Status { status } => match status {
                        NarrationStatus::Ready => info!("Narration finished"),
                        NarrationStatus::Error(message) => {
                            warn!("Narration unavailable: {message}")
                        }
                    },
                }
            }
        }
    });
}
