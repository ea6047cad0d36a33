//! Broadcast event bus connecting the driver, the session arbiter and
//! the transcript renderer.

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::{self, Receiver, Sender};

use crate::arbiter::CommentaryAction;
use crate::transcript::TranscriptAction;

const BUS_CAPACITY: usize = 100;

#[derive(Clone, Debug)]
pub enum Event {
    /// Start, narrate or stop commentary (consumed by the arbiter)
    Commentary(CommentaryAction),

    /// Transcript text and terminal status (produced by sessions)
    Transcript(TranscriptAction),
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(BUS_CAPACITY);
        Self { tx }
    }

    /// Broadcast an event to every subscriber. A send with no receivers
    /// is logged and dropped; the bus itself never fails.
    pub fn send(&self, event: Event) {
        if let Err(e) = self.tx.send(event) {
            error!("Error while sending event: {:?}", e);
        }
    }

    pub fn subscribe(&self) -> Subscriber {
        Subscriber {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Subscriber {
    rx: Receiver<Event>,
}

impl Subscriber {
    pub fn try_recv(&mut self) -> Result<Event, TryRecvError> {
        self.rx.try_recv()
    }

    /// Wait for the next event, skipping over any messages lost to lag.
    pub async fn recv(&mut self) -> Event {
        loop {
            match self.rx.recv().await {
                Ok(event) => return event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagging, skipped {skipped} messages");
                }
                Err(RecvError::Closed) => {
                    panic!("Event bus closed with subscribers still listening, this should never happen")
                }
            }
        }
    }
}

/// Log every event that crosses the bus. Transcript chunks arrive per
/// stream event and are demoted to trace.
pub fn debug(bus: &EventBus) {
    let bus = bus.clone();
    tokio::spawn(async move {
        let mut subscriber = bus.subscribe();
        loop {
            let event = subscriber.recv().await;
            match event {
                Event::Transcript(TranscriptAction::Chunk { .. }) => {
                    trace!("Received event: {:?}", event)
                }
                _ => debug!("Received event: {:?}", event),
            }
        }
    });
}
