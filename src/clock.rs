//! Playback clock tracker.
//!
//! Owns the timeline cursor: the next free start time on the playback
//! timeline, expressed in engine clock seconds. The scheduler is the only
//! component that reserves time; nothing else reads or writes the cursor.

use std::sync::Arc;

use crate::engine::AudioEngine;

pub struct PlaybackClock {
    engine: Arc<dyn AudioEngine>,
    cursor: f64,
}

impl PlaybackClock {
    pub fn new(engine: Arc<dyn AudioEngine>) -> Self {
        let cursor = engine.now();
        Self { engine, cursor }
    }

    /// The engine's live monotonic time, in seconds.
    pub fn now(&self) -> f64 {
        self.engine.now()
    }

    /// Reserve `duration` seconds on the timeline and return the start
    /// time of the reservation.
    ///
    /// The start is `max(now, cursor)`: back-to-back reservations stitch
    /// gaplessly, and once the timeline has idled past the cursor the next
    /// reservation clamps forward to the live clock. Nothing is ever
    /// scheduled in the past.
    pub fn reserve(&mut self, duration: f64) -> f64 {
        let start = self.now().max(self.cursor);
        self.cursor = start + duration;
        start
    }

    /// Re-synchronize the cursor to the live clock, discarding any
    /// outstanding reservations. Called on session reset and hard stop.
    pub fn reset(&mut self) {
        self.cursor = self.now();
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }
}
