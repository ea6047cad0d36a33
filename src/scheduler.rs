//! Fragment scheduler.
//!
//! Owns the set of in-flight voices and the playback clock. Fragments
//! submitted in order play back-to-back with no gap and no overlap; a
//! hard stop silences everything at once and resets the timeline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::mpsc;

use crate::clock::PlaybackClock;
use crate::decoder::AudioFragment;
use crate::engine::{AudioEngine, VoiceId};

/// A fragment that has been handed to the engine: playing, or waiting to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledHandle {
    pub voice: VoiceId,
    pub start: f64,
    pub end: f64,
}

struct SchedulerState {
    clock: PlaybackClock,
    live: HashMap<VoiceId, ScheduledHandle>,
}

pub struct FragmentScheduler {
    engine: Arc<dyn AudioEngine>,
    state: Arc<Mutex<SchedulerState>>,
    done_tx: mpsc::UnboundedSender<VoiceId>,
}

impl FragmentScheduler {
    pub fn new(engine: Arc<dyn AudioEngine>) -> Arc<Self> {
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        let state = Arc::new(Mutex::new(SchedulerState {
            clock: PlaybackClock::new(engine.clone()),
            live: HashMap::new(),
        }));

        start_completion_loop(Arc::downgrade(&state), done_rx);

        Arc::new(Self {
            engine,
            state,
            done_tx,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Reserve timeline space for the fragment and hand it to the engine.
    ///
    /// The fragment starts exactly when the previous one ends, or at the
    /// live clock if the timeline has gone idle.
    pub fn submit(&self, fragment: AudioFragment) -> ScheduledHandle {
        let mut state = self.lock_state();

        let duration = fragment.duration();
        let start = state.clock.reserve(duration);
        let voice = self.engine.schedule(fragment, start, self.done_tx.clone());

        let handle = ScheduledHandle {
            voice,
            start,
            end: start + duration,
        };
        state.live.insert(voice, handle);

        trace!(
            "Scheduled fragment: voice {} at {:.3}s for {:.3}s",
            voice,
            start,
            duration
        );

        handle
    }

    /// Halt every pending and currently playing voice, clear the live
    /// set and re-synchronize the clock. Idempotent; safe on an empty set.
    pub fn stop_all(&self) {
        let mut state = self.lock_state();

        if !state.live.is_empty() {
            debug!("Hard-stopping {} scheduled fragments", state.live.len());
        }

        for voice in state.live.keys() {
            self.engine.halt(*voice);
        }
        state.live.clear();
        state.clock.reset();
    }

    /// Number of voices playing or waiting to play.
    pub fn live_count(&self) -> usize {
        self.lock_state().live.len()
    }

    /// Current value of the timeline cursor, in engine clock seconds.
    pub fn cursor(&self) -> f64 {
        self.lock_state().clock.cursor()
    }
}

/// Drains the engine's completion channel, dropping handles whose voices
/// finished naturally. A completion racing a forced stop resolves in
/// favor of the stop: the handle is already gone and the removal is a
/// no-op.
fn start_completion_loop(
    state: Weak<Mutex<SchedulerState>>,
    mut done_rx: mpsc::UnboundedReceiver<VoiceId>,
) {
    tokio::spawn(async move {
        while let Some(voice) = done_rx.recv().await {
            let Some(state) = state.upgrade() else {
                break;
            };

            let mut state = match state.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };

            if state.live.remove(&voice).is_some() {
                trace!("Fragment finished: voice {}", voice);
            }
        }
    });
}
