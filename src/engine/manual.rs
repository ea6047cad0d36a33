//! Virtual playback backend for tests.
//!
//! Keeps a manually advanced clock and a ledger of everything that was
//! scheduled or halted, so timeline properties can be asserted without a
//! real audio device. Completions fire only when a test calls [ManualEngine::finish].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::decoder::AudioFragment;
use crate::engine::{AudioEngine, CompletionSender, VoiceId};

/// Record of one schedule call.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledVoice {
    pub id: VoiceId,
    pub start: f64,
    pub duration: f64,
}

#[derive(Default)]
struct ManualState {
    scheduled: Vec<ScheduledVoice>,
    halted: Vec<VoiceId>,
    completions: HashMap<VoiceId, CompletionSender>,
}

pub struct ManualEngine {
    clock: Mutex<f64>,
    next_voice: AtomicU64,
    state: Mutex<ManualState>,
}

impl ManualEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(ManualEngine {
            clock: Mutex::new(0.0),
            next_voice: AtomicU64::new(1),
            state: Mutex::new(ManualState::default()),
        })
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, seconds: f64) {
        let mut clock = self.clock.lock().expect("manual clock lock poisoned");
        *clock += seconds;
    }

    /// Pin the virtual clock to an absolute value.
    pub fn set_now(&self, seconds: f64) {
        let mut clock = self.clock.lock().expect("manual clock lock poisoned");
        *clock = seconds;
    }

    /// Report a voice as having played to its natural end.
    pub fn finish(&self, voice: VoiceId) {
        let mut state = self.state.lock().expect("manual state lock poisoned");
        if let Some(done) = state.completions.remove(&voice) {
            let _ = done.send(voice);
        }
    }

    /// Every schedule call seen so far, in submission order.
    pub fn scheduled(&self) -> Vec<ScheduledVoice> {
        self.state
            .lock()
            .expect("manual state lock poisoned")
            .scheduled
            .clone()
    }

    /// Every halted voice id, in halt order.
    pub fn halted(&self) -> Vec<VoiceId> {
        self.state
            .lock()
            .expect("manual state lock poisoned")
            .halted
            .clone()
    }
}

impl AudioEngine for ManualEngine {
    fn now(&self) -> f64 {
        *self.clock.lock().expect("manual clock lock poisoned")
    }

    fn schedule(&self, fragment: AudioFragment, start: f64, done: CompletionSender) -> VoiceId {
        let id = self.next_voice.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock().expect("manual state lock poisoned");
        state.scheduled.push(ScheduledVoice {
            id,
            start,
            duration: fragment.duration(),
        });
        state.completions.insert(id, done);
        id
    }

    fn halt(&self, voice: VoiceId) {
        let mut state = self.state.lock().expect("manual state lock poisoned");
        state.halted.push(voice);
        state.completions.remove(&voice);
    }
}
