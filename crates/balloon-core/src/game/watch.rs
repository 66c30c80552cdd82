use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::GameState;

/// Latest-value broadcast of the session state.
///
/// Readers always see the most recently published value; if publications
/// outpace a reader, intermediate values (typically `ScoreUpdate`s) are
/// skipped. No history is kept and publishing never blocks on consumers.
#[derive(Clone, Default)]
pub struct StateWatch {
    shared: Arc<WatchShared>,
}

#[derive(Default)]
struct WatchShared {
    slot: Mutex<Slot>,
    changed: Condvar,
}

#[derive(Default)]
struct Slot {
    version: u64,
    state: GameState,
}

impl StateWatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.shared
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest published state. `GameState::None` before the first publish.
    pub fn latest(&self) -> GameState {
        self.slot().state.clone()
    }

    /// Publication counter, bumped on every publish. Lets pollers detect
    /// whether anything happened between two reads.
    pub fn version(&self) -> u64 {
        self.slot().version
    }

    pub(crate) fn publish(&self, state: GameState) {
        let mut slot = self.slot();
        slot.version += 1;
        slot.state = state;
        drop(slot);
        self.shared.changed.notify_all();
    }

    /// Block until a published state matches `pred`, or until `timeout`.
    ///
    /// The current value is checked first, so a state published before the
    /// call still matches. Returns `None` on timeout.
    pub fn wait_for(
        &self,
        timeout: Duration,
        mut pred: impl FnMut(&GameState) -> bool,
    ) -> Option<GameState> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot();
        loop {
            if pred(&slot.state) {
                return Some(slot.state.clone());
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            slot = self
                .shared
                .changed
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}
