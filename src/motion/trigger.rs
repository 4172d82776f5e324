// src/motion/trigger.rs - Digital trigger inputs
//! Thread-safe trigger table. Triggers latch once set and stay active until
//! explicitly cleared.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

pub type TriggerId = u32;

pub const TRIG_START: TriggerId = 1;
pub const TRIG_STOP: TriggerId = 2;
pub const TRIG_CAPTURE: TriggerId = 3;

#[derive(Debug)]
pub struct TriggerHandler {
    states: Mutex<HashMap<TriggerId, bool>>,
    cv: Condvar,
}

impl Default for TriggerHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerHandler {
    pub fn new() -> Self {
        let states = HashMap::from([(TRIG_START, false), (TRIG_STOP, false), (TRIG_CAPTURE, false)]);
        Self {
            states: Mutex::new(states),
            cv: Condvar::new(),
        }
    }

    // A panicking writer cannot leave a bool half-written, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<TriggerId, bool>> {
        self.states.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Set a trigger state, waking any waiters when it becomes active.
    pub fn set_trigger(&self, id: TriggerId, active: bool) {
        self.lock().insert(id, active);
        if active {
            self.cv.notify_all();
        }
    }

    /// Unknown triggers read as inactive.
    pub fn is_triggered(&self, id: TriggerId) -> bool {
        self.lock().get(&id).copied().unwrap_or(false)
    }

    pub fn clear_trigger(&self, id: TriggerId) {
        self.lock().insert(id, false);
    }

    /// Block until `id` is active. The trigger stays set afterwards.
    pub fn wait_for_trigger(&self, id: TriggerId) {
        let guard = self.lock();
        let _guard = self
            .cv
            .wait_while(guard, |states| !states.get(&id).copied().unwrap_or(false))
            .unwrap_or_else(|poisoned| poisoned.into_inner());
    }

    /// Like [`wait_for_trigger`](Self::wait_for_trigger) but gives up after `timeout`.
    /// Returns whether the trigger fired.
    pub fn wait_for_trigger_timeout(&self, id: TriggerId, timeout: Duration) -> bool {
        let guard = self.lock();
        let (_guard, result) = self
            .cv
            .wait_timeout_while(guard, timeout, |states| !states.get(&id).copied().unwrap_or(false))
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        !result.timed_out()
    }
}
