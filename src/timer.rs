use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerHandle(u64);

/// One-shot scheduling of the engine's next update.
pub trait Timer {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Timer for a polling loop: holds at most one deadline and reports when it
/// has passed. Scheduling again replaces the pending deadline.
pub struct DeadlineTimer {
    next_id: u64,
    pending: Option<(TimerHandle, Instant)>,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        DeadlineTimer { next_id: 0, pending: None }
    }

    /// Clears and returns true if the pending deadline is at or before `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some((_, deadline)) if deadline <= now => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Timer for DeadlineTimer {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some((handle, Instant::now() + delay));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if matches!(self.pending, Some((h, _)) if h == handle) {
            self.pending = None;
        }
    }
}

/// Records every call so tests can check what the engine scheduled.
#[cfg(test)]
pub(crate) struct ManualTimer {
    next_id: u64,
    pub scheduled: Vec<(TimerHandle, Duration)>,
    pub cancelled: Vec<TimerHandle>,
}

#[cfg(test)]
impl ManualTimer {
    pub fn new() -> Self {
        ManualTimer { next_id: 0, scheduled: vec![], cancelled: vec![] }
    }
}

#[cfg(test)]
impl Timer for ManualTimer {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.scheduled.push((handle, delay));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.cancelled.push(handle);
    }
}
