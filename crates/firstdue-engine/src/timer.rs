use std::time::Duration;

/// Identifies one scheduled auto-advance.
///
/// Handles are never reused within a timer, so a handle that was cancelled or
/// replaced can never match the live one again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    handle: TimerHandle,
    due: Duration,
}

/// Single-slot cancellable timer on a logical clock.
///
/// The clock only moves when the owner calls [`advance`](Self::advance), the
/// same way a game session only moves when it is given frames. At most one
/// task is outstanding: scheduling a new one drops the previous one.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use firstdue_engine::AdvanceTimer;
///
/// let mut timer = AdvanceTimer::new();
/// let first = timer.schedule(Duration::from_millis(1000));
/// let second = timer.schedule(Duration::from_millis(1500));
/// assert_ne!(first, second);
///
/// assert_eq!(timer.advance(Duration::from_millis(1000)), None);
/// assert_eq!(timer.advance(Duration::from_millis(500)), Some(second));
/// assert!(!timer.is_pending());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AdvanceTimer {
    now: Duration,
    next_id: u64,
    pending: Option<Scheduled>,
}

impl AdvanceTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical time elapsed since the timer was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules a task `delay` from now, cancelling any outstanding one.
    pub fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some(Scheduled {
            handle,
            due: self.now + delay,
        });
        handle
    }

    /// Cancels the outstanding task, returning its handle.
    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.pending.take().map(|s| s.handle)
    }

    #[must_use]
    pub fn pending(&self) -> Option<TimerHandle> {
        self.pending.map(|s| s.handle)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left until the outstanding task is due.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.pending.map(|s| s.due.saturating_sub(self.now))
    }

    /// Moves the clock forward. Returns the handle of the task that came due,
    /// which is consumed.
    pub fn advance(&mut self, elapsed: Duration) -> Option<TimerHandle> {
        self.now += elapsed;
        match self.pending {
            Some(s) if s.due <= self.now => self.cancel(),
            _ => None,
        }
    }

    /// Consumes the outstanding task if `handle` is it. Stale handles are
    /// rejected and leave the live task untouched.
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.pending() == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_fires_only_when_due() {
        let mut timer = AdvanceTimer::new();
        let handle = timer.schedule(SECOND);
        assert_eq!(timer.advance(SECOND / 2), None);
        assert_eq!(timer.remaining(), Some(SECOND / 2));
        assert_eq!(timer.advance(SECOND / 2), Some(handle));
        assert_eq!(timer.advance(SECOND * 10), None);
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        let mut timer = AdvanceTimer::new();
        let handle = timer.schedule(SECOND);
        assert_eq!(timer.cancel(), Some(handle));
        assert_eq!(timer.advance(SECOND * 5), None);
        assert!(!timer.fire(handle));
    }

    #[test]
    fn test_rescheduling_replaces_previous_task() {
        let mut timer = AdvanceTimer::new();
        let old = timer.schedule(SECOND);
        let new = timer.schedule(SECOND * 2);
        assert!(!timer.fire(old));
        assert_eq!(timer.pending(), Some(new));
        assert!(timer.fire(new));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_delay_counts_from_schedule_time() {
        let mut timer = AdvanceTimer::new();
        timer.advance(SECOND * 3);
        let handle = timer.schedule(SECOND);
        assert_eq!(timer.now(), SECOND * 3);
        assert_eq!(timer.advance(SECOND), Some(handle));
    }
}
