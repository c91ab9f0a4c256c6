use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use crate::tui::event::TuiEvent;

/// Event loop state management.
///
/// Ticks come at a fixed interval and report the real time elapsed since the
/// previous tick, so a slow frame never loses time. Renders happen only after
/// something changed, at most once per render interval.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    render_interval: Duration,
    last_tick: Instant,
    last_render: Instant,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl EventLoop {
    fn new(now: Instant) -> Self {
        let past_time = now.checked_sub(Duration::from_secs(86400)).unwrap_or(now);
        Self {
            tick_interval: None,
            render_interval: Duration::ZERO,
            last_tick: now,
            last_render: past_time,
            dirty: true, // Initial render is required on startup
        }
    }

    /// Sets the tick interval.
    ///
    /// Pass `None` to disable tick events.
    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    /// Sets the minimum time between two renders.
    pub(super) fn set_render_interval(&mut self, interval: Duration) {
        self.render_interval = interval;
    }

    /// Returns the next event.
    ///
    /// Blocks until a tick or render is due or a crossterm event occurs.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(elapsed) = self.tick_due(now) {
                self.last_tick = now;
                self.dirty = true;
                return Ok(TuiEvent::Tick(elapsed));
            }
            if self.render_due(now) {
                self.last_render = now;
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(timeout) = self.compute_timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(TuiEvent::Crossterm(event::read()?));
        }
    }

    fn tick_due(&self, now: Instant) -> Option<Duration> {
        let interval = self.tick_interval?;
        let elapsed = now.duration_since(self.last_tick);
        (elapsed >= interval).then_some(elapsed)
    }

    fn render_due(&self, now: Instant) -> bool {
        self.dirty && now.duration_since(self.last_render) >= self.render_interval
    }

    fn compute_timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick_at = self.tick_interval.map(|interval| self.last_tick + interval);
        let next_render_at = self.dirty.then(|| self.last_render + self.render_interval);
        let next_timeout_at = [next_tick_at, next_render_at].into_iter().flatten().min()?;
        Some(next_timeout_at.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_tick_reports_real_elapsed_time() {
        let start = Instant::now();
        let mut events = EventLoop::new(start);
        events.set_tick_interval(Some(MS * 50));
        assert_eq!(events.tick_due(start + MS * 20), None);
        assert_eq!(events.tick_due(start + MS * 80), Some(MS * 80));
    }

    #[test]
    fn test_render_is_throttled_and_only_when_dirty() {
        let start = Instant::now();
        let mut events = EventLoop::new(start);
        events.set_render_interval(MS * 100);
        assert!(events.render_due(start));

        events.last_render = start;
        events.dirty = true;
        assert!(!events.render_due(start + MS * 50));
        assert!(events.render_due(start + MS * 100));

        events.dirty = false;
        assert!(!events.render_due(start + MS * 500));
    }

    #[test]
    fn test_timeout_waits_for_earliest_deadline() {
        let start = Instant::now();
        let mut events = EventLoop::new(start);
        events.dirty = false;
        assert_eq!(events.compute_timeout(start), None);

        events.set_tick_interval(Some(MS * 50));
        assert_eq!(events.compute_timeout(start + MS * 10), Some(MS * 40));

        events.last_render = start;
        events.set_render_interval(MS * 30);
        events.dirty = true;
        assert_eq!(events.compute_timeout(start + MS * 10), Some(MS * 20));
    }
}
