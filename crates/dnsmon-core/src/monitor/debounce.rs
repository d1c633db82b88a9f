use std::time::Duration;
use tokio::time::Instant;

/// Leading- and trailing-edge debouncer
///
/// The first trigger always passes. Triggers inside `window` after a pass
/// are held back; if any were held, one more pass is due when the window
/// closes (see [`Debouncer::deadline`] and [`Debouncer::flush`]).
#[derive(Debug)]
pub(crate) struct Debouncer {
    window: Duration,
    last_fired: Option<Instant>,
    pending: bool,
}

impl Debouncer {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: None,
            pending: false,
        }
    }

    /// Record a trigger at `now` and report whether it should fire
    pub(crate) fn fire(&mut self, now: Instant) -> bool {
        let ready = match self.last_fired {
            Some(last) => now.saturating_duration_since(last) >= self.window,
            None => true,
        };
        if ready {
            self.last_fired = Some(now);
            self.pending = false;
        } else {
            self.pending = true;
        }
        ready
    }

    /// When the held-back triggers are due, if there are any
    pub(crate) fn deadline(&self) -> Option<Instant> {
        if !self.pending {
            return None;
        }
        self.last_fired?.checked_add(self.window)
    }

    /// Release held-back triggers at `now`; returns whether one should fire
    pub(crate) fn flush(&mut self, now: Instant) -> bool {
        let due = self.deadline().is_some_and(|deadline| now >= deadline);
        if due {
            self.last_fired = Some(now);
            self.pending = false;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_trigger_fires() {
        let mut debouncer = Debouncer::new(Duration::from_secs(1));
        assert!(debouncer.fire(Instant::now()));
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_burst_is_folded() {
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        let start = Instant::now();

        assert!(debouncer.fire(start));
        assert!(!debouncer.fire(start + Duration::from_millis(10)));
        assert!(!debouncer.fire(start + Duration::from_millis(249)));
        assert!(debouncer.fire(start + Duration::from_millis(250)));
        assert!(!debouncer.fire(start + Duration::from_millis(300)));
    }

    #[test]
    fn test_held_trigger_fires_when_window_closes() {
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        let start = Instant::now();

        assert!(debouncer.fire(start));
        assert!(!debouncer.fire(start + Duration::from_millis(100)));
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(250))
        );

        assert!(!debouncer.flush(start + Duration::from_millis(200)));
        assert!(debouncer.flush(start + Duration::from_millis(250)));

        // Released once only
        assert_eq!(debouncer.deadline(), None);
        assert!(!debouncer.flush(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_flush_opens_a_new_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        let start = Instant::now();

        debouncer.fire(start);
        debouncer.fire(start + Duration::from_millis(50));
        assert!(debouncer.flush(start + Duration::from_millis(260)));

        assert!(!debouncer.fire(start + Duration::from_millis(300)));
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(510))
        );
    }

    #[test]
    fn test_zero_window_always_fires() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        let now = Instant::now();

        assert!(debouncer.fire(now));
        assert!(debouncer.fire(now));
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_unbounded_window_has_no_deadline() {
        let mut debouncer = Debouncer::new(Duration::MAX);
        let now = Instant::now();

        assert!(debouncer.fire(now));
        assert!(!debouncer.fire(now + Duration::from_secs(1)));
        assert_eq!(debouncer.deadline(), None);
    }
}
