use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

/// Decides when the next refresh starts.
///
/// `Idle -> Refreshing` happens on the first poll and then once `interval`
/// has passed since the last completed refresh. Polls while `Refreshing`
/// never fire, so at most one refresh is in flight.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    interval: Duration,
    phase: RefreshPhase,
    last_completed: Option<Instant>,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            phase: RefreshPhase::Idle,
            last_completed: None,
        }
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a poll at `now` would start a refresh.
    pub fn is_due(&self, now: Instant) -> bool {
        if self.phase == RefreshPhase::Refreshing {
            return false;
        }
        match self.last_completed {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Returns `true` and enters `Refreshing` when a refresh is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.phase = RefreshPhase::Refreshing;
        true
    }

    /// Record a finished refresh and return to `Idle`.
    pub fn complete(&mut self, now: Instant) {
        self.phase = RefreshPhase::Idle;
        self.last_completed = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(300);

    #[test]
    fn test_fires_immediately_at_startup() {
        let mut scheduler = RefreshScheduler::new(INTERVAL);
        assert_eq!(scheduler.phase(), RefreshPhase::Idle);
        assert!(scheduler.poll(Instant::now()));
        assert_eq!(scheduler.phase(), RefreshPhase::Refreshing);
    }

    #[test]
    fn test_fires_at_interval_boundary_only() {
        let start = Instant::now();
        let mut scheduler = RefreshScheduler::new(INTERVAL);
        assert!(scheduler.poll(start));
        scheduler.complete(start);

        assert!(!scheduler.poll(start + Duration::from_secs(1)));
        assert!(!scheduler.poll(start + Duration::from_secs(299)));
        assert!(!scheduler.poll(start + Duration::from_millis(299_999)));
        assert!(scheduler.poll(start + Duration::from_secs(300)));
    }

    #[test]
    fn test_fires_exactly_once_per_due_period() {
        let start = Instant::now();
        let mut scheduler = RefreshScheduler::new(INTERVAL);
        assert!(scheduler.poll(start));
        scheduler.complete(start);

        // one poll per second, no refresh ever completes
        let fired = (1..310)
            .filter(|s| scheduler.poll(start + Duration::from_secs(*s)))
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_never_fires_while_refreshing() {
        let start = Instant::now();
        let mut scheduler = RefreshScheduler::new(INTERVAL);
        assert!(scheduler.poll(start));

        // a refresh far slower than the interval
        assert!(!scheduler.poll(start + Duration::from_secs(301)));
        assert!(!scheduler.poll(start + Duration::from_secs(1000)));

        scheduler.complete(start + Duration::from_secs(1000));
        assert!(!scheduler.poll(start + Duration::from_secs(1001)));
        assert!(scheduler.poll(start + Duration::from_secs(1300)));
    }
}
