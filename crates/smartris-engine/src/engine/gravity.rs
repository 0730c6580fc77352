use std::time::Duration;

/// Interval between gravity ticks.
pub const DEFAULT_GRAVITY_INTERVAL: Duration = Duration::from_millis(700);

/// Repeating gravity schedule owned by the session.
///
/// Time is fed in through [`Self::advance`], which reports how many whole
/// intervals have elapsed. A cancelled timer ignores elapsed time until it is
/// rescheduled; rescheduling starts a fresh interval.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use smartris_engine::GravityTimer;
///
/// let mut timer = GravityTimer::new(Duration::from_millis(700));
/// assert_eq!(timer.advance(Duration::from_millis(500)), 0);
/// assert_eq!(timer.advance(Duration::from_millis(1000)), 2);
///
/// timer.cancel();
/// assert_eq!(timer.advance(Duration::from_secs(10)), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GravityTimer {
    interval: Duration,
    elapsed: Duration,
    scheduled: bool,
}

impl Default for GravityTimer {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY_INTERVAL)
    }
}

impl GravityTimer {
    /// Creates a scheduled timer.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        assert!(!interval.is_zero(), "gravity interval must be positive");
        Self {
            interval,
            elapsed: Duration::ZERO,
            scheduled: true,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Stops the timer and drops any partially elapsed interval.
    pub fn cancel(&mut self) {
        self.scheduled = false;
        self.elapsed = Duration::ZERO;
    }

    /// (Re)starts the timer from the beginning of an interval.
    pub fn reschedule(&mut self) {
        self.scheduled = true;
        self.elapsed = Duration::ZERO;
    }

    /// Accumulates `dt` and returns the number of ticks that became due.
    ///
    /// The count saturates at `u32::MAX`; elapsed time past that is dropped.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.scheduled {
            return 0;
        }
        let elapsed = self.elapsed.saturating_add(dt);
        let due = elapsed.as_nanos() / self.interval.as_nanos();
        let ticks = u32::try_from(due).unwrap_or(u32::MAX);
        self.elapsed = if ticks == u32::MAX {
            Duration::ZERO
        } else {
            elapsed - self.interval * ticks
        };
        ticks
    }
}
