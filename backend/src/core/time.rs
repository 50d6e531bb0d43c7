//! Simulation clock
//!
//! Simulation time is a plain integer timestamp. The clock only ever moves
//! forward: it is advanced to the timestamp of each event the scheduler
//! executes.

use serde::{Deserialize, Serialize};

/// Simulation timestamp
pub type SimTime = u64;

/// The "current simulation time" cell owned by a scheduler
///
/// # Example
/// ```
/// use event_scheduler_core::SimClock;
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.now(), 0);
///
/// clock.advance_to(5);
/// assert_eq!(clock.now(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    /// Timestamp of the most recently executed event
    now: SimTime,
}

impl SimClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self { now: 0 }
    }

    /// Create a clock starting at `start`
    ///
    /// # Example
    /// ```
    /// use event_scheduler_core::SimClock;
    ///
    /// let clock = SimClock::starting_at(42);
    /// assert_eq!(clock.now(), 42);
    /// ```
    pub fn starting_at(start: SimTime) -> Self {
        Self { now: start }
    }

    /// Get the current simulation time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Move the clock to `time`
    ///
    /// # Panics
    /// Panics if `time` is earlier than the current time.
    ///
    /// # Example
    /// ```
    /// use event_scheduler_core::SimClock;
    ///
    /// let mut clock = SimClock::new();
    /// clock.advance_to(3);
    /// clock.advance_to(3); // same instant is fine
    /// assert_eq!(clock.now(), 3);
    /// ```
    pub fn advance_to(&mut self, time: SimTime) {
        assert!(
            time >= self.now,
            "clock cannot move backwards: now {}, requested {}",
            self.now,
            time
        );
        self.now = time;
    }

    /// Time remaining until `time`, zero if it has already passed
    pub fn until(&self, time: SimTime) -> SimTime {
        time.saturating_sub(self.now)
    }
}
