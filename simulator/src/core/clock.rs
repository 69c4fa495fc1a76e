//! Virtual time for the simulation
//!
//! The simulation operates in virtual time: a single non-decreasing
//! real-valued clock owned by the root coordinator. Time advances only in
//! discrete jumps to the next scheduled event time, never by wall-clock
//! waiting.

use serde::{Deserialize, Serialize};

/// The global virtual clock.
///
/// # Example
/// ```
/// use market_simulator_core::VirtualClock;
///
/// let mut clock = VirtualClock::new();
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance_to(1.0);
/// assert_eq!(clock.now(), 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualClock {
    /// Current virtual time
    now: f64,
}

impl VirtualClock {
    /// Create a new clock at time zero.
    pub fn new() -> Self {
        Self { now: 0.0 }
    }

    /// Current virtual time.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Jump to the given time.
    ///
    /// Time is non-decreasing; the coordinator only ever advances to the
    /// minimum next-event time, which can never lie in the past.
    pub fn advance_to(&mut self, t: f64) {
        debug_assert!(t >= self.now, "virtual time must be non-decreasing");
        self.now = t;
    }

    /// Reset the clock to zero (coordinator start).
    pub fn reset(&mut self) {
        self.now = 0.0;
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}
