//! Time management for the simulation
//!
//! The simulation operates in continuous time (seconds). Each run has a
//! horizon (`max_time`); the clock only ever moves forward within a run.

use serde::{Deserialize, Serialize};

/// Simulation clock for a single run
///
/// # Example
/// ```
/// use routing_sim_core::Clock;
///
/// let mut clock = Clock::new(100.0);
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance_to(12.5).unwrap();
/// assert_eq!(clock.now(), 12.5);
/// assert!(clock.within_horizon(100.0));
/// assert!(!clock.within_horizon(100.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    /// Current simulated time in seconds
    now: f64,
    /// Largest time at which an event may still be scheduled
    horizon: f64,
}

impl Clock {
    /// Create a clock at t=0 with the given horizon
    ///
    /// # Panics
    /// Panics if the horizon is negative or not finite
    pub fn new(horizon: f64) -> Self {
        assert!(
            horizon.is_finite() && horizon >= 0.0,
            "horizon must be finite and non-negative"
        );
        Self { now: 0.0, horizon }
    }

    /// Move the clock to `time`
    ///
    /// Returns the rejected time as the error when it lies before the
    /// current time.
    pub fn advance_to(&mut self, time: f64) -> Result<(), f64> {
        if time < self.now {
            return Err(time);
        }
        self.now = time;
        Ok(())
    }

    /// Rewind to t=0 for a fresh run
    pub fn reset(&mut self) {
        self.now = 0.0;
    }

    /// Current simulated time
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Configured horizon of the run
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Whether an event at `time` falls inside the run
    pub fn within_horizon(&self, time: f64) -> bool {
        time <= self.horizon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "horizon must be finite and non-negative")]
    fn test_negative_horizon_panics() {
        Clock::new(-1.0);
    }

    #[test]
    fn test_advance_backwards_is_rejected() {
        let mut clock = Clock::new(10.0);
        clock.advance_to(5.0).unwrap();
        assert_eq!(clock.advance_to(4.0), Err(4.0));
        assert_eq!(clock.now(), 5.0);
    }
}
