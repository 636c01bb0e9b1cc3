//! Simulated time.

use serde::Serialize;
use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// A point (or span) on the simulated clock, measured from simulation start
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct SimTime(#[serde(with = "humantime_serde")] Duration);

impl SimTime {
    pub const ZERO: SimTime = SimTime(Duration::ZERO);

    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

/// Printed the way the simulator's time attributes expect, e.g. `+6s`
impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}s", self.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(SimTime::from_secs(6).to_string(), "+6s");
        assert_eq!(SimTime::from_millis(1500).to_string(), "+1.5s");
    }

    #[test]
    fn test_ordering_and_add() {
        let a = SimTime::from_secs(1);
        let b = SimTime::from_millis(1500);
        assert!(a < b);
        assert_eq!(a + a, SimTime::from_secs(2));
    }
}
