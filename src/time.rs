//! Simulation time: integer seconds since a scenario-relative epoch.
//!
//! Unlike the teacher's millisecond event clock (`clock.rs`'s `SimulationClock`,
//! which advances by popping the next scheduled event off a min-heap), HIVE's
//! clock advances by a fixed `timestep_duration_seconds` every tick (spec §2
//! step 5). There is no event queue in the core: the top-level loop (`step`
//! module) drives every phase itself.

use std::ops::Add;

/// Integer seconds since the scenario's epoch. Monotonic non-decreasing for
/// the lifetime of a [`crate::state::SimulationState`] (spec §3 invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub fn seconds(self) -> u64 {
        self.0
    }

    /// Advance by `delta` seconds, saturating rather than wrapping.
    pub fn advance(self, delta: u64) -> SimTime {
        SimTime(self.0.saturating_add(delta))
    }
}

impl Add<u64> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: u64) -> SimTime {
        self.advance(rhs)
    }
}

impl From<u64> for SimTime {
    fn from(v: u64) -> Self {
        SimTime(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_monotonic_and_saturating() {
        let t = SimTime(u64::MAX - 1);
        assert_eq!(t.advance(5), SimTime(u64::MAX));
    }

    #[test]
    fn add_operator_matches_advance() {
        assert_eq!(SimTime(10) + 60, SimTime(10).advance(60));
    }
}
