//! # Input staleness watchdog
//!
//! Counts the cycles since odometry and obstacles were last refreshed, and refuses motion if
//! either has gone stale or if any input the planner needs has never been received.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::InputSnapshot;
use util::{logger::Throttle, warn_throttle};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum time between two refusal warnings.
///
/// Units: seconds
const REFUSAL_WARN_PERIOD_S: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Watchdog {
    /// Number of cycles an input may go without a refresh
    stale_count_threshold: u32,

    use_footprint: bool,

    /// Cycles since odometry was last refreshed
    odometry_count: u32,

    /// Cycles since obstacles were last refreshed
    obstacles_count: u32,

    throttle: Throttle,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Whether the planner may command motion this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Refused(RefusalCause),
}

/// Reason motion was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefusalCause {
    NoOdometry,
    NoObstacles,
    NoGoal,
    NoFootprint,

    /// Odometry has not been refreshed for more than the threshold number of cycles
    StaleOdometry(u32),

    /// Obstacles have not been refreshed for more than the threshold number of cycles
    StaleObstacles(u32),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Watchdog {
    pub fn new(stale_count_threshold: u32, use_footprint: bool) -> Self {
        Self {
            stale_count_threshold,
            use_footprint,
            odometry_count: 0,
            obstacles_count: 0,
            throttle: Throttle::new(REFUSAL_WARN_PERIOD_S),
        }
    }

    /// Update the counters from this cycle's snapshot and decide if motion is allowed.
    ///
    /// Must be called exactly once per cycle.
    pub fn check(&mut self, snapshot: &InputSnapshot) -> Readiness {
        self.odometry_count = next_count(self.odometry_count, snapshot.odometry_updated);
        self.obstacles_count = next_count(self.obstacles_count, snapshot.obstacles_updated);

        let cause = if snapshot.odometry.is_none() {
            Some(RefusalCause::NoOdometry)
        }
        else if snapshot.obstacles.is_none() {
            Some(RefusalCause::NoObstacles)
        }
        else if snapshot.goal.is_none() {
            Some(RefusalCause::NoGoal)
        }
        else if self.use_footprint && snapshot.footprint.is_none() {
            Some(RefusalCause::NoFootprint)
        }
        else if self.odometry_count > self.stale_count_threshold {
            Some(RefusalCause::StaleOdometry(self.odometry_count))
        }
        else if self.obstacles_count > self.stale_count_threshold {
            Some(RefusalCause::StaleObstacles(self.obstacles_count))
        }
        else {
            None
        };

        match cause {
            Some(c) => {
                warn_throttle!(self.throttle, "Refusing to move: {:?}", c);
                Readiness::Refused(c)
            }
            None => Readiness::Ready,
        }
    }
}

fn next_count(count: u32, updated: bool) -> u32 {
    if updated {
        0
    }
    else {
        count.saturating_add(1)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::dwa::{Footprint, Goal, ObstacleSet};
    use comms_if::msg::OdometryMsg;

    fn fresh() -> InputSnapshot {
        InputSnapshot {
            goal: Some(Goal::new(5.0, 0.0, 0.0)),
            odometry: Some(OdometryMsg::default()),
            obstacles: Some(ObstacleSet::default()),
            odometry_updated: true,
            obstacles_updated: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_inputs() {
        let mut wd = Watchdog::new(3, false);

        assert_eq!(
            wd.check(&InputSnapshot::default()),
            Readiness::Refused(RefusalCause::NoOdometry)
        );

        let mut snap = fresh();
        snap.goal = None;
        assert_eq!(wd.check(&snap), Readiness::Refused(RefusalCause::NoGoal));

        let mut snap = fresh();
        snap.obstacles = None;
        assert_eq!(wd.check(&snap), Readiness::Refused(RefusalCause::NoObstacles));

        assert_eq!(wd.check(&fresh()), Readiness::Ready);
    }

    #[test]
    fn test_footprint_required() {
        let mut wd = Watchdog::new(3, true);

        assert_eq!(wd.check(&fresh()), Readiness::Refused(RefusalCause::NoFootprint));

        let mut snap = fresh();
        snap.footprint =
            Some(Footprint::new(&[[0.3, 0.3], [-0.3, 0.3], [-0.3, -0.3], [0.3, -0.3]]).unwrap());
        assert_eq!(wd.check(&snap), Readiness::Ready);
    }

    #[test]
    fn test_stale_and_recover() {
        let mut wd = Watchdog::new(3, false);
        assert_eq!(wd.check(&fresh()), Readiness::Ready);

        // Obstacles keep coming, odometry stops
        let mut snap = fresh();
        snap.odometry_updated = false;

        for _ in 0..3 {
            assert_eq!(wd.check(&snap), Readiness::Ready);
        }
        assert_eq!(
            wd.check(&snap),
            Readiness::Refused(RefusalCause::StaleOdometry(4))
        );

        // Odometry is refreshed, obstacles stop
        let mut snap = fresh();
        snap.obstacles_updated = false;

        for _ in 0..3 {
            assert_eq!(wd.check(&snap), Readiness::Ready);
        }
        assert_eq!(
            wd.check(&snap),
            Readiness::Refused(RefusalCause::StaleObstacles(4))
        );

        assert_eq!(wd.check(&fresh()), Readiness::Ready);
    }
}
