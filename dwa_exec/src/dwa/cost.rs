//! Trajectory cost evaluation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{
    Footprint, Goal, ObstacleSet, Params, Trajectory,
    COLLISION_COST, EPSILON, MAX_CLEARANCE_M
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The weighted cost terms of a trajectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Cost {
    /// Distance from the end of the trajectory to the goal position
    pub to_goal: f64,

    /// Difference between the trajectory speed and the target speed
    pub speed: f64,

    /// Inverse of the clearance, or `COLLISION_COST` on collision
    pub obstacle: f64,

    pub total: f64,

    /// True if the trajectory passes through an obstacle
    pub collision: bool,
}

/// Scores trajectories against one snapshot of the goal and obstacles.
pub struct CostEvaluator<'a> {
    params: &'a Params,
    goal: &'a Goal,
    obstacles: &'a ObstacleSet,
    footprint: Option<&'a Footprint>,
    target_velocity_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Cost {
    /// Returns true if the trajectory may be selected.
    ///
    /// A trajectory whose total reaches `COLLISION_COST` is as bad as a collision, which happens
    /// when an obstacle is closer than `obs_cost_gain / COLLISION_COST`.
    pub fn is_admissible(&self) -> bool {
        !self.collision && self.total < COLLISION_COST
    }
}

impl<'a> CostEvaluator<'a> {
    /// Create a new evaluator.
    ///
    /// When `footprint` is `None` the robot is treated as a point.
    pub fn new(
        params: &'a Params,
        goal: &'a Goal,
        obstacles: &'a ObstacleSet,
        footprint: Option<&'a Footprint>,
        target_velocity_ms: f64,
    ) -> Self {
        Self {
            params,
            goal,
            obstacles,
            footprint,
            target_velocity_ms,
        }
    }

    pub fn evaluate(&self, traj: &Trajectory) -> Cost {
        let to_goal = self.params.to_goal_cost_gain * self.to_goal_dist(traj);
        let speed = self.params.speed_cost_gain
            * (self.target_velocity_ms - traj.last().velocity_ms.abs()).abs();

        let (obstacle, collision) = match self.min_clearance(traj) {
            Some(clearance_m) => (self.params.obs_cost_gain / clearance_m, false),
            None => (COLLISION_COST, true),
        };

        Cost {
            to_goal,
            speed,
            obstacle,
            total: to_goal + speed + obstacle,
            collision,
        }
    }

    /// Returns true if any obstacle is inside the robot at any state of the trajectory.
    ///
    /// A point robot collides with obstacles within `EPSILON` of its position.
    pub fn check_collision(&self, traj: &Trajectory) -> bool {
        match self.footprint {
            Some(fp) => traj.states().iter().any(|s| {
                let placed = fp.transform(s);
                self.obstacles.points().iter().any(|o| placed.contains(o))
            }),
            None => traj.states().iter().any(|s| {
                let pos = s.position();
                self.obstacles.points().iter().any(|o| (o - pos).norm() < EPSILON)
            }),
        }
    }

    fn to_goal_dist(&self, traj: &Trajectory) -> f64 {
        let last = traj.last();
        (last.x_m - self.goal.x_m).hypot(last.y_m - self.goal.y_m)
    }

    /// Smallest clearance between the robot and any obstacle over the trajectory, or `None` if
    /// the robot touches an obstacle.
    fn min_clearance(&self, traj: &Trajectory) -> Option<f64> {
        let mut min_dist_m = MAX_CLEARANCE_M;

        for state in traj.states() {
            // Place the footprint once per state
            let placed = self.footprint.map(|fp| fp.transform(state));
            let pos = state.position();

            for obs in self.obstacles.points() {
                let dist_m = match placed {
                    Some(ref p) => p.distance_to(obs),
                    None => (obs - pos).norm(),
                };

                if dist_m < EPSILON {
                    return None;
                }

                min_dist_m = min_dist_m.min(dist_m);
            }
        }

        Some(min_dist_m)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn test_no_obstacles() {
        let params = Params::default();
        let goal = Goal::new(5.0, 0.0, 0.0);
        let obs = ObstacleSet::default();
        let eval = CostEvaluator::new(&params, &goal, &obs, None, 0.8);

        let traj = Trajectory::generate(1.0, 0.0, &params);
        let cost = eval.evaluate(&traj);

        assert!((cost.to_goal - 1.9).abs() < 1e-9);
        assert!((cost.speed - 0.2).abs() < 1e-9);
        assert!((cost.obstacle - 1.0 / MAX_CLEARANCE_M).abs() < 1e-12);
        assert!(!cost.collision);
        assert!((cost.total - (cost.to_goal + cost.speed + cost.obstacle)).abs() < 1e-12);
    }

    #[test]
    fn test_coincident_obstacle_is_collision() {
        let params = Params::default();
        let goal = Goal::new(5.0, 0.0, 0.0);
        let traj = Trajectory::generate(1.0, 0.0, &params);

        // Put an obstacle exactly on the 5th state
        let obs = ObstacleSet::from_points(vec![traj.states()[4].position()]);
        let eval = CostEvaluator::new(&params, &goal, &obs, None, 0.8);

        let cost = eval.evaluate(&traj);
        assert_eq!(cost.obstacle, COLLISION_COST);
        assert!(cost.collision);
        assert!(!cost.is_admissible());
        assert!(eval.check_collision(&traj));
    }

    #[test]
    fn test_grazing_obstacle_not_admissible() {
        let params = Params::default();
        let goal = Goal::new(5.0, 0.0, 0.0);
        let traj = Trajectory::stationary(&params);

        // Clear of the robot, but close enough that the clearance cost passes the sentinel
        let obs = ObstacleSet::from_points(vec![Point2::new(0.0, 1e-7)]);
        let eval = CostEvaluator::new(&params, &goal, &obs, None, 0.8);

        let cost = eval.evaluate(&traj);
        assert!(!cost.collision);
        assert!(cost.total >= COLLISION_COST);
        assert!(!cost.is_admissible());

        // Further away it can be selected
        let obs = ObstacleSet::from_points(vec![Point2::new(0.0, 0.5)]);
        let eval = CostEvaluator::new(&params, &goal, &obs, None, 0.8);
        assert!(eval.evaluate(&traj).is_admissible());
    }

    #[test]
    fn test_footprint_clearance() {
        let params = Params::default();
        let goal = Goal::new(5.0, 0.0, 0.0);
        let fp = Footprint::new(&[[0.2, 0.2], [-0.2, 0.2], [-0.2, -0.2], [0.2, -0.2]]).unwrap();
        let traj = Trajectory::stationary(&params);

        // 1 m from the centre is 0.8 m from the front edge
        let obs = ObstacleSet::from_points(vec![Point2::new(1.0, 0.0)]);
        let eval = CostEvaluator::new(&params, &goal, &obs, Some(&fp), 0.8);
        let cost = eval.evaluate(&traj);
        assert!((cost.obstacle - 1.0 / 0.8).abs() < 1e-9);
        assert!(!eval.check_collision(&traj));

        // Inside the footprint
        let obs = ObstacleSet::from_points(vec![Point2::new(0.1, 0.0)]);
        let eval = CostEvaluator::new(&params, &goal, &obs, Some(&fp), 0.8);
        assert!(eval.evaluate(&traj).collision);
        assert!(eval.check_collision(&traj));
    }
}
