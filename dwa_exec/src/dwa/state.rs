//! Planner module state and mode machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

// Internal
use super::{
    viz, CostEvaluator, Cost, DwaError, Footprint, ObstacleSet, Params, Trajectory, Window,
};
use comms_if::{
    cmd::Twist,
    viz::{Marker, MarkerArray, Polygon, TrajectoryKind},
};
use util::{
    archive::{Archived, Archiver},
    maths::clamp,
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A goal pose in the robot frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Heading the robot should finish at, in [-pi, pi].
    ///
    /// Units: radians
    pub yaw_rad: f64,
}

/// DWA planner module state.
#[derive(Default)]
pub struct DwaPlanner {
    params: Params,

    /// Frame all outputs are expressed in
    robot_frame: String,

    /// Executing mode
    mode: PlannerMode,

    report: StatusReport,
    cmd: Twist,
    finished: bool,
    time_s: f64,

    arch: Archiver,
}

/// Data needed to initialise the planner.
pub struct InitData {
    pub params: Params,
    pub robot_frame: String,
}

/// Input data to the planner, a consistent snapshot of everything it needs for one cycle.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// Session time of the cycle, used for archiving.
    ///
    /// Units: seconds
    pub time_s: f64,

    pub goal: Goal,

    /// Current forward speed.
    ///
    /// Units: meters/second
    pub velocity_ms: f64,

    /// Current yaw rate.
    ///
    /// Units: radians/second
    pub yawrate_rads: f64,

    pub obstacles: ObstacleSet,

    /// Latest footprint, only used if the planner is configured to use one.
    pub footprint: Option<Footprint>,

    /// Override of the target velocity parameter.
    pub target_velocity_ms: Option<f64>,

    /// Override of the goal threshold parameter.
    pub goal_threshold_m: Option<f64>,
}

/// Output of one planner cycle.
#[derive(Debug, Clone, Default)]
pub struct OutputData {
    /// The velocity command to send to the robot.
    pub cmd: Twist,

    /// True on every cycle the robot is settled at the goal.
    pub finished: bool,

    /// Candidate trajectories considered this cycle.
    pub candidates: MarkerArray,

    /// The trajectory the command was taken from.
    pub selected: Option<Marker>,

    /// The footprint at the end of the selected trajectory, if a footprint is used.
    pub predicted_footprint: Option<Polygon>,
}

/// Status report for planner processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub mode: PlannerMode,

    /// Kind of the trajectories produced this cycle
    pub kind: Option<TrajectoryKind>,

    pub window: Window,

    /// Number of trajectories evaluated by the search
    pub num_candidates: usize,

    /// Number of evaluated trajectories which collide
    pub num_colliding: usize,

    /// Cost of the selected trajectory, `None` outside of a search
    pub best_cost: Option<Cost>,

    /// Units: meters
    pub dist_to_goal_m: f64,

    /// Units: radians
    pub bearing_rad: f64,
}

/// Everything the mode transition depends on, other than collisions.
#[derive(Debug, Clone, Copy)]
pub struct ModeInputs {
    pub dist_to_goal_m: f64,
    pub goal_threshold_m: f64,
    pub bearing_rad: f64,
    pub angle_to_goal_threshold_rad: f64,
    pub goal_yaw_rad: f64,
    pub turn_direction_threshold_rad: f64,
}

/// What a mode function produces.
struct ModeOutput {
    selected: Trajectory,
    candidates: Vec<Trajectory>,
    kind: TrajectoryKind,
}

/// Result of a dynamic window search.
pub struct SearchResult {
    /// Every evaluated trajectory, in sampling order
    pub candidates: Vec<Trajectory>,

    /// The selected trajectory, stationary if no candidate is admissible
    pub best: Trajectory,

    /// Cost of the selected trajectory, `None` if no candidate is admissible
    pub best_cost: Option<Cost>,

    /// Number of candidates which collide or cost at least `COLLISION_COST`
    pub num_colliding: usize,
}

#[derive(Serialize)]
struct ArchRecord {
    time_s: f64,
    mode: PlannerMode,
    linear_ms: f64,
    angular_rads: f64,
    finished: bool,
    num_candidates: usize,
    num_colliding: usize,
    to_goal_cost: f64,
    speed_cost: f64,
    obstacle_cost: f64,
    total_cost: f64,
    dist_to_goal_m: f64,
    bearing_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of the planner.
///
/// The mode is recomputed every cycle by [`next_mode`], the behaviour of each mode is handled by
/// a `mode_xyz` function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannerMode {
    /// Far from the goal, searching the dynamic window
    Seeking,

    /// Turning on the spot to face the goal before searching
    RotatingToFaceGoal,

    /// At the goal position, turning on the spot to the goal heading
    ArrivedAligning,

    /// At the goal position and heading, stopped
    Settled,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PlannerMode {
    fn default() -> Self {
        PlannerMode::Seeking
    }
}

impl ModeOutput {
    /// A single manoeuvre trajectory, shown as the only candidate.
    fn maneuver(traj: Trajectory) -> Self {
        Self {
            selected: traj.clone(),
            candidates: vec![traj],
            kind: TrajectoryKind::Maneuver,
        }
    }
}

impl Goal {
    pub fn new(x_m: f64, y_m: f64, yaw_rad: f64) -> Self {
        Self { x_m, y_m, yaw_rad }
    }

    /// Distance from the robot to the goal position.
    pub fn distance_m(&self) -> f64 {
        self.x_m.hypot(self.y_m)
    }

    /// Angle of the goal position off the robot's heading.
    pub fn bearing_rad(&self) -> f64 {
        self.y_m.atan2(self.x_m)
    }
}

/// Compute the planner mode for this cycle.
///
/// A robot which was aligning to the goal heading last cycle runs the approach again, even when
/// within the goal threshold. The latch is the previous mode, so it clears as soon as one
/// approach cycle has run.
///
/// `rotation_is_clear` is only called if a rotation towards the goal is being considered, and
/// must return true if turning on the spot towards the goal is collision free.
pub fn next_mode<F>(current: PlannerMode, inputs: &ModeInputs, rotation_is_clear: F) -> PlannerMode
where
    F: FnOnce() -> bool
{
    let approaching = inputs.dist_to_goal_m > inputs.goal_threshold_m
        || current == PlannerMode::ArrivedAligning;

    if approaching {
        if inputs.bearing_rad.abs() > inputs.angle_to_goal_threshold_rad && rotation_is_clear() {
            PlannerMode::RotatingToFaceGoal
        }
        else {
            PlannerMode::Seeking
        }
    }
    else if inputs.goal_yaw_rad.abs() > inputs.turn_direction_threshold_rad {
        PlannerMode::ArrivedAligning
    }
    else {
        PlannerMode::Settled
    }
}

/// Search the dynamic window for the cheapest admissible trajectory.
///
/// Velocities are sampled in ascending order, and for each velocity the yaw rates in ascending
/// order followed by a zero yaw rate if the window straddles zero. A later sample of equal cost
/// replaces an earlier one. Candidates which collide or cost at least `COLLISION_COST` are never
/// selected.
pub fn search(window: &Window, params: &Params, evaluator: &CostEvaluator) -> SearchResult {
    let yawrates = window.yawrate_samples(params.yawrate_samples);
    let zero_yawrate = if window.straddles_zero_yawrate() {
        Some(0.0)
    }
    else {
        None
    };

    let mut candidates = vec![];
    let mut best: Option<(usize, Cost)> = None;
    let mut num_colliding = 0;

    for v in window.velocity_samples(params.velocity_samples) {
        for w in yawrates.iter().copied().chain(zero_yawrate) {
            let traj = Trajectory::generate(v, w, params);
            let cost = evaluator.evaluate(&traj);

            trace!("v = {:.3}, w = {:.3}: {:?}", v, w, cost);

            if !cost.is_admissible() {
                num_colliding += 1;
            }
            else if best.map_or(true, |(_, c)| cost.total <= c.total) {
                best = Some((candidates.len(), cost));
            }

            candidates.push(traj);
        }
    }

    let (best, best_cost) = match best {
        Some((i, cost)) => (candidates[i].clone(), Some(cost)),
        None => (Trajectory::stationary(params), None),
    };

    SearchResult {
        candidates,
        best,
        best_cost,
        num_colliding,
    }
}

impl DwaPlanner {
    /// Create a new planner outside of a session.
    pub fn new(init_data: InitData) -> Result<Self, DwaError> {
        let mut planner = Self::default();
        planner.init(init_data, None)?;
        Ok(planner)
    }

    pub fn mode(&self) -> PlannerMode {
        self.mode
    }

    /// Mode turning on the spot to face the goal.
    fn mode_rotate_to_goal(&self, input: &InputData) -> ModeOutput {
        let yawrate = self.clamp_yawrate(input.goal.bearing_rad());

        ModeOutput::maneuver(Trajectory::generate(0.0, yawrate, &self.params))
    }

    /// Mode searching the dynamic window.
    fn mode_seeking(
        &self,
        input: &InputData,
        evaluator: &CostEvaluator,
        report: &mut StatusReport,
    ) -> ModeOutput {
        let window = Window::calculate(input.velocity_ms, input.yawrate_rads, &self.params);
        let result = search(&window, &self.params, evaluator);

        report.window = window;
        report.num_candidates = result.candidates.len();
        report.num_colliding = result.num_colliding;
        report.best_cost = result.best_cost;

        let kind = match result.best_cost {
            Some(c) => {
                debug!(
                    "Best of {} candidates: goal {:.4}, speed {:.4}, obs {:.4}, total {:.4}",
                    result.candidates.len(),
                    c.to_goal,
                    c.speed,
                    c.obstacle,
                    c.total
                );
                TrajectoryKind::Search
            }
            None => {
                debug!(
                    "All {} candidates collide, forcing a stop",
                    result.candidates.len()
                );
                TrajectoryKind::ForcedStop
            }
        };

        ModeOutput {
            selected: result.best,
            candidates: result.candidates,
            kind,
        }
    }

    /// Mode turning on the spot to the goal heading.
    fn mode_arrived_aligning(&self, input: &InputData) -> ModeOutput {
        let yawrate = self.clamp_yawrate(input.goal.yaw_rad);

        ModeOutput::maneuver(Trajectory::generate(0.0, yawrate, &self.params))
    }

    /// Mode stopped at the goal.
    fn mode_settled(&self) -> ModeOutput {
        ModeOutput::maneuver(Trajectory::stationary(&self.params))
    }

    fn clamp_yawrate(&self, yawrate_rads: f64) -> f64 {
        clamp(
            &yawrate_rads,
            &-self.params.max_yawrate_rads,
            &self.params.max_yawrate_rads,
        )
    }
}

impl State for DwaPlanner {
    type InitData = InitData;
    type InitError = DwaError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DwaError;

    /// Initialise the planner.
    ///
    /// The static footprint, if there is one, is checked here so that a bad footprint stops the
    /// executable before it starts.
    fn init(&mut self, init_data: Self::InitData, session: Option<&Session>) -> Result<(), DwaError> {
        init_data.params.validate()?;

        if let Some(ref points) = init_data.params.footprint {
            Footprint::new(points).map_err(DwaError::InvalidFootprint)?;
        }

        self.params = init_data.params;
        self.robot_frame = init_data.robot_frame;
        self.mode = PlannerMode::Seeking;

        if let Some(s) = session {
            self.arch = Archiver::from_path(s, "dwa/planner.csv")
                .map_err(|e| DwaError::ArchiveInitError(e.to_string()))?;
        }

        Ok(())
    }

    /// Run one planner cycle.
    fn proc(&mut self, input: &InputData) -> Result<(OutputData, StatusReport), DwaError> {
        // Setup cycle data
        self.time_s = input.time_s;
        let mut report = StatusReport::default();

        let footprint = match (self.params.use_footprint, input.footprint.as_ref()) {
            (true, Some(fp)) => Some(fp),
            (true, None) => return Err(DwaError::FootprintMissing),
            (false, _) => None,
        };
        let target_velocity_ms = input
            .target_velocity_ms
            .unwrap_or(self.params.target_velocity_ms);

        let evaluator = CostEvaluator::new(
            &self.params,
            &input.goal,
            &input.obstacles,
            footprint,
            target_velocity_ms,
        );

        let mode_inputs = ModeInputs {
            dist_to_goal_m: input.goal.distance_m(),
            goal_threshold_m: input.goal_threshold_m.unwrap_or(self.params.goal_threshold_m),
            bearing_rad: input.goal.bearing_rad(),
            angle_to_goal_threshold_rad: self.params.angle_to_goal_threshold_rad,
            goal_yaw_rad: input.goal.yaw_rad,
            turn_direction_threshold_rad: self.params.turn_direction_threshold_rad,
        };

        report.dist_to_goal_m = mode_inputs.dist_to_goal_m;
        report.bearing_rad = mode_inputs.bearing_rad;

        // The rotation is checked at the yaw rate it would be commanded at
        let rotation_yawrate = self.clamp_yawrate(mode_inputs.bearing_rad);
        let next = next_mode(self.mode, &mode_inputs, || {
            !evaluator.check_collision(&Trajectory::generate(0.0, rotation_yawrate, &self.params))
        });

        if next != self.mode {
            info!("Planner mode {:?} -> {:?}", self.mode, next);
        }

        // Mode execution. Each of the mode functions returns the selected trajectory and the
        // candidates to display.
        let mode_output = match next {
            PlannerMode::RotatingToFaceGoal => self.mode_rotate_to_goal(input),
            PlannerMode::Seeking => self.mode_seeking(input, &evaluator, &mut report),
            PlannerMode::ArrivedAligning => self.mode_arrived_aligning(input),
            PlannerMode::Settled => self.mode_settled(),
        };

        let first = mode_output.selected.first();
        let cmd = Twist::new(first.velocity_ms, first.yawrate_rads);

        trace!("Planner command: {:?}", cmd);

        let predicted_footprint = footprint.map(|fp| {
            viz::predicted_footprint(&fp.transform(mode_output.selected.last()), &self.robot_frame)
        });

        let output = OutputData {
            cmd,
            finished: next == PlannerMode::Settled,
            candidates: viz::candidate_markers(
                &mode_output.candidates,
                mode_output.kind,
                &self.robot_frame,
            ),
            selected: Some(viz::selected_marker(&mode_output.selected, &self.robot_frame)),
            predicted_footprint,
        };

        report.mode = next;
        report.kind = Some(mode_output.kind);

        self.mode = next;
        self.cmd = cmd;
        self.finished = output.finished;
        self.report = report;

        Ok((output, report))
    }
}

impl Archived for DwaPlanner {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let cost = self.report.best_cost.unwrap_or_default();

        self.arch.serialise(ArchRecord {
            time_s: self.time_s,
            mode: self.report.mode,
            linear_ms: self.cmd.linear_ms,
            angular_rads: self.cmd.angular_rads,
            finished: self.finished,
            num_candidates: self.report.num_candidates,
            num_colliding: self.report.num_colliding,
            to_goal_cost: cost.to_goal,
            speed_cost: cost.speed,
            obstacle_cost: cost.obstacle,
            total_cost: cost.total,
            dist_to_goal_m: self.report.dist_to_goal_m,
            bearing_rad: self.report.bearing_rad,
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::viz::MAX_CANDIDATE_MARKERS;
    use nalgebra::Point2;

    fn planner(params: Params) -> DwaPlanner {
        DwaPlanner::new(InitData {
            params,
            robot_frame: String::from("base_link"),
        })
        .unwrap()
    }

    fn input(goal: Goal, obstacles: ObstacleSet) -> InputData {
        InputData {
            goal,
            obstacles,
            ..Default::default()
        }
    }

    fn mode_inputs(dist: f64, bearing: f64, goal_yaw: f64) -> ModeInputs {
        ModeInputs {
            dist_to_goal_m: dist,
            goal_threshold_m: 0.3,
            bearing_rad: bearing,
            angle_to_goal_threshold_rad: 1.0,
            goal_yaw_rad: goal_yaw,
            turn_direction_threshold_rad: 0.5,
        }
    }

    #[test]
    fn test_transition_table() {
        use PlannerMode::*;

        // Far, facing the goal
        assert_eq!(next_mode(Seeking, &mode_inputs(5.0, 0.1, 0.0), || true), Seeking);

        // Far, goal off to the side, rotation clear or blocked
        assert_eq!(
            next_mode(Seeking, &mode_inputs(5.0, 2.0, 0.0), || true),
            RotatingToFaceGoal
        );
        assert_eq!(next_mode(Seeking, &mode_inputs(5.0, 2.0, 0.0), || false), Seeking);

        // Rotating to face the goal does not hold once the goal is within the threshold
        assert_eq!(
            next_mode(RotatingToFaceGoal, &mode_inputs(0.1, 2.0, 0.0), || true),
            Settled
        );

        // Arrived
        assert_eq!(next_mode(Seeking, &mode_inputs(0.1, 2.0, 1.0), || true), ArrivedAligning);
        assert_eq!(next_mode(Seeking, &mode_inputs(0.1, 2.0, 0.2), || true), Settled);
        assert_eq!(next_mode(Settled, &mode_inputs(0.1, 0.0, 0.0), || true), Settled);

        // Aligning runs the approach on the next cycle, whatever the distance
        assert_eq!(
            next_mode(ArrivedAligning, &mode_inputs(0.1, 2.0, 1.0), || true),
            RotatingToFaceGoal
        );
        assert_eq!(next_mode(ArrivedAligning, &mode_inputs(0.1, 0.2, 1.0), || true), Seeking);
        assert_eq!(next_mode(ArrivedAligning, &mode_inputs(0.1, 0.2, 0.2), || true), Seeking);

        // Leaving the goal restarts the approach
        assert_eq!(next_mode(Settled, &mode_inputs(1.0, 0.0, 0.0), || true), Seeking);
    }

    #[test]
    fn test_rotation_check_is_lazy() {
        let mut called = false;
        next_mode(PlannerMode::Seeking, &mode_inputs(5.0, 0.1, 0.0), || {
            called = true;
            true
        });
        assert!(!called);
    }

    #[test]
    fn test_settled_at_goal() {
        let mut p = planner(Params::default());

        let (out, rpt) = p
            .proc(&input(Goal::new(0.0, 0.0, 0.0), ObstacleSet::default()))
            .unwrap();

        assert!(out.cmd.is_neutral());
        assert!(out.finished);
        assert_eq!(rpt.mode, PlannerMode::Settled);
        assert_eq!(out.candidates.markers.len(), MAX_CANDIDATE_MARKERS);
        assert_eq!(out.candidates.num_added(), 1);
    }

    #[test]
    fn test_aligning_at_goal() {
        let mut p = planner(Params::default());

        let (out, rpt) = p
            .proc(&input(Goal::new(0.1, 0.0, -2.0), ObstacleSet::default()))
            .unwrap();

        assert_eq!(rpt.mode, PlannerMode::ArrivedAligning);
        assert_eq!(out.cmd.linear_ms, 0.0);
        assert_eq!(out.cmd.angular_rads, -0.8);
        assert!(!out.finished);
    }

    #[test]
    fn test_aligning_runs_approach_next_cycle() {
        let mut p = planner(Params::default());
        let data = input(Goal::new(0.1, 0.0, -2.0), ObstacleSet::default());

        let (_, rpt) = p.proc(&data).unwrap();
        assert_eq!(rpt.mode, PlannerMode::ArrivedAligning);

        // Goal dead ahead, so the approach searches
        let (out, rpt) = p.proc(&data).unwrap();
        assert_eq!(rpt.mode, PlannerMode::Seeking);
        assert_eq!(rpt.kind, Some(TrajectoryKind::Search));
        assert!(!out.finished);

        // The latch has cleared, the heading is corrected again
        let (out, rpt) = p.proc(&data).unwrap();
        assert_eq!(rpt.mode, PlannerMode::ArrivedAligning);
        assert_eq!(out.cmd, Twist::new(0.0, -0.8));
    }

    #[test]
    fn test_drives_straight_to_goal() {
        let mut p = planner(Params::default());

        let (out, rpt) = p
            .proc(&input(Goal::new(5.0, 0.0, 0.0), ObstacleSet::default()))
            .unwrap();

        assert_eq!(rpt.mode, PlannerMode::Seeking);
        assert_eq!(rpt.kind, Some(TrajectoryKind::Search));
        assert!(out.cmd.linear_ms > 0.0);
        assert!(out.cmd.angular_rads.abs() < 1e-9);
        assert!(!out.finished);

        // 4 velocities x (21 yaw rates + injected zero)
        assert_eq!(rpt.num_candidates, 88);
        assert_eq!(out.candidates.num_added(), 88);
        assert_eq!(rpt.num_colliding, 0);
    }

    #[test]
    fn test_obstacle_ahead() {
        let mut params = Params::default();
        params.velocity_samples = 2;
        let mut p = planner(params.clone());

        // Driving at 0.5 m/s, put an obstacle 0.5 m ahead on the straight trajectory the search
        // will sample
        let window = Window::calculate(0.5, 0.0, &params);
        let v = window.velocity_samples(params.velocity_samples)[1];
        let straight = Trajectory::generate(v, 0.0, &params);
        let obs = ObstacleSet::from_points(vec![straight.states()[9].position()]);
        assert!((obs.points()[0].x - 0.5).abs() < 1e-6);

        let goal = Goal::new(5.0, 0.0, 0.0);
        let evaluator = CostEvaluator::new(&params, &goal, &obs, None, 0.8);
        assert_eq!(evaluator.evaluate(&straight).obstacle, crate::dwa::COLLISION_COST);

        let mut data = input(goal, obs);
        data.velocity_ms = 0.5;
        let (out, rpt) = p.proc(&data).unwrap();

        assert_eq!(rpt.mode, PlannerMode::Seeking);
        assert!(rpt.num_colliding > 0);
        assert_ne!(out.cmd, Twist::new(v, 0.0));
    }

    #[test]
    fn test_forced_stop_when_boxed_in() {
        let mut params = Params::default();
        params.use_footprint = true;
        let mut p = planner(params);

        // Obstacle at the robot centre, every trajectory starts on top of it
        let mut data = input(
            Goal::new(5.0, 0.0, 0.0),
            ObstacleSet::from_points(vec![Point2::new(0.0, 0.0)]),
        );
        data.footprint =
            Some(Footprint::new(&[[0.3, 0.3], [-0.3, 0.3], [-0.3, -0.3], [0.3, -0.3]]).unwrap());

        let (out, rpt) = p.proc(&data).unwrap();

        assert!(out.cmd.is_neutral());
        assert!(!out.finished);
        assert_eq!(rpt.kind, Some(TrajectoryKind::ForcedStop));
        assert_eq!(rpt.num_colliding, rpt.num_candidates);
        assert!(rpt.best_cost.is_none());
        assert_eq!(out.candidates.num_added(), rpt.num_candidates);
    }

    #[test]
    fn test_forced_stop_when_grazing() {
        let mut params = Params::default();
        params.max_velocity_ms = 0.0;
        let mut p = planner(params);

        // Only rotations on the spot are reachable, and all of them pass within 1e-7 m of the
        // obstacle without touching it
        let (out, rpt) = p
            .proc(&input(
                Goal::new(5.0, 0.0, 0.0),
                ObstacleSet::from_points(vec![Point2::new(0.0, 1e-7)]),
            ))
            .unwrap();

        assert!(out.cmd.is_neutral());
        assert_eq!(rpt.kind, Some(TrajectoryKind::ForcedStop));
        assert_eq!(rpt.num_colliding, rpt.num_candidates);
        assert!(rpt.best_cost.is_none());
    }

    #[test]
    fn test_search_tie_break() {
        let mut params = Params::default();
        params.to_goal_cost_gain = 0.0;
        params.speed_cost_gain = 0.0;
        params.obs_cost_gain = 0.0;

        let goal = Goal::new(5.0, 0.0, 0.0);
        let obs = ObstacleSet::default();
        let eval = CostEvaluator::new(&params, &goal, &obs, None, 0.8);

        // From rest: v in [0, 0.1], w in [-0.2, 0.2], straddling zero
        let window = Window::calculate(0.0, 0.0, &params);
        assert!(window.straddles_zero_yawrate());

        let result = search(&window, &params, &eval);

        // Every candidate costs zero, so the last one sampled wins: the top velocity with the
        // injected zero yaw rate
        assert_eq!(result.candidates.len(), 88);
        assert_eq!(result.best_cost.map(|c| c.total), Some(0.0));

        let last = result.candidates[result.candidates.len() - 1].first();
        assert_eq!(result.best.first().velocity_ms, 0.1);
        assert_eq!(result.best.first().yawrate_rads, 0.0);
        assert_eq!(result.best.first(), last);
    }

    #[test]
    fn test_rotates_to_face_goal() {
        let mut params = Params::default();
        params.angle_to_goal_threshold_rad = 1.0;
        let mut p = planner(params);

        let (out, rpt) = p
            .proc(&input(Goal::new(-5.0, 0.1, 0.0), ObstacleSet::default()))
            .unwrap();

        assert_eq!(rpt.mode, PlannerMode::RotatingToFaceGoal);
        assert_eq!(out.cmd, Twist::new(0.0, 0.8));
        assert_eq!(rpt.kind, Some(TrajectoryKind::Maneuver));
    }

    #[test]
    fn test_rotation_vetoed_by_footprint() {
        let mut params = Params::default();
        params.angle_to_goal_threshold_rad = 1.0;
        params.use_footprint = true;
        let mut p = planner(params);

        // A long thin robot, with an obstacle just off the side of its nose so it cannot turn
        let fp = Footprint::new(&[[1.0, 0.1], [-0.2, 0.1], [-0.2, -0.1], [1.0, -0.1]]).unwrap();
        let obs = ObstacleSet::from_points(vec![Point2::new(0.9, 0.15)]);

        let mut data = input(Goal::new(-5.0, 0.1, 0.0), obs);
        data.footprint = Some(fp);

        let (out, rpt) = p.proc(&data).unwrap();

        assert_eq!(rpt.mode, PlannerMode::Seeking);
        assert!(out.predicted_footprint.is_some());
    }

    #[test]
    fn test_missing_footprint() {
        let mut params = Params::default();
        params.use_footprint = true;
        let mut p = planner(params);

        assert!(matches!(
            p.proc(&input(Goal::new(5.0, 0.0, 0.0), ObstacleSet::default())),
            Err(DwaError::FootprintMissing)
        ));
    }

    #[test]
    fn test_invalid_static_footprint() {
        let mut params = Params::default();
        params.footprint = Some(vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0]]);

        assert!(matches!(
            DwaPlanner::new(InitData {
                params,
                robot_frame: String::from("base_link")
            }),
            Err(DwaError::InvalidFootprint(_))
        ));
    }
}
