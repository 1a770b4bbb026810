//! # DWA Planner Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use comms_if::msg::LaserScanMsg;
use dwa_lib::dwa::{
    search, CostEvaluator, DwaPlanner, Footprint, Goal, InitData, InputData, ObstacleSet, Params,
    Window,
};
use util::module::State;

fn dwa_benchmark(c: &mut Criterion) {
    // ---- Build a dense scan and footprint ----

    let mut params = Params::default();
    params.use_footprint = true;

    // A full circle of 720 readings with a wall 2 m ahead and open space elsewhere
    let num_ranges = 720;
    let angle_increment = std::f64::consts::TAU / num_ranges as f64;
    let ranges = (0..num_ranges)
        .map(|i| {
            let angle = -std::f64::consts::PI + i as f64 * angle_increment;
            if angle.cos() > 0.5 {
                2.0 / angle.cos()
            }
            else {
                5.0
            }
        })
        .collect();

    let obstacles = ObstacleSet::from_scan(
        &LaserScanMsg {
            angle_min: -std::f64::consts::PI,
            angle_increment,
            range_min: Some(0.05),
            range_max: Some(10.0),
            ranges,
        },
        true,
    );

    let footprint = Footprint::new(&[
        [0.4, 0.25],
        [-0.2, 0.25],
        [-0.3, 0.0],
        [-0.2, -0.25],
        [0.4, -0.25],
    ])
    .unwrap();

    let goal = Goal::new(4.0, 1.0, 0.0);

    // Bench the search on its own
    let window = Window::calculate(0.5, 0.0, &params);
    let evaluator = CostEvaluator::new(
        &params,
        &goal,
        &obstacles,
        Some(&footprint),
        params.target_velocity_ms,
    );

    c.bench_function("dwa::search", |b| {
        b.iter(|| search(&window, &params, &evaluator))
    });

    // Bench a full planner cycle, including the visualisation batch
    let mut planner = DwaPlanner::new(InitData {
        params: params.clone(),
        robot_frame: String::from("base_link"),
    })
    .unwrap();

    let input = InputData {
        goal,
        velocity_ms: 0.5,
        obstacles: obstacles.clone(),
        footprint: Some(footprint.clone()),
        ..Default::default()
    };

    c.bench_function("DwaPlanner::proc", |b| {
        b.iter(|| planner.proc(&input).unwrap())
    });
}

criterion_group!(benches, dwa_benchmark);
criterion_main!(benches);
