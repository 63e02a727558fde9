//! Scenario flights through the public driver API.

use flightpath_cli::sim::{create_square_scenario, run_flight, FlightDriver, RunOptions};
use flightpath_core::{
    CartesianPoint, CoordinateMapper, FollowerConfig, TickOutcome, DEFAULT_REFERENCE,
};

fn square_driver() -> FlightDriver {
    let scenario = create_square_scenario(DEFAULT_REFERENCE, 200.0).unwrap();
    FlightDriver::new(
        scenario.plan,
        CoordinateMapper::default(),
        FollowerConfig::default(),
    )
    .unwrap()
}

#[test]
fn square_flight_returns_to_start_after_completion() {
    let mut driver = square_driver();
    let start = driver.pose().position;
    assert_eq!(start, CartesianPoint::new(0.0, 0.5, 0.0));

    driver.start_flight().unwrap();
    let mut last_progress = 0.0;
    let mut completed = false;
    for _ in 0..100_000 {
        match driver.frame(1.0 / 60.0).unwrap() {
            TickOutcome::Moving(t) => {
                assert!(t.overall_progress_pct >= last_progress);
                last_progress = t.overall_progress_pct;
            }
            TickOutcome::Completed(done) => {
                completed = true;
                assert_eq!(done.total_waypoints, 5);
                assert!((done.pose.position.y - 0.9).abs() < 1e-9);
            }
            TickOutcome::Idle => break,
        }
    }

    assert!(completed);
    assert!(!driver.is_flying());
    assert_eq!(driver.pose().position, start);
}

#[test]
fn clicked_waypoint_lands_on_the_projected_path() {
    let mut driver = square_driver();
    let click = CartesianPoint::new(1.0, 0.75, 2.0);
    driver.insert_waypoint_on_segment(1, click, 5.0).unwrap();

    assert_eq!(driver.plan().len(), 6);
    let inserted = driver.path()[2];
    assert!((inserted.position.x - click.x).abs() < 1e-9);
    assert!((inserted.position.y - click.y).abs() < 1e-9);
    assert!((inserted.position.z - click.z).abs() < 1e-9);
    assert_eq!(inserted.speed_kmh, 5.0);
}

#[tokio::test]
async fn runner_reports_completion() {
    let mut driver = square_driver();
    driver.set_visual_speed(4.0).unwrap();
    let options = RunOptions {
        tick_interval_s: 0.02,
        max_seconds: 300.0,
        realtime: false,
    };

    let summary = run_flight(&mut driver, "square", &options, |_| {})
        .await
        .unwrap();
    assert!(summary.completed);
    assert_eq!(summary.scenario, "square");
    assert_eq!(summary.waypoints, 5);
    assert!(summary.finished_at >= summary.started_at);
}
