//! Fixed-step frame loop around a [`FlightDriver`].

use super::FlightDriver;
use anyhow::Result;
use chrono::{DateTime, Utc};
use flightpath_core::{FlightTelemetry, TickOutcome};
use serde::Serialize;
use std::time::Duration;
use tokio::time;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Simulated seconds per frame
    pub tick_interval_s: f64,
    /// Stop after this many simulated seconds
    pub max_seconds: f64,
    /// Pace frames against the wall clock
    pub realtime: bool,
}

/// Outcome of a simulated flight.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub scenario: String,
    pub waypoints: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub frames: u64,
    pub simulated_s: f64,
    pub completed: bool,
    pub flight_time_s: Option<f64>,
}

/// Start the flight and tick it until completion or `max_seconds`.
///
/// `on_telemetry` sees every frame that moved the drone.
pub async fn run_flight(
    driver: &mut FlightDriver,
    scenario: &str,
    options: &RunOptions,
    mut on_telemetry: impl FnMut(&FlightTelemetry),
) -> Result<FlightSummary> {
    let dt = options.tick_interval_s;
    anyhow::ensure!(
        dt.is_finite() && dt > 0.0,
        "tick interval must be positive, got {}",
        dt
    );
    anyhow::ensure!(
        options.max_seconds >= 0.0,
        "max duration must be non-negative, got {}",
        options.max_seconds
    );
    let mut interval = if options.realtime {
        let period = Duration::try_from_secs_f64(dt)?;
        anyhow::ensure!(
            !period.is_zero(),
            "tick interval {}s is below timer resolution",
            dt
        );
        Some(time::interval(period))
    } else {
        None
    };

    driver.start_flight()?;
    let started_at = Utc::now();
    tracing::info!(
        scenario,
        waypoints = driver.plan().len(),
        "starting simulated flight"
    );

    let mut frames = 0u64;
    let mut simulated_s = 0.0;

    while driver.is_flying() {
        if simulated_s >= options.max_seconds {
            tracing::warn!(simulated_s, "max duration reached, stopping flight");
            driver.stop_flight();
            break;
        }
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }

        frames += 1;
        simulated_s += dt;
        match driver.frame(dt)? {
            TickOutcome::Moving(telemetry) => on_telemetry(&telemetry),
            TickOutcome::Completed(_) | TickOutcome::Idle => {}
        }
    }

    let completion = driver.last_completion().copied();
    Ok(FlightSummary {
        scenario: scenario.to_string(),
        waypoints: driver.plan().len(),
        started_at,
        finished_at: Utc::now(),
        frames,
        simulated_s,
        completed: completion.is_some(),
        flight_time_s: completion.map(|c| c.flight_time_s),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::create_ring_scenario;
    use flightpath_core::{CoordinateMapper, FollowerConfig};

    fn ring_driver() -> FlightDriver {
        let scenario = create_ring_scenario().unwrap();
        FlightDriver::new(
            scenario.plan,
            CoordinateMapper::default(),
            FollowerConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ring_flight_completes() {
        let mut driver = ring_driver();
        driver.set_visual_speed(5.0).unwrap();
        let options = RunOptions {
            tick_interval_s: 0.05,
            max_seconds: 600.0,
            realtime: false,
        };

        let mut max_segment = 0;
        let summary = run_flight(&mut driver, "ring", &options, |t| {
            max_segment = max_segment.max(t.segment_index);
        })
        .await
        .unwrap();

        assert!(summary.completed);
        assert_eq!(summary.waypoints, 32);
        assert_eq!(max_segment, 30);
        assert!(summary.flight_time_s.unwrap() <= summary.simulated_s + 1e-9);
        assert!(!driver.is_flying());
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_flight_respects_max_duration() {
        let mut driver = ring_driver();
        let options = RunOptions {
            tick_interval_s: 0.1,
            max_seconds: 2.0,
            realtime: true,
        };

        let mut frames_seen = 0;
        let summary = run_flight(&mut driver, "ring", &options, |_| frames_seen += 1)
            .await
            .unwrap();

        assert!(!summary.completed);
        assert!(summary.flight_time_s.is_none());
        assert!(summary.frames >= 20 && summary.frames <= 21);
        assert_eq!(frames_seen as u64, summary.frames);
        assert!(!driver.is_flying());
    }

    #[tokio::test]
    async fn rejects_unusable_tick_interval() {
        let mut driver = ring_driver();
        for tick_interval_s in [0.0, -0.1, f64::NAN] {
            let options = RunOptions {
                tick_interval_s,
                max_seconds: 1.0,
                realtime: false,
            };
            let result = run_flight(&mut driver, "ring", &options, |_| {}).await;
            assert!(result.is_err(), "accepted interval {tick_interval_s}");
            assert!(!driver.is_flying());
        }

        let options = RunOptions {
            tick_interval_s: 1e-300,
            max_seconds: 1.0,
            realtime: true,
        };
        assert!(run_flight(&mut driver, "ring", &options, |_| {}).await.is_err());
    }

    #[tokio::test]
    async fn rejects_nan_max_duration() {
        let mut driver = ring_driver();
        let options = RunOptions {
            tick_interval_s: 0.1,
            max_seconds: f64::NAN,
            realtime: false,
        };
        assert!(run_flight(&mut driver, "ring", &options, |_| {}).await.is_err());
    }
}
