//! CLI tool to fly a built-in waypoint scenario and print telemetry.
//!
//! Usage:
//!   cargo run -p flightpath-cli --bin simulate_flight -- --scenario square --json

use anyhow::Result;
use clap::{Parser, ValueEnum};
use flightpath_cli::sim::{
    create_random_scenario, create_ring_scenario, create_square_scenario, run_flight,
    FlightDriver, RunOptions,
};
use flightpath_cli::{init_tracing, SimConfig};
use flightpath_core::{CoordinateMapper, FollowerConfig, GeoReference};

/// Available scenarios
#[derive(Debug, Clone, ValueEnum)]
enum ScenarioType {
    /// 32-point loop around the central buildings (local frame)
    Ring,
    /// Closed square around the reference point (geodetic)
    Square,
    /// Random waypoints near the reference point (geodetic)
    Random,
}

/// Simulate a drone flying a waypoint plan
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Scenario to fly
    #[arg(long, value_enum, default_value = "ring")]
    scenario: ScenarioType,

    /// Reference latitude (default: Tokyo Station)
    #[arg(long, default_value_t = 35.6812, allow_hyphen_values = true)]
    lat: f64,

    /// Reference longitude (default: Tokyo Station)
    #[arg(long, default_value_t = 139.7671, allow_hyphen_values = true)]
    lon: f64,

    /// Side length of the square scenario in meters
    #[arg(long, default_value_t = 300.0)]
    side: f64,

    /// Number of waypoints in the random scenario
    #[arg(long, default_value_t = 6)]
    count: usize,

    /// Frame rate in Hz [env: FLIGHT_TICK_HZ]
    #[arg(long)]
    rate: Option<f64>,

    /// Visual speed multiplier [env: FLIGHT_VISUAL_SPEED]
    #[arg(long)]
    visual_speed: Option<f64>,

    /// Give up after this many simulated seconds [env: FLIGHT_MAX_SECONDS]
    #[arg(long)]
    max_seconds: Option<f64>,

    /// Pace frames against the wall clock
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Print one telemetry line per this many frames
    #[arg(long, default_value_t = 30)]
    every: u64,

    /// Emit telemetry and summary as JSON lines
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = SimConfig::from_env();
    if let Some(rate) = args.rate {
        config.tick_hz = rate;
    }
    if let Some(visual_speed) = args.visual_speed {
        config.visual_speed = visual_speed;
    }
    if let Some(max_seconds) = args.max_seconds {
        config.max_seconds = max_seconds;
    }
    anyhow::ensure!(
        config.tick_hz.is_finite() && config.tick_hz > 0.0,
        "rate must be positive, got {}",
        config.tick_hz
    );

    init_tracing(config.log_json)?;

    let reference = GeoReference::new(args.lat, args.lon);
    let scenario = match args.scenario {
        ScenarioType::Ring => create_ring_scenario()?,
        ScenarioType::Square => create_square_scenario(reference, args.side)?,
        ScenarioType::Random => create_random_scenario(reference, args.count)?,
    };

    let mut driver = FlightDriver::new(
        scenario.plan.clone(),
        CoordinateMapper::default(),
        FollowerConfig::default(),
    )?;
    driver.set_visual_speed(config.visual_speed)?;

    if !args.json {
        println!("Flying scenario '{}'", scenario.name);
        println!("  Waypoints: {}", scenario.plan.len());
        println!(
            "  Rate: {}Hz, Visual speed: {}x, Max: {}s",
            config.tick_hz, config.visual_speed, config.max_seconds
        );
        println!();
    }

    let options = RunOptions {
        tick_interval_s: config.tick_interval_s(),
        max_seconds: config.max_seconds,
        realtime: args.realtime,
    };

    let every = args.every.max(1);
    let json = args.json;
    let mut frame = 0u64;
    let summary = run_flight(&mut driver, &scenario.name, &options, |t| {
        frame += 1;
        if frame % every != 0 {
            return;
        }
        if json {
            match serde_json::to_string(t) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("failed to encode telemetry: {}", e),
            }
        } else {
            println!(
                "[{:6.2}s] wp {:2}/{:2} seg {:5.1}% total {:5.1}% pos ({:7.2}, {:6.2}, {:7.2}) hdg {:5.1} spd {:4.1}km/h",
                t.flight_time_s,
                t.segment_index + 1,
                t.total_waypoints,
                t.segment_progress * 100.0,
                t.overall_progress_pct,
                t.position.x,
                t.position.y,
                t.position.z,
                t.pose().heading_deg(),
                t.current_speed_kmh,
            );
        }
    })
    .await?;

    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!();
        println!(
            "Flight {} after {} frames ({:.2}s simulated)",
            if summary.completed { "completed" } else { "stopped" },
            summary.frames,
            summary.simulated_s
        );
        println!("  Started:  {}", summary.started_at.to_rfc3339());
        println!("  Finished: {}", summary.finished_at.to_rfc3339());
    }

    Ok(())
}
