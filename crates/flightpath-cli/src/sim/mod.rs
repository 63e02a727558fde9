//! Simulation module for waypoint flights.
//!
//! Provides the caller-side flight driver, a fixed-step frame loop and
//! built-in scenarios.

mod driver;
mod runner;
mod scenarios;

pub use driver::FlightDriver;
pub use runner::{run_flight, FlightSummary, RunOptions};
pub use scenarios::{
    create_random_scenario, create_ring_scenario, create_square_scenario, Scenario,
};
