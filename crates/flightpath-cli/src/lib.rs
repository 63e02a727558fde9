//! Flightpath CLI - simulation tools for waypoint flight plans.
//!
//! This crate provides:
//! - simulate_flight: fly a built-in scenario and print telemetry
//! - convert_coords: convert single points between geodetic and scene frames

pub mod config;
pub mod sim;

pub use config::{init_tracing, SimConfig};
