//! Simulation configuration from environment.

use anyhow::Result;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Simulation ticks per second
    pub tick_hz: f64,
    pub visual_speed: f64,
    /// Give up after this many simulated seconds
    pub max_seconds: f64,
    pub log_json: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            visual_speed: 1.0,
            max_seconds: 600.0,
            log_json: false,
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unparsable or non-positive values
    /// fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let positive = |key: &str, default: f64| {
            lookup(key)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(default)
        };

        Self {
            tick_hz: positive("FLIGHT_TICK_HZ", defaults.tick_hz),
            visual_speed: positive("FLIGHT_VISUAL_SPEED", defaults.visual_speed),
            max_seconds: positive("FLIGHT_MAX_SECONDS", defaults.max_seconds),
            log_json: lookup("FLIGHT_LOG_JSON")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.log_json),
        }
    }

    pub fn tick_interval_s(&self) -> f64 {
        1.0 / self.tick_hz
    }
}

/// Directives used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_DIRECTIVES: &str = "flightpath_core=info,flightpath_cli=info";

/// `RUST_LOG` directives win outright; the defaults only fill the gap.
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVES))
}

/// Install the global tracing subscriber (`RUST_LOG` aware).
pub fn init_tracing(json: bool) -> Result<()> {
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(rust_log.as_deref());

    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init()?;
    }
    Ok(())
}
