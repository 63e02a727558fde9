//! Tunable constants for scene projection and path following.

use crate::error::{ensure_finite, FlightError, Result};
use serde::{Deserialize, Serialize};

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters to scene units on the horizontal axes.
pub const HORIZONTAL_SCALE: f64 = 0.01;
/// Meters of altitude to scene units in the geodetic frame.
pub const VERTICAL_SCALE: f64 = 0.01;
/// Altitude compression for the local frame.
pub const LOCAL_VERTICAL_SCALE: f64 = 0.5;
/// Lowest altitude produced when converting a scene click back to a waypoint.
pub const MIN_WAYPOINT_ALTITUDE_M: f64 = 10.0;
/// Beyond this |latitude| the inverse projection divides by ~0.
pub const MAX_REFERENCE_LATITUDE_DEG: f64 = 89.99;

/// Maps km/h onto a plausible scene-units-per-second traversal rate.
pub const BASE_SPEED_COEFFICIENT: f64 = 0.3;
/// Per-segment speed ceiling, whatever the stored waypoint speed.
pub const MAX_SEGMENT_SPEED_KMH: f64 = 20.0;
/// Floor on segment length in the progress increment denominator.
///
/// Segments shorter than this take as long as a segment of this length.
pub const MIN_SEGMENT_DISTANCE: f64 = 1.0;
/// Speed given to waypoints created from scene clicks.
pub const CLICK_WAYPOINT_SPEED_KMH: f64 = 5.0;

/// Scale factors between meters and scene units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneScale {
    pub horizontal: f64,
    pub vertical: f64,
    pub local_vertical: f64,
    pub min_altitude_m: f64,
}

impl Default for SceneScale {
    fn default() -> Self {
        Self {
            horizontal: HORIZONTAL_SCALE,
            vertical: VERTICAL_SCALE,
            local_vertical: LOCAL_VERTICAL_SCALE,
            min_altitude_m: MIN_WAYPOINT_ALTITUDE_M,
        }
    }
}

impl SceneScale {
    /// Scales must be finite and positive; the altitude floor only finite.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("horizontal", self.horizontal)?;
        ensure_positive("vertical", self.vertical)?;
        ensure_positive("local_vertical", self.local_vertical)?;
        ensure_finite("min_altitude_m", self.min_altitude_m)?;
        Ok(())
    }
}

/// Configuration for the path follower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowerConfig {
    pub base_speed_coefficient: f64,
    /// Global speed-up/slow-down factor
    pub visual_speed_multiplier: f64,
    pub max_speed_kmh: f64,
    pub min_segment_distance: f64,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            base_speed_coefficient: BASE_SPEED_COEFFICIENT,
            visual_speed_multiplier: 1.0,
            max_speed_kmh: MAX_SEGMENT_SPEED_KMH,
            min_segment_distance: MIN_SEGMENT_DISTANCE,
        }
    }
}

impl FollowerConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("base_speed_coefficient", self.base_speed_coefficient)?;
        ensure_positive("visual_speed_multiplier", self.visual_speed_multiplier)?;
        ensure_positive("max_speed_kmh", self.max_speed_kmh)?;
        ensure_positive("min_segment_distance", self.min_segment_distance)?;
        Ok(())
    }
}

fn ensure_positive(field: &'static str, value: f64) -> Result<f64> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(FlightError::InvalidInput { field, value });
    }
    Ok(value)
}
