//! Error types for coordinate mapping, waypoint plans and path following.

use crate::models::Frame;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlightError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlightError {
    /// Non-finite or out-of-domain numeric input
    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: f64 },

    /// Reference latitude too close to a pole for the inverse projection
    #[error("reference latitude {latitude} is too close to a pole")]
    DegenerateReference { latitude: f64 },

    #[error("flight requires at least 2 waypoints, got {count}")]
    InsufficientWaypoints { count: usize },

    /// A sequence holds both geodetic and local waypoints
    #[error("waypoint sequence mixes geodetic and local frames")]
    MixedFrames,

    #[error("expected a {expected} waypoint, got {found}")]
    FrameMismatch { expected: Frame, found: Frame },

    #[error("reference index {index} out of range for {len} waypoints")]
    ReferenceIndexOutOfRange { index: usize, len: usize },

    #[error("segment {index} out of range ({segments} segments)")]
    SegmentOutOfRange { index: usize, segments: usize },

    #[error("waypoint not found: {0}")]
    WaypointNotFound(String),

    #[error("duplicate waypoint id: {0}")]
    DuplicateWaypoint(String),
}

/// Reject NaN and infinities before they reach interpolation math.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FlightError::InvalidInput { field, value })
    }
}
