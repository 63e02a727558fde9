//! Core data models for the flight planner.

use crate::error::{ensure_finite, FlightError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokyo Station, used as the reference before any geodetic waypoint exists.
pub const DEFAULT_REFERENCE: GeoReference = GeoReference {
    latitude: 35.6812,
    longitude: 139.7671,
};

/// Geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
    /// Meters
    pub altitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite("latitude", self.latitude)?;
        ensure_finite("longitude", self.longitude)?;
        ensure_finite("altitude", self.altitude)?;
        Ok(())
    }
}

/// Origin of the local scene frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoReference {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoReference {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite("reference latitude", self.latitude)?;
        ensure_finite("reference longitude", self.longitude)?;
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(FlightError::InvalidInput {
                field: "reference latitude",
                value: self.latitude,
            });
        }
        Ok(())
    }
}

impl Default for GeoReference {
    fn default() -> Self {
        DEFAULT_REFERENCE
    }
}

impl From<GeoPoint> for GeoReference {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.latitude, point.longitude)
    }
}

/// Waypoint position in the flat scene-local frame.
///
/// `east` maps to scene X, `north` to scene Z, and `altitude` (scaled) to scene Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPoint {
    pub east: f64,
    pub north: f64,
    pub altitude: f64,
}

impl LocalPoint {
    pub fn new(east: f64, north: f64, altitude: f64) -> Self {
        Self {
            east,
            north,
            altitude,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite("east", self.east)?;
        ensure_finite("north", self.north)?;
        ensure_finite("altitude", self.altitude)?;
        Ok(())
    }
}

/// Scene-local Cartesian coordinates (Y up).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CartesianPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CartesianPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance in scene units.
    pub fn distance_to(&self, other: &CartesianPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Per-axis linear interpolation toward `other`.
    pub fn lerp(&self, other: &CartesianPoint, t: f64) -> CartesianPoint {
        CartesianPoint {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite("x", self.x)?;
        ensure_finite("y", self.y)?;
        ensure_finite("z", self.z)?;
        Ok(())
    }
}

/// Which coordinate frame a waypoint lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    /// Latitude/longitude projected around a reference point
    Geodetic,
    /// Already in scene coordinates
    Local,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Geodetic => write!(f, "geodetic"),
            Frame::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "lowercase")]
pub enum WaypointPosition {
    Geodetic(GeoPoint),
    Local(LocalPoint),
}

impl WaypointPosition {
    pub fn frame(&self) -> Frame {
        match self {
            WaypointPosition::Geodetic(_) => Frame::Geodetic,
            WaypointPosition::Local(_) => Frame::Local,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            WaypointPosition::Geodetic(geo) => geo.validate(),
            WaypointPosition::Local(local) => local.validate(),
        }
    }
}

/// An ordered stop on the flight path.
///
/// Deserialization goes through [`Waypoint::with_id`], so decoded waypoints
/// carry the same guarantees as constructed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WaypointRecord")]
pub struct Waypoint {
    pub id: String,
    pub position: WaypointPosition,
    /// Travel speed toward the next waypoint (km/h, > 0)
    pub speed_kmh: f64,
    /// Degrees in [0, 360)
    pub heading_deg: f64,
}

#[derive(Deserialize)]
struct WaypointRecord {
    id: String,
    position: WaypointPosition,
    speed_kmh: f64,
    #[serde(default)]
    heading_deg: f64,
}

impl TryFrom<WaypointRecord> for Waypoint {
    type Error = FlightError;

    fn try_from(record: WaypointRecord) -> Result<Self> {
        Self::with_id(record.id, record.position, record.speed_kmh, record.heading_deg)
    }
}

impl Waypoint {
    /// Create a waypoint with a fresh unique id.
    pub fn new(position: WaypointPosition, speed_kmh: f64, heading_deg: f64) -> Result<Self> {
        Self::with_id(uuid::Uuid::new_v4().to_string(), position, speed_kmh, heading_deg)
    }

    pub fn with_id(
        id: impl Into<String>,
        position: WaypointPosition,
        speed_kmh: f64,
        heading_deg: f64,
    ) -> Result<Self> {
        position.validate()?;
        ensure_finite("speed_kmh", speed_kmh)?;
        if speed_kmh <= 0.0 {
            return Err(FlightError::InvalidInput {
                field: "speed_kmh",
                value: speed_kmh,
            });
        }
        ensure_finite("heading_deg", heading_deg)?;

        Ok(Self {
            id: id.into(),
            position,
            speed_kmh,
            heading_deg: normalize_degrees(heading_deg),
        })
    }

    pub fn geodetic(latitude: f64, longitude: f64, altitude: f64, speed_kmh: f64) -> Result<Self> {
        Self::new(
            WaypointPosition::Geodetic(GeoPoint::new(latitude, longitude, altitude)),
            speed_kmh,
            0.0,
        )
    }

    pub fn local(east: f64, north: f64, altitude: f64, speed_kmh: f64) -> Result<Self> {
        Self::new(
            WaypointPosition::Local(LocalPoint::new(east, north, altitude)),
            speed_kmh,
            0.0,
        )
    }

    pub fn frame(&self) -> Frame {
        self.position.frame()
    }
}

/// Follower input: a scene point plus the speed flown from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub position: CartesianPoint,
    pub speed_kmh: f64,
}

impl PathPoint {
    pub fn new(position: CartesianPoint, speed_kmh: f64) -> Self {
        Self {
            position,
            speed_kmh,
        }
    }
}

/// Position and yaw of the simulated drone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: CartesianPoint,
    /// Scene yaw, `atan2(dx, dz)`
    pub heading_rad: f64,
}

impl Pose {
    pub fn heading_deg(&self) -> f64 {
        normalize_degrees(self.heading_rad.to_degrees())
    }
}

/// Per-tick motion state of the simulated drone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightTelemetry {
    pub position: CartesianPoint,
    pub heading_rad: f64,
    pub segment_index: usize,
    pub total_waypoints: usize,
    /// Effective (clamped) speed in km/h
    pub current_speed_kmh: f64,
    pub segment_progress: f64,
    pub overall_progress_pct: f64,
    /// Scene units left on the current segment
    pub distance_to_next: f64,
    pub flight_time_s: f64,
}

impl FlightTelemetry {
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            heading_rad: self.heading_rad,
        }
    }
}

/// Normalize an angle in degrees into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_is_normalized_on_construction() {
        let wp = Waypoint::local(0.0, 0.0, 10.0, 15.0).unwrap();
        assert_eq!(wp.heading_deg, 0.0);

        let wp = Waypoint::new(
            WaypointPosition::Local(LocalPoint::new(0.0, 0.0, 10.0)),
            15.0,
            -90.0,
        )
        .unwrap();
        assert!((wp.heading_deg - 270.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_speed() {
        let err = Waypoint::geodetic(35.0, 139.0, 50.0, 0.0).unwrap_err();
        assert!(matches!(err, FlightError::InvalidInput { field: "speed_kmh", .. }));
    }

    #[test]
    fn rejects_non_finite_position() {
        let err = Waypoint::geodetic(f64::NAN, 139.0, 50.0, 10.0).unwrap_err();
        assert!(matches!(err, FlightError::InvalidInput { field: "latitude", .. }));
    }

    #[test]
    fn fresh_ids_are_unique() {
        let a = Waypoint::local(1.0, 2.0, 3.0, 10.0).unwrap();
        let b = Waypoint::local(1.0, 2.0, 3.0, 10.0).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn waypoint_position_serializes_with_frame_tag() {
        let wp = Waypoint::with_id(
            "wp-1",
            WaypointPosition::Geodetic(GeoPoint::new(35.0, 139.0, 50.0)),
            12.0,
            0.0,
        )
        .unwrap();
        let json = serde_json::to_value(&wp).unwrap();
        assert_eq!(json["position"]["frame"], "geodetic");
        assert_eq!(json["position"]["latitude"], 35.0);

        let back: Waypoint = serde_json::from_value(json).unwrap();
        assert_eq!(back, wp);
    }

    #[test]
    fn decoding_normalizes_heading() {
        let wp: Waypoint = serde_json::from_str(
            r#"{"id":"a","position":{"frame":"local","east":1.0,"north":2.0,"altitude":3.0},"speed_kmh":10.0,"heading_deg":370.0}"#,
        )
        .unwrap();
        assert!((wp.heading_deg - 10.0).abs() < 1e-9);

        let wp: Waypoint = serde_json::from_str(
            r#"{"id":"b","position":{"frame":"local","east":1.0,"north":2.0,"altitude":3.0},"speed_kmh":10.0}"#,
        )
        .unwrap();
        assert_eq!(wp.heading_deg, 0.0);
    }

    #[test]
    fn decoding_rejects_non_positive_speed() {
        let err = serde_json::from_str::<Waypoint>(
            r#"{"id":"a","position":{"frame":"local","east":1.0,"north":2.0,"altitude":3.0},"speed_kmh":0.0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("speed_kmh"), "{err}");
    }

    #[test]
    fn lerp_and_distance() {
        let a = CartesianPoint::new(0.0, 0.0, 0.0);
        let b = CartesianPoint::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert_eq!(a.lerp(&b, 0.5), CartesianPoint::new(1.5, 2.0, 0.0));
    }
}
