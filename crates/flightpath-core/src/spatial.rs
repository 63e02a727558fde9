//! Conversion between geographic coordinates and the local scene frame.

use crate::error::{FlightError, Result};
use crate::models::{
    CartesianPoint, Frame, GeoPoint, GeoReference, LocalPoint, Waypoint, WaypointPosition,
};
use crate::rules::{SceneScale, EARTH_RADIUS_M, MAX_REFERENCE_LATITUDE_DEG};

/// Bidirectional mapping anchored at a caller-supplied reference point.
///
/// Geodetic positions use an equirectangular approximation, which is only
/// accurate for short distances from the reference.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoordinateMapper {
    scale: SceneScale,
}

impl CoordinateMapper {
    /// Fails with [`FlightError::InvalidInput`] on a zero, negative or
    /// non-finite scale.
    pub fn new(scale: SceneScale) -> Result<Self> {
        scale.validate()?;
        Ok(Self { scale })
    }

    pub fn scale(&self) -> &SceneScale {
        &self.scale
    }

    /// Project a geographic point into the scene.
    ///
    /// # Arguments
    /// * `geo` - Point to project
    /// * `reference` - Geographic origin of the scene
    ///
    /// # Returns
    /// East-west displacement as X, scaled altitude as Y, north-south displacement as Z
    pub fn forward(&self, geo: &GeoPoint, reference: GeoReference) -> Result<CartesianPoint> {
        geo.validate()?;
        reference.validate()?;

        let east_m = lon_to_meters(geo.longitude - reference.longitude, reference.latitude);
        let north_m = lat_to_meters(geo.latitude - reference.latitude);

        Ok(CartesianPoint {
            x: east_m * self.scale.horizontal,
            y: geo.altitude * self.scale.vertical,
            z: north_m * self.scale.horizontal,
        })
    }

    /// Exact inverse of [`forward`](Self::forward), with the altitude floored
    /// at `min_altitude_m`.
    ///
    /// Fails with [`FlightError::DegenerateReference`] when the reference is
    /// within `MAX_REFERENCE_LATITUDE_DEG` of a pole.
    pub fn inverse(&self, point: &CartesianPoint, reference: GeoReference) -> Result<GeoPoint> {
        point.validate()?;
        reference.validate()?;
        if reference.latitude.abs() > MAX_REFERENCE_LATITUDE_DEG {
            return Err(FlightError::DegenerateReference {
                latitude: reference.latitude,
            });
        }

        let east_m = point.x / self.scale.horizontal;
        let north_m = point.z / self.scale.horizontal;
        let altitude_m = point.y / self.scale.vertical;

        Ok(GeoPoint {
            latitude: reference.latitude + meters_to_lat(north_m),
            longitude: reference.longitude + meters_to_lon(east_m, reference.latitude),
            altitude: altitude_m.max(self.scale.min_altitude_m),
        })
    }

    /// Place a local-frame point in the scene without any projection.
    pub fn local_to_scene(&self, local: &LocalPoint) -> Result<CartesianPoint> {
        local.validate()?;
        Ok(CartesianPoint {
            x: local.east,
            y: local.altitude * self.scale.local_vertical,
            z: local.north,
        })
    }

    /// Inverse of [`local_to_scene`](Self::local_to_scene).
    pub fn scene_to_local(&self, point: &CartesianPoint) -> Result<LocalPoint> {
        point.validate()?;
        Ok(LocalPoint {
            east: point.x,
            north: point.z,
            altitude: point.y / self.scale.local_vertical,
        })
    }

    /// Convert a whole waypoint sequence, preserving order and length.
    ///
    /// All waypoints must share one frame. Geodetic sequences are projected
    /// around the waypoint at `reference_index`; local sequences ignore it.
    pub fn convert_sequence(
        &self,
        waypoints: &[Waypoint],
        reference_index: usize,
    ) -> Result<Vec<CartesianPoint>> {
        let Some(first) = waypoints.first() else {
            return Ok(Vec::new());
        };
        let frame = first.frame();
        if waypoints.iter().any(|wp| wp.frame() != frame) {
            return Err(FlightError::MixedFrames);
        }

        match frame {
            Frame::Local => waypoints
                .iter()
                .map(|wp| match &wp.position {
                    WaypointPosition::Local(local) => self.local_to_scene(local),
                    WaypointPosition::Geodetic(_) => Err(FlightError::MixedFrames),
                })
                .collect(),
            Frame::Geodetic => {
                let reference = match waypoints.get(reference_index).map(|wp| &wp.position) {
                    Some(WaypointPosition::Geodetic(geo)) => GeoReference::from(*geo),
                    Some(WaypointPosition::Local(_)) => return Err(FlightError::MixedFrames),
                    None => {
                        return Err(FlightError::ReferenceIndexOutOfRange {
                            index: reference_index,
                            len: waypoints.len(),
                        })
                    }
                };
                self.convert_geodetic(waypoints, reference)
            }
        }
    }

    /// Project a geodetic sequence around an explicit reference.
    pub fn convert_geodetic(
        &self,
        waypoints: &[Waypoint],
        reference: GeoReference,
    ) -> Result<Vec<CartesianPoint>> {
        waypoints
            .iter()
            .map(|wp| match &wp.position {
                WaypointPosition::Geodetic(geo) => self.forward(geo, reference),
                WaypointPosition::Local(_) => Err(FlightError::FrameMismatch {
                    expected: Frame::Geodetic,
                    found: Frame::Local,
                }),
            })
            .collect()
    }
}

// ==== Equirectangular helpers ====

/// Convert degrees latitude to meters (spherical Earth).
pub fn lat_to_meters(deg: f64) -> f64 {
    deg.to_radians() * EARTH_RADIUS_M
}

/// Convert degrees longitude to meters at a given latitude.
pub fn lon_to_meters(deg: f64, ref_lat_deg: f64) -> f64 {
    deg.to_radians() * EARTH_RADIUS_M * ref_lat_deg.to_radians().cos()
}

/// Convert a north/south offset in meters to degrees latitude.
pub fn meters_to_lat(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_M).to_degrees()
}

/// Convert an east/west offset in meters to degrees longitude.
/// Callers must keep `ref_lat_deg` away from the poles.
pub fn meters_to_lon(meters: f64, ref_lat_deg: f64) -> f64 {
    (meters / (EARTH_RADIUS_M * ref_lat_deg.to_radians().cos())).to_degrees()
}
