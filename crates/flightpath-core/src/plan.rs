//! Ordered waypoint sequence owned by the caller.

use crate::error::{FlightError, Result};
use crate::models::{
    CartesianPoint, Frame, GeoReference, PathPoint, Waypoint, WaypointPosition,
    DEFAULT_REFERENCE,
};
use crate::spatial::CoordinateMapper;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Flight order is the sequence order; every waypoint shares one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlanRecord")]
pub struct WaypointPlan {
    frame: Frame,
    waypoints: Vec<Waypoint>,
}

#[derive(Deserialize)]
struct PlanRecord {
    frame: Frame,
    waypoints: Vec<Waypoint>,
}

impl TryFrom<PlanRecord> for WaypointPlan {
    type Error = FlightError;

    fn try_from(record: PlanRecord) -> Result<Self> {
        Self::from_waypoints(record.frame, record.waypoints)
    }
}

impl WaypointPlan {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            waypoints: Vec::new(),
        }
    }

    pub fn from_waypoints(frame: Frame, waypoints: Vec<Waypoint>) -> Result<Self> {
        {
            let mut seen = HashSet::new();
            for wp in &waypoints {
                check_frame(frame, wp)?;
                if !seen.insert(wp.id.as_str()) {
                    return Err(FlightError::DuplicateWaypoint(wp.id.clone()));
                }
            }
        }
        Ok(Self { frame, waypoints })
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of segments between consecutive waypoints.
    pub fn segment_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    pub fn get(&self, id: &str) -> Option<&Waypoint> {
        self.waypoints.iter().find(|wp| wp.id == id)
    }

    pub fn push(&mut self, waypoint: Waypoint) -> Result<()> {
        self.check_new(&waypoint)?;
        self.waypoints.push(waypoint);
        Ok(())
    }

    /// Insert between waypoints `segment_index` and `segment_index + 1`.
    pub fn insert_after_segment(&mut self, segment_index: usize, waypoint: Waypoint) -> Result<()> {
        if segment_index >= self.segment_count() {
            return Err(FlightError::SegmentOutOfRange {
                index: segment_index,
                segments: self.segment_count(),
            });
        }
        self.check_new(&waypoint)?;
        self.waypoints.insert(segment_index + 1, waypoint);
        Ok(())
    }

    /// Replace the waypoint with `id` in place; the stored id is kept.
    pub fn update(&mut self, id: &str, mut waypoint: Waypoint) -> Result<()> {
        check_frame(self.frame, &waypoint)?;
        let slot = self
            .waypoints
            .iter_mut()
            .find(|wp| wp.id == id)
            .ok_or_else(|| FlightError::WaypointNotFound(id.to_string()))?;
        waypoint.id = slot.id.clone();
        *slot = waypoint;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Waypoint> {
        let index = self
            .waypoints
            .iter()
            .position(|wp| wp.id == id)
            .ok_or_else(|| FlightError::WaypointNotFound(id.to_string()))?;
        Ok(self.waypoints.remove(index))
    }

    /// Geographic origin for this plan.
    ///
    /// Geodetic plans are anchored at their first waypoint; empty and local
    /// plans fall back to [`DEFAULT_REFERENCE`].
    pub fn reference(&self) -> GeoReference {
        match self.waypoints.first().map(|wp| &wp.position) {
            Some(WaypointPosition::Geodetic(geo)) => GeoReference::from(*geo),
            _ => DEFAULT_REFERENCE,
        }
    }

    /// Turn a scene click into a waypoint in this plan's frame.
    ///
    /// The waypoint is returned, not inserted.
    pub fn waypoint_from_click(
        &self,
        mapper: &CoordinateMapper,
        point: &CartesianPoint,
        speed_kmh: f64,
    ) -> Result<Waypoint> {
        let position = match self.frame {
            Frame::Geodetic => WaypointPosition::Geodetic(mapper.inverse(point, self.reference())?),
            Frame::Local => WaypointPosition::Local(mapper.scene_to_local(point)?),
        };
        Waypoint::new(position, speed_kmh, 0.0)
    }

    /// Scene positions, one per waypoint, in order.
    pub fn project(&self, mapper: &CoordinateMapper) -> Result<Vec<CartesianPoint>> {
        match self.frame {
            Frame::Geodetic => mapper.convert_geodetic(&self.waypoints, self.reference()),
            Frame::Local => mapper.convert_sequence(&self.waypoints, 0),
        }
    }

    /// Follower input for the whole plan.
    pub fn path_points(&self, mapper: &CoordinateMapper) -> Result<Vec<PathPoint>> {
        let positions = self.project(mapper)?;
        Ok(positions
            .into_iter()
            .zip(&self.waypoints)
            .map(|(position, wp)| PathPoint::new(position, wp.speed_kmh))
            .collect())
    }

    fn check_new(&self, waypoint: &Waypoint) -> Result<()> {
        check_frame(self.frame, waypoint)?;
        if self.get(&waypoint.id).is_some() {
            return Err(FlightError::DuplicateWaypoint(waypoint.id.clone()));
        }
        Ok(())
    }
}

fn check_frame(expected: Frame, waypoint: &Waypoint) -> Result<()> {
    let found = waypoint.frame();
    if found != expected {
        return Err(FlightError::FrameMismatch { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::CLICK_WAYPOINT_SPEED_KMH;

    fn local_plan() -> WaypointPlan {
        let mut plan = WaypointPlan::new(Frame::Local);
        plan.push(Waypoint::with_id("a", local(0.0, 0.0), 15.0, 0.0).unwrap())
            .unwrap();
        plan.push(Waypoint::with_id("b", local(10.0, 0.0), 15.0, 0.0).unwrap())
            .unwrap();
        plan.push(Waypoint::with_id("c", local(10.0, 10.0), 15.0, 0.0).unwrap())
            .unwrap();
        plan
    }

    fn local(east: f64, north: f64) -> WaypointPosition {
        WaypointPosition::Local(crate::models::LocalPoint::new(east, north, 20.0))
    }

    fn ids(plan: &WaypointPlan) -> Vec<&str> {
        plan.iter().map(|wp| wp.id.as_str()).collect()
    }

    #[test]
    fn insert_after_segment_places_waypoint_between_endpoints() {
        let mut plan = local_plan();
        plan.insert_after_segment(0, Waypoint::with_id("ab", local(5.0, 0.0), 10.0, 0.0).unwrap())
            .unwrap();
        assert_eq!(ids(&plan), vec!["a", "ab", "b", "c"]);

        plan.insert_after_segment(2, Waypoint::with_id("bc", local(10.0, 5.0), 10.0, 0.0).unwrap())
            .unwrap();
        assert_eq!(ids(&plan), vec!["a", "ab", "b", "bc", "c"]);
    }

    #[test]
    fn insert_after_last_segment_is_out_of_range() {
        let mut plan = local_plan();
        let err = plan
            .insert_after_segment(2, Waypoint::local(1.0, 1.0, 1.0, 5.0).unwrap())
            .unwrap_err();
        assert_eq!(err, FlightError::SegmentOutOfRange { index: 2, segments: 2 });
    }

    #[test]
    fn update_replaces_in_place_and_keeps_id() {
        let mut plan = local_plan();
        let edited = Waypoint::local(3.0, 4.0, 30.0, 12.0).unwrap();
        plan.update("b", edited).unwrap();

        assert_eq!(ids(&plan), vec!["a", "b", "c"]);
        let b = plan.get("b").unwrap();
        assert_eq!(b.speed_kmh, 12.0);
        assert_eq!(b.position, local_with_alt(3.0, 4.0, 30.0));
    }

    fn local_with_alt(east: f64, north: f64, altitude: f64) -> WaypointPosition {
        WaypointPosition::Local(crate::models::LocalPoint::new(east, north, altitude))
    }

    #[test]
    fn remove_by_id() {
        let mut plan = local_plan();
        let removed = plan.remove("a").unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(ids(&plan), vec!["b", "c"]);

        assert_eq!(
            plan.remove("missing").unwrap_err(),
            FlightError::WaypointNotFound("missing".to_string())
        );
    }

    #[test]
    fn rejects_other_frame_and_duplicates() {
        let mut plan = local_plan();
        let err = plan
            .push(Waypoint::geodetic(35.0, 139.0, 50.0, 10.0).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            FlightError::FrameMismatch {
                expected: Frame::Local,
                found: Frame::Geodetic
            }
        );

        let err = plan
            .push(Waypoint::with_id("a", local(1.0, 1.0), 10.0, 0.0).unwrap())
            .unwrap_err();
        assert_eq!(err, FlightError::DuplicateWaypoint("a".to_string()));
    }

    #[test]
    fn reference_tracks_first_geodetic_waypoint() {
        let mut plan = WaypointPlan::new(Frame::Geodetic);
        assert_eq!(plan.reference(), DEFAULT_REFERENCE);

        plan.push(Waypoint::geodetic(34.0, 135.0, 50.0, 10.0).unwrap())
            .unwrap();
        assert_eq!(plan.reference(), GeoReference::new(34.0, 135.0));
    }

    #[test]
    fn geodetic_click_round_trips_through_plan() {
        let mapper = CoordinateMapper::default();
        let mut plan = WaypointPlan::new(Frame::Geodetic);
        plan.push(Waypoint::geodetic(35.6812, 139.7671, 50.0, 10.0).unwrap())
            .unwrap();

        let click = CartesianPoint::new(2.0, 0.6, -3.0);
        let wp = plan
            .waypoint_from_click(&mapper, &click, CLICK_WAYPOINT_SPEED_KMH)
            .unwrap();
        assert_eq!(wp.speed_kmh, 5.0);
        plan.push(wp).unwrap();

        let projected = plan.project(&mapper).unwrap();
        assert_eq!(projected.len(), plan.len());
        assert!((projected[1].x - click.x).abs() < 1e-9);
        assert!((projected[1].y - click.y).abs() < 1e-9);
        assert!((projected[1].z - click.z).abs() < 1e-9);
    }

    #[test]
    fn local_click_uses_local_inverse() {
        let mapper = CoordinateMapper::default();
        let plan = local_plan();
        let wp = plan
            .waypoint_from_click(&mapper, &CartesianPoint::new(4.0, 6.0, -2.0), 8.0)
            .unwrap();
        assert_eq!(wp.position, local_with_alt(4.0, -2.0, 12.0));
    }

    #[test]
    fn path_points_pair_positions_with_speeds() {
        let mapper = CoordinateMapper::default();
        let mut plan = local_plan();
        plan.update("c", Waypoint::local(10.0, 10.0, 20.0, 18.0).unwrap())
            .unwrap();

        let points = plan.path_points(&mapper).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].position, CartesianPoint::new(10.0, 10.0, 0.0));
        assert_eq!(points[2].speed_kmh, 18.0);
    }

    #[test]
    fn decoded_plan_keeps_frame_and_id_checks() {
        let plan = local_plan();
        let json = serde_json::to_value(&plan).unwrap();
        let back: WaypointPlan = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, plan);

        let mut duplicated = json.clone();
        duplicated["waypoints"][1]["id"] = "a".into();
        let err = serde_json::from_value::<WaypointPlan>(duplicated).unwrap_err();
        assert!(err.to_string().contains("duplicate"), "{err}");

        let mut mixed = json;
        mixed["frame"] = "geodetic".into();
        let err = serde_json::from_value::<WaypointPlan>(mixed).unwrap_err();
        assert!(err.to_string().contains("expected a geodetic waypoint"), "{err}");
    }
}
