//! Pre-defined waypoint plans for simulation.

use flightpath_core::spatial::{meters_to_lat, meters_to_lon};
use flightpath_core::{
    Frame, GeoReference, LocalPoint, Result, Waypoint, WaypointPlan, WaypointPosition,
};
use rand::Rng;

/// Scatter radius for random plans (~200m)
const RANDOM_RADIUS_DEG: f64 = 0.002;
const DEFAULT_ALT_M: f64 = 50.0;

/// Circuit around the high-rise block: (north, east, altitude, speed km/h).
const RING_SAMPLES: [(f64, f64, f64, f64); 32] = [
    (15.0, 15.0, 25.0, 15.0),
    (12.0, 18.0, 25.0, 16.0),
    (8.0, 20.0, 25.0, 17.0),
    (4.0, 21.0, 25.0, 18.0),
    (0.0, 22.0, 25.0, 19.0),
    (-4.0, 21.0, 22.0, 20.0),
    (-8.0, 20.0, 22.0, 18.0),
    (-12.0, 18.0, 22.0, 17.0),
    (-15.0, 15.0, 22.0, 16.0),
    (-18.0, 12.0, 22.0, 15.0),
    (-20.0, 8.0, 22.0, 16.0),
    (-21.0, 4.0, 22.0, 17.0),
    (-22.0, 0.0, 22.0, 18.0),
    (-21.0, -4.0, 24.0, 19.0),
    (-20.0, -8.0, 24.0, 20.0),
    (-18.0, -12.0, 24.0, 18.0),
    (-15.0, -15.0, 24.0, 17.0),
    (-12.0, -18.0, 24.0, 16.0),
    (-8.0, -20.0, 24.0, 15.0),
    (-4.0, -21.0, 26.0, 16.0),
    (0.0, -22.0, 26.0, 17.0),
    (4.0, -21.0, 26.0, 18.0),
    (8.0, -20.0, 26.0, 19.0),
    (12.0, -18.0, 26.0, 20.0),
    (15.0, -15.0, 26.0, 18.0),
    (18.0, -12.0, 26.0, 17.0),
    (20.0, -8.0, 26.0, 16.0),
    (21.0, -4.0, 28.0, 15.0),
    (22.0, 0.0, 28.0, 16.0),
    (21.0, 4.0, 28.0, 17.0),
    (20.0, 8.0, 28.0, 18.0),
    (18.0, 12.0, 28.0, 19.0),
];

/// A named waypoint plan.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub plan: WaypointPlan,
}

/// Local-frame loop around the central buildings.
pub fn create_ring_scenario() -> Result<Scenario> {
    let waypoints = RING_SAMPLES
        .iter()
        .enumerate()
        .map(|(i, &(north, east, altitude, speed))| {
            Waypoint::with_id(
                format!("ring_{:02}", i),
                WaypointPosition::Local(LocalPoint::new(east, north, altitude)),
                speed,
                0.0,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Scenario {
        name: "ring".to_string(),
        plan: WaypointPlan::from_waypoints(Frame::Local, waypoints)?,
    })
}

/// Geodetic square with its south-west corner on the reference, closed back
/// onto the start.
pub fn create_square_scenario(reference: GeoReference, side_m: f64) -> Result<Scenario> {
    let dlat = meters_to_lat(side_m);
    let dlon = meters_to_lon(side_m, reference.latitude);
    let corners = [
        (0.0, 0.0, 12.0),
        (dlat, 0.0, 15.0),
        (dlat, dlon, 18.0),
        (0.0, dlon, 20.0),
        (0.0, 0.0, 15.0),
    ];

    let mut plan = WaypointPlan::new(Frame::Geodetic);
    for (i, (north, east, speed)) in corners.into_iter().enumerate() {
        let altitude = DEFAULT_ALT_M + 10.0 * i as f64;
        plan.push(Waypoint::geodetic(
            reference.latitude + north,
            reference.longitude + east,
            altitude,
            speed,
        )?)?;
    }

    Ok(Scenario {
        name: "square".to_string(),
        plan,
    })
}

/// Random geodetic waypoints scattered around the reference.
pub fn create_random_scenario(reference: GeoReference, count: usize) -> Result<Scenario> {
    let mut rng = rand::rng();
    let mut plan = WaypointPlan::new(Frame::Geodetic);

    for _ in 0..count {
        let lat_offset = rng.random_range(-RANDOM_RADIUS_DEG..RANDOM_RADIUS_DEG);
        let lon_offset = rng.random_range(-RANDOM_RADIUS_DEG..RANDOM_RADIUS_DEG);
        let altitude = rng.random_range(30.0..120.0);
        let speed = rng.random_range(5.0..=25.0);
        plan.push(Waypoint::geodetic(
            reference.latitude + lat_offset,
            reference.longitude + lon_offset,
            altitude,
            speed,
        )?)?;
    }

    Ok(Scenario {
        name: "random".to_string(),
        plan,
    })
}
