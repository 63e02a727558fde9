pub mod error;
pub mod follower;
pub mod models;
pub mod plan;
pub mod rules;
pub mod spatial;

pub use error::{FlightError, Result};
pub use follower::{Completion, FlightPhase, PathFollower, TickOutcome};
pub use models::{
    normalize_degrees, CartesianPoint, FlightTelemetry, Frame, GeoPoint, GeoReference, LocalPoint,
    PathPoint, Pose, Waypoint, WaypointPosition, DEFAULT_REFERENCE,
};
pub use plan::WaypointPlan;
pub use rules::{FollowerConfig, SceneScale};
pub use spatial::CoordinateMapper;
