//! Caller-side flight driver: owns the plan and the flying flag.

use flightpath_core::{
    CartesianPoint, Completion, CoordinateMapper, FollowerConfig, PathFollower, PathPoint, Pose,
    Result, TickOutcome, WaypointPlan,
};

/// Owns a waypoint plan, its projected path, and the follower that flies it.
///
/// The projected path is recomputed whenever the plan changes.
#[derive(Debug)]
pub struct FlightDriver {
    mapper: CoordinateMapper,
    plan: WaypointPlan,
    path: Vec<PathPoint>,
    follower: PathFollower,
    flying: bool,
    pose: Pose,
    last_completion: Option<Completion>,
}

impl FlightDriver {
    pub fn new(plan: WaypointPlan, mapper: CoordinateMapper, config: FollowerConfig) -> Result<Self> {
        let path = plan.path_points(&mapper)?;
        let pose = Pose {
            position: path.first().map(|p| p.position).unwrap_or_default(),
            heading_rad: 0.0,
        };
        Ok(Self {
            mapper,
            plan,
            path,
            follower: PathFollower::new(config)?,
            flying: false,
            pose,
            last_completion: None,
        })
    }

    pub fn plan(&self) -> &WaypointPlan {
        &self.plan
    }

    pub fn path(&self) -> &[PathPoint] {
        &self.path
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn is_flying(&self) -> bool {
        self.flying
    }

    /// Current pose of the drone, flying or at rest.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn last_completion(&self) -> Option<&Completion> {
        self.last_completion.as_ref()
    }

    pub fn set_visual_speed(&mut self, multiplier: f64) -> Result<()> {
        self.follower.set_visual_speed(multiplier)
    }

    pub fn start_flight(&mut self) -> Result<()> {
        self.pose = self.follower.start(self.path.clone())?;
        self.flying = true;
        self.last_completion = None;
        Ok(())
    }

    pub fn stop_flight(&mut self) {
        self.flying = false;
        if let Some(pose) = self.follower.stop() {
            self.pose = pose;
        }
    }

    /// Apply an edit to the plan; the plan is unchanged if the edit fails.
    pub fn edit_plan<T>(&mut self, edit: impl FnOnce(&mut WaypointPlan) -> Result<T>) -> Result<T> {
        let mut plan = self.plan.clone();
        let value = edit(&mut plan)?;
        let path = plan.path_points(&self.mapper)?;

        self.follower.update_path(path.clone())?;
        self.plan = plan;
        self.path = path;

        if self.flying && !self.follower.is_flying() {
            self.flying = false;
        }
        if !self.flying {
            self.pose = self.follower.resting_pose();
        }
        Ok(value)
    }

    /// Append a waypoint at a clicked scene position; returns its id.
    pub fn add_waypoint_from_click(&mut self, point: CartesianPoint, speed_kmh: f64) -> Result<String> {
        let mapper = self.mapper;
        self.edit_plan(|plan| {
            let waypoint = plan.waypoint_from_click(&mapper, &point, speed_kmh)?;
            let id = waypoint.id.clone();
            plan.push(waypoint)?;
            Ok(id)
        })
    }

    /// Insert a waypoint where a segment was clicked; returns its id.
    pub fn insert_waypoint_on_segment(
        &mut self,
        segment_index: usize,
        point: CartesianPoint,
        speed_kmh: f64,
    ) -> Result<String> {
        let mapper = self.mapper;
        self.edit_plan(|plan| {
            let waypoint = plan.waypoint_from_click(&mapper, &point, speed_kmh)?;
            let id = waypoint.id.clone();
            plan.insert_after_segment(segment_index, waypoint)?;
            Ok(id)
        })
    }

    /// Advance one frame.
    ///
    /// On completion the flying flag drops and the drone returns to waypoint 0.
    pub fn frame(&mut self, delta_s: f64) -> Result<TickOutcome> {
        if !self.flying {
            return Ok(TickOutcome::Idle);
        }

        let outcome = self.follower.tick(delta_s)?;
        match &outcome {
            TickOutcome::Moving(telemetry) => self.pose = telemetry.pose(),
            TickOutcome::Completed(done) => {
                self.last_completion = Some(*done);
                self.stop_flight();
            }
            TickOutcome::Idle => {
                // follower went idle without completing
                self.flying = false;
            }
        }
        Ok(outcome)
    }
}
