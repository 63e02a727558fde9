//! Tick-driven motion along a polyline of waypoints.
//!
//! The caller owns the frame loop: it calls [`PathFollower::tick`] once per
//! rendered frame and reacts to [`TickOutcome::Completed`].

use crate::error::{ensure_finite, FlightError, Result};
use crate::models::{CartesianPoint, FlightTelemetry, PathPoint, Pose};
use crate::rules::FollowerConfig;
use serde::{Deserialize, Serialize};

/// Externally visible state of the follower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FlightPhase {
    Idle,
    Traversing { segment_index: usize, progress: f64 },
    Completed,
}

/// Emitted once when the last waypoint is reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub pose: Pose,
    pub total_waypoints: usize,
    pub flight_time_s: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not flying; nothing moved
    Idle,
    Moving(FlightTelemetry),
    Completed(Completion),
}

#[derive(Debug, Clone, Copy, Default)]
struct FlightState {
    segment_index: usize,
    progress: f64,
    elapsed_s: f64,
}

#[derive(Debug)]
pub struct PathFollower {
    config: FollowerConfig,
    path: Vec<PathPoint>,
    phase: Phase,
    state: FlightState,
    heading_rad: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Traversing,
    Completed,
}

impl Default for PathFollower {
    fn default() -> Self {
        Self::with_valid_config(FollowerConfig::default())
    }
}

impl PathFollower {
    /// Fails with [`FlightError::InvalidInput`] when any tuning value is
    /// zero, negative or non-finite.
    pub fn new(config: FollowerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: FollowerConfig) -> Self {
        Self {
            config,
            path: Vec::new(),
            phase: Phase::Idle,
            state: FlightState::default(),
            heading_rad: 0.0,
        }
    }

    pub fn config(&self) -> &FollowerConfig {
        &self.config
    }

    pub fn phase(&self) -> FlightPhase {
        match self.phase {
            Phase::Idle => FlightPhase::Idle,
            Phase::Traversing => FlightPhase::Traversing {
                segment_index: self.state.segment_index,
                progress: self.state.progress,
            },
            Phase::Completed => FlightPhase::Completed,
        }
    }

    pub fn is_flying(&self) -> bool {
        self.phase == Phase::Traversing
    }

    /// Change the global speed multiplier; takes effect on the next tick.
    pub fn set_visual_speed(&mut self, multiplier: f64) -> Result<()> {
        ensure_finite("visual_speed_multiplier", multiplier)?;
        if multiplier <= 0.0 {
            return Err(FlightError::InvalidInput {
                field: "visual_speed_multiplier",
                value: multiplier,
            });
        }
        self.config.visual_speed_multiplier = multiplier;
        Ok(())
    }

    /// Begin a flight at waypoint 0.
    ///
    /// Fewer than 2 points is rejected and leaves the follower untouched.
    pub fn start(&mut self, path: Vec<PathPoint>) -> Result<Pose> {
        if path.len() < 2 {
            return Err(FlightError::InsufficientWaypoints { count: path.len() });
        }
        validate_path(&path)?;

        self.path = path;
        self.phase = Phase::Traversing;
        self.state = FlightState::default();
        self.heading_rad = segment_heading(&self.path[0].position, &self.path[1].position)
            .unwrap_or(0.0);

        tracing::debug!(waypoints = self.path.len(), "flight started");
        Ok(self.resting_pose())
    }

    /// End the flight and snap back to waypoint 0.
    ///
    /// Returns `None` when no path has been loaded.
    pub fn stop(&mut self) -> Option<Pose> {
        if self.phase != Phase::Idle {
            tracing::debug!(
                segment = self.state.segment_index,
                flight_time_s = self.state.elapsed_s,
                "flight stopped"
            );
        }
        self.phase = Phase::Idle;
        self.state = FlightState::default();
        self.heading_rad = 0.0;
        self.path.first().map(|_| self.resting_pose())
    }

    /// Swap in a recomputed path after the waypoint list changed.
    ///
    /// An active flight drops to idle when fewer than 2 points remain;
    /// otherwise the segment index is clamped to the new last segment.
    pub fn update_path(&mut self, path: Vec<PathPoint>) -> Result<()> {
        validate_path(&path)?;
        self.path = path;

        if self.phase != Phase::Traversing {
            return Ok(());
        }

        if self.path.len() < 2 {
            tracing::warn!(
                waypoints = self.path.len(),
                "path shrank below 2 waypoints mid-flight, stopping"
            );
            self.stop();
            return Ok(());
        }

        let last_segment = self.path.len() - 2;
        if self.state.segment_index > last_segment {
            self.state.segment_index = last_segment;
        }
        Ok(())
    }

    /// Where the drone rests while not flying.
    pub fn resting_pose(&self) -> Pose {
        Pose {
            position: self
                .path
                .first()
                .map(|p| p.position)
                .unwrap_or_default(),
            heading_rad: self.heading_rad,
        }
    }

    /// Effective speed for a waypoint after clamping.
    pub fn effective_speed(&self, speed_kmh: f64) -> f64 {
        speed_kmh.min(self.config.max_speed_kmh)
    }

    /// Progress added by one tick on a segment of the given length.
    pub fn progress_increment(&self, speed_kmh: f64, distance: f64, delta_s: f64) -> f64 {
        let speed = self.effective_speed(speed_kmh);
        (speed * self.config.base_speed_coefficient * self.config.visual_speed_multiplier * delta_s)
            / distance.max(self.config.min_segment_distance)
    }

    /// Advance the flight by `delta_s` seconds.
    pub fn tick(&mut self, delta_s: f64) -> Result<TickOutcome> {
        ensure_finite("delta_time", delta_s)?;
        if delta_s < 0.0 {
            return Err(FlightError::InvalidInput {
                field: "delta_time",
                value: delta_s,
            });
        }
        if self.phase != Phase::Traversing {
            return Ok(TickOutcome::Idle);
        }

        self.state.elapsed_s += delta_s;

        let index = self.state.segment_index;
        let from = self.path[index];
        let to = self.path[index + 1];
        let distance = from.position.distance_to(&to.position);

        self.state.progress += self.progress_increment(from.speed_kmh, distance, delta_s);

        if self.state.progress >= 1.0 {
            self.state.progress = 0.0;
            self.state.segment_index += 1;

            if self.state.segment_index >= self.path.len() - 1 {
                return Ok(TickOutcome::Completed(self.complete()));
            }
            tracing::debug!(segment = self.state.segment_index, "advanced to next segment");
        }

        Ok(TickOutcome::Moving(self.telemetry()))
    }

    fn complete(&mut self) -> Completion {
        let last = self.path.len() - 1;
        self.phase = Phase::Completed;
        self.state.segment_index = last - 1;
        self.state.progress = 0.0;
        if let Some(heading) =
            segment_heading(&self.path[last - 1].position, &self.path[last].position)
        {
            self.heading_rad = heading;
        }

        let completion = Completion {
            pose: Pose {
                position: self.path[last].position,
                heading_rad: self.heading_rad,
            },
            total_waypoints: self.path.len(),
            flight_time_s: self.state.elapsed_s,
        };
        tracing::info!(
            waypoints = completion.total_waypoints,
            flight_time_s = completion.flight_time_s,
            "flight completed"
        );
        completion
    }

    fn telemetry(&mut self) -> FlightTelemetry {
        let index = self.state.segment_index;
        let progress = self.state.progress;
        let from = self.path[index];
        let to = self.path[index + 1];

        if let Some(heading) = segment_heading(&from.position, &to.position) {
            self.heading_rad = heading;
        }

        let distance = from.position.distance_to(&to.position);
        let segments = (self.path.len() - 1) as f64;

        FlightTelemetry {
            position: from.position.lerp(&to.position, progress),
            heading_rad: self.heading_rad,
            segment_index: index,
            total_waypoints: self.path.len(),
            current_speed_kmh: self.effective_speed(from.speed_kmh),
            segment_progress: progress,
            overall_progress_pct: (index as f64 + progress) / segments * 100.0,
            distance_to_next: distance * (1.0 - progress),
            flight_time_s: self.state.elapsed_s,
        }
    }
}

fn validate_path(path: &[PathPoint]) -> Result<()> {
    for point in path {
        point.position.validate()?;
        ensure_finite("speed_kmh", point.speed_kmh)?;
        if point.speed_kmh <= 0.0 {
            return Err(FlightError::InvalidInput {
                field: "speed_kmh",
                value: point.speed_kmh,
            });
        }
    }
    Ok(())
}

/// Yaw of the segment direction; `None` without horizontal displacement.
fn segment_heading(from: &CartesianPoint, to: &CartesianPoint) -> Option<f64> {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    if dx == 0.0 && dz == 0.0 {
        None
    } else {
        Some(dx.atan2(dz))
    }
}
