//! Tunable game configuration
//!
//! Defaults reproduce the stock game. Everything is validated once at
//! construction; the simulation assumes a valid config afterwards.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Road generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadConfig {
    /// Length of one segment in world units
    pub segment_length: f32,
    /// Segments built at construction
    pub initial_segments: usize,
    /// Segments kept generated ahead of the player
    pub segments_ahead: usize,
    /// Curve forcing frequency
    pub curviness: f32,
    /// Hill forcing frequency
    pub hilliness: f32,
    /// Per-segment damping of the curve/hill recurrence
    pub damping: f32,
    /// Half the drivable road width (lateral limit before off-road)
    pub half_width: f32,
    /// Keep planting trees over newly extended road
    #[serde(default)]
    pub extend_scenery: bool,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            segment_length: 200.0,
            initial_segments: 1000,
            segments_ahead: 100,
            curviness: 0.01,
            hilliness: 0.005,
            damping: 0.95,
            half_width: 1000.0,
            extend_scenery: false,
        }
    }
}

impl RoadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.segment_length.is_finite() && self.segment_length > 0.0) {
            return Err(ConfigError::SegmentLength(self.segment_length));
        }
        if self.initial_segments == 0 {
            return Err(ConfigError::NoSegments);
        }
        if !(self.half_width.is_finite() && self.half_width > 0.0) {
            return Err(ConfigError::RoadWidth(self.half_width));
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(ConfigError::Damping(self.damping));
        }
        for (name, value) in [("curviness", self.curviness), ("hilliness", self.hilliness)] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid { name, value });
            }
        }
        Ok(())
    }
}

/// Camera and projection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Horizontal field of view in degrees
    pub fov_degrees: f32,
    /// Fixed camera height above the road
    pub height: f32,
    /// How far behind the player the camera sits
    pub follow_distance: f32,
    /// Exponential follow factor applied per frame
    pub follow_factor: f32,
    /// Horizon position as a fraction of the viewport height
    pub horizon_ratio: f32,
    /// Full road width used for projected strip widths
    pub road_width: f32,
    /// Segments drawn ahead of the camera
    pub draw_distance: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            height: 1000.0,
            follow_distance: 500.0,
            follow_factor: 0.1,
            horizon_ratio: 0.5,
            road_width: 2000.0,
            draw_distance: 300,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_degrees.is_finite() && self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::FieldOfView(self.fov_degrees));
        }
        if !(self.road_width.is_finite() && self.road_width > 0.0) {
            return Err(ConfigError::RoadWidth(self.road_width));
        }
        if self.draw_distance == 0 {
            return Err(ConfigError::DrawDistance);
        }
        if !(self.follow_factor > 0.0 && self.follow_factor <= 1.0) {
            return Err(ConfigError::Invalid {
                name: "follow_factor",
                value: self.follow_factor,
            });
        }
        if !(0.0..=1.0).contains(&self.horizon_ratio) {
            return Err(ConfigError::Invalid {
                name: "horizon_ratio",
                value: self.horizon_ratio,
            });
        }
        for (name, value) in [("height", self.height), ("follow_distance", self.follow_distance)] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid { name, value });
            }
        }
        Ok(())
    }
}

/// AI traffic and run rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficConfig {
    /// AI cars on the road at stage 0
    pub base_cars: usize,
    /// Extra AI cars per stage
    pub cars_per_stage: usize,
    /// AI cars further than this behind the player get recycled
    pub recycle_distance: f32,
    /// Starting lives
    pub lives: u8,
    /// Countdown before a run starts (seconds)
    pub countdown: f32,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            base_cars: 5,
            cars_per_stage: 2,
            recycle_distance: 2000.0,
            lives: 3,
            countdown: 3.0,
        }
    }
}

impl TrafficConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.recycle_distance.is_finite() && self.recycle_distance > 0.0) {
            return Err(ConfigError::Invalid {
                name: "recycle_distance",
                value: self.recycle_distance,
            });
        }
        if !(self.countdown.is_finite() && self.countdown >= 0.0) {
            return Err(ConfigError::Invalid {
                name: "countdown",
                value: self.countdown,
            });
        }
        Ok(())
    }

    /// AI population target for a stage
    pub fn target_cars(&self, stage: u8) -> usize {
        self.base_cars + stage as usize * self.cars_per_stage
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub road: RoadConfig,
    pub camera: CameraConfig,
    pub traffic: TrafficConfig,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.road.validate()?;
        self.camera.validate()?;
        self.traffic.validate()
    }
}
