//! Error types

/// Rejected construction parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("segment length must be positive and finite, got {0}")]
    SegmentLength(f32),

    #[error("road needs at least one initial segment")]
    NoSegments,

    #[error("road half-width must be positive and finite, got {0}")]
    RoadWidth(f32),

    #[error("damping must be in [0, 1), got {0}")]
    Damping(f32),

    #[error("field of view must be in (0, 180) degrees, got {0}")]
    FieldOfView(f32),

    #[error("draw distance must be at least one segment")]
    DrawDistance,

    #[error("viewport must be non-empty, got {0}x{1}")]
    Viewport(u32, u32),

    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: f32 },
}
