//! Perspective projection of camera-relative world points to the screen

use crate::config::CameraConfig;
use crate::error::ConfigError;

/// A projected point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Screen x (pixels)
    pub x: f32,
    /// Screen y (pixels, down is positive)
    pub y: f32,
    /// Projected road width at this depth
    pub w: f32,
    /// Shrink factor `depth / z`
    pub scale: f32,
}

impl Projected {
    /// Result for points at or behind the camera
    pub const HIDDEN: Projected = Projected {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        scale: 0.0,
    };

    pub fn is_visible(&self) -> bool {
        self.scale > 0.0
    }
}

/// Screen-space projector for one viewport
#[derive(Debug, Clone, PartialEq)]
pub struct Projector {
    width: f32,
    height: f32,
    /// Focal depth `1 / tan(fov / 2)`
    depth: f32,
    horizon_ratio: f32,
    horizon: f32,
    road_width: f32,
}

impl Projector {
    pub fn new(width: u32, height: u32, camera: &CameraConfig) -> Result<Self, ConfigError> {
        camera.validate()?;
        if width == 0 || height == 0 {
            return Err(ConfigError::Viewport(width, height));
        }
        let half_fov = (camera.fov_degrees * 0.5).to_radians();
        Ok(Self {
            width: width as f32,
            height: height as f32,
            depth: 1.0 / half_fov.tan(),
            horizon_ratio: camera.horizon_ratio,
            horizon: height as f32 * camera.horizon_ratio,
            road_width: camera.road_width,
        })
    }

    /// Follow a canvas resize; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width as f32;
        self.height = height as f32;
        self.horizon = self.height * self.horizon_ratio;
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn horizon(&self) -> f32 {
        self.horizon
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Project a camera-relative point
    ///
    /// Points with `z <= 0` or non-finite coordinates come back as
    /// [`Projected::HIDDEN`].
    pub fn project(&self, x: f32, y: f32, z: f32) -> Projected {
        if !(z > 0.0 && z.is_finite() && x.is_finite() && y.is_finite()) {
            return Projected::HIDDEN;
        }
        let scale = self.depth / z;
        Projected {
            x: self.width * 0.5 + scale * x,
            y: self.horizon - scale * y,
            w: scale * self.road_width,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn projector() -> Projector {
        Projector::new(800, 600, &CameraConfig::default()).unwrap()
    }

    #[test]
    fn test_depth_from_fov() {
        let p = projector();
        assert!((p.depth() - 3.0f32.sqrt()).abs() < 1e-4);
        assert_eq!(p.horizon(), 300.0);
    }

    #[test]
    fn test_center_projects_to_screen_center() {
        let p = projector().project(0.0, 0.0, 100.0);
        assert_eq!((p.x, p.y), (400.0, 300.0));
        assert!((p.w - p.scale * 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_farther_is_smaller() {
        let p = projector();
        let near = p.project(100.0, -100.0, 10.0);
        let far = p.project(100.0, -100.0, 1000.0);
        assert!(near.scale > far.scale);
        assert!(near.x > far.x);
        // Below camera height lands below the horizon
        assert!(near.y > far.y && far.y > p.horizon());
    }

    #[test]
    fn test_behind_camera_is_hidden() {
        let p = projector();
        assert_eq!(p.project(1.0, 1.0, 0.0), Projected::HIDDEN);
        assert_eq!(p.project(1.0, 1.0, -5.0), Projected::HIDDEN);
        assert_eq!(p.project(1.0, 1.0, f32::NAN), Projected::HIDDEN);
        assert_eq!(p.project(f32::INFINITY, 1.0, 5.0), Projected::HIDDEN);
        assert!(!Projected::HIDDEN.is_visible());
    }

    #[test]
    fn test_resize_moves_horizon() {
        let mut p = projector();
        p.resize(1024, 768);
        assert_eq!(p.horizon(), 384.0);
        assert_eq!(p.project(0.0, 0.0, 1.0).x, 512.0);
        p.resize(0, 100);
        assert_eq!(p.width(), 1024.0);
    }

    #[test]
    fn test_rejects_empty_viewport() {
        assert_eq!(
            Projector::new(0, 600, &CameraConfig::default()).err(),
            Some(ConfigError::Viewport(0, 600))
        );
    }

    proptest! {
        #[test]
        fn prop_positive_depth_projects(
            x in -1.0e4f32..1.0e4,
            y in -1.0e4f32..1.0e4,
            z in 1.0e-3f32..1.0e6,
        ) {
            let p = projector().project(x, y, z);
            prop_assert!(p.scale > 0.0);
            prop_assert!(p.is_visible());
            prop_assert!(p.x.is_finite() && p.y.is_finite() && p.w.is_finite());
        }

        #[test]
        fn prop_non_positive_depth_hidden(x in -1.0e4f32..1.0e4, z in -1.0e6f32..=0.0) {
            prop_assert_eq!(projector().project(x, 0.0, z), Projected::HIDDEN);
        }
    }
}
