use glam::{Mat4, Vec3};

/// Fixed camera pose and projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees, in (0, 180)
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 200.0,
            position: Vec3::new(-5.0, 8.0, 16.0),
            look_at: Vec3::new(6.0, 1.5, -8.0),
        }
    }
}

/// Perspective camera, the only thing that changes after construction is the aspect ratio.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    config: CameraConfig,
    aspect: f32,
}

impl PerspectiveCamera {
    pub fn new(config: CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            config,
            aspect: 1.0,
        };
        camera.set_viewport(width, height);
        camera
    }

    /// Update the aspect ratio, zero-sized viewports are ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.config.position, self.config.look_at, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.config.fov_degrees.to_radians(),
            self.aspect,
            self.config.near,
            self.config.far,
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_follows_viewport() {
        let mut camera = PerspectiveCamera::new(CameraConfig::default(), 1600, 900);
        assert!((camera.aspect() - 1600.0 / 900.0).abs() < 1e-6);
        assert!(camera.set_viewport(800, 1000));
        assert!((camera.aspect() - 0.8).abs() < 1e-6);
        assert!(!camera.set_viewport(0, 1000));
        assert!((camera.aspect() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_look_at_target_projects_to_centre() {
        let camera = PerspectiveCamera::new(CameraConfig::default(), 1920, 1080);
        let clip = camera.view_proj() * camera.config().look_at.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        assert!(camera.view_proj().is_finite());
    }
}
