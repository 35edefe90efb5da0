/// Camera pose and projection
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::CameraConfig;

/// Where the camera sits and what it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl CameraPose {
    pub fn new(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self { position, target }
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }
}

/// Perspective camera
#[derive(Debug, Clone)]
pub struct Camera {
    pub pose: CameraPose,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_config(&CameraConfig::default(), width, height)
    }

    /// Camera at the entrance start pose, looking at the origin
    pub fn from_config(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            pose: CameraPose::new(config.start(), Point3::origin()),
            up: Vector3::y(),
            fov: config.fov_degrees.to_radians(),
            aspect: 1.0,
            near: config.near,
            far: config.far,
        };
        camera.set_viewport(width, height);
        camera
    }

    /// Recompute the aspect ratio after a resize; a zero-height viewport is ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.pose.position, &self.pose.target, &self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert!((camera.fov - 45f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.pose.position, Point3::new(4.0, 3.0, 4.0));
        assert_eq!(camera.pose.target, Point3::origin());
    }

    #[test]
    fn test_view_matrix_moves_target_onto_axis() {
        let camera = Camera::new(800, 600);
        let target = camera.view_matrix().transform_point(&camera.pose.target);
        assert!(target.x.abs() < 1e-5 && target.y.abs() < 1e-5);
        assert!(target.z < 0.0);
    }

    #[test]
    fn test_zero_height_resize_is_ignored() {
        let mut camera = Camera::new(800, 600);
        camera.set_viewport(1024, 0);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        camera.set_viewport(1000, 500);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
    }
}
