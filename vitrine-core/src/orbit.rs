/// Damped orbit control driven by pointer drags
///
/// The camera moves on a sphere around `target`. Drags queue a rotation that
/// `update` bleeds into the pose a `damping_factor` slice at a time. Zoom is
/// not supported: the radius is held inside the distance limits.
use std::f32::consts::{PI, TAU};

use nalgebra::{Point3, Vector3};

use crate::config::OrbitConfig;
use crate::projection::CameraPose;

const POLAR_EPSILON: f32 = 1e-6;
const SETTLED: f32 = 1e-6;

/// Camera offset from the target in spherical coordinates (Y up)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle measured from +Y
    phi: f32,
    /// Azimuth measured from +Z towards +X
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: &Vector3<f32>) -> Self {
        let radius = offset.norm();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let ring = self.radius * self.phi.sin();
        Vector3::new(
            ring * self.theta.sin(),
            self.radius * self.phi.cos(),
            ring * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    enabled: bool,
    target: Point3<f32>,
    damping_factor: f32,
    rotate_speed: f32,
    min_polar_angle: f32,
    max_polar_angle: f32,
    distance_limits: Option<(f32, f32)>,
    pending_theta: f32,
    pending_phi: f32,
    drag_from: Option<(f32, f32)>,
    viewport_height: f32,
}

impl OrbitControls {
    /// Controls start disabled; the entrance animation owns the camera first
    pub fn new(config: &OrbitConfig) -> Self {
        Self {
            enabled: false,
            target: Point3::origin(),
            damping_factor: config.damping_factor.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            min_polar_angle: config.min_polar_angle,
            max_polar_angle: config.max_polar_angle,
            distance_limits: config.distance_limits.map(|[min, max]| (min, max.max(min))),
            pending_theta: 0.0,
            pending_phi: 0.0,
            drag_from: None,
            viewport_height: 1.0,
        }
    }

    /// Hand the camera to the user. Without configured limits the current
    /// distance becomes the fixed orbit radius.
    pub fn enable(&mut self, pose: &CameraPose) {
        if self.enabled {
            return;
        }
        if self.distance_limits.is_none() {
            let distance = (pose.position - self.target).norm();
            self.distance_limits = Some((distance, distance));
        }
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn set_target(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        if height > 0.0 {
            self.viewport_height = height;
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.enabled {
            self.drag_from = Some((x, y));
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !self.enabled {
            return;
        }
        let Some((last_x, last_y)) = self.drag_from else {
            return;
        };
        let scale = TAU * self.rotate_speed / self.viewport_height;
        self.pending_theta -= (x - last_x) * scale;
        self.pending_phi -= (y - last_y) * scale;
        self.drag_from = Some((x, y));
    }

    pub fn pointer_up(&mut self) {
        self.drag_from = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    /// Apply one damped step to `pose`. Does nothing while disabled.
    /// Returns whether queued rotation was applied.
    pub fn update(&mut self, pose: &mut CameraPose) -> bool {
        if !self.enabled {
            return false;
        }

        let mut spherical = Spherical::from_offset(&(pose.position - self.target));
        spherical.theta += self.pending_theta * self.damping_factor;
        spherical.phi += self.pending_phi * self.damping_factor;

        let min_phi = self.min_polar_angle.max(POLAR_EPSILON);
        let max_phi = self.max_polar_angle.min(PI - POLAR_EPSILON).max(min_phi);
        spherical.phi = spherical.phi.clamp(min_phi, max_phi);

        if let Some((min, max)) = self.distance_limits {
            spherical.radius = spherical.radius.clamp(min, max);
        }

        pose.position = self.target + spherical.to_offset();
        pose.look_at(self.target);

        let moved = self.pending_theta.abs() > SETTLED || self.pending_phi.abs() > SETTLED;
        self.pending_theta *= 1.0 - self.damping_factor;
        self.pending_phi *= 1.0 - self.damping_factor;
        if !moved {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest_pose() -> CameraPose {
        CameraPose::new(Point3::new(1.5, 1.5, 3.0), Point3::origin())
    }

    #[test]
    fn test_spherical_round_trip() {
        let offset = Vector3::new(1.5, 1.5, 3.0);
        let back = Spherical::from_offset(&offset).to_offset();
        assert!((back - offset).norm() < 1e-5);
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let mut controls = OrbitControls::new(&OrbitConfig::default());
        let mut pose = rest_pose();
        controls.pointer_down(0.0, 0.0);
        controls.pointer_move(100.0, 0.0);
        assert!(!controls.update(&mut pose));
        assert_eq!(pose, rest_pose());
    }

    #[test]
    fn test_enable_locks_current_distance() {
        let mut controls = OrbitControls::new(&OrbitConfig::default());
        let mut pose = rest_pose();
        controls.enable(&pose);
        controls.update(&mut pose);
        assert!((pose.position - rest_pose().position).norm() < 1e-5);

        controls.set_viewport_height(600.0);
        controls.pointer_down(0.0, 0.0);
        controls.pointer_move(120.0, 0.0);
        controls.pointer_up();
        for _ in 0..200 {
            controls.update(&mut pose);
        }
        assert!((pose.distance() - rest_pose().distance()).abs() < 1e-4);
        assert!((pose.position - rest_pose().position).norm() > 0.1);
    }

    #[test]
    fn test_configured_limits_clamp_radius() {
        let config = OrbitConfig {
            distance_limits: Some([3.0, 3.0]),
            ..OrbitConfig::default()
        };
        let mut controls = OrbitControls::new(&config);
        let mut pose = rest_pose();
        controls.enable(&pose);
        controls.update(&mut pose);
        assert!((pose.distance() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_damping_spreads_rotation_over_frames() {
        let mut controls = OrbitControls::new(&OrbitConfig::default());
        let mut pose = rest_pose();
        controls.enable(&pose);
        controls.set_viewport_height(600.0);
        controls.pointer_down(0.0, 0.0);
        controls.pointer_move(60.0, 0.0);

        let before = Spherical::from_offset(&pose.position.coords).theta;
        assert!(controls.update(&mut pose));
        let after_one = Spherical::from_offset(&pose.position.coords).theta;
        let expected_step = -(TAU * 60.0 / 600.0) * 0.05;
        assert!((after_one - before - expected_step).abs() < 1e-4);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut controls = OrbitControls::new(&OrbitConfig::default());
        let mut pose = rest_pose();
        controls.enable(&pose);
        controls.set_viewport_height(100.0);
        controls.pointer_down(0.0, 0.0);
        controls.pointer_move(0.0, -1000.0);
        for _ in 0..500 {
            controls.update(&mut pose);
        }
        let phi = Spherical::from_offset(&pose.position.coords).phi;
        assert!(phi <= PI / 1.5 + 1e-4);
    }
}
