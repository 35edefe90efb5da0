/// Model transform and matrix helpers
use nalgebra::{Matrix4, Vector3};

/// Placement of the model in the scene: translation, spin about Y, uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub position: Vector3<f32>,
    pub rotation_y: f32,
    pub scale: f32,
}

impl ModelTransform {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation_y: 0.0,
            scale: 1.0,
        }
    }

    /// Spin about the vertical axis by `delta` radians
    pub fn rotate_y(&mut self, delta: f32) {
        self.rotation_y += delta;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(self.position.x, self.position.y, self.position.z)
            * Transform::rotation_y_matrix(self.rotation_y)
            * Transform::scale_matrix(self.scale, self.scale, self.scale)
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    pub fn rotation_y_matrix(angle: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, angle, 0.0))
    }

    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_identity_transform() {
        let matrix = ModelTransform::identity().matrix();
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_zero_scale_collapses_model() {
        let transform = ModelTransform {
            position: Vector3::new(0.0, 1.0, 0.0),
            rotation_y: 1.0,
            scale: 0.0,
        };
        let p = transform.matrix().transform_point(&Point3::new(3.0, -2.0, 5.0));
        assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        let mut transform = ModelTransform::identity();
        transform.rotate_y(std::f32::consts::FRAC_PI_2);
        let p = transform.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
    }
}
