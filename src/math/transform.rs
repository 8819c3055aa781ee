// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Matrix4f, Vector3f };

/// Affine placement transform with its inverse cached at construction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        let inv_matrix = match matrix.try_inverse() {
            Some(inv) => inv,
            None => {
                log::warn!("Singular transform, falling back to identity inverse.");
                Matrix4f::identity()
            }
        };
        Self { matrix, inv_matrix }
    }

    /// Builds a transform from 16 values in row-major order.
    pub fn from_row_slice(values: &[Float; 16]) -> Self {
        Self::new(Matrix4f::from_row_slice(values))
    }

    pub fn matrix(&self) -> &Matrix4f {
        &self.matrix
    }

    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4f::identity()
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        self.matrix.fixed_slice::<3, 3>(0, 0) * v
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        self.inv_matrix.fixed_slice::<3, 3>(0, 0) * v
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use crate::math::constants::{ Float, Vector3f };

    #[test]
    fn test_transform_inverse_round_trip() {
        let values: [Float; 16] = [
            0.0, -1.0, 0.0, 3.0,
            1.0,  0.0, 0.0, 1.0,
            0.0,  0.0, 2.0, 0.0,
            0.0,  0.0, 0.0, 1.0,
        ];
        let t = Transform::from_row_slice(&values);
        let v = Vector3f::new(1.0, 2.0, 3.0);
        let world = t.apply_vector(v);
        assert!((world - Vector3f::new(-2.0, 1.0, 6.0)).norm() < 1e-5);
        let back = t.inv_apply_vector(world);
        assert!((back - v).norm() < 1e-5);
    }

    #[test]
    fn test_singular_transform_falls_back() {
        let t = Transform::from_row_slice(&[0.0; 16]);
        let v = Vector3f::new(1.0, 2.0, 3.0);
        assert_eq!(t.inv_apply_vector(v), v);
        assert!(Transform::default().is_identity());
    }
}
