use foundation::math::{Mat4, Vec3};

/// Euler rotation about x then y, applied as `Rx · Ry · v`.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
}

impl Rotation {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        let (sy, cy) = self.y.sin_cos();
        let after_y = Vec3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy);

        let (sx, cx) = self.x.sin_cos();
        Vec3::new(
            after_y.x,
            after_y.y * cx - after_y.z * sx,
            after_y.y * sx + after_y.z * cx,
        )
    }

    /// Model matrix equal to [`Rotation::apply`].
    pub fn matrix(&self) -> Mat4 {
        let (sy, cy) = self.y.sin_cos();
        let (sx, cx) = self.x.sin_cos();
        [
            [cy as f32, (sy * sx) as f32, (-sy * cx) as f32, 0.0],
            [0.0, cx as f32, sx as f32, 0.0],
            [sy as f32, (-cy * sx) as f32, (cy * cx) as f32, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::Rotation;
    use foundation::math::{MAT4_IDENTITY, Vec3, mat4_transform_point};
    use std::f64::consts::FRAC_PI_2;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-12, "expected {a:?} ~= {b:?}");
    }

    #[test]
    fn identity_is_noop() {
        let v = Vec3::new(0.3, -0.2, 0.9);
        assert_eq!(Rotation::identity().apply(v), v);
    }

    #[test]
    fn yaw_turns_x_into_minus_z() {
        assert_vec_close(
            Rotation::new(0.0, FRAC_PI_2).apply(Vec3::X),
            Vec3::new(0.0, 0.0, -1.0),
        );
    }

    #[test]
    fn pitch_turns_y_into_z() {
        assert_vec_close(
            Rotation::new(FRAC_PI_2, 0.0).apply(Vec3::Y),
            Vec3::new(0.0, 0.0, 1.0),
        );
    }

    #[test]
    fn matrix_agrees_with_apply() {
        assert_eq!(Rotation::identity().matrix(), MAT4_IDENTITY);
        let r = Rotation::new(0.35, -2.1);
        for v in [Vec3::X, Vec3::Y, Vec3::new(0.2, -0.7, 0.4)] {
            let m = mat4_transform_point(&r.matrix(), v);
            let expected = r.apply(v);
            assert!((Vec3::new(m[0], m[1], m[2]) - expected).length() < 1e-6);
            assert_eq!(m[3], 1.0);
        }
    }

    #[test]
    fn preserves_length() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let r = Rotation::new(0.4, -1.3).apply(v);
        assert!((r.length() - v.length()).abs() < 1e-12);
    }
}
