use super::vec::Vec3;

/// Column-major 4×4 matrix, laid out the way WGSL reads `mat4x4<f32>`.
pub type Mat4 = [[f32; 4]; 4];

pub const MAT4_IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

pub fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    // c = a * b
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

/// `m * (p, 1)` in homogeneous coordinates.
pub fn mat4_transform_point(m: &Mat4, p: Vec3) -> [f64; 4] {
    let v = [p.x, p.y, p.z, 1.0];
    let mut out = [0.0f64; 4];
    for (row, slot) in out.iter_mut().enumerate() {
        *slot = (0..4).map(|col| f64::from(m[col][row]) * v[col]).sum();
    }
    out
}

/// Right-handed perspective with depth mapped to `[0, 1]`.
pub fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;
    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

pub fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).try_normalize().unwrap_or(Vec3::new(0.0, 0.0, -1.0));
    let s = f.cross(up).try_normalize().unwrap_or(Vec3::X);
    let u = s.cross(f);
    [
        [s.x as f32, u.x as f32, -f.x as f32, 0.0],
        [s.y as f32, u.y as f32, -f.y as f32, 0.0],
        [s.z as f32, u.z as f32, -f.z as f32, 0.0],
        [-s.dot(eye) as f32, -u.dot(eye) as f32, f.dot(eye) as f32, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::{MAT4_IDENTITY, mat4_look_at_rh, mat4_mul, mat4_perspective_rh_z0, mat4_transform_point};
    use crate::math::Vec3;

    #[test]
    fn identity_is_neutral() {
        let p = mat4_perspective_rh_z0(1.0, 1.5, 0.1, 100.0);
        assert_eq!(mat4_mul(MAT4_IDENTITY, p), p);
        assert_eq!(mat4_mul(p, MAT4_IDENTITY), p);
    }

    #[test]
    fn look_at_moves_eye_to_origin() {
        let view = mat4_look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let eye = mat4_transform_point(&view, Vec3::new(0.0, 0.0, 3.0));
        assert!(eye[..3].iter().all(|c| c.abs() < 1e-6));
        let target = mat4_transform_point(&view, Vec3::ZERO);
        assert!((target[2] + 3.0).abs() < 1e-6, "target sits down -z");
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth() {
        let proj = mat4_perspective_rh_z0(std::f64::consts::FRAC_PI_2, 1.0, 0.5, 50.0);
        let near = mat4_transform_point(&proj, Vec3::new(0.0, 0.0, -0.5));
        let far = mat4_transform_point(&proj, Vec3::new(0.0, 0.0, -50.0));
        assert!((near[2] / near[3]).abs() < 1e-6);
        assert!((far[2] / far[3] - 1.0).abs() < 1e-5);
    }
}
