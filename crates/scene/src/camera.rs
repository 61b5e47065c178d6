use foundation::math::{Mat4, Vec3, mat4_look_at_rh, mat4_mul, mat4_perspective_rh_z0};

/// Perspective camera that always looks at the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_y_deg: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self {
            fov_y_deg,
            aspect: sanitize_aspect(aspect),
            near,
            far,
            position: Vec3::new(0.0, 0.0, 1.0),
        }
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        self.aspect = sanitize_aspect(aspect);
    }

    pub fn view(&self) -> Mat4 {
        mat4_look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        mat4_perspective_rh_z0(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        mat4_mul(self.projection(), self.view())
    }
}

fn sanitize_aspect(aspect: f64) -> f64 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::PerspectiveCamera;
    use foundation::math::{Vec3, mat4_transform_point};

    fn camera() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(45.0, 1.0, 0.1, 1000.0);
        cam.position = Vec3::new(0.0, 0.0, 3.2);
        cam
    }

    fn ndc(cam: &PerspectiveCamera, p: Vec3) -> [f64; 3] {
        let clip = mat4_transform_point(&cam.view_proj(), p);
        [clip[0] / clip[3], clip[1] / clip[3], clip[2] / clip[3]]
    }

    #[test]
    fn origin_projects_to_centre() {
        let [x, y, z] = ndc(&camera(), Vec3::ZERO);
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
        assert!(z > 0.0 && z < 1.0);
    }

    #[test]
    fn up_is_towards_top_of_screen() {
        assert!(ndc(&camera(), Vec3::Y)[1] > 0.0);
        assert!(ndc(&camera(), Vec3::X)[0] > 0.0);
    }

    #[test]
    fn near_face_of_globe_is_in_front_of_far_face() {
        let near = ndc(&camera(), Vec3::new(0.0, 0.0, 1.0))[2];
        let far = ndc(&camera(), Vec3::new(0.0, 0.0, -1.0))[2];
        assert!(near < far);
    }

    #[test]
    fn unit_sphere_fits_vertically() {
        let top = ndc(&camera(), Vec3::new(0.0, 1.0, 0.0))[1];
        assert!(top > 0.5 && top < 1.0, "top {top}");
    }

    #[test]
    fn invalid_aspect_falls_back_to_square() {
        let mut cam = camera();
        cam.set_aspect(f64::NAN);
        assert_eq!(cam.aspect, 1.0);
        cam.set_aspect(0.0);
        assert_eq!(cam.aspect, 1.0);
        cam.set_aspect(1.5);
        assert_eq!(cam.aspect, 1.5);
        let [x, _, _] = ndc(&cam, Vec3::X);
        let [_, y, _] = ndc(&cam, Vec3::Y);
        assert!((y / x - 1.5).abs() < 1e-5);
    }
}
