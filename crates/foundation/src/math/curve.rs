use super::Vec3;

/// Point on the quadratic Bézier (p0, p1, p2) at parameter `t`.
pub fn quadratic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, t: f64) -> Vec3 {
    let u = 1.0 - t;
    p0.scale(u * u) + p1.scale(2.0 * u * t) + p2.scale(t * t)
}

/// Samples `segments + 1` points uniformly in `t`, endpoints included.
pub fn sample_quadratic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| quadratic_bezier(p0, p1, p2, i as f64 / segments as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{quadratic_bezier, sample_quadratic_bezier};
    use crate::math::Vec3;

    #[test]
    fn endpoints_are_exact() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 2.0, 0.0);
        let b = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(quadratic_bezier(a, c, b, 0.0), a);
        assert_eq!(quadratic_bezier(a, c, b, 1.0), b);
    }

    #[test]
    fn midpoint_is_pulled_toward_control() {
        let a = Vec3::new(-1.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 2.0, 0.0);
        let mid = quadratic_bezier(a, c, b, 0.5);
        assert_eq!(mid, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn sample_count_is_segments_plus_one() {
        let pts = sample_quadratic_bezier(Vec3::ZERO, Vec3::X, Vec3::Y, 60);
        assert_eq!(pts.len(), 61);
        assert_eq!(pts[0], Vec3::ZERO);
        assert_eq!(pts[60], Vec3::Y);
    }
}
