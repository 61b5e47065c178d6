use super::Vec3;

/// Project geographic degrees onto a sphere of `radius` (y-up).
///
/// Longitude is negated so that east runs counter-clockwise when the globe is
/// viewed from +z; without the flip the continents render mirrored.
pub fn project(lon_deg: f64, lat_deg: f64, radius: f64) -> Vec3 {
    let lat = lat_deg.to_radians();
    let lon = (-lon_deg).to_radians();
    Vec3::new(
        radius * lat.cos() * lon.cos(),
        radius * lat.sin(),
        radius * lat.cos() * lon.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::project;
    use crate::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert_close(a.x, b.x, 1e-12);
        assert_close(a.y, b.y, 1e-12);
        assert_close(a.z, b.z, 1e-12);
    }

    #[test]
    fn lies_on_sphere() {
        for lon in [-180.0, -97.3, 0.0, 12.5, 77.2, 180.0] {
            for lat in [-90.0, -41.3, 0.0, 28.6, 90.0] {
                for r in [0.5, 1.0, 1.01, 42.0] {
                    assert_close(project(lon, lat, r).length(), r, 1e-9);
                }
            }
        }
    }

    #[test]
    fn origin_maps_to_x_axis() {
        assert_vec_close(project(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn north_pole_maps_to_up_for_any_longitude() {
        for lon in [-180.0, -45.0, 0.0, 120.0] {
            assert_vec_close(project(lon, 90.0, 1.5), Vec3::new(0.0, 1.5, 0.0));
        }
    }

    #[test]
    fn longitude_sign_flips_z() {
        for lon in [10.0, 45.0, 90.0, 135.0] {
            let east = project(lon, 0.0, 1.0);
            let west = project(-lon, 0.0, 1.0);
            assert_close(east.z, -west.z, 1e-12);
        }
        // East longitudes land on -z.
        assert!(project(90.0, 0.0, 1.0).z < 0.0);
    }
}
