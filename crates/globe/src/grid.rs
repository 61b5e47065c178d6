use formats::{BoundaryRing, GeoPoint};

const STEP_DEG: i32 = 5;

/// Graticule shown when no boundary dataset could be loaded: parallels every
/// 20° from -80° to 80°, and meridian great circles every 20°, each sampled
/// every 5°.
///
/// Parallels run the full 0..=360 longitude sweep, so their longitudes are not
/// normalized to [-180, 180].
pub fn fallback_grid() -> Vec<BoundaryRing> {
    let parallels = (-4..=4).map(|i| {
        let lat = f64::from(i * 20);
        let points = (0..=360 / STEP_DEG)
            .map(|j| GeoPoint::new(f64::from(j * STEP_DEG), lat))
            .collect();
        BoundaryRing::new(points)
    });
    let meridians = (0..9).map(|i| {
        let lon = f64::from(i * 20);
        let points = (-90 / STEP_DEG..=90 / STEP_DEG)
            .map(|j| GeoPoint::new(lon, f64::from(j * STEP_DEG)))
            .collect();
        BoundaryRing::new(points)
    });
    parallels.chain(meridians).collect()
}

#[cfg(test)]
mod tests {
    use super::fallback_grid;

    #[test]
    fn grid_shape() {
        let rings = fallback_grid();
        assert_eq!(rings.len(), 18);
        let parallels = &rings[..9];
        let meridians = &rings[9..];
        assert!(parallels.iter().all(|r| r.len() == 73));
        assert!(meridians.iter().all(|r| r.len() == 37));
        assert_eq!(parallels[0].points[0].lat_deg, -80.0);
        assert_eq!(parallels[8].points[72].lon_deg, 360.0);
        assert_eq!(meridians[8].points[0].lon_deg, 160.0);
        assert_eq!(meridians[0].points[0].lat_deg, -90.0);
        assert_eq!(meridians[0].points[36].lat_deg, 90.0);
        let total: usize = rings.iter().map(|r| r.len()).sum();
        assert_eq!(total, 9 * 73 + 9 * 37);
    }

    #[test]
    fn samples_are_five_degrees_apart() {
        let rings = fallback_grid();
        for ring in &rings[..9] {
            for pair in ring.points.windows(2) {
                assert_eq!(pair[1].lon_deg - pair[0].lon_deg, 5.0);
            }
        }
        for ring in &rings[9..] {
            for pair in ring.points.windows(2) {
                assert_eq!(pair[1].lat_deg - pair[0].lat_deg, 5.0);
            }
        }
    }
}
