use serde_json::Value;
use tracing::debug;

use crate::geojson::features_from_feature_collection;
use crate::topojson::Topology;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Reads one `[lon, lat, ...]` coordinate entry.
    ///
    /// `None` for anything that is not at least two finite numbers inside
    /// geographic bounds; callers skip such entries rather than fail.
    pub fn from_coordinate(value: &Value) -> Option<Self> {
        let arr = value.as_array()?;
        if arr.len() < 2 {
            return None;
        }
        let lon = arr[0].as_f64()?;
        let lat = arr[1].as_f64()?;
        Self::checked(lon, lat)
    }

    pub fn checked(lon_deg: f64, lat_deg: f64) -> Option<Self> {
        let in_range = (-180.0..=180.0).contains(&lon_deg) && (-90.0..=90.0).contains(&lat_deg);
        in_range.then_some(Self::new(lon_deg, lat_deg))
    }
}

/// One closed outline as ordered lon/lat pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryRing {
    pub points: Vec<GeoPoint>,
}

impl BoundaryRing {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A polygon as decoded: outer ring first, then holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryPolygon {
    pub rings: Vec<BoundaryRing>,
}

impl BoundaryPolygon {
    pub fn outer(&self) -> Option<&BoundaryRing> {
        self.rings.first()
    }
}

/// A feature reduced to what the globe cares about: its polygons.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryFeature {
    pub id: Option<String>,
    pub polygons: Vec<BoundaryPolygon>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DatasetShape {
    FeatureCollection,
    Topology,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    UnrecognizedShape,
    InvalidTopology(String),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::UnrecognizedShape => {
                write!(f, "expected a feature collection or a topology")
            }
            DatasetError::InvalidTopology(reason) => write!(f, "invalid topology: {reason}"),
        }
    }
}

impl std::error::Error for DatasetError {}

pub fn detect_shape(value: &Value) -> Option<DatasetShape> {
    let obj = value.as_object()?;
    if obj.get("features").is_some_and(Value::is_array) {
        return Some(DatasetShape::FeatureCollection);
    }
    let is_topology = obj.get("type").and_then(Value::as_str) == Some("Topology")
        || obj.get("objects").is_some_and(Value::is_object);
    if is_topology && obj.get("arcs").is_some_and(Value::is_array) {
        return Some(DatasetShape::Topology);
    }
    None
}

/// Decodes either accepted payload shape into boundary features.
pub fn parse_boundary_features(value: &Value) -> Result<Vec<BoundaryFeature>, DatasetError> {
    match detect_shape(value).ok_or(DatasetError::UnrecognizedShape)? {
        DatasetShape::FeatureCollection => Ok(features_from_feature_collection(value)),
        DatasetShape::Topology => Topology::from_value(value)?.features(),
    }
}

/// Outer rings of every polygon; holes are dropped.
pub fn outer_rings(features: &[BoundaryFeature]) -> Vec<BoundaryRing> {
    features
        .iter()
        .flat_map(|f| f.polygons.iter())
        .filter_map(BoundaryPolygon::outer)
        .filter(|ring| !ring.is_empty())
        .cloned()
        .collect()
}

pub fn parse_boundary_dataset(value: &Value) -> Result<Vec<BoundaryRing>, DatasetError> {
    let features = parse_boundary_features(value)?;
    let rings = outer_rings(&features);
    debug!(features = features.len(), rings = rings.len(), "parsed boundary dataset");
    Ok(rings)
}

#[cfg(test)]
mod tests {
    use super::{DatasetError, DatasetShape, GeoPoint, detect_shape, parse_boundary_dataset};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn coordinate_entries_are_validated() {
        assert_eq!(
            GeoPoint::from_coordinate(&json!([10.0, 20.0, 5.0])),
            Some(GeoPoint::new(10.0, 20.0))
        );
        assert_eq!(GeoPoint::from_coordinate(&json!([10.0])), None);
        assert_eq!(GeoPoint::from_coordinate(&json!(["a", 1.0])), None);
        assert_eq!(GeoPoint::from_coordinate(&json!([200.0, 0.0])), None);
        assert_eq!(GeoPoint::from_coordinate(&json!({"lon": 1})), None);
    }

    #[test]
    fn detects_both_shapes() {
        assert_eq!(
            detect_shape(&json!({"type": "FeatureCollection", "features": []})),
            Some(DatasetShape::FeatureCollection)
        );
        assert_eq!(
            detect_shape(&json!({"type": "Topology", "objects": {}, "arcs": []})),
            Some(DatasetShape::Topology)
        );
        assert_eq!(detect_shape(&json!({"type": "Feature"})), None);
        assert_eq!(detect_shape(&json!([1, 2, 3])), None);
    }

    #[test]
    fn unknown_shape_is_an_error() {
        assert_eq!(
            parse_boundary_dataset(&json!({"hello": "world"})),
            Err(DatasetError::UnrecognizedShape)
        );
    }

    #[test]
    fn holes_are_ignored() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [
                        [[0, 0], [10, 0], [10, 10], [0, 0]],
                        [[2, 2], [3, 2], [3, 3], [2, 2]]
                    ]
                }
            }]
        });
        let rings = parse_boundary_dataset(&value).expect("rings");
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0].points[1], GeoPoint::new(10.0, 0.0));
    }
}
