use serde_json::Value;
use tracing::trace;

use crate::boundary::{BoundaryFeature, BoundaryPolygon, BoundaryRing, GeoPoint};

/// Reads every Polygon / MultiPolygon feature from an object carrying a
/// `features` array.
///
/// Leniency is deliberate: a feature without usable geometry is skipped, and
/// so is any coordinate entry that is not a `[lon, lat]` pair of numbers.
pub fn features_from_feature_collection(value: &Value) -> Vec<BoundaryFeature> {
    let Some(features) = value.get("features").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        match feature_from_value(feature) {
            Some(f) => out.push(f),
            None => trace!(index, "skipping feature without polygon geometry"),
        }
    }
    out
}

fn feature_from_value(feature: &Value) -> Option<BoundaryFeature> {
    let geometry = feature.get("geometry")?;
    let polygons = polygons_from_geometry(geometry)?;
    let id = match feature.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    Some(BoundaryFeature { id, polygons })
}

fn polygons_from_geometry(geometry: &Value) -> Option<Vec<BoundaryPolygon>> {
    let ty = geometry.get("type").and_then(Value::as_str)?;
    let coords = geometry.get("coordinates").and_then(Value::as_array)?;
    match ty {
        "Polygon" => Some(vec![parse_polygon(coords)]),
        "MultiPolygon" => Some(
            coords
                .iter()
                .filter_map(Value::as_array)
                .map(|poly| parse_polygon(poly))
                .collect(),
        ),
        _ => None,
    }
}

fn parse_polygon(rings: &[Value]) -> BoundaryPolygon {
    BoundaryPolygon {
        rings: rings.iter().map(parse_ring).collect(),
    }
}

fn parse_ring(ring: &Value) -> BoundaryRing {
    let points = ring
        .as_array()
        .map(|entries| entries.iter().filter_map(GeoPoint::from_coordinate).collect())
        .unwrap_or_default();
    BoundaryRing::new(points)
}
