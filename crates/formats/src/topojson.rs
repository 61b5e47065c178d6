use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::boundary::{BoundaryFeature, BoundaryPolygon, BoundaryRing, DatasetError, GeoPoint};

/// Layers tried in order before falling back to the first object by name.
const PREFERRED_LAYERS: [&str; 2] = ["countries", "land"];

#[derive(Debug, Copy, Clone, PartialEq)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

impl Transform {
    fn from_value(value: &Value) -> Result<Self, DatasetError> {
        let pair = |key: &str| -> Result<[f64; 2], DatasetError> {
            let arr = value
                .get(key)
                .and_then(Value::as_array)
                .filter(|a| a.len() >= 2)
                .ok_or_else(|| DatasetError::InvalidTopology(format!("transform.{key} missing")))?;
            match (arr[0].as_f64(), arr[1].as_f64()) {
                (Some(a), Some(b)) => Ok([a, b]),
                _ => Err(DatasetError::InvalidTopology(format!("transform.{key} not numeric"))),
            }
        };
        Ok(Self {
            scale: pair("scale")?,
            translate: pair("translate")?,
        })
    }

    fn apply(&self, x: f64, y: f64) -> [f64; 2] {
        [
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        ]
    }
}

/// A topology with its shared arcs decoded to absolute lon/lat positions.
#[derive(Debug, Clone)]
pub struct Topology {
    arcs: Vec<Vec<[f64; 2]>>,
    layer: Option<Value>,
}

impl Topology {
    pub fn from_value(value: &Value) -> Result<Self, DatasetError> {
        let transform = match value.get("transform") {
            Some(t) if !t.is_null() => Some(Transform::from_value(t)?),
            _ => None,
        };
        let raw_arcs = value
            .get("arcs")
            .and_then(Value::as_array)
            .ok_or_else(|| DatasetError::InvalidTopology("arcs missing".into()))?;
        let arcs = raw_arcs
            .iter()
            .map(|arc| decode_arc(arc, transform.as_ref()))
            .collect();

        let layer = value
            .get("objects")
            .and_then(Value::as_object)
            .and_then(select_layer)
            .cloned();

        Ok(Self { arcs, layer })
    }

    /// Polygon features of the selected layer. An empty topology yields none.
    pub fn features(&self) -> Result<Vec<BoundaryFeature>, DatasetError> {
        let Some(layer) = &self.layer else {
            debug!("topology has no objects");
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        self.collect_features(layer, &mut out)?;
        Ok(out)
    }

    fn collect_features(
        &self,
        geometry: &Value,
        out: &mut Vec<BoundaryFeature>,
    ) -> Result<(), DatasetError> {
        let ty = geometry.get("type").and_then(Value::as_str).unwrap_or_default();
        let polygons = match ty {
            "GeometryCollection" => {
                let members = geometry
                    .get("geometries")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                for member in members {
                    self.collect_features(member, out)?;
                }
                return Ok(());
            }
            "Polygon" => vec![self.polygon(geometry.get("arcs"))?],
            "MultiPolygon" => geometry
                .get("arcs")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .map(|poly| self.polygon(Some(poly)))
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                trace!(kind = other, "skipping non-polygon topology geometry");
                return Ok(());
            }
        };
        let id = match geometry.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        out.push(BoundaryFeature { id, polygons });
        Ok(())
    }

    fn polygon(&self, rings: Option<&Value>) -> Result<BoundaryPolygon, DatasetError> {
        let rings = rings.and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
        let rings = rings
            .iter()
            .map(|ring| self.ring(ring))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BoundaryPolygon { rings })
    }

    /// Stitches arc references into one ring. Consecutive arcs share an
    /// endpoint, so each arc after the first drops the duplicate.
    fn ring(&self, indices: &Value) -> Result<BoundaryRing, DatasetError> {
        let indices = indices.as_array().map(Vec::as_slice).unwrap_or_default();
        let mut positions: Vec<[f64; 2]> = Vec::new();
        for index in indices {
            let Some(index) = index.as_i64() else {
                return Err(DatasetError::InvalidTopology("arc index not an integer".into()));
            };
            let reversed = index < 0;
            let slot = if reversed { !index } else { index };
            let arc = usize::try_from(slot)
                .ok()
                .and_then(|i| self.arcs.get(i))
                .ok_or_else(|| DatasetError::InvalidTopology(format!("arc {index} out of range")))?;
            if arc.is_empty() {
                continue;
            }
            if !positions.is_empty() {
                positions.pop();
            }
            if reversed {
                positions.extend(arc.iter().rev().copied());
            } else {
                positions.extend(arc.iter().copied());
            }
        }
        let points = positions
            .into_iter()
            .filter_map(|[lon, lat]| GeoPoint::checked(lon, lat))
            .collect();
        Ok(BoundaryRing::new(points))
    }
}

fn select_layer(objects: &Map<String, Value>) -> Option<&Value> {
    PREFERRED_LAYERS
        .iter()
        .find_map(|name| objects.get(*name))
        .or_else(|| objects.iter().min_by(|a, b| a.0.cmp(b.0)).map(|(_, v)| v))
}

/// Positions of one arc; quantized arcs are delta-encoded, so the running sum
/// is mapped through the transform.
fn decode_arc(arc: &Value, transform: Option<&Transform>) -> Vec<[f64; 2]> {
    let Some(entries) = arc.as_array() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(entries.len());
    let (mut x, mut y) = (0.0, 0.0);
    for entry in entries {
        let Some(pos) = entry.as_array().filter(|p| p.len() >= 2) else {
            continue;
        };
        let (Some(px), Some(py)) = (pos[0].as_f64(), pos[1].as_f64()) else {
            continue;
        };
        match transform {
            Some(t) => {
                x += px;
                y += py;
                out.push(t.apply(x, y));
            }
            None => out.push([px, py]),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::Topology;
    use crate::boundary::{DatasetError, GeoPoint, outer_rings, parse_boundary_dataset};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pts(pairs: &[(f64, f64)]) -> Vec<GeoPoint> {
        pairs.iter().map(|&(lon, lat)| GeoPoint::new(lon, lat)).collect()
    }

    #[test]
    fn quantized_arcs_accumulate_deltas() {
        let value = json!({
            "type": "Topology",
            "transform": { "scale": [0.5, 0.25], "translate": [-10.0, 5.0] },
            "objects": {
                "land": {
                    "type": "Polygon",
                    "arcs": [[0]]
                }
            },
            "arcs": [[[0, 0], [4, 0], [0, 8], [-4, -8]]]
        });
        let rings = parse_boundary_dataset(&value).expect("rings");
        assert_eq!(rings.len(), 1);
        assert_eq!(
            rings[0].points,
            pts(&[(-10.0, 5.0), (-8.0, 5.0), (-8.0, 7.0), (-10.0, 5.0)])
        );
    }

    #[test]
    fn reversed_arc_and_stitching() {
        let value = json!({
            "type": "Topology",
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "id": "A", "arcs": [[0, -2]] }
                    ]
                }
            },
            "arcs": [
                [[0, 0], [10, 0], [10, 10]],
                [[0, 0], [0, 10], [10, 10]]
            ]
        });
        let topology = Topology::from_value(&value).expect("topology");
        let features = topology.features().expect("features");
        assert_eq!(features[0].id.as_deref(), Some("A"));
        let rings = outer_rings(&features);
        assert_eq!(
            rings[0].points,
            pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)])
        );
    }

    #[test]
    fn multipolygon_keeps_outer_rings_only() {
        let value = json!({
            "type": "Topology",
            "objects": {
                "zeta": { "type": "Polygon", "arcs": [[2]] },
                "alpha": {
                    "type": "MultiPolygon",
                    "arcs": [[[0], [1]], [[2]]]
                }
            },
            "arcs": [
                [[0, 0], [1, 0], [0, 0]],
                [[0.2, 0.2], [0.4, 0.2], [0.2, 0.2]],
                [[50, 50], [51, 50], [50, 50]]
            ]
        });
        let rings = parse_boundary_dataset(&value).expect("rings");
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].points[1], GeoPoint::new(1.0, 0.0));
        assert_eq!(rings[1].points[1], GeoPoint::new(51.0, 50.0));
    }

    #[test]
    fn empty_arc_does_not_drop_shared_vertex() {
        let value = json!({
            "type": "Topology",
            "objects": { "land": { "type": "Polygon", "arcs": [[0, 1, 2]] } },
            "arcs": [
                [[0, 0], [10, 0], [10, 10]],
                [],
                [[10, 10], [0, 10], [0, 0]]
            ]
        });
        let rings = parse_boundary_dataset(&value).expect("rings");
        assert_eq!(
            rings[0].points,
            pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)])
        );
    }

    #[test]
    fn dangling_arc_reference_is_rejected() {
        let value = json!({
            "type": "Topology",
            "objects": { "land": { "type": "Polygon", "arcs": [[7]] } },
            "arcs": []
        });
        assert!(matches!(
            parse_boundary_dataset(&value),
            Err(DatasetError::InvalidTopology(_))
        ));
    }
}
