use foundation::math::Vec3;

use crate::resource::ResourceId;

/// Geometry a backend is asked to upload.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    /// Unconnected vertices, drawn as sprites.
    Points { positions: Vec<Vec3> },
    /// Connected vertices, drawn as a line strip.
    Polyline { positions: Vec<Vec3> },
}

impl Geometry {
    pub fn sphere(radius: f64, segments: u32) -> Self {
        Geometry::Sphere {
            radius,
            width_segments: segments,
            height_segments: segments,
        }
    }

    /// Number of vertices a backend uploads for this geometry.
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Sphere {
                width_segments,
                height_segments,
                ..
            } => (*width_segments as usize + 1) * (*height_segments as usize + 1),
            Geometry::Points { positions } | Geometry::Polyline { positions } => positions.len(),
        }
    }
}

/// Indexed triangle mesh with per-vertex normals, counter-clockwise when
/// seen from outside.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// UV sphere with rows from the north pole down and a duplicated seam
/// column.
pub fn sphere_mesh(radius: f64, width_segments: u32, height_segments: u32) -> MeshData {
    let lon_segments = width_segments.max(3);
    let lat_segments = height_segments.max(2);

    let mut mesh = MeshData::default();
    for lat in 0..=lat_segments {
        let theta = f64::from(lat) / f64::from(lat_segments) * std::f64::consts::PI;
        let (sin_t, cos_t) = theta.sin_cos();
        for lon in 0..=lon_segments {
            let phi = f64::from(lon) / f64::from(lon_segments) * std::f64::consts::TAU;
            let (sin_p, cos_p) = phi.sin_cos();
            let normal = Vec3::new(sin_t * cos_p, cos_t, sin_t * sin_p);
            mesh.normals.push(normal.as_f32_array());
            mesh.positions.push(normal.scale(radius).as_f32_array());
        }
    }

    let stride = lon_segments + 1;
    for lat in 0..lat_segments {
        for lon in 0..lon_segments {
            let i0 = lat * stride + lon;
            let i1 = i0 + 1;
            let i2 = i0 + stride;
            let i3 = i2 + 1;
            mesh.indices.extend_from_slice(&[i0, i1, i2, i1, i3, i2]);
        }
    }
    mesh
}

/// A node's view onto an uploaded geometry.
///
/// `draw_count` limits drawing to a prefix of the vertices; `None` draws all.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeometrySlot {
    pub id: ResourceId,
    pub draw_count: Option<usize>,
}

impl GeometrySlot {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            draw_count: None,
        }
    }

    pub fn visible_count(&self, vertex_count: usize) -> usize {
        self.draw_count.map_or(vertex_count, |n| n.min(vertex_count))
    }
}

#[cfg(test)]
mod tests {
    use super::{Geometry, GeometrySlot, sphere_mesh};
    use crate::resource::{ResourceId, ResourceKind};
    use foundation::handles::Handle;
    use foundation::math::Vec3;

    #[test]
    fn sphere_vertex_count_includes_seams() {
        assert_eq!(Geometry::sphere(1.0, 4).vertex_count(), 25);
    }

    #[test]
    fn sphere_mesh_matches_vertex_count_and_faces_outward() {
        let mesh = sphere_mesh(1.03, 8, 6);
        let described = Geometry::Sphere {
            radius: 1.03,
            width_segments: 8,
            height_segments: 6,
        };
        assert_eq!(mesh.positions.len(), described.vertex_count());
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert_eq!(mesh.indices.len(), 8 * 6 * 6);
        assert!(mesh.positions.iter().all(|p| {
            let r = Vec3::new(p[0].into(), p[1].into(), p[2].into()).length();
            (r - 1.03).abs() < 1e-5
        }));

        let at = |i: u32| {
            let p = mesh.positions[i as usize];
            Vec3::new(p[0].into(), p[1].into(), p[2].into())
        };
        for tri in mesh.indices.chunks(3) {
            let (a, b, c) = (at(tri[0]), at(tri[1]), at(tri[2]));
            let facing = (b - a).cross(c - a).dot(a + b + c);
            assert!(facing >= -1e-6, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn draw_count_is_clamped() {
        let id = ResourceId::new(ResourceKind::Geometry, Handle::new(0, 0));
        let mut slot = GeometrySlot::new(id);
        assert_eq!(slot.visible_count(10), 10);
        slot.draw_count = Some(3);
        assert_eq!(slot.visible_count(10), 3);
        slot.draw_count = Some(30);
        assert_eq!(slot.visible_count(10), 10);

        let line = Geometry::Polyline {
            positions: vec![Vec3::ZERO; 4],
        };
        assert_eq!(line.vertex_count(), 4);
    }
}
