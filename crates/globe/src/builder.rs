use foundation::math::{Vec3, project};
use gpu::{BackendError, GraphicsBackend, ResourceTracker};
use scene::components::{
    BasicMaterial, Blending, Geometry, GeometrySlot, GradientStop, Light, LineMaterial, Material,
    MaterialSlot, PhongMaterial, PointsMaterial, Side, Texture,
};
use scene::{Color, Node, NodeId, NodeKind, PerspectiveCamera, SceneGraph};
use tracing::debug;

use crate::arc::{ARC_BASE_RADIUS, FlowArc, build_arc};
use crate::config::GlobeConfig;
use crate::connections::FlowConnection;
use crate::loader::GeoContent;

pub const SPHERE_SEGMENTS: u32 = 64;
pub const GLOW_RADIUS: f64 = 1.03;
pub const GLOW_OPACITY: f32 = 0.18;
pub const POINT_RADIUS: f64 = 1.002;
pub const POINT_OPACITY: f32 = 0.9;
pub const GLOW_SPRITE_SIZE: u32 = 32;
pub const CAMERA_DISTANCE: f64 = 3.2;

/// Drawing surface measurements handed in by the host.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl Viewport {
    /// Zero sizes are clamped to one pixel.
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Self {
            width: width.max(1),
            height: height.max(1),
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Nodes that exist from construction on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BaseNodes {
    pub ocean: NodeId,
    pub glow: NodeId,
}

/// Nodes added once boundary data arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoNodes {
    pub points: NodeId,
    pub arcs: Vec<FlowArc>,
}

pub fn camera_for(viewport: Viewport) -> PerspectiveCamera {
    let mut camera = PerspectiveCamera::new(45.0, viewport.aspect(), 0.1, 1000.0);
    camera.position = Vec3::new(0.0, 0.0, CAMERA_DISTANCE);
    camera
}

/// Adds nodes to one scene and records every backend resource they hold.
///
/// Nodes go into the graph only once all of their resources exist, and
/// [`SceneBuilder::rollback`] removes what this builder added.
pub struct SceneBuilder<'a, B: GraphicsBackend + ?Sized> {
    backend: &'a mut B,
    scene: &'a mut SceneGraph,
    tracker: &'a mut ResourceTracker,
    added: Vec<NodeId>,
}

impl<'a, B: GraphicsBackend + ?Sized> SceneBuilder<'a, B> {
    pub fn new(backend: &'a mut B, scene: &'a mut SceneGraph, tracker: &'a mut ResourceTracker) -> Self {
        Self {
            backend,
            scene,
            tracker,
            added: Vec::new(),
        }
    }

    fn geometry(&mut self, geometry: &Geometry) -> Result<GeometrySlot, BackendError> {
        let id = self.backend.create_geometry(geometry)?;
        Ok(GeometrySlot::new(self.tracker.track(id)))
    }

    fn material(&mut self, params: Material) -> Result<MaterialSlot, BackendError> {
        let id = self.backend.create_material(&params)?;
        Ok(MaterialSlot::new(self.tracker.track(id), params))
    }

    fn add(&mut self, name: &str, kind: NodeKind) -> NodeId {
        let id = self.scene.add(Node::new(name, kind));
        self.added.push(id);
        id
    }

    /// Removes every node this builder added. Resources stay tracked for
    /// teardown.
    pub fn rollback(&mut self) {
        for id in self.added.drain(..) {
            self.scene.remove(id);
        }
    }

    pub fn configure_surface(&mut self, config: &GlobeConfig, viewport: Viewport) {
        self.backend.set_pixel_ratio(viewport.pixel_ratio);
        self.backend.set_size(viewport.width, viewport.height);
        let alpha = if config.transparent { 0.0 } else { 1.0 };
        self.backend.set_clear_color(Color::BLACK, alpha);
    }

    /// Ocean sphere, glow shell and lights.
    pub fn build_base(&mut self, config: &GlobeConfig) -> Result<BaseNodes, BackendError> {
        let geometry = self.geometry(&Geometry::sphere(1.0, SPHERE_SEGMENTS))?;
        let material = self.material(Material::Phong(PhongMaterial {
            color: config.ocean_color,
            specular: Color::from_hex_u32(0x222222),
            shininess: 12.0,
        }))?;
        let ocean = self.add("ocean", NodeKind::Mesh { geometry, material });

        let geometry = self.geometry(&Geometry::sphere(GLOW_RADIUS, SPHERE_SEGMENTS))?;
        let material = self.material(Material::Basic(BasicMaterial {
            color: config.glow_color,
            opacity: GLOW_OPACITY,
            side: Side::Back,
            blending: Blending::Additive,
        }))?;
        let glow = self.add("glow", NodeKind::Mesh { geometry, material });

        self.add(
            "ambient",
            NodeKind::Light(Light::Hemisphere {
                sky: Color::WHITE,
                ground: Color::BLACK,
                intensity: 0.6,
            }),
        );
        self.add(
            "key",
            NodeKind::Light(Light::Point {
                color: config.dot_color,
                intensity: 0.8,
                position: Vec3::new(5.0, 5.0, 5.0),
            }),
        );

        debug!(nodes = self.added.len(), "base scene built");
        Ok(BaseNodes { ocean, glow })
    }

    /// One point cloud of every ring vertex plus one hidden line per
    /// connection.
    pub fn build_geo(
        &mut self,
        config: &GlobeConfig,
        content: &GeoContent,
        connections: &[FlowConnection],
    ) -> Result<GeoNodes, BackendError> {
        let sprite = self.backend.create_texture(&glow_sprite())?;
        let sprite = self.tracker.track(sprite);

        let positions: Vec<Vec3> = content
            .rings
            .iter()
            .flat_map(|ring| ring.points.iter())
            .map(|p| project(p.lon_deg, p.lat_deg, POINT_RADIUS))
            .collect();
        let point_count = positions.len();
        let geometry = self.geometry(&Geometry::Points { positions })?;
        let material = self.material(Material::Points(PointsMaterial {
            color: config.dot_color,
            size: config.base_point_size(),
            size_attenuation: true,
            opacity: POINT_OPACITY,
            blending: Blending::Additive,
            depth_write: false,
            map: Some(sprite),
        }))?;
        let points = self.add("boundaries", NodeKind::Points { geometry, material });

        let mut arcs = Vec::with_capacity(connections.len());
        for (index, connection) in connections.iter().enumerate() {
            let (start, end) = connection.endpoints();
            let path = build_arc(start, end, ARC_BASE_RADIUS);
            let samples = path.len();
            let geometry = self.geometry(&Geometry::Polyline { positions: path })?;
            let material = self.material(Material::Line(LineMaterial {
                color: Color::WHITE,
                opacity: 0.0,
            }))?;
            let node = self.add(connection.label, NodeKind::Line { geometry, material });
            arcs.push(FlowArc::new(node, index, samples));
        }

        debug!(points = point_count, arcs = arcs.len(), "geo content built");
        Ok(GeoNodes { points, arcs })
    }
}

/// Soft round sprite for the boundary dots.
pub fn glow_sprite() -> Texture {
    Texture::RadialGradient {
        size: GLOW_SPRITE_SIZE,
        stops: vec![
            GradientStop::new(0.0, Color::from_hex_u32(0x88ff88), 1.0),
            GradientStop::new(0.4, Color::from_hex_u32(0x44ff44), 1.0),
            GradientStop::new(1.0, Color::from_hex_u32(0x00ff88), 0.0),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::{SceneBuilder, Viewport, camera_for};
    use crate::config::GlobeConfig;
    use crate::connections::default_connections;
    use crate::loader::GeoContent;
    use gpu::{RecordingBackend, ResourceTracker};
    use scene::graph::NodeKindTag;
    use scene::{ResourceKind, SceneGraph};

    #[test]
    fn base_scene_has_two_meshes_and_two_lights() {
        let mut backend = RecordingBackend::new();
        let mut scene = SceneGraph::new();
        let mut tracker = ResourceTracker::new();
        let config = GlobeConfig::default();
        let mut builder = SceneBuilder::new(&mut backend, &mut scene, &mut tracker);
        builder.configure_surface(&config, Viewport::new(600, 400, 2.0));
        builder.build_base(&config).expect("base");

        assert_eq!(scene.count(NodeKindTag::Mesh), 2);
        assert_eq!(scene.count(NodeKindTag::Light), 2);
        assert_eq!(tracker.len(), 4);
        assert_eq!(backend.size, (600, 400));
        assert_eq!(backend.pixel_ratio, 2.0);
        assert_eq!(backend.clear.map(|(_, a)| a), Some(0.0));
    }

    #[test]
    fn geo_content_adds_points_and_lines() {
        let mut backend = RecordingBackend::new();
        let mut scene = SceneGraph::new();
        let mut tracker = ResourceTracker::new();
        let content = GeoContent::grid();
        let geo = SceneBuilder::new(&mut backend, &mut scene, &mut tracker)
            .build_geo(&GlobeConfig::default(), &content, default_connections())
            .expect("geo");

        assert_eq!(scene.count(NodeKindTag::Points), 1);
        assert_eq!(scene.count(NodeKindTag::Line), 20);
        assert_eq!(geo.arcs.len(), 20);
        assert_eq!(backend.live_of_kind(ResourceKind::Texture), 1);
        assert_eq!(geo.arcs[4].start_time, 4.0 * 0.3);
    }

    #[test]
    fn rollback_removes_partial_nodes() {
        let mut backend = RecordingBackend::failing_after(5);
        let mut scene = SceneGraph::new();
        let mut tracker = ResourceTracker::new();
        let mut builder = SceneBuilder::new(&mut backend, &mut scene, &mut tracker);
        let result = builder.build_geo(&GlobeConfig::default(), &GeoContent::grid(), default_connections());
        assert!(result.is_err());
        builder.rollback();
        assert!(scene.is_empty());
        assert_eq!(tracker.len(), 5);
    }

    #[test]
    fn camera_sits_on_z_axis() {
        let camera = camera_for(Viewport::new(0, 0, f64::NAN));
        assert_eq!(camera.aspect, 1.0);
        assert_eq!(camera.position.z, 3.2);
        assert_eq!(camera.fov_y_deg, 45.0);
    }
}
