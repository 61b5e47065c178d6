use scene::components::{Blending, GeometrySlot, Light, Material, Rotation};
use scene::entity::NodeId;
use scene::{NodeKind, PerspectiveCamera, ResourceId, SceneGraph};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Primitive {
    Mesh,
    Points,
    Line,
}

/// One draw call, resolved from a scene node.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderCommand {
    pub node: NodeId,
    pub primitive: Primitive,
    pub geometry: GeometrySlot,
    pub material_id: ResourceId,
    pub material: Material,
    pub rotation: Rotation,
}

impl RenderCommand {
    pub fn opacity(&self) -> f32 {
        self.material.opacity()
    }

    pub fn is_additive(&self) -> bool {
        self.material.blending() == Blending::Additive
    }
}

#[derive(Debug, Default, Clone)]
pub struct RenderFrame {
    pub commands: Vec<RenderCommand>,
    pub lights: Vec<Light>,
    pub camera: Option<PerspectiveCamera>,
}

impl RenderFrame {
    pub fn count(&self, primitive: Primitive) -> usize {
        self.commands
            .iter()
            .filter(|c| c.primitive == primitive)
            .count()
    }
}

pub struct Renderer;

impl Renderer {
    /// Resolves the scene into draw commands in painter's order: opaque
    /// meshes first, then translucent meshes, then points and lines. Fully
    /// transparent nodes are skipped.
    pub fn collect(scene: &SceneGraph, camera: &PerspectiveCamera) -> RenderFrame {
        let mut frame = RenderFrame {
            commands: Vec::new(),
            lights: scene.lights().copied().collect(),
            camera: Some(*camera),
        };
        for (id, node) in scene.iter() {
            let (primitive, geometry, material) = match &node.kind {
                NodeKind::Mesh { geometry, material } => (Primitive::Mesh, geometry, material),
                NodeKind::Points { geometry, material } => {
                    (Primitive::Points, geometry, material)
                }
                NodeKind::Line { geometry, material } => (Primitive::Line, geometry, material),
                NodeKind::Light(_) => continue,
            };
            if material.params.opacity() <= 0.0 || geometry.draw_count == Some(0) {
                continue;
            }
            frame.commands.push(RenderCommand {
                node: id,
                primitive,
                geometry: *geometry,
                material_id: material.id,
                material: material.params,
                rotation: node.rotation,
            });
        }
        frame.commands.sort_by_key(draw_order);
        frame
    }
}

fn draw_order(cmd: &RenderCommand) -> u8 {
    match (cmd.primitive, cmd.material) {
        (Primitive::Mesh, Material::Phong(_)) => 0,
        (Primitive::Mesh, _) => 1,
        (Primitive::Points, _) => 2,
        (Primitive::Line, _) => 3,
    }
}
