use foundation::handles::HandleAllocator;

use crate::components::{
    GeometrySlot, Light, LineMaterial, Material, MaterialSlot, PointsMaterial, Rotation,
};
use crate::entity::NodeId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKindTag {
    Mesh,
    Points,
    Line,
    Light,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh {
        geometry: GeometrySlot,
        material: MaterialSlot,
    },
    Points {
        geometry: GeometrySlot,
        material: MaterialSlot,
    },
    Line {
        geometry: GeometrySlot,
        material: MaterialSlot,
    },
    Light(Light),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub rotation: Rotation,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            rotation: Rotation::identity(),
        }
    }

    pub fn tag(&self) -> NodeKindTag {
        match self.kind {
            NodeKind::Mesh { .. } => NodeKindTag::Mesh,
            NodeKind::Points { .. } => NodeKindTag::Points,
            NodeKind::Line { .. } => NodeKindTag::Line,
            NodeKind::Light(_) => NodeKindTag::Light,
        }
    }

    pub fn geometry(&self) -> Option<&GeometrySlot> {
        match &self.kind {
            NodeKind::Mesh { geometry, .. }
            | NodeKind::Points { geometry, .. }
            | NodeKind::Line { geometry, .. } => Some(geometry),
            NodeKind::Light(_) => None,
        }
    }

    pub fn material(&self) -> Option<&MaterialSlot> {
        match &self.kind {
            NodeKind::Mesh { material, .. }
            | NodeKind::Points { material, .. }
            | NodeKind::Line { material, .. } => Some(material),
            NodeKind::Light(_) => None,
        }
    }
}

/// Retained scene graph: a flat list of nodes in insertion order.
///
/// Nodes describe what to draw; the pixels and buffers behind them belong to
/// whichever backend created the referenced resources.
#[derive(Debug, Default)]
pub struct SceneGraph {
    handles: HandleAllocator,
    nodes: Vec<Option<(NodeId, Node)>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.handles.alloc());
        let idx = id.index() as usize;
        if self.nodes.len() <= idx {
            self.nodes.resize_with(idx + 1, || None);
        }
        self.nodes[idx] = Some((id, node));
        id
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        if !self.handles.free(id.0) {
            return None;
        }
        self.nodes
            .get_mut(id.index() as usize)
            .and_then(Option::take)
            .map(|(_, node)| node)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        match self.nodes.get(id.index() as usize) {
            Some(Some((live, node))) if *live == id => Some(node),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match self.nodes.get_mut(id.index() as usize) {
            Some(Some((live, node))) if *live == id => Some(node),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(id, node)| (*id, node)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, tag: NodeKindTag) -> usize {
        self.iter().filter(|(_, n)| n.tag() == tag).count()
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.iter().filter_map(|(_, n)| match &n.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        })
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Rotation) {
        if let Some(node) = self.get_mut(id) {
            node.rotation = rotation;
        }
    }

    pub fn points_material_mut(&mut self, id: NodeId) -> Option<&mut PointsMaterial> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Points {
                material:
                    MaterialSlot {
                        params: Material::Points(m),
                        ..
                    },
                ..
            } => Some(m),
            _ => None,
        }
    }

    /// Geometry slot and material of a line node, for per-frame animation.
    pub fn line_mut(&mut self, id: NodeId) -> Option<(&mut GeometrySlot, &mut LineMaterial)> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Line {
                geometry,
                material:
                    MaterialSlot {
                        params: Material::Line(m),
                        ..
                    },
            } => Some((geometry, m)),
            _ => None,
        }
    }

    /// Removes every node, returning them in insertion order.
    pub fn clear(&mut self) -> Vec<Node> {
        let ids: Vec<NodeId> = self.iter().map(|(id, _)| id).collect();
        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }
}
