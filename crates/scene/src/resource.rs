use foundation::handles::Handle;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Geometry,
    Material,
    Texture,
}

/// Opaque handle to something a graphics backend allocated on our behalf.
///
/// Whoever asked for the resource owns it and must hand it back for release.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub handle: Handle,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, handle: Handle) -> Self {
        Self { kind, handle }
    }
}
