use scene::components::{Geometry, Material, Texture};
use scene::{Color, PerspectiveCamera, ResourceId, SceneGraph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No rendering surface could be acquired (no graphics capability).
    SurfaceUnavailable(String),
    /// The surface exists but refused to allocate a resource.
    AllocationFailed { what: &'static str, reason: String },
    /// The backend was detached and no longer accepts work.
    Detached,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::SurfaceUnavailable(reason) => {
                write!(f, "rendering surface unavailable: {reason}")
            }
            BackendError::AllocationFailed { what, reason } => {
                write!(f, "failed to allocate {what}: {reason}")
            }
            BackendError::Detached => write!(f, "backend already detached"),
        }
    }
}

impl std::error::Error for BackendError {}

/// The rendering engine seen as a black box.
///
/// Resources come back as opaque ids owned by the caller, who must `release`
/// them. Nodes in the `SceneGraph` reference those ids; `render` draws the
/// graph as it stands.
pub trait GraphicsBackend {
    fn set_pixel_ratio(&mut self, ratio: f64);

    fn set_size(&mut self, width: u32, height: u32);

    fn set_clear_color(&mut self, color: Color, alpha: f32);

    fn create_geometry(&mut self, geometry: &Geometry) -> Result<ResourceId, BackendError>;

    fn create_material(&mut self, material: &Material) -> Result<ResourceId, BackendError>;

    fn create_texture(&mut self, texture: &Texture) -> Result<ResourceId, BackendError>;

    fn release(&mut self, id: ResourceId);

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera);

    /// Removes the rendering surface from its host. Further calls are no-ops
    /// or fail with `BackendError::Detached`.
    fn detach(&mut self);
}

impl<B: GraphicsBackend + ?Sized> GraphicsBackend for &mut B {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        (**self).set_pixel_ratio(ratio)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        (**self).set_size(width, height)
    }

    fn set_clear_color(&mut self, color: Color, alpha: f32) {
        (**self).set_clear_color(color, alpha)
    }

    fn create_geometry(&mut self, geometry: &Geometry) -> Result<ResourceId, BackendError> {
        (**self).create_geometry(geometry)
    }

    fn create_material(&mut self, material: &Material) -> Result<ResourceId, BackendError> {
        (**self).create_material(material)
    }

    fn create_texture(&mut self, texture: &Texture) -> Result<ResourceId, BackendError> {
        (**self).create_texture(texture)
    }

    fn release(&mut self, id: ResourceId) {
        (**self).release(id)
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) {
        (**self).render(scene, camera)
    }

    fn detach(&mut self) {
        (**self).detach()
    }
}
