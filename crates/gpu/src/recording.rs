use std::collections::BTreeMap;

use foundation::handles::HandleAllocator;
use scene::components::{Geometry, Material, Texture};
use scene::{Color, PerspectiveCamera, ResourceId, ResourceKind, SceneGraph};
use tracing::trace;

use crate::backend::{BackendError, GraphicsBackend};
use crate::renderer::{RenderFrame, Renderer};

/// Headless backend that keeps bookkeeping instead of pixels.
///
/// Useful wherever a real surface is unavailable: tests, previews, and
/// measuring what a frame would draw.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    handles: HandleAllocator,
    live: BTreeMap<ResourceId, ResourceKind>,
    geometries: BTreeMap<ResourceId, Geometry>,
    released: usize,
    /// Remaining successful allocations before every further one fails.
    allocation_budget: Option<usize>,
    pub pixel_ratio: f64,
    pub size: (u32, u32),
    pub clear: Option<(Color, f32)>,
    pub render_count: u64,
    pub last_frame: Option<RenderFrame>,
    pub detached: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            pixel_ratio: 1.0,
            ..Self::default()
        }
    }

    /// A backend that accepts `n` allocations and then fails, to exercise
    /// partial-construction paths.
    pub fn failing_after(n: usize) -> Self {
        Self {
            allocation_budget: Some(n),
            ..Self::new()
        }
    }

    pub fn live_resources(&self) -> usize {
        self.live.len()
    }

    pub fn live_of_kind(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    pub fn released_resources(&self) -> usize {
        self.released
    }

    pub fn geometry(&self, id: ResourceId) -> Option<&Geometry> {
        self.geometries.get(&id)
    }

    fn allocate(&mut self, kind: ResourceKind, what: &'static str) -> Result<ResourceId, BackendError> {
        if self.detached {
            return Err(BackendError::Detached);
        }
        if let Some(budget) = self.allocation_budget.as_mut() {
            if *budget == 0 {
                return Err(BackendError::AllocationFailed {
                    what,
                    reason: "allocation budget exhausted".to_string(),
                });
            }
            *budget -= 1;
        }
        let id = ResourceId::new(kind, self.handles.alloc());
        self.live.insert(id, kind);
        trace!(?id, what, "allocated");
        Ok(id)
    }
}

impl GraphicsBackend for RecordingBackend {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_clear_color(&mut self, color: Color, alpha: f32) {
        self.clear = Some((color, alpha));
    }

    fn create_geometry(&mut self, geometry: &Geometry) -> Result<ResourceId, BackendError> {
        let id = self.allocate(ResourceKind::Geometry, "geometry")?;
        self.geometries.insert(id, geometry.clone());
        Ok(id)
    }

    fn create_material(&mut self, _material: &Material) -> Result<ResourceId, BackendError> {
        self.allocate(ResourceKind::Material, "material")
    }

    fn create_texture(&mut self, _texture: &Texture) -> Result<ResourceId, BackendError> {
        self.allocate(ResourceKind::Texture, "texture")
    }

    fn release(&mut self, id: ResourceId) {
        if self.live.remove(&id).is_some() {
            self.geometries.remove(&id);
            self.handles.free(id.handle);
            self.released += 1;
        }
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) {
        if self.detached {
            return;
        }
        self.render_count += 1;
        self.last_frame = Some(Renderer::collect(scene, camera));
    }

    fn detach(&mut self) {
        self.detached = true;
    }
}
