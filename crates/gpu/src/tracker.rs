use scene::ResourceId;
use tracing::debug;

use crate::backend::GraphicsBackend;

/// Everything a widget allocated, in allocation order, so teardown can hand
/// it all back.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    ids: Vec<ResourceId>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, id: ResourceId) -> ResourceId {
        self.ids.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Releases in reverse allocation order. Returns how many were released.
    pub fn release_all<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
        let count = self.ids.len();
        while let Some(id) = self.ids.pop() {
            backend.release(id);
        }
        debug!(count, "released tracked resources");
        count
    }
}

#[cfg(test)]
mod tests {
    use super::ResourceTracker;
    use crate::backend::GraphicsBackend;
    use crate::recording::RecordingBackend;
    use scene::components::{Geometry, LineMaterial, Material};
    use scene::Color;

    #[test]
    fn release_all_empties_backend() {
        let mut backend = RecordingBackend::new();
        let mut tracker = ResourceTracker::new();
        tracker.track(
            backend
                .create_geometry(&Geometry::sphere(1.0, 8))
                .expect("geometry"),
        );
        tracker.track(
            backend
                .create_material(&Material::Line(LineMaterial {
                    color: Color::WHITE,
                    opacity: 1.0,
                }))
                .expect("material"),
        );
        assert_eq!(backend.live_resources(), 2);

        assert_eq!(tracker.release_all(&mut backend), 2);
        assert!(tracker.is_empty());
        assert_eq!(backend.live_resources(), 0);
        assert_eq!(tracker.release_all(&mut backend), 0);
    }
}
