use gpu::{GraphicsBackend, ResourceTracker};
use runtime::event_bus::{Event, EventBus};
use scene::{PerspectiveCamera, SceneGraph};
use tracing::{debug, info, warn};

use crate::arc::FlowArc;
use crate::builder::{BaseNodes, GeoNodes, SceneBuilder, Viewport, camera_for};
use crate::config::{ConfigWarning, GlobeConfig};
use crate::connections::{FlowConnection, default_connections};
use crate::error::GlobeError;
use crate::loader::{ContentOrigin, GeoContent};
use crate::motion::{LoopState, MotionState, normalize_pointer, pulsed_point_opacity, pulsed_point_size};

/// The globe widget: owns its backend, scene and every resource allocated
/// through it.
///
/// The host drives it: `tick` once per animation frame, pointer and resize
/// events as they arrive, `apply_geo_content` when the loader settles and
/// `destroy` once. After `destroy` every call is a no-op.
pub struct Globe<B: GraphicsBackend> {
    backend: B,
    config: GlobeConfig,
    connections: &'static [FlowConnection],
    scene: SceneGraph,
    tracker: ResourceTracker,
    camera: PerspectiveCamera,
    viewport: Viewport,
    base: BaseNodes,
    geo: Option<GeoNodes>,
    motion: MotionState,
    state: LoopState,
    events: EventBus,
}

impl<B: GraphicsBackend> Globe<B> {
    /// Builds the base scene on `backend`.
    ///
    /// On backend failure everything allocated so far is released, the
    /// surface is detached and the host is expected to show its fallback.
    pub fn create(mut backend: B, config: GlobeConfig, viewport: Viewport) -> Result<Self, GlobeError> {
        let mut scene = SceneGraph::new();
        let mut tracker = ResourceTracker::new();

        let built = {
            let mut builder = SceneBuilder::new(&mut backend, &mut scene, &mut tracker);
            builder.configure_surface(&config, viewport);
            builder.build_base(&config)
        };
        let base = match built {
            Ok(base) => base,
            Err(e) => {
                warn!(error = %e, "globe construction failed");
                tracker.release_all(&mut backend);
                backend.detach();
                return Err(GlobeError::BackendUnavailable(e));
            }
        };

        let motion = MotionState::new();
        let mut events = EventBus::new();
        events.info(
            motion.frame(),
            "lifecycle.created",
            format!("{}x{} @{}x", viewport.width, viewport.height, viewport.pixel_ratio),
        );
        info!(width = viewport.width, height = viewport.height, "globe created");

        Ok(Self {
            backend,
            camera: camera_for(viewport),
            config,
            connections: default_connections(),
            scene,
            tracker,
            viewport,
            base,
            geo: None,
            motion,
            state: LoopState::Running,
            events,
        })
    }

    /// Records host options that were rejected while parsing, so they reach
    /// the event stream alongside everything else.
    pub fn with_config_warnings(mut self, warnings: &[ConfigWarning]) -> Self {
        let frame = self.motion.frame();
        for w in warnings {
            self.events.warn(frame, "config.invalid", w.to_string());
        }
        self
    }

    /// Replaces the animated city pairs. Only effective before geo content
    /// arrives.
    pub fn with_connections(mut self, connections: &'static [FlowConnection]) -> Self {
        self.connections = connections;
        self
    }

    /// Adds the boundary point cloud and flow arcs. Returns whether the
    /// content was applied.
    ///
    /// Content arriving after `destroy`, or a second delivery, is discarded.
    /// A backend failure leaves the globe spinning without it.
    pub fn apply_geo_content(&mut self, content: GeoContent) -> bool {
        let frame = self.motion.frame();
        if self.state == LoopState::Stopped {
            debug!("geo content arrived after destroy");
            self.events.info(frame, "geo.discarded", "widget already destroyed");
            return false;
        }
        if self.geo.is_some() {
            self.events.info(frame, "geo.discarded", "content already applied");
            return false;
        }

        for failure in &content.failures {
            self.events.warn(frame, "geo.source_failed", failure.to_string());
        }

        let mut builder = SceneBuilder::new(&mut self.backend, &mut self.scene, &mut self.tracker);
        match builder.build_geo(&self.config, &content, self.connections) {
            Ok(geo) => {
                let origin = match &content.origin {
                    ContentOrigin::Source(url) => url.as_str(),
                    ContentOrigin::Grid => "fallback grid",
                };
                self.events.info(
                    frame,
                    "geo.loaded",
                    format!("{} points from {origin}, {} arcs", content.point_count(), geo.arcs.len()),
                );
                self.geo = Some(geo);
                true
            }
            Err(e) => {
                builder.rollback();
                warn!(error = %e, "could not add geo content");
                self.events.warn(frame, "geo.failed", e.to_string());
                false
            }
        }
    }

    /// Pointer position in page coordinates against the container rect
    /// `[left, top, width, height]`. Tilts towards the pointer and, while a
    /// button is held, orbits the globe.
    pub fn on_pointer_move(&mut self, x: f64, y: f64, rect: [f64; 4]) {
        if self.state == LoopState::Stopped {
            return;
        }
        let (nx, ny) = normalize_pointer(x, y, rect);
        self.motion.point_at(nx, ny);
        self.motion.orbit_mut().drag_to(x, y, rect[3]);
    }

    pub fn on_pointer_down(&mut self, x: f64, y: f64) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.motion.orbit_mut().drag_start(x, y);
    }

    pub fn on_pointer_up(&mut self) {
        self.motion.orbit_mut().drag_end();
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.viewport = Viewport::new(width, height, self.viewport.pixel_ratio);
        self.backend.set_size(self.viewport.width, self.viewport.height);
        self.camera.set_aspect(self.viewport.aspect());
    }

    /// Advances the animation to host time `now_s` and renders one frame.
    /// Returns `false` once stopped.
    pub fn tick(&mut self, now_s: f64) -> bool {
        if self.state == LoopState::Stopped {
            return false;
        }
        let frame = self.motion.advance(now_s);
        let elapsed = frame.time.seconds();
        let rotation = self.motion.rotation(&self.config, elapsed);

        self.scene.set_rotation(self.base.ocean, rotation);
        self.scene.set_rotation(self.base.glow, rotation);

        if let Some(geo) = &self.geo {
            self.scene.set_rotation(geo.points, rotation);
            if let Some(material) = self.scene.points_material_mut(geo.points) {
                material.opacity = pulsed_point_opacity(elapsed);
                material.size = pulsed_point_size(self.config.base_point_size(), elapsed);
            }
            for arc in &geo.arcs {
                let shown = arc.frame_at(elapsed);
                if let Some((geometry, material)) = self.scene.line_mut(arc.node) {
                    geometry.draw_count = Some(shown.draw_count);
                    material.opacity = shown.opacity;
                }
                self.scene.set_rotation(arc.node, rotation);
            }
        }

        self.backend.render(&self.scene, &self.camera);
        true
    }

    /// Stops the loop, releases every resource and detaches the surface.
    /// Idempotent.
    pub fn destroy(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.state = LoopState::Stopped;
        self.geo = None;
        self.scene.clear();
        let released = self.tracker.release_all(&mut self.backend);
        self.backend.detach();
        self.events.info(
            self.motion.frame(),
            "lifecycle.destroyed",
            format!("released {released} resources"),
        );
        info!(released, "globe destroyed");
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn arcs(&self) -> &[FlowArc] {
        self.geo
            .as_ref()
            .map(|geo| geo.arcs.as_slice())
            .unwrap_or_default()
    }

    pub fn has_geo_content(&self) -> bool {
        self.geo.is_some()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }
}
