use runtime::frame::{Frame, FrameClock};
use scene::components::Rotation;

use crate::config::GlobeConfig;

/// Fraction of the remaining tilt gap closed each frame.
pub const SMOOTHING: f64 = 0.07;
pub const POINTER_YAW_RANGE: f64 = 0.5;
pub const POINTER_PITCH_RANGE: f64 = 0.25;

/// Full turn per container height of drag, scaled down.
pub const ORBIT_ROTATE_SPEED: f64 = 0.4;
/// Fraction of the pending orbit applied per 60 Hz frame.
pub const ORBIT_DAMPING: f64 = 0.05;
const ORBIT_REST_EPS: f64 = 1e-5;
const ORBIT_PITCH_LIMIT: f64 = std::f64::consts::FRAC_PI_2 - 1e-3;
const MAX_STEP_S: f64 = 0.1;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Tilt {
    pub yaw: f64,
    pub pitch: f64,
}

/// Maps a pointer position inside `rect` (`left, top, width, height`) to
/// `[-1, 1]` on both axes. Degenerate rects map to the centre.
pub fn normalize_pointer(x: f64, y: f64, rect: [f64; 4]) -> (f64, f64) {
    let [left, top, width, height] = rect;
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    ((x - left) / width * 2.0 - 1.0, (y - top) / height * 2.0 - 1.0)
}

/// Drag-to-orbit with damped follow-through. Rotation only: no zoom or pan.
///
/// Drags queue rotation as `pending`; each step applies a damped share of it,
/// so the globe keeps coasting briefly after release.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Orbit {
    pub yaw: f64,
    pub pitch: f64,
    pending: Tilt,
    last_px: Option<(f64, f64)>,
}

impl Orbit {
    pub fn is_dragging(&self) -> bool {
        self.last_px.is_some()
    }

    pub fn is_settled(&self) -> bool {
        !self.is_dragging() && self.pending == Tilt::default()
    }

    pub fn drag_start(&mut self, x: f64, y: f64) {
        self.last_px = Some((x, y));
    }

    /// Pointer moved to `(x, y)` over a container `height_px` tall.
    pub fn drag_to(&mut self, x: f64, y: f64, height_px: f64) {
        let Some((lx, ly)) = self.last_px else {
            return;
        };
        self.last_px = Some((x, y));
        if height_px <= 0.0 {
            return;
        }
        let per_px = std::f64::consts::TAU / height_px * ORBIT_ROTATE_SPEED;
        self.pending.yaw += (x - lx) * per_px;
        self.pending.pitch += (y - ly) * per_px;
    }

    pub fn drag_end(&mut self) {
        self.last_px = None;
    }

    /// Applies the damped share of pending rotation for a step of `dt_s`.
    pub fn step(&mut self, dt_s: f64) {
        let dt = dt_s.clamp(0.0, MAX_STEP_S);
        let share = 1.0 - (1.0 - ORBIT_DAMPING).powf(dt * 60.0);
        self.yaw += self.pending.yaw * share;
        self.pitch = (self.pitch + self.pending.pitch * share).clamp(-ORBIT_PITCH_LIMIT, ORBIT_PITCH_LIMIT);
        self.pending.yaw *= 1.0 - share;
        self.pending.pitch *= 1.0 - share;
        if self.pending.yaw.abs().max(self.pending.pitch.abs()) < ORBIT_REST_EPS {
            self.pending = Tilt::default();
        }
    }
}

/// Pointer-driven tilt with exponential smoothing, drag orbit, plus the
/// elapsed clock.
#[derive(Debug, Default, Clone)]
pub struct MotionState {
    current: Tilt,
    target: Tilt,
    orbit: Orbit,
    clock: FrameClock,
}

impl MotionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent frame, for stamping events.
    pub fn frame(&self) -> Frame {
        self.clock.current()
    }

    pub fn current(&self) -> Tilt {
        self.current
    }

    pub fn target(&self) -> Tilt {
        self.target
    }

    /// Remaining distance between smoothed and target tilt.
    pub fn gap(&self) -> f64 {
        (self.target.yaw - self.current.yaw).hypot(self.target.pitch - self.current.pitch)
    }

    pub fn point_at(&mut self, nx: f64, ny: f64) {
        self.target = Tilt {
            yaw: nx * POINTER_YAW_RANGE,
            pitch: ny * POINTER_PITCH_RANGE,
        };
    }

    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut Orbit {
        &mut self.orbit
    }

    /// Ticks the clock, moves the tilt one smoothing step and lets the orbit
    /// coast.
    pub fn advance(&mut self, now_s: f64) -> Frame {
        let frame = self.clock.advance(now_s);
        self.current.yaw += (self.target.yaw - self.current.yaw) * SMOOTHING;
        self.current.pitch += (self.target.pitch - self.current.pitch) * SMOOTHING;
        self.orbit.step(frame.dt_s);
        frame
    }

    /// Globe orientation at `elapsed` seconds.
    pub fn rotation(&self, config: &GlobeConfig, elapsed: f64) -> Rotation {
        let spin = if config.auto_rotate {
            elapsed * config.rotation_speed
        } else {
            0.0
        };
        Rotation::new(
            self.current.pitch + self.orbit.pitch,
            config.initial_yaw_rad() + spin + self.current.yaw + self.orbit.yaw,
        )
    }
}

/// Dot pulse in `[0, 1]`.
pub fn pulse(elapsed: f64) -> f64 {
    ((2.0 * elapsed).sin() + 1.0) / 2.0
}

pub fn pulsed_point_opacity(elapsed: f64) -> f32 {
    (0.6 + 0.4 * pulse(elapsed)) as f32
}

pub fn pulsed_point_size(base: f32, elapsed: f64) -> f32 {
    base * (0.8 + 0.4 * pulse(elapsed)) as f32
}
