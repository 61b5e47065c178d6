use foundation::math::{Vec3, sample_quadratic_bezier};
use scene::NodeId;

pub const ARC_SEGMENTS: usize = 60;
pub const ARC_SAMPLES: usize = ARC_SEGMENTS + 1;
pub const ARC_BASE_RADIUS: f64 = 1.0;
pub const ARC_PEAK_OPACITY: f32 = 0.9;

/// Phase offset between consecutive arcs.
pub const ARC_STAGGER_S: f64 = 0.3;
pub const ARC_DURATION_S: f64 = 2.5;
pub const ARC_DELAY_S: f64 = 2.0;

const MIN_ARC_HEIGHT: f64 = 0.3;
const ARC_HEIGHT_FACTOR: f64 = 0.4;
/// Share of the arc height the curve's apex keeps above the base sphere.
const APEX_CLEARANCE: f64 = 0.25;
const COINCIDENT_EPS: f64 = 1e-9;

/// Arc height above the base sphere for a chord of length `distance`.
pub fn arc_height(distance: f64) -> f64 {
    (distance * ARC_HEIGHT_FACTOR).max(MIN_ARC_HEIGHT)
}

/// Control point of the arc from `start` to `end`.
///
/// Normally the chord midpoint pushed out to `base_radius + height`. For
/// long chords, whose midpoint sinks towards the centre, the control is
/// pushed further so the curve's apex stays `APEX_CLEARANCE * height` above
/// the base sphere; antipodal endpoints bend along an arbitrary perpendicular.
pub fn arc_control(start: Vec3, end: Vec3, base_radius: f64) -> Vec3 {
    let height = arc_height(start.distance(end));
    let mid = (start + end).scale(0.5);
    let bend = mid
        .try_normalize()
        .or_else(|| perpendicular(start))
        .unwrap_or(Vec3::Y);
    // The curve at t = 0.5 sits halfway between the chord midpoint and the control.
    let clearing = 2.0 * (base_radius + APEX_CLEARANCE * height) - mid.length();
    bend.scale((base_radius + height).max(clearing))
}

/// Raised quadratic Bézier from `start` to `end`, `ARC_SAMPLES` points long.
///
/// Coincident endpoints give a degenerate arc of identical points.
pub fn build_arc(start: Vec3, end: Vec3, base_radius: f64) -> Vec<Vec3> {
    if start.distance(end) < COINCIDENT_EPS {
        return vec![start; ARC_SAMPLES];
    }
    let control = arc_control(start, end, base_radius);
    sample_quadratic_bezier(start, control, end, ARC_SEGMENTS)
}

fn perpendicular(v: Vec3) -> Option<Vec3> {
    let axis = if v.x.abs() < 0.9 * v.length() { Vec3::X } else { Vec3::Y };
    v.cross(axis).try_normalize()
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ArcPhase {
    /// Before the arc's first start.
    Dormant,
    /// Drawing in, `progress` in `[0, 1)`.
    Drawing { progress: f64 },
    /// Hidden between cycles.
    Resting,
}

/// What an arc shows on a given frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcFrame {
    pub draw_count: usize,
    pub opacity: f32,
}

/// Fade in over the first tenth of the draw, out over the last fifth.
pub fn envelope(progress: f64) -> f64 {
    let level = if progress < 0.1 {
        progress / 0.1
    } else if progress > 0.8 {
        (1.0 - progress) / 0.2
    } else {
        1.0
    };
    level.clamp(0.0, 1.0)
}

/// Animation record for one flow connection.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowArc {
    pub node: NodeId,
    pub samples: usize,
    pub start_time: f64,
    pub duration: f64,
    pub delay: f64,
}

impl FlowArc {
    /// Timing for the `index`-th connection.
    pub fn new(node: NodeId, index: usize, samples: usize) -> Self {
        Self {
            node,
            samples,
            start_time: index as f64 * ARC_STAGGER_S,
            duration: ARC_DURATION_S,
            delay: ARC_DELAY_S,
        }
    }

    pub fn cycle(&self) -> f64 {
        self.duration + self.delay
    }

    pub fn phase_at(&self, elapsed: f64) -> ArcPhase {
        if elapsed < self.start_time {
            return ArcPhase::Dormant;
        }
        let t = (elapsed - self.start_time) % self.cycle();
        if t < self.duration {
            ArcPhase::Drawing {
                progress: t / self.duration,
            }
        } else {
            ArcPhase::Resting
        }
    }

    pub fn frame_at(&self, elapsed: f64) -> ArcFrame {
        let hidden = ArcFrame {
            draw_count: self.samples,
            opacity: 0.0,
        };
        match self.phase_at(elapsed) {
            ArcPhase::Dormant | ArcPhase::Resting => hidden,
            ArcPhase::Drawing { progress } => {
                let draw_count = ((progress * self.samples as f64).floor() as usize).min(self.samples);
                let opacity = if draw_count <= 1 {
                    0.0
                } else {
                    ARC_PEAK_OPACITY * envelope(progress) as f32
                };
                ArcFrame {
                    draw_count,
                    opacity,
                }
            }
        }
    }
}
