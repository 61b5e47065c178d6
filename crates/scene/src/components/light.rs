use foundation::math::Vec3;

use crate::color::Color;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Light {
    /// Sky/ground gradient ambient term.
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
    Point {
        color: Color,
        intensity: f32,
        position: Vec3,
    },
}
