use crate::color::Color;
use crate::resource::ResourceId;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

/// Lit surface with a specular highlight.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PhongMaterial {
    pub color: Color,
    pub specular: Color,
    pub shininess: f32,
}

/// Unlit surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BasicMaterial {
    pub color: Color,
    pub opacity: f32,
    pub side: Side,
    pub blending: Blending,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointsMaterial {
    pub color: Color,
    /// World-space sprite size when `size_attenuation` is on.
    pub size: f32,
    pub size_attenuation: bool,
    pub opacity: f32,
    pub blending: Blending,
    pub depth_write: bool,
    pub map: Option<ResourceId>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineMaterial {
    pub color: Color,
    pub opacity: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Material {
    Phong(PhongMaterial),
    Basic(BasicMaterial),
    Points(PointsMaterial),
    Line(LineMaterial),
}

impl Material {
    pub fn opacity(&self) -> f32 {
        match self {
            Material::Phong(_) => 1.0,
            Material::Basic(m) => m.opacity,
            Material::Points(m) => m.opacity,
            Material::Line(m) => m.opacity,
        }
    }

    pub fn blending(&self) -> Blending {
        match self {
            Material::Basic(m) => m.blending,
            Material::Points(m) => m.blending,
            Material::Phong(_) | Material::Line(_) => Blending::Normal,
        }
    }
}

/// A node's material: the backend handle plus the live parameters the
/// backend reads at draw time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MaterialSlot {
    pub id: ResourceId,
    pub params: Material,
}

impl MaterialSlot {
    pub fn new(id: ResourceId, params: Material) -> Self {
        Self { id, params }
    }
}

/// Texture a backend is asked to create.
#[derive(Debug, Clone, PartialEq)]
pub enum Texture {
    /// Square sprite with a radial falloff from the centre outward.
    RadialGradient {
        size: u32,
        stops: Vec<GradientStop>,
    },
}

impl Texture {
    /// Straight-alpha RGBA8 pixels, row-major, returned with the edge length.
    pub fn rasterize(&self) -> (u32, Vec<u8>) {
        match self {
            Texture::RadialGradient { size, stops } => {
                let size = (*size).max(1);
                let half = size as f32 / 2.0;
                let mut pixels = Vec::with_capacity((size * size * 4) as usize);
                for y in 0..size {
                    for x in 0..size {
                        let dx = x as f32 + 0.5 - half;
                        let dy = y as f32 + 0.5 - half;
                        let (color, alpha) = sample_stops(stops, (dx.hypot(dy) / half).min(1.0));
                        let [r, g, b] = color.to_rgb8();
                        pixels.extend_from_slice(&[r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8]);
                    }
                }
                (size, pixels)
            }
        }
    }
}

/// Colour and alpha at `t`, holding the end stops beyond their offsets.
fn sample_stops(stops: &[GradientStop], t: f32) -> (Color, f32) {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return (Color::BLACK, 0.0);
    };
    if t <= first.offset {
        return (first.color, first.alpha);
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let k = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return (a.color.lerp(b.color, k), a.alpha + (b.alpha - a.alpha) * k);
        }
    }
    (last.color, last.alpha)
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
    pub alpha: f32,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color, alpha: f32) -> Self {
        Self {
            offset,
            color,
            alpha,
        }
    }
}
