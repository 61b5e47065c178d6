//! Plain-data side of the wgpu backend: vertex layouts, uniform blocks and
//! pipeline selection. Nothing here touches a device.

use foundation::math::Mat4;
use gpu::{Primitive, RenderCommand};
use scene::components::{Blending, Light, Material, MeshData, Side};
use scene::{Color, PerspectiveCamera};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Interleaves a mesh for the mesh pipelines.
pub fn mesh_vertices(mesh: &MeshData) -> Vec<MeshVertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(&position, &normal)| MeshVertex { position, normal })
        .collect()
}

/// Frame-wide uniforms, bind group 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub view_proj: Mat4,
    pub camera_pos: [f32; 4],
    /// rgb, intensity.
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    /// rgb, intensity.
    pub light_color: [f32; 4],
    pub light_pos: [f32; 4],
    /// Clip-space extent of one world unit of sprite at depth 1: x, y.
    pub sprite_scale: [f32; 4],
}

impl Globals {
    pub fn new(camera: &PerspectiveCamera, lights: &LightRig) -> Self {
        let p = camera.position.as_f32_array();
        Self {
            view_proj: camera.view_proj(),
            camera_pos: [p[0], p[1], p[2], 1.0],
            sky: lights.sky,
            ground: lights.ground,
            light_color: lights.point_color,
            light_pos: lights.point_position,
            sprite_scale: [(1.0 / camera.aspect) as f32, 1.0, 0.0, 0.0],
        }
    }
}

/// The first hemisphere and first point light of a frame, packed for the
/// shaders. Missing lights contribute nothing.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct LightRig {
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    pub point_color: [f32; 4],
    pub point_position: [f32; 4],
}

fn rgb_w(color: Color, w: f32) -> [f32; 4] {
    [color.r, color.g, color.b, w]
}

impl LightRig {
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut rig = LightRig::default();
        let mut have_hemisphere = false;
        let mut have_point = false;
        for light in lights {
            match *light {
                Light::Hemisphere {
                    sky,
                    ground,
                    intensity,
                } if !have_hemisphere => {
                    rig.sky = rgb_w(sky, intensity);
                    rig.ground = rgb_w(ground, 0.0);
                    have_hemisphere = true;
                }
                Light::Point {
                    color,
                    intensity,
                    position,
                } if !have_point => {
                    rig.point_color = rgb_w(color, intensity);
                    let p = position.as_f32_array();
                    rig.point_position = [p[0], p[1], p[2], 1.0];
                    have_point = true;
                }
                _ => {}
            }
        }
        rig
    }
}

/// Per-draw uniforms, bind group 1.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub model: Mat4,
    /// rgb, opacity.
    pub color: [f32; 4],
    /// rgb, shininess.
    pub specular: [f32; 4],
    /// x: sprite size.
    pub params: [f32; 4],
}

impl DrawUniforms {
    pub fn from_command(cmd: &RenderCommand) -> Self {
        let (color, specular, size) = match cmd.material {
            Material::Phong(m) => (rgb_w(m.color, 1.0), rgb_w(m.specular, m.shininess), 0.0),
            Material::Basic(m) => (rgb_w(m.color, m.opacity), [0.0; 4], 0.0),
            Material::Points(m) => (rgb_w(m.color, m.opacity), [0.0; 4], m.size),
            Material::Line(m) => (rgb_w(m.color, m.opacity), [0.0; 4], 0.0),
        };
        Self {
            model: cmd.rotation.matrix(),
            color,
            specular,
            params: [size, 0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Phong,
    Basic,
    Sprites,
    Lines,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cull {
    None,
    Front,
    Back,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Blend {
    Opaque,
    Alpha,
    Additive,
}

/// Everything that distinguishes one render pipeline from another.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub shader: ShaderKind,
    pub cull: Cull,
    pub blend: Blend,
    pub depth_write: bool,
}

fn blend_of(blending: Blending) -> Blend {
    match blending {
        Blending::Normal => Blend::Alpha,
        Blending::Additive => Blend::Additive,
    }
}

impl PipelineKey {
    /// `None` for primitive and material pairs no pipeline draws.
    pub fn for_command(cmd: &RenderCommand) -> Option<Self> {
        let key = match (cmd.primitive, cmd.material) {
            (Primitive::Mesh, Material::Phong(_)) => PipelineKey {
                shader: ShaderKind::Phong,
                cull: Cull::Back,
                blend: Blend::Opaque,
                depth_write: true,
            },
            (Primitive::Mesh, Material::Basic(m)) => PipelineKey {
                shader: ShaderKind::Basic,
                cull: match m.side {
                    Side::Front => Cull::Back,
                    Side::Back => Cull::Front,
                    Side::Double => Cull::None,
                },
                blend: blend_of(m.blending),
                depth_write: false,
            },
            (Primitive::Points, Material::Points(m)) => PipelineKey {
                shader: ShaderKind::Sprites,
                cull: Cull::None,
                blend: blend_of(m.blending),
                depth_write: m.depth_write,
            },
            (Primitive::Line, Material::Line(_)) => PipelineKey {
                shader: ShaderKind::Lines,
                cull: Cull::None,
                blend: Blend::Alpha,
                depth_write: false,
            },
            _ => return None,
        };
        Some(key)
    }
}
