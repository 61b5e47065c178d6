#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use std::borrow::Cow;
    use std::collections::BTreeMap;
    use std::collections::HashMap;

    use foundation::handles::HandleAllocator;
    use gpu::{BackendError, GraphicsBackend, Primitive, Renderer};
    use scene::components::{Geometry, Material, Texture, sphere_mesh};
    use scene::{Color, PerspectiveCamera, ResourceId, ResourceKind, SceneGraph};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement};

    use crate::shading::{
        Blend, Cull, DrawUniforms, Globals, LightRig, MeshVertex, PipelineKey, ShaderKind,
        mesh_vertices,
    };

    const COMMON_WGSL: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    sky: vec4<f32>,
    ground: vec4<f32>,
    light_color: vec4<f32>,
    light_pos: vec4<f32>,
    sprite_scale: vec4<f32>,
};

struct Draw {
    model: mat4x4<f32>,
    color: vec4<f32>,
    specular: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> per_draw: Draw;
"#;

    const PHONG_SHADER: &str = r#"
struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) world: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VsOut {
    let world = per_draw.model * vec4<f32>(position, 1.0);
    let n = (per_draw.model * vec4<f32>(normal, 0.0)).xyz;
    return VsOut(globals.view_proj * world, world.xyz, n);
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let hemi = mix(globals.ground.rgb, globals.sky.rgb, 0.5 * n.y + 0.5) * globals.sky.w;

    let l = normalize(globals.light_pos.xyz - in.world);
    let radiance = globals.light_color.rgb * globals.light_color.w;
    let ndotl = max(dot(n, l), 0.0);

    let v = normalize(globals.camera_pos.xyz - in.world);
    let h = normalize(l + v);
    var spec = vec3<f32>(0.0);
    if (ndotl > 0.0) {
        spec = pow(max(dot(n, h), 0.0), per_draw.specular.w) * per_draw.specular.rgb * radiance;
    }

    let rgb = per_draw.color.rgb * (hemi + radiance * ndotl) + spec;
    return vec4<f32>(rgb, 1.0);
}
"#;

    const BASIC_SHADER: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> @builtin(position) vec4<f32> {
    return globals.view_proj * per_draw.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    let a = per_draw.color.a;
    return vec4<f32>(per_draw.color.rgb * a, a);
}
"#;

    const SPRITE_SHADER: &str = r#"
@group(2) @binding(0)
var sprite_map: texture_2d<f32>;
@group(2) @binding(1)
var sprite_sampler: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vid: u32, @location(0) centre: vec3<f32>) -> VsOut {
    let uv = vec2<f32>(f32(vid & 1u), f32(vid >> 1u));
    var clip = globals.view_proj * per_draw.model * vec4<f32>(centre, 1.0);
    let offset = (uv - vec2<f32>(0.5)) * per_draw.params.x * globals.sprite_scale.xy;
    clip = vec4<f32>(clip.xy + offset, clip.zw);
    return VsOut(clip, uv);
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let texel = textureSample(sprite_map, sprite_sampler, in.uv);
    let a = texel.a * per_draw.color.a;
    return vec4<f32>(per_draw.color.rgb * texel.rgb * a, a);
}
"#;

    const LINE_SHADER: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return globals.view_proj * per_draw.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    let a = per_draw.color.a;
    return vec4<f32>(per_draw.color.rgb * a, a);
}
"#;

    /// Uploaded vertex data. Empty geometries keep no buffer.
    enum GpuGeometry {
        Mesh {
            vertices: ::wgpu::Buffer,
            indices: ::wgpu::Buffer,
            index_count: u32,
        },
        Points {
            instances: Option<::wgpu::Buffer>,
            count: usize,
        },
        Line {
            vertices: Option<::wgpu::Buffer>,
            count: usize,
        },
    }

    /// WebGPU (or WebGL2) rendition of the globe scene on a canvas of its own.
    pub struct WgpuBackend {
        canvas: HtmlCanvasElement,
        surface: ::wgpu::Surface<'static>,
        _instance: ::wgpu::Instance,
        device: ::wgpu::Device,
        queue: ::wgpu::Queue,
        config: ::wgpu::SurfaceConfiguration,
        alpha_modes: Vec<::wgpu::CompositeAlphaMode>,
        depth_view: ::wgpu::TextureView,
        globals_buffer: ::wgpu::Buffer,
        globals_bind_group: ::wgpu::BindGroup,
        globals_layout: ::wgpu::BindGroupLayout,
        draw_layout: ::wgpu::BindGroupLayout,
        sprite_layout: ::wgpu::BindGroupLayout,
        draw_buffer: ::wgpu::Buffer,
        draw_bind_group: ::wgpu::BindGroup,
        draw_capacity: usize,
        draw_stride: u64,
        sampler: ::wgpu::Sampler,
        blank_sprite: ::wgpu::BindGroup,
        pipelines: HashMap<PipelineKey, ::wgpu::RenderPipeline>,
        handles: HandleAllocator,
        geometries: BTreeMap<ResourceId, GpuGeometry>,
        materials: BTreeMap<ResourceId, ::wgpu::BindGroup>,
        textures: BTreeMap<ResourceId, ::wgpu::TextureView>,
        pixel_ratio: f64,
        size: (u32, u32),
        clear: (Color, f32),
        detached: bool,
        reported_error: bool,
    }

    fn surface_error(what: &str, err: impl std::fmt::Display) -> BackendError {
        BackendError::SurfaceUnavailable(format!("{what}: {err}"))
    }

    fn js_surface_error(what: &str, err: JsValue) -> BackendError {
        BackendError::SurfaceUnavailable(format!("{what}: {err:?}"))
    }

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("globe-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn uniform_layout_entry(dynamic: bool) -> ::wgpu::BindGroupLayoutEntry {
        ::wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: ::wgpu::BindingType::Buffer {
                ty: ::wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: None,
            },
            count: None,
        }
    }

    fn create_draw_buffer(
        device: &::wgpu::Device,
        layout: &::wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (::wgpu::Buffer, ::wgpu::BindGroup) {
        let buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("globe-draw-uniforms"),
            size: stride * capacity.max(1) as u64,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("globe-draw-bg"),
            layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: ::wgpu::BindingResource::Buffer(::wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: ::wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn sprite_bind_group(
        device: &::wgpu::Device,
        layout: &::wgpu::BindGroupLayout,
        view: &::wgpu::TextureView,
        sampler: &::wgpu::Sampler,
    ) -> ::wgpu::BindGroup {
        device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("globe-sprite-bg"),
            layout,
            entries: &[
                ::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ::wgpu::BindingResource::TextureView(view),
                },
                ::wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ::wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn upload_rgba(
        device: &::wgpu::Device,
        queue: &::wgpu::Queue,
        size: u32,
        rgba: &[u8],
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture_with_data(
            queue,
            &::wgpu::TextureDescriptor {
                label: Some("globe-sprite"),
                size: ::wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: ::wgpu::TextureDimension::D2,
                format: ::wgpu::TextureFormat::Rgba8Unorm,
                usage: ::wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            ::wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn vertex_buffer(device: &::wgpu::Device, label: &str, positions: &[[f32; 3]]) -> Option<::wgpu::Buffer> {
        if positions.is_empty() {
            return None;
        }
        Some(device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(positions),
            usage: ::wgpu::BufferUsages::VERTEX,
        }))
    }

    fn blend_state(blend: Blend) -> ::wgpu::BlendState {
        match blend {
            Blend::Opaque => ::wgpu::BlendState::REPLACE,
            Blend::Alpha => ::wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
            Blend::Additive => ::wgpu::BlendState {
                color: ::wgpu::BlendComponent {
                    src_factor: ::wgpu::BlendFactor::One,
                    dst_factor: ::wgpu::BlendFactor::One,
                    operation: ::wgpu::BlendOperation::Add,
                },
                alpha: ::wgpu::BlendComponent {
                    src_factor: ::wgpu::BlendFactor::Zero,
                    dst_factor: ::wgpu::BlendFactor::One,
                    operation: ::wgpu::BlendOperation::Add,
                },
            },
        }
    }

    fn position_attribute() -> [::wgpu::VertexAttribute; 1] {
        [::wgpu::VertexAttribute {
            format: ::wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        }]
    }

    const MESH_ATTRIBUTES: [::wgpu::VertexAttribute; 2] = [
        ::wgpu::VertexAttribute {
            format: ::wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        },
        ::wgpu::VertexAttribute {
            format: ::wgpu::VertexFormat::Float32x3,
            offset: 12,
            shader_location: 1,
        },
    ];

    impl WgpuBackend {
        /// Creates a canvas filling `container`, appends it and acquires a
        /// device for it. WebGPU is preferred; WebGL2 is the fallback.
        pub async fn attach(document: &Document, container: &HtmlElement) -> Result<Self, BackendError> {
            let canvas = document
                .create_element("canvas")
                .map_err(|e| js_surface_error("cannot create canvas", e))?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| BackendError::SurfaceUnavailable("not a canvas".to_string()))?;
            let style = canvas.style();
            for (key, value) in [
                ("position", "absolute"),
                ("inset", "0"),
                ("display", "block"),
                ("pointer-events", "none"),
            ] {
                style
                    .set_property(key, value)
                    .map_err(|e| js_surface_error("cannot style canvas", e))?;
            }
            container
                .append_child(&canvas)
                .map_err(|e| js_surface_error("cannot attach canvas", e))?;

            match Self::init(canvas.clone()).await {
                Ok(backend) => Ok(backend),
                Err(e) => {
                    canvas.remove();
                    Err(e)
                }
            }
        }

        async fn init(canvas: HtmlCanvasElement) -> Result<Self, BackendError> {
            let instance = ::wgpu::Instance::new(&::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            });
            let surface = instance
                .create_surface(::wgpu::SurfaceTarget::Canvas(canvas.clone()))
                .map_err(|e| surface_error("surface error", e))?;
            let adapter = instance
                .request_adapter(&::wgpu::RequestAdapterOptions {
                    power_preference: ::wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| surface_error("adapter error", e))?;
            let (device, queue) = adapter
                .request_device(&::wgpu::DeviceDescriptor {
                    label: Some("globe-device"),
                    required_features: ::wgpu::Features::empty(),
                    required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                    ..Default::default()
                })
                .await
                .map_err(|e| surface_error("device error", e))?;

            let caps = surface.get_capabilities(&adapter);
            // Colours are authored in display space, so skip sRGB encoding.
            let format = caps
                .formats
                .iter()
                .copied()
                .find(|f| !f.is_srgb())
                .or_else(|| caps.formats.first().copied())
                .ok_or_else(|| BackendError::SurfaceUnavailable("no surface format".to_string()))?;
            let alpha_mode = caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(::wgpu::CompositeAlphaMode::Auto);
            let config = ::wgpu::SurfaceConfiguration {
                usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: canvas.width().max(1),
                height: canvas.height().max(1),
                desired_maximum_frame_latency: 2,
                present_mode: ::wgpu::PresentMode::Fifo,
                alpha_mode,
                view_formats: vec![],
            };
            surface.configure(&device, &config);
            let depth_view = create_depth_view(&device, &config);

            let globals_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("globe-globals-bgl"),
                entries: &[uniform_layout_entry(false)],
            });
            let draw_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("globe-draw-bgl"),
                entries: &[uniform_layout_entry(true)],
            });
            let sprite_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("globe-sprite-bgl"),
                entries: &[
                    ::wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: ::wgpu::ShaderStages::FRAGMENT,
                        ty: ::wgpu::BindingType::Texture {
                            sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: ::wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    ::wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: ::wgpu::ShaderStages::FRAGMENT,
                        ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

            let globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
                label: Some("globe-globals"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("globe-globals-bg"),
                layout: &globals_layout,
                entries: &[::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                }],
            });

            let align = u64::from(device.limits().min_uniform_buffer_offset_alignment);
            let draw_stride = (std::mem::size_of::<DrawUniforms>() as u64).div_ceil(align) * align;
            let draw_capacity = 8;
            let (draw_buffer, draw_bind_group) =
                create_draw_buffer(&device, &draw_layout, draw_stride, draw_capacity);

            let sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
                label: Some("globe-sprite-sampler"),
                mag_filter: ::wgpu::FilterMode::Linear,
                min_filter: ::wgpu::FilterMode::Linear,
                ..Default::default()
            });
            let white = upload_rgba(&device, &queue, 1, &[255, 255, 255, 255]);
            let blank_sprite = sprite_bind_group(&device, &sprite_layout, &white, &sampler);

            Ok(Self {
                canvas,
                surface,
                _instance: instance,
                device,
                queue,
                config,
                alpha_modes: caps.alpha_modes,
                depth_view,
                globals_buffer,
                globals_bind_group,
                globals_layout,
                draw_layout,
                sprite_layout,
                draw_buffer,
                draw_bind_group,
                draw_capacity,
                draw_stride,
                sampler,
                blank_sprite,
                pipelines: HashMap::new(),
                handles: HandleAllocator::default(),
                geometries: BTreeMap::new(),
                materials: BTreeMap::new(),
                textures: BTreeMap::new(),
                pixel_ratio: 1.0,
                size: (1, 1),
                clear: (Color::BLACK, 0.0),
                detached: false,
                reported_error: false,
            })
        }

        fn allocate(&mut self, kind: ResourceKind) -> Result<ResourceId, BackendError> {
            if self.detached {
                return Err(BackendError::Detached);
            }
            Ok(ResourceId::new(kind, self.handles.alloc()))
        }

        fn report(&mut self, message: &str) {
            if !self.reported_error {
                web_sys::console::warn_1(&JsValue::from_str(message));
                self.reported_error = true;
            }
        }

        fn reconfigure(&mut self) {
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }

        fn resize_surface(&mut self) {
            let (w, h) = self.size;
            let pw = (f64::from(w) * self.pixel_ratio).round().max(1.0) as u32;
            let ph = (f64::from(h) * self.pixel_ratio).round().max(1.0) as u32;
            self.canvas.set_width(pw);
            self.canvas.set_height(ph);
            let style = self.canvas.style();
            let styled = style
                .set_property("width", &format!("{w}px"))
                .and_then(|()| style.set_property("height", &format!("{h}px")));
            if let Err(e) = styled {
                self.report(&format!("globe canvas resize failed: {e:?}"));
            }
            if self.detached {
                return;
            }
            self.config.width = pw;
            self.config.height = ph;
            self.reconfigure();
        }

        fn pipeline(&mut self, key: PipelineKey) -> &::wgpu::RenderPipeline {
            let Self {
                pipelines,
                device,
                config,
                globals_layout,
                draw_layout,
                sprite_layout,
                ..
            } = self;
            pipelines.entry(key).or_insert_with(|| {
                build_pipeline(device, config.format, key, globals_layout, draw_layout, sprite_layout)
            })
        }

        fn ensure_draw_capacity(&mut self, count: usize) {
            if count <= self.draw_capacity {
                return;
            }
            let capacity = count.next_power_of_two();
            let (buffer, bind_group) =
                create_draw_buffer(&self.device, &self.draw_layout, self.draw_stride, capacity);
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
            self.draw_capacity = capacity;
        }

        fn draw(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), String> {
            let frame = Renderer::collect(scene, camera);
            let commands: Vec<_> = frame
                .commands
                .iter()
                .filter_map(|cmd| PipelineKey::for_command(cmd).map(|key| (key, cmd)))
                .collect();

            let globals = Globals::new(camera, &LightRig::from_lights(&frame.lights));
            self.queue
                .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

            self.ensure_draw_capacity(commands.len());
            for (i, (_, cmd)) in commands.iter().enumerate() {
                let uniforms = DrawUniforms::from_command(cmd);
                self.queue.write_buffer(
                    &self.draw_buffer,
                    i as u64 * self.draw_stride,
                    bytemuck::bytes_of(&uniforms),
                );
            }
            for (key, _) in &commands {
                self.pipeline(*key);
            }

            let target = match self.surface.get_current_texture() {
                Ok(target) => target,
                Err(e) => {
                    self.reconfigure();
                    return Err(format!("surface acquire failed: {e}"));
                }
            };
            let view = target
                .texture
                .create_view(&::wgpu::TextureViewDescriptor::default());
            let (clear, alpha) = self.clear;
            let mut encoder = self
                .device
                .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                    label: Some("globe-encoder"),
                });
            {
                let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                    label: Some("globe-pass"),
                    color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: ::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                                r: f64::from(clear.r * alpha),
                                g: f64::from(clear.g * alpha),
                                b: f64::from(clear.b * alpha),
                                a: f64::from(alpha),
                            }),
                            store: ::wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(1.0),
                            store: ::wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });
                rpass.set_bind_group(0, &self.globals_bind_group, &[]);

                for (i, (key, cmd)) in commands.iter().enumerate() {
                    let (Some(pipeline), Some(geometry)) =
                        (self.pipelines.get(key), self.geometries.get(&cmd.geometry.id))
                    else {
                        continue;
                    };
                    let offset = (i as u64 * self.draw_stride) as u32;
                    rpass.set_pipeline(pipeline);
                    rpass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                    match (cmd.primitive, geometry) {
                        (
                            Primitive::Mesh,
                            GpuGeometry::Mesh {
                                vertices,
                                indices,
                                index_count,
                            },
                        ) => {
                            rpass.set_vertex_buffer(0, vertices.slice(..));
                            rpass.set_index_buffer(indices.slice(..), ::wgpu::IndexFormat::Uint32);
                            rpass.draw_indexed(0..*index_count, 0, 0..1);
                        }
                        (
                            Primitive::Points,
                            GpuGeometry::Points {
                                instances: Some(instances),
                                count,
                            },
                        ) => {
                            let sprite = self
                                .materials
                                .get(&cmd.material_id)
                                .unwrap_or(&self.blank_sprite);
                            rpass.set_bind_group(2, sprite, &[]);
                            rpass.set_vertex_buffer(0, instances.slice(..));
                            let visible = cmd.geometry.visible_count(*count) as u32;
                            rpass.draw(0..4, 0..visible);
                        }
                        (
                            Primitive::Line,
                            GpuGeometry::Line {
                                vertices: Some(vertices),
                                count,
                            },
                        ) => {
                            let visible = cmd.geometry.visible_count(*count) as u32;
                            if visible >= 2 {
                                rpass.set_vertex_buffer(0, vertices.slice(..));
                                rpass.draw(0..visible, 0..1);
                            }
                        }
                        _ => {}
                    }
                }
            }
            self.queue.submit(std::iter::once(encoder.finish()));
            target.present();
            Ok(())
        }
    }

    fn build_pipeline(
        device: &::wgpu::Device,
        format: ::wgpu::TextureFormat,
        key: PipelineKey,
        globals_layout: &::wgpu::BindGroupLayout,
        draw_layout: &::wgpu::BindGroupLayout,
        sprite_layout: &::wgpu::BindGroupLayout,
    ) -> ::wgpu::RenderPipeline {
        let (label, body) = match key.shader {
            ShaderKind::Phong => ("globe-phong", PHONG_SHADER),
            ShaderKind::Basic => ("globe-basic", BASIC_SHADER),
            ShaderKind::Sprites => ("globe-sprites", SPRITE_SHADER),
            ShaderKind::Lines => ("globe-lines", LINE_SHADER),
        };
        let module = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Owned(format!("{COMMON_WGSL}{body}"))),
        });
        let layouts: &[&::wgpu::BindGroupLayout] = match key.shader {
            ShaderKind::Sprites => &[globals_layout, draw_layout, sprite_layout],
            _ => &[globals_layout, draw_layout],
        };
        let layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: layouts,
            immediate_size: 0,
        });

        let position = position_attribute();
        let (buffers, topology) = match key.shader {
            ShaderKind::Phong | ShaderKind::Basic => (
                ::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &MESH_ATTRIBUTES,
                },
                ::wgpu::PrimitiveTopology::TriangleList,
            ),
            ShaderKind::Sprites => (
                ::wgpu::VertexBufferLayout {
                    array_stride: 12,
                    step_mode: ::wgpu::VertexStepMode::Instance,
                    attributes: &position,
                },
                ::wgpu::PrimitiveTopology::TriangleStrip,
            ),
            ShaderKind::Lines => (
                ::wgpu::VertexBufferLayout {
                    array_stride: 12,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &position,
                },
                ::wgpu::PrimitiveTopology::LineStrip,
            ),
        };

        device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: ::wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[buffers],
            },
            fragment: Some(::wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format,
                    blend: Some(blend_state(key.blend)),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                cull_mode: match key.cull {
                    Cull::None => None,
                    Cull::Front => Some(::wgpu::Face::Front),
                    Cull::Back => Some(::wgpu::Face::Back),
                },
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: key.depth_write,
                depth_compare: ::wgpu::CompareFunction::LessEqual,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    impl GraphicsBackend for WgpuBackend {
        fn set_pixel_ratio(&mut self, ratio: f64) {
            self.pixel_ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
            self.resize_surface();
        }

        fn set_size(&mut self, width: u32, height: u32) {
            self.size = (width.max(1), height.max(1));
            self.resize_surface();
        }

        fn set_clear_color(&mut self, color: Color, alpha: f32) {
            self.clear = (color, alpha.clamp(0.0, 1.0));
            let wanted = if alpha < 1.0 {
                ::wgpu::CompositeAlphaMode::PreMultiplied
            } else {
                ::wgpu::CompositeAlphaMode::Opaque
            };
            if self.alpha_modes.contains(&wanted) && self.config.alpha_mode != wanted {
                self.config.alpha_mode = wanted;
                if !self.detached {
                    self.reconfigure();
                }
            }
        }

        fn create_geometry(&mut self, geometry: &Geometry) -> Result<ResourceId, BackendError> {
            let id = self.allocate(ResourceKind::Geometry)?;
            let uploaded = match geometry {
                Geometry::Sphere {
                    radius,
                    width_segments,
                    height_segments,
                } => {
                    let mesh = sphere_mesh(*radius, *width_segments, *height_segments);
                    let vertices = self.device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                        label: Some("globe-sphere-vertices"),
                        contents: bytemuck::cast_slice(&mesh_vertices(&mesh)),
                        usage: ::wgpu::BufferUsages::VERTEX,
                    });
                    let indices = self.device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                        label: Some("globe-sphere-indices"),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: ::wgpu::BufferUsages::INDEX,
                    });
                    GpuGeometry::Mesh {
                        vertices,
                        indices,
                        index_count: mesh.indices.len() as u32,
                    }
                }
                Geometry::Points { positions } => {
                    let data: Vec<[f32; 3]> = positions.iter().map(|p| p.as_f32_array()).collect();
                    GpuGeometry::Points {
                        instances: vertex_buffer(&self.device, "globe-point-instances", &data),
                        count: data.len(),
                    }
                }
                Geometry::Polyline { positions } => {
                    let data: Vec<[f32; 3]> = positions.iter().map(|p| p.as_f32_array()).collect();
                    GpuGeometry::Line {
                        vertices: vertex_buffer(&self.device, "globe-line-vertices", &data),
                        count: data.len(),
                    }
                }
            };
            self.geometries.insert(id, uploaded);
            Ok(id)
        }

        fn create_material(&mut self, material: &Material) -> Result<ResourceId, BackendError> {
            let id = self.allocate(ResourceKind::Material)?;
            if let Material::Points(points) = material {
                let view = points.map.and_then(|map| self.textures.get(&map));
                if let Some(view) = view {
                    let bind_group =
                        sprite_bind_group(&self.device, &self.sprite_layout, view, &self.sampler);
                    self.materials.insert(id, bind_group);
                }
            }
            Ok(id)
        }

        fn create_texture(&mut self, texture: &Texture) -> Result<ResourceId, BackendError> {
            let id = self.allocate(ResourceKind::Texture)?;
            let (size, rgba) = texture.rasterize();
            if size == 0 {
                self.handles.free(id.handle);
                return Err(BackendError::AllocationFailed {
                    what: "texture",
                    reason: "empty sprite".to_string(),
                });
            }
            let view = upload_rgba(&self.device, &self.queue, size, &rgba);
            self.textures.insert(id, view);
            Ok(id)
        }

        fn release(&mut self, id: ResourceId) {
            if !self.handles.free(id.handle) {
                return;
            }
            match id.kind {
                ResourceKind::Geometry => {
                    self.geometries.remove(&id);
                }
                ResourceKind::Material => {
                    self.materials.remove(&id);
                }
                ResourceKind::Texture => {
                    self.textures.remove(&id);
                }
            }
        }

        fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) {
            if self.detached {
                return;
            }
            if let Err(e) = self.draw(scene, camera) {
                self.report(&format!("globe draw failed: {e}"));
            }
        }

        fn detach(&mut self) {
            if self.detached {
                return;
            }
            self.detached = true;
            self.geometries.clear();
            self.materials.clear();
            self.textures.clear();
            self.pipelines.clear();
            self.canvas.remove();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use gpu::{BackendError, GraphicsBackend};
    use scene::components::{Geometry, Material, Texture};
    use scene::{Color, PerspectiveCamera, ResourceId, SceneGraph};
    use web_sys::{Document, HtmlElement};

    /// Stand-in for non-wasm builds: there is never a surface to attach to.
    pub struct WgpuBackend;

    impl WgpuBackend {
        pub async fn attach(_document: &Document, _container: &HtmlElement) -> Result<Self, BackendError> {
            Err(BackendError::SurfaceUnavailable(
                "wgpu backend is only available on wasm32".to_string(),
            ))
        }
    }

    impl GraphicsBackend for WgpuBackend {
        fn set_pixel_ratio(&mut self, _ratio: f64) {}

        fn set_size(&mut self, _width: u32, _height: u32) {}

        fn set_clear_color(&mut self, _color: Color, _alpha: f32) {}

        fn create_geometry(&mut self, _geometry: &Geometry) -> Result<ResourceId, BackendError> {
            Err(BackendError::Detached)
        }

        fn create_material(&mut self, _material: &Material) -> Result<ResourceId, BackendError> {
            Err(BackendError::Detached)
        }

        fn create_texture(&mut self, _texture: &Texture) -> Result<ResourceId, BackendError> {
            Err(BackendError::Detached)
        }

        fn release(&mut self, _id: ResourceId) {}

        fn render(&mut self, _scene: &SceneGraph, _camera: &PerspectiveCamera) {}

        fn detach(&mut self) {}
    }
}

pub use imp::WgpuBackend;
