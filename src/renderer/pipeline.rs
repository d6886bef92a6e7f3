//! WebGPU scene render pipeline
//!
//! Draws every object group by group: opaque surfaces first, then the
//! transparent shadow catcher with depth writes off.

use std::ops::Range;

use wgpu::util::DeviceExt;

use super::camera::PerspectiveCamera;
use super::uniforms::{DrawUniform, Globals, MAX_CASTERS, collect_casters};
use super::vertex::Vertex;
use crate::error::RenderError;
use crate::scene::{ObjectKind, Scene};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const DRAW_UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniform>() as u64;

/// One indexed draw with its uniform data
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    /// Index into the scene's mesh library
    pub mesh: usize,
    pub indices: Range<u32>,
    pub transparent: bool,
    pub uniform: DrawUniform,
}

/// Build the frame's draw list: one item per mesh group, opaque items
/// before transparent ones, scene order otherwise.
pub fn plan_draws(scene: &Scene) -> Vec<DrawItem> {
    let mut opaque = Vec::new();
    let mut transparent = Vec::new();
    let mut caster_slot = 0usize;

    for (id, object) in scene.iter() {
        let is_caster = object.cast_shadow && matches!(object.kind, ObjectKind::Sphere { .. });
        let caster_index = if is_caster {
            let slot = caster_slot;
            caster_slot += 1;
            (slot < MAX_CASTERS).then_some(slot)
        } else {
            None
        };

        let Some(mesh) = scene.mesh(object.mesh) else {
            log::warn!("Object {:?} references missing mesh {:?}", id, object.mesh);
            continue;
        };
        for group in &mesh.groups {
            let material = object
                .materials
                .get(group.material_index as usize)
                .and_then(|&m| scene.material(m));
            let Some(material) = material else {
                log::warn!("Object {:?} has no material for slot {}", id, group.material_index);
                continue;
            };
            let item = DrawItem {
                mesh: object.mesh.0 as usize,
                indices: group.start..group.start + group.count,
                transparent: material.is_transparent(),
                uniform: DrawUniform::new(object, material, caster_index),
            };
            if item.transparent {
                transparent.push(item);
            } else {
                opaque.push(item);
            }
        }
    }

    opaque.extend(transparent);
    opaque
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

/// Main render state
pub struct SceneRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// Format of the views rendered into (sRGB variant of the surface format)
    render_format: wgpu::TextureFormat,
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,

    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    /// Bytes between consecutive draw uniforms
    draw_stride: u64,
    draw_capacity: usize,

    depth_view: wgpu::TextureView,
    meshes: Vec<GpuMesh>,

    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl SceneRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        scene: &Scene,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("wave-tiles-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        log::info!("Surface alpha modes: {:?}", surface_caps.alpha_modes);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        let render_format = surface_format.add_srgb_suffix();
        let view_formats = if render_format != surface_format {
            vec![render_format]
        } else {
            vec![]
        };

        // Transparent canvas so the page background shows through
        let alpha_mode = if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats,
            desired_maximum_frame_latency: 2,
        };
        log::info!(
            "Surface config: {}x{}, format: {:?}, alpha: {:?}",
            width,
            height,
            render_format,
            config.alpha_mode
        );
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // Globals (group 0)
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        // Per-draw uniforms (group 1, dynamic offset)
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(DRAW_UNIFORM_SIZE),
                },
                count: None,
            }],
        });
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let draw_stride = DRAW_UNIFORM_SIZE.div_ceil(alignment) * alignment;
        let draw_capacity = plan_draws(scene).len().max(1);
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_buffer(&device, &draw_layout, draw_stride, draw_capacity);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &draw_layout],
            immediate_size: 0,
        });

        let opaque_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            render_format,
            "opaque_pipeline",
            None,
            true,
        );
        let transparent_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            render_format,
            "transparent_pipeline",
            Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
            false,
        );

        let depth_view = Self::create_depth_texture(&device, width, height);

        let mut state = Self {
            surface,
            device,
            queue,
            config,
            render_format,
            opaque_pipeline,
            transparent_pipeline,
            globals_buffer,
            globals_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_stride,
            draw_capacity,
            depth_view,
            meshes: Vec::new(),
            size: (width, height),
        };
        state.upload_meshes(scene);
        log::info!("Uploaded {} meshes", state.meshes.len());
        Ok(state)
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        label: &str,
        blend: Option<wgpu::BlendState>,
        depth_write: bool,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    fn create_draw_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draws"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(DRAW_UNIFORM_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    /// Upload any scene meshes not yet on the GPU
    fn upload_meshes(&mut self, scene: &Scene) {
        for mesh in scene.meshes().iter().skip(self.meshes.len()) {
            let vertices = Vertex::from_mesh(mesh);
            let vertex_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh_vertices"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh_indices"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            self.meshes.push(GpuMesh {
                vertex_buffer,
                index_buffer,
            });
        }
    }

    fn ensure_draw_capacity(&mut self, draws: usize) {
        if draws <= self.draw_capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        log::debug!("Growing draw buffer to {} entries", capacity);
        let (buffer, bind_group) =
            Self::create_draw_buffer(&self.device, &self.draw_layout, self.draw_stride, capacity);
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.draw_capacity = capacity;
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = Self::create_depth_texture(&self.device, new_width, new_height);
        }
    }

    /// Update GPU buffers from the scene and render
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<(), wgpu::SurfaceError> {
        self.upload_meshes(scene);

        let casters = collect_casters(scene);
        let globals = Globals::new(&scene.lighting, camera, &casters);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let draws = plan_draws(scene);
        self.ensure_draw_capacity(draws.len());
        let stride = self.draw_stride as usize;
        let mut bytes = vec![0u8; draws.len() * stride];
        for (i, draw) in draws.iter().enumerate() {
            let offset = i * stride;
            bytes[offset..offset + DRAW_UNIFORM_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&draw.uniform));
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.draw_buffer, 0, &bytes);
        }

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.render_format),
            ..Default::default()
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            let mut bound_transparent = None;
            for (i, draw) in draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(draw.mesh) else {
                    continue;
                };
                if bound_transparent != Some(draw.transparent) {
                    let pipeline = if draw.transparent {
                        &self.transparent_pipeline
                    } else {
                        &self.opaque_pipeline
                    };
                    render_pass.set_pipeline(pipeline);
                    bound_transparent = Some(draw.transparent);
                }
                let offset = (i as u64 * self.draw_stride) as u32;
                render_pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(draw.indices.clone(), 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::uniforms::{KIND_BASIC, KIND_PHYSICAL, KIND_SHADOW};
    use crate::scene;
    use crate::settings::SceneConfig;

    #[test]
    fn test_plan_covers_every_group() {
        let (scene, _) = scene::build(&SceneConfig::default());
        let draws = plan_draws(&scene);
        // Floor + 8 tiles x (caps, walls) + 8 spheres
        assert_eq!(draws.len(), 1 + 16 + 8);
        for draw in &draws {
            let mesh = &scene.meshes()[draw.mesh];
            assert!(draw.indices.end as usize <= mesh.indices.len());
        }
    }

    #[test]
    fn test_transparent_drawn_last() {
        let (scene, _) = scene::build(&SceneConfig::default());
        let draws = plan_draws(&scene);
        let last = draws.last().unwrap();
        assert!(last.transparent);
        assert_eq!(last.uniform.params[0], KIND_SHADOW);
        assert!(draws[..draws.len() - 1].iter().all(|d| !d.transparent));
    }

    #[test]
    fn test_caster_slots_follow_sphere_order() {
        let (scene, _) = scene::build(&SceneConfig::default());
        let draws = plan_draws(&scene);
        let slots: Vec<f32> = draws
            .iter()
            .filter(|d| d.uniform.params[0] == KIND_PHYSICAL)
            .map(|d| d.uniform.flags[1])
            .collect();
        assert_eq!(slots, (0..8).map(|i| i as f32).collect::<Vec<_>>());
        assert!(draws
            .iter()
            .filter(|d| d.uniform.params[0] == KIND_BASIC)
            .all(|d| d.uniform.flags[1] == -1.0));
    }
}
