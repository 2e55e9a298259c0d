//! Built-in example scenes.
//!
//! Each scene owns its GPU objects. A frame is `prepare` (upload uniforms and
//! geometry), then `draw` inside a render pass cleared to `clear_color`.

mod lines;
mod polygon;
mod pulse;

pub use lines::LinesScene;
pub use polygon::PolygonScene;
pub use pulse::PulseScene;

use crate::context::GpuContext;
use crate::geometry::Vertex;
use bytemuck::{Pod, Zeroable};
use wia_core::{ExampleKind, FrameInfo, SurfaceSize};

/// Active example state, one variant per [`ExampleKind`].
pub enum Scene {
    Pulse(PulseScene),
    Polygon(PolygonScene),
    Lines(LinesScene),
}

impl Scene {
    pub fn build(ctx: &GpuContext, kind: ExampleKind) -> Self {
        log::debug!("building scene `{kind}` for {:?}", ctx.format());
        match kind {
            ExampleKind::Pulse => Scene::Pulse(PulseScene::new()),
            ExampleKind::Polygon => Scene::Polygon(PolygonScene::new(ctx)),
            ExampleKind::Lines => Scene::Lines(LinesScene::new(ctx)),
        }
    }

    pub fn kind(&self) -> ExampleKind {
        match self {
            Scene::Pulse(_) => ExampleKind::Pulse,
            Scene::Polygon(_) => ExampleKind::Polygon,
            Scene::Lines(_) => ExampleKind::Lines,
        }
    }

    pub fn clear_color(&self, frame: &FrameInfo) -> wgpu::Color {
        match self {
            Scene::Pulse(scene) => scene.clear_color(frame),
            Scene::Polygon(_) | Scene::Lines(_) => crate::palette::to_wgpu(crate::palette::background()),
        }
    }

    pub fn prepare(&mut self, queue: &wgpu::Queue, frame: &FrameInfo) {
        match self {
            Scene::Pulse(_) => {}
            Scene::Polygon(scene) => scene.prepare(queue, frame),
            Scene::Lines(scene) => scene.prepare(queue, frame),
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        match self {
            Scene::Pulse(_) => {}
            Scene::Polygon(scene) => scene.draw(pass),
            Scene::Lines(scene) => scene.draw(pass),
        }
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        log::trace!("scene `{}` sees surface {}x{}", self.kind(), size.width, size.height);
    }
}

// ─── Shared flat-colour pipeline ─────────────────────────────────────────────

/// Uniform block of `solid.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub color: [f32; 4],
    pub rotation: f32,
    pub aspect: f32,
    pub scale: f32,
    pub _pad: f32,
}

/// Pipeline, uniform buffer and bind group for flat-coloured geometry.
pub struct SolidPipeline {
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl SolidPipeline {
    pub fn new(ctx: &GpuContext, label: &str, topology: wgpu::PrimitiveTopology) -> Self {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::include_wgsl!("../shaders/solid.wgsl"));

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<Globals>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Globals>() as u64),
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniforms,
            bind_group,
        }
    }

    pub fn write_globals(&self, queue: &wgpu::Queue, globals: &Globals) {
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(globals));
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
    }
}
