//! Animated Bézier waves, re-tessellated every frame into a fixed-size
//! vertex buffer.

use super::{Globals, SolidPipeline};
use crate::context::GpuContext;
use crate::geometry::{Vertex, wave_lines};
use crate::palette;
use wia_core::{ExampleKind, FrameInfo};

const WAVES: usize = 6;
const TOLERANCE: f64 = 0.002;
/// Upper bound on line vertices; extra segments are dropped.
const CAPACITY: usize = 8192;
/// Phase advance per frame.
const SPEED: f64 = 0.04;

pub struct LinesScene {
    solid: SolidPipeline,
    vertices: wgpu::Buffer,
    vertex_count: u32,
}

impl LinesScene {
    pub fn new(ctx: &GpuContext) -> Self {
        let vertices = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave vertices"),
            size: (CAPACITY * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            solid: SolidPipeline::new(ctx, "lines", wgpu::PrimitiveTopology::LineList),
            vertices,
            vertex_count: 0,
        }
    }

    pub fn prepare(&mut self, queue: &wgpu::Queue, frame: &FrameInfo) {
        let mut lines = wave_lines(WAVES, frame.frame as f64 * SPEED, TOLERANCE);
        if lines.len() > CAPACITY {
            log::trace!("dropping {} wave vertices over capacity", lines.len() - CAPACITY);
            lines.truncate(CAPACITY);
        }
        // LineList needs whole pairs.
        lines.truncate(lines.len() & !1);
        queue.write_buffer(&self.vertices, 0, bytemuck::cast_slice(&lines));
        self.vertex_count = lines.len() as u32;

        let globals = Globals {
            color: palette::to_linear(palette::accent(ExampleKind::Lines)),
            rotation: 0.0,
            aspect: frame.size.aspect(),
            scale: 1.0,
            _pad: 0.0,
        };
        self.solid.write_globals(queue, &globals);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.vertex_count == 0 {
            return;
        }
        self.solid.bind(pass);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}
