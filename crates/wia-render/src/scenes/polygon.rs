//! A rotating filled polygon.

use super::{Globals, SolidPipeline};
use crate::context::GpuContext;
use crate::geometry::polygon_fan;
use crate::palette;
use wgpu::util::DeviceExt;
use wia_core::{ExampleKind, FrameInfo};

const RADIUS: f64 = 0.6;
/// Coarse enough to show facets.
const TOLERANCE: f64 = 0.02;
/// Radians per frame.
const SPIN: f32 = 0.01;

pub struct PolygonScene {
    solid: SolidPipeline,
    vertices: wgpu::Buffer,
    vertex_count: u32,
}

impl PolygonScene {
    pub fn new(ctx: &GpuContext) -> Self {
        let fan = polygon_fan(RADIUS, TOLERANCE);
        let vertices = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("polygon vertices"),
            contents: bytemuck::cast_slice(&fan),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            solid: SolidPipeline::new(ctx, "polygon", wgpu::PrimitiveTopology::TriangleList),
            vertices,
            vertex_count: fan.len() as u32,
        }
    }

    pub fn prepare(&mut self, queue: &wgpu::Queue, frame: &FrameInfo) {
        let globals = Globals {
            color: palette::to_linear(palette::accent(ExampleKind::Polygon)),
            rotation: (frame.frame as f32 * SPIN) % std::f32::consts::TAU,
            aspect: frame.size.aspect(),
            scale: 1.0,
            _pad: 0.0,
        };
        self.solid.write_globals(queue, &globals);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.solid.bind(pass);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}
