//! CPU-side tessellation for the example scenes.
//!
//! Shapes are described with kurbo and flattened to line segments; the
//! output is in normalised device coordinates.

use bytemuck::{Pod, Zeroable};
use kurbo::{Circle, CubicBez, PathEl, Point, Shape};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<Point> for Vertex {
    fn from(p: Point) -> Self {
        Vertex {
            position: [p.x as f32, p.y as f32],
        }
    }
}

/// Flatten any path into its polyline points, dropping a closing point that
/// repeats the start.
fn outline(path: impl IntoIterator<Item = PathEl>, tolerance: f64) -> Vec<Point> {
    let mut points = Vec::new();
    kurbo::flatten(path, tolerance, |el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => points.push(p),
        _ => {}
    });
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Triangle list covering a circle of `radius` flattened at `tolerance`.
///
/// A coarse tolerance yields a visibly faceted polygon, which is the point
/// of the polygon example.
pub fn polygon_fan(radius: f64, tolerance: f64) -> Vec<Vertex> {
    let rim = outline(Circle::new((0.0, 0.0), radius).path_elements(tolerance), tolerance);
    let center = Vertex::from(Point::ORIGIN);
    let mut vertices = Vec::with_capacity(rim.len() * 3);
    for (i, p) in rim.iter().enumerate() {
        let next = rim[(i + 1) % rim.len()];
        vertices.extend([center, Vertex::from(*p), Vertex::from(next)]);
    }
    vertices
}

/// Line list of `count` horizontal Bézier waves at animation `phase`.
pub fn wave_lines(count: usize, phase: f64, tolerance: f64) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    for k in 0..count {
        let y = if count > 1 {
            -0.6 + 1.2 * k as f64 / (count - 1) as f64
        } else {
            0.0
        };
        let swing = 0.35 * (phase + k as f64 * 0.7).sin();
        let curve = CubicBez::new(
            (-0.9, y),
            (-0.3, y + swing),
            (0.3, y - swing),
            (0.9, y),
        );
        let points = outline(curve.path_elements(tolerance), tolerance);
        for pair in points.windows(2) {
            vertices.extend([Vertex::from(pair[0]), Vertex::from(pair[1])]);
        }
    }
    vertices
}
