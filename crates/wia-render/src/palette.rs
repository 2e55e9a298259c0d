//! Example colours.
//!
//! Colours are authored in sRGB with peniko and converted to linear before
//! they reach the GPU, since the surface format is sRGB where available.

use peniko::Color;
use peniko::color::LinearSrgb;
use wia_core::ExampleKind;

/// Frames for one full pulse cycle.
pub const PULSE_PERIOD: u32 = 120;

pub fn background() -> Color {
    Color::from_rgb8(0x1e, 0x1e, 0x2e)
}

fn pulse_low() -> Color {
    Color::from_rgb8(0x18, 0x25, 0x4a)
}

fn pulse_high() -> Color {
    Color::from_rgb8(0x4f, 0x8c, 0xe8)
}

/// Foreground colour of an example.
pub fn accent(kind: ExampleKind) -> Color {
    match kind {
        ExampleKind::Pulse => pulse_high(),
        ExampleKind::Polygon => Color::from_rgb8(0xf3, 0x8b, 0xa8),
        ExampleKind::Lines => Color::from_rgb8(0xa6, 0xe3, 0xa1),
    }
}

/// Component-wise interpolation, `t` clamped to `0..=1`.
pub fn mix(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0.0; 4];
    for (i, c) in out.iter_mut().enumerate() {
        *c = a.components[i] + (b.components[i] - a.components[i]) * t;
    }
    Color::new(out)
}

/// Clear colour of the pulse example at `frame`.
pub fn pulse(frame: u32) -> Color {
    let phase = (frame % PULSE_PERIOD) as f32 / PULSE_PERIOD as f32;
    let t = 0.5 - 0.5 * (phase * std::f32::consts::TAU).cos();
    mix(pulse_low(), pulse_high(), t)
}

/// Linear RGBA for uniforms.
pub fn to_linear(color: Color) -> [f32; 4] {
    color.convert::<LinearSrgb>().components
}

pub fn to_wgpu(color: Color) -> wgpu::Color {
    let [r, g, b, a] = to_linear(color);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}
