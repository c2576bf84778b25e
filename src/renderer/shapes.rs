//! Shape generation for 2D primitives
//!
//! Everything is emitted as triangle lists in canvas pixels (y down).

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Axis-aligned filled rectangle from its center and size
pub fn rect(out: &mut Vec<Vertex>, center: Vec2, size: Vec2, color: [f32; 4]) {
    let half = size / 2.0;
    let min = center - half;
    let max = center + half;

    out.push(Vertex::new(min.x, min.y, color));
    out.push(Vertex::new(max.x, min.y, color));
    out.push(Vertex::new(min.x, max.y, color));

    out.push(Vertex::new(min.x, max.y, color));
    out.push(Vertex::new(max.x, min.y, color));
    out.push(Vertex::new(max.x, max.y, color));
}

/// Rectangle outline of the given thickness, drawn inside the bounds
pub fn rect_outline(out: &mut Vec<Vertex>, center: Vec2, size: Vec2, thickness: f32, color: [f32; 4]) {
    let half = size / 2.0;
    let t = thickness.min(half.x).min(half.y);
    // Top and bottom span the full width, sides fill between them
    rect(out, Vec2::new(center.x, center.y - half.y + t / 2.0), Vec2::new(size.x, t), color);
    rect(out, Vec2::new(center.x, center.y + half.y - t / 2.0), Vec2::new(size.x, t), color);
    let side = Vec2::new(t, size.y - 2.0 * t);
    rect(out, Vec2::new(center.x - half.x + t / 2.0, center.y), side, color);
    rect(out, Vec2::new(center.x + half.x - t / 2.0, center.y), side, color);
}

/// Diamond (rotated square) inscribed in `size`
pub fn diamond(out: &mut Vec<Vertex>, center: Vec2, size: Vec2, color: [f32; 4]) {
    let half = size / 2.0;
    let top = Vertex::new(center.x, center.y - half.y, color);
    let right = Vertex::new(center.x + half.x, center.y, color);
    let bottom = Vertex::new(center.x, center.y + half.y, color);
    let left = Vertex::new(center.x - half.x, center.y, color);
    out.extend_from_slice(&[top, right, bottom, bottom, left, top]);
}

/// Filled circle
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }
}

/// Ring (hollow circle)
pub fn ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) {
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let (s1, c1) = theta1.sin_cos();
        let (s2, c2) = theta2.sin_cos();

        let inner1 = center + Vec2::new(c1, s1) * inner_radius;
        let outer1 = center + Vec2::new(c1, s1) * outer_radius;
        let inner2 = center + Vec2::new(c2, s2) * inner_radius;
        let outer2 = center + Vec2::new(c2, s2) * outer_radius;

        // Two triangles per segment
        out.push(Vertex::new(inner1.x, inner1.y, color));
        out.push(Vertex::new(outer1.x, outer1.y, color));
        out.push(Vertex::new(inner2.x, inner2.y, color));

        out.push(Vertex::new(inner2.x, inner2.y, color));
        out.push(Vertex::new(outer1.x, outer1.y, color));
        out.push(Vertex::new(outer2.x, outer2.y, color));
    }
}
