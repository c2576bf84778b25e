//! Scene tessellation
//!
//! Turns a [`RenderSnapshot`] into one triangle list in canvas pixels. Draw
//! order is back to front: road, grid, lane dashes, entities, player,
//! particles, pause dim.

use glam::Vec2;

use super::shapes::{circle, diamond, rect, rect_outline, ring};
use super::vertex::{Vertex, colors, rgb};
use crate::consts::*;
use crate::road_left;
use crate::sim::{EntityKind, RenderSnapshot};
use crate::tuning::{level_theme, palette};

/// Presentation knobs that come from user settings, not the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStyle {
    /// Camera offset applied to everything (screen shake)
    pub shake_offset: Vec2,
    pub max_particles: usize,
    pub grid: bool,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            shake_offset: Vec2::ZERO,
            max_particles: 256,
            grid: true,
        }
    }
}

/// Pick a shake offset for this frame from a unit-square jitter sample
pub fn shake_offset(shake: f32, jitter: Vec2) -> Vec2 {
    if shake <= 0.0 {
        return Vec2::ZERO;
    }
    (jitter * 2.0 - Vec2::ONE) * shake * 0.5
}

/// Map a playfield pixel (origin top-left, y down) into NDC for a viewport of
/// `view` pixels, letterboxed to keep the playfield's aspect ratio
pub fn playfield_to_ndc(p: Vec2, view: (u32, u32)) -> Vec2 {
    let ndc = Vec2::new(p.x / CANVAS_WIDTH * 2.0 - 1.0, 1.0 - p.y / CANVAS_HEIGHT * 2.0);
    let view_aspect = view.0.max(1) as f32 / view.1.max(1) as f32;
    let field_aspect = CANVAS_WIDTH / CANVAS_HEIGHT;
    if view_aspect > field_aspect {
        // Pillarbox
        ndc * Vec2::new(field_aspect / view_aspect, 1.0)
    } else {
        ndc * Vec2::new(1.0, view_aspect / field_aspect)
    }
}

const LANE_DASH_LEN: f32 = 40.0;
const GRID_SPACING: f32 = 40.0;
const BORDER_WIDTH: f32 = 4.0;

/// Tessellate a full frame
pub fn build_frame(snap: &RenderSnapshot, style: &FrameStyle) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(4096);
    let theme = level_theme(snap.level);

    rect(
        &mut out,
        Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
        Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
        rgb(palette::BACKGROUND, 1.0),
    );
    if !snap.shows_road() {
        return out;
    }

    let mut scene = Vec::with_capacity(4096);
    road(&mut scene, snap, theme.road, theme.border, theme.grid, style.grid);
    for entity in &snap.entities {
        let center = entity.position;
        let size = Vec2::new(entity.width, entity.height);
        let color = rgb(entity.color, 1.0);
        match entity.kind {
            EntityKind::NpcCar => car(&mut scene, center, size, color),
            EntityKind::PoliceCar => {
                car(&mut scene, center, size, color);
                let bar = Vec2::new(size.x * 0.35, 6.0);
                let y = center.y - size.y * 0.1;
                rect(&mut scene, Vec2::new(center.x - bar.x / 2.0, y), bar, colors::SIREN_RED);
                rect(&mut scene, Vec2::new(center.x + bar.x / 2.0, y), bar, colors::SIREN_BLUE);
            }
            EntityKind::Obstacle => {
                rect(&mut scene, center, size, color);
                rect_outline(&mut scene, center, size, 3.0, rgb(theme.border, 0.8));
            }
            EntityKind::Bonus => {
                circle(&mut scene, center, size.x * 0.7, colors::SHIELD_GLOW, 16);
                diamond(&mut scene, center, size, color);
            }
            EntityKind::OilSpill => {
                circle(&mut scene, center, size.y / 2.0, color, 20);
                circle(&mut scene, center + Vec2::new(-size.x * 0.2, 2.0), size.y * 0.4, color, 16);
                circle(&mut scene, center + Vec2::new(size.x * 0.22, -2.0), size.y * 0.35, color, 16);
                circle(&mut scene, center, size.y * 0.2, colors::OIL_SHEEN, 12);
            }
        }
    }

    player(&mut scene, snap);

    for p in snap.particles.iter().rev().take(style.max_particles) {
        let alpha = p.life.clamp(0.0, 1.0);
        rect(&mut scene, p.pos, Vec2::splat(4.0), rgb(p.color, alpha));
    }

    for v in &mut scene {
        v.position[0] += style.shake_offset.x;
        v.position[1] += style.shake_offset.y;
    }
    out.extend(scene);

    if snap.is_paused {
        rect(
            &mut out,
            Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
            Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            colors::PAUSE_DIM,
        );
    }
    out
}

fn road(out: &mut Vec<Vertex>, snap: &RenderSnapshot, surface: u32, border: u32, grid: u32, draw_grid: bool) {
    let left = road_left();
    let center_x = left + ROAD_WIDTH / 2.0;
    rect(
        out,
        Vec2::new(center_x, CANVAS_HEIGHT / 2.0),
        Vec2::new(ROAD_WIDTH, CANVAS_HEIGHT),
        rgb(surface, 1.0),
    );

    if draw_grid {
        let offset = snap.road_offset % GRID_SPACING;
        let mut y = offset - GRID_SPACING;
        while y < CANVAS_HEIGHT {
            rect(out, Vec2::new(center_x, y), Vec2::new(ROAD_WIDTH, 1.0), rgb(grid, 0.6));
            y += GRID_SPACING;
        }
    }

    // Dashes between adjacent lanes
    for pair in LANES.windows(2) {
        let x = (pair[0] + pair[1]) / 2.0;
        let mut y = snap.road_offset - ROAD_TILE_PERIOD;
        while y < CANVAS_HEIGHT {
            rect(
                out,
                Vec2::new(x, y + LANE_DASH_LEN / 2.0),
                Vec2::new(3.0, LANE_DASH_LEN),
                colors::LANE_DASH,
            );
            y += ROAD_TILE_PERIOD;
        }
    }

    let edge = Vec2::new(BORDER_WIDTH, CANVAS_HEIGHT);
    let y = CANVAS_HEIGHT / 2.0;
    rect(out, Vec2::new(left, y), edge, rgb(border, 1.0));
    rect(out, Vec2::new(left + ROAD_WIDTH, y), edge, rgb(border, 1.0));
}

/// Car body with a windshield near the front (top)
fn car(out: &mut Vec<Vertex>, center: Vec2, size: Vec2, color: [f32; 4]) {
    rect(out, center, size, color);
    let glass = Vec2::new(size.x * 0.7, size.y * 0.2);
    rect(out, center - Vec2::new(0.0, size.y * 0.2), glass, colors::WINDSHIELD);
}

fn player(out: &mut Vec<Vertex>, snap: &RenderSnapshot) {
    if !snap.player_visible {
        return;
    }
    let (w, h) = PLAYER_SIZE;
    let size = Vec2::new(w, h);
    let body = if snap.is_invincible {
        palette::INVINCIBLE
    } else {
        palette::PLAYER
    };
    let alpha = if snap.is_recovering { 0.6 } else { 1.0 };

    if snap.is_invincible {
        ring(out, snap.player, h * 0.6, h * 0.65, colors::SHIELD_GLOW, 32);
    }
    car(out, snap.player, size, rgb(body, alpha));
    if snap.is_skidding {
        rect_outline(out, snap.player, size + Vec2::splat(6.0), 2.0, colors::OIL_SHEEN);
    }
}
