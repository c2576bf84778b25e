//! Cosmetic particle bursts
//!
//! Spawned by collision outcomes, never read back by gameplay.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::per_second;

/// Maximum particles alive at once
pub const MAX_PARTICLES: usize = 256;

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    /// 0xRRGGBB
    pub color: u32,
    /// 1 -> 0, removed at 0
    pub life: f32,
}

/// Life lost per second
const FADE_RATE: f32 = 2.0;

/// Emit `count` particles flying out of `origin` in random directions
pub fn burst<R: Rng>(particles: &mut Vec<Particle>, rng: &mut R, origin: Vec2, color: u32, count: usize) {
    let count = count.min(MAX_PARTICLES);
    let overflow = (particles.len() + count).saturating_sub(MAX_PARTICLES);
    // Oldest go first
    particles.drain(..overflow.min(particles.len()));

    for _ in 0..count {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = per_second(rng.random_range(2.0..10.0));
        particles.push(Particle {
            pos: origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            color,
            life: 1.0,
        });
    }
}

/// Advance and cull
pub fn update(particles: &mut Vec<Particle>, dt: f32) {
    for p in particles.iter_mut() {
        p.pos += p.vel * dt;
        p.life -= dt * FADE_RATE;
    }
    particles.retain(|p| p.life > 0.0);
}
