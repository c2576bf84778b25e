//! Level difficulty curves and visual themes
//!
//! Densities are spawn probabilities per 60 Hz reference frame; the spawner
//! rescales them by the real frame delta.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LEVELS;

/// Difficulty knobs for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Scroll speed in units per reference frame
    pub speed: f32,
    pub traffic_density: f32,
    pub obstacle_density: f32,
    pub bonus_density: f32,
    pub oil_density: f32,
    /// Police cars released over the level
    pub police_count: u32,
}

impl LevelConfig {
    /// Total probability mass that produces a spawn
    pub fn total_density(&self) -> f32 {
        self.traffic_density + self.obstacle_density + self.bonus_density + self.oil_density
    }
}

pub const LEVEL_CONFIGS: [LevelConfig; MAX_LEVELS as usize] = [
    LevelConfig {
        speed: 2.2,
        traffic_density: 0.015,
        obstacle_density: 0.005,
        bonus_density: 0.005,
        oil_density: 0.0,
        police_count: 0,
    },
    LevelConfig {
        speed: 3.2,
        traffic_density: 0.02,
        obstacle_density: 0.007,
        bonus_density: 0.005,
        oil_density: 0.004,
        police_count: 1,
    },
    LevelConfig {
        speed: 4.2,
        traffic_density: 0.025,
        obstacle_density: 0.009,
        bonus_density: 0.005,
        oil_density: 0.006,
        police_count: 2,
    },
    LevelConfig {
        speed: 5.2,
        traffic_density: 0.032,
        obstacle_density: 0.012,
        bonus_density: 0.005,
        oil_density: 0.008,
        police_count: 3,
    },
    LevelConfig {
        speed: 6.2,
        traffic_density: 0.04,
        obstacle_density: 0.016,
        bonus_density: 0.005,
        oil_density: 0.01,
        police_count: 4,
    },
];

/// Palette for one level (colors are 0xRRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTheme {
    pub road: u32,
    pub border: u32,
    pub grid: u32,
    pub npc: [u32; 4],
}

pub const LEVEL_THEMES: [LevelTheme; MAX_LEVELS as usize] = [
    LevelTheme {
        road: 0x0f172a,
        border: 0x3b82f6,
        grid: 0x1e293b,
        npc: [0xff0055, 0x00ff66, 0x7000ff, 0xff8800],
    },
    LevelTheme {
        road: 0x061706,
        border: 0x22c55e,
        grid: 0x064e3b,
        npc: [0x84cc16, 0x10b981, 0xfbbf24, 0xffffff],
    },
    LevelTheme {
        road: 0x170617,
        border: 0xd946ef,
        grid: 0x4a044e,
        npc: [0xf472b6, 0x818cf8, 0x2dd4bf, 0xffffff],
    },
    LevelTheme {
        road: 0x170f06,
        border: 0xf97316,
        grid: 0x431407,
        npc: [0xef4444, 0xeab308, 0xffffff, 0x94a3b8],
    },
    LevelTheme {
        road: 0x1e1e1e,
        border: 0xfbbf24,
        grid: 0x422006,
        npc: [0xfde047, 0xffffff, 0xcbd5e1, 0x00f2ff],
    },
];

/// Fixed colors outside the themes
pub mod palette {
    pub const PLAYER: u32 = 0x00f2ff;
    pub const INVINCIBLE: u32 = 0xffcc00;
    pub const OBSTACLE: u32 = 0x475569;
    pub const POLICE: u32 = 0x1d4ed8;
    pub const OIL: u32 = 0x111111;
    pub const CRASH: u32 = 0xff3333;
    pub const NEAR_MISS: u32 = 0xfacc15;
    pub const BACKGROUND: u32 = 0x020617;
}

/// Difficulty for a 1-based level number
pub fn level_config(level: u32) -> &'static LevelConfig {
    assert!(
        (1..=MAX_LEVELS).contains(&level),
        "level {level} out of range 1..={MAX_LEVELS}"
    );
    &LEVEL_CONFIGS[(level - 1) as usize]
}

/// Theme for a 1-based level number
pub fn level_theme(level: u32) -> &'static LevelTheme {
    assert!(
        (1..=MAX_LEVELS).contains(&level),
        "level {level} out of range 1..={MAX_LEVELS}"
    );
    &LEVEL_THEMES[(level - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_ramps() {
        for pair in LEVEL_CONFIGS.windows(2) {
            assert!(pair[1].speed > pair[0].speed);
            assert!(pair[1].traffic_density >= pair[0].traffic_density);
            assert!(pair[1].police_count >= pair[0].police_count);
        }
    }

    #[test]
    fn test_density_mass_leaves_room_for_nothing() {
        for config in &LEVEL_CONFIGS {
            assert!(config.total_density() < 1.0);
        }
    }

    #[test]
    #[should_panic]
    fn test_level_zero_is_a_defect() {
        level_config(0);
    }
}
