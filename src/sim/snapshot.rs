//! Read-only views of the simulation for presentation

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::particles::Particle;
use super::state::{Entity, GameState, GameStatus, SimState};

/// How long the "near miss" toast stays up (seconds of level time)
pub const NEAR_MISS_TOAST_DURATION: f32 = 1.0;

/// Player blink toggles per second while recovering
const BLINK_RATE: f32 = 10.0;

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub status: GameStatus,
    pub player: Vec2,
    pub entities: Vec<Entity>,
    pub particles: Vec<Particle>,
    pub road_offset: f32,
    /// 1-based level, selects the theme
    pub level: u32,
    pub is_invincible: bool,
    pub is_recovering: bool,
    pub is_paused: bool,
    pub is_skidding: bool,
    pub shake: f32,
    /// Player visible this frame (blinks while recovering)
    pub player_visible: bool,
}

impl RenderSnapshot {
    pub fn capture(state: &SimState) -> Self {
        let game = &state.game;
        Self {
            status: game.status,
            player: state.player,
            entities: state.entities.clone(),
            particles: state.particles.clone(),
            road_offset: state.road_offset,
            level: game.level,
            is_invincible: game.is_invincible,
            is_recovering: game.is_recovering(),
            is_paused: game.status == GameStatus::CollisionPause,
            is_skidding: game.is_skidding,
            shake: state.shake,
            player_visible: !game.is_recovering()
                || (game.recovery_invincibility_time * BLINK_RATE) as u32 % 2 == 0,
        }
    }

    /// The title screen draws only the backdrop
    pub fn shows_road(&self) -> bool {
        !matches!(self.status, GameStatus::Start)
    }
}

/// HUD view: the full status record plus derived display flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    #[serde(flatten)]
    pub game: GameState,
    /// Floored score for display
    pub display_score: u64,
    /// Whole seconds left, rounded up
    pub seconds_left: u32,
    pub near_miss_toast: bool,
}

impl HudSnapshot {
    pub fn capture(state: &SimState) -> Self {
        let game = state.game.clone();
        let near_miss_toast = game.last_near_miss_time > 0.0
            && state.clock - game.last_near_miss_time < NEAR_MISS_TOAST_DURATION;
        Self {
            display_score: game.display_score(),
            seconds_left: game.time_left.max(0.0).ceil() as u32,
            near_miss_toast,
            game,
        }
    }
}
