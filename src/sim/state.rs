//! Game state and core simulation types
//!
//! `GameState` is the HUD-facing status record; `SimState` wraps it with
//! everything else a frame step touches (player, entities, particles, spawn
//! schedule, RNG).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particles::Particle;
use super::spawn::SpawnSchedule;
use crate::consts::*;
use crate::highscores::HighScores;
use crate::tuning::{LevelConfig, level_config, palette};

/// Top-level status, drives sim gating and menu visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Title menu, nothing simulated
    #[default]
    Start,
    /// Active driving
    Playing,
    /// Post-crash freeze while `recovery_time` runs down
    CollisionPause,
    /// Level timer ran out, waiting for "continue"
    LevelClear,
    /// Out of lives
    GameOver,
    /// Final level survived
    Win,
}

impl GameStatus {
    /// Statuses that show a menu overlay and wait for an external action
    pub fn is_menu(&self) -> bool {
        matches!(
            self,
            GameStatus::Start | GameStatus::LevelClear | GameStatus::GameOver | GameStatus::Win
        )
    }
}

/// Sub-state of `Playing`: whether a crash was already registered this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayPhase {
    #[default]
    Active,
    CrashLatched,
}

/// Entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    NpcCar,
    Obstacle,
    Bonus,
    PoliceCar,
    OilSpill,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::NpcCar,
        EntityKind::Obstacle,
        EntityKind::Bonus,
        EntityKind::PoliceCar,
        EntityKind::OilSpill,
    ];

    /// (width, height)
    pub fn size(&self) -> (f32, f32) {
        match self {
            EntityKind::NpcCar => NPC_CAR_SIZE,
            EntityKind::Obstacle => OBSTACLE_SIZE,
            EntityKind::Bonus => BONUS_SIZE,
            EntityKind::PoliceCar => POLICE_CAR_SIZE,
            EntityKind::OilSpill => OIL_SPILL_SIZE,
        }
    }

    /// Fixed color; `None` means themed traffic
    pub fn fixed_color(&self) -> Option<u32> {
        match self {
            EntityKind::NpcCar => None,
            EntityKind::Obstacle => Some(palette::OBSTACLE),
            EntityKind::Bonus => Some(palette::INVINCIBLE),
            EntityKind::PoliceCar => Some(palette::POLICE),
            EntityKind::OilSpill => Some(palette::OIL),
        }
    }

    /// Contact costs a life
    pub fn is_harmful(&self) -> bool {
        matches!(
            self,
            EntityKind::NpcCar | EntityKind::Obstacle | EntityKind::PoliceCar
        )
    }

    /// Contact picks it up
    pub fn is_collectible(&self) -> bool {
        *self == EntityKind::Bonus
    }

    /// Contact starts a skid
    pub fn is_slick(&self) -> bool {
        *self == EntityKind::OilSpill
    }

    /// Scrolling off the bottom scores `PASS_POINTS`
    pub fn awards_pass(&self) -> bool {
        self.is_harmful()
    }

    /// Can produce a near miss
    pub fn near_miss_eligible(&self) -> bool {
        self.is_harmful()
    }
}

/// A spawned road object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Center
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    /// Level scroll speed at spawn time (informational)
    pub speed: f32,
    pub color: u32,
    /// Police weave destination
    #[serde(default)]
    pub target_lane_x: Option<f32>,
    /// Trailing edge has crossed the player's leading edge
    #[serde(default)]
    pub passed_player: bool,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, position: Vec2, speed: f32, color: u32) -> Self {
        let (width, height) = kind.size();
        Self {
            id,
            kind,
            position,
            width,
            height,
            speed,
            color,
            target_lane_x: None,
            passed_player: false,
        }
    }

    /// Upper edge (smaller y); the trailing edge while scrolling down
    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y - self.height / 2.0
    }

    /// True once the whole entity is below the visible area
    #[inline]
    pub fn is_off_screen(&self) -> bool {
        self.top() > CANVAS_HEIGHT
    }
}

/// Lateral drift direction while skidding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkidDirection {
    Left,
    #[default]
    Right,
}

impl SkidDirection {
    pub fn sign(&self) -> f32 {
        match self {
            SkidDirection::Left => -1.0,
            SkidDirection::Right => 1.0,
        }
    }
}

/// Side effects emitted by a tick, consumed by audio/HUD/storage collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Every frame: engine pitch target and whether it should be audible
    EngineSpeed { speed: f32, active: bool },
    StartBgm { level: u32 },
    StopBgm,
    Crash,
    BonusCollected,
    NearMiss,
    Skid,
    /// Police arrival is 1.5s away
    PoliceWarning,
    LevelClear,
    GameOver,
    Win,
    /// Leaderboard changed and should be persisted
    HighScoresChanged,
}

/// Authoritative status record (HUD snapshot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub status: GameStatus,
    pub player_name: String,
    /// 1-based
    pub level: u32,
    pub lives: u32,
    /// Seconds left in the level
    pub time_left: f32,
    pub score: f32,
    /// Bonus shield
    pub is_invincible: bool,
    pub invincibility_time: f32,
    /// Post-crash immunity, outlives the pause
    pub recovery_invincibility_time: f32,
    /// Remaining `CollisionPause`
    pub recovery_time: f32,
    pub is_skidding: bool,
    pub skid_time: f32,
    pub skid_direction: SkidDirection,
    /// Level clock value of the latest near miss (HUD toast trigger)
    pub last_near_miss_time: f32,
    /// Police arrival imminent
    pub police_warning: bool,
    pub high_scores: HighScores,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            status: GameStatus::Start,
            player_name: "DRIVER 01".to_string(),
            level: 1,
            lives: INITIAL_LIVES,
            time_left: LEVEL_DURATION,
            score: 0.0,
            is_invincible: false,
            invincibility_time: 0.0,
            recovery_invincibility_time: 0.0,
            recovery_time: 0.0,
            is_skidding: false,
            skid_time: 0.0,
            skid_direction: SkidDirection::Right,
            last_near_miss_time: 0.0,
            police_warning: false,
            high_scores: HighScores::new(),
        }
    }
}

impl GameState {
    /// Blinking indicator for the renderer
    pub fn is_recovering(&self) -> bool {
        self.recovery_invincibility_time > 0.0
    }

    /// Score as shown on the HUD and stored on the board
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct SimState {
    pub game: GameState,
    /// Player center
    pub player: Vec2,
    /// Live entities in spawn order
    pub entities: Vec<Entity>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Road dash scroll, in [0, ROAD_TILE_PERIOD)
    pub road_offset: f32,
    /// Screen shake magnitude (pixels)
    pub shake: f32,
    /// Seconds of `Playing` time elapsed in the current level
    pub clock: f32,
    pub phase: PlayPhase,
    pub schedule: SpawnSchedule,
    /// Injected random source (lane, kind, color, weave, skid direction)
    pub rng: Pcg32,
    next_id: u32,
}

impl SimState {
    /// Create a fresh session at the title screen with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            game: GameState::default(),
            player: crate::player_start(),
            entities: Vec::new(),
            particles: Vec::new(),
            road_offset: 0.0,
            shake: 0.0,
            clock: 0.0,
            phase: PlayPhase::Active,
            schedule: SpawnSchedule::default(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Difficulty of the current level
    pub fn level_config(&self) -> &'static LevelConfig {
        level_config(self.game.level)
    }

    /// Vulnerable to a crash right now
    pub fn is_harmable(&self) -> bool {
        !self.game.is_invincible
            && self.game.recovery_invincibility_time <= 0.0
            && self.phase == PlayPhase::Active
    }

    /// Add an entity of `kind` centered at `position` (tests and scripted setups)
    pub fn place_entity(&mut self, kind: EntityKind, position: Vec2) -> u32 {
        let id = self.next_entity_id();
        let color = kind
            .fixed_color()
            .unwrap_or(crate::tuning::level_theme(self.game.level).npc[0]);
        let speed = self.level_config().speed;
        self.entities.push(Entity::new(id, kind, position, speed, color));
        id
    }

    /// Clear per-level transient state: entities, particles, schedule, player position
    pub fn reset_level_state(&mut self) {
        self.entities.clear();
        self.particles.clear();
        self.road_offset = 0.0;
        self.shake = 0.0;
        self.clock = 0.0;
        self.phase = PlayPhase::Active;
        self.player = crate::player_start();
        self.schedule = SpawnSchedule::for_level(self.level_config());
        self.game.police_warning = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tables() {
        for kind in EntityKind::ALL {
            let exclusive = [kind.is_harmful(), kind.is_collectible(), kind.is_slick()];
            assert_eq!(exclusive.iter().filter(|b| **b).count(), 1, "{kind:?}");
        }
        assert!(!EntityKind::Bonus.awards_pass());
        assert!(!EntityKind::OilSpill.awards_pass());
        assert!(EntityKind::PoliceCar.near_miss_eligible());
    }

    #[test]
    fn test_new_state_defaults() {
        let state = SimState::new(1);
        assert_eq!(state.game.status, GameStatus::Start);
        assert_eq!(state.game.lives, INITIAL_LIVES);
        assert_eq!(state.game.time_left, LEVEL_DURATION);
        assert!(state.is_harmable());
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = SimState::new(1);
        let a = state.place_entity(EntityKind::Obstacle, Vec2::new(135.0, 0.0));
        let b = state.place_entity(EntityKind::Obstacle, Vec2::new(245.0, 0.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_harmability_gating() {
        let mut state = SimState::new(1);
        state.game.is_invincible = true;
        assert!(!state.is_harmable());
        state.game.is_invincible = false;
        state.game.recovery_invincibility_time = 0.5;
        assert!(!state.is_harmable());
        state.game.recovery_invincibility_time = 0.0;
        state.phase = PlayPhase::CrashLatched;
        assert!(!state.is_harmable());
    }
}
