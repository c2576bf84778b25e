//! Neon Turbo - A lane-dodging neon arcade racer
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (motion, spawning, collisions, game state)
//! - `tuning`: Data-driven level difficulty and themes
//! - `platform`: Input intent, frame clock and storage backends
//! - `session`: Run loop driver tying sim, input, audio and storage together
//! - `renderer`: Snapshot tessellation and WebGPU pipeline
//! - `audio`: Sound triggers driven by simulation events

pub mod audio;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use session::GameSession;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference cadence the per-frame tuning values were authored against.
    /// Speeds in `tuning` are "units per frame at 60 Hz" and get multiplied by
    /// this to become units per second.
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions
    pub const CANVAS_WIDTH: f32 = 600.0;
    pub const CANVAS_HEIGHT: f32 = 800.0;
    pub const ROAD_WIDTH: f32 = 440.0;
    /// Road starts at 80 and ends at 520
    pub const LANES: [f32; 4] = [135.0, 245.0, 355.0, 465.0];
    /// Road dash pattern period, purely visual
    pub const ROAD_TILE_PERIOD: f32 = 80.0;

    /// Entity sizes (width, height)
    pub const PLAYER_SIZE: (f32, f32) = (45.0, 85.0);
    pub const NPC_CAR_SIZE: (f32, f32) = (45.0, 85.0);
    pub const POLICE_CAR_SIZE: (f32, f32) = (48.0, 90.0);
    pub const OBSTACLE_SIZE: (f32, f32) = (55.0, 55.0);
    pub const BONUS_SIZE: (f32, f32) = (35.0, 35.0);
    pub const OIL_SPILL_SIZE: (f32, f32) = (60.0, 40.0);

    /// Player start: horizontally centered, 160 above the bottom edge
    pub const PLAYER_START_Y_OFFSET: f32 = 160.0;
    /// Player speed per reference frame
    pub const PLAYER_MOVE_SPEED: f32 = 8.0;
    /// Vertical movement is this fraction of horizontal (not normalized)
    pub const VERTICAL_DAMPING: f32 = 0.8;
    /// Clamp margins between the player box and the road edges
    pub const ROAD_SIDE_MARGIN: f32 = 10.0;
    pub const ROAD_END_MARGIN: f32 = 20.0;

    /// Run structure
    pub const LEVEL_DURATION: f32 = 30.0;
    pub const MAX_LEVELS: u32 = 5;
    pub const INITIAL_LIVES: u32 = 3;

    /// Timers (seconds)
    pub const INVINCIBILITY_DURATION: f32 = 5.0;
    /// 2s pause + 3s blinking play
    pub const RECOVERY_INVINCIBILITY_DURATION: f32 = 5.0;
    pub const RECOVERY_PAUSE_DURATION: f32 = 2.0;
    pub const SKID_DURATION: f32 = 1.2;
    /// Lateral drift while skidding, per reference frame
    pub const SKID_DRIFT_SPEED: f32 = 5.0;

    /// Collision tuning
    pub const HIT_MARGIN: f32 = 12.0;
    pub const NEAR_MISS_THRESHOLD: f32 = 30.0;

    /// Scoring
    pub const TIME_SCORE_MULTIPLIER: f32 = 50.0;
    pub const PASS_POINTS: f32 = 250.0;
    pub const BONUS_POINTS: f32 = 1000.0;
    pub const NEAR_MISS_POINTS: f32 = 500.0;
    pub const CRASH_PENALTY: f32 = 500.0;

    /// Spawner
    pub const SPAWN_INTERVAL: f32 = 0.6;
    pub const SPAWN_Y: f32 = -100.0;
    pub const LANE_TOLERANCE: f32 = 20.0;
    pub const SPAWN_CLEARANCE_Y: f32 = 200.0;

    /// Police schedule (seconds of level time)
    pub const POLICE_FIRST_SPAWN: f32 = 5.0;
    pub const POLICE_REARM_MIN: f32 = 8.0;
    pub const POLICE_REARM_MAX: f32 = 11.0;
    pub const POLICE_WARNING_LEAD: f32 = 1.5;
    /// Fraction of the remaining lateral gap closed per reference frame
    pub const POLICE_WEAVE_RATE: f32 = 0.05;
    pub const POLICE_ARRIVAL_TOLERANCE: f32 = 2.0;

    /// Screen shake kick on crash, decays per second
    pub const CRASH_SHAKE: f32 = 25.0;
    pub const SHAKE_DECAY: f32 = 40.0;
}

/// Left edge of the road surface
#[inline]
pub fn road_left() -> f32 {
    (consts::CANVAS_WIDTH - consts::ROAD_WIDTH) / 2.0
}

/// Player starting position (centered, near the bottom)
#[inline]
pub fn player_start() -> Vec2 {
    Vec2::new(
        consts::CANVAS_WIDTH / 2.0,
        consts::CANVAS_HEIGHT - consts::PLAYER_START_Y_OFFSET,
    )
}

/// Convert a per-reference-frame quantity into a per-second rate
#[inline]
pub fn per_second(per_frame: f32) -> f32 {
    per_frame * consts::REFERENCE_FPS
}

/// Frame-rate independent exponential approach factor.
///
/// `rate` is the fraction closed per reference frame; the result is the fraction
/// to close over `dt` seconds.
#[inline]
pub fn approach_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (1.0 - rate).powf(dt * consts::REFERENCE_FPS)
}
