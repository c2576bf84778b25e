//! Simulation module
//!
//! All gameplay logic lives here:
//! - Variable timestep, time-based speeds
//! - Injected seeded RNG
//! - Stable iteration order (entity storage order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod motion;
pub mod particles;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{CollisionReport, detect, in_hit_band, in_near_miss_band};
pub use particles::Particle;
pub use snapshot::{HudSnapshot, RenderSnapshot};
pub use spawn::SpawnSchedule;
pub use state::{
    Entity, EntityKind, GameEvent, GameState, GameStatus, PlayPhase, SimState, SkidDirection,
};
pub use tick::{TickInput, autopilot, restart, start_level, tick};
