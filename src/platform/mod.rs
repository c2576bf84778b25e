//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input intent (held directions, focus loss)
//! - Frame timing
//! - Storage (LocalStorage on web, files on native)

pub mod input;
pub mod storage;
pub mod time;

pub use input::InputState;
pub use storage::{KeyValueStore, MemoryStore};
pub use time::FrameClock;

/// Wall-clock based seed for unseeded production runs
#[cfg(target_arch = "wasm32")]
pub fn entropy_seed() -> u64 {
    js_sys::Date::now() as u64 ^ ((js_sys::Math::random() * u32::MAX as f64) as u64) << 20
}

/// Wall-clock based seed for unseeded production runs
#[cfg(not(target_arch = "wasm32"))]
pub fn entropy_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed)
}
