//! Collision and proximity detection
//!
//! Axis-aligned boxes only. The hit band is the overlap of both boxes shrunk
//! by `HIT_MARGIN`; the near-miss band widens the horizontal test by
//! `NEAR_MISS_THRESHOLD` and is checked once per entity as it draws level
//! with the player.

use glam::Vec2;

use super::particles;
use super::state::{Entity, PlayPhase, SimState};
use crate::consts::*;
use crate::tuning::palette;

/// Outcome of one detection pass, consumed by the state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub bonus_collected: bool,
    pub hit_oil: bool,
    pub crashed: bool,
    pub near_misses: u32,
}

/// Half-extents of the hit band between the player and `entity`
#[inline]
fn hit_extents(entity: &Entity) -> Vec2 {
    let (pw, ph) = PLAYER_SIZE;
    Vec2::new(
        (pw + entity.width) / 2.0 - HIT_MARGIN,
        (ph + entity.height) / 2.0 - HIT_MARGIN,
    )
}

/// Shrunk-box overlap test
pub fn in_hit_band(player: Vec2, entity: &Entity) -> bool {
    let d = (player - entity.position).abs();
    let ext = hit_extents(entity);
    d.x < ext.x && d.y < ext.y
}

/// Close pass that stays clear of the hit band
pub fn in_near_miss_band(player: Vec2, entity: &Entity) -> bool {
    let (_, ph) = PLAYER_SIZE;
    let d = (player - entity.position).abs();
    let ext = hit_extents(entity);
    d.x < ext.x + NEAR_MISS_THRESHOLD
        && d.y < (ph + entity.height) / 2.0
        && !in_hit_band(player, entity)
}

/// True the first time the entity's top edge reaches the player's top edge
fn crossing_now(player: Vec2, entity: &Entity) -> bool {
    let (_, ph) = PLAYER_SIZE;
    !entity.passed_player && entity.top() >= player.y - ph / 2.0
}

/// Run detection against current positions, in storage order.
///
/// Applies the immediate side effects (bonus removal, particles, shake, crash
/// latch); scoring and timers are left to the state machine.
pub fn detect(state: &mut SimState) -> CollisionReport {
    let mut report = CollisionReport::default();
    let player = state.player;
    let mut picked = Vec::new();

    for idx in 0..state.entities.len() {
        let entity = &mut state.entities[idx];

        if entity.kind.near_miss_eligible() && crossing_now(player, entity) {
            entity.passed_player = true;
            if in_near_miss_band(player, entity) {
                report.near_misses += 1;
                let origin = (player + entity.position) / 2.0;
                particles::burst(&mut state.particles, &mut state.rng, origin, palette::NEAR_MISS, 10);
            }
        }

        let entity = &state.entities[idx];
        if !in_hit_band(player, entity) {
            continue;
        }

        if entity.kind.is_collectible() {
            report.bonus_collected = true;
            picked.push(entity.id);
            let origin = entity.position;
            particles::burst(&mut state.particles, &mut state.rng, origin, palette::INVINCIBLE, 20);
        } else if entity.kind.is_slick() {
            report.hit_oil = true;
        } else if entity.kind.is_harmful() && state.is_harmable() {
            log::debug!("Crash into {:?} #{}", entity.kind, entity.id);
            report.crashed = true;
            state.phase = PlayPhase::CrashLatched;
            state.shake = CRASH_SHAKE;
            particles::burst(&mut state.particles, &mut state.rng, player, palette::CRASH, 35);
            break;
        }
    }

    if !picked.is_empty() {
        state.entities.retain(|e| !picked.contains(&e.id));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{EntityKind, GameStatus};

    fn playing_state() -> SimState {
        let mut state = SimState::new(3);
        state.game.status = GameStatus::Playing;
        state.reset_level_state();
        state
    }

    #[test]
    fn test_hit_band_uses_margin() {
        let player = Vec2::new(300.0, 640.0);
        let e = Entity::new(1, EntityKind::NpcCar, Vec2::new(300.0 + 33.0, 640.0), 2.2, 0);
        // (45 + 45) / 2 - 12 = 33
        assert!(!in_hit_band(player, &e));
        let e = Entity::new(1, EntityKind::NpcCar, Vec2::new(300.0 + 32.9, 640.0), 2.2, 0);
        assert!(in_hit_band(player, &e));
    }

    #[test]
    fn test_near_miss_band_excludes_hits() {
        let player = Vec2::new(300.0, 640.0);
        let hit = Entity::new(1, EntityKind::NpcCar, Vec2::new(310.0, 640.0), 2.2, 0);
        let close = Entity::new(2, EntityKind::NpcCar, Vec2::new(350.0, 640.0), 2.2, 0);
        let far = Entity::new(3, EntityKind::NpcCar, Vec2::new(400.0, 640.0), 2.2, 0);
        assert!(!in_near_miss_band(player, &hit));
        assert!(in_near_miss_band(player, &close));
        assert!(!in_near_miss_band(player, &far));
    }

    #[test]
    fn test_bonus_beats_crash_and_is_removed() {
        let mut state = playing_state();
        let p = state.player;
        state.place_entity(EntityKind::Bonus, p);
        state.place_entity(EntityKind::NpcCar, p);
        let report = detect(&mut state);
        assert!(report.bonus_collected);
        assert!(report.crashed);
        assert_eq!(state.entities.len(), 1);
        assert_eq!(state.entities[0].kind, EntityKind::NpcCar);
        assert_eq!(state.phase, PlayPhase::CrashLatched);
        assert_eq!(state.shake, CRASH_SHAKE);
    }

    #[test]
    fn test_detection_stops_after_crash() {
        let mut state = playing_state();
        let p = state.player;
        state.place_entity(EntityKind::Obstacle, p);
        state.place_entity(EntityKind::Bonus, p);
        let report = detect(&mut state);
        assert!(report.crashed);
        assert!(!report.bonus_collected);
        assert_eq!(state.entities.len(), 2);
    }

    #[test]
    fn test_shield_blocks_crash_not_oil() {
        let mut state = playing_state();
        state.game.is_invincible = true;
        let p = state.player;
        state.place_entity(EntityKind::OilSpill, p);
        state.place_entity(EntityKind::PoliceCar, p);
        let report = detect(&mut state);
        assert!(report.hit_oil);
        assert!(!report.crashed);
        assert_eq!(state.phase, PlayPhase::Active);
        assert_eq!(state.entities.len(), 2);
    }

    #[test]
    fn test_latched_phase_is_not_harmable() {
        let mut state = playing_state();
        state.phase = PlayPhase::CrashLatched;
        let p = state.player;
        state.place_entity(EntityKind::NpcCar, p);
        assert!(!detect(&mut state).crashed);
    }

    #[test]
    fn test_near_miss_fires_once() {
        let mut state = playing_state();
        let p = state.player;
        // Adjacent lane distance inside the widened band, trailing edge just below
        // the player's leading edge
        state.place_entity(EntityKind::NpcCar, Vec2::new(p.x + 50.0, p.y - 1.0));
        assert_eq!(detect(&mut state).near_misses, 0);

        state.entities[0].position.y = p.y;
        assert_eq!(detect(&mut state).near_misses, 1);
        assert!(state.entities[0].passed_player);

        for step in 1..20 {
            state.entities[0].position.y = p.y + step as f32;
            assert_eq!(detect(&mut state).near_misses, 0);
        }
    }

    #[test]
    fn test_bonus_never_near_misses() {
        let mut state = playing_state();
        let p = state.player;
        state.place_entity(EntityKind::Bonus, Vec2::new(p.x + 45.0, p.y + 30.0));
        let report = detect(&mut state);
        assert_eq!(report.near_misses, 0);
        assert!(!state.entities[0].passed_player);
    }
}
