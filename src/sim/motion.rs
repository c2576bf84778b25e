//! Motion and scroll integration
//!
//! Everything here is time-based: per-frame tuning speeds go through
//! [`per_second`] and easing through [`approach_factor`].

use glam::Vec2;
use rand::Rng;

use super::state::{EntityKind, SimState};
use super::tick::TickInput;
use crate::consts::*;
use crate::{approach_factor, per_second, road_left};

/// Player clamp rectangle as (min, max) center positions
pub fn player_bounds() -> (Vec2, Vec2) {
    let (pw, ph) = PLAYER_SIZE;
    let left = road_left();
    let min = Vec2::new(left + pw / 2.0 + ROAD_SIDE_MARGIN, ph / 2.0 + ROAD_END_MARGIN);
    let max = Vec2::new(
        left + ROAD_WIDTH - pw / 2.0 - ROAD_SIDE_MARGIN,
        CANVAS_HEIGHT - ph / 2.0 - ROAD_END_MARGIN,
    );
    (min, max)
}

/// Move the player from intent (or skid drift) and clamp to the road
pub fn move_player(state: &mut SimState, input: &TickInput, dt: f32) {
    let speed = per_second(PLAYER_MOVE_SPEED) * dt;
    let mut delta = Vec2::ZERO;

    if state.game.is_skidding {
        delta.x = per_second(SKID_DRIFT_SPEED) * dt * state.game.skid_direction.sign();
    } else {
        if input.left {
            delta.x -= speed;
        }
        if input.right {
            delta.x += speed;
        }
        if input.up {
            delta.y -= speed * VERTICAL_DAMPING;
        }
        if input.down {
            delta.y += speed * VERTICAL_DAMPING;
        }
    }

    let (min, max) = player_bounds();
    state.player = (state.player + delta).clamp(min, max);
}

/// Pick a lane center other than the one nearest `current_x`
pub fn pick_other_lane<R: Rng>(rng: &mut R, current_x: f32) -> f32 {
    let nearest = LANES
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - current_x).abs().total_cmp(&(b.1 - current_x).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0);
    // Skip over the nearest lane so every other lane is equally likely
    let mut idx = rng.random_range(0..LANES.len() - 1);
    if idx >= nearest {
        idx += 1;
    }
    LANES[idx]
}

/// Scroll entities down, steer police, drop what left the screen.
///
/// Returns how many pass-scoring entities exited the bottom.
pub fn scroll_entities(state: &mut SimState, dt: f32) -> u32 {
    let dy = per_second(state.level_config().speed) * dt;
    let ease = approach_factor(POLICE_WEAVE_RATE, dt);
    let rng = &mut state.rng;

    for entity in state.entities.iter_mut() {
        entity.position.y += dy;

        if entity.kind != EntityKind::PoliceCar {
            continue;
        }
        let x = entity.position.x;
        let target = *entity
            .target_lane_x
            .get_or_insert_with(|| pick_other_lane(rng, x));
        entity.position.x += (target - entity.position.x) * ease;
        if (target - entity.position.x).abs() < POLICE_ARRIVAL_TOLERANCE {
            entity.target_lane_x = Some(pick_other_lane(rng, target));
        }
    }

    let mut passed = 0;
    state.entities.retain(|e| {
        if !e.is_off_screen() {
            return true;
        }
        if e.kind.awards_pass() {
            passed += 1;
        }
        false
    });
    passed
}

/// Advance the dashed road pattern
pub fn advance_road(state: &mut SimState, dt: f32) {
    let distance = per_second(state.level_config().speed) * dt;
    state.road_offset = (state.road_offset + distance) % ROAD_TILE_PERIOD;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GameStatus, SkidDirection};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn playing_state() -> SimState {
        let mut state = SimState::new(42);
        state.game.status = GameStatus::Playing;
        state.reset_level_state();
        state
    }

    #[test]
    fn test_player_moves_one_reference_step() {
        let mut state = playing_state();
        let start = state.player;
        let input = TickInput {
            right: true,
            up: true,
            ..Default::default()
        };
        move_player(&mut state, &input, DT);
        assert!((state.player.x - (start.x + PLAYER_MOVE_SPEED)).abs() < 1e-3);
        assert!((state.player.y - (start.y - PLAYER_MOVE_SPEED * VERTICAL_DAMPING)).abs() < 1e-3);
    }

    #[test]
    fn test_player_is_clamped() {
        let mut state = playing_state();
        let input = TickInput {
            left: true,
            down: true,
            ..Default::default()
        };
        for _ in 0..600 {
            move_player(&mut state, &input, DT);
        }
        let (min, max) = player_bounds();
        assert_eq!(state.player.x, min.x);
        assert_eq!(state.player.y, max.y);
        assert_eq!(min.x, 80.0 + 22.5 + 10.0);
    }

    #[test]
    fn test_skid_overrides_intent() {
        let mut state = playing_state();
        state.game.is_skidding = true;
        state.game.skid_direction = SkidDirection::Left;
        let start = state.player;
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        move_player(&mut state, &input, DT);
        assert!((state.player.x - (start.x - SKID_DRIFT_SPEED)).abs() < 1e-3);
        assert_eq!(state.player.y, start.y);
    }

    #[test]
    fn test_scroll_is_time_based() {
        let mut a = playing_state();
        let mut b = playing_state();
        a.place_entity(EntityKind::NpcCar, Vec2::new(135.0, 0.0));
        b.place_entity(EntityKind::NpcCar, Vec2::new(135.0, 0.0));
        for _ in 0..60 {
            scroll_entities(&mut a, 1.0 / 60.0);
        }
        for _ in 0..144 {
            scroll_entities(&mut b, 1.0 / 144.0);
        }
        let expected = per_second(a.level_config().speed);
        assert!((a.entities[0].position.y - expected).abs() < 0.05);
        assert!((b.entities[0].position.y - expected).abs() < 0.05);
    }

    #[test]
    fn test_offscreen_entities_award_pass() {
        let mut state = playing_state();
        state.place_entity(EntityKind::NpcCar, Vec2::new(135.0, CANVAS_HEIGHT + 50.0));
        state.place_entity(EntityKind::Bonus, Vec2::new(245.0, CANVAS_HEIGHT + 50.0));
        state.place_entity(EntityKind::Obstacle, Vec2::new(355.0, 100.0));
        let passed = scroll_entities(&mut state, DT);
        assert_eq!(passed, 1);
        assert_eq!(state.entities.len(), 1);
        assert_eq!(state.entities[0].kind, EntityKind::Obstacle);
    }

    #[test]
    fn test_police_weaves_between_lanes() {
        let mut state = playing_state();
        let id = state.place_entity(EntityKind::PoliceCar, Vec2::new(135.0, -2000.0));
        state.entities[0].target_lane_x = Some(465.0);
        for _ in 0..30 {
            scroll_entities(&mut state, DT);
        }
        let police = state.entities.iter().find(|e| e.id == id).unwrap();
        assert!(police.position.x > 135.0);
        assert!(police.position.x < 465.0);
    }

    #[test]
    fn test_police_retargets_on_arrival() {
        let mut state = playing_state();
        state.place_entity(EntityKind::PoliceCar, Vec2::new(244.5, 0.0));
        state.entities[0].target_lane_x = Some(245.0);
        scroll_entities(&mut state, DT);
        let target = state.entities[0].target_lane_x.unwrap();
        assert_ne!(target, 245.0);
        assert!(LANES.contains(&target));
    }

    #[test]
    fn test_pick_other_lane_never_repeats() {
        let mut rng = Pcg32::seed_from_u64(9);
        for lane in LANES {
            for _ in 0..50 {
                assert_ne!(pick_other_lane(&mut rng, lane), lane);
            }
        }
    }

    #[test]
    fn test_road_offset_wraps() {
        let mut state = playing_state();
        for _ in 0..1000 {
            advance_road(&mut state, DT);
            assert!((0.0..ROAD_TILE_PERIOD).contains(&state.road_offset));
        }
    }
}
