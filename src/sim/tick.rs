//! Variable timestep simulation tick
//!
//! One call per display frame. Order within a Playing frame is
//! motion -> spawn -> collision -> state machine.

use rand::Rng;

use super::collision::{self, CollisionReport};
use super::motion;
use super::particles;
use super::spawn;
use super::state::{
    EntityKind, GameEvent, GameState, GameStatus, PlayPhase, SimState, SkidDirection,
};
use crate::consts::*;

/// Resolved steering intent for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Advance the simulation by `dt` seconds and return the side effects
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    let mut events = Vec::new();

    // Cosmetics run in every status so bursts finish over menus
    particles::update(&mut state.particles, dt);
    state.shake = (state.shake - SHAKE_DECAY * dt).max(0.0);

    state.game.skid_time = (state.game.skid_time - dt).max(0.0);
    state.game.is_skidding = state.game.skid_time > 0.0;

    match state.game.status {
        GameStatus::Playing => {
            events.push(GameEvent::EngineSpeed {
                speed: state.level_config().speed,
                active: true,
            });
            step_playing(state, input, dt, &mut events);
        }
        GameStatus::CollisionPause => {
            events.push(GameEvent::EngineSpeed {
                speed: 0.0,
                active: false,
            });
            step_pause(state, dt);
        }
        _ => {
            events.push(GameEvent::EngineSpeed {
                speed: 0.0,
                active: false,
            });
        }
    }

    events
}

fn step_playing(state: &mut SimState, input: &TickInput, dt: f32, events: &mut Vec<GameEvent>) {
    state.clock += dt;

    motion::move_player(state, input, dt);
    motion::advance_road(state, dt);
    let passed = motion::scroll_entities(state, dt);

    let spawned = spawn::run_spawner(state, dt);
    if spawned.warning_raised {
        events.push(GameEvent::PoliceWarning);
    }

    let hits = collision::detect(state);
    resolve(state, passed, hits, dt, events);
}

/// The authoritative per-frame transition for a Playing frame
fn resolve(state: &mut SimState, passed: u32, hits: CollisionReport, dt: f32, events: &mut Vec<GameEvent>) {
    let speed = state.level_config().speed;
    let clock = state.clock;
    let game = &mut state.game;

    game.invincibility_time = (game.invincibility_time - dt).max(0.0);
    game.recovery_invincibility_time = (game.recovery_invincibility_time - dt).max(0.0);
    game.is_invincible = game.invincibility_time > 0.0;

    // Terminal frames settle against the pre-frame score: nothing from this
    // frame's pass, near miss, pickup or oil is applied
    game.time_left = (game.time_left - dt).max(0.0);
    if game.time_left <= 0.0 {
        state.phase = PlayPhase::Active;
        finish_level(game, events);
        return;
    }

    if hits.crashed {
        crash(game, events);
        return;
    }

    game.score += speed * TIME_SCORE_MULTIPLIER * dt + passed as f32 * PASS_POINTS;

    if hits.near_misses > 0 {
        game.score += hits.near_misses as f32 * NEAR_MISS_POINTS;
        game.last_near_miss_time = clock;
        events.push(GameEvent::NearMiss);
    }

    if hits.bonus_collected {
        game.score += BONUS_POINTS;
        game.invincibility_time = INVINCIBILITY_DURATION;
        game.is_invincible = true;
        events.push(GameEvent::BonusCollected);
    }

    if hits.hit_oil && !game.is_skidding {
        game.is_skidding = true;
        game.skid_time = SKID_DURATION;
        game.skid_direction = if state.rng.random_bool(0.5) {
            SkidDirection::Left
        } else {
            SkidDirection::Right
        };
        events.push(GameEvent::Skid);
    }
}

fn finish_level(game: &mut GameState, events: &mut Vec<GameEvent>) {
    game.police_warning = false;
    events.push(GameEvent::StopBgm);

    if game.level >= MAX_LEVELS {
        game.status = GameStatus::Win;
        log::info!("Run won with {} points", game.display_score());
        events.push(GameEvent::Win);
        record_high_score(game, events);
    } else {
        game.status = GameStatus::LevelClear;
        log::info!("Level {} cleared", game.level);
        events.push(GameEvent::LevelClear);
    }
}

fn crash(game: &mut GameState, events: &mut Vec<GameEvent>) {
    game.lives = game.lives.saturating_sub(1);
    game.score = (game.score - CRASH_PENALTY).max(0.0);
    game.recovery_time = RECOVERY_PAUSE_DURATION;
    game.recovery_invincibility_time = RECOVERY_INVINCIBILITY_DURATION;
    events.push(GameEvent::Crash);

    if game.lives == 0 {
        game.status = GameStatus::GameOver;
        game.police_warning = false;
        log::info!("Game over on level {} with {} points", game.level, game.display_score());
        events.push(GameEvent::StopBgm);
        events.push(GameEvent::GameOver);
        record_high_score(game, events);
    } else {
        game.status = GameStatus::CollisionPause;
        log::info!("Crash, {} lives left", game.lives);
    }
}

fn record_high_score(game: &mut GameState, events: &mut Vec<GameEvent>) {
    let score = game.display_score();
    if let Some(rank) = game.high_scores.add_score(&game.player_name, score, game.level) {
        log::info!("High score #{rank}: {score}");
        events.push(GameEvent::HighScoresChanged);
    }
}

fn step_pause(state: &mut SimState, dt: f32) {
    let game = &mut state.game;
    game.recovery_time = (game.recovery_time - dt).max(0.0);
    game.recovery_invincibility_time = (game.recovery_invincibility_time - dt).max(0.0);

    if game.recovery_time <= 0.0 {
        game.status = GameStatus::Playing;
        state.phase = PlayPhase::Active;
        log::debug!("Recovery pause over");
    }
}

/// Enter `level` (1-based). Starting from a menu with no run in progress
/// (Start, GameOver, Win) begins a fresh run; LevelClear carries score and
/// lives over.
pub fn start_level(state: &mut SimState, level: u32) -> Vec<GameEvent> {
    assert!(
        (1..=MAX_LEVELS).contains(&level),
        "level {level} out of range 1..={MAX_LEVELS}"
    );

    let game = &mut state.game;
    if matches!(
        game.status,
        GameStatus::Start | GameStatus::GameOver | GameStatus::Win
    ) {
        game.score = 0.0;
        game.lives = INITIAL_LIVES;
    }

    game.status = GameStatus::Playing;
    game.level = level;
    game.time_left = LEVEL_DURATION;
    game.is_invincible = false;
    game.invincibility_time = 0.0;
    game.recovery_invincibility_time = 0.0;
    game.recovery_time = 0.0;
    game.is_skidding = false;
    game.skid_time = 0.0;
    game.last_near_miss_time = 0.0;
    state.reset_level_state();

    log::info!(
        "Level {level} started (score {}, lives {})",
        state.game.display_score(),
        state.game.lives
    );
    vec![GameEvent::StartBgm { level }]
}

/// Back to the title screen with a fresh run; the leaderboard and driver name survive
pub fn restart(state: &mut SimState) -> Vec<GameEvent> {
    let high_scores = std::mem::take(&mut state.game.high_scores);
    let player_name = std::mem::take(&mut state.game.player_name);
    state.game = GameState {
        high_scores,
        player_name,
        ..GameState::default()
    };
    state.reset_level_state();
    log::info!("Back to start");
    vec![GameEvent::StopBgm]
}

/// Demo driver: dodge the closest threat ahead, otherwise chase bonuses
pub fn autopilot(state: &SimState) -> TickInput {
    let player = state.player;
    let mut input = TickInput::default();

    let threat = state
        .entities
        .iter()
        .filter(|e| e.kind.is_harmful() || e.kind.is_slick())
        .filter(|e| (e.position.x - player.x).abs() < 60.0)
        .filter(|e| e.position.y < player.y && player.y - e.position.y < 320.0)
        .max_by(|a, b| a.position.y.total_cmp(&b.position.y));

    if let Some(threat) = threat {
        let (min, max) = motion::player_bounds();
        let room_left = player.x - min.x;
        let room_right = max.x - player.x;
        if (threat.position.x >= player.x && room_left > 40.0) || room_right <= 40.0 {
            input.left = true;
        } else {
            input.right = true;
        }
        input.down = true;
        return input;
    }

    let bonus = state
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Bonus && e.position.y < player.y)
        .max_by(|a, b| a.position.y.total_cmp(&b.position.y));
    if let Some(bonus) = bonus {
        let dx = bonus.position.x - player.x;
        input.left = dx < -4.0;
        input.right = dx > 4.0;
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn started(level: u32) -> SimState {
        let mut state = SimState::new(1234);
        start_level(&mut state, level);
        state
    }

    /// Keep the spawner quiet so scenarios only see scripted entities
    fn hold_spawner(state: &mut SimState) {
        state.schedule.last_spawn_at = Some(f32::MAX);
        state.schedule.next_police_at = None;
    }

    #[test]
    fn test_start_level_from_start_resets_run() {
        let mut state = SimState::new(1);
        state.game.score = 999.0;
        state.game.lives = 1;
        let events = start_level(&mut state, 1);
        assert_eq!(events, vec![GameEvent::StartBgm { level: 1 }]);
        assert_eq!(state.game.status, GameStatus::Playing);
        assert_eq!(state.game.score, 0.0);
        assert_eq!(state.game.lives, INITIAL_LIVES);
        assert_eq!(state.player, crate::player_start());
    }

    #[test]
    fn test_continue_preserves_score_and_lives() {
        let mut state = started(1);
        state.game.status = GameStatus::LevelClear;
        state.game.score = 4321.0;
        state.game.lives = 2;
        state.place_entity(EntityKind::NpcCar, Vec2::new(135.0, 10.0));
        start_level(&mut state, 2);
        assert_eq!(state.game.level, 2);
        assert_eq!(state.game.score, 4321.0);
        assert_eq!(state.game.lives, 2);
        assert_eq!(state.game.time_left, LEVEL_DURATION);
        assert!(state.entities.is_empty());
    }

    #[test]
    #[should_panic]
    fn test_start_level_out_of_range() {
        let mut state = SimState::new(1);
        start_level(&mut state, MAX_LEVELS + 1);
    }

    #[test]
    fn test_engine_speed_every_frame() {
        let mut state = SimState::new(1);
        let events = tick(&mut state, &TickInput::default(), DT);
        assert_eq!(
            events,
            vec![GameEvent::EngineSpeed {
                speed: 0.0,
                active: false
            }]
        );

        start_level(&mut state, 3);
        let events = tick(&mut state, &TickInput::default(), DT);
        assert!(events.contains(&GameEvent::EngineSpeed {
            speed: 4.2,
            active: true
        }));
    }

    #[test]
    fn test_menus_do_not_simulate() {
        let mut state = SimState::new(1);
        state.place_entity(EntityKind::NpcCar, Vec2::new(135.0, 10.0));
        for _ in 0..100 {
            tick(&mut state, &TickInput { left: true, ..Default::default() }, DT);
        }
        assert_eq!(state.entities[0].position.y, 10.0);
        assert_eq!(state.player, crate::player_start());
        assert_eq!(state.game.time_left, LEVEL_DURATION);
    }

    // Scenario A: a quiet lap accrues time score and clears the level
    #[test]
    fn test_quiet_level_clears() {
        let mut state = started(1);
        hold_spawner(&mut state);
        let mut all = Vec::new();
        while state.game.status == GameStatus::Playing {
            all.extend(tick(&mut state, &TickInput::default(), DT));
        }
        assert_eq!(state.game.status, GameStatus::LevelClear);
        assert_eq!(state.game.time_left, 0.0);
        assert!(all.contains(&GameEvent::LevelClear));
        assert!(all.contains(&GameEvent::StopBgm));
        let expected = 2.2 * TIME_SCORE_MULTIPLIER * LEVEL_DURATION;
        assert!((state.game.score - expected).abs() < 5.0, "{}", state.game.score);
        assert!(state.game.high_scores.is_empty());
    }

    // Scenario B: a crash costs a life, pauses, then resumes shielded
    #[test]
    fn test_crash_pause_and_recovery() {
        let mut state = started(1);
        hold_spawner(&mut state);
        state.game.score = 2000.0;
        let p = state.player;
        state.place_entity(EntityKind::NpcCar, p);

        let events = tick(&mut state, &TickInput::default(), DT);
        assert!(events.contains(&GameEvent::Crash));
        assert_eq!(state.game.status, GameStatus::CollisionPause);
        assert_eq!(state.game.lives, INITIAL_LIVES - 1);
        assert_eq!(state.game.score, 1500.0);
        assert_eq!(state.game.recovery_time, RECOVERY_PAUSE_DURATION);
        assert_eq!(state.shake, CRASH_SHAKE);

        // Nothing moves during the pause
        let frozen = state.entities[0].position;
        let time_left = state.game.time_left;
        let mut frames = 0;
        while state.game.status == GameStatus::CollisionPause {
            tick(&mut state, &TickInput { left: true, ..Default::default() }, DT);
            frames += 1;
            assert!(frames < 200);
        }
        assert_eq!(state.entities[0].position, frozen);
        assert_eq!(state.game.time_left, time_left);
        assert!((frames as f32 * DT - RECOVERY_PAUSE_DURATION).abs() < 2.0 * DT);

        // Still overlapping, but recovery invincibility holds
        assert_eq!(state.phase, PlayPhase::Active);
        assert!(state.game.is_recovering());
        state.entities[0].position = state.player;
        let events = tick(&mut state, &TickInput::default(), DT);
        assert!(!events.contains(&GameEvent::Crash));
        assert_eq!(state.game.status, GameStatus::Playing);
    }

    // Scenario C: bonus then collision under the shield
    #[test]
    fn test_bonus_shield() {
        let mut state = started(2);
        hold_spawner(&mut state);
        let p = state.player;
        state.place_entity(EntityKind::Bonus, p);

        let time_score = state.level_config().speed * TIME_SCORE_MULTIPLIER * DT;
        let events = tick(&mut state, &TickInput::default(), DT);
        assert!(events.contains(&GameEvent::BonusCollected));
        assert!(state.game.is_invincible);
        assert_eq!(state.game.invincibility_time, INVINCIBILITY_DURATION);
        assert!((state.game.score - (BONUS_POINTS + time_score)).abs() < 1e-3);
        assert!(state.entities.is_empty());

        state.place_entity(EntityKind::Obstacle, state.player);
        let events = tick(&mut state, &TickInput::default(), DT);
        assert!(!events.contains(&GameEvent::Crash));
        assert_eq!(state.game.lives, INITIAL_LIVES);

        // Shield wears off after its duration
        for _ in 0..(INVINCIBILITY_DURATION / DT) as usize + 2 {
            state.entities.clear();
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(!state.game.is_invincible);
    }

    #[test]
    fn test_pickup_refreshes_shield_to_full() {
        let mut state = started(2);
        hold_spawner(&mut state);
        state.game.invincibility_time = 1.0;
        state.game.is_invincible = true;
        let p = state.player;
        state.place_entity(EntityKind::Bonus, p);

        tick(&mut state, &TickInput::default(), DT);
        assert!(state.game.is_invincible);
        assert_eq!(state.game.invincibility_time, INVINCIBILITY_DURATION);
    }

    #[test]
    fn test_crash_frame_forfeits_same_frame_awards() {
        let mut state = started(1);
        hold_spawner(&mut state);
        state.game.lives = 1;
        state.game.score = 2000.0;
        let p = state.player;
        state.place_entity(EntityKind::Bonus, p);
        state.place_entity(EntityKind::Obstacle, p);
        state.place_entity(EntityKind::NpcCar, Vec2::new(465.0, CANVAS_HEIGHT + 60.0));

        let events = tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.game.status, GameStatus::GameOver);
        assert_eq!(state.game.lives, 0);
        assert_eq!(state.game.score, 1500.0);
        assert!(!state.game.is_invincible);
        assert_eq!(state.game.invincibility_time, 0.0);
        assert!(events.contains(&GameEvent::Crash));
        assert!(!events.contains(&GameEvent::BonusCollected));
        assert_eq!(state.game.high_scores.top_score(), Some(1500));
    }

    #[test]
    fn test_crash_into_pause_forfeits_pass_points() {
        let mut state = started(1);
        hold_spawner(&mut state);
        state.game.score = 800.0;
        let p = state.player;
        state.place_entity(EntityKind::Obstacle, Vec2::new(135.0, CANVAS_HEIGHT + 40.0));
        state.place_entity(EntityKind::NpcCar, p);

        let events = tick(&mut state, &TickInput::default(), DT);
        assert!(events.contains(&GameEvent::Crash));
        assert_eq!(state.game.status, GameStatus::CollisionPause);
        assert_eq!(state.game.score, 300.0);
        assert_eq!(state.entities.len(), 1);
        assert!(state.game.time_left < LEVEL_DURATION);
    }

    // Scenario D: last life lost ends the run and records a score
    #[test]
    fn test_game_over_records_high_score() {
        let mut state = started(1);
        hold_spawner(&mut state);
        state.game.lives = 1;
        state.game.score = 7000.0;
        let p = state.player;
        state.place_entity(EntityKind::PoliceCar, p);

        let events = tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.game.status, GameStatus::GameOver);
        assert_eq!(state.game.lives, 0);
        assert!(events.contains(&GameEvent::GameOver));
        assert!(events.contains(&GameEvent::HighScoresChanged));
        assert_eq!(state.game.high_scores.top_score(), Some(6500));

        // GameOver bypasses the pause entirely
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.game.status, GameStatus::GameOver);
    }

    #[test]
    fn test_win_on_last_level() {
        let mut state = started(MAX_LEVELS);
        hold_spawner(&mut state);
        state.game.time_left = DT / 2.0;
        let events = tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.game.status, GameStatus::Win);
        assert!(events.contains(&GameEvent::Win));
        assert!(events.contains(&GameEvent::HighScoresChanged));
        assert_eq!(state.game.high_scores.entries.len(), 1);
    }

    #[test]
    fn test_time_up_beats_crash() {
        let mut state = started(1);
        hold_spawner(&mut state);
        state.game.time_left = DT / 2.0;
        state.place_entity(EntityKind::NpcCar, state.player);
        let events = tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.game.status, GameStatus::LevelClear);
        assert_eq!(state.game.lives, INITIAL_LIVES);
        assert!(!events.contains(&GameEvent::Crash));
    }

    #[test]
    fn test_time_up_frame_awards_nothing() {
        let mut state = started(1);
        hold_spawner(&mut state);
        state.game.score = 1000.0;
        state.game.time_left = DT / 2.0;
        let p = state.player;
        state.place_entity(EntityKind::Bonus, p);
        state.place_entity(EntityKind::Obstacle, Vec2::new(135.0, CANVAS_HEIGHT + 40.0));

        let events = tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.game.status, GameStatus::LevelClear);
        assert_eq!(state.game.time_left, 0.0);
        assert_eq!(state.game.score, 1000.0);
        assert!(!state.game.is_invincible);
        assert!(!events.contains(&GameEvent::BonusCollected));
    }

    #[test]
    fn test_oil_starts_one_skid() {
        let mut state = started(2);
        hold_spawner(&mut state);
        state.place_entity(EntityKind::OilSpill, state.player);

        let events = tick(&mut state, &TickInput::default(), DT);
        assert!(events.contains(&GameEvent::Skid));
        assert!(state.game.is_skidding);
        assert_eq!(state.game.skid_time, SKID_DURATION);

        // Still on the spill, the skid is not extended
        let mut skids = 0;
        for _ in 0..10 {
            let e = &mut state.entities[0];
            e.position = state.player;
            if tick(&mut state, &TickInput::default(), DT).contains(&GameEvent::Skid) {
                skids += 1;
            }
        }
        assert_eq!(skids, 0);
        assert!(state.game.skid_time < SKID_DURATION);
    }

    #[test]
    fn test_near_miss_awards_once() {
        let mut state = started(1);
        hold_spawner(&mut state);
        let p = state.player;
        state.place_entity(EntityKind::NpcCar, Vec2::new(p.x + 50.0, p.y - 200.0));

        let mut near_misses = 0;
        for _ in 0..120 {
            let events = tick(&mut state, &TickInput::default(), DT);
            near_misses += events.iter().filter(|e| **e == GameEvent::NearMiss).count();
        }
        assert_eq!(near_misses, 1);
        assert_eq!(state.game.lives, INITIAL_LIVES);
        assert!(state.game.last_near_miss_time > 0.0);
    }

    #[test]
    fn test_pass_points_for_exiting_traffic() {
        let mut state = started(1);
        hold_spawner(&mut state);
        state.place_entity(EntityKind::Obstacle, Vec2::new(135.0, CANVAS_HEIGHT + 40.0));
        state.place_entity(EntityKind::Bonus, Vec2::new(465.0, CANVAS_HEIGHT + 40.0));
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.entities.is_empty());
        let time_score = 2.2 * TIME_SCORE_MULTIPLIER * DT;
        assert!((state.game.score - (PASS_POINTS + time_score)).abs() < 1e-2);
    }

    #[test]
    fn test_restart_keeps_leaderboard() {
        let mut state = started(1);
        state.game.high_scores.add_score("ACE", 5000, 3);
        state.game.player_name = "ACE".into();
        state.game.score = 123.0;
        let events = restart(&mut state);
        assert_eq!(events, vec![GameEvent::StopBgm]);
        assert_eq!(state.game.status, GameStatus::Start);
        assert_eq!(state.game.score, 0.0);
        assert_eq!(state.game.player_name, "ACE");
        assert_eq!(state.game.high_scores.top_score(), Some(5000));
    }

    #[test]
    fn test_autopilot_dodges() {
        let mut state = started(1);
        let p = state.player;
        state.place_entity(EntityKind::NpcCar, Vec2::new(p.x + 10.0, p.y - 150.0));
        let input = autopilot(&state);
        assert!(input.left);
        assert!(!input.right);
    }
}
