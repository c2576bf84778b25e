//! Entity spawner
//!
//! At most one entity per tick. Density-weighted traffic spawns are rate
//! limited by `SPAWN_INTERVAL`; police follow their own sequential schedule.

use glam::Vec2;
use rand::Rng;

use super::state::{Entity, EntityKind, SimState};
use crate::consts::*;
use crate::tuning::{LevelConfig, level_theme};

/// Per-level spawn bookkeeping, in level-clock seconds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnSchedule {
    /// Time of the last successful spawn (any kind)
    pub last_spawn_at: Option<f32>,
    /// Police allowed this level
    pub police_quota: u32,
    pub police_spawned: u32,
    /// Armed police arrival; None once the quota is used up
    pub next_police_at: Option<f32>,
}

impl SpawnSchedule {
    pub fn for_level(config: &LevelConfig) -> Self {
        Self {
            last_spawn_at: None,
            police_quota: config.police_count,
            police_spawned: 0,
            next_police_at: (config.police_count > 0).then_some(POLICE_FIRST_SPAWN),
        }
    }

    /// Within the warning lead before an armed police arrival
    pub fn warning_active(&self, now: f32) -> bool {
        self.next_police_at
            .is_some_and(|at| now >= at - POLICE_WARNING_LEAD && now < at)
    }

    fn police_due(&self, now: f32) -> bool {
        self.police_spawned < self.police_quota && self.next_police_at.is_some_and(|at| now >= at)
    }

    fn interval_elapsed(&self, now: f32) -> bool {
        self.last_spawn_at
            .is_none_or(|last| now - last >= SPAWN_INTERVAL)
    }
}

/// What the spawner did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnReport {
    pub spawned: Option<(u32, EntityKind)>,
    /// Police warning switched on this tick
    pub warning_raised: bool,
}

/// True if nothing near the top of the screen occupies `lane_x`
pub fn lane_is_free(entities: &[Entity], lane_x: f32) -> bool {
    !entities
        .iter()
        .any(|e| (e.position.x - lane_x).abs() < LANE_TOLERANCE && e.position.y < SPAWN_CLEARANCE_Y)
}

/// Weighted draw over the density bands.
///
/// `frame_scale` is the tick length in reference frames; the bands are scaled
/// by it (capped so the total never exceeds 1). Rolls past the last band spawn
/// nothing.
pub fn draw_kind(config: &LevelConfig, roll: f32, frame_scale: f32) -> Option<EntityKind> {
    let total = config.total_density() * frame_scale;
    let scale = if total > 1.0 {
        frame_scale / total
    } else {
        frame_scale
    };

    let bands = [
        (EntityKind::NpcCar, config.traffic_density),
        (EntityKind::Obstacle, config.obstacle_density),
        (EntityKind::Bonus, config.bonus_density),
        (EntityKind::OilSpill, config.oil_density),
    ];
    let mut acc = 0.0;
    for (kind, density) in bands {
        acc += density * scale;
        if roll < acc {
            return Some(kind);
        }
    }
    None
}

/// Run the spawner for this tick (after motion, before collisions)
pub fn run_spawner(state: &mut SimState, dt: f32) -> SpawnReport {
    let now = state.clock;
    let mut report = SpawnReport::default();

    let warning = state.schedule.warning_active(now);
    report.warning_raised = warning && !state.game.police_warning;
    state.game.police_warning = warning;

    if state.schedule.police_due(now) {
        let lane = LANES[state.rng.random_range(0..LANES.len())];
        if lane_is_free(&state.entities, lane) {
            let id = spawn_at(state, EntityKind::PoliceCar, lane);
            let schedule = &mut state.schedule;
            schedule.police_spawned += 1;
            schedule.last_spawn_at = Some(now);
            schedule.next_police_at = if schedule.police_spawned < schedule.police_quota {
                Some(now + state.rng.random_range(POLICE_REARM_MIN..POLICE_REARM_MAX))
            } else {
                None
            };
            state.game.police_warning = false;
            log::debug!(
                "Police {}/{} released at {now:.2}s",
                state.schedule.police_spawned,
                state.schedule.police_quota
            );
            report.spawned = Some((id, EntityKind::PoliceCar));
            return report;
        }
    }

    if !state.schedule.interval_elapsed(now) {
        return report;
    }

    let lane = LANES[state.rng.random_range(0..LANES.len())];
    if !lane_is_free(&state.entities, lane) {
        return report;
    }

    let roll: f32 = state.rng.random();
    let frame_scale = dt * REFERENCE_FPS;
    if let Some(kind) = draw_kind(state.level_config(), roll, frame_scale) {
        let id = spawn_at(state, kind, lane);
        state.schedule.last_spawn_at = Some(now);
        report.spawned = Some((id, kind));
    }

    report
}

/// Create an entity of `kind` above the visible area in `lane_x`
fn spawn_at(state: &mut SimState, kind: EntityKind, lane_x: f32) -> u32 {
    let id = state.next_entity_id();
    let config = state.level_config();
    let color = match kind.fixed_color() {
        Some(color) => color,
        None => {
            let npc = &level_theme(state.game.level).npc;
            npc[state.rng.random_range(0..npc.len())]
        }
    };

    let mut entity = Entity::new(id, kind, Vec2::new(lane_x, SPAWN_Y), config.speed, color);
    if kind == EntityKind::PoliceCar {
        entity.target_lane_x = Some(super::motion::pick_other_lane(&mut state.rng, lane_x));
    }
    state.entities.push(entity);
    log::debug!("Spawned {kind:?} #{id} in lane {lane_x}");
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameStatus;
    use crate::tuning::level_config;

    fn playing_state(level: u32, seed: u64) -> SimState {
        let mut state = SimState::new(seed);
        state.game.status = GameStatus::Playing;
        state.game.level = level;
        state.reset_level_state();
        state
    }

    #[test]
    fn test_draw_kind_bands() {
        let config = level_config(1);
        assert_eq!(draw_kind(config, 0.0, 1.0), Some(EntityKind::NpcCar));
        assert_eq!(draw_kind(config, 0.016, 1.0), Some(EntityKind::Obstacle));
        assert_eq!(draw_kind(config, 0.021, 1.0), Some(EntityKind::Bonus));
        assert_eq!(draw_kind(config, 0.5, 1.0), None);
    }

    #[test]
    fn test_draw_kind_scales_with_frame_length() {
        let config = level_config(1);
        // Half a reference frame halves the traffic band
        assert_eq!(draw_kind(config, 0.009, 0.5), Some(EntityKind::Obstacle));
        // Huge steps never exceed certainty
        assert!(draw_kind(config, 0.99, 1000.0).is_some());
    }

    #[test]
    fn test_lane_exclusion() {
        let mut state = playing_state(1, 7);
        for lane in LANES {
            state.place_entity(EntityKind::NpcCar, Vec2::new(lane, 50.0));
        }
        for _ in 0..500 {
            state.clock += 1.0;
            let report = run_spawner(&mut state, 1.0 / 60.0);
            assert!(report.spawned.is_none());
        }
        assert_eq!(state.entities.len(), 4);
    }

    #[test]
    fn test_lane_far_down_does_not_block() {
        let entities = vec![Entity::new(1, EntityKind::NpcCar, Vec2::new(135.0, 400.0), 2.2, 0)];
        assert!(lane_is_free(&entities, 135.0));
        assert!(lane_is_free(&[], 135.0));
        let near_top = vec![Entity::new(2, EntityKind::Bonus, Vec2::new(140.0, 150.0), 2.2, 0)];
        assert!(!lane_is_free(&near_top, 135.0));
    }

    #[test]
    fn test_interval_limits_rate() {
        let mut state = playing_state(5, 11);
        let dt = 1.0 / 60.0;
        let mut spawn_times = Vec::new();
        for _ in 0..(60 * 20) {
            state.clock += dt;
            if let Some((_, kind)) = run_spawner(&mut state, dt).spawned {
                if kind != EntityKind::PoliceCar {
                    spawn_times.push(state.clock);
                }
            }
            // Keep lanes clear so only the interval gates spawns
            state.entities.clear();
        }
        assert!(!spawn_times.is_empty());
        for pair in spawn_times.windows(2) {
            assert!(pair[1] - pair[0] >= SPAWN_INTERVAL - 1e-4);
        }
    }

    #[test]
    fn test_police_schedule() {
        let mut state = playing_state(5, 99);
        let quota = level_config(5).police_count;
        let dt = 1.0 / 60.0;
        let mut police_times = Vec::new();
        let mut warnings = 0;
        while state.clock < 60.0 {
            state.clock += dt;
            let report = run_spawner(&mut state, dt);
            if report.warning_raised {
                warnings += 1;
            }
            if let Some((_, EntityKind::PoliceCar)) = report.spawned {
                police_times.push(state.clock);
            }
            state.entities.clear();
        }
        assert_eq!(police_times.len() as u32, quota);
        assert_eq!(warnings as u32, quota);
        assert!(police_times[0] >= POLICE_FIRST_SPAWN);
        for pair in police_times.windows(2) {
            assert!(pair[1] - pair[0] >= POLICE_REARM_MIN - 1e-3);
        }
        assert_eq!(state.schedule.next_police_at, None);
    }

    #[test]
    fn test_no_police_on_first_level() {
        let state = playing_state(1, 1);
        assert_eq!(state.schedule.next_police_at, None);
        assert!(!state.schedule.warning_active(4.0));
    }

    #[test]
    fn test_spawned_entities_start_above_screen() {
        let mut state = playing_state(4, 5);
        let dt = 1.0 / 60.0;
        for _ in 0..600 {
            state.clock += dt;
            run_spawner(&mut state, dt);
        }
        assert!(!state.entities.is_empty());
        for e in &state.entities {
            assert_eq!(e.position.y, SPAWN_Y);
            assert!(LANES.contains(&e.position.x));
            assert_eq!((e.width, e.height), e.kind.size());
            if e.kind == EntityKind::PoliceCar {
                let target = e.target_lane_x.unwrap();
                assert_ne!(target, e.position.x);
            }
        }
    }
}
