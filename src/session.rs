//! Run loop driver
//!
//! Owns everything a running game needs besides the simulation itself: held
//! input, the frame clock, audio, storage and settings. Platform entry points
//! forward DOM/OS events here and pull snapshots back out.

use glam::Vec2;

use crate::audio::AudioManager;
use crate::highscores::HighScores;
use crate::platform::{FrameClock, InputState, KeyValueStore};
use crate::renderer::FrameStyle;
use crate::settings::Settings;
use crate::sim::{
    GameEvent, GameStatus, HudSnapshot, RenderSnapshot, SimState, SpawnSchedule, TickInput,
    autopilot, restart, start_level, tick,
};

/// One player's game, from title screen to title screen
pub struct GameSession {
    pub sim: SimState,
    pub input: InputState,
    pub audio: AudioManager,
    settings: Settings,
    clock: FrameClock,
    store: Box<dyn KeyValueStore>,
    /// Let the demo driver steer instead of held input
    pub autopilot: bool,
}

impl GameSession {
    /// Fresh session at the title screen, with stored preferences and scores loaded
    pub fn new(seed: u64, store: Box<dyn KeyValueStore>) -> Self {
        let settings = Settings::load(store.as_ref());
        let mut sim = SimState::new(seed);
        sim.game.high_scores = HighScores::load(store.as_ref());
        sim.game.player_name = settings.player_name.clone();

        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        Self {
            sim,
            input: InputState::default(),
            audio,
            settings,
            clock: FrameClock::new(),
            store,
            autopilot: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Edit settings, then apply and persist them
    pub fn update_settings(&mut self, edit: impl FnOnce(&mut Settings)) {
        edit(&mut self.settings);
        self.audio.apply_settings(&self.settings);
        self.sim.game.player_name = self.settings.player_name.clone();
        self.settings.save(self.store.as_mut());
    }

    /// Enter `level`; menus that end a run start a new one
    pub fn start_level(&mut self, level: u32) {
        self.input.clear();
        self.clock.reset();
        let events = start_level(&mut self.sim, level);
        self.dispatch(&events);
    }

    /// Begin a new run from level 1
    pub fn new_run(&mut self) {
        self.start_level(1);
    }

    /// From the level-clear menu, go on to the next level. Returns false if
    /// there is nothing to continue.
    pub fn continue_run(&mut self) -> bool {
        if self.sim.game.status != GameStatus::LevelClear {
            return false;
        }
        let next = self.sim.game.level + 1;
        self.start_level(next);
        true
    }

    /// Back to the title screen
    pub fn restart(&mut self) {
        self.input.clear();
        self.clock.reset();
        let events = restart(&mut self.sim);
        self.dispatch(&events);
    }

    /// Display-refresh callback. The first frame after a (re)start only
    /// records the baseline timestamp.
    pub fn frame(&mut self, now_ms: f64) -> Vec<GameEvent> {
        match self.clock.advance(now_ms) {
            Some(dt) => self.step(dt),
            None => Vec::new(),
        }
    }

    /// Advance by an explicit delta (headless runs, tests)
    pub fn step(&mut self, dt: f32) -> Vec<GameEvent> {
        let input = self.intent();
        let events = tick(&mut self.sim, &input, dt);
        self.dispatch(&events);
        self.audio.update(dt);
        events
    }

    fn intent(&self) -> TickInput {
        if self.autopilot {
            autopilot(&self.sim)
        } else {
            self.input.intent()
        }
    }

    /// Route side effects to audio and storage
    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            self.audio.handle(event);
            if *event == GameEvent::HighScoresChanged {
                self.sim.game.high_scores.save(self.store.as_mut());
            }
        }
    }

    /// Focus lost: drop held keys so nothing stays stuck
    pub fn on_blur(&mut self) {
        self.input.clear();
        if self.settings.mute_on_blur {
            self.audio.suspend();
        }
    }

    pub fn on_focus(&mut self) {
        self.audio.resume();
    }

    /// Loop torn down: forget the frame baseline and everything transient
    pub fn stop(&mut self) {
        self.clock.reset();
        self.input.clear();
        self.sim.particles.clear();
        self.sim.entities.clear();
        self.sim.schedule = SpawnSchedule::for_level(self.sim.level_config());
        self.audio.stop_bgm();
        self.audio.set_engine_speed(0.0, false);
        log::info!("Session stopped");
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.sim)
    }

    pub fn hud_snapshot(&self) -> HudSnapshot {
        HudSnapshot::capture(&self.sim)
    }

    /// Presentation style for this frame; `jitter` is a unit-square sample
    pub fn frame_style(&self, jitter: Vec2) -> FrameStyle {
        let shake = if self.settings.effective_screen_shake() {
            crate::renderer::shake_offset(self.sim.shake, jitter)
        } else {
            Vec2::ZERO
        };
        FrameStyle {
            shake_offset: shake,
            max_particles: self.settings.max_particles(),
            grid: self.settings.quality.grid_enabled(),
        }
    }
}
