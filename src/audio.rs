//! Audio system driven by simulation events
//!
//! Procedurally generated sound effects, engine drone and a level-paced
//! background beat. On the web everything is synthesized with Web Audio;
//! elsewhere the manager only tracks state and stays silent.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Lost a life
    Crash,
    /// Bonus star picked up
    Star,
    NearMiss,
    /// Oil contact
    Skid,
    /// Police arriving soon
    Siren,
    LevelClear,
    GameOver,
    Win,
}

impl SoundEffect {
    /// The one-shot triggered by a simulation event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Crash => Some(SoundEffect::Crash),
            GameEvent::BonusCollected => Some(SoundEffect::Star),
            GameEvent::NearMiss => Some(SoundEffect::NearMiss),
            GameEvent::Skid => Some(SoundEffect::Skid),
            GameEvent::PoliceWarning => Some(SoundEffect::Siren),
            GameEvent::LevelClear => Some(SoundEffect::LevelClear),
            GameEvent::GameOver => Some(SoundEffect::GameOver),
            GameEvent::Win => Some(SoundEffect::Win),
            GameEvent::EngineSpeed { .. }
            | GameEvent::StartBgm { .. }
            | GameEvent::StopBgm
            | GameEvent::HighScoresChanged => None,
        }
    }
}

/// Seconds between background beats for a level
pub fn bgm_interval(level: u32) -> f32 {
    (400.0 - level as f32 * 20.0) / 1000.0
}

/// Pitch of the background beat for a level
pub fn bgm_frequency(level: u32) -> f32 {
    60.0 + level as f32 * 10.0
}

/// Engine drone pitch for a scroll speed
pub fn engine_frequency(speed: f32) -> f32 {
    40.0 + speed * 15.0
}

/// Engine drone loudness when audible
const ENGINE_GAIN: f32 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq)]
struct BgmLoop {
    level: u32,
    until_next: f32,
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    web: Option<web::WebAudio>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    bgm: Option<BgmLoop>,
    engine_speed: f32,
    engine_active: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        let web = {
            // May fail outside a secure context
            let web = web::WebAudio::new();
            if web.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            web
        };
        #[cfg(not(target_arch = "wasm32"))]
        log::warn!("No audio output on this platform - sound triggers are silent");

        Self {
            #[cfg(target_arch = "wasm32")]
            web,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            bgm: None,
            engine_speed: 0.0,
            engine_active: false,
        }
    }

    /// Take volumes and mute from the user's settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.master_volume = settings.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = settings.music_volume.clamp(0.0, 1.0);
        self.set_muted(settings.muted);
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(web) = &self.web {
            web.resume();
        }
    }

    /// Suspend output (focus lost)
    pub fn suspend(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(web) = &self.web {
            web.suspend();
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.push_engine();
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn sfx_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn music_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    /// React to one simulation event. Returns the one-shot it triggered.
    pub fn handle(&mut self, event: &GameEvent) -> Option<SoundEffect> {
        match *event {
            GameEvent::EngineSpeed { speed, active } => self.set_engine_speed(speed, active),
            GameEvent::StartBgm { level } => self.start_bgm(level),
            GameEvent::StopBgm => self.stop_bgm(),
            _ => {}
        }

        let effect = SoundEffect::for_event(event)?;
        self.play(effect);
        Some(effect)
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.sfx_gain();
        if vol <= 0.0 {
            return;
        }
        #[cfg(target_arch = "wasm32")]
        if let Some(web) = &self.web {
            web.play(effect, vol);
        }
        #[cfg(not(target_arch = "wasm32"))]
        log::trace!("{effect:?} at volume {vol:.2}");
    }

    /// Retarget the engine drone
    pub fn set_engine_speed(&mut self, speed: f32, active: bool) {
        self.engine_speed = speed;
        self.engine_active = active;
        self.push_engine();
    }

    fn engine_gain(&self) -> f32 {
        if self.engine_active {
            ENGINE_GAIN * self.music_gain()
        } else {
            0.0
        }
    }

    fn push_engine(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(web) = &self.web {
            web.set_engine(engine_frequency(self.engine_speed), self.engine_gain());
        }
    }

    /// True while the drone should be audible
    pub fn engine_audible(&self) -> bool {
        self.engine_gain() > 0.0
    }

    /// Start the background beat for `level`, replacing any running loop
    pub fn start_bgm(&mut self, level: u32) {
        self.resume();
        self.bgm = Some(BgmLoop {
            level,
            until_next: bgm_interval(level),
        });
        log::debug!("BGM started for level {level}");
    }

    pub fn stop_bgm(&mut self) {
        if self.bgm.take().is_some() {
            log::debug!("BGM stopped");
        }
    }

    pub fn bgm_level(&self) -> Option<u32> {
        self.bgm.map(|b| b.level)
    }

    /// Advance the beat clock; returns how many beats fired
    pub fn update(&mut self, dt: f32) -> u32 {
        let Some(bgm) = self.bgm.as_mut() else {
            return 0;
        };
        let interval = bgm_interval(bgm.level);
        let level = bgm.level;

        let mut beats = 0;
        bgm.until_next -= dt;
        while bgm.until_next <= 0.0 {
            bgm.until_next += interval;
            beats += 1;
        }

        #[cfg(target_arch = "wasm32")]
        if beats > 0 {
            let vol = self.music_gain();
            if let Some(web) = &self.web
                && vol > 0.0
            {
                web.beat(bgm_frequency(level), vol);
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        let _ = level;

        beats
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{
        AudioContext, BiquadFilterType, GainNode, OscillatorNode, OscillatorType,
    };

    use super::SoundEffect;

    /// Web Audio graph: a persistent engine voice plus throwaway one-shots
    pub struct WebAudio {
        ctx: AudioContext,
        engine: Option<(OscillatorNode, GainNode)>,
    }

    impl WebAudio {
        pub fn new() -> Option<Self> {
            let ctx = AudioContext::new().ok()?;
            let engine = Self::build_engine(&ctx);
            if engine.is_none() {
                log::warn!("Engine voice unavailable");
            }
            Some(Self { ctx, engine })
        }

        /// Sawtooth through a low-pass, silent until driven
        fn build_engine(ctx: &AudioContext) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let filter = ctx.create_biquad_filter().ok()?;
            let gain = ctx.create_gain().ok()?;
            let t = ctx.current_time();

            osc.set_type(OscillatorType::Sawtooth);
            osc.frequency().set_value_at_time(40.0, t).ok()?;
            filter.set_type(BiquadFilterType::Lowpass);
            filter.frequency().set_value_at_time(200.0, t).ok()?;
            gain.gain().set_value_at_time(0.0, t).ok()?;

            osc.connect_with_audio_node(&filter).ok()?;
            filter.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            osc.start().ok()?;
            Some((osc, gain))
        }

        pub fn resume(&self) {
            if self.ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }
        }

        pub fn suspend(&self) {
            let _ = self.ctx.suspend();
        }

        pub fn set_engine(&self, freq: f32, gain: f32) {
            let Some((osc, g)) = &self.engine else { return };
            let t = self.ctx.current_time();
            osc.frequency().set_target_at_time(freq, t, 0.1).ok();
            g.gain().set_target_at_time(gain, t, 0.2).ok();
        }

        pub fn play(&self, effect: SoundEffect, vol: f32) {
            self.resume();
            match effect {
                SoundEffect::Crash => self.play_crash(vol),
                SoundEffect::Star => self.play_star(vol),
                SoundEffect::NearMiss => self.play_near_miss(vol),
                SoundEffect::Skid => self.play_skid(vol),
                SoundEffect::Siren => self.play_siren(vol),
                SoundEffect::LevelClear => {
                    self.play_melody(&[440.0, 554.0, 659.0, 880.0], 0.1, OscillatorType::Triangle, vol)
                }
                SoundEffect::GameOver => {
                    self.play_melody(&[330.0, 293.0, 261.0, 246.0], 0.2, OscillatorType::Sawtooth, vol)
                }
                SoundEffect::Win => self.play_melody(
                    &[523.0, 659.0, 783.0, 1046.0, 1318.0],
                    0.15,
                    OscillatorType::Square,
                    vol,
                ),
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(&self, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
            let osc = self.ctx.create_oscillator().ok()?;
            let gain = self.ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Background beat - short triangle pulse
        pub fn beat(&self, freq: f32, vol: f32) {
            let Some((osc, gain)) = self.create_osc(freq, OscillatorType::Triangle) else {
                return;
            };
            let t = self.ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.08, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.4)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();
        }

        /// Crash - low-passed white noise burst
        fn play_crash(&self, vol: f32) {
            let rate = self.ctx.sample_rate();
            let len = (rate * 0.3) as u32;
            let Ok(buffer) = self.ctx.create_buffer(1, len, rate) else {
                return;
            };
            let mut data: Vec<f32> = (0..len)
                .map(|_| (js_sys::Math::random() * 2.0 - 1.0) as f32)
                .collect();
            if buffer.copy_to_channel(&mut data, 0).is_err() {
                return;
            }

            let Ok(noise) = self.ctx.create_buffer_source() else {
                return;
            };
            let Ok(filter) = self.ctx.create_biquad_filter() else {
                return;
            };
            let Ok(gain) = self.ctx.create_gain() else {
                return;
            };
            let t = self.ctx.current_time();

            noise.set_buffer(Some(&buffer));
            filter.set_type(BiquadFilterType::Lowpass);
            filter.frequency().set_value_at_time(400.0, t).ok();
            gain.gain().set_value_at_time(vol * 0.6, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();

            if noise.connect_with_audio_node(&filter).is_err()
                || filter.connect_with_audio_node(&gain).is_err()
                || gain.connect_with_audio_node(&self.ctx.destination()).is_err()
            {
                return;
            }
            noise.start().ok();
        }

        /// Star - bright upward sweep
        fn play_star(&self, vol: f32) {
            let Some((osc, gain)) = self.create_osc(440.0, OscillatorType::Triangle) else {
                return;
            };
            let t = self.ctx.current_time();

            osc.frequency().set_value_at_time(440.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(1200.0, t + 0.2)
                .ok();
            gain.gain().set_value_at_time(vol * 0.45, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        /// Near miss - quick whoosh past
        fn play_near_miss(&self, vol: f32) {
            let Some((osc, gain)) = self.create_osc(900.0, OscillatorType::Sine) else {
                return;
            };
            let t = self.ctx.current_time();

            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(300.0, t + 0.15)
                .ok();
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.18)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
        }

        /// Skid - wavering screech
        fn play_skid(&self, vol: f32) {
            let Some((osc, gain)) = self.create_osc(1400.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = self.ctx.current_time();

            for i in 0..6 {
                let at = t + i as f64 * 0.1;
                let freq = if i % 2 == 0 { 1400.0 } else { 1100.0 };
                osc.frequency().set_value_at_time(freq, at).ok();
            }
            gain.gain().set_value_at_time(vol * 0.12, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.65).ok();
        }

        /// Siren - alternating two-tone
        fn play_siren(&self, vol: f32) {
            let Some((osc, gain)) = self.create_osc(700.0, OscillatorType::Square) else {
                return;
            };
            let t = self.ctx.current_time();

            for i in 0..6 {
                let at = t + i as f64 * 0.25;
                let freq = if i % 2 == 0 { 700.0 } else { 950.0 };
                osc.frequency().set_value_at_time(freq, at).ok();
            }
            gain.gain().set_value_at_time(vol * 0.1, t).ok();
            gain.gain().set_value_at_time(vol * 0.1, t + 1.3).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 1.5)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 1.5).ok();
        }

        /// Consecutive notes, each fading out by the end of its slot
        fn play_melody(&self, freqs: &[f32], step: f64, osc_type: OscillatorType, vol: f32) {
            let t = self.ctx.current_time();
            for (i, freq) in freqs.iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(*freq, osc_type) else {
                    continue;
                };
                let start = t + i as f64 * step;
                let end = start + step;
                gain.gain().set_value_at_time(vol * 0.25, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, end)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(end).ok();
            }
        }
    }
}
