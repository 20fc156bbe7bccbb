//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects and a random-note radio. The mapping
//! from game events to sounds is plain data; only `AudioManager` touches the
//! browser.

use rand::Rng;

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Throttle pressed - short engine blip
    Engine,
    /// Brake pressed
    Brake,
    /// Player hit a car
    Crash,
    /// Entered a new stage
    StageChange,
    /// Countdown finished
    Start,
    /// Reached the Magic Garden
    Victory,
    /// Out of lives
    GameOver,
    /// Menu-style toggle (pause, free ride, radio)
    Toggle,
}

impl SoundEffect {
    /// Sound to play for an event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Accelerate => Some(SoundEffect::Engine),
            GameEvent::Brake => Some(SoundEffect::Brake),
            GameEvent::Collision { .. } => Some(SoundEffect::Crash),
            GameEvent::StageChanged(_) => Some(SoundEffect::StageChange),
            GameEvent::RunStarted => Some(SoundEffect::Start),
            GameEvent::RunFinished(run) if run.victory => Some(SoundEffect::Victory),
            GameEvent::RunFinished(_) => Some(SoundEffect::GameOver),
            GameEvent::FreeRideToggled(_) | GameEvent::Paused | GameEvent::Resumed => {
                Some(SoundEffect::Toggle)
            }
            GameEvent::RadioToggled(_) => None,
        }
    }
}

/// C major scale the radio picks from (Hz)
pub const RADIO_NOTES: [f32; 8] = [262.0, 294.0, 330.0, 349.0, 392.0, 440.0, 494.0, 523.0];
/// Seconds between radio notes
pub const RADIO_INTERVAL: f32 = 1.0;
/// Seconds each radio note rings
pub const RADIO_NOTE_LENGTH: f64 = 0.5;

/// Next radio note
pub fn radio_note<R: Rng>(rng: &mut R) -> f32 {
    RADIO_NOTES[rng.random_range(0..RADIO_NOTES.len())]
}

/// Times a note is due every [`RADIO_INTERVAL`] seconds
#[derive(Debug, Clone, Default)]
pub struct RadioClock {
    elapsed: f32,
}

impl RadioClock {
    /// Advance by `dt`; true when a note should start
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        if self.elapsed >= RADIO_INTERVAL {
            self.elapsed %= RADIO_INTERVAL;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{RADIO_NOTE_LENGTH, RadioClock, SoundEffect, radio_note};
    use crate::settings::Settings;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        sfx_volume: f32,
        music_volume: f32,
        radio_on: bool,
        radio_clock: RadioClock,
        rng: Pcg32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Fails outside secure contexts
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                sfx_volume: settings.effective_sfx_volume(),
                music_volume: settings.effective_music_volume(),
                radio_on: settings.music_enabled,
                radio_clock: RadioClock::default(),
                rng: Pcg32::seed_from_u64(js_sys::Date::now() as u64),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.sfx_volume = settings.effective_sfx_volume();
            self.music_volume = settings.effective_music_volume();
        }

        pub fn set_radio(&mut self, on: bool) {
            self.radio_on = on;
            self.radio_clock.reset();
        }

        /// Play a random note once per interval while the radio is on
        pub fn update_radio(&mut self, dt: f32) {
            if !self.radio_on || self.music_volume <= 0.0 {
                return;
            }
            if !self.radio_clock.advance(dt) {
                return;
            }
            let freq = radio_note(&mut self.rng);
            let Some(ctx) = self.ready_context() else {
                return;
            };
            if let Some((osc, gain)) = Self::create_osc(ctx, freq, OscillatorType::Sine) {
                let t = ctx.current_time();
                gain.gain()
                    .set_value_at_time(self.music_volume * 0.1, t)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + RADIO_NOTE_LENGTH).ok();
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.sfx_volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = self.ready_context() else {
                return;
            };

            match effect {
                SoundEffect::Engine => Self::play_engine(ctx, vol),
                SoundEffect::Brake => Self::play_brake(ctx, vol),
                SoundEffect::Crash => Self::play_crash(ctx, vol),
                SoundEffect::StageChange => {
                    Self::play_arpeggio(ctx, vol, &[400.0, 500.0, 600.0, 800.0], 0.1)
                }
                SoundEffect::Start => Self::play_arpeggio(ctx, vol, &[523.0, 784.0], 0.12),
                SoundEffect::Victory => {
                    Self::play_arpeggio(ctx, vol, &[500.0, 600.0, 700.0, 800.0, 1000.0], 0.08)
                }
                SoundEffect::GameOver => Self::play_game_over(ctx, vol),
                SoundEffect::Toggle => Self::play_toggle(ctx, vol),
            }
        }

        fn ready_context(&self) -> Option<&AudioContext> {
            let ctx = self.ctx.as_ref()?;
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Some(ctx)
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Engine - low 100 Hz blip
        fn play_engine(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 100.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.1, t).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Brake - flat square buzz
        fn play_brake(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 150.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
        }

        /// Crash - falling sawtooth
        fn play_crash(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 200.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.frequency().set_value_at_time(200.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(50.0, t + 0.5)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();
        }

        fn play_toggle(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 600.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.06)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.08).ok();
        }

        /// Rising notes, `step` seconds apart
        fn play_arpeggio(ctx: &AudioContext, vol: f32, notes: &[f32], step: f64) {
            for (i, freq) in notes.iter().enumerate() {
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Triangle)
                {
                    let t = ctx.current_time() + i as f64 * step;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.35).ok();
                }
            }
        }

        /// Game over - sad descending
        fn play_game_over(ctx: &AudioContext, vol: f32) {
            for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                let delay = i as f64 * 0.2;
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.4).ok();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{RunResult, Stage};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_event_sounds() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Collision { lives: 2 }),
            Some(SoundEffect::Crash)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Accelerate),
            Some(SoundEffect::Engine)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::RadioToggled(true)), None);

        let mut run = RunResult {
            distance: 15000.0,
            time: 300.0,
            stage: Stage::MagicGarden,
            victory: true,
        };
        assert_eq!(
            SoundEffect::for_event(&GameEvent::RunFinished(run)),
            Some(SoundEffect::Victory)
        );
        run.victory = false;
        assert_eq!(
            SoundEffect::for_event(&GameEvent::RunFinished(run)),
            Some(SoundEffect::GameOver)
        );
    }

    #[test]
    fn test_radio_notes_from_scale() {
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..50 {
            assert!(RADIO_NOTES.contains(&radio_note(&mut rng)));
        }
    }

    #[test]
    fn test_radio_clock_fires_once_per_interval() {
        let mut clock = RadioClock::default();
        let fired = (0..120).filter(|_| clock.advance(1.0 / 60.0)).count();
        assert!((1..=2).contains(&fired));

        clock.reset();
        assert!(!clock.advance(0.5));
        assert!(clock.advance(0.5));
    }
}
