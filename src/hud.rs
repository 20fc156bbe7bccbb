//! Read-only HUD values and their display strings
//!
//! The core fills a [`HudSnapshot`] every frame; front-ends decide how to show it.

use crate::sim::Stage;
use crate::util::{format_distance, format_time, pulse};

/// Numbers the HUD shows for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudSnapshot {
    /// Player speed in km/h
    pub speed: f32,
    /// Furthest distance reached this run
    pub distance: f32,
    pub stage: Stage,
    pub lives: u8,
    /// Seconds since the run started
    pub time: f32,
    pub score: u64,
    pub free_ride: bool,
    pub music: bool,
    /// Seconds left before the start, while counting down
    pub countdown: Option<f32>,
}

impl HudSnapshot {
    pub fn speed_text(&self) -> String {
        format!("{} km/h", self.speed.max(0.0).round() as u32)
    }

    pub fn distance_text(&self) -> String {
        format_distance(self.distance)
    }

    pub fn stage_name(&self) -> &'static str {
        self.stage.name()
    }

    /// `Stage 2: Rulindo District`
    pub fn stage_text(&self) -> String {
        format!("Stage {}: {}", self.stage.number(), self.stage.name())
    }

    pub fn lives_text(&self) -> String {
        if self.free_ride {
            "FREE RIDE MODE".to_string()
        } else {
            format!("Lives: {}", self.lives)
        }
    }

    pub fn time_text(&self) -> String {
        format_time(self.time)
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    pub fn music_text(&self) -> &'static str {
        if self.music { "Radio: ON" } else { "Radio: OFF" }
    }

    /// Whole seconds left on the countdown, or `GO!` on the last fraction
    pub fn countdown_text(&self) -> Option<String> {
        self.countdown.map(|left| {
            let whole = left.ceil() as u32;
            if whole == 0 {
                "GO!".to_string()
            } else {
                whole.to_string()
            }
        })
    }

    /// Breathing scale for the speedometer at wall-clock time `now` (seconds)
    pub fn speed_scale(now: f32) -> f32 {
        1.0 + pulse(now, 0.1, 2.0, 0.0)
    }

    /// Scale factor for the countdown digit, pulsing once per second
    pub fn countdown_scale(&self) -> f32 {
        match self.countdown {
            Some(left) => 1.0 + pulse(left.fract(), 0.2, std::f32::consts::TAU, 0.0).abs(),
            None => 1.0,
        }
    }
}
