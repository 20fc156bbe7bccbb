//! Math, interpolation, noise and formatting helpers
//!
//! Pure functions only - nothing in here touches game state.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Linear interpolation between `start` and `end`
#[inline]
pub fn lerp(start: f32, end: f32, factor: f32) -> f32 {
    start + (end - start) * factor
}

/// Cheap hash-style noise in [-1, 1]
pub fn noise(x: f32, y: f32) -> f32 {
    let n = ((x as f64) * 12.9898 + (y as f64) * 78.233).sin() * 43758.5453;
    ((n - n.floor()) * 2.0 - 1.0) as f32
}

/// Sine forcing term for the road curve recurrence
#[inline]
pub fn road_curve(distance: f32, frequency: f32, amplitude: f32) -> f32 {
    (distance * frequency).sin() * amplitude
}

/// Sine forcing term for the elevation recurrence
#[inline]
pub fn hill_wave(distance: f32, frequency: f32, amplitude: f32) -> f32 {
    (distance * frequency).sin() * amplitude
}

/// Sinusoidal pulse used for HUD animation
#[inline]
pub fn pulse(time: f32, amplitude: f32, frequency: f32, phase: f32) -> f32 {
    amplitude * (frequency * time + phase).sin()
}

/// Format seconds as `MM:SS`
pub fn format_time(seconds: f32) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0).floor() as u32;
    let secs = (seconds % 60.0).floor() as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format meters as `850m` or `1.2km`
pub fn format_distance(meters: f32) -> String {
    if meters >= 1000.0 {
        format!("{:.1}km", meters / 1000.0)
    } else {
        format!("{}m", meters.round() as i64)
    }
}

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// 8-bit RGB color, parsed from and printed as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb::hex(0x000000);
    pub const WHITE: Rgb = Rgb::hex(0xFFFFFF);

    /// Build from a packed `0xRRGGBB` literal
    pub const fn hex(packed: u32) -> Self {
        Self(
            ((packed >> 16) & 0xFF) as u8,
            ((packed >> 8) & 0xFF) as u8,
            (packed & 0xFF) as u8,
        )
    }

    /// CSS colour string `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Normalized RGBA for vertex colors
    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
            alpha,
        ]
    }
}

/// Per-channel linear blend, rounded to the nearest integer
pub fn color_lerp(a: Rgb, b: Rgb, factor: f32) -> Rgb {
    let mix = |x: u8, y: u8| lerp(x as f32, y as f32, factor).round().clamp(0.0, 255.0) as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Colors AI cars and ad posts are painted with
pub const CAR_PALETTE: [Rgb; 7] = [
    Rgb::hex(0xFF6B35),
    Rgb::hex(0xF7931E),
    Rgb::hex(0xFFD23F),
    Rgb::hex(0x06FFA5),
    Rgb::hex(0x118AB2),
    Rgb::hex(0x073B4C),
    Rgb::hex(0xEF476F),
];

pub fn random_color<R: Rng>(rng: &mut R) -> Rgb {
    CAR_PALETTE[rng.random_range(0..CAR_PALETTE.len())]
}

/// Random sign: -1.0 or 1.0
pub fn random_side<R: Rng>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_lerp_endpoints_and_midpoint() {
        let red = Rgb::hex(0xFF0000);
        assert_eq!(color_lerp(red, Rgb::BLACK, 0.0), red);
        assert_eq!(color_lerp(red, Rgb::BLACK, 1.0), Rgb::BLACK);
        assert_eq!(color_lerp(red, Rgb::BLACK, 0.25).to_hex(), "#bf0000");
        assert_eq!(color_lerp(Rgb::BLACK, Rgb::WHITE, 0.5), Rgb(128, 128, 128));
    }

    #[test]
    fn test_hex_packing() {
        assert_eq!(Rgb::hex(0xFF6B35), Rgb(0xFF, 0x6B, 0x35));
        assert_eq!(Rgb::hex(0x06FFA5).to_hex(), "#06ffa5");
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(125.7), "02:05");
        assert_eq!(format_distance(999.4), "999m");
        assert_eq!(format_distance(1260.0), "1.3km");
        assert_eq!(format_distance(15000.0), "15.0km");
    }

    #[test]
    fn test_noise_range() {
        for i in 0..1000 {
            let n = noise(i as f32 * 0.37, 1.5);
            assert!((-1.0..=1.0).contains(&n));
        }
    }

    #[test]
    fn test_rect_intersects() {
        let square = |x: f32, y: f32| Rect {
            x,
            y,
            width: 10.0,
            height: 10.0,
        };
        let (a, b, c) = (square(0.0, 0.0), square(5.0, 5.0), square(10.0, 0.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
