//! Procedural road: segment generation, extension and scenery
//!
//! The road is a flat list of fixed-length segments. Each carries the value of
//! a damped sine recurrence for curve and elevation, so the road can be grown
//! forever from nothing but the last segment.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RoadConfig;
use crate::error::ConfigError;
use crate::util::{Rgb, hill_wave, noise, random_color, random_side, road_curve};

/// Segments to keep behind the camera in the visible window
pub const SEGMENTS_BEHIND_CAMERA: usize = 5;
/// Curve forcing amplitude
pub const CURVE_AMPLITUDE: f32 = 2.0;
/// Hill forcing amplitude
pub const HILL_AMPLITUDE: f32 = 1.0;
/// Color band flips every this many segments
pub const BAND_LENGTH: usize = 3;

pub const TREE_COUNT: usize = 200;
pub const SIGN_COUNT: usize = 15;
pub const AD_POST_COUNT: usize = 10;

const SIGN_MESSAGES: [&str; 7] = [
    "Welcome to Rwanda!",
    "Stage 1: Kigali Ahead",
    "Stage 2: Rulindo District",
    "Stage 3: Digital Horizon",
    "Beware of AI cars!",
    "Speed Limit 120 km/h",
    "Magic Garden 500m",
];

const AD_MESSAGES: [&str; 6] = [
    "Visit Rwanda",
    "Rwanda's Innovation Hub",
    "Refuel with Rwandan Coffee!",
    "Future Skills Drive",
    "RTB Competition 2025",
    "Digital Rwanda Vision",
];

/// Alternating stripe shading of the road
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorBand {
    Light,
    Dark,
}

/// Colors used to paint one band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandColors {
    pub road: Rgb,
    pub grass: Rgb,
    pub rumble: Rgb,
}

impl ColorBand {
    pub fn for_index(index: usize) -> Self {
        if (index / BAND_LENGTH) % 2 == 1 {
            ColorBand::Light
        } else {
            ColorBand::Dark
        }
    }

    pub fn colors(self) -> BandColors {
        match self {
            ColorBand::Light => BandColors {
                road: Rgb::hex(0x666666),
                grass: Rgb::hex(0x90EE90),
                rumble: Rgb::hex(0xFFFFFF),
            },
            ColorBand::Dark => BandColors {
                road: Rgb::hex(0x555555),
                grass: Rgb::hex(0x228B22),
                rumble: Rgb::hex(0xFF0000),
            },
        }
    }
}

/// Reference from a segment to a piece of scenery that sits on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneryRef {
    Tree(usize),
    Sign(usize),
    AdPost(usize),
}

/// One fixed-length slice of road
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: usize,
    /// Longitudinal start position (`index * segment_length`)
    pub z: f32,
    pub curve: f32,
    pub hill: f32,
    pub band: ColorBand,
    pub objects: Vec<SceneryRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    Palm,
    Regular,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub kind: TreeKind,
    /// Height multiplier so identical trees don't line up
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sign {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdPost {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub message: &'static str,
    pub color: Rgb,
}

/// Distance-banded section of the route
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    KigaliCity,
    RulindoDistrict,
    DigitalHorizon,
    MagicGarden,
}

/// Distances at which stages 2, 3 and 4 begin
pub const STAGE_THRESHOLDS: [f32; 3] = [5000.0, 10000.0, 15000.0];
/// Reaching this distance in the last stage wins the run
pub const VICTORY_DISTANCE: f32 = 15000.0;

impl Stage {
    pub const LAST: Stage = Stage::MagicGarden;

    pub fn from_distance(distance: f32) -> Self {
        if distance < STAGE_THRESHOLDS[0] {
            Stage::KigaliCity
        } else if distance < STAGE_THRESHOLDS[1] {
            Stage::RulindoDistrict
        } else if distance < STAGE_THRESHOLDS[2] {
            Stage::DigitalHorizon
        } else {
            Stage::MagicGarden
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Stage::KigaliCity),
            2 => Some(Stage::RulindoDistrict),
            3 => Some(Stage::DigitalHorizon),
            4 => Some(Stage::MagicGarden),
            _ => None,
        }
    }

    /// 1-based stage number
    pub fn number(self) -> u8 {
        match self {
            Stage::KigaliCity => 1,
            Stage::RulindoDistrict => 2,
            Stage::DigitalHorizon => 3,
            Stage::MagicGarden => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::KigaliCity => "Kigali City",
            Stage::RulindoDistrict => "Rulindo District",
            Stage::DigitalHorizon => "Digital Horizon",
            Stage::MagicGarden => "Magic Garden",
        }
    }

    /// Sky gradient `(top, horizon)` for this stage
    pub fn sky(self) -> (Rgb, Rgb) {
        match self {
            Stage::KigaliCity => (Rgb::hex(0x87CEEB), Rgb::hex(0x98D8E8)),
            Stage::RulindoDistrict => (Rgb::hex(0xFFB347), Rgb::hex(0x87CEEB)),
            Stage::DigitalHorizon | Stage::MagicGarden => {
                (Rgb::hex(0xFF6B6B), Rgb::hex(0x4ECDC4))
            }
        }
    }
}

/// Stage label for a raw stage number
pub fn stage_name(number: u8) -> &'static str {
    Stage::from_number(number).map_or("Unknown", Stage::name)
}

/// One step of the damped curve/hill recurrence at longitudinal position `z`
pub fn next_curve_hill(config: &RoadConfig, curve: f32, hill: f32, z: f32) -> (f32, f32) {
    let curve = (curve + road_curve(z, config.curviness, CURVE_AMPLITUDE)) * config.damping;
    let hill = (hill + hill_wave(z, config.hilliness, HILL_AMPLITUDE)) * config.damping;
    (curve, hill)
}

/// The road and everything placed along it
#[derive(Debug, Clone)]
pub struct Road {
    config: RoadConfig,
    segments: Vec<Segment>,
    pub trees: Vec<Tree>,
    pub signs: Vec<Sign>,
    pub ad_posts: Vec<AdPost>,
    /// Trees per world unit, fixed by the initial span
    tree_density: f32,
}

impl Road {
    /// Build the initial road and its scenery
    pub fn new<R: Rng>(config: RoadConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut road = Self {
            segments: Vec::with_capacity(config.initial_segments + config.segments_ahead),
            trees: Vec::with_capacity(TREE_COUNT),
            signs: Vec::with_capacity(SIGN_COUNT),
            ad_posts: Vec::with_capacity(AD_POST_COUNT),
            tree_density: 0.0,
            config,
        };
        road.generate_initial_road();
        road.generate_scenery(rng);
        Ok(road)
    }

    pub fn segment_length(&self) -> f32 {
        self.config.segment_length
    }

    pub fn half_width(&self) -> f32 {
        self.config.half_width
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: construction guarantees at least one segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Longitudinal extent of the generated road
    pub fn span(&self) -> f32 {
        self.segments.len() as f32 * self.config.segment_length
    }

    fn generate_initial_road(&mut self) {
        let (mut curve, mut hill) = (0.0, 0.0);
        for index in 0..self.config.initial_segments {
            let segment = self.make_segment(index, curve, hill);
            curve = segment.curve;
            hill = segment.hill;
            self.segments.push(segment);
        }
    }

    fn make_segment(&self, index: usize, prev_curve: f32, prev_hill: f32) -> Segment {
        let z = index as f32 * self.config.segment_length;
        let (curve, hill) = next_curve_hill(&self.config, prev_curve, prev_hill, z);
        Segment {
            index,
            z,
            curve,
            hill,
            band: ColorBand::for_index(index),
            objects: Vec::new(),
        }
    }

    fn generate_scenery<R: Rng>(&mut self, rng: &mut R) {
        let span = self.span();
        self.tree_density = TREE_COUNT as f32 / span;

        for _ in 0..TREE_COUNT {
            let z = rng.random_range(0.0..span);
            self.plant_tree(z, rng);
        }

        for i in 0..SIGN_COUNT {
            let z = (i + 1) as f32 * (span / (SIGN_COUNT + 1) as f32);
            let x = random_side(rng) * rng.random_range(600.0..800.0);
            let id = self.signs.len();
            self.signs.push(Sign {
                x,
                y: 0.0,
                z,
                message: SIGN_MESSAGES[i % SIGN_MESSAGES.len()],
            });
            self.attach(z, SceneryRef::Sign(id));
        }

        // Keep posts off the very start and end of the road when there is room
        let (lo, hi) = if span > 2000.0 {
            (1000.0, span - 1000.0)
        } else {
            (0.0, span)
        };
        for i in 0..AD_POST_COUNT {
            let z = rng.random_range(lo..hi);
            let x = random_side(rng) * rng.random_range(800.0..1500.0);
            let id = self.ad_posts.len();
            self.ad_posts.push(AdPost {
                x,
                y: 0.0,
                z,
                message: AD_MESSAGES[i % AD_MESSAGES.len()],
                color: random_color(rng),
            });
            self.attach(z, SceneryRef::AdPost(id));
        }
    }

    fn plant_tree<R: Rng>(&mut self, z: f32, rng: &mut R) {
        let x = random_side(rng) * rng.random_range(1200.0..2000.0);
        let kind = if rng.random::<f32>() > 0.3 {
            TreeKind::Palm
        } else {
            TreeKind::Regular
        };
        let id = self.trees.len();
        self.trees.push(Tree {
            x,
            y: 0.0,
            z,
            kind,
            size: 1.0 + 0.15 * noise(z, x),
        });
        self.attach(z, SceneryRef::Tree(id));
    }

    fn attach(&mut self, z: f32, object: SceneryRef) {
        let index = self.index_at(z);
        self.segments[index].objects.push(object);
    }

    /// Clamped segment index for a longitudinal position
    fn index_at(&self, z: f32) -> usize {
        let raw = (z / self.config.segment_length).floor();
        if raw >= 0.0 {
            (raw as usize).min(self.segments.len() - 1)
        } else {
            // Negative or NaN
            0
        }
    }

    /// Segment under `z`, clamped to the generated range
    pub fn current_segment(&self, z: f32) -> &Segment {
        &self.segments[self.index_at(z)]
    }

    pub fn curve_at(&self, z: f32) -> f32 {
        self.current_segment(z).curve
    }

    pub fn hill_at(&self, z: f32) -> f32 {
        self.current_segment(z).hill
    }

    /// Grow the road so it reaches `segments_ahead` past `player_z`
    ///
    /// Returns the number of segments appended. Calling again with the same
    /// or a smaller `player_z` appends nothing.
    pub fn extend_road<R: Rng>(&mut self, player_z: f32, rng: &mut R) -> usize {
        let len = self.config.segment_length;
        let needed = player_z + self.config.segments_ahead as f32 * len;
        let old_span = self.span();
        if !needed.is_finite() || needed <= old_span {
            return 0;
        }

        let count = ((needed - old_span) / len).ceil() as usize;
        for _ in 0..count {
            let (index, curve, hill) = match self.segments.last() {
                Some(last) => (last.index + 1, last.curve, last.hill),
                None => (0, 0.0, 0.0),
            };
            let segment = self.make_segment(index, curve, hill);
            self.segments.push(segment);
        }

        if self.config.extend_scenery {
            let new_span = self.span();
            let trees = ((new_span - old_span) * self.tree_density).round() as usize;
            for _ in 0..trees {
                let z = rng.random_range(old_span..new_span);
                self.plant_tree(z, rng);
            }
        }

        log::debug!(
            "Road extended by {} segments (now {}, span {:.0})",
            count,
            self.segments.len(),
            self.span()
        );
        count
    }

    /// Window from a few segments behind the camera to `draw_distance` ahead
    pub fn visible_segments(&self, camera_z: f32, draw_distance: usize) -> &[Segment] {
        let last = self.segments.len() - 1;
        let start = self
            .index_at(camera_z)
            .saturating_sub(SEGMENTS_BEHIND_CAMERA)
            .min(last);
        let end = start.saturating_add(draw_distance).min(last);
        &self.segments[start..=end]
    }
}
