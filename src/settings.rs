//! Simulation settings
//!
//! Supplied once when a simulation is built and never mutated afterwards.
//! Persisted as JSON; every field has a default so partial files work.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::path::Path;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Maximum live dust particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }
}

impl FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            _ => Err(format!("unknown quality '{s}', expected low, medium or high")),
        }
    }
}

/// How a crack picks its next point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GrowthMode {
    /// Random walk around the current heading
    #[default]
    FreeWalk,
    /// Steer toward a target point, with jitter
    TargetSeeking,
}

/// Which other cracks may stop a growing crack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CollisionRule {
    /// Only cracks created earlier can halt a crack
    #[default]
    OlderBlocksYounger,
    /// Any other crack can halt a crack
    Mutual,
}

/// What happens to a step that leaves the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BoundaryPolicy {
    /// Drop the step, append nothing
    #[default]
    Discard,
    /// Append the point where the step meets the edge
    Clip,
}

/// Closed float interval used for per-crack random parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Degenerate range holding a single value
    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Uniform sample; returns `min` for empty or inverted ranges
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        self.min + rng.random::<f32>() * (self.max - self.min)
    }

    fn sorted(self) -> Self {
        if self.max < self.min {
            Self::new(self.max, self.min)
        } else {
            self
        }
    }
}

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; identical settings replay identical runs
    pub seed: u64,

    // === Surface ===
    pub width: f32,
    pub height: f32,
    /// Discard everything and start over when the surface size changes
    pub reset_on_resize: bool,

    // === Growth ===
    pub mode: GrowthMode,
    /// Base crack length in surface units
    pub crack_length: f32,
    /// Relative length variation (0.33 = ± one third)
    pub length_variation: f32,
    /// Target-seeking length budget as a factor of the straight distance
    pub target_slack: f32,
    /// Distance advanced per step
    pub speed: FloatRange,
    /// Free-walk heading jitter per step (radians)
    pub heading_jitter: f32,
    /// Target-seeking jitter per axis per step
    pub axis_jitter: f32,
    pub wobble_amplitude: FloatRange,
    pub wobble_frequency: FloatRange,
    /// Optional age budget in ticks
    pub max_age: Option<u32>,

    // === Collision ===
    pub collision_threshold: f32,
    pub birth_radius: f32,
    pub collision_rule: CollisionRule,
    pub boundary_policy: BoundaryPolicy,

    // === Spawning ===
    pub max_cracks: usize,
    pub initial_cracks: usize,
    /// Ticks between automatically originated cracks (0 disables)
    pub spawn_interval: u32,
    /// Chance a new crack starts on an existing crack instead of a random spot
    pub attach_chance: f32,

    // === Branching ===
    pub branch_probability: f32,
    pub branch_min_points: usize,
    /// Minimum distance from the previous branch point
    pub branch_spacing: f32,
    /// Chance a crack is able to branch at all
    pub fertile_chance: f32,
    /// Absolute rotation range of a branch relative to its parent (radians)
    pub branch_cone: FloatRange,
    /// Length multiplier applied once per generation
    pub branch_length_scale: f32,

    // === Style ===
    pub crack_width: FloatRange,
    pub crack_color: [f32; 4],

    // === Dust ===
    pub particles: bool,
    pub quality: QualityPreset,
    /// Particle lifetime in ticks
    pub particle_life: FloatRange,
    pub particle_size: FloatRange,
    /// Chance a growth step kicks up one particle
    pub dust_chance: f32,
    /// Particles emitted when a root crack appears
    pub dust_burst: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5A4D_C4AC,

            width: SURFACE_WIDTH,
            height: SURFACE_HEIGHT,
            reset_on_resize: true,

            mode: GrowthMode::FreeWalk,
            crack_length: CRACK_LENGTH,
            length_variation: CRACK_LENGTH_VARIATION,
            target_slack: TARGET_SLACK,
            speed: FloatRange::new(1.0, 2.0),
            heading_jitter: HEADING_JITTER,
            axis_jitter: 0.5,
            wobble_amplitude: FloatRange::new(0.0, 0.3),
            wobble_frequency: FloatRange::new(0.05, 0.2),
            max_age: None,

            collision_threshold: COLLISION_THRESHOLD,
            birth_radius: BIRTH_RADIUS,
            collision_rule: CollisionRule::OlderBlocksYounger,
            boundary_policy: BoundaryPolicy::Discard,

            max_cracks: MAX_CRACKS,
            initial_cracks: INITIAL_CRACKS,
            spawn_interval: 2,
            attach_chance: 0.3,

            branch_probability: BRANCH_PROBABILITY,
            branch_min_points: BRANCH_MIN_POINTS,
            branch_spacing: 10.0,
            fertile_chance: 0.7,
            branch_cone: FloatRange::new(FRAC_PI_4, FRAC_PI_2),
            branch_length_scale: BRANCH_LENGTH_SCALE,

            crack_width: FloatRange::new(1.0, 3.0),
            crack_color: [0.251, 0.235, 0.208, 1.0],

            particles: true,
            quality: QualityPreset::Medium,
            particle_life: FloatRange::new(60.0, 80.0),
            particle_size: FloatRange::new(0.5, 2.5),
            dust_chance: 0.3,
            dust_burst: DUST_BURST,
        }
    }
}

impl Settings {
    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Invalid settings in {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Cannot read {}: {}", path.display(), e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Clamp values the core cannot work with
    pub fn sanitized(mut self) -> Self {
        let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let non_negative = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };

        self.width = non_negative(self.width);
        self.height = non_negative(self.height);
        self.crack_length = non_negative(self.crack_length);
        self.length_variation = unit(self.length_variation);
        self.target_slack = non_negative(self.target_slack).max(1.0);
        self.speed = self.speed.sorted();
        self.speed.min = self.speed.min.max(0.01);
        self.speed.max = self.speed.max.max(self.speed.min);
        self.heading_jitter = non_negative(self.heading_jitter);
        self.axis_jitter = non_negative(self.axis_jitter);
        self.wobble_amplitude = self.wobble_amplitude.sorted();
        self.wobble_frequency = self.wobble_frequency.sorted();

        self.collision_threshold = non_negative(self.collision_threshold);
        self.birth_radius = non_negative(self.birth_radius);

        self.attach_chance = unit(self.attach_chance);
        self.branch_probability = unit(self.branch_probability);
        self.branch_spacing = non_negative(self.branch_spacing);
        self.fertile_chance = unit(self.fertile_chance);
        self.branch_cone = self.branch_cone.sorted();
        self.branch_length_scale = non_negative(self.branch_length_scale);

        self.crack_width = self.crack_width.sorted();
        self.particle_life = self.particle_life.sorted();
        self.particle_life.min = self.particle_life.min.max(1.0);
        self.particle_life.max = self.particle_life.max.max(self.particle_life.min);
        self.particle_size = self.particle_size.sorted();
        self.dust_chance = unit(self.dust_chance);
        self
    }
}
