//! Sand Crack - branching crack growth on a 2D sand surface
//!
//! Core modules:
//! - `sim`: Deterministic simulation (crack growth, branching, collisions, dust)
//! - `renderer`: Read-only drawing helpers (strokes, vertices, sand texture)
//! - `settings`: Immutable run configuration

pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{FloatRange, QualityPreset, Settings};

use glam::Vec2;

/// Default tuning constants
pub mod consts {
    /// Default surface size (the reference canvas is capped at 800x800)
    pub const SURFACE_WIDTH: f32 = 800.0;
    pub const SURFACE_HEIGHT: f32 = 800.0;

    /// Minimum distance between a growth point and another crack segment
    pub const COLLISION_THRESHOLD: f32 = 5.0;
    /// Radius around a branch origin where the parent's path is ignored
    pub const BIRTH_RADIUS: f32 = 15.0;

    /// Global crack budget
    pub const MAX_CRACKS: usize = 300;
    pub const INITIAL_CRACKS: usize = 4;

    /// Base crack length in surface units
    pub const CRACK_LENGTH: f32 = 45.0;
    /// Relative length variation (± one third)
    pub const CRACK_LENGTH_VARIATION: f32 = 1.0 / 3.0;
    /// Target-seeking cracks may wander up to this factor of the straight distance
    pub const TARGET_SLACK: f32 = 1.5;

    /// Free-walk heading jitter per step (radians)
    pub const HEADING_JITTER: f32 = 0.25;

    /// Branching
    pub const BRANCH_PROBABILITY: f32 = 0.03;
    pub const BRANCH_MIN_POINTS: usize = 5;
    pub const BRANCH_LENGTH_SCALE: f32 = 0.6;

    /// Dust
    pub const DUST_BURST: usize = 50;
    pub const PARTICLE_DRIFT: f32 = 0.3;
    pub const PARTICLE_DAMPING: f32 = 0.98;
    pub const PARTICLE_SHRINK: f32 = 0.99;
    pub const PARTICLE_MIN_SIZE: f32 = 0.1;
    pub const PARTICLE_MAX_ALPHA: f32 = 0.7;
}

/// Unit vector for a heading angle (radians, 0 = +x)
#[inline]
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Heading angle of a vector
#[inline]
pub fn heading_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}
