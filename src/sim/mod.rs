//! Deterministic simulation module
//!
//! All crack logic lives here. This module must be pure and deterministic:
//! - One step per crack per tick
//! - Seeded RNG only
//! - Stable iteration order (creation order)
//! - No rendering or platform dependencies

pub mod branch;
pub mod collision;
pub mod crack;
pub mod segment;
pub mod state;
pub mod tick;

pub use branch::{attach_seed, branch_probability, try_branch};
pub use collision::{StepCheck, check_step, may_block};
pub use crack::{Crack, CrackId, CrackSeed, CrackState, CrackStyle, ParentRef, Proposal, Wobble};
pub use segment::{
    clip_to_bounds, closest_point_on_segment, in_bounds, point_to_segment_distance, rotate,
    segment_intersection, try_normalize,
};
pub use state::{Particle, SimEvent, SimState};
pub use tick::{Surface, Trigger, tick};
