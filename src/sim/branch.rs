//! Branch policy
//!
//! Decides when a growing crack forks. Deeper generations branch less often
//! and produce shorter children; the global crack cap silently drops requests.

use std::f32::consts::TAU;

use rand::Rng;

use super::crack::{Crack, CrackSeed, ParentRef};
use crate::settings::Settings;

/// Per-step branch chance for a crack of the given generation
#[inline]
pub fn branch_probability(base: f32, generation: u32) -> f32 {
    base / (generation as f32 + 1.0)
}

/// Roll for a branch at the crack's current tip
///
/// `total_cracks` counts every crack already in the run, including ones spawned
/// earlier this tick. On success the crack's branch spacing is reset to its tip.
pub fn try_branch<R: Rng>(
    crack: &mut Crack,
    settings: &Settings,
    total_cracks: usize,
    rng: &mut R,
) -> Option<CrackSeed> {
    if !crack.is_alive() || !crack.fertile {
        return None;
    }
    if crack.path.len() <= settings.branch_min_points {
        return None;
    }

    let tip = crack.tip();
    if tip.distance(crack.last_branch) < settings.branch_spacing {
        return None;
    }
    if total_cracks >= settings.max_cracks {
        return None;
    }

    let chance = branch_probability(settings.branch_probability, crack.generation);
    if rng.random::<f32>() >= chance {
        return None;
    }

    let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let offset = settings.branch_cone.sample(rng) * side;
    crack.last_branch = tip;

    Some(CrackSeed {
        origin: tip,
        heading: crack.branch_heading(offset),
        target: None,
        max_length: None,
        generation: crack.generation + 1,
        parent: Some(ParentRef {
            id: crack.id,
            index: crack.path.len() - 1,
        }),
    })
}

/// Seed a crack that starts on a random point of a random existing crack
pub fn attach_seed<R: Rng>(cracks: &[Crack], rng: &mut R) -> Option<CrackSeed> {
    if cracks.is_empty() {
        return None;
    }
    let host = &cracks[rng.random_range(0..cracks.len())];
    let index = rng.random_range(0..host.path.len());

    Some(CrackSeed {
        origin: host.path[index],
        heading: rng.random::<f32>() * TAU,
        target: None,
        max_length: None,
        generation: host.generation + 1,
        parent: Some(ParentRef { id: host.id, index }),
    })
}
