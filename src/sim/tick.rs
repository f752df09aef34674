//! Simulation tick
//!
//! One call advances every growing crack by exactly one step, in creation
//! order. Branches spawned during the pass are buffered and merged after it,
//! so they first grow on the next tick.

use glam::Vec2;
use rand::Rng;

use super::branch::{attach_seed, try_branch};
use super::collision::check_step;
use super::crack::{Crack, CrackSeed, Proposal};
use super::state::{SimEvent, SimState};

/// Source of the current drawing surface size
pub trait Surface {
    fn size(&self) -> Vec2;
}

impl Surface for Vec2 {
    fn size(&self) -> Vec2 {
        *self
    }
}

impl Surface for (f32, f32) {
    fn size(&self) -> Vec2 {
        Vec2::new(self.0, self.1)
    }
}

/// External request for a new root crack
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// Start a crack at a point (e.g. a click)
    At(Vec2),
    /// Start a crack at a random point
    Random,
}

impl SimState {
    /// Queue a trigger; it is applied at the start of the next tick
    pub fn trigger(&mut self, trigger: Trigger) {
        self.triggers.push_back(trigger);
    }
}

/// Advance the simulation by one tick
pub fn tick(state: &mut SimState, surface: &impl Surface) {
    state.events.clear();

    let size = surface.size().max(Vec2::ZERO);
    if size != state.bounds {
        if state.settings.reset_on_resize {
            state.reset(size);
        } else {
            state.bounds = size;
        }
    }

    state.time_ticks += 1;

    apply_triggers(state);
    grow_cracks(state);
    originate(state);
    state.update_particles();
}

/// Spawn cracks requested since the last tick
fn apply_triggers(state: &mut SimState) {
    while let Some(trigger) = state.triggers.pop_front() {
        let burst = state.settings.dust_burst;
        let spawned = match trigger {
            Trigger::At(at) => {
                let heading = state.rng.random::<f32>() * std::f32::consts::TAU;
                let at = at.clamp(Vec2::ZERO, state.bounds);
                state.spawn(CrackSeed::root(at, heading), burst * 2)
            }
            Trigger::Random => state.spawn_random_root(),
        };
        if spawned.is_none() {
            log::debug!("Trigger {:?} dropped at crack cap", trigger);
        }
    }
}

/// One growth step for every crack that existed when the pass started
fn grow_cracks(state: &mut SimState) {
    let count = state.cracks.len();
    let mut pending: Vec<(Crack, usize)> = Vec::new();

    for index in 0..count {
        if !state.cracks[index].is_alive() {
            continue;
        }

        let proposal = state.cracks[index].propose(&state.settings, &mut state.rng);
        let (to, heading) = match proposal {
            Proposal::Step { to, heading } => (to, heading),
            Proposal::Stop(terminal) => {
                state.cracks[index].stop(terminal);
                finish(state, index);
                continue;
            }
        };

        let from = state.cracks[index].tip();
        let check = check_step(&state.cracks, index, from, to, state.bounds, &state.settings);
        if !state.cracks[index].commit(heading, to, check) {
            finish(state, index);
            continue;
        }

        if state.rng.random::<f32>() < state.settings.dust_chance {
            state.emit_dust(to, 1);
        }

        let total = count + pending.len();
        let seed = try_branch(&mut state.cracks[index], &state.settings, total, &mut state.rng);
        if let Some(seed) = seed {
            let id = total;
            let child = Crack::new(id, seed, &state.settings, &mut state.rng);
            pending.push((child, state.settings.dust_burst / 2));
            state.events.push(SimEvent::Branched {
                parent: index,
                child: id,
                at: seed.origin,
            });
            log::debug!("Crack {} branched into {} (generation {})", index, id, seed.generation);
        }
    }

    for (child, dust) in pending {
        let at = child.origin();
        state.cracks.push(child);
        state.emit_dust(at, dust);
    }
}

fn finish(state: &mut SimState, index: usize) {
    let crack = &state.cracks[index];
    log::debug!(
        "Crack {} stopped: {:?} after {} points",
        crack.id,
        crack.state,
        crack.path.len()
    );
    state.events.push(SimEvent::Terminated {
        id: crack.id,
        state: crack.state,
    });
}

/// Periodically start a new crack, sometimes on an existing one
fn originate(state: &mut SimState) {
    let interval = state.settings.spawn_interval as u64;
    if interval == 0 || state.time_ticks % interval != 0 || !state.has_room() {
        return;
    }

    let attach = state.rng.random::<f32>() < state.settings.attach_chance;
    let seed = if attach {
        attach_seed(&state.cracks, &mut state.rng)
    } else {
        None
    };

    match seed {
        Some(seed) => {
            state.spawn(seed, state.settings.dust_burst);
        }
        None => {
            state.spawn_random_root();
        }
    }
}
