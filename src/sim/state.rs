//! Simulation state and dust particles
//!
//! Everything a renderer needs lives here. The RNG is owned by the state so a
//! run is fully determined by its settings.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::crack::{Crack, CrackId, CrackSeed, CrackState};
use super::tick::Trigger;
use crate::consts::*;
use crate::settings::Settings;

/// A dust particle, independent of the crack that kicked it up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Remaining life in ticks
    pub life: f32,
    pub max_life: f32,
}

impl Particle {
    pub fn new<R: Rng>(at: Vec2, settings: &Settings, rng: &mut R) -> Self {
        let jitter = Vec2::new(rng.random::<f32>() * 4.0 - 2.0, rng.random::<f32>() * 4.0 - 2.0);
        let vel = Vec2::new(rng.random::<f32>() * 2.0 - 1.0, rng.random::<f32>() * 2.0 - 1.0);
        let life = settings.particle_life.sample(rng);
        Self {
            pos: at + jitter,
            vel,
            size: settings.particle_size.sample(rng),
            life,
            max_life: life,
        }
    }

    /// Advance one tick. Returns false once the particle has expired.
    pub fn update(&mut self) -> bool {
        self.pos += self.vel * PARTICLE_DRIFT;
        self.vel *= PARTICLE_DAMPING;
        self.life -= 1.0;
        self.size = (self.size * PARTICLE_SHRINK).max(PARTICLE_MIN_SIZE);
        self.life > 0.0
    }

    /// Opacity for rendering, fading with remaining life
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0) * PARTICLE_MAX_ALPHA
    }
}

/// Things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SimEvent {
    Spawned { id: CrackId, at: Vec2 },
    Branched { parent: CrackId, child: CrackId, at: Vec2 },
    Terminated { id: CrackId, state: CrackState },
}

/// Complete simulation state (deterministic for a given settings value)
#[derive(Debug, Clone, Serialize)]
pub struct SimState {
    pub settings: Settings,
    /// Surface size used for the last tick
    pub bounds: Vec2,
    /// All cracks in creation order; a crack's id is its index
    pub cracks: Vec<Crack>,
    /// Dust, oldest first
    pub particles: VecDeque<Particle>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Number of resets since construction
    pub resets: u32,
    /// Events from the most recent tick
    #[serde(skip)]
    pub events: Vec<SimEvent>,
    /// External triggers waiting for the next tick
    #[serde(skip)]
    pub(crate) triggers: VecDeque<Trigger>,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
}

impl SimState {
    /// Create an empty simulation; call [`SimState::seed_initial`] or tick to populate it
    pub fn empty(settings: Settings) -> Self {
        let settings = settings.sanitized();
        Self {
            bounds: Vec2::new(settings.width, settings.height),
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            cracks: Vec::new(),
            particles: VecDeque::new(),
            time_ticks: 0,
            resets: 0,
            events: Vec::new(),
            triggers: VecDeque::new(),
        }
    }

    /// Create a simulation seeded with the configured initial cracks
    pub fn new(settings: Settings) -> Self {
        let mut state = Self::empty(settings);
        state.seed_initial();
        state
    }

    /// Originate the configured number of initial cracks
    pub fn seed_initial(&mut self) {
        for _ in 0..self.settings.initial_cracks {
            self.spawn_random_root();
        }
    }

    /// Discard all cracks and particles and start over on a new surface
    pub fn reset(&mut self, bounds: Vec2) {
        log::info!(
            "Reset after {} ticks: {} cracks dropped, surface {}x{}",
            self.time_ticks,
            self.cracks.len(),
            bounds.x,
            bounds.y
        );
        self.bounds = bounds;
        self.cracks.clear();
        self.particles.clear();
        self.triggers.clear();
        self.events.clear();
        self.resets += 1;
        self.seed_initial();
    }

    /// Whether another crack fits under the global cap
    #[inline]
    pub fn has_room(&self) -> bool {
        self.cracks.len() < self.settings.max_cracks
    }

    pub fn live_cracks(&self) -> impl Iterator<Item = &Crack> {
        self.cracks.iter().filter(|c| c.is_alive())
    }

    /// Next crack id (ids are arena indices)
    #[inline]
    pub fn next_crack_id(&self) -> CrackId {
        self.cracks.len()
    }

    /// Add a crack built from `seed`, subject to the global cap
    pub fn spawn(&mut self, seed: CrackSeed, dust: usize) -> Option<CrackId> {
        if !self.has_room() {
            log::debug!("Crack cap {} reached, spawn dropped", self.settings.max_cracks);
            return None;
        }
        let id = self.next_crack_id();
        let crack = Crack::new(id, seed, &self.settings, &mut self.rng);
        self.cracks.push(crack);
        self.emit_dust(seed.origin, dust);
        self.events.push(SimEvent::Spawned {
            id,
            at: seed.origin,
        });
        Some(id)
    }

    /// Root crack at a random surface position with a random heading
    pub fn spawn_random_root(&mut self) -> Option<CrackId> {
        let seed = self.random_root_seed();
        self.spawn(seed, self.settings.dust_burst)
    }

    pub(crate) fn random_root_seed(&mut self) -> CrackSeed {
        let origin = Vec2::new(
            self.rng.random::<f32>() * self.bounds.x,
            self.rng.random::<f32>() * self.bounds.y,
        );
        let heading = self.rng.random::<f32>() * std::f32::consts::TAU;
        CrackSeed::root(origin, heading)
    }

    /// Kick up `count` particles around `at`, dropping the oldest past the cap
    pub fn emit_dust(&mut self, at: Vec2, count: usize) {
        let cap = self.settings.max_particles();
        if cap == 0 {
            return;
        }
        for _ in 0..count {
            let particle = Particle::new(at, &self.settings, &mut self.rng);
            self.particles.push_back(particle);
            if self.particles.len() > cap {
                self.particles.pop_front();
            }
        }
    }

    /// Age every particle and drop the expired ones
    pub fn update_particles(&mut self) {
        self.particles.retain_mut(|p| p.update());
    }

    /// Total points across all crack paths
    pub fn point_count(&self) -> usize {
        self.cracks.iter().map(|c| c.path.len()).sum()
    }
}

impl PartialEq for SimState {
    /// Two runs are equal when their observable geometry matches
    fn eq(&self, other: &Self) -> bool {
        self.bounds == other.bounds
            && self.time_ticks == other.time_ticks
            && self.cracks == other.cracks
            && self.particles == other.particles
    }
}
