//! Crack entity and its growth step
//!
//! A crack is an append-only polyline. Each tick it proposes one candidate
//! point; the collision policy decides whether that point is committed.
//! Once a crack leaves `Growing` it never changes again.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::StepCheck;
use super::segment::{rotate, try_normalize};
use crate::settings::{GrowthMode, Settings};
use crate::{heading_of, heading_vector};

/// Index of a crack in the simulation arena (creation order)
pub type CrackId = usize;

/// Crack lifecycle. Every state except `Growing` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrackState {
    Growing,
    /// Stopped against another crack's path
    Collided { with: CrackId },
    /// Next step would have left the surface
    OutOfBounds,
    /// Length budget used up
    Exhausted,
    /// Age budget used up
    Expired,
    /// Start and target coincide, no direction to grow in
    Degenerate,
}

impl CrackState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CrackState::Growing)
    }
}

/// Link from a branch to the crack it grew out of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: CrackId,
    /// Index into the parent's path where the branch starts
    pub index: usize,
}

/// Sinusoidal heading perturbation, fixed per crack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wobble {
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
}

impl Wobble {
    #[inline]
    pub fn at(&self, age: u32) -> f32 {
        self.amplitude * (self.frequency * age as f32 + self.phase).sin()
    }
}

/// Cosmetic attributes, never consulted by growth decisions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrackStyle {
    pub width: f32,
    pub color: [f32; 4],
}

/// Where a new crack starts and how it should grow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrackSeed {
    pub origin: Vec2,
    pub heading: f32,
    /// Target for target-seeking growth; free-walk cracks ignore it
    pub target: Option<Vec2>,
    /// Length budget; `None` derives it from the mode
    pub max_length: Option<f32>,
    pub generation: u32,
    pub parent: Option<ParentRef>,
}

impl CrackSeed {
    /// A root crack heading in `heading` with a free-walk length budget
    pub fn root(origin: Vec2, heading: f32) -> Self {
        Self {
            origin,
            heading,
            target: None,
            max_length: None,
            generation: 0,
            parent: None,
        }
    }

    /// A root crack that steers toward `target`
    pub fn toward(origin: Vec2, target: Vec2) -> Self {
        Self {
            origin,
            heading: heading_of(target - origin),
            target: Some(target),
            max_length: None,
            generation: 0,
            parent: None,
        }
    }
}

/// A candidate extension, not yet validated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Proposal {
    Step { to: Vec2, heading: f32 },
    /// The crack cannot grow further; no candidate is produced
    Stop(CrackState),
}

/// A growing fracture path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crack {
    pub id: CrackId,
    /// Ordered growth points; the first is the origin
    pub path: Vec<Vec2>,
    /// Current heading (radians)
    pub heading: f32,
    pub target: Option<Vec2>,
    pub mode: GrowthMode,
    pub generation: u32,
    pub parent: Option<ParentRef>,
    pub state: CrackState,
    pub style: CrackStyle,
    /// Step length
    pub speed: f32,
    pub wobble: Wobble,
    /// Accumulated path length
    pub length: f32,
    pub max_length: f32,
    /// Steps taken
    pub age: u32,
    /// Whether this crack may spawn branches
    pub fertile: bool,
    /// Point of the last branch (the origin until the first one)
    pub last_branch: Vec2,
}

impl Crack {
    /// Build a crack from a seed, drawing its per-crack parameters
    pub fn new<R: Rng>(
        id: CrackId,
        seed: CrackSeed,
        settings: &Settings,
        rng: &mut R,
    ) -> Self {
        let mode = settings.mode;
        let generation_scale = settings.branch_length_scale.powi(seed.generation as i32);

        let (target, max_length) = match mode {
            GrowthMode::FreeWalk => {
                let max_length = seed
                    .max_length
                    .unwrap_or_else(|| random_length(settings, rng) * generation_scale);
                (seed.target, max_length)
            }
            GrowthMode::TargetSeeking => {
                let target = seed.target.unwrap_or_else(|| {
                    let distance = seed
                        .max_length
                        .unwrap_or_else(|| random_length(settings, rng) * generation_scale);
                    seed.origin + heading_vector(seed.heading) * distance
                });
                let max_length = seed.origin.distance(target) * settings.target_slack;
                (Some(target), max_length)
            }
        };

        let wobble = Wobble {
            amplitude: settings.wobble_amplitude.sample(rng),
            frequency: settings.wobble_frequency.sample(rng),
            phase: rng.random::<f32>() * std::f32::consts::TAU,
        };

        let style = CrackStyle {
            width: settings.crack_width.sample(rng),
            color: settings.crack_color,
        };

        let speed = settings.speed.sample(rng);
        let fertile = rng.random::<f32>() < settings.fertile_chance;

        let mut crack = Self {
            id,
            path: vec![seed.origin],
            heading: seed.heading,
            target,
            mode,
            generation: seed.generation,
            parent: seed.parent,
            state: CrackState::Growing,
            style,
            speed,
            wobble,
            length: 0.0,
            max_length,
            age: 0,
            fertile,
            last_branch: seed.origin,
        };

        if mode == GrowthMode::TargetSeeking && target == Some(seed.origin) {
            crack.state = CrackState::Degenerate;
        }

        crack
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == CrackState::Growing
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.path[0]
    }

    /// Current tip (last committed point)
    #[inline]
    pub fn tip(&self) -> Vec2 {
        self.path[self.path.len() - 1]
    }

    /// Compute the next candidate point without mutating the crack
    pub fn propose<R: Rng>(&self, settings: &Settings, rng: &mut R) -> Proposal {
        if !self.is_alive() {
            return Proposal::Stop(self.state);
        }
        if settings.max_age.is_some_and(|max_age| self.age >= max_age) {
            return Proposal::Stop(CrackState::Expired);
        }

        let remaining = self.max_length - self.length;
        if remaining <= f32::EPSILON {
            return Proposal::Stop(CrackState::Exhausted);
        }

        match (self.mode, self.target) {
            (GrowthMode::TargetSeeking, Some(target)) => {
                self.propose_toward(target, remaining, settings, rng)
            }
            _ => self.propose_free(remaining, settings, rng),
        }
    }

    /// Jitter accumulates into the heading; wobble only bends this step
    fn propose_free<R: Rng>(
        &self,
        remaining: f32,
        settings: &Settings,
        rng: &mut R,
    ) -> Proposal {
        let heading = self.heading + symmetric(rng, settings.heading_jitter);
        let angle = heading + self.wobble.at(self.age);
        Proposal::Step {
            to: self.tip() + heading_vector(angle) * self.speed.min(remaining),
            heading,
        }
    }

    fn propose_toward<R: Rng>(
        &self,
        target: Vec2,
        remaining: f32,
        settings: &Settings,
        rng: &mut R,
    ) -> Proposal {
        let tip = self.tip();
        // Sitting on the target: keep going the way we came
        let dir = try_normalize(target - tip).unwrap_or_else(|| heading_vector(self.heading));
        let jitter = Vec2::new(
            symmetric(rng, settings.axis_jitter),
            symmetric(rng, settings.axis_jitter),
        );
        let step = dir * self.speed + jitter + dir.perp() * self.wobble.at(self.age);

        let Some(step_dir) = try_normalize(step) else {
            return Proposal::Stop(CrackState::Degenerate);
        };
        Proposal::Step {
            to: tip + step_dir * step.length().min(remaining),
            heading: heading_of(step_dir),
        }
    }

    /// Apply a validated proposal. Returns true when a free step was taken.
    pub fn commit(&mut self, heading: f32, to: Vec2, check: StepCheck) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.age += 1;

        match check {
            StepCheck::Clear => {
                self.push_point(to);
                self.heading = heading;
                true
            }
            StepCheck::OutOfBounds { clip } => {
                if let Some(point) = clip {
                    self.push_point(point);
                }
                self.state = CrackState::OutOfBounds;
                false
            }
            StepCheck::Collision { point, with } => {
                self.push_point(point);
                self.state = CrackState::Collided { with };
                false
            }
        }
    }

    /// Terminate without appending (length/age budget, degenerate direction)
    pub fn stop(&mut self, state: CrackState) {
        if self.is_alive() && state.is_terminal() {
            self.state = state;
        }
    }

    fn push_point(&mut self, point: Vec2) {
        self.length += self.tip().distance(point);
        self.path.push(point);
    }

    /// Heading a branch would take if it forked off with the given offset
    pub fn branch_heading(&self, offset: f32) -> f32 {
        heading_of(rotate(heading_vector(self.heading), offset))
    }
}

/// Base length with ± variation
fn random_length<R: Rng>(settings: &Settings, rng: &mut R) -> f32 {
    let variation = symmetric(rng, settings.length_variation);
    (settings.crack_length * (1.0 + variation)).max(0.0)
}

/// Uniform sample in `[-half_width, half_width]`
#[inline]
pub(crate) fn symmetric<R: Rng>(rng: &mut R, half_width: f32) -> f32 {
    (rng.random::<f32>() * 2.0 - 1.0) * half_width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FloatRange;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn calm_settings(mode: GrowthMode) -> Settings {
        Settings {
            mode,
            heading_jitter: 0.0,
            axis_jitter: 0.0,
            wobble_amplitude: FloatRange::fixed(0.0),
            speed: FloatRange::fixed(2.0),
            ..Settings::default()
        }
    }

    #[test]
    fn test_free_walk_moves_along_heading() {
        let settings = calm_settings(GrowthMode::FreeWalk);
        let mut rng = Pcg32::seed_from_u64(1);
        let crack = Crack::new(0, CrackSeed::root(Vec2::new(10.0, 10.0), 0.0), &settings, &mut rng);

        match crack.propose(&settings, &mut rng) {
            Proposal::Step { to, heading } => {
                assert!(to.distance(Vec2::new(12.0, 10.0)) < 1e-5);
                assert_eq!(heading, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_free_walk_length_budget_randomized() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(9);
        for id in 0..50 {
            let crack = Crack::new(id, CrackSeed::root(Vec2::ZERO, 0.0), &settings, &mut rng);
            let base = settings.crack_length;
            assert!(crack.max_length >= base * (1.0 - settings.length_variation) - 1e-3);
            assert!(crack.max_length <= base * (1.0 + settings.length_variation) + 1e-3);
        }
    }

    #[test]
    fn test_branch_length_scales_with_generation() {
        let settings = Settings {
            length_variation: 0.0,
            ..Settings::default()
        };
        let mut rng = Pcg32::seed_from_u64(2);
        let seed = CrackSeed {
            generation: 2,
            ..CrackSeed::root(Vec2::ZERO, 0.0)
        };
        let crack = Crack::new(0, seed, &settings, &mut rng);
        let expected = settings.crack_length * settings.branch_length_scale.powi(2);
        assert!((crack.max_length - expected).abs() < 1e-3);
    }

    #[test]
    fn test_target_seeking_budget_is_slack_times_distance() {
        let settings = calm_settings(GrowthMode::TargetSeeking);
        let mut rng = Pcg32::seed_from_u64(3);
        let crack = Crack::new(
            0,
            CrackSeed::toward(Vec2::ZERO, Vec2::new(30.0, 40.0)),
            &settings,
            &mut rng,
        );
        assert!((crack.max_length - 75.0).abs() < 1e-4);
        assert!(crack.is_alive());
    }

    #[test]
    fn test_start_equals_target_is_degenerate() {
        let settings = calm_settings(GrowthMode::TargetSeeking);
        let mut rng = Pcg32::seed_from_u64(4);
        let p = Vec2::new(5.0, 5.0);
        let mut crack = Crack::new(0, CrackSeed::toward(p, p), &settings, &mut rng);
        assert_eq!(crack.state, CrackState::Degenerate);
        assert_eq!(crack.propose(&settings, &mut rng), Proposal::Stop(CrackState::Degenerate));
        assert!(!crack.commit(0.0, Vec2::ONE, StepCheck::Clear));
        assert_eq!(crack.path.len(), 1);
    }

    #[test]
    fn test_landing_on_target_keeps_growing() {
        let settings = calm_settings(GrowthMode::TargetSeeking);
        let mut rng = Pcg32::seed_from_u64(10);
        let target = Vec2::new(50.0, 60.0);
        let mut crack = Crack::new(0, CrackSeed::toward(Vec2::new(50.0, 50.0), target), &settings, &mut rng);

        let mut proposals = 0;
        loop {
            match crack.propose(&settings, &mut rng) {
                Proposal::Step { to, heading } => {
                    crack.commit(heading, to, StepCheck::Clear);
                }
                Proposal::Stop(state) => {
                    crack.stop(state);
                    break;
                }
            }
            proposals += 1;
            assert!(proposals < 100);
        }

        assert!(crack.path.contains(&target));
        assert_eq!(crack.state, CrackState::Exhausted);
        assert!((crack.length - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_final_step_clamped_to_budget() {
        let settings = calm_settings(GrowthMode::FreeWalk);
        let mut rng = Pcg32::seed_from_u64(5);
        let seed = CrackSeed {
            max_length: Some(5.0),
            ..CrackSeed::root(Vec2::new(50.0, 50.0), 0.0)
        };
        let mut crack = Crack::new(0, seed, &settings, &mut rng);

        while let Proposal::Step { to, heading } = crack.propose(&settings, &mut rng) {
            crack.commit(heading, to, StepCheck::Clear);
        }
        assert!((crack.length - 5.0).abs() < 1e-4);
        assert_eq!(crack.path.len(), 4);
    }

    #[test]
    fn test_commit_collision_appends_contact_point() {
        let settings = calm_settings(GrowthMode::FreeWalk);
        let mut rng = Pcg32::seed_from_u64(6);
        let mut crack = Crack::new(1, CrackSeed::root(Vec2::new(10.0, 10.0), 0.0), &settings, &mut rng);
        let contact = Vec2::new(11.0, 10.0);
        let stepped = crack.commit(
            0.0,
            Vec2::new(12.0, 10.0),
            StepCheck::Collision {
                point: contact,
                with: 0,
            },
        );
        assert!(!stepped);
        assert_eq!(crack.state, CrackState::Collided { with: 0 });
        assert_eq!(crack.tip(), contact);
        assert!((crack.length - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_commit_out_of_bounds_appends_nothing() {
        let settings = calm_settings(GrowthMode::FreeWalk);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut crack = Crack::new(0, CrackSeed::root(Vec2::new(1.0, 50.0), 0.0), &settings, &mut rng);
        crack.commit(0.0, Vec2::new(-5.0, 50.0), StepCheck::OutOfBounds { clip: None });
        assert_eq!(crack.state, CrackState::OutOfBounds);
        assert_eq!(crack.path.len(), 1);

        // Terminal states are absorbing
        assert!(!crack.commit(0.0, Vec2::new(2.0, 50.0), StepCheck::Clear));
        crack.stop(CrackState::Exhausted);
        assert_eq!(crack.state, CrackState::OutOfBounds);
        assert_eq!(crack.path.len(), 1);
    }

    #[test]
    fn test_age_budget_expires() {
        let settings = Settings {
            max_age: Some(2),
            ..calm_settings(GrowthMode::FreeWalk)
        };
        let mut rng = Pcg32::seed_from_u64(8);
        let mut crack = Crack::new(0, CrackSeed::root(Vec2::new(50.0, 50.0), 0.0), &settings, &mut rng);
        for _ in 0..2 {
            if let Proposal::Step { to, heading } = crack.propose(&settings, &mut rng) {
                crack.commit(heading, to, StepCheck::Clear);
            }
        }
        assert_eq!(crack.propose(&settings, &mut rng), Proposal::Stop(CrackState::Expired));
    }

    #[test]
    fn test_wobble_bounded() {
        let wobble = Wobble {
            amplitude: 0.3,
            frequency: 0.1,
            phase: 1.0,
        };
        for age in 0..200 {
            assert!(wobble.at(age).abs() <= 0.3 + 1e-6);
        }
    }
}
