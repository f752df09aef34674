//! Boundary and collision policy for growth steps
//!
//! A candidate point is rejected when it leaves the surface or comes within
//! the collision threshold of an eligible crack segment. Eligibility:
//! - a crack never blocks itself
//! - a branch ignores the part of its parent around its own origin
//! - under `OlderBlocksYounger` only cracks created earlier can block

use glam::Vec2;

use super::crack::{Crack, CrackId};
use super::segment::{clip_to_bounds, closest_point_on_segment, in_bounds, segment_intersection};
use crate::settings::{BoundaryPolicy, CollisionRule, Settings};

/// Verdict on a single extension step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepCheck {
    /// Commit the candidate as-is
    Clear,
    /// Candidate left the surface; `clip` is the edge point to keep, if any
    OutOfBounds { clip: Option<Vec2> },
    /// Candidate hit another path; `point` lies on the obstacle
    Collision { point: Vec2, with: CrackId },
}

/// Closest obstacle found so far
#[derive(Debug, Clone, Copy)]
struct Hit {
    distance: f32,
    closest: Vec2,
    a: Vec2,
    b: Vec2,
    with: CrackId,
}

/// Validate the step `from -> to` of crack `mover` against the surface and every other crack
///
/// `cracks` is the arena in creation order; `cracks[mover]` is the crack being grown.
pub fn check_step(
    cracks: &[Crack],
    mover: CrackId,
    from: Vec2,
    to: Vec2,
    bounds: Vec2,
    settings: &Settings,
) -> StepCheck {
    if !in_bounds(to, bounds) {
        let clip = match settings.boundary_policy {
            BoundaryPolicy::Discard => None,
            BoundaryPolicy::Clip => Some(clip_to_bounds(from, to, bounds)).filter(|p| *p != from),
        };
        return StepCheck::OutOfBounds { clip };
    }

    let Some(crack) = cracks.get(mover) else {
        return StepCheck::Clear;
    };

    let mut best: Option<Hit> = None;
    for other in cracks {
        if !may_block(crack, other, settings.collision_rule) {
            continue;
        }

        for (segment, w) in other.path.windows(2).enumerate() {
            let (a, b) = (w[0], w[1]);
            let closest = closest_point_on_segment(to, a, b);
            let distance = to.distance(closest);
            // Long steps can jump a segment without ever getting close to it
            let touches = distance < settings.collision_threshold
                || segment_intersection(from, to, a, b).is_some();
            if !touches {
                continue;
            }
            if birth_exempt(crack, other, segment, closest, settings.birth_radius) {
                continue;
            }
            if best.is_none_or(|h| distance < h.distance) {
                best = Some(Hit {
                    distance,
                    closest,
                    a,
                    b,
                    with: other.id,
                });
            }
        }
    }

    match best {
        Some(hit) => StepCheck::Collision {
            point: segment_intersection(from, to, hit.a, hit.b).unwrap_or(hit.closest),
            with: hit.with,
        },
        None => StepCheck::Clear,
    }
}

/// Whether `other` is allowed to stop `mover` at all
pub fn may_block(mover: &Crack, other: &Crack, rule: CollisionRule) -> bool {
    if other.id == mover.id {
        return false;
    }
    match rule {
        CollisionRule::OlderBlocksYounger => other.id < mover.id,
        CollisionRule::Mutual => true,
    }
}

/// Whether segment `segment` of `other` is invisible to `mover` because of a parent link
///
/// A branch ignores its parent's path up to the branch point, plus whatever
/// the parent grows later within `birth_radius` of the branch origin. A parent
/// ignores its branch near that origin.
fn birth_exempt(
    mover: &Crack,
    other: &Crack,
    segment: usize,
    closest: Vec2,
    birth_radius: f32,
) -> bool {
    let near = |origin: Vec2| closest.distance(origin) < birth_radius;

    if let Some(parent) = mover.parent.filter(|p| p.id == other.id) {
        // Segment `i` ends at point `i + 1`
        return segment < parent.index || near(mover.origin());
    }
    other.parent.is_some_and(|p| p.id == mover.id) && near(other.origin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::crack::{CrackSeed, ParentRef};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn crack_with_path(id: CrackId, points: &[Vec2]) -> Crack {
        let mut rng = Pcg32::seed_from_u64(id as u64);
        let mut crack = Crack::new(id, CrackSeed::root(points[0], 0.0), &Settings::default(), &mut rng);
        crack.path = points.to_vec();
        crack
    }

    fn horizontal(id: CrackId, y: f32, x0: f32, x1: f32) -> Crack {
        let points: Vec<Vec2> = (0..=((x1 - x0) as usize / 2))
            .map(|i| Vec2::new(x0 + i as f32 * 2.0, y))
            .collect();
        crack_with_path(id, &points)
    }

    #[test]
    fn test_step_off_surface_is_rejected() {
        let settings = Settings::default();
        let cracks = vec![crack_with_path(0, &[Vec2::new(1.0, 50.0)])];
        let check = check_step(
            &cracks,
            0,
            Vec2::new(1.0, 50.0),
            Vec2::new(-5.0, 50.0),
            Vec2::new(100.0, 100.0),
            &settings,
        );
        assert_eq!(check, StepCheck::OutOfBounds { clip: None });
    }

    #[test]
    fn test_clip_policy_keeps_edge_point() {
        let settings = Settings {
            boundary_policy: BoundaryPolicy::Clip,
            ..Settings::default()
        };
        let cracks = vec![crack_with_path(0, &[Vec2::new(1.0, 50.0)])];
        let check = check_step(
            &cracks,
            0,
            Vec2::new(1.0, 50.0),
            Vec2::new(-5.0, 50.0),
            Vec2::new(100.0, 100.0),
            &settings,
        );
        match check {
            StepCheck::OutOfBounds { clip: Some(p) } => {
                assert!(p.distance(Vec2::new(0.0, 50.0)) < 1e-5)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_surface_edge_is_inside() {
        let settings = Settings::default();
        let cracks = vec![crack_with_path(0, &[Vec2::new(99.0, 50.0)])];
        let check = check_step(
            &cracks,
            0,
            Vec2::new(99.0, 50.0),
            Vec2::new(100.0, 50.0),
            Vec2::new(100.0, 100.0),
            &settings,
        );
        assert_eq!(check, StepCheck::Clear);
    }

    #[test]
    fn test_older_blocks_younger() {
        let settings = Settings::default();
        let bounds = Vec2::new(200.0, 200.0);
        let a = horizontal(0, 100.0, 20.0, 180.0);
        let b = crack_with_path(1, &[Vec2::new(100.0, 120.0), Vec2::new(100.0, 106.0)]);
        let cracks = vec![a, b];

        // B's tip steps within the threshold of A
        let check = check_step(&cracks, 1, Vec2::new(100.0, 106.0), Vec2::new(100.0, 103.0), bounds, &settings);
        match check {
            StepCheck::Collision { point, with } => {
                assert_eq!(with, 0);
                assert!((point.y - 100.0).abs() < 1e-5);
            }
            other => panic!("unexpected {other:?}"),
        }

        // A stepping near B is unaffected
        let a_tip = cracks[0].path[cracks[0].path.len() - 1];
        let check = check_step(&cracks, 0, a_tip, a_tip + Vec2::new(2.0, 0.0), bounds, &settings);
        assert_eq!(check, StepCheck::Clear);
    }

    #[test]
    fn test_mutual_rule_blocks_both_ways() {
        let settings = Settings {
            collision_rule: CollisionRule::Mutual,
            ..Settings::default()
        };
        let bounds = Vec2::new(200.0, 200.0);
        let a = crack_with_path(0, &[Vec2::new(90.0, 150.0), Vec2::new(98.0, 103.0)]);
        let b = horizontal(1, 100.0, 110.0, 180.0);
        let cracks = vec![a, b];
        let check = check_step(
            &cracks,
            0,
            Vec2::new(98.0, 103.0),
            Vec2::new(108.0, 101.0),
            bounds,
            &settings,
        );
        assert!(matches!(check, StepCheck::Collision { with: 1, .. }));
    }

    #[test]
    fn test_crossing_step_is_caught() {
        let settings = Settings {
            collision_threshold: 1.0,
            ..Settings::default()
        };
        let bounds = Vec2::new(200.0, 200.0);
        let a = horizontal(0, 100.0, 20.0, 180.0);
        let b = crack_with_path(1, &[Vec2::new(50.0, 110.0), Vec2::new(50.0, 105.0)]);
        let cracks = vec![a, b];
        let check = check_step(&cracks, 1, Vec2::new(50.0, 105.0), Vec2::new(50.0, 90.0), bounds, &settings);
        match check {
            StepCheck::Collision { point, with: 0 } => {
                assert!(point.distance(Vec2::new(50.0, 100.0)) < 1e-4)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_own_path_never_blocks() {
        let settings = Settings::default();
        let bounds = Vec2::new(200.0, 200.0);
        let mut points: Vec<Vec2> = (0..=30).map(|i| Vec2::new(20.0 + i as f32 * 2.0, 100.0)).collect();
        points.extend((1..=10).map(|i| Vec2::new(80.0, 100.0 + i as f32 * 2.0)));
        points.extend((1..=20).map(|i| Vec2::new(80.0 - i as f32 * 2.0, 120.0)));
        points.extend((1..=8).map(|i| Vec2::new(40.0, 120.0 - i as f32 * 2.0)));
        let tip = points[points.len() - 1];
        let cracks = vec![crack_with_path(0, &points)];

        // Curling back over itself is allowed
        let check = check_step(&cracks, 0, tip, tip - Vec2::new(0.0, 2.0), bounds, &settings);
        assert_eq!(check, StepCheck::Clear);
    }

    #[test]
    fn test_branch_ignores_parent_near_origin() {
        let settings = Settings::default();
        let bounds = Vec2::new(200.0, 200.0);
        let parent = horizontal(0, 100.0, 20.0, 180.0);
        let origin = Vec2::new(100.0, 100.0);
        let mut child = crack_with_path(1, &[origin, origin + Vec2::new(1.4, 1.4)]);
        child.parent = Some(ParentRef { id: 0, index: 40 });
        child.generation = 1;
        let cracks = vec![parent, child];

        let from = origin + Vec2::new(1.4, 1.4);
        let check = check_step(&cracks, 1, from, from + Vec2::new(1.4, 1.4), bounds, &settings);
        assert_eq!(check, StepCheck::Clear);
    }

    #[test]
    fn test_branch_ignores_parent_path_before_branch_point() {
        let settings = Settings::default();
        let bounds = Vec2::new(200.0, 200.0);
        let parent = horizontal(0, 100.0, 20.0, 100.0);
        let origin = Vec2::new(100.0, 100.0);
        let mut child = crack_with_path(
            1,
            &[origin, Vec2::new(80.0, 115.0), Vec2::new(60.0, 106.0)],
        );
        child.parent = Some(ParentRef { id: 0, index: 40 });
        let cracks = vec![parent, child];

        // Curling back over the parent's older path is allowed
        let check = check_step(
            &cracks,
            1,
            Vec2::new(60.0, 106.0),
            Vec2::new(58.0, 103.0),
            bounds,
            &settings,
        );
        assert_eq!(check, StepCheck::Clear);

        // An unrelated crack in the same spot is still blocked
        let mut stranger = cracks[1].clone();
        stranger.parent = None;
        let cracks = vec![cracks[0].clone(), stranger];
        let check = check_step(
            &cracks,
            1,
            Vec2::new(60.0, 106.0),
            Vec2::new(58.0, 103.0),
            bounds,
            &settings,
        );
        assert!(matches!(check, StepCheck::Collision { with: 0, .. }));
    }

    #[test]
    fn test_parent_ignores_branch_near_origin() {
        let settings = Settings {
            collision_rule: CollisionRule::Mutual,
            ..Settings::default()
        };
        let bounds = Vec2::new(200.0, 200.0);
        let parent = horizontal(0, 100.0, 20.0, 100.0);
        let origin = Vec2::new(100.0, 100.0);
        let mut child = crack_with_path(1, &[origin, Vec2::new(110.0, 110.0)]);
        child.parent = Some(ParentRef { id: 0, index: 40 });
        let cracks = vec![parent, child];

        let check = check_step(&cracks, 0, origin, Vec2::new(102.0, 100.0), bounds, &settings);
        assert_eq!(check, StepCheck::Clear);

        let mut stranger = cracks[1].clone();
        stranger.parent = None;
        let cracks = vec![cracks[0].clone(), stranger];
        let check = check_step(&cracks, 0, origin, Vec2::new(102.0, 100.0), bounds, &settings);
        assert!(matches!(check, StepCheck::Collision { with: 1, .. }));
    }

    #[test]
    fn test_branch_still_hits_parent_far_away() {
        let settings = Settings::default();
        let bounds = Vec2::new(200.0, 200.0);
        let parent = horizontal(0, 100.0, 20.0, 180.0);
        let origin = Vec2::new(100.0, 100.0);
        let mut child = crack_with_path(
            1,
            &[origin, Vec2::new(120.0, 130.0), Vec2::new(150.0, 106.0)],
        );
        child.parent = Some(ParentRef { id: 0, index: 40 });
        let cracks = vec![parent, child];

        let check = check_step(
            &cracks,
            1,
            Vec2::new(150.0, 106.0),
            Vec2::new(151.0, 103.0),
            bounds,
            &settings,
        );
        assert!(matches!(check, StepCheck::Collision { with: 0, .. }));
    }
}
