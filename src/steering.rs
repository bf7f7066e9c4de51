//! Steering force computation.
//!
//! Pure functions over plain kinematic data. Systems copy agent state into a
//! slice of [`NeighborState`] and call these, so the math can be tested and
//! benchmarked without an ECS world.

use crate::components::{Agent, Containment, SteeringParams};
use glam::Vec3;

/// Read-only view of one group member used for neighbor scans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborState {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl From<&Agent> for NeighborState {
    fn from(agent: &Agent) -> Self {
        Self {
            position: agent.position,
            velocity: agent.velocity,
        }
    }
}

/// The three flocking contributions for one agent in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringForces {
    pub separation: Vec3,
    pub alignment: Vec3,
    pub cohesion: Vec3,
    /// Members found inside the perception radius.
    pub neighbors: usize,
}

impl SteeringForces {
    pub fn combined(&self) -> Vec3 {
        self.separation + self.alignment + self.cohesion
    }
}

/// Separation, alignment and cohesion for `flock[index]` against every other
/// member of `flock`.
///
/// A member counts as a neighbor when `0 < distance < perception_radius`.
/// With no neighbors all three forces are zero.
///
/// # Panics
///
/// Panics if `index` is out of bounds for `flock`.
pub fn flocking_forces(
    index: usize,
    flock: &[NeighborState],
    params: &SteeringParams,
) -> SteeringForces {
    let me = flock[index];
    let mut separation = Vec3::ZERO;
    let mut alignment = Vec3::ZERO;
    let mut cohesion = Vec3::ZERO;
    let mut count = 0usize;

    for (i, other) in flock.iter().enumerate() {
        if i == index {
            continue;
        }

        let offset = me.position - other.position;
        let distance = offset.length();

        if distance > 0.0 && distance < params.perception_radius {
            separation += offset / distance;
            alignment += other.velocity;
            cohesion += other.position;
            count += 1;
        }
    }

    if count == 0 {
        return SteeringForces::default();
    }

    let n = count as f32;
    SteeringForces {
        separation: (separation / n).normalize_or_zero() * params.separation_weight,
        alignment: (alignment / n).normalize_or_zero() * params.alignment_weight,
        cohesion: (cohesion / n - me.position).normalize_or_zero() * params.cohesion_weight,
        neighbors: count,
    }
}

/// Scale `force` down to at most `max` magnitude.
pub fn limit(force: Vec3, max: f32) -> Vec3 {
    if force.length() > max {
        force.normalize_or_zero() * max
    } else {
        force
    }
}

/// Constant push back toward the interior for each axis that is out of bounds.
///
/// Only `Containment::Soft` pushes; reflecting bounds act on wander heading
/// instead and yield zero here.
pub fn containment_force(position: Vec3, containment: &Containment) -> Vec3 {
    let Containment::Soft {
        horizontal,
        band,
        turn_factor,
    } = *containment
    else {
        return Vec3::ZERO;
    };

    let mut push = Vec3::ZERO;

    if position.x > horizontal {
        push.x -= turn_factor;
    }
    if position.x < -horizontal {
        push.x += turn_factor;
    }
    if position.z > horizontal {
        push.z -= turn_factor;
    }
    if position.z < -horizontal {
        push.z += turn_factor;
    }
    if !band.contains(position.y) {
        push.y = if position.y > band.max {
            -turn_factor
        } else {
            turn_factor
        };
    }

    push
}

/// Mean of `positions`, or `None` when empty.
pub fn centroid(positions: impl IntoIterator<Item = Vec3>) -> Option<Vec3> {
    let (sum, count) = positions
        .into_iter()
        .fold((Vec3::ZERO, 0usize), |(sum, count), p| (sum + p, count + 1));
    (count > 0).then(|| sum / count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::AltitudeBand;
    use proptest::prelude::*;

    fn bird_params() -> SteeringParams {
        SteeringParams {
            separation_weight: 0.3,
            alignment_weight: 0.2,
            cohesion_weight: 0.1,
            perception_radius: 15.0,
        }
    }

    fn at(x: f32, y: f32, z: f32) -> NeighborState {
        NeighborState {
            position: Vec3::new(x, y, z),
            velocity: Vec3::ZERO,
        }
    }

    fn soft_bounds() -> Containment {
        Containment::Soft {
            horizontal: 400.0,
            band: AltitudeBand::new(20.0, 100.0),
            turn_factor: 0.5,
        }
    }

    #[test]
    fn test_isolated_agent_gets_no_force() {
        let flock = [at(0.0, 50.0, 0.0), at(100.0, 50.0, 0.0)];
        let forces = flocking_forces(0, &flock, &bird_params());
        assert_eq!(forces, SteeringForces::default());
        assert_eq!(forces.combined(), Vec3::ZERO);
    }

    #[test]
    fn test_single_agent_flock() {
        let flock = [at(0.0, 50.0, 0.0)];
        assert_eq!(flocking_forces(0, &flock, &bird_params()).neighbors, 0);
    }

    #[test]
    fn test_separation_points_away_from_neighbor() {
        let flock = [at(0.0, 50.0, 0.0), at(1.0, 50.0, 0.0)];
        let a = flocking_forces(0, &flock, &bird_params());
        let b = flocking_forces(1, &flock, &bird_params());

        assert!((a.separation - Vec3::new(-0.3, 0.0, 0.0)).length() < 1e-6);
        assert!((b.separation - Vec3::new(0.3, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(a.neighbors, 1);
    }

    #[test]
    fn test_cohesion_points_toward_neighbor_center() {
        let flock = [at(0.0, 50.0, 0.0), at(4.0, 50.0, 0.0), at(0.0, 50.0, 4.0)];
        let forces = flocking_forces(0, &flock, &bird_params());
        let expected = Vec3::new(1.0, 0.0, 1.0).normalize() * 0.1;
        assert!((forces.cohesion - expected).length() < 1e-6);
    }

    #[test]
    fn test_alignment_follows_neighbor_heading() {
        let mut flock = [at(0.0, 50.0, 0.0), at(2.0, 50.0, 0.0)];
        flock[1].velocity = Vec3::new(0.0, 0.0, 7.0);
        let forces = flocking_forces(0, &flock, &bird_params());
        assert!((forces.alignment - Vec3::new(0.0, 0.0, 0.2)).length() < 1e-6);
    }

    #[test]
    fn test_stationary_neighbors_give_zero_alignment() {
        let flock = [at(0.0, 50.0, 0.0), at(2.0, 50.0, 0.0)];
        let forces = flocking_forces(0, &flock, &bird_params());
        assert_eq!(forces.alignment, Vec3::ZERO);
        assert!(forces.combined().is_finite());
    }

    #[test]
    fn test_coincident_agents_are_not_neighbors() {
        let flock = [at(5.0, 50.0, 5.0), at(5.0, 50.0, 5.0)];
        let forces = flocking_forces(0, &flock, &bird_params());
        assert_eq!(forces.neighbors, 0);
        assert!(forces.combined().is_finite());
    }

    #[test]
    fn test_perception_radius_is_exclusive() {
        let flock = [at(0.0, 50.0, 0.0), at(15.0, 50.0, 0.0)];
        assert_eq!(flocking_forces(0, &flock, &bird_params()).neighbors, 0);
    }

    #[test]
    fn test_limit_caps_magnitude() {
        let capped = limit(Vec3::new(0.6, 0.0, 0.8), 0.5);
        assert!((capped.length() - 0.5).abs() < 1e-6);
        assert_eq!(limit(Vec3::new(0.1, 0.0, 0.0), 0.5), Vec3::new(0.1, 0.0, 0.0));
    }

    #[test]
    fn test_containment_inside_is_zero() {
        assert_eq!(containment_force(Vec3::new(0.0, 50.0, 0.0), &soft_bounds()), Vec3::ZERO);
    }

    #[test]
    fn test_containment_altitude_band() {
        let above = containment_force(Vec3::new(0.0, 120.0, 0.0), &soft_bounds());
        let below = containment_force(Vec3::new(0.0, 5.0, 0.0), &soft_bounds());
        assert_eq!(above, Vec3::new(0.0, -0.5, 0.0));
        assert_eq!(below, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_containment_depth_band() {
        let bounds = Containment::Soft {
            horizontal: 400.0,
            band: AltitudeBand::new(-20.0, -2.0),
            turn_factor: 0.3,
        };
        assert_eq!(containment_force(Vec3::new(0.0, 0.0, 0.0), &bounds).y, -0.3);
        assert_eq!(containment_force(Vec3::new(0.0, -25.0, 0.0), &bounds).y, 0.3);
    }

    #[test]
    fn test_reflect_bounds_never_push() {
        let bounds = Containment::Reflect { horizontal: 10.0 };
        assert_eq!(containment_force(Vec3::new(50.0, 0.0, 50.0), &bounds), Vec3::ZERO);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_index_panics() {
        let flock = [at(0.0, 50.0, 0.0)];
        flocking_forces(1, &flock, &bird_params());
    }

    #[test]
    fn test_containment_band_edges_do_not_push() {
        assert_eq!(containment_force(Vec3::new(0.0, 20.0, 0.0), &soft_bounds()).y, 0.0);
        assert_eq!(containment_force(Vec3::new(0.0, 100.0, 0.0), &soft_bounds()).y, 0.0);
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(Vec::<Vec3>::new()), None);
        let c = centroid([Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0)]).unwrap();
        assert_eq!(c, Vec3::new(1.0, 2.0, 3.0));
    }

    proptest! {
        #[test]
        fn prop_containment_opposes_excursion(
            x in -1000.0f32..1000.0,
            y in -200.0f32..200.0,
            z in -1000.0f32..1000.0,
        ) {
            let push = containment_force(Vec3::new(x, y, z), &soft_bounds());
            if x > 400.0 { prop_assert!(push.x < 0.0); }
            if x < -400.0 { prop_assert!(push.x > 0.0); }
            if z > 400.0 { prop_assert!(push.z < 0.0); }
            if z < -400.0 { prop_assert!(push.z > 0.0); }
            if y > 100.0 { prop_assert!(push.y < 0.0); }
            if y < 20.0 { prop_assert!(push.y > 0.0); }
            if (-400.0..=400.0).contains(&x) { prop_assert_eq!(push.x, 0.0); }
        }

        #[test]
        fn prop_forces_are_finite_and_bounded(
            coords in proptest::collection::vec(
                (-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0),
                1..12,
            ),
        ) {
            let flock: Vec<NeighborState> = coords
                .iter()
                .map(|&(x, y, z)| NeighborState {
                    position: Vec3::new(x, y, z),
                    velocity: Vec3::new(z, x, y),
                })
                .collect();
            let params = bird_params();
            for i in 0..flock.len() {
                let f = flocking_forces(i, &flock, &params);
                prop_assert!(f.combined().is_finite());
                prop_assert!(f.separation.length() <= params.separation_weight + 1e-5);
                prop_assert!(f.alignment.length() <= params.alignment_weight + 1e-5);
                prop_assert!(f.cohesion.length() <= params.cohesion_weight + 1e-5);
            }
        }
    }
}
