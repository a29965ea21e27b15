use handweave_choreography::formation::scatter_positions;
use handweave_choreography::{FormationState, MotionIntegrator, TargetSet};
use handweave_common::config::{FormationSettings, MotionSettings};
use handweave_model::spatial::{Euler, Vec3};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn vec3() -> impl Strategy<Value = Vec3> {
    (-5000.0f64..5000.0, -5000.0f64..5000.0, -5000.0f64..5000.0)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn euler() -> impl Strategy<Value = Euler> {
    (-7.0f64..7.0, -7.0f64..7.0, -7.0f64..7.0).prop_map(|(x, y, z)| Euler::new(x, y, z))
}

fn single(position: Vec3, rotation: Euler) -> TargetSet {
    TargetSet {
        positions: vec![position],
        rotations: vec![rotation],
        generation: 0,
        state: FormationState::Idle,
    }
}

proptest! {
    #[test]
    fn distance_decays_geometrically(
        start in vec3(),
        goal in vec3(),
        start_rot in euler(),
        goal_rot in euler(),
        k in 1usize..200,
    ) {
        let settings = MotionSettings::default();
        let alpha = settings.object_smoothing;
        let mut motion = MotionIntegrator::new(&single(start, start_rot), &settings);
        let target = single(goal, goal_rot);

        let initial = start.distance_to(&goal);
        let initial_rot = start_rot.max_axis_delta(&goal_rot);
        let mut previous = initial;
        for step in 1..=k {
            motion.tick(&target, step as f64);
            let d = motion.max_distance_to(&target);
            prop_assert!(d <= previous + 1e-9);
            previous = d;
        }

        let bound = (1.0 - alpha).powi(k as i32);
        prop_assert!(previous <= initial * bound + 1e-6);
        prop_assert!(motion.max_rotation_delta_to(&target) <= initial_rot * bound + 1e-9);
    }

    #[test]
    fn scatter_stays_in_volume(n in 0usize..300, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let positions = scatter_positions(n, &FormationSettings::default(), &mut rng);
        prop_assert_eq!(positions.len(), n);
        for p in positions {
            for c in [p.x, p.y, p.z] {
                prop_assert!((-2000.0..=2000.0).contains(&c));
            }
        }
    }
}
