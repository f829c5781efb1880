use greywolf::optimizer::{fitness, optimize, RunParameters, UpdatePolicy};
use greywolf::playback::{Playback, Role};
use greywolf::{FastRandSampler, Point};
use proptest::prelude::*;
use std::sync::Arc;

// --- STRATEGIES ---

prop_compose! {
    fn arb_region()(
        min_x in -1000.0..1000.0f32,
        min_y in -1000.0..1000.0f32,
        w in 0.0..500.0f32,
        h in 0.0..500.0f32,
    ) -> (Point, Point) {
        (Point::new(min_x, min_y), Point::new(min_x + w, min_y + h))
    }
}

prop_compose! {
    fn arb_params()(
        (min, max) in arb_region(),
        tx in -1500.0..1500.0f32,
        ty in -1500.0..1500.0f32,
        iters in 0usize..40,
        wolves in 3usize..25,
        followers_only in any::<bool>(),
    ) -> RunParameters {
        let policy = if followers_only { UpdatePolicy::FollowersOnly } else { UpdatePolicy::All };
        RunParameters::new(iters, wolves, Point::new(tx, ty), min, max)
            .expect("generated params are valid")
            .with_policy(policy)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_history_shape_and_ranking(params in arb_params(), seed in any::<u64>()) {
        let result = optimize(&params, &mut FastRandSampler::with_seed(seed)).unwrap();

        prop_assert_eq!(result.solutions().len(), params.num_iterations + 1);
        prop_assert_eq!(result.leader_estimates().len(), params.num_iterations + 1);
        prop_assert_eq!(result.iterations_performed(), params.num_iterations);

        for snap in result.solutions() {
            prop_assert_eq!(snap.len(), params.num_wolves);
            for pair in snap.windows(2) {
                prop_assert!(
                    fitness(pair[0], params.target_point) <= fitness(pair[1], params.target_point)
                );
            }
        }
    }

    #[test]
    fn test_initial_population_inside_region(params in arb_params(), seed in any::<u64>()) {
        let result = optimize(&params, &mut FastRandSampler::with_seed(seed)).unwrap();
        for w in result.snapshot(0) {
            prop_assert!(w.x >= params.min_bound.x && w.x <= params.max_bound.x);
            prop_assert!(w.y >= params.min_bound.y && w.y <= params.max_bound.y);
        }
    }

    #[test]
    fn test_reproducible_for_seed(params in arb_params(), seed in any::<u64>()) {
        let a = optimize(&params, &mut FastRandSampler::with_seed(seed)).unwrap();
        let b = optimize(&params, &mut FastRandSampler::with_seed(seed)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_playback_stays_in_range(
        params in arb_params(),
        seek in 0usize..100,
        moves in proptest::collection::vec(any::<bool>(), 0..50),
    ) {
        let result = Arc::new(optimize(&params, &mut FastRandSampler::with_seed(1)).unwrap());
        let mut pb = Playback::new(result);
        pb.seek(seek);
        for forward in moves {
            let idx = if forward { pb.step_forward() } else { pb.step_backward() };
            prop_assert!(idx <= params.num_iterations);
        }
        let frame = pb.current();
        prop_assert_eq!(frame.markers.len(), params.num_wolves);
        prop_assert_eq!(frame.markers[0].role, Role::Alpha);
        prop_assert_eq!(frame.leaders().count(), 3);
    }
}
