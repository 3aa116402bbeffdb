//! Property tests for cascade propagation and adaptation invariants.

use infocascade::network::seed_social_network;
use infocascade::cascade::propagate_trace;
use infocascade::{
    propagate, AdaptationConfig, Config, Replicate, SocialNetwork, Topology,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_case(seed: u64, n: usize, k: usize, directed: bool) -> (SocialNetwork, Vec<f64>, Vec<bool>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let network = seed_social_network(n, k, Topology::Random, directed, &mut rng).unwrap();
    let thresholds: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
    let state: Vec<bool> = (0..n).map(|_| rng.gen_bool(0.2)).collect();
    (network, thresholds, state)
}

fn small_config(adaptation: AdaptationConfig, directed: bool, seed: u64) -> Config {
    let mut config = Config::default();
    config.model.n = 20;
    config.model.psi = 0.2;
    config.model.seed = seed;
    config.model.timesteps = 100;
    config.network.k = 4;
    config.network.directed = directed;
    config.adaptation = adaptation;
    config.fitness.trials = 0;
    config
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn property_cascade_never_deactivates(seed in any::<u64>(), directed in any::<bool>()) {
        let (network, thresholds, state) = random_case(seed, 30, 4, directed);
        let (outcome, trace) = propagate_trace(&network, &state, &thresholds, &[]).unwrap();

        prop_assert_eq!(&trace[0], &state);
        for step in trace.windows(2) {
            prop_assert!(step[0].iter().zip(&step[1]).all(|(before, after)| !before || *after));
            prop_assert!(step[0] != step[1]);
        }
        prop_assert_eq!(trace.last(), Some(&outcome.state));
        prop_assert!(outcome.iterations <= network.len() + 1);
    }

    #[test]
    fn property_frozen_trace_is_monotone(seed in any::<u64>(), frozen in 0usize..30) {
        let (network, thresholds, mut state) = random_case(seed, 30, 6, false);
        state[frozen] = false;
        let (outcome, trace) = propagate_trace(&network, &state, &thresholds, &[frozen]).unwrap();

        for step in trace.windows(2) {
            prop_assert!(step[0].iter().zip(&step[1]).all(|(before, after)| !before || *after));
            prop_assert!(!step[1][frozen]);
        }
        prop_assert_eq!(outcome, propagate(&network, &state, &thresholds, &[frozen]).unwrap());
    }

    #[test]
    fn property_cascade_result_is_fixpoint(seed in any::<u64>()) {
        let (network, thresholds, state) = random_case(seed, 30, 6, false);
        let outcome = propagate(&network, &state, &thresholds, &[]).unwrap();
        let again = propagate(&network, &outcome.state, &thresholds, &[]).unwrap();

        prop_assert_eq!(again.state, outcome.state);
        prop_assert_eq!(again.iterations, 1);
    }

    #[test]
    fn property_larger_seed_set_never_shrinks_cascade(seed in any::<u64>(), extra in 0usize..30) {
        let (network, thresholds, state) = random_case(seed, 30, 4, false);
        let mut wider = state.clone();
        wider[extra] = true;

        let base = propagate(&network, &state, &thresholds, &[]).unwrap();
        let grown = propagate(&network, &wider, &thresholds, &[]).unwrap();
        prop_assert!(base.state.iter().zip(&grown.state).all(|(b, g)| !b || *g));
    }

    #[test]
    fn property_frozen_samplers_keep_initial_state(seed in any::<u64>(), frozen in 0usize..30) {
        let (network, mut thresholds, mut state) = random_case(seed, 30, 8, false);
        state[frozen] = false;
        thresholds[frozen] = 0.0;

        let outcome = propagate(&network, &state, &thresholds, &[frozen]).unwrap();
        prop_assert!(!outcome.state[frozen]);
    }

    #[test]
    fn property_paired_rewiring_preserves_structure(seed in any::<u64>(), homophilous in any::<bool>()) {
        let adaptation = if homophilous {
            AdaptationConfig::Homophilous
        } else {
            AdaptationConfig::Paired
        };
        let mut replicate = Replicate::new(&small_config(adaptation, false, seed), 0).unwrap();
        let ties = replicate.network().tie_count();

        for _ in 0..100 {
            replicate.step().unwrap();
            let network = replicate.network();
            prop_assert_eq!(network.tie_count(), ties);
            prop_assert!(!network.has_self_loops());
            prop_assert!(network.is_symmetric());
        }
    }

    #[test]
    fn property_directed_rewiring_keeps_diagonal_empty(seed in any::<u64>()) {
        let config = small_config(AdaptationConfig::Probabilistic { p: 0.5 }, true, seed);
        let mut replicate = Replicate::new(&config, 0).unwrap();
        let mut ties = replicate.network().tie_count();

        for _ in 0..100 {
            let report = replicate.step().unwrap();
            let now = replicate.network().tie_count();
            prop_assert_eq!(
                now + report.outcome.ties_broken(),
                ties + report.outcome.ties_formed()
            );
            prop_assert!(!replicate.network().has_self_loops());
            ties = now;
        }
    }

    #[test]
    fn property_threshold_adjustment_stays_in_bounds(seed in any::<u64>()) {
        let config = small_config(AdaptationConfig::Threshold { phi: 0.05, omega: 0.05 }, false, seed);
        let mut replicate = Replicate::new(&config, 0).unwrap();
        let initial = replicate.network().clone();

        for _ in 0..100 {
            replicate.step().unwrap();
        }
        prop_assert_eq!(replicate.network(), &initial);
        prop_assert!(replicate
            .population()
            .thresholds
            .iter()
            .all(|t| (0.0..=1.0).contains(t)));
    }
}
