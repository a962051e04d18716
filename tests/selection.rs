use gasweep::error::SweepError;
use gasweep::functions::cdf::{get_cdf_index, CumulativeDistribution};
use gasweep::functions::fitness::{population_weights, selection_weight, worst_value};
use gasweep::types::OptimizationGoal;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_cdf_search_examples() {
    let qs = [0.2, 0.5, 0.5, 1.0];
    assert_eq!(get_cdf_index(0.3, &qs).unwrap(), 1);
    assert_eq!(get_cdf_index(0.5, &qs).unwrap(), 1);
    assert_eq!(get_cdf_index(0.9, &qs).unwrap(), 3);
    assert_eq!(get_cdf_index(0.0, &qs).unwrap(), 0);
}

#[test]
fn test_cdf_search_rejects_bad_distributions() {
    assert!(matches!(get_cdf_index(0.5, &[]), Err(SweepError::Precondition(_))));
    assert!(matches!(
        get_cdf_index(0.5, &[0.6, 0.4, 1.0]),
        Err(SweepError::Precondition(_))
    ));
    assert!(matches!(
        get_cdf_index(0.5, &[0.2, 0.7]),
        Err(SweepError::Precondition(_))
    ));
}

#[test]
fn test_cdf_search_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(17);
    let weights: Vec<f64> = (0..64).map(|_| rng.gen_range(0.0..5.0)).collect();
    let cdf = CumulativeDistribution::from_weights(&weights).unwrap();

    for _ in 0..1000 {
        let r: f64 = rng.gen();
        let expected = cdf
            .as_slice()
            .iter()
            .position(|&q| q >= r)
            .unwrap_or(cdf.len() - 1);
        assert_eq!(cdf.index_of(r), expected);
    }
}

#[test]
fn test_weights_stay_at_least_d_for_both_goals() {
    let mut rng = StdRng::seed_from_u64(23);
    for goal in [OptimizationGoal::Max, OptimizationGoal::Min] {
        for _ in 0..50 {
            let values: Vec<f64> = (0..20).map(|_| rng.gen_range(-1000.0..1000.0)).collect();
            let d = rng.gen_range(1e-6..1.0);
            let weights = population_weights(&values, goal, d);
            assert!(weights.iter().all(|&w| w >= d - 1e-9), "goal {:?}", goal);
        }
    }
}

#[test]
fn test_selection_weight_matches_transform() {
    let f = |x: f64| x.sin();
    let values: Vec<f64> = [0.1, 1.2, 2.5].iter().map(|&x| f(x)).collect();
    let extreme = worst_value(&values, OptimizationGoal::Min).unwrap();

    let w = selection_weight(f, 0.1, OptimizationGoal::Min, extreme, 0.01);
    assert!((w - (-(f(0.1) - extreme) + 0.01)).abs() < 1e-12);
}

#[test]
fn test_weighted_selection_frequencies() {
    let mut rng = StdRng::seed_from_u64(99);
    let cdf = CumulativeDistribution::from_weights(&[1.0, 3.0]).unwrap();
    let draws = 20_000;
    let second = (0..draws)
        .filter(|_| cdf.index_of(rng.gen::<f64>()) == 1)
        .count();
    let share = second as f64 / draws as f64;
    assert!((share - 0.75).abs() < 0.02, "share = {}", share);
}
