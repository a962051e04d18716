use crate::types::OptimizationGoal;

/// Selection weight of an already evaluated objective value.
///
/// `f_extreme` is the worst value of the population for `goal` (the minimum
/// when maximizing, the maximum when minimizing) and `d > 0` keeps every
/// weight strictly positive.
pub fn weight_from_value(fx: f64, goal: OptimizationGoal, f_extreme: f64, d: f64) -> f64 {
    match goal {
        OptimizationGoal::Max => fx - f_extreme + d,
        OptimizationGoal::Min => -(fx - f_extreme) + d,
    }
}

/// `G(f, x, goal, fExtreme, d)`: evaluates `f` at `x` and transforms it into a
/// selection weight.
pub fn selection_weight<F>(f: F, x: f64, goal: OptimizationGoal, f_extreme: f64, d: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    weight_from_value(f(x), goal, f_extreme, d)
}

/// Worst value of `values` for `goal`, the reference point of the transform.
pub fn worst_value(values: &[f64], goal: OptimizationGoal) -> Option<f64> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    Some(iter.fold(first, |acc, v| match goal {
        OptimizationGoal::Max => acc.min(v),
        OptimizationGoal::Min => acc.max(v),
    }))
}

/// Selection weights for a whole population of objective values.
pub fn population_weights(values: &[f64], goal: OptimizationGoal, d: f64) -> Vec<f64> {
    match worst_value(values, goal) {
        Some(extreme) => values
            .iter()
            .map(|&fx| weight_from_value(fx, goal, extreme, d))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_goal_weights_are_shifted_by_minimum() {
        let weights = population_weights(&[1.0, 3.0, -2.0], OptimizationGoal::Max, 0.001);
        assert!((weights[0] - 3.001).abs() < 1e-12);
        assert!((weights[1] - 5.001).abs() < 1e-12);
        assert!((weights[2] - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_min_goal_prefers_smaller_values() {
        let weights = population_weights(&[1.0, 3.0, -2.0], OptimizationGoal::Min, 0.5);
        assert!(weights[2] > weights[0]);
        assert!(weights[0] > weights[1]);
        assert!((weights[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_selection_weight_evaluates_function() {
        let w = selection_weight(|x| x * x, 2.0, OptimizationGoal::Max, 1.0, 0.1);
        assert!((w - 3.1).abs() < 1e-12);
    }

    #[test]
    fn test_worst_value_of_empty_slice() {
        assert_eq!(worst_value(&[], OptimizationGoal::Max), None);
    }
}
