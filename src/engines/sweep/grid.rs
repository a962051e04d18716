use crate::error::{Result, SweepError};
use crate::types::ExperimentParameterSet;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// Value lists for the four swept hyperparameters
///
/// Every dimension is non-empty; deserialization goes through
/// [`ParameterGrid::new`] as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridValues")]
pub struct ParameterGrid {
    population_sizes: Vec<usize>,
    crossover_probabilities: Vec<f64>,
    mutation_probabilities: Vec<f64>,
    generations: Vec<usize>,
}

#[derive(Deserialize)]
struct GridValues {
    population_sizes: Vec<usize>,
    crossover_probabilities: Vec<f64>,
    mutation_probabilities: Vec<f64>,
    generations: Vec<usize>,
}

impl TryFrom<GridValues> for ParameterGrid {
    type Error = SweepError;

    fn try_from(values: GridValues) -> Result<Self> {
        ParameterGrid::new(
            values.population_sizes,
            values.crossover_probabilities,
            values.mutation_probabilities,
            values.generations,
        )
    }
}

impl ParameterGrid {
    pub fn new(
        population_sizes: Vec<usize>,
        crossover_probabilities: Vec<f64>,
        mutation_probabilities: Vec<f64>,
        generations: Vec<usize>,
    ) -> Result<Self> {
        let dims = [
            ("population_sizes", population_sizes.len()),
            ("crossover_probabilities", crossover_probabilities.len()),
            ("mutation_probabilities", mutation_probabilities.len()),
            ("generations", generations.len()),
        ];
        if let Some((name, _)) = dims.iter().find(|(_, len)| *len == 0) {
            return Err(SweepError::Configuration(format!(
                "grid dimension '{}' must not be empty",
                name
            )));
        }
        dims.iter()
            .try_fold(1usize, |acc, (_, len)| acc.checked_mul(*len))
            .ok_or_else(|| {
                SweepError::Configuration("grid has too many combinations".to_string())
            })?;

        Ok(Self {
            population_sizes,
            crossover_probabilities,
            mutation_probabilities,
            generations,
        })
    }

    pub fn total_combinations(&self) -> usize {
        self.population_sizes.len()
            * self.crossover_probabilities.len()
            * self.mutation_probabilities.len()
            * self.generations.len()
    }

    /// Mixed-radix decoding of `combination`; `N` varies fastest, `T` slowest.
    pub fn parameter_set(&self, combination: usize) -> Option<ExperimentParameterSet> {
        if combination >= self.total_combinations() {
            return None;
        }

        let n_len = self.population_sizes.len();
        let pk_len = self.crossover_probabilities.len();
        let pm_len = self.mutation_probabilities.len();

        let n_index = combination % n_len;
        let pk_index = (combination / n_len) % pk_len;
        let pm_index = (combination / (n_len * pk_len)) % pm_len;
        let t_index = (combination / (n_len * pk_len * pm_len)) % self.generations.len();

        Some(ExperimentParameterSet::new(
            self.population_sizes[n_index],
            self.crossover_probabilities[pk_index],
            self.mutation_probabilities[pm_index],
            self.generations[t_index],
        ))
    }

    /// Lazily enumerates combinations `skip..total` in canonical order.
    pub fn parameter_sets(&self, skip: usize) -> ParameterSets<'_> {
        ParameterSets {
            grid: self,
            next: skip.min(self.total_combinations()),
            end: self.total_combinations(),
        }
    }

    /// Combination 0: the first value of every dimension.
    pub fn first(&self) -> ExperimentParameterSet {
        ExperimentParameterSet::new(
            self.population_sizes[0],
            self.crossover_probabilities[0],
            self.mutation_probabilities[0],
            self.generations[0],
        )
    }

    pub fn population_sizes(&self) -> &[usize] {
        &self.population_sizes
    }

    pub fn crossover_probabilities(&self) -> &[f64] {
        &self.crossover_probabilities
    }

    pub fn mutation_probabilities(&self) -> &[f64] {
        &self.mutation_probabilities
    }

    pub fn generations(&self) -> &[usize] {
        &self.generations
    }
}

/// Iterator over a [`ParameterGrid`] starting at some combination index
#[derive(Debug, Clone)]
pub struct ParameterSets<'a> {
    grid: &'a ParameterGrid,
    next: usize,
    end: usize,
}

impl ParameterSets<'_> {
    /// Combination index of the next item.
    pub fn position(&self) -> usize {
        self.next
    }
}

impl Iterator for ParameterSets<'_> {
    type Item = ExperimentParameterSet;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let item = self.grid.parameter_set(self.next);
        self.next += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ParameterSets<'_> {}

impl FusedIterator for ParameterSets<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ParameterGrid {
        ParameterGrid::new(vec![10, 20, 30], vec![0.5, 0.9], vec![0.01], vec![50, 100]).unwrap()
    }

    #[test]
    fn test_population_size_varies_fastest() {
        let sets: Vec<_> = grid().parameter_sets(0).collect();
        assert_eq!(sets.len(), 12);
        assert_eq!(sets[0], ExperimentParameterSet::new(10, 0.5, 0.01, 50));
        assert_eq!(sets[1], ExperimentParameterSet::new(20, 0.5, 0.01, 50));
        assert_eq!(sets[3], ExperimentParameterSet::new(10, 0.9, 0.01, 50));
        assert_eq!(sets[6], ExperimentParameterSet::new(10, 0.5, 0.01, 100));
        assert_eq!(sets[11], ExperimentParameterSet::new(30, 0.9, 0.01, 100));
    }

    #[test]
    fn test_deserialization_checks_dimensions() {
        let grid: ParameterGrid = serde_json::from_str(
            r#"{"population_sizes":[10],"crossover_probabilities":[0.6],"mutation_probabilities":[0.01],"generations":[5]}"#,
        )
        .unwrap();
        assert_eq!(grid.first(), ExperimentParameterSet::new(10, 0.6, 0.01, 5));

        let empty = serde_json::from_str::<ParameterGrid>(
            r#"{"population_sizes":[],"crossover_probabilities":[0.6],"mutation_probabilities":[0.01],"generations":[5]}"#,
        );
        assert!(empty.is_err());
    }

    #[test]
    fn test_skip_past_end_is_empty() {
        let grid = grid();
        assert_eq!(grid.parameter_sets(12).count(), 0);
        assert_eq!(grid.parameter_sets(500).len(), 0);
        assert_eq!(grid.parameter_set(12), None);
    }

    #[test]
    fn test_empty_dimension_is_rejected() {
        let err = ParameterGrid::new(vec![10], vec![], vec![0.1], vec![10]).unwrap_err();
        assert!(matches!(err, SweepError::Configuration(_)));
    }
}
