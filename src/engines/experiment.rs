use crate::engines::generation::Optimizer;
use crate::error::{Result, SweepError};
use crate::types::UserInputs;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Number of optimizer runs averaged per configuration
pub const DEFAULT_REPETITIONS: usize = 100;

/// Repeats an optimizer run and reduces the results to one number: the mean
/// of each run's best objective value.
#[derive(Clone)]
pub struct ExperimentRunner {
    optimizer: Arc<dyn Optimizer>,
    repetitions: usize,
    seed: Option<u64>,
}

impl ExperimentRunner {
    pub fn new(optimizer: Arc<dyn Optimizer>) -> Self {
        Self {
            optimizer,
            repetitions: DEFAULT_REPETITIONS,
            seed: None,
        }
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Makes every repetition reproducible. Repetition `r` always receives the
    /// same stream, whatever configuration it runs.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    /// Average of the best objective value over all repetitions, rounded to
    /// the space's declared precision.
    pub fn run(&self, inputs: &UserInputs) -> Result<f64> {
        if self.repetitions == 0 {
            return Err(SweepError::Configuration(
                "experiment needs at least one repetition".to_string(),
            ));
        }

        let mut best_results = Vec::with_capacity(self.repetitions);
        for repetition in 0..self.repetitions {
            let mut rng = self.rng_for(repetition);
            let outcome = self.optimizer.run(inputs, &mut rng)?;
            let best = outcome.population.max_value().ok_or_else(|| {
                SweepError::Optimizer("optimizer returned an empty population".to_string())
            })?;
            best_results.push(best);
        }

        let average = best_results.iter().sum::<f64>() / best_results.len() as f64;
        debug!(
            "{} repetitions of {} -> mean best {}",
            self.repetitions,
            inputs.parameter_set(),
            average
        );

        Ok(inputs.space.precision.round(average))
    }

    fn rng_for(&self, repetition: usize) -> StdRng {
        match self.seed {
            Some(seed) => {
                StdRng::seed_from_u64(seed ^ (repetition as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
            }
            None => StdRng::from_entropy(),
        }
    }
}
