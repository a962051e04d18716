use super::manager::AppConfig;
use crate::engines::evaluation::Objective;
use crate::engines::experiment::ExperimentRunner;
use crate::engines::generation::Optimizer;
use crate::engines::sweep::SweepDriver;
use crate::error::Result;
use crate::types::UserInputs;
use std::sync::Arc;

/// Turns a validated [`AppConfig`] into the engine objects it describes
pub struct ConfigBridge;

impl ConfigBridge {
    /// Default inputs: the configured space, objective and goal with the first
    /// value of every grid dimension. Fails fast on an unparsable objective.
    pub fn to_default_inputs(config: &AppConfig) -> Result<UserInputs> {
        let space = config.genotype.space()?;
        let objective = Objective::parse(&config.objective.expression)?;
        let first = config.sweep.grid()?.first();

        Ok(UserInputs {
            space,
            population_size: first.population_size,
            generations: first.generations,
            crossover_probability: first.crossover_probability,
            mutation_probability: first.mutation_probability,
            elitism: config.objective.elitism,
            objective,
            goal: config.objective.goal,
        })
    }

    pub fn to_experiment_runner(config: &AppConfig, optimizer: Arc<dyn Optimizer>) -> ExperimentRunner {
        ExperimentRunner::new(optimizer)
            .with_repetitions(config.sweep.repetitions)
            .with_seed(config.sweep.seed)
    }

    pub fn to_sweep_driver(config: &AppConfig, optimizer: Arc<dyn Optimizer>) -> Result<SweepDriver> {
        config.validate()?;
        let defaults = Self::to_default_inputs(config)?;
        let grid = config.sweep.grid()?;
        let runner = Self::to_experiment_runner(config, optimizer);

        Ok(SweepDriver::new(grid, defaults, runner).with_parallelism(config.sweep.parallelism))
    }
}
