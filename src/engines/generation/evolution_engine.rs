use crate::engines::generation::{
    genome::Genome,
    operators::{crossover, mutate, random_genome, roulette_selection},
};
use crate::error::{Result, SweepError};
use crate::functions::{cdf::CumulativeDistribution, fitness};
use crate::types::{GenotypeSpace, Individual, Population, UserInputs};
use rand::rngs::StdRng;
use rand::Rng;

/// Summary of one generation, kept as an auxiliary trace of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best: f64,
    pub mean: f64,
    pub worst: f64,
}

/// What one optimizer run hands back
#[derive(Debug, Clone)]
pub struct OptimizerOutcome {
    pub population: Population,
    pub trace: Vec<GenerationStats>,
}

/// A stochastic optimizer turning one configuration into a final population.
///
/// Implementations must draw all randomness from `rng` so that callers control
/// independence and reproducibility between runs.
pub trait Optimizer: Send + Sync {
    fn run(&self, inputs: &UserInputs, rng: &mut StdRng) -> Result<OptimizerOutcome>;
}

/// Binary-encoded genetic algorithm with roulette selection, single-point
/// crossover, bit-flip mutation and optional elitism
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneticAlgorithm;

impl GeneticAlgorithm {
    pub fn new() -> Self {
        Self
    }

    fn initialize_population(&self, inputs: &UserInputs, rng: &mut StdRng) -> Result<Vec<Genome>> {
        (0..inputs.population_size)
            .map(|_| random_genome(inputs.space.bits, rng))
            .collect()
    }

    fn evaluate_population(&self, genomes: Vec<Genome>, inputs: &UserInputs) -> Result<Population> {
        let mut individuals = Vec::with_capacity(genomes.len());

        for genome in genomes {
            let x = decode(&inputs.space, &genome);
            let fx = inputs.objective.evaluate(x);
            if !fx.is_finite() {
                return Err(SweepError::Optimizer(format!(
                    "objective '{}' is not finite at x = {}",
                    inputs.objective.label(),
                    x
                )));
            }
            individuals.push(Individual {
                genome,
                x,
                fx,
                weight: 0.0,
            });
        }

        // Weights are relative to the population they were evaluated in.
        let d = inputs.space.precision.unit();
        let weights = fitness::population_weights(
            &individuals.iter().map(|ind| ind.fx).collect::<Vec<_>>(),
            inputs.goal,
            d,
        );
        for (individual, weight) in individuals.iter_mut().zip(weights) {
            individual.weight = weight;
        }

        Ok(Population::new(individuals))
    }

    fn create_next_generation(
        &self,
        population: &Population,
        inputs: &UserInputs,
        rng: &mut StdRng,
    ) -> Result<Vec<Genome>> {
        let weights: Vec<f64> = population.individuals.iter().map(|ind| ind.weight).collect();
        let cdf = CumulativeDistribution::from_weights(&weights)?;

        let mut next_generation: Vec<Genome> =
            roulette_selection(&cdf, population.len(), rng)
                .into_iter()
                .map(|idx| population.individuals[idx].genome.clone())
                .collect();

        // Parents enter the crossover pool independently and are paired in order.
        let pool: Vec<usize> = (0..next_generation.len())
            .filter(|_| rng.gen::<f64>() < inputs.crossover_probability)
            .collect();
        for pair in pool.chunks_exact(2) {
            let (child1, child2) =
                crossover(&next_generation[pair[0]], &next_generation[pair[1]], rng);
            next_generation[pair[0]] = child1;
            next_generation[pair[1]] = child2;
        }

        for genome in next_generation.iter_mut() {
            mutate(genome, inputs.mutation_probability, rng);
        }

        if inputs.elitism && !next_generation.is_empty() {
            if let Some(elite) = population.best(inputs.goal) {
                if !next_generation.contains(&elite.genome) {
                    let slot = rng.gen_range(0..next_generation.len());
                    next_generation[slot] = elite.genome.clone();
                }
            }
        }

        Ok(next_generation)
    }
}

impl Optimizer for GeneticAlgorithm {
    fn run(&self, inputs: &UserInputs, rng: &mut StdRng) -> Result<OptimizerOutcome> {
        if inputs.population_size == 0 {
            return Err(SweepError::Optimizer(
                "population size must be at least 1".to_string(),
            ));
        }

        let mut population = self.evaluate_population(self.initialize_population(inputs, rng)?, inputs)?;
        let mut trace = Vec::with_capacity(inputs.generations);

        for generation in 0..inputs.generations {
            trace.push(generation_stats(generation, &population, inputs));
            let genomes = self.create_next_generation(&population, inputs, rng)?;
            population = self.evaluate_population(genomes, inputs)?;
        }

        Ok(OptimizerOutcome { population, trace })
    }
}

fn decode(space: &GenotypeSpace, genome: &Genome) -> f64 {
    space.int_to_real(genome.to_int())
}

fn generation_stats(generation: usize, population: &Population, inputs: &UserInputs) -> GenerationStats {
    let values = population.values();
    let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
    let best = population.best(inputs.goal).map(|ind| ind.fx).unwrap_or(f64::NAN);
    let worst = fitness::worst_value(&values, inputs.goal).unwrap_or(f64::NAN);

    GenerationStats {
        generation,
        best,
        mean,
        worst,
    }
}
