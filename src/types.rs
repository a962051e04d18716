use crate::engines::evaluation::Objective;
use crate::engines::generation::Genome;
use crate::error::{Result, SweepError};
use crate::functions::encoding;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the objective is maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OptimizationGoal {
    #[default]
    Max,
    Min,
}

impl OptimizationGoal {
    /// True when `candidate` is strictly better than `incumbent` for this goal.
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            OptimizationGoal::Max => candidate > incumbent,
            OptimizationGoal::Min => candidate < incumbent,
        }
    }
}

/// Most decimal places a genotype space may declare; beyond this `10^-d`
/// is below `f64` resolution for any useful interval.
pub const MAX_DECIMAL_PLACES: u32 = 15;

/// Decimal precision declared for a genotype space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    pub decimal_places: u32,
}

impl Precision {
    pub fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    /// One unit in the last declared decimal place, `10^-decimal_places`.
    pub fn unit(&self) -> f64 {
        10f64.powi(-(self.decimal_places as i32))
    }

    /// Rounds half to even at the declared number of decimal places.
    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.decimal_places as i32);
        (value * factor).round_ties_even() / factor
    }
}

/// Bounded real interval `[a, b]` encoded on `bits`-long bit strings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenotypeSpace {
    pub a: f64,
    pub b: f64,
    pub bits: u32,
    pub precision: Precision,
}

impl GenotypeSpace {
    pub fn with_bits(a: f64, b: f64, bits: u32, decimal_places: u32) -> Result<Self> {
        if !a.is_finite() || !b.is_finite() || a >= b {
            return Err(SweepError::Domain(format!(
                "genotype interval must satisfy a < b, got [{}, {}]",
                a, b
            )));
        }
        encoding::check_bits(bits)?;
        check_decimal_places(decimal_places)?;

        Ok(Self {
            a,
            b,
            bits,
            precision: Precision::new(decimal_places),
        })
    }

    /// Smallest bit length whose grid resolves `decimal_places` digits of `[a, b]`.
    pub fn from_decimal_places(decimal_places: u32, a: f64, b: f64) -> Result<Self> {
        if !a.is_finite() || !b.is_finite() || a >= b {
            return Err(SweepError::Domain(format!(
                "genotype interval must satisfy a < b, got [{}, {}]",
                a, b
            )));
        }
        check_decimal_places(decimal_places)?;
        let points = (b - a) * 10f64.powi(decimal_places as i32) + 1.0;
        let bits = points.log2().ceil().max(1.0);
        if bits > encoding::MAX_BITS as f64 {
            return Err(SweepError::Domain(format!(
                "{} decimal places over [{}, {}] need more than {} bits",
                decimal_places,
                a,
                b,
                encoding::MAX_BITS
            )));
        }

        Self::with_bits(a, b, bits as u32, decimal_places)
    }

    pub fn max_int(&self) -> u64 {
        encoding::max_int(self.bits)
    }

    /// Distance between two neighbouring representable reals.
    pub fn quantization_step(&self) -> f64 {
        (self.b - self.a) / self.max_int() as f64
    }

    pub fn real_to_int(&self, x: f64) -> u64 {
        encoding::real_to_int(x, self.a, self.b, self.bits)
    }

    pub fn int_to_real(&self, n: u64) -> f64 {
        encoding::int_to_real(n, self.a, self.b, self.bits)
    }

    pub fn real_to_bin(&self, x: f64) -> Result<String> {
        encoding::real_to_bin(x, self.a, self.b, self.bits)
    }

    pub fn bin_to_real(&self, bits: &str) -> Result<f64> {
        if bits.len() != self.bits as usize {
            return Err(SweepError::Format(format!(
                "expected {} bits, got {}",
                self.bits,
                bits.len()
            )));
        }
        encoding::bin_to_real(bits, self.a, self.b, self.bits)
    }
}

fn check_decimal_places(decimal_places: u32) -> Result<()> {
    if decimal_places > MAX_DECIMAL_PLACES {
        return Err(SweepError::Domain(format!(
            "at most {} decimal places are supported, got {}",
            MAX_DECIMAL_PLACES, decimal_places
        )));
    }
    Ok(())
}

/// One evaluated member of a population
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub genome: Genome,
    pub x: f64,
    pub fx: f64,
    /// Selection weight relative to the population it was evaluated in
    pub weight: f64,
}

/// One generation of individuals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    pub individuals: Vec<Individual>,
}

impl Population {
    pub fn new(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Objective values in population order.
    pub fn values(&self) -> Vec<f64> {
        self.individuals.iter().map(|ind| ind.fx).collect()
    }

    /// Largest raw objective value in the population.
    pub fn max_value(&self) -> Option<f64> {
        self.individuals
            .iter()
            .map(|ind| ind.fx)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Best individual for `goal`; the first one wins ties.
    pub fn best(&self, goal: OptimizationGoal) -> Option<&Individual> {
        let mut iter = self.individuals.iter();
        let first = iter.next()?;
        Some(iter.fold(first, |best, ind| {
            if goal.is_better(ind.fx, best.fx) {
                ind
            } else {
                best
            }
        }))
    }
}

/// One point of the hyperparameter grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParameterSet {
    pub population_size: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    pub generations: usize,
}

impl ExperimentParameterSet {
    pub fn new(
        population_size: usize,
        crossover_probability: f64,
        mutation_probability: f64,
        generations: usize,
    ) -> Self {
        Self {
            population_size,
            crossover_probability,
            mutation_probability,
            generations,
        }
    }
}

impl fmt::Display for ExperimentParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N={} pk={} pm={} T={}",
            self.population_size,
            self.crossover_probability,
            self.mutation_probability,
            self.generations
        )
    }
}

/// Everything one Optimizer run needs
#[derive(Debug, Clone)]
pub struct UserInputs {
    pub space: GenotypeSpace,
    pub population_size: usize,
    pub generations: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    pub elitism: bool,
    pub objective: Objective,
    pub goal: OptimizationGoal,
}

impl UserInputs {
    /// Copy of these inputs with `N`, `T`, `pk` and `pm` taken from `parameters`.
    pub fn with_parameters(&self, parameters: &ExperimentParameterSet) -> Self {
        Self {
            population_size: parameters.population_size,
            generations: parameters.generations,
            crossover_probability: parameters.crossover_probability,
            mutation_probability: parameters.mutation_probability,
            ..self.clone()
        }
    }

    pub fn parameter_set(&self) -> ExperimentParameterSet {
        ExperimentParameterSet::new(
            self.population_size,
            self.crossover_probability,
            self.mutation_probability,
            self.generations,
        )
    }
}
