use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::experiment::DEFAULT_REPETITIONS;
use crate::engines::sweep::ParameterGrid;
use crate::error::{Result, SweepError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub population_sizes: Vec<usize>,
    pub crossover_probabilities: Vec<f64>,
    pub mutation_probabilities: Vec<f64>,
    pub generations: Vec<usize>,
    pub repetitions: usize,
    /// Experiments in flight at once; 0 uses every processing unit
    pub parallelism: usize,
    /// Combination index to resume from
    pub skip: usize,
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            population_sizes: vec![30, 50, 70, 90],
            crossover_probabilities: vec![0.5, 0.6, 0.7, 0.8, 0.9],
            mutation_probabilities: vec![0.0001, 0.0005, 0.001, 0.005, 0.01],
            generations: vec![50, 100, 150],
            repetitions: DEFAULT_REPETITIONS,
            parallelism: 0,
            skip: 0,
            seed: None,
        }
    }
}

impl SweepConfig {
    pub fn grid(&self) -> Result<ParameterGrid> {
        ParameterGrid::new(
            self.population_sizes.clone(),
            self.crossover_probabilities.clone(),
            self.mutation_probabilities.clone(),
            self.generations.clone(),
        )
    }
}

fn check_probabilities(name: &str, values: &[f64]) -> Result<()> {
    if values.iter().any(|p| !(0.0..=1.0).contains(p)) {
        return Err(SweepError::Configuration(format!(
            "{} must be between 0 and 1",
            name
        )));
    }
    Ok(())
}

impl ConfigSection for SweepConfig {
    fn section_name() -> &'static str {
        "sweep"
    }

    fn validate(&self) -> Result<()> {
        if self.population_sizes.contains(&0) {
            return Err(SweepError::Configuration(
                "Population sizes must be at least 1".to_string(),
            ));
        }
        if self.generations.contains(&0) {
            return Err(SweepError::Configuration(
                "Generation counts must be at least 1".to_string(),
            ));
        }
        check_probabilities("Crossover probabilities", &self.crossover_probabilities)?;
        check_probabilities("Mutation probabilities", &self.mutation_probabilities)?;
        if self.repetitions == 0 {
            return Err(SweepError::Configuration(
                "Repetitions must be at least 1".to_string(),
            ));
        }

        let total = self.grid()?.total_combinations();
        if self.skip > total {
            return Err(SweepError::Configuration(format!(
                "Skip offset {} exceeds the {} grid combinations",
                self.skip, total
            )));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Sweep".to_string(),
            fields: vec![
                FieldManifest::new("population_sizes", "integer[]", serde_json::json!([30, 50, 70, 90]), "Population sizes N"),
                FieldManifest::new("crossover_probabilities", "float[]", serde_json::json!([0.5, 0.6, 0.7, 0.8, 0.9]), "Crossover probabilities pk")
                    .with_range(Some(0.0), Some(1.0)),
                FieldManifest::new("mutation_probabilities", "float[]", serde_json::json!([0.0001, 0.0005, 0.001, 0.005, 0.01]), "Mutation probabilities pm")
                    .with_range(Some(0.0), Some(1.0)),
                FieldManifest::new("generations", "integer[]", serde_json::json!([50, 100, 150]), "Generation counts T"),
                FieldManifest::new("repetitions", "integer", serde_json::json!(DEFAULT_REPETITIONS), "Optimizer runs averaged per grid point")
                    .with_range(Some(1.0), None),
                FieldManifest::new("parallelism", "integer", serde_json::json!(0), "Experiments in flight, 0 for all cores")
                    .with_range(Some(0.0), None),
                FieldManifest::new("skip", "integer", serde_json::json!(0), "Resume from this combination index")
                    .with_range(Some(0.0), None),
                FieldManifest::new("seed", "integer", serde_json::Value::Null, "Seed for reproducible repetitions"),
            ],
        }
    }
}
