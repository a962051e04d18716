pub mod evolution_engine;
pub mod genome;
pub mod operators;

pub use evolution_engine::{GenerationStats, GeneticAlgorithm, Optimizer, OptimizerOutcome};
pub use genome::Genome;
