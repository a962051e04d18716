pub mod evaluation;
pub mod experiment;
pub mod generation;
pub mod sweep;

pub use experiment::ExperimentRunner;
