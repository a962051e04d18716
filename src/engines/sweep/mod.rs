pub mod driver;
pub mod gate;
pub mod grid;
pub mod progress;
pub mod runner;

pub use driver::{
    default_parallelism, CancellationToken, SweepDriver, SweepHandle, SweepSummary,
    WorkItemFailure,
};
pub use gate::{AdmissionGate, Permit};
pub use grid::{ParameterGrid, ParameterSets};
pub use progress::{ChannelProgressSink, ConsoleProgressSink, ProgressSink, ProgressUpdate};
pub use runner::SweepRunner;
