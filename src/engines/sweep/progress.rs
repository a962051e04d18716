use crate::types::ExperimentParameterSet;
use std::sync::mpsc::Sender;
use std::sync::Mutex;

/// Receives one event per completed grid point, in completion order.
///
/// Sinks are called from worker threads, possibly concurrently.
pub trait ProgressSink: Send + Sync {
    fn report(&self, parameter_set: ExperimentParameterSet, average_best: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(ExperimentParameterSet, f64) + Send + Sync,
{
    fn report(&self, parameter_set: ExperimentParameterSet, average_best: f64) {
        self(parameter_set, average_best)
    }
}

/// Prints one line per completed grid point
pub struct ConsoleProgressSink {
    total: usize,
    completed: Mutex<usize>,
}

impl ConsoleProgressSink {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: Mutex::new(0),
        }
    }
}

impl ProgressSink for ConsoleProgressSink {
    fn report(&self, parameter_set: ExperimentParameterSet, average_best: f64) {
        let mut completed = self.completed.lock().unwrap_or_else(|p| p.into_inner());
        *completed += 1;
        println!(
            "[{}/{}] {} -> {}",
            *completed, self.total, parameter_set, average_best
        );
    }
}

/// Progress event forwarded over a channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub parameter_set: ExperimentParameterSet,
    pub average_best: f64,
}

/// Forwards progress to another thread, e.g. a polling front end
pub struct ChannelProgressSink {
    sender: Sender<ProgressUpdate>,
}

impl ChannelProgressSink {
    pub fn new(sender: Sender<ProgressUpdate>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn report(&self, parameter_set: ExperimentParameterSet, average_best: f64) {
        // A dropped receiver only means nobody is listening anymore.
        let _ = self.sender.send(ProgressUpdate {
            parameter_set,
            average_best,
        });
    }
}
