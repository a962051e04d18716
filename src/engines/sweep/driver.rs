use super::gate::AdmissionGate;
use super::grid::{ParameterGrid, ParameterSets};
use super::progress::ProgressSink;
use crate::engines::experiment::ExperimentRunner;
use crate::error::{Result, SweepError};
use crate::types::{ExperimentParameterSet, UserInputs};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use rayon::ThreadPool;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Number of processing units available to this process.
pub fn default_parallelism() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Shared cooperative cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A grid point whose experiment failed
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItemFailure {
    pub combination: usize,
    pub parameter_set: ExperimentParameterSet,
    pub message: String,
}

/// Outcome of one sweep, available once it has completed
#[derive(Debug, Clone)]
pub struct SweepSummary {
    /// Combinations in range for this run (after `skip`)
    pub total: usize,
    pub dispatched: usize,
    pub completed: usize,
    pub failures: Vec<WorkItemFailure>,
    pub cancelled: bool,
    pub peak_in_flight: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SweepSummary {
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failures.is_empty() && self.completed == self.total
    }
}

#[derive(Debug, Default)]
struct Ledger {
    completed: usize,
    failures: Vec<WorkItemFailure>,
}

/// Handle on a sweep running in the background
pub struct SweepHandle {
    handle: Option<JoinHandle<SweepSummary>>,
    cancel: CancellationToken,
}

impl SweepHandle {
    /// Stops dispatching new grid points; running ones finish normally.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Waits for the sweep, including its completion callback.
    pub fn join(mut self) -> Result<SweepSummary> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| SweepError::Coordinator("sweep already joined".to_string()))?;
        handle
            .join()
            .map_err(|payload| SweepError::Coordinator(panic_message(payload.as_ref())))
    }

    pub(crate) fn try_join(&mut self) -> Option<Result<SweepSummary>> {
        match self.handle.take() {
            Some(handle) if handle.is_finished() => Some(
                handle
                    .join()
                    .map_err(|payload| SweepError::Coordinator(panic_message(payload.as_ref()))),
            ),
            Some(handle) => {
                self.handle = Some(handle);
                None
            }
            None => None,
        }
    }
}

/// Runs one experiment per point of a hyperparameter grid with bounded
/// parallelism
#[derive(Clone)]
pub struct SweepDriver {
    grid: ParameterGrid,
    defaults: UserInputs,
    runner: ExperimentRunner,
    parallelism: usize,
}

impl SweepDriver {
    pub fn new(grid: ParameterGrid, defaults: UserInputs, runner: ExperimentRunner) -> Self {
        Self {
            grid,
            defaults,
            runner,
            parallelism: default_parallelism(),
        }
    }

    /// Maximum number of experiments in flight; `0` means one per processing unit.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = if parallelism == 0 {
            default_parallelism()
        } else {
            parallelism
        };
        self
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn grid(&self) -> &ParameterGrid {
        &self.grid
    }

    pub fn defaults(&self) -> &UserInputs {
        &self.defaults
    }

    pub fn total_combinations(&self) -> usize {
        self.grid.total_combinations()
    }

    pub fn get_all_parameter_sets(&self, skip: usize) -> ParameterSets<'_> {
        self.grid.parameter_sets(skip)
    }

    /// The default inputs with `N`, `T`, `pk` and `pm` replaced.
    pub fn user_input_from_parameter_set(&self, parameters: &ExperimentParameterSet) -> UserInputs {
        self.defaults.with_parameters(parameters)
    }

    /// Starts the full sweep in the background.
    ///
    /// `sink` receives every successful grid point as soon as it is known, in
    /// completion order. `on_complete` runs exactly once, after every
    /// dispatched grid point has finished.
    pub fn run<S, C>(&self, sink: S, on_complete: C) -> Result<SweepHandle>
    where
        S: ProgressSink + 'static,
        C: FnOnce() + Send + 'static,
    {
        self.run_from(0, sink, on_complete)
    }

    /// Like [`SweepDriver::run`] but starts at combination `skip`.
    pub fn run_from<S, C>(&self, skip: usize, sink: S, on_complete: C) -> Result<SweepHandle>
    where
        S: ProgressSink + 'static,
        C: FnOnce() + Send + 'static,
    {
        self.run_cancellable(skip, CancellationToken::new(), sink, on_complete)
    }

    /// Like [`SweepDriver::run_from`], observing an existing cancellation token.
    pub fn run_cancellable<S, C>(
        &self,
        skip: usize,
        cancel: CancellationToken,
        sink: S,
        on_complete: C,
    ) -> Result<SweepHandle>
    where
        S: ProgressSink + 'static,
        C: FnOnce() + Send + 'static,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallelism)
            .thread_name(|i| format!("sweep-worker-{}", i))
            .build()?;

        let token = cancel.clone();
        let driver = Arc::new(self.clone());
        let sink: Arc<dyn ProgressSink> = Arc::new(sink);

        let handle = thread::Builder::new()
            .name("sweep-coordinator".to_string())
            .spawn(move || {
                let summary = driver.execute(skip, &pool, sink, &token);
                on_complete();
                summary
            })?;

        Ok(SweepHandle {
            handle: Some(handle),
            cancel,
        })
    }

    fn execute(
        self: &Arc<Self>,
        skip: usize,
        pool: &ThreadPool,
        sink: Arc<dyn ProgressSink>,
        cancel: &CancellationToken,
    ) -> SweepSummary {
        let started_at = Utc::now();
        let gate = AdmissionGate::new(self.parallelism);
        let ledger = Arc::new(Mutex::new(Ledger::default()));
        let parameter_sets = self.grid.parameter_sets(skip);
        let total = parameter_sets.len();

        info!(
            "Sweep started: {} combinations from offset {}, {} repetitions each, parallelism {}",
            total,
            skip,
            self.runner.repetitions(),
            self.parallelism
        );

        let mut dispatched = 0;
        for (offset, parameter_set) in parameter_sets.enumerate() {
            let combination = skip + offset;
            if cancel.is_cancelled() {
                break;
            }
            let permit = gate.acquire();
            // Waiting for a slot may have taken a while.
            if cancel.is_cancelled() {
                break;
            }

            dispatched += 1;
            let driver = Arc::clone(self);
            let sink = Arc::clone(&sink);
            let ledger = Arc::clone(&ledger);
            pool.spawn(move || {
                let outcome = driver.process(combination, &parameter_set, sink.as_ref());
                record(&ledger, combination, parameter_set, outcome);
                drop(permit);
            });
        }

        gate.wait_idle();

        let ledger = std::mem::take(&mut *lock(&*ledger));
        let cancelled = dispatched < total;
        if cancelled {
            warn!(
                "Sweep cancelled after dispatching {} of {} combinations",
                dispatched, total
            );
        }
        info!(
            "Sweep finished: {} completed, {} failed",
            ledger.completed,
            ledger.failures.len()
        );

        SweepSummary {
            total,
            dispatched,
            completed: ledger.completed,
            failures: ledger.failures,
            cancelled,
            peak_in_flight: gate.peak(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Runs one grid point; panics and errors become a `WorkItem` error.
    fn process(
        &self,
        combination: usize,
        parameter_set: &ExperimentParameterSet,
        sink: &dyn ProgressSink,
    ) -> Result<f64> {
        let inputs = self.user_input_from_parameter_set(parameter_set);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<f64> {
            let average_best = self.runner.run(&inputs)?;
            sink.report(*parameter_set, average_best);
            Ok(average_best)
        }));

        match outcome {
            Ok(Ok(average_best)) => Ok(average_best),
            Ok(Err(err)) => Err(SweepError::WorkItem {
                combination,
                message: err.to_string(),
            }),
            Err(payload) => Err(SweepError::WorkItem {
                combination,
                message: format!("panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }
}

fn record(
    ledger: &Mutex<Ledger>,
    combination: usize,
    parameter_set: ExperimentParameterSet,
    outcome: Result<f64>,
) {
    let mut ledger = lock(ledger);
    match outcome {
        Ok(average_best) => {
            info!("{} -> {}", parameter_set, average_best);
            ledger.completed += 1;
        }
        Err(err) => {
            error!("{} ({})", err, parameter_set);
            let message = match err {
                SweepError::WorkItem { message, .. } => message,
                other => other.to_string(),
            };
            ledger.failures.push(WorkItemFailure {
                combination,
                parameter_set,
                message,
            });
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
