use super::driver::{CancellationToken, SweepDriver, SweepHandle, SweepSummary};
use super::progress::{ChannelProgressSink, ProgressUpdate};
use crate::error::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

/// Polling front end over a background sweep
///
/// Progress arrives over a channel so a UI loop can drain it without blocking;
/// the summary becomes available once the sweep and its completion callback
/// are done. Dropping the runner cancels the sweep.
pub struct SweepRunner {
    handle: Option<SweepHandle>,
    progress_rx: Receiver<ProgressUpdate>,
    cancel: CancellationToken,
    completions: Arc<AtomicUsize>,
    total: usize,
}

impl SweepRunner {
    /// Start the sweep from combination `skip` in the background
    pub fn start(driver: &SweepDriver, skip: usize) -> Result<Self> {
        let (progress_tx, progress_rx) = channel();
        let cancel = CancellationToken::new();
        let completions = Arc::new(AtomicUsize::new(0));
        let completions_clone = Arc::clone(&completions);

        let handle = driver.run_cancellable(
            skip,
            cancel.clone(),
            ChannelProgressSink::new(progress_tx),
            move || {
                completions_clone.fetch_add(1, Ordering::SeqCst);
            },
        )?;

        Ok(Self {
            handle: Some(handle),
            progress_rx,
            cancel,
            completions,
            total: driver.grid().parameter_sets(skip).len(),
        })
    }

    /// Poll for progress updates (non-blocking)
    pub fn poll_progress(&mut self) -> Option<ProgressUpdate> {
        self.progress_rx.try_recv().ok()
    }

    /// Drain every update received so far
    pub fn drain_progress(&mut self) -> Vec<ProgressUpdate> {
        self.progress_rx.try_iter().collect()
    }

    /// Summary once the sweep is complete; `None` while it is still running
    pub fn try_get_results(&mut self) -> Option<Result<SweepSummary>> {
        let result = self.handle.as_mut()?.try_join();
        if result.is_some() {
            self.handle = None;
        }
        result
    }

    /// Block until the sweep is complete
    pub fn wait(mut self) -> Result<SweepSummary> {
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Err(crate::error::SweepError::Coordinator(
                "sweep results already taken".to_string(),
            )),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_complete(&self) -> bool {
        self.completions.load(Ordering::SeqCst) > 0
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl Drop for SweepRunner {
    fn drop(&mut self) {
        self.cancel();
    }
}
