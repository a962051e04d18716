//! Counting admission gate bounding how many work items run at once.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct GateState {
    in_flight: usize,
    peak: usize,
}

#[derive(Debug)]
struct GateInner {
    capacity: usize,
    state: Mutex<GateState>,
    changed: Condvar,
}

impl GateInner {
    fn lock(&self) -> MutexGuard<'_, GateState> {
        // The counters stay consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Semaphore handing out at most `capacity` permits at a time.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    inner: Arc<GateInner>,
}

/// Slot held by one work item; dropping it releases the slot.
#[derive(Debug)]
pub struct Permit {
    inner: Arc<GateInner>,
}

impl AdmissionGate {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(GateInner {
                capacity: capacity.max(1),
                state: Mutex::new(GateState::default()),
                changed: Condvar::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Blocks until a slot is free and takes it.
    pub fn acquire(&self) -> Permit {
        let mut state = self.inner.lock();
        while state.in_flight >= self.inner.capacity {
            state = self
                .inner
                .changed
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        state.in_flight += 1;
        state.peak = state.peak.max(state.in_flight);

        Permit {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Blocks until every permit has been released.
    pub fn wait_idle(&self) {
        let mut state = self.inner.lock();
        while state.in_flight > 0 {
            state = self
                .inner
                .changed
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner.lock().in_flight
    }

    /// Highest number of permits ever held at the same time.
    pub fn peak(&self) -> usize {
        self.inner.lock().peak
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        drop(state);
        self.inner.changed.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_permits_are_released_on_drop() {
        let gate = AdmissionGate::new(2);
        let a = gate.acquire();
        let b = gate.acquire();
        assert_eq!(gate.in_flight(), 2);
        drop(a);
        assert_eq!(gate.in_flight(), 1);
        drop(b);
        assert_eq!(gate.in_flight(), 0);
        assert_eq!(gate.peak(), 2);
    }

    #[test]
    fn test_acquire_blocks_at_capacity() {
        let gate = AdmissionGate::new(1);
        let permit = gate.acquire();

        let waiter = {
            let gate = gate.clone();
            thread::spawn(move || {
                let _permit = gate.acquire();
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        drop(permit);
        waiter.join().unwrap();
        assert_eq!(gate.peak(), 1);
    }

    #[test]
    fn test_permit_released_when_holder_panics() {
        let gate = AdmissionGate::new(1);
        let worker = {
            let gate = gate.clone();
            thread::spawn(move || {
                let _permit = gate.acquire();
                panic!("work item failed");
            })
        };
        assert!(worker.join().is_err());
        assert_eq!(gate.in_flight(), 0);
        gate.wait_idle();
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        assert_eq!(AdmissionGate::new(0).capacity(), 1);
    }
}
