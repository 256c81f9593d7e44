//! Motion command store
//!
//! The single slot shared between the callers and the motion worker. Only the
//! latest request is kept, there is no queue. Every publish sends one wake
//! token to the worker, so a burst of publishes is never lost as a wake-up
//! even though the worker may only ever see the last request of the burst.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{trace, warn};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

use super::{Action, MotionRequest};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Signals sent to the motion worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSignal {
    /// A new request has been published.
    Wake,

    /// The worker should exit.
    Shutdown,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current request, tagged with the number of publishes which produced
/// it.
struct Slot {
    request: MotionRequest,
    generation: u64,
}

/// Mutex guarded store of the current motion request.
pub struct MotionStore {
    slot: Mutex<Slot>,
    wake_sender: Mutex<Sender<WorkerSignal>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionStore {
    /// Create an idle store, and the receiving end of its wake signal.
    pub fn new() -> (Self, Receiver<WorkerSignal>) {
        let (tx, rx) = channel();

        (
            MotionStore {
                slot: Mutex::new(Slot {
                    request: MotionRequest::default(),
                    generation: 0,
                }),
                wake_sender: Mutex::new(tx),
            },
            rx,
        )
    }

    /// Replace the current request and wake the worker.
    ///
    /// The action being replaced is recorded in the new request's
    /// `previous_action`. The worker is signalled even if the request is the
    /// same as the current one.
    ///
    /// Returns the generation of the published request.
    pub fn publish(&self, request: MotionRequest) -> u64 {
        let generation = {
            let mut slot = self.lock_slot();
            let previous_action = slot.request.action;

            slot.request = MotionRequest {
                previous_action,
                ..request
            };
            slot.generation += 1;

            trace!(
                "Published {:?} (generation {})",
                slot.request,
                slot.generation
            );

            slot.generation
        };

        self.signal(WorkerSignal::Wake);

        generation
    }

    /// Get a copy of the current request.
    pub fn snapshot(&self) -> MotionRequest {
        self.lock_slot().request
    }

    /// Get the action of the current request.
    pub fn action(&self) -> Action {
        self.lock_slot().request.action
    }

    /// Get a copy of the current request along with its generation.
    pub(crate) fn tagged_snapshot(&self) -> (MotionRequest, u64) {
        let slot = self.lock_slot();
        (slot.request, slot.generation)
    }

    /// Generation of the current request.
    pub(crate) fn generation(&self) -> u64 {
        self.lock_slot().generation
    }

    /// Replace the current request with one derived from it, provided nothing
    /// has been published since `generation`.
    ///
    /// Used by the worker for its own transitions, which neither bump the
    /// generation nor wake the worker. Returns `false` if the request had
    /// been superseded and was left alone.
    pub(crate) fn transition<F>(&self, generation: u64, f: F) -> bool
    where
        F: FnOnce(&MotionRequest) -> MotionRequest,
    {
        let mut slot = self.lock_slot();

        if slot.generation != generation {
            return false;
        }

        slot.request = f(&slot.request);
        true
    }

    /// Ask the worker to exit once it has handled the signals before this
    /// one.
    pub(crate) fn shutdown(&self) {
        self.signal(WorkerSignal::Shutdown);
    }

    fn signal(&self, signal: WorkerSignal) {
        let sender = match self.wake_sender.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };

        if sender.send(signal).is_err() {
            warn!("Motion worker is not running, {:?} signal dropped", signal);
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        // Every critical section is a plain copy, so a poisoned slot still
        // holds a whole request
        match self.slot.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive::{Direction, Rotation};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_publish_records_previous_action() {
        let (store, rx) = MotionStore::new();
        assert_eq!(store.action(), Action::None);

        store.publish(MotionRequest::go(Direction::Forward, 100, 0, 0));
        store.publish(MotionRequest::stop(200));

        let req = store.snapshot();
        assert_eq!(req.action, Action::Stop);
        assert_eq!(req.previous_action, Action::Go);
        assert_eq!(req.duration_ms, 200);

        // One token per publish
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn test_identical_publishes_still_wake() {
        let (store, rx) = MotionStore::new();

        let g1 = store.publish(MotionRequest::stop(0));
        let g2 = store.publish(MotionRequest::stop(0));

        assert!(g2 > g1);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![WorkerSignal::Wake; 2]);
    }

    #[test]
    fn test_transition_only_when_current() {
        let (store, _rx) = MotionStore::new();

        let gen = store.publish(MotionRequest::go(Direction::Forward, 100, 500, 0));
        assert!(store.transition(gen, |r| r.handed_to_stop()));
        assert_eq!(store.action(), Action::Stop);
        assert_eq!(store.generation(), gen);

        let stale = gen;
        store.publish(MotionRequest::spin(Rotation::Right, 50, 1.0, 0.0));
        assert!(!store.transition(stale, |r| r.handed_to_stop()));
        assert_eq!(store.action(), Action::Spin);
    }

    #[test]
    fn test_concurrent_publishers_never_tear() {
        let (store, _rx) = MotionStore::new();
        let store = Arc::new(store);

        // Each writer publishes requests whose fields are all derived from the
        // same value, so any mix of two requests is detectable.
        let writers: Vec<_> = (1..=8u8)
            .map(|id| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        store.publish(MotionRequest::go(
                            Direction::Backward,
                            id,
                            u32::from(id) * 10,
                            u32::from(id) * 3,
                        ));
                    }
                })
            })
            .collect();

        let reader = {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..5000 {
                    let req = store.snapshot();
                    if req.action == Action::Go {
                        assert_eq!(req.duration_ms, u32::from(req.speed) * 10);
                        assert_eq!(req.ramp_ms, u32::from(req.speed) * 3);
                        assert_eq!(req.direction, Direction::Backward);
                    }
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(store.generation(), 8 * 500);
    }
}
