//! Arrival notifications for local runs.
//!
//! In production a pub/sub fabric invokes a stage once per new object; this
//! module is the local stand-in. [`ArrivalWatcher`] polls a store location
//! on its own thread and delivers one [`ObjectArrival`] per new key over a
//! bounded channel; [`drive_stage`] is the consumer loop that turns each
//! arrival into a stage invocation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};

use crate::stage::BoundStage;
use crate::store::{ObjectRef, ObjectStore, StoreLocation};

/// Bounded for backpressure: a slow consumer stalls the poller instead of
/// buffering arrivals without limit.
const ARRIVAL_CHANNEL_CAPACITY: usize = 256;

/// Notification that a new object arrived at a watched location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectArrival {
    pub location: ObjectRef,
}

/// Polling watcher over one store location.
///
/// Each new key is delivered exactly once per watcher; keys present before
/// the first poll are delivered too, so a restart reprocesses whatever is
/// already there.
pub struct ArrivalWatcher;

impl ArrivalWatcher {
    /// Spawn the polling thread. The watcher stops when the handle is
    /// stopped or the receiver is dropped.
    pub fn spawn(
        store: Arc<dyn ObjectStore>,
        location: StoreLocation,
        poll_interval: Duration,
    ) -> (Receiver<ObjectArrival>, WatcherHandle) {
        let (tx, rx) = bounded(ARRIVAL_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = thread::spawn(move || {
            let mut seen: HashSet<String> = HashSet::new();
            while !stop_flag.load(Ordering::Relaxed) {
                match store.list(&location) {
                    Ok(objects) => {
                        for object in objects {
                            if seen.insert(object.key.clone()) {
                                if tx.send(ObjectArrival { location: object }).is_err() {
                                    // Consumer is gone; nothing left to notify.
                                    return;
                                }
                            }
                        }
                    }
                    Err(err) => {
                        tracing::warn!("arrival watcher failed to list {location}: {err}");
                    }
                }
                thread::sleep(poll_interval);
            }
        });

        (rx, WatcherHandle { stop, thread })
    }
}

/// Stops and joins a watcher thread.
pub struct WatcherHandle {
    stop: Arc<AtomicBool>,
    thread: thread::JoinHandle<()>,
}

impl WatcherHandle {
    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.thread.join();
    }
}

/// Invoke `stage` once per arrival until the channel closes.
///
/// A failed invocation is logged and the loop keeps going; redelivery is
/// the notifier's concern, not the stage's.
pub fn drive_stage(stage: &BoundStage, arrivals: &Receiver<ObjectArrival>) {
    for arrival in arrivals {
        match stage.handle(&arrival) {
            Ok(report) => tracing::info!("{report}"),
            Err(err) => tracing::error!(
                "stage {} failed for {} in {} phase: {}",
                stage.name(),
                arrival.location,
                err.phase(),
                err
            ),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
