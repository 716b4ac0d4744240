//! Single-slot debounce scheduler for typeahead queries
//!
//! Coalesces a burst of rapid calls into the most recent one: each call
//! cancels any pending timer and re-arms it, and every caller of the
//! burst resolves with the result of the call that finally executes.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

struct Pending<T> {
    handle: JoinHandle<()>,
    tx: broadcast::Sender<T>,
}

struct Slot<T> {
    generation: u64,
    pending: Option<Pending<T>>,
}

/// Per-client single-slot coalescer.
///
/// At most one timer is armed at a time; the slot is guarded by a mutex
/// so the "at most one pending execution" invariant holds under
/// multi-threaded runtimes too. The guard is never held across an await.
pub struct Debouncer<T> {
    window: Duration,
    slot: Arc<Mutex<Slot<T>>>,
}

fn lock<T>(mutex: &Mutex<Slot<T>>) -> MutexGuard<'_, Slot<T>> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Debouncer<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                pending: None,
            })),
        }
    }

    /// Schedule `operation` after the quiet period, cancelling any
    /// pending earlier call. Returns the result of whichever call in
    /// the burst ends up executing, or `None` if the debouncer was torn
    /// down before the burst completed.
    pub async fn call<F>(&self, operation: F) -> Option<T>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let mut rx = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            let generation = slot.generation;

            // Cancel the pending call but keep its burst channel so
            // earlier callers resolve with this call's result.
            let tx = match slot.pending.take() {
                Some(pending) => {
                    pending.handle.abort();
                    pending.tx
                }
                None => broadcast::channel(1).0,
            };
            let rx = tx.subscribe();

            let window = self.window;
            let slot_ref = Arc::clone(&self.slot);
            let burst_tx = tx.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(window).await;
                // Close the burst as soon as the quiet period elapses:
                // once execution starts it must not be cancelled, and a
                // call arriving from here on starts a fresh burst.
                {
                    let mut slot = lock(&slot_ref);
                    if slot.generation == generation {
                        slot.pending = None;
                    }
                }
                let result = operation.await;
                let _ = burst_tx.send(result);
            });

            slot.pending = Some(Pending { handle, tx });
            rx
        };

        rx.recv().await.ok()
    }
}
