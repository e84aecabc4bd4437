//! Staff worker threads.
//!
//! Each staff thread runs the fulfillment loop: retrieve an order, acquire
//! its pigment set, mix, release (RAII), and post the outcome to the waiting
//! customer. The loop exits when retrieval reports that the shop has closed.
//! An order that was already dequeued is always completed, even if the last
//! customer departs while it is being filled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::core::journal::{build_order_event, SharedJournal};
use crate::core::mixer::Mixer;
use crate::core::queue::{OrderQueue, Retrieval};
use crate::core::rack::PigmentRack;

/// Session statistics counters (lock-free atomics).
#[derive(Debug, Default)]
pub(crate) struct ShopCounters {
    pub orders_submitted: AtomicU64,
    pub orders_taken: AtomicU64,
    pub orders_filled: AtomicU64,
    pub orders_failed: AtomicU64,
}

/// Snapshot of one shop session's activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopStats {
    /// Staff threads serving the session.
    pub staff_count: usize,
    /// Orders accepted into the queue.
    pub orders_submitted: u64,
    /// Orders dequeued by staff.
    pub orders_taken: u64,
    /// Orders filled and handed back.
    pub orders_filled: u64,
    /// Orders whose mixing step failed.
    pub orders_failed: u64,
}

impl ShopCounters {
    pub(crate) fn snapshot(&self, staff_count: usize) -> ShopStats {
        ShopStats {
            staff_count,
            orders_submitted: self.orders_submitted.load(Ordering::Relaxed),
            orders_taken: self.orders_taken.load(Ordering::Relaxed),
            orders_filled: self.orders_filled.load(Ordering::Relaxed),
            orders_failed: self.orders_failed.load(Ordering::Relaxed),
        }
    }
}

/// Spawn one staff thread running the fulfillment loop until shutdown.
pub(crate) fn spawn_staff(
    staff_id: usize,
    queue: Arc<OrderQueue>,
    rack: Arc<PigmentRack>,
    mixer: Arc<dyn Mixer>,
    counters: Arc<ShopCounters>,
    journal: Option<SharedJournal>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("staff-{staff_id}"))
        .spawn(move || {
            debug!(staff_id, "staff thread started");
            loop {
                let order = match queue.retrieve() {
                    Retrieval::Order(order) => order,
                    Retrieval::ShopClosed => {
                        debug!(staff_id, "shop closed, staff exiting");
                        break;
                    }
                };
                counters.orders_taken.fetch_add(1, Ordering::Relaxed);

                let order_id = order.id;
                let customer = order.customer;
                debug!(staff_id, order_id, customer, "filling order");

                // The hold is dropped before completion is posted, so the
                // pigments are back on the rack by the time the customer
                // wakes, on failure paths included.
                let outcome = {
                    let mut hold = rack.acquire(&order.request);
                    mixer.mix(order_id, &mut hold)
                };

                match &outcome {
                    Ok(_) => {
                        counters.orders_filled.fetch_add(1, Ordering::Relaxed);
                        record(&journal, order_id, customer, "fill", None);
                    }
                    Err(e) => {
                        counters.orders_failed.fetch_add(1, Ordering::Relaxed);
                        warn!(staff_id, order_id, error = %e, "mixing failed");
                        record(&journal, order_id, customer, "fail", Some(e.to_string()));
                    }
                }
                order.complete(outcome);
            }
        })
}

fn record(
    journal: &Option<SharedJournal>,
    order_id: u64,
    customer: usize,
    action: &str,
    detail: Option<String>,
) {
    if let Some(journal) = journal {
        journal
            .lock()
            .record(build_order_event(Some(order_id), Some(customer), action, detail));
    }
}
