//! Order broker: the seam between customer threads, the bounded queue, and
//! staff retrieval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::core::journal::{build_order_event, SharedJournal};
use crate::core::order::{Order, OrderOutcome, OrderTicket, TintRequest};
use crate::core::queue::{OrderQueue, Retrieval};
use crate::core::worker::ShopCounters;
use crate::core::ShopError;

/// Brokers order submission, completion waiting, and departure tracking for
/// one shop session.
pub struct OrderBroker {
    queue: Arc<OrderQueue>,
    counters: Arc<ShopCounters>,
    next_order_id: AtomicU64,
    journal: Option<SharedJournal>,
}

impl OrderBroker {
    pub(crate) fn new(
        queue: Arc<OrderQueue>,
        counters: Arc<ShopCounters>,
        journal: Option<SharedJournal>,
    ) -> Self {
        Self {
            queue,
            counters,
            next_order_id: AtomicU64::new(0),
            journal,
        }
    }

    /// Submit an order for `customer`, blocking while the queue is full.
    /// Returns the ticket the customer waits on.
    ///
    /// # Errors
    ///
    /// [`ShopError::ShopClosed`] if submission happens after the last
    /// customer departed (a caller contract violation, rejected rather than
    /// blocked forever).
    pub fn submit_order(
        &self,
        customer: usize,
        request: TintRequest,
    ) -> Result<OrderTicket, ShopError> {
        let id = self.next_order_id.fetch_add(1, Ordering::Relaxed);
        let (order, ticket) = Order::new(id, customer, request);
        // Recorded before the hand-off: once the order is in the queue a
        // staff thread may already be filling it.
        if let Some(journal) = &self.journal {
            journal
                .lock()
                .record(build_order_event(Some(id), Some(customer), "submit", None));
        }
        self.queue.submit(order)?;
        self.counters.orders_submitted.fetch_add(1, Ordering::Relaxed);
        Ok(ticket)
    }

    /// Submit an order and block until staff fill it: the customer-side
    /// round trip.
    ///
    /// # Errors
    ///
    /// [`ShopError::ShopClosed`] on submission after shutdown, or the mixing
    /// failure for this order.
    pub fn place_order(&self, customer: usize, request: TintRequest) -> OrderOutcome {
        self.submit_order(customer, request)?.wait()
    }

    /// Record one customer's departure. The last departure closes the shop:
    /// staff blocked on the empty queue observe the terminal signal instead
    /// of waiting forever.
    pub fn customer_departs(&self, customer: usize) {
        debug!(customer, "customer departs");
        if let Some(journal) = &self.journal {
            journal
                .lock()
                .record(build_order_event(None, Some(customer), "depart", None));
        }
        self.queue.customer_departs();
    }

    /// Staff-side retrieval: pass-through to the queue.
    #[must_use]
    pub fn staff_retrieve(&self) -> Retrieval {
        self.queue.retrieve()
    }

    /// Customers that have not yet departed.
    #[must_use]
    pub fn remaining_customers(&self) -> usize {
        self.queue.remaining_customers()
    }
}
