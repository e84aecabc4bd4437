//! Bounded order queue with blocking hand-off and coordinated shutdown.
//!
//! The queue is a fixed ring of at most `customers` outstanding orders. The
//! ring state and the remaining-customer count live under one mutex, with
//! two condition variables for the full and empty boundaries. Shutdown is an
//! explicit flag set under the same guard as the empty predicate when the
//! last customer departs, delivered to retrievers with a broadcast.

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::core::order::Order;
use crate::core::ShopError;

/// Result of one queue retrieval.
#[derive(Debug)]
pub enum Retrieval {
    /// An order was dequeued and is now owned by the retrieving staff thread.
    Order(Order),
    /// No customers remain and the queue is drained; the retriever should
    /// exit instead of blocking further.
    ShopClosed,
}

struct QueueState {
    ring: Vec<Option<Order>>,
    start: usize,
    count: usize,
    remaining_customers: usize,
    closed: bool,
}

impl QueueState {
    fn push(&mut self, order: Order) {
        let end = (self.start + self.count) % self.ring.len();
        self.ring[end] = Some(order);
        self.count += 1;
    }

    fn pop(&mut self) -> Option<Order> {
        if self.count == 0 {
            return None;
        }
        let order = self.ring[self.start].take();
        self.start = (self.start + 1) % self.ring.len();
        self.count -= 1;
        order
    }
}

/// Fixed-capacity FIFO order queue shared by customers and staff.
pub struct OrderQueue {
    capacity: usize,
    state: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl OrderQueue {
    /// Create a queue for a session of `customers` customers. Capacity
    /// equals the customer population: every customer may have at most one
    /// order outstanding.
    ///
    /// # Panics
    ///
    /// Panics if `customers` is zero; the population is validated at
    /// shop-open.
    #[must_use]
    pub fn new(customers: usize) -> Self {
        assert!(customers > 0, "queue capacity must be positive");
        let mut ring = Vec::with_capacity(customers);
        ring.resize_with(customers, || None);
        Self {
            capacity: customers,
            state: Mutex::new(QueueState {
                ring,
                start: 0,
                count: 0,
                remaining_customers: customers,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Submit an order, blocking while the queue is full. Wakes one staff
    /// thread waiting on the empty boundary.
    ///
    /// Submitting after the shop has closed is a caller contract violation
    /// (a customer must not submit after departing); this implementation
    /// rejects such calls instead of blocking them forever.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::ShopClosed`] if the last customer has already
    /// departed. An admitted order is never rejected.
    pub fn submit(&self, order: Order) -> Result<(), ShopError> {
        let mut state = self.state.lock();
        while state.count == self.capacity {
            if state.closed {
                return Err(ShopError::ShopClosed);
            }
            self.not_full.wait(&mut state);
        }
        if state.closed {
            return Err(ShopError::ShopClosed);
        }
        debug!(order_id = order.id, customer = order.customer, depth = state.count + 1, "order queued");
        state.push(order);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Retrieve the oldest order, blocking while the queue is empty and
    /// customers remain. Wakes one customer waiting on the full boundary
    /// when an order is taken. Returns [`Retrieval::ShopClosed`] once the
    /// queue is drained and no customers remain.
    pub fn retrieve(&self) -> Retrieval {
        let mut state = self.state.lock();
        loop {
            if let Some(order) = state.pop() {
                self.not_full.notify_one();
                debug!(order_id = order.id, depth = state.count, "order taken");
                return Retrieval::Order(order);
            }
            if state.closed {
                return Retrieval::ShopClosed;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Record one customer's departure. When the last customer departs the
    /// queue closes and every thread blocked on the empty boundary is woken
    /// so it can observe shutdown.
    pub fn customer_departs(&self) {
        let mut state = self.state.lock();
        state.remaining_customers = state.remaining_customers.saturating_sub(1);
        debug!(remaining = state.remaining_customers, "customer departed");
        if state.remaining_customers == 0 {
            state.closed = true;
            // Waiters on the full boundary are contract violators at this
            // point; wake them too so they observe the rejection.
            self.not_empty.notify_all();
            self.not_full.notify_all();
        }
    }

    /// Number of orders currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().count
    }

    /// True when no orders are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Customers that have not yet departed.
    #[must_use]
    pub fn remaining_customers(&self) -> usize {
        self.state.lock().remaining_customers
    }

    /// Maximum number of outstanding orders.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
