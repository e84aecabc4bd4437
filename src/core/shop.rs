//! Shop session lifecycle.

use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::ShopConfig;
use crate::core::broker::OrderBroker;
use crate::core::journal::SharedJournal;
use crate::core::mixer::{BlendMixer, Mixer};
use crate::core::order::{FilledCan, OrderTicket, PigmentId, TintRequest};
use crate::core::queue::OrderQueue;
use crate::core::rack::PigmentRack;
use crate::core::worker::{spawn_staff, ShopCounters, ShopStats};
use crate::core::ShopError;

/// One open shop session: the bounded order queue, the pigment rack, the
/// broker, and the staff threads draining the queue.
///
/// `open` allocates everything (queue empty, all pigments available, the
/// full customer population expected) and spawns the staff. The session ends
/// when every customer has departed; `close` then joins the staff and
/// returns the session statistics.
pub struct PaintShop {
    config: ShopConfig,
    rack: Arc<PigmentRack>,
    broker: OrderBroker,
    counters: Arc<ShopCounters>,
    staff: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for PaintShop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintShop")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PaintShop {
    /// Open a shop with the default [`BlendMixer`] and no journal.
    ///
    /// # Errors
    ///
    /// [`ShopError::InvalidConfig`] if any configured bound is zero, or if a
    /// staff thread cannot be spawned.
    pub fn open(config: ShopConfig) -> Result<Self, ShopError> {
        Self::open_with(config, Arc::new(BlendMixer), None)
    }

    /// Open a shop with a caller-supplied mixer and optional journal sink.
    ///
    /// # Errors
    ///
    /// [`ShopError::InvalidConfig`] if any configured bound is zero, or if a
    /// staff thread cannot be spawned.
    pub fn open_with(
        config: ShopConfig,
        mixer: Arc<dyn Mixer>,
        journal: Option<SharedJournal>,
    ) -> Result<Self, ShopError> {
        config.validate().map_err(ShopError::InvalidConfig)?;

        let queue = Arc::new(OrderQueue::new(config.customers));
        let rack = Arc::new(PigmentRack::new(config.pigments));
        let counters = Arc::new(ShopCounters::default());
        let broker = OrderBroker::new(Arc::clone(&queue), Arc::clone(&counters), journal.clone());

        let mut staff = Vec::with_capacity(config.staff);
        for staff_id in 0..config.staff {
            let handle = spawn_staff(
                staff_id,
                Arc::clone(&queue),
                Arc::clone(&rack),
                Arc::clone(&mixer),
                Arc::clone(&counters),
                journal.clone(),
            )
            .map_err(|e| ShopError::InvalidConfig(format!("failed to spawn staff: {e}")))?;
            staff.push(handle);
        }

        info!(
            customers = config.customers,
            pigments = config.pigments,
            request_arity = config.request_arity,
            staff = config.staff,
            "paint shop open"
        );

        Ok(Self {
            config,
            rack,
            broker,
            counters,
            staff: Mutex::new(staff),
        })
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    /// The shared pigment rack, for availability inspection.
    #[must_use]
    pub fn rack(&self) -> &PigmentRack {
        &self.rack
    }

    /// The order broker for this session.
    #[must_use]
    pub fn broker(&self) -> &OrderBroker {
        &self.broker
    }

    /// Validate raw slots against this session and build a request.
    ///
    /// # Errors
    ///
    /// [`ShopError::InvalidRequest`] on excess arity or unknown pigment ids.
    pub fn request(&self, slots: Vec<Option<PigmentId>>) -> Result<TintRequest, ShopError> {
        TintRequest::new(slots, &self.config)
    }

    /// Customer round trip: submit and block until the can comes back.
    ///
    /// # Errors
    ///
    /// Request validation failures, [`ShopError::ShopClosed`] after
    /// shutdown, or the order's mixing failure.
    pub fn place_order(
        &self,
        customer: usize,
        slots: Vec<Option<PigmentId>>,
    ) -> Result<FilledCan, ShopError> {
        let request = self.request(slots)?;
        self.broker.place_order(customer, request)
    }

    /// Submit without waiting; the returned ticket blocks on completion.
    ///
    /// # Errors
    ///
    /// Request validation failures or [`ShopError::ShopClosed`].
    pub fn submit_order(
        &self,
        customer: usize,
        slots: Vec<Option<PigmentId>>,
    ) -> Result<OrderTicket, ShopError> {
        let request = self.request(slots)?;
        self.broker.submit_order(customer, request)
    }

    /// Record one customer's departure; the last departure closes the shop.
    pub fn customer_departs(&self, customer: usize) {
        self.broker.customer_departs(customer);
    }

    /// Snapshot of session statistics.
    #[must_use]
    pub fn stats(&self) -> ShopStats {
        self.counters.snapshot(self.config.staff)
    }

    /// Close the shop: join every staff thread and return the session
    /// statistics.
    ///
    /// Only valid after every customer has departed; staff exit only on the
    /// terminal queue signal, so an early call blocks until the remaining
    /// customers do depart.
    pub fn close(self) -> ShopStats {
        let handles: Vec<JoinHandle<()>> = self.staff.lock().drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                warn!("staff thread panicked during session");
            }
        }
        let stats = self.counters.snapshot(self.config.staff);
        info!(
            filled = stats.orders_filled,
            failed = stats.orders_failed,
            "paint shop closed"
        );
        stats
    }
}
