//! Orders, tint requests, and the one-shot completion hand-off.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::config::ShopConfig;
use crate::core::ShopError;

/// Identifier of one pigment on the rack, in `0..pigments`.
pub type PigmentId = usize;

/// A validated, normalized tint request.
///
/// An order carries up to `request_arity` slots; each slot either names a
/// pigment or is `None` ("no preference"). The same pigment may appear in
/// more than one slot. Normalization happens once, at construction: the
/// sorted, deduplicated pigment set is precomputed so acquisition and release
/// touch each distinct pigment exactly once and never need to ask "do I
/// already hold this lock".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TintRequest {
    slots: Vec<Option<PigmentId>>,
    distinct: Vec<PigmentId>,
}

impl TintRequest {
    /// Build a request from raw slots, validating arity and pigment ids
    /// against the session configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidRequest`] if more than `request_arity`
    /// slots are given or any slot names a pigment outside `0..pigments`.
    /// Requests are rejected here, never at acquisition time.
    pub fn new(slots: Vec<Option<PigmentId>>, config: &ShopConfig) -> Result<Self, ShopError> {
        if slots.len() > config.request_arity {
            return Err(ShopError::InvalidRequest(format!(
                "request has {} slots, maximum is {}",
                slots.len(),
                config.request_arity
            )));
        }
        let mut distinct: Vec<PigmentId> = slots.iter().copied().flatten().collect();
        for &id in &distinct {
            if id >= config.pigments {
                return Err(ShopError::InvalidRequest(format!(
                    "pigment id {id} out of range (rack has {})",
                    config.pigments
                )));
            }
        }
        distinct.sort_unstable();
        distinct.dedup();
        Ok(Self { slots, distinct })
    }

    /// The raw slots as submitted, duplicates and blanks included.
    #[must_use]
    pub fn slots(&self) -> &[Option<PigmentId>] {
        &self.slots
    }

    /// The sorted, deduplicated pigment set this request needs.
    #[must_use]
    pub fn distinct(&self) -> &[PigmentId] {
        &self.distinct
    }

    /// True if every slot is "no preference"; such an order needs no
    /// pigment locks at all.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.distinct.is_empty()
    }
}

/// A can filled by staff, handed back to the customer on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledCan {
    /// Order this can fills.
    pub order_id: u64,
    /// Pigments actually dispensed into the can, one entry per distinct
    /// requested pigment.
    pub contents: Vec<PigmentId>,
}

/// The outcome posted through an order's completion handle.
pub type OrderOutcome = Result<FilledCan, ShopError>;

/// One-shot completion slot: single writer (the fulfilling staff thread),
/// single reader (the submitting customer).
type CompletionSlot = Arc<(Mutex<Option<OrderOutcome>>, Condvar)>;

/// Customer-side handle for one submitted order.
///
/// Blocks the holder until staff post the outcome. One-shot: waiting
/// consumes the ticket.
#[derive(Debug)]
pub struct OrderTicket {
    slot: CompletionSlot,
}

impl OrderTicket {
    /// Block until the order is filled (or fails in mixing) and return the
    /// outcome. Waits indefinitely; there is no timeout in a shop session.
    pub fn wait(self) -> OrderOutcome {
        let (lock, cvar) = &*self.slot;
        let mut outcome = lock.lock();
        loop {
            if let Some(result) = outcome.take() {
                return result;
            }
            cvar.wait(&mut outcome);
        }
    }
}

/// A customer's order: the requested tints plus the completion slot the
/// customer blocks on.
///
/// Ownership follows the order through the system: customer → queue → the
/// staff thread that dequeues it. Completion hands the outcome (not the
/// order value) back to the customer through the slot.
#[derive(Debug)]
pub struct Order {
    /// Session-unique order id.
    pub id: u64,
    /// Identifier of the submitting customer.
    pub customer: usize,
    /// Validated tint request.
    pub request: TintRequest,
    completion: CompletionSlot,
}

impl Order {
    /// Create an order and the ticket its customer will wait on.
    #[must_use]
    pub fn new(id: u64, customer: usize, request: TintRequest) -> (Self, OrderTicket) {
        let slot: CompletionSlot = Arc::new((Mutex::new(None), Condvar::new()));
        let ticket = OrderTicket {
            slot: Arc::clone(&slot),
        };
        (
            Self {
                id,
                customer,
                request,
                completion: slot,
            },
            ticket,
        )
    }

    /// Post the outcome and wake the waiting customer. Consumes the order;
    /// the slot is written exactly once.
    pub fn complete(self, outcome: OrderOutcome) {
        let (lock, cvar) = &*self.completion;
        let mut pending = lock.lock();
        *pending = Some(outcome);
        cvar.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn config() -> ShopConfig {
        ShopConfig::new(4, 5, 3)
    }

    #[test]
    fn test_request_normalizes_duplicates() {
        let req = TintRequest::new(vec![Some(2), Some(2), Some(0)], &config()).unwrap();
        assert_eq!(req.distinct(), &[0, 2]);
        assert_eq!(req.slots().len(), 3);
    }

    #[test]
    fn test_request_rejects_out_of_range_pigment() {
        let err = TintRequest::new(vec![Some(5)], &config()).unwrap_err();
        assert!(matches!(err, ShopError::InvalidRequest(_)));
    }

    #[test]
    fn test_request_rejects_excess_arity() {
        let err = TintRequest::new(vec![None; 4], &config()).unwrap_err();
        assert!(matches!(err, ShopError::InvalidRequest(_)));
    }

    #[test]
    fn test_blank_request_has_no_distinct_pigments() {
        let req = TintRequest::new(vec![None, None], &config()).unwrap();
        assert!(req.is_blank());
        assert!(req.distinct().is_empty());
    }

    #[test]
    fn test_ticket_blocks_until_completion() {
        let req = TintRequest::new(vec![Some(1)], &config()).unwrap();
        let (order, ticket) = Order::new(7, 0, req);

        let filler = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            order.complete(Ok(FilledCan {
                order_id: 7,
                contents: vec![1],
            }));
        });

        let can = ticket.wait().unwrap();
        assert_eq!(can.order_id, 7);
        assert_eq!(can.contents, vec![1]);
        filler.join().unwrap();
    }

    #[test]
    fn test_completion_delivers_errors() {
        let req = TintRequest::new(vec![], &config()).unwrap();
        let (order, ticket) = Order::new(9, 1, req);
        order.complete(Err(ShopError::MixFailed {
            order_id: 9,
            reason: "dry well".into(),
        }));
        assert!(matches!(ticket.wait(), Err(ShopError::MixFailed { .. })));
    }
}
