//! Order journal sinks.
//!
//! An optional trail of shop events (submit, fill, fail, depart) for
//! per-session reporting, kept out of the hot paths behind a shared sink.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::clock::now_ms;

/// One recorded shop event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Unique event identifier.
    pub event_id: String,
    /// Related order identifier, if any.
    pub order_id: Option<u64>,
    /// Customer involved, if any.
    pub customer: Option<usize>,
    /// Action taken (submit, fill, fail, depart).
    pub action: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Journal sink abstraction.
pub trait JournalSink: Send {
    /// Record a shop event.
    fn record(&mut self, event: OrderEvent);
}

/// Shared handle to a journal sink, attachable to a shop session.
pub type SharedJournal = Arc<Mutex<dyn JournalSink>>;

/// In-memory journal for testing and dev.
pub struct InMemoryJournal {
    events: VecDeque<OrderEvent>,
    max_events: usize,
}

impl InMemoryJournal {
    /// Create a new in-memory journal with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<OrderEvent> {
        self.events.iter().cloned().collect()
    }
}

impl JournalSink for InMemoryJournal {
    fn record(&mut self, event: OrderEvent) {
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build a journal event from context.
#[must_use]
pub fn build_order_event(
    order_id: Option<u64>,
    customer: Option<usize>,
    action: impl Into<String>,
    detail: Option<String>,
) -> OrderEvent {
    OrderEvent {
        event_id: Uuid::new_v4().to_string(),
        order_id,
        customer,
        action: action.into(),
        created_at_ms: now_ms(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_keeps_bounded_history() {
        let mut journal = InMemoryJournal::new(2);
        for i in 0..3 {
            journal.record(build_order_event(Some(i), Some(0), "submit", None));
        }
        let events = journal.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].order_id, Some(1));
        assert_eq!(events[1].order_id, Some(2));
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = build_order_event(None, None, "depart", None);
        let b = build_order_event(None, None, "depart", None);
        assert_ne!(a.event_id, b.event_id);
    }
}
