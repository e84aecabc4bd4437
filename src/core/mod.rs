//! Core fulfillment engine: orders, the bounded queue, the pigment rack,
//! staff workers, and the shop lifecycle.

pub mod broker;
pub mod error;
pub mod journal;
pub mod mixer;
pub mod order;
pub mod queue;
pub mod rack;
pub mod shop;
pub mod worker;

pub use broker::OrderBroker;
pub use error::{AppResult, ShopError};
pub use journal::{build_order_event, InMemoryJournal, JournalSink, OrderEvent, SharedJournal};
pub use mixer::{BlendMixer, Mixer};
pub use order::{FilledCan, Order, OrderOutcome, OrderTicket, PigmentId, TintRequest};
pub use queue::{OrderQueue, Retrieval};
pub use rack::{PigmentHold, PigmentRack, PigmentWell};
pub use shop::PaintShop;
pub use worker::ShopStats;
