//! # Paintshop
//!
//! A bounded-queue order-fulfillment engine with multi-resource acquisition
//! under contention.
//!
//! A shop session accepts concurrently submitted paint orders, each naming a
//! small multiset of pigments. Customer threads block on a fixed-capacity
//! FIFO queue; staff threads drain it, take exclusive holds over exactly the
//! pigments each order needs, mix, release, and wake the waiting customer.
//! When the last customer departs, staff blocked on the empty queue observe
//! a terminal signal and exit.
//!
//! ## The hard parts
//!
//! - **Bounded hand-off**: the order queue blocks on both ends — customers
//!   on the full boundary, staff on the empty boundary — with targeted wakes
//!   across each boundary and a broadcast only for final shutdown.
//! - **All-or-nothing pigment acquisition**: feasibility is tested and
//!   committed under one coarse table guard, so a staff thread either takes
//!   its whole pigment set or blocks holding none of it. Duplicate pigment
//!   ids in an order are normalized away at request construction, so no
//!   thread can block on a lock it already holds.
//! - **Coordinated shutdown**: an explicit closed flag under the same guard
//!   as the empty-queue predicate, broadcast to every blocked retriever.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::thread;
//!
//! use paintshop::config::ShopConfig;
//! use paintshop::core::PaintShop;
//!
//! let shop = Arc::new(PaintShop::open(ShopConfig::new(2, 4, 3)).unwrap());
//!
//! let handles: Vec<_> = (0..2)
//!     .map(|customer| {
//!         let shop = Arc::clone(&shop);
//!         thread::spawn(move || {
//!             let can = shop.place_order(customer, vec![Some(0), Some(1)]).unwrap();
//!             shop.customer_departs(customer);
//!             can
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! let shop = Arc::into_inner(shop).unwrap();
//! let stats = shop.close();
//! assert_eq!(stats.orders_filled, 2);
//! ```
//!
//! Acquisition has no cross-request fairness: when pigments free up, any
//! blocked staff thread whose whole set became available may win. Orders
//! needing large or popular pigment sets can be starved under adversarial
//! scheduling; this is an accepted property of the broadcast-and-retest
//! design, not a bug.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all)]

/// Core fulfillment engine: queue, rack, broker, workers, lifecycle.
pub mod core;
/// Configuration models for a shop session.
pub mod config;
/// Shared utilities.
pub mod util;
