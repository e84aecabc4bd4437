//! Configuration models for the shop session.

pub mod shop;

pub use shop::ShopConfig;
