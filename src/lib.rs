//! Smokehouse commerce domain layer.
//!
//! Models carts, orders, coupons, products, stock, memberships and
//! payments for the Smokehouse web store, and computes the derived
//! business values: subtotals, VAT splits, stacked and coupon discounts,
//! free-shipping eligibility and loyalty points.
//!
//! The pricing rules live in [`pricing`] as pure functions over entity
//! data; the [`services`] layer wires them to the database and publishes
//! domain [`events`].

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod models;
pub mod pricing;
pub mod services;

pub use config::{load_config, AppConfig, PricingConfig};
pub use errors::ServiceError;
pub use events::{Event, EventSender};
