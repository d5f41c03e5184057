//! Pure pricing computation: no database access, no side effects.
//!
//! The services fetch rows and snapshots, then hand them to these functions.
//! Store-specific thresholds and special product ids come in through
//! [`crate::config::PricingConfig`].

pub mod discount;
pub mod points;
pub mod policy;
pub mod price;
pub mod totals;
