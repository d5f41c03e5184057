//! Value objects embedded in carts and orders.
//!
//! Discounts live on the order as an immutable snapshot list rather than a
//! live foreign key, so historical amounts stay stable even when the coupon
//! definition later changes.

mod cart_data;
mod discount_snapshot;
mod shipping_info;

pub use cart_data::{CartData, CartRow};
pub use discount_snapshot::DiscountSnapshot;
pub use shipping_info::ShippingInfo;
