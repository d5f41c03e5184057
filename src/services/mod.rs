//! Async services over the entities. Each service holds a shared database
//! connection and, where it publishes domain events, an event sender.

pub mod carts;
pub mod coupons;
pub mod customers;
pub mod inventory;
pub mod memberships;
pub mod orders;

pub use carts::CartService;
pub use coupons::CouponService;
pub use customers::CustomerService;
pub use inventory::{InventoryService, StockCheck, StockHandler};
pub use memberships::MembershipService;
pub use orders::OrderService;
