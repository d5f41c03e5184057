//! Static lookup tables: discount types, checkout form fields and
//! shipping methods. No state, no mutation.

pub mod checkout_fields;
pub mod discounts;
pub mod shipping;
