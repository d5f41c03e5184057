use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shipping choice stored on an order, as picked at checkout.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ShippingInfo {
    /// Method key, e.g. `evening-delivery` or `pickup`.
    pub key: String,
    /// Display name of the method.
    pub name: String,
    /// Method slug used for delivery-window lookups.
    pub slug: String,
    /// Shipping price before formatting.
    #[serde(default)]
    pub price_raw: Decimal,
}
