use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::coupon::{self, CouponKind};

/// The fixed-shape discount record embedded in a cart or order.
///
/// Captured at the moment a coupon is applied; never updated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountSnapshot {
    pub id: i64,
    pub code: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    pub free_shipping: bool,
    pub gift_certificate: bool,
    pub coupon_campaign_id: Option<i64>,
    /// Amount as actually applied to an order, for percentage coupons.
    /// Absent on snapshots taken before checkout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_amount: Option<Decimal>,
}

impl DiscountSnapshot {
    /// The value this snapshot contributes to a total: the calculated
    /// amount when one was recorded at checkout, the face amount otherwise.
    pub fn applied_amount(&self) -> Decimal {
        self.calculated_amount.unwrap_or(self.amount)
    }
}

impl From<&coupon::Model> for DiscountSnapshot {
    fn from(coupon: &coupon::Model) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code.clone(),
            amount: coupon.amount,
            kind: coupon.kind,
            free_shipping: coupon.free_shipping,
            gift_certificate: coupon.is_gift_certificate,
            coupon_campaign_id: coupon.coupon_campaign_id,
            calculated_amount: None,
        }
    }
}
