use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Coupon definition. Percentage coupons apply to the discount-applicable
/// subtotal; fixed ones subtract their face amount.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_name = "type")]
    pub kind: CouponKind,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub minimal_amount: Option<Decimal>,
    #[sea_orm(nullable)]
    pub valid_from: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub valid_through: Option<DateTimeUtc>,
    /// Allowed redemptions; zero means unlimited.
    pub usage: i32,
    pub used: i32,
    pub is_gift_certificate: bool,
    pub free_shipping: bool,
    #[sea_orm(nullable)]
    pub coupon_campaign_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::coupon_campaign::Entity",
        from = "Column::CouponCampaignId",
        to = "super::coupon_campaign::Column::Id"
    )]
    Campaign,
}

impl Related<super::coupon_campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        super::coupon_order::Relation::Order.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::coupon_order::Relation::Coupon.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

/// Redemption state of a coupon on a specific order, kept on the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum CouponState {
    /// Purchased as a gift certificate in this order.
    Bought = 1,
    /// Spent on this order.
    Redeemed = 2,
    /// Partially spent; the remainder was reissued.
    Remaining = 3,
    /// Earned through a campaign attached to this order.
    Earned = 4,
}

impl CouponState {
    pub fn from_value(value: i16) -> Option<Self> {
        match value {
            1 => Some(CouponState::Bought),
            2 => Some(CouponState::Redeemed),
            3 => Some(CouponState::Remaining),
            4 => Some(CouponState::Earned),
            _ => None,
        }
    }

    /// States in which the certificate can still be printed and handed out.
    pub fn printable(&self) -> bool {
        !matches!(self, CouponState::Redeemed)
    }
}

impl Model {
    /// Whether the coupon may be redeemed at `now`: inside the validity
    /// window and with redemptions left.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if let Some(from) = self.valid_from {
            if now < from {
                return false;
            }
        }
        if let Some(through) = self.valid_through {
            if now > through {
                return false;
            }
        }
        self.usage == 0 || self.used < self.usage
    }

    pub fn remaining_uses(&self) -> Option<i32> {
        if self.usage == 0 {
            None
        } else {
            Some((self.usage - self.used).max(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn coupon() -> Model {
        Model {
            id: 9,
            code: "WELKOM10".into(),
            kind: CouponKind::Percentage,
            amount: dec!(10),
            minimal_amount: None,
            valid_from: None,
            valid_through: None,
            usage: 0,
            used: 0,
            is_gift_certificate: false,
            free_shipping: false,
            coupon_campaign_id: None,
        }
    }

    #[test]
    fn open_ended_coupon_is_always_valid() {
        assert!(coupon().is_valid_at(Utc::now()));
    }

    #[test]
    fn validity_window_is_inclusive_of_bounds() {
        let now = Utc::now();
        let mut coupon = coupon();
        coupon.valid_from = Some(now - Duration::days(1));
        coupon.valid_through = Some(now + Duration::days(1));
        assert!(coupon.is_valid_at(now));
        assert!(!coupon.is_valid_at(now + Duration::days(2)));
        assert!(!coupon.is_valid_at(now - Duration::days(2)));
    }

    #[test]
    fn usage_cap_blocks_redemption() {
        let mut coupon = coupon();
        coupon.usage = 2;
        coupon.used = 2;
        assert!(!coupon.is_valid_at(Utc::now()));
        assert_eq!(coupon.remaining_uses(), Some(0));
    }

    #[test]
    fn unlimited_usage_has_no_remaining_count() {
        assert_eq!(coupon().remaining_uses(), None);
    }

    #[test]
    fn redeemed_certificates_are_not_printable() {
        assert!(CouponState::Bought.printable());
        assert!(CouponState::Remaining.printable());
        assert!(CouponState::Earned.printable());
        assert!(!CouponState::Redeemed.printable());
    }

    #[test]
    fn state_round_trips_through_pivot_values() {
        for value in 1..=4 {
            let state = CouponState::from_value(value).expect("known state");
            assert_eq!(state as i16, value);
        }
        assert!(CouponState::from_value(9).is_none());
    }
}
