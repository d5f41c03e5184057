use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::shipping;
use crate::models::{DiscountSnapshot, ShippingInfo};

/// A cart/order: the same record is a "cart" while unpaid and an "order"
/// after checkout, distinguished by status.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub status: OrderStatus,
    #[sea_orm(nullable)]
    pub customer_id: Option<i64>,
    #[sea_orm(nullable)]
    pub affiliate_id: Option<i64>,
    /// Sequential number assigned at checkout; carts have none.
    #[sea_orm(nullable)]
    pub order_number: Option<i64>,
    pub source_id: i32,
    #[sea_orm(column_type = "Json", nullable)]
    pub shipping_info: Option<Json>,
    /// Ordered list of applied discount snapshots.
    #[sea_orm(column_type = "Json", nullable)]
    pub applied_discount: Option<Json>,
    #[sea_orm(nullable)]
    pub delivery_day: Option<DateTimeUtc>,
    pub buyer_notifications_sent: bool,
    pub seller_notifications_sent: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_row::Entity")]
    Rows,
    #[sea_orm(has_one = "super::payment::Entity")]
    Payment,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::affiliate::Entity",
        from = "Column::AffiliateId",
        to = "super::affiliate::Column::Id"
    )]
    Affiliate,
}

impl Related<super::order_row::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rows.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::affiliate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Affiliate.def()
    }
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        super::coupon_order::Relation::Coupon.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::coupon_order::Relation::Order.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "cart")]
    Cart,
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "on-hold")]
    OnHold,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "canceled")]
    Canceled,
    #[sea_orm(string_value = "refund")]
    Refund,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl OrderStatus {
    pub fn readable(&self) -> &'static str {
        match self {
            OrderStatus::Cart => "Winkelwagen",
            OrderStatus::New => "Nieuw",
            OrderStatus::Open => "Open",
            OrderStatus::Processing => "In behandeling",
            OrderStatus::OnHold => "In de wacht",
            OrderStatus::Completed => "Voltooid",
            OrderStatus::Canceled => "Geannuleerd",
            OrderStatus::Refund => "(deels) terugbetaald",
            OrderStatus::Failed => "Mislukt",
        }
    }
}

/// Order source channels.
pub fn sources() -> &'static [(i32, &'static str)] {
    &[(1, "smokehouse.nl"), (2, "paymentlink")]
}

/// Source id for a channel name; unknown channels fall back to the
/// storefront itself.
pub fn source_id(name: Option<&str>) -> i32 {
    name.and_then(|name| {
        sources()
            .iter()
            .find(|(_, source)| *source == name)
            .map(|(id, _)| *id)
    })
    .unwrap_or(1)
}

impl Model {
    /// Parsed shipping choice, or `None` when no method was picked yet.
    pub fn shipping(&self) -> Option<ShippingInfo> {
        self.shipping_info
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }

    pub fn shipping_method(&self) -> String {
        self.shipping()
            .map(|info| info.name)
            .unwrap_or_else(|| "Onbekend".to_string())
    }

    /// Courier handling this order, derived from the shipping key.
    pub fn courier(&self) -> Option<String> {
        self.shipping()
            .map(|info| shipping::courier_for(&info.key).to_string())
    }

    /// The applied discount snapshots; an absent column is an empty list.
    pub fn discounts(&self) -> Vec<DiscountSnapshot> {
        self.applied_discount
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Whether buyer or seller mail is still due for this order.
    pub fn has_open_notifications(&self) -> bool {
        !self.buyer_notifications_sent || !self.seller_notifications_sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn order() -> Model {
        Model {
            id: 1,
            status: OrderStatus::Open,
            customer_id: Some(5),
            affiliate_id: None,
            order_number: Some(1001),
            source_id: 1,
            shipping_info: None,
            applied_discount: None,
            delivery_day: None,
            buyer_notifications_sent: false,
            seller_notifications_sent: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_shipping_info_reads_as_none() {
        let order = order();
        assert!(order.shipping().is_none());
        assert_eq!(order.shipping_method(), "Onbekend");
        assert!(order.courier().is_none());
    }

    #[test]
    fn shipping_key_resolves_to_courier() {
        let mut order = order();
        order.shipping_info = Some(json!({
            "key": "evening-delivery",
            "name": "Avondbezorging",
            "slug": "evening-delivery",
            "price_raw": "6.95"
        }));
        assert_eq!(order.courier().as_deref(), Some("trunkrs-evening"));
        assert_eq!(order.shipping_method(), "Avondbezorging");
    }

    #[test]
    fn discounts_default_to_empty() {
        assert!(order().discounts().is_empty());
    }

    #[test]
    fn notification_flags() {
        let mut order = order();
        assert!(order.has_open_notifications());
        order.buyer_notifications_sent = true;
        order.seller_notifications_sent = true;
        assert!(!order.has_open_notifications());
    }

    #[test]
    fn unknown_source_falls_back_to_storefront() {
        assert_eq!(source_id(Some("paymentlink")), 2);
        assert_eq!(source_id(Some("marketplace")), 1);
        assert_eq!(source_id(None), 1);
    }
}
