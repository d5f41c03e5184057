use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment attached to an order. Amounts are stored in cents, the way the
/// gateway reports them; the accessors convert to euros.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub amount_cents: i64,
    pub transaction_cost_cents: i64,
    pub status: String,
    pub method: String,
    pub is_recurring: bool,
    #[sea_orm(nullable)]
    pub transaction_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(has_one = "super::membership::Entity")]
    Membership,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membership.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.amount_cents) / Decimal::from(100)
    }

    pub fn transaction_cost(&self) -> Decimal {
        Decimal::from(self.transaction_cost_cents) / Decimal::from(100)
    }

    pub fn is_bank_transfer(&self) -> bool {
        self.method == "bank-transfer" || self.method == "banktrans"
    }
}

/// Maps gateway status vocabulary onto payment statuses.
pub fn translate_status(status: &str) -> &str {
    match status {
        "initialized" => "open",
        "uncleared" => "on-hold",
        "completed" | "shipped" => "paid",
        "declined" | "void" => "cancelled",
        "refund" | "chargedback" | "partial_refunded" => "refund",
        other => other,
    }
}
