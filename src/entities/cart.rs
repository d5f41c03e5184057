use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::CartData;

/// Persisted cart. The row payload and discount snapshots live in JSON
/// columns; [`CartData`] is the typed view over them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Order this cart will become on checkout.
    #[sea_orm(nullable)]
    pub order_id: Option<i64>,
    pub rows: Json,
    pub discounts: Json,
    pub analytics: Json,
    pub utm_tags: Json,
    pub agent: String,
    /// Stale carts past this moment are eligible for cleanup.
    pub delete_after: DateTimeUtc,
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
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Deserializes the JSON payload into the typed cart document.
    pub fn data(&self) -> Result<CartData, serde_json::Error> {
        Ok(CartData {
            id: self.id,
            order_id: self.order_id,
            rows: serde_json::from_value(self.rows.clone())?,
            discounts: serde_json::from_value(self.discounts.clone())?,
            analytics: self.analytics.clone(),
            utm_tags: self.utm_tags.clone(),
            agent: self.agent.clone(),
            delete_after: self.delete_after,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
