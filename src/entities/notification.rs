use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STOCK_WARNING: &str = "stock_warning";

/// Back-office notification. Stock warnings reference the product or
/// variation that ran low via `object_id`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub object_id: i64,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub message: String,
    #[sea_orm(nullable)]
    pub data: Option<Json>,
    pub dismissed: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_stock_warning(&self) -> bool {
        self.kind == STOCK_WARNING
    }
}
