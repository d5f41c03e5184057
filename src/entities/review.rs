use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product review. The reviewer can be a typed-in name, a registered user
/// or the customer of the order the review came in on.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub product_id: i64,
    #[sea_orm(nullable)]
    pub user_id: Option<i64>,
    #[sea_orm(nullable)]
    pub order_id: Option<i64>,
    #[sea_orm(nullable)]
    pub name: Option<String>,
    pub rating: i16,
    pub body: String,
    /// Moderation flag; only valid reviews are shown.
    pub valid: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The name to show with the review: the typed-in name when present,
    /// otherwise the caller passes whatever the linked user or order
    /// customer resolves to.
    pub fn reviewer_name(&self, fallback: Option<&str>) -> String {
        self.name
            .clone()
            .or_else(|| fallback.map(str::to_string))
            .unwrap_or_default()
    }
}
