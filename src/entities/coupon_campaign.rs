use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Campaign that hands out coupons. Campaigns sourced from the external
/// API feed the certificate rectification total on order exports.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupon_campaign")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Origin of the campaign, e.g. "api" or "store".
    pub source: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::coupon::Entity")]
    Coupons,
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coupons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_api_sourced(&self) -> bool {
        self.source == "api"
    }
}
