use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pricing::discount;

/// A single line item on an order: product or variation, quantity, prices
/// and any per-row promotional discount.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_rows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// Zero when the row is for a plain product rather than a variation.
    pub product_variation_id: i64,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub original_price: Option<Decimal>,
    pub quantity: i32,
    /// VAT rate included in the gross price, e.g. 0.09 or 0.21.
    #[sea_orm(column_type = "Decimal(Some((5, 4)))")]
    pub vat: Decimal,
    #[sea_orm(nullable)]
    pub discount_type: Option<String>,
    pub points_spent: i32,
    pub points_earned: i32,
    /// Flips exactly once, when stock is reduced for this row at order
    /// completion. The caller checks it before reducing.
    pub stock_reduced: bool,
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
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::product_variation::Entity",
        from = "Column::ProductVariationId",
        to = "super::product_variation::Column::Id"
    )]
    ProductVariation,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::product_variation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductVariation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn has_variation(&self) -> bool {
        self.product_variation_id != 0
    }

    /// Stacked discount for this row (zero for plain sales).
    pub fn stacked_discount(&self) -> Decimal {
        discount::stacked(self.discount_type.as_deref(), self.quantity, self.original_price)
    }

    /// Line total: `price * quantity - stacked_discount`.
    pub fn total(&self) -> Decimal {
        let price = self.price.unwrap_or(Decimal::ZERO);
        discount::row_total(price, self.quantity, self.stacked_discount())
    }

    /// Difference between the original and the effective price, per unit.
    pub fn savings(&self) -> Decimal {
        match (self.original_price, self.price) {
            (Some(original), Some(price)) => original - price,
            _ => Decimal::ZERO,
        }
    }

    /// Whether a stacked discount actually applies to this row.
    /// Variation products are excluded from stacked promotions.
    pub fn has_stacked_discount(&self) -> bool {
        if self.has_variation() {
            return false;
        }
        self.stacked_discount() > Decimal::ZERO
    }
}
