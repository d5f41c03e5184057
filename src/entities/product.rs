use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sellable product. Products without variations carry their own stock;
/// products with variations sum the stock of their variations.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(nullable)]
    pub subtitle: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub price: Decimal,
    pub stock: i64,
    /// Remaining stock at which a warning notification goes out.
    #[sea_orm(nullable)]
    pub stock_threshold: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_variation::Entity")]
    Variations,
    #[sea_orm(has_many = "super::order_row::Entity")]
    OrderRows,
}

impl Related<super::product_variation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variations.def()
    }
}

impl Related<super::order_row::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderRows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Title with the subtitle appended when one is set.
    pub fn display_title(&self) -> String {
        match self.subtitle.as_deref().filter(|s| !s.is_empty()) {
            Some(subtitle) => format!("{} {}", self.title, subtitle),
            None => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn display_title_appends_subtitle() {
        let mut product = Model {
            id: 1,
            title: "Picanha".into(),
            subtitle: Some("Black Angus".into()),
            price: dec!(24.95),
            stock: 10,
            stock_threshold: Some(5),
        };
        assert_eq!(product.display_title(), "Picanha Black Angus");
        product.subtitle = None;
        assert_eq!(product.display_title(), "Picanha");
        product.subtitle = Some(String::new());
        assert_eq!(product.display_title(), "Picanha");
    }
}
