use crate::{
    config::PricingConfig,
    entities::{
        notification::{self, Entity as Notification, STOCK_WARNING},
        product::{self, Entity as Product},
        product_variation::{self, Entity as ProductVariation},
        OrderRowModel, ProductModel, ProductVariationModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{instrument, warn};

/// What a stock handler points at. `Dummy` stands in for a dangling
/// reference (deleted product or variation) so totals code never crashes.
#[derive(Clone, Debug)]
pub enum StockTarget {
    Product(ProductModel),
    Variation {
        variation: ProductVariationModel,
        product_title: String,
    },
    Dummy {
        product_id: i64,
        description: String,
    },
}

impl StockTarget {
    fn product_id(&self) -> i64 {
        match self {
            StockTarget::Product(product) => product.id,
            StockTarget::Variation { variation, .. } => variation.product_id,
            StockTarget::Dummy { product_id, .. } => *product_id,
        }
    }

    /// The id a warning notification is keyed on: the variation id for
    /// variations, the product id otherwise.
    fn object_id(&self) -> i64 {
        match self {
            StockTarget::Product(product) => product.id,
            StockTarget::Variation { variation, .. } => variation.id,
            StockTarget::Dummy { product_id, .. } => *product_id,
        }
    }

    fn title(&self) -> String {
        match self {
            StockTarget::Product(product) => product.display_title(),
            StockTarget::Variation {
                variation,
                product_title,
            } => variation.title(product_title),
            StockTarget::Dummy { description, .. } => description.clone(),
        }
    }

    fn mode(&self) -> &'static str {
        match self {
            StockTarget::Product(_) => "product",
            StockTarget::Variation { .. } => "variation",
            StockTarget::Dummy { .. } => "dummy",
        }
    }
}

/// Outcome of a stock check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StockCheck {
    Available { remaining: i64 },
    Insufficient { message: String, remaining_stock: i64 },
}

impl StockCheck {
    pub fn is_available(&self) -> bool {
        matches!(self, StockCheck::Available { .. })
    }
}

/// Mutates the stock counter of a single product or variation.
///
/// Reductions do not clamp at zero; oversold stock shows up as a negative
/// counter. Idempotency is the caller's job (the `stock_reduced` row flag).
pub struct StockHandler {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    default_threshold: i64,
    target: StockTarget,
}

impl StockHandler {
    /// Fresh stock count, read straight from the database.
    pub async fn current(&self) -> Result<i64, ServiceError> {
        match &self.target {
            StockTarget::Product(product) => Ok(Product::find_by_id(product.id)
                .one(&*self.db)
                .await?
                .map(|p| p.stock)
                .unwrap_or(0)),
            StockTarget::Variation { variation, .. } => {
                Ok(ProductVariation::find_by_id(variation.id)
                    .one(&*self.db)
                    .await?
                    .map(|v| v.stock)
                    .unwrap_or(0))
            }
            StockTarget::Dummy { .. } => Ok(0),
        }
    }

    /// Total sellable stock: a product with variations sums them.
    pub async fn total(&self) -> Result<i64, ServiceError> {
        match &self.target {
            StockTarget::Product(product) => {
                let variations = ProductVariation::find()
                    .filter(product_variation::Column::ProductId.eq(product.id))
                    .filter(product_variation::Column::DeletedAt.is_null())
                    .all(&*self.db)
                    .await?;
                if variations.is_empty() {
                    self.current().await
                } else {
                    Ok(variations.iter().map(|v| v.stock).sum())
                }
            }
            _ => self.current().await,
        }
    }

    /// Subtracts from stock, without clamping at zero.
    #[instrument(skip(self))]
    pub async fn reduce(&self, amount: i64) -> Result<(), ServiceError> {
        if let StockTarget::Dummy { .. } = self.target {
            warn!(
                product_id = self.target.product_id(),
                "Stock reduction on a missing product"
            );
            self.create_warning(0).await?;
            return Ok(());
        }

        let stock = self.current().await? - amount.abs();
        self.store(stock).await?;

        self.event_sender
            .send_or_log(Event::StockReduced {
                product_id: self.target.product_id(),
                variation_id: match &self.target {
                    StockTarget::Variation { variation, .. } => Some(variation.id),
                    _ => None,
                },
                remaining: stock,
            })
            .await;

        self.create_warning(stock).await?;
        Ok(())
    }

    /// Adds to stock. No warning re-evaluation; restocking never lowers
    /// the counter.
    #[instrument(skip(self))]
    pub async fn add(&self, amount: i64) -> Result<(), ServiceError> {
        if let StockTarget::Dummy { .. } = self.target {
            return Ok(());
        }
        let stock = self.current().await? + amount.abs();
        self.store(stock).await
    }

    /// Overwrites the counter and re-evaluates the low-stock warning.
    #[instrument(skip(self))]
    pub async fn set(&self, amount: i64) -> Result<(), ServiceError> {
        if let StockTarget::Dummy { .. } = self.target {
            return Ok(());
        }
        let stock = amount.abs();
        self.store(stock).await?;
        self.create_warning(stock).await
    }

    /// Checks whether one more unit fits on top of what a cart already
    /// holds, against the target's own counter. When the remaining stock
    /// exactly equals the cart quantity, the message notes that those
    /// units are already in the cart.
    #[instrument(skip(self))]
    pub async fn check(&self, in_cart: i64) -> Result<StockCheck, ServiceError> {
        let remaining = self.current().await?;
        if remaining > in_cart {
            return Ok(StockCheck::Available { remaining });
        }

        let mut message = format!(
            "We hebben helaas {} stuks van {} op voorraad",
            remaining,
            self.target.title()
        );
        if remaining == in_cart {
            message.push_str(" en deze zitten al in je winkelwagentje.");
        }
        Ok(StockCheck::Insufficient {
            message,
            remaining_stock: remaining,
        })
    }

    async fn store(&self, stock: i64) -> Result<(), ServiceError> {
        match &self.target {
            StockTarget::Product(product) => {
                let mut active: product::ActiveModel = product.clone().into();
                active.stock = Set(stock);
                active.update(&*self.db).await?;
            }
            StockTarget::Variation { variation, .. } => {
                let mut active: product_variation::ActiveModel = variation.clone().into();
                active.stock = Set(stock);
                active.update(&*self.db).await?;
            }
            StockTarget::Dummy { .. } => {}
        }
        Ok(())
    }

    async fn threshold(&self) -> Result<i64, ServiceError> {
        let configured = match &self.target {
            StockTarget::Product(product) => product.stock_threshold,
            StockTarget::Variation { variation, .. } => match variation.stock_threshold {
                Some(threshold) => Some(threshold),
                None => Product::find_by_id(variation.product_id)
                    .one(&*self.db)
                    .await?
                    .and_then(|p| p.stock_threshold),
            },
            StockTarget::Dummy { .. } => None,
        };
        Ok(configured.unwrap_or(self.default_threshold))
    }

    /// Creates or refreshes the undismissed low-stock notification for this
    /// target when the counter is at or below its threshold.
    async fn create_warning(&self, stock: i64) -> Result<(), ServiceError> {
        if stock > self.threshold().await? {
            return Ok(());
        }

        let state = warning_state(&self.target, stock);
        let level = if stock > 0 { "warning" } else { "danger" };
        let message = format!("{} is {}", self.target.title(), state);
        let data = json!({
            "type": self.target.mode(),
            "product_id": self.target.product_id(),
            "level": level,
        });

        let existing = Notification::find()
            .filter(notification::Column::ObjectId.eq(self.target.object_id()))
            .filter(notification::Column::Dismissed.eq(false))
            .filter(notification::Column::Kind.eq(STOCK_WARNING))
            .one(&*self.db)
            .await?;

        let now = Utc::now();
        match existing {
            Some(existing) => {
                let mut active: notification::ActiveModel = existing.into();
                active.message = Set(message);
                active.data = Set(Some(data));
                active.updated_at = Set(now);
                active.update(&*self.db).await?;
            }
            None => {
                let active = notification::ActiveModel {
                    object_id: Set(self.target.object_id()),
                    kind: Set(STOCK_WARNING.to_string()),
                    message: Set(message),
                    data: Set(Some(data)),
                    dismissed: Set(false),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active.insert(&*self.db).await?;
            }
        }

        self.event_sender
            .send_or_log(Event::LowStock {
                product_id: self.target.product_id(),
                remaining: stock,
            })
            .await;
        Ok(())
    }
}

fn warning_state(target: &StockTarget, stock: i64) -> String {
    if let StockTarget::Dummy { .. } = target {
        return "uitverkocht of niet beschikbaar.".to_string();
    }
    if stock > 0 {
        format!("bijna uitverkocht (nog {} op voorraad)", stock)
    } else {
        "uitverkocht".to_string()
    }
}

/// Builds [`StockHandler`]s for rows, products and variations.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    pricing: Arc<PricingConfig>,
}

impl InventoryService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        pricing: Arc<PricingConfig>,
    ) -> Self {
        Self {
            db,
            event_sender,
            pricing,
        }
    }

    fn handler(&self, target: StockTarget) -> StockHandler {
        StockHandler {
            db: self.db.clone(),
            event_sender: self.event_sender.clone(),
            default_threshold: self.pricing.low_stock_threshold,
            target,
        }
    }

    /// Handler for whatever an order row points at; a dummy handler when
    /// the product or variation no longer exists.
    pub async fn handler_for_row(&self, row: &OrderRowModel) -> Result<StockHandler, ServiceError> {
        if row.has_variation() {
            if let Some(variation) = ProductVariation::find_by_id(row.product_variation_id)
                .one(&*self.db)
                .await?
            {
                let product_title = Product::find_by_id(variation.product_id)
                    .one(&*self.db)
                    .await?
                    .map(|p| p.display_title())
                    .unwrap_or_else(|| row.description.clone());
                return Ok(self.handler(StockTarget::Variation {
                    variation,
                    product_title,
                }));
            }
        } else if let Some(product) = Product::find_by_id(row.product_id).one(&*self.db).await? {
            return Ok(self.handler(StockTarget::Product(product)));
        }

        warn!(
            product_id = row.product_id,
            variation_id = row.product_variation_id,
            "Order row references missing stockable, using dummy handler"
        );
        Ok(self.handler(StockTarget::Dummy {
            product_id: row.product_id,
            description: row.description.clone(),
        }))
    }

    pub async fn handler_for_product(&self, product_id: i64) -> Result<StockHandler, ServiceError> {
        match Product::find_by_id(product_id).one(&*self.db).await? {
            Some(product) => Ok(self.handler(StockTarget::Product(product))),
            None => Ok(self.handler(StockTarget::Dummy {
                product_id,
                description: format!("Product {}", product_id),
            })),
        }
    }

    pub async fn handler_for_variation(
        &self,
        variation_id: i64,
    ) -> Result<StockHandler, ServiceError> {
        let Some(variation) = ProductVariation::find_by_id(variation_id)
            .one(&*self.db)
            .await?
        else {
            return Ok(self.handler(StockTarget::Dummy {
                product_id: 0,
                description: format!("Variatie {}", variation_id),
            }));
        };
        let product_title = Product::find_by_id(variation.product_id)
            .one(&*self.db)
            .await?
            .map(|p| p.display_title())
            .unwrap_or_default();
        Ok(self.handler(StockTarget::Variation {
            variation,
            product_title,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(stock: i64) -> ProductModel {
        ProductModel {
            id: 42,
            title: "Picanha".into(),
            subtitle: None,
            price: dec!(24.95),
            stock,
            stock_threshold: Some(5),
        }
    }

    #[test]
    fn warning_states_read_in_dutch() {
        let target = StockTarget::Product(product(3));
        assert_eq!(warning_state(&target, 3), "bijna uitverkocht (nog 3 op voorraad)");
        assert_eq!(warning_state(&target, 0), "uitverkocht");
        assert_eq!(warning_state(&target, -2), "uitverkocht");

        let dummy = StockTarget::Dummy {
            product_id: 42,
            description: "Picanha".into(),
        };
        assert_eq!(warning_state(&dummy, 0), "uitverkocht of niet beschikbaar.");
    }

    #[test]
    fn target_ids_resolve_per_mode() {
        let variation = ProductVariationModel {
            id: 9,
            product_id: 42,
            portion: 500,
            price: None,
            stock: 2,
            stock_threshold: None,
            deleted_at: None,
        };
        let target = StockTarget::Variation {
            variation,
            product_title: "Picanha".into(),
        };
        assert_eq!(target.product_id(), 42);
        assert_eq!(target.object_id(), 9);
        assert_eq!(target.title(), "Picanha - 500gr");
        assert_eq!(target.mode(), "variation");
    }

    #[test]
    fn stock_check_availability() {
        let available = StockCheck::Available { remaining: 4 };
        assert!(available.is_available());
        let insufficient = StockCheck::Insufficient {
            message: String::new(),
            remaining_stock: 0,
        };
        assert!(!insufficient.is_available());
    }
}
