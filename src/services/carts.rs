use crate::{
    entities::cart::{self, Entity as Cart},
    entities::coupon,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{CartData, CartRow},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Service for the cart lifecycle: creation, row mutation, discounts and
/// stale-cart cleanup. Every mutation saves through [`CartData`], which
/// refreshes `updated_at` and `delete_after`.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates an empty cart.
    #[instrument(skip(self))]
    pub async fn create(&self) -> Result<CartData, ServiceError> {
        let data = CartData::new(Uuid::new_v4(), Utc::now());

        let model = cart::ActiveModel {
            id: Set(data.id),
            order_id: Set(None),
            rows: Set(serde_json::to_value(&data.rows)?),
            discounts: Set(serde_json::to_value(&data.discounts)?),
            analytics: Set(data.analytics.clone()),
            utm_tags: Set(data.utm_tags.clone()),
            agent: Set(data.agent.clone()),
            delete_after: Set(data.delete_after),
            created_at: Set(data.created_at),
            updated_at: Set(data.updated_at),
        };
        model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CartCreated(data.id))
            .await;

        info!(cart_id = %data.id, "Created cart");
        Ok(data)
    }

    /// Loads a cart; `Ok(None)` when the id is unknown.
    #[instrument(skip(self))]
    pub async fn get(&self, cart_id: Uuid) -> Result<Option<CartData>, ServiceError> {
        match Cart::find_by_id(cart_id).one(&*self.db).await? {
            Some(model) => Ok(Some(model.data()?)),
            None => Ok(None),
        }
    }

    /// Finds the cart attached to an order, if any.
    #[instrument(skip(self))]
    pub async fn find_by_order(&self, order_id: i64) -> Result<Option<CartData>, ServiceError> {
        match Cart::find()
            .filter(cart::Column::OrderId.eq(order_id))
            .one(&*self.db)
            .await?
        {
            Some(model) => Ok(Some(model.data()?)),
            None => Ok(None),
        }
    }

    /// Persists the document, refreshing `updated_at` and `delete_after`.
    #[instrument(skip(self, data))]
    pub async fn save(&self, mut data: CartData) -> Result<CartData, ServiceError> {
        data.touch(Utc::now());

        let model = cart::ActiveModel {
            id: Set(data.id),
            order_id: Set(data.order_id),
            rows: Set(serde_json::to_value(&data.rows)?),
            discounts: Set(serde_json::to_value(&data.discounts)?),
            analytics: Set(data.analytics.clone()),
            utm_tags: Set(data.utm_tags.clone()),
            agent: Set(data.agent.clone()),
            delete_after: Set(data.delete_after),
            created_at: Set(data.created_at),
            updated_at: Set(data.updated_at),
        };
        model.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CartUpdated(data.id))
            .await;
        Ok(data)
    }

    /// Adds a row (merging with an equal-keyed row) and saves. Quantities
    /// must be positive.
    #[instrument(skip(self, row))]
    pub async fn add_row(&self, cart_id: Uuid, row: CartRow) -> Result<CartData, ServiceError> {
        let mut data = self.require(cart_id).await?;
        if !data.add_row(row) {
            return Err(ServiceError::InvalidInput(
                "Row quantity must be positive".to_string(),
            ));
        }
        self.save(data).await
    }

    /// Removes the row with the given key and saves.
    #[instrument(skip(self))]
    pub async fn remove_row(&self, cart_id: Uuid, key: &str) -> Result<CartData, ServiceError> {
        let mut data = self.require(cart_id).await?;
        if !data.remove_row(key) {
            return Err(ServiceError::NotFound(format!(
                "Cart {} has no row {}",
                cart_id, key
            )));
        }
        self.save(data).await
    }

    /// Snapshots a coupon onto the cart. The caller is expected to have
    /// validated the coupon (see `CouponService::validate`).
    #[instrument(skip(self, coupon))]
    pub async fn add_discount(
        &self,
        cart_id: Uuid,
        coupon: &coupon::Model,
    ) -> Result<CartData, ServiceError> {
        let mut data = self.require(cart_id).await?;
        data.add_discount(coupon);
        let data = self.save(data).await?;

        self.event_sender
            .send_or_log(Event::CartDiscountApplied {
                cart_id,
                code: coupon.code.clone(),
            })
            .await;
        Ok(data)
    }

    /// Removes every snapshot with this code from the cart.
    #[instrument(skip(self))]
    pub async fn remove_discount(
        &self,
        cart_id: Uuid,
        code: &str,
    ) -> Result<CartData, ServiceError> {
        let mut data = self.require(cart_id).await?;
        if !data.remove_discount(code) {
            return Err(ServiceError::NotFound(format!(
                "Cart {} has no discount {}",
                cart_id, code
            )));
        }
        let data = self.save(data).await?;

        self.event_sender
            .send_or_log(Event::CartDiscountRemoved {
                cart_id,
                code: code.to_string(),
            })
            .await;
        Ok(data)
    }

    /// Deletes carts whose `delete_after` has passed. Returns the count.
    #[instrument(skip(self))]
    pub async fn purge_stale(&self) -> Result<u64, ServiceError> {
        let result = Cart::delete_many()
            .filter(cart::Column::DeleteAfter.lt(Utc::now()))
            .exec(&*self.db)
            .await?;
        if result.rows_affected > 0 {
            info!(purged = result.rows_affected, "Purged stale carts");
        }
        Ok(result.rows_affected)
    }

    async fn require(&self, cart_id: Uuid) -> Result<CartData, ServiceError> {
        self.get(cart_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))
    }
}
