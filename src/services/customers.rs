use crate::{
    catalog::checkout_fields,
    entities::{
        customer::{self, Entity as Customer},
        loyalty::{self, Entity as Loyalty},
        order::{self, Entity as Order, OrderStatus},
        CustomerModel, OrderModel,
    },
    errors::ServiceError,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;

/// How far back an earlier purchase still marks someone as returning.
const RETURNING_WINDOW_MONTHS: i64 = 3;

/// Service for customer records and the loyalty balance of their user
/// accounts.
#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DatabaseConnection>,
}

impl CustomerService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Checks a submitted checkout form against the field catalog: every
    /// required field must be present and non-blank.
    pub fn validate_checkout(
        &self,
        submitted: &std::collections::HashMap<String, String>,
    ) -> Result<(), ServiceError> {
        for field in checkout_fields::required() {
            let missing = submitted
                .get(field.name)
                .map(|value| value.trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ServiceError::ValidationError(format!(
                    "{} is verplicht",
                    field.label
                )));
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, customer_id: i64) -> Result<CustomerModel, ServiceError> {
        Customer::find_by_id(customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))
    }

    /// Orders placed by a user, newest first. Carts, never-checked-out and
    /// canceled orders don't count.
    #[instrument(skip(self))]
    pub async fn orders_by_user(&self, user_id: i64) -> Result<Vec<OrderModel>, ServiceError> {
        let customer_ids: Vec<i64> = Customer::find()
            .filter(customer::Column::UserId.eq(user_id))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        if customer_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Order::find()
            .filter(order::Column::CustomerId.is_in(customer_ids))
            .filter(order::Column::Status.is_not_in([
                OrderStatus::Canceled,
                OrderStatus::Cart,
                OrderStatus::New,
            ]))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Whether this customer bought something before in the last few
    /// months, matched on user id when present and on email otherwise.
    #[instrument(skip(self, customer))]
    pub async fn is_returning(&self, customer: &CustomerModel) -> Result<bool, ServiceError> {
        let since = Utc::now() - Duration::days(RETURNING_WINDOW_MONTHS * 30);

        let mut query = Customer::find()
            .filter(customer::Column::Id.ne(customer.id))
            .filter(customer::Column::CreatedAt.gte(since));
        query = match customer.user_id {
            Some(user_id) => query.filter(customer::Column::UserId.eq(user_id)),
            None => query.filter(customer::Column::Email.eq(customer.email.clone())),
        };

        Ok(query.one(&*self.db).await?.is_some())
    }

    /// Adds earned points to a user's loyalty record, creating the record
    /// when there is none.
    #[instrument(skip(self))]
    pub async fn add_points(&self, user_id: i64, points: i64) -> Result<(), ServiceError> {
        let loyalty = self.loyalty_for(user_id).await?;
        let saved = (loyalty.points_saved + points).max(0);
        let balance = (loyalty.points_balance + points).max(0);

        let mut active: loyalty::ActiveModel = loyalty.into();
        active.points_saved = Set(saved);
        active.points_balance = Set(balance);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;
        Ok(())
    }

    /// Books spent points; the balance can go negative when a redemption
    /// and a refund race, which the next add corrects.
    #[instrument(skip(self))]
    pub async fn subtract_points(&self, user_id: i64, points: i64) -> Result<(), ServiceError> {
        let loyalty = self.loyalty_for(user_id).await?;
        let spent = loyalty.points_spent + points;
        let balance = loyalty.points_balance - points;

        let mut active: loyalty::ActiveModel = loyalty.into();
        active.points_spent = Set(spent);
        active.points_balance = Set(balance);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn points_balance(&self, user_id: i64) -> Result<i64, ServiceError> {
        Ok(Loyalty::find()
            .filter(loyalty::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .map(|l| l.points_balance)
            .unwrap_or(0))
    }

    async fn loyalty_for(&self, user_id: i64) -> Result<loyalty::Model, ServiceError> {
        if let Some(loyalty) = Loyalty::find()
            .filter(loyalty::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
        {
            return Ok(loyalty);
        }

        let now = Utc::now();
        let fresh = loyalty::ActiveModel {
            user_id: Set(user_id),
            points_saved: Set(0),
            points_spent: Set(0),
            points_balance: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(fresh.insert(&*self.db).await?)
    }
}
