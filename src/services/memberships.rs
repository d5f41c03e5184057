use crate::{
    entities::{
        membership::{self, Entity as Membership},
        product::Entity as Product,
        MembershipModel,
    },
    errors::ServiceError,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Delivery planning for a membership, built around the first-Thursday
/// monthly cadence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliverySchedule {
    /// The member's delivery day for the current cycle.
    pub delivery_day: NaiveDate,
    /// The next first-Thursday shipment after today.
    pub next_delivery: NaiveDate,
    /// The shipment one month after that.
    pub following_delivery: NaiveDate,
    /// Days the member may pick for the next delivery.
    pub options: Vec<NaiveDate>,
}

/// Service for recurring box memberships.
#[derive(Clone)]
pub struct MembershipService {
    db: Arc<DatabaseConnection>,
}

impl MembershipService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The user's live membership, if any. Soft-deleted memberships are
    /// cancelled and don't count.
    #[instrument(skip(self))]
    pub async fn for_user(&self, user_id: i64) -> Result<Option<MembershipModel>, ServiceError> {
        Ok(Membership::find()
            .filter(membership::Column::UserId.eq(user_id))
            .filter(membership::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?)
    }

    pub async fn has_membership(&self, user_id: i64) -> Result<bool, ServiceError> {
        Ok(self.for_user(user_id).await?.is_some())
    }

    /// Price to charge for the next box. The first order, before the
    /// gateway subscription exists, gets 25% off the product price.
    #[instrument(skip(self, membership))]
    pub async fn price(&self, membership: &MembershipModel) -> Result<Decimal, ServiceError> {
        let Some(product_id) = membership.product_id else {
            return Ok(Decimal::ZERO);
        };
        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Membership product {} not found", product_id))
            })?;
        Ok(membership.price(product.price))
    }

    /// Delivery planning seen from `today`.
    pub fn schedule(&self, membership: &MembershipModel, today: NaiveDate) -> DeliverySchedule {
        DeliverySchedule {
            delivery_day: membership.delivery_day(today),
            next_delivery: membership::next_delivery_day(today),
            following_delivery: membership::next_months_delivery_day(today),
            options: membership.delivery_options(today),
        }
    }

    /// Stores an explicitly chosen delivery day.
    #[instrument(skip(self, membership))]
    pub async fn set_delivery_date(
        &self,
        membership: MembershipModel,
        date: NaiveDate,
    ) -> Result<MembershipModel, ServiceError> {
        let options = membership.delivery_options(Utc::now().date_naive());
        if !options.contains(&date) {
            return Err(ServiceError::InvalidInput(format!(
                "{} is not an available delivery day",
                date
            )));
        }

        let id = membership.id;
        let mut active: membership::ActiveModel = membership.into();
        active.delivery_date = Set(Some(date));
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        info!(membership_id = id, %date, "Membership delivery day set");
        Ok(updated)
    }

    /// Records the gateway subscription reference after the first charge.
    #[instrument(skip(self, membership))]
    pub async fn activate(
        &self,
        membership: MembershipModel,
        recurring_id: String,
    ) -> Result<MembershipModel, ServiceError> {
        let mut active: membership::ActiveModel = membership.into();
        active.recurring_id = Set(Some(recurring_id));
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db).await?)
    }

    /// Cancels a membership by soft-deleting it.
    #[instrument(skip(self, membership))]
    pub async fn cancel(&self, membership: MembershipModel) -> Result<(), ServiceError> {
        let id = membership.id;
        let mut active: membership::ActiveModel = membership.into();
        active.deleted_at = Set(Some(Utc::now()));
        active.update(&*self.db).await?;
        info!(membership_id = id, "Membership cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn schedule_is_built_from_the_cadence() {
        let membership = MembershipModel {
            id: 1,
            user_id: 7,
            product_id: Some(100),
            payment_id: None,
            recurring_id: Some("sub_1".into()),
            delivery_date: None,
            created_at: Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap(),
            deleted_at: None,
        };
        let service = MembershipService {
            db: Arc::new(DatabaseConnection::Disconnected),
        };
        let schedule = service.schedule(&membership, day(2023, 3, 20));
        assert_eq!(schedule.next_delivery, day(2023, 4, 6));
        assert_eq!(schedule.delivery_day, day(2023, 4, 6));
        assert_eq!(schedule.following_delivery, day(2023, 5, 4));
        assert_eq!(schedule.options.len(), 4);
        assert!(schedule.options.contains(&schedule.next_delivery));
    }
}
