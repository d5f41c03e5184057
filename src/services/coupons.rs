use crate::{
    config::PricingConfig,
    entities::{
        coupon::{self, CouponState, Entity as Coupon},
        coupon_order::{self, Entity as CouponOrder},
        CouponModel,
    },
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Service for coupons and gift certificates: validation at apply time and
/// redemption bookkeeping on the coupon/order pivot.
#[derive(Clone)]
pub struct CouponService {
    db: Arc<DatabaseConnection>,
    pricing: Arc<PricingConfig>,
}

impl CouponService {
    pub fn new(db: Arc<DatabaseConnection>, pricing: Arc<PricingConfig>) -> Self {
        Self { db, pricing }
    }

    /// Product ids that are sold as gift certificates.
    pub fn certificate_ids(&self) -> &[i64] {
        &self.pricing.gift_certificate_ids
    }

    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> Result<Option<CouponModel>, ServiceError> {
        Ok(Coupon::find()
            .filter(coupon::Column::Code.eq(code))
            .one(&*self.db)
            .await?)
    }

    /// Resolves a code to a redeemable coupon. Fails when the code is
    /// unknown, outside its validity window, used up, or the cart's
    /// discount-applicable subtotal is below the coupon's minimum.
    #[instrument(skip(self))]
    pub async fn validate(
        &self,
        code: &str,
        applicable_subtotal: Decimal,
    ) -> Result<CouponModel, ServiceError> {
        let coupon = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon '{}' not found", code)))?;

        if !coupon.is_valid_at(Utc::now()) {
            return Err(ServiceError::InvalidOperation(format!(
                "Coupon '{}' is no longer valid",
                code
            )));
        }
        if let Some(minimum) = coupon.minimal_amount {
            if applicable_subtotal < minimum {
                return Err(ServiceError::InvalidOperation(format!(
                    "Coupon '{}' requires a subtotal of at least {}",
                    code, minimum
                )));
            }
        }
        Ok(coupon)
    }

    /// Records a coupon state against an order on the pivot.
    #[instrument(skip(self))]
    pub async fn attach(
        &self,
        coupon_id: i64,
        order_id: i64,
        state: CouponState,
        amount: Decimal,
    ) -> Result<(), ServiceError> {
        let now = Utc::now();
        let pivot = coupon_order::ActiveModel {
            coupon_id: Set(coupon_id),
            order_id: Set(order_id),
            status: Set(state as i16),
            amount: Set(amount),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        pivot.insert(&*self.db).await?;
        Ok(())
    }

    /// Redeems a coupon on an order: books the pivot row and bumps the
    /// usage counter.
    #[instrument(skip(self, coupon))]
    pub async fn redeem(
        &self,
        coupon: &CouponModel,
        order_id: i64,
        amount: Decimal,
    ) -> Result<(), ServiceError> {
        self.attach(coupon.id, order_id, CouponState::Redeemed, amount)
            .await?;

        let mut active: coupon::ActiveModel = coupon.clone().into();
        active.used = Set(coupon.used + 1);
        active.update(&*self.db).await?;

        info!(coupon = %coupon.code, order_id, "Coupon redeemed");
        Ok(())
    }

    /// When a certificate is worth more than the order, the remainder is
    /// reissued as a fresh single-use certificate under the same campaign.
    #[instrument(skip(self, original))]
    pub async fn issue_remainder(
        &self,
        original: &CouponModel,
        order_id: i64,
        remainder: Decimal,
        code: String,
    ) -> Result<CouponModel, ServiceError> {
        if remainder <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Remainder certificate needs a positive amount".to_string(),
            ));
        }

        let fresh = coupon::ActiveModel {
            code: Set(code),
            kind: Set(coupon::CouponKind::Fixed),
            amount: Set(remainder),
            minimal_amount: Set(None),
            valid_from: Set(None),
            valid_through: Set(original.valid_through),
            usage: Set(1),
            used: Set(0),
            is_gift_certificate: Set(true),
            free_shipping: Set(false),
            coupon_campaign_id: Set(original.coupon_campaign_id),
            ..Default::default()
        };
        let fresh = fresh.insert(&*self.db).await?;

        self.attach(fresh.id, order_id, CouponState::Remaining, remainder)
            .await?;
        info!(
            original = %original.code,
            remainder = %remainder,
            "Issued remainder certificate"
        );
        Ok(fresh)
    }

    /// Coupon states recorded for an order.
    #[instrument(skip(self))]
    pub async fn states_for_order(
        &self,
        order_id: i64,
    ) -> Result<Vec<(CouponModel, CouponState, Decimal)>, ServiceError> {
        let pivots = CouponOrder::find()
            .filter(coupon_order::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?;

        let mut states = Vec::with_capacity(pivots.len());
        for pivot in pivots {
            let Some(state) = CouponState::from_value(pivot.status) else {
                continue;
            };
            let Some(coupon) = Coupon::find_by_id(pivot.coupon_id).one(&*self.db).await? else {
                continue;
            };
            states.push((coupon, state, pivot.amount));
        }
        Ok(states)
    }

    /// Certificates on an order that can still be printed: bought, earned
    /// or reissued, but not redeemed.
    #[instrument(skip(self))]
    pub async fn printable_for_order(
        &self,
        order_id: i64,
    ) -> Result<Vec<CouponModel>, ServiceError> {
        Ok(self
            .states_for_order(order_id)
            .await?
            .into_iter()
            .filter(|(_, state, _)| state.printable())
            .map(|(coupon, _, _)| coupon)
            .collect())
    }
}
