use crate::{
    config::PricingConfig,
    entities::{
        coupon::Entity as Coupon,
        coupon_campaign::Entity as CouponCampaign,
        order::{self, Entity as Order, OrderStatus},
        order_row::{self, Entity as OrderRow},
        payment::{self, Entity as Payment},
        OrderModel, OrderRowModel, PaymentModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{points, totals},
    services::inventory::InventoryService,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Service for orders: derived totals, payment-driven status transitions,
/// stock reduction at completion and cascading deletes.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    pricing: Arc<PricingConfig>,
}

impl OrderService {
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

    #[instrument(skip(self))]
    pub async fn get(&self, order_id: i64) -> Result<OrderModel, ServiceError> {
        Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    #[instrument(skip(self))]
    pub async fn rows(&self, order_id: i64) -> Result<Vec<OrderRowModel>, ServiceError> {
        Ok(OrderRow::find()
            .filter(order_row::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?)
    }

    async fn payment(&self, order_id: i64) -> Result<Option<PaymentModel>, ServiceError> {
        Ok(Payment::find()
            .filter(payment::Column::OrderId.eq(order_id))
            .one(&*self.db)
            .await?)
    }

    /// Full numeric totals breakdown for an order.
    #[instrument(skip(self))]
    pub async fn totals(&self, order_id: i64) -> Result<totals::RawTotals, ServiceError> {
        let order = self.get(order_id).await?;
        let rows = self.rows(order_id).await?;
        let payment = self.payment(order_id).await?;
        let discounts = order.discounts();

        let discount_total: Decimal = discounts
            .iter()
            .filter(|d| !d.gift_certificate)
            .map(|d| d.applied_amount())
            .sum();
        let gift_certificates_total: Decimal = discounts
            .iter()
            .filter(|d| d.gift_certificate)
            .map(|d| d.applied_amount())
            .sum();
        let api_certificates_total = self.api_certificates_total(&order).await?;

        let ctx = totals::TotalsContext {
            shipping: order
                .shipping()
                .map(|s| s.price_raw)
                .unwrap_or(Decimal::ZERO),
            transaction_cost: payment
                .map(|p| p.transaction_cost())
                .unwrap_or(Decimal::ZERO),
            discount_total,
            gift_certificates_total,
            api_certificates_total,
        };
        Ok(totals::order_totals(&rows, &ctx))
    }

    /// Invoice lines for an order, formatted and in display order.
    #[instrument(skip(self))]
    pub async fn display_totals(
        &self,
        order_id: i64,
    ) -> Result<Vec<(&'static str, String)>, ServiceError> {
        Ok(self.totals(order_id).await?.display())
    }

    /// Value of the applied certificates that were issued through the
    /// external campaign API; the accounting export books these apart.
    async fn api_certificates_total(&self, order: &OrderModel) -> Result<Decimal, ServiceError> {
        let mut total = Decimal::ZERO;
        for snapshot in order.discounts() {
            if !snapshot.gift_certificate {
                continue;
            }
            let Some(coupon) = Coupon::find_by_id(snapshot.id).one(&*self.db).await? else {
                continue;
            };
            let Some(campaign_id) = coupon.coupon_campaign_id else {
                continue;
            };
            let Some(campaign) = CouponCampaign::find_by_id(campaign_id).one(&*self.db).await?
            else {
                continue;
            };
            if campaign.is_api_sourced() {
                total += snapshot.applied_amount();
            }
        }
        Ok(total)
    }

    /// Gross value of certificate products bought in this order.
    #[instrument(skip(self))]
    pub async fn certificate_total(&self, order_id: i64) -> Result<Decimal, ServiceError> {
        let rows = self.rows(order_id).await?;
        Ok(certificate_total(&rows, &self.pricing))
    }

    /// Subtotal that counts toward promotions: the order subtotal minus
    /// bought certificates, applied discounts and charity rows.
    #[instrument(skip(self))]
    pub async fn promotional_subtotal(&self, order_id: i64) -> Result<Decimal, ServiceError> {
        let totals = self.totals(order_id).await?;
        let rows = self.rows(order_id).await?;

        // `totals.discount` is negative, so adding it subtracts.
        let mut subtotal = totals.subtotal - certificate_total(&rows, &self.pricing) + totals.discount;
        for row in &rows {
            if self.pricing.is_charity(row.product_id) {
                subtotal -= row.total();
            }
        }
        Ok(subtotal)
    }

    /// Loyalty points this order yields.
    #[instrument(skip(self))]
    pub async fn total_points(&self, order_id: i64) -> Result<i64, ServiceError> {
        let totals = self.totals(order_id).await?;
        let rows = self.rows(order_id).await?;
        Ok(points::order_points(
            &totals,
            certificate_total(&rows, &self.pricing),
            &rows,
        ))
    }

    /// Derives the order status from its payment and persists it.
    #[instrument(skip(self))]
    pub async fn set_status_by_payment(&self, order_id: i64) -> Result<OrderModel, ServiceError> {
        let order = self.get(order_id).await?;
        let payment = self.payment(order_id).await?.ok_or_else(|| {
            ServiceError::InvalidOperation(format!("Order {} has no payment", order_id))
        })?;

        let new_status = status_for_payment(&payment.status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!(
                "Payment status '{}' maps to no order status",
                payment.status
            ))
        })?;

        let old_status = order.status;
        if old_status == new_status {
            return Ok(order);
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(new_status);
        let order = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            })
            .await;

        info!(order_id, status = %new_status, "Order status updated from payment");
        Ok(order)
    }

    /// Reduces stock for every row that has not been reduced yet. The
    /// `stock_reduced` flag on the row makes this idempotent across calls.
    #[instrument(skip(self, inventory))]
    pub async fn reduce_stock(
        &self,
        order_id: i64,
        inventory: &InventoryService,
    ) -> Result<(), ServiceError> {
        let rows = self.rows(order_id).await?;
        for row in rows {
            if row.stock_reduced {
                continue;
            }
            let quantity = i64::from(row.quantity);
            let handler = inventory.handler_for_row(&row).await?;
            handler.reduce(quantity).await?;

            let mut active: order_row::ActiveModel = row.into();
            active.stock_reduced = Set(true);
            active.update(&*self.db).await?;
        }

        self.event_sender
            .send_or_log(Event::OrderStockReduced(order_id))
            .await;
        Ok(())
    }

    /// The next free sequential order number.
    #[instrument(skip(self))]
    pub async fn next_order_number(&self) -> Result<i64, ServiceError> {
        let last = Order::find()
            .filter(order::Column::OrderNumber.is_not_null())
            .order_by_desc(order::Column::OrderNumber)
            .one(&*self.db)
            .await?;
        Ok(last.and_then(|o| o.order_number).unwrap_or(0) + 1)
    }

    /// Deletes an order with its rows, payment and customer record.
    #[instrument(skip(self))]
    pub async fn delete(&self, order_id: i64) -> Result<(), ServiceError> {
        let order = self.get(order_id).await?;
        let txn = self.db.begin().await?;

        OrderRow::delete_many()
            .filter(order_row::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        Payment::delete_many()
            .filter(payment::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        if let Some(customer_id) = order.customer_id {
            crate::entities::Customer::delete_by_id(customer_id)
                .exec(&txn)
                .await?;
        }
        order.delete(&txn).await?;

        txn.commit().await?;
        warn!(order_id, "Deleted order with rows, payment and customer");
        Ok(())
    }
}

/// Order status implied by a payment status. Statuses that already exist in
/// the order vocabulary pass through.
pub fn status_for_payment(payment_status: &str) -> Option<OrderStatus> {
    match payment_status {
        "paid" => Some(OrderStatus::Processing),
        "pending" | "authorized" => Some(OrderStatus::OnHold),
        "expired" | "failed" => Some(OrderStatus::Canceled),
        "refund" | "chargedback" | "partial_refunded" => Some(OrderStatus::Refund),
        "open" => Some(OrderStatus::Open),
        "cancelled" => Some(OrderStatus::Canceled),
        _ => None,
    }
}

fn certificate_total(rows: &[OrderRowModel], pricing: &PricingConfig) -> Decimal {
    rows.iter()
        .filter(|row| pricing.is_gift_certificate(row.product_id))
        .map(|row| row.price.unwrap_or(Decimal::ZERO) * Decimal::from(row.quantity))
        .sum()
}
