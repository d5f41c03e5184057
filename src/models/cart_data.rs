use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::Uuid;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::config::PricingConfig;
use crate::entities::coupon::{self, CouponKind};
use crate::models::discount_snapshot::DiscountSnapshot;
use crate::pricing::policy;

/// A single line in a cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartRow {
    pub product_id: i64,
    /// Zero when the product has no variations.
    #[serde(default)]
    pub variation_id: i64,
    pub description: String,
    /// Unit price. Rows added by coupons or point redemptions can be free.
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub quantity: i64,
    pub vat_rate: Decimal,
    #[serde(default)]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub points_spent: i64,
    #[serde(default)]
    pub points_earned: i64,
    /// Set when a coupon placed this row in the cart.
    #[serde(default)]
    pub coupon_id: Option<i64>,
}

impl CartRow {
    /// Stable identity of a row within its cart. Two rows merge when their
    /// keys match.
    pub fn key(&self) -> String {
        let mut key = format!(
            "{}{}{}",
            self.product_id, self.variation_id, self.points_spent
        );
        if let Some(coupon_id) = self.coupon_id.filter(|id| *id != 0) {
            key.push_str(&coupon_id.to_string());
        }
        key
    }

    fn line_total(&self) -> Decimal {
        self.price.unwrap_or(Decimal::ZERO) * Decimal::from(self.quantity)
    }
}

/// Typed cart document, the working representation behind the JSON columns
/// of [`crate::entities::cart::Model`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartData {
    pub id: Uuid,
    pub order_id: Option<i64>,
    pub rows: Vec<CartRow>,
    pub discounts: Vec<DiscountSnapshot>,
    pub analytics: Json,
    pub utm_tags: Json,
    pub agent: String,
    pub delete_after: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartData {
    pub fn new(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            order_id: None,
            rows: Vec::new(),
            discounts: Vec::new(),
            analytics: Json::Array(Vec::new()),
            utm_tags: Json::Array(Vec::new()),
            agent: String::new(),
            delete_after: delete_after(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes the bookkeeping timestamps; call on every save.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.delete_after = delete_after(now);
    }

    /// Adds a row, merging quantities when a row with the same key exists.
    /// Row quantities are positive; a non-positive quantity is refused and
    /// leaves the cart untouched.
    pub fn add_row(&mut self, row: CartRow) -> bool {
        if row.quantity <= 0 {
            return false;
        }
        if let Some(existing) = self.rows.iter_mut().find(|r| r.key() == row.key()) {
            existing.quantity += row.quantity;
        } else {
            self.rows.push(row);
        }
        true
    }

    /// Removes the row with the given key; returns whether one was there.
    pub fn remove_row(&mut self, key: &str) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.key() != key);
        self.rows.len() != before
    }

    /// Subtotal of priced rows, leaving out gift certificates and the
    /// charity product.
    pub fn subtotal_without_gift_certificates(&self, pricing: &PricingConfig) -> Decimal {
        self.rows
            .iter()
            .filter(|row| matches!(row.price, Some(price) if !price.is_zero()))
            .filter(|row| !pricing.is_gift_certificate(row.product_id))
            .filter(|row| !pricing.is_charity(row.product_id))
            .map(CartRow::line_total)
            .sum()
    }

    /// The base over which percentage coupons calculate: the subtotal minus
    /// rows that are already marked down. Lottery tickets stay in the base
    /// even when marked down; charity rows never made it in.
    pub fn discount_applicable_subtotal(&self, pricing: &PricingConfig) -> Decimal {
        let mut subtotal = self.subtotal_without_gift_certificates(pricing);
        for row in &self.rows {
            let price = row.price.unwrap_or(Decimal::ZERO);
            if policy::row_counts_toward_coupon_base(price, row.original_price) {
                continue;
            }
            if pricing.is_charity(row.product_id) || pricing.is_lottery_ticket(row.product_id) {
                continue;
            }
            subtotal -= row.line_total();
        }
        subtotal
    }

    /// Total value of the applied non-certificate discounts.
    pub fn discount_total(&self, pricing: &PricingConfig) -> Decimal {
        let subtotal = self.discount_applicable_subtotal(pricing);
        self.discounts
            .iter()
            .filter(|discount| !discount.gift_certificate)
            .map(|discount| match discount.kind {
                CouponKind::Percentage => subtotal * discount.amount / Decimal::from(100),
                CouponKind::Fixed => discount.amount,
            })
            .sum()
    }

    /// True when every row is a certificate, charity or lottery product.
    /// An empty cart does not count.
    pub fn only_has_certificates(&self, pricing: &PricingConfig) -> bool {
        if self.rows.is_empty() {
            return false;
        }
        self.rows.iter().all(|row| {
            pricing.is_gift_certificate(row.product_id)
                || pricing.is_charity(row.product_id)
                || pricing.is_lottery_ticket(row.product_id)
        })
    }

    pub fn contains_points(&self) -> bool {
        self.rows.iter().any(|row| row.points_spent > 0)
    }

    /// Whether this cart ships for free: a store-wide promo window, the
    /// subtotal threshold, a free-shipping coupon, a free-shipping or
    /// point-bought product, or an active membership.
    pub fn has_free_shipping(
        &self,
        pricing: &PricingConfig,
        now: DateTime<Utc>,
        has_membership: bool,
    ) -> bool {
        if policy::in_free_shipping_promo(now) {
            return true;
        }
        if self.subtotal_without_gift_certificates(pricing) >= pricing.free_shipping_threshold {
            return true;
        }
        if self.discounts.iter().any(|discount| discount.free_shipping) {
            return true;
        }
        if self
            .rows
            .iter()
            .any(|row| pricing.ships_free(row.product_id) || row.points_spent > 0)
        {
            return true;
        }
        has_membership
    }

    /// A cart is old once it has been idle past the cutoff.
    pub fn is_old(&self, now: DateTime<Utc>) -> bool {
        let cutoff = Duration::minutes(policy::CART_IDLE_MINUTES);
        now - self.created_at > cutoff && now - self.updated_at > cutoff
    }

    /// Attaches a coupon snapshot. Applying the same code twice is a no-op.
    pub fn add_discount(&mut self, coupon: &coupon::Model) {
        if self.discounts.iter().any(|d| d.code == coupon.code) {
            return;
        }
        self.discounts.push(DiscountSnapshot::from(coupon));
    }

    /// Drops every snapshot carrying this code.
    pub fn remove_discount(&mut self, code: &str) -> bool {
        let before = self.discounts.len();
        self.discounts.retain(|discount| discount.code != code);
        self.discounts.len() != before
    }
}

/// The moment after which an untouched cart may be cleaned up.
pub fn delete_after(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::weeks(policy::CART_DELETE_AFTER_WEEKS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pricing() -> PricingConfig {
        PricingConfig {
            gift_certificate_ids: vec![801],
            charity_product_id: Some(950),
            lottery_ticket_id: Some(777),
            free_shipping_product_ids: vec![600],
            ..PricingConfig::default()
        }
    }

    fn row(product_id: i64, price: Decimal, quantity: i64) -> CartRow {
        CartRow {
            product_id,
            variation_id: 0,
            description: format!("product {product_id}"),
            price: Some(price),
            original_price: Some(price),
            quantity,
            vat_rate: dec!(0.09),
            discount_type: None,
            points_spent: 0,
            points_earned: 0,
            coupon_id: None,
        }
    }

    fn cart() -> CartData {
        CartData::new(Uuid::new_v4(), Utc::now())
    }

    fn percentage_coupon(code: &str, amount: Decimal) -> coupon::Model {
        coupon::Model {
            id: 5,
            code: code.into(),
            kind: CouponKind::Percentage,
            amount,
            minimal_amount: None,
            valid_from: None,
            valid_through: None,
            usage: 0,
            used: 0,
            is_gift_certificate: false,
            free_shipping: false,
            coupon_campaign_id: None,
        }
    }

    #[test]
    fn subtotal_skips_certificates_charity_and_free_rows() {
        let mut cart = cart();
        cart.add_row(row(1, dec!(25), 2)); // 50
        cart.add_row(row(2, dec!(10), 1)); // 10
        cart.add_row(row(801, dec!(50), 1)); // certificate
        cart.add_row(row(950, dec!(1), 1)); // charity
        let mut free = row(3, dec!(0), 1);
        free.price = None;
        cart.add_row(free);
        assert_eq!(cart.subtotal_without_gift_certificates(&pricing()), dec!(60));
    }

    #[test]
    fn ten_percent_coupon_on_sixty_gives_six() {
        let mut cart = cart();
        cart.add_row(row(1, dec!(25), 2));
        cart.add_row(row(2, dec!(10), 1));
        cart.add_discount(&percentage_coupon("TEN", dec!(10)));
        assert_eq!(cart.discount_total(&pricing()), dec!(6.0));
    }

    #[test]
    fn marked_down_rows_leave_the_coupon_base() {
        let mut cart = cart();
        cart.add_row(row(1, dec!(50), 1));
        let mut sale = row(2, dec!(8), 1);
        sale.original_price = Some(dec!(10));
        sale.discount_type = Some("sale".into());
        cart.add_row(sale);
        assert_eq!(cart.subtotal_without_gift_certificates(&pricing()), dec!(58));
        assert_eq!(cart.discount_applicable_subtotal(&pricing()), dec!(50));
    }

    #[test]
    fn marked_down_lottery_ticket_stays_in_the_coupon_base() {
        let mut cart = cart();
        let mut ticket = row(777, dec!(2), 1);
        ticket.original_price = Some(dec!(3));
        cart.add_row(ticket);
        assert_eq!(cart.discount_applicable_subtotal(&pricing()), dec!(2));
    }

    #[test]
    fn fixed_coupons_apply_face_value_and_certificates_do_not_count() {
        let mut cart = cart();
        cart.add_row(row(1, dec!(30), 1));
        let mut fixed = percentage_coupon("FIVE", dec!(5));
        fixed.kind = CouponKind::Fixed;
        cart.add_discount(&fixed);
        let mut certificate = percentage_coupon("GIFT", dec!(25));
        certificate.code = "GIFT".into();
        certificate.is_gift_certificate = true;
        cart.add_discount(&certificate);
        assert_eq!(cart.discount_total(&pricing()), dec!(5));
    }

    #[test]
    fn duplicate_codes_apply_once_and_can_be_removed() {
        let mut cart = cart();
        let coupon = percentage_coupon("TEN", dec!(10));
        cart.add_discount(&coupon);
        cart.add_discount(&coupon);
        assert_eq!(cart.discounts.len(), 1);
        assert!(cart.remove_discount("TEN"));
        assert!(!cart.remove_discount("TEN"));
        assert!(cart.discounts.is_empty());
    }

    #[test]
    fn non_positive_quantities_are_refused() {
        let mut cart = cart();
        assert!(!cart.add_row(row(1, dec!(10), 0)));
        assert!(!cart.add_row(row(1, dec!(10), -3)));
        assert!(cart.rows.is_empty());

        // An existing row can't be dragged to zero through a merge either.
        assert!(cart.add_row(row(1, dec!(10), 2)));
        assert!(!cart.add_row(row(1, dec!(10), -2)));
        assert_eq!(cart.rows[0].quantity, 2);
        assert_eq!(cart.subtotal_without_gift_certificates(&pricing()), dec!(20));
    }

    #[test]
    fn rows_merge_on_matching_keys() {
        let mut cart = cart();
        cart.add_row(row(1, dec!(10), 1));
        cart.add_row(row(1, dec!(10), 2));
        assert_eq!(cart.rows.len(), 1);
        assert_eq!(cart.rows[0].quantity, 3);

        let mut with_points = row(1, dec!(10), 1);
        with_points.points_spent = 50;
        cart.add_row(with_points);
        assert_eq!(cart.rows.len(), 2);
    }

    #[test]
    fn row_keys_include_variation_points_and_coupon() {
        let mut row = row(12, dec!(10), 1);
        assert_eq!(row.key(), "1200");
        row.variation_id = 3;
        row.points_spent = 50;
        row.coupon_id = Some(9);
        assert_eq!(row.key(), "123509");
        row.coupon_id = Some(0);
        assert_eq!(row.key(), "12350");
    }

    #[test]
    fn only_certificates_requires_a_non_empty_cart() {
        let mut cart = cart();
        assert!(!cart.only_has_certificates(&pricing()));
        cart.add_row(row(801, dec!(50), 1));
        cart.add_row(row(950, dec!(1), 1));
        cart.add_row(row(777, dec!(2), 1));
        assert!(cart.only_has_certificates(&pricing()));
        cart.add_row(row(1, dec!(10), 1));
        assert!(!cart.only_has_certificates(&pricing()));
    }

    #[test]
    fn free_shipping_reasons() {
        let pricing = pricing();
        let now = Utc::now();
        let mut cart = cart();
        cart.add_row(row(1, dec!(10), 1));
        assert!(!cart.has_free_shipping(&pricing, now, false));

        // Threshold.
        cart.add_row(row(2, dec!(95), 1));
        assert!(cart.has_free_shipping(&pricing, now, false));

        // Coupon flag.
        let mut cart = self::cart();
        cart.add_row(row(1, dec!(10), 1));
        let mut coupon = percentage_coupon("SHIP", dec!(0));
        coupon.free_shipping = true;
        cart.add_discount(&coupon);
        assert!(cart.has_free_shipping(&pricing, now, false));

        // Free-shipping product.
        let mut cart = self::cart();
        cart.add_row(row(600, dec!(10), 1));
        assert!(cart.has_free_shipping(&pricing, now, false));

        // Points spent.
        let mut cart = self::cart();
        let mut with_points = row(1, dec!(10), 1);
        with_points.points_spent = 100;
        cart.add_row(with_points);
        assert!(cart.has_free_shipping(&pricing, now, false));

        // Membership.
        let mut cart = self::cart();
        cart.add_row(row(1, dec!(10), 1));
        assert!(cart.has_free_shipping(&pricing, now, true));
    }

    #[test]
    fn cart_goes_old_after_idle_cutoff() {
        let now = Utc::now();
        let mut cart = CartData::new(Uuid::new_v4(), now - Duration::minutes(30));
        assert!(cart.is_old(now));
        cart.touch(now - Duration::minutes(5));
        assert!(!cart.is_old(now));
        assert_eq!(
            cart.delete_after,
            now - Duration::minutes(5) + Duration::weeks(2)
        );
    }

    #[test]
    fn contains_points_looks_at_rows() {
        let mut cart = cart();
        cart.add_row(row(1, dec!(10), 1));
        assert!(!cart.contains_points());
        let mut with_points = row(2, dec!(10), 1);
        with_points.points_spent = 25;
        cart.add_row(with_points);
        assert!(cart.contains_points());
    }
}
