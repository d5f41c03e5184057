//! End-to-end pricing walkthrough: a cart picks up rows and a coupon, the
//! order inherits the amounts and the totals, points and shipping
//! eligibility all line up.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::prelude::Uuid;
use smokehouse_commerce::config::PricingConfig;
use smokehouse_commerce::entities::coupon::{self, CouponKind};
use smokehouse_commerce::entities::order_row;
use smokehouse_commerce::models::{CartData, CartRow};
use smokehouse_commerce::pricing::{points, totals};

fn pricing() -> PricingConfig {
    PricingConfig {
        gift_certificate_ids: vec![801],
        charity_product_id: Some(950),
        lottery_ticket_id: Some(777),
        free_shipping_product_ids: vec![600],
        ..PricingConfig::default()
    }
}

fn cart_row(product_id: i64, price: Decimal, quantity: i64) -> CartRow {
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

fn order_row(product_id: i64, price: Decimal, quantity: i32) -> order_row::Model {
    order_row::Model {
        id: 1,
        order_id: 1,
        product_id,
        product_variation_id: 0,
        description: format!("product {product_id}"),
        price: Some(price),
        original_price: Some(price),
        quantity,
        vat: dec!(0.09),
        discount_type: None,
        points_spent: 0,
        points_earned: 0,
        stock_reduced: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn ten_percent_coupon() -> coupon::Model {
    coupon::Model {
        id: 12,
        code: "WELKOM10".into(),
        kind: CouponKind::Percentage,
        amount: dec!(10),
        minimal_amount: Some(dec!(50)),
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
fn coupon_checkout_prices_through_to_the_order() {
    let pricing = pricing();
    let now = Utc::now();

    // Three steaks at 20 and a single item at 10: subtotal 60.
    let mut cart = CartData::new(Uuid::new_v4(), now);
    cart.add_row(cart_row(42, dec!(20), 3));
    cart.add_row(cart_row(43, dec!(10), 1));
    assert_eq!(cart.subtotal_without_gift_certificates(&pricing), dec!(70));

    let coupon = ten_percent_coupon();
    assert!(coupon.is_valid_at(now));
    cart.add_discount(&coupon);
    let discount_total = cart.discount_total(&pricing);
    assert_eq!(discount_total, dec!(7.0));

    // Below the threshold and no other reason: shipping is paid.
    assert!(!cart.has_free_shipping(&pricing, now, false));

    // Checkout turns the cart rows into order rows.
    let rows = vec![order_row(42, dec!(20), 3), order_row(43, dec!(10), 1)];
    let ctx = totals::TotalsContext {
        shipping: dec!(6.95),
        discount_total,
        ..totals::TotalsContext::default()
    };
    let raw = totals::order_totals(&rows, &ctx);

    assert_eq!(raw.subtotal, dec!(70));
    assert_eq!(raw.discount, dec!(-7.0));
    assert_eq!(raw.total, dec!(69.95));
    assert_eq!(raw.subtotal_high, dec!(0));

    let labels: Vec<_> = raw.display().iter().map(|(label, _)| *label).collect();
    assert_eq!(
        labels,
        vec!["Subtotaal", "Waarvan BTW", "Verzendkosten", "Korting", "Totaal"]
    );

    // floor((70 - 0 - 7) / 25) = 2 points.
    assert_eq!(points::order_points(&raw, dec!(0), &rows), 2);
}

#[test]
fn certificate_only_cart_skips_discounts_and_ships_free_over_threshold() {
    let pricing = pricing();
    let now = Utc::now();

    let mut cart = CartData::new(Uuid::new_v4(), now);
    cart.add_row(cart_row(801, dec!(75), 2));
    assert!(cart.only_has_certificates(&pricing));
    assert_eq!(cart.subtotal_without_gift_certificates(&pricing), dec!(0));

    // Certificates never push the cart over the free-shipping threshold.
    assert!(!cart.has_free_shipping(&pricing, now, false));

    // A percentage coupon has nothing to bite on.
    cart.add_discount(&ten_percent_coupon());
    assert_eq!(cart.discount_total(&pricing), dec!(0));
}

#[test]
fn sale_rows_shrink_the_coupon_base_but_not_the_subtotal() {
    let pricing = pricing();

    let mut cart = CartData::new(Uuid::new_v4(), Utc::now());
    cart.add_row(cart_row(42, dec!(60), 1));
    let mut sale = cart_row(43, dec!(15), 2);
    sale.original_price = Some(dec!(20));
    sale.discount_type = Some("sale".into());
    cart.add_row(sale);

    assert_eq!(cart.subtotal_without_gift_certificates(&pricing), dec!(90));
    assert_eq!(cart.discount_applicable_subtotal(&pricing), dec!(60));

    cart.add_discount(&ten_percent_coupon());
    assert_eq!(cart.discount_total(&pricing), dec!(6.0));
}
