use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::entities::order_row;
use crate::pricing::totals::RawTotals;

/// Euros of qualifying spend per loyalty point.
const EUROS_PER_POINT: i64 = 25;

/// Loyalty points earned by an order: one point per 25 euro of qualifying
/// spend (subtotal minus bought certificates, after discounts), plus any
/// per-row bonus points.
pub fn order_points(totals: &RawTotals, certificate_total: Decimal, rows: &[order_row::Model]) -> i64 {
    // `totals.discount` is already negative, so adding it subtracts.
    let qualifying = totals.subtotal - certificate_total + totals.discount;
    let base = (qualifying / Decimal::from(EUROS_PER_POINT))
        .floor()
        .to_i64()
        .unwrap_or(0);
    let bonus: i64 = rows
        .iter()
        .map(|row| i64::from(row.points_earned) * i64::from(row.quantity))
        .sum();
    base + bonus
}
