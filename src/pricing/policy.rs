//! Named policy functions for business rules that have drifted between
//! store variants. Reconciling a rule later is a one-line change here.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

/// Minutes of inactivity after which a cart counts as old. The 30-minute
/// variant that existed in an older code path is superseded.
pub const CART_IDLE_MINUTES: i64 = 20;

/// How long an untouched cart survives before the store may delete it.
pub const CART_DELETE_AFTER_WEEKS: i64 = 2;

/// VAT rate charged on shipping and payment transaction costs.
pub fn service_vat_rate() -> Decimal {
    Decimal::new(21, 2) // 0.21
}

/// Rows at or below this rate fall in the low-VAT bucket.
pub fn high_vat_cutoff() -> Decimal {
    Decimal::new(10, 2) // 0.10
}

/// A `sale` discount type is never stackable: the markdown already lives in
/// `price` vs `original_price`, so stacking it would count twice. (The
/// variant that short-circuited on *non*-sale types is superseded.)
pub fn is_stackable(discount_type: Option<&str>) -> bool {
    !matches!(discount_type, None | Some("sale"))
}

/// A row counts toward the coupon-percentage base unless it is already
/// marked down (`price != original_price`). Keyed off the price comparison;
/// the discount_type-based variant is superseded.
pub fn row_counts_toward_coupon_base(price: Decimal, original_price: Option<Decimal>) -> bool {
    match original_price {
        Some(original) => price == original,
        None => true,
    }
}

/// One-off promotional window with store-wide free shipping.
pub fn in_free_shipping_promo(now: DateTime<Utc>) -> bool {
    let start = day_end(2023, 3, 3);
    let end = day_start(2023, 3, 6);
    now > start && now < end
}

fn day_start(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(
        &NaiveDate::from_ymd_opt(y, m, d)
            .expect("valid calendar date")
            .and_hms_opt(0, 0, 0)
            .expect("valid time"),
    )
}

fn day_end(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(
        &NaiveDate::from_ymd_opt(y, m, d)
            .expect("valid calendar date")
            .and_hms_opt(23, 59, 59)
            .expect("valid time"),
    )
}
