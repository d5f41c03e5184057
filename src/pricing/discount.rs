use rust_decimal::Decimal;

use crate::catalog::discounts::DiscountType;
use crate::pricing::policy;

/// Stacked discount for a single line: promotions like "second one half
/// price", applied per threshold-multiple reached.
///
/// Returns zero for plain sales (the markdown is already in the price),
/// unknown discount types, and quantities below the type's threshold.
pub fn stacked(
    discount_type: Option<&str>,
    quantity: i32,
    original_price: Option<Decimal>,
) -> Decimal {
    if !policy::is_stackable(discount_type) {
        return Decimal::ZERO;
    }

    let discount = match discount_type.and_then(DiscountType::find) {
        Some(discount) => discount,
        None => return Decimal::ZERO,
    };

    let percentage_off = match discount.percentage_off() {
        Some(percentage) => percentage,
        None => return Decimal::ZERO,
    };

    if quantity < discount.quantity {
        return Decimal::ZERO;
    }

    let original_price = original_price.unwrap_or(Decimal::ZERO);
    let multiples = quantity / discount.quantity; // integer division floors
    let percentage = Decimal::from(percentage_off) / Decimal::from(100);

    Decimal::from(multiples) * original_price * percentage
}

/// A row's line total net of its stacked discount.
pub fn row_total(price: Decimal, quantity: i32, stacked_discount: Decimal) -> Decimal {
    price * Decimal::from(quantity) - stacked_discount
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn none_and_sale_yield_zero() {
        assert_eq!(stacked(None, 4, Some(dec!(10))), dec!(0));
        assert_eq!(stacked(Some("sale"), 4, Some(dec!(10))), dec!(0));
    }

    #[test]
    fn unknown_type_yields_zero() {
        assert_eq!(stacked(Some("mystery-deal"), 4, Some(dec!(10))), dec!(0));
    }

    #[test]
    fn below_threshold_yields_zero() {
        assert_eq!(stacked(Some("second-half-price"), 1, Some(dec!(10))), dec!(0));
    }

    #[test]
    fn second_half_price_quantity_four() {
        // floor(4/2) = 2 multiples, each half of 10
        assert_eq!(
            stacked(Some("second-half-price"), 4, Some(dec!(10))),
            dec!(10)
        );
    }

    #[test]
    fn odd_quantity_floors_the_multiple() {
        // floor(5/2) = 2 multiples
        assert_eq!(
            stacked(Some("second-half-price"), 5, Some(dec!(10))),
            dec!(10)
        );
    }

    #[test]
    fn missing_original_price_yields_zero_amount() {
        assert_eq!(stacked(Some("second-half-price"), 4, None), dec!(0));
    }

    #[test]
    fn row_total_subtracts_stacked_discount() {
        let discount = stacked(Some("second-half-price"), 2, Some(dec!(10)));
        assert_eq!(row_total(dec!(10), 2, discount), dec!(15));
    }

    #[test]
    fn row_total_without_discount_is_price_times_quantity() {
        assert_eq!(row_total(dec!(20), 3, dec!(0)), dec!(60));
    }
}
