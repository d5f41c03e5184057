use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// The VAT share included in a gross amount.
///
/// Prices are stored including VAT, so the tax is reverse-calculated:
/// `vat(121, 0.21) == 21`.
pub fn vat(gross: Decimal, rate: Decimal) -> Decimal {
    let percentage = rate * Decimal::from(100) + Decimal::from(100);
    if percentage.is_zero() {
        return Decimal::ZERO;
    }
    let ex_vat = gross / percentage * Decimal::from(100);
    gross - ex_vat
}

/// Formats an amount the way the storefront prints money: euro sign,
/// comma decimals, dot thousand separators.
pub fn format(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative();
    let abs = rounded.abs();

    let whole = abs.trunc().to_string();
    let cents = (abs.fract() * Decimal::from(100))
        .round()
        .to_u32()
        .unwrap_or(0);

    let mut grouped = String::new();
    for (i, c) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    format!(
        "€ {}{},{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents
    )
}
