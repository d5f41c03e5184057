use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::order_row;
use crate::pricing::{policy, price};

/// Numeric breakdown of an order or cart. Deductions (`discount`,
/// `gift_certificates`, `api_certificate_rectification`) carry a negative
/// sign, the way they print on an invoice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTotals {
    pub subtotal: Decimal,
    pub subtotal_high: Decimal,
    pub subtotal_low: Decimal,
    pub shipping: Decimal,
    pub transaction_cost: Decimal,
    pub vat: Decimal,
    pub vat_high: Decimal,
    pub vat_low: Decimal,
    pub discount: Decimal,
    pub gift_certificates: Decimal,
    /// Certificates issued through the external campaign API; booked
    /// separately so the accounting export can rectify them.
    pub api_certificate_rectification: Decimal,
    pub total: Decimal,
}

/// Inputs that come from outside the row set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TotalsContext {
    pub shipping: Decimal,
    pub transaction_cost: Decimal,
    /// Applied non-certificate coupon value, as a positive number.
    pub discount_total: Decimal,
    /// Applied certificate value, as a positive number.
    pub gift_certificates_total: Decimal,
    /// The share of `gift_certificates_total` from API-sourced campaigns.
    pub api_certificates_total: Decimal,
}

/// Computes the full totals breakdown over a set of rows.
///
/// Per priced row: `price * quantity` accumulates into the subtotal and its
/// VAT share into `vat`, bucketed high/low around the 10% cutoff; the row's
/// stacked discount comes straight off the subtotal. Shipping and
/// transaction costs are taxed at the service rate. The grand total never
/// goes below zero.
pub fn order_totals(rows: &[order_row::Model], ctx: &TotalsContext) -> RawTotals {
    let mut totals = RawTotals::default();

    for row in rows {
        let Some(price) = row.price else { continue };
        let line = price * Decimal::from(row.quantity);
        let line_vat = price::vat(line, row.vat);

        totals.subtotal += line;
        totals.vat += line_vat;
        if row.vat > policy::high_vat_cutoff() {
            totals.subtotal_high += line;
            totals.vat_high += line_vat;
        } else {
            totals.subtotal_low += line;
            totals.vat_low += line_vat;
        }

        totals.subtotal -= row.stacked_discount();
    }

    totals.shipping = ctx.shipping;
    totals.transaction_cost = ctx.transaction_cost;
    totals.vat += price::vat(ctx.shipping, policy::service_vat_rate());
    totals.vat += price::vat(ctx.transaction_cost, policy::service_vat_rate());

    totals.discount = -ctx.discount_total;
    totals.gift_certificates = -ctx.gift_certificates_total;
    totals.api_certificate_rectification = -ctx.api_certificates_total;

    let total = totals.subtotal
        + totals.shipping
        + totals.discount
        + totals.gift_certificates
        + totals.transaction_cost;
    totals.total = total.max(Decimal::ZERO);

    totals
}

impl RawTotals {
    /// Invoice lines in display order, formatted. Zero-valued optional
    /// lines (transaction cost, discount, certificates) are left out.
    pub fn display(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Subtotaal", price::format(self.subtotal)),
            ("Waarvan BTW", price::format(self.vat)),
            ("Verzendkosten", price::format(self.shipping)),
        ];
        if !self.transaction_cost.is_zero() {
            lines.push(("Transactiekosten", price::format(self.transaction_cost)));
        }
        if !self.discount.is_zero() {
            lines.push(("Korting", price::format(self.discount)));
        }
        if !self.gift_certificates.is_zero() {
            lines.push(("Cadeaukaarten", price::format(self.gift_certificates)));
        }
        lines.push(("Totaal", price::format(self.total)));
        lines
    }
}
