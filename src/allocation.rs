// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Line-item allocation: derive tax-exclusive order totals from the
//! tax-inclusive money fields, then proportion them down to line items.
//!
//! Order-level figures are the source of truth; line items only ever receive
//! a share of them. Rounding happens once at the final read (row emission),
//! never per line, so the line shares always sum back to the order totals.

use rust_decimal::Decimal;

use crate::models::Order;
use crate::refunds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineAllocation {
    pub line_item_id: String,
    pub gross_excl_tax: Decimal,
    pub discount_excl_tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAllocation {
    pub gross_excl_tax: Decimal,
    pub discount_excl_tax: Decimal,
    pub net_excl_tax_before_refunds: Decimal,
    pub refunds_excl_tax: Decimal,
    pub tax: Decimal,
    pub lines: Vec<LineAllocation>,
    /// False when a zero allocation denominator left the line-item split
    /// short of the order total. The order-level figures stay correct; only
    /// the per-line detail is incomplete. Audit flag, not an error.
    pub complete: bool,
}

/// Allocate one order. Total-price math first, proportional split second.
///
/// The sum of line prices is not guaranteed to reconcile with
/// `subtotal_price` (bundles, promotions), so line shares are computed from
/// allocation factors rather than assumed equal to the list prices.
pub fn allocate_order(order: &Order) -> OrderAllocation {
    let net_excl_tax_before_refunds = order.subtotal_price - order.total_tax;

    // Discounts arrive tax-inclusive. When the order carries tax, back the
    // implicit rate out of subtotal/tax; a no-tax order needs no adjustment.
    let discount_excl_tax =
        if order.subtotal_price > Decimal::ZERO && order.total_tax > Decimal::ZERO {
            let rate = order.total_tax / order.subtotal_price;
            order.total_discounts / (Decimal::ONE + rate)
        } else {
            order.total_discounts
        };

    // Gross is defined as unaffected by discounts or refunds; the net figure
    // already subtracted both, so both are added back.
    let refunds_excl_tax = refunds::total_refunded_excl_tax(order);
    let gross_excl_tax = net_excl_tax_before_refunds + discount_excl_tax + refunds_excl_tax;

    let total_line_gross_incl: Decimal = order
        .line_items
        .iter()
        .map(|li| li.unit_price_incl_tax * Decimal::from(li.quantity))
        .sum();
    let total_line_discount_incl: Decimal = order
        .line_items
        .iter()
        .map(line_discount_incl)
        .sum();

    // An order with money but no line detail still aggregates correctly at
    // the order level; only the per-line split is missing.
    let mut complete = !(order.line_items.is_empty() && !gross_excl_tax.is_zero());
    let mut lines = Vec::with_capacity(order.line_items.len());
    for li in &order.line_items {
        let line_gross_incl = li.unit_price_incl_tax * Decimal::from(li.quantity);
        let gross_share = match factor(line_gross_incl, total_line_gross_incl) {
            Some(f) => gross_excl_tax * f,
            None => {
                if !gross_excl_tax.is_zero() {
                    complete = false;
                }
                Decimal::ZERO
            }
        };
        let discount_share = match factor(line_discount_incl(li), total_line_discount_incl) {
            Some(f) => discount_excl_tax * f,
            None => {
                if !discount_excl_tax.is_zero() {
                    complete = false;
                }
                Decimal::ZERO
            }
        };
        lines.push(LineAllocation {
            line_item_id: li.id.clone(),
            gross_excl_tax: gross_share,
            discount_excl_tax: discount_share,
        });
    }

    OrderAllocation {
        gross_excl_tax,
        discount_excl_tax,
        net_excl_tax_before_refunds,
        refunds_excl_tax,
        tax: order.total_tax,
        lines,
        complete,
    }
}

fn line_discount_incl(li: &crate::models::LineItem) -> Decimal {
    li.discount_allocations
        .iter()
        .map(|d| d.amount_incl_tax)
        .sum()
}

/// Allocation factor, or None when the denominator is zero. A degenerate
/// order gets a zero share, never NaN or a panic.
fn factor(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        Some(numerator / denominator)
    }
}
