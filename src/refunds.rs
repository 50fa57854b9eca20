// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Refund attribution: map each refund to the order lines it reversed and to
//! the store-local calendar date it happened on.
//!
//! The date is the refund's own `created_at`, never the original sale date.
//! Returns must land on the day they happened so daily totals reconcile
//! against refund-by-day reporting.

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;

use crate::models::{Anomaly, Order};
use crate::utils::local_date_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundAttribution {
    pub occurred_on: NaiveDate,
    /// None for refunds with no line-item reversal (shipping-only refunds),
    /// which keep their order-level amount but carry no line detail.
    pub line_item_id: Option<String>,
    pub amount_excl_tax: Decimal,
}

/// Attribute an order's refunds to (date, line, amount) tuples.
///
/// Refund line subtotals are already tax-exclusive in the source data, so no
/// re-derivation happens here. A refund whose timestamp cannot be parsed is
/// dropped and counted; silent loss in a financial aggregate is not
/// acceptable.
pub fn attribute_refunds(order: &Order, tz: Tz) -> (Vec<RefundAttribution>, Vec<Anomaly>) {
    let mut out = Vec::new();
    let mut anomalies = Vec::new();
    for refund in &order.refunds {
        let Some(date) = local_date_of(&refund.created_at, tz) else {
            anomalies.push(Anomaly::InvalidTimestamp {
                order_id: order.order_id.clone(),
                field: "refund.created_at",
                raw: refund.created_at.clone(),
            });
            continue;
        };
        if refund.refund_line_items.is_empty() {
            if !refund.total_refunded.is_zero() {
                out.push(RefundAttribution {
                    occurred_on: date,
                    line_item_id: None,
                    amount_excl_tax: refund.total_refunded,
                });
            }
            continue;
        }
        for rli in &refund.refund_line_items {
            out.push(RefundAttribution {
                occurred_on: date,
                line_item_id: Some(rli.line_item_id.clone()),
                amount_excl_tax: rli.subtotal_excl_tax,
            });
        }
    }
    (out, anomalies)
}

/// Order-level tax-exclusive refund total, independent of dates. Used by the
/// allocator to add refunds back into gross.
pub fn total_refunded_excl_tax(order: &Order) -> Decimal {
    order
        .refunds
        .iter()
        .map(|r| {
            if r.refund_line_items.is_empty() {
                r.total_refunded
            } else {
                r.refund_line_items
                    .iter()
                    .map(|rli| rli.subtotal_excl_tax)
                    .sum()
            }
        })
        .sum()
}
