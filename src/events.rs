// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Event mapping: one order plus its refunds becomes an ordered sequence of
//! dated financial events. All the money math already happened in the
//! allocator; this module only groups and converts dates.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use rust_decimal::Decimal;

use crate::allocation::OrderAllocation;
use crate::models::{Anomaly, EventKind, FinancialEvent, Order};
use crate::refunds::RefundAttribution;
use crate::utils::local_date_of;

/// Map one order to its SALE and RETURN events.
///
/// Exactly one SALE event dated at the order's creation date in store-local
/// time (the source platform's own analytics buckets by creation date, and
/// reconciling against it requires the same bucketing), plus one RETURN event
/// per distinct refund date. Deterministic: same order and timezone in, same
/// event list out.
pub fn map_order_to_events(
    order: &Order,
    allocation: &OrderAllocation,
    refunds: &[RefundAttribution],
    tz: Tz,
) -> (Vec<FinancialEvent>, Vec<Anomaly>) {
    let mut events = Vec::new();
    let mut anomalies = Vec::new();

    match local_date_of(&order.created_at, tz) {
        Some(date) => events.push(FinancialEvent {
            order_id: order.order_id.clone(),
            occurred_on: date,
            kind: EventKind::Sale,
            gross_excl_tax: allocation.gross_excl_tax,
            discount_excl_tax: allocation.discount_excl_tax,
            return_excl_tax: Decimal::ZERO,
            tax: allocation.tax,
            currency: order.currency.clone(),
        }),
        None => anomalies.push(Anomaly::InvalidTimestamp {
            order_id: order.order_id.clone(),
            field: "created_at",
            raw: order.created_at.clone(),
        }),
    }

    // BTreeMap keeps return events date-ordered regardless of refund order.
    let mut by_date: BTreeMap<chrono::NaiveDate, Decimal> = BTreeMap::new();
    for r in refunds {
        *by_date.entry(r.occurred_on).or_insert(Decimal::ZERO) += r.amount_excl_tax;
    }
    for (date, amount) in by_date {
        events.push(FinancialEvent {
            order_id: order.order_id.clone(),
            occurred_on: date,
            kind: EventKind::Return,
            gross_excl_tax: Decimal::ZERO,
            discount_excl_tax: Decimal::ZERO,
            return_excl_tax: amount,
            tax: Decimal::ZERO,
            currency: order.currency.clone(),
        });
    }

    (events, anomalies)
}
