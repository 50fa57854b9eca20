// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Daily aggregation: fold the event stream into one row per (date, mode).
//!
//! Pure and deterministic: the same events and classifications produce
//! byte-identical rows on every run, which is what makes the upsert keyed by
//! (tenant_id, date, mode) a safe full-recompute-and-overwrite path.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    Anomaly, AttributionMode, CustomerClassification, DailySalesRow, EventKind, FinancialEvent,
    LegacyModeLabel, ShopifyModeLabel,
};

#[derive(Debug, Default)]
struct DayBucket {
    gross: Decimal,
    discounts: Decimal,
    returns: Decimal,
    new_net: Decimal,
    returning_net: Decimal,
    guest_net: Decimal,
    unknown_net: Decimal,
    sale_orders: BTreeSet<String>,
    currency_counts: BTreeMap<String, u32>,
}

/// Which of the three buckets an order's net contribution lands in for the
/// requested mode. UNKNOWN rolls into returning for the partition, and is
/// tracked separately so it never vanishes silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitBucket {
    New,
    Returning,
    Guest,
    Unknown,
}

fn split_bucket(
    classification: Option<&CustomerClassification>,
    mode: AttributionMode,
) -> SplitBucket {
    let Some(c) = classification else {
        return SplitBucket::Unknown;
    };
    match mode {
        AttributionMode::Shopify => match c.shopify_mode {
            ShopifyModeLabel::FirstTime => SplitBucket::New,
            ShopifyModeLabel::Returning => SplitBucket::Returning,
            ShopifyModeLabel::Guest => SplitBucket::Guest,
            ShopifyModeLabel::Unknown => SplitBucket::Unknown,
        },
        AttributionMode::Legacy => match c.legacy_mode {
            LegacyModeLabel::New => SplitBucket::New,
            LegacyModeLabel::Returning => SplitBucket::Returning,
            LegacyModeLabel::Guest => SplitBucket::Guest,
            LegacyModeLabel::Unknown => SplitBucket::Unknown,
        },
    }
}

/// Fold events into per-day rows for one tenant and mode.
///
/// A return on day N affects day N's totals, not the original sale's day.
/// Order count only counts SALE events; return-only days stay at zero.
pub fn aggregate(
    tenant_id: &str,
    events: &[FinancialEvent],
    classifications: &HashMap<String, CustomerClassification>,
    mode: AttributionMode,
) -> (Vec<DailySalesRow>, Vec<Anomaly>) {
    let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for event in events {
        let bucket = days.entry(event.occurred_on).or_default();
        bucket.gross += event.gross_excl_tax;
        bucket.discounts += event.discount_excl_tax;
        bucket.returns += event.return_excl_tax;
        if event.kind == EventKind::Sale {
            bucket.sale_orders.insert(event.order_id.clone());
        }
        *bucket.currency_counts.entry(event.currency.clone()).or_insert(0) += 1;

        // Net contribution of this event, signed; SALE carries gross and
        // discount, RETURN carries only the returned amount.
        let net = event.gross_excl_tax - event.discount_excl_tax - event.return_excl_tax;
        match split_bucket(classifications.get(&event.order_id), mode) {
            SplitBucket::New => bucket.new_net += net,
            SplitBucket::Returning => bucket.returning_net += net,
            SplitBucket::Guest => bucket.guest_net += net,
            SplitBucket::Unknown => {
                bucket.returning_net += net;
                bucket.unknown_net += net;
            }
        }
    }

    let mut rows = Vec::with_capacity(days.len());
    let mut anomalies = Vec::new();
    for (date, bucket) in days {
        let (currency, mixed) = pick_currency(&bucket.currency_counts);
        if mixed {
            anomalies.push(Anomaly::MixedCurrencies {
                date,
                kept: currency.clone(),
            });
        }

        // Round once, at emission. The returning bucket absorbs the rounding
        // remainder so the three-way split sums to net exactly.
        let net = (bucket.gross - bucket.discounts - bucket.returns).round_dp(2);
        let new_net = bucket.new_net.round_dp(2);
        let guest_net = bucket.guest_net.round_dp(2);
        rows.push(DailySalesRow {
            tenant_id: tenant_id.to_string(),
            date,
            mode,
            currency,
            gross_sales_excl_tax: bucket.gross.round_dp(2),
            discounts_excl_tax: bucket.discounts.round_dp(2),
            refunds_excl_tax: bucket.returns.round_dp(2),
            net_sales_excl_tax: net,
            orders_count: bucket.sale_orders.len() as u32,
            new_customer_net_sales: new_net,
            returning_customer_net_sales: net - new_net - guest_net,
            guest_net_sales: guest_net,
            unknown_net_sales: bucket.unknown_net.round_dp(2),
        });
    }
    (rows, anomalies)
}

/// Most frequent currency wins; ties break lexicographically so the result
/// is stable across runs. Mixed input is a documented limitation, not an
/// error.
fn pick_currency(counts: &BTreeMap<String, u32>) -> (String, bool) {
    let mut best: Option<(&str, u32)> = None;
    for (ccy, n) in counts {
        match best {
            Some((_, bn)) if *n <= bn => {}
            _ => best = Some((ccy, *n)),
        }
    }
    match best {
        Some((ccy, _)) => (ccy.to_string(), counts.len() > 1),
        None => (String::new(), false),
    }
}
