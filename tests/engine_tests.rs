// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shopfold::classify::InMemoryHistory;
use shopfold::engine::run_batch;
use shopfold::models::{Anomaly, AttributionMode, EngineConfig, Order, ReportingPeriod};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn config(mode: AttributionMode) -> EngineConfig {
    EngineConfig {
        tenant_id: "t1".to_string(),
        timezone: chrono_tz::UTC,
        period: ReportingPeriod {
            from: date("2025-01-01"),
            to: date("2025-01-31"),
        },
        mode,
    }
}

fn batch_from_json(raw: &str) -> Vec<Order> {
    serde_json::from_str(raw).unwrap()
}

const SAMPLE_BATCH: &str = r#"[
    {
        "order_id": "o1",
        "tenant_id": "t1",
        "created_at": "2025-01-01T10:00:00Z",
        "currency": "SEK",
        "subtotal_price": "70",
        "total_tax": "0",
        "total_discounts": "0",
        "line_items": [
            {"id": "l1", "title": "Mug", "unit_price_incl_tax": "100", "quantity": 1}
        ],
        "customer": {"id": "c1", "created_at": "2025-01-01T09:00:00Z", "lifetime_order_count": 1},
        "refunds": [
            {
                "created_at": "2025-01-03T09:00:00Z",
                "refund_line_items": [
                    {"line_item_id": "l1", "quantity": 1, "subtotal_excl_tax": "30"}
                ]
            }
        ]
    },
    {
        "order_id": "o2",
        "tenant_id": "t1",
        "created_at": "2025-01-02T12:00:00Z",
        "currency": "SEK",
        "subtotal_price": "120",
        "total_tax": "20",
        "total_discounts": "0",
        "line_items": [
            {"id": "l2", "title": "Kettle", "unit_price_incl_tax": "120", "quantity": 1}
        ]
    }
]"#;

#[test]
fn end_to_end_batch_produces_daily_rows() {
    let orders = batch_from_json(SAMPLE_BATCH);
    let history = InMemoryHistory::from_batch(&orders);
    let result = run_batch(&orders, &config(AttributionMode::Shopify), &history);

    assert_eq!(result.rows.len(), 3);
    // o1: refund-reduced subtotal 70 plus 30 refund back = 100 gross on day 1
    assert_eq!(result.rows[0].date, date("2025-01-01"));
    assert_eq!(result.rows[0].gross_sales_excl_tax, dec("100.00"));
    assert_eq!(result.rows[0].new_customer_net_sales, dec("100.00"));
    // o2 is a guest order: 120 incl tax, 20 tax
    assert_eq!(result.rows[1].date, date("2025-01-02"));
    assert_eq!(result.rows[1].gross_sales_excl_tax, dec("100.00"));
    assert_eq!(result.rows[1].guest_net_sales, dec("100.00"));
    // the o1 refund lands on day 3, not day 1
    assert_eq!(result.rows[2].date, date("2025-01-03"));
    assert_eq!(result.rows[2].refunds_excl_tax, dec("30.00"));
    assert_eq!(result.rows[2].net_sales_excl_tax, dec("-30.00"));

    assert!(result.anomalies.is_empty());
}

#[test]
fn engine_is_idempotent_across_runs() {
    let orders = batch_from_json(SAMPLE_BATCH);
    let history = InMemoryHistory::from_batch(&orders);
    let cfg = config(AttributionMode::Shopify);
    let a = run_batch(&orders, &cfg, &history);
    let b = run_batch(&orders, &cfg, &history);
    assert_eq!(a.rows, b.rows);
}

#[test]
fn foreign_tenant_orders_are_skipped() {
    let mut orders = batch_from_json(SAMPLE_BATCH);
    orders[1].tenant_id = "other".to_string();
    let history = InMemoryHistory::from_batch(&orders);
    let result = run_batch(&orders, &config(AttributionMode::Shopify), &history);
    assert_eq!(result.rows.len(), 2);
    assert!(result.rows.iter().all(|r| r.tenant_id == "t1"));
}

#[test]
fn malformed_order_is_isolated_not_fatal() {
    let mut orders = batch_from_json(SAMPLE_BATCH);
    orders[0].created_at = "not-a-timestamp".to_string();
    let history = InMemoryHistory::from_batch(&orders);
    let result = run_batch(&orders, &config(AttributionMode::Shopify), &history);

    // o2 still aggregates; o1's sale is dropped but its refund survives.
    assert!(result.rows.iter().any(|r| r.date == date("2025-01-02")));
    assert!(result.rows.iter().any(|r| r.date == date("2025-01-03")));
    assert!(result
        .anomalies
        .iter()
        .any(|a| matches!(a, Anomaly::InvalidTimestamp { field: "created_at", .. })));
}

#[test]
fn missing_customer_signal_is_reported() {
    let raw = r#"[{
        "order_id": "o1",
        "tenant_id": "t1",
        "created_at": "2025-01-05T10:00:00Z",
        "currency": "SEK",
        "subtotal_price": "50",
        "total_tax": "0",
        "total_discounts": "0",
        "line_items": [{"id": "l1", "unit_price_incl_tax": "50", "quantity": 1}],
        "customer": {"id": "c9"}
    }]"#;
    let orders = batch_from_json(raw);
    let history = InMemoryHistory::from_batch(&orders);
    let result = run_batch(&orders, &config(AttributionMode::Shopify), &history);
    assert!(result
        .anomalies
        .iter()
        .any(|a| matches!(a, Anomaly::MissingCustomerSignal { .. })));
    // Unknown classification still aggregates, into the returning bucket.
    assert_eq!(result.rows[0].returning_customer_net_sales, dec("50.00"));
    assert_eq!(result.rows[0].unknown_net_sales, dec("50.00"));
}

#[test]
fn totals_stay_within_reconciliation_tolerance() {
    // The platform's own analytics apply undocumented internal adjustments;
    // an exact match is out of reach by design. Assert the gap stays under
    // 1% for the sample period instead of forcing equality.
    let orders = batch_from_json(SAMPLE_BATCH);
    let history = InMemoryHistory::from_batch(&orders);
    let result = run_batch(&orders, &config(AttributionMode::Shopify), &history);

    let net_total: Decimal = result.rows.iter().map(|r| r.net_sales_excl_tax).sum();
    let platform_reported = dec("171.05");
    let gap = ((net_total - platform_reported) / platform_reported).abs();
    assert!(gap < dec("0.01"), "gap {} exceeds 1%", gap);
}
