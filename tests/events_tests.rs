// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shopfold::allocation::allocate_order;
use shopfold::events::map_order_to_events;
use shopfold::models::{Anomaly, EventKind, LineItem, Order, Refund, RefundLineItem};
use shopfold::refunds::attribute_refunds;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn order_with_refund(created_at: &str, refund_at: &str, refund_amount: &str) -> Order {
    Order {
        order_id: "o1".to_string(),
        order_number: None,
        tenant_id: "t1".to_string(),
        created_at: created_at.to_string(),
        processed_at: None,
        currency: "SEK".to_string(),
        subtotal_price: dec("70"),
        total_tax: Decimal::ZERO,
        total_discounts: Decimal::ZERO,
        line_items: vec![LineItem {
            id: "l1".to_string(),
            sku: None,
            title: "Item".to_string(),
            unit_price_incl_tax: dec("100"),
            quantity: 1,
            discount_allocations: vec![],
            tax_lines: vec![],
        }],
        customer: None,
        refunds: vec![Refund {
            created_at: refund_at.to_string(),
            refund_line_items: vec![RefundLineItem {
                line_item_id: "l1".to_string(),
                quantity: 1,
                subtotal_excl_tax: dec(refund_amount),
            }],
            total_refunded: Decimal::ZERO,
        }],
        financial_status: None,
        cancelled_at: None,
    }
}

#[test]
fn sale_and_return_land_on_their_own_dates() {
    let o = order_with_refund("2025-01-01T10:00:00Z", "2025-01-03T09:00:00Z", "30");
    let alloc = allocate_order(&o);
    let (refunds, _) = attribute_refunds(&o, chrono_tz::UTC);
    let (events, anomalies) = map_order_to_events(&o, &alloc, &refunds, chrono_tz::UTC);
    assert!(anomalies.is_empty());
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].kind, EventKind::Sale);
    assert_eq!(events[0].occurred_on, date("2025-01-01"));
    assert_eq!(events[0].gross_excl_tax, dec("100"));
    assert_eq!(events[0].return_excl_tax, Decimal::ZERO);

    assert_eq!(events[1].kind, EventKind::Return);
    assert_eq!(events[1].occurred_on, date("2025-01-03"));
    assert_eq!(events[1].return_excl_tax, dec("30"));
    assert_eq!(events[1].gross_excl_tax, Decimal::ZERO);
}

#[test]
fn refund_date_uses_store_timezone_not_utc() {
    // 23:30 UTC on Jan 2 is already Jan 3 in Stockholm.
    let o = order_with_refund("2025-01-01T10:00:00Z", "2025-01-02T23:30:00Z", "30");
    let alloc = allocate_order(&o);
    let tz: chrono_tz::Tz = "Europe/Stockholm".parse().unwrap();
    let (refunds, _) = attribute_refunds(&o, tz);
    let (events, _) = map_order_to_events(&o, &alloc, &refunds, tz);
    assert_eq!(events[1].occurred_on, date("2025-01-03"));
}

#[test]
fn refunds_on_the_same_day_collapse_to_one_return_event() {
    let mut o = order_with_refund("2025-01-01T10:00:00Z", "2025-01-03T09:00:00Z", "10");
    o.refunds.push(Refund {
        created_at: "2025-01-03T15:00:00Z".to_string(),
        refund_line_items: vec![RefundLineItem {
            line_item_id: "l1".to_string(),
            quantity: 1,
            subtotal_excl_tax: dec("5"),
        }],
        total_refunded: Decimal::ZERO,
    });
    let alloc = allocate_order(&o);
    let (refunds, _) = attribute_refunds(&o, chrono_tz::UTC);
    let (events, _) = map_order_to_events(&o, &alloc, &refunds, chrono_tz::UTC);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].return_excl_tax, dec("15"));
}

#[test]
fn shipping_only_refund_keeps_its_order_level_amount() {
    let mut o = order_with_refund("2025-01-01T10:00:00Z", "2025-01-02T09:00:00Z", "0");
    o.refunds = vec![Refund {
        created_at: "2025-01-02T09:00:00Z".to_string(),
        refund_line_items: vec![],
        total_refunded: dec("12.50"),
    }];
    let (refunds, anomalies) = attribute_refunds(&o, chrono_tz::UTC);
    assert!(anomalies.is_empty());
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].line_item_id, None);
    assert_eq!(refunds[0].amount_excl_tax, dec("12.50"));
}

#[test]
fn bad_sale_timestamp_drops_only_the_sale_event() {
    let o = order_with_refund("not-a-date", "2025-01-03T09:00:00Z", "30");
    let alloc = allocate_order(&o);
    let (refunds, _) = attribute_refunds(&o, chrono_tz::UTC);
    let (events, anomalies) = map_order_to_events(&o, &alloc, &refunds, chrono_tz::UTC);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Return);
    assert!(matches!(
        anomalies[0],
        Anomaly::InvalidTimestamp { field: "created_at", .. }
    ));
}

#[test]
fn bad_refund_timestamp_is_dropped_and_counted() {
    let o = order_with_refund("2025-01-01T10:00:00Z", "garbage", "30");
    let (refunds, anomalies) = attribute_refunds(&o, chrono_tz::UTC);
    assert!(refunds.is_empty());
    assert_eq!(anomalies.len(), 1);
    assert!(matches!(
        anomalies[0],
        Anomaly::InvalidTimestamp { field: "refund.created_at", .. }
    ));
}

#[test]
fn mapping_is_deterministic() {
    let o = order_with_refund("2025-01-01T10:00:00Z", "2025-01-03T09:00:00Z", "30");
    let alloc = allocate_order(&o);
    let (refunds, _) = attribute_refunds(&o, chrono_tz::UTC);
    let (a, _) = map_order_to_events(&o, &alloc, &refunds, chrono_tz::UTC);
    let (b, _) = map_order_to_events(&o, &alloc, &refunds, chrono_tz::UTC);
    assert_eq!(a, b);
}
