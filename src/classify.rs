// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Customer classification under two coexisting schemes.
//!
//! The current (shopify-mode) and legacy definitions of "new customer"
//! disagree and both stay persisted for backward-compatible reporting, so
//! they are two pure functions over the same inputs rather than one
//! configurable one. Classification never fails: missing history signals
//! resolve to UNKNOWN, which stays visible in output.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::models::{
    CustomerClassification, LegacyModeLabel, Order, ReportingPeriod, ShopifyModeLabel,
};
use crate::utils::local_date_of;

/// External collaborator supplying full per-customer order history. The
/// lifetime first-order flag needs every order a customer ever placed, not
/// just the batch being aggregated, so it cannot be derived locally.
pub trait LifetimeHistoryProvider {
    /// Id of the customer's earliest order (minimum created_at, ties broken
    /// by order id), or None when the customer is unknown to the history.
    fn first_order_id(&self, customer_id: &str) -> Option<String>;
}

/// In-memory history, built from (customer id, order id, created_at) tuples.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    first_by_customer: HashMap<String, (DateTime<Utc>, String)>,
}

impl InMemoryHistory {
    pub fn from_orders<I>(orders: I) -> Self
    where
        I: IntoIterator<Item = (String, String, DateTime<Utc>)>,
    {
        let mut first_by_customer: HashMap<String, (DateTime<Utc>, String)> = HashMap::new();
        for (customer_id, order_id, created_at) in orders {
            match first_by_customer.get(&customer_id) {
                Some((at, id)) if (*at, id.as_str()) <= (created_at, order_id.as_str()) => {}
                _ => {
                    first_by_customer.insert(customer_id, (created_at, order_id));
                }
            }
        }
        Self { first_by_customer }
    }

    /// Approximate history from the batch itself, for callers without a real
    /// history feed. Lifetime-first flags are then only correct when the
    /// batch actually covers each customer's full history.
    pub fn from_batch(orders: &[Order]) -> Self {
        Self::from_orders(orders.iter().filter_map(|o| {
            let customer = o.customer.as_ref()?;
            let at = DateTime::parse_from_rfc3339(o.created_at.trim())
                .ok()?
                .with_timezone(&Utc);
            Some((customer.id.clone(), o.order_id.clone(), at))
        }))
    }
}

impl LifetimeHistoryProvider for InMemoryHistory {
    fn first_order_id(&self, customer_id: &str) -> Option<String> {
        self.first_by_customer
            .get(customer_id)
            .map(|(_, id)| id.clone())
    }
}

/// Classify one order under both schemes.
///
/// The shopify-mode label is period-relative: "customer created in this
/// period" is part of the predicate, so the same order can classify
/// differently under different reporting windows. That is why the period is
/// an explicit parameter and never a global.
pub fn classify_order(
    order: &Order,
    period: &ReportingPeriod,
    tz: Tz,
    history: &dyn LifetimeHistoryProvider,
) -> CustomerClassification {
    let shopify_mode = shopify_mode_label(order, period, tz);
    let legacy_mode = legacy_mode_label(order);
    let is_first = match &order.customer {
        Some(c) => history.first_order_id(&c.id).as_deref() == Some(order.order_id.as_str()),
        None => false,
    };
    CustomerClassification {
        order_id: order.order_id.clone(),
        shopify_mode,
        legacy_mode,
        is_first_order_for_customer_lifetime: is_first,
    }
}

/// Current scheme: FIRST_TIME when the customer was created in the reporting
/// period or this is their lifetime order #1, and the order itself falls in
/// the period.
fn shopify_mode_label(order: &Order, period: &ReportingPeriod, tz: Tz) -> ShopifyModeLabel {
    let Some(customer) = &order.customer else {
        return ShopifyModeLabel::Guest;
    };

    let order_in_period = local_date_of(&order.created_at, tz)
        .map(|d| period.contains(d))
        .unwrap_or(false);
    let customer_created_in_period = customer
        .created_at
        .as_deref()
        .and_then(|raw| local_date_of(raw, tz))
        .map(|d| period.contains(d))
        .unwrap_or(false);

    match customer.lifetime_order_count {
        Some(count) => {
            if (customer_created_in_period || count == 1) && order_in_period {
                ShopifyModeLabel::FirstTime
            } else {
                ShopifyModeLabel::Returning
            }
        }
        // No order count: the period signal alone can still prove FIRST_TIME,
        // anything else is undecidable.
        None => {
            if customer_created_in_period && order_in_period {
                ShopifyModeLabel::FirstTime
            } else {
                ShopifyModeLabel::Unknown
            }
        }
    }
}

/// Deprecated scheme: period-independent, purely count-based.
fn legacy_mode_label(order: &Order) -> LegacyModeLabel {
    let Some(customer) = &order.customer else {
        return LegacyModeLabel::Guest;
    };
    match customer.lifetime_order_count {
        Some(1) => LegacyModeLabel::New,
        Some(_) => LegacyModeLabel::Returning,
        None => LegacyModeLabel::Unknown,
    }
}
