// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Batch orchestration: orders in, daily rows plus anomalies out.
//!
//! The engine is pure and single-threaded per run: a deterministic function
//! over an in-memory batch with no shared mutable state. Callers parallelize
//! across tenants if they want to; one batch never crosses tenants.

use std::collections::HashMap;

use crate::aggregate;
use crate::allocation;
use crate::classify::{self, LifetimeHistoryProvider};
use crate::events;
use crate::models::{Anomaly, CustomerClassification, DailySalesRow, EngineConfig, Order};
use crate::refunds;

#[derive(Debug)]
pub struct BatchResult {
    pub rows: Vec<DailySalesRow>,
    /// Per-order findings. One malformed order never sinks the batch; its
    /// damage is contained here and the run continues.
    pub anomalies: Vec<Anomaly>,
}

/// Run the full pipeline for one tenant's batch: allocate, attribute
/// refunds, map events, classify, aggregate.
///
/// Orders whose tenant does not match the config are skipped outright; the
/// fetcher contract says a batch is single-tenant, and a stray row must not
/// leak into another tenant's aggregates.
pub fn run_batch(
    orders: &[Order],
    cfg: &EngineConfig,
    history: &dyn LifetimeHistoryProvider,
) -> BatchResult {
    let mut all_events = Vec::new();
    let mut anomalies = Vec::new();
    let mut classifications: HashMap<String, CustomerClassification> = HashMap::new();

    for order in orders {
        if order.tenant_id != cfg.tenant_id {
            continue;
        }

        let allocation = allocation::allocate_order(order);
        if !allocation.complete {
            anomalies.push(Anomaly::LowAllocationConfidence {
                order_id: order.order_id.clone(),
            });
        }

        let (refund_attrs, refund_anomalies) = refunds::attribute_refunds(order, cfg.timezone);
        anomalies.extend(refund_anomalies);

        let (order_events, event_anomalies) =
            events::map_order_to_events(order, &allocation, &refund_attrs, cfg.timezone);
        anomalies.extend(event_anomalies);
        all_events.extend(order_events);

        let classification = classify::classify_order(order, &cfg.period, cfg.timezone, history);
        if let Some(customer) = &order.customer {
            if customer.lifetime_order_count.is_none() {
                anomalies.push(Anomaly::MissingCustomerSignal {
                    order_id: order.order_id.clone(),
                    customer_id: customer.id.clone(),
                });
            }
        }
        classifications.insert(order.order_id.clone(), classification);
    }

    let (rows, agg_anomalies) =
        aggregate::aggregate(&cfg.tenant_id, &all_events, &classifications, cfg.mode);
    anomalies.extend(agg_anomalies);

    BatchResult { rows, anomalies }
}
