// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

/// Canonical order shape. This is the single ingestion adapter: whatever the
/// upstream fetcher hands over is deserialized into this type once, and no
/// downstream module ever branches on source-specific field names. Money
/// fields accept string, number or null (see `money::de_amount`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(alias = "id")]
    pub order_id: String,
    #[serde(default)]
    pub order_number: Option<String>,
    pub tenant_id: String,
    /// ISO-8601 instant as delivered; parsed once at event mapping so a bad
    /// timestamp surfaces as a counted anomaly instead of a deserialize error.
    pub created_at: String,
    #[serde(default)]
    pub processed_at: Option<String>,
    pub currency: String,
    /// Tax-inclusive, in shop currency.
    #[serde(default, deserialize_with = "money::de_amount")]
    pub subtotal_price: Decimal,
    #[serde(default, deserialize_with = "money::de_amount")]
    pub total_tax: Decimal,
    #[serde(default, deserialize_with = "money::de_amount")]
    pub total_discounts: Decimal,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Absent means guest checkout.
    #[serde(default)]
    pub customer: Option<CustomerSummary>,
    #[serde(default)]
    pub refunds: Vec<Refund>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub cancelled_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(alias = "line_item_id")]
    pub id: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "money::de_amount")]
    pub unit_price_incl_tax: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub discount_allocations: Vec<DiscountAllocation>,
    #[serde(default)]
    pub tax_lines: Vec<TaxLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountAllocation {
    #[serde(default, deserialize_with = "money::de_amount")]
    pub amount_incl_tax: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxLine {
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default, deserialize_with = "money::de_amount")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Missing counts as an unknown classification signal, never as zero.
    #[serde(default)]
    pub lifetime_order_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub created_at: String,
    #[serde(default)]
    pub refund_line_items: Vec<RefundLineItem>,
    /// Order-level tax-exclusive total. Only consulted when the refund has no
    /// line items (shipping-only refunds keep their money via this field).
    #[serde(default, alias = "amount", deserialize_with = "money::de_amount")]
    pub total_refunded: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundLineItem {
    pub line_item_id: String,
    #[serde(default)]
    pub quantity: u32,
    /// Already tax-exclusive in the source data.
    #[serde(default, deserialize_with = "money::de_amount")]
    pub subtotal_excl_tax: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Sale,
    Return,
}

/// The atomic unit the daily aggregator consumes. Immutable once built; the
/// aggregator only folds it into running totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialEvent {
    pub order_id: String,
    /// Calendar date in store-local time.
    pub occurred_on: NaiveDate,
    pub kind: EventKind,
    pub gross_excl_tax: Decimal,
    pub discount_excl_tax: Decimal,
    pub return_excl_tax: Decimal,
    pub tax: Decimal,
    pub currency: String,
}

/// Current-mode customer label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopifyModeLabel {
    FirstTime,
    Returning,
    Guest,
    Unknown,
}

/// Deprecated labeling, retained so historical rows stay queryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegacyModeLabel {
    New,
    Returning,
    Guest,
    Unknown,
}

/// Per-order classification under both schemes. A pure function of
/// (order, customer history, reporting period); never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerClassification {
    pub order_id: String,
    pub shopify_mode: ShopifyModeLabel,
    pub legacy_mode: LegacyModeLabel,
    pub is_first_order_for_customer_lifetime: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionMode {
    Shopify,
    Legacy,
}

impl AttributionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionMode::Shopify => "shopify",
            AttributionMode::Legacy => "legacy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "shopify" => Some(AttributionMode::Shopify),
            "legacy" => Some(AttributionMode::Legacy),
            _ => None,
        }
    }
}

/// Persisted aggregate, uniquely keyed by (tenant_id, date, mode).
/// Recomputed wholesale and upserted; never patched incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySalesRow {
    pub tenant_id: String,
    pub date: NaiveDate,
    pub mode: AttributionMode,
    pub currency: String,
    pub gross_sales_excl_tax: Decimal,
    pub discounts_excl_tax: Decimal,
    pub refunds_excl_tax: Decimal,
    pub net_sales_excl_tax: Decimal,
    pub orders_count: u32,
    pub new_customer_net_sales: Decimal,
    pub returning_customer_net_sales: Decimal,
    pub guest_net_sales: Decimal,
    /// Informational sub-total of the returning bucket: net sales from orders
    /// whose classification resolved to UNKNOWN. Kept visible so data-quality
    /// gaps stay auditable.
    pub unknown_net_sales: Decimal,
}

/// Inclusive reporting window for period-relative classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportingPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// Everything the engine needs, passed explicitly. No hidden globals.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub tenant_id: String,
    pub timezone: chrono_tz::Tz,
    pub period: ReportingPeriod,
    pub mode: AttributionMode,
}

/// Per-order data-quality findings the engine reports alongside its rows.
/// None of these abort a batch; the affected order is isolated and the run
/// continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Anomaly {
    #[error("order {order_id}: invalid {field} timestamp '{raw}', event dropped")]
    InvalidTimestamp {
        order_id: String,
        field: &'static str,
        raw: String,
    },
    #[error("order {order_id}: zero allocation denominator, line-item split incomplete")]
    LowAllocationConfidence { order_id: String },
    #[error("order {order_id}: customer {customer_id} has no lifetime order count")]
    MissingCustomerSignal {
        order_id: String,
        customer_id: String,
    },
    #[error("date {date}: mixed currencies, kept most frequent '{kept}'")]
    MixedCurrencies { date: NaiveDate, kept: String },
}
