// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Aggregate store: idempotent upsert of daily rows keyed by
//! (tenant_id, date, mode), with per-item failure reporting so a caller can
//! retry only the keys that failed.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::models::{AttributionMode, DailySalesRow};

#[derive(Debug, Clone)]
pub struct UpsertFailure {
    pub tenant_id: String,
    pub date: NaiveDate,
    pub mode: AttributionMode,
    pub reason: String,
}

/// Upsert a batch of rows. Failures are collected per item, never
/// all-or-nothing: a bad row must not block the rest of the batch from
/// landing, and the caller retries only what is reported back.
pub fn upsert_daily_rows(
    conn: &Connection,
    rows: &[DailySalesRow],
) -> Result<Vec<UpsertFailure>> {
    let mut stmt = conn.prepare(
        "INSERT INTO daily_sales(
            tenant_id, date, mode, currency,
            gross_sales, discounts, refunds, net_sales, orders_count,
            new_customer_net, returning_customer_net, guest_net, unknown_net,
            updated_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,datetime('now'))
         ON CONFLICT(tenant_id, date, mode) DO UPDATE SET
            currency=excluded.currency,
            gross_sales=excluded.gross_sales,
            discounts=excluded.discounts,
            refunds=excluded.refunds,
            net_sales=excluded.net_sales,
            orders_count=excluded.orders_count,
            new_customer_net=excluded.new_customer_net,
            returning_customer_net=excluded.returning_customer_net,
            guest_net=excluded.guest_net,
            unknown_net=excluded.unknown_net,
            updated_at=excluded.updated_at",
    )?;

    let mut failures = Vec::new();
    for row in rows {
        let result = stmt.execute(params![
            row.tenant_id,
            row.date.to_string(),
            row.mode.as_str(),
            row.currency,
            row.gross_sales_excl_tax.to_string(),
            row.discounts_excl_tax.to_string(),
            row.refunds_excl_tax.to_string(),
            row.net_sales_excl_tax.to_string(),
            row.orders_count,
            row.new_customer_net_sales.to_string(),
            row.returning_customer_net_sales.to_string(),
            row.guest_net_sales.to_string(),
            row.unknown_net_sales.to_string(),
        ]);
        if let Err(e) = result {
            failures.push(UpsertFailure {
                tenant_id: row.tenant_id.clone(),
                date: row.date,
                mode: row.mode,
                reason: e.to_string(),
            });
        }
    }
    Ok(failures)
}

/// Load persisted rows for a tenant, date range (inclusive) and mode,
/// ordered by date.
pub fn load_daily_rows(
    conn: &Connection,
    tenant_id: &str,
    from: NaiveDate,
    to: NaiveDate,
    mode: AttributionMode,
) -> Result<Vec<DailySalesRow>> {
    let mut stmt = conn.prepare(
        "SELECT date, currency, gross_sales, discounts, refunds, net_sales, orders_count,
                new_customer_net, returning_customer_net, guest_net, unknown_net
         FROM daily_sales
         WHERE tenant_id=?1 AND date>=?2 AND date<=?3 AND mode=?4
         ORDER BY date",
    )?;
    let rows = stmt.query_map(
        params![tenant_id, from.to_string(), to.to_string(), mode.as_str()],
        |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, String>(4)?,
                r.get::<_, String>(5)?,
                r.get::<_, u32>(6)?,
                r.get::<_, String>(7)?,
                r.get::<_, String>(8)?,
                r.get::<_, String>(9)?,
                r.get::<_, String>(10)?,
            ))
        },
    )?;

    let mut out = Vec::new();
    for row in rows {
        let (date, ccy, gross, disc, refs, net, count, new_net, ret_net, guest_net, unk_net) =
            row?;
        out.push(DailySalesRow {
            tenant_id: tenant_id.to_string(),
            date: crate::utils::parse_date(&date)?,
            mode,
            currency: ccy,
            gross_sales_excl_tax: parse_stored(&gross)?,
            discounts_excl_tax: parse_stored(&disc)?,
            refunds_excl_tax: parse_stored(&refs)?,
            net_sales_excl_tax: parse_stored(&net)?,
            orders_count: count,
            new_customer_net_sales: parse_stored(&new_net)?,
            returning_customer_net_sales: parse_stored(&ret_net)?,
            guest_net_sales: parse_stored(&guest_net)?,
            unknown_net_sales: parse_stored(&unk_net)?,
        });
    }
    Ok(out)
}

fn parse_stored(s: &str) -> Result<Decimal> {
    use anyhow::Context;
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid stored amount '{}'", s))
}
