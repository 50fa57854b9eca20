// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde_json::json;

use crate::models::AttributionMode;
use crate::store;
use crate::utils::parse_date;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("daily", sub)) => export_daily(conn, sub),
        _ => Ok(()),
    }
}

fn export_daily(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tenant = sub.get_one::<String>("tenant").unwrap().trim();
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    let mode_raw = sub.get_one::<String>("mode").unwrap();
    let mode = AttributionMode::parse(mode_raw)
        .with_context(|| format!("Invalid mode '{}', expected shopify|legacy", mode_raw))?;
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let rows = store::load_daily_rows(conn, tenant, from, to, mode)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "tenant_id",
                "date",
                "mode",
                "currency",
                "gross_sales",
                "discounts",
                "refunds",
                "net_sales",
                "orders_count",
                "new_customer_net",
                "returning_customer_net",
                "guest_net",
                "unknown_net",
            ])?;
            for r in &rows {
                wtr.write_record([
                    r.tenant_id.clone(),
                    r.date.to_string(),
                    r.mode.as_str().to_string(),
                    r.currency.clone(),
                    r.gross_sales_excl_tax.to_string(),
                    r.discounts_excl_tax.to_string(),
                    r.refunds_excl_tax.to_string(),
                    r.net_sales_excl_tax.to_string(),
                    r.orders_count.to_string(),
                    r.new_customer_net_sales.to_string(),
                    r.returning_customer_net_sales.to_string(),
                    r.guest_net_sales.to_string(),
                    r.unknown_net_sales.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for r in &rows {
                items.push(json!({
                    "tenant_id": r.tenant_id,
                    "date": r.date.to_string(),
                    "mode": r.mode.as_str(),
                    "currency": r.currency,
                    "gross_sales": r.gross_sales_excl_tax,
                    "discounts": r.discounts_excl_tax,
                    "refunds": r.refunds_excl_tax,
                    "net_sales": r.net_sales_excl_tax,
                    "orders_count": r.orders_count,
                    "new_customer_net": r.new_customer_net_sales,
                    "returning_customer_net": r.returning_customer_net_sales,
                    "guest_net": r.guest_net_sales,
                    "unknown_net": r.unknown_net_sales,
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            anyhow::bail!("Unknown format '{}' (use csv|json)", fmt);
        }
    }
    println!("Exported daily sales to {}", out);
    Ok(())
}
