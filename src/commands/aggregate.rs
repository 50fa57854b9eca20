// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;

use crate::classify::InMemoryHistory;
use crate::engine;
use crate::models::{AttributionMode, EngineConfig, Order, ReportingPeriod};
use crate::store;
use crate::utils::{
    get_default_timezone, maybe_print_json, parse_date, parse_timezone, pretty_table,
};

#[derive(Deserialize)]
struct HistoryRecord {
    customer_id: String,
    order_id: String,
    created_at: String,
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("orders").unwrap().trim();
    let tenant = sub.get_one::<String>("tenant").unwrap().trim().to_string();
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    let mode_raw = sub.get_one::<String>("mode").unwrap();
    let mode = AttributionMode::parse(mode_raw)
        .with_context(|| format!("Invalid mode '{}', expected shopify|legacy", mode_raw))?;
    let timezone = match sub.get_one::<String>("timezone") {
        Some(s) => parse_timezone(s)?,
        None => get_default_timezone(conn)?,
    };
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let dry_run = sub.get_flag("dry-run");

    let raw = std::fs::read_to_string(path).with_context(|| format!("Open orders file {}", path))?;
    let orders: Vec<Order> =
        serde_json::from_str(&raw).with_context(|| format!("Parse orders file {}", path))?;

    let history = match sub.get_one::<String>("history") {
        Some(hpath) => {
            let hraw = std::fs::read_to_string(hpath.trim())
                .with_context(|| format!("Open history file {}", hpath))?;
            let records: Vec<HistoryRecord> =
                serde_json::from_str(&hraw).with_context(|| format!("Parse history file {}", hpath))?;
            InMemoryHistory::from_orders(records.into_iter().filter_map(|r| {
                let at = DateTime::parse_from_rfc3339(r.created_at.trim())
                    .ok()?
                    .with_timezone(&Utc);
                Some((r.customer_id, r.order_id, at))
            }))
        }
        None => InMemoryHistory::from_batch(&orders),
    };

    let cfg = EngineConfig {
        tenant_id: tenant,
        timezone,
        period: ReportingPeriod { from, to },
        mode,
    };
    let result = engine::run_batch(&orders, &cfg, &history);

    // Persist first; the output format only changes how rows are shown.
    if !dry_run {
        let failures = store::upsert_daily_rows(conn, &result.rows)?;
        for f in &failures {
            eprintln!(
                "failed to persist ({}, {}, {}): {}",
                f.tenant_id,
                f.date,
                f.mode.as_str(),
                f.reason
            );
        }
        if !json_flag && !jsonl_flag {
            println!(
                "Upserted {} rows ({} failed)",
                result.rows.len() - failures.len(),
                failures.len()
            );
        }
    }

    if !maybe_print_json(json_flag, jsonl_flag, &result.rows)? {
        let data: Vec<Vec<String>> = result
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.date.to_string(),
                    r.currency.clone(),
                    format!("{:.2}", r.gross_sales_excl_tax),
                    format!("{:.2}", r.discounts_excl_tax),
                    format!("{:.2}", r.refunds_excl_tax),
                    format!("{:.2}", r.net_sales_excl_tax),
                    r.orders_count.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "CCY", "Gross", "Discounts", "Refunds", "Net", "Orders"],
                data
            )
        );

        if !result.anomalies.is_empty() {
            let rows: Vec<Vec<String>> = result
                .anomalies
                .iter()
                .map(|a| vec![a.to_string()])
                .collect();
            println!("{}", pretty_table(&["Anomaly"], rows));
        }
    } else {
        for a in &result.anomalies {
            eprintln!("warning: {}", a);
        }
    }
    Ok(())
}
