// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::models::AttributionMode;
use crate::store;
use crate::utils::{maybe_print_json, parse_date, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("daily", sub)) => daily(conn, sub),
        _ => Ok(()),
    }
}

fn daily(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tenant = sub.get_one::<String>("tenant").unwrap().trim();
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    let mode_raw = sub.get_one::<String>("mode").unwrap();
    let mode = AttributionMode::parse(mode_raw)
        .with_context(|| format!("Invalid mode '{}', expected shopify|legacy", mode_raw))?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let rows = store::load_daily_rows(conn, tenant, from, to, mode)?;
    if maybe_print_json(json_flag, jsonl_flag, &rows)? {
        return Ok(());
    }

    let data: Vec<Vec<String>> = rows
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
                format!("{:.2}", r.new_customer_net_sales),
                format!("{:.2}", r.returning_customer_net_sales),
                format!("{:.2}", r.guest_net_sales),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "Date", "CCY", "Gross", "Discounts", "Refunds", "Net", "Orders", "New", "Returning",
                "Guest"
            ],
            data
        )
    );
    Ok(())
}
