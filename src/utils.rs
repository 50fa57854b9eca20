// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| anyhow::anyhow!("Invalid IANA timezone '{}'", s))
}

/// Convert an ISO-8601 instant to a calendar date in the store's timezone.
/// None on parse failure; callers count the drop instead of erroring.
pub fn local_date_of(raw: &str, tz: Tz) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&tz).date_naive())
}

#[allow(dead_code)]
pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

// Default timezone settings, overridable per run with --timezone
pub fn get_default_timezone(conn: &Connection) -> Result<Tz> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='default_timezone'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    match v {
        Some(name) => parse_timezone(&name),
        None => Ok(chrono_tz::UTC),
    }
}

pub fn set_default_timezone(conn: &Connection, tz: &str) -> Result<()> {
    let tz = parse_timezone(tz)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('default_timezone', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![tz.name()],
    )?;
    Ok(())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
