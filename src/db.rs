// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Shopfold", "shopfold"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("shopfold.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- One row per (tenant, day, attribution mode). Amounts are stored as
    -- decimal strings; the upsert key makes recompute-and-overwrite safe.
    CREATE TABLE IF NOT EXISTS daily_sales(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tenant_id TEXT NOT NULL,
        date TEXT NOT NULL,
        mode TEXT NOT NULL CHECK(mode IN ('shopify','legacy')),
        currency TEXT NOT NULL,
        gross_sales TEXT NOT NULL,
        discounts TEXT NOT NULL,
        refunds TEXT NOT NULL,
        net_sales TEXT NOT NULL,
        orders_count INTEGER NOT NULL,
        new_customer_net TEXT NOT NULL,
        returning_customer_net TEXT NOT NULL,
        guest_net TEXT NOT NULL,
        unknown_net TEXT NOT NULL DEFAULT '0',
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(tenant_id, date, mode)
    );
    CREATE INDEX IF NOT EXISTS idx_daily_sales_tenant_date ON daily_sales(tenant_id, date);
    "#,
    )?;
    Ok(())
}
