// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::utils::pretty_table;

/// Data-quality sweep over persisted rows. Findings are reported, never
/// auto-corrected; the fix path is always a full recompute over the window.
pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Split drift: the three customer buckets must sum to net sales.
    let mut stmt = conn.prepare(
        "SELECT tenant_id, date, mode, net_sales, new_customer_net, returning_customer_net, guest_net
         FROM daily_sales ORDER BY tenant_id, date",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let tenant: String = r.get(0)?;
        let date: String = r.get(1)?;
        let mode: String = r.get(2)?;
        let net: Decimal = r.get::<_, String>(3)?.parse().unwrap_or(Decimal::ZERO);
        let new_net: Decimal = r.get::<_, String>(4)?.parse().unwrap_or(Decimal::ZERO);
        let ret_net: Decimal = r.get::<_, String>(5)?.parse().unwrap_or(Decimal::ZERO);
        let guest_net: Decimal = r.get::<_, String>(6)?.parse().unwrap_or(Decimal::ZERO);
        let drift = (new_net + ret_net + guest_net - net).abs();
        if drift > Decimal::new(1, 2) {
            rows.push(vec![
                "split_drift".into(),
                format!("{} {} {} off by {}", tenant, date, mode, drift),
            ]);
        }
    }

    // 2) Days dominated by UNKNOWN classification
    let mut stmt2 = conn.prepare(
        "SELECT tenant_id, date, mode, net_sales, unknown_net FROM daily_sales ORDER BY tenant_id, date",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let tenant: String = r.get(0)?;
        let date: String = r.get(1)?;
        let mode: String = r.get(2)?;
        let net: Decimal = r.get::<_, String>(3)?.parse().unwrap_or(Decimal::ZERO);
        let unknown: Decimal = r.get::<_, String>(4)?.parse().unwrap_or(Decimal::ZERO);
        if !net.is_zero() && (unknown / net).abs() > Decimal::new(5, 1) {
            rows.push(vec![
                "unknown_heavy".into(),
                format!("{} {} {}: {} of {} net unclassified", tenant, date, mode, unknown, net),
            ]);
        }
    }

    // 3) Tenants reporting more than one currency
    let mut stmt3 = conn.prepare(
        "SELECT tenant_id, COUNT(DISTINCT currency) AS n FROM daily_sales
         GROUP BY tenant_id HAVING n > 1",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let tenant: String = r.get(0)?;
        let n: i64 = r.get(1)?;
        rows.push(vec![
            "mixed_currency_tenant".into(),
            format!("{} has {} currencies", tenant, n),
        ]);
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
