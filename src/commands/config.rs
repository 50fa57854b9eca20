// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::utils::{get_default_timezone, set_default_timezone};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("timezone", sub)) => timezone(conn, sub),
        _ => Ok(()),
    }
}

fn timezone(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(tz) = sub.get_one::<String>("set") {
        set_default_timezone(conn, tz.trim())?;
        println!("Default timezone set to {}", tz.trim());
    } else {
        println!("{}", get_default_timezone(conn)?.name());
    }
    Ok(())
}
