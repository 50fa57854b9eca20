// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print output as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print output as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("shopfold")
        .about("Daily sales aggregation and customer classification for e-commerce order feeds")
        .version(clap::crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            json_flags(
                Command::new("aggregate")
                    .about("Aggregate a JSON batch of orders into daily sales rows"),
            )
            .arg(
                Arg::new("orders")
                    .long("orders")
                    .required(true)
                    .help("Path to a JSON file with an array of orders"),
            )
            .arg(Arg::new("tenant").long("tenant").required(true))
            .arg(
                Arg::new("from")
                    .long("from")
                    .required(true)
                    .help("Reporting period start (YYYY-MM-DD)"),
            )
            .arg(
                Arg::new("to")
                    .long("to")
                    .required(true)
                    .help("Reporting period end (YYYY-MM-DD), inclusive"),
            )
            .arg(
                Arg::new("mode")
                    .long("mode")
                    .default_value("shopify")
                    .help("Attribution mode: shopify|legacy"),
            )
            .arg(
                Arg::new("timezone")
                    .long("timezone")
                    .help("IANA store timezone, e.g. Europe/Stockholm (defaults to configured)"),
            )
            .arg(
                Arg::new("history")
                    .long("history")
                    .help("Optional JSON file with full customer order history (customer_id, order_id, created_at)"),
            )
            .arg(
                Arg::new("dry-run")
                    .long("dry-run")
                    .action(ArgAction::SetTrue)
                    .help("Compute and print rows without writing to the database"),
            ),
        )
        .subcommand(
            Command::new("report").about("Report persisted aggregates").subcommand(
                json_flags(Command::new("daily").about("Daily sales rows for a tenant"))
                    .arg(Arg::new("tenant").long("tenant").required(true))
                    .arg(Arg::new("from").long("from").required(true))
                    .arg(Arg::new("to").long("to").required(true))
                    .arg(Arg::new("mode").long("mode").default_value("shopify")),
            ),
        )
        .subcommand(
            Command::new("export").about("Export persisted aggregates").subcommand(
                Command::new("daily")
                    .about("Export daily sales rows to csv or json")
                    .arg(Arg::new("tenant").long("tenant").required(true))
                    .arg(Arg::new("from").long("from").required(true))
                    .arg(Arg::new("to").long("to").required(true))
                    .arg(Arg::new("mode").long("mode").default_value("shopify"))
                    .arg(Arg::new("format").long("format").default_value("csv"))
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("config").about("Settings").subcommand(
                Command::new("timezone")
                    .about("Show or set the default store timezone")
                    .arg(Arg::new("set").long("set").help("IANA timezone name")),
            ),
        )
        .subcommand(Command::new("doctor").about("Data-quality checks on persisted rows"))
}
