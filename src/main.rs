mod auth;
mod config;
mod dates;
mod loader;
mod mock;
mod models;
mod server;
mod stats;
mod storage;
mod utils;

use anyhow::{Result, bail};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{AppConfig, Zone};
use crate::loader::{load_visitor_csv, template};
use crate::models::{FilterOptions, PaymentMethod, StoreLocation, TimeRange, TransactionType};
use crate::server::state::State;
use crate::utils::{
    fmt_currency, fmt_number, fmt_percentage, payment_method_label, transaction_type_label,
};

#[derive(Parser)]
#[command(name = "retail-dashboard", about = "Retail sales & visitor analytics", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the dashboard HTTP API
    Serve {
        /// Listen port (overrides config)
        #[arg(short, long, env = "DASHBOARD_PORT")]
        port: Option<u16>,
    },

    /// Print a dashboard summary of the generated seed data
    Summary {
        /// day, week or month
        #[arg(short, long, default_value = "week")]
        range: TimeRange,

        /// Store slug or name (e.g. praha-luziny)
        #[arg(short, long)]
        store: Option<StoreLocation>,

        /// reservation or direct_sale
        #[arg(short = 't', long = "type")]
        transaction_type: Option<TransactionType>,
    },

    /// Validate a visitor CSV file without importing it
    Validate {
        file: PathBuf,
    },

    /// Print the visitor CSV template
    Template,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "retail_dashboard=info,warn",
        1 => "retail_dashboard=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = State::seeded(config);
            server::start_server(state).await?;
        }

        Command::Summary {
            range,
            store,
            transaction_type,
        } => {
            if range == TimeRange::Custom {
                bail!("`summary` supports day, week and month");
            }
            let _t = utils::Timer::start("Dashboard summary");
            let state = State::seeded(config);
            let filter = FilterOptions {
                time_range: range,
                date_range: None,
                store_location: store,
                transaction_type,
            };
            let data = state.dashboard(&filter, Utc::now())?;

            println!("─────────────────────────────────────────────");
            println!("  Retail Dashboard: {:?}", data.time_range);
            println!(
                "  {} → {}",
                data.start_date.with_timezone(&Local).format("%d.%m.%Y %H:%M"),
                data.end_date.with_timezone(&Local).format("%d.%m.%Y %H:%M")
            );
            if let Some(kind) = transaction_type {
                println!("  Type      : {}", transaction_type_label(kind));
            }
            println!("─────────────────────────────────────────────");
            for (location, s) in &data.store_data {
                println!("  {}", location);
                println!("    Revenue      : {}", fmt_currency(s.total_revenue));
                println!("    Transactions : {}", fmt_number(s.transaction_count as i64));
                println!("    Average      : {}", fmt_currency(s.average_transaction_value));
                println!("    Visitors     : {}", fmt_number(s.visitor_count as i64));
                println!("    Conversion   : {}", fmt_percentage(s.conversion_rate));
                println!(
                    "    {} / {} : {} / {}",
                    payment_method_label(PaymentMethod::Cash),
                    payment_method_label(PaymentMethod::Card),
                    s.payment_method_distribution.cash,
                    s.payment_method_distribution.card
                );
                for top in s.top_products.by_quantity.iter().take(3) {
                    println!("    • {} × {}", top.product.name, top.quantity);
                }
            }
            println!("─────────────────────────────────────────────");
            println!("  Total revenue      : {}", fmt_currency(data.total_revenue));
            println!("  Total transactions : {}", fmt_number(data.total_transactions as i64));
            println!("─────────────────────────────────────────────");
        }

        Command::Validate { file } => {
            let report = match config.locale.zone() {
                Zone::Named(tz) => load_visitor_csv(&file, &tz)?,
                Zone::Fixed(offset) => load_visitor_csv(&file, &offset)?,
                Zone::Local => load_visitor_csv(&file, &Local)?,
            };
            println!("{} valid rows in {:?}", report.data.len(), file);
            for e in &report.errors {
                println!("  row {:>4}: {}", e.row, e.message);
            }
            if !report.is_clean() {
                bail!("{} invalid rows", report.errors.len());
            }
            info!("{:?} is ready to import", file);
        }

        Command::Template => {
            print!("{}", template()?);
        }
    }

    Ok(())
}
