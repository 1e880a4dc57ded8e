// Entry point for the fraud statistics report. Loads the transaction and exchange-rate
// tables, runs the fixed set of aggregations and prints one line per question.
use anyhow::{Context, Result};
use clap::Parser;

use cli::Args;
use loader::{load_exchange_rates, load_transactions};
use report::write_report;

//imports other modules in fraud_report
mod cli;
mod csv_reader;
mod error;
mod exchange;
mod loader;
mod parquet_reader;
mod report;
mod stats;
mod transaction;

fn init_logging(args: &Args) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(filter) = args.log_filter() {
        builder.parse_filters(filter);
    }
    builder.init();
}

// Main entry point for the report
// Inputs: optional file paths from the command line or environment
// Outputs: Result indicating success or error
// Key steps:
// 1. Load transactions and exchange rates
// 2. Print the first ten answers to stdout
// 3. Print the risky customer count, or fail if its column is absent
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let transactions = load_transactions(&args.transactions).with_context(|| {
        format!("failed to load transactions from {}", args.transactions.display())
    })?;
    let rates = load_exchange_rates(&args.exchange).with_context(|| {
        format!("failed to load exchange rates from {}", args.exchange.display())
    })?;

    if transactions.is_empty() {
        log::warn!("Transaction dataset is empty");
    }

    let mut stdout = std::io::stdout().lock();
    write_report(&mut stdout, &transactions, &rates)?;

    Ok(())
}
