//! Command-line arguments. Every flag has a default, so a bare invocation
//! reads the two standard dataset files from the working directory.

use clap::Parser;
use std::path::PathBuf;

/// Descriptive fraud statistics over a transaction dataset and a daily
/// currency exchange table.
///
/// Files ending in .parquet are read as Parquet, anything else as CSV.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Transaction dataset
    #[arg(
        long,
        value_name = "FILE",
        default_value = "transaction_fraud_data.parquet",
        env = "FRAUD_TRANSACTIONS"
    )]
    pub transactions: PathBuf,

    /// Daily exchange rates: a `date` column plus one column per currency
    #[arg(
        long,
        value_name = "FILE",
        default_value = "historical_currency_exchange.parquet",
        env = "FRAUD_EXCHANGE"
    )]
    pub exchange: PathBuf,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn log_filter(&self) -> Option<&'static str> {
        self.verbose.then_some("debug")
    }
}
