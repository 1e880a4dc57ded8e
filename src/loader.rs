use std::path::Path;

use crate::error::ReportResult;
use crate::exchange::ExchangeRates;
use crate::transaction::TransactionTable;
use crate::{csv_reader, parquet_reader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Parquet,
    Csv,
}

impl SourceFormat {
    // Anything that is not .parquet is read as CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => SourceFormat::Parquet,
            _ => SourceFormat::Csv,
        }
    }
}

pub fn load_transactions(path: &Path) -> ReportResult<TransactionTable> {
    let table = match SourceFormat::from_path(path) {
        SourceFormat::Parquet => parquet_reader::read_transactions(path)?,
        SourceFormat::Csv => csv_reader::read_transactions(path)?,
    };
    log::info!(
        "Loaded {} transactions ({} columns) from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

pub fn load_exchange_rates(path: &Path) -> ReportResult<ExchangeRates> {
    let rates = match SourceFormat::from_path(path) {
        SourceFormat::Parquet => parquet_reader::read_exchange_rates(path)?,
        SourceFormat::Csv => csv_reader::read_exchange_rates(path)?,
    };
    log::info!(
        "Loaded exchange rates for {} dates and {} currencies from {}",
        rates.len(),
        rates.currencies().len(),
        path.display()
    );
    if rates.is_empty() {
        log::warn!("Exchange table is empty, only USD amounts can be normalized");
    }
    Ok(rates)
}
