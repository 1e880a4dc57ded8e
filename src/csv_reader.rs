use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::{ReportError, ReportResult};
use crate::exchange::ExchangeRates;
use crate::transaction::{
    parse_date, parse_timestamp, LastHourActivity, Transaction, TransactionTable,
};

// One CSV row as exported, before timestamp normalization
#[derive(Debug, Deserialize, Clone)]
pub struct CsvTransaction {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub vendor_type: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_fraud: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub is_high_risk_vendor: Option<bool>,
    #[serde(rename = "last_hour_activity.num_transactions", default)]
    pub num_transactions: Option<f64>,
    #[serde(rename = "last_hour_activity.total_amount", default)]
    pub total_amount: Option<f64>,
    #[serde(rename = "last_hour_activity.unique_merchants", default)]
    pub unique_merchants: Option<f64>,
    #[serde(rename = "last_hour_activity.unique_countries", default)]
    pub unique_countries: Option<f64>,
    #[serde(rename = "last_hour_activity.max_single_amount", default)]
    pub max_single_amount: Option<f64>,
}

impl CsvTransaction {
    pub fn into_transaction(self, row: usize) -> ReportResult<Transaction> {
        let timestamp = match self.timestamp.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| ReportError::Timestamp {
                row,
                value: raw.to_string(),
            })?),
        };

        Ok(Transaction {
            timestamp,
            customer_id: non_empty(self.customer_id),
            country: non_empty(self.country),
            city: non_empty(self.city),
            amount: self.amount,
            currency: non_empty(self.currency),
            vendor_type: non_empty(self.vendor_type),
            is_fraud: self.is_fraud,
            is_high_risk_vendor: self.is_high_risk_vendor,
            last_hour_activity: LastHourActivity {
                num_transactions: self.num_transactions,
                total_amount: self.total_amount,
                unique_merchants: self.unique_merchants,
                unique_countries: self.unique_countries,
                max_single_amount: self.max_single_amount,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_flag))
}

pub fn read_transactions(file_path: &Path) -> ReportResult<TransactionTable> {
    let file = File::open(file_path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (row, record) in rdr.deserialize::<CsvTransaction>().enumerate() {
        rows.push(record?.into_transaction(row)?);
    }

    Ok(TransactionTable::new(rows, columns))
}

// Reads a wide rate table: a `date` column followed by one column per currency
pub fn read_exchange_rates(file_path: &Path) -> ReportResult<ExchangeRates> {
    let file = File::open(file_path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let headers = rdr.headers()?.clone();

    let date_column = headers
        .iter()
        .position(|h| h.trim() == "date")
        .ok_or_else(|| ReportError::MissingColumn { name: "date".to_string() })?;
    let currencies = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_column)
        .map(|(_, h)| h.trim().to_string())
        .collect();

    let mut rates = ExchangeRates::new(currencies);
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let raw_date = record.get(date_column).unwrap_or("").trim();
        if raw_date.is_empty() {
            log::debug!("Skipping exchange row {row} without a date");
            continue;
        }
        let date = parse_date(raw_date).ok_or_else(|| ReportError::Timestamp {
            row,
            value: raw_date.to_string(),
        })?;
        let values = record
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_column)
            .map(|(_, v)| v.trim().parse::<f64>().ok())
            .collect();
        rates.insert(date, values);
    }

    Ok(rates)
}
