use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::{Field, Row};

use crate::error::{ReportError, ReportResult};
use crate::exchange::ExchangeRates;
use crate::transaction::{parse_timestamp, Transaction, TransactionTable};

const ACTIVITY_GROUP: &str = "last_hour_activity";

fn open(file_path: &Path) -> ReportResult<SerializedFileReader<File>> {
    let file = File::open(file_path)?;
    Ok(SerializedFileReader::new(file)?)
}

// Leaf column paths, nested groups joined with dots
fn column_paths(reader: &SerializedFileReader<File>) -> Vec<String> {
    reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.path().string())
        .collect()
}

fn field_str(field: &Field) -> Option<String> {
    match field {
        Field::Str(s) => Some(s.clone()),
        Field::Byte(v) => Some(v.to_string()),
        Field::Short(v) => Some(v.to_string()),
        Field::Int(v) => Some(v.to_string()),
        Field::Long(v) => Some(v.to_string()),
        Field::UByte(v) => Some(v.to_string()),
        Field::UShort(v) => Some(v.to_string()),
        Field::UInt(v) => Some(v.to_string()),
        Field::ULong(v) => Some(v.to_string()),
        _ => None,
    }
}

fn field_f64(field: &Field) -> Option<f64> {
    match field {
        Field::Double(v) => Some(*v),
        Field::Float(v) => Some(f64::from(*v)),
        Field::Byte(v) => Some(f64::from(*v)),
        Field::Short(v) => Some(f64::from(*v)),
        Field::Int(v) => Some(f64::from(*v)),
        Field::Long(v) => Some(*v as f64),
        Field::UByte(v) => Some(f64::from(*v)),
        Field::UShort(v) => Some(f64::from(*v)),
        Field::UInt(v) => Some(f64::from(*v)),
        Field::ULong(v) => Some(*v as f64),
        Field::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_bool(field: &Field) -> Option<bool> {
    match field {
        Field::Bool(b) => Some(*b),
        Field::Str(s) => crate::csv_reader::parse_flag(s),
        other => field_f64(other).map(|v| v != 0.0),
    }
}

fn from_epoch(units: i64, per_second: i64) -> Option<NaiveDateTime> {
    let secs = units.div_euclid(per_second);
    let nanos = units.rem_euclid(per_second) * (1_000_000_000 / per_second);
    DateTime::from_timestamp(secs, nanos as u32).map(|ts| ts.naive_utc())
}

fn epoch_day(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(i64::from(days)))
}

fn field_timestamp(column: &str, row: usize, field: &Field) -> ReportResult<Option<NaiveDateTime>> {
    match field {
        Field::Null => Ok(None),
        Field::TimestampMillis(ms) => Ok(from_epoch(*ms, 1_000)),
        Field::TimestampMicros(us) => Ok(from_epoch(*us, 1_000_000)),
        // nanosecond timestamps surface as plain INT64
        Field::Long(ns) => Ok(from_epoch(*ns, 1_000_000_000)),
        Field::Date(days) => Ok(epoch_day(*days).and_then(|d| d.and_hms_opt(0, 0, 0))),
        Field::Str(s) if s.trim().is_empty() => Ok(None),
        Field::Str(s) => parse_timestamp(s).map(Some).ok_or_else(|| ReportError::Timestamp {
            row,
            value: s.clone(),
        }),
        other => Err(ReportError::UnsupportedValue {
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

fn row_to_transaction(row_index: usize, row: &Row) -> ReportResult<Transaction> {
    let mut tx = Transaction::default();
    for (name, field) in row.get_column_iter() {
        match name.as_str() {
            "timestamp" => tx.timestamp = field_timestamp(name, row_index, field)?,
            "customer_id" => tx.customer_id = field_str(field),
            "country" => tx.country = field_str(field),
            "city" => tx.city = field_str(field),
            "amount" => tx.amount = field_f64(field),
            "currency" => tx.currency = field_str(field),
            "vendor_type" => tx.vendor_type = field_str(field),
            "is_fraud" => tx.is_fraud = field_bool(field),
            "is_high_risk_vendor" => tx.is_high_risk_vendor = field_bool(field),
            ACTIVITY_GROUP => {
                if let Field::Group(activity) = field {
                    for (metric, value) in activity.get_column_iter() {
                        tx.last_hour_activity.set(metric, field_f64(value));
                    }
                }
            }
            flat => {
                // already-flattened exports carry "last_hour_activity.<metric>"
                if let Some(metric) = flat.strip_prefix("last_hour_activity.") {
                    tx.last_hour_activity.set(metric, field_f64(field));
                }
            }
        }
    }
    Ok(tx)
}

pub fn read_transactions(file_path: &Path) -> ReportResult<TransactionTable> {
    let reader = open(file_path)?;
    let columns = column_paths(&reader);

    let mut rows = Vec::new();
    for (index, row) in reader.get_row_iter(None)?.enumerate() {
        rows.push(row_to_transaction(index, &row?)?);
    }

    Ok(TransactionTable::new(rows, columns))
}

pub fn read_exchange_rates(file_path: &Path) -> ReportResult<ExchangeRates> {
    let reader = open(file_path)?;
    let columns = column_paths(&reader);
    if !columns.iter().any(|c| c == "date") {
        return Err(ReportError::MissingColumn { name: "date".to_string() });
    }
    let currencies: Vec<String> = columns.into_iter().filter(|c| c != "date").collect();

    let mut rates = ExchangeRates::new(currencies.clone());
    for (index, row) in reader.get_row_iter(None)?.enumerate() {
        let row = row?;
        let mut date = None;
        let mut values = vec![None; currencies.len()];
        for (name, field) in row.get_column_iter() {
            if name == "date" {
                date = field_timestamp(name, index, field)?.map(|ts| ts.date());
            } else if let Some(slot) = currencies.iter().position(|c| c == name) {
                values[slot] = field_f64(field);
            }
        }
        match date {
            Some(date) => rates.insert(date, values),
            None => log::debug!("Skipping exchange row {index} without a date"),
        }
    }

    Ok(rates)
}
