use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

pub const UNIQUE_MERCHANTS_COLUMN: &str = "last_hour_activity.unique_merchants";
const FAST_FOOD: &str = "fast_food";

// Rolling one-hour activity counters attached to every transaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LastHourActivity {
    pub num_transactions: Option<f64>,
    pub total_amount: Option<f64>,
    pub unique_merchants: Option<f64>,
    pub unique_countries: Option<f64>,
    pub max_single_amount: Option<f64>,
}

impl LastHourActivity {
    /// Stores a metric by its leaf name (`unique_merchants`, ...). Returns
    /// false when the name is not one of the known counters.
    pub fn set(&mut self, metric: &str, value: Option<f64>) -> bool {
        let slot = match metric {
            "num_transactions" => &mut self.num_transactions,
            "total_amount" => &mut self.total_amount,
            "unique_merchants" => &mut self.unique_merchants,
            "unique_countries" => &mut self.unique_countries,
            "max_single_amount" => &mut self.max_single_amount,
            _ => return false,
        };
        *slot = value;
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    pub timestamp: Option<NaiveDateTime>,
    pub customer_id: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub vendor_type: Option<String>,
    pub is_fraud: Option<bool>,
    pub is_high_risk_vendor: Option<bool>,
    pub last_hour_activity: LastHourActivity,
}

impl Transaction {
    /// Timestamp truncated to the start of its clock hour.
    pub fn hour_bucket(&self) -> Option<NaiveDateTime> {
        self.timestamp
            .and_then(|ts| ts.with_minute(0))
            .and_then(|ts| ts.with_second(0))
            .and_then(|ts| ts.with_nanosecond(0))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }

    // "Fast Food", "fast food" and "fast_food" all match
    pub fn is_fast_food(&self) -> bool {
        self.vendor_type
            .as_deref()
            .map(|v| v.to_lowercase().replace(' ', "_") == FAST_FOOD)
            .unwrap_or(false)
    }
}

/// A loaded transaction dataset together with the column names found in the
/// source file. Nested columns are reported with dotted paths.
#[derive(Debug, Clone, Default)]
pub struct TransactionTable {
    pub rows: Vec<Transaction>,
    pub columns: HashSet<String>,
}

impl TransactionTable {
    pub fn new(rows: Vec<Transaction>, columns: impl IntoIterator<Item = String>) -> Self {
        TransactionTable {
            rows,
            columns: columns.into_iter().collect(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parses the timestamp spellings found in exported transaction files.
/// Offsets are dropped and the wall-clock time is kept.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(ts.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|ts| ts.date())
}
