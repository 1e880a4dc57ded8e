use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use crate::error::{ReportError, ReportResult};
use crate::exchange::ExchangeRates;
use crate::stats;
use crate::transaction::{Transaction, TransactionTable, UNIQUE_MERCHANTS_COLUMN};

const TOP_COUNTRIES: usize = 5;
const RISKY_QUANTILE: f64 = 0.95;

/// Mean and sample standard deviation of USD-normalized amounts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UsdSummary {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    /// Rows whose conversion to USD failed and were left out.
    pub unconverted: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FastFoodCity {
    City(Option<String>),
    NoFastFoodData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FraudReport {
    pub fraud_share: Option<f64>,
    pub top_fraud_countries: Vec<String>,
    pub high_risk_vendor_fraud_share: Option<f64>,
    pub avg_transactions_per_customer_hour: Option<f64>,
    pub top_city_by_mean_amount: Option<String>,
    pub top_fast_food_city: FastFoodCity,
    pub non_fraud_usd: UsdSummary,
    pub fraud_usd: UsdSummary,
}

pub fn fraud_share(rows: &[Transaction]) -> Option<f64> {
    stats::share(rows.iter().map(|tx| tx.is_fraud))
}

// Counts fraud rows per country, most frequent first
// Inputs: transactions and how many countries to keep
// Outputs: country names; ties keep the order in which countries first appeared
pub fn top_fraud_countries(rows: &[Transaction], limit: usize) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for tx in rows.iter().filter(|tx| tx.is_fraud == Some(true)) {
        let Some(country) = tx.country.as_deref() else {
            continue;
        };
        match index.get(country) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(country, counts.len());
                counts.push((country, 1));
            }
        }
    }

    // stable sort keeps first-appearance order within a count
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(c, _)| c.to_string()).collect()
}

pub fn high_risk_vendor_fraud_share(rows: &[Transaction]) -> Option<f64> {
    stats::share(
        rows.iter()
            .filter(|tx| tx.is_high_risk_vendor == Some(true))
            .map(|tx| tx.is_fraud),
    )
}

pub fn avg_transactions_per_customer_hour(rows: &[Transaction]) -> Option<f64> {
    let mut groups = HashMap::new();
    for tx in rows {
        if let (Some(customer), Some(hour)) = (tx.customer_id.as_deref(), tx.hour_bucket()) {
            *groups.entry((customer, hour)).or_insert(0usize) += 1;
        }
    }
    let sizes = stats::present(groups.values().map(|&n| Some(n as f64)));
    stats::mean(&sizes)
}

// Picks the city with the largest mean amount
// Inputs: transactions to group by city
// Outputs: city name, or None if no city qualifies
// Key steps:
// 1. Mean amount per city, skipping missing amounts
// 2. Drop cities whose name contains "unknown" in any case
// 3. Highest mean wins; equal means go to the alphabetically first city
pub fn top_city_by_mean_amount<'a, I>(rows: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut amounts: HashMap<&str, Vec<Option<f64>>> = HashMap::new();
    for tx in rows {
        if let Some(city) = tx.city.as_deref() {
            amounts.entry(city).or_default().push(tx.amount);
        }
    }

    amounts
        .into_iter()
        .filter(|(city, _)| !city.to_lowercase().contains("unknown"))
        .filter_map(|(city, values)| stats::mean(&stats::present(values)).map(|m| (city, m)))
        .filter(|(_, m)| !m.is_nan())
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(city, _)| city.to_string())
}

pub fn top_fast_food_city(rows: &[Transaction]) -> FastFoodCity {
    let fast_food: Vec<&Transaction> = rows.iter().filter(|tx| tx.is_fast_food()).collect();
    if fast_food.is_empty() {
        return FastFoodCity::NoFastFoodData;
    }
    FastFoodCity::City(top_city_by_mean_amount(fast_food))
}

pub fn usd_summary(rows: &[Transaction], rates: &ExchangeRates, fraud: bool) -> UsdSummary {
    let mut unconverted = 0;
    let converted: Vec<Option<f64>> = rows
        .iter()
        .filter(|tx| tx.is_fraud == Some(fraud))
        .map(|tx| {
            let usd = rates.transaction_usd(tx);
            if usd.is_none() {
                unconverted += 1;
            }
            usd
        })
        .collect();

    let values = stats::present(converted);
    UsdSummary {
        mean: stats::mean(&values),
        std: stats::sample_std(&values),
        unconverted,
    }
}

// Counts customers whose median unique-merchant count sits above the 95th percentile
// Inputs: the full transaction table
// Outputs: number of customers, or an error when the activity column is absent
// Key steps:
// 1. Check the required column exists
// 2. Median unique_merchants per customer
// 3. 0.95 quantile over those medians
// 4. Count medians strictly above the quantile
pub fn risky_customer_count(table: &TransactionTable) -> ReportResult<usize> {
    if !table.has_column(UNIQUE_MERCHANTS_COLUMN) {
        return Err(ReportError::MissingColumn {
            name: UNIQUE_MERCHANTS_COLUMN.to_string(),
        });
    }

    let mut per_customer: HashMap<&str, Vec<Option<f64>>> = HashMap::new();
    for tx in &table.rows {
        if let Some(customer) = tx.customer_id.as_deref() {
            per_customer
                .entry(customer)
                .or_default()
                .push(tx.last_hour_activity.unique_merchants);
        }
    }

    let medians: Vec<f64> = per_customer
        .into_values()
        .filter_map(|values| stats::median(&stats::present(values)))
        .collect();
    let present = stats::present(medians.iter().map(|&m| Some(m)));
    let Some(threshold) = stats::quantile(&present, RISKY_QUANTILE) else {
        return Ok(0);
    };
    log::debug!(
        "unique_merchants {RISKY_QUANTILE} quantile over {} customers: {threshold}",
        medians.len()
    );

    Ok(medians.iter().filter(|&&m| m > threshold).count())
}

// Runs the ten aggregations that need no optional columns
pub fn build_report(table: &TransactionTable, rates: &ExchangeRates) -> FraudReport {
    let rows = &table.rows;

    let report = FraudReport {
        fraud_share: fraud_share(rows),
        top_fraud_countries: top_fraud_countries(rows, TOP_COUNTRIES),
        high_risk_vendor_fraud_share: high_risk_vendor_fraud_share(rows),
        avg_transactions_per_customer_hour: avg_transactions_per_customer_hour(rows),
        top_city_by_mean_amount: top_city_by_mean_amount(rows),
        top_fast_food_city: top_fast_food_city(rows),
        non_fraud_usd: usd_summary(rows, rates, false),
        fraud_usd: usd_summary(rows, rates, true),
    };

    let unconverted = report.non_fraud_usd.unconverted + report.fraud_usd.unconverted;
    if unconverted > 0 {
        log::warn!("{unconverted} transactions could not be converted to USD and were skipped");
    }
    if report.top_city_by_mean_amount.is_none() {
        log::warn!("No known city has a mean transaction amount");
    }

    report
}

// Writes the full report, one line per question
// Inputs: output sink, transaction table, and exchange rates
// Outputs: Ok once all eleven lines are written
// Key steps:
// 1. Build and write the first ten answers
// 2. Count risky customers, which fails if the activity column is absent
// 3. Write the count as the last line
pub fn write_report<W: Write>(
    out: &mut W,
    table: &TransactionTable,
    rates: &ExchangeRates,
) -> ReportResult<()> {
    let report = build_report(table, rates);
    write!(out, "{report}")?;
    out.flush()?;

    let risky = risky_customer_count(table)?;
    writeln!(out, "{risky}")?;
    Ok(())
}

fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "nan".to_string(), |v| format!("{v:.4}"))
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "nan".to_string(), |v| format!("{v:.2}"))
}

fn city(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

impl fmt::Display for FraudReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fraud transaction share: {}", ratio(self.fraud_share))?;
        writeln!(f, "{}", self.top_fraud_countries.join(","))?;
        writeln!(
            f,
            "High-risk vendor fraud share: {}",
            ratio(self.high_risk_vendor_fraud_share)
        )?;
        writeln!(
            f,
            "Average transactions per customer per hour: {}",
            ratio(self.avg_transactions_per_customer_hour)
        )?;
        writeln!(f, "{}", city(&self.top_city_by_mean_amount))?;
        match &self.top_fast_food_city {
            FastFoodCity::City(name) => writeln!(f, "{}", city(name))?,
            FastFoodCity::NoFastFoodData => writeln!(f, "No fast_food data in vendor_type")?,
        }
        writeln!(
            f,
            "Mean non-fraud transaction amount in USD: {}",
            money(self.non_fraud_usd.mean)
        )?;
        writeln!(
            f,
            "Std dev of non-fraud transaction amounts in USD: {}",
            money(self.non_fraud_usd.std)
        )?;
        writeln!(f, "Mean fraud transaction amount in USD: {}", money(self.fraud_usd.mean))?;
        writeln!(f, "Std dev of fraud transaction amounts in USD: {}", money(self.fraud_usd.std))
    }
}
