use std::collections::HashMap;

use chrono::NaiveDate;

use crate::transaction::Transaction;

pub const BASE_CURRENCY: &str = "USD";

/// Daily exchange rates, expressed as units of a currency per one USD.
#[derive(Debug, Clone, Default)]
pub struct ExchangeRates {
    currencies: Vec<String>,
    by_date: HashMap<NaiveDate, Vec<Option<f64>>>,
}

impl ExchangeRates {
    pub fn new(currencies: Vec<String>) -> Self {
        ExchangeRates {
            currencies,
            by_date: HashMap::new(),
        }
    }

    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Adds the rates for one date, aligned with `currencies()`. A repeated
    /// date keeps its first row.
    pub fn insert(&mut self, date: NaiveDate, mut rates: Vec<Option<f64>>) {
        rates.resize(self.currencies.len(), None);
        self.by_date.entry(date).or_insert(rates);
    }

    pub fn rate(&self, date: NaiveDate, currency: &str) -> Option<f64> {
        let column = self.currencies.iter().position(|c| c == currency)?;
        let rate = (*self.by_date.get(&date)?.get(column)?)?;
        if rate.is_nan() || rate == 0.0 {
            None
        } else {
            Some(rate)
        }
    }

    // Converts an amount to USD
    // Inputs: transaction amount, currency code, and transaction date
    // Outputs: amount in USD, or None when any piece of the lookup is missing
    // Key steps:
    // 1. USD amounts pass through without a lookup
    // 2. Otherwise divide by the rate for that date and currency
    pub fn to_usd(
        &self,
        amount: Option<f64>,
        currency: Option<&str>,
        date: Option<NaiveDate>,
    ) -> Option<f64> {
        let amount = amount?;
        let currency = currency?;
        if currency == BASE_CURRENCY {
            return Some(amount);
        }
        let rate = self.rate(date?, currency)?;
        Some(amount / rate)
    }

    pub fn transaction_usd(&self, tx: &Transaction) -> Option<f64> {
        self.to_usd(tx.amount, tx.currency.as_deref(), tx.date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
    }

    fn rates() -> ExchangeRates {
        let mut rates = ExchangeRates::new(vec!["EUR".into(), "JPY".into(), "RUB".into()]);
        rates.insert(day(1), vec![Some(0.5), Some(150.0), Some(0.0)]);
        rates.insert(day(2), vec![Some(f64::NAN), None]);
        rates.insert(day(1), vec![Some(9.0), Some(9.0), Some(9.0)]);
        rates
    }

    #[test]
    fn test_usd_passes_through() {
        let rates = rates();
        assert_eq!(rates.to_usd(Some(42.0), Some("USD"), None), Some(42.0));
        assert_eq!(rates.to_usd(None, Some("USD"), Some(day(1))), None);
    }

    #[test]
    fn test_conversion_divides_by_rate() {
        let rates = rates();
        assert_eq!(rates.to_usd(Some(10.0), Some("EUR"), Some(day(1))), Some(20.0));
        assert_eq!(rates.to_usd(Some(300.0), Some("JPY"), Some(day(1))), Some(2.0));
    }

    #[test]
    fn test_failed_lookups_are_missing() {
        let rates = rates();
        // zero rate
        assert_eq!(rates.to_usd(Some(10.0), Some("RUB"), Some(day(1))), None);
        // NaN rate, padded rate, unknown date, unknown currency, no date
        assert_eq!(rates.to_usd(Some(10.0), Some("EUR"), Some(day(2))), None);
        assert_eq!(rates.to_usd(Some(10.0), Some("RUB"), Some(day(2))), None);
        assert_eq!(rates.to_usd(Some(10.0), Some("EUR"), Some(day(3))), None);
        assert_eq!(rates.to_usd(Some(10.0), Some("GBP"), Some(day(1))), None);
        assert_eq!(rates.to_usd(Some(10.0), Some("EUR"), None), None);
    }

    #[test]
    fn test_first_row_wins_for_duplicate_dates() {
        assert_eq!(rates().rate(day(1), "EUR"), Some(0.5));
        assert_eq!(rates().len(), 2);
    }
}
