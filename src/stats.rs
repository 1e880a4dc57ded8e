use ndarray::Array1;

// Drops missing values (None and NaN) before any reduction
pub fn present<I>(values: I) -> Array1<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect()
}

pub fn mean(values: &Array1<f64>) -> Option<f64> {
    values.mean()
}

/// Sample standard deviation (one delta degree of freedom).
pub fn sample_std(values: &Array1<f64>) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(values.std(1.0))
}

/// Share of `true` among the flags that are present.
pub fn share<I>(flags: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<bool>>,
{
    let values = present(flags.into_iter().map(|f| f.map(|b| if b { 1.0 } else { 0.0 })));
    mean(&values)
}

// Linear interpolation between the two closest ranks
pub fn quantile(values: &Array1<f64>, q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn median(values: &Array1<f64>) -> Option<f64> {
    quantile(values, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_present_skips_missing() {
        let values = present(vec![Some(1.0), None, Some(f64::NAN), Some(3.0)]);
        assert_eq!(values.to_vec(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_mean_and_std() {
        let values = present([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].map(Some));
        assert_eq!(mean(&values), Some(5.0));
        // population std is 2.0, sample std is sqrt(32 / 7)
        assert!(close(sample_std(&values).unwrap(), (32.0f64 / 7.0).sqrt()));
    }

    #[test]
    fn test_degenerate_inputs() {
        let empty = present(Vec::new());
        assert_eq!(mean(&empty), None);
        assert_eq!(sample_std(&empty), None);
        assert_eq!(quantile(&empty, 0.95), None);
        assert_eq!(sample_std(&present(vec![Some(1.0)])), None);
        assert_eq!(share(vec![None, None]), None);
    }

    #[test]
    fn test_share_ignores_missing_flags() {
        assert_eq!(share(vec![Some(true), Some(false), None, Some(false), Some(true)]), Some(0.5));
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = present((1..=10).map(|v| Some(v as f64)));
        // position 0.95 * 9 = 8.55 between 9 and 10
        assert!(close(quantile(&values, 0.95).unwrap(), 9.55));
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(10.0));
        assert_eq!(median(&values), Some(5.5));
        assert_eq!(median(&present(vec![Some(3.0), Some(1.0), Some(2.0)])), Some(2.0));
    }
}
