//! Log-return transform.

use crate::error::{Result, SeriesError};
use crate::series::TimeSeries;

/// Compute scaled log returns: `scale * ln(p_t / p_{t-1})`.
///
/// The first observation has no predecessor and is dropped, so the output
/// has exactly one fewer point than the input and keeps the input's
/// frequency tag. `scale` is 1.0 for plain continuously-compounded returns
/// or 100.0 for percent returns (the scale the GARCH fit expects).
///
/// # Errors
/// - `InsufficientData` if the series has fewer than 2 observations.
/// - `InvalidInput` if any value is zero or negative (the log return is
///   undefined), or if `scale` is zero or non-finite. Failing here keeps
///   NaN out of every later pipeline stage.
pub fn log_returns(series: &TimeSeries, scale: f64) -> Result<TimeSeries> {
    if !scale.is_finite() || scale == 0.0 {
        return Err(SeriesError::InvalidInput {
            reason: format!("return scale must be finite and non-zero, got {scale}"),
        });
    }
    if series.len() < 2 {
        return Err(SeriesError::InsufficientData {
            required: 2,
            actual: series.len(),
        });
    }
    if let Some((date, value)) = series.iter().find(|(_, v)| *v <= 0.0) {
        return Err(SeriesError::InvalidInput {
            reason: format!("log return undefined for non-positive value {value} at {date}"),
        });
    }

    let dates = series.dates()[1..].to_vec();
    let values = series
        .values()
        .windows(2)
        .map(|w| scale * (w[1] / w[0]).ln())
        .collect();

    TimeSeries::new(series.name(), series.frequency(), dates, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Frequency;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn prices(values: Vec<f64>) -> TimeSeries {
        let dates = (0..values.len())
            .map(|i| d(2024, 1, 1 + i as u32))
            .collect();
        TimeSeries::new("close", Frequency::Daily, dates, values).unwrap()
    }

    #[test]
    fn output_is_one_shorter_than_input() {
        let ts = prices(vec![100.0, 105.0, 110.25, 99.0]);
        let ret = log_returns(&ts, 1.0).unwrap();
        assert_eq!(ret.len(), ts.len() - 1);
        assert_eq!(ret.dates(), &ts.dates()[1..]);
    }

    #[test]
    fn round_trips_through_exp() {
        let ts = prices(vec![100.0, 105.0, 110.25, 99.0, 101.3]);
        let ret = log_returns(&ts, 1.0).unwrap();
        for (t, r) in ret.values().iter().enumerate() {
            let reconstructed = r.exp() * ts.values()[t];
            assert_relative_eq!(reconstructed, ts.values()[t + 1], max_relative = 1e-12);
        }
    }

    #[test]
    fn scale_multiplies_returns() {
        let ts = prices(vec![100.0, 105.0]);
        let plain = log_returns(&ts, 1.0).unwrap();
        let percent = log_returns(&ts, 100.0).unwrap();
        assert_relative_eq!(percent.values()[0], 100.0 * plain.values()[0]);
        assert_relative_eq!(plain.values()[0], 1.05_f64.ln());
    }

    #[test]
    fn rejects_non_positive_values() {
        let ts = prices(vec![100.0, 0.0, 105.0]);
        assert!(matches!(
            log_returns(&ts, 1.0),
            Err(SeriesError::InvalidInput { .. })
        ));

        let ts = prices(vec![100.0, -3.0]);
        assert!(matches!(
            log_returns(&ts, 1.0),
            Err(SeriesError::InvalidInput { .. })
        ));
    }

    #[test]
    fn rejects_single_observation() {
        let ts = prices(vec![100.0]);
        assert!(matches!(
            log_returns(&ts, 1.0),
            Err(SeriesError::InsufficientData {
                required: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn rejects_degenerate_scale() {
        let ts = prices(vec![100.0, 105.0]);
        assert!(log_returns(&ts, 0.0).is_err());
        assert!(log_returns(&ts, f64::NAN).is_err());
    }
}
