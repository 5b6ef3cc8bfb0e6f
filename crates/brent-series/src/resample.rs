//! Calendar-month resampling.
//!
//! Converts a series of any native frequency onto a monthly index. Each
//! output row is labeled by the last calendar day of its month (period-end
//! convention); months with no input observations produce no output row.
//! There is no interpolation or forward-fill.

use chrono::{Datelike, NaiveDate};

use crate::error::Result;
use crate::series::{Frequency, TimeSeries};

/// How observations within one calendar month are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleRule {
    /// Use the chronologically final observation of the month.
    Last,
    /// Use the arithmetic mean of all observations in the month.
    Mean,
}

/// Last calendar day of the month containing `date`.
fn month_end(date: NaiveDate) -> NaiveDate {
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    // In range for any date chrono can represent short of NaiveDate::MAX.
    first_of_next
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Resample a series onto a monthly, period-end-labeled index.
///
/// Observations are grouped by calendar month and aggregated per `rule`.
/// Deterministic given input and rule. Input invariants (non-empty, sorted)
/// are guaranteed by the `TimeSeries` constructor.
///
/// # Errors
/// Only fails if the aggregated output cannot form a valid `TimeSeries`,
/// which cannot happen for a valid input.
pub fn resample_monthly(series: &TimeSeries, rule: ResampleRule) -> Result<TimeSeries> {
    let mut dates = Vec::new();
    let mut values = Vec::new();

    let mut period: Option<NaiveDate> = None;
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut last = 0.0;

    let flush =
        |label: NaiveDate, sum: f64, count: usize, last: f64, dates: &mut Vec<NaiveDate>, values: &mut Vec<f64>| {
            let aggregated = match rule {
                ResampleRule::Last => last,
                ResampleRule::Mean => sum / count as f64,
            };
            dates.push(label);
            values.push(aggregated);
        };

    for (date, value) in series.iter() {
        let label = month_end(date);
        match period {
            Some(current) if current == label => {}
            Some(current) => {
                flush(current, sum, count, last, &mut dates, &mut values);
                sum = 0.0;
                count = 0;
            }
            None => {}
        }
        period = Some(label);
        sum += value;
        count += 1;
        last = value;
    }
    if let Some(current) = period {
        flush(current, sum, count, last, &mut dates, &mut values);
    }

    TimeSeries::new(series.name(), Frequency::Monthly, dates, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(dates: Vec<NaiveDate>, values: Vec<f64>) -> TimeSeries {
        TimeSeries::new("x", Frequency::Daily, dates, values).unwrap()
    }

    #[rstest]
    #[case(d(2024, 2, 14), d(2024, 2, 29))] // leap February
    #[case(d(2023, 2, 1), d(2023, 2, 28))]
    #[case(d(2024, 12, 31), d(2024, 12, 31))]
    #[case(d(2024, 6, 1), d(2024, 6, 30))]
    fn month_end_labels(#[case] input: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(month_end(input), expected);
    }

    #[test]
    fn last_returns_final_observation_of_period() {
        let ts = daily(
            vec![d(2024, 1, 2), d(2024, 1, 15), d(2024, 1, 31)],
            vec![80.0, 82.5, 79.0],
        );
        let out = resample_monthly(&ts, ResampleRule::Last).unwrap();
        assert_eq!(out.dates(), &[d(2024, 1, 31)]);
        assert_eq!(out.values(), &[79.0]);
        assert_eq!(out.frequency(), Frequency::Monthly);
    }

    #[test]
    fn mean_returns_arithmetic_mean_of_period() {
        let ts = daily(
            vec![d(2024, 1, 2), d(2024, 1, 15), d(2024, 1, 31)],
            vec![30.0, 33.0, 36.0],
        );
        let out = resample_monthly(&ts, ResampleRule::Mean).unwrap();
        assert_relative_eq!(out.values()[0], 33.0);
    }

    #[test]
    fn empty_months_produce_no_rows() {
        // January and April observations only; February and March are absent.
        let ts = daily(
            vec![d(2024, 1, 10), d(2024, 4, 5), d(2024, 4, 20)],
            vec![1.0, 2.0, 4.0],
        );
        let out = resample_monthly(&ts, ResampleRule::Mean).unwrap();
        assert_eq!(out.dates(), &[d(2024, 1, 31), d(2024, 4, 30)]);
        assert_eq!(out.values(), &[1.0, 3.0]);
    }

    #[test]
    fn year_boundary_splits_periods() {
        let ts = daily(
            vec![d(2023, 12, 29), d(2024, 1, 2)],
            vec![70.0, 71.0],
        );
        let out = resample_monthly(&ts, ResampleRule::Last).unwrap();
        assert_eq!(out.dates(), &[d(2023, 12, 31), d(2024, 1, 31)]);
    }

    #[test]
    fn monthly_input_is_relabeled_to_period_end() {
        // FRED-style first-of-month observations.
        let ts = TimeSeries::new(
            "ipm",
            Frequency::Monthly,
            vec![d(2024, 1, 1), d(2024, 2, 1)],
            vec![102.1, 102.8],
        )
        .unwrap();
        let out = resample_monthly(&ts, ResampleRule::Mean).unwrap();
        assert_eq!(out.dates(), &[d(2024, 1, 31), d(2024, 2, 29)]);
        assert_eq!(out.values(), &[102.1, 102.8]);
    }
}
