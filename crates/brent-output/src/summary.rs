//! Plain-text summary of a decomposition run.

use brent_model::ShockSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Headline statistics of one shock-decomposition run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// First period-end date in the panel.
    pub period_start: NaiveDate,

    /// Last period-end date in the panel.
    pub period_end: NaiveDate,

    /// Number of monthly observations.
    pub observations: usize,

    /// Regression intercept β0.
    pub intercept: f64,

    /// Regression slope β1 on the activity proxy.
    pub slope: f64,

    /// In-sample R² of the demand regression.
    pub r_squared: f64,

    /// Sample standard deviation of the demand shock.
    pub demand_std: f64,

    /// Sample standard deviation of the supply shock.
    pub supply_std: f64,

    /// Mean of the risk (conditional volatility) shock.
    pub risk_mean: f64,
}

/// Sample standard deviation (n−1 denominator).
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    (ss / (n - 1.0)).sqrt()
}

/// Summarize a shock set.
pub fn generate_run_summary(shocks: &ShockSet) -> RunSummary {
    let n = shocks.len() as f64;
    RunSummary {
        period_start: shocks.dates[0],
        period_end: shocks.dates[shocks.dates.len() - 1],
        observations: shocks.len(),
        intercept: shocks.regression.intercept,
        slope: shocks.regression.slope,
        r_squared: shocks.regression.r_squared,
        demand_std: sample_std(&shocks.demand),
        supply_std: sample_std(&shocks.supply),
        risk_mean: shocks.risk.iter().sum::<f64>() / n,
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Shock decomposition: {} monthly observations, {} to {}",
            self.observations, self.period_start, self.period_end
        )?;
        writeln!(
            f,
            "  demand regression: intercept {:.6}, slope {:.6}, R² {:.4}",
            self.intercept, self.slope, self.r_squared
        )?;
        writeln!(
            f,
            "  shock dispersion:  demand σ {:.6}, supply σ {:.6}",
            self.demand_std, self.supply_std
        )?;
        write!(f, "  risk proxy mean:   {:.6}", self.risk_mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brent_series::RegressionResult;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_shocks() -> ShockSet {
        ShockSet {
            dates: vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)],
            demand: vec![0.01, 0.02, 0.03],
            supply: vec![0.04, -0.04, 0.0],
            risk: vec![1.0, 2.0, 3.0],
            regression: RegressionResult {
                intercept: -1.0,
                slope: 0.01,
                fitted: vec![0.01, 0.02, 0.03],
                residuals: vec![0.04, -0.04, 0.0],
                r_squared: 0.25,
            },
        }
    }

    #[test]
    fn summary_aggregates_shock_statistics() {
        let summary = generate_run_summary(&sample_shocks());
        assert_eq!(summary.observations, 3);
        assert_eq!(summary.period_start, d(2024, 1, 31));
        assert_eq!(summary.period_end, d(2024, 3, 31));
        assert_relative_eq!(summary.risk_mean, 2.0);
        assert_relative_eq!(summary.demand_std, 0.01, max_relative = 1e-12);
        assert_relative_eq!(summary.r_squared, 0.25);
    }

    #[test]
    fn display_mentions_key_figures() {
        let summary = generate_run_summary(&sample_shocks());
        let text = summary.to_string();
        assert!(text.contains("3 monthly observations"));
        assert!(text.contains("slope 0.010000"));
        assert!(text.contains("risk proxy mean"));
    }

    #[test]
    fn sample_std_of_constant_is_zero() {
        assert_relative_eq!(sample_std(&[2.0, 2.0, 2.0]), 0.0);
    }
}
