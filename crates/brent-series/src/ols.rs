//! Ordinary least squares with an intercept.
//!
//! Single in-sample fit of `y = β0 + β1·x + ε`, the model behind the
//! demand/supply split. Unbiased closed-form estimates from the normal
//! equations; no regularization, no weighting.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeriesError};

/// Result of a bivariate OLS fit.
///
/// Invariant: `fitted[t] + residuals[t] == observed[t]` for every t, up to
/// floating-point tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Intercept estimate β0.
    pub intercept: f64,
    /// Slope estimate β1.
    pub slope: f64,
    /// Fitted values `β0 + β1·x[t]`, indexed like the inputs.
    pub fitted: Vec<f64>,
    /// Residuals `y[t] - fitted[t]`, indexed like the inputs.
    pub residuals: Vec<f64>,
    /// In-sample coefficient of determination.
    pub r_squared: f64,
}

impl RegressionResult {
    /// Coefficient vector `[intercept, slope]`.
    pub const fn coefficients(&self) -> [f64; 2] {
        [self.intercept, self.slope]
    }
}

/// Fit `y = β0 + β1·x + ε` by ordinary least squares.
///
/// # Errors
/// - `InvalidInput` if the inputs differ in length or `x` is constant
///   (the slope is unidentified).
/// - `InsufficientData` below 3 observations (2 parameters plus at least
///   one residual degree of freedom).
pub fn ols_fit(y: &[f64], x: &[f64]) -> Result<RegressionResult> {
    if y.len() != x.len() {
        return Err(SeriesError::InvalidInput {
            reason: format!(
                "target ({}) and explanatory ({}) lengths differ",
                y.len(),
                x.len()
            ),
        });
    }
    if y.len() < 3 {
        return Err(SeriesError::InsufficientData {
            required: 3,
            actual: y.len(),
        });
    }

    let n = y.len() as f64;
    let y = Array1::from_vec(y.to_vec());
    let x = Array1::from_vec(x.to_vec());

    let x_mean = x.sum() / n;
    let y_mean = y.sum() / n;
    let x_centered = &x - x_mean;
    let y_centered = &y - y_mean;

    let sxx = x_centered.dot(&x_centered);
    if sxx <= f64::EPSILON * n {
        return Err(SeriesError::InvalidInput {
            reason: "explanatory variable is constant; slope is unidentified".to_string(),
        });
    }

    let slope = x_centered.dot(&y_centered) / sxx;
    let intercept = y_mean - slope * x_mean;

    let fitted = x.mapv(|xi| intercept + slope * xi);
    let residuals = &y - &fitted;

    let ss_res = residuals.dot(&residuals);
    let ss_tot = y_centered.dot(&y_centered);
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    Ok(RegressionResult {
        intercept,
        slope,
        fitted: fitted.to_vec(),
        residuals: residuals.to_vec(),
        r_squared,
    })
}
