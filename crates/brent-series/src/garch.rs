//! GARCH(1,1) conditional volatility.
//!
//! Gaussian quasi-maximum-likelihood fit of
//!
//! ```text
//! ε_t  = r_t − μ
//! σ²_t = ω + α·ε²_{t-1} + β·σ²_{t-1}
//! ```
//!
//! with stationarity constraints ω > 0, α ≥ 0, β ≥ 0, α + β < 1. The
//! negative log-likelihood is minimized over (μ, ω, α, β) with a
//! Nelder-Mead simplex; constraint violations are penalized inside the
//! objective rather than handled by a constrained optimizer.
//!
//! Precondition: the input returns should be scaled to percent (×100, see
//! [`Garch11Config::expected_scale`]). Unscaled daily log returns put ω
//! near 1e-6 and make the likelihood surface badly conditioned.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeriesError};
use crate::series::TimeSeries;

const LN_2PI: f64 = 1.837_877_066_409_345_3;

/// Objective value assigned to parameter vectors that violate the
/// positivity or stationarity constraints.
const PENALTY: f64 = 1e30;

/// Minimum number of return observations for a meaningful fit.
const MIN_OBSERVATIONS: usize = 10;

/// Fitted GARCH(1,1) parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Garch11Params {
    /// Conditional mean μ of the returns.
    pub mu: f64,
    /// Long-run variance weight ω.
    pub omega: f64,
    /// ARCH (shock) coefficient α.
    pub alpha: f64,
    /// GARCH (persistence) coefficient β.
    pub beta: f64,
}

impl Garch11Params {
    /// Volatility persistence α + β. Stationary solutions have this < 1.
    pub const fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    /// Unconditional (long-run) variance ω / (1 − α − β).
    pub fn long_run_variance(&self) -> f64 {
        self.omega / (1.0 - self.persistence())
    }
}

/// GARCH(1,1) fit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Garch11Config {
    /// Simplex iteration budget before the fit is declared non-convergent.
    pub max_iterations: usize,

    /// Relative spread of objective values at which the simplex is
    /// considered converged.
    pub tolerance: f64,

    /// Upper bound enforced on α + β during optimization. Must lie in (0, 1).
    pub stationarity_bound: f64,

    /// Floor applied to the conditional variance recursion.
    pub variance_floor: f64,

    /// Scale the input returns are expected to carry. 100.0 means percent
    /// log returns, the convention this pipeline feeds the fit. Sets the
    /// scale of the degenerate-variance threshold below.
    pub expected_scale: f64,
}

impl Default for Garch11Config {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            tolerance: 1e-10,
            stationarity_bound: 0.999,
            variance_floor: 1e-12,
            expected_scale: 100.0,
        }
    }
}

/// Result of a GARCH(1,1) fit.
#[derive(Debug, Clone)]
pub struct Garch11Fit {
    /// Estimated parameters.
    pub params: Garch11Params,
    /// Maximized Gaussian log-likelihood.
    pub log_likelihood: f64,
    /// Simplex iterations consumed.
    pub iterations: usize,
    /// Conditional volatility σ_t (not variance), one value per input
    /// observation, on the input's dates and frequency.
    pub conditional_volatility: TimeSeries,
}

/// Fit a GARCH(1,1) model to a return series.
///
/// # Errors
/// - `InvalidInput` for a malformed configuration.
/// - `InsufficientData` below [`MIN_OBSERVATIONS`] returns.
/// - `FitFailure` when the returns have (near-)zero variance, the simplex
///   exhausts its iteration budget, or the solution is non-stationary.
///   Never panics and never propagates NaN.
pub fn fit_garch11(returns: &TimeSeries, config: &Garch11Config) -> Result<Garch11Fit> {
    validate_config(config)?;
    if returns.len() < MIN_OBSERVATIONS {
        return Err(SeriesError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: returns.len(),
        });
    }

    let r = Array1::from_vec(returns.values().to_vec());
    let n = r.len() as f64;
    let mean = r.sum() / n;
    let variance = r.mapv(|v| (v - mean).powi(2)).sum() / n;
    // Degeneracy threshold in the units the returns are expected to carry.
    let variance_threshold =
        config.variance_floor * config.expected_scale * config.expected_scale;
    if variance <= variance_threshold {
        return Err(SeriesError::FitFailure {
            reason: format!(
                "returns have (near-)zero sample variance {variance:.3e}; \
                 the Gaussian likelihood is degenerate"
            ),
        });
    }

    let objective = |p: &[f64; 4]| negative_log_likelihood(&r, p, config);

    // Method-of-moments flavored starting point: most of the unconditional
    // variance assigned to persistence.
    let start = [mean, 0.05 * variance, 0.05, 0.90];
    let steps = [
        0.1 * variance.sqrt(),
        0.5 * start[1],
        0.05,
        0.05,
    ];

    let simplex = nelder_mead(
        &objective,
        start,
        steps,
        config.max_iterations,
        config.tolerance,
    );
    if !simplex.converged {
        return Err(SeriesError::FitFailure {
            reason: format!(
                "optimizer did not converge within {} iterations",
                config.max_iterations
            ),
        });
    }
    if simplex.best_value >= PENALTY {
        return Err(SeriesError::FitFailure {
            reason: "optimizer terminated on an infeasible parameter vector".to_string(),
        });
    }

    let [mu, omega, alpha, beta] = simplex.best_point;
    let params = Garch11Params {
        mu,
        omega,
        alpha,
        beta,
    };
    if params.persistence() >= 1.0 {
        return Err(SeriesError::FitFailure {
            reason: format!(
                "non-stationary solution: alpha + beta = {:.6}",
                params.persistence()
            ),
        });
    }

    let variances = variance_path(&r, &params, config.variance_floor);
    let sigma: Vec<f64> = variances.iter().map(|h| h.sqrt()).collect();
    if sigma.iter().any(|s| !s.is_finite()) {
        return Err(SeriesError::FitFailure {
            reason: "conditional volatility path is not finite".to_string(),
        });
    }

    let conditional_volatility = TimeSeries::new(
        format!("{}_vol", returns.name()),
        returns.frequency(),
        returns.dates().to_vec(),
        sigma,
    )?;

    Ok(Garch11Fit {
        params,
        log_likelihood: -simplex.best_value,
        iterations: simplex.iterations,
        conditional_volatility,
    })
}

fn validate_config(config: &Garch11Config) -> Result<()> {
    if config.max_iterations == 0 {
        return Err(SeriesError::InvalidInput {
            reason: "max_iterations must be positive".to_string(),
        });
    }
    if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
        return Err(SeriesError::InvalidInput {
            reason: format!("tolerance must be positive, got {}", config.tolerance),
        });
    }
    if !(config.stationarity_bound > 0.0 && config.stationarity_bound < 1.0) {
        return Err(SeriesError::InvalidInput {
            reason: format!(
                "stationarity bound must lie in (0, 1), got {}",
                config.stationarity_bound
            ),
        });
    }
    if !(config.variance_floor.is_finite() && config.variance_floor >= 0.0) {
        return Err(SeriesError::InvalidInput {
            reason: format!(
                "variance floor must be non-negative, got {}",
                config.variance_floor
            ),
        });
    }
    if !(config.expected_scale.is_finite() && config.expected_scale > 0.0) {
        return Err(SeriesError::InvalidInput {
            reason: format!(
                "expected scale must be positive, got {}",
                config.expected_scale
            ),
        });
    }
    Ok(())
}

/// Conditional variance recursion for a fixed parameter vector.
///
/// σ²_0 is the unconditional variance implied by the parameters; every
/// later term follows the GARCH(1,1) update, floored at `floor`.
fn variance_path(returns: &Array1<f64>, params: &Garch11Params, floor: f64) -> Vec<f64> {
    let eps: Vec<f64> = returns.iter().map(|r| r - params.mu).collect();
    let mut h = Vec::with_capacity(eps.len());

    let mut h0 = params.long_run_variance();
    if !h0.is_finite() || h0 <= 0.0 {
        let m = eps.iter().sum::<f64>() / eps.len() as f64;
        h0 = eps.iter().map(|e| (e - m).powi(2)).sum::<f64>() / eps.len() as f64;
    }
    h.push(h0.max(floor));

    for t in 1..eps.len() {
        let next = params.omega + params.alpha * eps[t - 1].powi(2) + params.beta * h[t - 1];
        h.push(next.max(floor));
    }
    h
}

/// Negative Gaussian log-likelihood of the returns under (μ, ω, α, β),
/// with constraint violations mapped to [`PENALTY`].
fn negative_log_likelihood(returns: &Array1<f64>, p: &[f64; 4], config: &Garch11Config) -> f64 {
    let [mu, omega, alpha, beta] = *p;
    if !(mu.is_finite() && omega.is_finite() && alpha.is_finite() && beta.is_finite()) {
        return PENALTY;
    }
    if omega <= 0.0 || alpha < 0.0 || beta < 0.0 || alpha + beta >= config.stationarity_bound {
        return PENALTY;
    }

    let params = Garch11Params {
        mu,
        omega,
        alpha,
        beta,
    };
    let h = variance_path(returns, &params, config.variance_floor);

    let mut nll = 0.0;
    for (r, ht) in returns.iter().zip(h.iter()) {
        let e = r - mu;
        nll += 0.5 * (LN_2PI + ht.ln() + e * e / ht);
    }
    if nll.is_finite() { nll } else { PENALTY }
}

struct SimplexResult {
    best_point: [f64; 4],
    best_value: f64,
    iterations: usize,
    converged: bool,
}

/// Nelder-Mead simplex minimization in four dimensions with the standard
/// reflection/expansion/contraction/shrink coefficients.
fn nelder_mead(
    f: &dyn Fn(&[f64; 4]) -> f64,
    start: [f64; 4],
    steps: [f64; 4],
    max_iterations: usize,
    tolerance: f64,
) -> SimplexResult {
    const REFLECT: f64 = 1.0;
    const EXPAND: f64 = 2.0;
    const CONTRACT: f64 = 0.5;
    const SHRINK: f64 = 0.5;
    const DIM: usize = 4;

    let mut points: Vec<[f64; 4]> = Vec::with_capacity(DIM + 1);
    points.push(start);
    for i in 0..DIM {
        let mut p = start;
        p[i] += if steps[i] != 0.0 { steps[i] } else { 1e-4 };
        points.push(p);
    }
    let mut values: Vec<f64> = points.iter().map(|p| f(p)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;

        // Order the simplex: index 0 best, index DIM worst.
        let mut order: Vec<usize> = (0..=DIM).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        points = order.iter().map(|&i| points[i]).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let spread = values[DIM] - values[0];
        if spread.abs() <= tolerance * (1.0 + values[0].abs()) {
            converged = true;
            break;
        }

        // Centroid of all points except the worst.
        let mut centroid = [0.0; 4];
        for p in points.iter().take(DIM) {
            for (c, pi) in centroid.iter_mut().zip(p.iter()) {
                *c += pi / DIM as f64;
            }
        }

        let worst = points[DIM];
        let mut reflected = [0.0; 4];
        for i in 0..DIM {
            reflected[i] = centroid[i] + REFLECT * (centroid[i] - worst[i]);
        }
        let f_reflected = f(&reflected);

        if f_reflected < values[0] {
            // Try to expand past the reflected point.
            let mut expanded = [0.0; 4];
            for i in 0..DIM {
                expanded[i] = centroid[i] + EXPAND * (reflected[i] - centroid[i]);
            }
            let f_expanded = f(&expanded);
            if f_expanded < f_reflected {
                points[DIM] = expanded;
                values[DIM] = f_expanded;
            } else {
                points[DIM] = reflected;
                values[DIM] = f_reflected;
            }
        } else if f_reflected < values[DIM - 1] {
            points[DIM] = reflected;
            values[DIM] = f_reflected;
        } else {
            // Contract toward the centroid from whichever of worst/reflected
            // is better.
            let (anchor, f_anchor) = if f_reflected < values[DIM] {
                (reflected, f_reflected)
            } else {
                (worst, values[DIM])
            };
            let mut contracted = [0.0; 4];
            for i in 0..DIM {
                contracted[i] = centroid[i] + CONTRACT * (anchor[i] - centroid[i]);
            }
            let f_contracted = f(&contracted);
            if f_contracted < f_anchor {
                points[DIM] = contracted;
                values[DIM] = f_contracted;
            } else {
                // Shrink everything toward the best point.
                let best = points[0];
                for j in 1..=DIM {
                    for i in 0..DIM {
                        points[j][i] = best[i] + SHRINK * (points[j][i] - best[i]);
                    }
                    values[j] = f(&points[j]);
                }
            }
        }
    }

    let mut best = 0;
    for i in 1..=DIM {
        if values[i] < values[best] {
            best = i;
        }
    }
    SimplexResult {
        best_point: points[best],
        best_value: values[best],
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Frequency;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn daily(values: Vec<f64>) -> TimeSeries {
        let base = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| base + chrono::Duration::days(i as i64))
            .collect();
        TimeSeries::new("ret", Frequency::Daily, dates, values).unwrap()
    }

    /// Standard normal draw via Box-Muller.
    fn normal(rng: &mut StdRng) -> f64 {
        let u1: f64 = rng.gen_range(1e-12..1.0);
        let u2: f64 = rng.gen_range(0.0..1.0);
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Simulate a percent-scaled GARCH(1,1) path.
    fn simulate(params: Garch11Params, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut h = params.long_run_variance();
        let mut out = Vec::with_capacity(n);
        let mut prev_eps = 0.0;
        for _ in 0..n {
            h = params.omega + params.alpha * prev_eps * prev_eps + params.beta * h;
            prev_eps = h.sqrt() * normal(&mut rng);
            out.push(params.mu + prev_eps);
        }
        out
    }

    #[test]
    fn zero_variance_returns_fit_failure() {
        let ts = daily(vec![0.0; 100]);
        let err = fit_garch11(&ts, &Garch11Config::default()).unwrap_err();
        assert!(matches!(err, SeriesError::FitFailure { .. }));
    }

    #[test]
    fn too_few_observations_is_insufficient_data() {
        let ts = daily(vec![0.5, -0.3, 0.2, -0.1, 0.4]);
        let err = fit_garch11(&ts, &Garch11Config::default()).unwrap_err();
        assert!(matches!(err, SeriesError::InsufficientData { .. }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let ts = daily(simulate(
            Garch11Params {
                mu: 0.0,
                omega: 0.1,
                alpha: 0.08,
                beta: 0.9,
            },
            50,
            7,
        ));
        let config = Garch11Config {
            stationarity_bound: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            fit_garch11(&ts, &config),
            Err(SeriesError::InvalidInput { .. })
        ));
    }

    #[test]
    fn recovers_stationary_solution_from_simulated_path() {
        let truth = Garch11Params {
            mu: 0.02,
            omega: 0.1,
            alpha: 0.08,
            beta: 0.88,
        };
        let ts = daily(simulate(truth, 2000, 42));
        let fit = fit_garch11(&ts, &Garch11Config::default()).unwrap();

        assert!(fit.params.persistence() < 1.0);
        assert!(fit.params.omega > 0.0);
        assert!(fit.log_likelihood.is_finite());
        // Simulated data is strongly persistent; the estimate should be too.
        assert!(fit.params.persistence() > 0.5);
    }

    #[test]
    fn volatility_path_matches_input_index() {
        let truth = Garch11Params {
            mu: 0.0,
            omega: 0.2,
            alpha: 0.1,
            beta: 0.85,
        };
        let ts = daily(simulate(truth, 500, 11));
        let fit = fit_garch11(&ts, &Garch11Config::default()).unwrap();

        let vol = &fit.conditional_volatility;
        assert_eq!(vol.len(), ts.len());
        assert_eq!(vol.dates(), ts.dates());
        assert_eq!(vol.frequency(), Frequency::Daily);
        assert!(vol.values().iter().all(|s| s.is_finite() && *s > 0.0));
    }

    #[test]
    fn volatility_rises_after_a_large_shock() {
        let truth = Garch11Params {
            mu: 0.0,
            omega: 0.1,
            alpha: 0.1,
            beta: 0.85,
        };
        let mut values = simulate(truth, 400, 3);
        let calm = values[200];
        values[200] = calm + 15.0; // inject a 15% single-day move
        let ts = daily(values);
        let fit = fit_garch11(&ts, &Garch11Config::default()).unwrap();

        let sigma = fit.conditional_volatility.values();
        assert!(sigma[201] > sigma[200]);
    }
}
