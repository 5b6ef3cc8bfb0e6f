//! Demand / supply / risk shock decomposition.
//!
//! Regresses the oil return column on the macro-activity column and splits
//! the result: demand shock = fitted values (the part of the return the
//! activity proxy explains), supply shock = residuals, risk shock = the
//! conditional-volatility column copied verbatim. Single in-sample fit:
//! the decomposition explains historical variance, it does not forecast.

use brent_series::{RegressionResult, ols_fit};
use chrono::NaiveDate;

use crate::error::{ModelError, Result};
use crate::panel::Panel;

/// Default column name for the demand shock.
pub const DEMAND_COLUMN: &str = "demand";
/// Default column name for the supply shock.
pub const SUPPLY_COLUMN: &str = "supply";
/// Default column name for the risk shock.
pub const RISK_COLUMN: &str = "risk";

/// The three shock series on the panel's index.
///
/// Demand and supply partition the observed return at each date
/// (`demand[t] + supply[t] == target[t]` within floating-point tolerance);
/// risk is not derived from the regression.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockSet {
    /// Period-end index shared with the source panel.
    pub dates: Vec<NaiveDate>,
    /// Demand shock: OLS fitted values `β0 + β1·explanatory[t]`.
    pub demand: Vec<f64>,
    /// Supply shock: OLS residuals `target[t] - demand[t]`.
    pub supply: Vec<f64>,
    /// Risk shock: the volatility column, unchanged.
    pub risk: Vec<f64>,
    /// The underlying regression fit.
    pub regression: RegressionResult,
}

impl ShockSet {
    /// Number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the set holds no observations. Never true for a set
    /// produced by [`decompose`].
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Decompose a panel into demand, supply, and risk shocks.
///
/// # Errors
/// - `MissingColumn` if any named column is absent.
/// - `InsufficientData` if the panel has fewer than 3 rows (2 parameters
///   plus at least one residual degree of freedom).
/// - `InvalidInput` if the explanatory column is constant.
pub fn decompose(
    panel: &Panel,
    target: &str,
    explanatory: &str,
    volatility: &str,
) -> Result<ShockSet> {
    let y = panel.column(target)?;
    let x = panel.column(explanatory)?;
    let vol = panel.column(volatility)?;

    if panel.height() < 3 {
        return Err(ModelError::InsufficientData {
            required: 3,
            actual: panel.height(),
        });
    }

    let regression = ols_fit(y, x)?;

    Ok(ShockSet {
        dates: panel.dates().to_vec(),
        demand: regression.fitted.clone(),
        supply: regression.residuals.clone(),
        risk: vol.to_vec(),
        regression,
    })
}

/// Append the three labeled shock columns to a panel.
///
/// # Errors
/// `InvalidInput` if the shock set does not share the panel's index;
/// `DuplicateColumn` if a shock column name is already taken.
pub fn with_shocks(panel: &Panel, shocks: &ShockSet) -> Result<Panel> {
    if shocks.dates != panel.dates() {
        return Err(ModelError::InvalidInput {
            reason: "shock set index does not match panel index".to_string(),
        });
    }
    let mut out = panel.clone();
    out.push_column(DEMAND_COLUMN, shocks.demand.clone())?;
    out.push_column(SUPPLY_COLUMN, shocks.supply.clone())?;
    out.push_column(RISK_COLUMN, shocks.risk.clone())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brent_series::{Frequency, TimeSeries};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn panel_3x3() -> Panel {
        let dates = vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)];
        let ret = TimeSeries::new(
            "oil_ret",
            Frequency::Monthly,
            dates.clone(),
            vec![0.05, -0.02, 0.03],
        )
        .unwrap();
        let act = TimeSeries::new(
            "activity",
            Frequency::Monthly,
            dates.clone(),
            vec![101.0, 102.5, 103.1],
        )
        .unwrap();
        let vol = TimeSeries::new(
            "garch_vol",
            Frequency::Monthly,
            dates,
            vec![1.8, 2.4, 2.1],
        )
        .unwrap();
        Panel::build(&[ret, act, vol]).unwrap()
    }

    #[test]
    fn demand_plus_supply_reconstructs_target() {
        let panel = panel_3x3();
        let shocks = decompose(&panel, "oil_ret", "activity", "garch_vol").unwrap();
        let target = panel.column("oil_ret").unwrap();
        for t in 0..shocks.len() {
            assert_relative_eq!(
                shocks.demand[t] + shocks.supply[t],
                target[t],
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn risk_is_copied_verbatim() {
        let panel = panel_3x3();
        let shocks = decompose(&panel, "oil_ret", "activity", "garch_vol").unwrap();
        assert_eq!(shocks.risk, panel.column("garch_vol").unwrap());
    }

    #[test]
    fn shock_index_matches_panel_index() {
        let panel = panel_3x3();
        let shocks = decompose(&panel, "oil_ret", "activity", "garch_vol").unwrap();
        assert_eq!(shocks.dates, panel.dates());
    }

    #[test]
    fn two_row_panel_is_insufficient() {
        let dates = vec![d(2024, 1, 31), d(2024, 2, 29)];
        let ret = TimeSeries::new("oil_ret", Frequency::Monthly, dates.clone(), vec![0.1, 0.2])
            .unwrap();
        let act = TimeSeries::new("activity", Frequency::Monthly, dates.clone(), vec![1.0, 2.0])
            .unwrap();
        let vol =
            TimeSeries::new("garch_vol", Frequency::Monthly, dates, vec![1.0, 1.1]).unwrap();
        let panel = Panel::build(&[ret, act, vol]).unwrap();
        assert!(matches!(
            decompose(&panel, "oil_ret", "activity", "garch_vol"),
            Err(ModelError::InsufficientData {
                required: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn unknown_column_is_missing() {
        let panel = panel_3x3();
        assert!(matches!(
            decompose(&panel, "oil_ret", "nope", "garch_vol"),
            Err(ModelError::MissingColumn { .. })
        ));
    }

    #[test]
    fn with_shocks_appends_labeled_columns() {
        let panel = panel_3x3();
        let shocks = decompose(&panel, "oil_ret", "activity", "garch_vol").unwrap();
        let out = with_shocks(&panel, &shocks).unwrap();
        assert_eq!(
            out.column_names(),
            vec![
                "oil_ret",
                "activity",
                "garch_vol",
                DEMAND_COLUMN,
                SUPPLY_COLUMN,
                RISK_COLUMN
            ]
        );
        assert_eq!(out.column(RISK_COLUMN).unwrap(), shocks.risk.as_slice());
    }
}
