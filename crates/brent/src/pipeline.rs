//! End-to-end shock-decomposition pipeline.
//!
//! Single-threaded, single-pass: each stage fully consumes its input and
//! hands an immutable artifact to the next. Any stage failure aborts the
//! run; the error names the failing stage so the caller can report which
//! precondition broke. No best-effort or partial panels are produced.

use brent_model::{Panel, ShockSet, decompose, with_shocks};
use brent_series::{
    Frequency, Garch11Config, Garch11Fit, ResampleRule, TimeSeries, fit_garch11, log_returns,
    resample_monthly,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stages, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Validating the raw input series.
    Inputs,
    /// Month-end resample of daily closes.
    MonthlyClose,
    /// Monthly log returns of the oil price.
    MonthlyReturns,
    /// Monthly mean of the implied-volatility index.
    ImpliedVolatility,
    /// Monthly mean of the activity index.
    Activity,
    /// Percent-scaled daily log returns.
    DailyReturns,
    /// GARCH(1,1) conditional-volatility fit.
    GarchFit,
    /// Monthly mean of the fitted conditional volatility.
    MonthlyVolatility,
    /// Inner join of the monthly series.
    PanelJoin,
    /// OLS shock decomposition.
    Decomposition,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Inputs => "input validation",
            Self::MonthlyClose => "monthly close resample",
            Self::MonthlyReturns => "monthly return transform",
            Self::ImpliedVolatility => "implied volatility resample",
            Self::Activity => "activity resample",
            Self::DailyReturns => "daily return transform",
            Self::GarchFit => "GARCH(1,1) fit",
            Self::MonthlyVolatility => "conditional volatility resample",
            Self::PanelJoin => "panel join",
            Self::Decomposition => "shock decomposition",
        };
        write!(f, "{name}")
    }
}

/// A pipeline failure, tagged with the stage that produced it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A series transform or fit failed.
    #[error("{stage} failed: {source}")]
    Series {
        /// The failing stage
        stage: Stage,
        /// The underlying error
        source: brent_series::SeriesError,
    },

    /// Panel construction or decomposition failed.
    #[error("{stage} failed: {source}")]
    Model {
        /// The failing stage
        stage: Stage,
        /// The underlying error
        source: brent_model::ModelError,
    },
}

impl PipelineError {
    /// The stage that failed.
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Series { stage, .. } | Self::Model { stage, .. } => *stage,
        }
    }
}

/// Result type for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Raw inputs to a pipeline run, as fetched from the data providers.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    /// Daily oil close prices (e.g. Brent front-month futures).
    pub oil_closes: TimeSeries,
    /// Daily implied-volatility index (e.g. OVX).
    pub implied_vol: TimeSeries,
    /// Industrial-activity index at its native (typically monthly) frequency.
    pub activity: TimeSeries,
}

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Scale of the monthly returns used in the regression. 1.0 keeps
    /// plain log returns, matching the demand/supply units.
    pub return_scale: f64,

    /// Scale of the daily returns fed to the GARCH fit. 100.0 (percent)
    /// keeps the likelihood well-conditioned; this scale reaches the final
    /// panel only through the risk column and never mixes with the
    /// regression returns.
    pub garch_scale: f64,

    /// GARCH(1,1) fit settings.
    pub garch: Garch11Config,

    /// Panel column name for the monthly oil return.
    pub return_column: String,

    /// Panel column name for the activity proxy.
    pub activity_column: String,

    /// Panel column name for the GARCH conditional volatility.
    pub volatility_column: String,

    /// Panel column name for the implied-volatility index.
    pub implied_vol_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            return_scale: 1.0,
            garch_scale: 100.0,
            garch: Garch11Config::default(),
            return_column: "oil_ret".to_string(),
            activity_column: "activity".to_string(),
            volatility_column: "garch_vol".to_string(),
            implied_vol_column: "implied_vol".to_string(),
        }
    }
}

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct ShockRun {
    /// The monthly panel with the three shock columns appended.
    pub panel: Panel,
    /// The shock series and the underlying regression.
    pub shocks: ShockSet,
    /// The GARCH fit, including the daily conditional-volatility path.
    pub garch: Garch11Fit,
}

/// The shock-decomposition pipeline.
#[derive(Debug, Clone, Default)]
pub struct ShockPipeline {
    config: PipelineConfig,
}

impl ShockPipeline {
    /// Create a pipeline with the given configuration.
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full decomposition.
    ///
    /// # Errors
    /// The first failing stage aborts the run with a stage-tagged error.
    pub fn run(&self, inputs: &PipelineInputs) -> Result<ShockRun> {
        let cfg = &self.config;

        self.validate_inputs(inputs)?;

        let monthly_close = resample_monthly(&inputs.oil_closes, ResampleRule::Last)
            .map_err(|e| series_err(Stage::MonthlyClose, e))?;
        let oil_ret = log_returns(&monthly_close, cfg.return_scale)
            .map_err(|e| series_err(Stage::MonthlyReturns, e))?
            .renamed(&cfg.return_column);

        let implied_vol = resample_monthly(&inputs.implied_vol, ResampleRule::Mean)
            .map_err(|e| series_err(Stage::ImpliedVolatility, e))?
            .renamed(&cfg.implied_vol_column);

        let activity = resample_monthly(&inputs.activity, ResampleRule::Mean)
            .map_err(|e| series_err(Stage::Activity, e))?
            .renamed(&cfg.activity_column);

        let daily_ret = log_returns(&inputs.oil_closes, cfg.garch_scale)
            .map_err(|e| series_err(Stage::DailyReturns, e))?;
        let garch = fit_garch11(&daily_ret, &cfg.garch)
            .map_err(|e| series_err(Stage::GarchFit, e))?;
        let garch_vol = resample_monthly(&garch.conditional_volatility, ResampleRule::Mean)
            .map_err(|e| series_err(Stage::MonthlyVolatility, e))?
            .renamed(&cfg.volatility_column);

        let panel = Panel::build(&[oil_ret, activity, garch_vol, implied_vol])
            .map_err(|e| model_err(Stage::PanelJoin, e))?;

        let shocks = decompose(
            &panel,
            &cfg.return_column,
            &cfg.activity_column,
            &cfg.volatility_column,
        )
        .map_err(|e| model_err(Stage::Decomposition, e))?;

        let panel = with_shocks(&panel, &shocks)
            .map_err(|e| model_err(Stage::Decomposition, e))?;

        Ok(ShockRun {
            panel,
            shocks,
            garch,
        })
    }

    fn validate_inputs(&self, inputs: &PipelineInputs) -> Result<()> {
        for (series, expected) in [
            (&inputs.oil_closes, Frequency::Daily),
            (&inputs.implied_vol, Frequency::Daily),
        ] {
            if series.frequency() != expected {
                return Err(series_err(
                    Stage::Inputs,
                    brent_series::SeriesError::InvalidInput {
                        reason: format!(
                            "series '{}' is {}, expected {}",
                            series.name(),
                            series.frequency(),
                            expected
                        ),
                    },
                ));
            }
        }
        Ok(())
    }
}

const fn series_err(stage: Stage, source: brent_series::SeriesError) -> PipelineError {
    PipelineError::Series { stage, source }
}

const fn model_err(stage: Stage, source: brent_model::ModelError) -> PipelineError {
    PipelineError::Model { stage, source }
}
