//! Frequency-tagged time series.
//!
//! `TimeSeries` is the value type every transform in this workspace consumes
//! and produces. Invariants (non-empty, strictly increasing dates, finite
//! values) are checked once at construction so downstream code can rely on
//! them without re-validating.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeriesError};

/// Native observation frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// One observation per trading/calendar day.
    Daily,
    /// One observation per calendar month, labeled by the period-end date.
    Monthly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// An ordered, immutable sequence of dated observations with a single
/// named value column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    name: String,
    frequency: Frequency,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a new series, validating its invariants.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the series is empty, dates and values have
    /// different lengths, dates are not strictly increasing, or any value
    /// is non-finite.
    pub fn new(
        name: impl Into<String>,
        frequency: Frequency,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if dates.is_empty() {
            return Err(SeriesError::InvalidInput {
                reason: "series must be non-empty".to_string(),
            });
        }
        if dates.len() != values.len() {
            return Err(SeriesError::InvalidInput {
                reason: format!(
                    "dates ({}) and values ({}) have different lengths",
                    dates.len(),
                    values.len()
                ),
            });
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SeriesError::InvalidInput {
                reason: "dates must be strictly increasing".to_string(),
            });
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(SeriesError::InvalidInput {
                reason: format!("values must be finite, found {v}"),
            });
        }
        Ok(Self {
            name: name.into(),
            frequency,
            dates,
            values,
        })
    }

    /// Column name of the series.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Native frequency of the series.
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Observation dates, strictly increasing.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observation values, same length as `dates`.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations. Always at least 1.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Date of the first observation.
    pub fn start(&self) -> NaiveDate {
        self.dates[0]
    }

    /// Date of the last observation.
    pub fn end(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Iterate over `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Return the same series under a new column name.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
