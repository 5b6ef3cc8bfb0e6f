//! Monthly panel built by inner join.
//!
//! A `Panel` holds a monthly, period-end-labeled date index and a set of
//! named f64 columns of equal length. It is constructed by an inner join
//! across input series: a row exists for date t iff every input has an
//! observation at t, so no partial rows ever reach the regression stage.

use std::collections::BTreeMap;

use brent_series::{Frequency, TimeSeries};
use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::error::{ModelError, Result};

/// A monthly panel of aligned, fully-populated columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<f64>)>,
}

impl Panel {
    /// Inner-join a set of monthly series into a panel.
    ///
    /// # Errors
    /// - `InvalidInput` if no series are given or any input is not tagged
    ///   `Monthly`.
    /// - `DuplicateColumn` if two inputs share a name.
    /// - `EmptyResult` if the join yields zero rows (e.g. non-overlapping
    ///   date ranges). This is surfaced rather than returned as an empty panel,
    ///   since a regression on zero rows is meaningless.
    pub fn build(series: &[TimeSeries]) -> Result<Self> {
        if series.is_empty() {
            return Err(ModelError::InvalidInput {
                reason: "panel requires at least one input series".to_string(),
            });
        }
        for s in series {
            if s.frequency() != Frequency::Monthly {
                return Err(ModelError::InvalidInput {
                    reason: format!(
                        "series '{}' is {}, panel inputs must be monthly",
                        s.name(),
                        s.frequency()
                    ),
                });
            }
        }
        for (i, s) in series.iter().enumerate() {
            if series[..i].iter().any(|other| other.name() == s.name()) {
                return Err(ModelError::DuplicateColumn {
                    name: s.name().to_string(),
                });
            }
        }

        let maps: Vec<BTreeMap<NaiveDate, f64>> =
            series.iter().map(|s| s.iter().collect()).collect();

        // Intersect indexes, iterating the first (dates are sorted already).
        let dates: Vec<NaiveDate> = series[0]
            .dates()
            .iter()
            .copied()
            .filter(|d| maps.iter().all(|m| m.contains_key(d)))
            .collect();

        if dates.is_empty() {
            return Err(ModelError::EmptyResult {
                reason: format!(
                    "inner join of {} series has no common dates",
                    series.len()
                ),
            });
        }

        let columns = series
            .iter()
            .zip(&maps)
            .map(|(s, m)| {
                let values = dates.iter().map(|d| m[d]).collect();
                (s.name().to_string(), values)
            })
            .collect();

        Ok(Self { dates, columns })
    }

    /// Number of rows. Always at least 1 for a built panel.
    pub fn height(&self) -> usize {
        self.dates.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// The period-end date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Look up a column by name.
    ///
    /// # Errors
    /// `MissingColumn` if no column carries that name.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| ModelError::MissingColumn {
                name: name.to_string(),
            })
    }

    /// Append a named column sharing the panel's index.
    ///
    /// # Errors
    /// `InvalidInput` on a length mismatch, `DuplicateColumn` if the name
    /// is taken.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.height() {
            return Err(ModelError::InvalidInput {
                reason: format!(
                    "column '{}' has {} values, panel has {} rows",
                    name,
                    values.len(),
                    self.height()
                ),
            });
        }
        if self.columns.iter().any(|(n, _)| *n == name) {
            return Err(ModelError::DuplicateColumn { name });
        }
        self.columns.push((name, values));
        Ok(())
    }

    /// Render the panel as a polars `DataFrame` (dates as ISO strings)
    /// for display.
    ///
    /// # Errors
    /// Propagates polars construction errors.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut cols: Vec<Column> = Vec::with_capacity(self.width() + 1);
        let dates: Vec<String> = self.dates.iter().map(ToString::to_string).collect();
        cols.push(Series::new("date".into(), dates).into());
        for (name, values) in &self.columns {
            cols.push(Series::new(name.as_str().into(), values.clone()).into());
        }
        Ok(DataFrame::new(cols)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monthly(name: &str, dates: Vec<NaiveDate>, values: Vec<f64>) -> TimeSeries {
        TimeSeries::new(name, Frequency::Monthly, dates, values).unwrap()
    }

    #[test]
    fn inner_join_keeps_only_common_dates() {
        let a = monthly(
            "a",
            vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)],
            vec![1.0, 2.0, 3.0],
        );
        let b = monthly(
            "b",
            vec![d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)],
            vec![20.0, 30.0, 40.0],
        );
        let panel = Panel::build(&[a, b]).unwrap();
        assert_eq!(panel.dates(), &[d(2024, 2, 29), d(2024, 3, 31)]);
        assert_eq!(panel.column("a").unwrap(), &[2.0, 3.0]);
        assert_eq!(panel.column("b").unwrap(), &[20.0, 30.0]);
    }

    #[test]
    fn disjoint_indexes_surface_empty_result() {
        let a = monthly("a", vec![d(2023, 1, 31)], vec![1.0]);
        let b = monthly("b", vec![d(2024, 1, 31)], vec![2.0]);
        assert!(matches!(
            Panel::build(&[a, b]),
            Err(ModelError::EmptyResult { .. })
        ));
    }

    #[test]
    fn daily_input_is_rejected() {
        let a = TimeSeries::new(
            "a",
            Frequency::Daily,
            vec![d(2024, 1, 2)],
            vec![1.0],
        )
        .unwrap();
        assert!(matches!(
            Panel::build(&[a]),
            Err(ModelError::InvalidInput { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let a = monthly("a", vec![d(2024, 1, 31)], vec![1.0]);
        let also_a = monthly("a", vec![d(2024, 1, 31)], vec![2.0]);
        assert!(matches!(
            Panel::build(&[a, also_a]),
            Err(ModelError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn missing_column_lookup_fails() {
        let a = monthly("a", vec![d(2024, 1, 31)], vec![1.0]);
        let panel = Panel::build(&[a]).unwrap();
        assert!(matches!(
            panel.column("nope"),
            Err(ModelError::MissingColumn { .. })
        ));
    }

    #[test]
    fn push_column_validates_length_and_name() {
        let a = monthly("a", vec![d(2024, 1, 31), d(2024, 2, 29)], vec![1.0, 2.0]);
        let mut panel = Panel::build(&[a]).unwrap();

        assert!(matches!(
            panel.push_column("short", vec![1.0]),
            Err(ModelError::InvalidInput { .. })
        ));
        assert!(matches!(
            panel.push_column("a", vec![1.0, 2.0]),
            Err(ModelError::DuplicateColumn { .. })
        ));
        panel.push_column("b", vec![3.0, 4.0]).unwrap();
        assert_eq!(panel.column("b").unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn dataframe_has_date_plus_value_columns() {
        let a = monthly("a", vec![d(2024, 1, 31)], vec![1.5]);
        let panel = Panel::build(&[a]).unwrap();
        let df = panel.to_dataframe().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.get_column_names(), vec!["date", "a"]);
    }
}
