//! Daily close series from Yahoo Finance.

use brent_series::{Frequency, TimeSeries};
use chrono::NaiveDate;
use std::time::Duration;
use tokio::time::sleep;
use yahoo_finance_api as yahoo;

use crate::error::{DataError, Result};

/// Yahoo Finance close-price provider with rate limiting.
pub struct YahooCloseProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooCloseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooCloseProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooCloseProvider {
    /// Create a provider with default rate limiting (1 req/sec).
    ///
    /// # Errors
    /// Fails if the underlying connector cannot be constructed.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(1000))
    }

    /// Create a provider with custom rate limiting.
    ///
    /// # Errors
    /// Fails if the underlying connector cannot be constructed.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| DataError::YahooApi(e.to_string()))?;
        Ok(Self {
            provider,
            rate_limit_delay,
        })
    }

    /// Fetch the daily close series for a symbol.
    ///
    /// Quotes with non-positive or non-finite closes are dropped (Yahoo
    /// occasionally reports zero-filled rows); what remains must be
    /// non-empty.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g. "BZ=F" or "^OVX")
    /// * `start` - First date of the range, inclusive
    /// * `end` - Last date of the range, inclusive
    ///
    /// # Errors
    /// `InvalidDateRange`, `InvalidSymbol`, `YahooApi` / `MissingData` on
    /// provider failures, `TimeConversion` on timestamp conversion.
    pub async fn fetch_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let start_time = to_offset_datetime(start)?;
        let end_time = to_offset_datetime(end.succ_opt().unwrap_or(end))?;

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;
        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                series: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let mut dates: Vec<NaiveDate> = Vec::with_capacity(quotes.len());
        let mut values: Vec<f64> = Vec::with_capacity(quotes.len());
        for q in &quotes {
            if !q.close.is_finite() || q.close <= 0.0 {
                continue;
            }
            let date = chrono::DateTime::from_timestamp(q.timestamp, 0)
                .ok_or_else(|| {
                    DataError::TimeConversion(format!("invalid quote timestamp {}", q.timestamp))
                })?
                .date_naive();
            // Yahoo sometimes repeats the trailing session; keep the first.
            if dates.last() == Some(&date) {
                continue;
            }
            dates.push(date);
            values.push(q.close);
        }

        if dates.is_empty() {
            return Err(DataError::MissingData {
                series: symbol.to_string(),
                reason: "All returned quotes had unusable closes".to_string(),
            });
        }

        let series = TimeSeries::new(symbol, Frequency::Daily, dates, values)?;

        sleep(self.rate_limit_delay).await;

        Ok(series)
    }
}

/// Midnight UTC of a calendar date, as the `time` type the Yahoo API wants.
fn to_offset_datetime(date: NaiveDate) -> Result<time::OffsetDateTime> {
    let timestamp = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| DataError::TimeConversion(format!("invalid date {date}")))?;
    time::OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}
