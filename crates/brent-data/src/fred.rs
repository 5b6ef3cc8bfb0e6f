//! FRED macro-series client with rate limiting.

use brent_series::{Frequency, TimeSeries};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

use crate::error::{DataError, Result};

/// FRED API base URL
const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Default rate limit: 2 requests per second (well inside FRED's quota)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(500);

/// Environment variable the API key is read from
pub const FRED_API_KEY_VAR: &str = "FRED_API_KEY";

/// FRED series commonly used as the global-activity proxy
pub const INDUSTRIAL_PRODUCTION: &str = "INDPRO";

/// One observation from the FRED observations endpoint.
/// Missing values are reported as the literal string ".".
#[derive(Debug, Clone, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// Response envelope of the observations endpoint.
#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

/// Rate limiter to space out requests to the FRED API
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// FRED API client with rate limiting.
pub struct FredClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for FredClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FredClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FredClient {
    /// Create a client with an explicit API key and default rate limiting.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_rate_limit(api_key, DEFAULT_RATE_LIMIT)
    }

    /// Create a client reading the API key from [`FRED_API_KEY_VAR`].
    ///
    /// # Errors
    /// `MissingApiKey` if the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(FRED_API_KEY_VAR).unwrap_or_default();
        if key.is_empty() {
            return Err(DataError::MissingApiKey {
                variable: FRED_API_KEY_VAR.to_string(),
            });
        }
        Self::new(key)
    }

    /// Create a client with a custom rate limit.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be constructed.
    pub fn with_rate_limit(api_key: impl Into<String>, min_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
            base_url: FRED_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Fetch a FRED series as observations over a date range.
    ///
    /// Missing observations (reported by FRED as `"."`) are skipped. The
    /// caller supplies the frequency tag, since FRED publishes series at
    /// many native frequencies (INDPRO is monthly).
    ///
    /// # Errors
    /// `InvalidDateRange` / `InvalidSymbol` on bad arguments, `FredApi` on
    /// non-success responses, `Parse` on malformed observations,
    /// `MissingData` if no usable observations remain.
    pub async fn fetch_series(
        &self,
        series_id: &str,
        frequency: Frequency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        if series_id.is_empty() {
            return Err(DataError::InvalidSymbol("Empty series id".to_string()));
        }

        self.rate_limiter.lock().await.wait().await;

        let url = format!("{}/series/observations", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", &start.to_string()),
                ("observation_end", &end.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FredApi(format!("{status}: {body}")));
        }

        let parsed: ObservationsResponse = response.json().await?;
        observations_to_series(series_id, frequency, &parsed.observations)
    }
}

/// Convert raw FRED observations into a validated series, skipping the
/// `"."` missing-value sentinel.
fn observations_to_series(
    series_id: &str,
    frequency: Frequency,
    observations: &[Observation],
) -> Result<TimeSeries> {
    let mut dates = Vec::with_capacity(observations.len());
    let mut values = Vec::with_capacity(observations.len());

    for obs in observations {
        if obs.value == "." {
            continue;
        }
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("bad observation date '{}': {e}", obs.date)))?;
        let value: f64 = obs
            .value
            .parse()
            .map_err(|e| DataError::Parse(format!("bad observation value '{}': {e}", obs.value)))?;
        dates.push(date);
        values.push(value);
    }

    if dates.is_empty() {
        return Err(DataError::MissingData {
            series: series_id.to_string(),
            reason: "No usable observations in range".to_string(),
        });
    }

    Ok(TimeSeries::new(series_id, frequency, dates, values)?)
}
