//! Historical climate data access.
//!
//! Fetches the 90-day daily series the classifier works from. A source
//! failure is fatal to the whole request; nothing downstream runs without
//! the series.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};

/// A 90-day daily series with nulls already filtered out.
#[derive(Debug, Clone, Default)]
pub struct DailySeries {
    pub temperature: Vec<f64>,
    pub precipitation: Vec<f64>,
}

#[async_trait]
pub trait ClimateDataSource: Send + Sync {
    /// Fetch the daily temperature/precipitation series for a point.
    async fn fetch(&self, lat: f64, lon: f64) -> AnalysisResult<DailySeries>;
}

/// Open-Meteo archive client.
pub struct OpenMeteoSource {
    client: Client,
    base_url: String,
}

const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const WINDOW_DAYS: i64 = 90;

impl OpenMeteoSource {
    pub fn new() -> Self {
        Self::with_base_url(ARCHIVE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for OpenMeteoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: ArchiveDaily,
}

#[derive(Debug, Deserialize)]
struct ArchiveDaily {
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

#[async_trait]
impl ClimateDataSource for OpenMeteoSource {
    async fn fetch(&self, lat: f64, lon: f64) -> AnalysisResult<DailySeries> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(WINDOW_DAYS);

        debug!("fetching archive series for ({lat}, {lon})");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
                (
                    "daily",
                    "temperature_2m_mean,precipitation_sum".to_string(),
                ),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let archive: ArchiveResponse = response.json().await?;

        let temperature: Vec<f64> = archive
            .daily
            .temperature_2m_mean
            .into_iter()
            .flatten()
            .collect();
        let precipitation: Vec<f64> = archive
            .daily
            .precipitation_sum
            .into_iter()
            .flatten()
            .collect();

        if temperature.is_empty() {
            return Err(AnalysisError::DataSource(
                "archive returned an empty temperature series".to_string(),
            ));
        }

        Ok(DailySeries {
            temperature,
            precipitation,
        })
    }
}
