/// Dashboard API client
///
/// Reads the four JSON endpoints of the water-quality backend:
///
///   GET /api/water-bodies        list of monitored sites
///   GET /api/sensor-data/{id}    current + last 24 readings for one site
///   GET /api/alerts              newest active alerts (at most 10)
///   GET /api/analytics           averages and grade distribution
///
/// Each call is exactly one round trip. There is no retry and no caching:
/// the caller keeps its last good snapshot and decides what to show on
/// failure.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::model::{Alert, AnalyticsSummary, FetchFailure, MonitoredSite, SensorSnapshot};

pub const SITES_PATH: &str = "/api/water-bodies";
pub const SENSOR_DATA_PATH: &str = "/api/sensor-data";
pub const ALERTS_PATH: &str = "/api/alerts";
pub const ANALYTICS_PATH: &str = "/api/analytics";

// ============================================================================
// Source trait
// ============================================================================

/// Read operations every data source provides.
#[async_trait]
pub trait WaterApi: Send + Sync {
    async fn list_sites(&self) -> Result<Vec<MonitoredSite>, FetchFailure>;

    /// Readings for one site, tagged with `site_id`.
    async fn sensor_data(&self, site_id: u32) -> Result<SensorSnapshot, FetchFailure>;

    async fn active_alerts(&self) -> Result<Vec<Alert>, FetchFailure>;

    async fn analytics(&self) -> Result<AnalyticsSummary, FetchFailure>;
}

// ============================================================================
// HTTP client
// ============================================================================

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self, FetchFailure> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("aquamon/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and return the raw body of a 2xx response.
    async fn get_text(&self, path: &str) -> Result<String, FetchFailure> {
        let response = self
            .client
            .get(self.url(path))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchFailure::Http(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl WaterApi for HttpApi {
    async fn list_sites(&self) -> Result<Vec<MonitoredSite>, FetchFailure> {
        let body = self.get_text(SITES_PATH).await?;
        parse_sites(&body)
    }

    async fn sensor_data(&self, site_id: u32) -> Result<SensorSnapshot, FetchFailure> {
        let body = self.get_text(&sensor_data_path(site_id)).await?;
        parse_sensor_snapshot(&body, site_id)
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>, FetchFailure> {
        let body = self.get_text(ALERTS_PATH).await?;
        parse_alerts(&body)
    }

    async fn analytics(&self) -> Result<AnalyticsSummary, FetchFailure> {
        let body = self.get_text(ANALYTICS_PATH).await?;
        parse_analytics(&body)
    }
}

pub fn sensor_data_path(site_id: u32) -> String {
    format!("{}/{}", SENSOR_DATA_PATH, site_id)
}

// ============================================================================
// Decoding
// ============================================================================

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchFailure> {
    Ok(serde_json::from_str(body)?)
}

pub fn parse_sites(body: &str) -> Result<Vec<MonitoredSite>, FetchFailure> {
    decode(body)
}

/// Decodes a sensor snapshot and tags every reading with `site_id`, which
/// the endpoint itself does not echo.
pub fn parse_sensor_snapshot(body: &str, site_id: u32) -> Result<SensorSnapshot, FetchFailure> {
    let mut snapshot: SensorSnapshot = decode(body)?;
    snapshot.tag_site(site_id);
    Ok(snapshot)
}

pub fn parse_alerts(body: &str) -> Result<Vec<Alert>, FetchFailure> {
    decode(body)
}

pub fn parse_analytics(body: &str) -> Result<AnalyticsSummary, FetchFailure> {
    decode(body)
}

// ============================================================================
// Tests
// ============================================================================
