/// Core data types for the water-quality dashboard.
///
/// This module defines the shared domain model imported by all other modules:
/// the monitored sites, their sensor readings, active alerts and the
/// aggregate analytics summary, exactly as the backend serves them.
/// It contains no I/O; the only logic is small accessors on the wire types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Site types
// ---------------------------------------------------------------------------

/// A monitored water body, as listed by `/api/water-bodies`.
///
/// Created server-side and read-only here; the list is refetched wholesale
/// on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredSite {
    pub id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Surface area in square kilometres.
    #[serde(default)]
    pub area: f64,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "active".to_string()
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One timestamped set of sensor values for a site.
///
/// Every scalar is optional on the wire: the per-site endpoint returns `{}`
/// for a site that has never reported, and historical rows omit
/// conductivity and TDS. `site_id` is only present on push events; readings
/// fetched per site are tagged by the fetcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default, rename = "water_body_id", skip_serializing_if = "Option::is_none")]
    pub site_id: Option<u32>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Acidity level.
    #[serde(default)]
    pub ph: Option<f64>,
    /// Water temperature, °C.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Dissolved oxygen, mg/L.
    #[serde(default)]
    pub dissolved_oxygen: Option<f64>,
    /// Turbidity, NTU.
    #[serde(default)]
    pub turbidity: Option<f64>,
    /// Conductivity, µS/cm.
    #[serde(default)]
    pub conductivity: Option<f64>,
    /// Total dissolved solids, mg/L.
    #[serde(default)]
    pub total_dissolved_solids: Option<f64>,
}

impl Reading {
    /// True when the reading carries no sensor value at all (the `{}` the
    /// backend sends for a site without data).
    pub fn is_empty(&self) -> bool {
        self.ph.is_none()
            && self.temperature.is_none()
            && self.dissolved_oxygen.is_none()
            && self.turbidity.is_none()
            && self.conductivity.is_none()
            && self.total_dissolved_solids.is_none()
    }

    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Ph => self.ph,
            Parameter::Temperature => self.temperature,
            Parameter::DissolvedOxygen => self.dissolved_oxygen,
            Parameter::Turbidity => self.turbidity,
            Parameter::Conductivity => self.conductivity,
            Parameter::TotalDissolvedSolids => self.total_dissolved_solids,
        }
    }
}

/// Current plus recent readings for one site, as served by
/// `/api/sensor-data/{id}`.
///
/// `historical` is ordered newest first and holds at most 24 rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    #[serde(default)]
    pub current: Reading,
    #[serde(default)]
    pub historical: Vec<Reading>,
}

impl SensorSnapshot {
    /// The current reading, or `None` when the site has not reported yet.
    pub fn current_reading(&self) -> Option<&Reading> {
        if self.current.is_empty() {
            None
        } else {
            Some(&self.current)
        }
    }

    /// Historical readings in chronological order (oldest first).
    pub fn chronological(&self) -> impl Iterator<Item = &Reading> {
        self.historical.iter().rev()
    }

    /// Stamps every reading in the snapshot with the site it belongs to.
    pub fn tag_site(&mut self, site_id: u32) {
        self.current.site_id = Some(site_id);
        for reading in &mut self.historical {
            reading.site_id = Some(site_id);
        }
    }
}

/// The sensor parameters a reading can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Ph,
    Temperature,
    DissolvedOxygen,
    Turbidity,
    Conductivity,
    TotalDissolvedSolids,
}

impl Parameter {
    /// All six parameters in display order.
    pub const ALL: [Parameter; 6] = [
        Parameter::Ph,
        Parameter::Temperature,
        Parameter::DissolvedOxygen,
        Parameter::Turbidity,
        Parameter::Conductivity,
        Parameter::TotalDissolvedSolids,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Parameter::Ph => "pH Level",
            Parameter::Temperature => "Temperature (°C)",
            Parameter::DissolvedOxygen => "Dissolved Oxygen (mg/L)",
            Parameter::Turbidity => "Turbidity (NTU)",
            Parameter::Conductivity => "Conductivity (µS/cm)",
            Parameter::TotalDissolvedSolids => "TDS (mg/L)",
        }
    }

    /// Short key used for element ids and CLI arguments.
    pub fn key(self) -> &'static str {
        match self {
            Parameter::Ph => "ph",
            Parameter::Temperature => "temperature",
            Parameter::DissolvedOxygen => "oxygen",
            Parameter::Turbidity => "turbidity",
            Parameter::Conductivity => "conductivity",
            Parameter::TotalDissolvedSolids => "tds",
        }
    }

    pub fn from_key(key: &str) -> Option<Parameter> {
        Parameter::ALL.into_iter().find(|p| p.key() == key)
    }
}

// ---------------------------------------------------------------------------
// Alert types
// ---------------------------------------------------------------------------

/// Alert severity tiers, in ascending order of severity. Unrecognized wire
/// values decode as `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "high" => Severity::High,
            "medium" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// An active alert, as listed by `/api/alerts`.
///
/// Alerts reference their site by display name, not by id; the map's detail
/// panel matches on that name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u32,
    #[serde(rename = "water_body")]
    pub site_name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Analytics types
// ---------------------------------------------------------------------------

/// Reading counts per grade over the last 24 hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDistribution {
    #[serde(rename = "Good", default)]
    pub good: u32,
    #[serde(rename = "Fair", default)]
    pub fair: u32,
    #[serde(rename = "Poor", default)]
    pub poor: u32,
}

impl QualityDistribution {
    /// Widened so counts straight off the wire cannot overflow.
    pub fn total(&self) -> u64 {
        u64::from(self.good) + u64::from(self.fair) + u64::from(self.poor)
    }
}

/// Aggregate figures served by `/api/analytics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub total_bodies: u32,
    #[serde(default)]
    pub avg_ph: f64,
    #[serde(default)]
    pub avg_temperature: f64,
    #[serde(default)]
    pub avg_oxygen: f64,
    #[serde(default)]
    pub avg_turbidity: f64,
    #[serde(default)]
    pub quality_distribution: QualityDistribution,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding dashboard data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchFailure {
    /// Non-2xx HTTP response from the backend.
    #[error("HTTP error: {0}")]
    Http(u16),
    /// The request never produced a response (connection refused, reset...).
    #[error("Transport error: {0}")]
    Transport(String),
    /// The response body could not be deserialized.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for FetchFailure {
    fn from(err: serde_json::Error) -> Self {
        FetchFailure::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchFailure::Http(status.as_u16()),
            None if err.is_decode() => FetchFailure::Decode(err.to_string()),
            None => FetchFailure::Transport(err.to_string()),
        }
    }
}
