//! Endpoint Verification Module
//!
//! Probes every backend endpoint once and reports which ones are reachable
//! and returning data. Run it before pointing a page at a new server.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::ingest::WaterApi;
use crate::logging::{self, Source};
use crate::model::FetchFailure;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub base_url: String,
    pub endpoints: Vec<EndpointVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointVerification {
    pub endpoint: String,
    pub status: VerificationStatus,
    pub sample_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    /// Responded, but with nothing in it.
    PartialSuccess,
    Failed,
}

impl EndpointVerification {
    fn from_result<T>(endpoint: String, result: Result<T, FetchFailure>, count: impl Fn(&T) -> usize) -> Self {
        match result {
            Ok(body) => {
                let sample_count = count(&body);
                Self {
                    endpoint,
                    status: if sample_count > 0 {
                        VerificationStatus::Success
                    } else {
                        VerificationStatus::PartialSuccess
                    },
                    sample_count,
                    error_message: None,
                }
            }
            Err(e) => Self {
                endpoint,
                status: VerificationStatus::Failed,
                sample_count: 0,
                error_message: Some(e.to_string()),
            },
        }
    }
}

// ============================================================================
// Run
// ============================================================================

/// Probes the site list, sensor data for every listed site, active alerts
/// and analytics. Never fails as a whole; each endpoint carries its own
/// outcome.
pub async fn verify_endpoints(api: &dyn WaterApi, base_url: &str) -> VerificationReport {
    let mut endpoints = Vec::new();

    let sites = api.list_sites().await;
    let site_ids: Vec<u32> = sites
        .as_ref()
        .map(|s| s.iter().map(|site| site.id).collect())
        .unwrap_or_default();
    endpoints.push(EndpointVerification::from_result(
        "water-bodies".to_string(),
        sites,
        |s| s.len(),
    ));

    for site_id in site_ids {
        let result = api.sensor_data(site_id).await;
        endpoints.push(EndpointVerification::from_result(
            format!("sensor-data/{}", site_id),
            result,
            |snapshot| usize::from(snapshot.current_reading().is_some()) + snapshot.historical.len(),
        ));
    }

    endpoints.push(EndpointVerification::from_result(
        "alerts".to_string(),
        api.active_alerts().await,
        |a| a.len(),
    ));
    endpoints.push(EndpointVerification::from_result(
        "analytics".to_string(),
        api.analytics().await,
        |a| a.quality_distribution.total() as usize,
    ));

    let failed = endpoints
        .iter()
        .filter(|e| e.status == VerificationStatus::Failed)
        .count();
    let summary = VerificationSummary {
        total: endpoints.len(),
        working: endpoints.len() - failed,
        failed,
    };
    logging::log_batch_summary("Endpoint verification", summary.total, summary.working, summary.failed);
    if failed > 0 {
        logging::warn(Source::Http, None, &format!("{} endpoint(s) failed verification", failed));
    }

    VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        base_url: base_url.to_string(),
        endpoints,
        summary,
    }
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n===========================================================");
    println!("ENDPOINT VERIFICATION ({})", report.base_url);
    println!("===========================================================");
    for result in &report.endpoints {
        match result.status {
            VerificationStatus::Success => {
                println!("  {:<20} OK ({} records)", result.endpoint, result.sample_count)
            }
            VerificationStatus::PartialSuccess => {
                println!("  {:<20} Responsive but no data", result.endpoint)
            }
            VerificationStatus::Failed => println!(
                "  {:<20} FAILED: {}",
                result.endpoint,
                result.error_message.as_deref().unwrap_or("Unknown")
            ),
        }
    }
    println!();

    let success_rate = if report.summary.total > 0 {
        (report.summary.working as f64 / report.summary.total as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Overall Success Rate: {:.1}% ({}/{})",
        success_rate, report.summary.working, report.summary.total
    );
    println!("===========================================================");
}
