//! Table and list rows.
//!
//! Every builder takes the whole current snapshot and returns the whole row
//! set; callers replace the container's children with the result. There is
//! no incremental diffing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::alert::timestamps::format_relative_time;
use crate::alert::thresholds::alerts_for_site;
use crate::model::{Alert, MonitoredSite, Reading, Severity};
use crate::quality::{assess_reading, Grade};

/// Placeholder shown for a value that has not been measured.
pub const MISSING: &str = "--";

fn fmt_value(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => MISSING.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Site list (dashboard)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SiteRow {
    pub site_id: u32,
    pub name: String,
    pub area: f64,
    /// Grade of the latest known reading, if any.
    pub grade: Option<Grade>,
    pub selected: bool,
}

impl SiteRow {
    pub fn render(&self) -> String {
        let marker = if self.selected { '>' } else { ' ' };
        let status = self.grade.map(Grade::label).unwrap_or("No data");
        format!("{} [{}] {} ({:.1} sq km) - {}", marker, self.site_id, self.name, self.area, status)
    }
}

pub fn site_rows(sites: &[MonitoredSite], readings: &BTreeMap<u32, Reading>, selected: Option<u32>) -> Vec<SiteRow> {
    sites
        .iter()
        .map(|site| SiteRow {
            site_id: site.id,
            name: site.name.clone(),
            area: site.area,
            grade: readings.get(&site.id).map(|r| assess_reading(r).grade),
            selected: Some(site.id) == selected,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Detailed analysis table (analytics)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRow {
    pub site_id: u32,
    pub name: String,
    pub reading: Option<Reading>,
    pub grade: Option<Grade>,
    pub score: Option<u8>,
    pub alert_count: usize,
}

impl AnalysisRow {
    pub fn render(&self) -> String {
        let r = self.reading.as_ref();
        format!(
            "{} | pH {} | {} °C | DO {} mg/L | {} NTU | {} | alerts: {}",
            self.name,
            fmt_value(r.and_then(|r| r.ph), 2),
            fmt_value(r.and_then(|r| r.temperature), 1),
            fmt_value(r.and_then(|r| r.dissolved_oxygen), 1),
            fmt_value(r.and_then(|r| r.turbidity), 1),
            match (self.grade, self.score) {
                (Some(grade), Some(score)) => format!("{} ({})", grade.label(), score),
                _ => MISSING.to_string(),
            },
            self.alert_count,
        )
    }
}

/// One row per site, optionally narrowed to a single site.
pub fn analysis_rows(
    sites: &[MonitoredSite],
    readings: &BTreeMap<u32, Reading>,
    alerts: &[Alert],
    only_site: Option<u32>,
) -> Vec<AnalysisRow> {
    sites
        .iter()
        .filter(|site| only_site.is_none_or(|id| id == site.id))
        .map(|site| {
            let reading = readings.get(&site.id).cloned();
            let assessment = reading.as_ref().map(assess_reading);
            AnalysisRow {
                site_id: site.id,
                name: site.name.clone(),
                grade: assessment.map(|a| a.grade),
                score: assessment.map(|a| a.score),
                reading,
                alert_count: alerts_for_site(alerts, &site.name).len(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Alert list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AlertRow {
    pub site_name: String,
    pub category: String,
    pub message: String,
    pub severity: Severity,
    /// "Just now", "5m ago", ...
    pub when: String,
}

impl AlertRow {
    pub fn render(&self) -> String {
        format!(
            "[{}] {} - {}: {} ({})",
            self.severity.as_str().to_uppercase(),
            self.site_name,
            self.category,
            self.message,
            self.when
        )
    }
}

pub fn alert_rows(alerts: &[Alert], now: DateTime<Utc>) -> Vec<AlertRow> {
    alerts
        .iter()
        .map(|a| AlertRow {
            site_name: a.site_name.clone(),
            category: a.category.clone(),
            message: a.message.clone(),
            severity: a.severity,
            when: format_relative_time(&a.timestamp, now),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::reference_sites;
    use chrono::TimeZone;

    fn good_reading() -> Reading {
        Reading {
            ph: Some(7.2),
            temperature: Some(24.0),
            dissolved_oxygen: Some(8.1),
            turbidity: Some(3.4),
            ..Reading::default()
        }
    }

    #[test]
    fn test_site_rows_cover_every_site() {
        let sites = reference_sites();
        let mut readings = BTreeMap::new();
        readings.insert(1, good_reading());
        let rows = site_rows(&sites, &readings, Some(1));
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].grade, Some(Grade::Good));
        assert!(rows[0].selected);
        assert_eq!(rows[1].grade, None);
        assert!(rows[1].render().ends_with("No data"));
    }

    #[test]
    fn test_analysis_row_shows_placeholder_for_missing_values() {
        let sites = reference_sites();
        let mut readings = BTreeMap::new();
        readings.insert(2, Reading { ph: Some(7.0), ..Reading::default() });
        let rows = analysis_rows(&sites, &readings, &[], Some(2));
        assert_eq!(rows.len(), 1);
        let line = rows[0].render();
        assert!(line.contains("pH 7.00"), "{}", line);
        assert!(line.contains("-- °C"), "{}", line);
    }

    #[test]
    fn test_analysis_row_counts_alerts_by_name() {
        let sites = reference_sites();
        let alerts = vec![Alert {
            id: 1,
            site_name: "Yamuna River".into(),
            category: "Oxygen Alert".into(),
            message: "Low dissolved oxygen: 3.1 mg/L".into(),
            severity: Severity::High,
            timestamp: "2024-05-01 12:58:00".into(),
        }];
        let rows = analysis_rows(&sites, &BTreeMap::new(), &alerts, None);
        assert_eq!(rows[0].alert_count, 1);
        assert_eq!(rows[1].alert_count, 0);

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        let line = alert_rows(&alerts, now)[0].render();
        assert_eq!(line, "[HIGH] Yamuna River - Oxygen Alert: Low dissolved oxygen: 3.1 mg/L (2m ago)");
    }
}
