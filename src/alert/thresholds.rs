//! Water quality alert thresholds.
//!
//! The backend raises an alert whenever a reading crosses one of these
//! limits. The same rules live here so the simulated backend in
//! `dev_mode` raises identical alerts, and so alert categories can be
//! bucketed for the analytics bar chart.

use crate::model::{Alert, Reading, Severity};

/// pH outside `[PH_CRITICAL_LOW, PH_CRITICAL_HIGH]` is a high-severity alert.
pub const PH_CRITICAL_LOW: f64 = 6.0;
pub const PH_CRITICAL_HIGH: f64 = 9.0;
/// Dissolved oxygen below this (mg/L) is a high-severity alert.
pub const OXYGEN_CRITICAL_LOW: f64 = 4.0;
/// Temperature above this (°C) is a medium-severity alert.
pub const TEMPERATURE_HIGH: f64 = 35.0;
/// Turbidity above this (NTU) is a medium-severity alert.
pub const TURBIDITY_HIGH: f64 = 40.0;

/// The alert categories the backend emits, in bar-chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertCategory {
    Ph,
    Oxygen,
    Temperature,
    Turbidity,
}

impl AlertCategory {
    pub const ALL: [AlertCategory; 4] = [
        AlertCategory::Ph,
        AlertCategory::Oxygen,
        AlertCategory::Temperature,
        AlertCategory::Turbidity,
    ];

    /// The `type` string carried on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            AlertCategory::Ph => "pH Alert",
            AlertCategory::Oxygen => "Oxygen Alert",
            AlertCategory::Temperature => "Temperature Alert",
            AlertCategory::Turbidity => "Turbidity Alert",
        }
    }

    /// Bar chart label.
    pub fn chart_label(self) -> &'static str {
        match self {
            AlertCategory::Ph => "pH Alerts",
            AlertCategory::Oxygen => "Oxygen Alerts",
            AlertCategory::Temperature => "Temperature Alerts",
            AlertCategory::Turbidity => "Turbidity Alerts",
        }
    }

    /// Classifies a wire `type` string. Matching is case-insensitive on the
    /// leading word so "ph alert" and "pH Alert" agree.
    pub fn from_wire(category: &str) -> Option<AlertCategory> {
        let leading = category.split_whitespace().next()?.to_ascii_lowercase();
        match leading.as_str() {
            "ph" => Some(AlertCategory::Ph),
            "oxygen" => Some(AlertCategory::Oxygen),
            "temperature" => Some(AlertCategory::Temperature),
            "turbidity" => Some(AlertCategory::Turbidity),
            _ => None,
        }
    }
}

/// An alert raised locally from a reading, before it has an id or site.
#[derive(Debug, Clone, PartialEq)]
pub struct RaisedAlert {
    pub category: AlertCategory,
    pub message: String,
    pub severity: Severity,
}

/// Checks a reading against every threshold and returns the alerts it
/// triggers, in category order. Missing values never trigger. Whole-number
/// values keep their trailing `.0` in messages.
pub fn check_reading(reading: &Reading) -> Vec<RaisedAlert> {
    let mut alerts = Vec::new();

    if let Some(ph) = reading.ph {
        if ph < PH_CRITICAL_LOW || ph > PH_CRITICAL_HIGH {
            alerts.push(RaisedAlert {
                category: AlertCategory::Ph,
                message: format!("pH level critical: {:?}", ph),
                severity: Severity::High,
            });
        }
    }
    if let Some(oxygen) = reading.dissolved_oxygen {
        if oxygen < OXYGEN_CRITICAL_LOW {
            alerts.push(RaisedAlert {
                category: AlertCategory::Oxygen,
                message: format!("Low dissolved oxygen: {:?} mg/L", oxygen),
                severity: Severity::High,
            });
        }
    }
    if let Some(temperature) = reading.temperature {
        if temperature > TEMPERATURE_HIGH {
            alerts.push(RaisedAlert {
                category: AlertCategory::Temperature,
                message: format!("High water temperature: {:?}°C", temperature),
                severity: Severity::Medium,
            });
        }
    }
    if let Some(turbidity) = reading.turbidity {
        if turbidity > TURBIDITY_HIGH {
            alerts.push(RaisedAlert {
                category: AlertCategory::Turbidity,
                message: format!("High turbidity: {:?} NTU", turbidity),
                severity: Severity::Medium,
            });
        }
    }

    alerts
}

/// Counts alerts per category, in `AlertCategory::ALL` order. Alerts with an
/// unrecognised category are not counted.
pub fn count_by_category(alerts: &[Alert]) -> [u32; 4] {
    let mut counts = [0u32; 4];
    for alert in alerts {
        if let Some(category) = AlertCategory::from_wire(&alert.category) {
            counts[category as usize] += 1;
        }
    }
    counts
}

/// The alerts whose site name matches `site_name` exactly.
pub fn alerts_for_site<'a>(alerts: &'a [Alert], site_name: &str) -> Vec<&'a Alert> {
    alerts.iter().filter(|a| a.site_name == site_name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(ph: f64, temperature: f64, oxygen: f64, turbidity: f64) -> Reading {
        Reading {
            ph: Some(ph),
            temperature: Some(temperature),
            dissolved_oxygen: Some(oxygen),
            turbidity: Some(turbidity),
            ..Reading::default()
        }
    }

    fn alert(site: &str, category: &str) -> Alert {
        Alert {
            id: 1,
            site_name: site.to_string(),
            category: category.to_string(),
            message: String::new(),
            severity: Severity::High,
            timestamp: "2024-05-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn test_healthy_reading_raises_nothing() {
        assert!(check_reading(&reading(7.2, 25.0, 8.0, 5.0)).is_empty());
    }

    #[test]
    fn test_every_threshold_fires_with_expected_severity() {
        let raised = check_reading(&reading(9.5, 36.0, 3.5, 45.0));
        let categories: Vec<_> = raised.iter().map(|a| a.category).collect();
        assert_eq!(categories, AlertCategory::ALL.to_vec());
        assert_eq!(raised[0].severity, Severity::High);
        assert_eq!(raised[1].severity, Severity::High);
        assert_eq!(raised[2].severity, Severity::Medium);
        assert_eq!(raised[3].severity, Severity::Medium);
        assert_eq!(raised[0].message, "pH level critical: 9.5");
        assert_eq!(raised[1].message, "Low dissolved oxygen: 3.5 mg/L");
        assert_eq!(raised[2].message, "High water temperature: 36.0°C");
        assert_eq!(raised[3].message, "High turbidity: 45.0 NTU");
    }

    #[test]
    fn test_thresholds_are_strict() {
        // Exactly on a limit is not an alert.
        assert!(check_reading(&reading(6.0, 35.0, 4.0, 40.0)).is_empty());
        assert!(check_reading(&reading(9.0, 35.0, 4.0, 40.0)).is_empty());
    }

    #[test]
    fn test_missing_values_never_trigger() {
        assert!(check_reading(&Reading::default()).is_empty());
    }

    #[test]
    fn test_category_classification() {
        assert_eq!(AlertCategory::from_wire("pH Alert"), Some(AlertCategory::Ph));
        assert_eq!(AlertCategory::from_wire("ph alert"), Some(AlertCategory::Ph));
        assert_eq!(AlertCategory::from_wire("Oxygen Alert"), Some(AlertCategory::Oxygen));
        assert_eq!(AlertCategory::from_wire("Temperature Alert"), Some(AlertCategory::Temperature));
        assert_eq!(AlertCategory::from_wire("Turbidity Alert"), Some(AlertCategory::Turbidity));
        assert_eq!(AlertCategory::from_wire("Salinity Alert"), None);
    }

    #[test]
    fn test_count_by_category_skips_unknown() {
        let alerts = vec![
            alert("Sanjay Lake", "pH Alert"),
            alert("Sanjay Lake", "Turbidity Alert"),
            alert("Yamuna River", "pH Alert"),
            alert("Yamuna River", "Salinity Alert"),
        ];
        assert_eq!(count_by_category(&alerts), [2, 0, 0, 1]);
    }

    #[test]
    fn test_alerts_for_site_matches_exact_name() {
        let alerts = vec![
            alert("Hauz Khas Lake", "pH Alert"),
            alert("Neela Hauz Lake", "pH Alert"),
        ];
        let matched = alerts_for_site(&alerts, "Hauz Khas Lake");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].site_name, "Hauz Khas Lake");
    }
}
