//! Map view.
//!
//! One marker per site, colored by the grade of the site's latest reading.
//! Filters only toggle marker visibility: markers and their assessments
//! survive any filter change, so resetting the filter restores every
//! marker that was present before.
//!
//! Selecting a marker fills the detail panel. The panel is always rebuilt
//! whole from the selected site, and its alert sublist is matched on the
//! selected site's name, so nothing from a previous selection leaks through.

use crate::alert::thresholds::alerts_for_site;
use crate::model::{Alert, MonitoredSite, Reading};
use crate::quality::{assess_reading, Grade, QualityAssessment, UNKNOWN_COLOR};
use crate::sites::SizeClass;

/// Color of the highlighted (selected) marker.
pub const SELECTED_COLOR: &str = "#0d6efd";

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertFilter {
    #[default]
    All,
    WithAlerts,
    WithoutAlerts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerFilter {
    /// `None` shows every grade, including sites not graded yet.
    pub quality: Option<Grade>,
    pub size: Option<SizeClass>,
    pub alerts: AlertFilter,
}

impl MarkerFilter {
    pub fn is_reset(&self) -> bool {
        *self == MarkerFilter::default()
    }

    fn admits(&self, marker: &Marker, alerts: &[Alert]) -> bool {
        if let Some(grade) = self.quality {
            if marker.grade() != Some(grade) {
                return false;
            }
        }
        if let Some(size) = self.size {
            if SizeClass::of(marker.site.area) != size {
                return false;
            }
        }
        let has_alerts = alerts.iter().any(|a| a.site_name == marker.site.name);
        match self.alerts {
            AlertFilter::All => true,
            AlertFilter::WithAlerts => has_alerts,
            AlertFilter::WithoutAlerts => !has_alerts,
        }
    }
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub site: MonitoredSite,
    pub assessment: Option<QualityAssessment>,
    pub visible: bool,
    pub selected: bool,
}

impl Marker {
    pub fn grade(&self) -> Option<Grade> {
        self.assessment.map(|a| a.grade)
    }

    pub fn color(&self) -> &'static str {
        if self.selected {
            SELECTED_COLOR
        } else {
            self.grade().map(Grade::color).unwrap_or(UNKNOWN_COLOR)
        }
    }
}

/// Everything the detail panel shows for the selected site.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    pub site_id: u32,
    pub name: String,
    pub area: f64,
    pub status: String,
    /// `None` until the site's sensor data has arrived.
    pub reading: Option<Reading>,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapStatistics {
    pub visible_markers: usize,
    pub active_alerts: usize,
    pub good: usize,
    pub poor: usize,
}

// ---------------------------------------------------------------------------
// Map view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MapView {
    markers: Vec<Marker>,
    filter: MarkerFilter,
    detail: Option<DetailPanel>,
}

impl MapView {
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, site_id: u32) -> Option<&Marker> {
        self.markers.iter().find(|m| m.site.id == site_id)
    }

    pub fn filter(&self) -> MarkerFilter {
        self.filter
    }

    pub fn detail(&self) -> Option<&DetailPanel> {
        self.detail.as_ref()
    }

    pub fn selected(&self) -> Option<u32> {
        self.detail.as_ref().map(|d| d.site_id)
    }

    /// Rebuilds the marker set from a fresh site list. Assessments and the
    /// selection carry over for sites that are still present; a selected
    /// site that disappeared clears the detail panel.
    pub fn load_sites(&mut self, sites: &[MonitoredSite], alerts: &[Alert]) {
        let selected = self.selected();
        let previous = std::mem::take(&mut self.markers);

        self.markers = sites
            .iter()
            .map(|site| Marker {
                site: site.clone(),
                assessment: previous
                    .iter()
                    .find(|m| m.site.id == site.id)
                    .and_then(|m| m.assessment),
                visible: true,
                selected: Some(site.id) == selected,
            })
            .collect();

        if let Some(id) = selected {
            if self.marker(id).is_none() {
                self.detail = None;
            }
        }
        self.apply_filter(self.filter, alerts);
    }

    /// Recolors a site's marker from a new reading. Returns false when the
    /// site has no marker.
    pub fn update_reading(&mut self, site_id: u32, reading: &Reading, alerts: &[Alert]) -> bool {
        let Some(marker) = self.markers.iter_mut().find(|m| m.site.id == site_id) else {
            return false;
        };
        marker.assessment = Some(assess_reading(reading));
        if let Some(detail) = self.detail.as_mut().filter(|d| d.site_id == site_id) {
            detail.reading = Some(reading.clone());
        }
        self.apply_filter(self.filter, alerts);
        true
    }

    /// Drops a site's assessment once it has no current reading, returning
    /// its marker to the unknown color.
    pub fn clear_reading(&mut self, site_id: u32, alerts: &[Alert]) -> bool {
        let Some(marker) = self.markers.iter_mut().find(|m| m.site.id == site_id) else {
            return false;
        };
        marker.assessment = None;
        if let Some(detail) = self.detail.as_mut().filter(|d| d.site_id == site_id) {
            detail.reading = None;
        }
        self.apply_filter(self.filter, alerts);
        true
    }

    pub fn apply_filter(&mut self, filter: MarkerFilter, alerts: &[Alert]) {
        self.filter = filter;
        for marker in &mut self.markers {
            marker.visible = filter.admits(marker, alerts);
        }
    }

    pub fn reset_filter(&mut self, alerts: &[Alert]) {
        self.apply_filter(MarkerFilter::default(), alerts);
    }

    /// Selects a site and rebuilds the detail panel for it. The reading is
    /// whatever is known so far; `show_detail` fills it in once fetched.
    pub fn select(&mut self, site_id: u32, alerts: &[Alert]) -> bool {
        let Some(site) = self.marker(site_id).map(|m| m.site.clone()) else {
            return false;
        };
        for marker in &mut self.markers {
            marker.selected = marker.site.id == site_id;
        }
        self.detail = Some(DetailPanel {
            site_id,
            name: site.name.clone(),
            area: site.area,
            status: site.status.clone(),
            reading: None,
            alerts: alerts_for_site(alerts, &site.name).into_iter().cloned().collect(),
        });
        true
    }

    /// Fills the detail panel with a fetched reading. Ignored unless
    /// `site_id` is the current selection.
    pub fn show_detail(&mut self, site_id: u32, reading: Option<Reading>) -> bool {
        match self.detail.as_mut() {
            Some(detail) if detail.site_id == site_id => {
                detail.reading = reading;
                true
            }
            _ => false,
        }
    }

    /// Re-matches the detail panel's alert sublist against a fresh alert
    /// list, always by the selected site's own name.
    pub fn refresh_detail_alerts(&mut self, alerts: &[Alert]) {
        if let Some(detail) = self.detail.as_mut() {
            detail.alerts = alerts_for_site(alerts, &detail.name).into_iter().cloned().collect();
        }
        self.apply_filter(self.filter, alerts);
    }

    pub fn statistics(&self, alerts: &[Alert]) -> MapStatistics {
        let visible: Vec<&Marker> = self.markers.iter().filter(|m| m.visible).collect();
        MapStatistics {
            visible_markers: visible.len(),
            active_alerts: alerts.len(),
            good: visible.iter().filter(|m| m.grade() == Some(Grade::Good)).count(),
            poor: visible.iter().filter(|m| m.grade() == Some(Grade::Poor)).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use crate::sites::reference_sites;

    fn alert(site: &str, message: &str) -> Alert {
        Alert {
            id: 1,
            site_name: site.to_string(),
            category: "pH Alert".to_string(),
            message: message.to_string(),
            severity: Severity::High,
            timestamp: "2024-05-01 12:00:00".to_string(),
        }
    }

    fn reading(ph: f64) -> Reading {
        Reading {
            ph: Some(ph),
            temperature: Some(25.0),
            dissolved_oxygen: Some(7.0),
            turbidity: Some(5.0),
            ..Reading::default()
        }
    }

    fn loaded_map() -> MapView {
        let mut map = MapView::default();
        map.load_sites(&reference_sites(), &[]);
        map
    }

    #[test]
    fn test_new_markers_are_visible_and_ungraded() {
        let map = loaded_map();
        assert_eq!(map.markers().len(), 8);
        assert!(map.markers().iter().all(|m| m.visible && m.grade().is_none()));
        assert_eq!(map.markers()[0].color(), UNKNOWN_COLOR);
    }

    #[test]
    fn test_reading_recolors_marker() {
        let mut map = loaded_map();
        assert!(map.update_reading(2, &reading(7.0), &[]));
        assert_eq!(map.marker(2).unwrap().color(), Grade::Good.color());
        assert!(map.update_reading(2, &reading(3.0), &[]));
        // pH fails its band: 5 + 25 + 25 + 25 = 80 is still Good.
        assert_eq!(map.marker(2).unwrap().grade(), Some(Grade::Good));
        assert!(!map.update_reading(42, &reading(7.0), &[]));
    }

    #[test]
    fn test_cleared_reading_returns_marker_to_unknown() {
        let mut map = loaded_map();
        map.update_reading(2, &reading(7.0), &[]);
        map.apply_filter(
            MarkerFilter {
                quality: Some(Grade::Good),
                ..MarkerFilter::default()
            },
            &[],
        );
        assert!(map.marker(2).unwrap().visible);

        assert!(map.clear_reading(2, &[]));
        let marker = map.marker(2).unwrap();
        assert_eq!(marker.grade(), None);
        assert_eq!(marker.color(), UNKNOWN_COLOR);
        assert!(!marker.visible);
        assert!(!map.clear_reading(42, &[]));
    }

    #[test]
    fn test_filter_then_reset_restores_all_markers() {
        let mut map = loaded_map();
        map.update_reading(1, &reading(7.0), &[]);
        map.apply_filter(
            MarkerFilter {
                quality: Some(Grade::Good),
                ..MarkerFilter::default()
            },
            &[],
        );
        assert_eq!(map.statistics(&[]).visible_markers, 1);
        assert_eq!(map.markers().len(), 8, "filtering must not delete markers");

        map.reset_filter(&[]);
        assert!(map.filter().is_reset());
        assert_eq!(map.statistics(&[]).visible_markers, 8);
        assert_eq!(map.marker(1).unwrap().grade(), Some(Grade::Good));
    }

    #[test]
    fn test_size_filter_uses_area_classes() {
        let mut map = loaded_map();
        map.apply_filter(
            MarkerFilter {
                size: Some(SizeClass::Large),
                ..MarkerFilter::default()
            },
            &[],
        );
        let visible: Vec<_> = map.markers().iter().filter(|m| m.visible).map(|m| m.site.name.as_str()).collect();
        assert_eq!(visible, vec!["Yamuna River", "Hauz Khas Lake"]);
    }

    #[test]
    fn test_alert_filter_matches_by_site_name() {
        let mut map = loaded_map();
        let alerts = vec![alert("Sanjay Lake", "pH level critical: 9.3")];
        map.apply_filter(
            MarkerFilter {
                alerts: AlertFilter::WithAlerts,
                ..MarkerFilter::default()
            },
            &alerts,
        );
        let visible: Vec<_> = map.markers().iter().filter(|m| m.visible).map(|m| m.site.id).collect();
        assert_eq!(visible, vec![3]);

        map.apply_filter(
            MarkerFilter {
                alerts: AlertFilter::WithoutAlerts,
                ..MarkerFilter::default()
            },
            &alerts,
        );
        assert_eq!(map.statistics(&alerts).visible_markers, 7);
    }

    #[test]
    fn test_selection_replaces_detail_and_alerts() {
        let mut map = loaded_map();
        let alerts = vec![
            alert("Hauz Khas Lake", "hauz khas alert"),
            alert("Neela Hauz Lake", "neela hauz alert"),
        ];

        assert!(map.select(2, &alerts));
        assert!(map.show_detail(2, Some(reading(7.0))));
        assert_eq!(map.detail().unwrap().alerts.len(), 1);

        assert!(map.select(5, &alerts));
        let detail = map.detail().unwrap();
        assert_eq!(detail.name, "Neela Hauz Lake");
        assert!(detail.reading.is_none(), "previous selection's reading must not carry over");
        assert_eq!(detail.alerts.len(), 1);
        assert_eq!(detail.alerts[0].message, "neela hauz alert");
        assert!(map.marker(5).unwrap().selected);
        assert!(!map.marker(2).unwrap().selected);
        assert_eq!(map.marker(5).unwrap().color(), SELECTED_COLOR);
    }

    #[test]
    fn test_late_detail_for_previous_selection_is_ignored() {
        let mut map = loaded_map();
        map.select(2, &[]);
        map.select(3, &[]);
        assert!(!map.show_detail(2, Some(reading(7.0))));
        assert!(map.detail().unwrap().reading.is_none());
    }

    #[test]
    fn test_reload_drops_detail_for_vanished_site() {
        let mut map = loaded_map();
        map.select(8, &[]);
        let fewer: Vec<_> = reference_sites().into_iter().take(4).collect();
        map.load_sites(&fewer, &[]);
        assert!(map.detail().is_none());
        assert_eq!(map.markers().len(), 4);
    }

    #[test]
    fn test_reload_keeps_assessments() {
        let mut map = loaded_map();
        map.update_reading(1, &reading(7.0), &[]);
        map.load_sites(&reference_sites(), &[]);
        assert_eq!(map.marker(1).unwrap().grade(), Some(Grade::Good));
    }
}
