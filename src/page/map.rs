//! Map page: one marker per site, marker filters, map statistics and the
//! detail panel of the selected site.

use chrono::{DateTime, Utc};

use super::{Command, Inbound, Loaded, Page, UiAction};
use crate::logging::{self, Source};
use crate::model::Reading;
use crate::push::PushEvent;
use crate::session::{PageSession, ViewSettings, CONNECTION_STATUS};
use crate::view::map::{MapView, MarkerFilter};
use crate::view::table::MISSING;

pub const TOTAL_MARKERS: &str = "total-markers";
pub const ACTIVE_ALERTS: &str = "active-alerts";
pub const GOOD_QUALITY_COUNT: &str = "good-quality-count";
pub const POOR_QUALITY_COUNT: &str = "poor-quality-count";
pub const WATER_BODY_INFO: &str = "water-body-info";
pub const DETAILS: &str = "selected-water-body-details";
pub const SELECTED_NAME: &str = "selected-name";
pub const SELECTED_AREA: &str = "selected-area";
pub const SELECTED_STATUS: &str = "selected-status";
pub const SELECTED_PH: &str = "selected-ph";
pub const SELECTED_TEMPERATURE: &str = "selected-temperature";
pub const SELECTED_OXYGEN: &str = "selected-oxygen";
pub const SELECTED_TURBIDITY: &str = "selected-turbidity";
pub const SELECTED_ALERTS: &str = "selected-alerts";
pub const REFRESH_MAP: &str = "refresh-map";
pub const WATER_BODY_FILTER: &str = "water-body-filter";
pub const MAP_MARKERS: &str = "map";

const REFRESH_LABEL: &str = "Refresh";

pub const LAYOUT: &[&str] = &[
    CONNECTION_STATUS,
    MAP_MARKERS,
    TOTAL_MARKERS,
    ACTIVE_ALERTS,
    GOOD_QUALITY_COUNT,
    POOR_QUALITY_COUNT,
    REFRESH_MAP,
    WATER_BODY_FILTER,
    WATER_BODY_INFO,
    DETAILS,
    SELECTED_NAME,
    SELECTED_AREA,
    SELECTED_STATUS,
    SELECTED_PH,
    SELECTED_TEMPERATURE,
    SELECTED_OXYGEN,
    SELECTED_TURBIDITY,
    SELECTED_ALERTS,
];

pub struct MapPage {
    session: PageSession,
    map: MapView,
    /// Set while a user-triggered refresh waits for the site list.
    refreshing: bool,
}

impl MapPage {
    pub fn new(settings: ViewSettings) -> Self {
        Self::with_layout(LAYOUT, settings)
    }

    pub fn with_layout(layout: &[&str], settings: ViewSettings) -> Self {
        Self {
            session: PageSession::new(layout, settings),
            map: MapView::default(),
            refreshing: false,
        }
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    fn redraw_markers(&mut self) {
        let items = self
            .map
            .markers()
            .iter()
            .filter(|m| m.visible)
            .map(|m| {
                format!(
                    "{}{} {} ({:.4}, {:.4}) {} {}",
                    if m.selected { "*" } else { "" },
                    m.site.id,
                    m.site.name,
                    m.site.latitude,
                    m.site.longitude,
                    m.color(),
                    m.grade().map(|g| g.label()).unwrap_or("Unknown"),
                )
            })
            .collect();
        self.session.doc.set_items(MAP_MARKERS, items);
    }

    fn redraw_statistics(&mut self) {
        let stats = self.map.statistics(&self.session.alerts);
        let doc = &mut self.session.doc;
        doc.set_text(TOTAL_MARKERS, stats.visible_markers.to_string());
        doc.set_text(ACTIVE_ALERTS, stats.active_alerts.to_string());
        doc.set_text(GOOD_QUALITY_COUNT, stats.good.to_string());
        doc.set_text(POOR_QUALITY_COUNT, stats.poor.to_string());
    }

    /// Rewrites the whole detail panel from the current selection.
    fn redraw_detail(&mut self) {
        let doc = &mut self.session.doc;
        let Some(detail) = self.map.detail() else {
            doc.set_visible(WATER_BODY_INFO, true);
            doc.set_visible(DETAILS, false);
            return;
        };

        doc.set_visible(WATER_BODY_INFO, false);
        doc.set_visible(DETAILS, true);
        doc.set_text(SELECTED_NAME, detail.name.clone());
        doc.set_text(SELECTED_AREA, format!("{} sq km", detail.area));
        doc.set_text(SELECTED_STATUS, capitalize(&detail.status));

        let value = |f: fn(&Reading) -> Option<f64>| {
            detail
                .reading
                .as_ref()
                .and_then(f)
                .map(|v| v.to_string())
                .unwrap_or_else(|| MISSING.to_string())
        };
        doc.set_text(SELECTED_PH, value(|r| r.ph));
        doc.set_text(SELECTED_TEMPERATURE, value(|r| r.temperature));
        doc.set_text(SELECTED_OXYGEN, value(|r| r.dissolved_oxygen));
        doc.set_text(SELECTED_TURBIDITY, value(|r| r.turbidity));

        if detail.alerts.is_empty() {
            doc.set_text(SELECTED_ALERTS, "No Active Alerts");
            doc.set_items(SELECTED_ALERTS, Vec::new());
        } else {
            doc.set_text(SELECTED_ALERTS, "Active Alerts");
            doc.set_items(
                SELECTED_ALERTS,
                detail
                    .alerts
                    .iter()
                    .map(|a| format!("[{}] {}", a.severity.as_str(), a.message))
                    .collect(),
            );
        }
    }

    fn redraw(&mut self) {
        self.redraw_markers();
        self.redraw_statistics();
        self.redraw_detail();
    }

    fn finish_refresh(&mut self, now: DateTime<Utc>, succeeded: bool) {
        if !self.refreshing {
            return;
        }
        self.refreshing = false;
        self.session.doc.set_disabled(REFRESH_MAP, false);
        self.session.doc.set_text(REFRESH_MAP, REFRESH_LABEL);
        if succeeded {
            self.session.notifier.success("Map data refreshed successfully", now);
        }
    }

    fn set_filter(&mut self, filter: MarkerFilter) {
        self.map.apply_filter(filter, &self.session.alerts);
        self.redraw();
    }

    fn on_loaded(&mut self, loaded: Loaded, now: DateTime<Utc>) -> Vec<Command> {
        match loaded {
            Loaded::Sites(Ok(sites)) => {
                self.session.store_sites(sites);
                self.map.load_sites(&self.session.sites, &self.session.alerts);
                for (site_id, reading) in &self.session.latest {
                    self.map.update_reading(*site_id, reading, &self.session.alerts);
                }
                self.session.populate_site_filter(WATER_BODY_FILTER);
                self.redraw();
                self.finish_refresh(now, true);
                // Marker colors come from each site's latest reading.
                return self.session.sites.iter().map(|s| Command::FetchSensor(s.id)).collect();
            }
            Loaded::Sites(Err(e)) => {
                self.session.fetch_failed("water bodies", None, &e, now);
                self.finish_refresh(now, false);
            }
            Loaded::Alerts(Ok(alerts)) => {
                self.session.alerts = alerts;
                self.map.refresh_detail_alerts(&self.session.alerts);
                self.redraw();
            }
            Loaded::Alerts(Err(e)) => self.session.fetch_failed("alerts", None, &e, now),
            Loaded::Sensor { site_id, result: Ok(snapshot) } => {
                let current = snapshot.current_reading().cloned();
                self.session.store_snapshot(site_id, snapshot);
                match &current {
                    Some(reading) => self.map.update_reading(site_id, reading, &self.session.alerts),
                    None => self.map.clear_reading(site_id, &self.session.alerts),
                };
                // Ignored unless this site is still the selection.
                self.map.show_detail(site_id, current);
                self.redraw();
            }
            Loaded::Sensor { site_id, result: Err(e) } => {
                self.session.fetch_failed("sensor data", Some(site_id), &e, now)
            }
            Loaded::Analytics(_) => {}
        }
        Vec::new()
    }

    fn on_push(&mut self, event: PushEvent) {
        match event {
            PushEvent::Connected => self.session.set_connection(true),
            PushEvent::Disconnected => self.session.set_connection(false),
            PushEvent::Reading(update) => {
                let Some(site_id) = update.site_id() else { return };
                self.session.record_reading(site_id, update.reading.clone());
                if self.map.update_reading(site_id, &update.reading, &self.session.alerts) {
                    self.redraw();
                }
            }
        }
    }

    fn on_ui(&mut self, action: UiAction) -> Vec<Command> {
        match action {
            UiAction::SelectSite(site_id) => {
                if !self.map.select(site_id, &self.session.alerts) {
                    logging::warn(Source::Page, Some(site_id), "No marker for selected site");
                    return Vec::new();
                }
                self.session.selected = Some(site_id);
                let cached = self.session.latest.get(&site_id).cloned();
                self.map.show_detail(site_id, cached);
                self.redraw();
                vec![Command::FetchSensor(site_id), Command::FetchAlerts]
            }
            UiAction::QualityFilter(quality) => {
                let filter = MarkerFilter { quality, ..self.map.filter() };
                self.set_filter(filter);
                Vec::new()
            }
            UiAction::SizeFilter(size) => {
                let filter = MarkerFilter { size, ..self.map.filter() };
                self.set_filter(filter);
                Vec::new()
            }
            UiAction::AlertFilter(alerts) => {
                let filter = MarkerFilter { alerts, ..self.map.filter() };
                self.set_filter(filter);
                Vec::new()
            }
            UiAction::Refresh => {
                if self.refreshing {
                    return Vec::new();
                }
                self.refreshing = true;
                self.session.doc.set_disabled(REFRESH_MAP, true);
                self.session.doc.set_text(REFRESH_MAP, "Refreshing...");
                vec![Command::FetchSites, Command::FetchAlerts]
            }
            other => {
                logging::debug(Source::Page, None, &format!("Map ignores {:?}", other));
                Vec::new()
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Page for MapPage {
    fn name(&self) -> &'static str {
        "map"
    }

    fn session(&self) -> &PageSession {
        &self.session
    }

    fn start(&mut self, _now: DateTime<Utc>) -> Vec<Command> {
        self.session.doc.set_text(CONNECTION_STATUS, "Connecting...");
        self.session.doc.set_text(REFRESH_MAP, REFRESH_LABEL);
        self.session
            .doc
            .set_text(WATER_BODY_INFO, "Click on a water body marker to view details");
        self.redraw();
        vec![Command::FetchSites, Command::FetchAlerts]
    }

    fn handle(&mut self, inbound: Inbound, now: DateTime<Utc>) -> Vec<Command> {
        match inbound {
            Inbound::Push(event) => {
                self.on_push(event);
                Vec::new()
            }
            Inbound::Ui(action) => self.on_ui(action),
            Inbound::Loaded(loaded) => self.on_loaded(loaded, now),
            Inbound::Tick => vec![Command::FetchSites, Command::FetchAlerts],
            Inbound::Timer(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("active"), "Active");
        assert_eq!(capitalize(""), "");
    }
}
