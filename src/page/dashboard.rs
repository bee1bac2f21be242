//! Dashboard page: site list, summary counters, live sensor tiles for the
//! selected site, pH and temperature history, and the active alert list.

use chrono::{DateTime, Utc};

use super::{Command, Inbound, Loaded, Page, UiAction};
use crate::alert::timestamps::{format_relative_time, parse_timestamp};
use crate::logging::{self, Source};
use crate::model::{Parameter, Reading, SensorSnapshot};
use crate::push::PushEvent;
use crate::quality::{assess_reading, Grade};
use crate::session::{PageSession, ViewSettings, CONNECTION_STATUS};
use crate::view::chart::{Chart, ChartConfig, SeriesConfig};
use crate::view::table::{alert_rows, site_rows, MISSING};

pub const TOTAL_BODIES: &str = "total-bodies";
pub const GOOD_QUALITY: &str = "good-quality";
pub const ACTIVE_ALERTS: &str = "active-alerts";
pub const LAST_UPDATED: &str = "last-updated";
pub const SELECTED_WATER_BODY: &str = "selected-water-body";
pub const SENSOR_DATA: &str = "sensor-data";
pub const WATER_BODIES_LIST: &str = "water-bodies-list";
pub const ALERTS_CONTAINER: &str = "alerts-container";

/// Sensor tiles: element id, parameter, decimals shown.
pub const SENSOR_TILES: [(&str, Parameter, usize); 6] = [
    ("ph-value", Parameter::Ph, 2),
    ("temperature-value", Parameter::Temperature, 1),
    ("oxygen-value", Parameter::DissolvedOxygen, 2),
    ("turbidity-value", Parameter::Turbidity, 1),
    ("conductivity-value", Parameter::Conductivity, 0),
    ("tds-value", Parameter::TotalDissolvedSolids, 0),
];

/// Hours covered by the history charts; labels count down from here.
const HISTORY_HOURS: i64 = 24;
/// The dashboard clears its notifications sooner than the other pages.
const TOAST_SECS: i64 = 3;

pub const LAYOUT: &[&str] = &[
    CONNECTION_STATUS,
    TOTAL_BODIES,
    GOOD_QUALITY,
    ACTIVE_ALERTS,
    WATER_BODIES_LIST,
    SELECTED_WATER_BODY,
    SENSOR_DATA,
    "ph-value",
    "temperature-value",
    "oxygen-value",
    "turbidity-value",
    "conductivity-value",
    "tds-value",
    LAST_UPDATED,
    ALERTS_CONTAINER,
];

pub struct DashboardPage {
    session: PageSession,
    ph_chart: Chart,
    temperature_chart: Chart,
}

impl DashboardPage {
    pub fn new(settings: ViewSettings) -> Self {
        Self::with_layout(LAYOUT, settings)
    }

    /// A dashboard drawing into a custom (possibly partial) layout.
    pub fn with_layout(layout: &[&str], settings: ViewSettings) -> Self {
        let window = settings.history_window;
        Self {
            ph_chart: Chart::new(
                ChartConfig::line("phChart", "pH Level", window)
                    .with_series(SeriesConfig::new(Parameter::Ph.label(), "#667eea").filled()),
            ),
            temperature_chart: Chart::new(
                ChartConfig::line("temperatureChart", "Temperature", window)
                    .with_series(SeriesConfig::new(Parameter::Temperature.label(), "#f59e0b").filled()),
            ),
            session: PageSession::new(
                layout,
                settings.with_default_toast_ttl(chrono::Duration::seconds(TOAST_SECS)),
            ),
        }
    }

    pub fn ph_chart(&self) -> &Chart {
        &self.ph_chart
    }

    pub fn temperature_chart(&self) -> &Chart {
        &self.temperature_chart
    }

    fn reload(&self) -> Vec<Command> {
        let mut commands = vec![Command::FetchSites, Command::FetchAlerts];
        commands.extend(self.session.selected.map(Command::FetchSensor));
        commands
    }

    fn redraw_site_list(&mut self) {
        let s = &mut self.session;
        let rows = site_rows(&s.sites, &s.latest, s.selected);
        s.doc.set_items(WATER_BODIES_LIST, rows.iter().map(|r| r.render()).collect());
    }

    fn redraw_summary(&mut self, now: DateTime<Utc>) {
        let s = &mut self.session;
        let tween = s.settings.tween;
        let good = s
            .sites
            .iter()
            .filter_map(|site| s.latest.get(&site.id))
            .filter(|r| assess_reading(r).grade == Grade::Good)
            .count();
        s.doc.animate_number(TOTAL_BODIES, s.sites.len() as f64, 0, now, tween);
        s.doc.animate_number(GOOD_QUALITY, good as f64, 0, now, tween);
    }

    fn show_placeholder(&mut self) {
        let doc = &mut self.session.doc;
        doc.set_text(SELECTED_WATER_BODY, "Select a water body to view sensor data");
        doc.set_visible(SELECTED_WATER_BODY, true);
        doc.set_visible(SENSOR_DATA, false);
        self.ph_chart.clear();
        self.temperature_chart.clear();
    }

    /// Blanks the tiles and history charts while keeping the sensor panel
    /// where it is, so nothing from a previous selection lingers.
    fn clear_sensor_panel(&mut self) {
        for (id, _, _) in SENSOR_TILES {
            self.session.doc.set_text(id, MISSING);
        }
        self.session.doc.set_text(LAST_UPDATED, MISSING);
        self.ph_chart.clear();
        self.temperature_chart.clear();
    }

    fn redraw_tiles(&mut self, reading: &Reading, now: DateTime<Utc>) {
        let s = &mut self.session;
        let tween = s.settings.tween;
        for (id, parameter, decimals) in SENSOR_TILES {
            match reading.value(parameter) {
                Some(value) => s.doc.animate_number(id, value, decimals, now, tween),
                None => s.doc.set_text(id, MISSING),
            }
        }
    }

    fn redraw_history(&mut self, snapshot: &SensorSnapshot) {
        // Labels count down from the newest row, which is `historical[0]`.
        let newest = snapshot.historical.len() as i64 - 1;
        let points: Vec<(String, &Reading)> = snapshot
            .chronological()
            .zip((0..=newest).rev())
            .map(|(r, age)| (format!("{}h", HISTORY_HOURS - age), r))
            .collect();

        self.ph_chart
            .replace(points.iter().map(|(label, r)| (label.clone(), vec![r.ph])));
        self.temperature_chart
            .replace(points.iter().map(|(label, r)| (label.clone(), vec![r.temperature])));
    }

    fn show_sensor_data(&mut self, site_id: u32, snapshot: &SensorSnapshot, now: DateTime<Utc>) {
        match snapshot.current_reading() {
            Some(current) => {
                let current = current.clone();
                self.redraw_tiles(&current, now);
                let updated = current
                    .timestamp
                    .as_deref()
                    .map(|t| format_relative_time(t, now))
                    .unwrap_or_else(|| MISSING.to_string());
                self.session.doc.set_text(LAST_UPDATED, updated);
            }
            None => self.clear_sensor_panel(),
        }
        self.redraw_history(snapshot);

        let doc = &mut self.session.doc;
        doc.set_visible(SELECTED_WATER_BODY, false);
        doc.set_visible(SENSOR_DATA, true);
        logging::debug(Source::View, Some(site_id), "Sensor panel redrawn");
    }

    fn on_loaded(&mut self, loaded: Loaded, now: DateTime<Utc>) -> Vec<Command> {
        match loaded {
            Loaded::Sites(Ok(sites)) => {
                let had_selection = self.session.selected.is_some();
                self.session.store_sites(sites);
                if had_selection && self.session.selected.is_none() {
                    self.show_placeholder();
                }
                self.redraw_site_list();
                self.redraw_summary(now);
            }
            Loaded::Sites(Err(e)) => self.session.fetch_failed("water bodies", None, &e, now),
            Loaded::Alerts(Ok(alerts)) => {
                let s = &mut self.session;
                let rows = alert_rows(&alerts, now);
                s.doc.set_items(ALERTS_CONTAINER, rows.iter().map(|r| r.render()).collect());
                s.doc.animate_number(ACTIVE_ALERTS, alerts.len() as f64, 0, now, s.settings.tween);
                s.alerts = alerts;
            }
            Loaded::Alerts(Err(e)) => self.session.fetch_failed("alerts", None, &e, now),
            Loaded::Sensor { site_id, result: Ok(snapshot) } => {
                self.session.store_snapshot(site_id, snapshot.clone());
                if self.session.selected == Some(site_id) {
                    self.show_sensor_data(site_id, &snapshot, now);
                }
                self.redraw_site_list();
                self.redraw_summary(now);
            }
            Loaded::Sensor { site_id, result: Err(e) } => {
                self.session.fetch_failed("sensor data", Some(site_id), &e, now)
            }
            Loaded::Analytics(_) => {}
        }
        Vec::new()
    }

    fn on_push(&mut self, event: PushEvent, now: DateTime<Utc>) {
        match event {
            PushEvent::Connected => self.session.set_connection(true),
            PushEvent::Disconnected => self.session.set_connection(false),
            PushEvent::Reading(update) => {
                let Some(site_id) = update.site_id() else { return };
                let reading = update.reading;
                self.session.record_reading(site_id, reading.clone());
                self.redraw_site_list();
                self.redraw_summary(now);

                if self.session.selected != Some(site_id) {
                    return;
                }
                self.redraw_tiles(&reading, now);
                self.session.doc.set_text(LAST_UPDATED, "Just now");

                let label = reading
                    .timestamp
                    .as_deref()
                    .and_then(parse_timestamp)
                    .unwrap_or(now)
                    .format("%H:%M")
                    .to_string();
                self.ph_chart.append(label.clone(), &[reading.ph]);
                self.temperature_chart.append(label, &[reading.temperature]);
            }
        }
    }

    fn on_ui(&mut self, action: UiAction) -> Vec<Command> {
        match action {
            UiAction::SelectSite(site_id) => {
                let Some(name) = self.session.site(site_id).map(|s| s.name.clone()) else {
                    logging::warn(Source::Page, Some(site_id), "Selected site is not in the site list");
                    return Vec::new();
                };
                if self.session.selected != Some(site_id) {
                    self.clear_sensor_panel();
                }
                self.session.selected = Some(site_id);
                self.session.doc.set_text(SELECTED_WATER_BODY, name);
                self.redraw_site_list();
                vec![Command::FetchSensor(site_id)]
            }
            UiAction::Refresh => self.reload(),
            other => {
                logging::debug(Source::Page, None, &format!("Dashboard ignores {:?}", other));
                Vec::new()
            }
        }
    }
}

impl Page for DashboardPage {
    fn name(&self) -> &'static str {
        "dashboard"
    }

    fn session(&self) -> &PageSession {
        &self.session
    }

    fn start(&mut self, _now: DateTime<Utc>) -> Vec<Command> {
        self.session.doc.set_text(CONNECTION_STATUS, "Connecting...");
        self.session.doc.set_text(LAST_UPDATED, MISSING);
        self.show_placeholder();
        vec![Command::FetchSites, Command::FetchAlerts]
    }

    fn handle(&mut self, inbound: Inbound, now: DateTime<Utc>) -> Vec<Command> {
        self.session.doc.settle(now);
        match inbound {
            Inbound::Push(event) => {
                self.on_push(event, now);
                Vec::new()
            }
            Inbound::Ui(action) => self.on_ui(action),
            Inbound::Loaded(loaded) => self.on_loaded(loaded, now),
            Inbound::Tick => self.reload(),
            Inbound::Timer(_) => Vec::new(),
        }
    }

    fn extra_lines(&self) -> Vec<String> {
        let mut lines = self.ph_chart.render_lines();
        lines.extend(self.temperature_chart.render_lines());
        lines
    }
}
