//! Per-page state.
//!
//! A `PageSession` owns everything one page instance has loaded so far
//! and the surface it draws into. Nothing here is global, so several pages
//! (or several test cases) can run side by side.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::DashboardConfig;
use crate::logging::{self, Source};
use crate::model::{Alert, AnalyticsSummary, FetchFailure, MonitoredSite, Reading, SensorSnapshot};
use crate::sites::find_site;
use crate::view::document::Document;
use crate::view::notify::Notifier;

pub const CONNECTION_STATUS: &str = "connection-status";

/// Notification lifetime for pages that do not pick their own.
pub const DEFAULT_TOAST_SECS: i64 = 5;

/// Display settings derived from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub live_window: usize,
    pub history_window: usize,
    pub tween: Duration,
    /// `None` until configured or chosen by the page.
    pub toast_ttl: Option<Duration>,
    pub report_delay: std::time::Duration,
    pub download_link: std::time::Duration,
}

impl ViewSettings {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            live_window: config.live_window,
            history_window: config.history_window,
            tween: Duration::milliseconds(config.tween_ms as i64),
            toast_ttl: config.toast_secs.map(|secs| Duration::seconds(secs as i64)),
            report_delay: config.report_delay(),
            download_link: config.download_link_duration(),
        }
    }

    /// Uses `ttl` for notifications unless the configuration set one.
    pub fn with_default_toast_ttl(mut self, ttl: Duration) -> Self {
        self.toast_ttl.get_or_insert(ttl);
        self
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct PageSession {
    pub doc: Document,
    pub notifier: Notifier,
    pub settings: ViewSettings,
    pub sites: Vec<MonitoredSite>,
    /// Latest known reading per site, from fetches and pushes alike.
    pub latest: BTreeMap<u32, Reading>,
    /// Last fetched snapshot per site, kept current by pushes.
    pub snapshots: BTreeMap<u32, SensorSnapshot>,
    pub alerts: Vec<Alert>,
    pub analytics: Option<AnalyticsSummary>,
    pub selected: Option<u32>,
    pub connected: bool,
}

impl PageSession {
    pub fn new(layout: &[&str], settings: ViewSettings) -> Self {
        Self {
            doc: Document::with_layout(layout),
            notifier: Notifier::new(settings.toast_ttl.unwrap_or(Duration::seconds(DEFAULT_TOAST_SECS))),
            settings,
            sites: Vec::new(),
            latest: BTreeMap::new(),
            snapshots: BTreeMap::new(),
            alerts: Vec::new(),
            analytics: None,
            selected: None,
            connected: false,
        }
    }

    pub fn site(&self, site_id: u32) -> Option<&MonitoredSite> {
        find_site(&self.sites, site_id)
    }

    /// Logs a failed fetch and raises its one notification. Loaded data is
    /// left as it was.
    pub fn fetch_failed(&mut self, what: &str, site_id: Option<u32>, failure: &FetchFailure, now: DateTime<Utc>) {
        logging::log_fetch_failure(site_id, &format!("Loading {}", what), failure);
        self.notifier.error(format!("Error loading {}", what), now);
    }

    pub fn set_connection(&mut self, connected: bool) {
        self.connected = connected;
        let (text, class) = if connected {
            ("Connected", "connected")
        } else {
            ("Disconnected", "disconnected")
        };
        self.doc.set_text(CONNECTION_STATUS, text);
        self.doc.set_class(CONNECTION_STATUS, Some(class));
        logging::info(Source::Push, None, text);
    }

    /// Replaces the site list. Cached readings of sites that disappeared are
    /// dropped, and so is a selection pointing at one.
    pub fn store_sites(&mut self, sites: Vec<MonitoredSite>) {
        self.latest.retain(|id, _| sites.iter().any(|s| s.id == *id));
        self.snapshots.retain(|id, _| sites.iter().any(|s| s.id == *id));
        if let Some(id) = self.selected {
            if !sites.iter().any(|s| s.id == id) {
                self.selected = None;
            }
        }
        self.sites = sites;
    }

    pub fn store_snapshot(&mut self, site_id: u32, snapshot: SensorSnapshot) {
        match snapshot.current_reading() {
            Some(current) => {
                self.latest.insert(site_id, current.clone());
            }
            None => {
                self.latest.remove(&site_id);
            }
        }
        self.snapshots.insert(site_id, snapshot);
    }

    /// Records a pushed reading as the site's latest and prepends it to the
    /// site's history, which stays bounded by the history window.
    pub fn record_reading(&mut self, site_id: u32, reading: Reading) {
        let window = self.settings.history_window;
        let snapshot = self.snapshots.entry(site_id).or_default();
        snapshot.current = reading.clone();
        snapshot.historical.insert(0, reading.clone());
        snapshot.historical.truncate(window);
        self.latest.insert(site_id, reading);
    }

    /// Fills an option list with "all" followed by every site.
    pub fn populate_site_filter(&mut self, id: &str) {
        let mut options = vec!["all: All Water Bodies".to_string()];
        options.extend(self.sites.iter().map(|s| format!("{}: {}", s.id, s.name)));
        self.doc.set_items(id, options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::reference_sites;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn session() -> PageSession {
        PageSession::new(&[CONNECTION_STATUS, "water-body-filter"], ViewSettings::default())
    }

    #[test]
    fn test_fetch_failure_raises_one_toast() {
        let mut s = session();
        s.fetch_failed("alerts", None, &FetchFailure::Http(500), now());
        let toasts: Vec<_> = s.notifier.visible(now()).collect();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "Error loading alerts");
    }

    #[test]
    fn test_toast_lifetime_prefers_configured_value() {
        let ttl = |settings: ViewSettings| {
            let mut s = PageSession::new(&[], settings);
            s.notifier.error("down", now());
            let gone = (4..=8).find(|secs| s.notifier.visible(now() + Duration::seconds(*secs)).next().is_none());
            gone
        };
        assert_eq!(ttl(ViewSettings::default()), Some(DEFAULT_TOAST_SECS));
        assert_eq!(ttl(ViewSettings::default().with_default_toast_ttl(Duration::seconds(3))), Some(4));

        let config = DashboardConfig {
            toast_secs: Some(7),
            ..DashboardConfig::default()
        };
        let configured = ViewSettings::from_config(&config).with_default_toast_ttl(Duration::seconds(3));
        assert_eq!(ttl(configured), Some(7));
    }

    #[test]
    fn test_connection_status_element() {
        let mut s = session();
        s.set_connection(true);
        assert_eq!(s.doc.get(CONNECTION_STATUS).unwrap().text, "Connected");
        s.set_connection(false);
        assert_eq!(s.doc.get(CONNECTION_STATUS).unwrap().class.as_deref(), Some("disconnected"));
    }

    #[test]
    fn test_pushed_readings_keep_history_bounded() {
        let mut s = session();
        for i in 0..40 {
            s.record_reading(1, Reading { ph: Some(i as f64), ..Reading::default() });
        }
        let snapshot = &s.snapshots[&1];
        assert_eq!(snapshot.historical.len(), 24);
        assert_eq!(snapshot.historical[0].ph, Some(39.0));
        assert_eq!(s.latest[&1].ph, Some(39.0));
    }

    #[test]
    fn test_empty_snapshot_clears_latest() {
        let mut s = session();
        s.record_reading(2, Reading { ph: Some(7.0), ..Reading::default() });
        s.store_snapshot(2, SensorSnapshot::default());
        assert!(!s.latest.contains_key(&2));
    }

    #[test]
    fn test_store_sites_drops_vanished_selection() {
        let mut s = session();
        s.store_sites(reference_sites());
        s.selected = Some(8);
        s.record_reading(8, Reading::default());
        s.store_sites(reference_sites().into_iter().take(3).collect());
        assert_eq!(s.selected, None);
        assert!(s.latest.is_empty());
    }

    #[test]
    fn test_site_filter_options() {
        let mut s = session();
        s.store_sites(reference_sites().into_iter().take(2).collect());
        s.populate_site_filter("water-body-filter");
        assert_eq!(
            s.doc.get("water-body-filter").unwrap().items,
            vec!["all: All Water Bodies", "1: Yamuna River", "2: Hauz Khas Lake"]
        );
    }
}
