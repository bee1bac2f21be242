//! Shared fixtures for page integration tests: a scripted backend and a
//! harness that drives a page the way the runtime loop does, minus the
//! clock and the threads.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use aquamon_dashboard::ingest::WaterApi;
use aquamon_dashboard::model::{
    Alert, AnalyticsSummary, FetchFailure, MonitoredSite, QualityDistribution, Reading, SensorSnapshot, Severity,
};
use aquamon_dashboard::page::runtime::perform;
use aquamon_dashboard::page::{Command, Inbound, Page, Timer, UiAction};
use aquamon_dashboard::push::{PushEvent, SensorUpdate};
use aquamon_dashboard::sites::reference_sites;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn reading(site_id: u32, ph: f64, temperature: f64, oxygen: f64, turbidity: f64) -> Reading {
    Reading {
        site_id: Some(site_id),
        timestamp: Some("2024-05-01 11:58:00".to_string()),
        ph: Some(ph),
        temperature: Some(temperature),
        dissolved_oxygen: Some(oxygen),
        turbidity: Some(turbidity),
        conductivity: Some(850.0),
        total_dissolved_solids: Some(510.0),
    }
}

/// Scores 100.
pub fn good_reading(site_id: u32) -> Reading {
    reading(site_id, 7.2, 25.0, 8.0, 5.0)
}

/// Scores 20.
pub fn poor_reading(site_id: u32) -> Reading {
    reading(site_id, 9.5, 36.0, 3.0, 60.0)
}

/// A snapshot whose history holds `hours` readings, newest first, with pH
/// stepping down from 8.0 by 0.01 per hour.
pub fn snapshot(current: Reading, hours: usize) -> SensorSnapshot {
    let historical = (0..hours)
        .map(|i| Reading {
            ph: Some(8.0 - i as f64 * 0.01),
            conductivity: None,
            total_dissolved_solids: None,
            ..current.clone()
        })
        .collect();
    SensorSnapshot { current, historical }
}

pub fn alert(id: u32, site_name: &str, category: &str, severity: Severity) -> Alert {
    Alert {
        id,
        site_name: site_name.to_string(),
        category: category.to_string(),
        message: format!("{} triggered", category),
        severity,
        timestamp: "2024-05-01 11:30:00".to_string(),
    }
}

pub fn pushed(reading: Reading) -> Inbound {
    Inbound::Push(PushEvent::Reading(SensorUpdate {
        name: String::new(),
        reading,
        alerts: Vec::new(),
    }))
}

// ---------------------------------------------------------------------------
// Scripted backend
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Script {
    pub sites: Vec<MonitoredSite>,
    pub sensor: BTreeMap<u32, SensorSnapshot>,
    pub alerts: Vec<Alert>,
    pub analytics: AnalyticsSummary,
    pub fail_sites: bool,
    pub fail_sensor: bool,
    pub fail_alerts: bool,
    pub fail_analytics: bool,
    /// Every request, in order: "sites", "sensor/<id>", "alerts", "analytics".
    pub calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeApi {
    pub script: Mutex<Script>,
}

impl FakeApi {
    /// Reference sites, no readings, no alerts.
    pub fn with_reference_sites() -> Arc<FakeApi> {
        let api = FakeApi::default();
        api.edit(|s| {
            s.sites = reference_sites();
            s.analytics = AnalyticsSummary {
                total_bodies: 8,
                avg_ph: 7.25,
                avg_temperature: 26.5,
                avg_oxygen: 7.5,
                avg_turbidity: 14.0,
                quality_distribution: QualityDistribution { good: 5, fair: 2, poor: 1 },
            };
        });
        Arc::new(api)
    }

    pub fn edit(&self, f: impl FnOnce(&mut Script)) {
        let mut script = self.script.lock().unwrap();
        f(&mut script);
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.script.lock().unwrap().calls.clear();
    }
}

const DOWN: FetchFailure = FetchFailure::Http(500);

#[async_trait]
impl WaterApi for FakeApi {
    async fn list_sites(&self) -> Result<Vec<MonitoredSite>, FetchFailure> {
        let mut s = self.script.lock().unwrap();
        s.calls.push("sites".to_string());
        if s.fail_sites { Err(DOWN) } else { Ok(s.sites.clone()) }
    }

    async fn sensor_data(&self, site_id: u32) -> Result<SensorSnapshot, FetchFailure> {
        let mut s = self.script.lock().unwrap();
        s.calls.push(format!("sensor/{}", site_id));
        if s.fail_sensor {
            return Err(DOWN);
        }
        Ok(s.sensor.get(&site_id).cloned().unwrap_or_default())
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>, FetchFailure> {
        let mut s = self.script.lock().unwrap();
        s.calls.push("alerts".to_string());
        if s.fail_alerts { Err(DOWN) } else { Ok(s.alerts.clone()) }
    }

    async fn analytics(&self) -> Result<AnalyticsSummary, FetchFailure> {
        let mut s = self.script.lock().unwrap();
        s.calls.push("analytics".to_string());
        if s.fail_analytics { Err(DOWN) } else { Ok(s.analytics.clone()) }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness<P: Page> {
    pub page: P,
    pub api: Arc<FakeApi>,
    pub now: DateTime<Utc>,
    /// Timer commands the page asked for and nobody has fired yet.
    pub timers: Vec<(Duration, Timer)>,
}

impl<P: Page> Harness<P> {
    pub fn new(page: P, api: Arc<FakeApi>) -> Self {
        Self {
            page,
            api,
            now: start_time(),
            timers: Vec::new(),
        }
    }

    /// Runs the initial load to completion.
    pub async fn start(&mut self) {
        let commands = self.page.start(self.now);
        self.run(commands).await;
    }

    /// Delivers one message and every fetch it leads to.
    pub async fn send(&mut self, inbound: Inbound) {
        let commands = self.page.handle(inbound, self.now);
        self.run(commands).await;
    }

    pub async fn ui(&mut self, action: UiAction) {
        self.send(Inbound::Ui(action)).await;
    }

    /// Moves the clock forward and fires the oldest pending timer.
    pub async fn fire_timer(&mut self) -> Timer {
        assert!(!self.timers.is_empty(), "no pending timer");
        let (delay, timer) = self.timers.remove(0);
        self.now += chrono::Duration::from_std(delay).unwrap();
        self.send(Inbound::Timer(timer)).await;
        timer
    }

    pub fn advance(&mut self, by: chrono::Duration) {
        self.now += by;
    }

    /// Text of an element once every animation has finished.
    pub fn text(&self, id: &str) -> String {
        self.page
            .session()
            .doc
            .text_at(id, self.now + chrono::Duration::hours(1))
            .unwrap_or_else(|| panic!("no element {}", id))
    }

    pub fn items(&self, id: &str) -> Vec<String> {
        self.page.session().doc.get(id).unwrap().items.clone()
    }

    pub fn visible(&self, id: &str) -> bool {
        self.page.session().doc.get(id).unwrap().visible
    }

    pub fn toasts(&self) -> Vec<String> {
        self.page
            .session()
            .notifier
            .visible(self.now)
            .map(|t| format!("[{}] {}", t.kind.as_str(), t.message))
            .collect()
    }

    /// Performs `commands` and everything they lead to. Timers are parked
    /// in `timers` instead of being run.
    pub async fn run(&mut self, commands: Vec<Command>) {
        let mut queue: VecDeque<Command> = commands.into();
        while let Some(command) = queue.pop_front() {
            if let Command::After(delay, timer) = command {
                self.timers.push((delay, timer));
                continue;
            }
            let Some(done) = perform(self.api.as_ref(), &command).await else {
                continue;
            };
            queue.extend(self.page.handle(done, self.now));
        }
    }
}
