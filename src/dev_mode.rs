/// Development mode: an in-process stand-in for the backend.
///
/// When no server is running, `SimulatedBackend` serves the same four
/// endpoints from memory and `spawn_feed` plays the push channel. Readings
/// are drawn uniformly from the ranges the real simulator uses, alerts are
/// raised by the same threshold rules, and analytics are aggregated the
/// way the server aggregates them (distribution by pH only).

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::alert::timestamps::parse_timestamp;
use crate::alert::thresholds::check_reading;
use crate::analysis::summary::{ph_distribution, reading_averages};
use crate::ingest::WaterApi;
use crate::logging::{self, Source};
use crate::model::{Alert, AnalyticsSummary, FetchFailure, MonitoredSite, Reading, SensorSnapshot};
use crate::push::{PushEvent, PushedAlert, SensorUpdate};
use crate::sites::reference_sites;

/// Readings per site served as history.
pub const HISTORY_LEN: usize = 24;
/// Alerts served by `active_alerts`, newest first.
pub const ALERT_LIMIT: usize = 10;
/// How often the simulated sensors report.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);

/// Readings kept per site: one day at the default cadence.
const RETAINED_PER_SITE: usize = 2_880;
const RETAINED_ALERTS: usize = 1_000;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

struct SimState {
    rng: StdRng,
    sites: Vec<MonitoredSite>,
    /// Newest first.
    readings: BTreeMap<u32, VecDeque<Reading>>,
    /// Newest first.
    alerts: VecDeque<Alert>,
    next_alert_id: u32,
}

pub struct SimulatedBackend {
    state: Mutex<SimState>,
}

impl SimulatedBackend {
    /// A backend over the reference sites with no readings yet. A seed
    /// makes the generated readings reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            state: Mutex::new(SimState {
                rng,
                sites: reference_sites(),
                readings: BTreeMap::new(),
                alerts: VecDeque::new(),
                next_alert_id: 1,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Generates one reading per site, records it and any alerts it
    /// raises, and returns the push payloads.
    pub fn step(&self, now: DateTime<Utc>) -> Vec<SensorUpdate> {
        let mut guard = self.state();
        let state = &mut *guard;
        let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
        let mut updates = Vec::with_capacity(state.sites.len());

        for site in &state.sites {
            let rng = &mut state.rng;
            let reading = Reading {
                site_id: Some(site.id),
                timestamp: Some(timestamp.clone()),
                ph: Some(round_to(rng.random_range(6.5..=8.5), 2)),
                temperature: Some(round_to(rng.random_range(20.0..=35.0), 1)),
                dissolved_oxygen: Some(round_to(rng.random_range(4.0..=12.0), 2)),
                turbidity: Some(round_to(rng.random_range(0.1..=50.0), 1)),
                conductivity: Some(round_to(rng.random_range(100.0..=2000.0), 0)),
                total_dissolved_solids: Some(round_to(rng.random_range(50.0..=1500.0), 0)),
            };

            let raised = check_reading(&reading);
            for alert in &raised {
                state.alerts.push_front(Alert {
                    id: state.next_alert_id,
                    site_name: site.name.clone(),
                    category: alert.category.wire_name().to_string(),
                    message: alert.message.clone(),
                    severity: alert.severity,
                    timestamp: timestamp.clone(),
                });
                state.next_alert_id += 1;
            }
            state.alerts.truncate(RETAINED_ALERTS);

            let history = state.readings.entry(site.id).or_default();
            history.push_front(reading.clone());
            history.truncate(RETAINED_PER_SITE);

            updates.push(SensorUpdate {
                name: site.name.clone(),
                reading,
                alerts: raised
                    .into_iter()
                    .map(|a| PushedAlert(a.category.wire_name().to_string(), a.message, a.severity))
                    .collect(),
            });
        }

        logging::debug(Source::System, None, &format!("Simulated {} readings", updates.len()));
        updates
    }

    /// Aggregates over readings taken within 24 hours of `now`.
    pub fn analytics_at(&self, now: DateTime<Utc>) -> AnalyticsSummary {
        let state = self.state();
        let cutoff = now - chrono::Duration::hours(24);
        let recent: Vec<&Reading> = state
            .readings
            .values()
            .flat_map(|history| history.iter())
            .filter(|r| {
                r.timestamp
                    .as_deref()
                    .and_then(parse_timestamp)
                    .is_some_and(|t| t >= cutoff)
            })
            .collect();

        let total_bodies = state
            .readings
            .keys()
            .filter(|id| recent.iter().any(|r| r.site_id == Some(**id)))
            .count() as u32;
        let averages = reading_averages(recent.iter().copied());

        AnalyticsSummary {
            total_bodies,
            avg_ph: averages.ph.unwrap_or(0.0),
            avg_temperature: averages.temperature.unwrap_or(0.0),
            avg_oxygen: averages.oxygen.unwrap_or(0.0),
            avg_turbidity: averages.turbidity.unwrap_or(0.0),
            quality_distribution: ph_distribution(recent.iter().copied()),
        }
    }
}

#[async_trait]
impl WaterApi for SimulatedBackend {
    async fn list_sites(&self) -> Result<Vec<MonitoredSite>, FetchFailure> {
        Ok(self.state().sites.clone())
    }

    /// Unknown sites get an empty snapshot, as the server does.
    async fn sensor_data(&self, site_id: u32) -> Result<SensorSnapshot, FetchFailure> {
        let state = self.state();
        let Some(history) = state.readings.get(&site_id) else {
            return Ok(SensorSnapshot::default());
        };
        Ok(SensorSnapshot {
            current: history.front().cloned().unwrap_or_default(),
            historical: history
                .iter()
                .take(HISTORY_LEN)
                .map(|r| Reading {
                    conductivity: None,
                    total_dissolved_solids: None,
                    ..r.clone()
                })
                .collect(),
        })
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>, FetchFailure> {
        Ok(self.state().alerts.iter().take(ALERT_LIMIT).cloned().collect())
    }

    async fn analytics(&self) -> Result<AnalyticsSummary, FetchFailure> {
        Ok(self.analytics_at(Utc::now()))
    }
}

/// Plays the push channel: `Connected`, then one `Reading` per site every
/// `interval` until the receiver goes away.
pub fn spawn_feed<T>(backend: Arc<SimulatedBackend>, interval: Duration, tx: UnboundedSender<T>) -> JoinHandle<()>
where
    T: From<PushEvent> + Send + 'static,
{
    tokio::spawn(async move {
        logging::info(Source::System, None, "Simulated push feed started");
        if tx.send(PushEvent::Connected.into()).is_err() {
            return;
        }
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            for update in backend.step(Utc::now()) {
                if tx.send(PushEvent::Reading(update).into()).is_err() {
                    return;
                }
            }
        }
    })
}
