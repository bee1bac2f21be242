//! The dispatch loop.
//!
//! One unbounded queue feeds one loop. Fetch commands run as spawned tasks
//! that post their result back onto the queue; there is no deduplication,
//! so when two fetches of the same resource overlap the later completion
//! wins. A ticker task posts `Tick` every poll interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::{Command, Inbound, Loaded, Page, UiAction};
use crate::ingest::WaterApi;
use crate::logging::{self, Source};

pub type InboundSender = UnboundedSender<Inbound>;
pub type InboundReceiver = UnboundedReceiver<Inbound>;

pub fn channel() -> (InboundSender, InboundReceiver) {
    mpsc::unbounded_channel()
}

/// Performs one fetch command and returns its completion. Timer commands
/// are not fetches and yield `None`.
pub async fn perform(api: &dyn WaterApi, command: &Command) -> Option<Inbound> {
    let loaded = match command {
        Command::FetchSites => Loaded::Sites(api.list_sites().await),
        Command::FetchSensor(site_id) => Loaded::Sensor {
            site_id: *site_id,
            result: api.sensor_data(*site_id).await,
        },
        Command::FetchAlerts => Loaded::Alerts(api.active_alerts().await),
        Command::FetchAnalytics => Loaded::Analytics(api.analytics().await),
        Command::After(..) => return None,
    };
    Some(Inbound::Loaded(loaded))
}

/// Carries out `command` in the background.
pub fn dispatch(command: Command, api: &Arc<dyn WaterApi>, tx: &InboundSender) -> JoinHandle<()> {
    let tx = tx.clone();
    match command {
        Command::After(delay, timer) => tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Inbound::Timer(timer));
        }),
        fetch => {
            let api = Arc::clone(api);
            tokio::spawn(async move {
                if let Some(done) = perform(api.as_ref(), &fetch).await {
                    // A closed queue means the page has quit.
                    let _ = tx.send(done);
                }
            })
        }
    }
}

/// Posts `Tick` every `period`, starting one period from now.
pub fn spawn_ticker(period: Duration, tx: InboundSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx.send(Inbound::Tick).is_err() {
                break;
            }
        }
    })
}

/// Runs `page` until `Quit` arrives. `on_render` is called after the
/// initial load is issued and after every handled message.
pub async fn run_page<P, F>(
    page: &mut P,
    api: Arc<dyn WaterApi>,
    tx: InboundSender,
    mut rx: InboundReceiver,
    poll_interval: Duration,
    mut on_render: F,
) where
    P: Page,
    F: FnMut(&P, DateTime<Utc>),
{
    logging::info(Source::Page, None, &format!("Starting {} page", page.name()));

    let ticker = spawn_ticker(poll_interval, tx.clone());
    let now = Utc::now();
    for command in page.start(now) {
        dispatch(command, &api, &tx);
    }
    on_render(page, now);

    while let Some(inbound) = rx.recv().await {
        if inbound == Inbound::Ui(UiAction::Quit) {
            break;
        }
        let now = Utc::now();
        let commands = page.handle(inbound, now);
        for command in commands {
            dispatch(command, &api, &tx);
        }
        on_render(page, now);
    }

    ticker.abort();
    logging::info(Source::Page, None, &format!("{} page stopped", page.name()));
}
