//! Page controllers.
//!
//! A page is a state machine over one inbound queue. Everything that can
//! happen to a page (push events, user actions, fetch completions, the
//! poll tick, report timers) arrives as an `Inbound`; the page updates its
//! session and answers with the `Command`s it wants carried out. The
//! runtime performs those commands off the loop and posts their results
//! back onto the same queue, so a page never blocks and never touches I/O.

pub mod analytics;
pub mod dashboard;
pub mod map;
pub mod runtime;

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Alert, AnalyticsSummary, FetchFailure, MonitoredSite, Parameter, SensorSnapshot};
use crate::push::PushEvent;
use crate::quality::Grade;
use crate::session::PageSession;
use crate::sites::SizeClass;
use crate::view::map::AlertFilter;
use crate::view::render_document;

pub use analytics::AnalyticsPage;
pub use dashboard::DashboardPage;
pub use map::MapPage;

// ---------------------------------------------------------------------------
// Inbound queue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Push(PushEvent),
    Ui(UiAction),
    Loaded(Loaded),
    /// Periodic reload.
    Tick,
    Timer(Timer),
}

impl From<PushEvent> for Inbound {
    fn from(event: PushEvent) -> Self {
        Inbound::Push(event)
    }
}

impl From<UiAction> for Inbound {
    fn from(action: UiAction) -> Self {
        Inbound::Ui(action)
    }
}

/// A finished fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Sites(Result<Vec<MonitoredSite>, FetchFailure>),
    Sensor {
        site_id: u32,
        result: Result<SensorSnapshot, FetchFailure>,
    },
    Alerts(Result<Vec<Alert>, FetchFailure>),
    Analytics(Result<AnalyticsSummary, FetchFailure>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    ReportReady,
    /// Carries the generation of the link it should remove, so an older
    /// timer never hides a newer link.
    DownloadLinkExpired(u64),
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchSites,
    FetchSensor(u32),
    FetchAlerts,
    FetchAnalytics,
    /// Post `Timer` back to the page once the delay has passed.
    After(Duration, Timer),
}

// ---------------------------------------------------------------------------
// UI actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Hours6,
    Hours12,
    #[default]
    Hours24,
}

impl TimeRange {
    pub fn hours(self) -> usize {
        match self {
            TimeRange::Hours6 => 6,
            TimeRange::Hours12 => 12,
            TimeRange::Hours24 => 24,
        }
    }

    pub fn from_key(key: &str) -> Option<TimeRange> {
        match key {
            "6h" => Some(TimeRange::Hours6),
            "12h" => Some(TimeRange::Hours12),
            "24h" => Some(TimeRange::Hours24),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    SelectSite(u32),
    QualityFilter(Option<Grade>),
    SizeFilter(Option<SizeClass>),
    AlertFilter(AlertFilter),
    TimeRange(TimeRange),
    SiteFilter(Option<u32>),
    ParameterFilter(Option<Parameter>),
    Refresh,
    GenerateReport,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseActionError(String);

fn invalid(what: &str, arg: &str) -> ParseActionError {
    ParseActionError(format!("invalid {} '{}'", what, arg))
}

impl UiAction {
    /// Parses one command line, e.g. `select 3` or `quality good`.
    pub fn parse(line: &str) -> Result<UiAction, ParseActionError> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| ParseActionError("empty command".to_string()))?
            .to_ascii_lowercase();
        let arg = words.next().map(str::to_ascii_lowercase).unwrap_or_default();
        let arg = arg.as_str();

        let action = match verb.as_str() {
            "select" => UiAction::SelectSite(arg.parse().map_err(|_| invalid("site id", arg))?),
            "quality" => UiAction::QualityFilter(match arg {
                "all" => None,
                key => Some(Grade::from_key(key).ok_or_else(|| invalid("grade", key))?),
            }),
            "size" => UiAction::SizeFilter(match arg {
                "all" => None,
                key => Some(SizeClass::from_key(key).ok_or_else(|| invalid("size", key))?),
            }),
            "alerts" => UiAction::AlertFilter(match arg {
                "all" => AlertFilter::All,
                "with" => AlertFilter::WithAlerts,
                "without" => AlertFilter::WithoutAlerts,
                other => return Err(invalid("alert filter", other)),
            }),
            "range" => UiAction::TimeRange(TimeRange::from_key(arg).ok_or_else(|| invalid("time range", arg))?),
            "site" => UiAction::SiteFilter(match arg {
                "all" => None,
                id => Some(id.parse().map_err(|_| invalid("site id", id))?),
            }),
            "param" => UiAction::ParameterFilter(match arg {
                "all" => None,
                key => Some(Parameter::from_key(key).ok_or_else(|| invalid("parameter", key))?),
            }),
            "refresh" => UiAction::Refresh,
            "report" => UiAction::GenerateReport,
            "quit" | "exit" => UiAction::Quit,
            other => return Err(ParseActionError(format!("unknown command '{}'", other))),
        };
        Ok(action)
    }
}

// ---------------------------------------------------------------------------
// Page trait
// ---------------------------------------------------------------------------

pub trait Page: Send {
    fn name(&self) -> &'static str;

    fn session(&self) -> &PageSession;

    /// Initial load.
    fn start(&mut self, now: DateTime<Utc>) -> Vec<Command>;

    fn handle(&mut self, inbound: Inbound, now: DateTime<Utc>) -> Vec<Command>;

    /// Plain-text rendering: the document, any extra view lines, then the
    /// visible notifications.
    fn render(&self, now: DateTime<Utc>) -> Vec<String> {
        let session = self.session();
        let mut lines = vec![format!("=== {} ===", self.name())];
        lines.extend(render_document(&session.doc, now));
        lines.extend(self.extra_lines());
        lines.extend(
            session
                .notifier
                .visible(now)
                .map(|t| format!("[{}] {}", t.kind.as_str(), t.message)),
        );
        lines
    }

    /// Chart renderings and anything else outside the document.
    fn extra_lines(&self) -> Vec<String> {
        Vec::new()
    }
}
