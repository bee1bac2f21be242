//! Analytics page: averages, overall quality score, distribution donut,
//! live parameter trends, per-site history, alert counts by category, the
//! detailed analysis table and the (stubbed) report generator.

use chrono::{DateTime, Utc};

use super::{Command, Inbound, Loaded, Page, TimeRange, Timer, UiAction};
use crate::alert::thresholds::{count_by_category, AlertCategory};
use crate::analysis::summary::{overall_quality_score, summary_averages};
use crate::logging::{self, Source};
use crate::model::{AnalyticsSummary, Parameter};
use crate::push::PushEvent;
use crate::quality::Grade;
use crate::session::{PageSession, ViewSettings, CONNECTION_STATUS};
use crate::view::chart::{Chart, ChartConfig, SeriesConfig};
use crate::view::table::{analysis_rows, MISSING};

pub const AVG_PH: &str = "avg-ph";
pub const AVG_TEMPERATURE: &str = "avg-temperature";
pub const AVG_OXYGEN: &str = "avg-oxygen";
pub const QUALITY_SCORE: &str = "quality-score";
pub const ANALYSIS_TABLE_BODY: &str = "analysis-table-body";
pub const GENERATE_REPORT: &str = "generate-report";
pub const REPORT_DOWNLOAD: &str = "report-download";
pub const WATER_BODY_FILTER: &str = "water-body-filter";
pub const TIME_RANGE: &str = "time-range";
pub const PARAMETER_FILTER: &str = "parameter-filter";

const GENERATE_LABEL: &str = "Generate Report";

const HISTORY_HOURS: i64 = 24;

/// Parameters offered by the parameter filter.
pub const FILTER_PARAMETERS: [Parameter; 4] = [
    Parameter::Ph,
    Parameter::Temperature,
    Parameter::DissolvedOxygen,
    Parameter::Turbidity,
];

pub const LAYOUT: &[&str] = &[
    CONNECTION_STATUS,
    TIME_RANGE,
    WATER_BODY_FILTER,
    PARAMETER_FILTER,
    GENERATE_REPORT,
    REPORT_DOWNLOAD,
    AVG_PH,
    AVG_TEMPERATURE,
    AVG_OXYGEN,
    QUALITY_SCORE,
    ANALYSIS_TABLE_BODY,
];

fn parameter_color(parameter: Parameter) -> &'static str {
    match parameter {
        Parameter::Ph => "#0d6efd",
        Parameter::Temperature => "#198754",
        Parameter::DissolvedOxygen => "#ffc107",
        Parameter::Turbidity => "#ef4444",
        Parameter::Conductivity => "#6f42c1",
        Parameter::TotalDissolvedSolids => "#20c997",
    }
}

/// File name offered for a report generated on `now`'s date.
pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!("water-quality-report-{}.pdf", now.format("%Y-%m-%d"))
}

pub struct AnalyticsPage {
    session: PageSession,
    distribution_chart: Chart,
    trends_chart: Chart,
    historical_chart: Chart,
    alert_chart: Chart,
    time_range: TimeRange,
    site_filter: Option<u32>,
    parameter_filter: Option<Parameter>,
    report_pending: bool,
    link_generation: u64,
    /// Per-site fetches of the current detailed-analysis round.
    batch: Batch,
}

#[derive(Debug, Default)]
struct Batch {
    expected: usize,
    succeeded: usize,
    failed: usize,
}

impl Batch {
    fn start(&mut self, expected: usize) {
        *self = Batch {
            expected,
            ..Batch::default()
        };
    }

    /// Counts one result; true when it completes the round.
    fn record(&mut self, ok: bool) -> bool {
        if self.expected == 0 {
            return false;
        }
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.succeeded + self.failed == self.expected
    }
}

impl AnalyticsPage {
    pub fn new(settings: ViewSettings) -> Self {
        Self::with_layout(LAYOUT, settings)
    }

    pub fn with_layout(layout: &[&str], settings: ViewSettings) -> Self {
        let distribution_chart = Chart::new(ChartConfig::doughnut(
            "qualityDistributionChart",
            "Quality Distribution",
            SeriesConfig::new("Readings", Grade::Good.color()),
            3,
        ));
        let trends_chart = Chart::new(
            ChartConfig::line("parameterTrendsChart", "Parameter Trends", settings.live_window)
                .with_series(SeriesConfig::new("pH", parameter_color(Parameter::Ph)))
                .with_series(SeriesConfig::new(Parameter::Temperature.label(), parameter_color(Parameter::Temperature)))
                .with_series(SeriesConfig::new(
                    Parameter::DissolvedOxygen.label(),
                    parameter_color(Parameter::DissolvedOxygen),
                )),
        );
        let historical_chart = Chart::new(
            ChartConfig::line("historicalChart", "Historical Data", settings.history_window)
                .with_series(Self::history_series(Parameter::Ph))
                .with_series(Self::history_series(Parameter::Temperature)),
        );
        let alert_chart = Chart::new(ChartConfig::bar(
            "alertChart",
            "Alerts by Type",
            SeriesConfig::new("Alert Count", "#dc3545"),
            AlertCategory::ALL.len(),
        ));

        Self {
            session: PageSession::new(layout, settings),
            distribution_chart,
            trends_chart,
            historical_chart,
            alert_chart,
            time_range: TimeRange::default(),
            site_filter: None,
            parameter_filter: None,
            report_pending: false,
            link_generation: 0,
            batch: Batch::default(),
        }
    }

    fn history_series(parameter: Parameter) -> SeriesConfig {
        SeriesConfig::new(parameter.label(), parameter_color(parameter)).filled()
    }

    pub fn distribution_chart(&self) -> &Chart {
        &self.distribution_chart
    }

    pub fn trends_chart(&self) -> &Chart {
        &self.trends_chart
    }

    pub fn historical_chart(&self) -> &Chart {
        &self.historical_chart
    }

    pub fn alert_chart(&self) -> &Chart {
        &self.alert_chart
    }

    /// Site whose history the historical chart shows: the site filter, or
    /// the first site when the filter is "all".
    pub fn history_site(&self) -> Option<u32> {
        self.site_filter.or_else(|| self.session.sites.first().map(|s| s.id))
    }

    fn sensor_fetches(&self) -> Vec<Command> {
        self.session
            .sites
            .iter()
            .filter(|s| self.site_filter.is_none_or(|id| id == s.id))
            .map(|s| Command::FetchSensor(s.id))
            .collect()
    }

    /// Queues the per-site fetches behind the detailed analysis table.
    fn start_detailed_analysis(&mut self) -> Vec<Command> {
        let commands = self.sensor_fetches();
        self.batch.start(commands.len());
        commands
    }

    fn redraw_summary(&mut self, summary: &AnalyticsSummary) {
        let averages = summary_averages(summary);
        let doc = &mut self.session.doc;
        let fmt = |value: Option<f64>, decimals: usize, unit: &str| match value {
            Some(v) => format!("{:.*}{}", decimals, v, unit),
            None => MISSING.to_string(),
        };
        doc.set_text(AVG_PH, fmt(averages.ph, 2, ""));
        doc.set_text(AVG_TEMPERATURE, fmt(averages.temperature, 1, "°C"));
        doc.set_text(AVG_OXYGEN, fmt(averages.oxygen, 2, " mg/L"));
        doc.set_text(
            QUALITY_SCORE,
            overall_quality_score(&summary.quality_distribution)
                .map(|score| format!("{}%", score))
                .unwrap_or_else(|| MISSING.to_string()),
        );

        let d = summary.quality_distribution;
        self.distribution_chart.replace([
            (Grade::Good.label(), vec![Some(d.good as f64)]),
            (Grade::Fair.label(), vec![Some(d.fair as f64)]),
            (Grade::Poor.label(), vec![Some(d.poor as f64)]),
        ]);
    }

    fn redraw_alert_chart(&mut self) {
        let counts = count_by_category(&self.session.alerts);
        self.alert_chart.replace(
            AlertCategory::ALL
                .iter()
                .zip(counts)
                .map(|(category, count)| (category.chart_label(), vec![Some(count as f64)])),
        );
    }

    fn redraw_table(&mut self) {
        let s = &mut self.session;
        let rows = analysis_rows(&s.sites, &s.latest, &s.alerts, self.site_filter);
        s.doc.set_items(ANALYSIS_TABLE_BODY, rows.iter().map(|r| r.render()).collect());
    }

    /// Rebuilds the historical chart for the chosen site and parameter,
    /// limited to the chosen time range.
    fn redraw_history(&mut self) {
        let parameters: Vec<Parameter> = match self.parameter_filter {
            Some(p) => vec![p],
            None => vec![Parameter::Ph, Parameter::Temperature],
        };
        let wanted: Vec<SeriesConfig> = parameters.iter().map(|p| Self::history_series(*p)).collect();
        if self.historical_chart.config().series != wanted {
            self.historical_chart.reconfigure_series(wanted);
        }

        let Some(snapshot) = self.history_site().and_then(|id| self.session.snapshots.get(&id)) else {
            self.historical_chart.clear();
            return;
        };
        let hours = self.time_range.hours();
        let mut points: Vec<(String, Vec<Option<f64>>)> = snapshot
            .historical
            .iter()
            .take(hours)
            .enumerate()
            .map(|(i, r)| {
                let values = parameters.iter().map(|p| r.value(*p)).collect();
                (format!("{}h", HISTORY_HOURS - i as i64), values)
            })
            .collect();
        points.reverse();
        self.historical_chart.replace(points);
    }

    fn on_loaded(&mut self, loaded: Loaded, now: DateTime<Utc>) -> Vec<Command> {
        match loaded {
            Loaded::Analytics(Ok(summary)) => {
                self.redraw_summary(&summary);
                self.session.analytics = Some(summary);
            }
            Loaded::Analytics(Err(e)) => self.session.fetch_failed("analytics data", None, &e, now),
            Loaded::Sites(Ok(sites)) => {
                self.session.store_sites(sites);
                if self.site_filter.is_some_and(|id| self.session.site(id).is_none()) {
                    self.site_filter = None;
                }
                self.session.populate_site_filter(WATER_BODY_FILTER);
                self.redraw_table();
                self.redraw_history();
                return self.start_detailed_analysis();
            }
            Loaded::Sites(Err(e)) => self.session.fetch_failed("water bodies", None, &e, now),
            Loaded::Alerts(Ok(alerts)) => {
                self.session.alerts = alerts;
                self.redraw_alert_chart();
                self.redraw_table();
            }
            Loaded::Alerts(Err(e)) => self.session.fetch_failed("alerts", None, &e, now),
            Loaded::Sensor { site_id, result } => {
                let ok = result.is_ok();
                match result {
                    Ok(snapshot) => {
                        self.session.store_snapshot(site_id, snapshot);
                        self.redraw_table();
                        if self.history_site() == Some(site_id) {
                            self.redraw_history();
                        }
                    }
                    Err(e) => self.session.fetch_failed("sensor data", Some(site_id), &e, now),
                }
                if self.batch.record(ok) {
                    let b = &self.batch;
                    logging::log_batch_summary("Detailed analysis", b.expected, b.succeeded, b.failed);
                }
            }
        }
        Vec::new()
    }

    fn on_push(&mut self, event: PushEvent, now: DateTime<Utc>) {
        match event {
            PushEvent::Connected => self.session.set_connection(true),
            PushEvent::Disconnected => self.session.set_connection(false),
            PushEvent::Reading(update) => {
                let Some(site_id) = update.site_id() else { return };
                let r = &update.reading;
                self.trends_chart.append(
                    now.format("%H:%M").to_string(),
                    &[r.ph, r.temperature, r.dissolved_oxygen],
                );
                self.session.record_reading(site_id, update.reading.clone());
                self.redraw_table();
                if self.history_site() == Some(site_id) {
                    self.redraw_history();
                }
            }
        }
    }

    fn on_ui(&mut self, action: UiAction) -> Vec<Command> {
        let mut commands = match action {
            UiAction::TimeRange(range) => {
                self.time_range = range;
                Vec::new()
            }
            UiAction::SiteFilter(site) => {
                if let Some(id) = site {
                    if self.session.site(id).is_none() {
                        logging::warn(Source::Page, Some(id), "Site filter names an unknown site");
                        return Vec::new();
                    }
                }
                self.site_filter = site;
                Vec::new()
            }
            UiAction::ParameterFilter(parameter) => {
                self.parameter_filter = parameter;
                Vec::new()
            }
            UiAction::Refresh => Vec::new(),
            UiAction::GenerateReport => return self.generate_report(),
            other => {
                logging::debug(Source::Page, None, &format!("Analytics ignores {:?}", other));
                return Vec::new();
            }
        };

        // Any filter change reloads the current view.
        self.redraw_table();
        self.redraw_history();
        commands.push(Command::FetchAnalytics);
        commands.extend(self.start_detailed_analysis());
        commands
    }

    fn generate_report(&mut self) -> Vec<Command> {
        if self.report_pending {
            return Vec::new();
        }
        self.report_pending = true;
        let doc = &mut self.session.doc;
        doc.set_disabled(GENERATE_REPORT, true);
        doc.set_text(GENERATE_REPORT, "Generating...");
        logging::info(Source::Page, None, "Report generation started");
        vec![Command::After(self.session.settings.report_delay, Timer::ReportReady)]
    }

    fn on_timer(&mut self, timer: Timer, now: DateTime<Utc>) -> Vec<Command> {
        match timer {
            Timer::ReportReady => {
                self.report_pending = false;
                self.link_generation += 1;
                let doc = &mut self.session.doc;
                doc.set_disabled(GENERATE_REPORT, false);
                doc.set_text(GENERATE_REPORT, GENERATE_LABEL);
                doc.set_text(REPORT_DOWNLOAD, format!("Download Report ({})", report_file_name(now)));
                doc.set_visible(REPORT_DOWNLOAD, true);
                self.session.notifier.success("Report generated successfully!", now);
                vec![Command::After(
                    self.session.settings.download_link,
                    Timer::DownloadLinkExpired(self.link_generation),
                )]
            }
            Timer::DownloadLinkExpired(generation) => {
                if generation == self.link_generation {
                    self.session.doc.set_visible(REPORT_DOWNLOAD, false);
                }
                Vec::new()
            }
        }
    }
}

impl Page for AnalyticsPage {
    fn name(&self) -> &'static str {
        "analytics"
    }

    fn session(&self) -> &PageSession {
        &self.session
    }

    fn start(&mut self, _now: DateTime<Utc>) -> Vec<Command> {
        let doc = &mut self.session.doc;
        doc.set_text(CONNECTION_STATUS, "Connecting...");
        doc.set_text(GENERATE_REPORT, GENERATE_LABEL);
        doc.set_visible(REPORT_DOWNLOAD, false);
        doc.set_text(TIME_RANGE, "24h");
        doc.set_items(TIME_RANGE, vec!["6h".into(), "12h".into(), "24h".into()]);
        doc.set_text(PARAMETER_FILTER, "all");
        let mut options = vec!["all".to_string()];
        options.extend(FILTER_PARAMETERS.iter().map(|p| p.key().to_string()));
        doc.set_items(PARAMETER_FILTER, options);
        for id in [AVG_PH, AVG_TEMPERATURE, AVG_OXYGEN, QUALITY_SCORE] {
            doc.set_text(id, MISSING);
        }
        self.redraw_alert_chart();
        vec![Command::FetchAnalytics, Command::FetchSites, Command::FetchAlerts]
    }

    fn handle(&mut self, inbound: Inbound, now: DateTime<Utc>) -> Vec<Command> {
        match inbound {
            Inbound::Push(event) => {
                self.on_push(event, now);
                Vec::new()
            }
            Inbound::Ui(action) => {
                let commands = self.on_ui(action);
                self.sync_filter_elements();
                commands
            }
            Inbound::Loaded(loaded) => self.on_loaded(loaded, now),
            Inbound::Tick => vec![Command::FetchAnalytics, Command::FetchSites, Command::FetchAlerts],
            Inbound::Timer(timer) => self.on_timer(timer, now),
        }
    }

    fn extra_lines(&self) -> Vec<String> {
        let mut lines = self.distribution_chart.render_lines();
        lines.extend(self.trends_chart.render_lines());
        lines.extend(self.historical_chart.render_lines());
        lines.extend(self.alert_chart.render_lines());
        lines
    }
}

impl AnalyticsPage {
    fn sync_filter_elements(&mut self) {
        let doc = &mut self.session.doc;
        doc.set_text(TIME_RANGE, format!("{}h", self.time_range.hours()));
        doc.set_text(
            WATER_BODY_FILTER,
            self.site_filter.map(|id| id.to_string()).unwrap_or_else(|| "all".to_string()),
        );
        doc.set_text(PARAMETER_FILTER, self.parameter_filter.map(Parameter::key).unwrap_or("all"));
    }
}
