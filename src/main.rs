use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use aquamon_dashboard::config::{DashboardConfig, DEFAULT_CONFIG_PATH};
use aquamon_dashboard::dev_mode::{self, SimulatedBackend};
use aquamon_dashboard::ingest::{HttpApi, WaterApi};
use aquamon_dashboard::logging::{self, Source};
use aquamon_dashboard::page::runtime::{self, InboundSender};
use aquamon_dashboard::page::{AnalyticsPage, DashboardPage, Inbound, MapPage, Page, UiAction};
use aquamon_dashboard::push::listener::run_listener;
use aquamon_dashboard::session::ViewSettings;
use aquamon_dashboard::verify;

#[derive(Parser)]
#[command(name = "aquamon", about = "Water-quality monitoring dashboard")]
struct Cli {
    /// Configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Use the built-in simulated backend instead of HTTP.
    #[arg(long)]
    dev: bool,

    #[command(subcommand)]
    command: PageCommand,
}

#[derive(Subcommand)]
enum PageCommand {
    /// Site list, live sensor tiles and history charts.
    Dashboard,
    /// Site markers, filters and the detail panel.
    Map,
    /// Averages, distribution, trends and reports.
    Analytics,
    /// Probe every endpoint once and print a summary.
    Verify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = DashboardConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    logging::init_logger(config.log_level()?, config.log_file.as_deref(), true);

    let simulator = cli.dev.then(|| Arc::new(SimulatedBackend::new(None)));
    let api: Arc<dyn WaterApi> = match &simulator {
        Some(backend) => {
            logging::info(Source::System, None, "Dev mode: using the simulated backend");
            // One round up front so the first load has something to show.
            backend.step(Utc::now());
            Arc::clone(backend) as Arc<dyn WaterApi>
        }
        None => Arc::new(HttpApi::new(&config.base_url).context("building HTTP client")?),
    };

    let settings = ViewSettings::from_config(&config);
    match cli.command {
        PageCommand::Verify => {
            let base_url = if cli.dev { "dev" } else { config.base_url.as_str() };
            let report = verify::verify_endpoints(api.as_ref(), base_url).await;
            verify::print_summary(&report);
            Ok(())
        }
        PageCommand::Dashboard => run(DashboardPage::new(settings), api, simulator, &config).await,
        PageCommand::Map => run(MapPage::new(settings), api, simulator, &config).await,
        PageCommand::Analytics => run(AnalyticsPage::new(settings), api, simulator, &config).await,
    }
}

async fn run<P: Page>(
    mut page: P,
    api: Arc<dyn WaterApi>,
    simulator: Option<Arc<SimulatedBackend>>,
    config: &DashboardConfig,
) -> anyhow::Result<()> {
    let (tx, rx) = runtime::channel();

    let push = match simulator {
        Some(backend) => dev_mode::spawn_feed(backend, dev_mode::DEFAULT_UPDATE_INTERVAL, tx.clone()),
        None => {
            let url = config.push_endpoint();
            let push_tx = tx.clone();
            tokio::spawn(async move {
                if let Err(e) = run_listener::<Inbound>(url, push_tx).await {
                    logging::error(Source::Push, None, &format!("Push channel ended: {}", e));
                }
            })
        }
    };
    let input = spawn_stdin_reader(tx.clone());

    runtime::run_page(&mut page, api, tx, rx, config.poll_interval(), print_page).await;

    push.abort();
    input.abort();
    Ok(())
}

fn print_page<P: Page>(page: &P, now: DateTime<Utc>) {
    println!();
    for line in page.render(now) {
        println!("{}", line);
    }
}

/// Turns stdin lines into UI actions. End of input quits.
fn spawn_stdin_reader(tx: InboundSender) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    logging::error(Source::System, None, &format!("stdin: {}", e));
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match UiAction::parse(&line) {
                Ok(action) => {
                    if tx.send(action.into()).is_err() {
                        return;
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }
        let _ = tx.send(UiAction::Quit.into());
    })
}
