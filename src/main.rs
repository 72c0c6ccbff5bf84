mod app;
mod draw;
mod state;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::ScheduleView;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::NetworkWorker;
use crate::state::refresher::RefreshScheduler;
use chrono::Utc;
use log::{LevelFilter, debug, error, info, warn};
use std::io::{self, IsTerminal, Write};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RunOptions {
    /// One fetch-classify cycle, print, exit.
    once: bool,
    json: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Version,
    Run(RunOptions),
    Invalid(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = match parse_cli_args(std::env::args().skip(1)) {
        Command::Help => {
            println!("{}", usage_text());
            return Ok(());
        }
        Command::Version => {
            println!("undefeated {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Invalid(arg) => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
        Command::Run(options) => options,
    };

    better_panic::install();

    let settings = AppSettings::load();
    let default_level = settings.log_level.unwrap_or(LevelFilter::Warn);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level.as_str()))
        .init();
    for warning in &settings.warnings {
        warn!("{warning}");
    }

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Network thread
    let network_worker = NetworkWorker::new(&settings, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    let scheduler = RefreshScheduler::new(settings.refresh, network_req_tx.clone(), ui_event_tx.clone());
    let app = App::new(settings);

    // Trigger schedule load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    let result = main_loop(
        app,
        scheduler,
        options,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
    )
    .await;

    network_task.abort();
    result
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Command {
    let mut options = RunOptions::default();
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Command::Help,
            "-V" | "--version" => return Command::Version,
            "--once" => options.once = true,
            "--json" => options.json = true,
            _ => return Command::Invalid(arg),
        }
    }
    Command::Run(options)
}

fn usage_text() -> &'static str {
    "undefeated - is your team still undefeated?

Usage:
  undefeated [--once] [--json]
  undefeated --help
  undefeated --version

Options:
  --once      Fetch once, print the status and exit
  --json      Print the status as JSON instead of text

Environment:
  UNDEFEATED_TEAM_ABBREVIATIONS  Tracked team abbreviations (default GB,GNB)
  UNDEFEATED_TEAM_ID             Tracked team id, matched alongside abbreviations
  UNDEFEATED_SCHEDULE_URL        Team schedule endpoint (default ESPN Packers schedule)
  UNDEFEATED_SCOREBOARD_URL      League scoreboard used for live scores
  UNDEFEATED_SUMMARY_URL         Single-event summary endpoint
  UNDEFEATED_STANDINGS_URL       Standings endpoint; empty disables standings
  UNDEFEATED_LIVE_REFRESH_MS     Refresh interval while a game is live (default 30000)
  UNDEFEATED_COUNTDOWN_TICK_MS   Countdown update interval (default 60000)
  UNDEFEATED_REQUEST_TIMEOUT_MS  Per-request timeout (default 10000)
  UNDEFEATED_REQUIRE_WIN         Undefeated also requires at least one win (default false)
  UNDEFEATED_TIE_POLICY          score | winner-flag | no-ties (default score)
  UNDEFEATED_RECORD_SOURCE       derived | reported (default derived)
  UNDEFEATED_LOG_LEVEL           error | warn | info | debug | trace (default warn; RUST_LOG wins)"
}

async fn main_loop(
    mut app: App,
    mut scheduler: RefreshScheduler,
    options: RunOptions,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) -> anyhow::Result<()> {
    let mut pending = 0usize;

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                match ui_event {
                    UiEvent::AppStarted => {
                        pending += send(&network_requests, NetworkRequest::LoadSchedule).await;
                        if app.standings_enabled() {
                            pending += send(&network_requests, NetworkRequest::LoadStandings).await;
                        }
                        if pending == 0 {
                            anyhow::bail!("network worker stopped before the first request");
                        }
                    }
                    UiEvent::CountdownTick => present(&app, options)?,
                }
            }

            Some(response) = network_responses.recv() => {
                pending = pending.saturating_sub(1);
                let refresh_standings = handle_network_response(response, &mut app);

                if options.once {
                    if pending == 0 {
                        break;
                    }
                    continue;
                }

                if let Some(mode) = app.refresh_mode() {
                    scheduler.apply(mode);
                }
                if refresh_standings {
                    send(&network_requests, NetworkRequest::LoadStandings).await;
                }
                present(&app, options)?;
            }

            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
        }
    }

    scheduler.stop();

    if options.once {
        present(&app, options)?;
        if let ScheduleView::Failed(message) = &app.state.schedule {
            anyhow::bail!("schedule fetch failed: {message}");
        }
    }
    Ok(())
}

/// Returns true when standings should be re-fetched.
fn handle_network_response(response: NetworkResponse, app: &mut App) -> bool {
    match response {
        NetworkResponse::ScheduleLoaded { status } => {
            debug!("schedule loaded: record {}", status.record);
            return app.on_schedule_loaded(status);
        }
        NetworkResponse::ScheduleEmpty { reason } => app.on_schedule_empty(reason),
        NetworkResponse::ScheduleFailed { message } => {
            error!("Network error: {message}");
            app.on_schedule_failed(message);
        }
        NetworkResponse::StandingsLoaded { standings } => app.on_standings_loaded(standings),
        NetworkResponse::StandingsFailed { message } => app.on_standings_failed(message),
    }
    false
}

/// 1 when the request reached the worker.
async fn send(network_requests: &mpsc::Sender<NetworkRequest>, request: NetworkRequest) -> usize {
    match network_requests.send(request).await {
        Ok(()) => 1,
        Err(e) => {
            error!("Failed to send network request: {e}");
            0
        }
    }
}

fn present(app: &App, options: RunOptions) -> anyhow::Result<()> {
    let now = Utc::now();
    let output = if options.json {
        draw::render_json(app, now)?
    } else {
        draw::render(app, now)
    };

    let mut stdout = io::stdout().lock();
    // Redraw in place when watching in a terminal.
    if !options.once && !options.json && stdout.is_terminal() {
        write!(stdout, "\x1B[2J\x1B[H")?;
    }
    writeln!(stdout, "{output}")?;
    stdout.flush()?;
    Ok(())
}
