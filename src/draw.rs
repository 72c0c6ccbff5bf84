use crate::app::App;
use crate::state::app_state::{ScheduleView, StandingsView};
use chrono::{DateTime, Local, Utc};
use schedule_api::GameStatus;
use schedule_api::classify::{LiveGame, NextGame, PreviousGame, ScheduleStatus};
use schedule_api::countdown::Countdown;
use schedule_api::standings::{DivisionStandings, RankedEntry};
use serde::Serialize;

const NO_RECENT_GAMES: &str = "No recent games found";
const NO_UPCOMING_GAMES: &str = "No upcoming games scheduled";
const DETAILS_UNAVAILABLE: &str = "Details not available";

/// Plain-text status page. `now` drives the countdown so a render is
/// repeatable for a given instant.
pub fn render(app: &App, now: DateTime<Utc>) -> String {
    let mut lines = Vec::new();
    let schedule = &app.state.schedule;

    draw_header(&mut lines, app.team_label(), schedule);

    if let Some(live) = schedule.status().and_then(|s| s.live.as_ref()) {
        lines.push(String::new());
        draw_live(&mut lines, app.team_label(), live);
    }

    lines.push(String::new());
    lines.push("Previous Game".to_string());
    match schedule.status() {
        Some(status) => draw_previous(&mut lines, status.previous.as_ref()),
        None => lines.push(section_placeholder(schedule, NO_RECENT_GAMES)),
    }

    lines.push(String::new());
    lines.push("Next Game".to_string());
    match schedule.status() {
        Some(status) => draw_next(&mut lines, status.next.as_ref(), now),
        None => lines.push(section_placeholder(schedule, NO_UPCOMING_GAMES)),
    }

    draw_standings(&mut lines, &app.state.standings);

    if let Some(at) = app.state.last_updated {
        lines.push(String::new());
        lines.push(format!("Last updated {}", at.format("%a %b %-d %-I:%M:%S %p")));
    }

    lines.join("\n")
}

fn draw_header(lines: &mut Vec<String>, team: &str, schedule: &ScheduleView) {
    lines.push(format!("Is {team} undefeated?"));
    match schedule {
        ScheduleView::Ready(status) => {
            lines.push(if status.undefeated { "YES!!!" } else { "NO" }.to_string());
            lines.push(format!("Current Record: {}", status.record));
        }
        other => lines.push(other.placeholder().unwrap_or_default()),
    }
}

/// Loading and no-data states reuse the section's own placeholder; a failed
/// fetch says so instead.
fn section_placeholder(schedule: &ScheduleView, empty: &str) -> String {
    match schedule {
        ScheduleView::Failed(_) => "Unable to load game data".to_string(),
        ScheduleView::Loading => "Loading...".to_string(),
        _ => empty.to_string(),
    }
}

fn draw_live(lines: &mut Vec<String>, team: &str, live: &LiveGame) {
    let score = |s: Option<u16>| s.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
    lines.push(format!(
        "LIVE {} {}  {team} {} - {} [{}]",
        live.home_away.prefix(),
        live.opponent,
        score(live.team_score),
        score(live.opponent_score),
        status_label(live.status),
    ));
}

fn draw_previous(lines: &mut Vec<String>, previous: Option<&PreviousGame>) {
    let Some(game) = previous else {
        lines.push(NO_RECENT_GAMES.to_string());
        return;
    };

    lines.push(format!("{} {}", game.home_away.prefix(), game.opponent));
    match &game.result {
        Some(result) => lines.push(result.label()),
        None => lines.push(DETAILS_UNAVAILABLE.to_string()),
    }
    if let Some(date) = game.date {
        lines.push(date.with_timezone(&Local).format("%a, %b %-d").to_string());
    }
}

fn draw_next(lines: &mut Vec<String>, next: Option<&NextGame>, now: DateTime<Utc>) {
    let Some(game) = next else {
        lines.push(NO_UPCOMING_GAMES.to_string());
        return;
    };

    lines.push(format!("{} {}", game.home_away.prefix(), game.opponent));
    lines.push(Countdown::between(game.kickoff, now).tick_label());
    lines.push(format!(
        "Kickoff: {}",
        game.kickoff.with_timezone(&Local).format("%a, %b %-d at %-I:%M %p")
    ));
    lines.push(format!("TV: {}", game.network));
    if !game.details_available {
        lines.push(DETAILS_UNAVAILABLE.to_string());
    }
}

fn draw_standings(lines: &mut Vec<String>, standings: &StandingsView) {
    let table = match standings {
        StandingsView::Disabled => return,
        StandingsView::Loading => {
            lines.push(String::new());
            lines.push("Standings loading...".to_string());
            return;
        }
        StandingsView::NotListed => {
            lines.push(String::new());
            lines.push("Standings not available".to_string());
            return;
        }
        StandingsView::Failed(err) => {
            lines.push(String::new());
            lines.push(format!("Standings unavailable: {err}"));
            return;
        }
        StandingsView::Ready(table) => table,
    };

    lines.push(String::new());
    lines.push(format!("{} Standings", table.name));
    for ranked in &table.entries {
        lines.push(standings_row(ranked));
    }
}

fn standings_row(ranked: &RankedEntry) -> String {
    let entry = &ranked.entry;
    let marker = if ranked.is_tracked { ">" } else { " " };
    let record = if entry.ties > 0 {
        format!("{}-{}-{}", entry.wins, entry.losses, entry.ties)
    } else {
        format!("{}-{}", entry.wins, entry.losses)
    };
    let pct = format!("{:.3}", entry.win_percent);
    let pct = pct.strip_prefix('0').unwrap_or(&pct);
    let division = entry.division_record.as_deref().unwrap_or("-");

    format!(
        "{marker}{:>2}. {:<4} {:<7} {:>5}  Div {:<5} {}",
        ranked.rank, entry.team.abbrev, record, pct, division, ranked.position
    )
}

fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Scheduled => "Scheduled",
        GameStatus::InProgress => "In progress",
        GameStatus::Halftime => "Halftime",
        GameStatus::Delayed => "Delayed",
        GameStatus::Final => "Final",
        GameStatus::Postponed => "Postponed",
    }
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Report<'a> {
    team: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    undefeated: Option<bool>,
    previous: Option<&'a PreviousGame>,
    next: Option<NextReport<'a>>,
    live: Option<&'a LiveGame>,
    standings: Option<&'a DivisionStandings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct NextReport<'a> {
    #[serde(flatten)]
    game: &'a NextGame,
    countdown: String,
}

/// The same view models as `render`, as pretty-printed JSON.
pub fn render_json(app: &App, now: DateTime<Utc>) -> serde_json::Result<String> {
    let status: Option<&ScheduleStatus> = app.state.schedule.status();
    let report = Report {
        team: app.team_label(),
        record: status.map(|s| s.record.to_string()),
        undefeated: status.map(|s| s.undefeated),
        previous: status.and_then(|s| s.previous.as_ref()),
        next: status.and_then(|s| s.next.as_ref()).map(|game| NextReport {
            game,
            countdown: Countdown::between(game.kickoff, now).label(),
        }),
        live: status.and_then(|s| s.live.as_ref()),
        standings: match &app.state.standings {
            StandingsView::Ready(table) => Some(table),
            _ => None,
        },
        error: app.state.schedule.placeholder(),
    };
    serde_json::to_string_pretty(&report)
}
