//! Pure classification of a fetched schedule: season record, previous/next/live
//! game selection and per-game opponent/result resolution.

use crate::{
    Game, GameOutcome, GameStatus, HomeAway, NoData, Participant, RecordPolicy, RecordSource,
    Schedule, SeasonRecord, TiePolicy, TrackedTeam,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

pub const UNKNOWN_OPPONENT: &str = "Unknown";
pub const NETWORK_TBD: &str = "TBD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub outcome: GameOutcome,
    pub team_score: u16,
    pub opponent_score: u16,
}

impl GameResult {
    /// "W 24-10"
    pub fn label(&self) -> String {
        format!(
            "{} {}-{}",
            self.outcome.letter(),
            self.team_score,
            self.opponent_score
        )
    }
}

/// Everything the presentation layer needs from one fetch-classify cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleStatus {
    pub record: SeasonRecord,
    pub undefeated: bool,
    pub previous: Option<PreviousGame>,
    pub next: Option<NextGame>,
    pub live: Option<LiveGame>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviousGame {
    pub game_id: String,
    pub opponent: String,
    pub home_away: HomeAway,
    /// None when the event carried no competitor details.
    pub result: Option<GameResult>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextGame {
    pub game_id: String,
    pub opponent: String,
    pub home_away: HomeAway,
    pub kickoff: DateTime<Utc>,
    pub network: String,
    pub details_available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveGame {
    pub game_id: String,
    pub opponent: String,
    pub home_away: HomeAway,
    pub status: GameStatus,
    pub team_score: Option<u16>,
    pub opponent_score: Option<u16>,
}

// ---------------------------------------------------------------------------
// Per-game resolution
// ---------------------------------------------------------------------------

pub fn tracked_participant<'a>(game: &'a Game, team: &TrackedTeam) -> Option<&'a Participant> {
    game.participants.iter().find(|p| team.matches(&p.team))
}

pub fn opponent<'a>(game: &'a Game, team: &TrackedTeam) -> Option<&'a Participant> {
    game.participants.iter().find(|p| !team.matches(&p.team))
}

/// Opponent display name, falling back through short name and abbreviation.
pub fn opponent_name(game: &Game, team: &TrackedTeam) -> String {
    opponent(game, team)
        .map(|p| &p.team)
        .and_then(|t| {
            [&t.name, &t.short_name, &t.abbrev]
                .into_iter()
                .find(|s| !s.trim().is_empty())
                .cloned()
        })
        .unwrap_or_else(|| UNKNOWN_OPPONENT.to_owned())
}

pub fn home_away(game: &Game, team: &TrackedTeam) -> HomeAway {
    tracked_participant(game, team)
        .map(|p| p.home_away)
        .unwrap_or_default()
}

/// Result of a final game from the tracked team's side. `None` if the game
/// isn't final or the tracked team isn't among its participants.
pub fn game_result(game: &Game, team: &TrackedTeam, ties: TiePolicy) -> Option<GameResult> {
    if !game.is_final() {
        return None;
    }
    let ours = tracked_participant(game, team)?;
    let theirs = opponent(game, team);
    let team_score = ours.score_or_zero();
    let opponent_score = theirs.map(Participant::score_or_zero).unwrap_or_default();

    let outcome = match team_score.cmp(&opponent_score) {
        Ordering::Greater => GameOutcome::Win,
        Ordering::Less => GameOutcome::Loss,
        Ordering::Equal => {
            let flagged = if ours.winner == Some(true) {
                Some(GameOutcome::Win)
            } else if theirs.and_then(|p| p.winner) == Some(true) {
                Some(GameOutcome::Loss)
            } else {
                None
            };
            match ties {
                TiePolicy::Score => GameOutcome::Tie,
                TiePolicy::WinnerFlag => flagged.unwrap_or(GameOutcome::Tie),
                TiePolicy::NoTies => flagged.unwrap_or(GameOutcome::Loss),
            }
        }
    };

    Some(GameResult { outcome, team_score, opponent_score })
}

// ---------------------------------------------------------------------------
// Season-level selection
// ---------------------------------------------------------------------------

pub fn tally_record(games: &[Game], team: &TrackedTeam, ties: TiePolicy) -> SeasonRecord {
    games
        .iter()
        .filter_map(|g| game_result(g, team, ties))
        .fold(SeasonRecord::default(), |mut record, result| {
            record.record(result.outcome);
            record
        })
}

/// Latest final game dated at or before `now`.
pub fn previous_game(games: &[Game], now: DateTime<Utc>) -> Option<&Game> {
    games
        .iter()
        .filter(|g| g.is_final())
        .filter_map(|g| g.start_time.filter(|t| *t <= now).map(|t| (t, g)))
        .max_by_key(|(t, _)| *t)
        .map(|(_, g)| g)
}

/// Earliest scheduled game dated after `now`.
pub fn next_game(games: &[Game], now: DateTime<Utc>) -> Option<&Game> {
    games
        .iter()
        .filter(|g| g.status == GameStatus::Scheduled)
        .filter_map(|g| g.start_time.filter(|t| *t > now).map(|t| (t, g)))
        .min_by_key(|(t, _)| *t)
        .map(|(_, g)| g)
}

/// The in-progress game, if any. A single team only ever has one.
pub fn live_game(games: &[Game]) -> Option<&Game> {
    games.iter().find(|g| g.is_live())
}

/// Classify a whole schedule. An empty schedule is `NoData`, not a zero record.
pub fn summarize(
    schedule: &Schedule,
    team: &TrackedTeam,
    policy: &RecordPolicy,
    now: DateTime<Utc>,
) -> Result<ScheduleStatus, NoData> {
    let games = &schedule.games;
    if games.is_empty() {
        return Err(NoData::EmptySchedule);
    }

    let record = match (policy.source, schedule.reported_record) {
        (RecordSource::Reported, Some(reported)) => reported,
        _ => tally_record(games, team, policy.ties),
    };

    let previous = previous_game(games, now).map(|g| PreviousGame {
        game_id: g.id.clone(),
        opponent: opponent_name(g, team),
        home_away: home_away(g, team),
        result: game_result(g, team, policy.ties),
        date: g.start_time,
    });

    let next = next_game(games, now).and_then(|g| {
        Some(NextGame {
            game_id: g.id.clone(),
            opponent: opponent_name(g, team),
            home_away: home_away(g, team),
            kickoff: g.start_time?,
            network: g.network.clone().unwrap_or_else(|| NETWORK_TBD.to_owned()),
            details_available: g.has_details(),
        })
    });

    let live = live_game(games).map(|g| LiveGame {
        game_id: g.id.clone(),
        opponent: opponent_name(g, team),
        home_away: home_away(g, team),
        status: g.status,
        team_score: tracked_participant(g, team).and_then(|p| p.score),
        opponent_score: opponent(g, team).and_then(|p| p.score),
    });

    Ok(ScheduleStatus {
        undefeated: record.is_undefeated(policy.undefeated),
        record,
        previous,
        next,
        live,
    })
}
