pub mod classify;
pub mod client;
pub mod countdown;
pub mod espn;
pub mod extract;
pub mod standings;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Domain types, independent of the ESPN wire format
// ---------------------------------------------------------------------------

/// One season's worth of games for the tracked team, as fetched in a single cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schedule {
    pub games: Vec<Game>,
    /// Record as reported by the league, when the payload carries one.
    pub reported_record: Option<SeasonRecord>,
}

impl Schedule {
    pub fn find_game_mut(&mut self, game_id: &str) -> Option<&mut Game> {
        self.games.iter_mut().find(|g| g.id == game_id)
    }

    /// Merge a live update (from the scoreboard or an event summary) into the
    /// matching game. Fields the update lacks are left alone.
    pub fn merge_update(&mut self, update: GameUpdate) {
        let Some(game) = self.find_game_mut(&update.id) else {
            return;
        };
        if let Some(status) = update.status {
            game.status = status;
        }
        if !update.participants.is_empty() {
            game.participants = update.participants;
        }
        if update.start_time.is_some() {
            game.start_time = update.start_time;
        }
        if update.network.is_some() {
            game.network = update.network;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Game {
    pub id: String,
    pub start_time: Option<DateTime<Utc>>,
    pub status: GameStatus,
    /// Empty when the event carried no competition block.
    pub participants: Vec<Participant>,
    pub network: Option<String>,
}

/// Partial game state from a live source. A summary header can omit the status
/// block, so unlike `Game` nothing here defaults.
#[derive(Debug, Clone, Default)]
pub struct GameUpdate {
    pub id: String,
    pub status: Option<GameStatus>,
    pub participants: Vec<Participant>,
    pub start_time: Option<DateTime<Utc>>,
    pub network: Option<String>,
}

impl GameUpdate {
    pub fn lacks_scores(&self) -> bool {
        self.participants.iter().all(|p| p.score.is_none())
    }
}

impl Game {
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    pub fn is_final(&self) -> bool {
        self.status == GameStatus::Final
    }

    /// True when every participant is missing a score.
    pub fn lacks_scores(&self) -> bool {
        self.participants.iter().all(|p| p.score.is_none())
    }

    pub fn has_details(&self) -> bool {
        !self.participants.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Participant {
    pub team: Team,
    pub home_away: HomeAway,
    /// None until the game starts.
    pub score: Option<u16>,
    /// Explicit winner flag from the API, when present.
    pub winner: Option<bool>,
}

impl Participant {
    pub fn score_or_zero(&self) -> u16 {
        self.score.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: String,
    pub name: String,       // "Chicago Bears"
    pub short_name: String, // "Bears"
    pub abbrev: String,     // "CHI"
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeAway {
    Home,
    Away,
    #[default]
    Unknown,
}

impl HomeAway {
    pub fn parse(s: &str) -> Self {
        match s {
            "home" => HomeAway::Home,
            "away" => HomeAway::Away,
            _ => HomeAway::Unknown,
        }
    }

    /// "vs" for home games, "@" otherwise.
    pub fn prefix(&self) -> &'static str {
        match self {
            HomeAway::Home => "vs",
            _ => "@",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    #[default]
    Scheduled,
    InProgress,
    Halftime,
    /// Delays and between-period breaks.
    Delayed,
    Final,
    Postponed,
}

impl GameStatus {
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            GameStatus::InProgress | GameStatus::Halftime | GameStatus::Delayed
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeasonRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl SeasonRecord {
    pub fn new(wins: u32, losses: u32, ties: u32) -> Self {
        Self { wins, losses, ties }
    }

    pub fn record(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Win => self.wins += 1,
            GameOutcome::Loss => self.losses += 1,
            GameOutcome::Tie => self.ties += 1,
        }
    }

    pub fn is_undefeated(&self, rule: UndefeatedRule) -> bool {
        match rule {
            UndefeatedRule::NoLosses => self.losses == 0,
            UndefeatedRule::RequireWin => self.losses == 0 && self.wins > 0,
        }
    }

    /// Parse a league summary string: "3-1" or "3-1-1".
    pub fn parse_summary(summary: &str) -> Option<Self> {
        let parts: Vec<u32> = summary
            .trim()
            .split('-')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [w, l] => Some(Self::new(*w, *l, 0)),
            [w, l, t] => Some(Self::new(*w, *l, *t)),
            _ => None,
        }
    }
}

impl fmt::Display for SeasonRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wins, self.losses)?;
        if self.ties > 0 {
            write!(f, "-{}", self.ties)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameOutcome {
    Win,
    Loss,
    Tie,
}

impl GameOutcome {
    pub fn letter(&self) -> char {
        match self {
            GameOutcome::Win => 'W',
            GameOutcome::Loss => 'L',
            GameOutcome::Tie => 'T',
        }
    }
}

/// The franchise being reported on. Franchises can carry more than one
/// abbreviation over time (GB / GNB).
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackedTeam {
    pub abbreviations: Vec<String>,
    pub id: Option<String>,
}

impl TrackedTeam {
    pub fn new<S: Into<String>>(abbreviations: impl IntoIterator<Item = S>) -> Self {
        Self {
            abbreviations: abbreviations.into_iter().map(Into::into).collect(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn matches(&self, team: &Team) -> bool {
        if let Some(id) = &self.id
            && !team.id.is_empty()
            && *id == team.id
        {
            return true;
        }
        !team.abbrev.is_empty()
            && self
                .abbreviations
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&team.abbrev))
    }
}

// ---------------------------------------------------------------------------
// Record policies
// ---------------------------------------------------------------------------

/// How a final game with equal scores is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TiePolicy {
    /// Equal scores are a tie, whatever the winner flags say. Default so the
    /// tally matches a plain score comparison; use `WinnerFlag` to trust the flag.
    #[default]
    Score,
    /// Equal scores defer to a participant's winner flag; a tie only when neither carries one.
    WinnerFlag,
    /// Wins and losses only: equal scores are a win with the winner flag, a loss otherwise.
    NoTies,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UndefeatedRule {
    /// losses == 0. An empty season counts as undefeated.
    #[default]
    NoLosses,
    /// losses == 0 && wins > 0.
    RequireWin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordSource {
    /// Fold over final games.
    #[default]
    Derived,
    /// League-reported summary, falling back to the fold when absent.
    Reported,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordPolicy {
    pub ties: TiePolicy,
    pub undefeated: UndefeatedRule,
    pub source: RecordSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePolicyError(pub String);

impl fmt::Display for ParsePolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised policy value: {}", self.0)
    }
}

impl std::error::Error for ParsePolicyError {}

impl FromStr for TiePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "score" => Ok(TiePolicy::Score),
            "winner-flag" | "winner" => Ok(TiePolicy::WinnerFlag),
            "no-ties" | "none" => Ok(TiePolicy::NoTies),
            other => Err(ParsePolicyError(other.to_owned())),
        }
    }
}

impl FromStr for RecordSource {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "derived" => Ok(RecordSource::Derived),
            "reported" => Ok(RecordSource::Reported),
            other => Err(ParsePolicyError(other.to_owned())),
        }
    }
}

/// The schedule payload was fetched but holds nothing to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoData {
    EmptySchedule,
}

impl fmt::Display for NoData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoData::EmptySchedule => write!(f, "No games found in schedule"),
        }
    }
}

impl std::error::Error for NoData {}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct StandingsGroup {
    pub name: String,
    pub entries: Vec<StandingsEntry>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StandingsEntry {
    pub team: Team,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub win_percent: f64,
    pub division_record: Option<String>,
    pub playoff_seed: Option<u8>,
}
