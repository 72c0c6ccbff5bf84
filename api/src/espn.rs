//! Serde shapes for the ESPN schedule, scoreboard, summary and standings
//! payloads. `client.rs` maps them into the domain types. Every field is
//! optional: ESPN omits blocks freely and a missing block must never fail a
//! whole payload.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Team schedule  (site v2 API)
// ---------------------------------------------------------------------------

/// Either `{ events }` or `{ team: { events, nextEvent, record } }` depending
/// on which team endpoint served it.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScheduleResponse {
    pub events: Option<Vec<EspnEvent>>,
    pub team: Option<EspnTeamEnvelope>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EspnTeamEnvelope {
    pub id: Option<String>,
    pub abbreviation: Option<String>,
    pub display_name: Option<String>,
    pub record_summary: Option<String>,
    pub record: Option<EspnTeamRecord>,
    pub events: Option<Vec<EspnEvent>>,
    pub next_event: Option<Vec<EspnEvent>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnTeamRecord {
    pub items: Option<Vec<EspnRecordItem>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnRecordItem {
    pub summary: Option<String>,
    pub stats: Option<Vec<EspnStat>>,
}

// ---------------------------------------------------------------------------
// Scoreboard  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScoreboardResponse {
    pub events: Option<Vec<EspnEvent>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>, // ISO 8601, sometimes without seconds
    pub status: Option<EspnStatus>,
    pub competitions: Option<Vec<EspnCompetition>>,
}

impl EspnEvent {
    pub fn competition(&self) -> Option<&EspnCompetition> {
        self.competitions.as_deref().and_then(|c| c.first())
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnStatus {
    #[serde(rename = "type")]
    pub status_type: Option<EspnStatusType>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnStatusType {
    pub name: Option<String>,  // "STATUS_SCHEDULED", "STATUS_IN_PROGRESS", "STATUS_FINAL"
    pub state: Option<String>, // "pre", "in", "post"
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EspnCompetition {
    pub id: Option<String>,
    pub date: Option<String>,
    pub status: Option<EspnStatus>,
    pub competitors: Option<Vec<EspnCompetitor>>,
    pub broadcasts: Option<Vec<EspnBroadcast>>,
    pub geo_broadcasts: Option<Vec<EspnGeoBroadcast>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnCompetitor {
    pub id: Option<String>,
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>,
    pub team: Option<EspnTeam>,
    pub score: Option<EspnScore>,
    pub winner: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EspnTeam {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub name: Option<String>,
    pub short_display_name: Option<String>,
    pub abbreviation: Option<String>,
    /// Older payloads hang the score off the team object.
    pub score: Option<EspnScore>,
}

/// The scoreboard sends scores as strings, the team schedule as
/// `{ value, displayValue }` objects, and a few feeds as bare numbers.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum EspnScore {
    Text(String),
    Number(f64),
    Detail(EspnScoreDetail),
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EspnScoreDetail {
    pub value: Option<f64>,
    pub display_value: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnBroadcast {
    pub network: Option<String>,
    pub names: Option<Vec<String>>,
    pub media: Option<EspnMedia>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnGeoBroadcast {
    pub media: Option<EspnMedia>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EspnMedia {
    pub short_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Game summary  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SummaryResponse {
    pub header: Option<EspnSummaryHeader>,
}

/// The summary header is event-shaped: an id plus competitions carrying
/// status and competitors.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnSummaryHeader {
    pub id: Option<String>,
    pub competitions: Option<Vec<EspnCompetition>>,
}

// ---------------------------------------------------------------------------
// Standings  (v2 API)
// ---------------------------------------------------------------------------

/// League → conference → division nesting. Only the three documented levels
/// are read; deeper nesting is ignored.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct StandingsResponse {
    pub name: Option<String>,
    pub standings: Option<EspnStandings>,
    pub children: Option<Vec<StandingsResponse>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnStandings {
    pub entries: Option<Vec<EspnStandingsEntry>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnStandingsEntry {
    pub team: Option<EspnTeam>,
    pub stats: Option<Vec<EspnStat>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EspnStat {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub stat_type: Option<String>,
    pub value: Option<f64>,
    pub display_value: Option<String>,
    pub summary: Option<String>,
}
