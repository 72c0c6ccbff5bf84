//! Ordered extraction strategies for fields ESPN scatters across payload shapes.
//!
//! Each strategy looks in one place and returns `None` when the value isn't
//! there; the first strategy that finds something wins.

use crate::GameStatus;
use crate::espn::{EspnCompetition, EspnCompetitor, EspnEvent, EspnScore, EspnStatusType};

pub type Strategy<S, T> = fn(&S) -> Option<T>;

/// Run `strategies` in order against `source`, returning the first present value.
pub fn first_present<S, T>(source: &S, strategies: &[Strategy<S, T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(source))
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

// ---------------------------------------------------------------------------
// Broadcast network
// ---------------------------------------------------------------------------

const NETWORK_STRATEGIES: &[Strategy<EspnCompetition, String>] = &[
    broadcast_network,
    broadcast_names,
    broadcast_media,
    geo_broadcast_media,
];

/// Network carrying the game, or `None` if no broadcast block names one.
pub fn network(competition: &EspnCompetition) -> Option<String> {
    first_present(competition, NETWORK_STRATEGIES)
}

fn first_broadcast(c: &EspnCompetition) -> Option<&crate::espn::EspnBroadcast> {
    c.broadcasts.as_deref().and_then(|b| b.first())
}

fn broadcast_network(c: &EspnCompetition) -> Option<String> {
    non_empty(first_broadcast(c)?.network.as_deref())
}

fn broadcast_names(c: &EspnCompetition) -> Option<String> {
    let names = first_broadcast(c)?.names.as_deref()?;
    names.iter().find_map(|n| non_empty(Some(n.as_str())))
}

fn broadcast_media(c: &EspnCompetition) -> Option<String> {
    non_empty(first_broadcast(c)?.media.as_ref()?.short_name.as_deref())
}

fn geo_broadcast_media(c: &EspnCompetition) -> Option<String> {
    let geo = c.geo_broadcasts.as_deref()?.first()?;
    non_empty(geo.media.as_ref()?.short_name.as_deref())
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

const SCORE_STRATEGIES: &[Strategy<EspnCompetitor, u16>] = &[competitor_score, team_score];

/// Competitor's score. A field that is present but unparseable reads as 0;
/// `None` means no score field was found at all.
pub fn score(competitor: &EspnCompetitor) -> Option<u16> {
    first_present(competitor, SCORE_STRATEGIES)
}

fn competitor_score(c: &EspnCompetitor) -> Option<u16> {
    c.score.as_ref().map(score_value)
}

fn team_score(c: &EspnCompetitor) -> Option<u16> {
    c.team.as_ref()?.score.as_ref().map(score_value)
}

fn score_value(score: &EspnScore) -> u16 {
    match score {
        EspnScore::Text(text) => parse_score_text(text),
        EspnScore::Number(n) => clamp_score(*n),
        EspnScore::Detail(detail) => match (detail.value, detail.display_value.as_deref()) {
            (Some(v), _) => clamp_score(v),
            (None, Some(text)) => parse_score_text(text),
            (None, None) => 0,
        },
    }
}

/// "24" → 24, "24.0" → 24, "N/A" → 0.
pub fn parse_score_text(text: &str) -> u16 {
    let text = text.trim();
    text.parse::<u16>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(clamp_score))
        .unwrap_or(0)
}

fn clamp_score(n: f64) -> u16 {
    if n.is_finite() && n > 0.0 {
        n.min(f64::from(u16::MAX)) as u16
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

const STATUS_STRATEGIES: &[Strategy<EspnEvent, GameStatus>] = &[competition_status, event_status];

/// Competition status first (the team schedule puts it there), then the
/// event-level status (the scoreboard does). None when neither is recognizable.
pub fn reported_status(event: &EspnEvent) -> Option<GameStatus> {
    first_present(event, STATUS_STRATEGIES)
}

fn competition_status(e: &EspnEvent) -> Option<GameStatus> {
    let t = e.competition()?.status.as_ref()?.status_type.as_ref()?;
    status_from_type(t)
}

fn event_status(e: &EspnEvent) -> Option<GameStatus> {
    let t = e.status.as_ref()?.status_type.as_ref()?;
    status_from_type(t)
}

pub fn status_from_type(t: &EspnStatusType) -> Option<GameStatus> {
    t.name
        .as_deref()
        .and_then(parse_status)
        .or_else(|| t.state.as_deref().and_then(parse_state))
        .or_else(|| t.completed.filter(|done| *done).map(|_| GameStatus::Final))
}

pub fn parse_status(s: &str) -> Option<GameStatus> {
    let status = match s {
        "STATUS_SCHEDULED" | "STATUS_PRE_GAME" => GameStatus::Scheduled,
        "STATUS_IN_PROGRESS" => GameStatus::InProgress,
        "STATUS_HALFTIME" => GameStatus::Halftime,
        "STATUS_END_PERIOD" | "STATUS_DELAYED" | "STATUS_RAIN_DELAY" => GameStatus::Delayed,
        "STATUS_FINAL" | "STATUS_FINAL_OT" | "STATUS_FINAL_PEN" => GameStatus::Final,
        "STATUS_POSTPONED" | "STATUS_CANCELED" | "STATUS_CANCELLED" | "STATUS_SUSPENDED" => {
            GameStatus::Postponed
        }
        _ => return None,
    };
    Some(status)
}

fn parse_state(s: &str) -> Option<GameStatus> {
    match s {
        "pre" => Some(GameStatus::Scheduled),
        "in" => Some(GameStatus::InProgress),
        "post" => Some(GameStatus::Final),
        _ => None,
    }
}
