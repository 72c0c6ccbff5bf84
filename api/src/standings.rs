//! Standings: mapping the nested ESPN response into groups, and ranking the
//! tracked team's division.

use crate::espn::{EspnStandingsEntry, EspnStat, StandingsResponse};
use crate::{StandingsEntry, StandingsGroup, TrackedTeam};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Seeding rules used to label playoff position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayoffFormat {
    pub division_winner_seeds: u8,
    pub playoff_spots: u8,
}

impl Default for PlayoffFormat {
    /// NFL: four division winners, three wild cards per conference.
    fn default() -> Self {
        Self { division_winner_seeds: 4, playoff_spots: 7 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayoffPosition {
    DivisionLeader(u8),
    WildCard(u8),
    OutOfPlayoffs,
    Unseeded,
}

impl PlayoffPosition {
    pub fn from_seed(seed: Option<u8>, format: PlayoffFormat) -> Self {
        match seed {
            Some(s) if s >= 1 && s <= format.division_winner_seeds => PlayoffPosition::DivisionLeader(s),
            Some(s) if s >= 1 && s <= format.playoff_spots => PlayoffPosition::WildCard(s),
            Some(_) => PlayoffPosition::OutOfPlayoffs,
            None => PlayoffPosition::Unseeded,
        }
    }
}

impl fmt::Display for PlayoffPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayoffPosition::DivisionLeader(seed) => write!(f, "Division leader (#{seed} seed)"),
            PlayoffPosition::WildCard(seed) => write!(f, "Wild card (#{seed} seed)"),
            PlayoffPosition::OutOfPlayoffs => write!(f, "Out of playoffs"),
            PlayoffPosition::Unseeded => write!(f, "—"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub entry: StandingsEntry,
    pub position: PlayoffPosition,
    pub is_tracked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DivisionStandings {
    pub name: String,
    pub entries: Vec<RankedEntry>,
}

// ---------------------------------------------------------------------------
// Mapping: ESPN standings → groups
// ---------------------------------------------------------------------------

/// Read standings groups from the known response layouts, deepest first:
/// conference → division children, then single-level children, then a flat
/// top-level table.
pub fn map_standings(raw: &StandingsResponse) -> Vec<StandingsGroup> {
    let children = raw.children.as_deref().unwrap_or_default();

    let divisions: Vec<StandingsGroup> = children
        .iter()
        .flat_map(|conference| conference.children.iter().flatten())
        .filter_map(group_of)
        .collect();
    if !divisions.is_empty() {
        return divisions;
    }

    let conferences: Vec<StandingsGroup> = children.iter().filter_map(group_of).collect();
    if !conferences.is_empty() {
        return conferences;
    }

    group_of(raw).into_iter().collect()
}

fn group_of(node: &StandingsResponse) -> Option<StandingsGroup> {
    let entries = node.standings.as_ref()?.entries.as_deref()?;
    if entries.is_empty() {
        return None;
    }
    Some(StandingsGroup {
        name: node.name.clone().unwrap_or_default(),
        entries: entries.iter().map(map_entry).collect(),
    })
}

fn map_entry(raw: &EspnStandingsEntry) -> StandingsEntry {
    let stats = raw.stats.as_deref().unwrap_or_default();
    let count = |name: &str| stat_value(stats, name).map(|v| v.max(0.0) as u32).unwrap_or_default();

    let wins = count("wins");
    let losses = count("losses");
    let ties = count("ties");

    let win_percent = stat_value(stats, "winPercent")
        .unwrap_or_else(|| computed_win_percent(wins, losses, ties));

    let playoff_seed = stat_value(stats, "playoffSeed")
        .filter(|v| *v >= 1.0 && *v <= f64::from(u8::MAX))
        .map(|v| v as u8);

    StandingsEntry {
        team: crate::client::map_team(raw.team.as_ref()),
        wins,
        losses,
        ties,
        win_percent,
        division_record: division_record(stats),
        playoff_seed,
    }
}

fn find_stat<'a>(stats: &'a [EspnStat], name: &str) -> Option<&'a EspnStat> {
    stats.iter().find(|s| s.name.as_deref() == Some(name))
}

fn stat_value(stats: &[EspnStat], name: &str) -> Option<f64> {
    let stat = find_stat(stats, name)?;
    stat.value.or_else(|| {
        stat.display_value
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
    })
}

fn division_record(stats: &[EspnStat]) -> Option<String> {
    let stat = find_stat(stats, "divisionRecord")
        .or_else(|| stats.iter().find(|s| s.stat_type.as_deref() == Some("vsdiv")))?;
    stat.summary.clone().or_else(|| stat.display_value.clone())
}

/// Ties count as half a win.
fn computed_win_percent(wins: u32, losses: u32, ties: u32) -> f64 {
    let played = wins + losses + ties;
    if played == 0 {
        return 0.0;
    }
    (f64::from(wins) + f64::from(ties) / 2.0) / f64::from(played)
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rank the group containing the tracked team. `None` when no group has it.
pub fn division_table(
    groups: Vec<StandingsGroup>,
    team: &TrackedTeam,
    format: PlayoffFormat,
) -> Option<DivisionStandings> {
    let group = groups
        .into_iter()
        .find(|g| g.entries.iter().any(|e| team.matches(&e.team)))?;

    let mut entries = group.entries;
    entries.sort_by(compare_entries);

    let entries = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| RankedEntry {
            rank: i + 1,
            position: PlayoffPosition::from_seed(entry.playoff_seed, format),
            is_tracked: team.matches(&entry.team),
            entry,
        })
        .collect();

    Some(DivisionStandings { name: group.name, entries })
}

fn compare_entries(a: &StandingsEntry, b: &StandingsEntry) -> Ordering {
    b.win_percent
        .total_cmp(&a.win_percent)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| a.losses.cmp(&b.losses))
}
