use chrono::{DateTime, Local};
use schedule_api::NoData;
use schedule_api::classify::ScheduleStatus;
use schedule_api::standings::DivisionStandings;

// ---------------------------------------------------------------------------
// Schedule state
// ---------------------------------------------------------------------------

/// Result of the latest fetch-classify cycle. Each cycle replaces the whole
/// view; nothing carries over from the previous one.
#[derive(Debug, Clone, Default)]
pub enum ScheduleView {
    #[default]
    Loading,
    Ready(ScheduleStatus),
    /// Fetched, but the payload had nothing to classify.
    NoData(NoData),
    /// Transport or HTTP failure.
    Failed(String),
}

impl ScheduleView {
    pub fn status(&self) -> Option<&ScheduleStatus> {
        match self {
            ScheduleView::Ready(status) => Some(status),
            _ => None,
        }
    }

    /// Message shown in place of every schedule section.
    pub fn placeholder(&self) -> Option<String> {
        match self {
            ScheduleView::Loading => Some("Loading schedule...".to_owned()),
            ScheduleView::Ready(_) => None,
            ScheduleView::NoData(reason) => Some(reason.to_string()),
            ScheduleView::Failed(message) => Some(format!("Unable to load game data ({message})")),
        }
    }
}

// ---------------------------------------------------------------------------
// Standings state
// ---------------------------------------------------------------------------

/// Standings live apart from the schedule; a failure here never touches it.
#[derive(Debug, Clone, Default)]
pub enum StandingsView {
    #[default]
    Disabled,
    Loading,
    Ready(DivisionStandings),
    /// No standings group lists the tracked team.
    NotListed,
    Failed(String),
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub schedule: ScheduleView,
    pub standings: StandingsView,
    /// Local time of the last completed schedule cycle, success or not.
    pub last_updated: Option<DateTime<Local>>,
}

impl AppState {
    pub fn new(standings_enabled: bool) -> Self {
        Self {
            standings: if standings_enabled {
                StandingsView::Loading
            } else {
                StandingsView::Disabled
            },
            ..Self::default()
        }
    }
}
