use schedule_api::NoData;
use schedule_api::classify::ScheduleStatus;
use schedule_api::standings::DivisionStandings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkRequest {
    /// Startup load.
    LoadSchedule,
    /// Live-refresh tick: same fetch-classify cycle as a load.
    RefreshSchedule,
    LoadStandings,
}

#[derive(Debug)]
pub enum NetworkResponse {
    /// A full fetch-classify cycle. Replaces everything from the previous cycle.
    ScheduleLoaded { status: ScheduleStatus },
    /// Fetched fine, but nothing to classify.
    ScheduleEmpty { reason: NoData },
    ScheduleFailed { message: String },
    /// None when no standings group lists the tracked team.
    StandingsLoaded { standings: Option<DivisionStandings> },
    StandingsFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    AppStarted,
    CountdownTick,
}
