use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, ScheduleView, StandingsView};
use crate::state::refresher::RefreshMode;
use chrono::Local;
use log::warn;
use schedule_api::NoData;
use schedule_api::classify::ScheduleStatus;
use schedule_api::standings::DivisionStandings;

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let state = AppState::new(settings.endpoints.standings.is_some());
        Self { settings, state }
    }

    pub fn standings_enabled(&self) -> bool {
        self.settings.endpoints.standings.is_some()
    }

    /// Team label for headings: the first configured abbreviation.
    pub fn team_label(&self) -> &str {
        self.settings
            .team
            .abbreviations
            .first()
            .map(String::as_str)
            .unwrap_or("team")
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_loop
    // -----------------------------------------------------------------------

    /// Returns true when a new game has gone final since the last cycle, which
    /// is when standings are worth re-fetching.
    pub fn on_schedule_loaded(&mut self, status: ScheduleStatus) -> bool {
        let previous_id = |view: &ScheduleView| {
            view.status()
                .and_then(|s| s.previous.as_ref())
                .map(|p| p.game_id.clone())
        };
        let before = previous_id(&self.state.schedule);
        let had_status = self.state.schedule.status().is_some();

        self.state.schedule = ScheduleView::Ready(status);
        self.state.last_updated = Some(Local::now());

        had_status && self.standings_enabled() && before != previous_id(&self.state.schedule)
    }

    pub fn on_schedule_empty(&mut self, reason: NoData) {
        self.state.schedule = ScheduleView::NoData(reason);
        self.state.last_updated = Some(Local::now());
    }

    pub fn on_schedule_failed(&mut self, message: String) {
        self.state.schedule = ScheduleView::Failed(message);
        self.state.last_updated = Some(Local::now());
    }

    pub fn on_standings_loaded(&mut self, standings: Option<DivisionStandings>) {
        self.state.standings = match standings {
            Some(table) => StandingsView::Ready(table),
            None => StandingsView::NotListed,
        };
    }

    /// A table that loaded earlier stays on screen; only a first failure shows.
    pub fn on_standings_failed(&mut self, message: String) {
        if let StandingsView::Ready(_) = self.state.standings {
            warn!("keeping previous standings after refresh failure: {message}");
            return;
        }
        self.state.standings = StandingsView::Failed(message);
    }

    /// Timer state the latest cycle calls for. None leaves the current timers
    /// running, so a failed live refresh is retried on the next tick.
    pub fn refresh_mode(&self) -> Option<RefreshMode> {
        match &self.state.schedule {
            ScheduleView::Ready(status) => Some(RefreshMode::for_status(status)),
            ScheduleView::NoData(_) => Some(RefreshMode::Idle),
            ScheduleView::Loading | ScheduleView::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use schedule_api::classify::{LiveGame, NextGame, PreviousGame};
    use schedule_api::{GameStatus, HomeAway, SeasonRecord};

    fn app() -> App {
        App::new(AppSettings::default())
    }

    fn previous(id: &str) -> PreviousGame {
        PreviousGame {
            game_id: id.into(),
            opponent: "Chicago Bears".into(),
            home_away: HomeAway::Home,
            result: None,
            date: Some(Utc::now() - Duration::days(7)),
        }
    }

    fn status_with_previous(id: &str) -> ScheduleStatus {
        ScheduleStatus {
            record: SeasonRecord::new(1, 0, 0),
            undefeated: true,
            previous: Some(previous(id)),
            ..ScheduleStatus::default()
        }
    }

    #[test]
    fn first_load_does_not_ask_for_standings() {
        let mut app = app();
        assert!(!app.on_schedule_loaded(status_with_previous("1")));
        assert!(app.state.last_updated.is_some());
    }

    #[test]
    fn newly_final_game_asks_for_standings() {
        let mut app = app();
        app.on_schedule_loaded(status_with_previous("1"));
        assert!(!app.on_schedule_loaded(status_with_previous("1")));
        assert!(app.on_schedule_loaded(status_with_previous("2")));
    }

    #[test]
    fn disabled_standings_are_never_refreshed() {
        let mut settings = AppSettings::default();
        settings.endpoints.standings = None;
        let mut app = App::new(settings);
        assert!(matches!(app.state.standings, StandingsView::Disabled));
        app.on_schedule_loaded(status_with_previous("1"));
        assert!(!app.on_schedule_loaded(status_with_previous("2")));
    }

    #[test]
    fn refresh_mode_tracks_the_latest_cycle() {
        let mut app = app();
        assert_eq!(app.refresh_mode(), None);

        let kickoff = Utc::now() + Duration::days(2);
        app.on_schedule_loaded(ScheduleStatus {
            next: Some(NextGame {
                game_id: "3".into(),
                opponent: "Detroit Lions".into(),
                home_away: HomeAway::Away,
                kickoff,
                network: "FOX".into(),
                details_available: true,
            }),
            ..ScheduleStatus::default()
        });
        assert_eq!(app.refresh_mode(), Some(RefreshMode::Countdown { kickoff }));

        app.on_schedule_loaded(ScheduleStatus {
            live: Some(LiveGame {
                game_id: "3".into(),
                opponent: "Detroit Lions".into(),
                home_away: HomeAway::Away,
                status: GameStatus::Halftime,
                team_score: Some(14),
                opponent_score: Some(7),
            }),
            ..ScheduleStatus::default()
        });
        assert_eq!(app.refresh_mode(), Some(RefreshMode::LiveRefresh));

        app.on_schedule_failed("connection reset".into());
        assert_eq!(app.refresh_mode(), None);

        app.on_schedule_empty(NoData::EmptySchedule);
        assert_eq!(app.refresh_mode(), Some(RefreshMode::Idle));
    }

    #[test]
    fn standings_failure_keeps_a_loaded_table() {
        let mut app = app();
        app.on_standings_failed("500".into());
        assert!(matches!(app.state.standings, StandingsView::Failed(_)));

        app.on_standings_loaded(Some(DivisionStandings {
            name: "NFC North".into(),
            entries: Vec::new(),
        }));
        app.on_standings_failed("500".into());
        assert!(matches!(app.state.standings, StandingsView::Ready(_)));

        app.on_standings_loaded(None);
        assert!(matches!(app.state.standings, StandingsView::NotListed));
    }

    #[test]
    fn team_label_uses_first_abbreviation() {
        assert_eq!(app().team_label(), "GB");
    }
}
