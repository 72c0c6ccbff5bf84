use crate::state::refresher::RefreshSettings;
use log::LevelFilter;
use schedule_api::client::Endpoints;
use schedule_api::standings::PlayoffFormat;
use schedule_api::{RecordPolicy, TrackedTeam, UndefeatedRule};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_ABBREVIATIONS: [&str; 2] = ["GB", "GNB"];
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub team: TrackedTeam,
    pub endpoints: Endpoints,
    pub record_policy: RecordPolicy,
    pub refresh: RefreshSettings,
    pub request_timeout: Duration,
    pub playoff_format: PlayoffFormat,
    pub log_level: Option<LevelFilter>,
    /// Invalid values that fell back to defaults. Logged once the logger is up.
    pub warnings: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            team: TrackedTeam::new(DEFAULT_ABBREVIATIONS),
            endpoints: Endpoints::default(),
            record_policy: RecordPolicy::default(),
            refresh: RefreshSettings::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            playoff_format: PlayoffFormat::default(),
            log_level: None,
            warnings: Vec::new(),
        }
    }
}

impl AppSettings {
    /// Settings from `UNDEFEATED_*` environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned());

        if let Some(raw) = get("UNDEFEATED_TEAM_ABBREVIATIONS") {
            let abbreviations: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_owned)
                .collect();
            if abbreviations.is_empty() {
                settings.warn("UNDEFEATED_TEAM_ABBREVIATIONS", &raw);
            } else {
                settings.team.abbreviations = abbreviations;
            }
        }
        settings.team.id = get("UNDEFEATED_TEAM_ID").filter(|id| !id.is_empty());

        if let Some(url) = get("UNDEFEATED_SCHEDULE_URL").filter(|u| !u.is_empty()) {
            settings.endpoints.schedule = url;
        }
        if let Some(url) = get("UNDEFEATED_SCOREBOARD_URL").filter(|u| !u.is_empty()) {
            settings.endpoints.scoreboard = url;
        }
        if let Some(url) = get("UNDEFEATED_SUMMARY_URL").filter(|u| !u.is_empty()) {
            settings.endpoints.summary = url;
        }
        // Present but empty turns standings off.
        if let Some(url) = get("UNDEFEATED_STANDINGS_URL") {
            settings.endpoints.standings = Some(url).filter(|u| !u.is_empty());
        }

        if let Some(d) = settings.parse_millis(get("UNDEFEATED_LIVE_REFRESH_MS"), "UNDEFEATED_LIVE_REFRESH_MS") {
            settings.refresh.live_interval = d;
        }
        if let Some(d) = settings.parse_millis(get("UNDEFEATED_COUNTDOWN_TICK_MS"), "UNDEFEATED_COUNTDOWN_TICK_MS") {
            settings.refresh.countdown_tick = d;
        }
        if let Some(d) = settings.parse_millis(get("UNDEFEATED_REQUEST_TIMEOUT_MS"), "UNDEFEATED_REQUEST_TIMEOUT_MS") {
            settings.request_timeout = d;
        }

        if let Some(raw) = get("UNDEFEATED_REQUIRE_WIN") {
            match parse_bool(&raw) {
                Some(true) => settings.record_policy.undefeated = UndefeatedRule::RequireWin,
                Some(false) => settings.record_policy.undefeated = UndefeatedRule::NoLosses,
                None => settings.warn("UNDEFEATED_REQUIRE_WIN", &raw),
            }
        }
        if let Some(ties) = settings.parse_value(get("UNDEFEATED_TIE_POLICY"), "UNDEFEATED_TIE_POLICY") {
            settings.record_policy.ties = ties;
        }
        if let Some(source) = settings.parse_value(get("UNDEFEATED_RECORD_SOURCE"), "UNDEFEATED_RECORD_SOURCE") {
            settings.record_policy.source = source;
        }
        settings.log_level = settings.parse_value(get("UNDEFEATED_LOG_LEVEL"), "UNDEFEATED_LOG_LEVEL");

        settings
    }

    fn warn(&mut self, key: &str, raw: &str) {
        self.warnings
            .push(format!("ignoring invalid {key}={raw:?}, using default"));
    }

    fn parse_value<T: FromStr>(&mut self, raw: Option<String>, key: &str) -> Option<T> {
        let raw = raw?;
        let parsed = raw.parse::<T>().ok();
        if parsed.is_none() {
            self.warn(key, &raw);
        }
        parsed
    }

    /// Positive millisecond counts only; a zero interval would spin.
    fn parse_millis(&mut self, raw: Option<String>, key: &str) -> Option<Duration> {
        let raw = raw?;
        match raw.parse::<u64>() {
            Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
            _ => {
                self.warn(key, &raw);
                None
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
