use crate::espn::{
    EspnCompetitor, EspnEvent, EspnTeam, EspnTeamEnvelope, ScheduleResponse, ScoreboardResponse,
    StandingsResponse, SummaryResponse,
};
use crate::{Game, GameUpdate, HomeAway, Participant, Schedule, SeasonRecord, StandingsGroup, Team, extract};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const ESPN_NFL_SITE_V2: &str = "https://site.api.espn.com/apis/site/v2/sports/football/nfl";
const ESPN_NFL_V2: &str = "https://site.api.espn.com/apis/v2/sports/football/nfl";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where each payload comes from. Defaults track the Green Bay Packers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub schedule: String,
    pub scoreboard: String,
    /// Single-event summary; `?event={id}` is appended.
    pub summary: String,
    /// Division-level table (`level=3`). None disables standings.
    pub standings: Option<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            schedule: format!("{ESPN_NFL_SITE_V2}/teams/gb/schedule"),
            scoreboard: format!("{ESPN_NFL_SITE_V2}/scoreboard"),
            summary: format!("{ESPN_NFL_SITE_V2}/summary"),
            standings: Some(format!("{ESPN_NFL_V2}/standings?level=3")),
        }
    }
}

/// Schedule/scoreboard/standings client backed by ESPN's public endpoints.
#[derive(Debug, Clone)]
pub struct ScheduleApi {
    client: Client,
    timeout: Duration,
    endpoints: Endpoints,
}

impl Default for ScheduleApi {
    fn default() -> Self {
        Self::new(Endpoints::default())
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            ApiError::NotFound(_) => None,
        }
    }
}

impl ScheduleApi {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            client: Client::builder()
                .user_agent("undefeated/0.1 (season tracker)")
                .build()
                .unwrap_or_default(),
            timeout: DEFAULT_TIMEOUT,
            endpoints,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetch the tracked team's season schedule.
    pub async fn fetch_schedule(&self) -> ApiResult<Schedule> {
        let raw: ScheduleResponse = self.get(&self.endpoints.schedule).await?;
        Ok(map_schedule(raw))
    }

    /// Fetch the league-wide scoreboard for the current week.
    pub async fn fetch_scoreboard(&self) -> ApiResult<Vec<GameUpdate>> {
        let raw: ScoreboardResponse = self.get(&self.endpoints.scoreboard).await?;
        let games = raw
            .events
            .unwrap_or_default()
            .iter()
            .map(map_event_to_update)
            .collect();
        Ok(games)
    }

    /// Fetch a single event's summary, reduced to status and competitors.
    /// The header may omit the status, which is then left unset.
    pub async fn fetch_event_summary(&self, event_id: &str) -> ApiResult<GameUpdate> {
        let url = with_query(&self.endpoints.summary, "event", event_id);
        let raw: SummaryResponse = self.get(&url).await?;
        let header = raw
            .header
            .ok_or_else(|| ApiError::NotFound(format!("no summary header for event {event_id}")))?;
        let event = EspnEvent {
            id: header.id.or_else(|| Some(event_id.to_owned())),
            competitions: header.competitions,
            ..Default::default()
        };
        Ok(map_event_to_update(&event))
    }

    /// Current state of a live event: the scoreboard first, the event summary
    /// when the scoreboard doesn't list it or carries no scores for it. If both
    /// fail, the error names both sources.
    pub async fn fetch_live_game(&self, event_id: &str) -> ApiResult<GameUpdate> {
        let scoreboard_error = match self.fetch_scoreboard().await {
            Ok(games) => {
                if let Some(game) = games.into_iter().find(|g| g.id == event_id)
                    && !game.lacks_scores()
                {
                    return Ok(game);
                }
                None
            }
            Err(e) => Some(e),
        };

        match (self.fetch_event_summary(event_id).await, scoreboard_error) {
            (Err(summary), Some(scoreboard)) => Err(ApiError::NotFound(format!(
                "live scores for event {event_id}: scoreboard: {scoreboard}; summary: {summary}"
            ))),
            (result, _) => result,
        }
    }

    /// Fetch standings groups (divisions when the payload nests them).
    pub async fn fetch_standings(&self) -> ApiResult<Vec<StandingsGroup>> {
        let url = self
            .endpoints
            .standings
            .as_deref()
            .ok_or_else(|| ApiError::NotFound("no standings endpoint configured".into()))?;
        let raw: StandingsResponse = self.get(url).await?;
        Ok(crate::standings::map_standings(&raw))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}

fn with_query(base: &str, key: &str, value: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{key}={value}")
}

// ---------------------------------------------------------------------------
// Mapping: ESPN wire types → clean domain types
// ---------------------------------------------------------------------------

/// Map either schedule payload shape. Games come from `events`, then the team
/// envelope's `events` and `nextEvent`, de-duplicated by id.
fn map_schedule(raw: ScheduleResponse) -> Schedule {
    let reported_record = raw.team.as_ref().and_then(reported_record);

    let envelope = raw.team.unwrap_or_default();
    let events = raw
        .events
        .into_iter()
        .flatten()
        .chain(envelope.events.into_iter().flatten())
        .chain(envelope.next_event.into_iter().flatten());

    let mut seen = HashSet::new();
    let games = events
        .map(|e| map_event_to_game(&e))
        .filter(|g| g.id.is_empty() || seen.insert(g.id.clone()))
        .collect();

    Schedule { games, reported_record }
}

/// Record stats first, then the summary strings.
fn reported_record(team: &EspnTeamEnvelope) -> Option<SeasonRecord> {
    let item = team
        .record
        .as_ref()
        .and_then(|r| r.items.as_deref())
        .and_then(|items| items.first());

    let from_stats = item.and_then(|i| i.stats.as_deref()).and_then(|stats| {
        let get = |name: &str| {
            stats
                .iter()
                .find(|s| s.name.as_deref() == Some(name))
                .and_then(|s| s.value)
                .map(|v| v.max(0.0) as u32)
        };
        Some(SeasonRecord::new(get("wins")?, get("losses")?, get("ties").unwrap_or(0)))
    });

    from_stats
        .or_else(|| {
            item.and_then(|i| i.summary.as_deref())
                .and_then(SeasonRecord::parse_summary)
        })
        .or_else(|| {
            team.record_summary
                .as_deref()
                .and_then(SeasonRecord::parse_summary)
        })
}

/// Map an event for the schedule; a missing status reads as scheduled.
pub fn map_event_to_game(event: &EspnEvent) -> Game {
    let update = map_event_to_update(event);
    Game {
        id: update.id,
        start_time: update.start_time,
        status: update.status.unwrap_or_default(),
        participants: update.participants,
        network: update.network,
    }
}

/// Map an event from a live source, keeping an absent status absent.
pub fn map_event_to_update(event: &EspnEvent) -> GameUpdate {
    let competition = event.competition();

    let start_time = event
        .date
        .as_deref()
        .or_else(|| competition.and_then(|c| c.date.as_deref()))
        .and_then(parse_event_date);

    let participants = competition
        .and_then(|c| c.competitors.as_deref())
        .unwrap_or_default()
        .iter()
        .map(map_competitor)
        .collect();

    GameUpdate {
        id: event.id.clone().unwrap_or_default(),
        start_time,
        status: extract::reported_status(event),
        participants,
        network: competition.and_then(extract::network),
    }
}

/// ESPN dates are RFC 3339, except when they drop the seconds ("2025-09-07T20:25Z").
fn parse_event_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%MZ")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn map_competitor(c: &EspnCompetitor) -> Participant {
    Participant {
        team: map_team(c.team.as_ref()),
        home_away: c
            .home_away
            .as_deref()
            .map(HomeAway::parse)
            .unwrap_or_default(),
        score: extract::score(c),
        winner: c.winner,
    }
}

/// Display name falls back through `displayName`, `name`, `shortDisplayName`.
pub fn map_team(team: Option<&EspnTeam>) -> Team {
    let Some(t) = team else {
        return Team::default();
    };
    let name = [&t.display_name, &t.name, &t.short_display_name]
        .into_iter()
        .flatten()
        .find(|n| !n.trim().is_empty())
        .cloned()
        .unwrap_or_default();
    Team {
        id: t.id.clone().unwrap_or_default(),
        short_name: t
            .short_display_name
            .clone()
            .unwrap_or_else(|| name.clone()),
        name,
        abbrev: t.abbreviation.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameStatus;
    use chrono::TimeZone;
    use mockito::Matcher;
    use serde_json::{Value, json};

    fn competitor(abbrev: &str, name: &str, home_away: &str, score: Value) -> Value {
        json!({
            "id": abbrev,
            "homeAway": home_away,
            "team": { "id": abbrev, "abbreviation": abbrev, "displayName": name },
            "score": score,
        })
    }

    fn event(id: &str, date: &str, status: &str, competitors: Vec<Value>) -> Value {
        json!({
            "id": id,
            "date": date,
            "competitions": [{
                "status": { "type": { "name": status } },
                "competitors": competitors,
                "broadcasts": [{ "media": { "shortName": "FOX" } }],
            }],
        })
    }

    fn api_for(server: &mockito::Server) -> ScheduleApi {
        let base = server.url();
        ScheduleApi::new(Endpoints {
            schedule: format!("{base}/teams/gb/schedule"),
            scoreboard: format!("{base}/scoreboard"),
            summary: format!("{base}/summary"),
            standings: Some(format!("{base}/standings")),
        })
    }

    #[test]
    fn event_dates_without_seconds_parse() {
        let expected = Utc.with_ymd_and_hms(2025, 9, 7, 20, 25, 0).unwrap();
        assert_eq!(parse_event_date("2025-09-07T20:25Z"), Some(expected));
        assert_eq!(parse_event_date("2025-09-07T20:25:00Z"), Some(expected));
        assert_eq!(parse_event_date("next sunday"), None);
    }

    #[test]
    fn summary_query_respects_existing_params() {
        assert_eq!(with_query("http://x/summary", "event", "1"), "http://x/summary?event=1");
        assert_eq!(with_query("http://x/summary?lang=en", "event", "1"), "http://x/summary?lang=en&event=1");
    }

    #[test]
    fn schedule_object_scores_and_home_away_map() {
        let raw: ScheduleResponse = serde_json::from_value(json!({
            "events": [event(
                "401",
                "2025-09-07T20:25Z",
                "STATUS_FINAL",
                vec![
                    competitor("GB", "Green Bay Packers", "home", json!({ "value": 27.0, "displayValue": "27" })),
                    competitor("DET", "Detroit Lions", "away", json!({ "value": 13.0, "displayValue": "13" })),
                ],
            )],
        }))
        .unwrap();

        let schedule = map_schedule(raw);
        assert_eq!(schedule.games.len(), 1);
        let game = &schedule.games[0];
        assert_eq!(game.status, GameStatus::Final);
        assert_eq!(game.network.as_deref(), Some("FOX"));
        assert_eq!(game.participants[0].home_away, HomeAway::Home);
        assert_eq!(game.participants[0].score, Some(27));
        assert_eq!(game.participants[1].team.name, "Detroit Lions");
        assert_eq!(game.participants[1].score, Some(13));
    }

    #[test]
    fn team_envelope_merges_next_event_and_reads_record() {
        let past = event("1", "2025-09-07T20:25Z", "STATUS_FINAL", vec![]);
        let next = event("2", "2025-09-14T17:00Z", "STATUS_SCHEDULED", vec![]);
        let raw: ScheduleResponse = serde_json::from_value(json!({
            "team": {
                "abbreviation": "GB",
                "recordSummary": "1-0",
                "record": { "items": [{ "summary": "1-0", "stats": [
                    { "name": "wins", "value": 1.0 },
                    { "name": "losses", "value": 0.0 },
                    { "name": "ties", "value": 0.0 },
                ] }] },
                "events": [past, next.clone()],
                "nextEvent": [next],
            },
        }))
        .unwrap();

        let schedule = map_schedule(raw);
        let ids: Vec<&str> = schedule.games.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(schedule.reported_record, Some(SeasonRecord::new(1, 0, 0)));
    }

    #[test]
    fn reported_record_falls_back_to_summary_string() {
        let envelope: EspnTeamEnvelope =
            serde_json::from_value(json!({ "recordSummary": "4-2-1" })).unwrap();
        assert_eq!(reported_record(&envelope), Some(SeasonRecord::new(4, 2, 1)));
        assert_eq!(reported_record(&EspnTeamEnvelope::default()), None);
    }

    #[test]
    fn event_without_competitions_maps_to_bare_game() {
        let raw: EspnEvent = serde_json::from_value(json!({ "id": "7" })).unwrap();
        let game = map_event_to_game(&raw);
        assert_eq!(game.id, "7");
        assert!(!game.has_details());
        assert_eq!(game.status, GameStatus::Scheduled);
        assert!(game.start_time.is_none());
    }

    #[test]
    fn team_name_falls_back_through_name_fields() {
        let t = EspnTeam {
            name: Some("Bears".into()),
            abbreviation: Some("CHI".into()),
            ..Default::default()
        };
        let team = map_team(Some(&t));
        assert_eq!(team.name, "Bears");
        assert_eq!(team.short_name, "Bears");
        assert_eq!(map_team(None), Team::default());
    }

    #[tokio::test]
    async fn fetch_schedule_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "events": [event(
                "401",
                "2025-09-07T20:25Z",
                "STATUS_FINAL",
                vec![
                    competitor("GB", "Green Bay Packers", "home", json!("24")),
                    competitor("CHI", "Chicago Bears", "away", json!("N/A")),
                ],
            )],
        });
        let mock = server
            .mock("GET", "/teams/gb/schedule")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let schedule = api_for(&server).fetch_schedule().await.expect("schedule");
        mock.assert_async().await;
        assert_eq!(schedule.games[0].participants[0].score, Some(24));
        assert_eq!(schedule.games[0].participants[1].score, Some(0));
    }

    #[tokio::test]
    async fn missing_events_array_is_an_empty_schedule_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _schedule = server
            .mock("GET", "/teams/gb/schedule")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let schedule = api_for(&server).fetch_schedule().await.expect("schedule");
        assert!(schedule.games.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _schedule = server
            .mock("GET", "/teams/gb/schedule")
            .with_status(503)
            .create_async()
            .await;
        let _standings = server
            .mock("GET", "/standings")
            .with_status(404)
            .create_async()
            .await;

        let api = api_for(&server);
        assert!(matches!(api.fetch_schedule().await, Err(ApiError::Api(_, _))));
        assert!(matches!(api.fetch_standings().await, Err(ApiError::Api(_, _))));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _schedule = server
            .mock("GET", "/teams/gb/schedule")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = api_for(&server).fetch_schedule().await.unwrap_err();
        assert!(matches!(err, ApiError::Parsing(_, _)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let api = ScheduleApi::new(Endpoints {
            schedule: "http://127.0.0.1:9/schedule".into(),
            ..Endpoints::default()
        })
        .with_timeout(Duration::from_secs(2));
        assert!(matches!(api.fetch_schedule().await, Err(ApiError::Network(_, _))));
    }

    #[tokio::test]
    async fn live_game_falls_back_to_event_summary() {
        let mut server = mockito::Server::new_async().await;
        let _scoreboard = server
            .mock("GET", "/scoreboard")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "events": [] }).to_string())
            .create_async()
            .await;
        let summary = server
            .mock("GET", "/summary")
            .match_query(Matcher::UrlEncoded("event".into(), "401".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "header": {
                        "id": "401",
                        "competitions": [{
                            "status": { "type": { "name": "STATUS_HALFTIME" } },
                            "competitors": [
                                competitor("GB", "Green Bay Packers", "away", json!("14")),
                                competitor("MIN", "Minnesota Vikings", "home", json!("10")),
                            ],
                        }],
                    },
                })
                .to_string(),
            )
            .create_async()
            .await;

        let game = api_for(&server).fetch_live_game("401").await.expect("live game");
        summary.assert_async().await;
        assert_eq!(game.id, "401");
        assert_eq!(game.status, Some(GameStatus::Halftime));
        assert_eq!(game.participants[0].score, Some(14));
    }

    #[tokio::test]
    async fn live_game_uses_scoreboard_when_it_has_scores() {
        let mut server = mockito::Server::new_async().await;
        let _scoreboard = server
            .mock("GET", "/scoreboard")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "events": [{
                        "id": "401",
                        "status": { "type": { "name": "STATUS_IN_PROGRESS" } },
                        "competitions": [{ "competitors": [
                            competitor("GB", "Green Bay Packers", "home", json!("3")),
                            competitor("DAL", "Dallas Cowboys", "away", json!("0")),
                        ] }],
                    }],
                })
                .to_string(),
            )
            .create_async()
            .await;
        let summary = server.mock("GET", "/summary").expect(0).create_async().await;

        let game = api_for(&server).fetch_live_game("401").await.expect("live game");
        summary.assert_async().await;
        assert_eq!(game.status, Some(GameStatus::InProgress));
        assert_eq!(game.participants[0].score, Some(3));
    }

    #[tokio::test]
    async fn summary_without_status_leaves_it_unset() {
        let mut server = mockito::Server::new_async().await;
        let _summary = server
            .mock("GET", "/summary")
            .match_query(Matcher::UrlEncoded("event".into(), "9".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "header": {
                        "id": "9",
                        "competitions": [{ "competitors": [
                            competitor("GB", "Green Bay Packers", "home", json!("14")),
                            competitor("MIN", "Minnesota Vikings", "away", json!("7")),
                        ] }],
                    },
                })
                .to_string(),
            )
            .create_async()
            .await;

        let update = api_for(&server).fetch_event_summary("9").await.expect("summary");
        assert_eq!(update.status, None);
        assert_eq!(update.participants[1].score, Some(7));
    }

    #[tokio::test]
    async fn live_game_error_names_both_sources() {
        let mut server = mockito::Server::new_async().await;
        let _scoreboard = server
            .mock("GET", "/scoreboard")
            .with_status(502)
            .create_async()
            .await;
        let _summary = server
            .mock("GET", "/summary")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let err = api_for(&server).fetch_live_game("401").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let message = err.to_string();
        assert!(message.contains("scoreboard"), "{message}");
        assert!(message.contains("summary"), "{message}");
    }

    #[tokio::test]
    async fn live_game_summary_error_passes_through_when_scoreboard_answered() {
        let mut server = mockito::Server::new_async().await;
        let _scoreboard = server
            .mock("GET", "/scoreboard")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "events": [] }).to_string())
            .create_async()
            .await;
        let _summary = server
            .mock("GET", "/summary")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let err = api_for(&server).fetch_live_game("401").await.unwrap_err();
        assert!(matches!(err, ApiError::Api(_, _)));
    }

    #[test]
    fn default_standings_ask_for_divisions() {
        let standings = Endpoints::default().standings.expect("standings enabled");
        assert!(standings.ends_with("/standings?level=3"), "{standings}");
    }
}
