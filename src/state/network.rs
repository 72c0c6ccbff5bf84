use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse};
use chrono::Utc;
use log::{debug, error, warn};
use schedule_api::client::{ApiResult, ScheduleApi};
use schedule_api::standings::{self, PlayoffFormat};
use schedule_api::{RecordPolicy, Schedule, TrackedTeam, classify};
use tokio::sync::mpsc;

/// Runs fetch-classify cycles one request at a time; no two fetches overlap.
pub struct NetworkWorker {
    client: ScheduleApi,
    team: TrackedTeam,
    policy: RecordPolicy,
    playoff_format: PlayoffFormat,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
}

impl NetworkWorker {
    pub fn new(
        settings: &AppSettings,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client: ScheduleApi::new(settings.endpoints.clone()).with_timeout(settings.request_timeout),
            team: settings.team.clone(),
            policy: settings.record_policy,
            playoff_format: settings.playoff_format,
            requests,
            responses,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            debug!("network request: {request:?}");

            let response = match request {
                NetworkRequest::LoadSchedule | NetworkRequest::RefreshSchedule => {
                    self.handle_schedule_cycle().await
                }
                NetworkRequest::LoadStandings => self.handle_load_standings().await,
            };

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_schedule_cycle(&self) -> NetworkResponse {
        let mut schedule = match self.client.fetch_schedule().await {
            Ok(schedule) => schedule,
            Err(e) => {
                error!("schedule fetch failed: {e}");
                return NetworkResponse::ScheduleFailed { message: e.to_string() };
            }
        };

        self.backfill_live_scores(&mut schedule).await;

        match classify::summarize(&schedule, &self.team, &self.policy, Utc::now()) {
            Ok(status) => {
                debug!(
                    "classified {} games: record {}, live {}",
                    schedule.games.len(),
                    status.record,
                    status.live.is_some()
                );
                NetworkResponse::ScheduleLoaded { status }
            }
            Err(reason) => {
                warn!("schedule has no data: {reason}");
                NetworkResponse::ScheduleEmpty { reason }
            }
        }
    }

    /// The team schedule often lags on live scores. Pull them from the
    /// scoreboard or event summary; failures leave the schedule as fetched.
    async fn backfill_live_scores(&self, schedule: &mut Schedule) {
        let stale: Vec<String> = schedule
            .games
            .iter()
            .filter(|g| g.is_live() && g.lacks_scores())
            .map(|g| g.id.clone())
            .collect();

        for event_id in stale {
            match self.client.fetch_live_game(&event_id).await {
                Ok(update) => {
                    debug!("backfilled live scores for event {event_id}");
                    schedule.merge_update(update);
                }
                Err(e) => warn!("live score backfill failed for event {event_id}: {e}"),
            }
        }
    }

    async fn handle_load_standings(&self) -> NetworkResponse {
        match self.load_standings().await {
            Ok(standings) => NetworkResponse::StandingsLoaded { standings },
            Err(e) => {
                warn!("standings fetch failed: {e}");
                NetworkResponse::StandingsFailed { message: e.to_string() }
            }
        }
    }

    async fn load_standings(&self) -> ApiResult<Option<standings::DivisionStandings>> {
        let groups = self.client.fetch_standings().await?;
        Ok(standings::division_table(groups, &self.team, self.playoff_format))
    }
}
