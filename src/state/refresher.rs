use crate::state::messages::{NetworkRequest, UiEvent};
use chrono::{DateTime, Utc};
use log::debug;
use schedule_api::classify::ScheduleStatus;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Full fetch-classify cycle while a game is live.
    pub live_interval: Duration,
    /// Countdown label recompute while waiting for kickoff. Never fetches.
    pub countdown_tick: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            live_interval: Duration::from_secs(30),
            countdown_tick: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    #[default]
    Idle,
    Countdown { kickoff: DateTime<Utc> },
    LiveRefresh,
}

impl RefreshMode {
    /// A live game wins over an upcoming one.
    pub fn for_status(status: &ScheduleStatus) -> Self {
        if status.live.is_some() {
            RefreshMode::LiveRefresh
        } else if let Some(next) = &status.next {
            RefreshMode::Countdown { kickoff: next.kickoff }
        } else {
            RefreshMode::Idle
        }
    }
}

/// Owns the single active timer. Switching modes aborts the old timer before
/// the new one starts, so a live refresh and a countdown never run together.
pub struct RefreshScheduler {
    settings: RefreshSettings,
    network_requests: mpsc::Sender<NetworkRequest>,
    ui_events: mpsc::Sender<UiEvent>,
    mode: RefreshMode,
    timer: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(
        settings: RefreshSettings,
        network_requests: mpsc::Sender<NetworkRequest>,
        ui_events: mpsc::Sender<UiEvent>,
    ) -> Self {
        Self {
            settings,
            network_requests,
            ui_events,
            mode: RefreshMode::Idle,
            timer: None,
        }
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    /// Switch to `mode`. Re-applying the current mode keeps its timer running.
    pub fn apply(&mut self, mode: RefreshMode) {
        if mode == self.mode && (self.timer.is_some() || mode == RefreshMode::Idle) {
            return;
        }
        self.stop();

        self.timer = match mode {
            RefreshMode::Idle => None,
            RefreshMode::Countdown { kickoff } => {
                debug!("countdown to {kickoff} every {:?}", self.settings.countdown_tick);
                Some(tokio::spawn(tick(
                    self.settings.countdown_tick,
                    self.ui_events.clone(),
                    UiEvent::CountdownTick,
                )))
            }
            RefreshMode::LiveRefresh => {
                debug!("live refresh every {:?}", self.settings.live_interval);
                Some(tokio::spawn(tick(
                    self.settings.live_interval,
                    self.network_requests.clone(),
                    NetworkRequest::RefreshSchedule,
                )))
            }
        };
        self.mode = mode;
    }

    /// Clears whichever timer is running.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.mode = RefreshMode::Idle;
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn tick<T: Clone>(period: Duration, target: mpsc::Sender<T>, message: T) {
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick is immediate; whatever armed us just finished a cycle.
    ticks.tick().await;

    loop {
        ticks.tick().await;
        if target.send(message.clone()).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schedule_api::classify::{LiveGame, NextGame};
    use schedule_api::{GameStatus, HomeAway, SeasonRecord};
    use tokio::time::timeout;

    struct Harness {
        scheduler: RefreshScheduler,
        network: mpsc::Receiver<NetworkRequest>,
        ui: mpsc::Receiver<UiEvent>,
    }

    fn harness() -> Harness {
        let (net_tx, network) = mpsc::channel(8);
        let (ui_tx, ui) = mpsc::channel(8);
        Harness {
            scheduler: RefreshScheduler::new(RefreshSettings::default(), net_tx, ui_tx),
            network,
            ui,
        }
    }

    fn kickoff() -> DateTime<Utc> {
        Utc::now() + chrono::Duration::days(3)
    }

    fn status(live: bool, next: bool) -> ScheduleStatus {
        ScheduleStatus {
            record: SeasonRecord::new(1, 0, 0),
            undefeated: true,
            previous: None,
            next: next.then(|| NextGame {
                game_id: "2".into(),
                opponent: "Detroit Lions".into(),
                home_away: HomeAway::Away,
                kickoff: kickoff(),
                network: "FOX".into(),
                details_available: true,
            }),
            live: live.then(|| LiveGame {
                game_id: "1".into(),
                opponent: "Chicago Bears".into(),
                home_away: HomeAway::Home,
                status: GameStatus::InProgress,
                team_score: Some(7),
                opponent_score: Some(3),
            }),
        }
    }

    #[test]
    fn mode_follows_status() {
        assert_eq!(RefreshMode::for_status(&status(false, false)), RefreshMode::Idle);
        assert!(matches!(
            RefreshMode::for_status(&status(false, true)),
            RefreshMode::Countdown { .. }
        ));
        assert_eq!(RefreshMode::for_status(&status(true, true)), RefreshMode::LiveRefresh);
    }

    #[tokio::test(start_paused = true)]
    async fn live_refresh_requests_a_cycle_each_interval() {
        let mut h = harness();
        h.scheduler.apply(RefreshMode::LiveRefresh);

        for _ in 0..3 {
            let request = timeout(Duration::from_secs(31), h.network.recv()).await;
            assert_eq!(request.ok().flatten(), Some(NetworkRequest::RefreshSchedule));
        }
        assert!(h.ui.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_fires_before_the_first_interval() {
        let mut h = harness();
        h.scheduler.apply(RefreshMode::LiveRefresh);
        assert!(timeout(Duration::from_secs(29), h.network.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_the_ui_without_fetching() {
        let mut h = harness();
        h.scheduler.apply(RefreshMode::Countdown { kickoff: kickoff() });

        let event = timeout(Duration::from_secs(61), h.ui.recv()).await;
        assert_eq!(event.ok().flatten(), Some(UiEvent::CountdownTick));
        assert!(h.network.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn switching_modes_cancels_the_previous_timer() {
        let mut h = harness();
        h.scheduler.apply(RefreshMode::Countdown { kickoff: kickoff() });
        h.scheduler.apply(RefreshMode::LiveRefresh);
        assert_eq!(h.scheduler.mode(), RefreshMode::LiveRefresh);

        assert!(timeout(Duration::from_secs(120), h.ui.recv()).await.is_err());
        assert_eq!(h.network.try_recv().ok(), Some(NetworkRequest::RefreshSchedule));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_clears_every_timer() {
        let mut h = harness();
        h.scheduler.apply(RefreshMode::LiveRefresh);
        h.scheduler.stop();
        assert_eq!(h.scheduler.mode(), RefreshMode::Idle);

        assert!(timeout(Duration::from_secs(300), h.network.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reapplying_the_same_mode_keeps_the_schedule() {
        let mut h = harness();
        h.scheduler.apply(RefreshMode::LiveRefresh);
        tokio::time::sleep(Duration::from_secs(20)).await;
        h.scheduler.apply(RefreshMode::LiveRefresh);

        // A restarted timer would not fire until t=50s.
        let request = timeout(Duration::from_secs(11), h.network.recv()).await;
        assert_eq!(request.ok().flatten(), Some(NetworkRequest::RefreshSchedule));
    }
}
