//! I/O side of the screen router: signs users in and out, builds evaluation flows for the
//! current screen and reacts to the watched event closing.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::{
    sync::Mutex,
    time::{MissedTickBehavior, interval, sleep},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::scoring_api::ScoringApi,
    error::FlowError,
    services::{
        auth_service,
        catalog_service::{self, SELECT_OPEN_EVENT_MESSAGE},
        evaluation_service::{EvaluationFlow, FlowOptions},
        event_watcher::{CloseSignal, EventSubscription, EventWatchers},
        results_service::{self, EventStandings},
    },
    session::{SessionIdentity, SessionStore},
    state::{
        shell::{Navigation, ParticipantView, Shell, SommelierView, View},
        state_machine::{FormPhase, Snapshot},
    },
};

/// Application shell shared by every screen of one client.
pub struct AppShell {
    api: Arc<dyn ScoringApi>,
    session: SessionStore,
    watchers: EventWatchers,
    options: FlowOptions,
    shell: Mutex<Shell>,
    close_signals: DashMap<Uuid, CloseSignal>,
}

impl AppShell {
    /// Shell starting on the login screen.
    pub fn new(
        api: Arc<dyn ScoringApi>,
        session: SessionStore,
        watchers: EventWatchers,
        options: FlowOptions,
    ) -> Self {
        Self {
            api,
            session,
            watchers,
            options,
            shell: Mutex::new(Shell::new()),
            close_signals: DashMap::new(),
        }
    }

    /// Gateway shared by every service.
    pub fn api(&self) -> &dyn ScoringApi {
        self.api.as_ref()
    }

    /// Local session.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Screen currently shown.
    pub async fn view(&self) -> View {
        self.shell.lock().await.view().clone()
    }

    /// Re-enter the screen matching the identity persisted by a previous run.
    pub async fn restore(&self) -> View {
        let Some(identity) = self.session.identity().await else {
            return self.view().await;
        };
        let mut shell = self.shell.lock().await;
        if !matches!(shell.view(), View::Login) {
            return shell.view().clone();
        }
        match shell.navigate(Self::signed_in(&identity)) {
            Ok(view) => {
                debug!(participant_id = %identity.participant_id, "session restored");
                view.clone()
            }
            Err(err) => {
                warn!(error = %err, "stored session cannot be restored; staying on login");
                shell.view().clone()
            }
        }
    }

    /// Sign an organizer in and open the menu.
    pub async fn login(&self, name: &str, password: &str) -> Result<View, FlowError> {
        self.ensure_signed_out().await?;
        let identity =
            auth_service::login_sommelier(self.api.as_ref(), &self.session, name, password).await?;
        self.enter(&identity).await
    }

    /// Join an event with its access code and open the evaluation screen.
    pub async fn join(&self, name: &str, event_code: &str) -> Result<View, FlowError> {
        self.ensure_signed_out().await?;
        let identity =
            auth_service::join_event(self.api.as_ref(), &self.session, name, event_code).await?;
        self.enter(&identity).await
    }

    /// Forget the session and return to login.
    pub async fn logout(&self) -> Result<View, FlowError> {
        auth_service::logout(&self.session).await?;
        self.close_signals.clear();
        let mut shell = self.shell.lock().await;
        Ok(shell.navigate(Navigation::SignedOut)?.clone())
    }

    /// Open an organizer screen. The answer key can only be entered for an open event.
    pub async fn open(&self, view: SommelierView) -> Result<View, FlowError> {
        if let SommelierView::AnswerKey {
            event_id: Some(event_id),
        } = view
        {
            let is_open = catalog_service::list_open_events(self.api.as_ref())
                .await?
                .iter()
                .any(|event| event.id == event_id);
            if !is_open {
                return Err(FlowError::Validation(SELECT_OPEN_EVENT_MESSAGE.to_string()));
            }
        }
        let mut shell = self.shell.lock().await;
        Ok(shell.navigate(Navigation::Open(view))?.clone())
    }

    /// Leave the current organizer screen.
    pub async fn back(&self) -> Result<View, FlowError> {
        let mut shell = self.shell.lock().await;
        Ok(shell.navigate(Navigation::Back)?.clone())
    }

    /// Build the evaluation flow of the current screen: a regular evaluation for a
    /// participant, the answer key for an organizer.
    pub async fn evaluation_flow(&self) -> Result<EvaluationFlow, FlowError> {
        let identity = self.require_identity().await?;
        let (event_id, is_answer_key) = match self.view().await {
            View::Participant(ParticipantView::Evaluating { event_id }) => (event_id, false),
            View::Sommelier(SommelierView::AnswerKey {
                event_id: Some(event_id),
            }) => (event_id, true),
            other => {
                return Err(FlowError::InvalidState(format!(
                    "no evaluation is available from {other:?}"
                )));
            }
        };
        Ok(EvaluationFlow::new(
            self.api.clone(),
            self.session.clone(),
            event_id,
            identity.participant_id,
            is_answer_key,
            self.options,
        ))
    }

    /// Wait until the participant's event is closed, then switch to the finished screen.
    ///
    /// `flow`, when given, is moved to its terminal phase as well. Meanwhile it is
    /// re-resolved at the poll interval while it waits, so a round opened in between is
    /// loaded into it. Dropping the returned future stops waiting.
    pub async fn await_event_close(
        &self,
        flow: Option<&EvaluationFlow>,
    ) -> Result<View, FlowError> {
        let event_id = self.shell.lock().await.evaluating_event().ok_or_else(|| {
            FlowError::InvalidState("no event is being evaluated".into())
        })?;

        let subscription = self.watchers.subscribe(event_id);
        match flow {
            Some(flow) => {
                self.watch_flow(&subscription, flow, false).await?;
                flow.mark_event_closed().await;
            }
            None => {
                if !subscription.closed().await {
                    return Err(watcher_stopped(event_id));
                }
            }
        }

        let round_ids = self.closed_event_rounds(event_id).await?;
        let signal = self.close_signals.entry(event_id).or_default().clone();
        if signal.fire() {
            info!(%event_id, rounds = round_ids.len(), "event closed; showing results screen");
        }

        let mut shell = self.shell.lock().await;
        let navigation = Navigation::EventClosed {
            event_id,
            round_ids,
        };
        Ok(shell.navigate(navigation)?.clone())
    }

    /// Wait on the waiting screen until `flow` has a round to show again or its event
    /// closes, whichever comes first.
    pub async fn await_next_round(&self, flow: &EvaluationFlow) -> Result<Snapshot, FlowError> {
        let subscription = self.watchers.subscribe(flow.event_id());
        match self.watch_flow(&subscription, flow, true).await? {
            Wake::Round(snapshot) => Ok(snapshot),
            Wake::Closed => Ok(flow.mark_event_closed().await),
        }
    }

    /// Re-resolve `flow` at the poll interval while it waits, until the event closes or,
    /// with `until_round`, until the flow has a round to show.
    async fn watch_flow(
        &self,
        subscription: &EventSubscription,
        flow: &EvaluationFlow,
        until_round: bool,
    ) -> Result<Wake, FlowError> {
        let mut ticker = interval(self.watchers.settings().interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                closed = subscription.closed() => {
                    return if closed {
                        Ok(Wake::Closed)
                    } else {
                        Err(watcher_stopped(subscription.event_id()))
                    };
                }
                _ = ticker.tick() => {
                    let snapshot = flow.check_for_new_round().await?;
                    match snapshot.phase {
                        FormPhase::Finished => return Ok(Wake::Closed),
                        FormPhase::Waiting { .. } => {}
                        _ if until_round => return Ok(Wake::Round(snapshot)),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Ranking and winners of the event shown on the current screen.
    pub async fn standings(&self) -> Result<EventStandings, FlowError> {
        let event_id = match self.view().await {
            View::Participant(
                ParticipantView::EventFinished { event_id, .. }
                | ParticipantView::Results { event_id, .. },
            )
            | View::Sommelier(SommelierView::EventResult { event_id }) => event_id,
            other => {
                return Err(FlowError::InvalidState(format!(
                    "no event result is shown from {other:?}"
                )));
            }
        };
        results_service::event_standings(self.api.as_ref(), event_id).await
    }

    /// Load the participant's scored breakdown and show it.
    pub async fn load_results(&self) -> Result<View, FlowError> {
        let round_ids = match self.view().await {
            View::Participant(ParticipantView::EventFinished { round_ids, .. }) => round_ids,
            other => {
                return Err(FlowError::InvalidState(format!(
                    "results are not available from {other:?}"
                )));
            }
        };
        let results = results_service::participant_results(self.api.as_ref(), &round_ids).await?;
        let mut shell = self.shell.lock().await;
        Ok(shell.navigate(Navigation::ResultsLoaded(results))?.clone())
    }

    /// Round IDs of a closed event. Unreachable-server errors are retried at the poll
    /// interval, matching the watcher that observed the close.
    async fn closed_event_rounds(&self, event_id: Uuid) -> Result<Vec<Uuid>, FlowError> {
        let interval = self.watchers.settings().interval;
        loop {
            match results_service::round_ids(self.api.as_ref(), event_id).await {
                Ok(round_ids) => return Ok(round_ids),
                Err(err) if err.is_unavailable() => {
                    debug!(%event_id, error = %err, "failed to list rounds of closed event");
                    sleep(interval).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn require_identity(&self) -> Result<SessionIdentity, FlowError> {
        self.session
            .identity()
            .await
            .ok_or_else(|| FlowError::Unauthorized("nobody is signed in".into()))
    }

    async fn ensure_signed_out(&self) -> Result<(), FlowError> {
        match self.view().await {
            View::Login => Ok(()),
            _ => Err(FlowError::InvalidState("already signed in".into())),
        }
    }

    async fn enter(&self, identity: &SessionIdentity) -> Result<View, FlowError> {
        let mut shell = self.shell.lock().await;
        Ok(shell.navigate(Self::signed_in(identity))?.clone())
    }

    fn signed_in(identity: &SessionIdentity) -> Navigation {
        Navigation::SignedIn {
            user_type: identity.user_type,
            event_id: identity.event_id,
        }
    }
}

/// Why [`AppShell::watch_flow`] stopped waiting.
enum Wake {
    /// The flow left the waiting screen with this snapshot.
    Round(Snapshot),
    Closed,
}

fn watcher_stopped(event_id: Uuid) -> FlowError {
    FlowError::InvalidState(format!("watcher of event {event_id} stopped"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        dao::memory::{Failure, MemoryScoringApi},
        dto::results::{EvaluationResult, EventScore},
        services::event_watcher::PollSettings,
        session::UserType,
        state::form::tests::complete_red_form,
    };

    const INTERVAL: Duration = Duration::from_secs(3);

    fn app(api: &MemoryScoringApi, session: SessionStore) -> AppShell {
        let api: Arc<dyn ScoringApi> = Arc::new(api.clone());
        let watchers = EventWatchers::new(
            api.clone(),
            PollSettings {
                interval: INTERVAL,
                max_backoff: INTERVAL * 4,
            },
        );
        AppShell::new(api, session, watchers, FlowOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn participant_goes_from_evaluation_to_results() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Tintos", true);
        let first = api.add_round(event_id, "Vinho 1", 1, true);
        let app = app(&api, SessionStore::in_memory());

        let view = app.join("Ana", "Tintos-code").await.unwrap();
        assert_eq!(
            view,
            View::Participant(ParticipantView::Evaluating { event_id })
        );

        let flow = app.evaluation_flow().await.unwrap();
        flow.load_pending_round().await.unwrap();
        flow.edit(|form| *form = complete_red_form()).await.unwrap();
        flow.submit().await.unwrap();

        let closer = api.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(10)).await;
            closer.set_event_state(event_id, false);
        });
        let view = app.await_event_close(Some(&flow)).await.unwrap();
        assert_eq!(
            view,
            View::Participant(ParticipantView::EventFinished {
                event_id,
                round_ids: vec![first],
            })
        );
        assert_eq!(flow.snapshot().await.phase, FormPhase::Finished);

        api.set_result(EvaluationResult {
            round_id: first,
            blocks: Vec::new(),
        });
        api.set_event_score(EventScore {
            total_score: 12,
            percentual: 40.0,
            badge: "Explorador".into(),
            badge_key: "explorador".into(),
        });
        let view = app.load_results().await.unwrap();
        match view {
            View::Participant(ParticipantView::Results { results, .. }) => {
                assert_eq!(results.rounds.len(), 1);
                assert_eq!(results.score.total_score, 12);
            }
            other => panic!("expected results, got {other:?}"),
        }
        assert!(app.standings().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn round_listing_is_retried_after_close() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Tintos", false);
        api.add_round(event_id, "Vinho 1", 1, false);
        let app = app(&api, SessionStore::in_memory());
        app.join("Ana", "Tintos-code").await.unwrap();

        api.fail_next("list_rounds", Failure::Unavailable);
        let view = app.await_event_close(None).await.unwrap();
        assert!(matches!(
            view,
            View::Participant(ParticipantView::EventFinished { .. })
        ));
        assert_eq!(api.calls("list_rounds"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn answer_key_needs_an_open_event() {
        let api = MemoryScoringApi::new();
        let open = api.add_event("Aberto", true);
        let closed = api.add_event("Fechado", false);
        let app = app(&api, SessionStore::in_memory());

        assert_eq!(
            app.login("Clara", "sommelier").await.unwrap(),
            View::Sommelier(SommelierView::Menu)
        );
        assert!(app.login("Clara", "sommelier").await.is_err());

        let err = app
            .open(SommelierView::AnswerKey {
                event_id: Some(closed),
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), SELECT_OPEN_EVENT_MESSAGE);

        app.open(SommelierView::AnswerKey {
            event_id: Some(open),
        })
        .await
        .unwrap();
        let flow = app.evaluation_flow().await.unwrap();
        assert!(flow.snapshot().await.is_answer_key);
        assert_eq!(flow.event_id(), open);
    }

    #[tokio::test(start_paused = true)]
    async fn participant_cannot_open_organizer_screens() {
        let api = MemoryScoringApi::new();
        api.add_event("Tintos", true);
        let app = app(&api, SessionStore::in_memory());
        app.join("Ana", "Tintos-code").await.unwrap();

        let err = app.open(SommelierView::Events).await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidState(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn session_is_restored_and_cleared() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Tintos", true);
        let session = SessionStore::in_memory();
        session
            .sign_in(SessionIdentity {
                participant_id: Uuid::new_v4(),
                user_type: UserType::Participant,
                name: "Ana".into(),
                event_id: Some(event_id),
            })
            .await
            .unwrap();

        let app = app(&api, session.clone());
        assert_eq!(
            app.restore().await,
            View::Participant(ParticipantView::Evaluating { event_id })
        );

        assert_eq!(app.logout().await.unwrap(), View::Login);
        assert_eq!(session.identity().await, None);
        assert!(matches!(
            app.evaluation_flow().await,
            Err(FlowError::Unauthorized(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn results_require_a_finished_event() {
        let api = MemoryScoringApi::new();
        api.add_event("Tintos", true);
        let app = app(&api, SessionStore::in_memory());
        app.join("Ana", "Tintos-code").await.unwrap();

        assert!(matches!(
            app.load_results().await,
            Err(FlowError::InvalidState(_))
        ));
        assert_eq!(api.calls("my_event_score"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_participant_picks_up_a_new_round() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Tintos", true);
        let app = Arc::new(app(&api, SessionStore::in_memory()));
        app.join("Ana", "Tintos-code").await.unwrap();
        let flow = Arc::new(app.evaluation_flow().await.unwrap());
        let snapshot = flow.load_pending_round().await.unwrap();
        assert!(matches!(snapshot.phase, FormPhase::Waiting { .. }));

        let waiting = tokio::spawn({
            let app = app.clone();
            let flow = flow.clone();
            async move { app.await_event_close(Some(&flow)).await }
        });
        sleep(INTERVAL * 2).await;
        let round = api.add_round(event_id, "Vinho 1", 1, true);
        sleep(INTERVAL * 2).await;

        let snapshot = flow.snapshot().await;
        let shown = snapshot.phase.active_round().map(|active| active.round.round_id);
        assert_eq!(shown, Some(round));
        assert!(!waiting.is_finished());

        api.set_event_state(event_id, false);
        let view = waiting.await.unwrap().unwrap();
        assert!(matches!(
            view,
            View::Participant(ParticipantView::EventFinished { .. })
        ));
        assert_eq!(flow.snapshot().await.phase, FormPhase::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn next_round_wait_ends_on_round_or_close() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Tintos", true);
        let app = app(&api, SessionStore::in_memory());
        app.join("Ana", "Tintos-code").await.unwrap();

        let flow = app.evaluation_flow().await.unwrap();
        flow.load_pending_round().await.unwrap();
        let opener = api.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(10)).await;
            opener.add_round(event_id, "Vinho 1", 1, true);
        });
        let snapshot = app.await_next_round(&flow).await.unwrap();
        assert!(matches!(snapshot.phase, FormPhase::Active(_)));

        flow.edit(|form| *form = complete_red_form()).await.unwrap();
        let snapshot = flow.submit().await.unwrap();
        assert!(matches!(snapshot.phase, FormPhase::Waiting { .. }));
        let closer = api.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(10)).await;
            closer.set_event_state(event_id, false);
        });
        let snapshot = app.await_next_round(&flow).await.unwrap();
        assert_eq!(snapshot.phase, FormPhase::Finished);
    }
}
