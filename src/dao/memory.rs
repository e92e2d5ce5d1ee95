//! In-memory [`ScoringApi`] used by service tests.

use std::{
    collections::{HashMap, VecDeque},
    io,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use futures::future::BoxFuture;
use reqwest::StatusCode;
use uuid::Uuid;

use crate::{
    dao::{
        error::{ApiError, ApiResult},
        scoring_api::ScoringApi,
    },
    dto::{
        auth::{JoinRequest, JoinResponse, LoginRequest, LoginResponse},
        evaluation::{AnswerKeyItem, EvaluationCreate, EvaluationReceipt},
        event::{CreateEventRequest, Event, EventOpenState},
        results::{EvaluationResult, EventScore, EventWinners, RankingEntry},
        round::{CreateRoundRequest, Round, UpdateRoundRequest},
    },
};

/// Failure injected into the next call of an operation.
#[derive(Debug, Clone)]
pub(crate) enum Failure {
    Unavailable,
    Rejected(StatusCode, &'static str),
}

impl Failure {
    fn into_error(self, op: &'static str) -> ApiError {
        match self {
            Failure::Unavailable => ApiError::unavailable(
                op,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            ),
            Failure::Rejected(status, message) => ApiError::rejected(op, status, message),
        }
    }
}

#[derive(Default)]
struct MemoryState {
    events: Vec<Event>,
    rounds: Vec<Round>,
    answered: HashMap<(Uuid, Uuid), Vec<Uuid>>,
    submissions: Vec<EvaluationCreate>,
    ranking: HashMap<Uuid, Vec<RankingEntry>>,
    winners: HashMap<Uuid, EventWinners>,
    answer_keys: HashMap<Uuid, Vec<AnswerKeyItem>>,
    results: HashMap<Uuid, EvaluationResult>,
    event_score: Option<EventScore>,
    failures: HashMap<&'static str, VecDeque<Failure>>,
    persistent_failures: HashMap<&'static str, Failure>,
    latency: HashMap<&'static str, Duration>,
    calls: HashMap<&'static str, usize>,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryScoringApi {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryScoringApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn add_event(&self, name: &str, is_open: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().events.push(Event {
            id,
            name: name.to_string(),
            access_code: Some(format!("{name}-code")),
            is_open,
        });
        id
    }

    pub(crate) fn add_round(
        &self,
        event_id: Uuid,
        name: &str,
        position: i32,
        is_open: bool,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().rounds.push(Round {
            id,
            name: name.to_string(),
            position,
            is_open,
            event_id,
        });
        id
    }

    pub(crate) fn mark_answered(&self, participant_id: Uuid, event_id: Uuid, round_id: Uuid) {
        self.lock()
            .answered
            .entry((participant_id, event_id))
            .or_default()
            .push(round_id);
    }

    pub(crate) fn set_event_state(&self, event_id: Uuid, is_open: bool) {
        if let Some(event) = self.lock().events.iter_mut().find(|e| e.id == event_id) {
            event.is_open = is_open;
        }
    }

    pub(crate) fn remove_event(&self, event_id: Uuid) {
        self.lock().events.retain(|event| event.id != event_id);
    }

    pub(crate) fn set_ranking(&self, event_id: Uuid, ranking: Vec<RankingEntry>) {
        self.lock().ranking.insert(event_id, ranking);
    }

    pub(crate) fn set_winners(&self, winners: EventWinners) {
        self.lock().winners.insert(winners.event_id, winners);
    }

    pub(crate) fn set_answer_key(&self, event_id: Uuid, items: Vec<AnswerKeyItem>) {
        self.lock().answer_keys.insert(event_id, items);
    }

    pub(crate) fn set_result(&self, result: EvaluationResult) {
        self.lock().results.insert(result.round_id, result);
    }

    pub(crate) fn set_event_score(&self, score: EventScore) {
        self.lock().event_score = Some(score);
    }

    /// Fail the next call of `op` once.
    pub(crate) fn fail_next(&self, op: &'static str, failure: Failure) {
        self.lock().failures.entry(op).or_default().push_back(failure);
    }

    /// Fail every call of `op` until [`Self::recover`].
    pub(crate) fn fail_always(&self, op: &'static str, failure: Failure) {
        self.lock().persistent_failures.insert(op, failure);
    }

    pub(crate) fn recover(&self, op: &'static str) {
        let mut state = self.lock();
        state.persistent_failures.remove(op);
        state.failures.remove(op);
    }

    /// Delay delivery of every response of `op` by `latency`.
    pub(crate) fn set_latency(&self, op: &'static str, latency: Duration) {
        self.lock().latency.insert(op, latency);
    }

    pub(crate) fn calls(&self, op: &'static str) -> usize {
        self.lock().calls.get(op).copied().unwrap_or_default()
    }

    pub(crate) fn submissions(&self) -> Vec<EvaluationCreate> {
        self.lock().submissions.clone()
    }

    pub(crate) fn round(&self, round_id: Uuid) -> Option<Round> {
        self.lock().rounds.iter().find(|r| r.id == round_id).cloned()
    }

    pub(crate) fn event(&self, event_id: Uuid) -> Option<Event> {
        self.lock().events.iter().find(|e| e.id == event_id).cloned()
    }

    fn begin(&self, op: &'static str) -> (Option<Failure>, Option<Duration>) {
        let mut state = self.lock();
        *state.calls.entry(op).or_default() += 1;
        let failure = state
            .failures
            .get_mut(op)
            .and_then(VecDeque::pop_front)
            .or_else(|| state.persistent_failures.get(op).cloned());
        (failure, state.latency.get(op).copied())
    }

    fn not_found(op: &'static str) -> ApiError {
        ApiError::rejected(op, StatusCode::NOT_FOUND, "Not Found")
    }

    fn run<T, F>(&self, op: &'static str, f: F) -> BoxFuture<'static, ApiResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut MemoryState) -> ApiResult<T> + Send + 'static,
    {
        let api = self.clone();
        Box::pin(async move {
            // the answer reflects the state at request time; latency only delays delivery
            let (failure, latency) = api.begin(op);
            let result = match failure {
                Some(failure) => Err(failure.into_error(op)),
                None => {
                    let mut state = api.lock();
                    f(&mut state)
                }
            };
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            result
        })
    }
}

impl ScoringApi for MemoryScoringApi {
    fn login(&self, request: LoginRequest) -> BoxFuture<'static, ApiResult<LoginResponse>> {
        self.run("login", move |_| {
            if request.password == "sommelier" {
                Ok(LoginResponse {
                    participant_id: Uuid::new_v4(),
                    name: request.name,
                    is_sommelier: true,
                })
            } else {
                Err(ApiError::rejected(
                    "login",
                    StatusCode::UNAUTHORIZED,
                    "Credenciais inválidas",
                ))
            }
        })
    }

    fn join_event(&self, request: JoinRequest) -> BoxFuture<'static, ApiResult<JoinResponse>> {
        self.run("join_event", move |state| {
            let event = state
                .events
                .iter()
                .find(|e| e.access_code.as_deref() == Some(request.event_code.as_str()))
                .ok_or_else(|| {
                    ApiError::rejected("join_event", StatusCode::NOT_FOUND, "Evento não encontrado")
                })?;
            Ok(JoinResponse {
                participant_id: Uuid::new_v4(),
                name: request.name,
                event_id: event.id,
                event_code: request.event_code,
            })
        })
    }

    fn list_events(&self) -> BoxFuture<'static, ApiResult<Vec<Event>>> {
        self.run("list_events", |state| Ok(state.events.clone()))
    }

    fn create_event(&self, request: CreateEventRequest) -> BoxFuture<'static, ApiResult<Event>> {
        self.run("create_event", move |state| {
            let event = Event {
                id: Uuid::new_v4(),
                name: request.name,
                access_code: request.access_code,
                is_open: true,
            };
            state.events.push(event.clone());
            Ok(event)
        })
    }

    fn set_event_open(
        &self,
        id: Uuid,
        open: bool,
    ) -> BoxFuture<'static, ApiResult<EventOpenState>> {
        self.run("set_event_open", move |state| {
            let event = state
                .events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| Self::not_found("set_event_open"))?;
            event.is_open = open;
            Ok(EventOpenState { id, is_open: open })
        })
    }

    fn delete_event(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>> {
        self.run("delete_event", move |state| {
            let before = state.events.len();
            state.events.retain(|e| e.id != id);
            if state.events.len() == before {
                return Err(Self::not_found("delete_event"));
            }
            state.rounds.retain(|r| r.event_id != id);
            Ok(())
        })
    }

    fn close_event(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>> {
        self.run("close_event", move |state| {
            let event = state
                .events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| Self::not_found("close_event"))?;
            event.is_open = false;
            Ok(())
        })
    }

    fn event_ranking(&self, id: Uuid) -> BoxFuture<'static, ApiResult<Vec<RankingEntry>>> {
        self.run("event_ranking", move |state| {
            Ok(state.ranking.get(&id).cloned().unwrap_or_default())
        })
    }

    fn event_winners(&self, id: Uuid) -> BoxFuture<'static, ApiResult<EventWinners>> {
        self.run("event_winners", move |state| {
            Ok(state.winners.get(&id).cloned().unwrap_or(EventWinners {
                event_id: id,
                winners: Vec::new(),
            }))
        })
    }

    fn event_answer_key(&self, id: Uuid) -> BoxFuture<'static, ApiResult<Vec<AnswerKeyItem>>> {
        self.run("event_answer_key", move |state| {
            Ok(state.answer_keys.get(&id).cloned().unwrap_or_default())
        })
    }

    fn list_rounds(&self, event_id: Uuid) -> BoxFuture<'static, ApiResult<Vec<Round>>> {
        self.run("list_rounds", move |state| {
            Ok(state
                .rounds
                .iter()
                .filter(|r| r.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    fn create_round(&self, request: CreateRoundRequest) -> BoxFuture<'static, ApiResult<Round>> {
        self.run("create_round", move |state| {
            let next = state
                .rounds
                .iter()
                .filter(|r| r.event_id == request.event_id)
                .map(|r| r.position)
                .max()
                .unwrap_or(0)
                + 1;
            let round = Round {
                id: Uuid::new_v4(),
                name: request.name,
                position: request.position.unwrap_or(next),
                is_open: true,
                event_id: request.event_id,
            };
            state.rounds.push(round.clone());
            Ok(round)
        })
    }

    fn update_round(
        &self,
        id: Uuid,
        request: UpdateRoundRequest,
    ) -> BoxFuture<'static, ApiResult<Round>> {
        self.run("update_round", move |state| {
            let round = state
                .rounds
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| Self::not_found("update_round"))?;
            if let Some(name) = request.name {
                round.name = name;
            }
            if let Some(position) = request.position {
                round.position = position;
            }
            if let Some(is_open) = request.is_open {
                round.is_open = is_open;
            }
            Ok(round.clone())
        })
    }

    fn delete_round(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>> {
        self.run("delete_round", move |state| {
            let before = state.rounds.len();
            state.rounds.retain(|r| r.id != id);
            if state.rounds.len() == before {
                return Err(Self::not_found("delete_round"));
            }
            Ok(())
        })
    }

    fn close_round(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>> {
        self.run("close_round", move |state| {
            let round = state
                .rounds
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| Self::not_found("close_round"))?;
            round.is_open = false;
            Ok(())
        })
    }

    fn answered_rounds(
        &self,
        participant_id: Uuid,
        event_id: Uuid,
    ) -> BoxFuture<'static, ApiResult<Vec<Uuid>>> {
        self.run("answered_rounds", move |state| {
            Ok(state
                .answered
                .get(&(participant_id, event_id))
                .cloned()
                .unwrap_or_default())
        })
    }

    fn submit_evaluation(
        &self,
        evaluation: EvaluationCreate,
    ) -> BoxFuture<'static, ApiResult<EvaluationReceipt>> {
        self.run("submit_evaluation", move |state| {
            let round = state
                .rounds
                .iter()
                .find(|r| r.id == evaluation.round_id)
                .cloned()
                .ok_or_else(|| Self::not_found("submit_evaluation"))?;
            if !round.is_open {
                return Err(ApiError::rejected(
                    "submit_evaluation",
                    StatusCode::BAD_REQUEST,
                    "Round encerrado",
                ));
            }
            let answered = state
                .answered
                .entry((evaluation.participant_id, round.event_id))
                .or_default();
            if answered.contains(&round.id) {
                return Err(ApiError::rejected(
                    "submit_evaluation",
                    StatusCode::CONFLICT,
                    "Avaliação já enviada para este round",
                ));
            }
            answered.push(round.id);
            let receipt = EvaluationReceipt {
                id: Uuid::new_v4(),
                participant_id: evaluation.participant_id,
                round_id: evaluation.round_id,
                score: 0,
                is_answer_key: evaluation.is_answer_key,
                submitted_at: None,
            };
            state.submissions.push(evaluation);
            Ok(receipt)
        })
    }

    fn my_evaluation_result(
        &self,
        round_id: Uuid,
    ) -> BoxFuture<'static, ApiResult<EvaluationResult>> {
        self.run("my_evaluation_result", move |state| {
            state
                .results
                .get(&round_id)
                .cloned()
                .ok_or_else(|| Self::not_found("my_evaluation_result"))
        })
    }

    fn my_event_score(&self) -> BoxFuture<'static, ApiResult<EventScore>> {
        self.run("my_event_score", |state| {
            state
                .event_score
                .clone()
                .ok_or_else(|| Self::not_found("my_event_score"))
        })
    }
}
