use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::error::ApiResult;
use crate::dto::{
    auth::{JoinRequest, JoinResponse, LoginRequest, LoginResponse},
    evaluation::{AnswerKeyItem, EvaluationCreate, EvaluationReceipt},
    event::{CreateEventRequest, Event, EventOpenState},
    results::{EvaluationResult, EventScore, EventWinners, RankingEntry},
    round::{CreateRoundRequest, Round, UpdateRoundRequest},
};

/// Abstraction over the remote scoring API consumed by the client.
///
/// Every call is independent and returns an owned future so callers can fan requests out
/// without borrowing the implementation.
pub trait ScoringApi: Send + Sync {
    /// Authenticate an organizer.
    fn login(&self, request: LoginRequest) -> BoxFuture<'static, ApiResult<LoginResponse>>;
    /// Join an event with its access code.
    fn join_event(&self, request: JoinRequest) -> BoxFuture<'static, ApiResult<JoinResponse>>;

    /// Every event, open or closed.
    fn list_events(&self) -> BoxFuture<'static, ApiResult<Vec<Event>>>;
    /// Create an event.
    fn create_event(&self, request: CreateEventRequest) -> BoxFuture<'static, ApiResult<Event>>;
    /// Open or close an event for new rounds and evaluations.
    fn set_event_open(&self, id: Uuid, open: bool)
    -> BoxFuture<'static, ApiResult<EventOpenState>>;
    /// Delete an event with its rounds.
    fn delete_event(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>>;
    /// Close an event for good, publishing its results.
    fn close_event(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>>;
    /// Ranking of an event.
    fn event_ranking(&self, id: Uuid) -> BoxFuture<'static, ApiResult<Vec<RankingEntry>>>;
    /// Participants sharing the top score of an event.
    fn event_winners(&self, id: Uuid) -> BoxFuture<'static, ApiResult<EventWinners>>;
    /// Reference answers of every round of an event.
    fn event_answer_key(&self, id: Uuid) -> BoxFuture<'static, ApiResult<Vec<AnswerKeyItem>>>;

    /// Rounds of an event, in no particular order.
    fn list_rounds(&self, event_id: Uuid) -> BoxFuture<'static, ApiResult<Vec<Round>>>;
    /// Create a round.
    fn create_round(&self, request: CreateRoundRequest) -> BoxFuture<'static, ApiResult<Round>>;
    /// Partially update a round.
    fn update_round(
        &self,
        id: Uuid,
        request: UpdateRoundRequest,
    ) -> BoxFuture<'static, ApiResult<Round>>;
    /// Delete a round.
    fn delete_round(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>>;
    /// Close a round so participants move on.
    fn close_round(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>>;

    /// Round IDs of `event_id` already evaluated by `participant_id`.
    fn answered_rounds(
        &self,
        participant_id: Uuid,
        event_id: Uuid,
    ) -> BoxFuture<'static, ApiResult<Vec<Uuid>>>;
    /// Store one evaluation, regular or answer key.
    fn submit_evaluation(
        &self,
        evaluation: EvaluationCreate,
    ) -> BoxFuture<'static, ApiResult<EvaluationReceipt>>;

    /// Scored breakdown of the current participant for one round.
    fn my_evaluation_result(&self, round_id: Uuid)
    -> BoxFuture<'static, ApiResult<EvaluationResult>>;
    /// Aggregate score and badge of the current participant.
    fn my_event_score(&self) -> BoxFuture<'static, ApiResult<EventScore>>;
}
