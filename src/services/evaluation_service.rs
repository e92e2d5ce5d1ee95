use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::sleep};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::scoring_api::ScoringApi,
    error::FlowError,
    services::round_resolver::resolve_pending_round,
    session::{EvaluationDraft, SessionStore},
    state::{
        form::{EvaluationForm, FormError, INCOMPLETE_MESSAGE},
        state_machine::{
            EvaluationStateMachine, FormEvent, FormPhase, Resolution, Snapshot, Ticket,
            TransitionError,
        },
    },
};

/// Shown when a submission is refused by the server.
pub const SUBMIT_ERROR_MESSAGE: &str = "Erro ao enviar avaliação.";
/// Shown when closing a round fails.
pub const CLOSE_ROUND_ERROR_MESSAGE: &str = "Erro ao fechar a rodada.";
/// Shown when closing the event fails.
pub const CLOSE_EVENT_ERROR_MESSAGE: &str = "Erro ao fechar o evento.";

const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(800);

/// Tunables of the evaluation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowOptions {
    /// Pause between a successful submission and the next resolution.
    pub settle_delay: Duration,
    /// Restore a saved draft when its round is loaded again.
    pub restore_drafts: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            restore_drafts: false,
        }
    }
}

/// Drives one user's [`EvaluationStateMachine`] against the scoring API.
///
/// The machine lock is never held across a request. Responses that no longer match the
/// machine (stale resolution, event closed in the meantime) are dropped.
pub struct EvaluationFlow {
    api: Arc<dyn ScoringApi>,
    session: SessionStore,
    machine: Mutex<EvaluationStateMachine>,
    event_id: Uuid,
    participant_id: Uuid,
    options: FlowOptions,
}

impl EvaluationFlow {
    /// Flow for `participant_id` in `event_id`; `is_answer_key` selects the organizer rules.
    pub fn new(
        api: Arc<dyn ScoringApi>,
        session: SessionStore,
        event_id: Uuid,
        participant_id: Uuid,
        is_answer_key: bool,
        options: FlowOptions,
    ) -> Self {
        Self {
            api,
            session,
            machine: Mutex::new(EvaluationStateMachine::new(is_answer_key)),
            event_id,
            participant_id,
            options,
        }
    }

    /// Event this flow evaluates.
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Current state of the form.
    pub async fn snapshot(&self) -> Snapshot {
        self.machine.lock().await.snapshot()
    }

    /// Resolve the next round to show and load it into an empty form.
    pub async fn load_pending_round(&self) -> Result<Snapshot, FlowError> {
        let (ticket, is_answer_key) = {
            let mut machine = self.machine.lock().await;
            if matches!(machine.phase(), FormPhase::Finished) {
                return Ok(machine.snapshot());
            }
            (Self::start_resolution(&mut machine)?, machine.is_answer_key())
        };

        let resolution = resolve_pending_round(
            self.api.as_ref(),
            self.event_id,
            self.participant_id,
            is_answer_key,
        )
        .await;
        self.apply_resolution(ticket, resolution).await
    }

    /// Re-resolve while the waiting screen is shown and load a round opened since.
    ///
    /// Any other phase, or a resolution that still finds nothing, leaves the machine as
    /// it is.
    pub async fn check_for_new_round(&self) -> Result<Snapshot, FlowError> {
        let (version, is_answer_key) = {
            let machine = self.machine.lock().await;
            if !matches!(machine.phase(), FormPhase::Waiting { .. }) {
                return Ok(machine.snapshot());
            }
            (machine.version(), machine.is_answer_key())
        };

        let resolution = resolve_pending_round(
            self.api.as_ref(),
            self.event_id,
            self.participant_id,
            is_answer_key,
        )
        .await;
        if resolution == Resolution::Waiting {
            return Ok(self.snapshot().await);
        }

        let ticket = {
            let mut machine = self.machine.lock().await;
            if machine.version() != version {
                debug!(event_id = %self.event_id, "phase changed while checking for a new round");
                return Ok(machine.snapshot());
            }
            Self::start_resolution(&mut machine)?
        };
        info!(event_id = %self.event_id, "new round opened while waiting");
        self.apply_resolution(ticket, resolution).await
    }

    fn start_resolution(machine: &mut EvaluationStateMachine) -> Result<Ticket, FlowError> {
        machine.apply(FormEvent::ResolveStarted)?;
        machine.pending_ticket().ok_or_else(|| {
            FlowError::InvalidState("round resolution started without a ticket".into())
        })
    }

    async fn apply_resolution(
        &self,
        ticket: Ticket,
        resolution: Resolution,
    ) -> Result<Snapshot, FlowError> {
        let restored = {
            let mut machine = self.machine.lock().await;
            let applied = machine
                .apply(FormEvent::RoundResolved {
                    ticket,
                    resolution: resolution.clone(),
                })
                .map(FormPhase::name);
            match applied {
                Ok(phase) => info!(
                    event_id = %self.event_id,
                    phase,
                    ticket,
                    "round resolution applied"
                ),
                Err(TransitionError::Stale { expected, got }) => {
                    debug!(?expected, got, "discarding stale round resolution");
                    return Ok(machine.snapshot());
                }
                Err(err) => return Err(err.into()),
            }

            match &resolution {
                Resolution::Round(round) => {
                    let fields = self.restorable_draft(round.round_id).await;
                    if let (Some(fields), Some(form)) = (fields, machine.form_mut()) {
                        debug!(round_id = %round.round_id, "restored evaluation draft");
                        *form = fields;
                    }
                    let form = machine
                        .phase()
                        .active_round()
                        .map(|active| active.form.clone())
                        .unwrap_or_default();
                    Some((round.round_id, form))
                }
                Resolution::AwaitingClose(_) | Resolution::Waiting => None,
            }
        };

        if let Some((round_id, form)) = restored {
            self.save_draft(round_id, form).await;
        }
        Ok(self.snapshot().await)
    }

    /// Edit the answers of the active round. Fails unless the form is editable.
    pub async fn edit<F>(&self, update: F) -> Result<Snapshot, FlowError>
    where
        F: FnOnce(&mut EvaluationForm),
    {
        let (round_id, form, snapshot) = {
            let mut machine = self.machine.lock().await;
            let form = {
                let Some(form) = machine.form_mut() else {
                    return Err(FlowError::InvalidState(
                        "the evaluation form is not editable now".into(),
                    ));
                };
                update(form);
                form.clone()
            };
            let round_id = machine
                .phase()
                .active_round()
                .map(|active| active.round.round_id)
                .unwrap_or_default();
            (round_id, form, machine.snapshot())
        };

        self.save_draft(round_id, form).await;
        Ok(snapshot)
    }

    /// Clear every answer of the active round and drop its draft.
    pub async fn reset_form(&self) -> Result<Snapshot, FlowError> {
        let snapshot = {
            let mut machine = self.machine.lock().await;
            let Some(form) = machine.form_mut() else {
                return Err(FlowError::InvalidState(
                    "the evaluation form is not editable now".into(),
                ));
            };
            form.reset();
            machine.snapshot()
        };
        self.clear_draft().await;
        Ok(snapshot)
    }

    /// Submit the active round.
    ///
    /// A regular evaluation moves on to the next round after the settle delay; an answer
    /// key locks the form until the round is closed.
    pub async fn submit(&self) -> Result<Snapshot, FlowError> {
        let (payload, is_answer_key) = {
            let mut machine = self.machine.lock().await;
            let Some(active) = (match machine.phase() {
                FormPhase::Active(active) => Some(active.clone()),
                _ => None,
            }) else {
                return Err(FlowError::InvalidState(
                    "no round is ready for submission".into(),
                ));
            };

            let is_answer_key = machine.is_answer_key();
            match active
                .form
                .to_payload(self.participant_id, active.round.round_id, is_answer_key)
            {
                Ok(payload) => {
                    machine.apply(FormEvent::SubmitStarted)?;
                    (payload, is_answer_key)
                }
                Err(err) => {
                    let message = match &err {
                        FormError::Incomplete { missing } => {
                            debug!(?missing, "evaluation incomplete");
                            INCOMPLETE_MESSAGE.to_string()
                        }
                        FormError::Invalid(_) => err.to_string(),
                    };
                    machine.apply(FormEvent::ValidationFailed(message.clone()))?;
                    return Err(FlowError::Validation(message));
                }
            }
        };

        let round_id = payload.round_id;
        let result = self.api.submit_evaluation(payload).await;

        match result {
            Ok(receipt) => {
                {
                    let mut machine = self.machine.lock().await;
                    if let Err(err) = machine.apply(FormEvent::SubmitSucceeded) {
                        debug!(error = %err, "ignoring submission result");
                        return Ok(machine.snapshot());
                    }
                }
                info!(
                    %round_id,
                    evaluation_id = %receipt.id,
                    is_answer_key,
                    "evaluation submitted"
                );
                self.clear_draft().await;

                if is_answer_key {
                    return Ok(self.snapshot().await);
                }
                sleep(self.options.settle_delay).await;
                self.load_pending_round().await
            }
            Err(err) => {
                let err = FlowError::from(err);
                warn!(%round_id, error = %err, "evaluation submission failed");
                let mut machine = self.machine.lock().await;
                let message = err.user_message_or(SUBMIT_ERROR_MESSAGE);
                if let Err(transition) = machine.apply(FormEvent::SubmitFailed(message)) {
                    debug!(error = %transition, "ignoring submission failure");
                }
                Err(err)
            }
        }
    }

    /// Close the round whose answer key was just stored, then resolve the next one.
    pub async fn close_round(&self) -> Result<Snapshot, FlowError> {
        let round_id = {
            let mut machine = self.machine.lock().await;
            let round_id = match machine.phase() {
                FormPhase::LockedForClose(active) => active.round.round_id,
                _ => {
                    return Err(FlowError::InvalidState(
                        "no round is waiting to be closed".into(),
                    ));
                }
            };
            machine.apply(FormEvent::CloseRoundStarted)?;
            round_id
        };

        match self.api.close_round(round_id).await {
            Ok(()) => {
                {
                    let mut machine = self.machine.lock().await;
                    if let Err(err) = machine.apply(FormEvent::CloseRoundSucceeded) {
                        debug!(error = %err, "ignoring close-round result");
                        return Ok(machine.snapshot());
                    }
                }
                info!(%round_id, "round closed");
                self.load_pending_round().await
            }
            Err(err) => {
                let err = FlowError::from(err);
                warn!(%round_id, error = %err, "failed to close round");
                let mut machine = self.machine.lock().await;
                let message = err.user_message_or(CLOSE_ROUND_ERROR_MESSAGE);
                if let Err(transition) = machine.apply(FormEvent::CloseRoundFailed(message)) {
                    debug!(error = %transition, "ignoring close-round failure");
                }
                Err(err)
            }
        }
    }

    /// Close the whole event. Organizer only, once every round is done.
    pub async fn close_event(&self) -> Result<Snapshot, FlowError> {
        {
            let mut machine = self.machine.lock().await;
            machine.apply(FormEvent::CloseEventStarted)?;
        }

        let result = self.api.close_event(self.event_id).await;
        let mut machine = self.machine.lock().await;
        match result {
            Ok(()) => {
                match machine.apply(FormEvent::CloseEventSucceeded) {
                    Ok(_) => info!(event_id = %self.event_id, "event closed by organizer"),
                    Err(err) => debug!(error = %err, "ignoring close-event result"),
                }
                Ok(machine.snapshot())
            }
            Err(err) => {
                let err = FlowError::from(err);
                warn!(event_id = %self.event_id, error = %err, "failed to close event");
                let message = err.user_message_or(CLOSE_EVENT_ERROR_MESSAGE);
                if let Err(transition) = machine.apply(FormEvent::CloseEventFailed(message)) {
                    debug!(error = %transition, "ignoring close-event failure");
                }
                Err(err)
            }
        }
    }

    /// Move to the terminal phase after the event was observed closed. Idempotent.
    pub async fn mark_event_closed(&self) -> Snapshot {
        let mut machine = self.machine.lock().await;
        let version = machine.version();
        if machine.apply(FormEvent::EventClosed).is_ok() && machine.version() != version {
            info!(event_id = %self.event_id, "evaluation finished: event closed");
        }
        machine.snapshot()
    }

    async fn restorable_draft(&self, round_id: Uuid) -> Option<EvaluationForm> {
        if !self.options.restore_drafts {
            return None;
        }
        self.session
            .draft()
            .await
            .filter(|draft| draft.belongs_to(self.event_id, round_id, self.participant_id))
            .map(|draft| draft.fields)
    }

    async fn save_draft(&self, round_id: Uuid, fields: EvaluationForm) {
        let draft = EvaluationDraft::capture(self.event_id, round_id, self.participant_id, fields);
        if let Err(err) = self.session.save_draft(draft).await {
            warn!(error = %err, "failed to save evaluation draft");
        }
    }

    async fn clear_draft(&self) {
        if let Err(err) = self.session.clear_draft().await {
            warn!(error = %err, "failed to clear evaluation draft");
        }
    }
}
