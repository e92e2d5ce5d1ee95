use thiserror::Error;
use uuid::Uuid;

use crate::state::form::EvaluationForm;

/// Version stamp issued when a round resolution starts.
pub type Ticket = usize;

/// Waiting message shown to the organizer once every round is closed.
pub const ORGANIZER_WAITING_MESSAGE: &str = "Todos os rounds foram finalizados.";
/// Waiting message shown to participants with nothing left to evaluate.
pub const PARTICIPANT_WAITING_MESSAGE: &str = "Aguarde a finalização do evento.";

/// The round the current user must evaluate next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRound {
    /// Round identifier.
    pub round_id: Uuid,
    /// Round name.
    pub round_name: String,
    /// Evaluation order within the event.
    pub position: i32,
}

/// Outcome of a round resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A round to fill in.
    Round(PendingRound),
    /// The organizer already stored this open round's answer key; it must be closed next.
    AwaitingClose(PendingRound),
    /// No open round is left for this user.
    Waiting,
}

/// Round loaded into the form together with its answers and the last error shown.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRound {
    /// Round shown.
    pub round: PendingRound,
    /// Answers typed so far.
    pub form: EvaluationForm,
    /// Error shown above the form.
    pub error: Option<String>,
}

impl ActiveRound {
    fn new(round: PendingRound) -> Self {
        Self {
            round,
            form: EvaluationForm::default(),
            error: None,
        }
    }

    fn with_error(self, error: Option<String>) -> Self {
        Self { error, ..self }
    }
}

/// Phases of the evaluation form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPhase {
    /// Resolving which round to show; only a resolution carrying `ticket` is accepted.
    LoadingRound {
        /// Ticket of the resolution in flight.
        ticket: Ticket,
    },
    /// Form is editable.
    Active(ActiveRound),
    /// Submission in flight; the form is read-only.
    Submitting(ActiveRound),
    /// Answer key stored; only the close-round action is available.
    LockedForClose(ActiveRound),
    /// Close-round request in flight.
    Closing(ActiveRound),
    /// Nothing left to evaluate for now.
    Waiting {
        /// Error of the last failed close-event attempt.
        error: Option<String>,
    },
    /// Close-event request in flight.
    ClosingEvent,
    /// The event is closed. Terminal.
    Finished,
}

impl FormPhase {
    /// Stable name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            FormPhase::LoadingRound { .. } => "loading_round",
            FormPhase::Active(_) => "active",
            FormPhase::Submitting(_) => "submitting",
            FormPhase::LockedForClose(_) => "locked_for_close",
            FormPhase::Closing(_) => "closing",
            FormPhase::Waiting { .. } => "waiting",
            FormPhase::ClosingEvent => "closing_event",
            FormPhase::Finished => "finished",
        }
    }

    /// Round shown on screen, if any.
    pub fn active_round(&self) -> Option<&ActiveRound> {
        match self {
            FormPhase::Active(round)
            | FormPhase::Submitting(round)
            | FormPhase::LockedForClose(round)
            | FormPhase::Closing(round) => Some(round),
            _ => None,
        }
    }

    /// Error message currently displayed.
    pub fn error(&self) -> Option<&str> {
        match self {
            FormPhase::Waiting { error } => error.as_deref(),
            other => other.active_round().and_then(|round| round.error.as_deref()),
        }
    }
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// A round resolution is about to start.
    ResolveStarted,
    /// A resolution finished; `ticket` is the one issued by `ResolveStarted`.
    RoundResolved {
        /// Ticket of the resolution.
        ticket: Ticket,
        /// Outcome.
        resolution: Resolution,
    },
    /// Submission request sent.
    SubmitStarted,
    /// Local checks refused the submission; no request was sent.
    ValidationFailed(String),
    /// Server stored the evaluation.
    SubmitSucceeded,
    /// Submission failed with this message.
    SubmitFailed(String),
    /// Close-round request sent.
    CloseRoundStarted,
    /// Round closed.
    CloseRoundSucceeded,
    /// Close-round failed with this message.
    CloseRoundFailed(String),
    /// Close-event request sent.
    CloseEventStarted,
    /// Event closed.
    CloseEventSucceeded,
    /// Close-event failed with this message.
    CloseEventFailed(String),
    /// The event was observed closed.
    EventClosed,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: FormPhase,
    /// The event that cannot be applied from this phase.
    pub event: FormEvent,
}

/// Errors that can occur when applying an event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    /// The event does not apply to the current phase.
    #[error(transparent)]
    Invalid(#[from] InvalidTransition),
    /// A resolution arrived after a newer one was started, or after leaving the loading phase.
    #[error("stale round resolution {got} (expected {expected:?})")]
    Stale {
        /// Ticket awaited, if still loading.
        expected: Option<Ticket>,
        /// Ticket received.
        got: Ticket,
    },
}

/// Action offered to the user in the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    /// Submit the evaluation.
    Submit,
    /// Close the current round.
    CloseRound,
    /// Close the event.
    CloseEvent,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: FormPhase,
    /// Version number of the state machine (increments on each transition).
    pub version: usize,
    /// Whether the flow enters the answer key.
    pub is_answer_key: bool,
}

impl Snapshot {
    /// Controls rendered for this phase. Anything not listed is disabled.
    pub fn actions(&self) -> Vec<FormAction> {
        match &self.phase {
            FormPhase::Active(_) => vec![FormAction::Submit],
            FormPhase::LockedForClose(_) => vec![FormAction::CloseRound],
            FormPhase::Waiting { .. } if self.is_answer_key => vec![FormAction::CloseEvent],
            _ => Vec::new(),
        }
    }

    /// Role-specific text of the waiting screen.
    pub fn waiting_message(&self) -> Option<&'static str> {
        match self.phase {
            FormPhase::Waiting { .. } if self.is_answer_key => Some(ORGANIZER_WAITING_MESSAGE),
            FormPhase::Waiting { .. } => Some(PARTICIPANT_WAITING_MESSAGE),
            _ => None,
        }
    }
}

/// State machine driving a single user's evaluation form through an event.
///
/// The role is fixed at construction: an answer-key machine locks after each submission
/// until the organizer closes the round, a regular one moves straight to the next round.
#[derive(Debug, Clone)]
pub struct EvaluationStateMachine {
    phase: FormPhase,
    version: usize,
    is_answer_key: bool,
}

impl EvaluationStateMachine {
    /// Machine waiting for its first round resolution.
    pub fn new(is_answer_key: bool) -> Self {
        Self {
            phase: FormPhase::LoadingRound { ticket: 0 },
            version: 0,
            is_answer_key,
        }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    /// Transition counter.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Whether this machine follows the answer-key rules.
    pub fn is_answer_key(&self) -> bool {
        self.is_answer_key
    }

    /// Copy of the phase with its version and role.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase.clone(),
            version: self.version,
            is_answer_key: self.is_answer_key,
        }
    }

    /// Ticket the next accepted resolution must carry, while loading.
    pub fn pending_ticket(&self) -> Option<Ticket> {
        match self.phase {
            FormPhase::LoadingRound { ticket } => Some(ticket),
            _ => None,
        }
    }

    /// Mutable access to the answers, only while the form is editable.
    pub fn form_mut(&mut self) -> Option<&mut EvaluationForm> {
        match &mut self.phase {
            FormPhase::Active(round) => Some(&mut round.form),
            _ => None,
        }
    }

    /// Apply `event`, returning the new phase.
    pub fn apply(&mut self, event: FormEvent) -> Result<&FormPhase, TransitionError> {
        if matches!(
            (&self.phase, &event),
            (FormPhase::Finished, FormEvent::EventClosed)
        ) {
            return Ok(&self.phase);
        }

        if let FormEvent::RoundResolved { ticket, .. } = &event {
            let expected = self.pending_ticket();
            if expected != Some(*ticket) {
                return Err(TransitionError::Stale {
                    expected,
                    got: *ticket,
                });
            }
        }

        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(&self.phase)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: FormEvent) -> Result<FormPhase, InvalidTransition> {
        let next_ticket = self.version + 1;
        let next = match (self.phase.clone(), event) {
            (
                FormPhase::LoadingRound { .. } | FormPhase::Active(_) | FormPhase::Waiting { .. },
                FormEvent::ResolveStarted,
            ) => FormPhase::LoadingRound {
                ticket: next_ticket,
            },
            (
                FormPhase::LoadingRound { .. },
                FormEvent::RoundResolved {
                    resolution: Resolution::Round(round),
                    ..
                },
            ) => FormPhase::Active(ActiveRound::new(round)),
            (
                FormPhase::LoadingRound { .. },
                FormEvent::RoundResolved {
                    resolution: Resolution::AwaitingClose(round),
                    ..
                },
            ) if self.is_answer_key => FormPhase::LockedForClose(ActiveRound::new(round)),
            (
                FormPhase::LoadingRound { .. },
                FormEvent::RoundResolved {
                    resolution: Resolution::Waiting,
                    ..
                },
            ) => FormPhase::Waiting { error: None },
            (FormPhase::Active(round), FormEvent::SubmitStarted) => {
                FormPhase::Submitting(round.with_error(None))
            }
            (FormPhase::Active(round), FormEvent::ValidationFailed(message)) => {
                FormPhase::Active(round.with_error(Some(message)))
            }
            (FormPhase::Submitting(round), FormEvent::SubmitSucceeded) => {
                if self.is_answer_key {
                    FormPhase::LockedForClose(round.with_error(None))
                } else {
                    FormPhase::LoadingRound {
                        ticket: next_ticket,
                    }
                }
            }
            (FormPhase::Submitting(round), FormEvent::SubmitFailed(message)) => {
                FormPhase::Active(round.with_error(Some(message)))
            }
            (FormPhase::LockedForClose(round), FormEvent::CloseRoundStarted)
                if self.is_answer_key =>
            {
                FormPhase::Closing(round.with_error(None))
            }
            (FormPhase::Closing(_), FormEvent::CloseRoundSucceeded) => FormPhase::LoadingRound {
                ticket: next_ticket,
            },
            (FormPhase::Closing(round), FormEvent::CloseRoundFailed(message)) => {
                FormPhase::LockedForClose(round.with_error(Some(message)))
            }
            (FormPhase::Waiting { .. }, FormEvent::CloseEventStarted) if self.is_answer_key => {
                FormPhase::ClosingEvent
            }
            (FormPhase::ClosingEvent, FormEvent::CloseEventSucceeded) => FormPhase::Finished,
            (FormPhase::ClosingEvent, FormEvent::CloseEventFailed(message)) => FormPhase::Waiting {
                error: Some(message),
            },
            (_, FormEvent::EventClosed) => FormPhase::Finished,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
