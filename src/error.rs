use thiserror::Error;

use crate::{
    dao::error::{ApiError, UNAVAILABLE_MESSAGE},
    session::SessionError,
    state::{shell::InvalidNavigation, state_machine::TransitionError},
};

/// Errors that can occur in service layer operations.
///
/// None of them is fatal: every variant maps to a message the user can act on.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),
    /// The server refused a well-formed request.
    #[error("{message}")]
    Application {
        /// Message returned by the server.
        message: String,
        /// Rejection as reported by the gateway.
        #[source]
        source: ApiError,
    },
    /// The server could not be reached. Safe to retry.
    #[error("Sistema indisponível")]
    Unavailable(#[source] ApiError),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// No user is signed in, or the signed-in role cannot do this.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The local session file could not be written.
    #[error("failed to update local session")]
    Session(#[from] SessionError),
}

impl FlowError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Unavailable(_) => UNAVAILABLE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Like [`Self::user_message`], but replaces server-side detail with `fallback`.
    ///
    /// Used by the evaluation form, which shows one fixed message per action.
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            FlowError::Unavailable(_) => UNAVAILABLE_MESSAGE.to_string(),
            FlowError::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FlowError::Unavailable(_))
    }
}

impl From<ApiError> for FlowError {
    fn from(err: ApiError) -> Self {
        if err.is_unavailable() {
            FlowError::Unavailable(err)
        } else {
            FlowError::Application {
                message: err.to_string(),
                source: err,
            }
        }
    }
}

impl From<TransitionError> for FlowError {
    fn from(err: TransitionError) -> Self {
        FlowError::InvalidState(err.to_string())
    }
}

impl From<InvalidNavigation> for FlowError {
    fn from(err: InvalidNavigation) -> Self {
        FlowError::InvalidState(err.to_string())
    }
}
