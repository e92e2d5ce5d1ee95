use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Tasting event as exposed by `/events`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Event identifier.
    pub id: Uuid,
    /// Event name.
    pub name: String,
    /// Code participants join with, if any.
    #[serde(default)]
    pub access_code: Option<String>,
    /// Whether rounds and evaluations are still accepted.
    pub is_open: bool,
}

/// Payload used to create a new event.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateEventRequest {
    /// Event name.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Optional join code.
    #[validate(length(min = 1, max = 64))]
    pub access_code: Option<String>,
}

/// Minimal acknowledgement returned when toggling the open flag of an event.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EventOpenState {
    /// Event identifier.
    pub id: Uuid,
    /// Open flag after the update.
    pub is_open: bool,
}
