use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Credentials sent by the organizer to `/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Organizer name.
    pub name: String,
    /// Organizer password.
    pub password: String,
}

/// Identity returned once the organizer is authenticated.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoginResponse {
    /// Identifier attached to later requests.
    pub participant_id: Uuid,
    /// Display name.
    pub name: String,
    /// Whether the account may manage events.
    #[serde(default)]
    pub is_sommelier: bool,
}

/// Payload used by a participant to join an event with its access code.
#[derive(Debug, Clone, Serialize)]
pub struct JoinRequest {
    /// Display name of the participant.
    pub name: String,
    /// Access code of the event.
    pub event_code: String,
}

/// Identity returned to a participant after joining an event.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JoinResponse {
    /// Identifier attached to later requests.
    pub participant_id: Uuid,
    /// Display name.
    pub name: String,
    /// Event joined.
    pub event_id: Uuid,
    /// Access code used to join.
    pub event_code: String,
}
