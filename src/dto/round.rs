use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One wine sample of an event, evaluated in ascending `position` order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Round {
    /// Round identifier.
    pub id: Uuid,
    /// Round name, usually the wine sample label.
    pub name: String,
    /// Evaluation order within the event.
    pub position: i32,
    /// Whether evaluations are still accepted.
    pub is_open: bool,
    /// Owning event.
    pub event_id: Uuid,
}

/// Payload used to create a round. The server assigns the next position when omitted.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateRoundRequest {
    /// Round name.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Explicit position, if any.
    #[validate(range(min = 1))]
    pub position: Option<i32>,
    /// Owning event.
    pub event_id: Uuid,
}

/// Partial update of a round. Absent fields are left untouched by the server.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateRoundRequest {
    /// New name.
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    /// New position.
    #[validate(range(min = 1))]
    pub position: Option<i32>,
    /// Open or close the round.
    pub is_open: Option<bool>,
}

impl UpdateRoundRequest {
    /// True when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.position.is_none() && self.is_open.is_none()
    }
}
