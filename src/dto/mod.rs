use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Login and join payloads.
pub mod auth;
pub mod evaluation;
/// Tasting events.
pub mod event;
pub mod origin;
pub mod results;
/// Rounds of an event.
pub mod round;
pub mod scale;
pub mod validation;

pub(crate) fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
