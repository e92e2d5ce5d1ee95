//! Pure client state: form fields, the evaluation state machine and screen routing.

/// Field state and validation of the tasting sheet.
pub mod form;
/// Screen routing between login, organizer and participant views.
pub mod shell;
/// Phases of the evaluation form and their transitions.
pub mod state_machine;
