/// Organizer login, participant join and logout.
pub mod auth_service;
/// Events and rounds CRUD for the organizer.
pub mod catalog_service;
/// Async driver of the evaluation state machine.
pub mod evaluation_service;
/// Shared polling of event open/closed status.
pub mod event_watcher;
/// Standings, answer keys and participant results.
pub mod results_service;
/// Next-round resolution for a participant.
pub mod round_resolver;
/// I/O side of the screen router.
pub mod shell_service;
