//! Client library for the Savoir-Vin blind tasting scoring API, exposing the API gateway,
//! the evaluation flow and the screen shell to the command-line front end and to tests.

pub mod config;
/// Scoring API gateway and its HTTP implementation.
pub mod dao;
/// Wire payloads of the scoring API.
pub mod dto;
/// Errors surfaced to the front end.
pub mod error;
/// Operations combining the API, the session and the state machines.
pub mod services;
pub mod session;
pub mod state;
