/// Error types returned by scoring API implementations.
pub mod error;
/// HTTP implementation of the scoring API.
pub mod http;
/// Scoring API abstraction consumed by the services.
pub mod scoring_api;

#[cfg(test)]
pub(crate) mod memory;
