mod client;
mod config;

pub use client::{HttpScoringApi, PARTICIPANT_HEADER};
pub use config::ApiClientConfig;
