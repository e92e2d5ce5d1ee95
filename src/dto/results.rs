//! Read-only standings and scored breakdowns computed by the server.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of the event ranking. Tied scores share a position.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RankingEntry {
    /// Ranked participant.
    pub participant_id: Uuid,
    /// Display name.
    pub participant_name: String,
    /// Rank, starting at 1.
    pub position: u32,
    /// Share of the maximum score, in percent.
    #[serde(rename = "participant_percentual", alias = "percentual", default)]
    pub percentual: f64,
    /// Points over every round.
    pub total_score: i64,
}

/// A participant sharing the top score of an event.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EventWinner {
    /// Winning participant.
    pub participant_id: Uuid,
    /// Display name.
    pub participant_name: String,
    /// Share of the maximum score, in percent.
    #[serde(rename = "participant_percentual", alias = "percentual", default)]
    pub percentual: f64,
    /// Points over every round.
    pub total_score: i64,
}

/// Winners of an event; more than one entry means a tie.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EventWinners {
    /// Event the winners belong to.
    pub event_id: Uuid,
    /// Participants sharing the top score.
    #[serde(default)]
    pub winners: Vec<EventWinner>,
}

impl EventWinners {
    /// Whether more than one participant shares the top score.
    pub fn is_tie(&self) -> bool {
        self.winners.len() > 1
    }
}

/// Outcome of comparing one attribute with the answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// Matches the answer key.
    Correct,
    /// Does not match.
    Wrong,
    /// Close enough for partial credit.
    Partial,
}

/// One attribute of a scored evaluation, next to the reference answer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResultItem {
    /// Attribute key.
    pub key: String,
    /// Display name of the attribute.
    pub label: String,
    /// Participant answer, formatted.
    pub participant: String,
    /// Reference answer, formatted.
    pub answer_key: String,
    /// Comparison outcome.
    pub status: ResultStatus,
}

/// Group of attributes (visual, olfactory, ...) of a scored evaluation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResultBlock {
    /// Block key.
    pub key: String,
    /// Display name of the block.
    pub label: String,
    /// Attributes of the block.
    #[serde(default)]
    pub items: Vec<ResultItem>,
}

/// Per-round scored breakdown from `/results/my-evaluation`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EvaluationResult {
    /// Round scored.
    pub round_id: Uuid,
    /// Attribute groups of the breakdown.
    #[serde(default)]
    pub blocks: Vec<ResultBlock>,
}

impl EvaluationResult {
    /// Count of items per status across all blocks, as `(correct, partial, wrong)`.
    pub fn tally(&self) -> (usize, usize, usize) {
        self.blocks
            .iter()
            .flat_map(|block| block.items.iter())
            .fold((0, 0, 0), |(c, p, w), item| match item.status {
                ResultStatus::Correct => (c + 1, p, w),
                ResultStatus::Partial => (c, p + 1, w),
                ResultStatus::Wrong => (c, p, w + 1),
            })
    }
}

/// Aggregate score of the current participant for its event.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EventScore {
    /// Points over every round.
    pub total_score: i64,
    /// Share of the maximum score, in percent.
    pub percentual: f64,
    /// Badge display name.
    pub badge: String,
    /// Stable badge key.
    pub badge_key: String,
}

impl EventScore {
    /// Tier named by `badge_key`.
    pub fn tier(&self) -> BadgeTier {
        BadgeTier::from_key(&self.badge_key)
    }
}

/// Everything shown on the participant result screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantResults {
    /// One breakdown per round, in the order the rounds were listed.
    pub rounds: Vec<EvaluationResult>,
    /// Aggregate score and badge.
    pub score: EventScore,
}

/// Tier label derived server-side from the aggregate score percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeTier {
    /// Lowest tier.
    Iniciante,
    /// Second tier.
    Explorador,
    /// Third tier.
    Entusiasta,
    /// Fourth tier.
    Experiente,
    /// Highest tier.
    Especialista,
    /// Key not known to this client; kept verbatim.
    Other(String),
}

impl BadgeTier {
    /// Parse a badge key, keeping unknown keys verbatim.
    pub fn from_key(key: &str) -> Self {
        match key {
            "iniciante" => BadgeTier::Iniciante,
            "explorador" => BadgeTier::Explorador,
            "entusiasta" => BadgeTier::Entusiasta,
            // the badge artwork names this tier "conhecedor"
            "experiente" | "conhecedor" => BadgeTier::Experiente,
            "especialista" => BadgeTier::Especialista,
            other => BadgeTier::Other(other.to_string()),
        }
    }

    /// Rank from 1 (iniciante) to 5 (especialista); `None` for unknown keys.
    pub fn level(&self) -> Option<u8> {
        match self {
            BadgeTier::Iniciante => Some(1),
            BadgeTier::Explorador => Some(2),
            BadgeTier::Entusiasta => Some(3),
            BadgeTier::Experiente => Some(4),
            BadgeTier::Especialista => Some(5),
            BadgeTier::Other(_) => None,
        }
    }
}
