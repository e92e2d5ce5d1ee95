//! Read side of a finished event: standings, the organizer's answer key and the
//! participant's own scored breakdown.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{http::HttpScoringApi, scoring_api::ScoringApi},
    dto::{
        evaluation::AnswerKeyItem,
        results::{EventWinners, ParticipantResults, RankingEntry},
    },
    error::FlowError,
};

/// Shown when results are requested for an event without rounds.
pub const NO_ROUNDS_MESSAGE: &str = "Nenhum round encontrado para este evento.";
/// Server path of the participant's PDF report.
pub const RESULTS_PDF_PATH: &str = "/results/pdf";
/// File name used when no destination is given for the PDF report.
pub const DEFAULT_PDF_FILE_NAME: &str = "resultado-avaliacao.pdf";

/// Ranking and winners of one event, fetched together.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStandings {
    /// Ranking ordered by position.
    pub ranking: Vec<RankingEntry>,
    /// Participants sharing the top score.
    pub winners: EventWinners,
}

/// Ranking ordered by position; ties keep the server's order.
pub async fn event_ranking(
    api: &dyn ScoringApi,
    event_id: Uuid,
) -> Result<Vec<RankingEntry>, FlowError> {
    let mut ranking = api.event_ranking(event_id).await?;
    ranking.sort_by_key(|entry| entry.position);
    Ok(ranking)
}

/// Participants sharing the top score.
pub async fn event_winners(
    api: &dyn ScoringApi,
    event_id: Uuid,
) -> Result<EventWinners, FlowError> {
    Ok(api.event_winners(event_id).await?)
}

/// Ranking and winners, requested concurrently.
pub async fn event_standings(
    api: &dyn ScoringApi,
    event_id: Uuid,
) -> Result<EventStandings, FlowError> {
    let (ranking, winners) =
        tokio::try_join!(event_ranking(api, event_id), event_winners(api, event_id))?;
    Ok(EventStandings { ranking, winners })
}

/// Reference answers of every round.
pub async fn answer_key(
    api: &dyn ScoringApi,
    event_id: Uuid,
) -> Result<Vec<AnswerKeyItem>, FlowError> {
    Ok(api.event_answer_key(event_id).await?)
}

/// IDs of every round of `event_id`, open or closed, in evaluation order.
pub async fn round_ids(api: &dyn ScoringApi, event_id: Uuid) -> Result<Vec<Uuid>, FlowError> {
    let mut rounds = api.list_rounds(event_id).await?;
    rounds.sort_by_key(|round| round.position);
    Ok(rounds.into_iter().map(|round| round.id).collect())
}

/// Scored breakdown of every round in `round_ids` plus the aggregate score.
///
/// All requests run concurrently; the first failure aborts the whole load.
pub async fn participant_results(
    api: &dyn ScoringApi,
    round_ids: &[Uuid],
) -> Result<ParticipantResults, FlowError> {
    if round_ids.is_empty() {
        return Err(FlowError::Validation(NO_ROUNDS_MESSAGE.to_string()));
    }

    let per_round = try_join_all(
        round_ids
            .iter()
            .map(|round_id| api.my_evaluation_result(*round_id)),
    );
    let (rounds, score) = tokio::try_join!(per_round, api.my_event_score())?;
    debug!(rounds = rounds.len(), badge = %score.badge_key, "participant results loaded");
    Ok(ParticipantResults { rounds, score })
}

/// Save the participant's PDF report. A directory destination receives the default name.
pub async fn download_results_pdf(
    api: &HttpScoringApi,
    destination: Option<&Path>,
) -> Result<PathBuf, FlowError> {
    let destination = match destination {
        Some(path) => {
            let is_dir = tokio::fs::metadata(path)
                .await
                .is_ok_and(|metadata| metadata.is_dir());
            if is_dir {
                path.join(DEFAULT_PDF_FILE_NAME)
            } else {
                path.to_path_buf()
            }
        }
        None => PathBuf::from(DEFAULT_PDF_FILE_NAME),
    };
    let written = api.download(RESULTS_PDF_PATH, &destination).await?;
    info!(file = %written.display(), "results PDF saved");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::{
        dao::memory::{Failure, MemoryScoringApi},
        dto::results::{EvaluationResult, EventScore, EventWinner},
    };

    fn entry(name: &str, position: u32, total_score: i64) -> RankingEntry {
        RankingEntry {
            participant_id: Uuid::new_v4(),
            participant_name: name.into(),
            position,
            percentual: total_score as f64,
            total_score,
        }
    }

    fn score() -> EventScore {
        EventScore {
            total_score: 42,
            percentual: 70.0,
            badge: "Entusiasta".into(),
            badge_key: "entusiasta".into(),
        }
    }

    #[tokio::test]
    async fn standings_are_ordered_and_keep_ties() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Degustação", false);
        let ana = entry("Ana", 1, 30);
        let bia = entry("Bia", 1, 30);
        api.set_ranking(event_id, vec![entry("Caio", 3, 10), ana.clone(), bia.clone()]);
        api.set_winners(EventWinners {
            event_id,
            winners: [&ana, &bia]
                .into_iter()
                .map(|entry| EventWinner {
                    participant_id: entry.participant_id,
                    participant_name: entry.participant_name.clone(),
                    percentual: entry.percentual,
                    total_score: entry.total_score,
                })
                .collect(),
        });

        let standings = event_standings(&api, event_id).await.unwrap();
        let names: Vec<_> = standings
            .ranking
            .iter()
            .map(|entry| entry.participant_name.as_str())
            .collect();
        assert_eq!(names, ["Ana", "Bia", "Caio"]);
        assert!(standings.winners.is_tie());
    }

    #[tokio::test]
    async fn event_without_rounds_has_no_results() {
        let api = MemoryScoringApi::new();
        let err = participant_results(&api, &[]).await.unwrap_err();
        assert_eq!(err.user_message(), NO_ROUNDS_MESSAGE);
        assert_eq!(api.calls("my_event_score"), 0);
    }

    #[tokio::test]
    async fn results_cover_every_round() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Degustação", false);
        let second = api.add_round(event_id, "Vinho 2", 2, false);
        let first = api.add_round(event_id, "Vinho 1", 1, false);
        for round_id in [first, second] {
            api.set_result(EvaluationResult {
                round_id,
                blocks: Vec::new(),
            });
        }
        api.set_event_score(score());

        let ids = round_ids(&api, event_id).await.unwrap();
        assert_eq!(ids, vec![first, second]);

        let results = participant_results(&api, &ids).await.unwrap();
        let loaded: Vec<_> = results.rounds.iter().map(|round| round.round_id).collect();
        assert_eq!(loaded, ids);
        assert_eq!(results.score, score());
        assert_eq!(api.calls("my_evaluation_result"), 2);
    }

    #[tokio::test]
    async fn one_failing_round_fails_the_load() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Degustação", false);
        let round_id = api.add_round(event_id, "Vinho 1", 1, false);
        api.set_result(EvaluationResult {
            round_id,
            blocks: Vec::new(),
        });
        api.set_event_score(score());
        api.fail_next(
            "my_evaluation_result",
            Failure::Rejected(StatusCode::NOT_FOUND, "Avaliação não encontrada"),
        );

        let err = participant_results(&api, &[round_id]).await.unwrap_err();
        assert_eq!(err.user_message(), "Avaliação não encontrada");
    }
}
