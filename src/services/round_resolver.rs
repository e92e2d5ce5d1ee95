use std::collections::HashSet;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::scoring_api::ScoringApi,
    dto::round::Round,
    state::state_machine::{PendingRound, Resolution},
};

fn open_rounds(rounds: &[Round]) -> Vec<&Round> {
    let mut open: Vec<&Round> = rounds.iter().filter(|round| round.is_open).collect();
    open.sort_by_key(|round| round.position);
    open
}

fn pending(round: &Round) -> PendingRound {
    PendingRound {
        round_id: round.id,
        round_name: round.name.clone(),
        position: round.position,
    }
}

/// First open round, by ascending position, that is not in `answered`.
///
/// The sort is stable, so rounds sharing a position keep the server's order.
pub fn select_pending_round(rounds: &[Round], answered: &HashSet<Uuid>) -> Option<PendingRound> {
    open_rounds(rounds)
        .into_iter()
        .find(|round| !answered.contains(&round.id))
        .map(pending)
}

/// Round the organizer works on next: always the lowest open one.
///
/// An open round whose answer key is already stored still blocks the rounds after it
/// until it is closed.
pub fn select_answer_key_round(rounds: &[Round], answered: &HashSet<Uuid>) -> Resolution {
    match open_rounds(rounds).first() {
        Some(round) if answered.contains(&round.id) => Resolution::AwaitingClose(pending(round)),
        Some(round) => Resolution::Round(pending(round)),
        None => Resolution::Waiting,
    }
}

/// Work out which round `participant_id` must evaluate next in `event_id`.
///
/// With `is_answer_key` the organizer's rules of [`select_answer_key_round`] apply. Any
/// fetch failure resolves to [`Resolution::Waiting`]; a round is never guessed.
pub async fn resolve_pending_round(
    api: &dyn ScoringApi,
    event_id: Uuid,
    participant_id: Uuid,
    is_answer_key: bool,
) -> Resolution {
    let fetched = tokio::try_join!(
        api.list_rounds(event_id),
        api.answered_rounds(participant_id, event_id)
    );

    let (rounds, answered) = match fetched {
        Ok(fetched) => fetched,
        Err(err) => {
            warn!(
                %event_id,
                %participant_id,
                error = %err,
                "failed to resolve pending round; showing waiting screen"
            );
            return Resolution::Waiting;
        }
    };

    let answered: HashSet<Uuid> = answered.into_iter().collect();
    let resolution = if is_answer_key {
        select_answer_key_round(&rounds, &answered)
    } else {
        select_pending_round(&rounds, &answered).map_or(Resolution::Waiting, Resolution::Round)
    };
    match &resolution {
        Resolution::Round(round) | Resolution::AwaitingClose(round) => debug!(
            %event_id,
            round_id = %round.round_id,
            position = round.position,
            awaiting_close = matches!(resolution, Resolution::AwaitingClose(_)),
            "pending round resolved"
        ),
        Resolution::Waiting => {
            debug!(%event_id, answered = answered.len(), "no pending round left");
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::memory::{Failure, MemoryScoringApi};

    fn round(position: i32, is_open: bool) -> Round {
        Round {
            id: Uuid::new_v4(),
            name: format!("Vinho {position}"),
            position,
            is_open,
            event_id: Uuid::nil(),
        }
    }

    #[test]
    fn lowest_unanswered_open_round_wins() {
        let rounds = vec![round(3, true), round(1, true), round(2, true)];
        let answered = HashSet::from([rounds[1].id]);
        let pending = select_pending_round(&rounds, &answered).unwrap();
        assert_eq!(pending.round_id, rounds[2].id);
        assert_eq!(pending.position, 2);
    }

    #[test]
    fn closed_rounds_are_skipped() {
        let rounds = vec![round(1, false), round(2, true)];
        let pending = select_pending_round(&rounds, &HashSet::new()).unwrap();
        assert_eq!(pending.round_id, rounds[1].id);
    }

    #[test]
    fn equal_positions_keep_server_order() {
        let rounds = vec![round(1, true), round(1, true)];
        let pending = select_pending_round(&rounds, &HashSet::new()).unwrap();
        assert_eq!(pending.round_id, rounds[0].id);
    }

    #[test]
    fn everything_answered_means_waiting() {
        let rounds = vec![round(1, true), round(2, false)];
        let answered = HashSet::from([rounds[0].id]);
        assert_eq!(select_pending_round(&rounds, &answered), None);
        assert_eq!(select_pending_round(&[], &HashSet::new()), None);
    }

    #[test]
    fn never_skips_a_lower_unanswered_round() {
        // Every subset of answered rounds over a shuffled event.
        let rounds = vec![
            round(4, true),
            round(2, true),
            round(5, false),
            round(1, true),
            round(3, true),
        ];
        for mask in 0u32..(1 << rounds.len()) {
            let answered: HashSet<Uuid> = rounds
                .iter()
                .enumerate()
                .filter(|(index, _)| mask & (1 << index) != 0)
                .map(|(_, round)| round.id)
                .collect();
            let lowest = rounds
                .iter()
                .filter(|round| round.is_open && !answered.contains(&round.id))
                .map(|round| round.position)
                .min();
            let selected = select_pending_round(&rounds, &answered).map(|round| round.position);
            assert_eq!(selected, lowest, "answered mask {mask:#07b}");
        }
    }

    #[tokio::test]
    async fn resolves_through_api() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Degustação", true);
        let participant = Uuid::new_v4();
        let first = api.add_round(event_id, "Vinho 1", 1, true);
        let second = api.add_round(event_id, "Vinho 2", 2, true);
        api.mark_answered(participant, event_id, first);

        let resolution = resolve_pending_round(&api, event_id, participant, false).await;
        match resolution {
            Resolution::Round(round) => assert_eq!(round.round_id, second),
            other => panic!("expected a round, got {other:?}"),
        }
        assert_eq!(api.calls("list_rounds"), 1);
        assert_eq!(api.calls("answered_rounds"), 1);
    }

    #[tokio::test]
    async fn fetch_error_falls_back_to_waiting() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Degustação", true);
        api.add_round(event_id, "Vinho 1", 1, true);
        api.fail_next("answered_rounds", Failure::Unavailable);

        let resolution = resolve_pending_round(&api, event_id, Uuid::new_v4(), false).await;
        assert_eq!(resolution, Resolution::Waiting);
    }

    #[test]
    fn answer_key_stays_on_an_answered_open_round() {
        let rounds = vec![round(2, true), round(1, true)];
        let answered = HashSet::from([rounds[1].id]);

        match select_answer_key_round(&rounds, &answered) {
            Resolution::AwaitingClose(round) => assert_eq!(round.position, 1),
            other => panic!("expected the first round to await its close, got {other:?}"),
        }
        assert_eq!(
            select_pending_round(&rounds, &answered).map(|round| round.position),
            Some(2)
        );
    }

    #[test]
    fn answer_key_moves_on_once_the_round_is_closed() {
        let rounds = vec![round(1, false), round(2, true)];
        let answered = HashSet::from([rounds[0].id]);
        match select_answer_key_round(&rounds, &answered) {
            Resolution::Round(round) => assert_eq!(round.position, 2),
            other => panic!("expected the second round, got {other:?}"),
        }
        assert_eq!(
            select_answer_key_round(&[round(1, false)], &HashSet::new()),
            Resolution::Waiting
        );
    }

    #[tokio::test]
    async fn organizer_resolution_reports_round_awaiting_close() {
        let api = MemoryScoringApi::new();
        let event_id = api.add_event("Degustação", true);
        let organizer = Uuid::new_v4();
        let first = api.add_round(event_id, "Vinho 1", 1, true);
        api.add_round(event_id, "Vinho 2", 2, true);
        api.mark_answered(organizer, event_id, first);

        match resolve_pending_round(&api, event_id, organizer, true).await {
            Resolution::AwaitingClose(round) => assert_eq!(round.round_id, first),
            other => panic!("expected the first round to await its close, got {other:?}"),
        }
    }
}
