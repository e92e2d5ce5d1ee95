//! Organizer CRUD over events and rounds. Inputs are normalized and validated before any
//! request is sent.

use tracing::{debug, info};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::scoring_api::ScoringApi,
    dto::{
        event::{CreateEventRequest, Event},
        round::{CreateRoundRequest, Round, UpdateRoundRequest},
    },
    error::FlowError,
};

/// Shown when a round is created for an event that is missing or closed.
pub const SELECT_OPEN_EVENT_MESSAGE: &str = "Selecione um evento aberto";

fn invalid(context: &str, errors: ValidationErrors) -> FlowError {
    debug!(%errors, context, "input rejected");
    FlowError::Validation(format!("{context}: {errors}"))
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Every event, open or closed.
pub async fn list_events(api: &dyn ScoringApi) -> Result<Vec<Event>, FlowError> {
    Ok(api.list_events().await?)
}

/// Events that still accept rounds and evaluations.
pub async fn list_open_events(api: &dyn ScoringApi) -> Result<Vec<Event>, FlowError> {
    let mut events = api.list_events().await?;
    events.retain(|event| event.is_open);
    Ok(events)
}

/// Create an event. A blank access code is not sent.
pub async fn create_event(
    api: &dyn ScoringApi,
    name: &str,
    access_code: Option<String>,
) -> Result<Event, FlowError> {
    let request = CreateEventRequest {
        name: name.trim().to_string(),
        access_code: normalize(access_code),
    };
    request
        .validate()
        .map_err(|errors| invalid("Evento inválido", errors))?;

    let event = api.create_event(request).await?;
    info!(event_id = %event.id, name = %event.name, "event created");
    Ok(event)
}

/// Open or close an event. Returns the flag the server stored.
pub async fn set_event_open(
    api: &dyn ScoringApi,
    event_id: Uuid,
    open: bool,
) -> Result<bool, FlowError> {
    let state = api.set_event_open(event_id, open).await?;
    info!(%event_id, is_open = state.is_open, "event open flag updated");
    Ok(state.is_open)
}

/// Delete an event.
pub async fn delete_event(api: &dyn ScoringApi, event_id: Uuid) -> Result<(), FlowError> {
    api.delete_event(event_id).await?;
    info!(%event_id, "event deleted");
    Ok(())
}

/// Rounds of `event_id` in evaluation order.
pub async fn list_rounds(api: &dyn ScoringApi, event_id: Uuid) -> Result<Vec<Round>, FlowError> {
    let mut rounds = api.list_rounds(event_id).await?;
    rounds.sort_by_key(|round| round.position);
    Ok(rounds)
}

/// Create a round in an open event. The server picks the next position when none is given.
pub async fn create_round(
    api: &dyn ScoringApi,
    event_id: Uuid,
    name: &str,
    position: Option<i32>,
) -> Result<Round, FlowError> {
    let request = CreateRoundRequest {
        name: name.trim().to_string(),
        position,
        event_id,
    };
    request
        .validate()
        .map_err(|errors| invalid("Round inválido", errors))?;

    let is_open = api
        .list_events()
        .await?
        .iter()
        .any(|event| event.id == event_id && event.is_open);
    if !is_open {
        return Err(FlowError::Validation(SELECT_OPEN_EVENT_MESSAGE.to_string()));
    }

    let round = api.create_round(request).await?;
    info!(%event_id, round_id = %round.id, position = round.position, "round created");
    Ok(round)
}

/// Apply a partial update. Names are trimmed; an update that changes nothing is refused.
pub async fn update_round(
    api: &dyn ScoringApi,
    round_id: Uuid,
    mut update: UpdateRoundRequest,
) -> Result<Round, FlowError> {
    update.name = update.name.map(|name| name.trim().to_string());
    if update.is_empty() {
        return Err(FlowError::Validation("Nada para atualizar".to_string()));
    }
    update
        .validate()
        .map_err(|errors| invalid("Round inválido", errors))?;

    let round = api.update_round(round_id, update).await?;
    info!(%round_id, is_open = round.is_open, "round updated");
    Ok(round)
}

/// Delete a round.
pub async fn delete_round(api: &dyn ScoringApi, round_id: Uuid) -> Result<(), FlowError> {
    api.delete_round(round_id).await?;
    info!(%round_id, "round deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::dao::memory::{Failure, MemoryScoringApi};

    #[tokio::test]
    async fn blank_access_code_is_not_sent() {
        let api = MemoryScoringApi::new();
        let event = create_event(&api, "  Noite do Malbec ", Some("   ".into()))
            .await
            .unwrap();
        assert_eq!(event.name, "Noite do Malbec");
        assert_eq!(event.access_code, None);

        let event = create_event(&api, "Tintos", Some(" T1 ".into()))
            .await
            .unwrap();
        assert_eq!(event.access_code.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn empty_event_name_is_rejected_locally() {
        let api = MemoryScoringApi::new();
        let err = create_event(&api, "   ", None).await.unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));
        assert_eq!(api.calls("create_event"), 0);
    }

    #[tokio::test]
    async fn open_events_exclude_closed_ones() {
        let api = MemoryScoringApi::new();
        let open = api.add_event("Aberto", true);
        api.add_event("Fechado", false);
        let events = list_open_events(&api).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, open);
    }

    #[tokio::test]
    async fn rounds_need_an_open_event() {
        let api = MemoryScoringApi::new();
        let closed = api.add_event("Fechado", false);
        let err = create_round(&api, closed, "Vinho 1", None)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), SELECT_OPEN_EVENT_MESSAGE);
        assert_eq!(api.calls("create_round"), 0);

        let open = api.add_event("Aberto", true);
        let first = create_round(&api, open, "Vinho 1", None).await.unwrap();
        let second = create_round(&api, open, "Vinho 2", None).await.unwrap();
        assert_eq!((first.position, second.position), (1, 2));
    }

    #[tokio::test]
    async fn rounds_are_listed_by_position() {
        let api = MemoryScoringApi::new();
        let event = api.add_event("Degustação", true);
        api.add_round(event, "Vinho 3", 3, true);
        api.add_round(event, "Vinho 1", 1, true);
        api.add_round(event, "Vinho 2", 2, false);
        let names: Vec<_> = list_rounds(&api, event)
            .await
            .unwrap()
            .into_iter()
            .map(|round| round.name)
            .collect();
        assert_eq!(names, ["Vinho 1", "Vinho 2", "Vinho 3"]);
    }

    #[tokio::test]
    async fn round_updates_are_validated() {
        let api = MemoryScoringApi::new();
        let event = api.add_event("Degustação", true);
        let round = api.add_round(event, "Vinho 1", 1, true);

        let err = update_round(&api, round, UpdateRoundRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));

        let blank = UpdateRoundRequest {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert!(update_round(&api, round, blank).await.is_err());
        assert_eq!(api.calls("update_round"), 0);

        let close = UpdateRoundRequest {
            is_open: Some(false),
            ..Default::default()
        };
        let updated = update_round(&api, round, close).await.unwrap();
        assert!(!updated.is_open);
    }

    #[tokio::test]
    async fn server_rejection_keeps_detail() {
        let api = MemoryScoringApi::new();
        api.fail_next(
            "delete_event",
            Failure::Rejected(StatusCode::CONFLICT, "Evento possui avaliações"),
        );
        let err = delete_event(&api, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.user_message(), "Evento possui avaliações");
    }
}
