//! Organizer login, participant join and logout. Each writes the session exactly once.

use tracing::{info, warn};

use crate::{
    dao::scoring_api::ScoringApi,
    dto::auth::{JoinRequest, LoginRequest},
    error::FlowError,
    session::{SessionIdentity, SessionStore, UserType},
};

/// Shown when a login or join form is submitted with blank fields.
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Preencha todos os campos.";

fn required(value: &str) -> Result<String, FlowError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FlowError::Validation(MISSING_CREDENTIALS_MESSAGE.to_string()));
    }
    Ok(value.to_string())
}

/// Authenticate the organizer and store its identity.
pub async fn login_sommelier(
    api: &dyn ScoringApi,
    session: &SessionStore,
    name: &str,
    password: &str,
) -> Result<SessionIdentity, FlowError> {
    let name = required(name)?;
    if password.is_empty() {
        return Err(FlowError::Validation(MISSING_CREDENTIALS_MESSAGE.to_string()));
    }

    let response = api
        .login(LoginRequest {
            name,
            password: password.to_string(),
        })
        .await?;
    if !response.is_sommelier {
        warn!(participant_id = %response.participant_id, "login answered without organizer role");
        return Err(FlowError::Unauthorized(
            "usuário não possui acesso de sommelier".into(),
        ));
    }

    let identity = SessionIdentity {
        participant_id: response.participant_id,
        user_type: UserType::Sommelier,
        name: response.name,
        event_id: None,
    };
    session.sign_in(identity.clone()).await?;
    info!(participant_id = %identity.participant_id, "sommelier logged in");
    Ok(identity)
}

/// Join an event with its access code and store the participant identity.
pub async fn join_event(
    api: &dyn ScoringApi,
    session: &SessionStore,
    name: &str,
    event_code: &str,
) -> Result<SessionIdentity, FlowError> {
    let request = JoinRequest {
        name: required(name)?,
        event_code: required(event_code)?,
    };
    let response = api.join_event(request).await?;

    let identity = SessionIdentity {
        participant_id: response.participant_id,
        user_type: UserType::Participant,
        name: response.name,
        event_id: Some(response.event_id),
    };
    session.sign_in(identity.clone()).await?;
    info!(
        participant_id = %identity.participant_id,
        event_id = %response.event_id,
        "participant joined event"
    );
    Ok(identity)
}

/// Forget the signed-in user. Returns `false` when nobody was signed in.
pub async fn logout(session: &SessionStore) -> Result<bool, FlowError> {
    let was_signed_in = session.identity().await.is_some();
    session.sign_out().await?;
    Ok(was_signed_in)
}
