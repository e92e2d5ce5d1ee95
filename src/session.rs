//! Local session: who is signed in and the optional in-progress evaluation draft.
//!
//! The store is an explicit handle passed to the API client and the views instead of
//! ambient global storage. It can live purely in memory or be persisted to a JSON file so
//! the identity survives a restart of the client.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{dto::format_system_time, state::form::EvaluationForm};

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Joined an event to evaluate it.
    Participant,
    /// Organizer managing events and answer keys.
    Sommelier,
}

/// Identity written once at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Identifier attached to requests.
    pub participant_id: Uuid,
    /// Role.
    pub user_type: UserType,
    /// Display name.
    pub name: String,
    /// Event joined with an access code; organizers are not bound to one event.
    #[serde(default)]
    pub event_id: Option<Uuid>,
}

/// Snapshot of the answers typed so far for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDraft {
    /// Event of the round.
    pub event_id: Uuid,
    /// Round the answers belong to.
    pub round_id: Uuid,
    /// Author of the answers.
    pub participant_id: Uuid,
    /// RFC 3339 capture time.
    pub saved_at: String,
    /// Answers typed so far.
    pub fields: EvaluationForm,
}

impl EvaluationDraft {
    /// Capture `fields` for the given context, stamped with the current time.
    pub fn capture(
        event_id: Uuid,
        round_id: Uuid,
        participant_id: Uuid,
        fields: EvaluationForm,
    ) -> Self {
        Self {
            event_id,
            round_id,
            participant_id,
            saved_at: format_system_time(SystemTime::now()),
            fields,
        }
    }

    /// Whether this draft was taken for exactly this event, round and participant.
    pub fn belongs_to(&self, event_id: Uuid, round_id: Uuid, participant_id: Uuid) -> bool {
        self.event_id == event_id
            && self.round_id == round_id
            && self.participant_id == participant_id
    }
}

/// Everything persisted by the session store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Signed-in user, if any.
    #[serde(default)]
    pub identity: Option<SessionIdentity>,
    /// Unsent answers of the last round shown.
    #[serde(default)]
    pub draft: Option<EvaluationDraft>,
}

/// Failures while persisting the session file.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session file could not be written.
    #[error("failed to write session file `{}`", .path.display())]
    Write {
        /// Session file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The session could not be serialized.
    #[error("failed to encode session")]
    Encode(#[from] serde_json::Error),
}

/// Shared handle over the local session. Cloning is cheap.
#[derive(Clone, Default)]
pub struct SessionStore {
    data: Arc<RwLock<SessionData>>,
    path: Option<Arc<PathBuf>>,
}

impl SessionStore {
    /// A session that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the session persisted at `path`, starting empty when the file is absent or
    /// unreadable.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<SessionData>(&bytes) {
                Ok(data) => {
                    debug!(path = %path.display(), "restored session from disk");
                    data
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse session file; starting signed out"
                    );
                    SessionData::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => SessionData::default(),
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read session file; starting signed out"
                );
                SessionData::default()
            }
        };

        Self {
            data: Arc::new(RwLock::new(data)),
            path: Some(Arc::new(path)),
        }
    }

    /// Location of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// Copy of everything stored.
    pub async fn snapshot(&self) -> SessionData {
        self.data.read().await.clone()
    }

    /// Signed-in identity, if any.
    pub async fn identity(&self) -> Option<SessionIdentity> {
        self.data.read().await.identity.clone()
    }

    /// Participant id attached to outgoing requests.
    pub async fn participant_id(&self) -> Option<Uuid> {
        self.data
            .read()
            .await
            .identity
            .as_ref()
            .map(|identity| identity.participant_id)
    }

    /// Role of the signed-in user.
    pub async fn user_type(&self) -> Option<UserType> {
        self.data
            .read()
            .await
            .identity
            .as_ref()
            .map(|identity| identity.user_type)
    }

    /// Record the identity returned by login or join.
    pub async fn sign_in(&self, identity: SessionIdentity) -> Result<(), SessionError> {
        let mut guard = self.data.write().await;
        if guard.identity.is_some() {
            warn!("replacing an existing session identity");
        }
        info!(
            participant_id = %identity.participant_id,
            user_type = ?identity.user_type,
            "session signed in"
        );
        *guard = SessionData {
            identity: Some(identity),
            draft: None,
        };
        self.persist(&guard).await
    }

    /// Forget the identity and any draft.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let mut guard = self.data.write().await;
        *guard = SessionData::default();
        info!("session signed out");
        self.persist(&guard).await
    }

    /// Saved draft, if any.
    pub async fn draft(&self) -> Option<EvaluationDraft> {
        self.data.read().await.draft.clone()
    }

    /// Replace the saved draft.
    pub async fn save_draft(&self, draft: EvaluationDraft) -> Result<(), SessionError> {
        let mut guard = self.data.write().await;
        guard.draft = Some(draft);
        self.persist(&guard).await
    }

    /// Drop the saved draft. Writes nothing when there was none.
    pub async fn clear_draft(&self) -> Result<(), SessionError> {
        let mut guard = self.data.write().await;
        if guard.draft.take().is_none() {
            return Ok(());
        }
        self.persist(&guard).await
    }

    async fn persist(&self, data: &SessionData) -> Result<(), SessionError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(data)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SessionError::Write {
                    path: path.clone(),
                    source,
                })?;
        }
        tokio::fs::write(path, bytes)
            .await
            .map_err(|source| SessionError::Write {
                path: path.clone(),
                source,
            })
    }
}
