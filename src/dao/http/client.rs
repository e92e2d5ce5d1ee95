use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use reqwest::{
    Client, Method, RequestBuilder, Response, StatusCode,
    header::{CONTENT_TYPE, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{
    dao::{
        error::{ApiError, ApiResult},
        scoring_api::ScoringApi,
    },
    dto::{
        auth::{JoinRequest, JoinResponse, LoginRequest, LoginResponse},
        evaluation::{AnswerKeyItem, EvaluationCreate, EvaluationReceipt},
        event::{CreateEventRequest, Event, EventOpenState},
        results::{EvaluationResult, EventScore, EventWinners, RankingEntry},
        round::{CreateRoundRequest, Round, UpdateRoundRequest},
    },
    session::SessionStore,
};

use super::config::ApiClientConfig;

/// Header carrying the signed-in participant on every request.
pub const PARTICIPANT_HEADER: &str = "X-Participant-Id";

const DOWNLOADABLE_TYPES: [&str; 2] = ["application/pdf", "application/octet-stream"];

/// [`ScoringApi`] implementation over HTTP/JSON.
#[derive(Clone)]
pub struct HttpScoringApi {
    client: Client,
    base_url: Arc<str>,
    session: SessionStore,
}

impl HttpScoringApi {
    /// Build a client for `config`, reading the participant identity from `session`.
    pub fn new(config: &ApiClientConfig, session: SessionStore) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| ApiError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            session,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match self.session.participant_id().await {
            Some(participant_id) => builder.header(PARTICIPANT_HEADER, participant_id.to_string()),
            None => builder,
        }
    }

    async fn send(&self, path: &str, builder: RequestBuilder) -> ApiResult<Response> {
        debug!(path, "sending scoring API request");
        let response = builder
            .send()
            .await
            .map_err(|source| ApiError::unavailable(path, source))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = rejection_message(status, &body);
        debug!(path, %status, %message, "scoring API rejected request");
        Err(ApiError::rejected(path, status, message))
    }

    async fn read_json<T>(path: &str, response: Response) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::unavailable(path, source))?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// GET `path` and decode the JSON body.
    pub async fn get<T>(&self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let builder = self.request(Method::GET, path).await;
        let response = self.send(path, builder).await?;
        Self::read_json(path, response).await
    }

    /// POST `body` as JSON and decode the JSON response.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: ?Sized + Serialize,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).await.json(body);
        let response = self.send(path, builder).await?;
        Self::read_json(path, response).await
    }

    /// PATCH `body` as JSON and decode the JSON response.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: ?Sized + Serialize,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PATCH, path).await.json(body);
        let response = self.send(path, builder).await?;
        Self::read_json(path, response).await
    }

    /// POST whose response body is irrelevant to the caller.
    pub async fn post_action<B>(&self, path: &str, body: Option<&B>) -> ApiResult<()>
    where
        B: ?Sized + Serialize,
    {
        let mut builder = self.request(Method::POST, path).await;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(path, builder).await.map(|_| ())
    }

    /// DELETE `path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let builder = self.request(Method::DELETE, path).await;
        self.send(path, builder).await.map(|_| ())
    }

    /// Fetch a file payload, refusing anything that is not a PDF or a raw byte stream.
    pub async fn fetch_binary(&self, path: &str) -> ApiResult<Vec<u8>> {
        let builder = self.request(Method::GET, path).await;
        let response = self.send(path, builder).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value: &HeaderValue| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_downloadable(&content_type) {
            return Err(ApiError::UnexpectedContentType {
                path: path.to_string(),
                content_type,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::unavailable(path, source))?;
        Ok(body.to_vec())
    }

    /// Download `path` into `destination`, returning the written file path.
    pub async fn download(&self, path: &str, destination: impl AsRef<Path>) -> ApiResult<PathBuf> {
        let destination = destination.as_ref().to_path_buf();
        let bytes = self.fetch_binary(path).await?;
        tokio::fs::write(&destination, &bytes)
            .await
            .map_err(|source| ApiError::Write {
                path: destination.clone(),
                source,
            })?;
        debug!(path, file = %destination.display(), size = bytes.len(), "download written");
        Ok(destination)
    }
}

fn is_downloadable(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    DOWNLOADABLE_TYPES.contains(&media_type.as_str())
}

/// Human-readable message for a rejected request: the JSON `detail` when present, then the
/// raw body, then the bare status code.
fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        match value.get("detail") {
            Some(Value::String(detail)) if !detail.trim().is_empty() => return detail.clone(),
            Some(detail) if !detail.is_null() && !detail.is_string() => {
                return detail.to_string();
            }
            _ if value.is_object() || value.is_array() => return value.to_string(),
            _ => {}
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        text.to_string()
    }
}

impl ScoringApi for HttpScoringApi {
    fn login(&self, request: LoginRequest) -> BoxFuture<'static, ApiResult<LoginResponse>> {
        let api = self.clone();
        Box::pin(async move { api.post("/auth/login", &request).await })
    }

    fn join_event(&self, request: JoinRequest) -> BoxFuture<'static, ApiResult<JoinResponse>> {
        let api = self.clone();
        Box::pin(async move { api.post("/participants/join", &request).await })
    }

    fn list_events(&self) -> BoxFuture<'static, ApiResult<Vec<Event>>> {
        let api = self.clone();
        Box::pin(async move { api.get("/events").await })
    }

    fn create_event(&self, request: CreateEventRequest) -> BoxFuture<'static, ApiResult<Event>> {
        let api = self.clone();
        Box::pin(async move { api.post("/events", &request).await })
    }

    fn set_event_open(
        &self,
        id: Uuid,
        open: bool,
    ) -> BoxFuture<'static, ApiResult<EventOpenState>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("/events/{id}/open?open={open}");
            let builder = api.request(Method::PATCH, &path).await;
            let response = api.send(&path, builder).await?;
            HttpScoringApi::read_json(&path, response).await
        })
    }

    fn delete_event(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move { api.delete(&format!("/events/{id}")).await })
    }

    fn close_event(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            api.post_action::<Value>(&format!("/events/{id}/close"), None)
                .await
        })
    }

    fn event_ranking(&self, id: Uuid) -> BoxFuture<'static, ApiResult<Vec<RankingEntry>>> {
        let api = self.clone();
        Box::pin(async move { api.get(&format!("/events/{id}/ranking")).await })
    }

    fn event_winners(&self, id: Uuid) -> BoxFuture<'static, ApiResult<EventWinners>> {
        let api = self.clone();
        Box::pin(async move { api.get(&format!("/events/{id}/winner")).await })
    }

    fn event_answer_key(&self, id: Uuid) -> BoxFuture<'static, ApiResult<Vec<AnswerKeyItem>>> {
        let api = self.clone();
        Box::pin(async move { api.get(&format!("/events/{id}/answer-key")).await })
    }

    fn list_rounds(&self, event_id: Uuid) -> BoxFuture<'static, ApiResult<Vec<Round>>> {
        let api = self.clone();
        Box::pin(async move { api.get(&format!("/rounds?event_id={event_id}")).await })
    }

    fn create_round(&self, request: CreateRoundRequest) -> BoxFuture<'static, ApiResult<Round>> {
        let api = self.clone();
        Box::pin(async move { api.post("/rounds", &request).await })
    }

    fn update_round(
        &self,
        id: Uuid,
        request: UpdateRoundRequest,
    ) -> BoxFuture<'static, ApiResult<Round>> {
        let api = self.clone();
        Box::pin(async move { api.patch(&format!("/rounds/{id}"), &request).await })
    }

    fn delete_round(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move { api.delete(&format!("/rounds/{id}")).await })
    }

    fn close_round(&self, id: Uuid) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            api.post_action::<Value>(&format!("/rounds/{id}/close"), None)
                .await
        })
    }

    fn answered_rounds(
        &self,
        participant_id: Uuid,
        event_id: Uuid,
    ) -> BoxFuture<'static, ApiResult<Vec<Uuid>>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!(
                "/evaluations/answered-rounds?participant_id={participant_id}&event_id={event_id}"
            );
            api.get(&path).await
        })
    }

    fn submit_evaluation(
        &self,
        evaluation: EvaluationCreate,
    ) -> BoxFuture<'static, ApiResult<EvaluationReceipt>> {
        let api = self.clone();
        Box::pin(async move { api.post("/evaluations", &evaluation).await })
    }

    fn my_evaluation_result(
        &self,
        round_id: Uuid,
    ) -> BoxFuture<'static, ApiResult<EvaluationResult>> {
        let api = self.clone();
        Box::pin(async move {
            api.get(&format!("/results/my-evaluation?round_id={round_id}"))
                .await
        })
    }

    fn my_event_score(&self) -> BoxFuture<'static, ApiResult<EventScore>> {
        let api = self.clone();
        Box::pin(async move { api.get("/results/my-event").await })
    }
}
