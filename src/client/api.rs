//! Backend API Client
//!
//! Single point of configuration for the REST surface: base URL, timeout,
//! default headers and the attached access key. Every backend operation is one
//! async method that performs exactly one request. There is no retry, no
//! backoff and no request deduplication.

use std::sync::{Arc, RwLock};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::shared::config::AppConfig;
use crate::shared::error::{ApiErrorBody, ClientError};
use crate::shared::models::{
    Acknowledgement, Circle, CircleUpdate, CirclesResponse, ConferenceRoom, CreateCircleRequest,
    CreateMessageRequest, CreateRoomRequest, EndSessionResponse, HealthStatus, JoinRoomRequest,
    JoinRoomResponse, LeaveRoomRequest, LeaveRoomResponse, Message, MessagesResponse,
    ParagraphCorrection, ParagraphFilter, ParagraphList, ParagraphUpdate, ParticipantKey,
    RoomStats, StartSessionRequest, TranslationDocument, TranslationSession, VerifyKeyResponse,
};

/// Scheme token prefixed to the access key in the `Authorization` header
pub const AUTH_SCHEME: &str = "Key";

/// Format the credential header value for an access key
pub fn authorization_value(key: &str) -> String {
    format!("{} {}", AUTH_SCHEME, key)
}

/// HTTP client for the inquiry-circle backend.
///
/// Clones share the credential slot, so attaching a key through one handle
/// makes it the default for every clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    root: String,
    access_key: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            root: config.api_root(),
            access_key: Arc::new(RwLock::new(None)),
        })
    }

    /// Attach a key as the default credential for all subsequent requests
    pub fn set_access_key(&self, key: impl Into<String>) {
        let mut slot = self.access_key.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(key.into());
    }

    /// Detach the default credential
    pub fn clear_access_key(&self) {
        let mut slot = self.access_key.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    pub fn access_key(&self) -> Option<String> {
        self.access_key
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get the full URL for an API path
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }

    // Health

    pub async fn health_check(&self) -> Result<HealthStatus, ClientError> {
        self.execute(self.request(Method::GET, "/health/")).await
    }

    /// Probe the backend; failures are logged and reported as `false`
    pub async fn test_connection(&self) -> bool {
        match self.health_check().await {
            Ok(_) => {
                tracing::info!("API connection successful");
                true
            }
            Err(e) => {
                tracing::error!("API connection failed: {}", e);
                false
            }
        }
    }

    // Authentication

    /// Verify `key`, or the attached key when `None`.
    ///
    /// Failing statuses whose body is a verification answer (e.g. 401 with
    /// `{"valid": false}`) come back as `Ok`. Only transport failures and
    /// unrecognizable bodies are errors.
    pub async fn verify_key(&self, key: Option<&str>) -> Result<VerifyKeyResponse, ClientError> {
        let key = match key.map(str::to_string).or_else(|| self.access_key()) {
            Some(key) => key,
            None => return Ok(VerifyKeyResponse::invalid("No access key provided")),
        };

        let builder = self
            .http
            .post(self.api_url("/auth/verify-key/"))
            .header(AUTHORIZATION, authorization_value(&key))
            .json(&serde_json::json!({}));

        let (status, bytes) = self.send(builder).await?;
        if status.is_success() {
            return Ok(serde_json::from_slice(&bytes)?);
        }

        serde_json::from_slice::<VerifyKeyResponse>(&bytes).map_err(|_| ClientError::Status {
            status: status.as_u16(),
            body: serde_json::from_slice::<ApiErrorBody>(&bytes).ok(),
        })
    }

    // Circles

    pub async fn list_circles(&self) -> Result<Vec<Circle>, ClientError> {
        let response: CirclesResponse = self.execute(self.request(Method::GET, "/circles/")).await?;
        Ok(response.circles)
    }

    pub async fn create_circle(&self, circle: &CreateCircleRequest) -> Result<Circle, ClientError> {
        self.execute_json(Method::POST, "/circles/", circle).await
    }

    pub async fn get_circle(&self, circle_id: i64) -> Result<Circle, ClientError> {
        self.execute(self.request(Method::GET, &format!("/circles/{}/", circle_id)))
            .await
    }

    pub async fn update_circle(
        &self,
        circle_id: i64,
        update: &CircleUpdate,
    ) -> Result<Circle, ClientError> {
        self.execute_json(Method::PATCH, &format!("/circles/{}/", circle_id), update)
            .await
    }

    pub async fn delete_circle(&self, circle_id: i64) -> Result<(), ClientError> {
        self.execute_unit(self.request(Method::DELETE, &format!("/circles/{}/", circle_id)))
            .await
    }

    pub async fn generate_participant_key(
        &self,
        circle_id: i64,
    ) -> Result<ParticipantKey, ClientError> {
        let path = format!("/circles/{}/keys/generate/", circle_id);
        self.execute_json(Method::POST, &path, &serde_json::json!({}))
            .await
    }

    pub async fn remove_participant_key(
        &self,
        circle_id: i64,
        key_id: i64,
    ) -> Result<Acknowledgement, ClientError> {
        let path = format!("/circles/{}/keys/{}/remove/", circle_id, key_id);
        self.execute_json(Method::POST, &path, &serde_json::json!({}))
            .await
    }

    // Messages

    pub async fn list_messages(&self, circle_id: i64) -> Result<Vec<Message>, ClientError> {
        let builder = self
            .request(Method::GET, "/messages/")
            .query(&[("circle_id", circle_id)]);
        let response: MessagesResponse = self.execute(builder).await?;
        Ok(response.messages)
    }

    pub async fn send_message(&self, message: &CreateMessageRequest) -> Result<Message, ClientError> {
        self.execute_json(Method::POST, "/messages/", message).await
    }

    // Conference rooms

    pub async fn create_room(&self, room: &CreateRoomRequest) -> Result<ConferenceRoom, ClientError> {
        self.execute_json(Method::POST, "/rooms/create/", room).await
    }

    pub async fn get_room_for_circle(&self, circle_id: i64) -> Result<ConferenceRoom, ClientError> {
        self.execute(self.request(Method::GET, &format!("/rooms/circle/{}/", circle_id)))
            .await
    }

    pub async fn join_room(
        &self,
        room_id: i64,
        join: &JoinRoomRequest,
    ) -> Result<JoinRoomResponse, ClientError> {
        self.execute_json(Method::POST, &format!("/rooms/{}/join/", room_id), join)
            .await
    }

    pub async fn leave_room(
        &self,
        room_id: i64,
        leave: &LeaveRoomRequest,
    ) -> Result<LeaveRoomResponse, ClientError> {
        self.execute_json(Method::POST, &format!("/rooms/{}/leave/", room_id), leave)
            .await
    }

    pub async fn room_stats(&self, room_id: i64) -> Result<RoomStats, ClientError> {
        self.execute(self.request(Method::GET, &format!("/rooms/{}/stats/", room_id)))
            .await
    }

    // Translation workflow

    pub async fn list_documents(
        &self,
        circle_id: Option<i64>,
    ) -> Result<Vec<TranslationDocument>, ClientError> {
        let mut builder = self.request(Method::GET, "/translation/documents/");
        if let Some(circle_id) = circle_id {
            builder = builder.query(&[("circle", circle_id)]);
        }
        self.execute(builder).await
    }

    pub async fn get_document(&self, document_id: i64) -> Result<TranslationDocument, ClientError> {
        let path = format!("/translation/documents/{}/", document_id);
        self.execute(self.request(Method::GET, &path)).await
    }

    pub async fn start_translation_session(
        &self,
        start: &StartSessionRequest,
    ) -> Result<TranslationSession, ClientError> {
        self.execute_json(Method::POST, "/translation/sessions/start/", start)
            .await
    }

    pub async fn get_translation_session(
        &self,
        session_id: i64,
    ) -> Result<TranslationSession, ClientError> {
        let path = format!("/translation/sessions/{}/", session_id);
        self.execute(self.request(Method::GET, &path)).await
    }

    pub async fn end_translation_session(
        &self,
        session_id: i64,
    ) -> Result<EndSessionResponse, ClientError> {
        let path = format!("/translation/sessions/{}/end/", session_id);
        self.execute_json(Method::POST, &path, &serde_json::json!({}))
            .await
    }

    pub async fn list_paragraphs(
        &self,
        session_id: i64,
        filter: &ParagraphFilter,
    ) -> Result<ParagraphList, ClientError> {
        let path = format!("/translation/sessions/{}/paragraphs/", session_id);
        let builder = self.request(Method::GET, &path).query(&filter.query_pairs());
        self.execute(builder).await
    }

    pub async fn get_paragraph(&self, paragraph_id: i64) -> Result<ParagraphCorrection, ClientError> {
        let path = format!("/translation/paragraphs/{}/", paragraph_id);
        self.execute(self.request(Method::GET, &path)).await
    }

    /// Overwrite a paragraph correction. No version check is sent, so the
    /// last writer wins.
    pub async fn update_paragraph(
        &self,
        paragraph_id: i64,
        update: &ParagraphUpdate,
    ) -> Result<ParagraphCorrection, ClientError> {
        let path = format!("/translation/paragraphs/{}/update/", paragraph_id);
        self.execute_json(Method::PATCH, &path, update).await
    }

    pub async fn approve_paragraph(
        &self,
        paragraph_id: i64,
    ) -> Result<ParagraphCorrection, ClientError> {
        let path = format!("/translation/paragraphs/{}/approve/", paragraph_id);
        self.execute_json(Method::POST, &path, &serde_json::json!({}))
            .await
    }

    // Plumbing

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.api_url(path));
        match self.access_key() {
            Some(key) => builder.header(AUTHORIZATION, authorization_value(&key)),
            None => builder,
        }
    }

    async fn execute_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(method, path).json(body)).await
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let (status, bytes) = self.send(builder).await?;
        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!("Failed to decode response body: {}", e);
            ClientError::Decode(e.to_string())
        })
    }

    async fn execute_unit(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        let (status, bytes) = self.send(builder).await?;
        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }
        Ok(())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!("API request: {} {}", method, url);

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Request error: {} {}: {}", method, url, e);
                return Err(e.into());
            }
        };

        let status = response.status();
        let bytes = response.bytes().await?.to_vec();
        if status.is_success() {
            tracing::info!("API response: {} {}", status.as_u16(), url.path());
        } else {
            tracing::error!(
                "API error: {} {} {}",
                status.as_u16(),
                url.path(),
                String::from_utf8_lossy(&bytes)
            );
            match status.as_u16() {
                401 => tracing::warn!("Authentication required or invalid key"),
                403 => tracing::warn!("Permission denied"),
                404 => tracing::warn!("Resource not found"),
                s if s >= 500 => tracing::warn!("Server error"),
                _ => {}
            }
        }
        Ok((status, bytes))
    }
}

fn status_error(status: StatusCode, bytes: &[u8]) -> ClientError {
    ClientError::Status {
        status: status.as_u16(),
        body: serde_json::from_slice::<ApiErrorBody>(bytes).ok(),
    }
}

/// Turn a client failure into a message fit for display.
///
/// Backend-provided `message` or `error` text wins, then the status class,
/// then connection refusal, then the error's own description.
pub fn error_message(error: &ClientError) -> String {
    match error {
        ClientError::Status { status, body } => {
            if let Some(body) = body {
                if let Some(message) = &body.message {
                    return message.clone();
                }
                if let Some(error) = &body.error {
                    return error.clone();
                }
            }
            match *status {
                401 => "Authentication required. Please check your access key.".to_string(),
                403 => "Permission denied. You do not have access to this resource.".to_string(),
                404 => "Resource not found.".to_string(),
                s if s >= 500 => "Server error. Please try again later.".to_string(),
                _ => error.to_string(),
            }
        }
        e if e.is_connection_refused() => {
            "Cannot connect to server. Please ensure the backend is running.".to_string()
        }
        e => e.to_string(),
    }
}
