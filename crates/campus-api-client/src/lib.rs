//! Shared HTTP client for the course-management backend.
//!
//! Every request carries `Authorization: Bearer {token}` when the session holds
//! a token. Non-success responses are mapped to `AppError` in one place: the
//! user-facing message is sent to the `Notifier`, a 401 ends the session, and
//! the error is then returned to the caller unchanged.

pub mod api;
pub mod notify;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use campus_core::{AppError, Config, ErrorMetadata, LogLevel};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use api::UploadFile;
pub use notify::{CollectingNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionContext, SessionStore};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP client for the course-management API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionContext,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

/// Error body shape used by the backend.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        session: SessionContext,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        Self::with_timeout(
            base_url,
            session,
            notifier,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        session: SessionContext,
        notifier: Arc<dyn Notifier>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            notifier,
        })
    }

    /// Create a client from loaded configuration.
    pub fn from_config(
        config: &Config,
        session: SessionContext,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        Self::with_timeout(
            config.api_url.clone(),
            session,
            notifier,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and apply the centralized failure handling.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let request = self.apply_auth(request);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = AppError::Network(e.to_string());
                return Err(self.report(err));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error));
        let err = AppError::from_status(status.as_u16(), message);
        Err(self.report(err))
    }

    /// Notify the user about `err`, end the session on 401, and hand the error back.
    fn report(&self, err: AppError) -> AppError {
        match err.log_level() {
            LogLevel::Error => tracing::error!(error = %err, code = err.error_code(), "API request failed"),
            LogLevel::Warn => tracing::warn!(error = %err, code = err.error_code(), "API request failed"),
            LogLevel::Debug => tracing::debug!(error = %err, code = err.error_code(), "API request failed"),
        }

        if err.is_auth_failure() {
            if let Err(e) = self.session.clear() {
                tracing::warn!(error = %e, "Failed to clear session after 401");
            }
        }

        self.notifier.notify(Notification::error(err.client_message()));
        err
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))?;
        serde_json::from_slice(&body).map_err(|e| {
            AppError::Serialization(format!("Failed to parse response as JSON: {}", e))
        })
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    /// GET request returning the raw response body.
    pub async fn get_bytes(&self, path: &str) -> Result<Bytes, AppError> {
        let request = self.client.get(self.build_url(path));
        let response = self.execute(request).await?;
        response
            .bytes()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let request = self.client.post(self.build_url(path)).json(body);
        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    /// POST JSON body, ignoring whatever the backend answers.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let request = self.client.post(self.build_url(path)).json(body);
        self.execute(request).await?;
        Ok(())
    }

    /// PUT JSON body. Returns Ok(()) on success.
    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let request = self.client.put(self.build_url(path)).json(body);
        self.execute(request).await?;
        Ok(())
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, AppError> {
        let request = self.client.post(self.build_url(path)).multipart(form);
        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        let request = self.client.delete(self.build_url(path));
        self.execute(request).await?;
        Ok(())
    }
}
