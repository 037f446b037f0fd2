//! Session client for the library REST API.
//!
//! This module provides the `SessionClient` struct. Every public method maps
//! to exactly one HTTP round trip; there are no retries and no caching.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::auth::{Credentials, Session, SessionData, TokenResponse};
use crate::config::Config;
use crate::models::{ApiResponse, EntityKind, Fields, Payload};

use super::ApiError;

// ============================================================================
// Endpoints
// ============================================================================

const TOKEN_PATH: &str = "token/";
const RESERVATIONS_PATH: &str = "reservas/";
const DASHBOARD_PATH: &str = "dashboard/";
const DUE_REMINDERS_PATH: &str = "lembrete-devolucao/";
const EXPIRING_RESERVATIONS_PATH: &str = "avisar-reservas-expirando/";
const CURRENT_USER_PATH: &str = "usuarios/me/";
const TEST_EMAIL_PATH: &str = "teste-email/";
const PUBLIC_ALERTS_PATH: &str = "alertas/publicos/";

/// Query parameter selecting the dashboard reporting period
const DASHBOARD_PERIOD_PARAM: &str = "periodo";

/// Client for the library API.
/// Clone is cheap - clones share the connection pool and the session.
#[derive(Clone)]
pub struct SessionClient {
    client: Client,
    base_url: String,
    session: Arc<RwLock<Session>>,
}

impl SessionClient {
    /// Create a client with the transport's default timeout behaviour
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, ?timeout, "Session client created");

        Ok(Self {
            client,
            base_url,
            session: Arc::new(RwLock::new(Session::new())),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::with_timeout(
            config.api_base_url(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Session =====

    /// Copy of the current session data, if logged in
    pub async fn session_data(&self) -> Option<SessionData> {
        self.session.read().await.data.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    /// Forget the credential. Sends nothing to the server.
    pub async fn logout(&self) {
        self.session.write().await.clear();
        info!("Logged out");
    }

    /// Exchange email/password for an access token and store it.
    ///
    /// The session is only written when the server returns a usable token;
    /// on any failure the previous credential (or its absence) is kept.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<SessionData, ApiError> {
        let url = self.url(TOKEN_PATH);
        debug!(url = %url, email = %credentials.email, "Sending login request");

        let request = self.client.post(&url).json(credentials);
        let response = self.execute(request, &Method::POST, &url).await?;

        let token: TokenResponse = match response.payload {
            Payload::Json(value) => serde_json::from_value(value).map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse token response: {}", e))
            })?,
            _ => {
                return Err(ApiError::InvalidResponse(
                    "Token response is not JSON".to_string(),
                ))
            }
        };

        let data = SessionData::new(token.access, token.user);
        self.session.write().await.update(data.clone());
        info!(email = %credentials.email, "Login successful");
        Ok(data)
    }

    // ===== Request plumbing =====

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Read the token once; the lock is released before any network I/O.
    async fn bearer_token(&self) -> Result<String, ApiError> {
        self.session
            .read()
            .await
            .token()
            .map(str::to_string)
            .ok_or(ApiError::MissingCredential)
    }

    /// Decode a response body. A 204 is never decoded.
    async fn read_response(response: reqwest::Response) -> Result<ApiResponse, ApiError> {
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse {
                status,
                payload: Payload::Empty,
            });
        }
        let body = response.text().await?;
        Ok(ApiResponse {
            status,
            payload: Payload::from_body(&body),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    fn check_response(response: ApiResponse, url: &str) -> Result<ApiResponse, ApiError> {
        if response.status.is_success() {
            Ok(response)
        } else {
            warn!(url = url, status = %response.status, "Request rejected by server");
            Err(ApiError::from_status(response.status, response.payload))
        }
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        method: &Method,
        url: &str,
    ) -> Result<ApiResponse, ApiError> {
        let response = request.send().await.map_err(|e| {
            error!(method = %method, url = url, error = %e, "Request failed");
            ApiError::Network(e)
        })?;
        let response = Self::read_response(response).await?;
        debug!(method = %method, url = url, status = %response.status, "Response received");
        Self::check_response(response, url)
    }

    async fn send_authorized<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<ApiResponse, ApiError> {
        let token = self.bearer_token().await?;
        let url = self.url(path);
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self.client.request(method.clone(), &url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request, &method, &url).await
    }

    async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send_authorized::<()>(Method::GET, path, &[], None).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> Result<ApiResponse, ApiError> {
        self.send_authorized(Method::POST, path, &[], body).await
    }

    // ===== Entity CRUD =====

    pub async fn list(&self, kind: EntityKind) -> Result<ApiResponse, ApiError> {
        self.get(&collection_path(kind)).await
    }

    pub async fn create(&self, kind: EntityKind, fields: &Fields) -> Result<ApiResponse, ApiError> {
        debug!(kind = kind.display_name(), fields = fields.len(), "Creating entity");
        self.post(&collection_path(kind), Some(fields)).await
    }

    pub async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        fields: &Fields,
    ) -> Result<ApiResponse, ApiError> {
        self.send_authorized(Method::PUT, &item_path(kind, id), &[], Some(fields))
            .await
    }

    /// Soft-delete an entity. The backend answers 204 on success.
    pub async fn deactivate(&self, kind: EntityKind, id: &str) -> Result<ApiResponse, ApiError> {
        self.send_authorized::<()>(Method::DELETE, &item_path(kind, id), &[], None)
            .await
    }

    // ===== Reservations and loans =====

    pub async fn create_reservation(&self, item_id: &str) -> Result<ApiResponse, ApiError> {
        self.post(RESERVATIONS_PATH, Some(&json!({ "livro": item_id })))
            .await
    }

    pub async fn confirm_reservation(&self, reservation_id: &str) -> Result<ApiResponse, ApiError> {
        let path = format!("{}confirmar/", item_path(EntityKind::Reservations, reservation_id));
        self.post::<()>(&path, None).await
    }

    pub async fn return_loan(&self, loan_id: &str) -> Result<ApiResponse, ApiError> {
        let path = format!("{}devolver/", item_path(EntityKind::Loans, loan_id));
        self.post::<()>(&path, None).await
    }

    // ===== Reports and notifications =====

    /// Fetch the admin dashboard. `period` is passed through verbatim.
    pub async fn dashboard(&self, period: Option<&str>) -> Result<ApiResponse, ApiError> {
        match period.filter(|p| !p.is_empty()) {
            Some(period) => {
                self.send_authorized::<()>(
                    Method::GET,
                    DASHBOARD_PATH,
                    &[(DASHBOARD_PERIOD_PARAM, period)],
                    None,
                )
                .await
            }
            None => self.get(DASHBOARD_PATH).await,
        }
    }

    /// Trigger the overdue-loan reminder emails
    pub async fn due_reminders(&self) -> Result<ApiResponse, ApiError> {
        self.get(DUE_REMINDERS_PATH).await
    }

    /// Trigger the expiring-reservation notices
    pub async fn expiring_reservations(&self) -> Result<ApiResponse, ApiError> {
        self.get(EXPIRING_RESERVATIONS_PATH).await
    }

    pub async fn current_user(&self) -> Result<ApiResponse, ApiError> {
        self.get(CURRENT_USER_PATH).await
    }

    pub async fn send_test_email(&self) -> Result<ApiResponse, ApiError> {
        self.get(TEST_EMAIL_PATH).await
    }

    /// Public alerts need no login; the token is attached when there is one.
    pub async fn public_alerts(&self) -> Result<ApiResponse, ApiError> {
        let token = self.session.read().await.token().map(str::to_string);
        let url = self.url(PUBLIC_ALERTS_PATH);
        debug!(url = %url, authenticated = token.is_some(), "Sending request");

        let mut request = self.client.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.execute(request, &Method::GET, &url).await
    }
}

fn collection_path(kind: EntityKind) -> String {
    format!("{}/", kind.path())
}

/// Ids are opaque and interpolated verbatim
fn item_path(kind: EntityKind, id: &str) -> String {
    format!("{}/{}/", kind.path(), id)
}
