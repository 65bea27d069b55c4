use crate::{BookingId, UserId, requests, responses};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

/// Global timeout applied to every request on native targets.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Response header carrying the total row count for header-paginated
/// endpoints.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Invoked whenever the backend answers 401, after the stored token has been
/// dropped.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// An API client for interfacing with the admin backend.
#[derive(Clone)]
pub struct APIClient {
    pub address: String,
    pub inner_client: reqwest::Client,
    token: Arc<RwLock<Option<SecretString>>>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl APIClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self::with_inner_client(address, default_inner_client())
    }

    pub fn with_inner_client(
        address: impl Into<String>,
        inner_client: reqwest::Client,
    ) -> Self {
        Self {
            address: address.into(),
            inner_client,
            token: Arc::new(RwLock::new(None)),
            on_unauthorized: None,
        }
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.set_token(token);
        self
    }

    pub fn on_unauthorized(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = SecretString::from(token.into());
        *self.token.write().unwrap_or_else(PoisonError::into_inner) =
            Some(token);
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_inner_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .unwrap_or_default()
}

// Browsers enforce their own fetch timeouts.
#[cfg(target_arch = "wasm32")]
fn default_inner_client() -> reqwest::Client {
    reqwest::Client::new()
}

/// Helper methods for http actions
impl APIClient {
    fn format_url(&self, path: &str) -> String {
        format!("{}/api/{path}", &self.address)
    }

    /// Attach the bearer credential, if any. The guard is released before
    /// the request is sent.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|token| token.expose_secret().to_owned());
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&(dyn erased::Body + Sync)>,
    ) -> ReqwestResult {
        let request = self.inner_client.request(method, self.format_url(path));
        let request = match body {
            Some(body) => body.attach(request),
            None => request,
        };
        self.authorize(request).send().await
    }

    async fn get_with_query(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ReqwestResult {
        let request = self.inner_client.get(self.format_url(path)).query(query);
        self.authorize(request).send().await
    }

    /// Turn 401s into `ClientError::Unauthorized`, dropping the stored token
    /// and notifying the session hook.
    async fn check(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!("Session rejected by backend, clearing token");
            self.clear_token();
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
            return Err(ClientError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }
}

/// Methods on the backend API
impl APIClient {
    /// Fetch one page of a listing endpoint. The body is left undecoded so
    /// that callers can normalize the various pagination conventions.
    pub async fn get_page(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<RawPage, ClientError> {
        let response = self.get_with_query(path, query).await?;
        let response = self.check(response).await?;
        let total_header = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.json::<serde_json::Value>().await?;
        Ok(RawPage { body, total_header })
    }

    /// Log in and keep the returned access token for subsequent requests.
    pub async fn login(
        &self,
        details: &requests::LoginCredentials,
    ) -> Result<responses::AuthTokens, ClientError> {
        let response = self.send(Method::POST, "auth/login", Some(details)).await?;
        let tokens: responses::AuthTokens = ok_body(self, response).await?;
        self.set_token(tokens.access_token.clone());
        Ok(tokens)
    }

    /// The backend keeps no session state for bearer tokens, so logging out
    /// only forgets the token.
    pub fn logout(&self) {
        self.clear_token();
    }

    pub async fn current_user(
        &self,
    ) -> Result<responses::UserProfile, ClientError> {
        let response = self.send(Method::GET, "auth/me", None).await?;
        ok_body(self, response).await
    }

    pub async fn update_booking_status(
        &self,
        booking_id: BookingId,
        details: &requests::UpdateBookingStatus,
    ) -> Result<responses::BookingItem, ClientError> {
        let response = self
            .send(
                Method::PUT,
                &format!("admin/bookings/{booking_id}"),
                Some(details),
            )
            .await?;
        ok_body(self, response).await
    }

    pub async fn delete_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<(), ClientError> {
        let response = self
            .send(Method::DELETE, &format!("admin/bookings/{booking_id}"), None)
            .await?;
        ok_empty(self, response).await
    }

    pub async fn create_user(
        &self,
        details: &requests::AdminUserRequest,
    ) -> Result<responses::AdminUser, ClientError> {
        let response =
            self.send(Method::POST, "admin/users", Some(details)).await?;
        ok_body(self, response).await
    }

    pub async fn update_user(
        &self,
        user_id: UserId,
        details: &requests::AdminUserRequest,
    ) -> Result<responses::AdminUser, ClientError> {
        let response = self
            .send(Method::PUT, &format!("admin/users/{user_id}"), Some(details))
            .await?;
        ok_body(self, response).await
    }

    pub async fn delete_user(&self, user_id: UserId) -> Result<(), ClientError> {
        let response = self
            .send(Method::DELETE, &format!("admin/users/{user_id}"), None)
            .await?;
        ok_empty(self, response).await
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .send(
                Method::POST,
                &format!("admin/notifications/{id}/read"),
                None,
            )
            .await?;
        ok_empty(self, response).await
    }

    pub async fn global_stats(
        &self,
    ) -> Result<responses::AdminStatsResponse, ClientError> {
        let response =
            self.send(Method::GET, "admin/stats/global", None).await?;
        ok_body(self, response).await
    }
}

/// Undecoded page response: the JSON body plus the raw total-count header.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub body: serde_json::Value,
    pub total_header: Option<String>,
}

impl RawPage {
    pub fn from_body(body: serde_json::Value) -> Self {
        Self {
            body,
            total_header: None,
        }
    }
}

/// Error document returned by the backend on failed requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiErrorBody {
    pub timestamp: Option<String>,
    pub status: Option<u16>,
    pub error: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
    pub path: Option<String>,
    pub method: Option<String>,
    pub errors: BTreeMap<String, String>,
    pub request_id: Option<String>,
}

impl ApiErrorBody {
    /// Parse a response body, falling back to treating plain text as the
    /// message.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<ApiErrorBody>(trimmed) {
            Ok(body) => body,
            Err(_) => Self {
                message: Some(trimmed.to_owned()),
                ..Self::default()
            },
        }
    }

    /// The most specific human-readable message available.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|message| !message.trim().is_empty())
    }

    fn is_validation(&self, status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
        ) && !self.errors.is_empty()
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message().unwrap_or("Une erreur est survenue"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An unhandled API error to display, containing the parsed error body.
    #[error("{1}")]
    APIError(StatusCode, ApiErrorBody),
    /// Field-level validation failure, to be shown next to the inputs.
    #[error("{1}")]
    Validation(StatusCode, ApiErrorBody),
    #[error("Session expirée, veuillez vous reconnecter.")]
    Unauthorized,
    #[error("Le serveur ne répond pas.")]
    Timeout,
    #[error("Une erreur réseau est survenue")]
    Network(#[source] reqwest::Error),
    #[error("Requête annulée")]
    Cancelled,
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(e)
        }
    }
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::APIError(status, _) | Self::Validation(status, _) => {
                Some(*status)
            }
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::Network(e) => e.status(),
            Self::Timeout | Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Field errors carried by a validation failure.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Validation(_, body) => Some(&body.errors),
            _ => None,
        }
    }
}

async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return e.into(),
    };
    let mut body = ApiErrorBody::from_text(&text);
    if body.request_id.is_none() {
        body.request_id = request_id;
    }
    if body.is_validation(status) {
        ClientError::Validation(status, body)
    } else {
        ClientError::APIError(status, body)
    }
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    client: &APIClient,
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let response = client.check(response).await?;
    Ok(response.json::<T>().await?)
}

/// Check that an empty response is OK, returning a ClientError if not.
pub async fn ok_empty(
    client: &APIClient,
    response: reqwest::Response,
) -> Result<(), ClientError> {
    client.check(response).await?;
    Ok(())
}

mod erased {
    use reqwest::RequestBuilder;
    use serde::Serialize;

    /// Object-safe stand-in for `impl Serialize` request bodies.
    pub trait Body {
        fn attach(&self, request: RequestBuilder) -> RequestBuilder;
    }

    impl<T: Serialize> Body for T {
        fn attach(&self, request: RequestBuilder) -> RequestBuilder {
            request.json(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_error_body_is_parsed() {
        let body = ApiErrorBody::from_text(
            r#"{"status":404,"message":"Réservation introuvable","requestId":"abc"}"#,
        );
        assert_eq!(body.status, Some(404));
        assert_eq!(body.message(), Some("Réservation introuvable"));
        assert_eq!(body.request_id.as_deref(), Some("abc"));
        assert_eq!(body.to_string(), "Réservation introuvable");
    }

    #[test]
    fn plain_text_error_becomes_message() {
        let body = ApiErrorBody::from_text("Bad gateway\n");
        assert_eq!(body.message(), Some("Bad gateway"));
        assert!(body.errors.is_empty());
    }

    #[test]
    fn empty_error_body_falls_back_to_generic_message() {
        let body = ApiErrorBody::from_text("   ");
        assert_eq!(body, ApiErrorBody::default());
        assert_eq!(body.to_string(), "Une erreur est survenue");
    }

    #[test]
    fn validation_requires_field_map_and_client_status() {
        let body = ApiErrorBody::from_text(
            r#"{"message":"Invalide","errors":{"email":"Obligatoire"}}"#,
        );
        assert!(body.is_validation(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(body.is_validation(StatusCode::BAD_REQUEST));
        assert!(!body.is_validation(StatusCode::CONFLICT));
        assert!(!ApiErrorBody::default().is_validation(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn error_falls_back_to_error_field() {
        let body = ApiErrorBody::from_text(r#"{"error":"Forbidden"}"#);
        let error = ClientError::APIError(StatusCode::FORBIDDEN, body);
        assert_eq!(error.to_string(), "Forbidden");
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let client = APIClient::new("http://localhost").with_token("t0k3n");
        assert!(client.has_token());
        client.clear_token();
        assert!(!client.has_token());
    }
}
