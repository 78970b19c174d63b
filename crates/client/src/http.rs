//! JSON-over-HTTP client for the storefront backend.
//!
//! [`ApiClient::fetch`] issues exactly one request and folds every outcome
//! into an [`Envelope`]: a payload with its status, or an error message
//! with its status. Status `0` means no response arrived at all.
//!
//! The typed wrappers in [`crate::api`] sit on top of `fetch` and convert
//! envelopes into [`ClientError`] results.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{Session, bearer};
use crate::urls::join_url;

/// Message used when a transport error carries no text of its own.
pub const NETWORK_ERROR_HINT: &str =
    "Network error. Check the API URL and that the backend is reachable.";

// =============================================================================
// Request options
// =============================================================================

/// Options for a single [`ApiClient::fetch`] call.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    method: Method,
    auth: bool,
    body: Option<Value>,
    headers: Vec<(String, String)>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            auth: false,
            body: None,
            headers: Vec::new(),
        }
    }
}

impl FetchOptions {
    /// A `GET` request.
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// A `POST` request with a JSON body.
    #[must_use]
    pub fn post(body: Value) -> Self {
        Self::default().method(Method::POST).body(body)
    }

    /// A `PUT` request with a JSON body.
    #[must_use]
    pub fn put(body: Value) -> Self {
        Self::default().method(Method::PUT).body(body)
    }

    /// A `DELETE` request.
    #[must_use]
    pub fn delete() -> Self {
        Self::default().method(Method::DELETE)
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the JSON body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach the stored credential, if there is one.
    #[must_use]
    pub const fn auth(mut self) -> Self {
        self.auth = true;
        self
    }

    /// Add a request header. Later values replace earlier ones.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

// =============================================================================
// Responses
// =============================================================================

/// A successful response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The response declared a JSON content type.
    Json(Value),
    /// Any other body, as text.
    Text(String),
}

impl Payload {
    /// The body as a JSON value; text becomes a JSON string.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }

    /// Deserialize the body, naming `what` in the error.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Decode` if the body does not fit `T`.
    pub fn decode<T: DeserializeOwned>(self, what: &'static str) -> Result<T> {
        serde_json::from_value(self.into_value())
            .map_err(|source| ClientError::Decode { what, source })
    }
}

/// The outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// 2xx response.
    Data { data: Payload, status: u16 },
    /// Non-2xx response, or `status == 0` when none was received.
    Error { error: String, status: u16 },
}

impl Envelope {
    /// HTTP status, `0` for transport failures.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Data { status, .. } | Self::Error { status, .. } => *status,
        }
    }

    /// Whether the request succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    /// Convert into a `Result`.
    ///
    /// # Errors
    ///
    /// Status `0` becomes `ClientError::Network`; any other error status
    /// becomes `ClientError::Api`.
    pub fn into_result(self) -> Result<Payload> {
        match self {
            Self::Data { data, .. } => Ok(data),
            Self::Error { error, status: 0 } => Err(ClientError::Network(error)),
            Self::Error { error, status } => Err(ClientError::Api {
                status,
                message: error,
            }),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST backend.
///
/// Cheap to clone; clones share the HTTP connection pool and session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

#[derive(Debug)]
struct ApiClientInner {
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    /// Create a client over `session` with no request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(session: Session) -> Result<Self> {
        Self::with_timeout(session, None)
    }

    /// Create a client whose requests fail after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_timeout(session: Session, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http: builder.build()?,
                session,
            }),
        })
    }

    /// Create a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_timeout(config.session(), config.timeout)
    }

    /// The session this client reads its credential and base URL from.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Resolve `path` against the configured base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        join_url(&self.inner.session.get_base_url(), path)
    }

    /// The stored credential.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` if there is none.
    pub fn require_credential(&self) -> Result<SecretString> {
        self.inner
            .session
            .get_credential()
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Issue one request and report the outcome as an [`Envelope`].
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn fetch(&self, path: &str, options: FetchOptions) -> Envelope {
        let url = self.url(path);

        let headers = match self.headers(&options) {
            Ok(headers) => headers,
            Err(error) => return Envelope::Error { error, status: 0 },
        };

        let mut request = self
            .inner
            .http
            .request(options.method.clone(), &url)
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.body(body.to_string());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, error = %e, "Request failed without a response");
                return Envelope::Error {
                    error: transport_message(&e),
                    status: 0,
                };
            }
        };

        let status = response.status();
        debug!(%url, status = status.as_u16(), "Response received");

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if status.is_success() => {
                return Envelope::Error {
                    error: transport_message(&e),
                    status: status.as_u16(),
                };
            }
            Err(_) => String::new(),
        };

        if !status.is_success() {
            return Envelope::Error {
                error: error_message(status, is_json, &text),
                status: status.as_u16(),
            };
        }

        if !is_json {
            return Envelope::Data {
                data: Payload::Text(text),
                status: status.as_u16(),
            };
        }

        match serde_json::from_str(&text) {
            Ok(value) => Envelope::Data {
                data: Payload::Json(value),
                status: status.as_u16(),
            },
            Err(e) => Envelope::Error {
                error: format!("invalid JSON in response: {e}"),
                status: status.as_u16(),
            },
        }
    }

    fn headers(&self, options: &FetchOptions) -> std::result::Result<HeaderMap, String> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| format!("invalid header name {name:?}: {e}"))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| format!("invalid value for header {}: {e}", name.as_str()))?;
            headers.insert(name, value);
        }

        if options.auth
            && let Some(credential) = self.inner.session.get_credential()
        {
            let mut value = HeaderValue::from_str(&bearer(&credential))
                .map_err(|_| "stored credential is not a valid header value".to_string())?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Fetch and convert the envelope into a result.
    pub(crate) async fn call(&self, path: &str, options: FetchOptions) -> Result<Payload> {
        self.fetch(path, options).await.into_result()
    }

    /// Fetch and deserialize the payload.
    pub(crate) async fn call_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: FetchOptions,
        what: &'static str,
    ) -> Result<T> {
        self.call(path, options).await?.decode(what)
    }
}

/// Error text for a non-success response.
fn error_message(status: StatusCode, is_json: bool, body: &str) -> String {
    let from_body = if is_json {
        serde_json::from_str::<Value>(body)
            .ok()
            .map(|value| json_error_message(&value))
    } else {
        Some(body.trim_end().to_owned())
    };

    from_body
        .filter(|m| !m.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_owned))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn json_error_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => value.to_string(),
        },
        _ => value.to_string(),
    }
}

/// The transport error and its causes, joined.
fn transport_message(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    if message.trim().is_empty() {
        NETWORK_ERROR_HINT.to_owned()
    } else {
        message
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::Router;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode as AxumStatus, header};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use secrecy::ExposeSecret;
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;
    use crate::testing::{client_for, spawn};

    fn header_value(headers: &AxumHeaders, name: &str) -> Value {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map_or(Value::Null, |v| Value::String(v.to_owned()))
    }

    async fn echo_headers(headers: AxumHeaders) -> impl IntoResponse {
        axum::Json(json!({
            "authorization": header_value(&headers, "authorization"),
            "content_type": header_value(&headers, "content-type"),
            "x_trace": header_value(&headers, "x-trace"),
            "cookie": header_value(&headers, "cookie"),
        }))
    }

    fn app() -> Router {
        Router::new()
            .route("/products", get(echo_headers))
            .route("/echo", post(|body: String| async move { body }))
            .route(
                "/bad",
                get(|| async {
                    (AxumStatus::BAD_REQUEST, axum::Json(json!({"message": "bad request"})))
                }),
            )
            .route(
                "/bad-shape",
                get(|| async { (AxumStatus::CONFLICT, axum::Json(json!({"code": 7}))) }),
            )
            .route(
                "/bad-string",
                get(|| async { (AxumStatus::UNPROCESSABLE_ENTITY, axum::Json(json!("nope"))) }),
            )
            .route(
                "/plain-error",
                get(|| async { (AxumStatus::UNAUTHORIZED, "invalid token\n") }),
            )
            .route("/empty-error", get(|| async { AxumStatus::NOT_FOUND }))
            .route("/text", get(|| async { "pong" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "late"
                }),
            )
            .route(
                "/broken-json",
                get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{oops") }),
            )
    }

    #[tokio::test]
    async fn test_relative_path_and_no_auth_header() {
        let base = spawn(app()).await;
        let client = client_for(&format!("{base}///"));
        client.session().set_credential("tok").unwrap();

        let envelope = client.fetch("products", FetchOptions::get()).await;
        assert_eq!(envelope.status(), 200);
        let data = envelope.into_result().unwrap().into_value();
        assert_eq!(data["authorization"], Value::Null);
        assert_eq!(data["content_type"], "application/json");
        assert_eq!(data["cookie"], Value::Null);
    }

    #[tokio::test]
    async fn test_auth_header_and_extra_headers() {
        let base = spawn(app()).await;
        let client = client_for(&base);
        client.session().set_credential("tok-9").unwrap();

        let options = FetchOptions::get()
            .auth()
            .header("X-Trace", "abc")
            .header("Content-Type", "application/vnd.test+json");
        let data = client
            .fetch("/products", options)
            .await
            .into_result()
            .unwrap()
            .into_value();
        assert_eq!(data["authorization"], "Bearer tok-9");
        assert_eq!(data["x_trace"], "abc");
        assert_eq!(data["content_type"], "application/vnd.test+json");
    }

    #[tokio::test]
    async fn test_auth_without_credential_sends_no_header() {
        let base = spawn(app()).await;
        let client = client_for(&base);
        let data = client
            .fetch("/products", FetchOptions::get().auth())
            .await
            .into_result()
            .unwrap()
            .into_value();
        assert_eq!(data["authorization"], Value::Null);
    }

    #[tokio::test]
    async fn test_body_is_sent_as_json() {
        let base = spawn(app()).await;
        let client = client_for(&base);
        let envelope = client
            .fetch("/echo", FetchOptions::post(json!({"id": 3})))
            .await;
        assert_eq!(
            envelope,
            Envelope::Data {
                data: Payload::Text(r#"{"id":3}"#.into()),
                status: 200
            }
        );
    }

    #[tokio::test]
    async fn test_json_error_message() {
        let base = spawn(app()).await;
        let client = client_for(&base);
        assert_eq!(
            client.fetch("/bad", FetchOptions::get()).await,
            Envelope::Error {
                error: "bad request".into(),
                status: 400
            }
        );
        assert_eq!(
            client.fetch("/bad-shape", FetchOptions::get()).await,
            Envelope::Error {
                error: r#"{"code":7}"#.into(),
                status: 409
            }
        );
        assert_eq!(
            client.fetch("/bad-string", FetchOptions::get()).await,
            Envelope::Error {
                error: "nope".into(),
                status: 422
            }
        );
    }

    #[tokio::test]
    async fn test_text_error_and_reason_fallback() {
        let base = spawn(app()).await;
        let client = client_for(&base);
        assert_eq!(
            client.fetch("/plain-error", FetchOptions::get()).await,
            Envelope::Error {
                error: "invalid token".into(),
                status: 401
            }
        );
        assert_eq!(
            client.fetch("/empty-error", FetchOptions::get()).await,
            Envelope::Error {
                error: "Not Found".into(),
                status: 404
            }
        );
    }

    #[tokio::test]
    async fn test_text_success_and_broken_json() {
        let base = spawn(app()).await;
        let client = client_for(&base);
        let envelope = client.fetch("/text", FetchOptions::get()).await;
        assert_eq!(
            envelope.into_result().unwrap(),
            Payload::Text("pong".into())
        );

        let envelope = client.fetch("/broken-json", FetchOptions::get()).await;
        assert_eq!(envelope.status(), 200);
        assert!(!envelope.is_ok());
    }

    #[tokio::test]
    async fn test_network_failure_is_status_zero() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{addr}"));
        let envelope = client.fetch("/products", FetchOptions::get()).await;
        assert_eq!(envelope.status(), 0);
        match envelope.clone() {
            Envelope::Error { error, .. } => assert!(!error.is_empty()),
            Envelope::Data { .. } => panic!("expected an error"),
        }
        assert!(matches!(
            envelope.into_result(),
            Err(ClientError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_status_zero() {
        let base = spawn(app()).await;
        let session = Session::new(
            Arc::new(crate::storage::MemoryStorage::new()),
            Arc::new(crate::storage::MemoryStorage::new()),
        );
        session.set_base_url(&base).unwrap();
        let client = ApiClient::with_timeout(session, Some(Duration::from_millis(100))).unwrap();

        let envelope = client.fetch("/slow", FetchOptions::get()).await;
        match envelope.clone() {
            Envelope::Error { error, status } => {
                assert_eq!(status, 0);
                assert!(!error.is_empty());
            }
            Envelope::Data { .. } => panic!("expected a timeout"),
        }
        assert!(matches!(
            envelope.into_result(),
            Err(ClientError::Network(_))
        ));

        let envelope = client.fetch("/text", FetchOptions::get()).await;
        assert_eq!(envelope.status(), 200);
    }

    #[tokio::test]
    async fn test_invalid_header_is_reported_without_sending() {
        let client = client_for("http://127.0.0.1:9");
        let envelope = client
            .fetch("/x", FetchOptions::get().header("bad header", "v"))
            .await;
        assert_eq!(envelope.status(), 0);
    }

    #[test]
    fn test_url_resolution() {
        let client = client_for("myapi.example.com");
        assert_eq!(client.url("/products"), "http://myapi.example.com/products");
        assert_eq!(
            client.url("https://elsewhere.test/x"),
            "https://elsewhere.test/x"
        );
    }

    #[test]
    fn test_require_credential() {
        let client = client_for("shop.test");
        assert!(matches!(
            client.require_credential(),
            Err(ClientError::NotAuthenticated)
        ));
        client.session().set_credential("tok").unwrap();
        assert_eq!(client.require_credential().unwrap().expose_secret(), "tok");
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, false, "  \n"), "Bad Gateway");
        assert_eq!(
            error_message(StatusCode::from_u16(599).unwrap(), false, ""),
            "HTTP 599"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, true, "not json"),
            "Bad Request"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, true, r#"{"message":""}"#),
            r#"{"message":""}"#
        );
    }
}
