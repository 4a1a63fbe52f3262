//! # HTTP Client
//!
//! JSON-over-HTTP verbs against one configured base URL.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get(path, slug)        GET    {base}/{path}/{slug}                     │
//! │  post(path, body)       POST   {base}/{path}                            │
//! │  put(path, body)        PUT    {base}/{path}                            │
//! │  update(path, slug, b)  PUT    {base}/{path}/{slug}                     │
//! │  delete(path)           DELETE {base}/{path}                            │
//! │                                                                         │
//! │  Every request: Accept + Content-Type application/json, fixed timeout.  │
//! │  Authorized clients add: Authorization: Bearer <access token>           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The bearer header is owned by the client instance it was installed on.
//! [`HttpClient::authorized`] returns a new client and never mutates a shared
//! one, so an anonymous client stays anonymous.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Auth Interceptor
// =============================================================================

/// Adds the bearer header to every outgoing request of one client.
#[derive(Clone)]
pub struct AuthInterceptor {
    token: String,
}

impl AuthInterceptor {
    pub fn new(token: impl Into<String>) -> Self {
        AuthInterceptor {
            token: token.into(),
        }
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

impl fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInterceptor")
            .field("token", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// HTTP Client
// =============================================================================

#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
    interceptor: Option<AuthInterceptor>,
}

impl HttpClient {
    /// Builds an anonymous client from validated configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(HttpClient {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.api.timeout_ms,
            interceptor: None,
        })
    }

    /// A copy of this client that sends `Authorization: Bearer <token>`.
    pub fn authorized(&self, token: impl Into<String>) -> Self {
        HttpClient {
            interceptor: Some(AuthInterceptor::new(token)),
            ..self.clone()
        }
    }

    /// A copy of this client with no auth header.
    pub fn anonymous(&self) -> Self {
        HttpClient {
            interceptor: None,
            ..self.clone()
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.interceptor.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// GET `{path}/{slug}`. An empty slug still produces the trailing slash.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, slug: &str) -> ClientResult<T> {
        let url = self.url(&format!("{}/{}", path.trim_end_matches('/'), slug));
        debug!(method = "GET", url = %url, "Sending request");
        let response = self.execute(self.client.get(&url)).await?;
        decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(method = "POST", url = %url, "Sending request");
        let response = self.execute(self.client.post(&url).json(body)).await?;
        decode(response).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(method = "PUT", url = %url, "Sending request");
        let response = self.execute(self.client.put(&url).json(body)).await?;
        decode(response).await
    }

    /// PUT `{path}/{slug}`.
    pub async fn update<B, T>(&self, path: &str, slug: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.put(&format!("{}/{}", path.trim_end_matches('/'), slug), body)
            .await
    }

    /// DELETE `{path}`. The response body is ignored.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let url = self.url(path);
        debug!(method = "DELETE", url = %url, "Sending request");
        self.execute(self.client.delete(&url)).await?;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn execute(&self, request: RequestBuilder) -> ClientResult<Response> {
        let request = match &self.interceptor {
            Some(interceptor) => interceptor.apply(request),
            None => request,
        };

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string()
        });
        warn!(status = status.as_u16(), message = %message, "Request rejected");

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            warn!(timeout_ms = self.timeout_ms, "Request timed out");
            ClientError::Timeout(self.timeout_ms)
        } else {
            warn!(error = %err, "Request failed before a response");
            err.into()
        }
    }
}

/// Decodes a JSON body. An empty body decodes as `null`.
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pulls a human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
