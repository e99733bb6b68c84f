// Async HTTP client for the acoGO! public cloud API (v2).
//
// Base path: https://api.aco.com.pl/public/v2
// Auth: `Authorization: Bearer <token>` on every request

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, error};
use url::Url;

use crate::error::{Error, FailureKind};
use crate::models::Device;
use crate::transport::{DEFAULT_TIMEOUT, TransportConfig};

/// Fixed base of the vendor API.
pub const API_BASE: &str = "https://api.aco.com.pl/public/v2";

// ── Response body ────────────────────────────────────────────────────

/// A successful response body, decoded according to its content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// `application/json` body. An empty JSON body decodes to `Null`.
    Json(Value),
    /// Any other content type, returned as raw text.
    Text(String),
}

impl ApiResponse {
    /// Collapse into a JSON value. Non-empty text becomes a JSON string,
    /// empty text becomes `Null`.
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) if text.is_empty() => Value::Null,
            Self::Text(text) => Value::String(text),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the acoGO! cloud API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct AcogoClient {
    http: reqwest::Client,
    base_url: Url,
    auth: HeaderValue,
    timeout: Duration,
}

impl AcogoClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for the production API.
    pub fn new(token: &SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_base_url(API_BASE, token, transport)
    }

    /// Build a client against a different base URL (staging, mock server).
    pub fn with_base_url(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, base_url, token)?;
        client.timeout = transport.timeout;
        Ok(client)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        token: &SecretString,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidToken {
                message: e.to_string(),
            })?;
        auth.set_sensitive(true);

        Ok(Self {
            http,
            base_url,
            auth,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append an absolute API path (e.g. `"/devices"`) to the base path.
    fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let base_path = self.base_url.path().trim_end_matches('/');
        url.set_path(&format!("{base_path}{path}"));
        url
    }

    // ── Request core ─────────────────────────────────────────────────

    /// Send a request and classify the outcome.
    ///
    /// Status >= 400 fails: 408 as [`Error::Offline`], anything else as
    /// [`Error::Api`] carrying the body text. Transport failures (including
    /// the per-request timeout) become `Error::Api` without a status.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(path);
        debug!(%method, %url, "acogo request start");

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, self.auth.clone())
            .timeout(self.timeout);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| {
            error!(%method, %url, error = %e, "acogo request error");
            Error::transport(&e)
        })?;

        let status = resp.status();
        debug!(%method, %url, status = status.as_u16(), "acogo response status");

        if status.as_u16() >= 400 {
            let text = error_body(resp.text().await);
            if status == StatusCode::REQUEST_TIMEOUT {
                debug!(%method, %url, body = %text, "acogo device offline");
                return Err(Error::Offline { message: text });
            }
            error!(%method, %url, status = status.as_u16(), body = %text, "acogo request failed");
            return Err(Error::Api {
                status: Some(status.as_u16()),
                kind: FailureKind::Status,
                message: text,
            });
        }

        if is_json(resp.headers().get(CONTENT_TYPE)) {
            let bytes = resp.bytes().await.map_err(|e| Error::transport(&e))?;
            debug!(%method, %url, "acogo JSON response");
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(ApiResponse::Json(Value::Null));
            }
            return serde_json::from_slice(&bytes)
                .map(ApiResponse::Json)
                .map_err(|e| {
                    error!(%method, %url, error = %e, "acogo response is not valid JSON");
                    Error::decode(format!("invalid JSON body: {e}"))
                });
        }

        let text = resp.text().await.map_err(|e| Error::transport(&e))?;
        debug!(%method, %url, "acogo text response");
        Ok(ApiResponse::Text(text))
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Devices ──────────────────────────────────────────────────────

    /// List every device on the account.
    ///
    /// Accepts a bare array or one wrapped in a `message` envelope.
    pub async fn get_devices(&self) -> Result<Vec<Device>, Error> {
        let body = self.request(Method::GET, "/devices", None).await?.into_json();
        let list = match body {
            Value::Object(mut map) => map.remove("message").unwrap_or(Value::Null),
            other => other,
        };
        if list.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(list)
            .map_err(|e| Error::decode(format!("unexpected device list payload: {e}")))
    }

    // ── Gates ────────────────────────────────────────────────────────

    /// Trigger the "open gate" order.
    pub async fn open_gate(&self, device_id: &str) -> Result<ApiResponse, Error> {
        self.request(
            Method::POST,
            &format!("/devices/{device_id}/orders/ez-open"),
            None,
        )
        .await
    }

    /// Fetch gate details/status.
    pub async fn get_gate_details(&self, device_id: &str) -> Result<Value, Error> {
        self.request(Method::GET, &format!("/devices/gates/{device_id}"), None)
            .await
            .map(ApiResponse::into_json)
    }

    // ── I/O modules ──────────────────────────────────────────────────

    /// Fetch port naming and configuration of an I/O module.
    pub async fn get_io_details(&self, device_id: &str) -> Result<Value, Error> {
        self.request(Method::GET, &format!("/devices/io/{device_id}"), None)
            .await
            .map(ApiResponse::into_json)
    }

    /// Fetch current input and output levels of an I/O module.
    pub async fn get_io_state(&self, device_id: &str) -> Result<Value, Error> {
        self.request(Method::GET, &format!("/io/{device_id}/state"), None)
            .await
            .map(ApiResponse::into_json)
    }

    /// Drive output `port` (1-based) of an I/O module.
    pub async fn set_io_output(
        &self,
        device_id: &str,
        port: u8,
        state: bool,
    ) -> Result<ApiResponse, Error> {
        self.request(
            Method::POST,
            &format!("/io/{device_id}/out/{port}"),
            Some(&json!({ "state": state })),
        )
        .await
    }
}

/// Body text of an error response. A body that cannot be read is
/// reported in its place.
fn error_body(body: Result<String, reqwest::Error>) -> String {
    body.unwrap_or_else(|e| {
        error!(error = %e, "acogo error body unreadable");
        format!("<error body unreadable: {e}>")
    })
}

fn is_json(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}
