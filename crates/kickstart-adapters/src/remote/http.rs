//! Shared HTTP plumbing for the remote-service clients.

use std::time::Duration;

use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde_json::Value;

use kickstart_core::domain::TaskError;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Client sending `Authorization: Bearer <token>` and `accept` on every request.
pub(crate) fn bearer_client(
    service: &str,
    token: &str,
    accept: &'static str,
    settings: &HttpSettings,
) -> Result<Client, TaskError> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| TaskError::validation(format!("{service} token contains invalid characters")))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static(accept));

    Client::builder()
        .timeout(settings.timeout)
        .connect_timeout(settings.connect_timeout)
        .user_agent(concat!("kickstart/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .build()
        .map_err(|e| TaskError::http(service, e))
}

/// Send and fail on transport errors only.
pub(crate) async fn send(service: &str, request: RequestBuilder) -> Result<Response, TaskError> {
    request.send().await.map_err(|e| TaskError::http(service, e))
}

/// Send, fail on non-2xx, and parse the body as JSON (empty body is `null`).
pub(crate) async fn send_json(service: &str, request: RequestBuilder) -> Result<Value, TaskError> {
    let response = send(service, request).await?;
    expect_success(service, response).await
}

pub(crate) async fn expect_success(service: &str, response: Response) -> Result<Value, TaskError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TaskError::http(service, e))?;

    if !status.is_success() {
        return Err(TaskError::http(service, describe(status, &body)));
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| TaskError::remote(service, format!("invalid JSON: {e}")))
}

fn describe(status: StatusCode, body: &str) -> String {
    let detail: String = body.chars().take(300).collect();
    if detail.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {detail}")
    }
}

/// Read a string at a JSON pointer, or report what was missing.
pub(crate) fn string_at(service: &str, value: &Value, pointer: &str) -> Result<String, TaskError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TaskError::remote(service, format!("response has no '{pointer}'")))
}
