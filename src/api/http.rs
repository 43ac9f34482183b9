//! HTTP utilities for Brightbox REST API calls

use super::error::{ApiError, ApiResult};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_LOG_BODY_LENGTH)
            .last()
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Pull a human readable message out of an API error body.
///
/// The API answers with `{"error_name": "...", "errors": ["..."]}`; anything
/// else falls back to the sanitized raw body.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return sanitize_for_log(body);
    };

    let details: Vec<&str> = json
        .get("errors")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    if !details.is_empty() {
        return details.join(", ");
    }

    json.get("error_name")
        .or_else(|| json.get("error"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| sanitize_for_log(body))
}

/// HTTP client wrapper for API calls
#[derive(Clone)]
pub struct ApiHttpClient {
    client: Client,
}

impl ApiHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("bbox/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Access the underlying reqwest client (used for the token exchange)
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: &str) -> ApiResult<Value> {
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url).bearer_auth(token)).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, token: &str, body: Option<&Value>) -> ApiResult<Value> {
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        self.send(request).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: &str) -> ApiResult<Value> {
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url).bearer_auth(token)).await
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::debug!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::from_status(status, error_message(&body)));
        }

        // 202/204 responses may carry no body
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}
