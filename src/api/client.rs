//! API Client
//!
//! Main client for the Brightbox API, combining authentication and HTTP
//! functionality, and exposing it to the resource layer through [`RemoteApi`].

use super::auth::{ApiCredentials, Grant, TokenStore};
use super::error::{ApiError, ApiResult};
use super::http::ApiHttpClient;
use crate::resource::{RemoteApi, ResourceKind};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Version prefix of every REST path
const API_VERSION: &str = "1.0";

enum Method<'a> {
    Get,
    Post(Option<&'a Value>),
    Delete,
}

/// Main API client
#[derive(Clone)]
pub struct ApiClient {
    pub credentials: ApiCredentials,
    pub http: ApiHttpClient,
    pub api_url: String,
    pub account: Option<String>,
}

impl ApiClient {
    /// Create a new API client authenticating with client credentials
    pub fn new(
        api_url: &str,
        client_id: &str,
        secret: &str,
        account: Option<&str>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let grant = Grant::ClientCredentials {
            client_id: client_id.to_string(),
            secret: secret.to_string(),
        };
        Self::with_grant(api_url, api_url, grant, account, timeout)
    }

    /// Create a client for any grant; tokens come from `<auth_url>/token`
    pub fn with_grant(
        api_url: &str,
        auth_url: &str,
        grant: Grant,
        account: Option<&str>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let api_url = api_url.trim_end_matches('/').to_string();
        let http = ApiHttpClient::new(timeout)?;
        let credentials = ApiCredentials::new(http.inner().clone(), auth_url, grant);

        Ok(Self {
            credentials,
            http,
            api_url,
            account: account.map(|s| s.to_string()),
        })
    }

    /// Keep access tokens in `store` between runs
    pub fn with_token_store(mut self, store: TokenStore) -> Self {
        self.credentials = self.credentials.with_store(store);
        self
    }

    /// Make a GET request
    pub async fn get_json(&self, url: &str) -> ApiResult<Value> {
        self.request(Method::Get, url).await
    }

    /// Make a POST request
    pub async fn post_json(&self, url: &str, body: Option<&Value>) -> ApiResult<Value> {
        self.request(Method::Post(body), url).await
    }

    /// Make a DELETE request
    pub async fn delete_json(&self, url: &str) -> ApiResult<Value> {
        self.request(Method::Delete, url).await
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build a collection URL, adding the account scope where the kind needs it
    pub fn collection_url(&self, kind: ResourceKind) -> String {
        let url = format!("{}/{}/{}", self.api_url, API_VERSION, kind.collection());
        self.scoped(kind, url)
    }

    /// Build a member URL
    pub fn member_url(&self, kind: ResourceKind, id: &str) -> String {
        let url = format!(
            "{}/{}/{}/{}",
            self.api_url,
            API_VERSION,
            kind.collection(),
            urlencoding::encode(id)
        );
        self.scoped(kind, url)
    }

    /// Build a member action URL (e.g. `servers/srv-12345/stop`)
    pub fn action_url(&self, kind: ResourceKind, id: &str, action: &str) -> String {
        let url = format!(
            "{}/{}/{}/{}/{}",
            self.api_url,
            API_VERSION,
            kind.collection(),
            urlencoding::encode(id),
            urlencoding::encode(action)
        );
        self.scoped(kind, url)
    }

    fn scoped(&self, kind: ResourceKind, url: String) -> String {
        match (&self.account, kind.account_scoped()) {
            (Some(account), true) => {
                format!("{}?account_id={}", url, urlencoding::encode(account))
            }
            _ => url,
        }
    }

    /// Send a request, refreshing the access token once if it was rejected
    async fn request(&self, method: Method<'_>, url: &str) -> ApiResult<Value> {
        let token = self.credentials.get_token().await?;

        match self.dispatch(&method, url, &token).await {
            Err(ApiError::Unauthorized(reason)) => {
                tracing::info!("Access token rejected ({}), refreshing", reason);
                let token = self.credentials.refresh_token().await?;
                self.dispatch(&method, url, &token).await
            }
            other => other,
        }
    }

    async fn dispatch(&self, method: &Method<'_>, url: &str, token: &str) -> ApiResult<Value> {
        match method {
            Method::Get => self.http.get(url, token).await,
            Method::Post(body) => self.http.post(url, token, *body).await,
            Method::Delete => self.http.delete(url, token).await,
        }
    }
}

#[async_trait]
impl RemoteApi for ApiClient {
    async fn list(&self, kind: ResourceKind) -> ApiResult<Vec<Value>> {
        let response = self.get_json(&self.collection_url(kind)).await?;
        match response {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(ApiError::UnexpectedResponse(format!(
                "expected a list of {}, got {}",
                kind.collection(),
                kind_of(&other)
            ))),
        }
    }

    async fn get(&self, kind: ResourceKind, id: &str) -> ApiResult<Option<Value>> {
        match self.get_json(&self.member_url(kind, id)).await {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create(&self, kind: ResourceKind, attributes: &Value) -> ApiResult<Value> {
        tracing::info!("Creating {} with {}", kind.display_name(), attributes);
        self.post_json(&self.collection_url(kind), Some(attributes))
            .await
    }

    async fn destroy(&self, kind: ResourceKind, id: &str) -> ApiResult<()> {
        tracing::info!("Destroying {} {}", kind.display_name(), id);
        self.delete_json(&self.member_url(kind, id)).await?;
        Ok(())
    }

    async fn perform(&self, kind: ResourceKind, id: &str, action: &str) -> ApiResult<Value> {
        tracing::info!("{} {} {}", action, kind.display_name(), id);
        self.post_json(&self.action_url(kind, id, action), None)
            .await
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
