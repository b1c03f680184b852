//! CRM Client
//!
//! Main client for the CRM's REST and GraphQL endpoints, combining
//! credentials and HTTP functionality behind the [`Transport`] trait.

use super::auth::Credentials;
use super::http::{ApiHttpClient, TransportError};
use crate::resource::ListQueryOptions;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

/// Default API host when neither flag nor config sets one
pub const DEFAULT_BASE_URL: &str = "https://api.twenty.com";

/// Calls the resource commands need from the API.
///
/// Every method returns the parsed JSON document; decoding into typed
/// records happens in [`crate::resource::rest`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn list(&self, endpoint: &str, options: &ListQueryOptions)
        -> Result<Value, TransportError>;

    async fn get(&self, endpoint: &str, id: &str) -> Result<Value, TransportError>;

    async fn create(&self, endpoint: &str, input: &Value) -> Result<Value, TransportError>;

    async fn update(&self, endpoint: &str, id: &str, input: &Value)
        -> Result<Value, TransportError>;

    async fn delete(&self, endpoint: &str, id: &str) -> Result<(), TransportError>;

    /// Escape hatch for passthrough commands
    async fn do_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError>;
}

/// Main CRM client
#[derive(Clone, Debug)]
pub struct ApiClient {
    pub credentials: Credentials,
    http: ApiHttpClient,
    base_url: String,
}

impl ApiClient {
    /// Create a new CRM client
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self, TransportError> {
        let base_url = url::Url::parse(base_url)?;
        let http = ApiHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a REST collection URL
    pub fn rest_url(&self, endpoint: &str) -> String {
        format!("{}/rest/{}", self.base_url, endpoint)
    }

    /// Build a REST record URL
    pub fn record_url(&self, endpoint: &str, id: &str) -> String {
        format!("{}/{}", self.rest_url(endpoint), urlencoding::encode(id))
    }

    /// Build a URL for an arbitrary API path
    pub fn path_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let token = self.credentials.token()?;
        self.http.send(method, url, token, query, body).await
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn list(
        &self,
        endpoint: &str,
        options: &ListQueryOptions,
    ) -> Result<Value, TransportError> {
        let query = options.to_query_pairs();
        self.send(Method::GET, &self.rest_url(endpoint), &query, None)
            .await
    }

    async fn get(&self, endpoint: &str, id: &str) -> Result<Value, TransportError> {
        self.send(Method::GET, &self.record_url(endpoint, id), &[], None)
            .await
    }

    async fn create(&self, endpoint: &str, input: &Value) -> Result<Value, TransportError> {
        tracing::info!("create {}", endpoint);
        self.send(Method::POST, &self.rest_url(endpoint), &[], Some(input))
            .await
    }

    async fn update(
        &self,
        endpoint: &str,
        id: &str,
        input: &Value,
    ) -> Result<Value, TransportError> {
        tracing::info!("update {} {}", endpoint, id);
        self.send(Method::PATCH, &self.record_url(endpoint, id), &[], Some(input))
            .await
    }

    async fn delete(&self, endpoint: &str, id: &str) -> Result<(), TransportError> {
        tracing::info!("delete {} {}", endpoint, id);
        self.send(Method::DELETE, &self.record_url(endpoint, id), &[], None)
            .await?;
        Ok(())
    }

    async fn do_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        self.send(method, &self.path_url(path), &[], body).await
    }
}
