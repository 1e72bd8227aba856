//! Firestore REST API client.
//!
//! - Service account authentication with a cached access token
//! - HTTP client tuning (pooling, timeouts)
//! - Merge writes with server-side timestamps through `documents:commit`
//! - Observability (tracing spans, metrics)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cdsync_config::ServiceAccountPayload;
use gcp_auth::CustomServiceAccount;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info_span, Instrument};

use crate::error::{FirestoreError, FirestoreResult};
use crate::metrics::record_request;
use crate::token_cache::{AccessTokenSource, ServiceAccountTokenSource, TokenCache};
use crate::types::{build_set_write, CommitRequest, CommitResponse, Document, FieldValue, SetOptions, WriteResult};

pub const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE_ID: &str = "(default)";

// =============================================================================
// Configuration
// =============================================================================

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Scheme and host of the REST API
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: DEFAULT_DATABASE_ID.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Config for `project_id` with overrides from environment variables.
    pub fn from_env(project_id: impl Into<String>) -> Self {
        let connect_timeout_secs: u64 = std::env::var("FIRESTORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Self {
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| DEFAULT_DATABASE_ID.to_string()),
            endpoint: std::env::var("FIRESTORE_ENDPOINT")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            ..Self::new(project_id)
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Firestore REST API client.
#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    config: FirestoreConfig,
    base_url: String,
    token_cache: Arc<TokenCache>,
}

impl FirestoreClient {
    /// Create a client authenticated as the given service account.
    ///
    /// Fails with `InvalidCredentials` if the key cannot be parsed.
    pub fn from_service_account(
        config: FirestoreConfig,
        credentials: &ServiceAccountPayload,
    ) -> FirestoreResult<Self> {
        let json = credentials
            .to_json()
            .map_err(|e| FirestoreError::SerializationError(e.to_string()))?;
        let service_account = CustomServiceAccount::from_json(&json)
            .map_err(|e| FirestoreError::invalid_credentials(e.to_string()))?;

        let source = ServiceAccountTokenSource::new(Arc::new(service_account));
        Self::with_token_source(config, Arc::new(source))
    }

    /// Create a client that takes access tokens from `source`.
    pub fn with_token_source(
        config: FirestoreConfig,
        source: Arc<dyn AccessTokenSource>,
    ) -> FirestoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("cdsync-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)?;

        let base_url = format!(
            "{}/v1/projects/{}/databases/{}/documents",
            config.endpoint, config.project_id, config.database_id
        );

        Ok(Self {
            http,
            config,
            base_url,
            token_cache: Arc::new(TokenCache::new(source)),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    /// Full resource name of a document.
    pub fn full_document_name(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "projects/{}/databases/{}/documents/{}/{}",
            self.config.project_id, self.config.database_id, collection, doc_id
        )
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(collection),
            urlencoding::encode(doc_id)
        )
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Get a document; `None` if it does not exist.
    pub async fn get_document(&self, collection: &str, doc_id: &str) -> FirestoreResult<Option<Document>> {
        let url = self.document_url(collection, doc_id);

        self.execute_request("get_document", collection, doc_id, async {
            let response = self.send_authorized(|token| self.http.get(&url).bearer_auth(token)).await?;

            match response.status() {
                StatusCode::OK => Ok(Some(response.json().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Write a document.
    ///
    /// `SERVER_TIMESTAMP` fields are stamped by the server. With
    /// `SetOptions::merge()` only the given fields change; otherwise the
    /// document is replaced.
    pub async fn set_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, FieldValue>,
        options: SetOptions,
    ) -> FirestoreResult<WriteResult> {
        let url = format!("{}:commit", self.base_url);
        let write = build_set_write(self.full_document_name(collection, doc_id), fields, options);
        let request = CommitRequest { writes: vec![write] };

        self.execute_request("set_document", collection, doc_id, async {
            let response = self
                .send_authorized(|token| self.http.post(&url).bearer_auth(token).json(&request))
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let commit: CommitResponse = response.json().await?;
                    let result = commit
                        .write_results
                        .and_then(|results| results.into_iter().next())
                        .unwrap_or_default();
                    debug!(update_time = ?result.update_time, "Committed {}/{}", collection, doc_id);
                    Ok(result)
                }
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Send a request with a bearer token, refreshing once if the token expired.
    async fn send_authorized<F>(&self, build: F) -> FirestoreResult<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.token_cache.get_token().await?;
        let response = build(&token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if !Self::is_access_token_expired(&body) {
            return Err(FirestoreError::from_http_status(401, body));
        }

        debug!("Access token rejected as expired, refreshing");
        self.token_cache.invalidate().await;
        let token = self.token_cache.get_token().await?;
        Ok(build(&token).send().await?)
    }

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(&self, operation: &str, collection: &str, doc_id: &str, fut: F) -> FirestoreResult<T>
    where
        F: std::future::Future<Output = FirestoreResult<T>>,
    {
        let span = info_span!("firestore_request", operation = %operation, collection = %collection, doc_id = %doc_id);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(status: StatusCode, url: &str, response: Response) -> FirestoreError {
        let body = response.text().await.unwrap_or_default();
        FirestoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}
