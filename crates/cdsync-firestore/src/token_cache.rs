//! Access token caching for Firestore authentication.
//!
//! Tokens come from an [`AccessTokenSource`]; in production that is a
//! `gcp_auth` service account. The cache:
//! - refreshes a minute before expiry
//! - refreshes under a write lock so concurrent callers fetch once
//! - keeps serving a still-unexpired token if a refresh fails

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gcp_auth::TokenProvider;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{FirestoreError, FirestoreResult};

/// Refresh margin: refresh token 60 seconds before expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Token TTL assumed when the source does not report one.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(50 * 60);

/// OAuth scope for Firestore/Datastore access.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

// =============================================================================
// Sources
// =============================================================================

/// Bearer token plus its expiry, as returned by a source.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Anything that can mint OAuth access tokens.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn fetch_token(&self) -> FirestoreResult<AccessToken>;
}

/// Token source backed by a `gcp_auth` provider.
pub struct ServiceAccountTokenSource {
    provider: Arc<dyn TokenProvider>,
}

impl ServiceAccountTokenSource {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokenSource {
    async fn fetch_token(&self) -> FirestoreResult<AccessToken> {
        let token = self
            .provider
            .token(&[FIRESTORE_SCOPE])
            .await
            .map_err(|e| FirestoreError::auth_error(format!("Failed to obtain auth token: {}", e)))?;

        Ok(AccessToken {
            value: token.as_str().to_string(),
            expires_at: Some(token.expires_at()),
        })
    }
}

// =============================================================================
// Cache
// =============================================================================

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn from_access_token(token: AccessToken) -> Self {
        let expires_at = match token.expires_at {
            Some(exp) => {
                // Already-expired tokens expire now so the next call refreshes.
                let ttl = (exp - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                Instant::now() + ttl
            }
            None => Instant::now() + TOKEN_DEFAULT_TTL,
        };

        Self {
            access_token: token.value,
            expires_at,
        }
    }

    /// Valid with the refresh margin to spare.
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }

    /// Not yet expired, even if due for refresh.
    fn is_usable(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Thread-safe token cache with single-flight refresh.
pub struct TokenCache {
    source: Arc<dyn AccessTokenSource>,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(source: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
        }
    }

    /// Drop the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_token(&self) -> FirestoreResult<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
                return Ok(cached.access_token.clone());
            }
        }

        let mut cache = self.cache.write().await;

        // Another task may have refreshed while we waited for the lock.
        if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
            return Ok(cached.access_token.clone());
        }

        match self.source.fetch_token().await {
            Ok(token) => {
                let fresh = CachedToken::from_access_token(token);
                let access_token = fresh.access_token.clone();
                *cache = Some(fresh);
                debug!("Refreshed Firestore access token");
                Ok(access_token)
            }
            Err(e) => match cache.as_ref().filter(|c| c.is_usable()) {
                Some(cached) => {
                    warn!("Token refresh failed, using existing token: {}", e);
                    Ok(cached.access_token.clone())
                }
                None => Err(e),
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
