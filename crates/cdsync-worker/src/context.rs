//! Shared application context.

use std::sync::Arc;

use cdsync_config::AppConfig;
use cdsync_firestore::{Connector, FirestoreManager, InitOptions, ServiceAccountConnector};
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use tracing::info;

use crate::error::StartupResult;

/// Everything a sync task needs, built once at startup.
pub struct AppContext<C: Connector = ServiceAccountConnector> {
    pub config: Arc<AppConfig>,
    pub firestore: Arc<FirestoreManager<C>>,
    /// Bounds in-flight outbound requests to `max_concurrent_requests`.
    pub request_limiter: Arc<Semaphore>,
}

impl<C: Connector> Clone for AppContext<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            firestore: Arc::clone(&self.firestore),
            request_limiter: Arc::clone(&self.request_limiter),
        }
    }
}

impl AppContext {
    /// Validate `config` and connect to Firestore over REST.
    pub async fn initialize(config: AppConfig) -> StartupResult<Self> {
        let firestore = FirestoreManager::from_config(&config, InitOptions::from_env());
        Self::start(config, firestore).await
    }
}

impl<C: Connector> AppContext<C> {
    /// Validate `config`, then initialize `firestore`.
    ///
    /// No connection is attempted when validation fails.
    pub async fn start(config: AppConfig, firestore: FirestoreManager<C>) -> StartupResult<Self> {
        config.validate()?;
        firestore.initialize().await?;

        let limit = config.system.max_concurrent_requests as usize;
        info!(
            project_id = %config.firebase.project_id,
            max_concurrent_requests = limit,
            sync_interval_minutes = config.system.sync_interval_minutes,
            "Application context ready"
        );

        Ok(Self {
            config: Arc::new(config),
            firestore: Arc::new(firestore),
            request_limiter: Arc::new(Semaphore::new(limit)),
        })
    }

    /// Wait for a free outbound request slot.
    pub async fn acquire_request_slot(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        Arc::clone(&self.request_limiter).acquire_owned().await
    }
}
