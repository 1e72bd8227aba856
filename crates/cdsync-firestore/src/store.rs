//! Document store seams used by connection initialization.

use std::collections::HashMap;

use async_trait::async_trait;
use cdsync_config::ServiceAccountPayload;

use crate::client::{FirestoreClient, FirestoreConfig};
use crate::error::FirestoreResult;
use crate::types::{FieldValue, SetOptions, WriteResult};

/// A handle that can write documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn set_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, FieldValue>,
        options: SetOptions,
    ) -> FirestoreResult<WriteResult>;
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn set_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, FieldValue>,
        options: SetOptions,
    ) -> FirestoreResult<WriteResult> {
        FirestoreClient::set_document(self, collection, doc_id, fields, options).await
    }
}

/// Creates store handles from service account credentials.
#[async_trait]
pub trait Connector: Send + Sync {
    type Store: DocumentStore + 'static;

    async fn connect(&self, credentials: &ServiceAccountPayload) -> FirestoreResult<Self::Store>;
}

/// Connects to Firestore over REST.
#[derive(Debug, Clone)]
pub struct ServiceAccountConnector {
    config: FirestoreConfig,
}

impl ServiceAccountConnector {
    pub fn new(config: FirestoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }
}

#[async_trait]
impl Connector for ServiceAccountConnector {
    type Store = FirestoreClient;

    async fn connect(&self, credentials: &ServiceAccountPayload) -> FirestoreResult<FirestoreClient> {
        let mut config = self.config.clone();
        if config.project_id.is_empty() {
            config.project_id = credentials.project_id.clone();
        }
        FirestoreClient::from_service_account(config, credentials)
    }
}
