//! Firestore REST API client and connection initialization.
//!
//! This crate provides:
//! - Service account authentication via gcp_auth, with token caching
//! - Merge writes with the `SERVER_TIMESTAMP` sentinel
//! - Exponential backoff around client initialization
//! - A health-checked `FirestoreManager` connection handle

pub mod client;
pub mod error;
pub mod manager;
pub mod metrics;
pub mod retry;
pub mod store;
pub mod token_cache;
pub mod types;


pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use manager::{ConnectionState, FirestoreManager, InitError, InitOptions};
pub use retry::{retry_with_backoff, BackoffPolicy, RetryError, Sleeper, TokioSleeper};
pub use store::{Connector, DocumentStore, ServiceAccountConnector};
pub use types::{Document, FieldValue, SetOptions, ToFirestoreValue, Value, SERVER_TIMESTAMP};
