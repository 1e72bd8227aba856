//! Sync worker runtime.
//!
//! Loads configuration, sets up logging and brings up the Firestore
//! connection before any sync work starts.

pub mod context;
pub mod error;
pub mod telemetry;

pub use context::AppContext;
pub use error::StartupError;
