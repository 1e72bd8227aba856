//! Firebase service account credentials.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{unescape_newlines, EnvField, EnvSource};

// =============================================================================
// Schema
// =============================================================================

pub const PROJECT_ID: EnvField = EnvField::required("project_id", "FIREBASE_PROJECT_ID");
pub const PRIVATE_KEY_ID: EnvField = EnvField::required("private_key_id", "FIREBASE_PRIVATE_KEY_ID");
pub const PRIVATE_KEY: EnvField =
    EnvField::required("private_key", "FIREBASE_PRIVATE_KEY").with_transform(unescape_newlines);
pub const CLIENT_EMAIL: EnvField = EnvField::required("client_email", "FIREBASE_CLIENT_EMAIL");
pub const CLIENT_ID: EnvField = EnvField::required("client_id", "FIREBASE_CLIENT_ID");
pub const CLIENT_X509_CERT_URL: EnvField =
    EnvField::required("client_x509_cert_url", "FIREBASE_CLIENT_X509_CERT_URL");

/// All Firebase fields, in load order.
pub const FIELDS: [EnvField; 6] = [
    PROJECT_ID,
    PRIVATE_KEY_ID,
    PRIVATE_KEY,
    CLIENT_EMAIL,
    CLIENT_ID,
    CLIENT_X509_CERT_URL,
];

/// Google OAuth endpoints baked into every service account record.
pub const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const AUTH_PROVIDER_X509_CERT_URL: &str = "https://www.googleapis.com/oauth2/v1/certs";
pub const SERVICE_ACCOUNT_TYPE: &str = "service_account";

const REDACTED: &str = "[REDACTED]";

// =============================================================================
// Credentials
// =============================================================================

/// Service account credentials read from `FIREBASE_*` variables.
#[derive(Clone, PartialEq, Eq, Validate)]
pub struct ServiceCredentials {
    #[validate(length(min = 1, message = "project_id must not be empty"))]
    pub project_id: String,

    #[validate(length(min = 1, message = "private_key_id must not be empty"))]
    pub private_key_id: String,

    /// PEM private key with real newlines.
    #[validate(custom(function = "validate_private_key"))]
    pub private_key: String,

    #[validate(email(message = "client_email must be an email address"))]
    pub client_email: String,

    #[validate(length(min = 1, message = "client_id must not be empty"))]
    pub client_id: String,

    #[validate(url(message = "client_x509_cert_url must be a URL"))]
    pub client_x509_cert_url: String,
}

impl ServiceCredentials {
    /// Load credentials from an environment source.
    ///
    /// Fails on the first missing variable; nothing is returned partially filled.
    pub fn from_source(env: &impl EnvSource) -> ConfigResult<Self> {
        Ok(Self {
            project_id: PROJECT_ID.resolve(env)?,
            private_key_id: PRIVATE_KEY_ID.resolve(env)?,
            private_key: PRIVATE_KEY.resolve(env)?,
            client_email: CLIENT_EMAIL.resolve(env)?,
            client_id: CLIENT_ID.resolve(env)?,
            client_x509_cert_url: CLIENT_X509_CERT_URL.resolve(env)?,
        })
    }

    /// Build the service account record understood by Google auth libraries.
    pub fn to_payload(&self) -> ServiceAccountPayload {
        ServiceAccountPayload {
            account_type: SERVICE_ACCOUNT_TYPE.to_string(),
            project_id: self.project_id.clone(),
            private_key_id: self.private_key_id.clone(),
            private_key: self.private_key.clone(),
            client_email: self.client_email.clone(),
            client_id: self.client_id.clone(),
            auth_uri: AUTH_URI.to_string(),
            token_uri: TOKEN_URI.to_string(),
            auth_provider_x509_cert_url: AUTH_PROVIDER_X509_CERT_URL.to_string(),
            client_x509_cert_url: self.client_x509_cert_url.clone(),
        }
    }
}

impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &REDACTED)
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("client_x509_cert_url", &self.client_x509_cert_url)
            .finish()
    }
}

/// Private key must be a single PEM block once escapes are expanded.
fn validate_private_key(key: &str) -> Result<(), ValidationError> {
    let invalid = |message: &'static str| {
        let mut err = ValidationError::new("private_key_pem");
        err.message = Some(message.into());
        err
    };

    if key.contains("\\n") {
        return Err(invalid("private_key still contains escaped newlines"));
    }

    let lines: Vec<&str> = key
        .trim()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let (first, last) = match (lines.first(), lines.last()) {
        (Some(first), Some(last)) if lines.len() >= 3 => (*first, *last),
        _ => return Err(invalid("private_key is not a PEM block")),
    };

    if !(first.starts_with("-----BEGIN ") && first.ends_with("PRIVATE KEY-----")) {
        return Err(invalid("private_key is missing the PEM header"));
    }
    if !(last.starts_with("-----END ") && last.ends_with("PRIVATE KEY-----")) {
        return Err(invalid("private_key is missing the PEM footer"));
    }
    Ok(())
}

// =============================================================================
// Payload
// =============================================================================

/// Service account JSON record, as written in a downloaded key file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountPayload {
    #[serde(rename = "type")]
    pub account_type: String,
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub client_x509_cert_url: String,
}

impl ServiceAccountPayload {
    /// Serialize to the JSON key-file format.
    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string(self).map_err(ConfigError::validation)
    }
}

impl fmt::Debug for ServiceAccountPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountPayload")
            .field("type", &self.account_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &REDACTED)
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
