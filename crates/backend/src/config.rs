//! Backend configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `COPPERLEAF_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   generic `DATABASE_URL`)
//! - `COPPERLEAF_SESSION_SECRET` - Session signing secret (min 32 chars, high
//!   entropy)
//!
//! ## Optional
//! - `COPPERLEAF_BASE_URL` - Public URL of the application (default:
//!   `http://localhost:3000`); an `https://` base marks session cookies
//!   `Secure`
//! - `COPPERLEAF_BLOB_BASE_URL` - Base URL served by the blob host (default:
//!   `<base_url>/media`)

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Session token signing secret
    pub session_secret: SecretString,
    /// Public base URL of the application
    pub base_url: String,
    /// Base URL under which uploaded blobs are served
    pub blob_base_url: String,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or if the
    /// session secret fails validation (length, placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = get_database_url("COPPERLEAF_DATABASE_URL")?;
        let session_secret = get_validated_secret("COPPERLEAF_SESSION_SECRET")?;

        let base_url =
            get_env_or_default("COPPERLEAF_BASE_URL", "http://localhost:3000");
        let blob_base_url = get_optional_env("COPPERLEAF_BLOB_BASE_URL")
            .unwrap_or_else(|| format!("{base_url}/media"));

        Ok(Self {
            database_url,
            session_secret,
            base_url,
            blob_base_url,
        })
    }

    /// Whether session cookies should carry the `Secure` attribute.
    ///
    /// True when the application is served over HTTPS.
    #[must_use]
    pub fn cookies_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load a secret from the environment and validate its strength.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value =
        std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
    let secret = SecretString::from(value);
    validate_secret_length(&secret, key)?;
    validate_secret_strength(secret.expose_secret(), key)?;
    Ok(secret)
}

/// Validate that a secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_secret() {
        let secret = SecretString::from("too-short");
        assert!(matches!(
            validate_secret_length(&secret, "TEST"),
            Err(ConfigError::InsecureSecret(..))
        ));
    }

    #[test]
    fn test_rejects_placeholder_secret() {
        assert!(matches!(
            validate_secret_strength("changeme-changeme-changeme-changeme", "TEST"),
            Err(ConfigError::InsecureSecret(..))
        ));
    }

    #[test]
    fn test_rejects_low_entropy_secret() {
        assert!(matches!(
            validate_secret_strength(&"a".repeat(64), "TEST"),
            Err(ConfigError::InsecureSecret(..))
        ));
    }

    #[test]
    fn test_accepts_random_secret() {
        assert!(validate_secret_strength("kX9vQ2mL8pR4tZ7wB3nH6jD1fG5sA0yE", "TEST").is_ok());
    }
}
