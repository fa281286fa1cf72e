//! Resolution of the webhook signing secret and the bot credential.
//!
//! Secrets are looked up once at startup through a [`SecretResolver`] and then
//! held as [`SecretString`] values, which neither `Debug` nor `Display` reveal.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;

/// Error type for secret resolution failures.
///
/// Security note: Does NOT include secret values in error messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretResolutionError {
    #[error("Secret not found: {reference}")]
    NotFound { reference: String },

    #[error("Access denied to secret: {reference}")]
    AccessDenied { reference: String },

    #[error("Invalid secret reference format: {reference}: {reason}")]
    InvalidFormat { reference: String, reason: String },

    #[error("Secret resolution error: {message}")]
    Other { message: String },
}

/// Abstraction for resolving secrets by name.
///
/// # Security
/// - Secret values MUST NOT be logged
/// - Secret values MUST NOT be included in error messages
/// - Implementations MUST be thread-safe
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolves a secret reference to its value.
    ///
    /// An empty value is reported as [`SecretResolutionError::NotFound`]; an
    /// empty signing secret is never a usable credential.
    async fn resolve_secret(&self, secret_ref: &str) -> Result<SecretString, SecretResolutionError>;
}

/// Resolves secrets from environment variables.
///
/// # Example
/// ```no_run
/// use relay_core::secrets::{SecretResolver, EnvironmentSecretResolver};
///
/// # async fn example() {
/// let resolver = EnvironmentSecretResolver::new();
/// let secret = resolver.resolve_secret("WEBHOOK_SECRET").await.unwrap();
/// # }
/// ```
#[derive(Debug, Default)]
pub struct EnvironmentSecretResolver;

impl EnvironmentSecretResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecretResolver for EnvironmentSecretResolver {
    async fn resolve_secret(&self, secret_ref: &str) -> Result<SecretString, SecretResolutionError> {
        match std::env::var(secret_ref) {
            Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
            Ok(_) | Err(std::env::VarError::NotPresent) => Err(SecretResolutionError::NotFound {
                reference: secret_ref.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretResolutionError::InvalidFormat {
                reference: secret_ref.to_string(),
                reason: "value is not valid unicode".to_string(),
            }),
        }
    }
}

/// Resolves secrets from files in a directory (Kubernetes/Docker secret
/// mounts). The file name is the secret reference; surrounding whitespace is
/// trimmed.
#[derive(Debug)]
pub struct FilesystemSecretResolver {
    base_path: std::path::PathBuf,
}

impl FilesystemSecretResolver {
    /// Creates a new filesystem secret resolver.
    ///
    /// # Arguments
    /// * `base_path` - Directory containing secret files
    pub fn new(base_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

#[async_trait]
impl SecretResolver for FilesystemSecretResolver {
    async fn resolve_secret(&self, secret_ref: &str) -> Result<SecretString, SecretResolutionError> {
        if secret_ref.is_empty()
            || secret_ref.contains(['/', '\\'])
            || secret_ref.starts_with('.')
        {
            return Err(SecretResolutionError::InvalidFormat {
                reference: secret_ref.to_string(),
                reason: "must be a plain file name".to_string(),
            });
        }

        let full_path = self.base_path.join(secret_ref);
        match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    return Err(SecretResolutionError::NotFound {
                        reference: secret_ref.to_string(),
                    });
                }
                Ok(SecretString::from(trimmed.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SecretResolutionError::NotFound {
                    reference: secret_ref.to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(SecretResolutionError::AccessDenied {
                    reference: secret_ref.to_string(),
                })
            }
            Err(e) => Err(SecretResolutionError::Other {
                message: format!("Failed to read secret file: {}", e),
            }),
        }
    }
}
