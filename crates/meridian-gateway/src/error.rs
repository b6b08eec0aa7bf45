//! Gateway authentication errors.

use thiserror::Error;

/// Result type alias using [`AuthError`].
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors raised while loading an authentication provider.
///
/// Rejected credentials are not errors; they are reported as
/// [`AuthenticationResult::Rejected`](crate::AuthenticationResult::Rejected).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unknown authentication provider: {0}")]
    UnknownProvider(String),

    #[error("invalid configuration for authentication provider {provider}: {reason}")]
    InvalidConfiguration { provider: String, reason: String },
}

impl AuthError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(provider: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            provider: provider.to_owned(),
            reason: reason.into(),
        }
    }
}
