//! Authentication provider contract.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::AuthResult;

/// Principal value carrying the authenticated user.
pub const USER_ID_CLAIM: &str = "user-id";

/// A gateway request being authenticated.
#[derive(Debug, Clone, Default)]
pub struct GatewayRequestContext {
    pub tenant: String,
    pub application_id: String,
    pub gateway_id: String,
    /// Raw credentials presented by the caller.
    pub credentials: String,
    /// Parameters the caller supplied alongside the credentials.
    pub user_parameters: BTreeMap<String, String>,
}

impl GatewayRequestContext {
    /// Create a context carrying only credentials.
    #[must_use]
    pub fn with_credentials(credentials: impl Into<String>) -> Self {
        Self {
            credentials: credentials.into(),
            ..Self::default()
        }
    }
}

/// Outcome of authenticating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationResult {
    /// Credentials accepted; principal values become request claims.
    Authenticated {
        principal_values: BTreeMap<String, String>,
    },
    /// Credentials refused.
    Rejected { reason: String },
}

impl AuthenticationResult {
    #[must_use]
    pub fn authenticated<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Authenticated {
            principal_values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Principal values, when authenticated.
    #[must_use]
    pub const fn principal_values(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Authenticated { principal_values } => Some(principal_values),
            Self::Rejected { .. } => None,
        }
    }
}

/// Pluggable gateway authentication.
#[async_trait]
pub trait GatewayAuthenticationProvider: Send + Sync {
    /// Identifier the provider is registered under.
    fn provider_type(&self) -> &str;

    /// Apply the gateway's provider configuration. Called once, before any
    /// request is authenticated.
    fn initialize(&mut self, configuration: &Map<String, Value>) -> AuthResult<()>;

    /// Authenticate a request.
    async fn authenticate(&self, context: &GatewayRequestContext) -> AuthenticationResult;
}
