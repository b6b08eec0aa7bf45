//! JWT bearer token authentication.

use std::collections::BTreeMap;

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AuthError, AuthResult};
use crate::provider::{
    AuthenticationResult, GatewayAuthenticationProvider, GatewayRequestContext, USER_ID_CLAIM,
};

/// Provider type of [`JwtAuthenticationProvider`].
pub const JWT_TYPE: &str = "jwt";

/// HMAC algorithm used to sign tokens.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(algorithm: JwtAlgorithm) -> Self {
        match algorithm {
            JwtAlgorithm::HS256 => Self::HS256,
            JwtAlgorithm::HS384 => Self::HS384,
            JwtAlgorithm::HS512 => Self::HS512,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct JwtConfig {
    secret_key: String,
    #[serde(default)]
    algorithm: JwtAlgorithm,
    #[serde(default)]
    issuer: Option<String>,
    #[serde(default)]
    audience: Option<String>,
}

struct Settings {
    secret: SecretString,
    validation: Validation,
}

/// Validates HMAC-signed bearer tokens.
///
/// Configuration: `secret-key`, optional `algorithm` (`HS256` by default),
/// `issuer` and `audience`. Scalar claims become principal values and the
/// `sub` claim is also reported as `user-id`.
#[derive(Default)]
pub struct JwtAuthenticationProvider {
    settings: Option<Settings>,
}

impl std::fmt::Debug for JwtAuthenticationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthenticationProvider")
            .field("initialized", &self.settings.is_some())
            .finish_non_exhaustive()
    }
}

impl JwtAuthenticationProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn claim_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[async_trait]
impl GatewayAuthenticationProvider for JwtAuthenticationProvider {
    fn provider_type(&self) -> &str {
        JWT_TYPE
    }

    fn initialize(&mut self, configuration: &Map<String, Value>) -> AuthResult<()> {
        let config: JwtConfig = serde_json::from_value(Value::Object(configuration.clone()))
            .map_err(|e| AuthError::invalid_configuration(JWT_TYPE, e.to_string()))?;
        if config.secret_key.is_empty() {
            return Err(AuthError::invalid_configuration(
                JWT_TYPE,
                "secret-key must not be empty",
            ));
        }

        let mut validation = Validation::new(config.algorithm.into());
        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
        }
        if let Some(ref audience) = config.audience {
            validation.set_audience(&[audience]);
        } else {
            validation.validate_aud = false;
        }

        self.settings = Some(Settings {
            secret: SecretString::from(config.secret_key),
            validation,
        });
        Ok(())
    }

    async fn authenticate(&self, context: &GatewayRequestContext) -> AuthenticationResult {
        let Some(settings) = &self.settings else {
            return AuthenticationResult::rejected("provider not initialized");
        };

        let token = context
            .credentials
            .strip_prefix("Bearer ")
            .unwrap_or(&context.credentials);
        let key = DecodingKey::from_secret(settings.secret.expose_secret().as_bytes());

        let claims = match decode::<Map<String, Value>>(token, &key, &settings.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "JWT validation failed");
                return AuthenticationResult::rejected("Invalid token");
            }
        };

        let Some(subject) = claims.get("sub").and_then(Value::as_str) else {
            return AuthenticationResult::rejected("Missing subject claim");
        };
        tracing::debug!(subject = %subject, "JWT validated successfully");

        let mut principal_values: BTreeMap<String, String> = claims
            .iter()
            .filter_map(|(k, v)| claim_to_string(v).map(|v| (k.clone(), v)))
            .collect();
        principal_values.insert(USER_ID_CLAIM.to_owned(), subject.to_owned());
        AuthenticationResult::Authenticated { principal_values }
    }
}
