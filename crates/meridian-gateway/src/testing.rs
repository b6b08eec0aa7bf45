//! Reference provider for tests and local gateways.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::AuthResult;
use crate::provider::{
    AuthenticationResult, GatewayAuthenticationProvider, GatewayRequestContext, USER_ID_CLAIM,
};

/// Provider type of [`TestAuthenticationProvider`].
pub const TEST_AUTH_TYPE: &str = "test-auth";

/// Credential prefix accepted by [`TestAuthenticationProvider`].
pub const ACCEPTED_PREFIX: &str = "test-user-password";

/// Accepts any credential starting with `test-user-password` and reports it
/// as the `user-id` claim. Everything else is rejected with
/// `Invalid credentials`.
#[derive(Debug, Clone, Default)]
pub struct TestAuthenticationProvider;

#[async_trait]
impl GatewayAuthenticationProvider for TestAuthenticationProvider {
    fn provider_type(&self) -> &str {
        TEST_AUTH_TYPE
    }

    fn initialize(&mut self, _configuration: &Map<String, Value>) -> AuthResult<()> {
        Ok(())
    }

    async fn authenticate(&self, context: &GatewayRequestContext) -> AuthenticationResult {
        if context.credentials.starts_with(ACCEPTED_PREFIX) {
            AuthenticationResult::authenticated([(USER_ID_CLAIM, context.credentials.as_str())])
        } else {
            tracing::debug!(gateway_id = %context.gateway_id, "rejected test credentials");
            AuthenticationResult::rejected("Invalid credentials")
        }
    }
}
