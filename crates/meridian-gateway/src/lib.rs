//! Meridian gateway authentication
//!
//! Gateways in front of a deployed application authenticate callers through
//! a [`GatewayAuthenticationProvider`]. Providers are looked up by type in an
//! [`AuthenticationProviderRegistry`], initialised from the gateway's
//! configuration, and asked to turn request credentials into principal
//! values (claims) or a rejection reason.
//!
//! Built-in providers:
//!
//! - `jwt`: validates HMAC-signed bearer tokens.
//! - `test-auth` ([`testing::TestAuthenticationProvider`]): accepts any
//!   credential with a fixed prefix. Not registered by default.

#![forbid(unsafe_code)]

pub mod error;
pub mod jwt;
pub mod provider;
pub mod registry;
pub mod testing;

pub use error::{AuthError, AuthResult};
pub use jwt::JwtAuthenticationProvider;
pub use provider::{AuthenticationResult, GatewayAuthenticationProvider, GatewayRequestContext};
pub use registry::AuthenticationProviderRegistry;
