//! SAML2 bearer assertion grant.
//!
//! Exchanges a federated login, brokered by a *requesting* client, for an
//! access token scoped to a *receiving* client:
//! - validate the request and ambient session
//! - resolve both clients
//! - check the receiving client trusts the user's IdP
//! - intersect user authorities with both clients' scopes
//! - mint the token with a unique `jti`

pub mod error;
pub mod granter;
pub mod issuer;
pub mod provider;
pub mod scope;
pub mod types;
pub mod validator;

/// SAML2 bearer assertion grant type.
pub const GRANT_TYPE_SAML2_BEARER: &str = "urn:ietf:params:oauth:grant-type:saml2-bearer";

/// Refresh token grant type.
pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";

/// Request parameter carrying the grant type.
pub const GRANT_TYPE: &str = "grant_type";

/// Request parameter naming the receiving client.
pub const CLIENT_ID: &str = "client_id";

/// Request parameter naming the client that brokered the login.
pub const REQUESTING_CLIENT_ID: &str = "requesting_client_id";

pub use error::{GrantError, GrantErrorResponse};
pub use granter::{GrantOutcome, GrantStage, Saml2BearerGranter};
pub use issuer::{TokenIdGenerator, TokenIssuer, UuidTokenIdGenerator};
pub use provider::{EmptyProviderListPolicy, ProviderTrustFilter};
pub use scope::ScopeReconciler;
pub use types::{
    AuthenticatedSession, GrantRequest, IssuedToken, Scope, TokenResponse, UserPrincipal, JTI,
};
pub use validator::{GrantRequestValidator, ValidatedGrant};
