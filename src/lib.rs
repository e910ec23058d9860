//! SAML2 bearer grant for the Zentinel auth agent.
//!
//! Issues an OAuth2 access token to a *receiving* client for a user who
//! already signed in through an external SAML2 identity provider via a
//! different, *requesting* client. The user is not asked to authenticate
//! again; the new token's scope is bounded by the user's authorities and by
//! both clients' registrations.
//!
//! SAML assertion validation, client persistence and token storage are left
//! to collaborators: the session arrives as an [`AuthenticatedSession`], clients
//! come from a [`ClientRegistry`], and tokens are built by a [`TokenMinter`].

pub mod config;
pub mod grant;
pub mod mint;
pub mod registry;

pub use config::GranterConfig;
pub use grant::{
    AuthenticatedSession, GrantError, GrantOutcome, GrantRequest, IssuedToken,
    Saml2BearerGranter, UserPrincipal, GRANT_TYPE_SAML2_BEARER,
};
pub use mint::{AuthenticationContext, JwtTokenMinter, MintError, TokenMinter};
pub use registry::{ClientRecord, ClientRegistry, InMemoryClientRegistry};
