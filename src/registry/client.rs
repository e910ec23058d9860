//! Registered OAuth2 client records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::grant::{Scope, GRANT_TYPE_REFRESH_TOKEN};

/// A registered OAuth2 client, as read from the client registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientRecord {
    /// Client identifier.
    pub client_id: String,

    /// Grant types this client may use at the token endpoint.
    #[serde(default)]
    pub grant_types: BTreeSet<String>,

    /// Scopes the client is registered for.
    #[serde(default)]
    pub scope: BTreeSet<Scope>,

    /// Identity-provider origins this client accepts assertions from.
    /// `None` means unrestricted.
    #[serde(default)]
    pub allowed_providers: Option<Vec<String>>,

    /// Access token validity override in seconds.
    #[serde(default)]
    pub access_token_validity_secs: Option<u64>,

    /// Refresh token validity override in seconds.
    #[serde(default)]
    pub refresh_token_validity_secs: Option<u64>,
}

impl ClientRecord {
    /// Create a client record with the given grant types and scopes.
    pub fn new<G, S>(client_id: impl Into<String>, grant_types: G, scope: S) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<Scope>,
    {
        Self {
            client_id: client_id.into(),
            grant_types: grant_types.into_iter().map(Into::into).collect(),
            scope: scope.into_iter().map(Into::into).collect(),
            allowed_providers: None,
            access_token_validity_secs: None,
            refresh_token_validity_secs: None,
        }
    }

    /// Restrict the identity providers this client accepts.
    pub fn with_allowed_providers<P>(mut self, providers: P) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        self.allowed_providers = Some(providers.into_iter().map(Into::into).collect());
        self
    }

    /// Check whether the client may use a grant type.
    pub fn supports_grant_type(&self, grant_type: &str) -> bool {
        self.grant_types.contains(grant_type)
    }

    /// Refresh tokens are only minted for clients holding the refresh grant.
    pub fn wants_refresh_token(&self) -> bool {
        self.supports_grant_type(GRANT_TYPE_REFRESH_TOKEN)
    }
}
