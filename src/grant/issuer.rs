//! Token issuance for a reconciled grant.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::GrantError;
use super::types::{GrantRequest, IssuedToken, Scope, UserPrincipal, JTI};
use super::GRANT_TYPE_SAML2_BEARER;
use crate::mint::{AuthenticationContext, TokenMinter};
use crate::registry::ClientRecord;

/// Source of unique token identifiers.
pub trait TokenIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUIDv4 identifiers without hyphens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenIdGenerator;

impl TokenIdGenerator for UuidTokenIdGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Builds the authentication context and hands it to the minter.
pub struct TokenIssuer {
    minter: Arc<dyn TokenMinter>,
    id_generator: Arc<dyn TokenIdGenerator>,
    zone_id: String,
}

impl TokenIssuer {
    pub fn new(
        minter: Arc<dyn TokenMinter>,
        id_generator: Arc<dyn TokenIdGenerator>,
        zone_id: impl Into<String>,
    ) -> Self {
        Self {
            minter,
            id_generator,
            zone_id: zone_id.into(),
        }
    }

    /// Mint a token for the receiving client carrying the reconciled scope.
    ///
    /// The returned token always carries a non-empty `jti`.
    pub fn issue(
        &self,
        principal: &UserPrincipal,
        receiving_client: &ClientRecord,
        requesting_client_id: &str,
        scope: BTreeSet<Scope>,
        request: &GrantRequest,
    ) -> Result<IssuedToken, GrantError> {
        let grant_type = if request.grant_type.is_empty() {
            GRANT_TYPE_SAML2_BEARER.to_string()
        } else {
            request.grant_type.clone()
        };

        let context = AuthenticationContext {
            token_id: self.id_generator.next_id(),
            client_id: receiving_client.client_id.clone(),
            requesting_client_id: requesting_client_id.to_string(),
            user_id: principal.user_id.clone(),
            user_name: principal.user_name.clone(),
            origin: principal.identity_provider_entity_id.clone(),
            zone_id: self.zone_id.clone(),
            grant_type,
            scope,
            access_token_validity_secs: receiving_client.access_token_validity_secs,
            refresh_token_validity_secs: receiving_client.refresh_token_validity_secs,
            issue_refresh_token: receiving_client.wants_refresh_token(),
        };

        let mut token = self.minter.mint(&context).map_err(|e| {
            warn!(
                error = %e,
                client_id = %context.client_id,
                "Token minting rejected the grant"
            );
            GrantError::InvalidGrant(format!("Token could not be issued: {}", e))
        })?;

        if token.jti().is_none() {
            debug!(jti = %context.token_id, "Minter set no jti, injecting token id");
            token.additional_information.insert(
                JTI.to_string(),
                serde_json::Value::String(context.token_id),
            );
        }

        Ok(token)
    }
}
