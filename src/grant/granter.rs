//! SAML2 bearer grant entry point.
//!
//! Runs a request through validation, client resolution, provider trust,
//! scope reconciliation and issuance. Each stage may reject the grant.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::GrantError;
use super::issuer::TokenIssuer;
use super::provider::ProviderTrustFilter;
use super::scope::ScopeReconciler;
use super::types::{AuthenticatedSession, GrantRequest, IssuedToken};
use super::validator::GrantRequestValidator;
use super::GRANT_TYPE_SAML2_BEARER;
use crate::registry::{ClientRecord, ClientRegistry};

/// Progress of one grant evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantStage {
    Start,
    Validated,
    ProviderChecked,
    ScopeReconciled,
    Issued,
}

impl fmt::Display for GrantStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantStage::Start => write!(f, "start"),
            GrantStage::Validated => write!(f, "validated"),
            GrantStage::ProviderChecked => write!(f, "provider_checked"),
            GrantStage::ScopeReconciled => write!(f, "scope_reconciled"),
            GrantStage::Issued => write!(f, "issued"),
        }
    }
}

/// Successful result of [`Saml2BearerGranter::grant`].
#[derive(Debug, Clone, PartialEq)]
pub enum GrantOutcome {
    /// A token was minted.
    Issued(IssuedToken),
    /// The grant does not apply to this call; the dispatcher should move on.
    NotApplicable,
}

impl GrantOutcome {
    pub fn token(&self) -> Option<&IssuedToken> {
        match self {
            GrantOutcome::Issued(token) => Some(token),
            GrantOutcome::NotApplicable => None,
        }
    }
}

/// Issues tokens for the SAML2 bearer grant.
pub struct Saml2BearerGranter {
    registry: Arc<dyn ClientRegistry>,
    validator: GrantRequestValidator,
    provider_filter: ProviderTrustFilter,
    scope_reconciler: ScopeReconciler,
    issuer: TokenIssuer,
    zone_id: String,
    log_grants: bool,
}

impl Saml2BearerGranter {
    pub fn new(
        registry: Arc<dyn ClientRegistry>,
        validator: GrantRequestValidator,
        provider_filter: ProviderTrustFilter,
        scope_reconciler: ScopeReconciler,
        issuer: TokenIssuer,
        zone_id: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            validator,
            provider_filter,
            scope_reconciler,
            issuer,
            zone_id: zone_id.into(),
            log_grants: false,
        }
    }

    /// Log each issued grant at info level.
    pub fn with_grant_logging(mut self, enabled: bool) -> Self {
        self.log_grants = enabled;
        self
    }

    /// Evaluate a grant.
    ///
    /// Calls routed under another grant type, unauthenticated sessions and
    /// sessions without an authenticated user yield
    /// [`GrantOutcome::NotApplicable`]. Every other failure is a classified
    /// [`GrantError`]. Each successful call mints a new token.
    pub fn grant(
        &self,
        grant_type: &str,
        session: &AuthenticatedSession,
        request: Option<&GrantRequest>,
    ) -> Result<GrantOutcome, GrantError> {
        if grant_type != GRANT_TYPE_SAML2_BEARER {
            debug!(grant_type = %grant_type, "Not a saml2-bearer grant, skipping");
            return Ok(GrantOutcome::NotApplicable);
        }

        let mut stage = GrantStage::Start;
        self.evaluate(&mut stage, session, request).map_err(|e| {
            warn!(stage = %stage, error = %e, "saml2-bearer grant rejected");
            e
        })
    }

    fn evaluate(
        &self,
        stage: &mut GrantStage,
        session: &AuthenticatedSession,
        request: Option<&GrantRequest>,
    ) -> Result<GrantOutcome, GrantError> {
        let validated = match self.validator.validate(session, request)? {
            Some(v) => v,
            None => return Ok(GrantOutcome::NotApplicable),
        };
        // validate() only returns a grant when a request was supplied
        let request = request.ok_or(GrantError::MissingRequest)?;
        *stage = GrantStage::Validated;

        let receiving = self.resolve_client(validated.receiving_client_id)?;
        let requesting = self.resolve_client(validated.requesting_client_id)?;

        if !receiving.supports_grant_type(GRANT_TYPE_SAML2_BEARER) {
            return Err(GrantError::UnauthorizedClient(receiving.client_id));
        }

        self.provider_filter
            .check_provider_allowed(&receiving, validated.principal)?;
        *stage = GrantStage::ProviderChecked;

        let scope = self
            .scope_reconciler
            .reconcile(validated.principal, Some(&requesting), &receiving);
        *stage = GrantStage::ScopeReconciled;

        let token = self.issuer.issue(
            validated.principal,
            &receiving,
            &requesting.client_id,
            scope,
            request,
        )?;
        *stage = GrantStage::Issued;

        if self.log_grants {
            info!(
                client_id = %receiving.client_id,
                requesting_client_id = %requesting.client_id,
                user_id = %validated.principal.user_id,
                origin = %validated.principal.identity_provider_entity_id,
                jti = ?token.jti(),
                scope = ?token.scope,
                "saml2-bearer token issued"
            );
        }

        Ok(GrantOutcome::Issued(token))
    }

    fn resolve_client(&self, client_id: &str) -> Result<ClientRecord, GrantError> {
        self.registry.lookup(client_id, &self.zone_id).map_err(|e| {
            debug!(client_id = %client_id, error = %e, "Client resolution failed");
            GrantError::from(e)
        })
    }
}
