//! Precondition checks on the token request and the ambient session.

use tracing::debug;

use super::error::GrantError;
use super::types::{AuthenticatedSession, GrantRequest, UserPrincipal};
use super::{GRANT_TYPE, GRANT_TYPE_SAML2_BEARER};

/// A request that passed validation, borrowing from its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedGrant<'a> {
    pub principal: &'a UserPrincipal,
    pub requesting_client_id: &'a str,
    pub receiving_client_id: &'a str,
}

/// Validates a SAML2 bearer token request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantRequestValidator;

impl GrantRequestValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate the request against the session.
    ///
    /// `Ok(None)` means the grant does not apply: the session is not
    /// authenticated or carries no authenticated user. That is not an error;
    /// only missing or contradictory request parameters are.
    pub fn validate<'a>(
        &self,
        session: &'a AuthenticatedSession,
        request: Option<&'a GrantRequest>,
    ) -> Result<Option<ValidatedGrant<'a>>, GrantError> {
        let request = request.ok_or(GrantError::MissingRequest)?;

        if !session.authenticated {
            debug!("Session not authenticated, saml2-bearer grant not applicable");
            return Ok(None);
        }

        let principal = match session.user_authentication.as_ref() {
            Some(p) if p.authenticated => p,
            Some(_) => {
                debug!("User authentication not authenticated, grant not applicable");
                return Ok(None);
            }
            None => {
                debug!("Session carries no user authentication, grant not applicable");
                return Ok(None);
            }
        };

        let grant_type = request
            .parameter(GRANT_TYPE)
            .ok_or_else(|| GrantError::InvalidGrant("Missing grant type".to_string()))?;

        if grant_type != GRANT_TYPE_SAML2_BEARER {
            return Err(GrantError::InvalidGrant(format!(
                "Unsupported grant type: {}",
                grant_type
            )));
        }

        let requesting_client_id = request.requesting_client_id().ok_or_else(|| {
            GrantError::InvalidGrant("Parameter requesting_client_id is required".to_string())
        })?;

        let receiving_client_id = match (request.resolved_client_id.as_deref(), request.client_id()) {
            (Some(resolved), Some(param)) if resolved != param => {
                return Err(GrantError::InvalidGrant(
                    "client_id does not match the authenticated client".to_string(),
                ));
            }
            (Some(resolved), _) => resolved,
            (None, Some(param)) => param,
            (None, None) => {
                return Err(GrantError::InvalidGrant(
                    "Parameter client_id is required".to_string(),
                ));
            }
        };

        Ok(Some(ValidatedGrant {
            principal,
            requesting_client_id,
            receiving_client_id,
        }))
    }
}
