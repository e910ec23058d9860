//! Grant failures and their OAuth2 error responses.

use serde::Serialize;
use thiserror::Error;

use crate::registry::RegistryError;

/// Classified failure of a SAML2 bearer grant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrantError {
    /// No token request was supplied at all.
    #[error("token request is missing")]
    MissingRequest,

    /// The request body could not be read.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request is present but incomplete or unacceptable.
    #[error("invalid grant: {0}")]
    InvalidGrant(String),

    /// The principal's IdP is not on the receiving client's allow-list.
    #[error("identity provider {provider} is not trusted by client {client_id}")]
    ProviderNotTrusted { provider: String, client_id: String },

    /// The receiving client is not registered for this grant type.
    #[error("client {0} is not authorized for this grant type")]
    UnauthorizedClient(String),

    /// A collaborator failed in a way the caller cannot fix.
    #[error("server error: {0}")]
    ServerError(String),
}

impl GrantError {
    /// OAuth2 `error` code for this failure.
    pub fn error_code(&self) -> &'static str {
        match self {
            GrantError::MissingRequest | GrantError::InvalidRequest(_) => "invalid_request",
            GrantError::InvalidGrant(_) | GrantError::ProviderNotTrusted { .. } => "invalid_grant",
            GrantError::UnauthorizedClient(_) => "unauthorized_client",
            GrantError::ServerError(_) => "server_error",
        }
    }

    /// Render as an OAuth2 error response body.
    ///
    /// Server errors are reduced to a generic description.
    pub fn to_response(&self) -> GrantErrorResponse {
        let description = match self {
            GrantError::MissingRequest => "Missing token request".to_string(),
            GrantError::InvalidRequest(desc) | GrantError::InvalidGrant(desc) => desc.clone(),
            GrantError::ProviderNotTrusted { .. } => {
                "The identity provider is not allowed for this client".to_string()
            }
            GrantError::UnauthorizedClient(_) => {
                "Client is not authorized for the saml2-bearer grant".to_string()
            }
            GrantError::ServerError(_) => "Internal error".to_string(),
        };

        GrantErrorResponse {
            error: self.error_code().to_string(),
            error_description: Some(description),
        }
    }
}

impl From<RegistryError> for GrantError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { .. } => {
                GrantError::InvalidGrant("Unknown client".to_string())
            }
            RegistryError::Unavailable(reason) => GrantError::ServerError(reason),
        }
    }
}

/// OAuth2 error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}
