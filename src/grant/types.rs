//! Inputs and outputs of a SAML2 bearer grant evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::error::GrantError;
use super::{CLIENT_ID, GRANT_TYPE, REQUESTING_CLIENT_ID};

/// A named permission string.
pub type Scope = String;

/// Claim key of the unique token identifier.
pub const JTI: &str = "jti";

/// Federated user identity produced by the SAML validation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPrincipal {
    /// Stable user identifier, used as token subject.
    pub user_id: String,

    /// Display user name.
    #[serde(default)]
    pub user_name: Option<String>,

    /// Authorities (scopes) the user holds.
    #[serde(default)]
    pub authorities: BTreeSet<Scope>,

    /// Whether the assertion behind this principal was accepted.
    #[serde(default)]
    pub authenticated: bool,

    /// Entity id of the IdP that issued the assertion.
    pub identity_provider_entity_id: String,
}

/// The ambient security context, passed explicitly into the granter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedSession {
    #[serde(default)]
    pub authenticated: bool,

    #[serde(default)]
    pub user_authentication: Option<UserPrincipal>,
}

impl AuthenticatedSession {
    /// Session carrying an authenticated user.
    pub fn authenticated(principal: UserPrincipal) -> Self {
        Self {
            authenticated: true,
            user_authentication: Some(principal),
        }
    }
}

/// Incoming token request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantRequest {
    /// Grant type the request was routed under.
    pub grant_type: String,

    /// Raw request parameters.
    pub parameters: HashMap<String, String>,

    /// Client id established by client authentication, if any.
    pub resolved_client_id: Option<String>,
}

impl GrantRequest {
    /// Build a request from its parameters; the grant type is taken from them.
    pub fn new(parameters: HashMap<String, String>) -> Self {
        Self {
            grant_type: parameters.get(GRANT_TYPE).cloned().unwrap_or_default(),
            parameters,
            resolved_client_id: None,
        }
    }

    /// Parse a form-urlencoded token request body.
    pub fn from_form(body: &str) -> Result<Self, GrantError> {
        let parameters: HashMap<String, String> = serde_urlencoded::from_str(body)
            .map_err(|e| GrantError::InvalidRequest(format!("Invalid request body: {}", e)))?;
        Ok(Self::new(parameters))
    }

    /// Record the client id established by client authentication.
    pub fn with_resolved_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.resolved_client_id = Some(client_id.into());
        self
    }

    /// Non-blank parameter value.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn requesting_client_id(&self) -> Option<&str> {
        self.parameter(REQUESTING_CLIENT_ID)
    }

    pub fn client_id(&self) -> Option<&str> {
        self.parameter(CLIENT_ID)
    }
}

/// A minted token as returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedToken {
    /// Opaque token value.
    pub value: String,

    /// Token type (always "bearer").
    pub token_type: String,

    /// Expiry instant.
    pub expiration: DateTime<Utc>,

    /// Refresh token, when the receiving client may refresh.
    pub refresh_token: Option<String>,

    /// Scopes granted by the token.
    pub scope: BTreeSet<Scope>,

    /// Extra response fields; always holds [`JTI`] once issued.
    pub additional_information: serde_json::Map<String, serde_json::Value>,
}

impl IssuedToken {
    /// The `jti` claim, if present and non-empty.
    pub fn jti(&self) -> Option<&str> {
        self.additional_information
            .get(JTI)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Seconds until expiry, zero once expired.
    pub fn expires_in(&self) -> u64 {
        let remaining = (self.expiration - Utc::now()).num_seconds();
        u64::try_from(remaining).unwrap_or(0)
    }

    /// Render as an OAuth2 token endpoint response.
    pub fn to_response(&self) -> TokenResponse {
        let scope = if self.scope.is_empty() {
            None
        } else {
            Some(self.scope.iter().cloned().collect::<Vec<_>>().join(" "))
        };

        TokenResponse {
            access_token: self.value.clone(),
            token_type: self.token_type.clone(),
            expires_in: self.expires_in(),
            scope,
            refresh_token: self.refresh_token.clone(),
            additional_information: self.additional_information.clone(),
        }
    }
}

/// OAuth2 token endpoint response (JSON).
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub additional_information: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::GRANT_TYPE_SAML2_BEARER;

    #[test]
    fn test_grant_request_from_form() {
        let body = "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Asaml2-bearer\
                    &client_id=receivingId\
                    &requesting_client_id=requestingId";

        let request = GrantRequest::from_form(body).unwrap();
        assert_eq!(request.grant_type, GRANT_TYPE_SAML2_BEARER);
        assert_eq!(request.client_id(), Some("receivingId"));
        assert_eq!(request.requesting_client_id(), Some("requestingId"));
        assert!(request.resolved_client_id.is_none());
    }

    #[test]
    fn test_blank_parameter_is_absent() {
        let request = GrantRequest::from_form("requesting_client_id=%20%20&client_id=").unwrap();
        assert_eq!(request.requesting_client_id(), None);
        assert_eq!(request.client_id(), None);
        assert_eq!(request.grant_type, "");
    }

    #[test]
    fn test_session_deserialize() {
        let session: AuthenticatedSession = serde_json::from_str(
            r#"{
                "authenticated": true,
                "user_authentication": {
                    "user_id": "u-1",
                    "authorities": ["openid", "uaa.user"],
                    "authenticated": true,
                    "identity_provider_entity_id": "idp-entity-id"
                }
            }"#,
        )
        .unwrap();

        let principal = session.user_authentication.unwrap();
        assert!(principal.authenticated);
        assert!(principal.authorities.contains("uaa.user"));
        assert_eq!(principal.user_name, None);
    }

    #[test]
    fn test_token_response_rendering() {
        let mut info = serde_json::Map::new();
        info.insert(JTI.to_string(), serde_json::json!("abc123"));

        let token = IssuedToken {
            value: "access_token".to_string(),
            token_type: "bearer".to_string(),
            expiration: Utc::now() + chrono::Duration::seconds(600),
            refresh_token: Some("refresh_token".to_string()),
            scope: ["openid".to_string(), "foo.bar".to_string()].into(),
            additional_information: info,
        };

        assert_eq!(token.jti(), Some("abc123"));
        let json = serde_json::to_value(token.to_response()).unwrap();
        assert_eq!(json["access_token"], "access_token");
        assert_eq!(json["scope"], "foo.bar openid");
        assert_eq!(json["jti"], "abc123");
        assert_eq!(json["refresh_token"], "refresh_token");
        assert!(json["expires_in"].as_u64().unwrap() <= 600);
    }

    #[test]
    fn test_expired_token_expires_in_zero() {
        let token = IssuedToken {
            value: "v".to_string(),
            token_type: "bearer".to_string(),
            expiration: Utc::now() - chrono::Duration::seconds(5),
            refresh_token: None,
            scope: BTreeSet::new(),
            additional_information: serde_json::Map::new(),
        };
        assert_eq!(token.expires_in(), 0);
        assert_eq!(token.jti(), None);
        assert!(token.to_response().scope.is_none());
    }
}
