//! Identity-provider allow-list enforcement.
//!
//! A receiving client can restrict which upstream IdPs it accepts, whatever
//! the requesting client trusts. This stops a requesting client from passing
//! assertions from an IdP the receiving client never agreed to.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::GrantError;
use super::types::UserPrincipal;
use crate::registry::ClientRecord;

/// How a present but empty `allowed_providers` list is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyProviderListPolicy {
    /// No provider is trusted.
    #[default]
    DenyAll,
    /// Same as an absent list.
    AllowAll,
}

/// Checks the principal's IdP against the receiving client's allow-list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderTrustFilter {
    empty_list_policy: EmptyProviderListPolicy,
}

impl ProviderTrustFilter {
    pub fn new(empty_list_policy: EmptyProviderListPolicy) -> Self {
        Self { empty_list_policy }
    }

    pub fn empty_list_policy(&self) -> EmptyProviderListPolicy {
        self.empty_list_policy
    }

    /// Accept or refuse the principal's identity provider for this client.
    pub fn check_provider_allowed(
        &self,
        receiving_client: &ClientRecord,
        principal: &UserPrincipal,
    ) -> Result<(), GrantError> {
        let origin = principal.identity_provider_entity_id.as_str();

        let allowed = match receiving_client.allowed_providers.as_deref() {
            None => true,
            Some([]) => self.empty_list_policy == EmptyProviderListPolicy::AllowAll,
            Some(providers) => providers.iter().any(|p| p == origin),
        };

        if allowed {
            debug!(client_id = %receiving_client.client_id, origin = %origin, "Identity provider accepted");
            return Ok(());
        }

        warn!(
            client_id = %receiving_client.client_id,
            origin = %origin,
            "Identity provider not allowed for client"
        );
        Err(GrantError::ProviderNotTrusted {
            provider: origin.to_string(),
            client_id: receiving_client.client_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::GRANT_TYPE_SAML2_BEARER;

    fn principal(origin: &str) -> UserPrincipal {
        UserPrincipal {
            user_id: "user-1".to_string(),
            user_name: None,
            authorities: Default::default(),
            authenticated: true,
            identity_provider_entity_id: origin.to_string(),
        }
    }

    fn client() -> ClientRecord {
        ClientRecord::new("receivingId", [GRANT_TYPE_SAML2_BEARER], ["test.scope"])
    }

    #[test]
    fn test_absent_list_is_unrestricted() {
        let filter = ProviderTrustFilter::default();
        for origin in ["idp-entity-id", "https://other.example.com", ""] {
            assert!(filter.check_provider_allowed(&client(), &principal(origin)).is_ok());
        }
    }

    #[test]
    fn test_listed_provider_accepted() {
        let client = client().with_allowed_providers(["idp-entity-id", "https://idp2.example.com"]);
        let filter = ProviderTrustFilter::default();
        assert!(filter
            .check_provider_allowed(&client, &principal("idp-entity-id"))
            .is_ok());
    }

    #[test]
    fn test_unlisted_provider_refused() {
        let client = client().with_allowed_providers(["https://idp2.example.com"]);
        let filter = ProviderTrustFilter::new(EmptyProviderListPolicy::AllowAll);

        let result = filter.check_provider_allowed(&client, &principal("idp-entity-id"));
        assert_eq!(
            result,
            Err(GrantError::ProviderNotTrusted {
                provider: "idp-entity-id".to_string(),
                client_id: "receivingId".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_list_denies_by_default() {
        let client = client().with_allowed_providers(Vec::<String>::new());
        let filter = ProviderTrustFilter::default();
        assert_eq!(filter.empty_list_policy(), EmptyProviderListPolicy::DenyAll);

        for origin in ["idp-entity-id", "https://other.example.com"] {
            let result = filter.check_provider_allowed(&client, &principal(origin));
            assert!(matches!(result, Err(GrantError::ProviderNotTrusted { .. })));
        }
    }

    #[test]
    fn test_empty_list_allow_all_policy() {
        let client = client().with_allowed_providers(Vec::<String>::new());
        let filter = ProviderTrustFilter::new(EmptyProviderListPolicy::AllowAll);

        for origin in ["idp-entity-id", "https://other.example.com"] {
            assert!(filter.check_provider_allowed(&client, &principal(origin)).is_ok());
        }
    }

    #[test]
    fn test_policy_deserialize() {
        let policy: EmptyProviderListPolicy = serde_json::from_str(r#""allow-all""#).unwrap();
        assert_eq!(policy, EmptyProviderListPolicy::AllowAll);
    }
}
