//! Scope reconciliation across the user and both clients.

use std::collections::BTreeSet;
use tracing::debug;

use super::types::{Scope, UserPrincipal};
use crate::registry::ClientRecord;

/// Computes the scopes a token may carry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeReconciler;

impl ScopeReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Intersect the user's authorities with the receiving client's scopes,
    /// and with the requesting client's scopes when that client is known.
    ///
    /// The result never exceeds what any of the three parties allows. An
    /// empty set is a valid result.
    pub fn reconcile(
        &self,
        principal: &UserPrincipal,
        requesting_client: Option<&ClientRecord>,
        receiving_client: &ClientRecord,
    ) -> BTreeSet<Scope> {
        let scope: BTreeSet<Scope> = principal
            .authorities
            .iter()
            .filter(|s| receiving_client.scope.contains(*s))
            .filter(|s| requesting_client.map_or(true, |c| c.scope.contains(*s)))
            .cloned()
            .collect();

        debug!(
            receiving_client = %receiving_client.client_id,
            requesting_client = ?requesting_client.map(|c| c.client_id.as_str()),
            scope = ?scope,
            "Reconciled scope"
        );

        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::GRANT_TYPE_SAML2_BEARER;

    fn principal(authorities: &[&str]) -> UserPrincipal {
        UserPrincipal {
            user_id: "user-1".to_string(),
            user_name: None,
            authorities: authorities.iter().map(|s| s.to_string()).collect(),
            authenticated: true,
            identity_provider_entity_id: "idp-entity-id".to_string(),
        }
    }

    fn client(id: &str, scope: &[&str]) -> ClientRecord {
        ClientRecord::new(id, [GRANT_TYPE_SAML2_BEARER], scope.iter().copied())
    }

    fn set(items: &[&str]) -> BTreeSet<Scope> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_disjoint_scopes_yield_empty_set() {
        let user = principal(&["openid", "foo.bar", "uaa.user", "one.read"]);
        let requesting = client("requestingId", &["openid", "foo.bar"]);
        let receiving = client("receivingId", &["test.scope"]);

        let scope = ScopeReconciler::new().reconcile(&user, Some(&requesting), &receiving);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_three_way_intersection() {
        let user = principal(&["openid", "foo.bar", "uaa.user", "one.read"]);
        let requesting = client("requestingId", &["openid", "foo.bar", "two.write"]);
        let receiving = client("receivingId", &["openid", "foo.bar", "one.read"]);

        let scope = ScopeReconciler::new().reconcile(&user, Some(&requesting), &receiving);
        assert_eq!(scope, set(&["foo.bar", "openid"]));
    }

    #[test]
    fn test_without_requesting_client() {
        let user = principal(&["openid", "one.read"]);
        let receiving = client("receivingId", &["one.read", "two.write"]);

        let scope = ScopeReconciler::new().reconcile(&user, None, &receiving);
        assert_eq!(scope, set(&["one.read"]));
    }

    #[test]
    fn test_requesting_client_with_no_scopes_grants_nothing() {
        let user = principal(&["openid"]);
        let requesting = client("requestingId", &[]);
        let receiving = client("receivingId", &["openid"]);

        let scope = ScopeReconciler::new().reconcile(&user, Some(&requesting), &receiving);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_result_is_subset_of_every_party() {
        let users = [
            principal(&[]),
            principal(&["a", "b", "c"]),
            principal(&["a", "d"]),
        ];
        let clients = [
            client("x", &[]),
            client("y", &["a", "b"]),
            client("z", &["b", "c", "d"]),
        ];

        for user in &users {
            for requesting in &clients {
                for receiving in &clients {
                    let scope =
                        ScopeReconciler::new().reconcile(user, Some(requesting), receiving);
                    assert!(scope.is_subset(&user.authorities));
                    assert!(scope.is_subset(&receiving.scope));
                    assert!(scope.is_subset(&requesting.scope));
                }
            }
        }
    }
}
