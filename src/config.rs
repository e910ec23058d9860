//! Granter configuration.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::grant::{
    EmptyProviderListPolicy, GrantRequestValidator, ProviderTrustFilter, Saml2BearerGranter,
    ScopeReconciler, TokenIssuer, UuidTokenIdGenerator,
};
use crate::mint::{JwtTokenMinter, TokenConfig};
use crate::registry::{ClientRecord, InMemoryClientRegistry};

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GranterConfig {
    /// Identity zone both clients are looked up in.
    #[serde(default = "default_zone_id")]
    pub zone_id: String,

    /// Registered clients.
    #[serde(default)]
    pub clients: Vec<ClientRecord>,

    /// Reading of a present but empty `allowed_providers` list.
    #[serde(default)]
    pub empty_allowed_providers: EmptyProviderListPolicy,

    /// Log every issued grant.
    #[serde(default)]
    pub log_grants: bool,

    /// Token minting settings.
    #[serde(default)]
    pub token: TokenConfig,
}

fn default_zone_id() -> String {
    "uaa".to_string()
}

impl Default for GranterConfig {
    fn default() -> Self {
        Self {
            zone_id: default_zone_id(),
            clients: Vec::new(),
            empty_allowed_providers: EmptyProviderListPolicy::default(),
            log_grants: false,
            token: TokenConfig::default(),
        }
    }
}

impl GranterConfig {
    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&data).with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.zone_id.trim().is_empty() {
            return Err("zone_id must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        for client in &self.clients {
            if client.client_id.trim().is_empty() {
                return Err("client_id must not be empty".to_string());
            }
            if !seen.insert(client.client_id.as_str()) {
                return Err(format!("Duplicate client_id: {}", client.client_id));
            }
            if let Some(ref providers) = client.allowed_providers {
                if providers.iter().any(|p| p.trim().is_empty()) {
                    return Err(format!(
                        "Client {} has an empty entry in allowed_providers",
                        client.client_id
                    ));
                }
            }
        }

        self.token.validate()
    }

    /// Wire the granter and its collaborators.
    pub fn build_granter(&self) -> Result<Saml2BearerGranter> {
        self.validate().map_err(|e| anyhow!(e))?;

        let registry = Arc::new(InMemoryClientRegistry::with_clients(
            &self.zone_id,
            self.clients.iter().cloned(),
        ));
        let minter = Arc::new(JwtTokenMinter::new(&self.token)?);
        let issuer = TokenIssuer::new(minter, Arc::new(UuidTokenIdGenerator), self.zone_id.clone());

        info!(
            zone_id = %self.zone_id,
            clients = registry.len(),
            empty_allowed_providers = ?self.empty_allowed_providers,
            "saml2-bearer granter configured"
        );

        Ok(Saml2BearerGranter::new(
            registry,
            GrantRequestValidator::new(),
            ProviderTrustFilter::new(self.empty_allowed_providers),
            ScopeReconciler::new(),
            issuer,
            self.zone_id.clone(),
        )
        .with_grant_logging(self.log_grants))
    }
}
