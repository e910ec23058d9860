//! Token minting configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const VALID_ALGORITHMS: [&str; 8] = [
    "RS256", "RS384", "RS512", "ES256", "ES384", "HS256", "HS384", "HS512",
];

/// Signing and lifetime settings for minted tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// Path to signing key (PEM format).
    #[serde(default)]
    pub signing_key_path: Option<PathBuf>,

    /// Inline signing key (base64 or raw for symmetric, PEM for asymmetric).
    #[serde(default)]
    pub signing_key_inline: Option<String>,

    /// Signing algorithm (RS256, ES256, HS256, ...).
    #[serde(default = "default_algorithm")]
    pub signing_algorithm: String,

    /// Issuer claim for minted tokens.
    #[serde(default)]
    pub issuer: Option<String>,

    /// Access token validity when the client sets none.
    #[serde(default = "default_access_validity")]
    pub access_token_validity_secs: u64,

    /// Refresh token validity when the client sets none.
    #[serde(default = "default_refresh_validity")]
    pub refresh_token_validity_secs: u64,

    /// Mint tokens whose reconciled scope set is empty.
    #[serde(default = "default_true")]
    pub allow_empty_scope: bool,
}

fn default_algorithm() -> String {
    "RS256".to_string()
}

fn default_access_validity() -> u64 {
    12 * 60 * 60 // 12 hours
}

fn default_refresh_validity() -> u64 {
    30 * 24 * 60 * 60 // 30 days
}

fn default_true() -> bool {
    true
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            signing_key_path: None,
            signing_key_inline: None,
            signing_algorithm: default_algorithm(),
            issuer: None,
            access_token_validity_secs: default_access_validity(),
            refresh_token_validity_secs: default_refresh_validity(),
            allow_empty_scope: true,
        }
    }
}

impl TokenConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.signing_key_path.is_none() && self.signing_key_inline.is_none() {
            return Err("Token minting requires signing_key_path or signing_key_inline".to_string());
        }

        if let Some(ref path) = self.signing_key_path {
            if !path.exists() {
                return Err(format!("Signing key file does not exist: {:?}", path));
            }
        }

        if !VALID_ALGORITHMS.contains(&self.signing_algorithm.as_str()) {
            return Err(format!(
                "Invalid signing algorithm: {}. Valid: {:?}",
                self.signing_algorithm, VALID_ALGORITHMS
            ));
        }

        if self.issuer.as_deref().map_or(true, str::is_empty) {
            return Err("Token minting requires issuer to be configured".to_string());
        }

        if self.access_token_validity_secs == 0 {
            return Err("access_token_validity_secs must be positive".to_string());
        }

        Ok(())
    }
}
