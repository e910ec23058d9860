//! Token minting.
//!
//! The grant decides *what* a token may say; a [`TokenMinter`] decides how
//! it is encoded and signed. [`JwtTokenMinter`] is the default.

pub mod config;
pub mod jwt;

use std::collections::BTreeSet;
use thiserror::Error;

use crate::grant::{IssuedToken, Scope};

pub use config::TokenConfig;
pub use jwt::JwtTokenMinter;

/// Everything a minter needs to build a token for one grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationContext {
    /// Unique token identifier to embed as `jti`.
    pub token_id: String,
    /// Client the token is issued to.
    pub client_id: String,
    /// Client that brokered the federated login.
    pub requesting_client_id: String,
    /// Token subject.
    pub user_id: String,
    pub user_name: Option<String>,
    /// Entity id of the IdP the user came from.
    pub origin: String,
    /// Identity zone of both clients.
    pub zone_id: String,
    pub grant_type: String,
    /// Reconciled scope set.
    pub scope: BTreeSet<Scope>,
    /// Per-client access token validity override.
    pub access_token_validity_secs: Option<u64>,
    /// Per-client refresh token validity override.
    pub refresh_token_validity_secs: Option<u64>,
    /// Mint a refresh token alongside the access token.
    pub issue_refresh_token: bool,
}

/// Minting failures.
#[derive(Debug, Error)]
pub enum MintError {
    /// The minter does not know the client it was asked to mint for.
    #[error("unknown client: {0}")]
    UnknownClient(String),

    /// Policy refused the context.
    #[error("token refused: {0}")]
    Rejected(String),

    /// Encoding or signing failed.
    #[error("failed to encode token: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// Builds tokens from an authentication context.
pub trait TokenMinter: Send + Sync {
    fn mint(&self, context: &AuthenticationContext) -> Result<IssuedToken, MintError>;
}
