//! Client registry lookup.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

use super::client::ClientRecord;

/// Errors reported by a client registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No client with this id exists in the zone.
    #[error("client {client_id} not found in zone {zone_id}")]
    NotFound { client_id: String, zone_id: String },

    /// The registry could not be read.
    #[error("client registry unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of registered clients.
///
/// Shared across concurrent grant evaluations, hence `Send + Sync`.
pub trait ClientRegistry: Send + Sync {
    /// Resolve a client id within an identity zone.
    fn lookup(&self, client_id: &str, zone_id: &str) -> Result<ClientRecord, RegistryError>;
}

/// Registry held in memory, keyed by zone and client id.
#[derive(Default)]
pub struct InMemoryClientRegistry {
    clients: RwLock<HashMap<(String, String), ClientRecord>>,
}

impl InMemoryClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the given clients in one zone.
    pub fn with_clients(zone_id: &str, clients: impl IntoIterator<Item = ClientRecord>) -> Self {
        let map = clients
            .into_iter()
            .map(|c| ((zone_id.to_string(), c.client_id.clone()), c))
            .collect();

        Self {
            clients: RwLock::new(map),
        }
    }

    /// Register or replace a client.
    pub fn upsert(&self, zone_id: &str, client: ClientRecord) -> Result<(), RegistryError> {
        let mut clients = self
            .clients
            .write()
            .map_err(|_| RegistryError::Unavailable("registry lock poisoned".to_string()))?;
        clients.insert((zone_id.to_string(), client.client_id.clone()), client);
        Ok(())
    }

    /// Number of registered clients across all zones.
    pub fn len(&self) -> usize {
        self.clients.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClientRegistry for InMemoryClientRegistry {
    fn lookup(&self, client_id: &str, zone_id: &str) -> Result<ClientRecord, RegistryError> {
        let clients = self
            .clients
            .read()
            .map_err(|_| RegistryError::Unavailable("registry lock poisoned".to_string()))?;

        match clients.get(&(zone_id.to_string(), client_id.to_string())) {
            Some(client) => Ok(client.clone()),
            None => {
                debug!(client_id = %client_id, zone_id = %zone_id, "Client lookup missed");
                Err(RegistryError::NotFound {
                    client_id: client_id.to_string(),
                    zone_id: zone_id.to_string(),
                })
            }
        }
    }
}
