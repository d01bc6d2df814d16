//! Connected-integration records.
//!
//! Tracks which user has completed the OAuth flow for which service, holding
//! the granted tokens in memory. Modeled on a credential store API but
//! deliberately unpersisted: a restart disconnects everything.

use crate::integrations::Service;
use crate::oauth::TokenGrant;
use dashmap::DashMap;

pub struct ConnectionStore {
    connections: DashMap<(String, Service), TokenGrant>,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Record a completed authorization, replacing any prior grant.
    pub fn record(&self, user_id: &str, service: Service, grant: &TokenGrant) {
        self.connections
            .insert((user_id.to_string(), service), grant.clone());
    }

    pub fn is_connected(&self, user_id: &str, service: Service) -> bool {
        self.connections
            .contains_key(&(user_id.to_string(), service))
    }

    pub fn get(&self, user_id: &str, service: Service) -> Option<TokenGrant> {
        self.connections
            .get(&(user_id.to_string(), service))
            .map(|entry| entry.value().clone())
    }

    /// Services the user has connected, in registry order.
    pub fn list(&self, user_id: &str) -> Vec<Service> {
        Service::ALL
            .iter()
            .copied()
            .filter(|service| self.is_connected(user_id, *service))
            .collect()
    }

    /// Remove a connection. Returns true if one existed.
    pub fn disconnect(&self, user_id: &str, service: Service) -> bool {
        self.connections
            .remove(&(user_id.to_string(), service))
            .is_some()
    }
}

impl Default for ConnectionStore {
    fn default() -> Self {
        Self::new()
    }
}
