use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// The clients currently connected to the server, by connection id.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    clients: Arc<Mutex<HashMap<Uuid, SocketAddr>>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SocketAddr>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a client unless `max_clients` are already connected, `0` meaning no limit. The client
    /// stays registered until the returned guard is dropped.
    pub fn register(
        &self,
        id: Uuid,
        address: SocketAddr,
        max_clients: usize,
    ) -> Option<Registration> {
        let mut clients = self.lock();
        if max_clients > 0 && clients.len() >= max_clients {
            return None;
        }

        clients.insert(id, address);
        debug!(clients = clients.len(), "Client registered");

        Some(Registration {
            id,
            registry: self.clone(),
        })
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn address(&self, id: &Uuid) -> Option<SocketAddr> {
        self.lock().get(id).copied()
    }

    fn remove(&self, id: &Uuid) {
        let mut clients = self.lock();
        clients.remove(id);
        debug!(clients = clients.len(), "Client unregistered");
    }
}

/// Keeps a client in the registry for as long as it lives.
#[derive(Debug)]
pub struct Registration {
    id: Uuid,
    registry: Registry,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
