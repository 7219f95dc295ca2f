//! Registry of client contexts and which cache version controls them.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct ClientRegistry {
    // client id -> controlling version, if any
    clients: Mutex<HashMap<String, Option<String>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Option<String>>> {
        self.clients.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register an open client, optionally already controlled by `version`.
    /// A client that is already registered keeps its controller.
    pub fn register(&self, id: impl Into<String>, controller: Option<String>) {
        self.lock().entry(id.into()).or_insert(controller);
    }

    pub fn unregister(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn controller(&self, id: &str) -> Option<String> {
        self.lock().get(id).cloned().flatten()
    }

    /// Clients still held by a version other than `version`.
    pub fn held_by_others(&self, version: &str) -> usize {
        self.lock()
            .values()
            .filter(|c| c.as_deref().is_some_and(|v| v != version))
            .count()
    }

    /// Take control of every open client without a reload.
    ///
    /// Returns how many clients changed controller.
    pub fn claim(&self, version: &str) -> usize {
        let mut claimed = 0;
        for controller in self.lock().values_mut() {
            if controller.as_deref() != Some(version) {
                *controller = Some(version.to_string());
                claimed += 1;
            }
        }
        claimed
    }
}
