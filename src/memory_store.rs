use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::store::RoleStore;
use crate::types::{RoleId, RoleRecord};

/// In-memory role store implementation for tests and demos.
///
/// Mutations here model the external role-administration path; per the
/// invalidation contract, callers must clear the hierarchy cache after any
/// mutation for the next authorization check to observe it.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<RoleId, RoleRecord>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a role row.
    pub fn add_role(&self, record: RoleRecord) {
        let mut guard = self.inner.write().expect("poisoned lock");
        guard.insert(record.id.clone(), record);
    }

    /// Reassigns a role's parent link; `None` detaches it.
    pub fn set_parent(&self, role: &RoleId, parent: Option<RoleId>) {
        let mut guard = self.inner.write().expect("poisoned lock");
        if let Some(record) = guard.get_mut(role) {
            record.parent_id = parent;
        }
    }

    /// Deletes a role row, leaving children dangling.
    pub fn remove_role(&self, role: &RoleId) {
        let mut guard = self.inner.write().expect("poisoned lock");
        guard.remove(role);
    }

    /// Number of stored roles.
    pub fn len(&self) -> usize {
        self.inner.read().expect("poisoned lock").len()
    }

    /// Returns whether the store holds no roles.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("poisoned lock").is_empty()
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn load_all(&self) -> std::result::Result<Vec<RoleRecord>, crate::StoreError> {
        let guard = self.inner.read().expect("poisoned lock");
        Ok(guard.values().cloned().collect())
    }
}
