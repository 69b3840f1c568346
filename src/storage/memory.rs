//! In-memory storage backend
//!
//! Keeps graph records in a mutex-guarded map. Nothing outlives the
//! instance, which makes it the backend of choice for tests.

use super::traits::{GraphStore, StorageError, StorageResult};
use crate::graph::{GraphId, GraphSnapshot};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryStore {
    graphs: Mutex<HashMap<GraphId, GraphSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<GraphId, GraphSnapshot>> {
        // A panic while holding the lock cannot leave a half-written snapshot
        self.graphs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GraphStore for MemoryStore {
    fn save_graph(&self, id: &GraphId, snapshot: &GraphSnapshot) -> StorageResult<()> {
        self.lock().insert(id.clone(), snapshot.clone());
        Ok(())
    }

    fn load_graph(&self, id: &GraphId) -> StorageResult<Option<GraphSnapshot>> {
        Ok(self.lock().get(id).cloned())
    }

    fn delete_graph(&self, id: &GraphId) -> StorageResult<bool> {
        Ok(self.lock().remove(id).is_some())
    }

    fn list_graphs(&self) -> StorageResult<Vec<GraphId>> {
        let mut ids: Vec<GraphId> = self.lock().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn update_graph(
        &self,
        id: &GraphId,
        apply: &mut dyn FnMut(&mut GraphSnapshot) -> bool,
    ) -> StorageResult<bool> {
        let mut graphs = self.lock();
        let snapshot = graphs
            .get_mut(id)
            .ok_or_else(|| StorageError::GraphNotFound(id.clone()))?;
        Ok(apply(snapshot))
    }
}
