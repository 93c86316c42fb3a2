use super::*;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory object store for tests and single-process pipelines.
#[derive(Default)]
pub struct InMemoryStore {
    objects: Mutex<HashMap<ObjectRef, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for InMemoryStore {
    fn get(&self, location: &ObjectRef) -> Result<Vec<u8>, StoreError> {
        self.objects
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .get(location)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(location.clone()))
    }

    fn put(&self, location: &ObjectRef, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.objects
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .insert(location.clone(), bytes);
        Ok(())
    }

    fn list(&self, location: &StoreLocation) -> Result<Vec<ObjectRef>, StoreError> {
        let mut refs: Vec<ObjectRef> = self
            .objects
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .keys()
            .filter(|object| location.contains(object))
            .cloned()
            .collect();
        refs.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(refs)
    }
}
