//! Shared object store for servers handling concurrent requests
//!
//! The store itself is not synchronized. Identification data is written
//! during setup and read on every request afterwards, so a read-write lock
//! around a single store serializes the two without blocking readers.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::error::Result;
use crate::object::DeviceIdObject;
use crate::store::ObjectStore;

/// Cloneable handle to one object store
///
/// Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct SharedObjectStore {
    inner: Arc<RwLock<ObjectStore>>,
}

impl SharedObjectStore {
    /// Create a handle to an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a copy of `data` under `id`
    ///
    /// Returns a copy of the stored object since the lock is released on
    /// return.
    pub fn insert(&self, id: u8, data: &[u8]) -> Result<DeviceIdObject> {
        self.inner.write().insert(id, data).cloned()
    }

    /// Look up an object by id
    pub fn get(&self, id: u8) -> Option<DeviceIdObject> {
        self.inner.read().get(id).cloned()
    }

    /// Check if an object with `id` exists
    pub fn validate_id(&self, id: u8) -> bool {
        self.inner.read().validate_id(id)
    }

    /// Total number of objects
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Lock the store for reading
    pub fn read(&self) -> RwLockReadGuard<'_, ObjectStore> {
        self.inner.read()
    }

    /// Destroy every object
    pub fn release(&self) {
        self.inner.write().release();
    }
}

impl From<ObjectStore> for SharedObjectStore {
    fn from(store: ObjectStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_shared_insert_and_get() {
        let shared = SharedObjectStore::new();
        shared.insert(0x00, b"Acme").unwrap();

        assert_eq!(shared.get(0x00).unwrap().data(), b"Acme");
        assert!(shared.validate_id(0x00));
        assert_eq!(shared.insert(0x00, b"Other"), Err(Error::DuplicateId(0x00)));
    }

    #[test]
    fn test_shared_clone() {
        let shared1 = SharedObjectStore::new();
        let shared2 = shared1.clone();

        shared1.insert(0x01, b"PC-100").unwrap();

        // Both see the same store
        assert_eq!(shared2.len(), 1);

        shared2.release();
        assert!(shared1.is_empty());
    }

    #[test]
    fn test_shared_from_store() {
        let mut store = ObjectStore::new();
        store.insert(0x80, b"private").unwrap();

        let shared = SharedObjectStore::from(store);
        assert_eq!(shared.read().count_in_range(0x80, 0xFF), 1);
    }

    #[test]
    fn test_shared_across_threads() {
        let shared = SharedObjectStore::new();

        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.insert(i, &[i]).is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }

        let ids: Vec<u8> = shared.read().iter().map(DeviceIdObject::id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
