//! Ordered identification object store
//!
//! Objects are kept in a vector sorted by id. Inserts find their position
//! with a binary search, so there is no special case for the head. Each
//! object owns its data buffer and the store releases all of them together.

use tracing::{debug, trace};

use crate::category::ReadDeviceIdCode;
use crate::error::{Error, Result};
use crate::object::DeviceIdObject;

/// Ordered collection of identification objects, unique by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectStore {
    objects: Vec<DeviceIdObject>,
}

impl ObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Insert a copy of `data` under `id`
    ///
    /// The first write wins: inserting an id that already exists fails with
    /// [`Error::DuplicateId`] and leaves the stored object untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use modbus_devid_core::{Error, ObjectStore};
    ///
    /// let mut store = ObjectStore::new();
    /// store.insert(0x01, b"PC-100").unwrap();
    /// store.insert(0x00, b"Acme").unwrap();
    ///
    /// assert_eq!(store.insert(0x00, b"Other"), Err(Error::DuplicateId(0x00)));
    /// assert_eq!(store.get(0x00).unwrap().data(), b"Acme");
    /// ```
    pub fn insert(&mut self, id: u8, data: &[u8]) -> Result<&DeviceIdObject> {
        let pos = match self.position(id) {
            Ok(_) => {
                debug!(id = id, "Rejected duplicate object id");
                return Err(Error::DuplicateId(id));
            }
            Err(pos) => pos,
        };

        let obj = DeviceIdObject::new(id, data)?;
        self.objects
            .try_reserve(1)
            .map_err(|_| Error::AllocationFailure {
                id,
                requested: std::mem::size_of::<DeviceIdObject>(),
            })?;
        self.objects.insert(pos, obj);

        trace!(id = id, len = data.len(), index = pos, "Inserted object");

        Ok(&self.objects[pos])
    }

    /// Look up an object by id
    pub fn get(&self, id: u8) -> Option<&DeviceIdObject> {
        self.position(id).ok().map(|pos| &self.objects[pos])
    }

    /// Check if an object with `id` exists
    pub fn validate_id(&self, id: u8) -> bool {
        self.get(id).is_some()
    }

    /// Total number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of objects with `low <= id <= high`
    pub fn count_in_range(&self, low: u8, high: u8) -> usize {
        self.objects
            .iter()
            .filter(|obj| (low..=high).contains(&obj.id()))
            .count()
    }

    /// Number of objects in the category of `code` with `id >= start_id`
    pub fn count_in_category(&self, code: ReadDeviceIdCode, start_id: u8) -> usize {
        self.iter_category(code, start_id).count()
    }

    /// Objects in ascending id order
    pub fn iter(&self) -> std::slice::Iter<'_, DeviceIdObject> {
        self.objects.iter()
    }

    /// Objects in the category of `code` with `id >= start_id`, ascending
    pub fn iter_category(
        &self,
        code: ReadDeviceIdCode,
        start_id: u8,
    ) -> impl Iterator<Item = &DeviceIdObject> + '_ {
        let first = self.position(start_id).unwrap_or_else(|pos| pos);
        self.objects[first..]
            .iter()
            .filter(move |obj| code.contains(obj.id()))
    }

    /// Destroy every object and its data buffer
    ///
    /// Calling this on an empty store is a no-op.
    pub fn release(&mut self) {
        if !self.objects.is_empty() {
            debug!(count = self.objects.len(), "Releasing device id objects");
        }
        self.objects.clear();
        self.objects.shrink_to_fit();
    }

    fn position(&self, id: u8) -> std::result::Result<usize, usize> {
        self.objects.binary_search_by_key(&id, DeviceIdObject::id)
    }
}

impl<'a> IntoIterator for &'a ObjectStore {
    type Item = &'a DeviceIdObject;
    type IntoIter = std::slice::Iter<'a, DeviceIdObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn ids(store: &ObjectStore) -> Vec<u8> {
        store.iter().map(DeviceIdObject::id).collect()
    }

    #[test]
    fn test_store_new() {
        let store = ObjectStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.get(0).is_none());
    }

    #[test]
    fn test_insert_sorted() {
        let mut store = ObjectStore::new();
        for id in [0x05, 0x00, 0x81, 0x03, 0x01, 0x80, 0x02] {
            store.insert(id, &[id]).unwrap();
        }

        assert_eq!(ids(&store), vec![0x00, 0x01, 0x02, 0x03, 0x05, 0x80, 0x81]);
    }

    #[test]
    fn test_insert_before_head() {
        let mut store = ObjectStore::new();
        store.insert(0x04, b"E").unwrap();
        store.insert(0x02, b"C").unwrap();
        store.insert(0x00, b"A").unwrap();

        assert_eq!(ids(&store), vec![0x00, 0x02, 0x04]);
        assert_eq!(store.get(0x00).unwrap().data(), b"A");
    }

    #[test]
    fn test_insert_returns_object() {
        let mut store = ObjectStore::new();
        let obj = store.insert(0x03, b"https://example.com").unwrap();

        assert_eq!(obj.id(), 0x03);
        assert_eq!(obj.data(), b"https://example.com");
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut store = ObjectStore::new();
        store.insert(0x01, b"first").unwrap();

        let result = store.insert(0x01, b"second");
        assert_eq!(result, Err(Error::DuplicateId(0x01)));
        assert_eq!(store.get(0x01).unwrap().data(), b"first");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_too_long_leaves_store_untouched() {
        let mut store = ObjectStore::new();
        assert!(store.insert(0x80, &[0; 300]).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_validate_id() {
        let mut store = ObjectStore::new();
        store.insert(0x80, b"private").unwrap();

        assert!(store.validate_id(0x80));
        assert!(!store.validate_id(0x81));
    }

    #[test]
    fn test_count_in_range() {
        let mut store = ObjectStore::new();
        for id in [0x00, 0x01, 0x02, 0x03, 0x80, 0x81] {
            store.insert(id, b"x").unwrap();
        }

        assert_eq!(store.count_in_range(0x00, 0xFF), 6);
        assert_eq!(store.count_in_range(0x01, 0x03), 3);
        assert_eq!(store.count_in_range(0x80, 0x80), 1);
        assert_eq!(store.count_in_range(0x04, 0x7F), 0);
        assert_eq!(store.count_in_range(0x03, 0x01), 0);
    }

    #[test]
    fn test_count_in_category() {
        let mut store = ObjectStore::new();
        for id in [0x00, 0x01, 0x02, 0x03, 0x80, 0x81] {
            store.insert(id, b"x").unwrap();
        }

        assert_eq!(store.count_in_category(ReadDeviceIdCode::Basic, 0), 4);
        assert_eq!(store.count_in_category(ReadDeviceIdCode::Regular, 0), 4);
        assert_eq!(store.count_in_category(ReadDeviceIdCode::Extended, 0), 6);
        assert_eq!(store.count_in_category(ReadDeviceIdCode::Extended, 0x02), 4);
        assert_eq!(store.count_in_category(ReadDeviceIdCode::Regular, 0x81), 0);
    }

    #[test]
    fn test_iter_category_starts_between_ids() {
        let mut store = ObjectStore::new();
        for id in [0x00, 0x02, 0x05, 0x80] {
            store.insert(id, b"x").unwrap();
        }

        let found: Vec<u8> = store
            .iter_category(ReadDeviceIdCode::Extended, 0x03)
            .map(DeviceIdObject::id)
            .collect();
        assert_eq!(found, vec![0x05, 0x80]);
    }

    #[test]
    fn test_release_idempotent() {
        let mut store = ObjectStore::new();
        store.insert(0x00, b"Acme").unwrap();
        store.insert(0x01, b"PC-100").unwrap();

        store.release();
        store.release();

        assert_eq!(store.len(), 0);
        assert!(store.get(0x00).is_none());
    }

    #[test]
    fn test_release_empty_store() {
        let mut store = ObjectStore::new();
        store.release();
        assert!(store.is_empty());
    }

    proptest! {
        #[test]
        fn prop_store_stays_sorted(entries in proptest::collection::vec((any::<u8>(), proptest::collection::vec(any::<u8>(), 0..8)), 0..64)) {
            let mut store = ObjectStore::new();
            for (id, data) in &entries {
                let _ = store.insert(*id, data);
            }

            let ids = ids(&store);
            prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));

            // First write wins for every id
            for (id, _) in &entries {
                let first = entries.iter().find(|(other, _)| other == id).map(|(_, d)| d.as_slice());
                prop_assert_eq!(store.get(*id).map(DeviceIdObject::data), first);
            }
        }
    }
}
