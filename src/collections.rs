use std::sync::Arc;

use crate::models::Collection;
use crate::storage::{self, KeyValueStore, COLLECTIONS_KEY};

/// Pure collection state. Every transition reports whether it changed
/// anything so the wrapping store knows when to persist.
#[derive(Debug, Default, Clone)]
pub struct CollectionState {
    pub collections: Vec<Collection>,
}

impl CollectionState {
    /// No-op when a collection with this `id` already exists.
    pub fn create(&mut self, id: i64, name: &str) -> bool {
        if self.collections.iter().any(|c| c.id == id) {
            return false;
        }
        self.collections.push(Collection::new(id, name));
        true
    }

    /// Case-insensitive name lookup. Name uniqueness is a caller-side
    /// precondition, not enforced here; this keeps the caller check cheap.
    pub fn name_exists(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.collections
            .iter()
            .any(|c| c.name.to_lowercase() == wanted)
    }

    pub fn get(&self, id: i64) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Idempotent: adding an id that is already a member is a no-op.
    pub fn add_book(&mut self, collection_id: i64, book_id: i64) -> bool {
        match self.collections.iter_mut().find(|c| c.id == collection_id) {
            Some(collection) if !collection.book_ids.contains(&book_id) => {
                collection.book_ids.push(book_id);
                true
            }
            _ => false,
        }
    }

    /// Idempotent: removing an absent id is a no-op.
    pub fn remove_book(&mut self, collection_id: i64, book_id: i64) -> bool {
        match self.collections.iter_mut().find(|c| c.id == collection_id) {
            Some(collection) => {
                let before = collection.book_ids.len();
                collection.book_ids.retain(|id| *id != book_id);
                collection.book_ids.len() != before
            }
            None => false,
        }
    }

    /// Drops the whole collection, independent of book state.
    pub fn remove(&mut self, collection_id: i64) -> bool {
        let before = self.collections.len();
        self.collections.retain(|c| c.id != collection_id);
        self.collections.len() != before
    }
}

/// Collection store: the full collection sequence, loaded from storage at
/// construction and re-persisted in full after every effective mutation.
pub struct CollectionStore {
    state: CollectionState,
    storage: Arc<dyn KeyValueStore>,
}

impl CollectionStore {
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let collections = storage::read_json_seq(storage.as_ref(), COLLECTIONS_KEY);
        CollectionStore {
            state: CollectionState { collections },
            storage,
        }
    }

    pub fn collections(&self) -> &[Collection] {
        &self.state.collections
    }

    pub fn get(&self, id: i64) -> Option<&Collection> {
        self.state.get(id)
    }

    pub fn name_exists(&self, name: &str) -> bool {
        self.state.name_exists(name)
    }

    pub fn create(&mut self, id: i64, name: &str) -> bool {
        let changed = self.state.create(id, name);
        self.persist_if(changed)
    }

    pub fn add_book(&mut self, collection_id: i64, book_id: i64) -> bool {
        let changed = self.state.add_book(collection_id, book_id);
        self.persist_if(changed)
    }

    pub fn remove_book(&mut self, collection_id: i64, book_id: i64) -> bool {
        let changed = self.state.remove_book(collection_id, book_id);
        self.persist_if(changed)
    }

    pub fn remove(&mut self, collection_id: i64) -> bool {
        let changed = self.state.remove(collection_id);
        self.persist_if(changed)
    }

    fn persist_if(&self, changed: bool) -> bool {
        if changed {
            storage::write_json_seq(
                self.storage.as_ref(),
                COLLECTIONS_KEY,
                &self.state.collections,
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> (Arc<MemoryStore>, CollectionStore) {
        let storage = Arc::new(MemoryStore::new());
        let store = CollectionStore::load(storage.clone());
        (storage, store)
    }

    #[test]
    fn create_with_duplicate_id_keeps_one_collection() {
        let (_, mut store) = store();
        assert!(store.create(5, "X"));
        assert!(!store.create(5, "X"));
        assert_eq!(store.collections().len(), 1);
        assert_eq!(store.collections()[0].id, 5);
    }

    #[test]
    fn adding_the_same_book_twice_is_idempotent() {
        let (_, mut store) = store();
        store.create(1, "Favorites");
        assert!(store.add_book(1, 7));
        assert!(!store.add_book(1, 7));
        assert_eq!(store.get(1).unwrap().book_ids, vec![7]);
    }

    #[test]
    fn add_book_to_missing_collection_is_a_noop() {
        let (storage, mut store) = store();
        assert!(!store.add_book(99, 7));
        // No mutation happened, so nothing was persisted either.
        assert!(storage.get(COLLECTIONS_KEY).unwrap().is_none());
    }

    #[test]
    fn removing_an_absent_book_leaves_members_unchanged() {
        let (_, mut store) = store();
        store.create(1, "Favorites");
        store.add_book(1, 7);
        assert!(!store.remove_book(1, 8));
        assert_eq!(store.get(1).unwrap().book_ids, vec![7]);
    }

    #[test]
    fn remove_book_deletes_the_membership() {
        let (_, mut store) = store();
        store.create(1, "Favorites");
        store.add_book(1, 7);
        store.add_book(1, 9);
        assert!(store.remove_book(1, 7));
        assert_eq!(store.get(1).unwrap().book_ids, vec![9]);
    }

    #[test]
    fn remove_collection_is_a_noop_when_absent() {
        let (_, mut store) = store();
        store.create(1, "Favorites");
        assert!(!store.remove(2));
        assert_eq!(store.collections().len(), 1);
        assert!(store.remove(1));
        assert!(store.collections().is_empty());
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let (_, mut store) = store();
        store.create(1, "To Read");
        assert!(store.name_exists("to read"));
        assert!(store.name_exists("  TO READ "));
        assert!(!store.name_exists("read"));
    }

    #[test]
    fn persisted_collections_round_trip_field_for_field() {
        let (storage, mut store) = store();
        store.create(10, "Favorites");
        store.add_book(10, 3);
        store.add_book(10, 1);
        store.create(20, "Later");

        let reloaded = CollectionStore::load(storage);
        assert_eq!(reloaded.collections(), store.collections());
        assert_eq!(reloaded.get(10).unwrap().book_ids, vec![3, 1]);
    }

    #[test]
    fn malformed_persisted_data_loads_as_empty() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(COLLECTIONS_KEY, "{definitely not json").unwrap();
        let store = CollectionStore::load(storage);
        assert!(store.collections().is_empty());
    }
}
