//! Book-library core: a remote-fetched catalog merged with locally persisted
//! custom books, user-defined collections, and pure derived views over both.
//!
//! The two stores are plain dependency-injected objects: construct a
//! [`storage::KeyValueStore`] once at startup and hand it to
//! [`catalog::CatalogStore`] and [`collections::CollectionStore`]. State
//! transitions are pure; persistence is a write-after-mutate side effect on
//! the injected store.

pub mod catalog;
pub mod collections;
pub mod error;
pub mod models;
pub mod remote;
pub mod storage;
pub mod views;

pub use catalog::{CatalogState, CatalogStore};
pub use collections::{CollectionState, CollectionStore};
pub use error::{LibraryError, LibraryResult};
pub use models::{Book, BookDraft, Collection, RemoteBook};
pub use remote::{HttpCatalogSource, RemoteSource, DEFAULT_CATALOG_URL};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use views::{filter_catalog, resolve_collection_books, EmptyReason};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // Removing a collection must never reach into the catalog.
    #[test]
    fn deleting_a_collection_leaves_the_catalog_alone() {
        let storage: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let mut catalog = CatalogStore::new(storage.clone());
        catalog.load_custom_books();
        let book = BookDraft {
            title: "Mine".to_string(),
            author: "Me".to_string(),
            category: "Fiction".to_string(),
            description: "d".to_string(),
            pages: 10,
            release_date: "2024".to_string(),
            cover_url: "https://example.com/m.jpg".to_string(),
        }
        .into_book(77);
        catalog.add_book(book).unwrap();

        let mut collections = CollectionStore::load(storage);
        collections.create(1, "Favorites");
        collections.add_book(1, 77);
        collections.remove(1);

        assert!(collections.collections().is_empty());
        assert_eq!(catalog.books().len(), 1);
        assert_eq!(catalog.books()[0].index, 77);
    }
}
