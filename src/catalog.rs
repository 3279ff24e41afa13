use std::sync::Arc;

use crate::error::{LibraryError, LibraryResult};
use crate::models::Book;
use crate::remote::RemoteSource;
use crate::storage::{self, KeyValueStore, CUSTOM_BOOKS_KEY};

/// Pure catalog state. Transitions never touch storage; persistence is the
/// wrapping store's job.
#[derive(Debug, Default, Clone)]
pub struct CatalogState {
    pub books: Vec<Book>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogState {
    pub fn fetch_started(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Replaces the catalog with remote books followed by the persisted custom
    /// books, order-preserving, no dedup.
    pub fn fetch_succeeded(&mut self, remote: Vec<Book>, custom: Vec<Book>) {
        self.loading = false;
        self.books = remote;
        self.books.extend(custom);
    }

    /// Leaves the current book list untouched so a stale catalog keeps
    /// rendering while the user retries.
    pub fn fetch_failed(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    /// Appends a custom book. No duplicate detection is performed: adding an
    /// identical book twice yields two entries.
    pub fn add_book(&mut self, book: Book) -> bool {
        if !book.is_custom {
            return false;
        }
        self.books.push(book);
        true
    }

    /// Removes the book whose `id` matches, but only if it is custom.
    pub fn delete_custom_book(&mut self, id: i64) -> bool {
        let before = self.books.len();
        self.books.retain(|book| !(book.is_custom && book.id == id));
        self.books.len() != before
    }

    pub fn custom_books(&self) -> Vec<Book> {
        self.books
            .iter()
            .filter(|book| book.is_custom)
            .cloned()
            .collect()
    }
}

/// Catalog store: holds the merged book list (remote + custom), the fetch
/// lifecycle flags, and persists the custom subset after every mutation.
pub struct CatalogStore {
    state: CatalogState,
    storage: Arc<dyn KeyValueStore>,
}

impl CatalogStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        CatalogStore {
            state: CatalogState::default(),
            storage,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn books(&self) -> &[Book] {
        &self.state.books
    }

    /// Seeds the in-memory catalog with the persisted custom books without
    /// fetching. Callers that mutate before any fetch must do this first, or
    /// the next persist would overwrite the stored subset.
    pub fn load_custom_books(&mut self) {
        let custom: Vec<Book> = storage::read_json_seq(self.storage.as_ref(), CUSTOM_BOOKS_KEY);
        self.state.books = custom;
    }

    /// Runs one full fetch cycle against the remote source. On success the
    /// catalog becomes remote books plus the persisted custom books; on
    /// failure the error message is surfaced and the book list is unchanged.
    /// Re-invoke to retry; there is no automatic retry or backoff.
    pub fn fetch(&mut self, source: &dyn RemoteSource) {
        self.state.fetch_started();
        match source.fetch_books() {
            Ok(remote) => {
                let custom = storage::read_json_seq(self.storage.as_ref(), CUSTOM_BOOKS_KEY);
                self.state.fetch_succeeded(remote, custom);
            }
            Err(err) => {
                log::warn!("catalog fetch failed: {}", err);
                self.state.fetch_failed(err.to_string());
            }
        }
    }

    pub fn add_book(&mut self, book: Book) -> LibraryResult<()> {
        if !self.state.add_book(book) {
            return Err(LibraryError::InvalidBook(
                "only custom books can be added to the catalog".to_string(),
            ));
        }
        self.persist_custom();
        Ok(())
    }

    pub fn delete_custom_book(&mut self, id: i64) -> bool {
        let changed = self.state.delete_custom_book(id);
        if changed {
            self.persist_custom();
        }
        changed
    }

    fn persist_custom(&self) {
        storage::write_json_seq(
            self.storage.as_ref(),
            CUSTOM_BOOKS_KEY,
            &self.state.custom_books(),
        );
    }
}
