use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, LibraryResult};

/// A catalog entry, either fetched from the remote source or added by the user.
///
/// `index` is the join key used everywhere collections reference books; remote
/// entries do not carry a reliable unique `id`, so memberships store `index`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub index: i64,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub description: String,
    pub pages: i64,
    pub release_date: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub is_new: bool,
}

/// One entry of the remote catalog payload, parsed strictly at the fetch
/// boundary so malformed data never reaches the store.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBook {
    pub number: i64,
    pub index: i64,
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    pub release_date: String,
    pub description: String,
    pub pages: i64,
    #[serde(default)]
    pub cover: Option<String>,
}

impl From<RemoteBook> for Book {
    fn from(remote: RemoteBook) -> Self {
        // The remote source has no author/category fields; `number` is its
        // stable identifier.
        Book {
            id: remote.number,
            index: remote.index,
            title: remote.title,
            author: None,
            category: None,
            description: remote.description,
            pages: remote.pages,
            release_date: remote.release_date,
            cover_url: remote.cover,
            is_custom: false,
            is_new: false,
        }
    }
}

/// User input for a new custom book. Every field is required; validation
/// happens before the draft is turned into a `Book`.
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: String,
    pub pages: i64,
    pub release_date: String,
    pub cover_url: String,
}

impl BookDraft {
    pub fn validate(&self) -> LibraryResult<()> {
        let complete = !self.title.trim().is_empty()
            && !self.author.trim().is_empty()
            && !self.category.trim().is_empty()
            && !self.description.trim().is_empty()
            && !self.release_date.trim().is_empty()
            && !self.cover_url.trim().is_empty()
            && self.pages > 0;
        if complete {
            Ok(())
        } else {
            Err(LibraryError::InvalidBook(
                "please ensure all fields are filled".to_string(),
            ))
        }
    }

    /// Builds the custom book, using the creation timestamp as both `id` and
    /// `index`.
    pub fn into_book(self, created_at_millis: i64) -> Book {
        Book {
            id: created_at_millis,
            index: created_at_millis,
            title: self.title,
            author: Some(self.author),
            category: Some(self.category),
            description: self.description,
            pages: self.pages,
            release_date: self.release_date,
            cover_url: Some(self.cover_url),
            is_custom: true,
            is_new: true,
        }
    }
}

/// A user-named grouping of catalog books, referenced by `Book.index`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub book_ids: Vec<i64>,
}

impl Collection {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Collection {
            id,
            name: name.into(),
            book_ids: Vec::new(),
        }
    }
}
