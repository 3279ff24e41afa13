//! Read-side projections over store state. Pure functions: no mutation, no
//! persistence.

use crate::models::{Book, Collection};

/// Filters the catalog by category and case-insensitive substring search on
/// title and author. Books without an author can only match on title.
pub fn filter_catalog<'a>(
    books: &'a [Book],
    search_text: &str,
    category: Option<&str>,
) -> Vec<&'a Book> {
    let needle = search_text.trim().to_lowercase();
    books
        .iter()
        .filter(|book| {
            let matches_category = match category {
                Some(wanted) => book.category.as_deref() == Some(wanted),
                None => true,
            };
            let matches_search = needle.is_empty()
                || book.title.to_lowercase().contains(&needle)
                || book
                    .author
                    .as_deref()
                    .map(|author| author.to_lowercase().contains(&needle))
                    .unwrap_or(false);
            matches_category && matches_search
        })
        .collect()
}

/// Why a filtered listing came back empty. The three cases get distinct
/// user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    Category,
    Search,
    Both,
}

impl EmptyReason {
    pub fn for_filter(search_text: &str, category: Option<&str>) -> EmptyReason {
        let searching = !search_text.trim().is_empty();
        match (category.is_some(), searching) {
            (true, true) => EmptyReason::Both,
            (true, false) => EmptyReason::Category,
            _ => EmptyReason::Search,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::Category => "No books found in this category.",
            EmptyReason::Search => "No books found matching your search.",
            EmptyReason::Both => "No books found matching your search or selected category.",
        }
    }
}

/// Joins a collection's membership list against the catalog, yielding full
/// book records in catalog order (not membership order).
pub fn resolve_collection_books<'a>(collection: &Collection, books: &'a [Book]) -> Vec<&'a Book> {
    books
        .iter()
        .filter(|book| collection.book_ids.contains(&book.index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(index: i64, title: &str, author: Option<&str>, category: Option<&str>) -> Book {
        Book {
            id: index,
            index,
            title: title.to_string(),
            author: author.map(String::from),
            category: category.map(String::from),
            description: String::new(),
            pages: 1,
            release_date: String::new(),
            cover_url: None,
            is_custom: author.is_some(),
            is_new: false,
        }
    }

    fn sample() -> Vec<Book> {
        vec![
            book(1, "Dune", Some("Herbert"), Some("Science")),
            book(2, "1984", Some("Orwell"), Some("Fiction")),
        ]
    }

    #[test]
    fn category_filter_matches_exactly() {
        let books = sample();
        let found = filter_catalog(&books, "", Some("Fiction"));
        let titles: Vec<&str> = found.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["1984"]);
    }

    #[test]
    fn search_matches_author_case_insensitively() {
        let books = sample();
        let found = filter_catalog(&books, "orwell", None);
        let titles: Vec<&str> = found.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["1984"]);
    }

    #[test]
    fn search_with_no_match_is_empty() {
        let books = sample();
        assert!(filter_catalog(&books, "zz", None).is_empty());
    }

    #[test]
    fn books_without_author_match_on_title_only() {
        let books = vec![book(1, "Chamber of Secrets", None, None)];
        assert_eq!(filter_catalog(&books, "chamber", None).len(), 1);
        assert!(filter_catalog(&books, "rowling", None).is_empty());
    }

    #[test]
    fn uncategorized_books_never_match_a_selected_category() {
        let books = vec![book(1, "Chamber of Secrets", None, None)];
        assert!(filter_catalog(&books, "", Some("Fantasy")).is_empty());
    }

    #[test]
    fn empty_reasons_produce_three_distinct_messages() {
        let category = EmptyReason::for_filter("", Some("Crime"));
        let search = EmptyReason::for_filter("zz", None);
        let both = EmptyReason::for_filter("zz", Some("Crime"));
        assert_eq!(category, EmptyReason::Category);
        assert_eq!(search, EmptyReason::Search);
        assert_eq!(both, EmptyReason::Both);
        assert_ne!(category.message(), search.message());
        assert_ne!(search.message(), both.message());
        assert_ne!(category.message(), both.message());
    }

    #[test]
    fn collection_books_come_back_in_catalog_order() {
        let books = vec![
            book(1, "A", None, None),
            book(2, "B", None, None),
            book(3, "C", None, None),
        ];
        let collection = Collection {
            id: 1,
            name: "Favorites".to_string(),
            book_ids: vec![3, 1],
        };
        let resolved = resolve_collection_books(&collection, &books);
        let titles: Vec<&str> = resolved.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[test]
    fn unknown_membership_ids_resolve_to_nothing() {
        let books = vec![book(1, "A", None, None)];
        let collection = Collection {
            id: 1,
            name: "Favorites".to_string(),
            book_ids: vec![42],
        };
        assert!(resolve_collection_books(&collection, &books).is_empty());
    }
}
