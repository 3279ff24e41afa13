use reqwest::blocking::Client;
use std::time::Duration;

use crate::error::{LibraryError, LibraryResult};
use crate::models::{Book, RemoteBook};

/// The canonical remote book list. Read-only, no auth, no pagination.
pub const DEFAULT_CATALOG_URL: &str = "https://potterapi-fedeperin.vercel.app/en/books";

const HTTP_TIMEOUT_SECS: u64 = 6;
const HTTP_USER_AGENT: &str = "Bookrack/0.1 (+https://github.com/bookrack/bookrack)";

/// Anything that can produce the remote half of the catalog.
pub trait RemoteSource {
    fn fetch_books(&self) -> LibraryResult<Vec<Book>>;
}

pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> LibraryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|err| LibraryError::Fetch(err.to_string()))?;
        Ok(HttpCatalogSource {
            client,
            url: url.into(),
        })
    }

    pub fn default_source() -> LibraryResult<Self> {
        Self::new(DEFAULT_CATALOG_URL)
    }
}

impl RemoteSource for HttpCatalogSource {
    /// Single attempt per call; retrying is the caller's decision.
    fn fetch_books(&self) -> LibraryResult<Vec<Book>> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, HTTP_USER_AGENT)
            .send()
            .map_err(|err| LibraryError::Fetch(format!("could not reach remote catalog: {}", err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LibraryError::Fetch(format!(
                "remote catalog returned {}",
                status
            )));
        }

        let body = response
            .text()
            .map_err(|err| LibraryError::Fetch(err.to_string()))?;
        let remote: Vec<RemoteBook> = serde_json::from_str(&body)?;
        log::debug!("fetched {} books from {}", remote.len(), self.url);
        Ok(remote.into_iter().map(Book::from).collect())
    }
}
