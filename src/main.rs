use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};

use bookrack::{
    filter_catalog, resolve_collection_books, BookDraft, CatalogStore, CollectionStore,
    EmptyReason, HttpCatalogSource, KeyValueStore, LibraryError, LibraryResult, SqliteStore,
    DEFAULT_CATALOG_URL,
};

const DEFAULT_DB_PATH: &str = "./bookrack.db";

#[derive(Parser, Debug)]
#[command(name = "bookrack")]
#[command(about = "Browse a remote book catalog, keep custom books and collections")]
struct Cli {
    /// Path to the library database file
    #[arg(long, global = true)]
    db: Option<String>,

    /// Remote catalog URL override
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the remote catalog and print a summary
    Fetch,
    /// List catalog books, optionally filtered by search text and category
    Browse {
        /// Match against book title or author (case-insensitive substring)
        #[arg(short, long, default_value = "")]
        search: String,
        /// Keep only books in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Add a custom book to the catalog
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        pages: i64,
        #[arg(long)]
        release_date: String,
        #[arg(long)]
        cover_url: String,
    },
    /// Delete a custom book by id (remote books cannot be deleted)
    RemoveBook { id: i64 },
    /// Manage book collections
    #[command(subcommand)]
    Collections(CollectionsCommand),
}

#[derive(Subcommand, Debug)]
enum CollectionsCommand {
    /// List all collections
    List,
    /// Create a new collection
    Create { name: String },
    /// Delete a collection by id
    Delete { id: i64 },
    /// Add a book (by catalog index) to a collection
    Add { collection_id: i64, book_index: i64 },
    /// Remove a book (by catalog index) from a collection
    Remove { collection_id: i64, book_index: i64 },
    /// Show the books of one collection, resolved against the catalog
    Show { id: i64 },
}

fn main() {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> LibraryResult<()> {
    let db_path = cli
        .db
        .clone()
        .or_else(|| std::env::var("BOOKRACK_DB").ok())
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
    let catalog_url = cli
        .catalog_url
        .clone()
        .or_else(|| std::env::var("BOOKRACK_CATALOG_URL").ok())
        .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());

    let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(&db_path)?);

    match cli.command {
        Command::Fetch => {
            let catalog = fetch_catalog(storage, &catalog_url)?;
            let custom = catalog.state().custom_books().len();
            println!(
                "{} books in catalog ({} custom)",
                catalog.books().len(),
                custom
            );
        }
        Command::Browse { search, category } => {
            let catalog = fetch_catalog(storage, &catalog_url)?;
            let found = filter_catalog(catalog.books(), &search, category.as_deref());
            if found.is_empty() {
                println!(
                    "{}",
                    EmptyReason::for_filter(&search, category.as_deref()).message()
                );
                return Ok(());
            }
            for book in found {
                print_book_line(book);
            }
        }
        Command::AddBook {
            title,
            author,
            category,
            description,
            pages,
            release_date,
            cover_url,
        } => {
            let draft = BookDraft {
                title,
                author,
                category,
                description,
                pages,
                release_date,
                cover_url,
            };
            draft.validate()?;
            let book = draft.into_book(Utc::now().timestamp_millis());
            let id = book.id;

            let mut catalog = CatalogStore::new(storage);
            catalog.load_custom_books();
            catalog.add_book(book)?;
            println!("Book added (id {})", id);
        }
        Command::RemoveBook { id } => {
            let mut catalog = CatalogStore::new(storage);
            catalog.load_custom_books();
            if catalog.delete_custom_book(id) {
                println!("Book {} removed", id);
            } else {
                println!("No custom book with id {}", id);
            }
        }
        Command::Collections(command) => run_collections(command, storage, &catalog_url)?,
    }
    Ok(())
}

fn run_collections(
    command: CollectionsCommand,
    storage: Arc<dyn KeyValueStore>,
    catalog_url: &str,
) -> LibraryResult<()> {
    match command {
        CollectionsCommand::List => {
            let collections = CollectionStore::load(storage);
            if collections.collections().is_empty() {
                println!("No collections available. Add a new one.");
                return Ok(());
            }
            for collection in collections.collections() {
                println!(
                    "{:>15}  {} ({} books)",
                    collection.id,
                    collection.name,
                    collection.book_ids.len()
                );
            }
        }
        CollectionsCommand::Create { name } => {
            let trimmed = name.trim();
            // Empty and duplicate names are rejected here, before the store:
            // name uniqueness is a caller-side precondition.
            if trimmed.is_empty() {
                return Err(LibraryError::InvalidName(
                    "please enter a collection name".to_string(),
                ));
            }
            let mut collections = CollectionStore::load(storage);
            if collections.name_exists(trimmed) {
                return Err(LibraryError::InvalidName(format!(
                    "collection \"{}\" already exists, try a different name",
                    trimmed
                )));
            }
            let id = Utc::now().timestamp_millis();
            collections.create(id, trimmed);
            println!("Collection \"{}\" created (id {})", trimmed, id);
        }
        CollectionsCommand::Delete { id } => {
            let mut collections = CollectionStore::load(storage);
            if collections.remove(id) {
                println!("Collection {} deleted", id);
            } else {
                println!("No collection with id {}", id);
            }
        }
        CollectionsCommand::Add {
            collection_id,
            book_index,
        } => {
            let mut collections = CollectionStore::load(storage);
            if collections.add_book(collection_id, book_index) {
                println!("Book {} added to collection {}", book_index, collection_id);
            } else {
                println!("Nothing to do: collection missing or book already a member");
            }
        }
        CollectionsCommand::Remove {
            collection_id,
            book_index,
        } => {
            let mut collections = CollectionStore::load(storage);
            if collections.remove_book(collection_id, book_index) {
                println!(
                    "Book {} removed from collection {}",
                    book_index, collection_id
                );
            } else {
                println!("Nothing to do: collection missing or book not a member");
            }
        }
        CollectionsCommand::Show { id } => {
            let collections = CollectionStore::load(storage.clone());
            let Some(collection) = collections.get(id) else {
                println!("No collection with id {}", id);
                return Ok(());
            };
            let catalog = fetch_catalog(storage.clone(), catalog_url)?;
            let books = resolve_collection_books(collection, catalog.books());
            println!("Books in \"{}\":", collection.name);
            if books.is_empty() {
                println!("No books in this collection yet.");
                return Ok(());
            }
            for book in books {
                print_book_line(book);
            }
        }
    }
    Ok(())
}

/// Builds a catalog store and runs one fetch cycle. A fetch error is fatal to
/// the command but recoverable by rerunning it.
fn fetch_catalog(storage: Arc<dyn KeyValueStore>, catalog_url: &str) -> LibraryResult<CatalogStore> {
    let source = HttpCatalogSource::new(catalog_url)?;
    let mut catalog = CatalogStore::new(storage);
    catalog.fetch(&source);
    if let Some(message) = catalog.state().error.clone() {
        return Err(LibraryError::Fetch(message));
    }
    Ok(catalog)
}

fn print_book_line(book: &bookrack::Book) {
    let mut line = format!("{:>15}  {}", book.index, book.title);
    if let Some(author) = book.author.as_deref() {
        line.push_str(&format!(" by {}", author));
    }
    if let Some(category) = book.category.as_deref() {
        line.push_str(&format!(" [{}]", category));
    }
    if book.is_custom {
        line.push_str(" (custom)");
    }
    println!("{}", line);
}
