//! Repository layer for catalog storage
//!
//! Each entity is reached through a trait so handlers do not care whether
//! records live in PostgreSQL or in process memory.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Author, AuthorInput, Book, BookInstance, Genre, LoanStatus, LoanedCopy},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// Fails with `NotFound` when absent
    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    /// Books ordered by title
    async fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<Book>>;

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;

    async fn list_by_genre(&self, genre_id: i32) -> AppResult<Vec<Book>>;

    async fn genres_of(&self, book_id: i32) -> AppResult<Vec<Genre>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// Fails with `NotFound` when absent
    async fn get_by_id(&self, id: i32) -> AppResult<Author>;

    /// Authors ordered by last name, then first name
    async fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<Author>>;

    async fn create(&self, input: &AuthorInput) -> AppResult<Author>;

    /// Fails with `NotFound` when absent
    async fn update(&self, id: i32, input: &AuthorInput) -> AppResult<Author>;

    /// Fails with `NotFound` when absent
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// Fails with `NotFound` when absent
    async fn get_by_id(&self, id: i32) -> AppResult<Genre>;

    /// Genres ordered by name
    async fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<Genre>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64>;

    /// Fails with `NotFound` when absent
    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance>;

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>>;

    /// Copies on loan, optionally to a single borrower
    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64>;

    /// Copies on loan ordered by due date, optionally to a single borrower
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<LoanedCopy>>;

    /// Set `due_back` and nothing else; fails with `NotFound` when absent
    async fn update_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance>;
}

/// Main repository struct holding one store per entity
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub authors: Arc<dyn AuthorStore>,
    pub genres: Arc<dyn GenreStore>,
    pub book_instances: Arc<dyn BookInstanceStore>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            genres: Arc::new(genres::GenresRepository::new(pool.clone())),
            book_instances: Arc::new(book_instances::BookInstancesRepository::new(pool)),
        }
    }

    /// Create a repository whose every store is the given in-memory catalog
    pub fn in_memory(store: memory::MemoryStore) -> Self {
        Self {
            books: Arc::new(store.clone()),
            authors: Arc::new(store.clone()),
            genres: Arc::new(store.clone()),
            book_instances: Arc::new(store),
        }
    }
}
