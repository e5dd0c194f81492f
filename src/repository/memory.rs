//! In-memory catalog storage
//!
//! Mirrors the PostgreSQL repositories (orderings, NULL handling, author
//! deletion leaving books without an author) for development and tests.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Author, AuthorInput, Book, BookInstance, Genre, LoanStatus, LoanedCopy},
};

use super::{AuthorStore, BookInstanceStore, BookStore, GenreStore};

#[derive(Default)]
struct Catalog {
    authors: BTreeMap<i32, Author>,
    genres: BTreeMap<i32, Genre>,
    books: BTreeMap<i32, Book>,
    /// (book_id, genre_id)
    book_genres: Vec<(i32, i32)>,
    instances: BTreeMap<Uuid, BookInstance>,
    next_author_id: i32,
    next_genre_id: i32,
    next_book_id: i32,
}

impl Catalog {
    fn on_loan(&self, borrower_id: Option<i32>) -> Vec<&BookInstance> {
        let mut copies: Vec<&BookInstance> = self
            .instances
            .values()
            .filter(|c| c.status == LoanStatus::OnLoan)
            .filter(|c| borrower_id.map_or(true, |b| c.borrower_id == Some(b)))
            .collect();
        // NULL due dates sort last, like ORDER BY due_back ASC in PostgreSQL
        copies.sort_by_key(|c| (c.due_back.is_none(), c.due_back, c.id));
        copies
    }
}

fn page<T: Clone>(rows: Vec<&T>, offset: i64, limit: i64) -> Vec<T> {
    rows.into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

/// Catalog to load into a memory store
///
/// Books refer to authors and genres, and copies to books, by their 1-based
/// position in this document.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub authors: Vec<AuthorInput>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub books: Vec<FixtureBook>,
    #[serde(default)]
    pub copies: Vec<FixtureCopy>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureBook {
    pub title: String,
    #[serde(default)]
    pub author: Option<usize>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub genres: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureCopy {
    pub book: usize,
    #[serde(default)]
    pub imprint: String,
    pub status: LoanStatus,
    #[serde(default)]
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub borrower_id: Option<i32>,
}

/// Stored id for a 1-based fixture position
fn resolve(ids: &[i32], position: usize, kind: &str) -> AppResult<i32> {
    position
        .checked_sub(1)
        .and_then(|index| ids.get(index))
        .copied()
        .ok_or_else(|| AppError::BadRequest(format!("Fixture has no {} #{}", kind, position)))
}

/// Catalog held in process memory; clones share the same data
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Catalog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_genre(&self, name: &str) -> Genre {
        let mut catalog = self.inner.write().await;
        catalog.next_genre_id += 1;
        let genre = Genre {
            id: catalog.next_genre_id,
            name: name.to_string(),
        };
        catalog.genres.insert(genre.id, genre.clone());
        genre
    }

    pub async fn add_book(
        &self,
        title: &str,
        author_id: Option<i32>,
        isbn: &str,
        genre_ids: &[i32],
    ) -> Book {
        let mut catalog = self.inner.write().await;
        catalog.next_book_id += 1;
        let book = Book {
            id: catalog.next_book_id,
            title: title.to_string(),
            author_id,
            summary: String::new(),
            isbn: isbn.to_string(),
        };
        catalog.books.insert(book.id, book.clone());
        for genre_id in genre_ids {
            catalog.book_genres.push((book.id, *genre_id));
        }
        book
    }

    pub async fn add_copy(
        &self,
        book_id: i32,
        status: LoanStatus,
        due_back: Option<NaiveDate>,
        borrower_id: Option<i32>,
    ) -> BookInstance {
        let copy = BookInstance {
            id: Uuid::new_v4(),
            book_id,
            imprint: String::new(),
            due_back,
            status,
            borrower_id,
        };
        self.inner
            .write()
            .await
            .instances
            .insert(copy.id, copy.clone());
        copy
    }

    /// Add every record of `fixture`; nothing is stored if a reference is dangling
    pub async fn load(&self, fixture: CatalogFixture) -> AppResult<()> {
        let mut catalog = self.inner.write().await;

        let first_author = catalog.next_author_id + 1;
        let author_ids: Vec<i32> = (0..fixture.authors.len() as i32)
            .map(|offset| first_author + offset)
            .collect();
        let first_genre = catalog.next_genre_id + 1;
        let genre_ids: Vec<i32> = (0..fixture.genres.len() as i32)
            .map(|offset| first_genre + offset)
            .collect();
        let first_book = catalog.next_book_id + 1;
        let book_ids: Vec<i32> = (0..fixture.books.len() as i32)
            .map(|offset| first_book + offset)
            .collect();

        let mut books = Vec::with_capacity(fixture.books.len());
        let mut book_genres = Vec::new();
        for (book, id) in fixture.books.into_iter().zip(&book_ids) {
            let author_id = match book.author {
                Some(position) => Some(resolve(&author_ids, position, "author")?),
                None => None,
            };
            for position in book.genres {
                book_genres.push((*id, resolve(&genre_ids, position, "genre")?));
            }
            books.push(Book {
                id: *id,
                title: book.title,
                author_id,
                summary: book.summary,
                isbn: book.isbn,
            });
        }

        let mut copies = Vec::with_capacity(fixture.copies.len());
        for copy in fixture.copies {
            copies.push(BookInstance {
                id: Uuid::new_v4(),
                book_id: resolve(&book_ids, copy.book, "book")?,
                imprint: copy.imprint,
                due_back: copy.due_back,
                status: copy.status,
                borrower_id: copy.borrower_id,
            });
        }

        for (input, id) in fixture.authors.into_iter().zip(&author_ids) {
            catalog.authors.insert(
                *id,
                Author {
                    id: *id,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    date_of_birth: input.date_of_birth,
                    date_of_death: input.date_of_death,
                },
            );
        }
        for (name, id) in fixture.genres.into_iter().zip(&genre_ids) {
            catalog.genres.insert(*id, Genre { id: *id, name });
        }
        for book in books {
            catalog.books.insert(book.id, book);
        }
        catalog.book_genres.extend(book_genres);
        for copy in copies {
            catalog.instances.insert(copy.id, copy);
        }
        catalog.next_author_id += author_ids.len() as i32;
        catalog.next_genre_id += genre_ids.len() as i32;
        catalog.next_book_id += book_ids.len() as i32;

        tracing::info!(
            "Loaded {} authors, {} genres, {} books into the memory catalog",
            author_ids.len(),
            genre_ids.len(),
            book_ids.len()
        );
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.books.len() as i64)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.inner
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<Book>> {
        let catalog = self.inner.read().await;
        let mut books: Vec<&Book> = catalog.books.values().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(page(books, offset, limit))
    }

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let catalog = self.inner.read().await;
        let mut books: Vec<Book> = catalog
            .books
            .values()
            .filter(|b| b.author_id == Some(author_id))
            .cloned()
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(books)
    }

    async fn list_by_genre(&self, genre_id: i32) -> AppResult<Vec<Book>> {
        let catalog = self.inner.read().await;
        let mut books: Vec<Book> = catalog
            .book_genres
            .iter()
            .filter(|(_, g)| *g == genre_id)
            .filter_map(|(b, _)| catalog.books.get(b).cloned())
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(books)
    }

    async fn genres_of(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        let catalog = self.inner.read().await;
        let mut genres: Vec<Genre> = catalog
            .book_genres
            .iter()
            .filter(|(b, _)| *b == book_id)
            .filter_map(|(_, g)| catalog.genres.get(g).cloned())
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }
}

#[async_trait]
impl AuthorStore for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.authors.len() as i64)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.inner
            .read()
            .await
            .authors
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    async fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<Author>> {
        let catalog = self.inner.read().await;
        let mut authors: Vec<&Author> = catalog.authors.values().collect();
        authors.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then(a.first_name.cmp(&b.first_name))
                .then(a.id.cmp(&b.id))
        });
        Ok(page(authors, offset, limit))
    }

    async fn create(&self, input: &AuthorInput) -> AppResult<Author> {
        let mut catalog = self.inner.write().await;
        catalog.next_author_id += 1;
        let author = Author {
            id: catalog.next_author_id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            date_of_birth: input.date_of_birth,
            date_of_death: input.date_of_death,
        };
        catalog.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update(&self, id: i32, input: &AuthorInput) -> AppResult<Author> {
        let mut catalog = self.inner.write().await;
        let author = catalog
            .authors
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;
        author.first_name = input.first_name.clone();
        author.last_name = input.last_name.clone();
        author.date_of_birth = input.date_of_birth;
        author.date_of_death = input.date_of_death;
        Ok(author.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut catalog = self.inner.write().await;
        if catalog.authors.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        for book in catalog.books.values_mut() {
            if book.author_id == Some(id) {
                book.author_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GenreStore for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.genres.len() as i64)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Genre> {
        self.inner
            .read()
            .await
            .genres
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
    }

    async fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<Genre>> {
        let catalog = self.inner.read().await;
        let mut genres: Vec<&Genre> = catalog.genres.values().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page(genres, offset, limit))
    }
}

#[async_trait]
impl BookInstanceStore for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.instances.len() as i64)
    }

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let catalog = self.inner.read().await;
        Ok(catalog.instances.values().filter(|c| c.status == status).count() as i64)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        self.inner
            .read()
            .await
            .instances
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let catalog = self.inner.read().await;
        let mut copies: Vec<BookInstance> = catalog
            .instances
            .values()
            .filter(|c| c.book_id == book_id)
            .cloned()
            .collect();
        copies.sort_by_key(|c| (c.due_back.is_none(), c.due_back, c.id));
        Ok(copies)
    }

    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64> {
        Ok(self.inner.read().await.on_loan(borrower_id).len() as i64)
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<LoanedCopy>> {
        let catalog = self.inner.read().await;
        let copies = catalog.on_loan(borrower_id);
        let rows = copies
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|c| LoanedCopy {
                id: c.id,
                book_id: c.book_id,
                book_title: catalog
                    .books
                    .get(&c.book_id)
                    .map(|b| b.title.clone())
                    .unwrap_or_default(),
                imprint: c.imprint.clone(),
                due_back: c.due_back,
                status: c.status,
                borrower_id: c.borrower_id,
                is_overdue: false,
            })
            .collect();
        Ok(rows)
    }

    async fn update_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        let mut catalog = self.inner.write().await;
        let copy = catalog
            .instances
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;
        copy.due_back = Some(due_back);
        Ok(copy.clone())
    }
}
