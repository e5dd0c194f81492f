//! Catalog browsing: landing page counts, book/author/genre lists and details

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        Author, AuthorDetail, Book, BookDetail, Genre, GenreDetail, LoanStatus, Page, Paginator,
        PAGINATE_BY,
    },
    repository::Repository,
};

/// Record counts shown on the landing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogCounts {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Aggregate counts for the landing page
    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        Ok(CatalogCounts {
            num_books: self.repository.books.count().await?,
            num_instances: self.repository.book_instances.count().await?,
            num_instances_available: self
                .repository
                .book_instances
                .count_by_status(LoanStatus::Available)
                .await?,
            num_authors: self.repository.authors.count().await?,
            num_genres: self.repository.genres.count().await?,
        })
    }

    /// Page of books ordered by title
    pub async fn list_books(&self, page: Option<&str>) -> AppResult<Page<Book>> {
        let paginator = Paginator::new(self.repository.books.count().await?, PAGINATE_BY);
        let number = paginator.validate_number(page)?;
        tracing::debug!("Listing books page {}/{}", number, paginator.num_pages());
        let books = self
            .repository
            .books
            .list_page(paginator.offset(number), paginator.per_page())
            .await?;
        Ok(paginator.page(books, number))
    }

    /// Book with its author, genres and copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetail> {
        tracing::debug!("Fetching book {}", id);
        let book = self.repository.books.get_by_id(id).await?;
        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors.get_by_id(author_id).await?),
            None => None,
        };
        let genres = self.repository.books.genres_of(id).await?;
        let copies = self.repository.book_instances.list_for_book(id).await?;

        Ok(BookDetail {
            book,
            author,
            genres,
            copies,
        })
    }

    /// Page of authors ordered by last then first name
    pub async fn list_authors(&self, page: Option<&str>) -> AppResult<Page<Author>> {
        let paginator = Paginator::new(self.repository.authors.count().await?, PAGINATE_BY);
        let number = paginator.validate_number(page)?;
        tracing::debug!("Listing authors page {}/{}", number, paginator.num_pages());
        let authors = self
            .repository
            .authors
            .list_page(paginator.offset(number), paginator.per_page())
            .await?;
        Ok(paginator.page(authors, number))
    }

    /// Author with the books attributed to them
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetail> {
        tracing::debug!("Fetching author {}", id);
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetail { author, books })
    }

    /// Page of genres ordered by name
    pub async fn list_genres(&self, page: Option<&str>) -> AppResult<Page<Genre>> {
        let paginator = Paginator::new(self.repository.genres.count().await?, PAGINATE_BY);
        let number = paginator.validate_number(page)?;
        tracing::debug!("Listing genres page {}/{}", number, paginator.num_pages());
        let genres = self
            .repository
            .genres
            .list_page(paginator.offset(number), paginator.per_page())
            .await?;
        Ok(paginator.page(genres, number))
    }

    /// Genre with the books tagged with it
    pub async fn get_genre(&self, id: i32) -> AppResult<GenreDetail> {
        tracing::debug!("Fetching genre {}", id);
        let genre = self.repository.genres.get_by_id(id).await?;
        let books = self.repository.books.list_by_genre(id).await?;
        Ok(GenreDetail { genre, books })
    }

    /// Cheap round trip to storage for readiness probes
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.count().await.map(|_| ())
    }
}
