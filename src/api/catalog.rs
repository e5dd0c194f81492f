//! Catalog browsing endpoints: landing page, book/author/genre lists and details

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{Author, AuthorDetail, Book, BookDetail, Genre, GenreDetail, Page, PageQuery},
    services::catalog::CatalogCounts,
};

use super::{session_id, Rendered};

/// Landing page context
#[derive(Serialize, ToSchema)]
pub struct IndexContext {
    #[serde(flatten)]
    pub counts: CatalogCounts,
    /// Visits in this session before the current one
    pub num_visits: i64,
}

/// Landing page with record counts and the session visit counter
#[utoipa::path(
    get,
    path = "/catalog/",
    tag = "catalog",
    responses(
        (status = 200, description = "index.html with catalog counts", body = IndexContext)
    )
)]
pub async fn index(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let (jar, session) = session_id(jar, &state.config.session.cookie_name);

    let counts = state.services.catalog.counts().await?;
    let num_visits = state.services.sessions.record_visit(&session).await?;

    Ok((
        jar,
        Rendered::new("index.html", IndexContext { counts, num_visits }),
    ))
}

/// List books, 10 per page
#[utoipa::path(
    get,
    path = "/catalog/books/",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "catalog/book_list.html"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Rendered<Page<Book>>> {
    let page = state.services.catalog.list_books(query.page.as_deref()).await?;
    Ok(Rendered::new("catalog/book_list.html", page))
}

/// Book details
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "catalog/book_detail.html", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Rendered<BookDetail>> {
    let detail = state.services.catalog.get_book(id).await?;
    Ok(Rendered::new("catalog/book_detail.html", detail))
}

/// List authors, 10 per page
#[utoipa::path(
    get,
    path = "/catalog/authors/",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "catalog/author_list.html"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Rendered<Page<Author>>> {
    let page = state.services.catalog.list_authors(query.page.as_deref()).await?;
    Ok(Rendered::new("catalog/author_list.html", page))
}

/// Author details
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "catalog/author_detail.html", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Rendered<AuthorDetail>> {
    let detail = state.services.catalog.get_author(id).await?;
    Ok(Rendered::new("catalog/author_detail.html", detail))
}

/// List genres, 10 per page
#[utoipa::path(
    get,
    path = "/catalog/genres/",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "catalog/genre_list.html"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_genres(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Rendered<Page<Genre>>> {
    let page = state.services.catalog.list_genres(query.page.as_deref()).await?;
    Ok(Rendered::new("catalog/genre_list.html", page))
}

/// Genre details with its books
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "catalog/genre_detail.html", body = GenreDetail),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Rendered<GenreDetail>> {
    let detail = state.services.catalog.get_genre(id).await?;
    Ok(Rendered::new("catalog/genre_detail.html", detail))
}
