//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, catalog, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library API",
        version = "0.1.0",
        description = "Library catalog browsing, loans and author management",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::index,
        catalog::list_books,
        catalog::get_book,
        catalog::list_authors,
        catalog::get_author,
        catalog::list_genres,
        catalog::get_genre,
        // Loans
        loans::my_borrowed,
        loans::all_borrowed,
        loans::renew_book_form,
        loans::renew_book,
        // Authors
        authors::create_form,
        authors::create_author,
        authors::update_form,
        authors::update_author,
        authors::delete_confirm,
        authors::delete_author,
    ),
    components(
        schemas(
            // Catalog
            crate::models::book::Book,
            crate::models::book::BookDetail,
            crate::models::author::Author,
            crate::models::author::AuthorDetail,
            crate::models::author::AuthorForm,
            crate::models::genre::Genre,
            crate::models::genre::GenreDetail,
            crate::services::catalog::CatalogCounts,
            catalog::IndexContext,
            // Loans
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::LoanedCopy,
            crate::models::book_instance::RenewBookForm,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Catalog browsing"),
        (name = "loans", description = "Borrowed books and renewals"),
        (name = "authors", description = "Author management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
