//! HTTP handlers for the catalog
//!
//! Handlers answer with a [`Rendered`] page (template name plus context, left
//! to an external renderer) or a redirect.

pub mod authors;
pub mod catalog;
pub mod health;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::{
        rejection::{FormRejection, PathRejection},
        FromRequestParts, OriginalUri, Path,
    },
    http::{header::AUTHORIZATION, header::LOCATION, request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use axum_extra::{
    extract::cookie::{Cookie, CookieJar},
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
    AppState,
};

/// Page produced by a handler: template name and its context
#[derive(Debug, Serialize)]
pub struct Rendered<C> {
    pub template: &'static str,
    pub context: C,
}

impl<C> Rendered<C> {
    pub fn new(template: &'static str, context: C) -> Self {
        Self { template, context }
    }
}

impl<C: Serialize> IntoResponse for Rendered<C> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// 302 Found to `location`
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// Submitted form data; a missing or unreadable body counts as an empty form
pub fn submitted<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(data)) => data,
        Err(rejection) => {
            tracing::debug!("Treating unreadable form body as empty: {}", rejection);
            T::default()
        }
    }
}

/// Path parameter, resolved after the access guard so anonymous visitors are
/// redirected to log in whatever the path holds
pub fn path_param<T>(path: Result<Path<T>, PathRejection>) -> AppResult<T> {
    path.map(|Path(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Requesting user, if any, plus where to send them to log in
pub struct CurrentUser {
    claims: Option<UserClaims>,
    login_redirect: String,
}

impl CurrentUser {
    /// Guard for login-gated views
    pub fn require_authenticated(&self) -> Result<&UserClaims, AppError> {
        self.claims
            .as_ref()
            .ok_or_else(|| AppError::LoginRequired(self.login_redirect.clone()))
    }

    /// Guard for permission-gated views; anonymous visitors are sent to log in
    pub fn require_permission(&self, permission: &str) -> Result<&UserClaims, AppError> {
        let claims = self.require_authenticated()?;
        claims.require_permission(permission)?;
        Ok(claims)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        let next = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());
        let login_redirect = format!(
            "{}?next={}",
            state.config.auth.login_url,
            encode_query_value(&next)
        );

        // No header at all means an anonymous visitor
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(CurrentUser {
                claims: None,
                login_redirect,
            });
        }

        let bearer = parts
            .headers
            .typed_try_get::<Authorization<Bearer>>()
            .ok()
            .flatten()
            .ok_or_else(|| {
                AppError::Authentication("Invalid authorization header format".to_string())
            })?;

        let claims = UserClaims::from_token(bearer.token(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(CurrentUser {
            claims: Some(claims),
            login_redirect,
        })
    }
}

/// Session id from the cookie, minting a new one (and its cookie) when absent
pub fn session_id(jar: CookieJar, cookie_name: &str) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(cookie_name) {
        if Uuid::parse_str(cookie.value()).is_ok() {
            let id = cookie.value().to_string();
            return (jar, id);
        }
    }

    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((cookie_name.to_string(), id.clone()))
        .path("/")
        .http_only(true)
        .build();
    (jar.add(cookie), id)
}

/// Percent-encode a path and query for use as a query value, keeping `/`
fn encode_query_value(value: &str) -> String {
    value
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { Redirect::permanent("/catalog/") }))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Browsing
        .route("/catalog/", get(catalog::index))
        .route("/catalog/books/", get(catalog::list_books))
        .route("/catalog/book/:id", get(catalog::get_book))
        .route("/catalog/authors/", get(catalog::list_authors))
        .route("/catalog/author/:id", get(catalog::get_author))
        .route("/catalog/genres/", get(catalog::list_genres))
        .route("/catalog/genre/:id", get(catalog::get_genre))
        // Loans
        .route("/catalog/mybooks/", get(loans::my_borrowed))
        .route("/catalog/borrowed/", get(loans::all_borrowed))
        .route(
            "/catalog/book/:id/renew/",
            get(loans::renew_book_form).post(loans::renew_book),
        )
        // Author management
        .route(
            "/catalog/author/create/",
            get(authors::create_form).post(authors::create_author),
        )
        .route(
            "/catalog/author/:id/update/",
            get(authors::update_form).post(authors::update_author),
        )
        .route(
            "/catalog/author/:id/delete/",
            get(authors::delete_confirm).post(authors::delete_author),
        )
        .with_state(state)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
