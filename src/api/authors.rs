//! Author management endpoints (create, update, delete)

use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::{IntoResponse, Response},
    Form,
};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Author, AuthorForm, FormOutcome, FormState},
};

use super::{found, submitted, Rendered};

const AUTHOR_FORM_TEMPLATE: &str = "catalog/author_form.html";
const AUTHOR_LIST_PATH: &str = "/catalog/authors/";

fn author_detail_path(id: i32) -> String {
    format!("/catalog/author/{}", id)
}

/// Create/update form context; `author` is set when editing
#[derive(Serialize)]
pub struct AuthorFormContext {
    pub form: FormState<AuthorForm>,
    pub author: Option<Author>,
}

#[derive(Serialize)]
pub struct AuthorDeleteContext {
    pub author: Author,
}

/// Blank author form
#[utoipa::path(
    get,
    path = "/catalog/author/create/",
    tag = "authors",
    responses((status = 200, description = "catalog/author_form.html"))
)]
pub async fn create_form() -> Rendered<AuthorFormContext> {
    Rendered::new(
        AUTHOR_FORM_TEMPLATE,
        AuthorFormContext {
            form: FormState::initial(AuthorForm::initial()),
            author: None,
        },
    )
}

/// Create an author
#[utoipa::path(
    post,
    path = "/catalog/author/create/",
    tag = "authors",
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Created, redirected to the author page"),
        (status = 200, description = "Invalid input, form shown again with errors")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    form: Result<Form<AuthorForm>, FormRejection>,
) -> AppResult<Response> {
    let form = submitted(form);
    match state.services.authors.create(&form).await? {
        FormOutcome::Saved(author) => Ok(found(&author_detail_path(author.id))),
        FormOutcome::Invalid(errors) => Ok(Rendered::new(
            AUTHOR_FORM_TEMPLATE,
            AuthorFormContext {
                form: FormState::with_errors(form, errors),
                author: None,
            },
        )
        .into_response()),
    }
}

/// Author form filled with the stored values
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update/",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "catalog/author_form.html"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_form(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Rendered<AuthorFormContext>> {
    let author = state.services.authors.get(id).await?;
    Ok(Rendered::new(
        AUTHOR_FORM_TEMPLATE,
        AuthorFormContext {
            form: FormState::initial(AuthorForm::from_author(&author)),
            author: Some(author),
        },
    ))
}

/// Save changes to an author
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update/",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Saved, redirected to the author page"),
        (status = 200, description = "Invalid input, form shown again with errors"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    form: Result<Form<AuthorForm>, FormRejection>,
) -> AppResult<Response> {
    let form = submitted(form);
    match state.services.authors.update(id, &form).await? {
        FormOutcome::Saved(author) => Ok(found(&author_detail_path(author.id))),
        FormOutcome::Invalid(errors) => {
            let author = state.services.authors.get(id).await?;
            Ok(Rendered::new(
                AUTHOR_FORM_TEMPLATE,
                AuthorFormContext {
                    form: FormState::with_errors(form, errors),
                    author: Some(author),
                },
            )
            .into_response())
        }
    }
}

/// Deletion confirmation page
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/delete/",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "catalog/author_confirm_delete.html"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_confirm(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Rendered<AuthorDeleteContext>> {
    let author = state.services.authors.get(id).await?;
    Ok(Rendered::new(
        "catalog/author_confirm_delete.html",
        AuthorDeleteContext { author },
    ))
}

/// Delete an author
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete/",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 302, description = "Deleted, redirected to the author list"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    state.services.authors.delete(id).await?;
    Ok(found(AUTHOR_LIST_PATH))
}
