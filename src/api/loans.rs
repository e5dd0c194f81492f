//! Loan endpoints: borrowed books listings and librarian renewal

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    Form,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        BookInstance, FormOutcome, FormState, LoanedCopy, Page, PageQuery, RenewBookForm,
        CAN_MARK_RETURNED,
    },
    services::loans::today,
};

use super::{found, path_param, submitted, CurrentUser, Rendered};

/// Where a successful renewal sends the librarian
pub const ALL_BORROWED_PATH: &str = "/catalog/borrowed/";

/// Renewal page context
#[derive(Serialize)]
pub struct RenewContext {
    pub form: FormState<RenewBookForm>,
    pub bookinst: BookInstance,
}

/// Books on loan to the current user
#[utoipa::path(
    get,
    path = "/catalog/mybooks/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "catalog/bookinstance_list_borrowed_user.html"),
        (status = 302, description = "Not logged in, redirected to the login page"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn my_borrowed(
    State(state): State<crate::AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Rendered<Page<LoanedCopy>>> {
    let claims = user.require_authenticated()?;

    let page = state
        .services
        .loans
        .borrowed_by(claims.user_id, query.page.as_deref(), today())
        .await?;
    Ok(Rendered::new(
        "catalog/bookinstance_list_borrowed_user.html",
        page,
    ))
}

/// Every book on loan, for librarians
#[utoipa::path(
    get,
    path = "/catalog/borrowed/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "catalog/bookinstance_list_borrowed_all.html"),
        (status = 302, description = "Not logged in, redirected to the login page"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Rendered<Page<LoanedCopy>>> {
    user.require_permission(CAN_MARK_RETURNED)?;

    let page = state
        .services
        .loans
        .all_borrowed(query.page.as_deref(), today())
        .await?;
    Ok(Rendered::new(
        "catalog/bookinstance_list_borrowed_all.html",
        page,
    ))
}

/// Renewal form pre-filled with today + 3 weeks
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "catalog/book_renew_librarian.html"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_book_form(
    State(state): State<crate::AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Rendered<RenewContext>> {
    user.require_permission(CAN_MARK_RETURNED)?;
    let id = path_param(path)?;

    let bookinst = state.services.loans.get_instance(id).await?;
    Ok(Rendered::new(
        "catalog/book_renew_librarian.html",
        RenewContext {
            form: FormState::initial(RenewBookForm::proposed(today())),
            bookinst,
        },
    ))
}

/// Store a new due date, or show the form again with its errors
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    request_body(content = RenewBookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Renewed, redirected to the all-borrowed list"),
        (status = 200, description = "Invalid date, form shown again with errors"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_book(
    State(state): State<crate::AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    form: Result<Form<RenewBookForm>, FormRejection>,
) -> AppResult<Response> {
    user.require_permission(CAN_MARK_RETURNED)?;
    let id = path_param(path)?;
    let form = submitted(form);

    match state.services.loans.renew(id, &form, today()).await? {
        FormOutcome::Saved(_) => Ok(found(ALL_BORROWED_PATH)),
        FormOutcome::Invalid(errors) => {
            let bookinst = state.services.loans.get_instance(id).await?;
            Ok(Rendered::new(
                "catalog/book_renew_librarian.html",
                RenewContext {
                    form: FormState::with_errors(form, errors),
                    bookinst,
                },
            )
            .into_response())
        }
    }
}
