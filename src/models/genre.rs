//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;

/// Classification tag shared by many books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Genre with the books tagged with it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenreDetail {
    pub genre: Genre,
    pub books: Vec<Book>,
}
