//! Fixed-size pagination for list views

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};

/// Records per page on every list view
pub const PAGINATE_BY: i64 = 10;

/// `?page=` query parameter: a 1-based number or the literal `last`
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Page arithmetic over a collection of `count` records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

impl Paginator {
    pub fn new(count: i64, per_page: i64) -> Self {
        Self { count, per_page }
    }

    /// Number of pages; an empty collection still has one (empty) page
    pub fn num_pages(&self) -> i64 {
        if self.count <= 0 {
            1
        } else {
            (self.count + self.per_page - 1) / self.per_page
        }
    }

    /// Resolve the requested page parameter to a valid page number
    pub fn validate_number(&self, requested: Option<&str>) -> AppResult<i64> {
        let number = match requested.map(str::trim) {
            None | Some("") => 1,
            Some("last") => self.num_pages(),
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                AppError::PageNotFound("That page number is not an integer".to_string())
            })?,
        };

        if number < 1 {
            return Err(AppError::PageNotFound(
                "That page number is less than 1".to_string(),
            ));
        }
        if number > self.num_pages() {
            return Err(AppError::PageNotFound(
                "That page contains no results".to_string(),
            ));
        }
        Ok(number)
    }

    /// Row offset of the first record on `number`
    pub fn offset(&self, number: i64) -> i64 {
        (number - 1) * self.per_page
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Wrap the records fetched for `number` into a page
    pub fn page<T>(&self, object_list: Vec<T>, number: i64) -> Page<T> {
        let num_pages = self.num_pages();
        Page {
            object_list,
            page_number: number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
            is_paginated: num_pages > 1,
        }
    }
}

/// One page of a list view, as handed to the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub page_number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub is_paginated: bool,
}
