//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    book::Book,
    form::{parse_optional_date, FormErrors, DATE_INPUT_FORMAT},
};

/// Author record from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last, First" as shown in lists
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Author with the books attributed to them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

/// Cleaned author values ready to be stored
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorInput {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Initial "date of death" offered by the create form
pub fn default_date_of_death() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 12, 10).unwrap_or_default()
}

/// Raw author form as submitted (urlencoded) or pre-filled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct AuthorForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    /// YYYY-MM-DD, blank for unknown
    #[serde(default)]
    pub date_of_birth: String,
    /// YYYY-MM-DD, blank for still living
    #[serde(default)]
    pub date_of_death: String,
}

impl AuthorForm {
    /// Blank create form
    pub fn initial() -> Self {
        Self {
            date_of_death: default_date_of_death().format(DATE_INPUT_FORMAT).to_string(),
            ..Self::default()
        }
    }

    /// Update form filled with the stored values
    pub fn from_author(author: &Author) -> Self {
        let fmt = |d: Option<NaiveDate>| {
            d.map(|d| d.format(DATE_INPUT_FORMAT).to_string())
                .unwrap_or_default()
        };
        Self {
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: fmt(author.date_of_birth),
            date_of_death: fmt(author.date_of_death),
        }
    }

    /// Validate the submission and convert it to storable values
    pub fn clean(&self) -> Result<AuthorInput, FormErrors> {
        let trimmed = Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            date_of_birth: self.date_of_birth.clone(),
            date_of_death: self.date_of_death.clone(),
        };

        let mut errors = match trimmed.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };
        let date_of_birth =
            parse_optional_date(&mut errors, "date_of_birth", &trimmed.date_of_birth);
        let date_of_death =
            parse_optional_date(&mut errors, "date_of_death", &trimmed.date_of_death);

        errors.into_result(AuthorInput {
            first_name: trimmed.first_name,
            last_name: trimmed.last_name,
            date_of_birth,
            date_of_death,
        })
    }
}
