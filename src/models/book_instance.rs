//! Book instance (loanable copy) model and renewal form

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use super::form::{FormErrors, DATE_INPUT_FORMAT};

/// Days between today and the renewal date proposed to librarians
pub const PROPOSED_RENEWAL_DAYS: i64 = 21;

/// Furthest a loan may be renewed, counted from today
pub const MAX_RENEWAL_WEEKS: i64 = 4;

/// Copy availability, stored as a single character code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[serde(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.trim().parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Loanable copy of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    /// Only meaningful while on loan
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    /// Only meaningful while on loan
    pub borrower_id: Option<i32>,
}

/// Copy on loan, joined with the title of its book for loan listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanedCopy {
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
    #[sqlx(skip)]
    #[serde(default)]
    pub is_overdue: bool,
}

impl LoanedCopy {
    /// Set `is_overdue`: due before `today`; a copy with no due date never is
    pub fn mark_overdue(&mut self, today: NaiveDate) {
        self.is_overdue = self.due_back.map_or(false, |due| due < today);
    }
}

/// Librarian renewal form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// YYYY-MM-DD
    #[serde(default)]
    pub renewal_date: String,
}

impl RenewBookForm {
    /// Form pre-filled with today + 3 weeks
    pub fn proposed(today: NaiveDate) -> Self {
        let date = today + Duration::days(PROPOSED_RENEWAL_DAYS);
        Self {
            renewal_date: date.format(DATE_INPUT_FORMAT).to_string(),
        }
    }

    /// Validate the submitted date: required, not in the past, at most 4 weeks ahead
    pub fn clean(&self, today: NaiveDate) -> Result<NaiveDate, FormErrors> {
        let mut errors = FormErrors::new();
        let raw = self.renewal_date.trim();

        if raw.is_empty() {
            errors.add("renewal_date", "This field is required.");
            return Err(errors);
        }

        let date = match NaiveDate::parse_from_str(raw, DATE_INPUT_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                errors.add("renewal_date", "Enter a valid date.");
                return Err(errors);
            }
        };

        if date < today {
            errors.add("renewal_date", "Invalid date - renewal in past");
        }
        if date > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
            errors.add("renewal_date", "Invalid date - renewal more than 4 weeks ahead");
        }

        errors.into_result(date)
    }
}
