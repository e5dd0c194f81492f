//! Loan listings and librarian renewals

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        BookInstance, FormOutcome, LoanedCopy, Page, Paginator, RenewBookForm, PAGINATE_BY,
    },
    repository::Repository,
};

/// Current local date, the reference for renewal proposals and checks
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Copies on loan to `borrower_id`, earliest due first
    pub async fn borrowed_by(
        &self,
        borrower_id: i32,
        page: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<Page<LoanedCopy>> {
        self.on_loan_page(Some(borrower_id), page, today).await
    }

    /// Every copy on loan, whoever borrowed it, earliest due first
    pub async fn all_borrowed(
        &self,
        page: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<Page<LoanedCopy>> {
        self.on_loan_page(None, page, today).await
    }

    async fn on_loan_page(
        &self,
        borrower_id: Option<i32>,
        page: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<Page<LoanedCopy>> {
        let instances = &self.repository.book_instances;
        let paginator = Paginator::new(instances.count_on_loan(borrower_id).await?, PAGINATE_BY);
        let number = paginator.validate_number(page)?;
        tracing::debug!(
            "Listing loans for {:?}, page {}/{}",
            borrower_id,
            number,
            paginator.num_pages()
        );

        let mut copies = instances
            .list_on_loan(borrower_id, paginator.offset(number), paginator.per_page())
            .await?;
        for copy in &mut copies {
            copy.mark_overdue(today);
        }
        Ok(paginator.page(copies, number))
    }

    /// Copy targeted by a renewal
    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        tracing::debug!("Fetching book instance {}", id);
        self.repository.book_instances.get_by_id(id).await
    }

    /// Validate a renewal submission and, when valid, store the new due date
    pub async fn renew(
        &self,
        id: Uuid,
        form: &RenewBookForm,
        today: NaiveDate,
    ) -> AppResult<FormOutcome<BookInstance>> {
        // 404 takes precedence over form errors
        self.repository.book_instances.get_by_id(id).await?;

        let renewal_date = match form.clean(today) {
            Ok(date) => date,
            Err(errors) => return Ok(FormOutcome::Invalid(errors)),
        };

        let renewed = self
            .repository
            .book_instances
            .update_due_back(id, renewal_date)
            .await?;
        tracing::info!("Renewed book instance {} until {}", id, renewal_date);
        Ok(FormOutcome::Saved(renewed))
    }
}
