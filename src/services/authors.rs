//! Author record management

use crate::{
    error::AppResult,
    models::{Author, AuthorForm, FormOutcome},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create(&self, form: &AuthorForm) -> AppResult<FormOutcome<Author>> {
        let input = match form.clean() {
            Ok(input) => input,
            Err(errors) => return Ok(FormOutcome::Invalid(errors)),
        };

        let author = self.repository.authors.create(&input).await?;
        tracing::info!("Created author {} ({})", author.id, author.display_name());
        Ok(FormOutcome::Saved(author))
    }

    pub async fn update(&self, id: i32, form: &AuthorForm) -> AppResult<FormOutcome<Author>> {
        self.repository.authors.get_by_id(id).await?;

        let input = match form.clean() {
            Ok(input) => input,
            Err(errors) => return Ok(FormOutcome::Invalid(errors)),
        };

        let author = self.repository.authors.update(id, &input).await?;
        tracing::info!("Updated author {} ({})", author.id, author.display_name());
        Ok(FormOutcome::Saved(author))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author {}", id);
        Ok(())
    }
}
