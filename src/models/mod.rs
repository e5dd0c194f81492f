//! Data models for the Local Library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod form;
pub mod genre;
pub mod page;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetail, AuthorForm, AuthorInput};
pub use book::{Book, BookDetail};
pub use book_instance::{BookInstance, LoanStatus, LoanedCopy, RenewBookForm};
pub use form::{FormErrors, FormOutcome, FormState};
pub use genre::{Genre, GenreDetail};
pub use page::{Page, PageQuery, Paginator, PAGINATE_BY};
pub use user::{UserClaims, CAN_MARK_RETURNED};
