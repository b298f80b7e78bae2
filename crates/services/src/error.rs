//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::SessionError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while running an exam.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    /// No authenticated candidate; the front end should send the user to login.
    #[error("no authenticated candidate")]
    IdentityMissing,
    #[error("exam was abandoned before it finished")]
    Abandoned,
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors emitted while bootstrapping exam services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
