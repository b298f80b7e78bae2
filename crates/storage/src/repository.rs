use async_trait::async_trait;
use exam_core::model::{
    ApplicationId, ApplicationRecord, Attempt, ExamOutcome, UserId, first_active,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Per-user store of the most recent completed attempt.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Fetch the last attempt of a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when the stored row is malformed,
    /// or other storage errors.
    async fn get_attempt(&self, user_id: UserId) -> Result<Option<Attempt>, StorageError>;

    /// Store an attempt, replacing any previous attempt of the same user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn put_attempt(&self, attempt: &Attempt) -> Result<(), StorageError>;
}

/// Application records the exam outcome is attached to.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Persist or replace an application record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_application(&self, record: &ApplicationRecord) -> Result<(), StorageError>;

    /// Fetch an application by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_application(&self, id: ApplicationId) -> Result<ApplicationRecord, StorageError>;

    /// First active application of the user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if records cannot be read.
    async fn find_active_application(
        &self,
        user_id: UserId,
    ) -> Result<Option<ApplicationRecord>, StorageError>;

    /// Embed an exam outcome in an application, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the application does not exist.
    async fn attach_exam(
        &self,
        id: ApplicationId,
        outcome: &ExamOutcome,
    ) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    attempts: Arc<Mutex<HashMap<UserId, Attempt>>>,
    applications: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(Mutex::new(HashMap::new())),
            applications: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn get_attempt(&self, user_id: UserId) -> Result<Option<Attempt>, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&user_id).cloned())
    }

    async fn put_attempt(&self, attempt: &Attempt) -> Result<(), StorageError> {
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(attempt.user_id(), attempt.clone());
        Ok(())
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryRepository {
    async fn upsert_application(&self, record: &ApplicationRecord) -> Result<(), StorageError> {
        let mut guard = self
            .applications
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.id, record.clone());
        Ok(())
    }

    async fn get_application(&self, id: ApplicationId) -> Result<ApplicationRecord, StorageError> {
        let guard = self
            .applications
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn find_active_application(
        &self,
        user_id: UserId,
    ) -> Result<Option<ApplicationRecord>, StorageError> {
        let guard = self
            .applications
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut owned: Vec<&ApplicationRecord> =
            guard.values().filter(|r| r.user_id == user_id).collect();
        owned.sort_by_key(|r| (r.created_at, r.id));
        Ok(first_active(owned).cloned())
    }

    async fn attach_exam(
        &self,
        id: ApplicationId,
        outcome: &ExamOutcome,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .applications
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        record.exam = Some(outcome.clone());
        Ok(())
    }
}

/// Aggregates storage backends behind trait objects for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub attempts: Arc<dyn AttemptRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo.clone());
        let applications: Arc<dyn ApplicationRepository> = Arc::new(repo);
        Self {
            attempts,
            applications,
        }
    }
}
