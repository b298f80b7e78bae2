#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    ApplicationRepository, AttemptRepository, InMemoryRepository, Storage, StorageError,
};
