//! Error Types
//!
//! `StoreError` is what every entity operation returns; the request layer maps
//! each variant onto a status code. `FixtureError` only happens at startup.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::EntityKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("Field {field} is required")]
    MissingField {
        kind: EntityKind,
        field: &'static str,
    },

    #[error("Invalid {kind} record: {message}")]
    InvalidRecord { kind: EntityKind, message: String },

    #[error("{kind} with id {id} already exists")]
    DuplicateKey { kind: EntityKind, id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse fixture {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to seed fixtures: {0}")]
    Store(#[from] StoreError),
}
