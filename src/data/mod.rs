// Generic data access: entity sets, repositories and the unit of work
mod context;
mod postgres;
mod query;
mod repository;
mod unit_of_work;

#[cfg(test)]
pub mod memory;

use std::{fmt::Debug, hash::Hash};

use async_trait::async_trait;
use thiserror::Error;

pub use context::{DataContext, DataContextBuilder};
pub use postgres::PgFileSet;
pub use query::Query;
pub use repository::{EntityState, Repository};
pub use unit_of_work::UnitOfWork;

// Data layer error types
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String), // Entity rejected before it was staged

    #[error("Conflict: {0}")]
    Conflict(String), // Unique constraint violated on commit

    #[error("No entity set registered for {0}")]
    UnknownEntity(&'static str),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DataError::Conflict(db_err.message().to_string())
            }
            _ => DataError::Database(err),
        }
    }
}

/// A persisted type the repositories can track.
pub trait Entity: Clone + Send + Sync + 'static {
    type Key: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn key(&self) -> Self::Key;

    /// Checked before an entity is staged for insert or update.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A staged write, produced when a repository flushes.
#[derive(Debug, Clone)]
pub enum Change<T: Entity> {
    Insert(T),
    Update(T),
    Delete(T::Key),
}

/// Persistence backend for a single entity type.
#[async_trait]
pub trait EntitySet<T: Entity>: Send + Sync {
    /// Look up one entity by key.
    async fn find(&self, key: T::Key) -> Result<Option<T>, DataError>;

    /// Load every entity in insertion order.
    async fn load_all(&self) -> Result<Vec<T>, DataError>;

    /// Apply all changes in one transaction.
    /// Returns the number of affected rows; nothing is applied on error.
    async fn apply(&self, changes: Vec<Change<T>>) -> Result<u64, DataError>;
}
