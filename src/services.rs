use std::{path::Path, sync::Arc};

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    data::{DataError, Query, Repository},
    models::FileStorage,
    storage::{LocalStorage, Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    OperationFailed(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// File operations expressed as repository and storage calls.
///
/// Repository writes are only staged; the caller's unit of work commits them.
pub struct FileProcessingService<S: Storage = LocalStorage> {
    repository: Arc<Repository<FileStorage>>,
    storage: S,
}

impl<S: Storage> FileProcessingService<S> {
    pub fn new(repository: Arc<Repository<FileStorage>>, storage: S) -> Self {
        Self { repository, storage }
    }

    /// Stage a new record for a file stored at `path`. Writes no bytes.
    pub fn upload_file(
        &self,
        name: &str,
        extension: &str,
        path: &str,
    ) -> Result<FileStorage, ServiceError> {
        let file = FileStorage {
            id: Uuid::new_v4(),
            name: name.to_string(),
            extension: extension.to_string(),
            path: path.to_string(),
            created_on: Utc::now(),
        };

        self.repository.add(file.clone())?;
        Ok(file)
    }

    /// Remove the file from disk and stage its record for removal.
    pub async fn delete_file(&self, id: Uuid) -> Result<(), ServiceError> {
        let file = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("no file record with id {}", id)))?;

        let path = Path::new(&file.path);
        if !self.storage.exists(path).await {
            return Err(ServiceError::NotFound(format!(
                "'{}' does not exist on disk",
                file.path
            )));
        }

        self.storage.remove(path).await.map_err(|e| match e {
            StorageError::NotFound(path) => {
                ServiceError::NotFound(format!("'{}' does not exist on disk", path))
            }
            StorageError::IoError(e) => {
                error!("Failed to delete {}: {}", file.path, e);
                ServiceError::OperationFailed(format!("could not delete '{}': {}", file.path, e))
            }
        })?;

        self.repository.remove(&file);
        info!("File {} removed from disk, record staged for removal", id);
        Ok(())
    }

    /// Stage removal of a record whose bytes never reached the disk.
    pub fn discard(&self, file: &FileStorage) {
        self.repository.remove(file);
    }

    /// Non-tracked, lazily evaluated view over every record.
    pub fn get_all_files(&self) -> Query<FileStorage> {
        self.repository.query()
    }
}
