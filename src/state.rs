use crate::config::Config;
use crate::data::{DataContext, DataError, UnitOfWork};
use crate::models::FileStorage;
use crate::services::FileProcessingService;
use crate::storage::LocalStorage;

/// Central application state shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Entity sets registered at start-up.
    pub data: DataContext,

    /// Upload directory tree on local disk.
    pub storage: LocalStorage,

    /// Application configuration loaded from environment variables or `.env`.
    pub config: Config,
}

impl AppState {
    /// Open a fresh persistence scope for one request.
    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(self.data.clone())
    }

    /// File service whose writes are staged in `uow`.
    pub fn file_service(&self, uow: &UnitOfWork) -> Result<FileProcessingService, DataError> {
        Ok(FileProcessingService::new(
            uow.repository::<FileStorage>()?,
            self.storage.clone(),
        ))
    }
}
