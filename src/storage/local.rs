use std::path::{Path, PathBuf};
use bytes::Bytes;
use super::{Storage, StorageError};
use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};

// Local filesystem storage
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf, // Directory for first uploads
    duplicates_path: PathBuf, // Directory for second uploads of the same name
}

impl LocalStorage {
    /// Creates a new LocalStorage instance and ensures both directories exist
    pub async fn new(base_path: &Path, duplicates_path: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(base_path).await?;
        fs::create_dir_all(duplicates_path).await?;
        tracing::info!("Local storage ready at {:?}", base_path);
        Ok(Self {
            base_path: base_path.to_path_buf(),
            duplicates_path: duplicates_path.to_path_buf(),
        })
    }

    /// Location of a first upload
    pub fn primary_path(&self, file_name: &str) -> PathBuf {
        self.base_path.join(file_name)
    }

    /// Location of a duplicate upload
    pub fn duplicate_path(&self, file_name: &str) -> PathBuf {
        self.duplicates_path.join(file_name)
    }
}

#[async_trait]
impl Storage for LocalStorage {

    /// Writes content to a file on the local filesystem
    async fn write(&self, path: &Path, content: Bytes) -> Result<(), StorageError> {
        // Ensure parent directories exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Create the file and write content
        let mut file = fs::File::create(path).await?;
        file.write_all(&content).await?;
        file.flush().await?;

        tracing::info!("Saved file at {:?}", path);
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Deletes a file from local filesystem
    async fn remove(&self, path: &Path) -> Result<(), StorageError> {
        if !self.exists(path).await {
            return Err(StorageError::NotFound(path.display().to_string()));
        }

        fs::remove_file(path).await?;
        tracing::info!("Removed file at {:?}", path);
        Ok(())
    }
}
