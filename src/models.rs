use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::data::Entity;


/// Metadata row describing one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileStorage {
    pub id: Uuid,
    /// Base file name without the extension.
    pub name: String,
    /// Extension including the leading dot, empty when the file has none.
    pub extension: String,
    /// Absolute location of the bytes on disk.
    pub path: String,
    pub created_on: DateTime<Utc>,
}

impl FileStorage {
    /// The file name as it was uploaded: name followed by extension.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }
}

impl Entity for FileStorage {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }

    fn validate(&self) -> Result<(), String> {
        // A dot-leading upload such as `.txt` keeps an empty name
        if self.name.is_empty() && self.extension.is_empty() {
            return Err("file name must not be empty".to_string());
        }
        if self.path.is_empty() {
            return Err("file path must not be empty".to_string());
        }
        Ok(())
    }
}
