//! Naming policy for repeated uploads of the same file name.
//!
//! A name may be uploaded once into the primary directory and once more into
//! the duplicates directory. Names that already carry an embedded qualifier
//! (`report.v2.txt`) get no duplicate slot.

use crate::utils::{segment_count, split_file_name};

/// Where and under which record name an upload is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPlan {
    Primary {
        name: String,
        extension: String,
        disk_name: String,
    },
    Duplicate {
        name: String,
        extension: String,
        disk_name: String,
    },
}

impl UploadPlan {
    pub fn name(&self) -> &str {
        match self {
            UploadPlan::Primary { name, .. } | UploadPlan::Duplicate { name, .. } => name,
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            UploadPlan::Primary { extension, .. } | UploadPlan::Duplicate { extension, .. } => {
                extension
            }
        }
    }

    pub fn disk_name(&self) -> &str {
        match self {
            UploadPlan::Primary { disk_name, .. } | UploadPlan::Duplicate { disk_name, .. } => {
                disk_name
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    /// Second upload of a name with an embedded qualifier.
    AlreadyUploadedOnce(String),
    /// The name already has a primary and a duplicate upload.
    LimitReached(String),
}

/// Stored records that already carry exactly the uploaded name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExistingUploads {
    pub count: usize,
    /// One of them occupies the primary directory.
    pub primary_taken: bool,
}

/// Decide what to do with `file_name` given the records already stored under it.
///
/// A freed primary slot is reused even while the duplicate survives.
pub fn plan_upload(
    file_name: &str,
    existing: ExistingUploads,
) -> Result<UploadPlan, UploadRejection> {
    let (name, extension) = split_file_name(file_name);

    match existing.count {
        0 => Ok(primary(file_name, name, extension)),
        1 if !existing.primary_taken => Ok(primary(file_name, name, extension)),
        1 if segment_count(file_name) > 2 => {
            Err(UploadRejection::AlreadyUploadedOnce(file_name.to_string()))
        }
        1 => {
            let disk_name = format!("{}_duplicate{}", name, extension);
            Ok(UploadPlan::Duplicate {
                name,
                extension,
                disk_name,
            })
        }
        _ => Err(UploadRejection::LimitReached(file_name.to_string())),
    }
}

fn primary(file_name: &str, name: String, extension: String) -> UploadPlan {
    UploadPlan::Primary {
        name,
        extension,
        disk_name: file_name.to_string(),
    }
}
