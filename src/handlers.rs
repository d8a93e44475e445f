use std::path::Path;

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    data::DataError,
    error::AppError,
    models::FileStorage,
    policy::{plan_upload, ExistingUploads, UploadPlan},
    state::AppState,
    storage::Storage,
    utils::{sanitize_upload_name, split_file_name},
};

/// One file part read from the multipart body.
struct UploadedFile {
    file_name: String,
    data: Bytes,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub key: Uuid,
}

/// Upload one or more files using multipart/form-data.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<&'static str, AppError> {
    let mut files = Vec::new();

    // Every part that carries a file name is an uploaded file
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error parsing multipart: {}", e);
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(format!("Request body too large: {}", e))
        } else {
            AppError::MultipartError(format!("Failed to parse multipart form: {}", e))
        }
    })? {
        let Some(raw_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        let data = field.bytes().await.map_err(|e| {
            error!("Error reading file bytes: {}", e);
            AppError::MultipartError(format!("Failed to read the file: {}", e))
        })?;

        let file_name = sanitize_upload_name(&raw_name)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid file name '{}'.", raw_name)))?;

        files.push(UploadedFile { file_name, data });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files uploaded!".into()));
    }

    // Reject the whole batch before anything is persisted
    for file in &files {
        validate_upload(&state, file)?;
    }

    for file in files {
        store_upload(&state, file).await?;
    }

    Ok("Files uploaded successfully!")
}

fn validate_upload(state: &AppState, file: &UploadedFile) -> Result<(), AppError> {
    if file.data.is_empty() {
        return Err(AppError::BadRequest(format!("File '{}' is empty.", file.file_name)));
    }

    let file_size = file.data.len() as u64;
    if file_size > state.config.max_file_size {
        error!(
            "File size {} exceeds maximum limit of {} bytes",
            file_size,
            state.config.max_file_size
        );

        return Err(AppError::PayloadTooLarge(format!(
            "File size {} exceeds maximum limit of {} bytes",
            file_size, state.config.max_file_size
        )));
    }

    let (_, extension) = split_file_name(&file.file_name);
    if !state.config.is_extension_allowed(&extension) {
        error!("File extension '{}' is not allowed", extension);

        return Err(AppError::UnSupportedMediaType(format!(
            "File extension '{}' is not allowed",
            extension
        )));
    }

    Ok(())
}

/// Apply the naming policy to one file, commit its record, then write its bytes.
async fn store_upload(state: &AppState, file: UploadedFile) -> Result<(), AppError> {
    let uow = state.unit_of_work();
    let service = state.file_service(&uow)?;

    let primary_path = state.storage.primary_path(&file.file_name);
    let target = file.file_name.clone();
    let matches = service
        .get_all_files()
        .filter(move |f| f.file_name() == target)
        .to_vec()
        .await?;
    let existing = ExistingUploads {
        count: matches.len(),
        primary_taken: matches.iter().any(|f| Path::new(&f.path) == primary_path),
    };

    let plan = plan_upload(&file.file_name, existing)?;
    let path = match &plan {
        UploadPlan::Primary { .. } => primary_path,
        UploadPlan::Duplicate { disk_name, .. } => state.storage.duplicate_path(disk_name),
    };

    let size = file.data.len();

    // The committed row reserves the path before any bytes land on disk
    let record = service.upload_file(plan.name(), plan.extension(), &path.to_string_lossy())?;
    uow.save_changes().await.map_err(|e| match e {
        DataError::Conflict(detail) => {
            warn!("Path {:?} already claimed: {}", path, detail);
            AppError::BadRequest(format!(
                "File '{}' conflicts with an existing upload.",
                file.file_name
            ))
        }
        e => e.into(),
    })?;

    if let Err(e) = state.storage.write(&path, file.data).await {
        error!("Error writing {:?}: {}", path, e);
        service.discard(&record);
        if let Err(cleanup) = uow.save_changes().await {
            warn!("Could not remove record {} after failed write: {}", record.id, cleanup);
        }
        return Err(e.into());
    }

    info!("File uploaded: {} ({} bytes) -> {:?}", file.file_name, size, path);
    Ok(())
}

/// List every stored file record.
pub async fn get_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<FileStorage>>, AppError> {
    let uow = state.unit_of_work();
    let files = state.file_service(&uow)?.get_all_files().to_vec().await?;

    Ok(Json(files))
}

/// Delete a file and its record.
pub async fn delete_file(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<&'static str, AppError> {
    let uow = state.unit_of_work();
    state.file_service(&uow)?.delete_file(params.key).await?;
    uow.save_changes().await?;

    info!("File Deleted: {}", params.key);
    Ok("File deleted successfully.")
}

pub async fn health_check() -> &'static str {
    "OK"
}
