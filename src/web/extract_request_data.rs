use crate::{
    models::{SubmittedFile, UploadSubmission},
    upload_validator::UploadError,
};
use axum::extract::{Multipart, multipart::Field};
use std::path::Path;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

pub const PHOTO_FIELD: &str = "photo";
pub const TITLE_FIELD: &str = "title";

/// Reads a `POST /upload` form, streaming the `photo` part into
/// `staging_dir`. Never holds more than one chunk of the file in memory.
///
/// Any staged file is removed again if a later part of the form fails.
pub async fn extract_upload_submission(
    mut multipart: Multipart,
    staging_dir: &Path,
    max_file_size: u64,
) -> Result<UploadSubmission, UploadError> {
    let mut submission = UploadSubmission::default();

    if let Err(err) = read_fields(&mut multipart, &mut submission, staging_dir, max_file_size).await
    {
        if let Some(photo) = submission.photo.take() {
            remove_staged(&photo.temp_path).await;
        }
        return Err(err);
    }

    Ok(submission)
}

async fn read_fields(
    multipart: &mut Multipart,
    submission: &mut UploadSubmission,
    staging_dir: &Path,
    max_file_size: u64,
) -> Result<(), UploadError> {
    let mut ignored_fields = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::InvalidUpload(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(PHOTO_FIELD) => {
                if submission.photo.is_some() {
                    warn!("Multiple 'photo' fields found in upload, keeping the first one");
                    continue;
                }
                submission.photo = stage_file(field, staging_dir, max_file_size).await?;
            }
            Some(TITLE_FIELD) => {
                submission.title = field
                    .text()
                    .await
                    .map_err(|e| UploadError::InvalidUpload(e.body_text()))?;
            }
            other => {
                debug!("Ignoring multipart field: {}", other.unwrap_or("unnamed"));
                ignored_fields += 1;
            }
        }
    }

    if ignored_fields > 0 {
        debug!("Ignored {} unknown fields in upload form", ignored_fields);
    }

    Ok(())
}

// Returns `None` for the empty part a browser sends when no file was chosen.
async fn stage_file(
    field: Field<'_>,
    staging_dir: &Path,
    max_file_size: u64,
) -> Result<Option<SubmittedFile>, UploadError> {
    let original_filename = field
        .file_name()
        .map(str::to_string)
        .filter(|name| !name.is_empty());
    let content_type = field.content_type().map(str::to_string);
    debug!(
        "Receiving file {:?} with content type {:?}",
        original_filename, content_type
    );

    let temp_path = staging_dir.join(format!("upload_{}", Uuid::new_v4().simple()));

    let size = match write_field(field, &temp_path, max_file_size).await {
        Ok(size) => size,
        Err(err) => {
            remove_staged(&temp_path).await;
            return Err(err);
        }
    };

    if size == 0 {
        remove_staged(&temp_path).await;
        return match original_filename {
            None => Ok(None),
            Some(_) => Err(UploadError::InvalidUpload(
                "Uploaded 'photo' field is empty.".to_string(),
            )),
        };
    }

    Ok(Some(SubmittedFile {
        temp_path,
        size,
        content_type,
        original_filename,
    }))
}

async fn write_field(
    mut field: Field<'_>,
    temp_path: &Path,
    max_file_size: u64,
) -> Result<u64, UploadError> {
    let mut file = fs::File::create(temp_path)
        .await
        .map_err(UploadError::Storage)?;
    let mut size: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| UploadError::InvalidUpload(e.body_text()))?
    {
        size += chunk.len() as u64;
        if size > max_file_size {
            return Err(UploadError::InvalidUpload(format!(
                "maxFileSize exceeded, received {} bytes of file data (limit {})",
                size, max_file_size
            )));
        }
        file.write_all(&chunk).await.map_err(UploadError::Storage)?;
    }

    file.flush().await.map_err(UploadError::Storage)?;
    Ok(size)
}

async fn remove_staged(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove staged file {}: {}", temp_path.display(), e);
        }
    }
}
