// Upload validation and placement.
//
// `UploadPolicy` decides whether a staged file is acceptable without touching
// the filesystem. `UploadValidator` applies that decision through an
// `UploadStorage`: accepted files are moved into the upload directory and
// rejected ones are discarded.

use crate::models::{ImageRecord, SubmittedFile, UploadSubmission};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Accepted content types, compared case-insensitively on the essence
/// (parameters are ignored).
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpg", "image/jpeg", "image/png", "image/gif"];

pub const PUBLIC_URL_PREFIX: &str = "/uploads/";

// Attempts at finding an unused generated name before giving up.
const MAX_NAME_ATTEMPTS: usize = 8;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file was uploaded.")]
    MissingFile,
    #[error(
        "Invalid image format ({}). Use JPG, PNG or GIF.",
        .0.as_deref().unwrap_or("no content type")
    )]
    InvalidFormat(Option<String>),
    #[error("Upload error: {0}")]
    InvalidUpload(String),
    #[error("Failed to store uploaded file: {0}")]
    Storage(#[source] io::Error),
}

impl UploadError {
    /// Whether the client is at fault (as opposed to the server's disk).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, UploadError::Storage(_))
    }
}

/// Outcome of a successful policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    // Lower-case extension without the dot, e.g. "png".
    pub extension: String,
}

#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_file_size: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl UploadPolicy {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Pure decision: no I/O.
    pub fn evaluate(&self, file: &SubmittedFile) -> Result<AcceptedUpload, UploadError> {
        if file.size > self.max_file_size {
            return Err(UploadError::InvalidUpload(format!(
                "maxFileSize exceeded, received {} bytes of file data (limit {})",
                file.size, self.max_file_size
            )));
        }

        let essence = file
            .content_type
            .as_deref()
            .and_then(normalized_essence)
            .filter(|essence| ALLOWED_MIME_TYPES.contains(&essence.as_str()))
            .ok_or_else(|| UploadError::InvalidFormat(file.content_type.clone()))?;

        let extension = file
            .original_filename
            .as_deref()
            .and_then(extension_of)
            .filter(|extension| extensions_for_mime(&essence).contains(&extension.as_str()))
            .unwrap_or_else(|| extension_for_mime(&essence).to_string());

        Ok(AcceptedUpload { extension })
    }
}

// "Image/PNG; charset=binary" -> "image/png"
fn normalized_essence(raw: &str) -> Option<String> {
    let parsed: mime::Mime = raw.trim().parse().ok()?;
    Some(parsed.essence_str().to_ascii_lowercase())
}

// Keeps the original extension when it is a plain alphanumeric suffix.
fn extension_of(filename: &str) -> Option<String> {
    let extension = Path::new(filename).extension()?.to_str()?;
    if extension.is_empty()
        || extension.len() > 8
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

// Extensions a stored file may keep for an accepted type, so static serving
// never picks a non-image content type.
fn extensions_for_mime(essence: &str) -> &'static [&'static str] {
    match essence {
        "image/png" => &["png"],
        "image/gif" => &["gif"],
        _ => &["jpg", "jpeg"],
    }
}

fn extension_for_mime(essence: &str) -> &'static str {
    match essence {
        "image/png" => "png",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

pub fn generate_file_name(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4().simple(), extension)
}

/// Filesystem operations the validator needs. Swapped for a fake in tests.
pub trait UploadStorage {
    /// Whether `file_name` is already taken in the upload directory.
    fn exists(&self, file_name: &str) -> bool;
    /// Moves the staged file to `file_name` inside the upload directory.
    fn relocate(&self, temp_path: &Path, file_name: &str) -> io::Result<()>;
    /// Removes a staged file.
    fn discard(&self, temp_path: &Path) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct DiskStorage {
    upload_dir: PathBuf,
}

impl DiskStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }
}

impl UploadStorage for DiskStorage {
    fn exists(&self, file_name: &str) -> bool {
        self.upload_dir.join(file_name).exists()
    }

    fn relocate(&self, temp_path: &Path, file_name: &str) -> io::Result<()> {
        let destination = self.upload_dir.join(file_name);
        match fs::rename(temp_path, &destination) {
            Ok(()) => Ok(()),
            Err(e) => {
                // Staging and upload directories may sit on different filesystems.
                debug!(
                    "Rename {} -> {} failed ({}), falling back to copy",
                    temp_path.display(),
                    destination.display(),
                    e
                );
                fs::copy(temp_path, &destination)?;
                fs::remove_file(temp_path)
            }
        }
    }

    fn discard(&self, temp_path: &Path) -> io::Result<()> {
        fs::remove_file(temp_path)
    }
}

#[derive(Debug, Clone)]
pub struct UploadValidator<S = DiskStorage> {
    policy: UploadPolicy,
    storage: S,
}

impl<S: UploadStorage> UploadValidator<S> {
    pub fn new(policy: UploadPolicy, storage: S) -> Self {
        Self { policy, storage }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Accepts or rejects one submission.
    ///
    /// On success the staged file has been moved into the upload directory
    /// and the returned record points at it. The record is not stored;
    /// appending it is the caller's job.
    pub fn process(&self, submission: UploadSubmission) -> Result<ImageRecord, UploadError> {
        let UploadSubmission { photo, title } = submission;
        let file = photo.ok_or(UploadError::MissingFile)?;

        let accepted = match self.policy.evaluate(&file) {
            Ok(accepted) => accepted,
            Err(err) => {
                match &err {
                    UploadError::InvalidFormat(content_type) => {
                        info!("Rejected upload with content type {:?}", content_type)
                    }
                    other => info!("Rejected upload: {}", other),
                }
                self.discard_quietly(&file.temp_path);
                return Err(err);
            }
        };

        let file_name = self.unused_file_name(&accepted.extension)?;

        if let Err(e) = self.storage.relocate(&file.temp_path, &file_name) {
            self.discard_quietly(&file.temp_path);
            return Err(UploadError::Storage(e));
        }

        let record = ImageRecord::new(format!("{PUBLIC_URL_PREFIX}{file_name}"), title);
        info!("Accepted upload stored at {}", record.url);
        Ok(record)
    }

    fn unused_file_name(&self, extension: &str) -> Result<String, UploadError> {
        (0..MAX_NAME_ATTEMPTS)
            .map(|_| generate_file_name(extension))
            .find(|name| !self.storage.exists(name))
            .ok_or_else(|| {
                UploadError::Storage(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "could not generate an unused file name",
                ))
            })
    }

    // Best-effort: a failed delete is only logged.
    fn discard_quietly(&self, temp_path: &Path) {
        if let Err(e) = self.storage.discard(temp_path) {
            warn!(
                "Failed to remove staged file {}: {}",
                temp_path.display(),
                e
            );
        }
    }
}
