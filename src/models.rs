// Defines the data structures shared between the record store, the upload
// validator and the web layer, using Serde for JSON serialization.

use serde::{Deserialize, Serialize};

/// One uploaded image as persisted in the backing file.
// Field order is the on-disk order: `url` first, then `title`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    // Public path of the stored file, e.g. "/uploads/<generated-filename>".
    pub url: String,
    // User-supplied caption. May be empty.
    pub title: String,
}

impl ImageRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// A file part as handed over by the transport layer: the bytes are already
/// on disk at `temp_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedFile {
    pub temp_path: std::path::PathBuf,
    pub size: u64,
    // Content type as reported by the client, unparsed.
    pub content_type: Option<String>,
    pub original_filename: Option<String>,
}

/// A decoded `POST /upload` form.
#[derive(Debug, Clone, Default)]
pub struct UploadSubmission {
    pub photo: Option<SubmittedFile>,
    pub title: String,
}
