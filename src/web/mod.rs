// Web server module
// Handles the gallery listing, the upload form endpoint and static files

mod app;
mod error;
mod extract_request_data;
mod handlers;
mod listeners;
mod views;

pub use app::create_app;
pub use listeners::create_listener;

use crate::{record_store::RecordStore, upload_validator::UploadValidator};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::RwLock;

// Room for the multipart framing and the title field on top of the file itself
pub const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub type SharedRecordStore = Arc<RwLock<RecordStore>>;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedRecordStore,
    pub validator: Arc<UploadValidator>,
    pub upload_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub page_size: usize,
}

impl AppState {
    pub fn max_file_size(&self) -> u64 {
        self.validator.policy().max_file_size
    }
}
