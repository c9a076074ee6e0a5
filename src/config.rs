use crate::{
    pagination::DEFAULT_PAGE_SIZE, upload_validator::DEFAULT_MAX_FILE_SIZE, web::FORM_OVERHEAD_BYTES,
};
use clap::{Parser, builder::TypedValueParser as _};
use std::path::PathBuf;

/// Command line arguments for photo-wall
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Hostname/IP to bind the server to.
    /// If this option is specified without value, it will default to "*", meaning the server will listen on all interfaces.
    #[arg(long, env = "PHOTO_WALL_HOST", default_value = "localhost", num_args = 0..=1, default_missing_value = "*")]
    pub host: String,

    /// Port number to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory where accepted images are stored and served from under /uploads.
    #[arg(long, env = "UPLOAD_DIR", default_value = "public/uploads")]
    pub upload_dir: PathBuf,

    /// Maximum size of an uploaded file, in bytes.
    #[arg(long, env = "MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE, value_parser = parse_max_file_size)]
    pub max_file_size: u64,

    /// JSON file holding the image records.
    #[arg(long, env = "IMAGES_FILE", default_value = "images.json")]
    pub images_file: PathBuf,

    /// Directory where uploads are staged while they are received.
    #[arg(long, env = "STAGING_DIR", default_value = "tmp/incoming")]
    pub staging_dir: PathBuf,

    /// Number of images per gallery page.
    #[arg(long, env = "PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    pub page_size: usize,
}

fn parse_max_file_size(raw: &str) -> Result<u64, String> {
    let size: u64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("'{}' is not a byte count: {}", raw, e))?;
    if size == 0 {
        return Err("must be greater than zero".to_string());
    }
    // The body limit adds form overhead on top and must fit in usize.
    if usize::try_from(size).map_or(true, |s| s.checked_add(FORM_OVERHEAD_BYTES).is_none()) {
        return Err(format!("{} bytes is too large", size));
    }
    Ok(size)
}
