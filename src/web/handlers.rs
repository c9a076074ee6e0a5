// Handlers for the gallery web server

use super::{
    AppState, error::ApiError, extract_request_data::extract_upload_submission, views,
};
use crate::pagination::{paginate, parse_page};
use axum::{
    extract::{Multipart, Query, State, multipart::MultipartRejection, rejection::QueryRejection},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::{debug, info};

/// Query parameters for the gallery listing
#[derive(Deserialize, Debug, Default)]
pub struct GalleryQuery {
    pub page: Option<String>,
}

// --- GET /?page=N ---
// Renders one page of the gallery, newest first
pub async fn gallery(
    State(state): State<AppState>,
    query: Result<Query<GalleryQuery>, QueryRejection>,
) -> Html<String> {
    // An unparseable query string is treated like a missing page.
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let page_number = parse_page(query.page.as_deref());

    let page = {
        let store = state.store.read().await;
        paginate(store.all(), page_number, state.page_size)
    };

    debug!(
        "Gallery request: page={}, items={}, total_pages={}",
        page.current_page,
        page.items.len(),
        page.total_pages
    );

    Html(views::render_gallery(&page).into_string())
}

// --- POST /upload ---
// Accepts a multipart form with `photo` and `title`, stores the file and
// appends a record, then redirects back to the gallery
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Redirect, ApiError> {
    let multipart = multipart.map_err(|e| {
        ApiError::BadRequest(format!("Upload error: {}", e.body_text()))
    })?;

    let submission =
        extract_upload_submission(multipart, &state.staging_dir, state.max_file_size()).await?;

    // Moving the file is blocking filesystem work
    let validator = state.validator.clone();
    let record = tokio::task::spawn_blocking(move || validator.process(submission))
        .await
        .map_err(|e| ApiError::InternalServerError(format!("Upload task failed: {}", e)))??;

    let mut store = state.store.write().await;
    store.append(record)?;
    info!("Gallery now holds {} image(s)", store.len());

    Ok(Redirect::to("/"))
}
