use super::{AppState, FORM_OVERHEAD_BYTES, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::Level;

pub fn create_app(state: AppState) -> Router {
    let body_limit =
        usize::try_from(state.max_file_size()).unwrap_or(usize::MAX).saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        // Paginated gallery listing
        .route("/", get(handlers::gallery))
        // Upload form target
        .route("/upload", post(handlers::upload))
        // Stored images
        .nest_service("/uploads", ServeDir::new(&state.upload_dir))
        // Cap request bodies; the file size itself is enforced while streaming
        .layer(DefaultBodyLimit::max(body_limit))
        // Add tracing for HTTP requests and responses
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)))
        // Provide the shared state
        .with_state(state)
}
