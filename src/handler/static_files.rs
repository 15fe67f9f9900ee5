//! Static file serving module
//!
//! Serves stored files under `/static/` with `ETag` revalidation.

use crate::config::AppState;
use crate::http::{self, cache, mime, HttpResponse};
use crate::logger;
use hyper::body::Bytes;
use hyper::header::IF_NONE_MATCH;
use hyper::HeaderMap;
use tokio::fs;

/// Serve the stored file `name`; 404 if it is missing or not a regular file
pub async fn serve_stored_file(
    headers: &HeaderMap,
    is_head: bool,
    name: &str,
    state: &AppState,
) -> HttpResponse {
    // Missing files are common (404), no need to log them
    let Some(path) = state.storage.resolve(name).await else {
        return http::build_404_response();
    };

    let meta = match fs::metadata(&path).await {
        Ok(m) => m,
        Err(e) => {
            logger::log_error(&format!("Failed to stat '{}': {e}", path.display()));
            return http::build_404_response();
        }
    };

    let etag = cache::etag_from_metadata(&meta);
    let if_none_match = headers.get(IF_NONE_MATCH).and_then(|v| v.to_str().ok());
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    let content = match fs::read(&path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
            return http::build_404_response();
        }
    };

    http::build_file_response(
        Bytes::from(content),
        mime::content_type_for(&path),
        &etag,
        is_head,
    )
}
