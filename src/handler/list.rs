//! List handler
//!
//! `GET /list`: public paths of every entry in the storage directory, in
//! directory enumeration order.

use super::public_path;
use crate::config::AppState;
use crate::http::{self, HttpResponse};
use crate::logger;
use hyper::StatusCode;

/// Handle `GET /list`
pub async fn handle_list(state: &AppState) -> HttpResponse {
    match state.storage.list().await {
        Ok(names) => {
            logger::log_listing(names.len());
            let paths: Vec<String> = names.iter().map(|name| public_path(name)).collect();
            http::success(StatusCode::OK, "List get successfully", paths)
        }
        Err(e) => {
            logger::log_error(&format!(
                "Can't read storage directory {}: {e}",
                state.storage.root().display()
            ));
            http::failure(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong!")
        }
    }
}
