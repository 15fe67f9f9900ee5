//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method and path dispatch, the
//! `Server` header and access logging.

use super::{list, static_files, upload, STATIC_PREFIX};
use crate::config::AppState;
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    let started = Instant::now();
    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch on path, then method
async fn route_request<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match path.as_str() {
        "/upload" => match method {
            Method::POST => upload::handle_upload(req, state).await,
            _ => method_not_allowed(&method, "POST"),
        },
        "/list" => match method {
            Method::GET => list::handle_list(state).await,
            _ => method_not_allowed(&method, "GET"),
        },
        other => match static_name(other) {
            Some(name) => match method {
                Method::GET | Method::HEAD => {
                    let is_head = method == Method::HEAD;
                    static_files::serve_stored_file(req.headers(), is_head, &name, state).await
                }
                _ => method_not_allowed(&method, "GET, HEAD"),
            },
            None => http::build_404_response(),
        },
    }
}

/// Percent-decoded stored file name addressed by a `/static/...` path
///
/// `/static` and `/static/` address the (empty) name, which never resolves;
/// names that do not decode to UTF-8 address the empty name too.
fn static_name(path: &str) -> Option<Cow<'_, str>> {
    let rest = path.strip_prefix(STATIC_PREFIX)?;
    let raw = if rest.is_empty() {
        rest
    } else {
        rest.strip_prefix('/')?
    };
    Some(percent_decode_str(raw).decode_utf8().unwrap_or_default())
}

fn method_not_allowed(method: &Method, allow: &'static str) -> HttpResponse {
    logger::log_warning(&format!("Method not allowed: {method}"));
    http::build_405_response(allow)
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    // Debug output is "HTTP/1.1", "HTTP/2.0", ...
    let version = format!("{:?}", req.version());
    entry.http_version = version.trim_start_matches("HTTP/").to_string();
    entry.referer = header_string(req, REFERER);
    entry.user_agent = header_string(req, USER_AGENT);
    entry
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
