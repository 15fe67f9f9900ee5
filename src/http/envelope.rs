//! JSON envelope module
//!
//! Every API response is `{"status": ..., "message": ..., "data": ...}`

use super::response::HttpResponse;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Failed,
}

/// Uniform API response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    pub message: String,
    pub data: Option<T>,
}

/// Success envelope carrying `data`
pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> HttpResponse {
    json_response(
        status,
        &Envelope {
            status: EnvelopeStatus::Success,
            message: message.to_string(),
            data: Some(data),
        },
    )
}

/// Failure envelope, `data` is always `null`
pub fn failure(status: StatusCode, message: &str) -> HttpResponse {
    json_response(
        status,
        &Envelope::<()> {
            status: EnvelopeStatus::Failed,
            message: message.to_string(),
            data: None,
        },
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    let mut json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header(CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from_static(
                    br#"{"status":"failed","message":"Internal server error","data":null}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from_static(b"Error"))));
        }
    };
    json.push(b'\n');

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from_static(b"Error")))
        })
}
