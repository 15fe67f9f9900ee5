//! HTTP protocol layer module
//!
//! Response builders, the JSON envelope, `ETag` handling and MIME detection,
//! kept apart from the upload and listing logic.

pub mod cache;
pub mod envelope;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use envelope::{failure, success, Envelope, EnvelopeStatus};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_file_response, HttpResponse,
};
