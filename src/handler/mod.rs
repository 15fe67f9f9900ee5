//! Request handler module
//!
//! Routing dispatch plus the upload, listing and static file handlers.

pub mod list;
pub mod router;
pub mod static_files;
pub mod upload;

// Re-export main entry point
pub use router::handle_request;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// URL prefix under which stored files are served
pub const STATIC_PREFIX: &str = "/static";

/// Bytes escaped in a path segment; non-ASCII is always escaped
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Public URL path of a stored file, percent-encoded
pub fn public_path(name: &str) -> String {
    format!("{STATIC_PREFIX}/{}", utf8_percent_encode(name, PATH_SEGMENT))
}
