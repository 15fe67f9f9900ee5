//! HTTP file-upload service
//!
//! Accepts multipart uploads, downsamples JPEG/PNG images to a maximum width,
//! stores every upload under a generated unique name and serves the storage
//! directory back as a listing and as static files.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod media;
pub mod server;
pub mod storage;
