//! Upload error taxonomy
//!
//! Every failure of `POST /upload` is one of these variants. Each maps to a
//! fixed client-facing message and a status code; the `Display` text carries
//! the cause and is only written to the server log.

use crate::media::TransformError;
use hyper::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("request body exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("malformed multipart body: {0}")]
    Form(#[source] multer::Error),

    #[error("multipart body has no `file` field")]
    MissingFile,

    #[error("can't create target file {name}: {source}")]
    CreateTarget {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("image worker did not complete: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("reading upload stream for {name} failed: {source}")]
    Stream {
        name: String,
        #[source]
        source: multer::Error,
    },

    #[error("writing {name} failed: {source}")]
    Copy {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl From<multer::Error> for UploadError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamSizeExceeded { limit }
            | multer::Error::FieldSizeExceeded { limit, .. } => Self::TooLarge { limit },
            other => Self::Form(other),
        }
    }
}

impl UploadError {
    /// Error raised while streaming the `file` field into `name`
    ///
    /// Hitting the size limit mid-stream is the client's fault and reported
    /// like any other oversized body.
    pub fn stream(name: &str, err: multer::Error) -> Self {
        match Self::from(err) {
            Self::Form(source) => Self::Stream {
                name: name.to_string(),
                source,
            },
            too_large => too_large,
        }
    }

    /// Whether the partly written target should be kept on disk
    ///
    /// Only image processing failures leave their (empty) target behind.
    pub const fn keeps_target(&self) -> bool {
        matches!(self, Self::Transform(_))
    }

    /// Message placed in the failure envelope
    pub const fn message(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } | Self::Form(_) | Self::MissingFile => "Can't Get uploaded file",
            Self::CreateTarget { .. } => "Target file can't be create",
            Self::Transform(_) | Self::Worker(_) => "Can't compress this image",
            Self::Stream { .. } | Self::Copy { .. } => "Can't Store file into server directory",
        }
    }

    /// Whether the client sent something unusable
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::TooLarge { .. }
                | Self::Form(_)
                | Self::MissingFile
                | Self::Transform(TransformError::Decode { .. } | TransformError::TooManyPixels { .. })
        )
    }

    /// Status code for the failure envelope
    ///
    /// Always 500 unless `strict` is set, in which case client errors become
    /// 400 (413 for oversized bodies).
    pub fn status(&self, strict: bool) -> StatusCode {
        if !strict || !self.is_client_error() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
