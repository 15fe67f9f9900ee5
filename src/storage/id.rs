//! Stored file identifiers
//!
//! Identifiers are UUIDv7 values rendered as 32 lowercase hex characters.
//! The leading 48 bits are a millisecond timestamp, so sorting names
//! lexicographically follows upload order.

use std::fmt;
use uuid::Uuid;

/// Unique, time-sortable identifier used as the stem of a stored file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(Uuid);

impl FileId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Stored file name: `<id>.<extension>`, or just `<id>` without an extension
    pub fn file_name(&self, extension: &str) -> String {
        if extension.is_empty() {
            self.to_string()
        } else {
            format!("{self}.{extension}")
        }
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}
