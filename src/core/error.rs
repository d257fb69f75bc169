//! Error types for metadata value operations
//!
//! Almost everything in this crate degrades silently: malformed or sentinel
//! raw values normalize to an absent value, and merging never fails. The
//! variants below cover the few places where a hard failure is the right
//! answer.

use thiserror::Error;

/// Error types for metadata value operations
#[derive(Debug, Error)]
pub enum MetaError {
    /// A date/time string with no recognizable date component
    #[error("cannot parse date/time {0:?}")]
    ParseDateTime(String),

    /// A tag name whose leading component is none of `Exif`, `Iptc`, `Xmp`
    #[error("tag {0:?} does not belong to a known metadata family")]
    UnknownFamily(String),
}

/// Result type alias for metadata value operations
pub type MetaResult<T> = Result<T, MetaError>;
