//! Error types shared by the model and the codecs.

use std::path::PathBuf;

use thiserror::Error;

/// Model invariant violations, raised while constructing or mutating a
/// [`Lane`](crate::Lane) or [`Heat`](crate::Heat).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// More than ten lanes were supplied for a heat.
    #[error("the maximum number of lanes is 10, got {count}")]
    TooManyLanes { count: usize },

    /// A backup or split group held more than three readings.
    #[error("{field} may hold at most 3 readings, got {count}")]
    TooManyReadings { field: &'static str, count: usize },

    /// Heat and race numbers start at 1.
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: u32 },

    /// Recorded times can't be below zero.
    #[error("{field} must be non-negative")]
    NegativeTime { field: &'static str },

    /// Seed times are either a non-negative time or NT.
    #[error("seed time must be a non-negative time or NT, got {value}")]
    InvalidSeedTime { value: String },

    /// Lane number outside the heat's numbering scheme.
    #[error("lane {lane} is out of range for lane numbering {numbering}")]
    LaneOutOfRange { lane: u32, numbering: String },
}

/// Malformed file contents.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unable to parse header: {line:?}")]
    Header { line: String },

    #[error("wrong number of lines: expected {expected}, got {actual}")]
    LineCount { expected: String, actual: usize },

    #[error("line {line}: expected {expected} fields, got {actual}")]
    FieldCount {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unable to parse line {line}: {content:?}")]
    Line { line: usize, content: String },

    #[error("invalid time {value:?}")]
    Time { value: String },

    #[error("byte 0x{byte:02X} at offset {offset} is not valid Windows-1252")]
    Encoding { byte: u8, offset: usize },

    #[error("heats do not form a valid start list")]
    InvalidStartList,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failures reading or writing timing files.
///
/// `NotFound` is kept apart from `Io` so callers scanning a directory can
/// tell a file that vanished from one that is corrupt.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed file {path}")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("{operation} is not supported by this format")]
    Unsupported { operation: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CodecError {
    /// Wraps an I/O error, mapping `ErrorKind::NotFound` onto [`CodecError::NotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn format(path: impl Into<PathBuf>, source: FormatError) -> Self {
        Self::Format {
            path: path.into(),
            source,
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
