//! Error taxonomy for the detection core.
//!
//! Transient per-process read failures (`NotFound`, `PermissionDenied`,
//! `ParseError`) never escape [`crate::proc_reader`] or [`crate::snapshot`] —
//! they are absorbed and the affected pid simply contributes no data. Only
//! the fatal variants below propagate out of a detection pass.

use std::fmt;

/// Errors that can abort a detection pass.
///
/// Local-recovery failures while reading an individual `/proc` entry are
/// swallowed at the point of occurrence and never constructed as this type;
/// see the module docs.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("allocation failed while building {0}")]
    OutOfMemory(&'static str),

    #[error("graph capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, DetectError>;

/// Reasons a single `/proc` read can fail, kept internal to the reader/
/// snapshot layer. Never surfaced to callers of [`crate::detect_once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcReadError {
    NotFound,
    PermissionDenied,
    ParseError,
    IoError,
}

impl fmt::Display for ProcReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcReadError::NotFound => write!(f, "not found"),
            ProcReadError::PermissionDenied => write!(f, "permission denied"),
            ProcReadError::ParseError => write!(f, "parse error"),
            ProcReadError::IoError => write!(f, "io error"),
        }
    }
}

impl From<std::io::Error> for ProcReadError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => ProcReadError::NotFound,
            std::io::ErrorKind::PermissionDenied => ProcReadError::PermissionDenied,
            _ => ProcReadError::IoError,
        }
    }
}
