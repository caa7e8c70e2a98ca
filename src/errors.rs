use std::io;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Represents all errors a walk can end with.
///
/// Collaborator failures reach the visitor first; an `Error` only comes out
/// of a walk when a visitor decides to abort, or when the walk could not be
/// started at all.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum Error {
    /// Error indicating a failure to read attributes of a file.
    #[error("Failed to read {what}: {how}")]
    Read {
        /// The item that failed to be read.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating a failure to open a directory for listing.
    #[error("Failed to open {what}: {how}")]
    Open {
        /// The directory that failed to open.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating a failure while iterating over an open directory.
    #[error("Failed to list {what}: {how}")]
    Iterate {
        /// The directory whose listing failed.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating an invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error raised by a visitor that chose to stop the walk.
    #[error("Walk aborted at {what}: {how}")]
    Aborted {
        /// The location being visited.
        what: String,
        /// The reason given by the visitor.
        how: String,
    },

    /// Error indicating a failure to hand walk results across threads.
    #[error("Sync failed {what}: {how}")]
    Sync {
        /// Specific failure type
        what: String,
        /// The potential  reason for the failure.
        how: String,
    },
}

impl Error {
    pub(crate) fn read(path: &Path, error: &io::Error) -> Self {
        Error::Read {
            what: path.display().to_string(),
            how: error.to_string(),
        }
    }

    pub(crate) fn open(path: &Path, error: &io::Error) -> Self {
        Error::Open {
            what: path.display().to_string(),
            how: error.to_string(),
        }
    }

    pub(crate) fn iterate(path: &Path, error: &io::Error) -> Self {
        Error::Iterate {
            what: path.display().to_string(),
            how: error.to_string(),
        }
    }
}

/// Failure reported by an attribute reader or a directory lister.
///
/// `Denied` is an access-control refusal. The walker skips such locations
/// silently, while `Io` failures are always handed to the visitor.
#[derive(Error, Debug)]
pub enum AccessError {
    /// Access to the location was refused by a policy.
    #[error("Access denied to {what}: {how}")]
    Denied {
        /// The location that was refused.
        what: String,
        /// The rule that refused it.
        how: String,
    },

    /// The underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AccessError {
    pub(crate) fn denied(path: &Path, how: impl Into<String>) -> Self {
        AccessError::Denied {
            what: path.display().to_string(),
            how: how.into(),
        }
    }

    /// Returns true for access-control refusals.
    pub fn is_denied(&self) -> bool {
        matches!(self, AccessError::Denied { .. })
    }
}
