use std::path::Path;
use std::path::PathBuf;

use crate::BasicAttributes;

/// A path handed out by a directory stream, optionally carrying the
/// no-follow attributes the stream already had at hand.
///
/// The cache is private to the location. The walker only trusts it for
/// entries produced by a listing; the start of a walk is always read fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: PathBuf,
    cached: Option<BasicAttributes>,
}

impl Location {
    /// Creates a location with no cached attributes.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            cached: None,
        }
    }

    /// Creates a location carrying attributes read without following links.
    pub fn with_attributes<P: Into<PathBuf>>(path: P, attributes: BasicAttributes) -> Self {
        Self {
            path: path.into(),
            cached: Some(attributes),
        }
    }

    /// The path of this location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Attributes cached when the location was created, if any.
    pub fn cached_attributes(&self) -> Option<&BasicAttributes> {
        self.cached.as_ref()
    }

    /// Drops the cached attributes so the next use reads them again.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Consumes the location and returns its path.
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl AsRef<Path> for Location {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
