//! Collaborator contracts the walker consumes.
//!
//! The walker never touches the file system directly. It reads attributes
//! through an [`AttributeReader`] and lists directories through a
//! [`DirectoryLister`]; [`crate::NativeFs`] implements both on `std::fs`.
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::AccessError;
use crate::BasicAttributes;
use crate::Location;

/// Whether an attribute read resolves symbolic links.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum LinkOption {
    /// Report the link target.
    Follow,
    /// Report the link itself.
    NoFollow,
}

/// Reads metadata for a location.
pub trait AttributeReader {
    /// Reads the attributes of `path`, resolving links per `link`.
    fn read_attributes(&self, path: &Path, link: LinkOption)
    -> Result<BasicAttributes, AccessError>;

    /// Returns the canonical form of `path`, with every symbolic link along
    /// it resolved. The location must exist.
    fn resolve(&self, path: &Path) -> Result<PathBuf, AccessError>;

    /// Returns true if both paths denote the same underlying file.
    ///
    /// The default compares file keys of the link targets and, when either
    /// key is missing, the resolved paths.
    fn is_same_file(&self, a: &Path, b: &Path) -> Result<bool, AccessError> {
        if a == b {
            return Ok(true);
        }
        let left = self.read_attributes(a, LinkOption::Follow)?;
        let right = self.read_attributes(b, LinkOption::Follow)?;
        match (left.file_key, right.file_key) {
            (Some(l), Some(r)) => Ok(l == r),
            _ => Ok(self.resolve(a)? == self.resolve(b)?),
        }
    }

    /// Forgets anything remembered about `path`.
    fn invalidate(&self, _path: &Path) {}
}

/// An open, closeable listing of a directory's children.
///
/// Iteration may fail part way with an I/O error. `close` must be safe to
/// call more than once.
pub trait DirectoryStream: Iterator<Item = io::Result<Location>> {
    /// Releases the underlying handle.
    fn close(&mut self) -> io::Result<()>;
}

/// Opens directory listings.
pub trait DirectoryLister {
    /// The stream type handed out by `open_directory`.
    type Stream: DirectoryStream;

    /// Opens `path` for listing.
    fn open_directory(&self, path: &Path) -> Result<Self::Stream, AccessError>;
}

impl<T: AttributeReader + ?Sized> AttributeReader for &T {
    fn read_attributes(
        &self,
        path: &Path,
        link: LinkOption,
    ) -> Result<BasicAttributes, AccessError> {
        (**self).read_attributes(path, link)
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, AccessError> {
        (**self).resolve(path)
    }

    fn is_same_file(&self, a: &Path, b: &Path) -> Result<bool, AccessError> {
        (**self).is_same_file(a, b)
    }

    fn invalidate(&self, path: &Path) {
        (**self).invalidate(path)
    }
}

impl<T: DirectoryLister + ?Sized> DirectoryLister for &T {
    type Stream = T::Stream;

    fn open_directory(&self, path: &Path) -> Result<Self::Stream, AccessError> {
        (**self).open_directory(path)
    }
}

impl<T: AttributeReader + ?Sized> AttributeReader for Arc<T> {
    fn read_attributes(
        &self,
        path: &Path,
        link: LinkOption,
    ) -> Result<BasicAttributes, AccessError> {
        (**self).read_attributes(path, link)
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, AccessError> {
        (**self).resolve(path)
    }

    fn is_same_file(&self, a: &Path, b: &Path) -> Result<bool, AccessError> {
        (**self).is_same_file(a, b)
    }

    fn invalidate(&self, path: &Path) {
        (**self).invalidate(path)
    }
}

impl<T: DirectoryLister + ?Sized> DirectoryLister for Arc<T> {
    type Stream = T::Stream;

    fn open_directory(&self, path: &Path) -> Result<Self::Stream, AccessError> {
        (**self).open_directory(path)
    }
}
