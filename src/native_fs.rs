use std::fs;
use std::fs::ReadDir;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::AccessError;
use crate::AttributeReader;
use crate::BasicAttributes;
use crate::DirectoryLister;
use crate::DirectoryStream;
use crate::LinkOption;
use crate::Location;

/// The local file system, through `std::fs`.
///
/// Every failure is reported as [`AccessError::Io`]; the operating system's
/// permission errors are I/O errors as far as the walker is concerned.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFs;

impl AttributeReader for NativeFs {
    fn read_attributes(
        &self,
        path: &Path,
        link: LinkOption,
    ) -> Result<BasicAttributes, AccessError> {
        let metadata = match link {
            LinkOption::Follow => fs::metadata(path)?,
            LinkOption::NoFollow => fs::symlink_metadata(path)?,
        };
        Ok(BasicAttributes::from_metadata(&metadata))
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, AccessError> {
        Ok(fs::canonicalize(path)?)
    }
}

impl DirectoryLister for NativeFs {
    type Stream = NativeDirStream;

    fn open_directory(&self, path: &Path) -> Result<NativeDirStream, AccessError> {
        let read_dir = fs::read_dir(path)?;
        Ok(NativeDirStream {
            dir: path.to_path_buf(),
            read_dir: Some(read_dir),
        })
    }
}

/// An open `std::fs::ReadDir`.
///
/// Entries carry the attributes `DirEntry::metadata` returns, which never
/// traverse a final symbolic link.
#[derive(Debug)]
pub struct NativeDirStream {
    dir: PathBuf,
    read_dir: Option<ReadDir>,
}

impl NativeDirStream {
    /// The directory being listed.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Iterator for NativeDirStream {
    type Item = io::Result<Location>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.read_dir.as_mut()?.next()?;
        Some(entry.map(|entry| match entry.metadata() {
            Ok(metadata) => {
                Location::with_attributes(entry.path(), BasicAttributes::from_metadata(&metadata))
            }
            Err(_) => Location::new(entry.path()),
        }))
    }
}

impl DirectoryStream for NativeDirStream {
    fn close(&mut self) -> io::Result<()> {
        self.read_dir = None;
        Ok(())
    }
}
