use std::fs::Metadata;
use std::time::SystemTime;

#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::utils::format_system_time;

/// Identity of the underlying file object.
///
/// Two locations share a key if and only if they denote the same file, even
/// when they are reached through different paths or symbolic links.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq, PartialOrd, Ord)]
pub struct FileKey {
    /// Device the file lives on.
    pub device: u64,
    /// File serial number on that device.
    pub inode: u64,
}

impl FileKey {
    /// Creates a key from a device and inode pair.
    pub fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }
}

/// Kind of file a location denotes.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum FileType {
    /// A directory.
    Directory,
    /// A regular file.
    Regular,
    /// A symbolic link that was not followed.
    SymbolicLink,
    /// Anything else: devices, sockets, fifos.
    Other,
}

/// Snapshot of the metadata the walker needs for a location.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct BasicAttributes {
    /// What kind of file this is.
    pub file_type: FileType,
    /// The size of the file in bytes. For directories, this may be zero or
    /// implementation-defined.
    pub size: u64,
    /// The last modification time in RFC 3339 - Z format, when known.
    /// For example "2018-01-26T18:30:09.453Z"
    pub modified: Option<String>,
    /// Identity of the file, if the file system can supply one.
    pub file_key: Option<FileKey>,
}

impl BasicAttributes {
    /// Creates attributes with only a type and an optional key.
    pub fn new(file_type: FileType, file_key: Option<FileKey>) -> Self {
        Self {
            file_type,
            size: 0,
            modified: None,
            file_key,
        }
    }

    /// Creates `BasicAttributes` from std metadata.
    ///
    /// Whether the metadata describes a link or its target depends on how it
    /// was obtained (`symlink_metadata` vs `metadata`).
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let ft = metadata.file_type();
        let file_type = if ft.is_symlink() {
            FileType::SymbolicLink
        } else if ft.is_dir() {
            FileType::Directory
        } else if ft.is_file() {
            FileType::Regular
        } else {
            FileType::Other
        };
        Self {
            file_type,
            size: metadata.len(),
            modified: metadata.modified().ok().map(format_system_time),
            file_key: file_key(metadata),
        }
    }

    /// Whether this entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Whether this entry is a symbolic link.
    pub fn is_symbolic_link(&self) -> bool {
        self.file_type == FileType::SymbolicLink
    }

    /// Whether this entry is a regular file.
    pub fn is_regular_file(&self) -> bool {
        self.file_type == FileType::Regular
    }

    /// Whether this entry is neither a file, a directory nor a link.
    pub fn is_other(&self) -> bool {
        self.file_type == FileType::Other
    }

    /// Parses the modification time back into a `SystemTime`.
    pub fn modified_time(&self) -> Option<SystemTime> {
        self.modified
            .as_deref()
            .and_then(|s| crate::utils::parse_system_time(s).ok())
    }
}

#[cfg(unix)]
fn file_key(metadata: &Metadata) -> Option<FileKey> {
    use std::os::unix::fs::MetadataExt;
    Some(FileKey::new(metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn file_key(_metadata: &Metadata) -> Option<FileKey> {
    None
}
