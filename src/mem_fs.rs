//! In-memory file system for exercising visitors and the walker.
use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::io;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::AccessError;
use crate::AttributeReader;
use crate::BasicAttributes;
use crate::DirectoryLister;
use crate::DirectoryStream;
use crate::FileKey;
use crate::FileType;
use crate::LinkOption;
use crate::Location;

const MAX_LINK_HOPS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    File,
    Dir,
    Symlink(PathBuf),
}

#[derive(Debug, Clone)]
struct Node {
    kind: Kind,
    inode: u64,
    denied: bool,
    deny_link: bool,
    deny_open: bool,
    fail_read: bool,
    fail_open: bool,
    fail_close: bool,
    fail_listing_after: Option<usize>,
}

/// A tree of files, directories and symbolic links held in memory.
///
/// Paths are absolute. Failures and access denials can be injected per
/// path, and every directory open and close is counted so tests can check
/// that handles are released.
#[derive(Debug, Default)]
pub struct MemFs {
    nodes: BTreeMap<PathBuf, Node>,
    next_inode: u64,
    without_keys: bool,
    cache_listing: bool,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
    reads: AtomicUsize,
}

impl MemFs {
    /// Creates an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, path: &Path, kind: Kind) {
        if let Some(parent) = path.parent() {
            if !self.nodes.contains_key(parent) {
                self.insert(parent, Kind::Dir);
            }
        }
        self.next_inode += 1;
        let inode = self.next_inode;
        self.nodes.insert(
            path.to_path_buf(),
            Node {
                kind,
                inode,
                denied: false,
                deny_link: false,
                deny_open: false,
                fail_read: false,
                fail_open: false,
                fail_close: false,
                fail_listing_after: None,
            },
        );
    }

    fn mark<F: FnOnce(&mut Node)>(mut self, path: &str, f: F) -> Self {
        if let Some(node) = self.nodes.get_mut(Path::new(path)) {
            f(node);
        }
        self
    }

    /// Adds a directory and any missing parents.
    pub fn dir(mut self, path: &str) -> Self {
        self.insert(Path::new(path), Kind::Dir);
        self
    }

    /// Adds a regular file and any missing parent directories.
    pub fn file(mut self, path: &str) -> Self {
        self.insert(Path::new(path), Kind::File);
        self
    }

    /// Adds a symbolic link to `target`, which does not need to exist.
    pub fn symlink(mut self, path: &str, target: &str) -> Self {
        self.insert(Path::new(path), Kind::Symlink(PathBuf::from(target)));
        self
    }

    /// Refuses attribute reads of `path`.
    pub fn deny(self, path: &str) -> Self {
        self.mark(path, |n| n.denied = true)
    }

    /// Refuses attribute reads of `path` that do not follow a final link.
    pub fn deny_link(self, path: &str) -> Self {
        self.mark(path, |n| n.deny_link = true)
    }

    /// Refuses to list `path`.
    pub fn deny_open(self, path: &str) -> Self {
        self.mark(path, |n| n.deny_open = true)
    }

    /// Fails attribute reads of `path` with an I/O error.
    pub fn fail_attributes(self, path: &str) -> Self {
        self.mark(path, |n| n.fail_read = true)
    }

    /// Fails opening `path` with an I/O error.
    pub fn fail_open(self, path: &str) -> Self {
        self.mark(path, |n| n.fail_open = true)
    }

    /// Makes closing the listing of `path` fail. The handle is still
    /// released and counted.
    pub fn fail_close(self, path: &str) -> Self {
        self.mark(path, |n| n.fail_close = true)
    }

    /// Makes the listing of `path` fail after `count` entries.
    pub fn fail_listing_after(self, path: &str, count: usize) -> Self {
        self.mark(path, |n| n.fail_listing_after = Some(count))
    }

    /// Stops reporting file keys, forcing same-file checks.
    pub fn without_keys(mut self) -> Self {
        self.without_keys = true;
        self
    }

    /// Makes listings hand out locations with cached no-follow attributes.
    pub fn cache_listing(mut self) -> Self {
        self.cache_listing = true;
        self
    }

    /// Number of directories opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of directory streams closed so far.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of attribute reads served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn resolve_links(&self, path: &Path, follow_last: bool) -> io::Result<PathBuf> {
        let components: Vec<_> = path.components().collect();
        let mut current = PathBuf::new();
        for (i, component) in components.iter().enumerate() {
            current.push(component);
            let last = i + 1 == components.len();
            let mut hops = 0;
            loop {
                let node = self.nodes.get(&current).ok_or_else(|| {
                    io::Error::new(ErrorKind::NotFound, format!("{}", current.display()))
                })?;
                match &node.kind {
                    Kind::Symlink(target) if !last || follow_last => {
                        hops += 1;
                        if hops > MAX_LINK_HOPS {
                            return Err(io::Error::other("too many levels of symbolic links"));
                        }
                        current = match current.parent() {
                            Some(parent) => parent.join(target),
                            None => target.clone(),
                        };
                    }
                    _ => break,
                }
            }
        }
        Ok(current)
    }

    fn attributes_of(&self, node: &Node) -> BasicAttributes {
        let file_type = match node.kind {
            Kind::File => FileType::Regular,
            Kind::Dir => FileType::Directory,
            Kind::Symlink(_) => FileType::SymbolicLink,
        };
        let key = (!self.without_keys).then(|| FileKey::new(1, node.inode));
        BasicAttributes::new(file_type, key)
    }
}

impl AttributeReader for MemFs {
    fn read_attributes(
        &self,
        path: &Path,
        link: LinkOption,
    ) -> Result<BasicAttributes, AccessError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(node) = self.nodes.get(path) {
            if node.denied {
                return Err(AccessError::denied(path, "denied by test setup"));
            }
            if node.deny_link && link == LinkOption::NoFollow {
                return Err(AccessError::denied(path, "link denied by test setup"));
            }
            if node.fail_read {
                return Err(io::Error::other("injected attribute failure").into());
            }
        }
        let resolved = self.resolve_links(path, link == LinkOption::Follow)?;
        let node = self
            .nodes
            .get(&resolved)
            .ok_or_else(|| io::Error::from(ErrorKind::NotFound))?;
        Ok(self.attributes_of(node))
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, AccessError> {
        Ok(self.resolve_links(path, true)?)
    }
}

impl DirectoryLister for MemFs {
    type Stream = MemDirStream;

    fn open_directory(&self, path: &Path) -> Result<MemDirStream, AccessError> {
        if let Some(node) = self.nodes.get(path) {
            if node.deny_open {
                return Err(AccessError::denied(path, "listing denied by test setup"));
            }
            if node.fail_open {
                return Err(io::Error::other("injected open failure").into());
            }
        }
        let resolved = self.resolve_links(path, true)?;
        let dir = self
            .nodes
            .get(&resolved)
            .ok_or_else(|| io::Error::from(ErrorKind::NotFound))?;
        if dir.kind != Kind::Dir {
            return Err(io::Error::other(format!("{} is not a directory", path.display())).into());
        }
        let entries = self
            .nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(resolved.as_path()))
            .filter_map(|(child, node)| {
                let name = child.file_name()?;
                let entry = path.join(name);
                Some(if self.cache_listing {
                    Location::with_attributes(entry, self.attributes_of(node))
                } else {
                    Location::new(entry)
                })
            })
            .collect();
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemDirStream {
            entries,
            fail_after: dir.fail_listing_after,
            fail_close: self.nodes.get(path).is_some_and(|n| n.fail_close),
            yielded: 0,
            closed: false,
            closes: self.closed.clone(),
        })
    }
}

/// Listing of a [`MemFs`] directory.
#[derive(Debug)]
pub struct MemDirStream {
    entries: VecDeque<Location>,
    fail_after: Option<usize>,
    fail_close: bool,
    yielded: usize,
    closed: bool,
    closes: Arc<AtomicUsize>,
}

impl Iterator for MemDirStream {
    type Item = io::Result<Location>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        if self.fail_after == Some(self.yielded) {
            self.fail_after = None;
            self.entries.clear();
            return Some(Err(io::Error::other("injected listing failure")));
        }
        let entry = self.entries.pop_front()?;
        self.yielded += 1;
        Some(Ok(entry))
    }
}

impl DirectoryStream for MemDirStream {
    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(io::Error::other("injected close failure"));
        }
        Ok(())
    }
}
