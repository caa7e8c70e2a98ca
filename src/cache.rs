use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use derivative::Derivative;
use log::debug;
use lru::LruCache;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::AccessError;
use crate::AttributeReader;
use crate::BasicAttributes;
use crate::DirectoryLister;
use crate::LinkOption;

/// Hit and miss counters of an attribute cache.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct CacheStats {
    /// Reads answered from the cache.
    pub hits: u64,
    /// Reads passed through to the wrapped reader.
    pub misses: u64,
}

type CacheKey = (PathBuf, LinkOption);

/// Cached attributes and the counters describing their use. A missing LRU
/// means caching is off and every lookup is a miss.
struct CacheState {
    lru: Option<LruCache<CacheKey, BasicAttributes>>,
    stats: CacheStats,
}

impl CacheState {
    fn lookup(&mut self, key: &CacheKey) -> Option<BasicAttributes> {
        let hit = self.lru.as_mut().and_then(|lru| lru.get(key)).cloned();
        match hit {
            Some(_) => self.stats.hits += 1,
            None => self.stats.misses += 1,
        }
        hit
    }

    fn remember(&mut self, key: CacheKey, attributes: BasicAttributes) {
        if let Some(lru) = self.lru.as_mut() {
            lru.put(key, attributes);
        }
    }

    fn forget(&mut self, path: &Path) -> bool {
        let Some(lru) = self.lru.as_mut() else {
            return false;
        };
        let mut dropped = false;
        for link in [LinkOption::Follow, LinkOption::NoFollow] {
            dropped |= lru.pop(&(path.to_path_buf(), link)).is_some();
        }
        dropped
    }
}

/// Remembers attribute reads of the wrapped file system.
///
/// Only successful reads are cached. [`AttributeReader::invalidate`] drops
/// both the followed and the unfollowed entry of a path, and the walker
/// calls it for the start of every walk.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct CachingFs<F> {
    inner: F,
    #[derivative(Debug = "ignore")]
    state: Mutex<CacheState>,
}

impl<F> CachingFs<F> {
    fn with(inner: F, lru: Option<LruCache<CacheKey, BasicAttributes>>) -> Self {
        Self {
            inner,
            state: Mutex::new(CacheState {
                lru,
                stats: CacheStats::default(),
            }),
        }
    }

    /// Wraps `inner` with an LRU cache holding up to `capacity` entries.
    pub fn with_capacity(inner: F, capacity: NonZeroUsize) -> Self {
        Self::with(inner, Some(LruCache::new(capacity)))
    }

    /// Wraps `inner` without caching anything; every read is a miss.
    pub fn without_cache(inner: F) -> Self {
        Self::with(inner, None)
    }

    /// Current hit and miss counters.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().lru.as_ref().map_or(0, LruCache::len)
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The wrapped file system.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: AttributeReader> AttributeReader for CachingFs<F> {
    fn read_attributes(
        &self,
        path: &Path,
        link: LinkOption,
    ) -> Result<BasicAttributes, AccessError> {
        let key = (path.to_path_buf(), link);
        if let Some(hit) = self.lock().lookup(&key) {
            return Ok(hit);
        }
        let attributes = self.inner.read_attributes(path, link)?;
        self.lock().remember(key, attributes.clone());
        Ok(attributes)
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, AccessError> {
        self.inner.resolve(path)
    }

    fn is_same_file(&self, a: &Path, b: &Path) -> Result<bool, AccessError> {
        self.inner.is_same_file(a, b)
    }

    fn invalidate(&self, path: &Path) {
        if self.lock().forget(path) {
            debug!("dropped cached attributes of {}", path.display());
        }
        self.inner.invalidate(path);
    }
}

impl<F: DirectoryLister> DirectoryLister for CachingFs<F> {
    type Stream = F::Stream;

    fn open_directory(&self, path: &Path) -> Result<Self::Stream, AccessError> {
        self.inner.open_directory(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemFs;
    use crate::SimpleVisitor;
    use crate::walk;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn repeated_reads_hit_the_cache() {
        let fs = CachingFs::with_capacity(MemFs::new().file("/a/b"), capacity(8));
        let path = Path::new("/a/b");
        fs.read_attributes(path, LinkOption::NoFollow).unwrap();
        fs.read_attributes(path, LinkOption::NoFollow).unwrap();
        fs.read_attributes(path, LinkOption::Follow).unwrap();
        assert_eq!(fs.stats(), CacheStats { hits: 1, misses: 2 });
        assert_eq!(fs.inner().reads(), 2);
        assert_eq!(fs.len(), 2);
    }

    #[test]
    fn invalidate_forces_a_fresh_read() {
        let fs = CachingFs::with_capacity(MemFs::new().file("/a/b"), capacity(8));
        let path = Path::new("/a/b");
        fs.read_attributes(path, LinkOption::NoFollow).unwrap();
        fs.read_attributes(path, LinkOption::Follow).unwrap();
        fs.invalidate(path);
        assert!(fs.is_empty());
        fs.read_attributes(path, LinkOption::NoFollow).unwrap();
        assert_eq!(fs.inner().reads(), 3);
    }

    #[test]
    fn failures_are_not_cached() {
        let fs = CachingFs::with_capacity(MemFs::new(), capacity(8));
        assert!(fs.read_attributes(Path::new("/x"), LinkOption::NoFollow).is_err());
        assert!(fs.is_empty());
    }

    #[test]
    fn walk_start_is_read_fresh() {
        let fs = CachingFs::with_capacity(MemFs::new().file("/r/a"), capacity(8));
        walk(&fs, "/r", SimpleVisitor).unwrap();
        let reads = fs.inner().reads();
        walk(&fs, "/r", SimpleVisitor).unwrap();
        // Only the start is read again; /r/a comes from the cache.
        assert_eq!(fs.inner().reads(), reads + 1);
    }

    #[test]
    fn null_cache_misses_every_time() {
        let fs = CachingFs::without_cache(MemFs::new().file("/a"));
        fs.read_attributes(Path::new("/a"), LinkOption::NoFollow).unwrap();
        fs.read_attributes(Path::new("/a"), LinkOption::NoFollow).unwrap();
        assert_eq!(fs.stats(), CacheStats { hits: 0, misses: 2 });
        assert_eq!(fs.inner().reads(), 2);
    }
}
