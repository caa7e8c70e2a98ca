//! A depth-first file tree walker driven by visitor callbacks.
//!
//! The walker reports every location below a start path to a
//! [`FileVisitor`], follows symbolic links on request while detecting
//! cycles, and closes every directory it opens no matter how the walk ends.
//! File system access goes through the [`AttributeReader`] and
//! [`DirectoryLister`] traits, so the same walk runs over [`NativeFs`], a
//! [`CachingFs`] or a policy-enforcing [`GuardedFs`].
//!
//! ```rust
//! # use std::path::Path;
//! # use ftw::BasicAttributes;
//! # use ftw::Error;
//! # use ftw::FileVisitor;
//! # use ftw::NativeFs;
//! # use ftw::VisitOutcome;
//! # use ftw::WalkOptions;
//! #[derive(Default)]
//! struct CountSources(usize);
//!
//! impl FileVisitor for CountSources {
//!     fn visit_file(&mut self, file: &Path, _: &BasicAttributes) -> Result<VisitOutcome, Error> {
//!         if file.extension().is_some_and(|ext| ext == "rs") {
//!             self.0 += 1;
//!         }
//!         Ok(VisitOutcome::Continue)
//!     }
//! }
//!
//! let mut sources = CountSources::default();
//! ftw::walk_file_tree(&NativeFs, "src", &WalkOptions::new(), 1, &mut sources).unwrap();
//! assert!(sources.0 > 0);
//! ```
//!
//! Walks can also run on tokio's blocking pool and be consumed as a stream
//! of serializable events:
//!
//! ```rust
//! # tokio_test::block_on(async {
//! # use ftw::NativeFs;
//! # use ftw::WalkEvent;
//! # use ftw::WalkOptions;
//! let events = ftw::collect_events(NativeFs, "src", WalkOptions::new(), 1, 16)
//!     .await
//!     .unwrap();
//! assert!(matches!(events.first(), Some(WalkEvent::EnterDirectory { .. })));
//! println!("{}", serde_json::to_string_pretty(&events[0]).unwrap());
//! # })
//! ```

mod attributes;
mod cache;
mod errors;
mod fs;
pub mod hash;
mod location;
mod native_fs;
mod policy;
mod stream;
pub mod utils;
mod visitor;
mod walker;

pub use attributes::BasicAttributes;
pub use attributes::FileKey;
pub use attributes::FileType;
pub use cache::CacheStats;
pub use cache::CachingFs;
pub use errors::AccessError;
pub use errors::Error;
pub use fs::AttributeReader;
pub use fs::DirectoryLister;
pub use fs::DirectoryStream;
pub use fs::LinkOption;
pub use hash::DigestVisitor;
pub use location::Location;
pub use native_fs::NativeDirStream;
pub use native_fs::NativeFs;
pub use policy::Access;
pub use policy::AccessPolicy;
pub use policy::GuardedFs;
pub use stream::WalkEvent;
pub use stream::collect_events;
pub use stream::spawn_walk;
pub use utils::max_depth_from;
pub use visitor::FileVisitor;
pub use visitor::SimpleVisitor;
pub use visitor::VisitOutcome;
pub use walker::FileTreeWalker;
pub use walker::MAX_DEPTH;
pub use walker::WalkOption;
pub use walker::WalkOptions;
pub use walker::walk;
pub use walker::walk_file_tree;

#[cfg(any(test, feature = "test_utils"))]
mod mem_fs;
#[cfg(any(test, feature = "test_utils"))]
pub use mem_fs::MemDirStream;
#[cfg(any(test, feature = "test_utils"))]
pub use mem_fs::MemFs;

#[cfg(feature = "test_utils")]
pub(crate) mod test_utils;
#[cfg(feature = "test_utils")]
pub use test_utils::TestRoot;
