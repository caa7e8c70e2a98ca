//! Walks on tokio's blocking pool, reported as chunks of events over a
//! channel.
use std::io;
use std::path::Path;
use std::path::PathBuf;

use log::debug;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::Receiver;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

use crate::AttributeReader;
use crate::BasicAttributes;
use crate::DirectoryLister;
use crate::Error;
use crate::FileTreeWalker;
use crate::FileVisitor;
use crate::Location;
use crate::VisitOutcome;
use crate::WalkOptions;

const CHANNEL_CAPACITY: usize = 100;

/// One visitor callback, as seen by a remote consumer.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum WalkEvent {
    /// A directory was opened and is about to be listed.
    EnterDirectory {
        /// Directory path
        path: PathBuf,
        /// Attributes the walker acted on
        attributes: BasicAttributes,
    },
    /// A directory could not be opened.
    EnterDirectoryFailed {
        /// Directory path
        path: PathBuf,
        /// Rendered I/O error
        error: String,
    },
    /// A non-directory, a directory at the depth limit, or a cycle.
    VisitFile {
        /// Entry path
        path: PathBuf,
        /// Attributes the walker acted on
        attributes: BasicAttributes,
    },
    /// Attributes of an entry could not be read.
    VisitFileFailed {
        /// Entry path
        path: PathBuf,
        /// Rendered I/O error
        error: String,
    },
    /// All entries of a directory were handled, or its listing failed.
    LeaveDirectory {
        /// Directory path
        path: PathBuf,
        /// Listing failure, if any
        error: Option<String>,
    },
}

impl WalkEvent {
    /// The location the event is about.
    pub fn path(&self) -> &Path {
        match self {
            WalkEvent::EnterDirectory { path, .. }
            | WalkEvent::EnterDirectoryFailed { path, .. }
            | WalkEvent::VisitFile { path, .. }
            | WalkEvent::VisitFileFailed { path, .. }
            | WalkEvent::LeaveDirectory { path, .. } => path,
        }
    }
}

/// Buffers events and ships them in chunks. Stops the walk once nobody is
/// listening.
struct ChannelVisitor {
    tx: Sender<Vec<WalkEvent>>,
    chunk_size: usize,
    chunk: Vec<WalkEvent>,
    disconnected: bool,
}

impl ChannelVisitor {
    fn new(tx: Sender<Vec<WalkEvent>>, chunk_size: usize) -> Self {
        Self {
            tx,
            chunk_size,
            chunk: Vec::with_capacity(chunk_size),
            disconnected: false,
        }
    }

    fn write_chunk(&mut self) {
        if self.chunk.is_empty() || self.disconnected {
            return;
        }
        let chunk = std::mem::replace(&mut self.chunk, Vec::with_capacity(self.chunk_size));
        if let Err(e) = self.tx.blocking_send(chunk) {
            debug!("event receiver went away: {e}");
            self.disconnected = true;
        }
    }

    fn push(&mut self, event: WalkEvent) -> Result<VisitOutcome, Error> {
        self.chunk.push(event);
        if self.chunk.len() >= self.chunk_size {
            self.write_chunk();
        }
        if self.disconnected {
            Ok(VisitOutcome::Terminate)
        } else {
            Ok(VisitOutcome::Continue)
        }
    }
}

impl FileVisitor for ChannelVisitor {
    fn enter_directory(
        &mut self,
        dir: &Path,
        attributes: &BasicAttributes,
    ) -> Result<VisitOutcome, Error> {
        self.push(WalkEvent::EnterDirectory {
            path: dir.to_path_buf(),
            attributes: attributes.clone(),
        })
    }

    fn enter_directory_failed(
        &mut self,
        dir: &Path,
        error: io::Error,
    ) -> Result<VisitOutcome, Error> {
        self.push(WalkEvent::EnterDirectoryFailed {
            path: dir.to_path_buf(),
            error: error.to_string(),
        })
    }

    fn visit_file(
        &mut self,
        file: &Path,
        attributes: &BasicAttributes,
    ) -> Result<VisitOutcome, Error> {
        self.push(WalkEvent::VisitFile {
            path: file.to_path_buf(),
            attributes: attributes.clone(),
        })
    }

    fn visit_file_failed(&mut self, file: &Path, error: io::Error) -> Result<VisitOutcome, Error> {
        self.push(WalkEvent::VisitFileFailed {
            path: file.to_path_buf(),
            error: error.to_string(),
        })
    }

    fn leave_directory(
        &mut self,
        dir: &Path,
        error: Option<io::Error>,
    ) -> Result<VisitOutcome, Error> {
        self.push(WalkEvent::LeaveDirectory {
            path: dir.to_path_buf(),
            error: error.map(|e| e.to_string()),
        })
    }
}

/// Starts a walk on the blocking thread pool.
///
/// Events arrive in chunks of at most `chunk_size`. Dropping the receiver
/// stops the walk at the next event. Must be called from within a tokio
/// runtime.
pub fn spawn_walk<F>(
    fs: F,
    start: impl Into<Location>,
    options: WalkOptions,
    max_depth: usize,
    chunk_size: usize,
) -> Result<(Receiver<Vec<WalkEvent>>, JoinHandle<Result<(), Error>>), Error>
where
    F: AttributeReader + DirectoryLister + Send + 'static,
{
    if chunk_size == 0 {
        return Err(Error::InvalidArgument(
            "chunk size must be at least 1".to_owned(),
        ));
    }
    let start = start.into();
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = tokio::task::spawn_blocking(move || {
        let mut visitor = ChannelVisitor::new(tx, chunk_size);
        FileTreeWalker::new(&options).walk(&fs, start, max_depth, &mut visitor)?;
        visitor.write_chunk();
        Ok(())
    });
    Ok((rx, handle))
}

/// Runs a walk to completion and returns every event in order.
pub async fn collect_events<F>(
    fs: F,
    start: impl Into<Location>,
    options: WalkOptions,
    max_depth: usize,
    chunk_size: usize,
) -> Result<Vec<WalkEvent>, Error>
where
    F: AttributeReader + DirectoryLister + Send + 'static,
{
    let (mut rx, handle) = spawn_walk(fs, start, options, max_depth, chunk_size)?;
    let mut events = Vec::new();
    while let Some(mut chunk) = rx.recv().await {
        events.append(&mut chunk);
    }
    handle.await.map_err(|e| Error::Sync {
        what: "failed to join walk thread".to_owned(),
        how: e.to_string(),
    })??;
    Ok(events)
}
