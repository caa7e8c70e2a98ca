//! Depth-first walk over a file tree.
//!
//! The walk keeps one [`Frame`] per directory currently being listed. A
//! frame owns the open stream, so the stream is closed whenever the frame
//! goes away: after the directory's last entry, on `Terminate`, or when a
//! visitor error unwinds the walk. The frame stack doubles as the ancestor
//! list used for cycle detection.
use std::io;
use std::path::Path;
use std::path::PathBuf;

use log::debug;
use log::trace;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::AccessError;
use crate::AttributeReader;
use crate::BasicAttributes;
use crate::DirectoryLister;
use crate::DirectoryStream;
use crate::Error;
use crate::FileKey;
use crate::FileVisitor;
use crate::LinkOption;
use crate::Location;
use crate::VisitOutcome;

/// Depth that never cuts a walk short.
pub const MAX_DEPTH: usize = usize::MAX;

/// A single traversal option.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum WalkOption {
    /// Follow symbolic links. Implies `DetectCycles`.
    FollowLinks,
    /// Report directories that are their own ancestors instead of entering
    /// them again.
    DetectCycles,
}

/// Options fixed for the duration of one walk.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
#[serde(default)]
pub struct WalkOptions {
    follow_links: bool,
    detect_cycles: bool,
}

impl WalkOptions {
    /// Options with links not followed and no cycle detection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures whether symbolic links are followed.
    #[must_use]
    pub const fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Configures cycle detection. Always on while links are followed.
    #[must_use]
    pub const fn detect_cycles(mut self, detect: bool) -> Self {
        self.detect_cycles = detect;
        self
    }

    /// Whether symbolic links are followed.
    pub fn is_following_links(&self) -> bool {
        self.follow_links
    }

    /// Whether cycles are detected, taking link following into account.
    pub fn is_detecting_cycles(&self) -> bool {
        self.follow_links || self.detect_cycles
    }
}

impl FromIterator<WalkOption> for WalkOptions {
    fn from_iter<I: IntoIterator<Item = WalkOption>>(iter: I) -> Self {
        iter.into_iter()
            .fold(WalkOptions::default(), |options, option| match option {
                WalkOption::FollowLinks => options.follow_links(true),
                WalkOption::DetectCycles => options.detect_cycles(true),
            })
    }
}

/// Drives a visitor over a file tree.
#[derive(Debug, Clone)]
pub struct FileTreeWalker {
    follow_links: bool,
    detect_cycles: bool,
    link_option: LinkOption,
}

/// Closes the stream exactly once, on drop.
struct OpenStream<S: DirectoryStream> {
    dir: PathBuf,
    inner: S,
}

impl<S: DirectoryStream> Drop for OpenStream<S> {
    fn drop(&mut self) {
        if let Err(e) = self.inner.close() {
            debug!("ignoring close failure on {}: {e}", self.dir.display());
        }
    }
}

/// A directory that was entered and whose entries are being visited.
struct Frame<S: DirectoryStream> {
    stream: OpenStream<S>,
    file_key: Option<FileKey>,
    depth: usize,
    error: Option<io::Error>,
    done: bool,
}

impl<S: DirectoryStream> Frame<S> {
    fn path(&self) -> &Path {
        &self.stream.dir
    }

    fn next_entry(&mut self) -> Option<io::Result<Location>> {
        if self.done {
            return None;
        }
        self.stream.inner.next()
    }

    /// Closes the stream and hands back what `leave_directory` needs.
    fn finish(self) -> (PathBuf, Option<io::Error>) {
        let Frame { stream, error, .. } = self;
        let dir = stream.dir.clone();
        drop(stream);
        (dir, error)
    }
}

enum Step<S: DirectoryStream> {
    Done(VisitOutcome),
    Entered(Frame<S>),
}

impl FileTreeWalker {
    /// Creates a walker for the given options.
    pub fn new(options: &WalkOptions) -> Self {
        let follow_links = options.is_following_links();
        Self {
            follow_links,
            detect_cycles: options.is_detecting_cycles(),
            link_option: if follow_links {
                LinkOption::Follow
            } else {
                LinkOption::NoFollow
            },
        }
    }

    /// Walks the tree below `start`, at most `max_depth` levels deep.
    ///
    /// Depth 0 is `start` itself; a directory at `max_depth` is reported
    /// through [`FileVisitor::visit_file`] and not opened. The walk ends
    /// early on [`VisitOutcome::Terminate`] or when the visitor returns an
    /// error, which is returned unchanged.
    pub fn walk<F, V>(
        &self,
        fs: &F,
        start: impl Into<Location>,
        max_depth: usize,
        mut visitor: V,
    ) -> Result<(), Error>
    where
        F: AttributeReader + DirectoryLister + ?Sized,
        V: FileVisitor,
    {
        let mut start = start.into();
        // Attributes obtained before the walk started may be stale.
        start.invalidate();
        fs.invalidate(start.path());
        debug!(
            "walking {} (max depth {max_depth}, follow links {})",
            start.path().display(),
            self.follow_links
        );

        let mut stack: Vec<Frame<F::Stream>> = Vec::new();
        match self.visit(fs, start, 0, max_depth, &stack, &mut visitor)? {
            Step::Done(_) => return Ok(()),
            Step::Entered(frame) => stack.push(frame),
        }

        while let Some(top) = stack.last_mut() {
            let depth = top.depth + 1;
            let outcome = match top.next_entry() {
                Some(Ok(entry)) => {
                    match self.visit(fs, entry, depth, max_depth, &stack, &mut visitor)? {
                        Step::Entered(frame) => {
                            stack.push(frame);
                            continue;
                        }
                        Step::Done(outcome) => outcome,
                    }
                }
                Some(Err(e)) => {
                    if let Some(top) = stack.last_mut() {
                        debug!("listing {} failed: {e}", top.path().display());
                        top.error = Some(e);
                        top.done = true;
                    }
                    continue;
                }
                None => {
                    let Some(frame) = stack.pop() else {
                        break;
                    };
                    let (dir, error) = frame.finish();
                    trace!("leaving {}", dir.display());
                    visitor.leave_directory(&dir, error)?
                }
            };

            match outcome {
                VisitOutcome::Terminate => {
                    debug!("walk terminated by visitor");
                    return Ok(());
                }
                VisitOutcome::SkipSiblings => {
                    if let Some(parent) = stack.last_mut() {
                        parent.done = true;
                    }
                }
                VisitOutcome::Continue | VisitOutcome::SkipSubtree => {}
            }
        }
        Ok(())
    }

    /// Handles one location. Returns the visitor's outcome, or a frame if
    /// the location is a directory that was opened and entered.
    fn visit<F, V>(
        &self,
        fs: &F,
        location: Location,
        depth: usize,
        max_depth: usize,
        ancestors: &[Frame<F::Stream>],
        visitor: &mut V,
    ) -> Result<Step<F::Stream>, Error>
    where
        F: AttributeReader + DirectoryLister + ?Sized,
        V: FileVisitor,
    {
        if depth > max_depth {
            return Ok(Step::Done(VisitOutcome::Continue));
        }
        let path = location.path();

        let attributes = match self.read_attributes(fs, &location) {
            Ok(attributes) => attributes,
            Err(AccessError::Denied { how, .. }) => {
                debug!("skipping {}: {how}", path.display());
                return Ok(Step::Done(VisitOutcome::Continue));
            }
            Err(AccessError::Io(e)) => {
                return visitor.visit_file_failed(path, e).map(Step::Done);
            }
        };

        if depth >= max_depth || !attributes.is_directory() {
            return visitor.visit_file(path, &attributes).map(Step::Done);
        }

        if self.detect_cycles && closes_cycle(fs, path, &attributes, ancestors) {
            debug!("{} is its own ancestor", path.display());
            return visitor.visit_file(path, &attributes).map(Step::Done);
        }

        let stream = match fs.open_directory(path) {
            Ok(inner) => OpenStream {
                dir: path.to_path_buf(),
                inner,
            },
            Err(AccessError::Denied { how, .. }) => {
                debug!("not listing {}: {how}", path.display());
                return Ok(Step::Done(VisitOutcome::Continue));
            }
            Err(AccessError::Io(e)) => {
                return visitor.enter_directory_failed(path, e).map(Step::Done);
            }
        };

        trace!("entering {}", path.display());
        let outcome = visitor.enter_directory(path, &attributes)?;
        if outcome != VisitOutcome::Continue {
            return Ok(Step::Done(outcome));
        }
        Ok(Step::Entered(Frame {
            stream,
            file_key: attributes.file_key,
            depth,
            error: None,
            done: false,
        }))
    }

    fn read_attributes<F>(&self, fs: &F, location: &Location) -> Result<BasicAttributes, AccessError>
    where
        F: AttributeReader + ?Sized,
    {
        if let Some(cached) = location.cached_attributes() {
            if !self.follow_links || !cached.is_symbolic_link() {
                return Ok(cached.clone());
            }
        }
        let path = location.path();
        trace!("reading attributes of {}", path.display());
        match fs.read_attributes(path, self.link_option) {
            // A dangling link still has attributes of its own.
            Err(AccessError::Io(e)) if self.follow_links => {
                trace!("{} unreadable through links ({e})", path.display());
                fs.read_attributes(path, LinkOption::NoFollow)
            }
            result => result,
        }
    }
}

fn closes_cycle<F, S>(
    fs: &F,
    path: &Path,
    attributes: &BasicAttributes,
    ancestors: &[Frame<S>],
) -> bool
where
    F: AttributeReader + ?Sized,
    S: DirectoryStream,
{
    ancestors
        .iter()
        .any(|ancestor| match (attributes.file_key, ancestor.file_key) {
            (Some(key), Some(ancestor_key)) => key == ancestor_key,
            _ => fs.is_same_file(path, ancestor.path()).unwrap_or(false),
        })
}

/// Walks the tree below `start` with the given options and depth limit.
pub fn walk_file_tree<F, V>(
    fs: &F,
    start: impl Into<Location>,
    options: &WalkOptions,
    max_depth: usize,
    visitor: V,
) -> Result<(), Error>
where
    F: AttributeReader + DirectoryLister + ?Sized,
    V: FileVisitor,
{
    FileTreeWalker::new(options).walk(fs, start, max_depth, visitor)
}

/// Walks the whole tree below `start` without following links.
pub fn walk<F, V>(fs: &F, start: impl Into<Location>, visitor: V) -> Result<(), Error>
where
    F: AttributeReader + DirectoryLister + ?Sized,
    V: FileVisitor,
{
    walk_file_tree(fs, start, &WalkOptions::default(), MAX_DEPTH, visitor)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::FileType;
    use crate::MemFs;
    use crate::SimpleVisitor;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        links: Vec<PathBuf>,
        script: HashMap<String, VisitOutcome>,
    }

    impl Recorder {
        fn on(mut self, event: &str, outcome: VisitOutcome) -> Self {
            self.script.insert(event.to_owned(), outcome);
            self
        }

        fn record(&mut self, event: String) -> Result<VisitOutcome, Error> {
            let outcome = self
                .script
                .get(&event)
                .copied()
                .unwrap_or(VisitOutcome::Continue);
            self.events.push(event);
            Ok(outcome)
        }
    }

    impl FileVisitor for Recorder {
        fn enter_directory(
            &mut self,
            dir: &Path,
            _attributes: &BasicAttributes,
        ) -> Result<VisitOutcome, Error> {
            self.record(format!("enter {}", dir.display()))
        }

        fn enter_directory_failed(
            &mut self,
            dir: &Path,
            _error: io::Error,
        ) -> Result<VisitOutcome, Error> {
            self.record(format!("open-failed {}", dir.display()))
        }

        fn visit_file(
            &mut self,
            file: &Path,
            attributes: &BasicAttributes,
        ) -> Result<VisitOutcome, Error> {
            if attributes.is_symbolic_link() {
                self.links.push(file.to_path_buf());
            }
            self.record(format!("file {}", file.display()))
        }

        fn visit_file_failed(
            &mut self,
            file: &Path,
            _error: io::Error,
        ) -> Result<VisitOutcome, Error> {
            self.record(format!("failed {}", file.display()))
        }

        fn leave_directory(
            &mut self,
            dir: &Path,
            error: Option<io::Error>,
        ) -> Result<VisitOutcome, Error> {
            match error {
                Some(_) => self.record(format!("leave {} with error", dir.display())),
                None => self.record(format!("leave {}", dir.display())),
            }
        }
    }

    fn sample() -> MemFs {
        MemFs::new()
            .file("/r/a.txt")
            .file("/r/d/b.txt")
            .file("/r/d/c.txt")
            .file("/r/e/f.txt")
            .file("/r/z.txt")
    }

    fn following() -> WalkOptions {
        WalkOptions::new().follow_links(true)
    }

    #[test]
    fn visits_depth_first_in_listing_order() {
        let fs = sample();
        let mut rec = Recorder::default();
        walk(&fs, "/r", &mut rec).unwrap();
        assert_eq!(
            rec.events,
            [
                "enter /r",
                "file /r/a.txt",
                "enter /r/d",
                "file /r/d/b.txt",
                "file /r/d/c.txt",
                "leave /r/d",
                "enter /r/e",
                "file /r/e/f.txt",
                "leave /r/e",
                "file /r/z.txt",
                "leave /r",
            ]
        );
        assert_eq!(fs.opened(), 3);
        assert_eq!(fs.closed(), 3);
    }

    #[test]
    fn depth_zero_visits_only_the_start() {
        let fs = sample();
        let mut rec = Recorder::default();
        walk_file_tree(&fs, "/r", &WalkOptions::new(), 0, &mut rec).unwrap();
        assert_eq!(rec.events, ["file /r"]);
        assert_eq!(fs.opened(), 0);
    }

    #[test]
    fn directories_at_the_depth_limit_are_visited_as_files() {
        let fs = sample();
        let mut rec = Recorder::default();
        walk_file_tree(&fs, "/r", &WalkOptions::new(), 1, &mut rec).unwrap();
        assert_eq!(
            rec.events,
            [
                "enter /r",
                "file /r/a.txt",
                "file /r/d",
                "file /r/e",
                "file /r/z.txt",
                "leave /r",
            ]
        );
        assert_eq!(fs.opened(), 1);
        assert_eq!(fs.closed(), 1);
    }

    #[test]
    fn terminate_stops_every_level() {
        let fs = sample();
        let mut rec = Recorder::default().on("file /r/d/b.txt", VisitOutcome::Terminate);
        walk(&fs, "/r", &mut rec).unwrap();
        assert_eq!(
            rec.events,
            ["enter /r", "file /r/a.txt", "enter /r/d", "file /r/d/b.txt"]
        );
        assert_eq!(fs.opened(), 2);
        assert_eq!(fs.closed(), 2);
    }

    #[test]
    fn terminate_from_leave_stops_the_parent() {
        let fs = sample();
        let mut rec = Recorder::default().on("leave /r/d", VisitOutcome::Terminate);
        walk(&fs, "/r", &mut rec).unwrap();
        assert_eq!(rec.events.last().map(String::as_str), Some("leave /r/d"));
        assert!(!rec.events.iter().any(|e| e == "leave /r"));
        assert_eq!(fs.opened(), fs.closed());
    }

    #[test]
    fn skip_siblings_only_affects_the_current_directory() {
        let fs = sample();
        let mut rec = Recorder::default().on("file /r/d/b.txt", VisitOutcome::SkipSiblings);
        walk(&fs, "/r", &mut rec).unwrap();
        assert_eq!(
            rec.events,
            [
                "enter /r",
                "file /r/a.txt",
                "enter /r/d",
                "file /r/d/b.txt",
                "leave /r/d",
                "enter /r/e",
                "file /r/e/f.txt",
                "leave /r/e",
                "file /r/z.txt",
                "leave /r",
            ]
        );
        assert_eq!(fs.opened(), fs.closed());
    }

    #[test]
    fn skip_subtree_on_enter_skips_entries_and_leave() {
        let fs = sample();
        let mut rec = Recorder::default().on("enter /r/d", VisitOutcome::SkipSubtree);
        walk(&fs, "/r", &mut rec).unwrap();
        assert_eq!(
            rec.events,
            [
                "enter /r",
                "file /r/a.txt",
                "enter /r/d",
                "enter /r/e",
                "file /r/e/f.txt",
                "leave /r/e",
                "file /r/z.txt",
                "leave /r",
            ]
        );
        assert_eq!(fs.opened(), 3);
        assert_eq!(fs.closed(), 3);
    }

    #[test]
    fn skip_siblings_on_enter_stops_the_parent_listing() {
        let fs = sample();
        let mut rec = Recorder::default().on("enter /r/d", VisitOutcome::SkipSiblings);
        walk(&fs, "/r", &mut rec).unwrap();
        assert_eq!(
            rec.events,
            ["enter /r", "file /r/a.txt", "enter /r/d", "leave /r"]
        );
        assert_eq!(fs.opened(), fs.closed());
    }

    #[test]
    fn listing_failure_is_handed_to_leave_directory() {
        let fs = MemFs::new()
            .file("/d/a")
            .file("/d/b")
            .fail_listing_after("/d", 1);
        let mut rec = Recorder::default();
        walk(&fs, "/d", &mut rec).unwrap();
        assert_eq!(rec.events, ["enter /d", "file /d/a", "leave /d with error"]);
        assert_eq!(fs.opened(), 1);
        assert_eq!(fs.closed(), 1);
    }

    #[test]
    fn simple_visitor_aborts_on_listing_failure() {
        let fs = MemFs::new()
            .file("/d/a")
            .file("/d/b")
            .fail_listing_after("/d", 1);
        let err = walk(&fs, "/d", SimpleVisitor).unwrap_err();
        assert!(matches!(err, Error::Iterate { ref what, .. } if what == "/d"));
        assert_eq!(fs.closed(), 1);
    }

    #[test]
    fn visitor_errors_close_every_open_directory() {
        let fs = sample().fail_attributes("/r/d/c.txt");
        let err = walk(&fs, "/r", SimpleVisitor).unwrap_err();
        assert!(matches!(err, Error::Read { ref what, .. } if what == "/r/d/c.txt"));
        assert_eq!(fs.opened(), 2);
        assert_eq!(fs.closed(), 2);
    }

    #[test]
    fn unreadable_attributes_are_reported_and_walk_goes_on() {
        let fs = sample().fail_attributes("/r/a.txt");
        let mut rec = Recorder::default();
        walk(&fs, "/r", &mut rec).unwrap();
        assert_eq!(rec.events[1], "failed /r/a.txt");
        assert_eq!(rec.events.len(), 11);
    }

    #[test]
    fn dangling_link_falls_back_to_link_attributes() {
        let fs = MemFs::new().dir("/r").symlink("/r/dangling", "/nowhere");
        let mut rec = Recorder::default();
        walk_file_tree(&fs, "/r", &following(), MAX_DEPTH, &mut rec).unwrap();
        assert_eq!(rec.events, ["enter /r", "file /r/dangling", "leave /r"]);
        assert_eq!(rec.links, [PathBuf::from("/r/dangling")]);
    }

    #[test]
    fn denied_attributes_skip_the_entry_silently() {
        let fs = sample().deny("/r/d/b.txt");
        let mut rec = Recorder::default();
        walk(&fs, "/r", &mut rec).unwrap();
        assert!(!rec.events.iter().any(|e| e.contains("b.txt")));
        assert!(rec.events.contains(&"file /r/d/c.txt".to_owned()));
    }

    #[test]
    fn denied_open_skips_directory_without_events() {
        let fs = sample().deny_open("/r/d");
        let mut rec = Recorder::default();
        walk(&fs, "/r", &mut rec).unwrap();
        assert!(!rec.events.iter().any(|e| e.contains("/r/d")));
        assert!(rec.events.contains(&"enter /r/e".to_owned()));
    }

    #[test]
    fn failed_open_is_reported_without_enter_or_leave() {
        let fs = sample().fail_open("/r/e");
        let mut rec = Recorder::default();
        walk(&fs, "/r", &mut rec).unwrap();
        let e_events: Vec<_> = rec.events.iter().filter(|e| e.contains("/r/e")).collect();
        assert_eq!(e_events, ["open-failed /r/e"]);
        assert_eq!(fs.opened(), fs.closed());
    }

    #[test]
    fn link_back_to_an_ancestor_is_visited_once_as_a_file() {
        let fs = MemFs::new().file("/r/a/x").symlink("/r/a/back", "/r");
        let mut rec = Recorder::default();
        walk_file_tree(&fs, "/r", &following(), MAX_DEPTH, &mut rec).unwrap();
        assert_eq!(
            rec.events,
            [
                "enter /r",
                "enter /r/a",
                "file /r/a/back",
                "file /r/a/x",
                "leave /r/a",
                "leave /r",
            ]
        );
        assert_eq!(fs.opened(), 2);
        assert_eq!(fs.closed(), 2);
    }

    #[test]
    fn cycles_are_found_without_file_keys() {
        // MemFs keeps the provided same-file check, which compares resolved
        // paths once keys are missing.
        let fs = MemFs::new()
            .file("/r/a/x")
            .symlink("/r/a/back", "/r")
            .without_keys();
        let mut rec = Recorder::default();
        walk_file_tree(&fs, "/r", &following(), 30, &mut rec).unwrap();
        assert_eq!(
            rec.events,
            [
                "enter /r",
                "enter /r/a",
                "file /r/a/back",
                "file /r/a/x",
                "leave /r/a",
                "leave /r",
            ]
        );
        assert_eq!(fs.opened(), 2);
        assert_eq!(fs.closed(), 2);
    }

    #[test]
    fn failing_close_does_not_stop_the_walk() {
        let fs = sample().fail_close("/r/d");
        let mut rec = Recorder::default();
        walk(&fs, "/r", &mut rec).unwrap();
        assert!(rec.events.contains(&"leave /r/d".to_owned()));
        assert_eq!(rec.events.last().map(String::as_str), Some("leave /r"));
        assert_eq!(rec.events.len(), 11);
        assert_eq!(fs.opened(), 3);
        assert_eq!(fs.closed(), 3);
    }

    #[test]
    fn denied_retry_of_a_dangling_link_is_skipped() {
        let fs = MemFs::new()
            .file("/r/a")
            .symlink("/r/dangling", "/nowhere")
            .deny_link("/r/dangling");
        let mut rec = Recorder::default();
        walk_file_tree(&fs, "/r", &following(), MAX_DEPTH, &mut rec).unwrap();
        assert_eq!(rec.events, ["enter /r", "file /r/a", "leave /r"]);
        assert!(rec.links.is_empty());
    }

    #[test]
    fn denied_start_ends_the_walk_quietly() {
        let fs = sample().deny("/r");
        let mut rec = Recorder::default();
        walk(&fs, "/r", &mut rec).unwrap();
        assert!(rec.events.is_empty());
        assert_eq!(fs.opened(), 0);

        let fs = sample().deny_open("/r");
        walk(&fs, "/r", SimpleVisitor).unwrap();
        assert_eq!(fs.opened(), 0);
    }

    #[test]
    fn links_to_unrelated_directories_are_entered() {
        let fs = MemFs::new().file("/s/y").dir("/r").symlink("/r/link", "/s");
        let mut rec = Recorder::default();
        walk_file_tree(&fs, "/r", &following(), MAX_DEPTH, &mut rec).unwrap();
        assert_eq!(
            rec.events,
            [
                "enter /r",
                "enter /r/link",
                "file /r/link/y",
                "leave /r/link",
                "leave /r",
            ]
        );
    }

    #[test]
    fn links_are_not_entered_by_default() {
        let fs = MemFs::new().file("/s/y").dir("/r").symlink("/r/link", "/s");
        let mut rec = Recorder::default();
        walk(&fs, "/r", &mut rec).unwrap();
        assert_eq!(rec.events, ["enter /r", "file /r/link", "leave /r"]);
        assert_eq!(rec.links, [PathBuf::from("/r/link")]);
    }

    #[test]
    fn stale_start_attributes_are_ignored() {
        let fs = sample();
        let stale = Location::with_attributes("/r", BasicAttributes::new(FileType::Regular, None));
        let mut rec = Recorder::default();
        walk(&fs, stale, &mut rec).unwrap();
        assert_eq!(rec.events.first().map(String::as_str), Some("enter /r"));
    }

    #[test]
    fn attributes_cached_by_the_listing_are_used() {
        let fs = sample().cache_listing().fail_attributes("/r/a.txt");
        let mut rec = Recorder::default();
        walk(&fs, "/r", &mut rec).unwrap();
        assert_eq!(rec.events[1], "file /r/a.txt");
    }

    #[test]
    fn options_from_flags() {
        let options: WalkOptions = [WalkOption::FollowLinks].into_iter().collect();
        assert!(options.is_following_links());
        assert!(options.is_detecting_cycles());

        let options: WalkOptions = [WalkOption::DetectCycles].into_iter().collect();
        assert!(!options.is_following_links());
        assert!(options.is_detecting_cycles());

        let options: WalkOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, WalkOptions::default());
        let options: WalkOptions = serde_json::from_str(r#"{"follow_links":true}"#).unwrap();
        assert!(options.is_detecting_cycles());
    }
}
