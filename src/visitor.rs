use std::io;
use std::path::Path;

#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::BasicAttributes;
use crate::Error;

/// What the walker should do after a visitor event.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum VisitOutcome {
    /// Keep walking.
    Continue,
    /// Stop the whole walk.
    Terminate,
    /// Do not descend into the directory just entered. Same as `Continue`
    /// for any other event.
    SkipSubtree,
    /// Do not visit the remaining entries of the current directory.
    SkipSiblings,
}

/// Receives traversal events and steers the walk.
///
/// The provided bodies make a strict visitor: everything is visited, and
/// any I/O failure aborts the walk with an [`Error`]. Override the failure
/// hooks to keep walking past unreadable entries.
pub trait FileVisitor {
    /// Called before the entries of a directory are visited.
    fn enter_directory(
        &mut self,
        _dir: &Path,
        _attributes: &BasicAttributes,
    ) -> Result<VisitOutcome, Error> {
        Ok(VisitOutcome::Continue)
    }

    /// Called when a directory could not be opened for listing.
    fn enter_directory_failed(
        &mut self,
        dir: &Path,
        error: io::Error,
    ) -> Result<VisitOutcome, Error> {
        Err(Error::open(dir, &error))
    }

    /// Called for every non-directory, for directories at the depth limit,
    /// and for directories that close a cycle.
    fn visit_file(
        &mut self,
        _file: &Path,
        _attributes: &BasicAttributes,
    ) -> Result<VisitOutcome, Error> {
        Ok(VisitOutcome::Continue)
    }

    /// Called when the attributes of a location could not be read.
    fn visit_file_failed(&mut self, file: &Path, error: io::Error) -> Result<VisitOutcome, Error> {
        Err(Error::read(file, &error))
    }

    /// Called after the entries of an entered directory, with the error that
    /// cut the listing short, if any.
    fn leave_directory(
        &mut self,
        dir: &Path,
        error: Option<io::Error>,
    ) -> Result<VisitOutcome, Error> {
        match error {
            Some(error) => Err(Error::iterate(dir, &error)),
            None => Ok(VisitOutcome::Continue),
        }
    }
}

/// A visitor with the strict default behaviour and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleVisitor;

impl FileVisitor for SimpleVisitor {}

impl<V: FileVisitor + ?Sized> FileVisitor for &mut V {
    fn enter_directory(
        &mut self,
        dir: &Path,
        attributes: &BasicAttributes,
    ) -> Result<VisitOutcome, Error> {
        (**self).enter_directory(dir, attributes)
    }

    fn enter_directory_failed(
        &mut self,
        dir: &Path,
        error: io::Error,
    ) -> Result<VisitOutcome, Error> {
        (**self).enter_directory_failed(dir, error)
    }

    fn visit_file(
        &mut self,
        file: &Path,
        attributes: &BasicAttributes,
    ) -> Result<VisitOutcome, Error> {
        (**self).visit_file(file, attributes)
    }

    fn visit_file_failed(&mut self, file: &Path, error: io::Error) -> Result<VisitOutcome, Error> {
        (**self).visit_file_failed(file, error)
    }

    fn leave_directory(
        &mut self,
        dir: &Path,
        error: Option<io::Error>,
    ) -> Result<VisitOutcome, Error> {
        (**self).leave_directory(dir, error)
    }
}
