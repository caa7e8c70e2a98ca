//! SHA-256 digests of file contents, and a visitor that collects them.
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use sha2::Digest;
use sha2::Sha256;

use crate::BasicAttributes;
use crate::FileVisitor;
use crate::VisitOutcome;
use crate::errors::Error;

pub(crate) trait Sha256Builder {
    fn sha256_build(&self) -> Result<Sha256, Error>;

    fn sha256_update(&self, data: &[u8], context: &mut Sha256) {
        context.update(data);
    }
}

pub(crate) trait Sha256String {
    fn sha256_string(self) -> String;
}

impl Sha256String for Sha256 {
    fn sha256_string(self) -> String {
        format!("{:x}", self.finalize())
    }
}

impl Sha256Builder for &Path {
    fn sha256_build(&self) -> Result<Sha256, Error> {
        let mut file = fs::File::open(self).map_err(|e| Error::read(self, &e))?;
        let mut context = Sha256::new();
        let mut buffer = vec![0; 4096]; // Read in chunks

        loop {
            let bytes_read = file.read(&mut buffer).map_err(|e| Error::read(self, &e))?;

            if bytes_read == 0 {
                break; // End of file
            }
            self.sha256_update(&buffer[..bytes_read], &mut context);
        }
        Ok(context)
    }
}

impl Sha256Builder for &[u8] {
    fn sha256_build(&self) -> Result<Sha256, Error> {
        let mut context = Sha256::new();
        self.sha256_update(self, &mut context);
        Ok(context)
    }
}

/// Returns the hex SHA-256 digest of the file at `path`.
pub fn sha256_file(path: &Path) -> Result<String, Error> {
    Ok(path.sha256_build()?.sha256_string())
}

/// Returns the hex SHA-256 digest of `data`.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut context = Sha256::new();
    data.sha256_update(data, &mut context);
    context.sha256_string()
}

/// Digests every regular file of a walk.
///
/// Failures never stop the walk; they are kept next to the digests so the
/// caller can decide what an incomplete tree means.
#[derive(Debug, Default, Clone)]
pub struct DigestVisitor {
    digests: BTreeMap<PathBuf, String>,
    failures: BTreeMap<PathBuf, String>,
}

impl DigestVisitor {
    /// Creates an empty visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Digests gathered so far, by path.
    pub fn digests(&self) -> &BTreeMap<PathBuf, String> {
        &self.digests
    }

    /// Locations that could not be read or listed, with the reason.
    pub fn failures(&self) -> &BTreeMap<PathBuf, String> {
        &self.failures
    }

    /// Consumes the visitor, returning the digests.
    pub fn into_digests(self) -> BTreeMap<PathBuf, String> {
        self.digests
    }

    fn fail(&mut self, path: &Path, how: String) -> Result<VisitOutcome, Error> {
        self.failures.insert(path.to_path_buf(), how);
        Ok(VisitOutcome::Continue)
    }
}

impl FileVisitor for DigestVisitor {
    fn enter_directory_failed(
        &mut self,
        dir: &Path,
        error: io::Error,
    ) -> Result<VisitOutcome, Error> {
        self.fail(dir, error.to_string())
    }

    fn visit_file(
        &mut self,
        file: &Path,
        attributes: &BasicAttributes,
    ) -> Result<VisitOutcome, Error> {
        if !attributes.is_regular_file() {
            return Ok(VisitOutcome::Continue);
        }
        match sha256_file(file) {
            Ok(digest) => {
                self.digests.insert(file.to_path_buf(), digest);
                Ok(VisitOutcome::Continue)
            }
            Err(e) => self.fail(file, e.to_string()),
        }
    }

    fn visit_file_failed(&mut self, file: &Path, error: io::Error) -> Result<VisitOutcome, Error> {
        self.fail(file, error.to_string())
    }

    fn leave_directory(
        &mut self,
        dir: &Path,
        error: Option<io::Error>,
    ) -> Result<VisitOutcome, Error> {
        match error {
            Some(error) => self.fail(dir, error.to_string()),
            None => Ok(VisitOutcome::Continue),
        }
    }
}
