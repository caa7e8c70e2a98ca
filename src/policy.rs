use std::path::Path;
use std::path::PathBuf;

use log::debug;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::AccessError;
use crate::AttributeReader;
use crate::BasicAttributes;
use crate::DirectoryLister;
use crate::LinkOption;

/// Decision of an [`AccessPolicy`] for one path.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Access {
    /// Neither attributes nor listings may be read.
    Deny,

    /// The path is an ancestor of an allowed root. It may be read and
    /// listed so a walk can reach the allowed root below it.
    Traverse,

    /// The path is fully accessible.
    Allow,
}

/// Allow and deny rules over path prefixes.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AccessPolicy {
    /// Paths that are explicitly allowed.
    /// If empty, all paths are allowed unless denied.
    allowed_roots: Vec<PathBuf>,

    /// Paths that are explicitly denied.
    /// These override allowed_roots.
    denied_roots: Vec<PathBuf>,
}

impl AccessPolicy {
    /// Create a new, empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new policy with given roots
    pub fn create_with<P: AsRef<Path>>(allowed_paths: &[P], denied_paths: &[P]) -> Self {
        Self {
            allowed_roots: allowed_paths
                .iter()
                .map(|p| p.as_ref().to_path_buf())
                .collect(),
            denied_roots: denied_paths
                .iter()
                .map(|p| p.as_ref().to_path_buf())
                .collect(),
        }
    }

    /// Add new allowed root.
    pub fn allow_path<P: AsRef<Path>>(&mut self, path: P) {
        self.allowed_roots.push(path.as_ref().to_path_buf());
    }

    /// Add new denied root. Denied roots override allowed ones.
    pub fn deny_path<P: AsRef<Path>>(&mut self, path: P) {
        self.denied_roots.push(path.as_ref().to_path_buf());
    }

    /// Decides how `path` may be accessed.
    pub fn check<P: AsRef<Path>>(&self, path: P) -> Access {
        let path = path.as_ref();

        // If the path starts with any denied root, it is rejected.
        if self.denied_roots.iter().any(|denied| path.starts_with(denied)) {
            return Access::Deny;
        }

        if self.allowed_roots.is_empty()
            || self.allowed_roots.iter().any(|root| path.starts_with(root))
        {
            return Access::Allow;
        }

        if self.allowed_roots.iter().any(|root| root.starts_with(path)) {
            return Access::Traverse;
        }

        Access::Deny
    }
}

/// Enforces an [`AccessPolicy`] in front of another file system.
///
/// Both the path as given and the path with its symbolic links resolved
/// must pass the policy, so a link cannot lead into a denied root. Refused
/// paths fail with [`AccessError::Denied`], which the walker skips without
/// telling the visitor.
#[derive(Debug)]
pub struct GuardedFs<F> {
    inner: F,
    policy: AccessPolicy,
}

impl<F> GuardedFs<F> {
    /// Wraps `inner` with `policy`.
    pub fn new(inner: F, policy: AccessPolicy) -> Self {
        Self { inner, policy }
    }

    /// The policy being enforced.
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    fn check(&self, path: &Path) -> Result<(), AccessError> {
        match self.policy.check(path) {
            Access::Deny => {
                debug!("policy refuses {}", path.display());
                Err(AccessError::denied(path, "outside the access policy"))
            }
            Access::Traverse | Access::Allow => Ok(()),
        }
    }
}

impl<F: AttributeReader> GuardedFs<F> {
    /// Where `path` really points. With `NoFollow` the final component is
    /// left alone and only the parent is resolved.
    fn target(&self, path: &Path, link: LinkOption) -> Option<PathBuf> {
        match link {
            LinkOption::Follow => self.inner.resolve(path).ok(),
            LinkOption::NoFollow => {
                let name = path.file_name()?;
                let parent = self.inner.resolve(path.parent()?).ok()?;
                Some(parent.join(name))
            }
        }
    }

    fn guard(&self, path: &Path, link: LinkOption) -> Result<(), AccessError> {
        self.check(path)?;
        match self.target(path, link) {
            Some(target) if target != path => self.check(&target).map_err(|_| {
                AccessError::denied(
                    path,
                    format!("resolves to {} outside the access policy", target.display()),
                )
            }),
            // Unresolvable paths fail in the wrapped file system itself.
            _ => Ok(()),
        }
    }
}

impl<F: AttributeReader> AttributeReader for GuardedFs<F> {
    fn read_attributes(
        &self,
        path: &Path,
        link: LinkOption,
    ) -> Result<BasicAttributes, AccessError> {
        self.guard(path, link)?;
        self.inner.read_attributes(path, link)
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, AccessError> {
        self.guard(path, LinkOption::Follow)?;
        self.inner.resolve(path)
    }

    fn is_same_file(&self, a: &Path, b: &Path) -> Result<bool, AccessError> {
        self.guard(a, LinkOption::Follow)?;
        self.guard(b, LinkOption::Follow)?;
        self.inner.is_same_file(a, b)
    }

    fn invalidate(&self, path: &Path) {
        self.inner.invalidate(path)
    }
}

impl<F: AttributeReader + DirectoryLister> DirectoryLister for GuardedFs<F> {
    type Stream = F::Stream;

    fn open_directory(&self, path: &Path) -> Result<Self::Stream, AccessError> {
        self.guard(path, LinkOption::Follow)?;
        self.inner.open_directory(path)
    }
}
