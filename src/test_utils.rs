use std::fs::create_dir_all;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use async_walkdir::WalkDir;
use futures_lite::StreamExt;
use similar::ChangeTag;
use similar::TextDiff;
use tempdir::TempDir;

use crate::Error;

// Relative paths to create in the temporary tree, and whether each one is a
// directory. Every file holds its own stem, so "dir1/file3.txt" contains
// "file3".
pub(crate) static TEMP_FILES: &[(&str, &str, bool)] = &[
    ("file1.txt", "file1", false),
    ("file2.txt", "file2", false),
    ("dir1", "", true),
    ("dir1/file3.txt", "file3", false),
    ("dir1/dir2", "", true),
    ("dir1/dir2/file4.txt", "file4", false),
    ("dir1/dir2/dir_empty1", "", true),
    ("dir3", "", true),
    ("dir3/file6.txt", "file6", false),
];

/// A temporary directory populated with a small fixed tree.
#[derive(Debug)]
pub struct TestRoot {
    root: TempDir,
}

fn create_error(path: &Path, e: &io::Error) -> Error {
    Error::Open {
        what: format!("test tree entry {}", path.display()),
        how: e.to_string(),
    }
}

impl TestRoot {
    /// Creates the temporary directory and the files of `TEMP_FILES`.
    pub fn new() -> Result<Self, Error> {
        let root = TempDir::new("ftw").map_err(|e| create_error(Path::new("ftw"), &e))?;
        for (relative_path, contents, is_dir) in TEMP_FILES {
            let full_path = root.path().join(relative_path);
            if *is_dir {
                create_dir_all(&full_path).map_err(|e| create_error(&full_path, &e))?;
                continue;
            }
            if let Some(parent) = full_path.parent() {
                create_dir_all(parent).map_err(|e| create_error(parent, &e))?;
            }
            std::fs::write(&full_path, contents).map_err(|e| create_error(&full_path, &e))?;
        }
        Ok(Self { root })
    }

    /// Root of the temporary tree.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a symbolic link at `link` pointing to `target`, both relative
    /// to the root. The link stores the absolute target path.
    #[cfg(unix)]
    pub fn symlink(&self, link: &str, target: &str) -> io::Result<()> {
        std::os::unix::fs::symlink(self.path().join(target), self.path().join(link))
    }

    /// Lists every path below the root, relative to it and sorted, using a
    /// walker independent from this crate's.
    pub async fn paths_on_disk(&self) -> Result<Vec<PathBuf>, Error> {
        let mut paths = vec![];
        let mut entries = WalkDir::new(self.path());
        loop {
            match entries.next().await {
                Some(Ok(entry)) => {
                    let path = entry.path();
                    match path.strip_prefix(self.path()) {
                        Ok(relative) if !relative.as_os_str().is_empty() => {
                            paths.push(relative.to_path_buf())
                        }
                        _ => {}
                    }
                }
                Some(Err(e)) => {
                    return Err(Error::Iterate {
                        what: self.path().display().to_string(),
                        how: e.to_string(),
                    });
                }
                None => break,
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Returns none if both listings are identical, or a diff of the two
    /// otherwise.
    pub fn compare_listing(expected: &[PathBuf], actual: &[PathBuf]) -> Option<String> {
        let render = |paths: &[PathBuf]| {
            paths
                .iter()
                .map(|p| format!("{}\n", p.display()))
                .collect::<String>()
        };
        let expected = render(expected);
        let actual = render(actual);

        let diff = TextDiff::from_lines(&expected, &actual);
        let mut diffs = String::new();
        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => continue,
            };

            diffs.push_str(&format!("{}{}", sign, change));
        }
        if diffs.is_empty() { None } else { Some(diffs) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tree_matches_the_fixture() {
        let root = TestRoot::new().unwrap();
        let expected: Vec<PathBuf> = {
            let mut paths: Vec<PathBuf> = TEMP_FILES.iter().map(|f| PathBuf::from(f.0)).collect();
            paths.sort();
            paths
        };
        let on_disk = root.paths_on_disk().await.unwrap();
        assert_eq!(TestRoot::compare_listing(&expected, &on_disk), None);
    }

    #[test]
    fn listing_diff_names_the_difference() {
        let diff = TestRoot::compare_listing(
            &[PathBuf::from("a"), PathBuf::from("b")],
            &[PathBuf::from("a"), PathBuf::from("c")],
        )
        .unwrap();
        assert_eq!(diff, "-b\n+c\n");
    }
}
