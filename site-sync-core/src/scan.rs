//! Local tree scanning: turns the sync root into the set of relative,
//! forward-slash file paths that should exist remotely.
//!
//! Hidden entries (any component starting with `.`) are excluded at every
//! depth: a hidden directory is pruned from the walk entirely.

use std::borrow::Borrow;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error};
use walkdir::{DirEntry, WalkDir};

use crate::contract::SyncError;

/// A file path relative to the sync root, `/`-separated. Doubles as the remote object name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FilePath(String);

impl FilePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Location of this file on disk under `root`.
    pub fn to_local_path(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, seg| acc.join(seg))
    }

    fn from_relative(relative: &Path) -> Self {
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        FilePath(joined)
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FilePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        FilePath(s.to_owned())
    }
}

/// True when a single path component is hidden.
pub fn is_hidden_component(name: &str) -> bool {
    name.starts_with('.')
}

/// True when any `/`-separated component of `path` is hidden.
pub fn is_hidden_path(path: &str) -> bool {
    path.split('/').any(is_hidden_component)
}

/// Lazy walk over the non-hidden regular files below a root.
///
/// Yields paths in file-name order within each directory. A walk error below
/// the root is yielded once as [`SyncError::DirectoryUnreadable`].
pub struct LocalTree {
    root: PathBuf,
    walker: walkdir::FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>,
}

impl Iterator for LocalTree {
    type Item = Result<FilePath, SyncError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                    error!(path = %path.display(), error = %e, "[SCAN] Failed to read directory entry");
                    return Some(Err(SyncError::DirectoryUnreadable { path, source: e }));
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let file_path = FilePath::from_relative(relative);
            if file_path.as_str().is_empty() || is_hidden_path(file_path.as_str()) {
                continue;
            }

            debug!(file = %file_path, "[SCAN] Found file");
            return Some(Ok(file_path));
        }
    }
}

fn is_visible(entry: &DirEntry) -> bool {
    // The root itself may legitimately live under a dot-directory.
    entry.depth() == 0
        || entry
            .file_name()
            .to_str()
            .map(|name| !is_hidden_component(name))
            .unwrap_or(true)
}

/// Start a scan of `root`.
///
/// Fails immediately with [`SyncError::DirectoryNotFound`] when `root` is
/// missing or not a directory; otherwise the returned iterator does the walk.
pub fn scan_tree(root: impl AsRef<Path>) -> Result<LocalTree, SyncError> {
    let root = root.as_ref();
    if !root.is_dir() {
        error!(path = %root.display(), "[SCAN] Source directory does not exist");
        return Err(SyncError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_visible as fn(&DirEntry) -> bool);

    Ok(LocalTree {
        root: root.to_path_buf(),
        walker,
    })
}
