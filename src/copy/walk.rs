// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Filtered directory traversal.
//!
//! Walks a directory subtree lazily, and drops every entry whose path
//! relative to the walk root is rejected by an exclusion predicate. An
//! excluded directory is pruned, so nothing below it is ever visited. Thus,
//! a single `.git` pattern is enough to keep an entire repository database
//! out of the result.
//!
//! The traversal itself is handled by [`ignore::WalkBuilder`] with all of
//! its standard ignore file handling switched off. Only the predicate
//! decides what survives.

use crate::{
    copy::glob::GlobList,
    path::{normalize_separators, relative_to},
};

use ignore::{Walk, WalkBuilder};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Entry that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    path: PathBuf,
    relative: String,
    relative_path: PathBuf,
    is_dir: bool,
}

impl WalkEntry {
    /// Absolute path to entry.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Path relative to walk root, always `/` separated.
    ///
    /// Meant for matching only. Name decoding is lossy.
    pub fn relative(&self) -> &str {
        self.relative.as_str()
    }

    /// Path relative to walk root exactly as found on disk.
    pub fn relative_path(&self) -> &Path {
        self.relative_path.as_path()
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

/// Lazy walk over a directory subtree.
///
/// Consumed once. Start a new walk for each consumer.
pub struct FilteredWalk {
    root: PathBuf,
    inner: Option<Walk>,
}

impl FilteredWalk {
    /// Walk `root`, excluding every entry for which `exclude` returns true.
    ///
    /// The predicate receives the normalized relative path of each entry.
    /// A missing root yields no entries at all.
    pub fn new<P>(root: impl Into<PathBuf>, exclude: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let root = root.into();

        // INVARIANT: Nothing to copy is not an error.
        if !root.exists() {
            trace!("walk root {:?} does not exist", root.display());
            return Self { root, inner: None };
        }

        let filter_root = root.clone();
        let inner = WalkBuilder::new(&root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|lhs, rhs| lhs.cmp(rhs))
            .filter_entry(move |entry| match relative_to(&filter_root, entry.path()) {
                Some(relative) if !relative.is_empty() => {
                    let keep = !exclude(&relative);
                    if !keep {
                        trace!("exclude {relative:?}");
                    }
                    keep
                }
                _ => true,
            })
            .build();

        Self {
            root,
            inner: Some(inner),
        }
    }

    /// Walk `root`, excluding every entry that matches the blacklist.
    pub fn blacklisted(root: impl Into<PathBuf>, blacklist: GlobList) -> Self {
        Self::new(root, move |relative| blacklist.is_match_any(relative))
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }
}

impl Iterator for FilteredWalk {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;
        loop {
            let entry = match inner.next()? {
                Ok(entry) => entry,
                Err(error) => {
                    return Some(Err(WalkError {
                        root: self.root.clone(),
                        source: error,
                    }))
                }
            };

            // INVARIANT: The root itself is never yielded.
            if entry.depth() == 0 {
                continue;
            }

            let Ok(relative_path) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let relative_path = relative_path.to_path_buf();
            let relative = normalize_separators(relative_path.to_string_lossy());

            let is_dir = entry.file_type().is_some_and(|kind| kind.is_dir());
            return Some(Ok(WalkEntry {
                path: entry.into_path(),
                relative,
                relative_path,
                is_dir,
            }));
        }
    }
}

/// Directory traversal failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to walk directory tree at {:?}", root.display())]
pub struct WalkError {
    root: PathBuf,
    #[source]
    source: ignore::Error,
}

/// Friendly result alias :3
pub type Result<T, E = WalkError> = std::result::Result<T, E>;
