// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Filtered file tree copying.
//!
//! Package installation boils down to overlaying the file tree of a package
//! onto a target directory of the project. Not every file of a package
//! belongs in the target though. Version control metadata, asset
//! directories that get copied elsewhere, and anything a package lists in its
//! own blacklist must stay behind.
//!
//! # Blacklist Filters
//!
//! A __filter__ is a list of glob expressions matched against paths relative
//! to the copy source. Several filters can be combined into one by simple
//! concatenation, such that an entry is excluded if _any_ of the combined
//! filters would exclude it. See [`glob`] for the glob dialect.
//!
//! # Overwrite Policy
//!
//! Copying always overwrites existing destination files. Whether a copy
//! should happen at all is for the caller to decide. There is no rollback
//! either: files copied before a failure stay on disk.

pub mod glob;
pub mod walk;

use crate::copy::{
    glob::{GlobError, GlobList},
    walk::{FilteredWalk, WalkError},
};

use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

/// Combine independent filters into one by concatenation.
pub fn combine_filters<F, S>(filters: impl IntoIterator<Item = F>) -> Vec<String>
where
    F: IntoIterator<Item = S>,
    S: Into<String>,
{
    filters
        .into_iter()
        .flat_map(|filter| filter.into_iter().map(Into::into))
        .collect()
}

/// Copy contents of `source` into `target` excluding blacklisted entries.
///
/// Relative structure is preserved. Directories are created as needed,
/// existing files are overwritten. A missing source copies nothing.
///
/// # Errors
///
/// - Return [`CopyError::Glob`] if the blacklist is malformed.
/// - Return [`CopyError::Walk`] if source cannot be traversed.
/// - Return [`CopyError::CreateDir`] if destination directory cannot be
///   created.
/// - Return [`CopyError::CopyFile`] if a file cannot be copied.
#[instrument(skip(source, target, blacklist), level = "debug")]
pub fn copy_filtered(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
    blacklist: impl IntoIterator<Item = impl Into<String>>,
) -> Result<()> {
    let blacklist = GlobList::new(blacklist)?;
    copy_walk(
        FilteredWalk::blacklisted(source.as_ref(), blacklist),
        target.as_ref(),
    )
}

/// Copy every entry of a walk below `target`.
///
/// # Errors
///
/// - Return [`CopyError::Walk`] if walk fails.
/// - Return [`CopyError::CreateDir`] if destination directory cannot be
///   created.
/// - Return [`CopyError::CopyFile`] if a file cannot be copied.
pub fn copy_walk(walk: FilteredWalk, target: &Path) -> Result<()> {
    debug!(
        "copy {:?} to {:?}",
        walk.root().display(),
        target.display()
    );

    if walk.root().is_dir() {
        create_dir(target)?;
    }

    let mut copied = 0usize;
    for entry in walk {
        let entry = entry?;
        let destination = target.join(entry.relative_path());
        if entry.is_dir() {
            create_dir(&destination)?;
        } else {
            copy_file(entry.path(), &destination)?;
            copied += 1;
        }
    }

    debug!("copied {copied} files into {:?}", target.display());
    Ok(())
}

/// Copy a single file, creating parent directories of the destination.
///
/// # Errors
///
/// - Return [`CopyError::CreateDir`] if parent directory cannot be created.
/// - Return [`CopyError::CopyFile`] if file cannot be copied.
pub fn copy_file(source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<()> {
    let (source, target) = (source.as_ref(), target.as_ref());
    if let Some(parent) = target.parent() {
        create_dir(parent)?;
    }

    trace!("copy file {:?} to {:?}", source.display(), target.display());
    std::fs::copy(source, target).map_err(|err| CopyError::CopyFile {
        source: err,
        from: source.to_path_buf(),
        to: target.to_path_buf(),
    })?;

    Ok(())
}

/// Create directory and all of its missing parents.
///
/// # Errors
///
/// - Return [`CopyError::CreateDir`] if directory cannot be created.
pub fn create_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    mkdirp::mkdirp(path).map_err(|err| CopyError::CreateDir {
        source: err,
        path: path.to_path_buf(),
    })?;

    Ok(())
}

/// File copy error types.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// Blacklist contains invalid glob expression.
    #[error(transparent)]
    Glob(#[from] GlobError),

    /// Source tree cannot be traversed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// Destination directory cannot be created.
    #[error("failed to create directory at {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be copied.
    #[error("failed to copy {:?} to {:?}", from.display(), to.display())]
    CopyFile {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },

    /// File cannot be read.
    #[error("failed to read {:?}", path.display())]
    ReadFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = CopyError> = std::result::Result<T, E>;
