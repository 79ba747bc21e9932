// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Glob matching works on plain strings that always use `/` as their
//! separator, no matter what platform we happen to run on. These helpers
//! turn file system paths into that form, and determine where the shop
//! source directory lives when nothing was configured.

use std::path::{Path, PathBuf};

/// Default name of the shop source directory inside a project.
pub const SHOP_SOURCE_DIRECTORY: &str = "source";

/// Normalize separators of a path string to `/`.
///
/// Backslashes are converted, repeated separators are collapsed, and a
/// leading `./` is dropped.
pub fn normalize_separators(path: impl AsRef<str>) -> String {
    let path = path.as_ref().replace('\\', "/");
    let mut out = String::with_capacity(path.len());
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }

        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(segment);
    }

    if path.starts_with('/') {
        out.insert(0, '/');
    }

    out
}

/// Compute path of `path` relative to `root` in normalized form.
///
/// Returns [`None`] if `path` does not live under `root`. The root itself
/// maps to an empty string.
pub fn relative_to(root: impl AsRef<Path>, path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .strip_prefix(root.as_ref())
        .ok()
        .map(|relative| normalize_separators(relative.to_string_lossy()))
}

/// Check if a path string is absolute.
///
/// Recognizes a leading separator of either kind, a drive root like `C:`
/// or `C:/`, and URL-like paths such as `vfs://root`.
pub fn is_absolute(path: impl AsRef<str>) -> bool {
    let path = path.as_ref();
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }

    // INVARIANT: Drive letter only counts if followed by nothing or a
    //   separator, so `a:*.txt` stays relative.
    let mut chars = path.chars();
    if let (Some(drive), Some(':')) = (chars.next(), chars.next()) {
        if drive.is_ascii_alphabetic() && matches!(chars.next(), None | Some('/' | '\\')) {
            return true;
        }
    }

    if let Some((scheme, _)) = path.split_once("://") {
        return !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric());
    }

    Path::new(path).is_absolute()
}

/// Determine default absolute path to the shop source directory.
///
/// Uses `$PWD/source`. Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWorkingDirectory`] if current working directory cannot be
///   determined.
pub fn default_shop_source_dir() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|path| path.join(SHOP_SOURCE_DIRECTORY))
        .map_err(NoWorkingDirectory)
}

/// No way to determine current working directory.
#[derive(Debug, thiserror::Error)]
#[error("cannot determine current working directory")]
pub struct NoWorkingDirectory(#[source] pub std::io::Error);

/// Friendly result alias :3
pub type Result<T, E = NoWorkingDirectory> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use sealed_test::prelude::*;
    use simple_test_case::test_case;

    #[test_case("a/b", "a/b"; "already normalized")]
    #[test_case("a\\b\\c", "a/b/c"; "backslashes")]
    #[test_case("./a//b/", "a/b"; "dot prefix and doubled separator")]
    #[test_case("/a/b", "/a/b"; "leading separator kept")]
    #[test]
    fn normalize_separators_cases(input: &str, expect: &str) {
        pretty_assertions::assert_eq!(normalize_separators(input), expect);
    }

    #[test_case("/etc/passwd"; "unix root")]
    #[test_case("\\windows"; "backslash root")]
    #[test_case("C:/shop"; "drive letter")]
    #[test_case("c:\\shop"; "lowercase drive letter")]
    #[test_case("C:"; "bare drive letter")]
    #[test_case("vfs://root/source"; "url scheme")]
    #[test]
    fn absolute_paths_are_detected(input: &str) {
        assert!(is_absolute(input));
    }

    #[test_case("*.txt"; "wildcard")]
    #[test_case("Core/**/*"; "nested")]
    #[test_case(".git"; "dot directory")]
    #[test_case(""; "empty")]
    #[test_case("a:*.txt"; "colon without separator")]
    #[test]
    fn relative_paths_are_not_absolute(input: &str) {
        assert!(!is_absolute(input));
    }

    #[test]
    fn relative_to_strips_root() {
        let root = Path::new("/project/vendor/pkg");
        pretty_assertions::assert_eq!(
            relative_to(root, root.join("Core").join("Class.php")),
            Some("Core/Class.php".to_string())
        );
        pretty_assertions::assert_eq!(relative_to(root, root), Some(String::new()));
        pretty_assertions::assert_eq!(relative_to(root, "/elsewhere/file"), None);
    }

    #[sealed_test]
    fn default_shop_source_dir_uses_working_directory() -> anyhow::Result<()> {
        let expect = std::env::current_dir()?.join("source");
        pretty_assertions::assert_eq!(default_shop_source_dir()?, expect);

        Ok(())
    }
}
