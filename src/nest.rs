// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Nested file tree structures.
//!
//! Turns a flat listing of `path -> contents` pairs into a nested tree where
//! directories are maps and files are leaves. Trees can be written out to
//! disk, or read back from disk, which makes them handy for building file
//! system fixtures and asserting what an install left behind.
//!
//! # Nesting Rules
//!
//! Paths are split on `/`. Each segment is trimmed of surrounding
//! whitespace, and empty segments are dropped. Entries are applied in
//! iteration order, so later entries win:
//!
//! - A path ending in `/` declares a directory. An existing directory at that
//!   path keeps its children, but an existing file is replaced by an empty
//!   directory.
//! - Any other path declares a file, overwriting whatever sat at that exact
//!   path before, including a whole directory.
//! - A file sitting where a later entry needs a directory is replaced by a
//!   directory.
//!
//! Entries without any segment, like `""` or `" / "`, are ignored.

use serde_json::Value;
use std::{
    collections::{btree_map, BTreeMap},
    fs::{read, read_dir, write},
    path::{Path, PathBuf},
};

/// Node of a nested tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// File with its contents.
    File(String),

    /// Directory with its children.
    Dir(NestedTree),
}

impl Node {
    pub fn file(contents: impl Into<String>) -> Self {
        Self::File(contents.into())
    }

    pub fn dir<K>(children: impl IntoIterator<Item = (K, Node)>) -> Self
    where
        K: Into<String>,
    {
        Self::Dir(children.into_iter().collect())
    }

    pub fn empty_dir() -> Self {
        Self::Dir(NestedTree::default())
    }

    /// Contents of node if it is a file.
    pub fn as_file(&self) -> Option<&str> {
        match self {
            Self::File(contents) => Some(contents.as_str()),
            Self::Dir(_) => None,
        }
    }

    /// Children of node if it is a directory.
    pub fn as_dir(&self) -> Option<&NestedTree> {
        match self {
            Self::File(_) => None,
            Self::Dir(tree) => Some(tree),
        }
    }

    fn make_dir(&mut self) -> &mut NestedTree {
        if let Self::File(_) = self {
            *self = Self::empty_dir();
        }

        match self {
            Self::Dir(tree) => tree,
            Self::File(_) => unreachable!("file node was replaced by a directory"),
        }
    }
}

/// Nested representation of a file tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NestedTree {
    entries: BTreeMap<String, Node>,
}

impl NestedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert flat entry into tree according to nesting rules.
    pub fn insert(&mut self, path: impl AsRef<str>, contents: impl Into<String>) {
        let path = path.as_ref();
        let segments = path
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();

        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };

        let mut branch = self;
        for segment in parents {
            branch = branch.dir_mut(segment);
        }

        if path.ends_with('/') {
            branch.dir_mut(leaf);
        } else {
            branch
                .entries
                .insert((*leaf).to_string(), Node::File(contents.into()));
        }
    }

    /// Direct child of tree.
    pub fn get(&self, segment: &str) -> Option<&Node> {
        self.entries.get(segment)
    }

    /// Look up node by `/` separated path.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let mut node = self.get(segments.next()?)?;
        for segment in segments {
            node = node.as_dir()?.get(segment)?;
        }

        Some(node)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Node> {
        self.entries.iter()
    }

    /// Flatten tree back into `path -> contents` pairs of its files.
    ///
    /// Empty directories are listed with a trailing `/` and empty contents.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut flat = Vec::new();
        self.flatten_into("", &mut flat);
        flat
    }

    fn flatten_into(&self, prefix: &str, flat: &mut Vec<(String, String)>) {
        for (name, node) in &self.entries {
            let path = format!("{prefix}{name}");
            match node {
                Node::File(contents) => flat.push((path, contents.clone())),
                Node::Dir(tree) if tree.is_empty() => flat.push((format!("{path}/"), String::new())),
                Node::Dir(tree) => tree.flatten_into(&format!("{path}/"), flat),
            }
        }
    }

    /// Write tree to disk below `root`.
    ///
    /// Missing directories are created, existing files are overwritten.
    ///
    /// # Errors
    ///
    /// - Return [`NestError::Io`] if a directory or file cannot be written.
    pub fn materialize(&self, root: impl AsRef<Path>) -> Result<()> {
        let root = root.as_ref();
        mkdirp::mkdirp(root).map_err(|source| NestError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        for (name, node) in &self.entries {
            let path = root.join(name);
            match node {
                Node::File(contents) => write(&path, contents).map_err(|source| NestError::Io {
                    path: path.clone(),
                    source,
                })?,
                Node::Dir(tree) => tree.materialize(&path)?,
            }
        }

        Ok(())
    }

    fn dir_mut(&mut self, segment: &str) -> &mut NestedTree {
        self.entries
            .entry(segment.to_string())
            .or_insert_with(Node::empty_dir)
            .make_dir()
    }
}

impl<K> FromIterator<(K, Node)> for NestedTree
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(key, node)| (key.into(), node)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a NestedTree {
    type Item = (&'a String, &'a Node);
    type IntoIter = btree_map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Convert flat `path -> contents` listing into nested tree.
///
/// Entries are applied in iteration order.
pub fn nest<I, K, V>(flat: I) -> NestedTree
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut tree = NestedTree::new();
    for (path, contents) in flat {
        tree.insert(path, contents);
    }

    tree
}

/// Convert flat JSON object into nested tree.
///
/// Absent or `null` input yields an empty tree. String values are used as
/// file contents verbatim, any other value is stored as its JSON text.
///
/// # Errors
///
/// - Return [`NestError::NotAMapping`] if input is neither `null` nor an
///   object.
pub fn nest_value(flat: Option<&Value>) -> Result<NestedTree> {
    match flat {
        None | Some(Value::Null) => Ok(NestedTree::new()),
        Some(Value::Object(entries)) => Ok(nest(entries.iter().map(|(path, value)| {
            let contents = match value {
                Value::String(contents) => contents.clone(),
                other => other.to_string(),
            };
            (path, contents)
        }))),
        Some(other) => Err(NestError::NotAMapping {
            kind: value_kind(other),
        }),
    }
}

/// Read directory tree below `root` into nested tree.
///
/// File contents are decoded lossily as UTF-8. Symbolic links are not
/// followed.
///
/// # Errors
///
/// - Return [`NestError::Io`] if a directory or file cannot be read.
pub fn capture(root: impl AsRef<Path>) -> Result<NestedTree> {
    let root = root.as_ref();
    let mut tree = NestedTree::new();
    let entries = read_dir(root).map_err(|source| NestError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| NestError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let kind = entry.file_type().map_err(|source| NestError::Io {
            path: path.clone(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if kind.is_dir() {
            tree.entries.insert(name, Node::Dir(capture(&path)?));
        } else {
            let contents = read(&path).map_err(|source| NestError::Io {
                path: path.clone(),
                source,
            })?;
            tree.entries.insert(
                name,
                Node::File(String::from_utf8_lossy(&contents).into_owned()),
            );
        }
    }

    Ok(tree)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Nested tree error types.
#[derive(Debug, thiserror::Error)]
pub enum NestError {
    /// Flat input is not a mapping.
    #[error("flat file structure must be a mapping, got {kind}")]
    NotAMapping { kind: &'static str },

    /// File tree cannot be read or written.
    #[error("failed to access file tree at {:?}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Friendly result alias :3
pub type Result<T, E = NestError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn no_entries() -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    #[test]
    fn empty_input_yields_empty_tree() {
        assert_eq!(nest(no_entries()), NestedTree::new());
        assert_eq!(nest_value(None).unwrap(), NestedTree::new());
        assert_eq!(nest_value(Some(&Value::Null)).unwrap(), NestedTree::new());
        assert_eq!(nest_value(Some(&json!({}))).unwrap(), NestedTree::new());
    }

    #[test]
    fn non_mapping_input_is_rejected() {
        for input in [json!(1), json!("file"), json!(["a", "b"]), json!(true)] {
            let result = nest_value(Some(&input));
            assert!(matches!(result, Err(NestError::NotAMapping { .. })));
        }
    }

    #[test]
    fn flat_files_stay_flat() {
        let result = nest([("foo", "abc"), ("bar", "def")]);
        let expect = NestedTree::from_iter([("foo", Node::file("abc")), ("bar", Node::file("def"))]);
        assert_eq!(result, expect);
    }

    #[test]
    fn segments_are_trimmed() {
        let result = nest([("  file ", "Contents")]);
        assert_eq!(result, NestedTree::from_iter([("file", Node::file("Contents"))]));
    }

    #[test]
    fn later_duplicate_after_trim_wins() {
        let result = nest([("file", "Contents"), ("  file  ", "Second Contents")]);
        assert_eq!(result, NestedTree::from_iter([("file", Node::file("Second Contents"))]));
    }

    #[test]
    fn multi_level_path_nests() {
        let result = nest([("a/b", "x")]);
        let expect = NestedTree::from_iter([("a", Node::dir([("b", Node::file("x"))]))]);
        assert_eq!(result, expect);
    }

    #[test]
    fn trailing_separator_declares_empty_directory() {
        let result = nest([("a/b/", "x")]);
        let expect = NestedTree::from_iter([("a", Node::dir([("b", Node::empty_dir())]))]);
        assert_eq!(result, expect);
    }

    #[test]
    fn trailing_separator_keeps_existing_children() {
        let result = nest([("a/b/c", "x"), ("a/b/", "")]);
        let expect = NestedTree::from_iter([(
            "a",
            Node::dir([("b", Node::dir([("c", Node::file("x"))]))]),
        )]);
        assert_eq!(result, expect);
    }

    #[test]
    fn trailing_separator_replaces_existing_file() {
        let result = nest([("a/b", "x"), ("a/b/", "")]);
        let expect = NestedTree::from_iter([("a", Node::dir([("b", Node::empty_dir())]))]);
        assert_eq!(result, expect);
    }

    #[test]
    fn later_nested_entry_replaces_earlier_file() {
        let result = nest([
            ("directory/fake_file", "contents"),
            ("directory/fake_file/real_file", "real contents"),
        ]);
        let expect = NestedTree::from_iter([(
            "directory",
            Node::dir([("fake_file", Node::dir([("real_file", Node::file("real contents"))]))]),
        )]);
        assert_eq!(result, expect);
    }

    #[test]
    fn later_file_entry_replaces_earlier_directory() {
        // Order matters: a scalar listed after its nested form wins.
        let result = nest([("fake/file", "f1"), ("fake", "top")]);
        assert_eq!(result, NestedTree::from_iter([("fake", Node::file("top"))]));
    }

    #[test]
    fn complex_case_follows_iteration_order() {
        let result = nest([
            ("file", "c1"),
            ("dir/file", "c2"),
            ("dir/file2", "c3"),
            ("fake", "top"),
            ("fake/file", "f1"),
            ("deep/er/est/file", "c4"),
            (" file_c  ", "c"),
            (" file_c   ", "c override"),
        ]);
        let expect = NestedTree::from_iter([
            ("file", Node::file("c1")),
            (
                "dir",
                Node::dir([("file", Node::file("c2")), ("file2", Node::file("c3"))]),
            ),
            ("fake", Node::dir([("file", Node::file("f1"))])),
            (
                "deep",
                Node::dir([(
                    "er",
                    Node::dir([("est", Node::dir([("file", Node::file("c4"))]))]),
                )]),
            ),
            ("file_c", Node::file("c override")),
        ]);
        assert_eq!(result, expect);
    }

    #[test]
    fn entries_without_segments_are_ignored() {
        let result = nest([("", "root"), (" / ", "root"), ("file", "x")]);
        assert_eq!(result, NestedTree::from_iter([("file", Node::file("x"))]));
    }

    #[test]
    fn json_object_keeps_document_order() {
        let input = json!({
            "fake": "top",
            "fake/file": "f1",
            "count": 3
        });
        let result = nest_value(Some(&input)).unwrap();
        let expect = NestedTree::from_iter([
            ("fake", Node::dir([("file", Node::file("f1"))])),
            ("count", Node::file("3")),
        ]);
        assert_eq!(result, expect);
    }

    #[test]
    fn lookup_walks_nested_path() {
        let tree = nest([("a/b/c", "x"), ("a/d", "y")]);
        assert_eq!(tree.lookup("a/b/c").and_then(Node::as_file), Some("x"));
        assert_eq!(tree.lookup("a/d").and_then(Node::as_file), Some("y"));
        assert!(tree.lookup("a/d/e").is_none());
        assert!(tree.lookup("").is_none());
    }

    #[test]
    fn flatten_lists_files_and_empty_directories() {
        let tree = nest([("b/c", "x"), ("a", "y"), ("d/", "")]);
        let result = tree.flatten();
        let expect = vec![
            ("a".to_string(), "y".to_string()),
            ("b/c".to_string(), "x".to_string()),
            ("d/".to_string(), String::new()),
        ];
        assert_eq!(result, expect);
    }

    #[test]
    fn materialize_then_capture_reproduces_tree() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let tree = nest([
            ("index.php", "<?php"),
            ("Application/views/theme.php", "theme"),
            ("cache/", ""),
        ]);

        tree.materialize(dir.path())?;
        assert_eq!(capture(dir.path())?, tree);

        Ok(())
    }
}
