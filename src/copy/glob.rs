// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Glob expression matching.
//!
//! Decides whether a relative path matches a glob expression, or any
//! expression from a list of them.
//!
//! # Glob Dialect
//!
//! - `*` matches any run of characters except `/`.
//! - `**` matches across separators, and `**/` also matches zero
//!   directories, so `Core/**/*` matches both `Core/Class.php` and
//!   `Core/Sub/Class.php`.
//! - `?` matches exactly one character except `/`.
//! - `[abc]`, `[a-z]`, and `[!abc]` character classes.
//!
//! Matching is case-sensitive and anchored, i.e., the whole relative path
//! must match. Leading dots get no special treatment, so `*` matches
//! `.gitignore`.
//!
//! # Null Versus Empty
//!
//! An absent single expression matches everything, but an absent or empty
//! _list_ of expressions matches nothing. A list is a blacklist: no list
//! means no exclusions.

use crate::path::{is_absolute, normalize_separators};

use glob::{MatchOptions, Pattern, PatternError};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled glob expression.
///
/// # Invariant
///
/// - Never built from an absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobExpression {
    pattern: Pattern,
}

impl GlobExpression {
    /// Compile a glob expression.
    ///
    /// # Errors
    ///
    /// - Return [`GlobError::AbsolutePath`] if expression is an absolute path.
    /// - Return [`GlobError::InvalidPattern`] if expression is malformed.
    pub fn new(expression: impl Into<String>) -> Result<Self> {
        let expression = expression.into();
        if is_absolute(&expression) {
            return Err(GlobError::AbsolutePath { expression });
        }

        // INVARIANT: Anchor both sides at a pseudo root so `**/` can match
        //   zero leading directories.
        let pattern = Pattern::new(&anchor(&expression)).map_err(|source| {
            GlobError::InvalidPattern {
                expression: expression.clone(),
                source,
            }
        })?;

        Ok(Self { pattern })
    }

    /// Check if relative path matches this expression.
    pub fn is_match(&self, relative_path: impl AsRef<str>) -> bool {
        self.pattern
            .matches_with(&anchor(relative_path.as_ref()), MATCH_OPTIONS)
    }
}

/// Compiled list of glob expressions with "or" semantics.
///
/// An empty list never matches.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GlobList {
    expressions: Vec<GlobExpression>,
}

impl GlobList {
    /// Compile every expression of a list up front.
    ///
    /// # Errors
    ///
    /// - Return [`GlobError`] for the first expression that fails to compile.
    pub fn new(expressions: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        let expressions = expressions
            .into_iter()
            .map(GlobExpression::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { expressions })
    }

    /// Construct list that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if relative path matches at least one expression.
    ///
    /// Short-circuits on the first match.
    pub fn is_match_any(&self, relative_path: impl AsRef<str>) -> bool {
        let relative_path = relative_path.as_ref();
        self.expressions
            .iter()
            .any(|expression| expression.is_match(relative_path))
    }
}

/// Match a relative path against a single glob expression.
///
/// An absent expression matches every path.
///
/// # Errors
///
/// - Return [`GlobError::AbsolutePath`] if expression is an absolute path.
/// - Return [`GlobError::InvalidPattern`] if expression is malformed.
pub fn matches(relative_path: impl AsRef<str>, expression: Option<&str>) -> Result<bool> {
    match expression {
        None => Ok(true),
        Some(expression) => Ok(GlobExpression::new(expression)?.is_match(relative_path)),
    }
}

/// Match a relative path against a list of glob expressions.
///
/// An absent or empty list matches nothing. Expressions are compiled lazily
/// in order, so an invalid expression after the first match goes unnoticed.
///
/// # Errors
///
/// - Return [`GlobError`] if an expression reached before a match is
///   invalid.
pub fn matches_any<I, S>(relative_path: impl AsRef<str>, expressions: Option<I>) -> Result<bool>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(expressions) = expressions else {
        return Ok(false);
    };

    let relative_path = relative_path.as_ref();
    for expression in expressions {
        if matches(relative_path, Some(expression.as_ref()))? {
            return Ok(true);
        }
    }

    Ok(false)
}

fn anchor(path: &str) -> String {
    let path = normalize_separators(path);
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

/// Glob matching error types.
#[derive(Debug, thiserror::Error)]
pub enum GlobError {
    /// Expression is an absolute path.
    #[error("glob expression {expression:?} is an absolute path, only relative paths are accepted")]
    AbsolutePath { expression: String },

    /// Expression cannot be compiled.
    #[error("glob expression {expression:?} is not valid")]
    InvalidPattern {
        expression: String,
        #[source]
        source: PatternError,
    },
}

/// Friendly result alias :3
pub type Result<T, E = GlobError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("file.txt", "*.txt"; "star on top level")]
    #[test_case(".gitignore", "*"; "star matches leading dot")]
    #[test_case("Core/Class.php", "Core/**/*"; "double star matches zero directories")]
    #[test_case("Core/Sub/Deep/Class.php", "Core/**/*"; "double star matches many directories")]
    #[test_case(".htaccess", "**/.htaccess"; "leading double star on top level")]
    #[test_case("out/downloads/.htaccess", "**/.htaccess"; "leading double star nested")]
    #[test_case("a.php", "?.php"; "question mark")]
    #[test_case("file1", "file[0-9]"; "character class")]
    #[test_case(".git/objects/ff/blob", ".git/**"; "trailing double star")]
    #[test_case("dir\\file.txt", "dir/*.txt"; "backslash separators normalized")]
    #[test_case("a:notes.txt", "a:*.txt"; "colon prefix is not a drive root")]
    #[test]
    fn expression_matches(path: &str, expression: &str) {
        assert!(matches(path, Some(expression)).unwrap());
    }

    #[test_case("dir/file.txt", "*.txt"; "star does not cross separator")]
    #[test_case("Core", "Core/**/*"; "directory itself is not matched")]
    #[test_case("File.TXT", "*.txt"; "case sensitive")]
    #[test_case("prefix/file.txt", "file.txt"; "anchored at start")]
    #[test_case("file.txt.bak", "file.txt"; "anchored at end")]
    #[test_case("ab.php", "?.php"; "question mark is one character")]
    #[test]
    fn expression_does_not_match(path: &str, expression: &str) {
        assert!(!matches(path, Some(expression)).unwrap());
    }

    #[test_case("/etc/*"; "unix absolute")]
    #[test_case("C:/shop/*"; "drive letter")]
    #[test_case("vfs://root/*"; "url")]
    #[test]
    fn absolute_expression_is_rejected(expression: &str) {
        for path in ["", "file", "etc/passwd"] {
            let result = matches(path, Some(expression));
            assert!(matches!(result, Err(GlobError::AbsolutePath { .. })));
        }
    }

    #[test]
    fn malformed_expression_is_rejected() {
        let result = matches("file", Some("[abc"));
        assert!(matches!(result, Err(GlobError::InvalidPattern { .. })));
    }

    #[test]
    fn absent_expression_matches_everything() {
        for path in ["", "file", "a/b/c", ".git/HEAD"] {
            assert!(matches(path, None).unwrap());
        }
    }

    #[test]
    fn absent_or_empty_list_matches_nothing() {
        let empty: Vec<&str> = Vec::new();
        for path in ["", "file", "a/b/c"] {
            assert!(!matches_any(path, Some(&empty)).unwrap());
            assert!(!matches_any(path, None::<Vec<&str>>).unwrap());
            assert!(!GlobList::empty().is_match_any(path));
        }
    }

    #[test]
    fn list_matches_if_any_expression_matches() {
        let list = ["*.txt", "*.pdf"];
        assert!(matches_any("doc.pdf", Some(list)).unwrap());
        assert!(matches_any("doc.txt", Some(list)).unwrap());
        assert!(!matches_any("doc.odt", Some(list)).unwrap());
    }

    #[test]
    fn list_short_circuits_before_invalid_expression() {
        assert!(matches_any("doc.txt", Some(["*.txt", "/absolute"])).unwrap());
        assert!(matches_any("doc.pdf", Some(["*.txt", "/absolute"])).is_err());
    }

    #[test]
    fn list_agrees_with_single_matches() {
        let list = ["Core/**/*", "Application/Model/**/*", "*.md"];
        let compiled = GlobList::new(list).unwrap();
        for path in [
            "Core/Class.php",
            "Application/Model/Article.php",
            "Application/Controller/Start.php",
            "README.md",
            "docs/README.md",
            "Class.php",
        ] {
            let expect = list
                .iter()
                .any(|expression| matches(path, Some(expression)).unwrap());
            pretty_assertions::assert_eq!(matches_any(path, Some(list)).unwrap(), expect);
            pretty_assertions::assert_eq!(compiled.is_match_any(path), expect);
        }
    }

    #[test]
    fn compiled_list_reports_first_invalid_expression() {
        let result = GlobList::new(["*.txt", "/root/*", "[bad"]);
        match result {
            Err(GlobError::AbsolutePath { expression }) => pretty_assertions::assert_eq!(expression, "/root/*"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
