//! Pattern matching for path rules
//!
//! Provides glob matching for include/exclude rules. Patterns use `/` as the
//! separator: `*` and `?` stay within one segment, `**` spans segments.

use crate::access_control::types::Perms;
use crate::error::{AuthzError, RuleKind};
use globset::{GlobBuilder, GlobMatcher};

/// Compiled list of glob patterns, kept in stored order
#[derive(Debug, Clone)]
pub struct GlobList {
    patterns: Vec<CompiledGlob>,
}

#[derive(Debug, Clone)]
struct CompiledGlob {
    source: String,
    matcher: GlobMatcher,
}

impl GlobList {
    /// Compile a list of glob patterns
    ///
    /// The first invalid pattern aborts compilation.
    pub fn new(patterns: &[String], kind: RuleKind) -> Result<Self, AuthzError> {
        let mut compiled = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| AuthzError::RuleCompile {
                    kind,
                    pattern: pattern.clone(),
                    reason: e.kind().to_string(),
                })?;

            compiled.push(CompiledGlob {
                source: pattern.clone(),
                matcher: glob.compile_matcher(),
            });
        }

        Ok(Self { patterns: compiled })
    }

    /// Create an empty list (matches nothing)
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Check if any subject matches any pattern
    pub fn matches(&self, subjects: &[&str]) -> bool {
        self.find_match(subjects).is_some()
    }

    /// First pattern, in stored order, matching any of the subjects
    pub fn find_match(&self, subjects: &[&str]) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| subjects.iter().any(|s| p.matcher.is_match(s)))
            .map(|p| p.source.as_str())
    }
}

impl Default for GlobList {
    fn default() -> Self {
        Self::empty()
    }
}

/// Include/exclude matcher for one rule set
///
/// Evaluation is pure: exclusions win over inclusions, and a path matching
/// neither is denied.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    includes: GlobList,
    excludes: GlobList,
}

/// Outcome of matching one path against a rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    /// Denied by this exclude pattern
    Excluded(&'a str),
    /// Granted by this include pattern
    Included(&'a str),
    NoMatch,
}

impl MatchOutcome<'_> {
    pub fn perms(&self) -> Perms {
        match self {
            MatchOutcome::Included(_) => Perms::Read,
            MatchOutcome::Excluded(_) | MatchOutcome::NoMatch => Perms::None,
        }
    }
}

impl PathMatcher {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self, AuthzError> {
        Ok(Self {
            includes: GlobList::new(includes, RuleKind::Include)?,
            excludes: GlobList::new(excludes, RuleKind::Exclude)?,
        })
    }

    /// Match a path given as `qualified` (rooted at the repo name) and
    /// `relative` (repo-relative)
    ///
    /// Excludes are checked against both forms. Includes only grant on the
    /// qualified form.
    pub fn evaluate<'a>(&'a self, qualified: &str, relative: &str) -> MatchOutcome<'a> {
        if let Some(rule) = self.excludes.find_match(&[qualified, relative]) {
            return MatchOutcome::Excluded(rule);
        }
        if let Some(rule) = self.includes.find_match(&[qualified]) {
            return MatchOutcome::Included(rule);
        }
        MatchOutcome::NoMatch
    }
}

/// Lexically join path segments with `/` and clean the result
///
/// Empty and `.` segments are dropped and `..` removes the previous segment.
/// A leading `/` on the first non-empty element is kept. Joining only empty
/// elements yields an empty string.
pub fn join_path(elems: &[&str]) -> String {
    if elems.iter().all(|e| e.is_empty()) {
        return String::new();
    }
    let joined = elems
        .iter()
        .filter(|e| !e.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    clean_path(&joined)
}

/// Lexically clean a `/`-separated path
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if out.last().is_some_and(|last| *last != "..") {
                    out.pop();
                } else if !rooted {
                    out.push("..");
                }
            }
            s => out.push(s),
        }
    }

    let body = out.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{}", body),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_list() {
        let list = GlobList::empty();
        assert!(!list.matches(&["anything"]));
        assert_eq!(list.find_match(&["anything"]), None);
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let list = GlobList::new(&strings(&["repo/*.md"]), RuleKind::Include).unwrap();
        assert!(list.matches(&["repo/README.md"]));
        assert!(!list.matches(&["repo/docs/guide.md"]));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        let list = GlobList::new(&strings(&["repo/**"]), RuleKind::Include).unwrap();
        assert!(list.matches(&["repo/a"]));
        assert!(list.matches(&["repo/a/b/c.txt"]));
        assert!(!list.matches(&["other/a"]));

        let all = GlobList::new(&strings(&["**"]), RuleKind::Include).unwrap();
        assert!(all.matches(&["r/secret/file.txt"]));
    }

    #[test]
    fn test_question_mark_and_class() {
        let list = GlobList::new(&strings(&["r/file?.[ch]"]), RuleKind::Include).unwrap();
        assert!(list.matches(&["r/file1.c"]));
        assert!(list.matches(&["r/fileX.h"]));
        assert!(!list.matches(&["r/file12.c"]));
        assert!(!list.matches(&["r/file/.c"]));
    }

    #[test]
    fn test_alternation() {
        let list = GlobList::new(&strings(&["r/{src,docs}/**"]), RuleKind::Include).unwrap();
        assert!(list.matches(&["r/src/main.rs"]));
        assert!(list.matches(&["r/docs/index.md"]));
        assert!(!list.matches(&["r/tests/a.rs"]));
    }

    #[test]
    fn test_find_match_respects_order() {
        let list = GlobList::new(&strings(&["r/a/**", "r/**"]), RuleKind::Include).unwrap();
        assert_eq!(list.find_match(&["r/a/x"]), Some("r/a/**"));
        assert_eq!(list.find_match(&["r/b/x"]), Some("r/**"));
        assert_eq!(list.find_match(&["s/b/x"]), None);
    }

    #[test]
    fn test_invalid_pattern() {
        let result = GlobList::new(&strings(&["r/**", "[invalid"]), RuleKind::Exclude);
        match result.unwrap_err() {
            AuthzError::RuleCompile { kind, pattern, .. } => {
                assert_eq!(kind, RuleKind::Exclude);
                assert_eq!(pattern, "[invalid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exclude_wins() {
        let matcher = PathMatcher::new(&strings(&["**"]), &strings(&["secret/**"])).unwrap();
        assert_eq!(
            matcher.evaluate("r/secret/file.txt", "secret/file.txt"),
            MatchOutcome::Excluded("secret/**")
        );
        assert_eq!(
            matcher.evaluate("r/public/file.txt", "public/file.txt"),
            MatchOutcome::Included("**")
        );
        assert_eq!(
            matcher.evaluate("r/public/file.txt", "public/file.txt").perms(),
            Perms::Read
        );
    }

    #[test]
    fn test_include_needs_repo_root() {
        let matcher = PathMatcher::new(&strings(&["docs/**"]), &[]).unwrap();
        let outcome = matcher.evaluate("r/docs/a.md", "docs/a.md");
        assert_eq!(outcome, MatchOutcome::NoMatch);
        assert_eq!(outcome.perms(), Perms::None);
    }

    #[test]
    fn test_no_match_denies() {
        let matcher = PathMatcher::new(&strings(&["r/a/**"]), &[]).unwrap();
        assert_eq!(matcher.evaluate("r/b/file", "b/file").perms(), Perms::None);
        assert_eq!(
            PathMatcher::default().evaluate("r/a/file", "a/file"),
            MatchOutcome::NoMatch
        );
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(&["r", "a/b.txt"]), "r/a/b.txt");
        assert_eq!(join_path(&["r", "/a//b/"]), "r/a/b");
        assert_eq!(join_path(&["r", "./a/../b"]), "r/b");
        assert_eq!(join_path(&["r", ""]), "r");
        assert_eq!(join_path(&["", ""]), "");
        assert_eq!(join_path(&["r", "../../x"]), "../x");
    }

    #[test]
    fn test_clean_path_rooted() {
        assert_eq!(clean_path("/../a"), "/a");
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path(""), ".");
        assert_eq!(clean_path("a/./b/.."), "a");
    }
}
