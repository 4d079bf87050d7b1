//! Name patterns for the runner's `--testNamePattern` filter.
//!
//! Vitest matches the pattern against a test's full name: the names of all
//! enclosing suites and the test itself, joined by single spaces.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::discovery::{TestDeclaration, TestKind};

/// How a declaration is turned into a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternPolicy {
    /// Own name as a space-delimited token anywhere in the full name.
    ///
    /// Ignores ancestors, so it can select unrelated tests sharing a name.
    Loose,
    /// Anchored on the full ancestor path.
    #[default]
    ExactPath,
}

/// Build the pattern selecting `declaration`.
///
/// With [`PatternPolicy::ExactPath`] a suite selects itself and everything
/// nested in it (`^path( |$)`), and a test selects exactly its own path
/// (`^path$`).
pub fn build_name_pattern(declaration: &TestDeclaration, policy: PatternPolicy) -> String {
    match policy {
        PatternPolicy::Loose => format!(" {}($| )", escape_regex(&declaration.name)),
        PatternPolicy::ExactPath => {
            let full_path = escape_regex(&declaration.full_name());
            match declaration.kind {
                TestKind::Suite => format!("^{}( |$)", full_path),
                TestKind::Test => format!("^{}$", full_path),
            }
        }
    }
}

/// Escape the characters that are syntax in a JavaScript `RegExp`.
///
/// The same set is syntax in the `regex` crate, so patterns evaluate the
/// same way in [`pattern_matches`].
pub fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Check a pattern against a full test name.
pub fn pattern_matches(pattern: &str, full_name: &str) -> Result<bool, regex::Error> {
    Ok(Regex::new(pattern)?.is_match(full_name))
}
