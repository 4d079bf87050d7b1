//! Test declaration records produced by the walker.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{LensError, Result};

/// Whether a declaration groups tests or is a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    /// `describe(...)`
    Suite,
    /// `it(...)` or `test(...)`
    Test,
}

impl TestKind {
    /// Map a kind spelling coming from untyped input.
    ///
    /// Accepts the serialized forms as well as the call names they come from.
    pub fn from_marker(marker: &str) -> Result<Self> {
        match marker {
            "suite" | "describe" => Ok(Self::Suite),
            "test" | "it" => Ok(Self::Test),
            other => Err(LensError::InvalidKind(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Suite => "suite",
            Self::Test => "test",
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte range of the name literal, quotes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One discovered `describe` / `it` / `test` call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDeclaration {
    pub kind: TestKind,
    /// Absolute path of the file the call was found in.
    pub source_file: PathBuf,
    pub span: Span,
    /// Cooked text of the name literal.
    pub name: String,
    /// Enclosing declaration names, outermost first.
    pub ancestor_names: Vec<String>,
}

/// Wire form of a declaration before its kind is checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeclarationArgs {
    kind: String,
    source_file: PathBuf,
    span: Span,
    name: String,
    #[serde(default)]
    ancestor_names: Vec<String>,
}

impl TestDeclaration {
    /// Full test path as the runner reports it: ancestors then name, space separated.
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = self.ancestor_names.iter().map(String::as_str).collect();
        parts.push(&self.name);
        parts.join(" ")
    }

    /// Decode a declaration from a command argument.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let args: DeclarationArgs = serde_json::from_value(value)
            .map_err(|e| LensError::InvalidArgument(e.to_string()))?;

        Ok(Self {
            kind: TestKind::from_marker(&args.kind)?,
            source_file: args.source_file,
            span: args.span,
            name: args.name,
            ancestor_names: args.ancestor_names,
        })
    }

    /// Encode this declaration as a command argument.
    ///
    /// Fails when the source path is not valid UTF-8.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| {
            LensError::InvalidArgument(format!(
                "cannot encode {}: {}",
                self.source_file.display(),
                e
            ))
        })
    }
}
