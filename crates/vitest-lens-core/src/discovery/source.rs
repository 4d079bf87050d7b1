//! Tree-sitter parsing of test source files.

use std::path::{Path, PathBuf};

use tree_sitter::{Language, Node, Parser as TSParser, Tree};

use crate::error::{LensError, Result};

/// Grammar used to parse a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    TypeScript,
    Tsx,
    JavaScript,
}

impl SourceLanguage {
    /// Pick a grammar from the file extension, defaulting to TypeScript.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("tsx") => Self::Tsx,
            Some("js" | "jsx" | "mjs" | "cjs") => Self::JavaScript,
            _ => Self::TypeScript,
        }
    }

    pub fn grammar(&self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    /// Human-readable language name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeScript => "TypeScript",
            Self::Tsx => "TSX",
            Self::JavaScript => "JavaScript",
        }
    }
}

/// A source file together with its syntax tree.
pub struct SourceFile {
    path: PathBuf,
    text: String,
    language: SourceLanguage,
    tree: Tree,
}

impl SourceFile {
    /// Parse `text` with the grammar matching `path`.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let text = text.into();
        let language = SourceLanguage::from_path(&path);

        let mut parser = TSParser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| LensError::parse(path.display().to_string(), format!("Failed to set language: {}", e)))?;

        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| LensError::parse(path.display().to_string(), "Failed to parse content"))?;

        tracing::trace!(
            path = %path.display(),
            language = language.name(),
            has_error = tree.root_node().has_error(),
            "parsed source"
        );

        Ok(Self {
            path,
            text,
            language,
            tree,
        })
    }

    /// Read and parse a file from disk.
    pub fn read(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|e| LensError::io(&path, e))?;
        Self::parse(path, text)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Get text for a node.
    pub fn node_text(&self, node: &Node) -> &str {
        &self.text[node.byte_range()]
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("language", &self.language)
            .field("len", &self.text.len())
            .finish()
    }
}
