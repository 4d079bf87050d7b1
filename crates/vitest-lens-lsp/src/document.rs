//! Document state management

use std::path::PathBuf;

use tower_lsp::lsp_types::Url;

use crate::convert::document_path;

/// State of a single open document
///
/// Only the text is kept; declarations are rediscovered on every lens request.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub uri: Url,
    pub path: PathBuf,
    pub text: String,
    pub version: i32,
}

impl DocumentState {
    pub fn new(uri: Url, text: String, version: i32) -> Self {
        let path = document_path(&uri);
        Self {
            uri,
            path,
            text,
            version,
        }
    }

    /// Replace the document text (full sync)
    pub fn update(&mut self, text: String, version: i32) {
        self.text = text;
        self.version = version;
    }
}
