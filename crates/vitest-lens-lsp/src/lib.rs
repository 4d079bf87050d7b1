//! vitest-lens Language Server Protocol (LSP) library
//!
//! Offers "Run(Vitest)" and "Debug(Vitest)" code lenses on every `describe`,
//! `it` and `test` call, and turns a lens invocation into a launch
//! configuration sent to the client's debugger.

pub mod commands;
pub mod convert;
pub mod document;
pub mod server;

use tower_lsp::{LspService, Server};
use vitest_lens_core::Config;

pub use commands::{CommandRegistry, StartDebugging, StartDebuggingParams};
pub use server::VitestLensServer;

/// Serve the protocol over stdin/stdout until the client disconnects
pub async fn serve_stdio(config: Config) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| VitestLensServer::with_config(client, config));

    Server::new(stdin, stdout, socket).serve(service).await;
}
