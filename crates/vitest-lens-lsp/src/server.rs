//! vitest-lens LSP server implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error, ErrorCode, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use vitest_lens_core::{annotations, Config, LaunchBuilder, LensError, SourceFile, TestWalker};

use crate::commands::{CommandRegistry, StartDebugging, StartDebuggingParams};
use crate::convert::code_lenses;
use crate::document::DocumentState;

/// Walker and command handlers derived from the active configuration.
struct Handlers {
    walker: TestWalker,
    commands: Arc<CommandRegistry>,
}

impl Handlers {
    fn new(config: Config) -> Self {
        Self {
            walker: TestWalker::new(&config.discovery),
            commands: Arc::new(CommandRegistry::with_launch_builder(Arc::new(
                LaunchBuilder::new(config),
            ))),
        }
    }
}

/// Sets the flag when the request future is dropped before the work completes.
struct CancelOnDrop(Option<Arc<AtomicBool>>);

impl CancelOnDrop {
    fn new(flag: Arc<AtomicBool>) -> Self {
        Self(Some(flag))
    }

    /// The work finished; leave the flag untouched.
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(flag) = &self.0 {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

/// vitest-lens Language Server
pub struct VitestLensServer {
    client: Client,
    documents: Arc<RwLock<HashMap<Url, DocumentState>>>,
    handlers: RwLock<Handlers>,
}

impl VitestLensServer {
    /// Create a server with the default configuration
    pub fn new(client: Client) -> Self {
        Self::with_config(client, Config::default())
    }

    pub fn with_config(client: Client, config: Config) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
            handlers: RwLock::new(Handlers::new(config)),
        }
    }

    async fn walker(&self) -> TestWalker {
        self.handlers.read().await.walker.clone()
    }

    async fn commands(&self) -> Arc<CommandRegistry> {
        Arc::clone(&self.handlers.read().await.commands)
    }

    /// Replace the configuration from `initializationOptions`, if it parses
    async fn apply_initialization_options(&self, options: Option<Value>) {
        let Some(options) = options else {
            return;
        };
        let config = serde_json::from_value::<Config>(options)
            .map_err(|e| e.to_string())
            .and_then(|config| config.validate().map(|_| config).map_err(|e| e.to_string()));

        match config {
            Ok(config) => {
                tracing::info!("using configuration from initialization options");
                *self.handlers.write().await = Handlers::new(config);
            }
            Err(message) => {
                tracing::warn!(%message, "ignoring invalid initialization options");
            }
        }
    }
}

fn to_rpc_error(err: &LensError) -> Error {
    let code = match err {
        LensError::UnknownCommand(_) => ErrorCode::MethodNotFound,
        LensError::InvalidKind(_) | LensError::InvalidArgument(_) => ErrorCode::InvalidParams,
        _ => ErrorCode::InternalError,
    };
    Error {
        code,
        message: err.to_string().into(),
        data: None,
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for VitestLensServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.apply_initialization_options(params.initialization_options)
            .await;
        let commands = self.commands().await.command_ids();

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands,
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "vitest-lens".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "vitest-lens server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let doc = DocumentState::new(
            uri.clone(),
            params.text_document.text,
            params.text_document.version,
        );

        let mut documents = self.documents.write().await;
        documents.insert(uri, doc);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let mut documents = self.documents.write().await;
        if let Some(doc) = documents.get_mut(&uri) {
            for change in params.content_changes {
                doc.update(change.text, version);
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let mut documents = self.documents.write().await;
        documents.remove(&params.text_document.uri);
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        let uri = params.text_document.uri;
        let doc = {
            let documents = self.documents.read().await;
            documents.get(&uri).cloned()
        };
        let Some(doc) = doc else {
            return Ok(None);
        };

        let walker = self.walker().await;
        let cancelled = Arc::new(AtomicBool::new(false));
        let token = Arc::clone(&cancelled);
        let guard = CancelOnDrop::new(cancelled);

        let walk = tokio::task::spawn_blocking(move || -> std::result::Result<_, LensError> {
            let source = SourceFile::parse(doc.path, doc.text)?;
            let discovery = walker.discover(&source, &*token);
            let annotations = annotations(&discovery.declarations);
            let lenses = code_lenses(source.text(), &annotations, &*token);
            let complete = discovery.complete && lenses.len() == annotations.len();
            Ok((lenses, complete))
        });

        let walked = walk.await;
        guard.disarm();

        match walked {
            Ok(Ok((lenses, complete))) => {
                if !complete {
                    tracing::debug!(%uri, "returning lenses from a cancelled or partial walk");
                }
                Ok(Some(lenses))
            }
            Ok(Err(err)) => {
                tracing::warn!(%uri, error = %err, "could not discover tests");
                Ok(None)
            }
            Err(err) => {
                tracing::error!(%uri, error = %err, "discovery task failed");
                Err(Error::internal_error())
            }
        }
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        let commands = self.commands().await;

        match commands.execute(&params.command, params.arguments) {
            Ok(spec) => {
                tracing::info!(
                    command = %params.command,
                    program = %spec.program.display(),
                    "starting debug session"
                );
                let value = serde_json::to_value(&spec).map_err(|_| Error::internal_error())?;
                self.client
                    .send_notification::<StartDebugging>(StartDebuggingParams {
                        configuration: spec,
                    })
                    .await;
                Ok(Some(value))
            }
            Err(err) => {
                tracing::error!(command = %params.command, error = %err, "command failed");
                self.client
                    .show_message(MessageType::ERROR, err.to_string())
                    .await;
                Err(to_rpc_error(&err))
            }
        }
    }
}
