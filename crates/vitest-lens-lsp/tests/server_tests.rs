//! Server tests driving the language server directly through `LspService::inner`.

use std::fs;

use futures::StreamExt;
use serde_json::json;
use tempfile::TempDir;
use tower_lsp::jsonrpc::ErrorCode;
use tower_lsp::lsp_types::*;
use tower_lsp::{LanguageServer, LspService};
use vitest_lens_core::{TestDeclaration, TestKind, DEBUG_COMMAND, RUN_COMMAND};
use vitest_lens_lsp::VitestLensServer;

const SOURCE: &str = "describe('A', () => {\n  it('B', () => {})\n})\n";

/// Start a server whose client side is drained, so messages the server sends
/// to the client never block a request.
fn start() -> LspService<VitestLensServer> {
    let (service, socket) = LspService::new(VitestLensServer::new);
    tokio::spawn(socket.for_each(|_| async {}));
    service
}

fn text_document(uri: &Url) -> TextDocumentIdentifier {
    TextDocumentIdentifier { uri: uri.clone() }
}

async fn open(server: &VitestLensServer, uri: &Url, text: &str) {
    server
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.clone(),
                language_id: "typescript".to_string(),
                version: 1,
                text: text.to_string(),
            },
        })
        .await;
}

async fn lenses(server: &VitestLensServer, uri: &Url) -> Option<Vec<CodeLens>> {
    server
        .code_lens(CodeLensParams {
            text_document: text_document(uri),
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
        })
        .await
        .unwrap()
}

fn execute(command: &str, argument: serde_json::Value) -> ExecuteCommandParams {
    ExecuteCommandParams {
        command: command.to_string(),
        arguments: vec![argument],
        work_done_progress_params: WorkDoneProgressParams::default(),
    }
}

fn project() -> (TempDir, Url) {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("package.json"), "{}").unwrap();
    let uri = Url::from_file_path(temp.path().join("a.test.ts")).unwrap();
    (temp, uri)
}

// ============================================================================
// Initialization
// ============================================================================

#[tokio::test]
async fn test_capabilities() {
    let service = start();
    let server = service.inner();

    let result = server.initialize(InitializeParams::default()).await.unwrap();

    let info = result.server_info.unwrap();
    assert_eq!(info.name, "vitest-lens");
    assert!(info.version.is_some());

    let caps = result.capabilities;
    assert!(caps.text_document_sync.is_some());
    assert!(caps.code_lens_provider.is_some());
    let commands = caps.execute_command_provider.unwrap().commands;
    assert!(commands.contains(&RUN_COMMAND.to_string()));
    assert!(commands.contains(&DEBUG_COMMAND.to_string()));
}

#[tokio::test]
async fn test_initialization_options_change_markers() {
    let service = start();
    let server = service.inner();

    server
        .initialize(InitializeParams {
            initialization_options: Some(json!({
                "discovery": { "suite_markers": ["suite"], "test_markers": ["spec"] }
            })),
            ..Default::default()
        })
        .await
        .unwrap();

    let (_temp, uri) = project();
    open(server, &uri, "suite('s', () => { spec('t', () => {}); it('x', () => {}) })").await;

    let found = lenses(server, &uri).await.unwrap();
    assert_eq!(found.len(), 4);
}

#[tokio::test]
async fn test_invalid_initialization_options_keep_defaults() {
    let service = start();
    let server = service.inner();

    server
        .initialize(InitializeParams {
            initialization_options: Some(json!({ "runner": { "max_root_hops": 0 } })),
            ..Default::default()
        })
        .await
        .unwrap();

    let (_temp, uri) = project();
    open(server, &uri, SOURCE).await;
    assert_eq!(lenses(server, &uri).await.unwrap().len(), 4);
}

// ============================================================================
// Code lenses
// ============================================================================

#[tokio::test]
async fn test_code_lenses_for_nested_declarations() {
    let service = start();
    let server = service.inner();
    let (_temp, uri) = project();
    open(server, &uri, SOURCE).await;

    let found = lenses(server, &uri).await.unwrap();
    assert_eq!(found.len(), 4);

    let titles: Vec<&str> = found
        .iter()
        .map(|lens| lens.command.as_ref().unwrap().title.as_str())
        .collect();
    assert_eq!(
        titles,
        vec!["Run(Vitest)", "Debug(Vitest)", "Run(Vitest)", "Debug(Vitest)"]
    );

    // Anchored on the name literal of `it('B', ...)`.
    assert_eq!(found[2].range.start, Position::new(1, 5));
    assert_eq!(found[2].range.end, Position::new(1, 8));

    let command = found[3].command.as_ref().unwrap();
    assert_eq!(command.command, DEBUG_COMMAND);
    let argument = command.arguments.as_ref().unwrap()[0].clone();
    let declaration = TestDeclaration::from_json(argument).unwrap();
    assert_eq!(declaration.kind, TestKind::Test);
    assert_eq!(declaration.name, "B");
    assert_eq!(declaration.ancestor_names, vec!["A"]);
    assert_eq!(declaration.source_file, uri.to_file_path().unwrap());
}

#[tokio::test]
async fn test_code_lenses_follow_edits() {
    let service = start();
    let server = service.inner();
    let (_temp, uri) = project();
    open(server, &uri, SOURCE).await;

    server
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: uri.clone(),
                version: 2,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "test('only', () => {})".to_string(),
            }],
        })
        .await;

    let found = lenses(server, &uri).await.unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].range.start, Position::new(0, 5));
}

#[tokio::test]
async fn test_code_lenses_unknown_or_closed_document() {
    let service = start();
    let server = service.inner();
    let (_temp, uri) = project();

    assert!(lenses(server, &uri).await.is_none());

    open(server, &uri, SOURCE).await;
    server
        .did_close(DidCloseTextDocumentParams {
            text_document: text_document(&uri),
        })
        .await;
    assert!(lenses(server, &uri).await.is_none());
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn test_execute_run_and_debug() {
    let service = start();
    let server = service.inner();
    let (temp, uri) = project();
    open(server, &uri, SOURCE).await;

    let found = lenses(server, &uri).await.unwrap();
    let argument = found[2].command.as_ref().unwrap().arguments.as_ref().unwrap()[0].clone();

    let run = server
        .execute_command(execute(RUN_COMMAND, argument.clone()))
        .await
        .unwrap()
        .unwrap();
    let debug = server
        .execute_command(execute(DEBUG_COMMAND, argument))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(run["noDebug"], true);
    assert_eq!(debug["noDebug"], false);
    assert_eq!(run["cwd"], temp.path().display().to_string());
    assert_eq!(run["args"][3], "--testNamePattern");
    assert_eq!(run["args"][4], "^A B$");

    let mut run_without_flag = run.clone();
    run_without_flag["noDebug"] = json!(false);
    assert_eq!(run_without_flag, debug);
}

#[tokio::test]
async fn test_execute_without_project_root_fails() {
    let service = start();
    let server = service.inner();

    server
        .initialize(InitializeParams {
            initialization_options: Some(json!({
                "runner": { "manifest": "vitest-lens-missing-manifest.json" }
            })),
            ..Default::default()
        })
        .await
        .unwrap();

    let (_temp, uri) = project();
    let argument = json!({
        "kind": "test",
        "sourceFile": uri.to_file_path().unwrap(),
        "span": { "start": 0, "end": 3 },
        "name": "orphan",
        "ancestorNames": [],
    });

    let err = server
        .execute_command(execute(RUN_COMMAND, argument))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InternalError);
    assert!(err.message.contains("can't find the root of the project"));
}

#[tokio::test]
async fn test_execute_unknown_command() {
    let service = start();
    let server = service.inner();

    let err = server
        .execute_command(execute("vitest.unknown", json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MethodNotFound);
}

#[tokio::test]
async fn test_repeated_failures_do_not_block() {
    let service = start();
    let server = service.inner();

    let bad_kind = json!({
        "kind": "benchmark",
        "sourceFile": "/p/a.test.ts",
        "span": { "start": 0, "end": 3 },
        "name": "a",
        "ancestorNames": [],
    });

    // Each failure shows a message to the client.
    for _ in 0..3 {
        let err = server
            .execute_command(execute(RUN_COMMAND, bad_kind.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
    }

    let err = server
        .execute_command(execute("vitest.unknown", json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MethodNotFound);
}
