//! Command handlers for the Run / Debug code lenses.
//!
//! Handlers are plain closures registered by id. The server builds its
//! registry from a [`LaunchBuilder`] at startup and whenever the
//! configuration changes.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_lsp::lsp_types::notification::Notification;
use vitest_lens_core::{LaunchBuilder, LaunchSpec, LensError, Result, TestAction, TestDeclaration};

/// Handler invoked with the decoded declaration.
pub type CommandHandler = Box<dyn Fn(&TestDeclaration) -> Result<LaunchSpec> + Send + Sync>;

/// Asks the client to start a debug session with the given configuration.
pub enum StartDebugging {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartDebuggingParams {
    pub configuration: LaunchSpec,
}

impl Notification for StartDebugging {
    type Params = StartDebuggingParams;
    const METHOD: &'static str = "vitestLens/startDebugging";
}

/// Command id to handler mapping.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: BTreeMap<String, CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Run and Debug handlers backed by `builder`.
    pub fn with_launch_builder(builder: Arc<LaunchBuilder>) -> Self {
        let mut registry = Self::new();
        for action in TestAction::ALL {
            let builder = Arc::clone(&builder);
            registry.register(action.command_id(), move |declaration| {
                builder.build(declaration, action.mode())
            });
        }
        registry
    }

    pub fn register<F>(&mut self, id: impl Into<String>, handler: F)
    where
        F: Fn(&TestDeclaration) -> Result<LaunchSpec> + Send + Sync + 'static,
    {
        self.handlers.insert(id.into(), Box::new(handler));
    }

    pub fn command_ids(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Decode the first argument as a declaration and run the handler for `id`.
    pub fn execute(&self, id: &str, arguments: Vec<Value>) -> Result<LaunchSpec> {
        let handler = self
            .handlers
            .get(id)
            .ok_or_else(|| LensError::UnknownCommand(id.to_string()))?;

        let argument = arguments.into_iter().next().ok_or_else(|| {
            LensError::InvalidArgument("expected a test declaration argument".to_string())
        })?;
        let declaration = TestDeclaration::from_json(argument)?;

        handler(&declaration)
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.command_ids())
            .finish()
    }
}
