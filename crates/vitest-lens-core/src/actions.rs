//! Inline actions offered for each declaration.

use serde::{Deserialize, Serialize};

use crate::discovery::{Span, TestDeclaration};
use crate::launch::RunMode;

/// Command id for running a test without the debugger.
pub const RUN_COMMAND: &str = "vitest.runTest";

/// Command id for debugging a test.
pub const DEBUG_COMMAND: &str = "vitest.debugTest";

/// One of the two actions attached to a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestAction {
    Run,
    Debug,
}

impl TestAction {
    pub const ALL: [TestAction; 2] = [TestAction::Run, TestAction::Debug];

    pub fn command_id(&self) -> &'static str {
        match self {
            Self::Run => RUN_COMMAND,
            Self::Debug => DEBUG_COMMAND,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Run => "Run(Vitest)",
            Self::Debug => "Debug(Vitest)",
        }
    }

    pub fn mode(&self) -> RunMode {
        match self {
            Self::Run => RunMode::Run,
            Self::Debug => RunMode::Debug,
        }
    }

    pub fn from_command_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.command_id() == id)
    }
}

/// An action anchored at a declaration's name literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub span: Span,
    pub action: TestAction,
    pub declaration: TestDeclaration,
}

/// Run and Debug annotations for each declaration, in order.
pub fn annotations(declarations: &[TestDeclaration]) -> Vec<Annotation> {
    declarations
        .iter()
        .flat_map(|declaration| {
            TestAction::ALL.into_iter().map(move |action| Annotation {
                span: declaration.span,
                action,
                declaration: declaration.clone(),
            })
        })
        .collect()
}
