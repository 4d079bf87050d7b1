//! Test declaration discovery.
//!
//! Parses JavaScript/TypeScript with tree-sitter and walks the tree for
//! `describe`, `it` and `test` calls whose first argument is a string literal
//! and whose second argument is a function.
//!
//! ## Components
//!
//! - `SourceFile` - Source text plus its syntax tree
//! - `TestWalker` - Pre-order walk producing `TestDeclaration`s
//! - `CancellationToken` - Polled between node visits
//!
//! Only bare identifiers are recognized as markers: `vi.describe(...)` or
//! an aliased import of `it` is not picked up.

mod cancel;
mod declaration;
mod literal;
mod source;
mod walker;

pub use cancel::{CancelWhen, CancellationToken, NeverCancelled};
pub use declaration::{Span, TestDeclaration, TestKind};
pub use source::{SourceFile, SourceLanguage};
pub use walker::{discover, Discovery, TestWalker};
