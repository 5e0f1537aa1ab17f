//! Tree-sitter integration: grammars, incremental parsing and queries.
//!
//! This is the tree adapter the rest of the crate sits on. Trees are
//! immutable snapshots; every edit batch produces a fresh [`SyntaxTree`]
//! with its own [`TreeId`].

pub mod errors;
pub mod lang;
pub mod parser;
pub mod query;

pub use errors::TreeSitterError;
pub use lang::SupportLang;
pub use parser::{DocumentParser, ErrorNode, SyntaxTree, TreeId};
pub use query::QueryEngine;
