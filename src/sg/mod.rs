//! ast-grep integration for pattern-based jump targets.
//!
//! Patterns use ast-grep's metavariable syntax ($NAME, $$$ARGS, etc.) in
//! the document's own language, e.g. `console.log($$$)`.

pub mod errors;
pub mod matcher;

pub use errors::AstGrepError;
pub use matcher::{PatternMatch, PatternMatcher};
