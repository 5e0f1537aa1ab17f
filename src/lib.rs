//! Syntax Cursor: modal, syntax-tree-aware navigation and structural editing
//!
//! A cursor that lives on syntax nodes instead of characters. The current
//! node survives document edits through an [`AnchorTracker`], moves through
//! the tree with the [`navigator`], and jumps anywhere on screen with
//! short typed labels from the [`hints`] labeler.
//!
//! # Architecture
//!
//! Every document change is a batch of byte-span [`Replacement`]s. A
//! [`Buffer`] applies a batch as one unit: splice the text, reparse
//! incrementally, shift the anchor by the same batch, swap in the new
//! tree. The anchor is reconciled against the new tree lazily, on first
//! access.
//!
//! The editor embedding is abstracted behind [`Host`]; the [`Engine`]
//! turns keystrokes into commands and mirrors every edit to the host.
//!
//! # Example
//!
//! ```no_run
//! use syntax_cursor::{Buffer, Config, Engine, RecordingHost, SupportLang};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let source = "const a = 1;\nconst b = 2;\n";
//! let buffer = Buffer::new(SupportLang::JavaScript, source)?;
//! let mut engine = Engine::new(buffer, RecordingHost::new(source), Config::default())?;
//!
//! engine.focus_at(0);
//! engine.replay("J").await;
//! assert_eq!(engine.buffer().text(), "const b = 2;\nconst a = 1;\n");
//! # Ok(())
//! # }
//! ```

pub mod anchor;
pub mod buffer;
pub mod cache;
pub mod commands;
pub mod config;
pub mod edit;
pub mod hints;
pub mod host;
pub mod logging;
pub mod navigator;
pub mod sg;
pub mod span;
pub mod ts;

// Re-exports
pub use anchor::{AnchorStatus, AnchorTracker};
pub use buffer::{Buffer, BufferError};
pub use commands::{Command, CommandError, Engine, ModeExit};
pub use config::{load_from_path, load_from_str, Config, ConfigError};
pub use edit::{apply_replacements, EditError, Replacement, TextEdit};
pub use hints::{assign_labels, select_target, Alphabet, HintError, HintSession, Selection};
pub use host::{ExitMode, Host, HostError, InputEvent, RecordingHost};
pub use navigator::{vertical_step, Direction, VerticalPolicy};
pub use span::{ByteSpan, NodeRef};
pub use ts::{DocumentParser, SupportLang, SyntaxTree, TreeSitterError};
