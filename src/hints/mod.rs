//! Jump hints: label candidate nodes and pick one by typing its label.

pub mod errors;
pub mod labels;
pub mod session;
pub mod targets;

pub use errors::HintError;
pub use labels::{assign_labels, Alphabet, DEFAULT_ALPHABET};
pub use session::{select_target, HintSession, HintStep, Selection};
pub use targets::{collect_targets, find_candidates, HintTarget, TargetSource};
