//! Key-driven commands on top of the anchor, navigator and hint labeler.
//!
//! Every command is a no-op when there is no current node or no target.

pub mod edit_ops;
pub mod engine;
pub mod navigation;
pub mod wrap;

use crate::buffer::BufferError;
use crate::edit::EditError;
use crate::hints::HintError;
use crate::host::{ExitMode, HostError};
use crate::navigator::Direction;
use thiserror::Error;

pub use engine::{Engine, ModeExit};

pub const ESCAPE: char = '\u{1b}';

/// Where `a`/`A` put the new node relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `j` / `k`
    Vertical(Direction),
    /// `h`: pick an enclosing node
    Parent,
    /// `l` (inside the current node) / `g` (anywhere)
    Jump { inside: bool },
    /// `J` / `K`
    Swap(Direction),
    /// `r`
    Replace,
    /// `w`
    Wrap,
    /// `W`
    Unwrap,
    /// `d` / `c`
    Delete { then_insert: bool },
    /// `a` / `A`
    Create(Placement),
    /// `i` / Escape
    Exit(ExitMode),
}

impl Command {
    pub fn from_key(key: char) -> Option<Self> {
        let command = match key {
            'j' => Command::Vertical(Direction::Forward),
            'k' => Command::Vertical(Direction::Backward),
            'h' => Command::Parent,
            'l' => Command::Jump { inside: true },
            'g' => Command::Jump { inside: false },
            'J' => Command::Swap(Direction::Forward),
            'K' => Command::Swap(Direction::Backward),
            'r' => Command::Replace,
            'w' => Command::Wrap,
            'W' => Command::Unwrap,
            'd' => Command::Delete { then_insert: false },
            'c' => Command::Delete { then_insert: true },
            'a' => Command::Create(Placement::After),
            'A' => Command::Create(Placement::Before),
            'i' => Command::Exit(ExitMode::Insert),
            ESCAPE => Command::Exit(ExitMode::Normal),
            _ => return None,
        };
        Some(command)
    }
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Hint(#[from] HintError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keymap() {
        assert_eq!(
            Command::from_key('j'),
            Some(Command::Vertical(Direction::Forward))
        );
        assert_eq!(
            Command::from_key('K'),
            Some(Command::Swap(Direction::Backward))
        );
        assert_eq!(
            Command::from_key(ESCAPE),
            Some(Command::Exit(ExitMode::Normal))
        );
        assert_eq!(Command::from_key('z'), None);
    }
}
