use crate::sg::AstGrepError;
use crate::ts::TreeSitterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HintError {
    #[error("hint alphabet is empty")]
    EmptyAlphabet,

    #[error("hint alphabet repeats '{0}'")]
    DuplicateCharacter(char),

    #[error("hint alphabet contains whitespace")]
    WhitespaceCharacter,

    #[error("{requested} hint targets requested but only {capacity} labels are addressable")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error(transparent)]
    Query(#[from] TreeSitterError),

    #[error(transparent)]
    Pattern(#[from] AstGrepError),
}
