//! Prefix-free hint labels.
//!
//! With `k` characters and `n` targets, `n <= k` gets single characters.
//! Beyond that, `s = k - ceil(n / k)` characters stay single-letter labels
//! and the rest become first letters of two-letter labels, so the two sets
//! never share a first character.

use crate::hints::errors::HintError;
use std::collections::HashSet;

/// Home-row-first ordering for a Dvorak layout.
pub const DEFAULT_ALPHABET: &str = "aoeuidhtnsqjkxbmwvzyfpglcr";

/// Ordered set of label characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    pub fn new(chars: &str) -> Result<Self, HintError> {
        let chars: Vec<char> = chars.chars().collect();
        if chars.is_empty() {
            return Err(HintError::EmptyAlphabet);
        }
        if chars.iter().any(|c| c.is_whitespace()) {
            return Err(HintError::WhitespaceCharacter);
        }

        let mut seen = HashSet::new();
        if let Some(dup) = chars.iter().find(|c| !seen.insert(**c)) {
            return Err(HintError::DuplicateCharacter(*dup));
        }

        Ok(Self { chars })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Largest number of targets that can be labeled at once: `k + (k-1)k`,
    /// which is `k²`.
    pub fn capacity(&self) -> usize {
        self.len() * self.len()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            chars: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

/// Number of single-character labels used for `n` targets.
pub fn single_count(n: usize, k: usize) -> usize {
    if n <= k {
        n
    } else {
        k.saturating_sub(n.div_ceil(k))
    }
}

/// Labels for `n` targets in rank order: the first `n` get the shortest,
/// earliest labels.
pub fn assign_labels(n: usize, alphabet: &Alphabet) -> Result<Vec<String>, HintError> {
    let k = alphabet.len();
    if n > alphabet.capacity() {
        return Err(HintError::CapacityExceeded {
            requested: n,
            capacity: alphabet.capacity(),
        });
    }

    let chars = alphabet.chars();
    if n <= k {
        return Ok(chars[..n].iter().map(char::to_string).collect());
    }

    let singles = single_count(n, k);
    let mut labels: Vec<String> = chars[..singles].iter().map(char::to_string).collect();
    labels.extend(
        chars[singles..]
            .iter()
            .flat_map(|first| chars.iter().map(move |second| format!("{first}{second}")))
            .take(n - singles),
    );

    Ok(labels)
}
