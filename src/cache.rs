//! Thread-local cache of compiled ast-grep patterns.
//!
//! Jump kinds backed by a pattern are compiled once per thread and
//! language instead of on every hint session. The cache holds at most
//! `MAX_CACHE_ENTRIES` patterns and is dropped wholesale when full.

use crate::sg::AstGrepError;
use ast_grep_core::Pattern;
use ast_grep_language::SupportLang;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::trace;

const MAX_CACHE_ENTRIES: usize = 64;

thread_local! {
    // Keyed on language too: `$A.b` is a different pattern in JS and Rust.
    static PATTERN_CACHE: RefCell<HashMap<(String, String), Pattern>> =
        RefCell::new(HashMap::new());
}

/// Get a compiled pattern from cache, or compile and cache it. Patterns
/// that fail to compile are not cached.
pub fn get_or_compile_pattern(
    pattern_str: &str,
    lang: SupportLang,
) -> Result<Pattern, AstGrepError> {
    let key = (format!("{lang:?}"), pattern_str.to_string());

    PATTERN_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();

        if let Some(pattern) = cache.get(&key) {
            return Ok(pattern.clone());
        }

        if cache.len() >= MAX_CACHE_ENTRIES {
            trace!(entries = cache.len(), "pattern cache full, clearing");
            cache.clear();
        }

        let compiled =
            Pattern::try_new(pattern_str, lang).map_err(|e| AstGrepError::InvalidPattern {
                message: e.to_string(),
            })?;
        cache.insert(key, compiled.clone());
        Ok(compiled)
    })
}

/// Number of patterns cached on this thread.
pub fn cache_size() -> usize {
    PATTERN_CACHE.with(|cache| cache.borrow().len())
}
