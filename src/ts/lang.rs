//! Grammar selection.
//!
//! Grammars come from ast-grep-language's bundled set so tree-sitter and
//! ast-grep agree on node kinds. The crate never assumes a particular
//! grammar; node kinds are whatever the selected language defines.

use crate::ts::errors::TreeSitterError;
pub use ast_grep_language::SupportLang;
use std::path::Path;

/// Language names accepted on the command line and in config, with aliases.
const NAMES: &[(&str, SupportLang)] = &[
    ("javascript", SupportLang::JavaScript),
    ("js", SupportLang::JavaScript),
    ("typescript", SupportLang::TypeScript),
    ("ts", SupportLang::TypeScript),
    ("tsx", SupportLang::Tsx),
    ("rust", SupportLang::Rust),
    ("rs", SupportLang::Rust),
    ("python", SupportLang::Python),
    ("py", SupportLang::Python),
    ("go", SupportLang::Go),
    ("json", SupportLang::Json),
];

/// Map a file extension (without the dot) to a grammar.
pub fn from_extension(ext: &str) -> Option<SupportLang> {
    let lang = match ext.to_ascii_lowercase().as_str() {
        "js" | "mjs" | "cjs" | "jsx" => SupportLang::JavaScript,
        "ts" | "mts" | "cts" => SupportLang::TypeScript,
        "tsx" => SupportLang::Tsx,
        "rs" => SupportLang::Rust,
        "py" | "pyi" => SupportLang::Python,
        "go" => SupportLang::Go,
        "json" => SupportLang::Json,
        _ => return None,
    };
    Some(lang)
}

pub fn from_path(path: &Path) -> Result<SupportLang, TreeSitterError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(from_extension)
        .ok_or_else(|| TreeSitterError::UndetectedLanguage {
            path: path.to_path_buf(),
        })
}

/// Look a grammar up by name, suggesting the closest known name on a miss.
pub fn from_name(name: &str) -> Result<SupportLang, TreeSitterError> {
    let wanted = name.trim().to_ascii_lowercase();
    if let Some((_, lang)) = NAMES.iter().find(|(known, _)| *known == wanted) {
        return Ok(*lang);
    }

    let suggestion = NAMES
        .iter()
        .map(|(known, _)| (*known, strsim::jaro_winkler(known, &wanted)))
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(known, _)| known);

    Err(TreeSitterError::UnknownLanguage {
        name: name.to_string(),
        suggestion,
    })
}
