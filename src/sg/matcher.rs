use crate::cache;
use crate::sg::errors::AstGrepError;
use crate::span::ByteSpan;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_core::{AstGrep, NodeMatch};
use ast_grep_language::SupportLang;

/// A match from an ast-grep pattern.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    /// Byte range of the entire match
    pub span: ByteSpan,
    /// Node kind of the matched node
    pub kind: String,
}

/// Pattern matcher over one document snapshot.
///
/// ast-grep parses the text on its own, so matches are reported as byte
/// spans; callers map them back onto their own tree.
pub struct PatternMatcher {
    lang: SupportLang,
    sg: AstGrep<StrDoc<SupportLang>>,
}

impl PatternMatcher {
    pub fn new(source: &str, lang: SupportLang) -> Self {
        let sg = AstGrep::new(source, lang);
        Self { lang, sg }
    }

    /// Find all matches for a pattern, in document order.
    pub fn find_all(&self, pattern: &str) -> Result<Vec<PatternMatch>, AstGrepError> {
        if pattern.trim().is_empty() {
            return Err(AstGrepError::InvalidPattern {
                message: "pattern is empty".to_string(),
            });
        }

        let pat = cache::get_or_compile_pattern(pattern, self.lang)?;
        let root = self.sg.root();
        let results = root.find_all(&pat).map(to_pattern_match).collect();

        Ok(results)
    }
}

fn to_pattern_match(m: NodeMatch<StrDoc<SupportLang>>) -> PatternMatch {
    let node = m.get_node();
    PatternMatch {
        span: ByteSpan::from(node.range()),
        kind: node.kind().to_string(),
    }
}
