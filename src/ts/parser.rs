use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;
use tree_sitter::{InputEdit, Node, Parser, Tree};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one parsed snapshot. Unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An immutable parse of a document at one point in time.
///
/// Superseded wholesale on every edit batch; nodes taken from one snapshot
/// must never be used against another.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    id: TreeId,
    tree: Tree,
}

impl SyntaxTree {
    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Check if the tree contains any ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Get all ERROR and MISSING nodes in the tree.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &mut errors);
        errors
    }
}

/// Information about an ERROR node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: tree_sitter::Point,
    pub end_point: tree_sitter::Point,
}

/// Incremental parser for one document language.
pub struct DocumentParser {
    parser: Parser,
    lang: SupportLang,
}

impl DocumentParser {
    pub fn new(lang: SupportLang) -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        let ts_lang = lang.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| TreeSitterError::LanguageSet)?;

        Ok(Self { parser, lang })
    }

    pub fn language(&self) -> SupportLang {
        self.lang
    }

    /// Parse a document from scratch.
    pub fn parse(&mut self, source: &str) -> Result<SyntaxTree, TreeSitterError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed)?;
        let id = TreeId::next();
        trace!(?id, len = source.len(), "parsed document");
        Ok(SyntaxTree { id, tree })
    }

    /// Produce the tree for `source` by editing a copy of `prior` and
    /// reparsing incrementally.
    ///
    /// `edits` are applied positionally, in order, so each one must be
    /// expressed against the tree as left by the edits before it. `prior`
    /// itself is left untouched.
    pub fn reparse(
        &mut self,
        source: &str,
        prior: &SyntaxTree,
        edits: &[InputEdit],
    ) -> Result<SyntaxTree, TreeSitterError> {
        let mut edited = prior.tree.clone();
        for edit in edits {
            edited.edit(edit);
        }

        let tree = self
            .parser
            .parse(source, Some(&edited))
            .ok_or(TreeSitterError::ParseFailed)?;
        let id = TreeId::next();
        trace!(prior = ?prior.id, ?id, edits = edits.len(), "reparsed document");
        Ok(SyntaxTree { id, tree })
    }
}

/// Source text covered by a node.
pub fn node_text<'s>(source: &'s str, node: Node<'_>) -> &'s str {
    &source[node.byte_range()]
}

fn collect_error_nodes(node: Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
            end_point: node.end_position(),
        });
    }

    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}
