use crate::ts::errors::TreeSitterError;
use crate::ts::parser::SyntaxTree;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

/// Capture name that marks the node a query is looking for.
pub const TARGET_CAPTURE: &str = "target";

/// Engine for executing tree-sitter queries against a parsed document.
pub struct QueryEngine {
    query: Query,
    target_index: u32,
}

impl QueryEngine {
    /// Compile a query for `lang`.
    ///
    /// The node reported for each match is the `@target` capture when the
    /// query defines one, otherwise its first capture:
    /// ```text
    /// (if_statement condition: (_) @cond) @target
    /// ```
    pub fn new(lang: SupportLang, query_str: &str) -> Result<Self, TreeSitterError> {
        let language = lang.get_ts_language();
        let query = Query::new(&language, query_str).map_err(|e| TreeSitterError::InvalidQuery {
            message: e.to_string(),
        })?;

        if query.capture_names().is_empty() {
            return Err(TreeSitterError::InvalidQuery {
                message: "query has no captures".to_string(),
            });
        }
        let target_index = query.capture_index_for_name(TARGET_CAPTURE).unwrap_or(0);

        Ok(Self {
            query,
            target_index,
        })
    }

    /// All target nodes in document order, without duplicates.
    pub fn targets<'t>(&self, tree: &'t SyntaxTree, source: &str) -> Vec<Node<'t>> {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, tree.root_node(), source.as_bytes());

        let mut nodes = Vec::new();
        // tree-sitter 0.25+ uses StreamingIterator
        while let Some(m) = matches.next() {
            nodes.extend(
                m.captures
                    .iter()
                    .filter(|capture| capture.index == self.target_index)
                    .map(|capture| capture.node),
            );
        }

        nodes.sort_by_key(|node| (node.start_byte(), std::cmp::Reverse(node.end_byte())));
        nodes.dedup_by_key(|node| node.id());
        nodes
    }
}
