//! Candidate collection and ranking for a hint session.

use crate::hints::errors::HintError;
use crate::hints::labels::{assign_labels, Alphabet};
use crate::host::Host;
use crate::navigator::{is_descendant, node_for_span};
use crate::sg::{PatternMatch, PatternMatcher};
use crate::span::ByteSpan;
use crate::ts::{QueryEngine, SupportLang, SyntaxTree};
use tracing::trace;
use tree_sitter::{Node, Point};

/// A candidate node paired with the label that selects it.
#[derive(Debug, Clone, PartialEq)]
pub struct HintTarget<'t> {
    pub node: Node<'t>,
    pub label: String,
}

impl HintTarget<'_> {
    pub fn span(&self) -> ByteSpan {
        ByteSpan::of(self.node)
    }
}

/// Where the candidates of a jump kind come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSource {
    /// Named nodes of any of these grammar kinds
    Kinds(Vec<String>),
    /// Tree-sitter query; `@target` or the first capture
    Query(String),
    /// ast-grep pattern
    Pattern(String),
}

pub fn manhattan_distance(a: Point, b: Point) -> usize {
    a.row.abs_diff(b.row) + a.column.abs_diff(b.column)
}

/// Sort by distance from `cursor` to each node's start, nearest first, and
/// keep at most `limit`. Ties keep document order.
pub fn nearest_first<'t>(mut nodes: Vec<Node<'t>>, cursor: Point, limit: usize) -> Vec<Node<'t>> {
    nodes.sort_by_key(|node| manhattan_distance(cursor, node.start_position()));
    nodes.truncate(limit);
    nodes
}

/// Pair nodes with labels in rank order.
pub fn label_targets<'t>(
    nodes: Vec<Node<'t>>,
    alphabet: &Alphabet,
) -> Result<Vec<HintTarget<'t>>, HintError> {
    let labels = assign_labels(nodes.len(), alphabet)?;
    Ok(nodes
        .into_iter()
        .zip(labels)
        .map(|(node, label)| HintTarget { node, label })
        .collect())
}

/// Every node in `tree` matching `source`, in document order.
pub fn find_candidates<'t>(
    tree: &'t SyntaxTree,
    text: &str,
    lang: SupportLang,
    source: &TargetSource,
) -> Result<Vec<Node<'t>>, HintError> {
    let nodes = match source {
        TargetSource::Kinds(kinds) => nodes_of_kinds(tree.root_node(), kinds),
        TargetSource::Query(query) => QueryEngine::new(lang, query)?.targets(tree, text),
        TargetSource::Pattern(pattern) => {
            // ast-grep parses its own copy; map matches back onto our tree.
            let mut nodes: Vec<Node<'t>> = PatternMatcher::new(text, lang)
                .find_all(pattern)?
                .iter()
                .filter_map(|found| matched_node(tree.root_node(), found))
                .collect();
            nodes.dedup_by_key(|node| node.id());
            nodes
        }
    };
    Ok(nodes)
}

/// Node of our tree under `found`, preferring the kind ast-grep reported
/// when several named nodes share the span.
fn matched_node<'t>(root: Node<'t>, found: &PatternMatch) -> Option<Node<'t>> {
    let kind_id = root.language().id_for_node_kind(&found.kind, true);
    node_for_span(root, found.span, (kind_id != 0).then_some(kind_id))
}

fn nodes_of_kinds<'t>(root: Node<'t>, kinds: &[String]) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if kinds.iter().any(|kind| kind == node.kind()) {
            found.push(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    found
}

/// Candidates for one hint session, labeled and ready to show.
///
/// Keeps nodes the host reports visible (and, with `scope`, only those
/// strictly inside it), ranks them by distance from the host cursor, and
/// caps the list at what the alphabet can address.
pub fn collect_targets<'t, H: Host + ?Sized>(
    host: &H,
    tree: &'t SyntaxTree,
    text: &str,
    lang: SupportLang,
    source: &TargetSource,
    scope: Option<Node<'t>>,
    alphabet: &Alphabet,
) -> Result<Vec<HintTarget<'t>>, HintError> {
    let candidates: Vec<Node<'t>> = find_candidates(tree, text, lang, source)?
        .into_iter()
        .filter(|node| host.is_range_visible(node.start_position(), node.end_position()))
        .filter(|node| scope.map_or(true, |scope| is_descendant(*node, scope)))
        .collect();

    let cursor = host.cursor().unwrap_or(Point { row: 0, column: 0 });
    let ranked = nearest_first(candidates, cursor, alphabet.capacity());
    trace!(count = ranked.len(), ?source, "collected hint targets");

    label_targets(ranked, alphabet)
}
