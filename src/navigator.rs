//! Traversal over named nodes: sibling steps, outline-style vertical
//! movement, ancestor chains, and exact-span lookup.
//!
//! Everything here is a pure function of a node; nothing suspends or
//! allocates beyond a tree cursor. Exhausted traversals return `None`.

use crate::span::ByteSpan;
use serde::Deserialize;
use std::iter;
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards later siblings
    Forward,
    /// Towards earlier siblings
    Backward,
}

/// Which sibling a vertical step is allowed to land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalPolicy {
    /// First sibling in the direction of travel, ascending when none is left.
    #[default]
    Plain,
    /// Like `Plain`, but skip candidates that share a row with the origin:
    /// forward targets must start below the origin's last row, backward
    /// targets must end above its first row.
    Line,
}

/// Adjacent named sibling in `direction`.
pub fn next_sibling(direction: Direction, node: Node<'_>) -> Option<Node<'_>> {
    match direction {
        Direction::Forward => node.next_named_sibling(),
        Direction::Backward => node.prev_named_sibling(),
    }
}

/// Next node to focus when moving through the tree as a flattened outline.
///
/// Tries the sibling in `direction`; at the end of a sibling list, pops up
/// to the parent and tries again. Returns `None` once the root is reached.
pub fn vertical_step(
    direction: Direction,
    node: Node<'_>,
    policy: VerticalPolicy,
) -> Option<Node<'_>> {
    let mut cursor = node;
    loop {
        match next_sibling(direction, cursor) {
            Some(sibling) if accepts(policy, direction, node, sibling) => return Some(sibling),
            Some(sibling) => cursor = sibling,
            None => cursor = cursor.parent()?,
        }
    }
}

fn accepts(policy: VerticalPolicy, direction: Direction, origin: Node<'_>, candidate: Node<'_>) -> bool {
    match (policy, direction) {
        (VerticalPolicy::Plain, _) => true,
        (VerticalPolicy::Line, Direction::Forward) => {
            candidate.start_position().row > origin.end_position().row
        }
        (VerticalPolicy::Line, Direction::Backward) => {
            candidate.end_position().row < origin.start_position().row
        }
    }
}

/// Ancestors from the immediate parent up to and including the root.
pub fn parent_chain<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    iter::successors(node.parent(), |n| n.parent())
}

pub fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let first = node.named_children(&mut cursor).next();
    first
}

/// True if `node` sits strictly below `ancestor`.
pub fn is_descendant(node: Node<'_>, ancestor: Node<'_>) -> bool {
    if !ByteSpan::of(ancestor).contains(ByteSpan::of(node)) {
        return false;
    }
    parent_chain(node).any(|n| n.id() == ancestor.id())
}

/// Top-down search for the named node whose range is exactly `span`.
///
/// Starting at `root`, repeatedly descend into the first named child that
/// contains `span`, stopping when none does. Among the exact matches met on
/// the way, one of `kind_id` wins; otherwise the deepest.
pub fn node_for_span(root: Node<'_>, span: ByteSpan, kind_id: Option<u16>) -> Option<Node<'_>> {
    let mut current = root;
    let mut deepest = (ByteSpan::of(root) == span).then_some(root);
    let mut preferred = deepest.filter(|n| Some(n.kind_id()) == kind_id);

    loop {
        let mut cursor = current.walk();
        let next = current
            .named_children(&mut cursor)
            .find(|child| ByteSpan::of(*child).contains(span));
        let Some(child) = next else {
            break;
        };

        if ByteSpan::of(child) == span {
            deepest = Some(child);
            if preferred.is_none() && Some(child.kind_id()) == kind_id {
                preferred = Some(child);
            }
        }
        current = child;
    }

    preferred.or(deepest)
}

/// Named-child indices leading from the root to `node`.
///
/// `None` for anonymous nodes, which have no place among named children.
pub fn index_path(node: Node<'_>) -> Option<Vec<usize>> {
    let mut path = Vec::new();
    let mut current = node;
    while let Some(parent) = current.parent() {
        let mut cursor = parent.walk();
        let index = parent
            .named_children(&mut cursor)
            .position(|child| child.id() == current.id())?;
        path.push(index);
        current = parent;
    }
    path.reverse();
    Some(path)
}

/// Follow a path produced by [`index_path`]. No searching.
pub fn follow_path<'t>(root: Node<'t>, path: &[usize]) -> Option<Node<'t>> {
    let mut current = root;
    for &index in path {
        let mut cursor = current.walk();
        let next = current.named_children(&mut cursor).nth(index)?;
        current = next;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::{DocumentParser, SupportLang, SyntaxTree};

    fn parse(source: &str) -> SyntaxTree {
        DocumentParser::new(SupportLang::JavaScript)
            .unwrap()
            .parse(source)
            .unwrap()
    }

    fn find<'t>(tree: &'t SyntaxTree, source: &str, text: &str) -> Node<'t> {
        let start = source.find(text).expect("text present");
        node_for_span(tree.root_node(), ByteSpan::new(start, start + text.len()), None)
            .expect("node with exact span")
    }

    const FLAT: &str = "const a = 1;\nconst b = 2;\nconst c = 3;";

    #[test]
    fn sibling_steps_and_edges() {
        let tree = parse(FLAT);
        let b = find(&tree, FLAT, "const b = 2;");

        let next = next_sibling(Direction::Forward, b).unwrap();
        assert_eq!(&FLAT[next.byte_range()], "const c = 3;");
        let prev = next_sibling(Direction::Backward, b).unwrap();
        assert_eq!(&FLAT[prev.byte_range()], "const a = 1;");

        assert!(next_sibling(Direction::Forward, next).is_none());
        assert!(next_sibling(Direction::Backward, prev).is_none());
    }

    #[test]
    fn vertical_step_ascends_out_of_blocks() {
        let source = "if (x) {\n  a();\n}\nb();";
        let tree = parse(source);
        let a = find(&tree, source, "a();");

        let target = vertical_step(Direction::Forward, a, VerticalPolicy::Plain).unwrap();
        assert_eq!(&source[target.byte_range()], "b();");
    }

    #[test]
    fn vertical_step_exhausted_in_nested_block() {
        let source = "function f() {\n  if (x) {\n    a();\n  }\n}";
        let tree = parse(source);
        let a = find(&tree, source, "a();");

        assert!(vertical_step(Direction::Forward, a, VerticalPolicy::Plain).is_none());
        assert!(vertical_step(Direction::Forward, a, VerticalPolicy::Line).is_none());
    }

    #[test]
    fn vertical_step_from_root_is_none() {
        let tree = parse(FLAT);
        assert!(vertical_step(Direction::Forward, tree.root_node(), VerticalPolicy::Plain).is_none());
    }

    #[test]
    fn line_policy_skips_same_row_siblings() {
        let source = "const a = 1; const b = 2;\nconst c = 3;";
        let tree = parse(source);
        let a = find(&tree, source, "const a = 1;");

        let plain = vertical_step(Direction::Forward, a, VerticalPolicy::Plain).unwrap();
        assert_eq!(&source[plain.byte_range()], "const b = 2;");

        let line = vertical_step(Direction::Forward, a, VerticalPolicy::Line).unwrap();
        assert_eq!(&source[line.byte_range()], "const c = 3;");

        let c = line;
        let back = vertical_step(Direction::Backward, c, VerticalPolicy::Line).unwrap();
        assert_eq!(&source[back.byte_range()], "const b = 2;");
    }

    #[test]
    fn parent_chain_reaches_root() {
        let source = "function f() { return 1; }";
        let tree = parse(source);
        let ret = find(&tree, source, "return 1;");

        let kinds: Vec<_> = parent_chain(ret).map(|n| n.kind()).collect();
        assert_eq!(kinds, vec!["statement_block", "function_declaration", "program"]);
        assert!(is_descendant(ret, tree.root_node()));
        assert!(!is_descendant(tree.root_node(), ret));
    }

    #[test]
    fn first_child_descends() {
        let tree = parse(FLAT);
        let first = first_named_child(tree.root_node()).unwrap();
        assert_eq!(&FLAT[first.byte_range()], "const a = 1;");
    }

    #[test]
    fn span_lookup_prefers_remembered_kind() {
        // `(x)` without a semicolon: expression_statement and
        // parenthesized_expression share a span.
        let source = "(x)";
        let tree = parse(source);
        let span = ByteSpan::new(0, 3);

        let deepest = node_for_span(tree.root_node(), span, None).unwrap();
        assert_eq!(deepest.kind(), "parenthesized_expression");

        let statement_kind = tree.root_node().named_child(0).unwrap().kind_id();
        let preferred = node_for_span(tree.root_node(), span, Some(statement_kind)).unwrap();
        assert_eq!(preferred.kind(), "expression_statement");
    }

    #[test]
    fn span_lookup_misses_partial_spans() {
        let tree = parse(FLAT);
        assert!(node_for_span(tree.root_node(), ByteSpan::new(1, 14), None).is_none());
    }

    #[test]
    fn index_path_round_trips() {
        let source = "function f() { if (x) { a(); } }";
        let tree = parse(source);
        let a = find(&tree, source, "a();");

        let path = index_path(a).unwrap();
        let followed = follow_path(tree.root_node(), &path).unwrap();
        assert_eq!(followed, a);
    }
}
