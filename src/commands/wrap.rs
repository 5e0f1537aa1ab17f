//! Wrap templates and unwrap strategies.

use crate::config::WrapConfig;
use crate::edit::Replacement;
use crate::span::ByteSpan;
use tree_sitter::Node;

/// Leading whitespace of `line`.
pub fn line_indent(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Prefix every line of `text` with `indent`.
pub fn indent_lines(text: &str, indent: &str) -> String {
    text.split('\n')
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Surround `code` with a template.
///
/// Multi-line code, or any code with a block template, goes on its own
/// lines one `indent_unit` deeper than `line_indent`, the indentation of
/// the line the code starts on. Empty code is always rendered inline.
pub fn render(wrap: &WrapConfig, code: &str, line_indent: &str, indent_unit: &str) -> String {
    let after = wrap.after.as_deref().unwrap_or("");

    if code.contains('\n') || (!code.is_empty() && !wrap.single_line) {
        let closing = if after.is_empty() {
            String::new()
        } else {
            format!("\n{line_indent}{after}")
        };
        // Later lines of `code` already carry their absolute indentation.
        let body = indent_lines(code, indent_unit);
        format!("{}\n{line_indent}{body}{closing}", wrap.before)
    } else {
        format!("{}{code}{after}", wrap.before)
    }
}

/// Span of `text` inserted at `at`, minus surrounding whitespace.
pub fn trimmed_span(at: usize, text: &str) -> ByteSpan {
    let leading = text.len() - text.trim_start().len();
    let trailing = text.len() - text.trim_end().len();
    if leading == text.len() {
        return ByteSpan::new(at, at);
    }
    ByteSpan::new(at + leading, at + text.len() - trailing)
}

/// How to remove a node's parent while keeping the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnwrapStrategy {
    /// Drop the opening and closing tags.
    JsxElement,
    /// Drop the braces, and with them the rest of the statement that owns
    /// the block.
    StatementBlock,
    /// Replace the parent with the node's own text.
    ReplaceParent,
}

impl UnwrapStrategy {
    pub fn for_kind(kind: &str) -> Self {
        match kind {
            "jsx_element" => UnwrapStrategy::JsxElement,
            "statement_block" => UnwrapStrategy::StatementBlock,
            _ => UnwrapStrategy::ReplaceParent,
        }
    }

    /// Replacements that unwrap `node` from `parent`.
    pub fn replacements(self, parent: Node<'_>, node: Node<'_>, text: &str) -> Vec<Replacement> {
        match self {
            UnwrapStrategy::JsxElement => {
                match (
                    parent.child_by_field_name("open_tag"),
                    parent.child_by_field_name("close_tag"),
                ) {
                    (Some(open), Some(close)) => vec![
                        Replacement::delete(ByteSpan::of(open)),
                        Replacement::delete(ByteSpan::of(close)),
                    ],
                    _ => UnwrapStrategy::ReplaceParent.replacements(parent, node, text),
                }
            }
            UnwrapStrategy::StatementBlock => {
                let owner = parent
                    .parent()
                    .filter(|owner| owner.kind() != "statement_block" && owner.parent().is_some());
                match owner {
                    Some(owner) => {
                        let mut cursor = owner.walk();
                        let children: Vec<Node<'_>> = owner.children(&mut cursor).collect();
                        children
                            .into_iter()
                            .flat_map(|child| {
                                if child.id() == parent.id() {
                                    braces(child)
                                } else {
                                    vec![Replacement::delete(ByteSpan::of(child))]
                                }
                            })
                            .collect()
                    }
                    None => braces(parent),
                }
            }
            UnwrapStrategy::ReplaceParent => {
                vec![Replacement::replace(
                    ByteSpan::of(parent),
                    &text[node.byte_range()],
                )]
            }
        }
    }
}

fn braces(block: Node<'_>) -> Vec<Replacement> {
    let mut cursor = block.walk();
    let children: Vec<Node<'_>> = block.children(&mut cursor).collect();
    match (children.first(), children.last()) {
        (Some(open), Some(close)) if children.len() > 1 => vec![
            Replacement::delete(ByteSpan::of(*open)),
            Replacement::delete(ByteSpan::of(*close)),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_replacements;
    use crate::navigator::node_for_span;
    use crate::ts::{DocumentParser, SupportLang, SyntaxTree};

    fn wrap(before: &str, after: Option<&str>, single_line: bool) -> WrapConfig {
        WrapConfig {
            key: "x".to_string(),
            before: before.to_string(),
            after: after.map(str::to_string),
            single_line,
        }
    }

    #[test]
    fn inline_wrap() {
        let parens = wrap("(", Some(")"), true);
        assert_eq!(render(&parens, "a + b", "  ", "  "), "(a + b)");
        assert_eq!(render(&wrap("return ", None, true), "x", "", "  "), "return x");
    }

    #[test]
    fn block_wrap_indents_code() {
        let cond = wrap("if (condition) {", Some("}"), false);
        assert_eq!(
            render(&cond, "run();", "  ", "  "),
            "if (condition) {\n    run();\n  }"
        );
    }

    #[test]
    fn multi_line_code_always_goes_on_own_lines() {
        let call = wrap("name(", Some(")"), true);
        assert_eq!(
            render(&call, "{\n  a: 1\n}", "", "  "),
            "name(\n  {\n    a: 1\n  }\n)"
        );
    }

    #[test]
    fn empty_code_renders_inline() {
        let cond = wrap("if (condition) {", Some("}"), false);
        assert_eq!(render(&cond, "", "    ", "  "), "if (condition) {}");
    }

    #[test]
    fn trimmed_span_skips_whitespace() {
        assert_eq!(trimmed_span(10, "\n  foo()"), ByteSpan::new(13, 18));
        assert_eq!(trimmed_span(0, "bar \n  "), ByteSpan::new(0, 3));
        assert_eq!(trimmed_span(4, "  "), ByteSpan::new(4, 4));
    }

    #[test]
    fn line_indent_is_leading_whitespace() {
        assert_eq!(line_indent("    let x;"), "    ");
        assert_eq!(line_indent("let x;"), "");
    }

    fn parse(lang: SupportLang, source: &str) -> SyntaxTree {
        DocumentParser::new(lang).unwrap().parse(source).unwrap()
    }

    fn unwrap_at(lang: SupportLang, source: &str, inner: &str) -> String {
        let tree = parse(lang, source);
        let start = source.find(inner).unwrap();
        let node = node_for_span(
            tree.root_node(),
            ByteSpan::new(start, start + inner.len()),
            None,
        )
        .unwrap();
        let parent = node.parent().unwrap();
        let edits = UnwrapStrategy::for_kind(parent.kind()).replacements(parent, node, source);
        apply_replacements(source, &edits).unwrap().text
    }

    #[test]
    fn strategy_follows_parent_kind() {
        assert_eq!(UnwrapStrategy::for_kind("jsx_element"), UnwrapStrategy::JsxElement);
        assert_eq!(UnwrapStrategy::for_kind("statement_block"), UnwrapStrategy::StatementBlock);
        assert_eq!(UnwrapStrategy::for_kind("arguments"), UnwrapStrategy::ReplaceParent);
    }

    #[test]
    fn unwrap_replaces_generic_parent() {
        let text = unwrap_at(SupportLang::JavaScript, "x = (y);", "y");
        assert_eq!(text, "x = y;");
    }

    #[test]
    fn block_wrap_keeps_relative_indentation() {
        let call = wrap("name(", Some(")"), true);
        assert_eq!(
            render(&call, "{\n    a: 1\n  }", "  ", "  "),
            "name(\n    {\n      a: 1\n    }\n  )"
        );
    }

    #[test]
    fn unwrap_removes_statement_around_block() {
        let text = unwrap_at(SupportLang::JavaScript, "if (x) { a(); }", "a();");
        assert_eq!(text.trim(), "a();");
    }

    #[test]
    fn unwrap_nested_block_drops_braces_only() {
        let text = unwrap_at(SupportLang::JavaScript, "function f() {\n  { a(); }\n}", "a();");
        assert_eq!(text, "function f() {\n   a(); \n}");
    }

    #[test]
    fn unwrap_jsx_removes_tags() {
        let text = unwrap_at(SupportLang::JavaScript, "x = <div><b /></div>;", "<b />");
        assert_eq!(text, "x = <b />;");
    }
}
