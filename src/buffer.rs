//! One document: text, current tree, and the anchor that tracks focus.

use crate::anchor::{AnchorStatus, AnchorTracker};
use crate::edit::{apply_replacements, EditError, Replacement, TextEdit};
use crate::span::{ByteSpan, NodeRef};
use crate::ts::{DocumentParser, SupportLang, SyntaxTree, TreeSitterError};
use thiserror::Error;
use tracing::debug;
use tree_sitter::Node;

#[derive(Error, Debug)]
pub enum BufferError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Parse(#[from] TreeSitterError),
}

pub struct Buffer {
    text: String,
    parser: DocumentParser,
    tree: SyntaxTree,
    anchor: AnchorTracker,
}

impl Buffer {
    pub fn new(lang: SupportLang, text: impl Into<String>) -> Result<Self, BufferError> {
        let text = text.into();
        let mut parser = DocumentParser::new(lang)?;
        let tree = parser.parse(&text)?;
        Ok(Self {
            text,
            parser,
            tree,
            anchor: AnchorTracker::new(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn language(&self) -> SupportLang {
        self.parser.language()
    }

    pub fn anchor(&self) -> &AnchorTracker {
        &self.anchor
    }

    pub fn anchor_status(&self) -> AnchorStatus {
        self.anchor.status(&self.tree)
    }

    /// Apply one batch of replacements as a single unit.
    ///
    /// The text, the tree and the anchor move together: on error nothing
    /// changes, on success the new tree is only installed after the anchor
    /// has been shifted by exactly the edits that produced it.
    pub fn apply(&mut self, replacements: &[Replacement]) -> Result<Vec<TextEdit>, BufferError> {
        if replacements.is_empty() {
            return Ok(Vec::new());
        }

        let batch = apply_replacements(&self.text, replacements)?;
        let tree = self
            .parser
            .reparse(&batch.text, &self.tree, &batch.input_edits)?;

        self.anchor.apply_edits(&batch.text_edits);
        debug!(
            edits = batch.text_edits.len(),
            prior = ?self.tree.id(),
            tree = ?tree.id(),
            anchor = ?self.anchor.span(),
            "applied edit batch"
        );
        self.text = batch.text;
        self.tree = tree;

        Ok(batch.text_edits)
    }

    /// Anchor the node `target` refers to in the current tree. `None`
    /// clears the anchor. Returns whether a node is now anchored.
    pub fn focus(&mut self, target: Option<NodeRef>) -> bool {
        match target {
            Some(target) => {
                self.anchor.retarget(target.span, Some(target.kind_id));
                self.refresh_anchor()
            }
            None => {
                self.anchor.clear();
                false
            }
        }
    }

    /// Point the anchor at a span with no known node, such as text that
    /// was just inserted.
    pub fn retarget(&mut self, span: ByteSpan) -> bool {
        self.anchor.retarget(span, None);
        self.refresh_anchor()
    }

    /// Resolve the anchor against the current tree if it isn't already.
    pub fn refresh_anchor(&mut self) -> bool {
        let Buffer { tree, anchor, .. } = self;
        anchor.resolve(tree).is_some()
    }

    /// The anchored node, as of the last [`refresh_anchor`](Self::refresh_anchor).
    pub fn current_node(&self) -> Option<Node<'_>> {
        self.anchor.peek(&self.tree)
    }

    pub fn node_text(&self, node: Node<'_>) -> &str {
        &self.text[node.byte_range()]
    }

    /// Text of `row`, without its line break. Empty past the end.
    pub fn line(&self, row: usize) -> &str {
        self.text.lines().nth(row).unwrap_or("")
    }

    /// Outermost named node below the root that starts at `byte`.
    pub fn outermost_node_at(&self, byte: usize) -> Option<Node<'_>> {
        let root = self.tree.root_node();
        let mut node = root.named_descendant_for_byte_range(byte, byte)?;
        if node.start_byte() != byte {
            return None;
        }
        while let Some(parent) = node.parent() {
            if parent.id() == root.id() || parent.start_byte() != byte {
                break;
            }
            node = parent;
        }
        (node.id() != root.id()).then_some(node)
    }
}
