//! The anchor: a tree-independent reference to "the current node".
//!
//! An anchor is a byte span plus the identity of the tree it was last
//! resolved against. Edits shift the span with plain offset arithmetic
//! ([`AnchorTracker::apply_edits`]); mapping the span back onto a node is a
//! separate, lazy step ([`AnchorTracker::resolve`]) that only runs the first
//! time someone asks after a tree swap.

use crate::edit::TextEdit;
use crate::navigator::{follow_path, index_path, node_for_span};
use crate::span::{ByteSpan, NodeRef};
use crate::ts::{SyntaxTree, TreeId};
use tracing::{debug, trace};
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStatus {
    /// Resolved against the tree it is being asked about.
    Live,
    /// Holds a span that has not been matched against this tree yet.
    Stale,
    /// Cleared; resolves to nothing until a node is set again.
    Invalidated,
}

/// How an edit relates to the anchored span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditRelation {
    Before,
    After,
    Contained,
    Overlapping,
}

/// Classify `edit` against `span`, both in pre-edit offsets.
///
/// Containment is checked first, so an insertion exactly at either
/// boundary of the span counts as inside it.
pub fn classify(span: ByteSpan, edit: &TextEdit) -> EditRelation {
    if edit.start >= span.start && edit.end <= span.end {
        EditRelation::Contained
    } else if edit.end <= span.start {
        EditRelation::Before
    } else if edit.start >= span.end {
        EditRelation::After
    } else {
        EditRelation::Overlapping
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolution {
    tree: TreeId,
    path: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Anchor {
    span: ByteSpan,
    kind_id: Option<u16>,
    resolved: Option<Resolution>,
}

/// Keeps one anchor valid through edits and tree replacements.
#[derive(Debug, Clone, Default)]
pub struct AnchorTracker {
    anchor: Option<Anchor>,
    searches: u64,
}

impl AnchorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor `node`, which must belong to `tree`; `None` clears the anchor.
    pub fn set(&mut self, tree: &SyntaxTree, node: Option<Node<'_>>) {
        self.anchor = node.map(|node| Anchor {
            span: ByteSpan::of(node),
            kind_id: Some(node.kind_id()),
            resolved: index_path(node).map(|path| Resolution {
                tree: tree.id(),
                path,
            }),
        });
        trace!(span = ?self.span(), "anchor set");
    }

    pub fn clear(&mut self) {
        self.anchor = None;
    }

    /// Point the anchor at a span that has no node yet, such as freshly
    /// inserted text. The next [`resolve`](Self::resolve) searches for it.
    pub fn retarget(&mut self, span: ByteSpan, kind_id: Option<u16>) {
        self.anchor = Some(Anchor {
            span,
            kind_id,
            resolved: None,
        });
        trace!(%span, "anchor retargeted");
    }

    pub fn span(&self) -> Option<ByteSpan> {
        self.anchor.as_ref().map(|a| a.span)
    }

    pub fn node_ref(&self) -> Option<NodeRef> {
        let anchor = self.anchor.as_ref()?;
        Some(NodeRef {
            span: anchor.span,
            kind_id: anchor.kind_id?,
        })
    }

    pub fn status(&self, tree: &SyntaxTree) -> AnchorStatus {
        match &self.anchor {
            None => AnchorStatus::Invalidated,
            Some(Anchor {
                resolved: Some(r), ..
            }) if r.tree == tree.id() => AnchorStatus::Live,
            Some(_) => AnchorStatus::Stale,
        }
    }

    /// Number of structural searches performed so far. Cache hits don't count.
    pub fn search_count(&self) -> u64 {
        self.searches
    }

    /// Shift the anchored span through one batch of edits.
    ///
    /// All edits are expressed against the document before the batch and
    /// must not overlap each other, so each is classified against the
    /// original span and the deltas are summed. An edit that straddles a
    /// boundary of the span invalidates the anchor and ends processing.
    ///
    /// Pure offset arithmetic: no tree is consulted.
    pub fn apply_edits(&mut self, edits: &[TextEdit]) {
        let Some(anchor) = self.anchor.as_mut() else {
            return;
        };
        if edits.is_empty() {
            return;
        }

        let span = anchor.span;
        let mut start_delta = 0isize;
        let mut end_delta = 0isize;

        for edit in edits {
            match classify(span, edit) {
                EditRelation::Before => {
                    start_delta += edit.delta();
                    end_delta += edit.delta();
                }
                EditRelation::Contained => end_delta += edit.delta(),
                EditRelation::After => {}
                EditRelation::Overlapping => {
                    debug!(%span, edit_start = edit.start, edit_end = edit.end, "edit straddles anchor, invalidating");
                    self.anchor = None;
                    return;
                }
            }
        }

        anchor.span = ByteSpan::new(
            span.start.saturating_add_signed(start_delta),
            span.end.saturating_add_signed(end_delta),
        );
        anchor.resolved = None;
        trace!(from = %span, to = %anchor.span, "anchor shifted");
    }

    /// The anchored node in `tree`, if there is one.
    ///
    /// Returns the cached node when the anchor was last resolved against
    /// this same tree. Otherwise searches for the node whose range equals
    /// the stored span; a miss clears the anchor.
    pub fn resolve<'t>(&mut self, tree: &'t SyntaxTree) -> Option<Node<'t>> {
        let (span, kind_id) = {
            let anchor = self.anchor.as_ref()?;
            if let Some(resolution) = &anchor.resolved {
                if resolution.tree == tree.id() {
                    if let Some(node) = follow_path(tree.root_node(), &resolution.path) {
                        return Some(node);
                    }
                }
            }
            (anchor.span, anchor.kind_id)
        };

        self.searches += 1;
        match node_for_span(tree.root_node(), span, kind_id) {
            Some(node) => {
                debug!(%span, kind = node.kind(), tree = ?tree.id(), "anchor resolved");
                self.anchor = Some(Anchor {
                    span,
                    kind_id: Some(node.kind_id()),
                    resolved: index_path(node).map(|path| Resolution {
                        tree: tree.id(),
                        path,
                    }),
                });
                Some(node)
            }
            None => {
                debug!(%span, tree = ?tree.id(), "anchor has no matching node, clearing");
                self.anchor = None;
                None
            }
        }
    }

    /// The cached node, without searching. `None` unless the anchor is
    /// live against `tree`.
    pub fn peek<'t>(&self, tree: &'t SyntaxTree) -> Option<Node<'t>> {
        let resolution = self.anchor.as_ref()?.resolved.as_ref()?;
        if resolution.tree != tree.id() {
            return None;
        }
        follow_path(tree.root_node(), &resolution.path)
    }
}
