//! Byte-offset spans and owned node references.
//!
//! Nodes borrow the tree they came from, so anything that has to outlive a
//! tree swap (the anchor, a picked hint target, a pending focus change) is
//! carried as a [`NodeRef`] and looked up again against the current tree.

use serde::Serialize;
use std::fmt;
use std::ops::Range;
use tree_sitter::Node;

/// Half-open byte range `[start, end)` into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted span {start}..{end}");
        Self { start, end }
    }

    /// Span covered by a syntax node.
    pub fn of(node: Node<'_>) -> Self {
        Self::new(node.start_byte(), node.end_byte())
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` lies entirely within this span.
    pub fn contains(&self, other: ByteSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for ByteSpan {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for ByteSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Tree-independent handle to a node: its span plus its grammar kind id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub span: ByteSpan,
    pub kind_id: u16,
}

impl NodeRef {
    pub fn of(node: Node<'_>) -> Self {
        Self {
            span: ByteSpan::of(node),
            kind_id: node.kind_id(),
        }
    }
}
