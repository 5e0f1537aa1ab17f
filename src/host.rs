//! The editor the engine drives.
//!
//! The engine never owns the real document. It asks the [`Host`] to apply
//! edits, show hints and move the selection, and mirrors every accepted
//! edit into its own [`Buffer`](crate::buffer::Buffer).

use crate::edit::{apply_replacements, EditError, Replacement};
use crate::hints::HintTarget;
use crate::span::ByteSpan;
use std::future::Future;
use std::ops::Range;
use thiserror::Error;
use tree_sitter::{Node, Point};

/// Something arriving from the host while the engine is waiting for input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A typed character
    Key(char),
    /// Edits made outside the engine, expressed against the document
    /// before them
    Edits(Vec<Replacement>),
}

/// Mode to hand control back to when the engine stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitMode {
    Insert,
    Normal,
}

#[derive(Error, Debug)]
pub enum HostError {
    #[error("host rejected the edit: {reason}")]
    Rejected { reason: String },

    #[error(transparent)]
    Edit(#[from] EditError),
}

pub trait Host {
    /// Position of the host's cursor, if it has one.
    fn cursor(&self) -> Option<Point>;

    fn is_range_visible(&self, start: Point, end: Point) -> bool;

    /// Apply one batch of replacements, all expressed against the current
    /// document. Resolves once the host's document reflects the batch.
    fn apply_text_edits(
        &mut self,
        edits: &[Replacement],
    ) -> impl Future<Output = Result<(), HostError>> + Send;

    fn show_hints(&mut self, targets: &[HintTarget<'_>]);

    fn clear_hints(&mut self);

    fn reveal_and_select(&mut self, node: Node<'_>);

    fn exit_mode(&mut self, _mode: ExitMode) {}
}

/// A hint as it was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownHint {
    pub label: String,
    pub span: ByteSpan,
}

/// In-memory host that keeps its own copy of the text and records every
/// call. Used by the CLI and in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    text: String,
    cursor: Option<Point>,
    visible_rows: Option<Range<usize>>,
    reject_edits: bool,
    hints: Vec<Vec<ShownHint>>,
    clears: usize,
    selections: Vec<ByteSpan>,
    exits: Vec<ExitMode>,
}

impl RecordingHost {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_cursor(mut self, cursor: Point) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Only rows in `rows` count as visible. Everything is visible by default.
    pub fn with_visible_rows(mut self, rows: Range<usize>) -> Self {
        self.visible_rows = Some(rows);
        self
    }

    pub fn rejecting_edits(mut self) -> Self {
        self.reject_edits = true;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Every hint set shown, oldest first.
    pub fn hint_history(&self) -> &[Vec<ShownHint>] {
        &self.hints
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn selections(&self) -> &[ByteSpan] {
        &self.selections
    }

    pub fn exits(&self) -> &[ExitMode] {
        &self.exits
    }
}

impl Host for RecordingHost {
    fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    fn is_range_visible(&self, start: Point, end: Point) -> bool {
        match &self.visible_rows {
            Some(rows) => start.row < rows.end && end.row >= rows.start,
            None => true,
        }
    }

    async fn apply_text_edits(&mut self, edits: &[Replacement]) -> Result<(), HostError> {
        if self.reject_edits {
            return Err(HostError::Rejected {
                reason: "read-only".to_string(),
            });
        }
        self.text = apply_replacements(&self.text, edits)?.text;
        Ok(())
    }

    fn show_hints(&mut self, targets: &[HintTarget<'_>]) {
        self.hints.push(
            targets
                .iter()
                .map(|target| ShownHint {
                    label: target.label.clone(),
                    span: target.span(),
                })
                .collect(),
        );
    }

    fn clear_hints(&mut self) {
        self.clears += 1;
    }

    fn reveal_and_select(&mut self, node: Node<'_>) {
        self.cursor = Some(node.start_position());
        self.selections.push(ByteSpan::of(node));
    }

    fn exit_mode(&mut self, mode: ExitMode) {
        self.exits.push(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mirrors_accepted_edits() {
        let mut host = RecordingHost::new("let a = 1;");
        host.apply_text_edits(&[Replacement::new(4, 5, "value")])
            .await
            .unwrap();
        assert_eq!(host.text(), "let value = 1;");
    }

    #[tokio::test]
    async fn rejecting_host_keeps_text() {
        let mut host = RecordingHost::new("let a = 1;").rejecting_edits();
        let result = host
            .apply_text_edits(&[Replacement::new(4, 5, "b")])
            .await;
        assert!(matches!(result, Err(HostError::Rejected { .. })));
        assert_eq!(host.text(), "let a = 1;");
    }

    #[test]
    fn visibility_is_by_row_overlap() {
        let host = RecordingHost::new("").with_visible_rows(3..6);
        let at = |row| Point { row, column: 0 };

        assert!(host.is_range_visible(at(4), at(4)));
        assert!(host.is_range_visible(at(0), at(3)));
        assert!(host.is_range_visible(at(5), at(9)));
        assert!(!host.is_range_visible(at(0), at(2)));
        assert!(!host.is_range_visible(at(6), at(8)));
    }
}
