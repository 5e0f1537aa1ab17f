//! `J` `K` `r` `w` `W` `d` `c` `a` `A`: structural edits.
//!
//! Each operation builds one batch of replacements from the current tree,
//! applies it through [`Engine::edit`], then fixes up the focus.

use crate::commands::engine::Engine;
use crate::commands::wrap::{line_indent, render, trimmed_span, UnwrapStrategy};
use crate::commands::{CommandError, Placement};
use crate::edit::Replacement;
use crate::host::{Host, InputEvent};
use crate::navigator::{next_sibling, vertical_step, Direction};
use crate::span::{ByteSpan, NodeRef};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Span to delete when removing `span` from `text`.
///
/// A side of the line left holding only whitespace goes too: blank before
/// the node extends the start to the line start, blank after extends the
/// end past the line break.
pub fn removal_span(text: &str, span: ByteSpan) -> ByteSpan {
    let line_start = text[..span.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[span.end..]
        .find('\n')
        .map_or(text.len(), |i| span.end + i);

    let start = if text[line_start..span.start].trim().is_empty() {
        line_start
    } else {
        span.start
    };
    let end = if text[span.end..line_end].trim().is_empty() {
        (line_end + 1).min(text.len())
    } else {
        span.end
    };

    ByteSpan::new(start, end)
}

/// Where the moved node lands after swapping `current` with `sibling`.
fn swapped_span(current: ByteSpan, sibling: ByteSpan, direction: Direction) -> ByteSpan {
    let start = match direction {
        Direction::Forward => sibling.start + sibling.len() - current.len(),
        Direction::Backward => sibling.start,
    };
    ByteSpan::new(start, start + current.len())
}

impl<H: Host> Engine<H> {
    pub(super) async fn swap(&mut self, direction: Direction) -> Result<(), CommandError> {
        let Some(node) = self.buffer.current_node() else {
            return Ok(());
        };
        let Some(sibling) = next_sibling(direction, node) else {
            debug!(?direction, "no sibling to swap with");
            return Ok(());
        };

        let current = NodeRef::of(node);
        let other = ByteSpan::of(sibling);
        let batch = [
            Replacement::replace(current.span, self.buffer.node_text(sibling)),
            Replacement::replace(other, self.buffer.node_text(node)),
        ];

        self.edit(&batch).await?;
        self.focus(NodeRef {
            span: swapped_span(current.span, other, direction),
            kind_id: current.kind_id,
        });
        Ok(())
    }

    /// Replace the current node with the text of a hint-selected node.
    pub(super) async fn replace_with_selection(
        &mut self,
        events: &mut UnboundedReceiver<InputEvent>,
        cancel: &CancellationToken,
    ) -> Result<(), CommandError> {
        if self.buffer.current_node().is_none() {
            return Ok(());
        }
        let Some(candidates) = self.read_jump_kind(false, events, cancel).await else {
            return Ok(());
        };
        let Some(picked) = self.pick(candidates, events, cancel).await? else {
            return Ok(());
        };
        // Host edits may have landed while waiting for keys.
        let Some(current) = self.buffer.current_node().map(NodeRef::of) else {
            return Ok(());
        };
        if picked.span == current.span {
            return Ok(());
        }

        let text = self.buffer.text()[picked.span.range()].to_string();
        let len = text.len();
        self.edit(&[Replacement::replace(current.span, text)]).await?;
        self.focus(NodeRef {
            span: ByteSpan::new(current.span.start, current.span.start + len),
            kind_id: picked.kind_id,
        });
        Ok(())
    }

    pub(super) async fn wrap(&mut self, key: char) -> Result<(), CommandError> {
        let Some(node) = self.buffer.current_node() else {
            return Ok(());
        };
        let Some(template) = self.config.wrap_for(key) else {
            debug!(%key, "no wrap template bound");
            return Ok(());
        };

        let span = ByteSpan::of(node);
        let indent = line_indent(self.buffer.line(node.start_position().row));
        let wrapped = render(
            template,
            self.buffer.node_text(node),
            indent,
            &self.config.editing.indent,
        );

        self.insert_snippet(span, wrapped).await
    }

    pub(super) async fn unwrap(&mut self) -> Result<(), CommandError> {
        let Some(node) = self.buffer.current_node() else {
            return Ok(());
        };
        let Some(parent) = node.parent() else {
            return Ok(());
        };

        let strategy = UnwrapStrategy::for_kind(parent.kind());
        let batch = strategy.replacements(parent, node, self.buffer.text());
        let fallback = NodeRef {
            span: ByteSpan::new(
                parent.start_byte(),
                parent.start_byte() + node.byte_range().len(),
            ),
            kind_id: node.kind_id(),
        };
        debug!(?strategy, parent = parent.kind(), "unwrapping");

        self.edit(&batch).await?;
        // Removing tags or braces leaves the anchor intact; replacing the
        // parent outright does not.
        if !self.reveal_current() {
            self.focus(fallback);
        }
        Ok(())
    }

    /// Delete the current node and move the focus to the next node
    /// vertically (or the previous one, at the end). Returns false when
    /// there was nothing to delete.
    pub(super) async fn delete(&mut self) -> Result<bool, CommandError> {
        let policy = self.config.navigation.vertical;
        let Some(node) = self.buffer.current_node() else {
            return Ok(false);
        };

        let current = NodeRef::of(node);
        let removal = removal_span(self.buffer.text(), current.span);
        let next = vertical_step(Direction::Forward, node, policy)
            .or_else(|| vertical_step(Direction::Backward, node, policy))
            .map(NodeRef::of);

        // The anchor moves first so the batch shifts it with everything else.
        self.buffer.focus(next);
        if let Err(error) = self.edit(&[Replacement::delete(removal)]).await {
            self.buffer.focus(Some(current));
            return Err(error);
        }
        self.reveal_current();
        Ok(true)
    }

    /// Insert an empty template on its own line before or after the
    /// current node.
    pub(super) async fn create(&mut self, placement: Placement, key: char) -> Result<(), CommandError> {
        let Some(node) = self.buffer.current_node() else {
            return Ok(());
        };
        let Some(template) = self.config.wrap_for(key) else {
            debug!(%key, "no wrap template bound");
            return Ok(());
        };

        let indent = line_indent(self.buffer.line(node.start_position().row));
        let snippet = render(template, "", indent, &self.config.editing.indent);
        let (at, text) = match placement {
            Placement::After => (node.end_byte(), format!("\n{indent}{snippet}")),
            Placement::Before => (node.start_byte(), format!("{snippet}\n{indent}")),
        };

        self.insert_snippet(ByteSpan::new(at, at), text).await
    }

    /// Replace `span` with `snippet` and focus whatever node the snippet
    /// became, ignoring surrounding whitespace.
    async fn insert_snippet(&mut self, span: ByteSpan, snippet: String) -> Result<(), CommandError> {
        let target = trimmed_span(span.start, &snippet);
        self.edit(&[Replacement::replace(span, snippet)]).await?;

        if self.buffer.retarget(target) {
            self.reveal_current();
        } else {
            debug!(%target, "inserted text is not a single node");
        }
        Ok(())
    }
}
