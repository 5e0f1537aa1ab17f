use crate::buffer::Buffer;
use crate::commands::{Command, CommandError};
use crate::config::Config;
use crate::edit::{apply_replacements, Replacement};
use crate::hints::targets::label_targets;
use crate::hints::{collect_targets, select_target, Alphabet, HintTarget, Selection, TargetSource};
use crate::host::{ExitMode, Host, InputEvent};
use crate::navigator::parent_chain;
use crate::span::{ByteSpan, NodeRef};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use tree_sitter::Node;

/// Why [`Engine::run_mode`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeExit {
    Exited(ExitMode),
    Cancelled,
}

pub(super) enum Flow {
    Continue,
    Exit(ExitMode),
}

/// Which nodes a hint session offers.
pub(super) enum Candidates {
    /// Enclosing nodes of the current one, nearest first
    Ancestors,
    /// Nodes from a jump kind, optionally restricted to the current node
    Matching { source: TargetSource, inside: bool },
}

/// Runs commands against one buffer, mirroring every edit to the host.
pub struct Engine<H: Host> {
    pub(super) buffer: Buffer,
    pub(super) host: H,
    pub(super) config: Config,
    pub(super) alphabet: Alphabet,
}

impl<H: Host> Engine<H> {
    pub fn new(buffer: Buffer, host: H, config: Config) -> Result<Self, CommandError> {
        let alphabet = Alphabet::new(&config.hints.alphabet)?;
        Ok(Self {
            buffer,
            host,
            config,
            alphabet,
        })
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Span of the current node, resolving the anchor if needed.
    pub fn current_span(&mut self) -> Option<ByteSpan> {
        self.buffer.refresh_anchor();
        self.buffer.current_node().map(ByteSpan::of)
    }

    /// Focus the outermost named node starting at `byte`.
    pub fn focus_at(&mut self, byte: usize) -> bool {
        let target = self.buffer.outermost_node_at(byte).map(NodeRef::of);
        match target {
            Some(target) => self.focus(target),
            None => false,
        }
    }

    /// Handle input until the mode is exited or `cancel` fires.
    ///
    /// Keys are handled one at a time, each to completion. Edits arriving
    /// from the host between keys are applied to the buffer.
    pub async fn run_mode(
        &mut self,
        events: &mut UnboundedReceiver<InputEvent>,
        cancel: &CancellationToken,
    ) -> ModeExit {
        debug!("mode started");
        loop {
            let Some(key) = self.read_key(events, cancel).await else {
                debug!("mode cancelled");
                return ModeExit::Cancelled;
            };

            match self.handle_key(key, events, cancel).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit(mode)) => {
                    debug!(?mode, "mode exited");
                    return ModeExit::Exited(mode);
                }
                Err(error) => warn!(%key, %error, "command failed"),
            }
        }
    }

    /// Feed `keys` through [`run_mode`](Self::run_mode). Running out of keys
    /// ends the mode like a cancellation.
    pub async fn replay(&mut self, keys: &str) -> ModeExit {
        let (tx, mut rx) = unbounded_channel();
        for key in keys.chars() {
            // The receiver is alive in this scope.
            let _ = tx.send(InputEvent::Key(key));
        }
        drop(tx);
        self.run_mode(&mut rx, &CancellationToken::new()).await
    }

    /// Next typed character. Edits arriving first are applied and skipped.
    pub(super) async fn read_key(
        &mut self,
        events: &mut UnboundedReceiver<InputEvent>,
        cancel: &CancellationToken,
    ) -> Option<char> {
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                event = events.recv() => event?,
            };
            match event {
                InputEvent::Key(key) => return Some(key),
                InputEvent::Edits(edits) => self.apply_external(edits),
            }
        }
    }

    async fn handle_key(
        &mut self,
        key: char,
        events: &mut UnboundedReceiver<InputEvent>,
        cancel: &CancellationToken,
    ) -> Result<Flow, CommandError> {
        let Some(command) = Command::from_key(key) else {
            trace!(%key, "unbound key");
            return Ok(Flow::Continue);
        };
        debug!(%key, ?command, "dispatching");
        self.buffer.refresh_anchor();

        match command {
            Command::Vertical(direction) => self.move_vertical(direction),
            Command::Parent => self.jump_to_parent(events, cancel).await?,
            Command::Jump { inside } => self.jump(inside, events, cancel).await?,
            Command::Swap(direction) => self.swap(direction).await?,
            Command::Replace => self.replace_with_selection(events, cancel).await?,
            Command::Wrap => {
                if let Some(key) = self.read_key(events, cancel).await {
                    self.wrap(key).await?;
                }
            }
            Command::Unwrap => self.unwrap().await?,
            Command::Delete { then_insert } => {
                if self.delete().await? && then_insert {
                    return Ok(self.exit(ExitMode::Insert));
                }
            }
            Command::Create(placement) => {
                if let Some(key) = self.read_key(events, cancel).await {
                    self.create(placement, key).await?;
                }
            }
            Command::Exit(mode) => return Ok(self.exit(mode)),
        }

        Ok(Flow::Continue)
    }

    fn exit(&mut self, mode: ExitMode) -> Flow {
        self.host.exit_mode(mode);
        Flow::Exit(mode)
    }

    /// Anchor `target` and show it in the host.
    pub(super) fn focus(&mut self, target: NodeRef) -> bool {
        if !self.buffer.focus(Some(target)) {
            debug!(span = %target.span, "focus target not found");
            return false;
        }
        self.reveal_current()
    }

    /// Resolve the anchor and, if it still names a node, select it in the host.
    pub(super) fn reveal_current(&mut self) -> bool {
        self.buffer.refresh_anchor();
        match self.buffer.current_node() {
            Some(node) => {
                self.host.reveal_and_select(node);
                true
            }
            None => false,
        }
    }

    /// Apply a batch through the host, then mirror it into the buffer.
    ///
    /// A batch that does not apply to the buffer's text never reaches the
    /// host.
    pub(super) async fn edit(&mut self, replacements: &[Replacement]) -> Result<(), CommandError> {
        apply_replacements(self.buffer.text(), replacements)?;
        self.host.apply_text_edits(replacements).await?;
        self.buffer.apply(replacements).map_err(|error| {
            warn!(%error, "host accepted edits the buffer could not mirror");
            error
        })?;
        Ok(())
    }

    /// Edits the host made on its own; the host already has them. The
    /// anchor is resolved against the new tree before returning.
    pub fn apply_external(&mut self, replacements: Vec<Replacement>) {
        if let Err(error) = self.buffer.apply(&replacements) {
            warn!(%error, "could not mirror host edits");
        }
        self.buffer.refresh_anchor();
    }

    /// Run a hint session and return the picked node.
    ///
    /// Returns `None` on no match or cancellation. If the document changed
    /// mid-session the edits are applied and nothing is picked.
    pub(super) async fn pick(
        &mut self,
        candidates: Candidates,
        events: &mut UnboundedReceiver<InputEvent>,
        cancel: &CancellationToken,
    ) -> Result<Option<NodeRef>, CommandError> {
        let selection = {
            let Engine {
                buffer,
                host,
                alphabet,
                ..
            } = self;
            let current = buffer.current_node();

            let targets: Vec<HintTarget<'_>> = match candidates {
                Candidates::Ancestors => {
                    let Some(current) = current else {
                        return Ok(None);
                    };
                    let chain: Vec<Node<'_>> = parent_chain(current)
                        .filter(|n| host.is_range_visible(n.start_position(), n.end_position()))
                        .take(alphabet.capacity())
                        .collect();
                    label_targets(chain, alphabet)?
                }
                Candidates::Matching { source, inside } => {
                    let scope = match (inside, current) {
                        (true, None) => return Ok(None),
                        (true, Some(node)) => Some(node),
                        (false, _) => None,
                    };
                    collect_targets(
                        &*host,
                        buffer.tree(),
                        buffer.text(),
                        buffer.language(),
                        &source,
                        scope,
                        alphabet,
                    )?
                }
            };

            let session = cancel.child_token();
            match select_target(host, &targets, events, &session).await {
                Selection::Selected(index) => Ok(NodeRef::of(targets[index].node)),
                other => Err(other),
            }
        };

        match selection {
            Ok(picked) => Ok(Some(picked)),
            Err(Selection::Interrupted(edits)) => {
                self.apply_external(edits);
                Ok(None)
            }
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditError;
    use crate::host::RecordingHost;
    use crate::ts::SupportLang;

    const SOURCE: &str = "const a = 1;\n";

    fn engine() -> Engine<RecordingHost> {
        let buffer = Buffer::new(SupportLang::JavaScript, SOURCE).unwrap();
        Engine::new(buffer, RecordingHost::new(SOURCE), Config::default()).unwrap()
    }

    #[tokio::test]
    async fn malformed_batch_stops_before_host() {
        let mut engine = engine();

        let overlapping = [Replacement::new(0, 5, "let"), Replacement::new(3, 7, "x")];
        let result = engine.edit(&overlapping).await;
        // Caught by the engine, not reported back by the host
        assert!(matches!(
            result,
            Err(CommandError::Edit(EditError::Overlap { .. }))
        ));

        let past_end = [Replacement::insert(SOURCE.len() + 1, "x")];
        let result = engine.edit(&past_end).await;
        assert!(matches!(
            result,
            Err(CommandError::Edit(EditError::InvalidByteRange { .. }))
        ));

        assert_eq!(engine.host().text(), SOURCE);
        assert_eq!(engine.buffer().text(), SOURCE);
    }

    #[tokio::test]
    async fn accepted_batch_reaches_both_copies() {
        let mut engine = engine();

        engine.edit(&[Replacement::new(6, 7, "b")]).await.unwrap();
        assert_eq!(engine.host().text(), "const b = 1;\n");
        assert_eq!(engine.buffer().text(), engine.host().text());
    }
}
