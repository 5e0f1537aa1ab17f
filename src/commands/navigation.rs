//! `j` `k` `h` `l` `g`: moving the focus.

use crate::commands::engine::{Candidates, Engine};
use crate::commands::CommandError;
use crate::config::JumpConfig;
use crate::host::{Host, InputEvent};
use crate::navigator::{vertical_step, Direction};
use crate::span::NodeRef;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::debug;

impl<H: Host> Engine<H> {
    pub(super) fn move_vertical(&mut self, direction: Direction) {
        let policy = self.config.navigation.vertical;
        let target = self
            .buffer
            .current_node()
            .and_then(|node| vertical_step(direction, node, policy))
            .map(NodeRef::of);

        match target {
            Some(target) => {
                self.focus(target);
            }
            None => debug!(?direction, "no vertical target"),
        }
    }

    pub(super) async fn jump_to_parent(
        &mut self,
        events: &mut UnboundedReceiver<InputEvent>,
        cancel: &CancellationToken,
    ) -> Result<(), CommandError> {
        if let Some(target) = self.pick(Candidates::Ancestors, events, cancel).await? {
            self.focus(target);
        }
        Ok(())
    }

    /// Read a jump-kind key and hint-select among its nodes.
    pub(super) async fn jump(
        &mut self,
        inside: bool,
        events: &mut UnboundedReceiver<InputEvent>,
        cancel: &CancellationToken,
    ) -> Result<(), CommandError> {
        let Some(candidates) = self.read_jump_kind(inside, events, cancel).await else {
            return Ok(());
        };
        if let Some(target) = self.pick(candidates, events, cancel).await? {
            self.focus(target);
        }
        Ok(())
    }

    pub(super) async fn read_jump_kind(
        &mut self,
        inside: bool,
        events: &mut UnboundedReceiver<InputEvent>,
        cancel: &CancellationToken,
    ) -> Option<Candidates> {
        let key = self.read_key(events, cancel).await?;
        let source = self.config.jump_for(key).and_then(JumpConfig::source);
        if source.is_none() {
            debug!(%key, "no jump kind bound");
        }
        source.map(|source| Candidates::Matching { source, inside })
    }
}
