//! Keystroke-by-keystroke disambiguation.
//!
//! [`HintSession`] is the pure state machine; [`select_target`] drives it
//! from an input channel, racing each wait against cancellation.

use crate::edit::Replacement;
use crate::hints::targets::HintTarget;
use crate::host::{Host, InputEvent};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Outcome of feeding one character to a [`HintSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintStep {
    /// More input needed; indices of the targets still matching.
    Pending { live: Vec<usize> },
    /// Exactly one target's label was typed in full.
    Resolved(usize),
    /// Nothing matches what was typed.
    Failed,
}

/// Narrows a labeled target list as characters are typed.
#[derive(Debug, Clone)]
pub struct HintSession {
    labels: Vec<String>,
    typed: String,
}

impl HintSession {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            typed: String::new(),
        }
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    /// Indices of targets whose label starts with the input so far.
    pub fn live(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.starts_with(self.typed.as_str()))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn feed(&mut self, c: char) -> HintStep {
        self.typed.push(c);
        let live = self.live();

        match live.as_slice() {
            [] => HintStep::Failed,
            [only] if self.labels[*only] == self.typed => HintStep::Resolved(*only),
            _ => HintStep::Pending { live },
        }
    }
}

/// How a hint selection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Index into the target list
    Selected(usize),
    NoMatch,
    Cancelled,
    /// An edit batch arrived mid-session; it has not been applied yet.
    Interrupted(Vec<Replacement>),
}

/// Hides hints when dropped, so every way out of a session clears them
/// exactly once.
struct HintDisplay<'h, H: Host + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: Host + ?Sized> HintDisplay<'h, H> {
    fn show(host: &'h mut H, targets: &[HintTarget<'_>]) -> Self {
        host.show_hints(targets);
        Self { host }
    }

    fn narrow(&mut self, targets: &[HintTarget<'_>], live: &[usize]) {
        let remaining: Vec<HintTarget<'_>> =
            live.iter().map(|&index| targets[index].clone()).collect();
        self.host.show_hints(&remaining);
    }
}

impl<H: Host + ?Sized> Drop for HintDisplay<'_, H> {
    fn drop(&mut self) {
        self.host.clear_hints();
    }
}

/// Show `targets`, read characters until one is selected or none can be,
/// and clear the hints.
///
/// Each wait for input races `cancel`; cancellation wins ties. A closed
/// channel counts as cancellation, and an edit batch ends the session with
/// [`Selection::Interrupted`] because the targets no longer describe the
/// document.
pub async fn select_target<H: Host + ?Sized>(
    host: &mut H,
    targets: &[HintTarget<'_>],
    events: &mut UnboundedReceiver<InputEvent>,
    cancel: &CancellationToken,
) -> Selection {
    if targets.is_empty() {
        debug!("no hint targets");
        return Selection::NoMatch;
    }

    let mut display = HintDisplay::show(host, targets);
    let mut session = HintSession::new(targets.iter().map(|t| t.label.as_str()));
    debug!(count = targets.len(), "hint session started");

    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(typed = session.typed(), "hint session cancelled");
                return Selection::Cancelled;
            }
            event = events.recv() => event,
        };

        let c = match event {
            Some(InputEvent::Key(c)) => c,
            Some(InputEvent::Edits(edits)) => {
                debug!(edits = edits.len(), "document edited during hint session");
                return Selection::Interrupted(edits);
            }
            None => {
                debug!("input closed during hint session");
                return Selection::Cancelled;
            }
        };

        match session.feed(c) {
            HintStep::Resolved(index) => {
                debug!(label = %targets[index].label, "hint selected");
                return Selection::Selected(index);
            }
            HintStep::Failed => {
                debug!(typed = session.typed(), "no hint matches");
                return Selection::NoMatch;
            }
            HintStep::Pending { live } => display.narrow(targets, &live),
        }
    }
}
