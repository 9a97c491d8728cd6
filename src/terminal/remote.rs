//! Applying sync traffic from peer instances
//!
//! Messages are applied in transport order. While one is being applied the
//! `applying_remote` guard is set so nothing is echoed back to peers.

use crate::editor::CommandHistory;
use crate::sync::{SnapshotPayload, SyncEvent, SyncMessage};

use super::Terminal;

impl Terminal {
    /// Drain and apply every pending sync message; returns how many applied
    pub fn pump_sync(&mut self) -> usize {
        let Some(transport) = self.transport.as_ref() else {
            return 0;
        };
        let raw = transport.drain();

        let mut applied = 0;
        for json in raw {
            let message = match SyncMessage::from_json(&json) {
                Ok(message) => message,
                Err(err) => {
                    tracing::warn!(%err, "dropping malformed sync message");
                    continue;
                }
            };
            if message.instance_id == self.instance_id {
                continue;
            }
            self.apply_remote(message);
            applied += 1;
        }
        applied
    }

    /// Current state as a snapshot payload
    ///
    /// Entries still being revealed are sent in full.
    pub fn snapshot(&self) -> SnapshotPayload {
        let entries = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| match self.animator.full_output(i) {
                Some(full) => {
                    let mut entry = entry.clone();
                    entry.output = full.clone();
                    entry
                }
                None => entry.clone(),
            })
            .collect();
        let input = self.editor.state();
        SnapshotPayload {
            input: input.buffer.clone(),
            caret: input.caret,
            entries,
            command_history: self.editor.history().entries().to_vec(),
            quest: self.quest.state().clone(),
        }
    }

    fn apply_remote(&mut self, message: SyncMessage) {
        tracing::debug!(from = %message.instance_id, kind = ?message.kind(), "applying sync message");
        if let SyncEvent::Hello = message.event {
            // Answering is not an echo, so it goes out before the guard is set
            let snapshot = SyncMessage::snapshot(self.instance_id.clone(), self.snapshot());
            self.broadcast(snapshot);
            return;
        }

        self.applying_remote = true;
        match message.event {
            SyncEvent::Hello => {}
            SyncEvent::Snapshot(payload) => {
                self.animator.discard_all();
                self.entries = payload.entries;
                self.editor
                    .set_history(CommandHistory::from(payload.command_history));
                self.editor.set_input(&payload.input, payload.caret);
                self.completion.reset();
                self.quest.replace_state(payload.quest);
            }
            SyncEvent::Input(payload) => {
                self.editor.set_input(&payload.buffer, payload.caret);
                self.completion.reset();
            }
            SyncEvent::Exec(payload) => {
                self.entries.push(payload.entry);
                self.editor.history_mut().push(&payload.command);
                self.editor.reset();
                self.completion.reset();
                self.quest.replace_state(payload.quest);
            }
            SyncEvent::Clear => {
                self.animator.discard_all();
                self.entries.clear();
            }
        }
        self.applying_remote = false;
    }
}
