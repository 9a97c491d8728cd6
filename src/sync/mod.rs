//! Cross-tab sync messages
//!
//! Terminal instances sharing a channel mirror each other's input, executions
//! and clears. Every message on the wire is a JSON object:
//!
//! ```json
//! { "type": "state:input", "instanceId": "<uuid>", "payload": { ... } }
//! ```
//!
//! [`WireMessage`] is that raw shape; [`SyncMessage`] is the typed view the
//! terminal works with. Payloads are decoded according to `type`, so an
//! unknown type or a payload of the wrong shape is rejected as a whole.

pub mod hub;

pub use hub::{HubPort, LocalBroadcastHub};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::output::CommandEntry;
use crate::quest::QuestState;

/// Message type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncKind {
    #[serde(rename = "hello")]
    Hello,
    #[serde(rename = "state:snapshot")]
    Snapshot,
    #[serde(rename = "state:input")]
    Input,
    #[serde(rename = "state:exec")]
    Exec,
    #[serde(rename = "state:clear")]
    Clear,
}

/// Raw wire message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(rename = "type")]
    pub kind: SyncKind,
    #[serde(rename = "instanceId")]
    pub instance_id: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Full state sent in answer to `hello`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    pub input: String,
    pub caret: usize,
    pub entries: Vec<CommandEntry>,
    pub command_history: Vec<String>,
    pub quest: QuestState,
}

/// Live buffer contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPayload {
    pub buffer: String,
    pub caret: usize,
}

/// A finished command: its scrollback entry plus the quest state after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecPayload {
    pub entry: CommandEntry,
    /// Raw submitted line, appended to the receiver's history
    pub command: String,
    pub quest: QuestState,
}

/// Typed sync event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A new instance mounted and wants a snapshot
    Hello,
    Snapshot(SnapshotPayload),
    Input(InputPayload),
    Exec(ExecPayload),
    /// Scrollback was cleared
    Clear,
}

impl SyncEvent {
    pub fn kind(&self) -> SyncKind {
        match self {
            SyncEvent::Hello => SyncKind::Hello,
            SyncEvent::Snapshot(_) => SyncKind::Snapshot,
            SyncEvent::Input(_) => SyncKind::Input,
            SyncEvent::Exec(_) => SyncKind::Exec,
            SyncEvent::Clear => SyncKind::Clear,
        }
    }
}

/// A sync event stamped with the sender's instance id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncMessage {
    pub instance_id: String,
    pub event: SyncEvent,
}

impl SyncMessage {
    pub fn new(instance_id: impl Into<String>, event: SyncEvent) -> Self {
        Self {
            instance_id: instance_id.into(),
            event,
        }
    }

    pub fn hello(instance_id: impl Into<String>) -> Self {
        Self::new(instance_id, SyncEvent::Hello)
    }

    pub fn clear(instance_id: impl Into<String>) -> Self {
        Self::new(instance_id, SyncEvent::Clear)
    }

    pub fn input(instance_id: impl Into<String>, buffer: impl Into<String>, caret: usize) -> Self {
        Self::new(
            instance_id,
            SyncEvent::Input(InputPayload {
                buffer: buffer.into(),
                caret,
            }),
        )
    }

    pub fn exec(
        instance_id: impl Into<String>,
        entry: CommandEntry,
        command: impl Into<String>,
        quest: QuestState,
    ) -> Self {
        Self::new(
            instance_id,
            SyncEvent::Exec(ExecPayload {
                entry,
                command: command.into(),
                quest,
            }),
        )
    }

    pub fn snapshot(instance_id: impl Into<String>, payload: SnapshotPayload) -> Self {
        Self::new(instance_id, SyncEvent::Snapshot(payload))
    }

    pub fn kind(&self) -> SyncKind {
        self.event.kind()
    }

    /// Convert to the raw wire shape
    pub fn to_wire(&self) -> Result<WireMessage> {
        let payload = match &self.event {
            SyncEvent::Hello | SyncEvent::Clear => serde_json::Value::Null,
            SyncEvent::Snapshot(p) => serde_json::to_value(p)?,
            SyncEvent::Input(p) => serde_json::to_value(p)?,
            SyncEvent::Exec(p) => serde_json::to_value(p)?,
        };
        Ok(WireMessage {
            kind: self.kind(),
            instance_id: self.instance_id.clone(),
            payload,
        })
    }

    /// Decode a raw wire message, checking the payload against its type
    pub fn from_wire(wire: WireMessage) -> Result<Self> {
        if wire.instance_id.is_empty() {
            return Err(FolioError::InvalidMessage(
                "missing instanceId".to_string(),
            ));
        }
        let event = match wire.kind {
            SyncKind::Hello => SyncEvent::Hello,
            SyncKind::Clear => SyncEvent::Clear,
            SyncKind::Snapshot => SyncEvent::Snapshot(payload_of(wire.kind, wire.payload)?),
            SyncKind::Input => SyncEvent::Input(payload_of(wire.kind, wire.payload)?),
            SyncKind::Exec => SyncEvent::Exec(payload_of(wire.kind, wire.payload)?),
        };
        Ok(Self {
            instance_id: wire.instance_id,
            event,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_wire()?)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let wire: WireMessage = serde_json::from_str(json)
            .map_err(|e| FolioError::InvalidMessage(e.to_string()))?;
        Self::from_wire(wire)
    }
}

fn payload_of<T: serde::de::DeserializeOwned>(
    kind: SyncKind,
    payload: serde_json::Value,
) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| FolioError::InvalidMessage(format!("bad {kind:?} payload: {e}")))
}

/// Transport carrying serialized sync messages between instances
///
/// `post` delivers to every other participant on the channel; the sender
/// never receives its own messages back from a well-behaved transport, but
/// receivers still filter by instance id.
pub trait SyncTransport: Send {
    /// Broadcast one serialized message
    fn post(&self, message: &str) -> Result<()>;

    /// Take every message received since the last drain, oldest first
    fn drain(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Output;

    #[test]
    fn test_hello_serialization() {
        let json = SyncMessage::hello("a-1").to_json().unwrap();
        assert!(json.contains(r#""type":"hello""#));
        assert!(json.contains(r#""instanceId":"a-1""#));

        let back = SyncMessage::from_json(&json).unwrap();
        assert_eq!(back, SyncMessage::hello("a-1"));
    }

    #[test]
    fn test_input_serialization() {
        let msg = SyncMessage::input("a-1", "hel", 3);
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"state:input""#));
        assert!(json.contains(r#""payload":{"buffer":"hel","caret":3}"#));
        assert_eq!(SyncMessage::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn test_snapshot_uses_camel_case() {
        let msg = SyncMessage::snapshot(
            "b-2",
            SnapshotPayload {
                input: String::new(),
                caret: 0,
                entries: vec![CommandEntry::new("help", Output::plain("..."), 7)],
                command_history: vec!["help".to_string()],
                quest: QuestState::default(),
            },
        );
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"state:snapshot""#));
        assert!(json.contains(r#""commandHistory":["help"]"#));
        assert_eq!(SyncMessage::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn test_exec_serialization() {
        let entry = CommandEntry::new("joke", Output::plain("ha"), 1);
        let msg = SyncMessage::exec("c-3", entry, "joke", QuestState::default());
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"state:exec""#));
        assert!(json.contains(r#""command":"joke""#));
        assert_eq!(SyncMessage::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn test_clear_accepts_missing_payload() {
        let msg = SyncMessage::from_json(r#"{"type":"state:clear","instanceId":"x"}"#).unwrap();
        assert_eq!(msg.event, SyncEvent::Clear);
    }

    #[test]
    fn test_rejects_malformed_messages() {
        for bad in [
            "not json",
            r#"{"type":"state:resize","instanceId":"x"}"#,
            r#"{"type":"hello","instanceId":""}"#,
            r#"{"type":"state:input","instanceId":"x","payload":{"buffer":1}}"#,
            r#"{"type":"state:exec","instanceId":"x"}"#,
        ] {
            assert!(
                matches!(SyncMessage::from_json(bad), Err(FolioError::InvalidMessage(_))),
                "accepted {bad}"
            );
        }
    }
}
