//! In-process broadcast channels
//!
//! A [`LocalBroadcastHub`] hands out [`HubPort`]s on named channels. A message
//! posted on a port is queued in the inbox of every other open port on the
//! same channel; nothing is delivered until the owner drains its port.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::SyncTransport;
use crate::error::{FolioError, Result};

type Inbox = Arc<Mutex<VecDeque<String>>>;

#[derive(Debug)]
struct PortSlot {
    id: u64,
    inbox: Inbox,
}

#[derive(Debug, Default)]
struct HubInner {
    channels: Mutex<HashMap<String, Vec<PortSlot>>>,
    next_port: AtomicU64,
}

/// Named broadcast channels shared between terminal instances
#[derive(Debug, Clone, Default)]
pub struct LocalBroadcastHub {
    inner: Arc<HubInner>,
}

impl LocalBroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new port on `channel`
    pub fn connect(&self, channel: &str) -> HubPort {
        let id = self.inner.next_port.fetch_add(1, Ordering::Relaxed) + 1;
        let inbox: Inbox = Arc::default();
        self.inner
            .channels
            .lock()
            .entry(channel.to_string())
            .or_default()
            .push(PortSlot {
                id,
                inbox: inbox.clone(),
            });
        tracing::debug!(channel, port = id, "sync port connected");
        HubPort {
            hub: self.inner.clone(),
            channel: channel.to_string(),
            id,
            inbox,
            closed: AtomicBool::new(false),
        }
    }

    /// Number of open ports on `channel`
    pub fn port_count(&self, channel: &str) -> usize {
        self.inner
            .channels
            .lock()
            .get(channel)
            .map_or(0, Vec::len)
    }
}

/// One participant's end of a hub channel
#[derive(Debug)]
pub struct HubPort {
    hub: Arc<HubInner>,
    channel: String,
    id: u64,
    inbox: Inbox,
    closed: AtomicBool,
}

impl HubPort {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Leave the channel; later posts fail with `ChannelClosed`
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut channels = self.hub.channels.lock();
        if let Some(ports) = channels.get_mut(&self.channel) {
            ports.retain(|slot| slot.id != self.id);
            if ports.is_empty() {
                channels.remove(&self.channel);
            }
        }
        self.inbox.lock().clear();
        tracing::debug!(channel = %self.channel, port = self.id, "sync port closed");
    }
}

impl SyncTransport for HubPort {
    fn post(&self, message: &str) -> Result<()> {
        if self.is_closed() {
            return Err(FolioError::ChannelClosed);
        }
        let channels = self.hub.channels.lock();
        let Some(ports) = channels.get(&self.channel) else {
            return Ok(());
        };
        for slot in ports.iter().filter(|slot| slot.id != self.id) {
            slot.inbox.lock().push_back(message.to_string());
        }
        Ok(())
    }

    fn drain(&self) -> Vec<String> {
        self.inbox.lock().drain(..).collect()
    }
}

impl Drop for HubPort {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_skips_sender() {
        let hub = LocalBroadcastHub::new();
        let a = hub.connect("portfolio-terminal");
        let b = hub.connect("portfolio-terminal");
        let c = hub.connect("portfolio-terminal");

        a.post("one").unwrap();
        a.post("two").unwrap();
        assert!(a.drain().is_empty());
        assert_eq!(b.drain(), vec!["one", "two"]);
        assert_eq!(c.drain(), vec!["one", "two"]);
        assert!(b.drain().is_empty());
    }

    #[test]
    fn test_channels_are_isolated() {
        let hub = LocalBroadcastHub::new();
        let a = hub.connect("one");
        let b = hub.connect("two");
        a.post("hi").unwrap();
        assert!(b.drain().is_empty());
    }

    #[test]
    fn test_close_and_drop_leave_channel() {
        let hub = LocalBroadcastHub::new();
        let a = hub.connect("ch");
        {
            let _b = hub.connect("ch");
            assert_eq!(hub.port_count("ch"), 2);
        }
        assert_eq!(hub.port_count("ch"), 1);

        a.close();
        assert_eq!(hub.port_count("ch"), 0);
        assert!(matches!(a.post("late"), Err(FolioError::ChannelClosed)));
    }
}
