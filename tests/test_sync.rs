//! Cross-instance sync between terminals sharing a hub
//!
//! Tests cover:
//! - Input, exec and clear mirroring
//! - Snapshot hand-off to a newly mounted instance
//! - More than two instances on one channel
//! - Channel isolation

use folio_term::sync::{SyncEvent, SyncTransport};
use folio_term::{
    Key, LocalBroadcastHub, Portfolio, SyncMessage, Terminal, TerminalConfig, TerminalServices,
};

fn quiet_config(channel: &str) -> TerminalConfig {
    let mut config = TerminalConfig::default();
    config.channel_name = channel.to_string();
    config.animation.boot_enabled = false;
    config.animation.typewriter_interval_ms = 0;
    config
}

fn instance(hub: &LocalBroadcastHub, channel: &str) -> Terminal {
    let config = quiet_config(channel);
    let port = hub.connect(&config.channel_name);
    Terminal::new(config, Portfolio::default(), TerminalServices::in_memory())
        .with_transport(Box::new(port))
}

#[test]
fn test_three_instances_see_each_other() {
    let hub = LocalBroadcastHub::new();
    let mut a = instance(&hub, "portfolio-terminal");
    let mut b = instance(&hub, "portfolio-terminal");
    let mut c = instance(&hub, "portfolio-terminal");

    a.handle_key(&Key::Insert("joke".to_string()));
    b.pump_sync();
    c.pump_sync();
    assert_eq!(b.input(), "joke");
    assert_eq!(c.input(), "joke");

    a.handle_key(&Key::Enter { soft: false });
    b.pump_sync();
    c.pump_sync();
    assert_eq!(b.entries(), a.entries());
    assert_eq!(c.entries(), a.entries());
    assert_eq!(b.input(), "");
}

#[test]
fn test_remote_typing_then_local_typing() {
    let hub = LocalBroadcastHub::new();
    let mut a = instance(&hub, "ch");
    let mut b = instance(&hub, "ch");

    a.handle_key(&Key::Insert("ec".to_string()));
    b.pump_sync();
    b.handle_key(&Key::Insert("ho hi".to_string()));
    a.pump_sync();
    assert_eq!(a.input(), "echo hi");
    assert_eq!(a.editor().caret(), "echo hi".len());
}

#[test]
fn test_late_joiner_receives_snapshot() {
    let hub = LocalBroadcastHub::new();
    let mut a = instance(&hub, "ch");
    a.mount();
    a.submit("echo one");
    a.submit("fun");

    let mut b = instance(&hub, "ch");
    b.mount();
    a.pump_sync();
    b.pump_sync();

    assert_eq!(b.entries(), a.entries());
    assert!(b.quest_state().active);
    assert_eq!(b.editor().history().entries(), a.editor().history().entries());
}

#[test]
fn test_channels_do_not_mix() {
    let hub = LocalBroadcastHub::new();
    let mut a = instance(&hub, "one");
    let mut b = instance(&hub, "two");
    a.submit("echo hidden");
    assert_eq!(b.pump_sync(), 0);
    assert!(b.entries().is_empty());
}

#[test]
fn test_messages_on_the_wire() {
    let hub = LocalBroadcastHub::new();
    let listener = hub.connect("ch");
    let mut a = instance(&hub, "ch");

    a.mount();
    a.handle_key(&Key::Char('x'));
    a.submit("clear");

    let kinds: Vec<SyncEvent> = listener
        .drain()
        .iter()
        .map(|json| SyncMessage::from_json(json).unwrap())
        .inspect(|msg| assert_eq!(msg.instance_id, a.instance_id()))
        .map(|msg| msg.event)
        .collect();
    assert_eq!(kinds.len(), 3);
    assert_eq!(kinds[0], SyncEvent::Hello);
    assert!(matches!(kinds[1], SyncEvent::Input(ref p) if p.buffer == "x"));
    assert_eq!(kinds[2], SyncEvent::Clear);
}
