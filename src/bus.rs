//! Typed publish/subscribe for UI coordination
//!
//! Replaces page-level custom events (`portfolio:favorites-updated`,
//! `command-palette:close`, ...) with typed topics. Observers are called
//! after the bus lock is released, so an observer may publish in turn.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::prefs::Theme;

/// Unique identifier for a registered observer
pub type ObserverId = u64;

/// UI coordination events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Favorite project ids changed
    FavoritesUpdated(Vec<String>),
    /// Close the command palette
    CommandPaletteClose,
    /// Close the command palette because a navigation is underway
    CommandPaletteCloseOnNavigate,
    /// A section deep link was copied to the clipboard
    SectionLinkCopied(String),
    /// A terminal instance finished mounting
    TerminalReady { instance_id: String },
    /// The terminal asks the host to navigate
    NavigationRequested { route: String },
    /// Theme preference changed
    ThemeChanged(Theme),
}

/// Topic of an event, for subscription filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiTopic {
    FavoritesUpdated,
    CommandPaletteClose,
    CommandPaletteCloseOnNavigate,
    SectionLinkCopied,
    TerminalReady,
    NavigationRequested,
    ThemeChanged,
}

impl UiEvent {
    pub fn topic(&self) -> UiTopic {
        match self {
            UiEvent::FavoritesUpdated(_) => UiTopic::FavoritesUpdated,
            UiEvent::CommandPaletteClose => UiTopic::CommandPaletteClose,
            UiEvent::CommandPaletteCloseOnNavigate => UiTopic::CommandPaletteCloseOnNavigate,
            UiEvent::SectionLinkCopied(_) => UiTopic::SectionLinkCopied,
            UiEvent::TerminalReady { .. } => UiTopic::TerminalReady,
            UiEvent::NavigationRequested { .. } => UiTopic::NavigationRequested,
            UiEvent::ThemeChanged(_) => UiTopic::ThemeChanged,
        }
    }
}

/// UI event observer
///
/// Implementations must be `Send + Sync`; the bus may be shared between
/// terminal instances.
pub trait UiObserver: Send + Sync {
    /// Called for every event matching [`UiObserver::topics`]
    fn on_event(&self, event: &UiEvent);

    /// Which topics this observer wants (None = all)
    fn topics(&self) -> Option<&HashSet<UiTopic>> {
        None
    }
}

struct ObserverEntry {
    id: ObserverId,
    observer: Arc<dyn UiObserver>,
}

/// Event bus shared by terminals and the host page
#[derive(Default)]
pub struct EventBus {
    observers: Mutex<Vec<ObserverEntry>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.lock().len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer, returning its id
    pub fn subscribe(&self, observer: Arc<dyn UiObserver>) -> ObserverId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.observers.lock().push(ObserverEntry { id, observer });
        id
    }

    /// Remove an observer; returns whether it was registered
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|entry| entry.id != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Deliver an event to every interested observer
    pub fn publish(&self, event: &UiEvent) {
        let topic = event.topic();
        let targets: Vec<Arc<dyn UiObserver>> = self
            .observers
            .lock()
            .iter()
            .map(|entry| entry.observer.clone())
            .collect();
        tracing::debug!(?topic, observers = targets.len(), "publishing ui event");
        for observer in targets {
            let wanted = observer.topics().is_none_or(|t| t.contains(&topic));
            if wanted {
                observer.on_event(event);
            }
        }
    }
}

/// Observer that records everything it sees; handy for hosts and tests
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<UiEvent>>,
    topics: Option<HashSet<UiTopic>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topics(topics: HashSet<UiTopic>) -> Self {
        Self {
            topics: Some(topics),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<UiEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl UiObserver for RecordingObserver {
    fn on_event(&self, event: &UiEvent) {
        self.events.lock().push(event.clone());
    }

    fn topics(&self) -> Option<&HashSet<UiTopic>> {
        self.topics.as_ref()
    }
}
