//! The terminal widget core
//!
//! One [`Terminal`] per mounted widget. It owns the line editor, completion,
//! quest machine and scrollback, and is split across submodules:
//! - `dispatch`: command execution and chaining
//! - `remote`: cross-instance sync
//!
//! Everything is driven by the host: key presses through
//! [`Terminal::handle_key`], time through [`Terminal::tick`] and incoming sync
//! traffic through [`Terminal::pump_sync`].

mod dispatch;
mod remote;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::{AnimationFrame, Animator, RevealUnit};
use crate::bus::{EventBus, UiEvent};
use crate::completion::{Completion, CompletionContext, CompletionEngine};
use crate::config::TerminalConfig;
use crate::editor::{CaretView, EditOutcome, Key, LineEditor};
use crate::obfuscation::InsecureObfuscator;
use crate::output::{now_millis, CommandEntry, LineStyle, Output};
use crate::portfolio::{Portfolio, RouteTable};
use crate::prefs::PreferenceStore;
use crate::quest::{QuestMachine, QuestState};
use crate::storage::{self, StorageScopes, BOOTED_KEY};
use crate::sync::{SyncMessage, SyncTransport};

const BOOT_LINES: &[&str] = &[
    "[ ok ] mounting /portfolio",
    "[ ok ] loading projects",
    "[ ok ] indexing skills",
    "[ ok ] establishing secure channel",
];

/// Shared services a terminal is wired to
///
/// The bus and preference store are usually shared by every terminal on a
/// page; storage scopes by every terminal of a browsing session.
#[derive(Debug, Clone)]
pub struct TerminalServices {
    pub storage: StorageScopes,
    pub bus: Arc<EventBus>,
    pub prefs: Arc<PreferenceStore>,
}

impl TerminalServices {
    pub fn new(storage: StorageScopes, bus: Arc<EventBus>) -> Self {
        let prefs = Arc::new(PreferenceStore::new(storage.local.clone(), bus.clone()));
        Self {
            storage,
            bus,
            prefs,
        }
    }

    /// In-memory storage and a private bus
    pub fn in_memory() -> Self {
        Self::new(StorageScopes::in_memory(), Arc::new(EventBus::new()))
    }
}

/// A mounted terminal instance
pub struct Terminal {
    config: TerminalConfig,
    portfolio: Portfolio,
    routes: RouteTable,
    editor: LineEditor,
    completion: CompletionEngine,
    quest: QuestMachine,
    entries: Vec<CommandEntry>,
    services: TerminalServices,
    rng: StdRng,
    instance_id: String,
    transport: Option<Box<dyn SyncTransport>>,
    /// Set while a remote message is applied; suppresses rebroadcast
    applying_remote: bool,
    animator: Animator,
    last_navigation: Option<String>,
    mounted: bool,
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("instance_id", &self.instance_id)
            .field("entries", &self.entries.len())
            .field("input", self.editor.state())
            .field("quest", self.quest.state())
            .finish_non_exhaustive()
    }
}

impl Terminal {
    /// Create an unmounted terminal
    ///
    /// Persisted quest progress is restored immediately; routes are computed
    /// once from `portfolio`.
    pub fn new(config: TerminalConfig, portfolio: Portfolio, services: TerminalServices) -> Self {
        let routes = RouteTable::from_portfolio(&portfolio);
        let quest = QuestMachine::restore(
            services.storage.local.clone(),
            InsecureObfuscator::for_host(&config.host),
        );
        Self {
            config,
            portfolio,
            routes,
            editor: LineEditor::new(),
            completion: CompletionEngine::new(),
            quest,
            entries: Vec::new(),
            services,
            rng: StdRng::from_os_rng(),
            instance_id: uuid::Uuid::new_v4().to_string(),
            transport: None,
            applying_remote: false,
            animator: Animator::new(),
            last_navigation: None,
            mounted: false,
        }
    }

    /// Attach a sync transport (builder style)
    pub fn with_transport(mut self, transport: Box<dyn SyncTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a deterministic random source
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Start the widget: boot sequence, hello to peers, ready event
    ///
    /// The boot sequence plays once per session scope. Mounting twice is a
    /// no-op.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        let session = self.services.storage.session.clone();
        let booted = storage::read_raw(session.as_ref(), BOOTED_KEY).is_some();
        let play_boot = self.config.animation.boot_enabled && !booted;
        let mut banner = Output::new();
        if play_boot {
            for line in BOOT_LINES {
                banner.push(LineStyle::Muted, line);
            }
            storage::write_raw(session.as_ref(), BOOTED_KEY, "1");
        }
        banner.push(
            LineStyle::Accent,
            &format!("Welcome to {}'s portfolio.", self.config.owner.name),
        );
        banner.push(LineStyle::Plain, "Type `help` to see what you can do.");
        if self.services.prefs.take_hotkey_hint() {
            banner.push(
                LineStyle::Muted,
                "Tip: Tab completes, Up/Down walk history, Ctrl+C cancels.",
            );
        }

        self.entries
            .push(CommandEntry::new("", Output::new(), now_millis()));
        let index = self.entries.len() - 1;
        if play_boot {
            self.animator.start(
                index,
                banner,
                RevealUnit::Lines(1),
                self.config.animation.boot_line_interval_ms,
            );
        } else {
            self.entries[index].output = banner;
        }

        self.broadcast(SyncMessage::hello(self.instance_id.clone()));
        self.services.bus.publish(&UiEvent::TerminalReady {
            instance_id: self.instance_id.clone(),
        });
        tracing::debug!(instance = %self.instance_id, booted, "terminal mounted");
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub fn prompt(&self) -> &str {
        &self.config.prompt
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Scrollback, oldest first
    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn input(&self) -> &str {
        self.editor.buffer()
    }

    pub fn caret_view(&self) -> CaretView<'_> {
        self.editor.caret_view()
    }

    pub fn quest_state(&self) -> &QuestState {
        self.quest.state()
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.services.bus
    }

    pub fn prefs(&self) -> &Arc<PreferenceStore> {
        &self.services.prefs
    }

    /// Route of the most recent navigation request
    pub fn last_navigation(&self) -> Option<&str> {
        self.last_navigation.as_deref()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    /// Apply one key press
    pub fn handle_key(&mut self, key: &Key) -> EditOutcome {
        if *key != Key::Tab {
            self.completion.reset();
        }
        let outcome = self.editor.handle_key(key);
        match &outcome {
            EditOutcome::Edited | EditOutcome::CaretMoved => self.broadcast_input(),
            EditOutcome::Submit(line) => self.run_submitted(line),
            EditOutcome::Cancelled(line) => self.cancel_line(line),
            EditOutcome::CompletionRequested => self.complete(),
            EditOutcome::Ignored => {}
        }
        outcome
    }

    /// Submit a whole line as if typed and entered
    pub fn submit(&mut self, line: &str) {
        self.completion.reset();
        self.editor.reset();
        self.editor.history_mut().push(line);
        self.run_submitted(line);
    }

    fn complete(&mut self) {
        let ctx = CompletionContext {
            routes: &self.routes,
            warp_unlocked: self.quest.warp_unlocked(),
        };
        let buffer = self.editor.buffer().to_string();
        match self.completion.complete(&buffer, &ctx) {
            Completion::None => {}
            Completion::Extended(value) | Completion::Cycled { value, .. } => {
                self.editor.set_buffer(&value);
                self.broadcast_input();
            }
        }
    }

    fn cancel_line(&mut self, line: &str) {
        let frames = self.animator.cancel_all();
        self.apply_frames(frames);
        let entry = CommandEntry::new(format!("{line}^C"), Output::new(), now_millis());
        self.entries.push(entry.clone());
        self.broadcast(SyncMessage::exec(
            self.instance_id.clone(),
            entry,
            "",
            self.quest.state().clone(),
        ));
    }

    /// Advance animations to `now_ms`; returns whether scrollback changed
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let frames = self.animator.tick(now_ms);
        self.apply_frames(frames)
    }

    /// Skip every running animation to its end
    pub fn finish_animations(&mut self) {
        let frames = self.animator.finish_all();
        self.apply_frames(frames);
    }

    fn apply_frames(&mut self, frames: Vec<AnimationFrame>) -> bool {
        let mut changed = false;
        for frame in frames {
            if let Some(entry) = self.entries.get_mut(frame.entry_index) {
                entry.output = frame.output;
                changed = true;
            }
        }
        changed
    }

    fn broadcast_input(&self) {
        let state = self.editor.state();
        self.broadcast(SyncMessage::input(
            self.instance_id.clone(),
            state.buffer.clone(),
            state.caret,
        ));
    }

    /// Post a message to peers unless a remote message is being applied
    fn broadcast(&self, message: SyncMessage) {
        if self.applying_remote {
            return;
        }
        let Some(transport) = self.transport.as_ref() else {
            return;
        };
        let kind = message.kind();
        match message.to_json() {
            Ok(json) => {
                if let Err(err) = transport.post(&json) {
                    tracing::warn!(?kind, %err, "sync post failed");
                }
            }
            Err(err) => tracing::warn!(?kind, %err, "failed to encode sync message"),
        }
    }
}
