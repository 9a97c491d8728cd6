//! Interactive terminal widget core for a portfolio site
//!
//! This library provides everything behind the site's terminal except the
//! rendering:
//!
//! ## Terminal
//! - Command registry with chaining (`;`, `&&`) and an allow-listed `cd`
//! - Line editor with grapheme-aware caret and command history
//! - Tab completion with common-prefix extension and cycling
//! - Boot and typewriter animations driven by the host clock
//!
//! ## Quest
//! - Three code fragments derived from the portfolio dataset
//! - Unlock validation, stage progression and the `warp` reward
//! - Progress persisted as plain JSON plus an obfuscated answer blob
//!
//! ## Coordination
//! - Cross-instance sync messages over a pluggable transport
//! - Typed UI event bus and a shared preference store
//!
//! ```
//! use folio_term::{Portfolio, Terminal, TerminalConfig, TerminalServices};
//!
//! let mut term = Terminal::new(
//!     TerminalConfig::default(),
//!     Portfolio::default(),
//!     TerminalServices::in_memory(),
//! );
//! term.submit("echo hello");
//! assert_eq!(term.entries().last().unwrap().output.text(), "hello");
//! ```

pub mod animation;
pub mod bus;
pub mod command;
pub mod completion;
pub mod config;
pub mod content;
pub mod editor;
pub mod error;
pub mod obfuscation;
pub mod output;
pub mod portfolio;
pub mod prefs;
pub mod quest;
pub mod storage;
pub mod sync;
pub mod terminal;

pub use bus::{EventBus, ObserverId, RecordingObserver, UiEvent, UiObserver, UiTopic};
pub use command::Command;
pub use completion::{Completion, CompletionEngine};
pub use config::TerminalConfig;
pub use editor::{CaretView, EditOutcome, Key, LineEditor};
pub use error::{FolioError, Result};
pub use obfuscation::InsecureObfuscator;
pub use output::{CommandEntry, Line, LineStyle, Outcome, Output};
pub use portfolio::{Portfolio, Project, RouteTable, SkillGroup};
pub use prefs::{PreferenceStore, Theme};
pub use quest::{Fragment, QuestMachine, QuestState, Stage};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageScopes};
pub use sync::{LocalBroadcastHub, SyncMessage, SyncTransport};
pub use terminal::{Terminal, TerminalServices};
