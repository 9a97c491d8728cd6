//! Line editor: input buffer, caret and history navigation
//!
//! The caret is a byte offset that always sits on a grapheme cluster boundary,
//! so arrow keys step over emoji and combining sequences as one unit. Rendering
//! uses [`LineEditor::caret_view`] to draw a synthetic caret by mirroring the
//! text on either side of it.

pub mod history;

pub use history::CommandHistory;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Key events the editor understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A printable character
    Char(char),
    /// A pasted or programmatic chunk of text
    Insert(String),
    /// Enter; `soft` (shift or another modifier held) inserts a newline
    Enter { soft: bool },
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Up,
    Down,
    Tab,
    /// Ctrl+C
    CtrlC,
}

/// What a key press did to the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Buffer text changed
    Edited,
    /// Only the caret moved
    CaretMoved,
    /// Plain Enter: the line to execute (buffer already reset)
    Submit(String),
    /// Ctrl+C: the abandoned line (buffer already reset)
    Cancelled(String),
    /// Tab: completion is the caller's job
    CompletionRequested,
    /// Nothing happened
    Ignored,
}

/// Editable input state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub buffer: String,
    /// Byte offset into `buffer`, on a grapheme boundary
    pub caret: usize,
    /// Position in history while navigating; `None` is the live buffer
    pub history_index: Option<usize>,
}

/// Pieces of the input line around the caret, for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretView<'a> {
    pub before: &'a str,
    /// Grapheme under the caret, `None` at end of input
    pub under: Option<&'a str>,
    pub after: &'a str,
    /// Zero-based line the caret is on
    pub line: usize,
    /// Display column of the caret within its line
    pub column: usize,
}

/// Buffer + caret + history cursor
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    state: InputState,
    history: CommandHistory,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn buffer(&self) -> &str {
        &self.state.buffer
    }

    pub fn caret(&self) -> usize {
        self.state.caret
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut CommandHistory {
        &mut self.history
    }

    /// Replace buffer and caret wholesale (remote sync, completion)
    ///
    /// The caret is clamped and snapped back to a grapheme boundary. History
    /// navigation is left, so the new text counts as the live buffer.
    pub fn set_input(&mut self, buffer: &str, caret: usize) {
        self.state.buffer = buffer.to_string();
        self.state.caret = snap_to_boundary(buffer, caret.min(buffer.len()));
        self.state.history_index = None;
    }

    /// Replace the buffer and move the caret to its end
    pub fn set_buffer(&mut self, buffer: &str) {
        self.set_input(buffer, buffer.len());
    }

    /// Replace history wholesale (remote snapshot)
    pub fn set_history(&mut self, history: CommandHistory) {
        self.history = history;
        self.state.history_index = None;
    }

    /// Empty the buffer and leave history navigation
    pub fn reset(&mut self) {
        self.state = InputState::default();
    }

    /// Apply one key press
    pub fn handle_key(&mut self, key: &Key) -> EditOutcome {
        match key {
            Key::Char(c) => {
                let mut tmp = [0u8; 4];
                self.insert(c.encode_utf8(&mut tmp));
                EditOutcome::Edited
            }
            Key::Insert(text) if text.is_empty() => EditOutcome::Ignored,
            Key::Insert(text) => {
                self.insert(text);
                EditOutcome::Edited
            }
            Key::Enter { soft: true } => {
                self.insert("\n");
                EditOutcome::Edited
            }
            Key::Enter { soft: false } => {
                let line = std::mem::take(&mut self.state.buffer);
                self.reset();
                self.history.push(&line);
                EditOutcome::Submit(line)
            }
            Key::Backspace => {
                let Some(prev) = prev_boundary(&self.state.buffer, self.state.caret) else {
                    return EditOutcome::Ignored;
                };
                self.state.buffer.replace_range(prev..self.state.caret, "");
                self.state.caret = prev;
                EditOutcome::Edited
            }
            Key::Delete => {
                let Some(next) = next_boundary(&self.state.buffer, self.state.caret) else {
                    return EditOutcome::Ignored;
                };
                self.state.buffer.replace_range(self.state.caret..next, "");
                EditOutcome::Edited
            }
            Key::Left => match prev_boundary(&self.state.buffer, self.state.caret) {
                Some(prev) => {
                    self.state.caret = prev;
                    EditOutcome::CaretMoved
                }
                None => EditOutcome::Ignored,
            },
            Key::Right => match next_boundary(&self.state.buffer, self.state.caret) {
                Some(next) => {
                    self.state.caret = next;
                    EditOutcome::CaretMoved
                }
                None => EditOutcome::Ignored,
            },
            Key::Home => {
                self.state.caret = 0;
                EditOutcome::CaretMoved
            }
            Key::End => {
                self.state.caret = self.state.buffer.len();
                EditOutcome::CaretMoved
            }
            Key::Up => self.navigate(self.history.older(self.state.history_index)),
            Key::Down => {
                if self.state.history_index.is_none() {
                    return EditOutcome::Ignored;
                }
                self.navigate(self.history.newer(self.state.history_index))
            }
            Key::Tab => EditOutcome::CompletionRequested,
            Key::CtrlC => {
                let line = std::mem::take(&mut self.state.buffer);
                self.reset();
                EditOutcome::Cancelled(line)
            }
        }
    }

    fn navigate(&mut self, index: Option<usize>) -> EditOutcome {
        if index.is_none() && self.state.history_index.is_none() {
            return EditOutcome::Ignored;
        }
        let text = index
            .and_then(|i| self.history.get(i))
            .unwrap_or_default()
            .to_string();
        self.set_buffer(&text);
        self.state.history_index = index;
        EditOutcome::Edited
    }

    fn insert(&mut self, text: &str) {
        self.state.buffer.insert_str(self.state.caret, text);
        self.state.caret += text.len();
        self.state.history_index = None;
    }

    /// Split the buffer around the caret for synthetic caret rendering
    pub fn caret_view(&self) -> CaretView<'_> {
        let buffer = self.state.buffer.as_str();
        let caret = self.state.caret;
        let before = &buffer[..caret];
        let rest = &buffer[caret..];
        let under = rest.graphemes(true).next().filter(|g| *g != "\n");
        let after = match under {
            Some(g) => &rest[g.len()..],
            None => rest,
        };
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        CaretView {
            before,
            under,
            after,
            line,
            column: before[line_start..].width(),
        }
    }
}

fn prev_boundary(text: &str, caret: usize) -> Option<usize> {
    text[..caret]
        .grapheme_indices(true)
        .next_back()
        .map(|(i, _)| i)
}

fn next_boundary(text: &str, caret: usize) -> Option<usize> {
    text[caret..]
        .graphemes(true)
        .next()
        .map(|g| caret + g.len())
}

fn snap_to_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    let mut last = 0;
    for (i, _) in text.grapheme_indices(true) {
        if i > offset {
            break;
        }
        last = i;
    }
    last
}
