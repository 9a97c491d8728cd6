//! Submitted command history with a navigation cursor

use serde::{Deserialize, Serialize};

/// Insertion-ordered, unbounded list of submitted raw command lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHistory {
    entries: Vec<String>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted line; blank lines are ignored
    pub fn push(&mut self, line: &str) {
        let line = line.trim();
        if !line.is_empty() {
            self.entries.push(line.to_string());
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor one step older than `cursor` (`None` = live buffer)
    ///
    /// Stops at the oldest entry. Returns `None` only when history is empty.
    pub fn older(&self, cursor: Option<usize>) -> Option<usize> {
        match cursor {
            _ if self.entries.is_empty() => None,
            None => Some(self.entries.len() - 1),
            Some(i) => Some(i.saturating_sub(1).min(self.entries.len() - 1)),
        }
    }

    /// Cursor one step newer than `cursor`; past the newest returns to live
    pub fn newer(&self, cursor: Option<usize>) -> Option<usize> {
        match cursor {
            Some(i) if i + 1 < self.entries.len() => Some(i + 1),
            _ => None,
        }
    }
}

impl From<Vec<String>> for CommandHistory {
    fn from(entries: Vec<String>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_not_recorded() {
        let mut h = CommandHistory::new();
        h.push("  ");
        h.push(" help ");
        assert_eq!(h.entries(), &["help".to_string()]);
    }

    #[test]
    fn test_cursor_walk() {
        let h = CommandHistory::from(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(h.older(None), Some(2));
        assert_eq!(h.older(Some(2)), Some(1));
        assert_eq!(h.older(Some(0)), Some(0));
        assert_eq!(h.newer(Some(0)), Some(1));
        assert_eq!(h.newer(Some(2)), None);
        assert_eq!(h.newer(None), None);
    }

    #[test]
    fn test_empty_history_stays_live() {
        let h = CommandHistory::new();
        assert_eq!(h.older(None), None);
    }
}
