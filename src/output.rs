//! Renderable command output and scrollback entries

use serde::{Deserialize, Serialize};

/// Visual treatment of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Plain,
    /// Headings and highlighted values
    Accent,
    Success,
    Warning,
    Error,
    /// Dimmed hints
    Muted,
}

/// One rendered line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub style: LineStyle,
    pub text: String,
}

impl Line {
    pub fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Output block of a command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub lines: Vec<Line>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multi-line text, one `Line` per `\n`-separated piece
    pub fn styled(style: LineStyle, text: &str) -> Self {
        let mut out = Self::new();
        out.push(style, text);
        out
    }

    pub fn plain(text: &str) -> Self {
        Self::styled(LineStyle::Plain, text)
    }

    pub fn error(text: &str) -> Self {
        Self::styled(LineStyle::Error, text)
    }

    pub fn warning(text: &str) -> Self {
        Self::styled(LineStyle::Warning, text)
    }

    pub fn success(text: &str) -> Self {
        Self::styled(LineStyle::Success, text)
    }

    /// Append text, splitting on newlines
    pub fn push(&mut self, style: LineStyle, text: &str) -> &mut Self {
        self.lines
            .extend(text.split('\n').map(|l| Line::new(style, l)));
        self
    }

    pub fn extend(&mut self, other: Output) -> &mut Self {
        self.lines.extend(other.lines);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines joined with `\n`, styles dropped
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Total characters across all lines (newlines excluded)
    pub fn char_len(&self) -> usize {
        self.lines.iter().map(|l| l.text.chars().count()).sum()
    }

    /// Copy of this output cut to the first `chars` characters
    ///
    /// Used by the typewriter to reveal output progressively.
    pub fn truncated(&self, chars: usize) -> Output {
        let mut remaining = chars;
        let mut out = Output::new();
        for line in &self.lines {
            let count = line.text.chars().count();
            if remaining >= count {
                out.lines.push(line.clone());
                remaining -= count;
            } else {
                let cut: String = line.text.chars().take(remaining).collect();
                out.lines.push(Line::new(line.style, cut));
                break;
            }
        }
        out
    }
}

/// Result of running one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: Output,
    /// Failures stop the remainder of an `&&` group
    pub success: bool,
}

impl Outcome {
    pub fn ok(output: Output) -> Self {
        Self {
            output,
            success: true,
        }
    }

    pub fn fail(output: Output) -> Self {
        Self {
            output,
            success: false,
        }
    }
}

/// A scrollback entry: the submitted line and what it printed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    pub command_text: String,
    pub output: Output,
    /// Unix epoch milliseconds
    pub timestamp: u64,
}

impl CommandEntry {
    pub fn new(command_text: impl Into<String>, output: Output, timestamp: u64) -> Self {
        Self {
            command_text: command_text.into(),
            output,
            timestamp,
        }
    }
}

/// Current time as Unix epoch milliseconds
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
