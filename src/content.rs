//! Canned content for the playful commands

use rand::seq::IndexedRandom;
use rand::Rng;
use unicode_width::UnicodeWidthStr;

pub const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "There are 10 kinds of people: those who understand binary and those who don't.",
    "A SQL query walks into a bar, walks up to two tables and asks: can I join you?",
    "I would tell you a UDP joke, but you might not get it.",
    "Why did the developer go broke? Because they used up all their cache.",
    "It works on my machine. Then we'll ship your machine.",
    "The borrow checker and I are on speaking terms again.",
];

pub const FORTUNES: &[&str] = &[
    "A clean build is in your near future.",
    "The bug you seek is in the code you did not write down.",
    "Today is a good day to delete dead code.",
    "You will find the missing semicolon where you least expect it.",
    "Great software grows from small, well-tested pieces.",
    "An unexpected pull request will brighten your week.",
];

pub const ASCII_BANNER: &str = r"
 ____            _    __       _ _
|  _ \ ___  _ __| |_ / _| ___ | (_) ___
| |_) / _ \| '__| __| |_ / _ \| | |/ _ \
|  __/ (_) | |  | |_|  _| (_) | | | (_) |
|_|   \___/|_|   \__|_|  \___/|_|_|\___/
";

const MATRIX_GLYPHS: &[char] = &[
    '0', '1', 'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ', 'ｹ', 'ｺ', 'ﾊ', 'ﾐ', 'ﾑ', 'ﾒ', 'ﾓ', 'ﾗ', 'ﾘ',
    'ﾜ', 'Z', ':', '.', '=', '*', '+', '<', '>',
];

pub const MATRIX_COLUMNS: usize = 48;
pub const MATRIX_ROWS: usize = 12;

/// Random pick from a non-empty list
pub fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// A block of falling glyphs; about a third of the cells are blank
pub fn matrix_rain<R: Rng + ?Sized>(rng: &mut R, columns: usize, rows: usize) -> Vec<String> {
    (0..rows)
        .map(|_| {
            (0..columns)
                .map(|_| {
                    if rng.random_range(0..3) == 0 {
                        ' '
                    } else {
                        MATRIX_GLYPHS[rng.random_range(0..MATRIX_GLYPHS.len())]
                    }
                })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

/// Speech bubble plus cow; `text` keeps its casing
///
/// Multi-line text gets one bubble row per line, padded to the widest.
pub fn cowsay(text: &str) -> String {
    let text = if text.trim().is_empty() { "moo" } else { text.trim() };
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let width = lines
        .iter()
        .map(|l| UnicodeWidthStr::width(*l))
        .max()
        .unwrap_or(0);

    let mut bubble = format!(" {}\n", "_".repeat(width + 2));
    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        let (open, close) = match (i, lines.len()) {
            (_, 1) => ('<', '>'),
            (0, _) => ('/', '\\'),
            (i, _) if i == last => ('\\', '/'),
            _ => ('|', '|'),
        };
        let pad = " ".repeat(width - UnicodeWidthStr::width(*line));
        bubble.push_str(&format!("{open} {line}{pad} {close}\n"));
    }
    bubble.push_str(&format!(" {}", "-".repeat(width + 2)));
    format!(
        "{bubble}\n        \\   ^__^\n         \\  (oo)\\_______\n            (__)\\       )\\/\\\n                ||----w |\n                ||     ||"
    )
}
