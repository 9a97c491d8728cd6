//! Cancellable reveal animations
//!
//! The boot sequence and the typewriter effect both reveal a finished
//! [`Output`] into a scrollback entry a little at a time. The host drives
//! time by calling [`Animator::tick`] with the current clock; each tick
//! returns frames for the terminal to apply.
//!
//! A cancelled task stops where it is: its last frame keeps only what was
//! already revealed. [`Animator::finish_all`] skips to the end instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::output::Output;

/// How much a task reveals per step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealUnit {
    /// Whole lines (boot sequence)
    Lines(usize),
    /// Characters (typewriter)
    Chars(usize),
}

/// Handle to a running animation
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl AnimationHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop the animation; the unrevealed remainder is dropped
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A step of progress for one scrollback entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    pub entry_index: usize,
    /// What the entry should display now
    pub output: Output,
    pub done: bool,
}

#[derive(Debug)]
struct RevealTask {
    handle: AnimationHandle,
    entry_index: usize,
    full: Output,
    unit: RevealUnit,
    interval_ms: u64,
    /// Lines or chars revealed so far
    revealed: usize,
    next_due: Option<u64>,
}

impl RevealTask {
    fn total(&self) -> usize {
        match self.unit {
            RevealUnit::Lines(_) => self.full.lines.len(),
            RevealUnit::Chars(_) => self.full.char_len(),
        }
    }

    fn visible(&self) -> Output {
        match self.unit {
            RevealUnit::Lines(_) => Output {
                lines: self.full.lines[..self.revealed].to_vec(),
            },
            RevealUnit::Chars(_) => self.full.truncated(self.revealed),
        }
    }

    fn step(&self) -> usize {
        match self.unit {
            RevealUnit::Lines(n) | RevealUnit::Chars(n) => n.max(1),
        }
    }

    /// Advance to `now_ms`; returns a frame when something changed
    fn advance(&mut self, now_ms: u64) -> Option<AnimationFrame> {
        if self.handle.is_cancelled() {
            return Some(self.frame(true));
        }
        let total = self.total();

        let due = *self.next_due.get_or_insert(now_ms);
        if now_ms < due {
            return None;
        }
        let interval = self.interval_ms.max(1);
        let steps = (now_ms - due) / interval + 1;
        let advance = usize::try_from(steps)
            .unwrap_or(usize::MAX)
            .saturating_mul(self.step());
        self.revealed = self.revealed.saturating_add(advance).min(total);
        self.next_due = Some(due + steps * interval);
        Some(self.frame(self.revealed >= total))
    }

    fn frame(&self, done: bool) -> AnimationFrame {
        AnimationFrame {
            entry_index: self.entry_index,
            output: self.visible(),
            done,
        }
    }
}

/// Owner of every running reveal task of one terminal
#[derive(Debug, Default)]
pub struct Animator {
    tasks: Vec<RevealTask>,
    next_id: u64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start revealing `full` into scrollback entry `entry_index`
    ///
    /// The first frame is produced by the first tick at or after start.
    pub fn start(
        &mut self,
        entry_index: usize,
        full: Output,
        unit: RevealUnit,
        interval_ms: u64,
    ) -> AnimationHandle {
        self.next_id += 1;
        let handle = AnimationHandle {
            id: self.next_id,
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        tracing::debug!(id = handle.id, entry_index, ?unit, "animation started");
        self.tasks.push(RevealTask {
            handle: handle.clone(),
            entry_index,
            full,
            unit,
            interval_ms,
            revealed: 0,
            next_due: None,
        });
        handle
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.tasks.len()
    }

    /// Final output of the task revealing `entry_index`, if one is running
    pub fn full_output(&self, entry_index: usize) -> Option<&Output> {
        self.tasks
            .iter()
            .find(|t| t.entry_index == entry_index)
            .map(|t| &t.full)
    }

    /// Progress every task to `now_ms`, dropping finished ones
    pub fn tick(&mut self, now_ms: u64) -> Vec<AnimationFrame> {
        let mut frames = Vec::new();
        self.tasks.retain_mut(|task| match task.advance(now_ms) {
            Some(frame) => {
                let done = frame.done;
                frames.push(frame);
                !done
            }
            None => true,
        });
        frames
    }

    /// Cancel everything, returning final frames that keep what was shown
    pub fn cancel_all(&mut self) -> Vec<AnimationFrame> {
        for task in &self.tasks {
            task.handle.cancel();
        }
        self.tick(0)
    }

    /// Skip every task to its end, returning frames with the full output
    pub fn finish_all(&mut self) -> Vec<AnimationFrame> {
        self.tasks
            .drain(..)
            .map(|mut task| {
                task.revealed = task.total();
                task.frame(true)
            })
            .collect()
    }

    /// Forget every task without producing frames; used when the entries
    /// they target are gone
    pub fn discard_all(&mut self) {
        for task in self.tasks.drain(..) {
            task.handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::LineStyle;

    fn three_lines() -> Output {
        let mut out = Output::plain("boot: one");
        out.push(LineStyle::Muted, "boot: two");
        out.push(LineStyle::Success, "ready");
        out
    }

    #[test]
    fn test_line_reveal_follows_clock() {
        let mut animator = Animator::new();
        animator.start(0, three_lines(), RevealUnit::Lines(1), 100);

        let frames = animator.tick(1_000);
        assert_eq!(frames[0].output.lines.len(), 1);
        assert!(animator.tick(1_050).is_empty());

        let frames = animator.tick(1_100);
        assert_eq!(frames[0].output.lines.len(), 2);
        assert!(!frames[0].done);

        let frames = animator.tick(1_200);
        assert!(frames[0].done);
        assert_eq!(frames[0].output, three_lines());
        assert!(!animator.is_running());
    }

    #[test]
    fn test_late_tick_catches_up() {
        let mut animator = Animator::new();
        animator.start(3, Output::plain("abcdefghij"), RevealUnit::Chars(2), 10);
        animator.tick(0);
        let frames = animator.tick(25);
        assert_eq!(frames[0].entry_index, 3);
        assert_eq!(frames[0].output.text(), "abcdef");
    }

    #[test]
    fn test_handle_cancel_keeps_revealed_part() {
        let mut animator = Animator::new();
        let handle = animator.start(0, Output::plain("abcdef"), RevealUnit::Chars(1), 50);
        animator.tick(0);
        handle.cancel();
        let frames = animator.tick(1_000);
        assert!(frames[0].done);
        assert_eq!(frames[0].output.text(), "a");
        assert!(!animator.is_running());
    }

    #[test]
    fn test_finish_all_flushes() {
        let mut animator = Animator::new();
        animator.start(0, three_lines(), RevealUnit::Lines(1), 100);
        animator.start(1, Output::plain("abcdef"), RevealUnit::Chars(2), 10);
        animator.tick(0);
        assert_eq!(animator.running_count(), 2);

        let frames = animator.finish_all();
        assert_eq!(frames[0].output, three_lines());
        assert_eq!(frames[1].output.text(), "abcdef");
        assert!(frames.iter().all(|f| f.done));
        assert_eq!(animator.running_count(), 0);
    }

    #[test]
    fn test_cancel_all_and_discard() {
        let mut animator = Animator::new();
        animator.start(0, three_lines(), RevealUnit::Lines(1), 100);
        animator.start(1, Output::plain("xyz"), RevealUnit::Chars(1), 10);
        let frames = animator.cancel_all();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.done && f.output.text().is_empty()));

        let handle = animator.start(2, three_lines(), RevealUnit::Lines(1), 100);
        animator.discard_all();
        assert!(handle.is_cancelled());
        assert!(animator.tick(10_000).is_empty());
    }
}
