//! Tab completion
//!
//! Candidates depend on the first token: argument-taking verbs complete their
//! arguments, anything else completes command names. A longer common prefix
//! is applied first; after that repeated Tab cycles through the candidates.

use crate::command::{command_names, verb_of, MULTI_ARG_VERBS};
use crate::portfolio::RouteTable;

const CD_TARGETS: [&str; 5] = ["about", "blog", "contact", "home", "projects"];
const UNLOCK_ARGS: [&str; 3] = ["alpha", "beta", "gamma"];
const INSPECT_ARGS: [&str; 2] = ["skills", "keywords"];
const QUEST_ARGS: [&str; 2] = ["status", "help"];
const WARP_ARGS: [&str; 6] = ["random", "projects", "about", "blog", "contact", "home"];

/// What completion needs to know about the terminal
#[derive(Debug, Clone, Copy)]
pub struct CompletionContext<'a> {
    pub routes: &'a RouteTable,
    /// Secret verbs are offered only once unlocked
    pub warp_unlocked: bool,
}

/// Result of a Tab press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// No candidates; leave the buffer alone
    None,
    /// Buffer extended to the candidates' common prefix
    Extended(String),
    /// Buffer set to one candidate of a cycle
    Cycled {
        value: String,
        index: usize,
        candidates: Vec<String>,
    },
}

#[derive(Debug, Clone)]
struct Cycle {
    candidates: Vec<String>,
    index: usize,
}

/// Completion engine holding the cycling position between Tab presses
#[derive(Debug, Clone, Default)]
pub struct CompletionEngine {
    cycle: Option<Cycle>,
}

impl CompletionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the cycle; call on any edit other than Tab
    pub fn reset(&mut self) {
        self.cycle = None;
    }

    /// Candidate buffers for the current input
    pub fn candidates(buffer: &str, ctx: &CompletionContext<'_>) -> Vec<String> {
        let lowered = buffer.trim_start().to_lowercase();
        let verb = verb_of(&lowered);
        let takes_args = MULTI_ARG_VERBS.contains(&verb.as_str())
            && (verb != "warp" || ctx.warp_unlocked);

        if takes_args {
            let typed = lowered[verb.len()..].trim_start();
            return argument_candidates(&verb, typed, ctx);
        }

        let needle = lowered.trim();
        command_names(ctx.warp_unlocked)
            .filter(|name| name.starts_with(needle))
            .map(str::to_string)
            .collect()
    }

    /// Handle one Tab press
    pub fn complete(&mut self, buffer: &str, ctx: &CompletionContext<'_>) -> Completion {
        if let Some(cycle) = self.cycle.as_mut() {
            if cycle.candidates.get(cycle.index).map(String::as_str) == Some(buffer) {
                cycle.index = (cycle.index + 1) % cycle.candidates.len();
                return Completion::Cycled {
                    value: cycle.candidates[cycle.index].clone(),
                    index: cycle.index,
                    candidates: cycle.candidates.clone(),
                };
            }
        }
        self.cycle = None;

        let candidates = Self::candidates(buffer, ctx);
        if candidates.is_empty() {
            return Completion::None;
        }

        let prefix = common_prefix(&candidates);
        if prefix.chars().count() > buffer.trim_start().chars().count() {
            return Completion::Extended(prefix);
        }

        let value = candidates[0].clone();
        self.cycle = Some(Cycle {
            candidates: candidates.clone(),
            index: 0,
        });
        Completion::Cycled {
            value,
            index: 0,
            candidates,
        }
    }
}

fn argument_candidates(verb: &str, typed: &str, ctx: &CompletionContext<'_>) -> Vec<String> {
    let options: Vec<String> = match verb {
        "cd" => cd_options(typed, ctx.routes),
        "unlock" => {
            // Only the fragment name completes; codes are on the player
            if typed.contains(char::is_whitespace) {
                return Vec::new();
            }
            to_owned(&UNLOCK_ARGS)
        }
        "inspect" => to_owned(&INSPECT_ARGS),
        "quest" => to_owned(&QUEST_ARGS),
        "warp" => to_owned(&WARP_ARGS),
        _ => Vec::new(),
    };
    options
        .into_iter()
        .filter(|opt| opt.starts_with(typed))
        .map(|opt| format!("{verb} {opt}"))
        .collect()
}

fn cd_options(typed: &str, routes: &RouteTable) -> Vec<String> {
    let lead = if typed.starts_with('/') { "/" } else { "" };
    let nested = typed.trim_start_matches('/').contains('/');
    let options: Vec<String> = if nested {
        routes
            .project_ids()
            .iter()
            .map(|id| format!("projects/{id}"))
            .chain(routes.skill_slugs().iter().map(|s| format!("skills/{s}")))
            .collect()
    } else {
        to_owned(&CD_TARGETS)
    };
    options.into_iter().map(|o| format!("{lead}{o}")).collect()
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Longest common prefix of all candidates, on char boundaries
pub fn common_prefix(candidates: &[String]) -> String {
    let Some(first) = candidates.first() else {
        return String::new();
    };
    let mut end = first.len();
    for other in &candidates[1..] {
        end = first[..end]
            .char_indices()
            .zip(other.chars())
            .find(|((_, a), b)| a != b)
            .map(|((i, _), _)| i)
            .unwrap_or_else(|| end.min(other.len()));
    }
    first[..end].to_string()
}
