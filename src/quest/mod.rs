//! Quest state machine
//!
//! Three fragment codes are hidden in the portfolio data. The player digs them
//! out with `scan` and `inspect`, submits them with `unlock`, then
//! `synthesize`s the result to earn the `warp` verb.
//!
//! Stage is the next recommended fragment, not a gate: fragments may be
//! unlocked in any order and completion is decided by which fragments are
//! held.
//!
//! Progress is persisted in two halves: plain JSON for stage, inventory and
//! codes, and an obfuscated blob for the expected answers. Storage failures
//! and corrupt entries are logged and treated as "no progress".

pub mod codes;
pub mod state;

use std::sync::Arc;

pub use codes::{compute_alpha, compute_beta, compute_expected, compute_gamma};
pub use state::{ExpectedCodes, Fragment, PersistedQuest, QuestState, Stage};

use crate::command::InspectTarget;
use crate::obfuscation::InsecureObfuscator;
use crate::output::{LineStyle, Outcome, Output};
use crate::portfolio::Portfolio;
use crate::storage::{self, Storage, QUEST_EXPECTED_KEY, QUEST_STATE_KEY};

/// How a quest verb found the quest when it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Already running
    AlreadyActive,
    /// Prior progress restored from storage
    Resumed,
    /// Fresh quest with newly computed codes
    Started,
}

/// Quest controller owning the state and its persistence
pub struct QuestMachine {
    state: QuestState,
    storage: Arc<dyn Storage>,
    obfuscator: InsecureObfuscator,
}

impl std::fmt::Debug for QuestMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestMachine")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl QuestMachine {
    /// Create an inactive machine
    pub fn new(storage: Arc<dyn Storage>, obfuscator: InsecureObfuscator) -> Self {
        Self {
            state: QuestState::default(),
            storage,
            obfuscator,
        }
    }

    /// Create a machine and load any persisted progress into it
    pub fn restore(storage: Arc<dyn Storage>, obfuscator: InsecureObfuscator) -> Self {
        let mut machine = Self::new(storage, obfuscator);
        if let Some(state) = machine.load() {
            machine.state = state;
        }
        machine
    }

    pub fn state(&self) -> &QuestState {
        &self.state
    }

    /// Replace the in-memory state (remote sync); not persisted
    pub fn replace_state(&mut self, state: QuestState) {
        self.state = state;
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// `warp` is available once every fragment is held
    pub fn warp_unlocked(&self) -> bool {
        self.state.all_unlocked()
    }

    fn load(&self) -> Option<QuestState> {
        let persisted: PersistedQuest =
            storage::read_json(self.storage.as_ref(), QUEST_STATE_KEY)?;
        let encoded = storage::read_raw(self.storage.as_ref(), QUEST_EXPECTED_KEY)?;
        match self.obfuscator.decode::<ExpectedCodes>(&encoded) {
            Ok(expected) => Some(QuestState::from_persisted(persisted, expected)),
            Err(err) => {
                tracing::warn!(%err, "discarding undecodable quest answers");
                None
            }
        }
    }

    fn persist(&self) {
        storage::write_json(
            self.storage.as_ref(),
            QUEST_STATE_KEY,
            &self.state.to_persisted(),
        );
    }

    fn persist_expected(&self, expected: &ExpectedCodes) {
        match self.obfuscator.encode(expected) {
            Ok(encoded) => {
                storage::write_raw(self.storage.as_ref(), QUEST_EXPECTED_KEY, &encoded);
            }
            Err(err) => tracing::warn!(%err, "failed to encode quest answers"),
        }
    }

    /// Make sure a quest is running, resuming stored progress when possible
    pub fn ensure_active(&mut self, portfolio: &Portfolio) -> Activation {
        if self.state.active && self.state.expected.is_some() {
            return Activation::AlreadyActive;
        }

        // In-memory progress outranks storage, which may be unavailable
        if self.state.expected.is_some() && self.state.has_progress() {
            self.state.active = true;
            self.persist();
            tracing::debug!(stage = self.state.stage.name(), "quest resumed from memory");
            return Activation::Resumed;
        }

        if let Some(mut stored) = self.load().filter(QuestState::has_progress) {
            stored.active = true;
            self.state = stored;
            self.persist();
            tracing::debug!(stage = self.state.stage.name(), "quest resumed");
            return Activation::Resumed;
        }

        let expected = compute_expected(portfolio);
        self.persist_expected(&expected);
        self.state = QuestState {
            active: true,
            expected: Some(expected),
            ..Default::default()
        };
        self.persist();
        tracing::debug!("quest started");
        Activation::Started
    }

    /// Banner line describing how the quest was (re)activated
    pub fn activation_notice(activation: Activation) -> Option<Output> {
        match activation {
            Activation::AlreadyActive => None,
            Activation::Resumed => Some(Output::styled(
                LineStyle::Muted,
                "[quest] progress restored",
            )),
            Activation::Started => Some(Output::styled(
                LineStyle::Muted,
                "[quest] new quest started",
            )),
        }
    }

    /// `fun`: the introduction
    pub fn intro(&self) -> Outcome {
        let mut out = Output::new();
        out.push(LineStyle::Accent, "// SIGNAL INTERCEPTED //");
        out.push(
            LineStyle::Plain,
            "Three code fragments are hidden in this portfolio: ALPHA, BETA, GAMMA.\n\
             Each one is derived from the projects and skills you can see on this site.\n\
             Recover all three, unlock them, then synthesize the key.",
        );
        out.push(
            LineStyle::Muted,
            "Start with `scan`. Type `quest help` for the full toolkit.",
        );
        Outcome::ok(out)
    }

    /// `scan`: reveal the most recent project
    pub fn scan(&self, portfolio: &Portfolio) -> Outcome {
        match portfolio.most_recent_project() {
            Some(project) => {
                let mut out = Output::new();
                out.push(LineStyle::Accent, "Scanning latest transmission...");
                out.push(LineStyle::Plain, &format!("name: {}", project.name));
                out.push(LineStyle::Plain, &format!("id:   {}", project.id));
                if !project.date.is_empty() {
                    out.push(LineStyle::Plain, &format!("date: {}", project.date));
                }
                out.push(
                    LineStyle::Muted,
                    "ALPHA = first letter of the name + last character of the id + word count of the name (2 digits)",
                );
                Outcome::ok(out)
            }
            None => Outcome::fail(Output::warning("scan: no projects to scan")),
        }
    }

    /// `inspect skills` / `inspect keywords`
    pub fn inspect(&self, target: &InspectTarget, portfolio: &Portfolio) -> Outcome {
        match target {
            InspectTarget::Skills => {
                let mut out = Output::new();
                out.push(LineStyle::Accent, "Skill usage across projects:");
                for (skill, count) in portfolio.ranked_skills() {
                    out.push(LineStyle::Plain, &format!("  {count:>2}  {skill}"));
                }
                out.push(
                    LineStyle::Muted,
                    "BETA = first three letters of the top skill + its project count (2 digits)",
                );
                Outcome::ok(out)
            }
            InspectTarget::Keywords => {
                let keywords = portfolio.distinct_keywords();
                let mut out = Output::new();
                out.push(
                    LineStyle::Accent,
                    &format!("{} distinct keywords:", keywords.len()),
                );
                out.push(
                    LineStyle::Plain,
                    &format!("  {}", keywords.into_iter().collect::<Vec<_>>().join(", ")),
                );
                out.push(
                    LineStyle::Plain,
                    &format!("{} projects ship a live demo", portfolio.demo_count()),
                );
                out.push(
                    LineStyle::Muted,
                    "GAMMA = demo count (2 digits) + distinct keyword count (2 digits)",
                );
                Outcome::ok(out)
            }
            InspectTarget::Other(what) if what.is_empty() => {
                Outcome::fail(Output::warning("usage: inspect <skills|keywords>"))
            }
            InspectTarget::Other(what) => Outcome::fail(Output::warning(&format!(
                "inspect: nothing to inspect at '{what}' (try skills or keywords)"
            ))),
        }
    }

    /// `quest status`
    pub fn status(&self) -> Outcome {
        let mut out = Output::new();
        let state = &self.state;
        let status = if state.synthesized {
            "synthesized"
        } else if state.active {
            "active"
        } else {
            "inactive"
        };
        out.push(LineStyle::Accent, &format!("quest: {status}"));
        out.push(LineStyle::Plain, &format!("stage: {}", state.stage.name()));
        for fragment in Fragment::ALL {
            let mark = if state.codes.contains_key(&fragment) {
                "✓"
            } else {
                "·"
            };
            out.push(LineStyle::Plain, &format!("  [{mark}] {fragment}"));
        }
        if let Some(next) = state.stage.fragment() {
            out.push(LineStyle::Muted, &format!("next: unlock {}", next.name()));
        } else if !state.synthesized {
            out.push(LineStyle::Muted, "next: synthesize");
        }
        Outcome::ok(out)
    }

    /// `quest help`
    pub fn help(&self) -> Outcome {
        Outcome::ok(Output::plain(
            "quest commands:\n\
             \x20 scan                      latest project details\n\
             \x20 inspect skills            skill usage counts\n\
             \x20 inspect keywords          keywords and demo count\n\
             \x20 unlock <fragment> <code>  submit a fragment code\n\
             \x20 inventory                 fragments collected\n\
             \x20 quest status              progress overview\n\
             \x20 synthesize                combine all fragments\n\
             \x20 abort quest               reset everything",
        ))
    }

    /// `inventory`
    pub fn inventory(&self) -> Outcome {
        if self.state.inventory.is_empty() {
            return Outcome::ok(Output::styled(LineStyle::Muted, "inventory: empty"));
        }
        let mut out = Output::styled(LineStyle::Accent, "inventory:");
        for fragment in &self.state.inventory {
            let code = self
                .state
                .codes
                .get(fragment)
                .map(String::as_str)
                .unwrap_or("?");
            out.push(LineStyle::Plain, &format!("  {fragment}  {code}"));
        }
        Outcome::ok(out)
    }

    /// `unlock <fragment> <code>`
    pub fn unlock(&mut self, fragment: Fragment, code: &str) -> Outcome {
        if self.state.codes.contains_key(&fragment) {
            return Outcome::ok(Output::styled(
                LineStyle::Muted,
                &format!("{fragment} already unlocked"),
            ));
        }
        let Some(expected) = self.state.expected.as_ref() else {
            return Outcome::fail(Output::error("unlock: no quest in progress (try `fun`)"));
        };
        if !expected.matches(fragment, code) {
            tracing::debug!(fragment = fragment.name(), "unlock rejected");
            return Outcome::fail(Output::error(&format!(
                "✗ {fragment} rejected: code '{}' does not match",
                code.trim()
            )));
        }

        let value = expected.get(fragment).to_string();
        self.state.codes.insert(fragment, value);
        self.state.inventory.insert(fragment);
        self.state.stage = Stage::for_codes(&self.state.codes);
        self.persist();

        let mut out = Output::success(&format!("{fragment} unlocked ✓"));
        match self.state.stage.fragment() {
            Some(next) => out.push(LineStyle::Muted, &format!("next fragment: {next}")),
            None => out.push(
                LineStyle::Accent,
                "All fragments recovered. Type `synthesize` to finish.",
            ),
        };
        Outcome::ok(out)
    }

    /// `synthesize`: finish a complete quest and unlock `warp`
    pub fn synthesize(&mut self) -> Outcome {
        if self.state.stage != Stage::Complete || !self.state.all_unlocked() {
            let missing: Vec<&str> = Fragment::ALL
                .iter()
                .filter(|f| !self.state.codes.contains_key(*f))
                .map(|f| f.label())
                .collect();
            return Outcome::fail(Output::error(&format!(
                "synthesize: missing fragments: {}",
                missing.join(", ")
            )));
        }
        self.state.active = false;
        self.state.synthesized = true;
        self.persist();

        let mut out = Output::new();
        out.push(LineStyle::Success, "Fragments fused. Key synthesized ✓");
        out.push(
            LineStyle::Accent,
            "New verb unlocked: `warp <random|page>` (this session)",
        );
        Outcome::ok(out)
    }

    /// `abort quest`: back to inactive, storage cleared
    pub fn abort(&mut self) -> Outcome {
        let was_active = self.state.active || self.state.has_progress();
        self.state = QuestState::default();
        storage::remove_quietly(self.storage.as_ref(), QUEST_STATE_KEY);
        storage::remove_quietly(self.storage.as_ref(), QUEST_EXPECTED_KEY);
        tracing::debug!("quest aborted");
        if was_active {
            Outcome::ok(Output::warning("Quest aborted. All fragments discarded."))
        } else {
            Outcome::ok(Output::styled(LineStyle::Muted, "No quest in progress."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::fixtures::sample_portfolio;
    use crate::storage::failing::FailingStorage;
    use crate::storage::MemoryStorage;

    fn machine(storage: Arc<MemoryStorage>) -> QuestMachine {
        QuestMachine::restore(storage, InsecureObfuscator::for_host("folio.test"))
    }

    #[test]
    fn test_unlock_in_order_advances_stage() {
        let p = sample_portfolio();
        let mut q = machine(Arc::new(MemoryStorage::new()));
        assert_eq!(q.ensure_active(&p), Activation::Started);
        assert_eq!(q.state().stage, Stage::Alpha);

        assert!(q.unlock(Fragment::Alpha, "w202").success);
        assert_eq!(q.state().stage, Stage::Beta);
        assert!(q.unlock(Fragment::Beta, "RUS02").success);
        assert_eq!(q.state().stage, Stage::Gamma);
        assert!(q.unlock(Fragment::Gamma, "0206").success);
        assert_eq!(q.state().stage, Stage::Complete);
    }

    #[test]
    fn test_wrong_code_rejected_without_mutation() {
        let p = sample_portfolio();
        let mut q = machine(Arc::new(MemoryStorage::new()));
        q.ensure_active(&p);
        let before = q.state().clone();
        let outcome = q.unlock(Fragment::Alpha, "NOPE");
        assert!(!outcome.success);
        assert!(outcome.output.text().contains("rejected"));
        assert_eq!(q.state(), &before);
    }

    #[test]
    fn test_repeat_unlock_is_idempotent() {
        let p = sample_portfolio();
        let mut q = machine(Arc::new(MemoryStorage::new()));
        q.ensure_active(&p);
        q.unlock(Fragment::Alpha, "W202");
        let before = q.state().clone();
        let outcome = q.unlock(Fragment::Alpha, "W202");
        assert!(outcome.output.text().contains("already unlocked"));
        assert_eq!(q.state(), &before);
    }

    #[test]
    fn test_out_of_order_completion() {
        let p = sample_portfolio();
        let mut q = machine(Arc::new(MemoryStorage::new()));
        q.ensure_active(&p);
        q.unlock(Fragment::Gamma, "0206");
        assert_eq!(q.state().stage, Stage::Alpha);
        q.unlock(Fragment::Beta, "rus02");
        assert_eq!(q.state().stage, Stage::Alpha);
        q.unlock(Fragment::Alpha, "W202");
        assert_eq!(q.state().stage, Stage::Complete);
    }

    #[test]
    fn test_synthesize_requires_all_fragments() {
        let p = sample_portfolio();
        let mut q = machine(Arc::new(MemoryStorage::new()));
        q.ensure_active(&p);
        q.unlock(Fragment::Alpha, "W202");
        let outcome = q.synthesize();
        assert!(!outcome.success);
        assert!(outcome.output.text().contains("BETA, GAMMA"));
        assert!(q.is_active());

        q.unlock(Fragment::Beta, "RUS02");
        q.unlock(Fragment::Gamma, "0206");
        assert!(q.synthesize().success);
        assert!(!q.is_active());
        assert!(q.state().synthesized);
        assert!(q.warp_unlocked());
    }

    #[test]
    fn test_abort_resets_from_any_stage() {
        let p = sample_portfolio();
        let storage = Arc::new(MemoryStorage::new());
        let mut q = machine(storage.clone());
        q.ensure_active(&p);
        q.unlock(Fragment::Alpha, "W202");
        q.abort();
        assert_eq!(q.state(), &QuestState::default());
        assert!(storage.is_empty());

        // Aborting while inactive is harmless
        assert!(q.abort().success);
        assert!(!q.is_active());
    }

    #[test]
    fn test_progress_resumes_after_reload() {
        let p = sample_portfolio();
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut q = machine(storage.clone());
            q.ensure_active(&p);
            q.unlock(Fragment::Alpha, "W202");
        }
        let mut q = machine(storage.clone());
        assert_eq!(q.state().stage, Stage::Beta);
        assert!(q.state().active);
        assert_eq!(q.ensure_active(&p), Activation::AlreadyActive);
        assert!(q.state().codes.contains_key(&Fragment::Alpha));
    }

    #[test]
    fn test_expected_survives_dataset_change_within_session() {
        let mut p = sample_portfolio();
        let mut q = machine(Arc::new(MemoryStorage::new()));
        q.ensure_active(&p);
        p.projects.clear();
        assert!(q.unlock(Fragment::Gamma, "0206").success);
    }

    #[test]
    fn test_corrupt_storage_starts_fresh() {
        let p = sample_portfolio();
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(QUEST_STATE_KEY, r#"{"active":false,"stage":"gamma"}"#)
            .unwrap();
        storage.set(QUEST_EXPECTED_KEY, "v1.%%%garbage").unwrap();
        let mut q = machine(storage.clone());
        assert!(!q.is_active());
        assert_eq!(q.ensure_active(&p), Activation::Started);
        assert_eq!(q.state().stage, Stage::Alpha);
        assert!(storage
            .get(QUEST_EXPECTED_KEY)
            .unwrap()
            .unwrap()
            .starts_with("v1."));
    }

    #[test]
    fn test_inactive_stored_progress_resumes() {
        let p = sample_portfolio();
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut q = machine(storage.clone());
            q.ensure_active(&p);
            q.unlock(Fragment::Alpha, "W202");
            q.unlock(Fragment::Beta, "RUS02");
            q.unlock(Fragment::Gamma, "0206");
            q.synthesize();
        }
        let mut q = machine(storage);
        assert!(!q.is_active());
        assert!(q.warp_unlocked());
        assert_eq!(q.ensure_active(&p), Activation::Resumed);
        assert!(q.state().synthesized);
    }

    #[test]
    fn test_disabled_storage_still_playable() {
        let p = sample_portfolio();
        let mut q = QuestMachine::restore(
            Arc::new(FailingStorage),
            InsecureObfuscator::for_host("folio.test"),
        );
        assert_eq!(q.ensure_active(&p), Activation::Started);
        assert!(q.unlock(Fragment::Alpha, "W202").success);
    }

    #[test]
    fn test_diagnostics_do_not_mutate() {
        let p = sample_portfolio();
        let mut q = machine(Arc::new(MemoryStorage::new()));
        q.ensure_active(&p);
        let before = q.state().clone();
        q.scan(&p);
        q.inspect(&InspectTarget::Skills, &p);
        q.inspect(&InspectTarget::Keywords, &p);
        q.status();
        q.help();
        q.inventory();
        assert_eq!(q.state(), &before);
    }
}
