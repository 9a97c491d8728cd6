//! Quest data model

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// The three code fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fragment {
    Alpha,
    Beta,
    Gamma,
}

impl Fragment {
    /// Fragments in recommended unlock order
    pub const ALL: [Fragment; 3] = [Fragment::Alpha, Fragment::Beta, Fragment::Gamma];

    /// Parse a fragment name, case-insensitively
    pub fn parse(name: &str) -> Option<Fragment> {
        match name.to_lowercase().as_str() {
            "alpha" => Some(Fragment::Alpha),
            "beta" => Some(Fragment::Beta),
            "gamma" => Some(Fragment::Gamma),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Fragment::Alpha => "alpha",
            Fragment::Beta => "beta",
            Fragment::Gamma => "gamma",
        }
    }

    /// Uppercase label used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Fragment::Alpha => "ALPHA",
            Fragment::Beta => "BETA",
            Fragment::Gamma => "GAMMA",
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Quest progress stage; shows the next recommended fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Alpha,
    Beta,
    Gamma,
    Complete,
}

impl Stage {
    /// Stage for a set of unlocked fragments: first missing one, else complete
    pub fn for_codes<V>(codes: &BTreeMap<Fragment, V>) -> Stage {
        match Fragment::ALL.iter().find(|f| !codes.contains_key(*f)) {
            Some(Fragment::Alpha) => Stage::Alpha,
            Some(Fragment::Beta) => Stage::Beta,
            Some(Fragment::Gamma) => Stage::Gamma,
            None => Stage::Complete,
        }
    }

    /// Fragment this stage recommends
    pub fn fragment(&self) -> Option<Fragment> {
        match self {
            Stage::Alpha => Some(Fragment::Alpha),
            Stage::Beta => Some(Fragment::Beta),
            Stage::Gamma => Some(Fragment::Gamma),
            Stage::Complete => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Alpha => "alpha",
            Stage::Beta => "beta",
            Stage::Gamma => "gamma",
            Stage::Complete => "complete",
        }
    }
}

/// Expected answers, derived from the dataset when the quest starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedCodes {
    pub alpha: String,
    pub beta: String,
    pub gamma: String,
}

impl ExpectedCodes {
    pub fn get(&self, fragment: Fragment) -> &str {
        match fragment {
            Fragment::Alpha => &self.alpha,
            Fragment::Beta => &self.beta,
            Fragment::Gamma => &self.gamma,
        }
    }

    /// Case-insensitive comparison against the expected code
    pub fn matches(&self, fragment: Fragment, code: &str) -> bool {
        self.get(fragment).eq_ignore_ascii_case(code.trim())
    }
}

/// Full quest state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestState {
    pub active: bool,
    pub stage: Stage,
    pub inventory: BTreeSet<Fragment>,
    pub codes: BTreeMap<Fragment, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<ExpectedCodes>,
    /// Set by `synthesize`
    #[serde(default)]
    pub synthesized: bool,
}

impl QuestState {
    /// All three fragments unlocked
    pub fn all_unlocked(&self) -> bool {
        Fragment::ALL.iter().all(|f| self.codes.contains_key(f))
    }

    pub fn has_progress(&self) -> bool {
        !self.codes.is_empty() || self.stage != Stage::Alpha || self.synthesized
    }

    /// The plain (non-obfuscated) half that goes to storage
    pub fn to_persisted(&self) -> PersistedQuest {
        PersistedQuest {
            active: self.active,
            stage: self.stage,
            inventory: self.inventory.clone(),
            codes: self.codes.clone(),
            synthesized: self.synthesized,
        }
    }

    /// Rebuild from the plain half plus decoded expected codes
    ///
    /// Codes that do not match `expected` are dropped and the stage is
    /// recomputed, so a hand-edited storage entry cannot skip the puzzle.
    pub fn from_persisted(persisted: PersistedQuest, expected: ExpectedCodes) -> Self {
        let codes: BTreeMap<Fragment, String> = persisted
            .codes
            .into_iter()
            .filter(|(f, code)| expected.matches(*f, code))
            .collect();
        let inventory = persisted
            .inventory
            .into_iter()
            .filter(|f| codes.contains_key(f))
            .collect();
        Self {
            active: persisted.active,
            stage: Stage::for_codes(&codes),
            synthesized: persisted.synthesized && codes.len() == Fragment::ALL.len(),
            inventory,
            codes,
            expected: Some(expected),
        }
    }
}

/// Plain JSON stored under the quest state key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedQuest {
    pub active: bool,
    pub stage: Stage,
    #[serde(default)]
    pub inventory: BTreeSet<Fragment>,
    #[serde(default)]
    pub codes: BTreeMap<Fragment, String>,
    #[serde(default)]
    pub synthesized: bool,
}
