//! Command parsing
//!
//! Raw input is trimmed, its verb case-folded and matched into a [`Command`].
//! Free-text arguments (`cowsay`, `echo`) keep their original casing. Dispatch
//! happens in the terminal through an exhaustive `match`.

pub mod chain;

pub use chain::{split_chain, step_count, ChainSegment};

use crate::quest::Fragment;

/// Every parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank input
    Empty,
    Help,
    About,
    Projects,
    Skills,
    Contact,
    Resume,
    Clear,
    Joke,
    Fortune,
    Ascii,
    Matrix,
    Cowsay(String),
    Echo(String),
    History,
    Favorites,
    /// `theme` with an optional argument
    Theme(Option<String>),
    /// `cd` with its (possibly empty) target
    Cd(String),

    // Quest verbs
    Fun,
    Scan,
    Inspect(InspectTarget),
    QuestStatus,
    QuestHelp,
    Inventory,
    Unlock(UnlockArgs),
    Synthesize,
    AbortQuest,
    Warp(String),

    /// Anything else; holds the trimmed original input
    Unknown(String),
}

/// `inspect` subjects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectTarget {
    Skills,
    Keywords,
    /// Unrecognized or missing subject; holds what was typed
    Other(String),
}

/// `unlock` arguments as typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockArgs {
    /// Fragment and code both present
    Attempt { fragment: Fragment, code: String },
    /// Fragment name that is not alpha/beta/gamma
    UnknownFragment(String),
    /// Missing fragment or code
    Usage,
}

/// Static metadata for a top-level verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    /// Only listed and completed once unlocked
    pub secret: bool,
}

const fn spec(name: &'static str, usage: &'static str, summary: &'static str) -> CommandSpec {
    CommandSpec {
        name,
        usage,
        summary,
        secret: false,
    }
}

/// Top-level commands in help order
pub const COMMANDS: &[CommandSpec] = &[
    spec("help", "help", "show this list"),
    spec("about", "about", "who I am"),
    spec("projects", "projects", "things I've built"),
    spec("skills", "skills", "tools and languages"),
    spec("contact", "contact", "how to reach me"),
    spec("resume", "resume", "grab the resume"),
    spec("clear", "clear", "wipe the screen"),
    spec("cls", "cls", "same as clear"),
    spec("joke", "joke", "a programmer joke"),
    spec("fortune", "fortune", "a fortune cookie"),
    spec("ascii", "ascii", "banner art"),
    spec("matrix", "matrix", "follow the white rabbit"),
    spec("cowsay", "cowsay <text>", "the cow speaks"),
    spec("echo", "echo <text>", "print text"),
    spec("history", "history", "commands typed so far"),
    spec("favorites", "favorites", "starred projects"),
    spec("theme", "theme [dark|light|toggle]", "show or switch the color theme"),
    spec("cd", "cd <page>", "go to a page"),
    spec("fun", "fun", "something hidden"),
    spec("scan", "scan", "quest: scan the latest project"),
    spec("inspect", "inspect <skills|keywords>", "quest: examine the dataset"),
    spec("quest", "quest <status|help>", "quest: progress and hints"),
    spec("inventory", "inventory", "quest: fragments collected"),
    spec("unlock", "unlock <fragment> <code>", "quest: unlock a fragment"),
    spec("synthesize", "synthesize", "quest: combine all fragments"),
    spec("abort", "abort quest", "quest: give up and reset"),
    CommandSpec {
        name: "warp",
        usage: "warp <random|page>",
        summary: "jump anywhere",
        secret: true,
    },
];

/// Verbs whose arguments tab-complete
pub const MULTI_ARG_VERBS: [&str; 5] = ["cd", "unlock", "inspect", "quest", "warp"];

/// Verbs refused inside a chain
pub const CHAIN_FORBIDDEN: [&str; 3] = ["cd", "fun", "matrix"];

/// Names of the visible top-level commands
pub fn command_names(include_secret: bool) -> impl Iterator<Item = &'static str> {
    COMMANDS
        .iter()
        .filter(move |c| include_secret || !c.secret)
        .map(|c| c.name)
}

/// Lowercased verb of a raw line
pub fn verb_of(raw: &str) -> String {
    raw.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Text after the verb with original casing and inner spacing preserved
fn rest_of(trimmed: &str) -> &str {
    match trimmed.find(char::is_whitespace) {
        Some(i) => trimmed[i..].trim(),
        None => "",
    }
}

impl Command {
    /// Parse one command (no chain operators)
    pub fn parse(raw: &str) -> Command {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        let verb = verb_of(trimmed);
        let rest = rest_of(trimmed);
        let args: Vec<String> = rest.split_whitespace().map(str::to_lowercase).collect();
        let first = args.first().map(String::as_str);

        match verb.as_str() {
            "help" | "?" => Command::Help,
            "about" | "whoami" => Command::About,
            "projects" | "ls" => Command::Projects,
            "skills" => Command::Skills,
            "contact" => Command::Contact,
            "resume" | "cv" => Command::Resume,
            "clear" | "cls" => Command::Clear,
            "joke" => Command::Joke,
            "fortune" => Command::Fortune,
            "ascii" | "banner" => Command::Ascii,
            "matrix" => Command::Matrix,
            "cowsay" => Command::Cowsay(rest.to_string()),
            "echo" => Command::Echo(rest.to_string()),
            "history" => Command::History,
            "favorites" | "favs" => Command::Favorites,
            "theme" => Command::Theme(first.map(str::to_string)),
            "cd" => Command::Cd(rest.to_string()),
            "fun" => Command::Fun,
            "scan" => Command::Scan,
            "inspect" => Command::Inspect(match first {
                Some("skills") => InspectTarget::Skills,
                Some("keywords") => InspectTarget::Keywords,
                other => InspectTarget::Other(other.unwrap_or_default().to_string()),
            }),
            "quest" => match first {
                Some("help") => Command::QuestHelp,
                Some("abort") => Command::AbortQuest,
                _ => Command::QuestStatus,
            },
            "inventory" | "inv" => Command::Inventory,
            "unlock" => Command::Unlock(parse_unlock(rest)),
            "synthesize" => Command::Synthesize,
            "abort" if first == Some("quest") => Command::AbortQuest,
            "warp" => Command::Warp(rest.to_string()),
            _ => Command::Unknown(trimmed.to_string()),
        }
    }

    /// Whether the raw line's verb is refused inside a chain
    pub fn is_chain_forbidden(raw: &str) -> bool {
        CHAIN_FORBIDDEN.contains(&verb_of(raw).as_str())
    }

    /// Quest verbs implicitly start or resume the quest
    pub fn is_quest_verb(&self) -> bool {
        matches!(
            self,
            Command::Fun
                | Command::Scan
                | Command::Inspect(_)
                | Command::QuestStatus
                | Command::QuestHelp
                | Command::Inventory
                | Command::Unlock(_)
                | Command::Synthesize
        )
    }
}

fn parse_unlock(rest: &str) -> UnlockArgs {
    let mut parts = rest.split_whitespace();
    let (Some(fragment), Some(code)) = (parts.next(), parts.next()) else {
        return UnlockArgs::Usage;
    };
    match Fragment::parse(fragment) {
        Some(fragment) => UnlockArgs::Attempt {
            fragment,
            code: code.to_string(),
        },
        None => UnlockArgs::UnknownFragment(fragment.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbs_are_case_folded() {
        assert_eq!(Command::parse("  HELP "), Command::Help);
        assert_eq!(Command::parse("Cls"), Command::Clear);
        assert_eq!(Command::parse(""), Command::Empty);
    }

    #[test]
    fn test_free_text_keeps_casing() {
        assert_eq!(
            Command::parse("cowsay Hello   World!"),
            Command::Cowsay("Hello   World!".to_string())
        );
        assert_eq!(Command::parse("COWSAY"), Command::Cowsay(String::new()));
    }

    #[test]
    fn test_unknown_echoes_original() {
        assert_eq!(
            Command::parse("  Sudo Make-Me  "),
            Command::Unknown("Sudo Make-Me".to_string())
        );
    }

    #[test]
    fn test_quest_verbs() {
        assert_eq!(Command::parse("quest"), Command::QuestStatus);
        assert_eq!(Command::parse("quest status"), Command::QuestStatus);
        assert_eq!(Command::parse("QUEST help"), Command::QuestHelp);
        assert_eq!(Command::parse("abort quest"), Command::AbortQuest);
        assert!(matches!(Command::parse("abort"), Command::Unknown(_)));
        assert_eq!(
            Command::parse("inspect Keywords"),
            Command::Inspect(InspectTarget::Keywords)
        );
    }

    #[test]
    fn test_unlock_parsing() {
        assert_eq!(
            Command::parse("unlock ALPHA wr02"),
            Command::Unlock(UnlockArgs::Attempt {
                fragment: Fragment::Alpha,
                code: "wr02".to_string()
            })
        );
        assert_eq!(Command::parse("unlock alpha"), Command::Unlock(UnlockArgs::Usage));
        assert_eq!(Command::parse("unlock"), Command::Unlock(UnlockArgs::Usage));
        assert_eq!(
            Command::parse("unlock delta 1"),
            Command::Unlock(UnlockArgs::UnknownFragment("delta".to_string()))
        );
    }

    #[test]
    fn test_secret_names_hidden() {
        assert!(!command_names(false).any(|n| n == "warp"));
        assert!(command_names(true).any(|n| n == "warp"));
    }

    #[test]
    fn test_chain_forbidden() {
        assert!(Command::is_chain_forbidden(" CD about"));
        assert!(Command::is_chain_forbidden("matrix"));
        assert!(!Command::is_chain_forbidden("help"));
    }
}
