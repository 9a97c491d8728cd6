//! Line editor and tab completion through the public API
//!
//! Tests cover:
//! - Caret and buffer invariants under arbitrary key sequences
//! - Grapheme-aware caret movement over emoji
//! - Completion candidates and cycling against a real dataset
//! - Tab handling inside a terminal

use folio_term::completion::CompletionContext;
use folio_term::{
    Completion, CompletionEngine, EditOutcome, Key, LineEditor, Portfolio, RouteTable, Terminal,
    TerminalConfig, TerminalServices,
};
use proptest::prelude::*;

fn dataset() -> Portfolio {
    Portfolio::from_json_str(
        r#"{
          "projects": [
            { "id": "pixel-synth", "name": "Pixel Synth", "date": "2021-06", "skills": ["Rust"] },
            { "id": "pinball", "name": "Pinball", "date": "2022-02", "skills": ["C++"] }
          ]
        }"#,
    )
    .unwrap()
}

fn key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        prop::sample::select(vec!['a', 'z', ' ', 'é', '👍', '\u{301}']).prop_map(Key::Char),
        Just(Key::Insert("🇯🇵x".to_string())),
        Just(Key::Enter { soft: true }),
        Just(Key::Backspace),
        Just(Key::Delete),
        Just(Key::Left),
        Just(Key::Right),
        Just(Key::Home),
        Just(Key::End),
        Just(Key::Up),
        Just(Key::Down),
    ]
}

proptest! {
    #[test]
    fn prop_caret_stays_inside_buffer(keys in prop::collection::vec(key_strategy(), 0..40)) {
        let mut editor = LineEditor::new();
        editor.history_mut().push("echo 👋 hi");
        for key in &keys {
            editor.handle_key(key);
            let buffer = editor.buffer();
            prop_assert!(editor.caret() <= buffer.len());
            prop_assert!(buffer.is_char_boundary(editor.caret()));

            let view = editor.caret_view();
            let rebuilt = format!("{}{}{}", view.before, view.under.unwrap_or(""), view.after);
            prop_assert_eq!(rebuilt.as_str(), buffer);
        }
    }

    #[test]
    fn prop_candidates_extend_what_was_typed(typed in "[a-z]{0,6}") {
        let routes = RouteTable::from_portfolio(&dataset());
        let ctx = CompletionContext { routes: &routes, warp_unlocked: false };
        for candidate in CompletionEngine::candidates(&typed, &ctx) {
            prop_assert!(candidate.starts_with(&typed), "{candidate} vs {typed}");
        }
    }
}

#[test]
fn test_arrows_step_over_emoji() {
    let mut editor = LineEditor::new();
    editor.handle_key(&Key::Insert("a👍🏽b".to_string()));
    editor.handle_key(&Key::Left);
    editor.handle_key(&Key::Left);
    assert_eq!(editor.caret(), 1);
    assert_eq!(editor.caret_view().under, Some("👍🏽"));

    editor.handle_key(&Key::Delete);
    assert_eq!(editor.buffer(), "ab");
}

#[test]
fn test_cd_completes_project_routes() {
    let routes = RouteTable::from_portfolio(&dataset());
    let ctx = CompletionContext {
        routes: &routes,
        warp_unlocked: false,
    };
    let mut engine = CompletionEngine::new();

    assert_eq!(
        engine.complete("cd projects/p", &ctx),
        Completion::Extended("cd projects/pi".to_string())
    );
    match engine.complete("cd projects/pi", &ctx) {
        Completion::Cycled { value, candidates, .. } => {
            assert_eq!(candidates.len(), 2);
            assert_eq!(value, candidates[0]);
            let next = engine.complete(&value, &ctx);
            assert!(matches!(next, Completion::Cycled { index: 1, .. }));
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_tab_in_terminal_fills_input() {
    let mut config = TerminalConfig::default();
    config.animation.boot_enabled = false;
    let mut term = Terminal::new(config, dataset(), TerminalServices::in_memory());

    term.handle_key(&Key::Insert("insp".to_string()));
    assert_eq!(term.handle_key(&Key::Tab), EditOutcome::CompletionRequested);
    assert_eq!(term.input(), "inspect");

    term.handle_key(&Key::Char(' '));
    term.handle_key(&Key::Char('k'));
    term.handle_key(&Key::Tab);
    assert_eq!(term.input(), "inspect keywords");
}
