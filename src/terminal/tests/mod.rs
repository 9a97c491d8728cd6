//! Terminal behavior tests


use std::sync::Arc;

use crate::bus::RecordingObserver;
use crate::config::TerminalConfig;
use crate::editor::Key;
use crate::portfolio::fixtures::sample_portfolio;
use crate::terminal::{Terminal, TerminalServices};

/// Config with every animation switched off
fn still_config() -> TerminalConfig {
    let mut config = TerminalConfig::default();
    config.animation.boot_enabled = false;
    config.animation.typewriter_interval_ms = 0;
    config
}

fn terminal_with(services: TerminalServices) -> Terminal {
    Terminal::new(still_config(), sample_portfolio(), services).with_rng_seed(7)
}

fn terminal() -> Terminal {
    terminal_with(TerminalServices::in_memory())
}

/// Terminal plus a recorder subscribed to its bus
fn observed_terminal() -> (Terminal, Arc<RecordingObserver>) {
    let term = terminal();
    let recorder = Arc::new(RecordingObserver::new());
    term.bus().subscribe(recorder.clone());
    (term, recorder)
}

fn type_text(term: &mut Terminal, text: &str) {
    for c in text.chars() {
        term.handle_key(&Key::Char(c));
    }
}

fn type_line(term: &mut Terminal, text: &str) {
    type_text(term, text);
    term.handle_key(&Key::Enter { soft: false });
}

/// Output text of the newest scrollback entry
fn last_output(term: &Terminal) -> String {
    term.entries()
        .last()
        .map(|e| e.output.text())
        .unwrap_or_default()
}
