//! Line-mode REPL around the terminal core
//!
//! Reads one line at a time from stdin and prints the scrollback entries each
//! line produces. Animations are skipped. Navigation requests are printed
//! instead of followed.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use folio_term::bus::UiObserver;
use folio_term::completion::CompletionContext;
use folio_term::{
    CompletionEngine, EventBus, FileStorage, LineStyle, MemoryStorage, Output, Portfolio,
    StorageScopes, Terminal, TerminalConfig, TerminalServices, UiEvent,
};

#[derive(Parser, Debug)]
#[command(name = "folio-term")]
#[command(about = "Interactive portfolio terminal in line mode", long_about = None)]
#[command(version)]
struct Args {
    /// Portfolio dataset (JSON with `projects` and `skills`)
    #[arg(short, long, value_name = "PATH", env = "FOLIO_PORTFOLIO")]
    portfolio: Option<PathBuf>,

    /// Terminal configuration (YAML, or JSON by extension)
    #[arg(short, long, value_name = "PATH", env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Persist local storage (quest progress, preferences) in this file
    #[arg(long, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Print completion candidates for TEXT and exit
    #[arg(long, value_name = "TEXT")]
    complete: Option<String>,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,
}

/// Prints navigation requests to stderr
struct NavigationPrinter;

impl UiObserver for NavigationPrinter {
    fn on_event(&self, event: &UiEvent) {
        if let UiEvent::NavigationRequested { route } = event {
            eprintln!("-> navigate {route}");
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TerminalConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TerminalConfig::default(),
    };
    let portfolio = match &args.portfolio {
        Some(path) => Portfolio::from_json_file(path)
            .with_context(|| format!("loading portfolio from {}", path.display()))?,
        None => Portfolio::default(),
    };

    if let Some(text) = &args.complete {
        let routes = folio_term::RouteTable::from_portfolio(&portfolio);
        let ctx = CompletionContext {
            routes: &routes,
            warp_unlocked: false,
        };
        for candidate in CompletionEngine::candidates(text, &ctx) {
            println!("{candidate}");
        }
        return Ok(());
    }

    let local: Arc<dyn folio_term::Storage> = match &args.state {
        Some(path) => Arc::new(
            FileStorage::open(path)
                .with_context(|| format!("opening state file {}", path.display()))?,
        ),
        None => Arc::new(MemoryStorage::new()),
    };
    let storage = StorageScopes::new(local, Arc::new(MemoryStorage::new()));
    let bus = Arc::new(EventBus::new());
    bus.subscribe(Arc::new(NavigationPrinter));

    let mut term = Terminal::new(config, portfolio, TerminalServices::new(storage, bus));
    term.mount();
    term.finish_animations();

    let mut stdout = io::stdout().lock();
    let color = !args.no_color;
    for entry in term.entries() {
        print_output(&mut stdout, &entry.output, color)?;
    }

    let prompt = term.prompt().to_string();
    let stdin = io::stdin();
    loop {
        write!(stdout, "{prompt} ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }

        let before = term.entries().len();
        term.submit(line);
        term.finish_animations();

        // `clear` can shrink scrollback; print whatever is new either way
        let cleared = term.entries().len() <= before;
        let start = if cleared { 0 } else { before };
        if cleared && color {
            write!(stdout, "\x1b[2J\x1b[H")?;
        }
        for entry in &term.entries()[start..] {
            print_output(&mut stdout, &entry.output, color)?;
        }
    }
    Ok(())
}

fn print_output(out: &mut impl Write, output: &Output, color: bool) -> io::Result<()> {
    for line in &output.lines {
        let code = match line.style {
            LineStyle::Plain => None,
            LineStyle::Accent => Some("36"),
            LineStyle::Success => Some("32"),
            LineStyle::Warning => Some("33"),
            LineStyle::Error => Some("31"),
            LineStyle::Muted => Some("2"),
        };
        match code {
            Some(code) if color => writeln!(out, "\x1b[{code}m{}\x1b[0m", line.text)?,
            _ => writeln!(out, "{}", line.text)?,
        }
    }
    Ok(())
}
