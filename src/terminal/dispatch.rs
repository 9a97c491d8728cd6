//! Command execution
//!
//! A submitted line is split into `;` segments and `&&` steps, every step is
//! parsed into a [`Command`] and dispatched through one exhaustive `match`.
//! The outputs of all steps land in a single scrollback entry.

use rand::Rng;

use crate::animation::RevealUnit;
use crate::bus::UiEvent;
use crate::command::{split_chain, step_count, verb_of, Command, UnlockArgs, COMMANDS};
use crate::content::{self, ASCII_BANNER, FORTUNES, JOKES, MATRIX_COLUMNS, MATRIX_ROWS};
use crate::output::{now_millis, CommandEntry, LineStyle, Outcome, Output};
use crate::prefs::Theme;
use crate::quest::QuestMachine;
use crate::sync::SyncMessage;

use super::Terminal;

/// Accumulated result of one submitted line
#[derive(Debug, Default)]
struct LineRun {
    output: Output,
    /// A `clear` ran; scrollback goes before this line's entry is added
    cleared: bool,
    /// Reveal the entry with the typewriter
    typewriter: bool,
}

impl Terminal {
    /// Execute a submitted line and record it in scrollback
    pub(super) fn run_submitted(&mut self, line: &str) {
        let timestamp = now_millis();
        let run = self.run_line(line);

        if run.cleared {
            self.entries.clear();
            self.animator.discard_all();
            self.broadcast(SyncMessage::clear(self.instance_id.clone()));
            if run.output.is_empty() {
                return;
            }
        }

        let command_text = line.trim();
        let entry = CommandEntry::new(command_text, run.output, timestamp);
        self.entries.push(entry.clone());

        let animation = &self.config.animation;
        if run.typewriter && animation.typewriter_interval_ms > 0 {
            let index = self.entries.len() - 1;
            self.entries[index].output = Output::new();
            self.animator.start(
                index,
                entry.output.clone(),
                RevealUnit::Chars(animation.typewriter_chars_per_tick),
                animation.typewriter_interval_ms,
            );
        }

        self.broadcast(SyncMessage::exec(
            self.instance_id.clone(),
            entry,
            command_text,
            self.quest.state().clone(),
        ));
    }

    fn run_line(&mut self, line: &str) -> LineRun {
        let segments = split_chain(line);
        let chained = step_count(&segments) > 1;
        let mut run = LineRun::default();

        for segment in &segments {
            for step in &segment.steps {
                if chained && Command::is_chain_forbidden(step) {
                    let verb = verb_of(step);
                    run.output.push(
                        LineStyle::Warning,
                        &format!("{verb}: not allowed in a command chain, run it on its own"),
                    );
                    // A refused cd fails its && group; fun and matrix are skipped
                    if verb == "cd" {
                        break;
                    }
                    continue;
                }

                let command = Command::parse(step);
                let clears = command == Command::Clear;
                run.typewriter |= command == Command::Fun;
                tracing::debug!(?command, chained, "dispatching command");

                let outcome = self.execute(command);
                if clears {
                    run.cleared = true;
                    run.output = Output::new();
                } else {
                    run.output.extend(outcome.output);
                }
                if !outcome.success {
                    break;
                }
            }
        }
        run
    }

    /// Run a single parsed command
    pub fn execute(&mut self, command: Command) -> Outcome {
        let notice = if command.is_quest_verb() {
            QuestMachine::activation_notice(self.quest.ensure_active(&self.portfolio))
        } else {
            None
        };

        let mut outcome = match command {
            Command::Empty => Outcome::ok(Output::new()),
            Command::Help => self.help(),
            Command::About => self.about(),
            Command::Projects => self.projects(),
            Command::Skills => self.skills(),
            Command::Contact => self.contact(),
            Command::Resume => self.resume(),
            Command::Clear => Outcome::ok(Output::new()),
            Command::Joke => Outcome::ok(Output::plain(content::pick(&mut self.rng, JOKES))),
            Command::Fortune => {
                Outcome::ok(Output::plain(content::pick(&mut self.rng, FORTUNES)))
            }
            Command::Ascii => Outcome::ok(Output::styled(
                LineStyle::Accent,
                ASCII_BANNER.trim_matches('\n'),
            )),
            Command::Matrix => {
                let rows = content::matrix_rain(&mut self.rng, MATRIX_COLUMNS, MATRIX_ROWS);
                Outcome::ok(Output::styled(LineStyle::Success, &rows.join("\n")))
            }
            Command::Cowsay(text) => Outcome::ok(Output::plain(&content::cowsay(&text))),
            Command::Echo(text) => Outcome::ok(Output::plain(&text)),
            Command::History => self.history(),
            Command::Favorites => self.favorites(),
            Command::Theme(arg) => self.theme(arg.as_deref()),
            Command::Cd(target) => self.cd(&target),
            Command::Fun => self.quest.intro(),
            Command::Scan => self.quest.scan(&self.portfolio),
            Command::Inspect(target) => self.quest.inspect(&target, &self.portfolio),
            Command::QuestStatus => self.quest.status(),
            Command::QuestHelp => self.quest.help(),
            Command::Inventory => self.quest.inventory(),
            Command::Unlock(UnlockArgs::Attempt { fragment, code }) => {
                self.quest.unlock(fragment, &code)
            }
            Command::Unlock(UnlockArgs::UnknownFragment(name)) => Outcome::fail(Output::error(
                &format!("unlock: unknown fragment '{name}' (alpha, beta or gamma)"),
            )),
            Command::Unlock(UnlockArgs::Usage) => {
                Outcome::fail(Output::warning("usage: unlock <alpha|beta|gamma> <code>"))
            }
            Command::Synthesize => self.quest.synthesize(),
            Command::AbortQuest => self.quest.abort(),
            Command::Warp(target) => self.warp(&target),
            Command::Unknown(input) => {
                Outcome::fail(Output::error(&format!("command not found: {input}")))
            }
        };

        if let Some(mut notice) = notice {
            notice.extend(outcome.output);
            outcome.output = notice;
        }
        outcome
    }

    fn help(&self) -> Outcome {
        let show_secret = self.quest.warp_unlocked();
        let mut out = Output::styled(LineStyle::Accent, "Available commands:");
        for spec in COMMANDS.iter().filter(|c| show_secret || !c.secret) {
            out.push(
                LineStyle::Plain,
                &format!("  {:<28}{}", spec.usage, spec.summary),
            );
        }
        out.push(
            LineStyle::Muted,
            "Chain with `;` or `&&`. Tab completes, Up/Down recall history.",
        );
        Outcome::ok(out)
    }

    fn about(&self) -> Outcome {
        let owner = &self.config.owner;
        let mut out = Output::styled(
            LineStyle::Accent,
            &format!("{} | {}", owner.name, owner.title),
        );
        out.push(LineStyle::Plain, &owner.bio);
        Outcome::ok(out)
    }

    fn projects(&self) -> Outcome {
        if self.portfolio.projects.is_empty() {
            return Outcome::ok(Output::styled(LineStyle::Muted, "no projects yet"));
        }
        let mut out = Output::styled(LineStyle::Accent, "Projects:");
        for project in &self.portfolio.projects {
            let star = if self.services.prefs.is_favorite(&project.id) {
                "★"
            } else {
                " "
            };
            let year: String = project.date.chars().take(4).collect();
            out.push(
                LineStyle::Plain,
                &format!("{star} {:<28}{year:<6}cd projects/{}", project.name, project.id),
            );
        }
        Outcome::ok(out)
    }

    fn skills(&self) -> Outcome {
        let mut out = Output::styled(LineStyle::Accent, "Skills:");
        if self.portfolio.skills.is_empty() {
            let all: Vec<String> = self.portfolio.all_skills().into_iter().collect();
            out.push(LineStyle::Plain, &format!("  {}", all.join(", ")));
        }
        for group in &self.portfolio.skills {
            out.push(
                LineStyle::Plain,
                &format!("  {}: {}", group.category, group.items.join(", ")),
            );
        }
        Outcome::ok(out)
    }

    fn contact(&self) -> Outcome {
        let owner = &self.config.owner;
        let mut out = Output::styled(LineStyle::Accent, "Contact:");
        out.push(LineStyle::Plain, &format!("  email     {}", owner.email));
        if let Some(github) = &owner.github {
            out.push(LineStyle::Plain, &format!("  github    {github}"));
        }
        if let Some(linkedin) = &owner.linkedin {
            out.push(LineStyle::Plain, &format!("  linkedin  {linkedin}"));
        }
        Outcome::ok(out)
    }

    fn resume(&self) -> Outcome {
        match &self.config.owner.resume_url {
            Some(url) => Outcome::ok(Output::plain(&format!("Resume: {url}"))),
            None => Outcome::fail(Output::warning("resume: not available")),
        }
    }

    fn history(&self) -> Outcome {
        let mut out = Output::new();
        for (i, line) in self.editor.history().entries().iter().enumerate() {
            out.push(LineStyle::Plain, &format!("{:>4}  {line}", i + 1));
        }
        Outcome::ok(out)
    }

    fn favorites(&self) -> Outcome {
        let favorites = self.services.prefs.favorites();
        if favorites.is_empty() {
            return Outcome::ok(Output::styled(LineStyle::Muted, "no favorites yet"));
        }
        let mut out = Output::styled(LineStyle::Accent, "Favorites:");
        for id in favorites {
            let name = self
                .portfolio
                .project(&id)
                .map_or(id.as_str(), |p| p.name.as_str());
            out.push(LineStyle::Plain, &format!("  ★ {name}"));
        }
        Outcome::ok(out)
    }

    fn theme(&self, arg: Option<&str>) -> Outcome {
        let prefs = &self.services.prefs;
        let theme = match arg {
            None => return Outcome::ok(Output::plain(&format!("theme: {}", prefs.theme()))),
            Some("toggle") => prefs.toggle_theme(),
            Some(value) => match Theme::parse(value) {
                Some(theme) => {
                    prefs.set_theme(theme);
                    theme
                }
                None => {
                    return Outcome::fail(Output::warning("usage: theme [dark|light|toggle]"))
                }
            },
        };
        Outcome::ok(Output::success(&format!("theme set to {theme}")))
    }

    fn cd(&mut self, target: &str) -> Outcome {
        if target.trim().is_empty() {
            return Outcome::fail(Output::warning("usage: cd <page>"));
        }
        match self.routes.resolve(target) {
            Some(route) => self.navigate(route),
            None => Outcome::fail(Output::error(&format!("cd: no such page: {target}"))),
        }
    }

    fn warp(&mut self, target: &str) -> Outcome {
        if !self.quest.warp_unlocked() {
            return Outcome::fail(Output::error(
                "warp: locked. Recover all three fragments first (try `fun`).",
            ));
        }
        let target = target.trim().to_lowercase();
        match target.as_str() {
            "" => Outcome::fail(Output::warning("usage: warp <random|page>")),
            "random" | "projects" => {
                let ids = self.routes.project_ids();
                if ids.is_empty() {
                    return Outcome::fail(Output::warning("warp: no projects to warp to"));
                }
                let id = ids[self.rng.random_range(0..ids.len())].clone();
                self.navigate(format!("/projects/{id}"))
            }
            other => match self.routes.resolve_top_level(other) {
                Some(route) => self.navigate(route),
                None => Outcome::fail(Output::error(&format!(
                    "warp: destination not found: {other}"
                ))),
            },
        }
    }

    fn navigate(&mut self, route: String) -> Outcome {
        tracing::debug!(%route, "navigation requested");
        let bus = &self.services.bus;
        bus.publish(&UiEvent::CommandPaletteCloseOnNavigate);
        bus.publish(&UiEvent::NavigationRequested {
            route: route.clone(),
        });
        let out = Output::styled(LineStyle::Muted, &format!("navigating to {route} ..."));
        self.last_navigation = Some(route);
        Outcome::ok(out)
    }
}
