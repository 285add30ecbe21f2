//! Terminal presentation of stage progress, run summaries and reports.

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use human::HumanRenderer;
pub use reporter::TerminalReporter;
pub use styles::{Outcome, Styles};

/// Where output goes and how it looks.
pub struct OutputContext {
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Suppress everything except errors and machine output.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors only on a terminal, and never under `--no-color` or `NO_COLOR`.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();
        Self {
            styles: if use_colors { Styles::colored() } else { Styles::default() },
            is_tty,
            quiet,
        }
    }

    /// Spinners need a terminal and a non-quiet run.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// `  ✓ message`, marked by outcome.
    pub fn outcome(&self, outcome: Outcome, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", self.styles.mark(outcome));
        }
    }

    /// One run summary row: marker, padded stage name, message.
    pub fn stage_line(&self, outcome: Outcome, stage: &str, msg: &str) {
        if !self.quiet {
            println!(
                "    {} {:<11} {msg}",
                self.styles.mark(outcome),
                stage.style(self.styles.stage)
            );
        }
    }

    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("  {}", title.style(self.styles.section));
        }
    }

    /// A labelled value under a section, label in the note color.
    pub fn field(&self, label: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", label.style(self.styles.note));
        }
    }
}
