//! Stage outcome markers and the colors they print in.

use owo_colors::{OwoColorize as _, Style};

use crate::application::pipeline::StageStatus;

/// How a summary line, doctor check or progress event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Work in flight.
    Step,
    /// The stage changed the board, or a check passed.
    Done,
    /// Nothing to do; the board already matched.
    Unchanged,
    /// An advisory stage failed, or something needs attention later.
    Advisory,
    /// A required stage or a check failed.
    Failed,
    /// Checked and not there, without being a problem.
    Absent,
}

impl Outcome {
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Step => "\u{2192}",
            Self::Done | Self::Unchanged => "\u{2713}",
            Self::Advisory => "!",
            Self::Failed => "\u{2717}",
            Self::Absent => "-",
        }
    }

    /// `Done` or `Failed`.
    #[must_use]
    pub const fn of_check(ok: bool) -> Self {
        if ok { Self::Done } else { Self::Failed }
    }
}

impl From<StageStatus> for Outcome {
    fn from(status: StageStatus) -> Self {
        match status {
            StageStatus::Changed => Self::Done,
            StageStatus::Unchanged => Self::Unchanged,
            StageStatus::Warning => Self::Advisory,
        }
    }
}

/// Colors for outcomes and report layout. `Default` is uncolored.
#[derive(Default, Clone, Copy)]
pub struct Styles {
    pub step: Style,
    pub done: Style,
    pub unchanged: Style,
    pub advisory: Style,
    pub failed: Style,
    /// Stage names in the run summary.
    pub stage: Style,
    /// Report and section titles.
    pub section: Style,
    /// Stage notes, comments and other secondary text.
    pub note: Style,
}

impl Styles {
    /// The terminal palette.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            step: Style::new().blue(),
            done: Style::new().green(),
            unchanged: Style::new().dimmed(),
            advisory: Style::new().yellow(),
            failed: Style::new().red(),
            stage: Style::new().bold().magenta(),
            section: Style::new().bold().cyan(),
            note: Style::new().dimmed(),
        }
    }

    #[must_use]
    pub fn outcome(&self, outcome: Outcome) -> Style {
        match outcome {
            Outcome::Step => self.step,
            Outcome::Done => self.done,
            Outcome::Unchanged | Outcome::Absent => self.unchanged,
            Outcome::Advisory => self.advisory,
            Outcome::Failed => self.failed,
        }
    }

    /// The outcome's glyph in its color.
    #[must_use]
    pub fn mark(&self, outcome: Outcome) -> String {
        outcome.glyph().style(self.outcome(outcome)).to_string()
    }
}
