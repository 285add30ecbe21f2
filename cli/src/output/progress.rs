//! Progress indicators using indicatif

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::output::Outcome;

/// Create a spinner for indeterminate progress.
///
/// # Panics
///
/// Never in practice; the template is a constant.
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
            .template("  {spinner:.cyan} {msg} {elapsed:.dim}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Finish a spinner, leaving `✓ msg` on the line.
pub fn finish_ok(pb: &ProgressBar, msg: &str) {
    finish_with(pb, Outcome::Done, msg);
}

/// Finish a spinner, leaving `! msg` on the line.
pub fn finish_warn(pb: &ProgressBar, msg: &str) {
    finish_with(pb, Outcome::Advisory, msg);
}

fn finish_with(pb: &ProgressBar, outcome: Outcome, msg: &str) {
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {prefix} {msg}")
            .expect("valid template"),
    );
    pb.set_prefix(outcome.glyph());
    pb.finish_with_message(msg.to_string());
}
