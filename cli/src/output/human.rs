//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::application::{PipelineReport, StageReport};
use crate::domain::DependencyManifest;
use crate::domain::config::DeployConfig;
use crate::domain::health::DoctorChecks;
use crate::output::{Outcome, OutputContext};

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("cane-deploy {version}");
    }

    /// Render the run summary. The failure itself is printed by `main`.
    pub fn render_pipeline_report(&self, report: &PipelineReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.section(&format!("Summary for {}", report.target));
        for stage in &report.stages {
            self.render_stage(stage);
        }
        if let Some(failure) = &report.failure {
            self.ctx.stage_line(
                Outcome::Failed,
                failure.stage,
                &failure.source.code().style(self.ctx.styles.note).to_string(),
            );
        }
        println!();

        let elapsed = report.finished_at - report.started_at;
        if report.is_success() {
            self.ctx.outcome(
                Outcome::Done,
                &format!("Deployed in {}", format_elapsed(elapsed.num_seconds())),
            );
        }
        let advisory = report.warnings().count();
        if advisory > 0 {
            self.ctx.outcome(Outcome::Advisory, &format!(
                "{advisory} advisory check{} failed; see the notes above",
                if advisory == 1 { "" } else { "s" }
            ));
        }
        if report.reboot_required() {
            self.ctx.outcome(
                Outcome::Advisory,
                "Boot configuration changed. Reboot the board for UART changes to apply.",
            );
        }
    }

    fn render_stage(&self, stage: &StageReport) {
        self.ctx.stage_line(stage.status.into(), stage.stage, &stage.message);
        for note in &stage.notes {
            println!("      {}", note.style(self.ctx.styles.note));
        }
    }

    /// Render doctor results.
    pub fn render_doctor(&self, checks: &DoctorChecks, issues: &[String]) {
        println!();
        println!(
            "  {}",
            format!("Board Health Check ({})", checks.target).style(self.ctx.styles.section)
        );
        println!();

        self.print_check(checks.reachable, "reachable over ssh");
        if let Some(board) = &checks.board {
            self.print_check(board.passwordless_sudo, "passwordless sudo");
            println!();

            println!("  Boot config ({}):", board.boot_config.path);
            for d in &board.boot_config.present {
                self.print_check(true, d);
            }
            for d in &board.boot_config.missing {
                self.print_check(false, &format!("{d} (missing)"));
            }
            for line in &board.boot_config.conflicting {
                self.print_line(Outcome::Advisory, &format!("{line} (conflicts)"));
            }
            println!();

            println!("  Groups ({}):", board.groups.user);
            println!(
                "    {} {}",
                "member of:".style(self.ctx.styles.note),
                board.groups.member_of.join(" ")
            );
            for g in &board.groups.missing {
                self.print_check(false, &format!("{g} (missing)"));
            }
            println!();

            println!("  Serial devices:");
            for node in &board.serial_nodes {
                if !node.exists {
                    self.print_line(Outcome::Absent, &format!("{} (absent)", node.path));
                    continue;
                }
                let link = node.links_to.as_ref().map(|t| format!(" \u{2192} {t}")).unwrap_or_default();
                let mode = node.mode.as_ref().map(|m| format!(" (mode {m})")).unwrap_or_default();
                self.print_check(!node.is_too_narrow(), &format!("{}{link}{mode}", node.path));
            }
            if board.bluetooth_active {
                self.print_line(Outcome::Advisory, "Bluetooth controller active");
            }
            println!();

            println!("  Deployment:");
            self.print_check(board.udev_rules.exists, &format!("udev rules {}", board.udev_rules.path));
            self.print_check(board.venv.exists, &format!("virtualenv {}", board.venv.path));
        }

        println!();
        if issues.is_empty() {
            println!("  {} Board is ready.", self.ctx.styles.mark(Outcome::Done));
        } else {
            println!(
                "  {} Found {} issue{}:",
                self.ctx.styles.mark(Outcome::Failed),
                issues.len(),
                if issues.len() == 1 { "" } else { "s" },
            );
            for issue in issues {
                self.print_line(Outcome::Failed, issue);
            }
            println!();
            println!("  Run: cane-deploy deploy");
        }
        println!();
    }

    /// Render the parsed dependency manifest.
    pub fn render_manifest(&self, manifest: &DependencyManifest, path: &Path) {
        if self.ctx.quiet {
            return;
        }
        self.ctx
            .section(&format!("{} ({} packages)", path.display(), manifest.len()));
        for entry in &manifest.entries {
            match &entry.comment {
                Some(comment) => println!(
                    "    {:<32} {}",
                    entry.to_string(),
                    format!("# {comment}").style(self.ctx.styles.note)
                ),
                None => println!("    {entry}"),
            }
        }
    }

    /// Render the effective configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn render_config(&self, config: &DeployConfig, path: &Path) -> anyhow::Result<()> {
        let source = if path.exists() { "" } else { ", not present: defaults" };
        println!();
        println!(
            "  {}",
            format!("Configuration ({}{source})", path.display()).style(self.ctx.styles.section)
        );
        println!();
        let yaml = serde_yaml::to_string(config)?;
        for line in yaml.lines() {
            println!("  {line}");
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.section));
        for var in ["CANE_DEPLOY_CONFIG", "CANE_HOST", "CANE_USER", "CANE_PORT", "CANE_DEST", "NO_COLOR"] {
            println!(
                "    {:<20} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
        Ok(())
    }

    fn print_check(&self, ok: bool, msg: &str) {
        self.print_line(Outcome::of_check(ok), msg);
    }

    fn print_line(&self, outcome: Outcome, msg: &str) {
        println!("    {} {msg}", self.ctx.styles.mark(outcome));
    }
}

// ── Display helpers ──────────────────────────────────────────────────────────

/// `42s`, `3m 05s`, `1h 02m`.
#[must_use]
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}
