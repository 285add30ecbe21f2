//! Boot configuration directives and the idempotent "ensure line present"
//! primitive every configuration mutation routes through.
//!
//! Pure functions only — no I/O, no async, no filesystem access. The remote
//! side only ever sees the text these functions decide to append.

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// Default boot configuration file on Raspberry Pi OS.
pub const DEFAULT_BOOT_CONFIG_PATH: &str = "/boot/config.txt";

/// Keys that legitimately repeat with different values (one overlay per line).
const MULTI_VALUED_KEYS: &[&str] = &["dtoverlay", "dtparam"];

// ── ConfigDirective ──────────────────────────────────────────────────────────

/// A single `key=value` or bare-flag line that must appear exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfigDirective(String);

impl ConfigDirective {
    /// Build a directive from its line text. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty, spans several lines, or is a
    /// comment.
    pub fn new(text: &str) -> Result<Self, ConfigError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.contains(['\n', '\r']) || trimmed.starts_with('#') {
            return Err(ConfigError::InvalidValue {
                key: "boot_config directive".to_string(),
                value: text.to_string(),
                valid: "a single non-comment `key=value` or flag line".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The exact line text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before `=`, or the whole flag.
    #[must_use]
    pub fn key(&self) -> &str {
        line_key(&self.0)
    }
}

impl TryFrom<String> for ConfigDirective {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ConfigDirective> for String {
    fn from(value: ConfigDirective) -> Self {
        value.0
    }
}

impl std::fmt::Display for ConfigDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn line_key(line: &str) -> &str {
    line.split_once('=').map_or(line, |(key, _)| key).trim()
}

// ── PeripheralConflict ───────────────────────────────────────────────────────

/// Enabling `peripheral` requires disabling a subsystem on the same line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralConflict {
    /// Human-readable name of the peripheral being enabled.
    pub peripheral: String,
    /// Directive that enables the peripheral.
    pub enable: ConfigDirective,
    /// Directive that disables the conflicting subsystem.
    pub disable: ConfigDirective,
}

impl PeripheralConflict {
    /// The full resolution set: enable first, then disable.
    #[must_use]
    pub fn resolve(&self) -> [&ConfigDirective; 2] {
        [&self.enable, &self.disable]
    }
}

impl Default for PeripheralConflict {
    /// The A9G modem sits on the primary UART, which Bluetooth claims by default.
    fn default() -> Self {
        Self {
            peripheral: "uart".to_string(),
            enable: ConfigDirective("enable_uart=1".to_string()),
            disable: ConfigDirective("dtoverlay=disable-bt".to_string()),
        }
    }
}

// ── ensure_line_present ──────────────────────────────────────────────────────

/// Predicate matching a line whose trimmed text equals `line` exactly.
pub fn exact_line(line: &str) -> impl Fn(&str) -> bool + '_ {
    move |candidate| candidate.trim() == line
}

/// Return `content` with `line` appended unless some line already satisfies
/// `matches`.
///
/// Appending keeps the file line-oriented: a missing trailing newline is added
/// before the new line, and the new line always ends in `\n`. Applying the same
/// line twice yields byte-identical output to applying it once.
#[must_use]
pub fn ensure_line_present(content: &str, line: &str, matches: impl Fn(&str) -> bool) -> String {
    if content.lines().any(matches) {
        return content.to_string();
    }
    let mut out = String::with_capacity(content.len() + line.len() + 2);
    out.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(line);
    out.push('\n');
    out
}

/// Outcome of applying a set of directives to a file's current content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectivePlan {
    /// Directives already present, skipped.
    pub present: Vec<ConfigDirective>,
    /// Directives that will be appended.
    pub missing: Vec<ConfigDirective>,
    /// Exact bytes to append to the file. Empty when nothing is missing.
    pub append: String,
    /// Existing lines sharing a key with a directive but carrying a different value.
    pub same_key_lines: Vec<String>,
}

impl DirectivePlan {
    /// Whether applying the plan changes the file.
    #[must_use]
    pub fn changes_file(&self) -> bool {
        !self.append.is_empty()
    }
}

/// Plan the idempotent application of `directives` to `content`.
///
/// Matching is exact-text per line. A line with the same key but a different
/// value is not treated as satisfying the directive; it is only surfaced in
/// [`DirectivePlan::same_key_lines`] so the caller can warn about it.
#[must_use]
pub fn plan_directives<'a>(
    content: &str,
    directives: impl IntoIterator<Item = &'a ConfigDirective>,
) -> DirectivePlan {
    let mut plan = DirectivePlan::default();
    let mut current = content.to_string();
    for directive in directives {
        let next = ensure_line_present(&current, directive.as_str(), exact_line(directive.as_str()));
        if next.len() == current.len() {
            if !plan.present.contains(directive) {
                plan.present.push(directive.clone());
            }
        } else {
            plan.missing.push(directive.clone());
            current = next;
        }
        if MULTI_VALUED_KEYS.contains(&directive.key()) {
            continue;
        }
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed == directive.as_str() {
                continue;
            }
            if line_key(trimmed) == directive.key() && !plan.same_key_lines.iter().any(|l| l == trimmed) {
                plan.same_key_lines.push(trimmed.to_string());
            }
        }
    }
    plan.append = current[content.len()..].to_string();
    plan
}
