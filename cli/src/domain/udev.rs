//! udev rule rendering.

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// Default rules file installed on the board.
pub const DEFAULT_RULES_PATH: &str = "/etc/udev/rules.d/99-cane.rules";

/// Maps a device subsystem to an owning group and access mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdevRule {
    pub subsystem: String,
    pub group: String,
    pub mode: String,
}

impl UdevRule {
    #[must_use]
    pub fn new(subsystem: &str, group: &str, mode: &str) -> Self {
        Self {
            subsystem: subsystem.to_string(),
            group: group.to_string(),
            mode: mode.to_string(),
        }
    }

    /// `SUBSYSTEM=="<name>", GROUP="<group>", MODE="<mode>"`
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "SUBSYSTEM==\"{}\", GROUP=\"{}\", MODE=\"{}\"",
            self.subsystem, self.group, self.mode
        )
    }

    /// # Errors
    ///
    /// Returns an error if a field is empty or contains a quote, or the mode is
    /// not an octal permission string.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("udev.subsystem", &self.subsystem), ("udev.group", &self.group)] {
            if value.is_empty() || value.contains(['"', '\n']) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                    valid: "a non-empty name without quotes".to_string(),
                });
            }
        }
        if !is_octal_mode(&self.mode) {
            return Err(ConfigError::InvalidValue {
                key: "udev.mode".to_string(),
                value: self.mode.clone(),
                valid: "an octal mode such as 0660".to_string(),
            });
        }
        Ok(())
    }
}

/// Whether `mode` is a three- or four-digit octal permission string.
#[must_use]
pub fn is_octal_mode(mode: &str) -> bool {
    (3..=4).contains(&mode.len()) && mode.chars().all(|c| ('0'..='7').contains(&c))
}

/// Rules installed by default: GPIO sensors and I2C (MPU6050).
///
/// The modem UART gets no rule. A `SUBSYSTEM=="tty"` match covers every
/// terminal, `/dev/tty` and `/dev/ptmx` included, and would narrow the
/// serial nodes the hardware stage widened. `dialout` membership covers it.
#[must_use]
pub fn default_rules() -> Vec<UdevRule> {
    vec![
        UdevRule::new("gpio", "gpio", "0660"),
        UdevRule::new("i2c-dev", "i2c", "0660"),
    ]
}

/// Full rules file content, one rule per line, newline terminated.
#[must_use]
pub fn render_rules(rules: &[UdevRule]) -> String {
    let mut out = String::from("# Installed by cane-deploy\n");
    for rule in rules {
        out.push_str(&rule.render());
        out.push('\n');
    }
    out
}
