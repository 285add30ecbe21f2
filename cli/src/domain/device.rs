//! Device nodes and group membership for the deploying user.

use serde::{Deserialize, Serialize};

/// Paths the modem UART may appear under. `/dev/serial0` is the stable alias;
/// which of the others backs it depends on whether Bluetooth still owns the
/// PL011 UART, so all three are candidates.
pub const SERIAL_CANDIDATES: &[&str] = &["/dev/serial0", "/dev/ttyAMA0", "/dev/ttyS0"];

/// Mode applied to existing candidate nodes.
pub const DEFAULT_NODE_MODE: &str = "666";

/// A device node whose mode is widened when it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNode {
    pub path: String,
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    DEFAULT_NODE_MODE.to_string()
}

impl DeviceNode {
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            mode: default_mode(),
        }
    }
}

/// Default candidate list for the serial modem.
#[must_use]
pub fn serial_candidates() -> Vec<DeviceNode> {
    SERIAL_CANDIDATES.iter().map(|p| DeviceNode::new(p)).collect()
}

/// A `(user, group)` pair that must hold on the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMembership {
    pub user: String,
    pub group: String,
}

impl GroupMembership {
    /// Whether `id -nG` output already lists the group.
    #[must_use]
    pub fn is_satisfied_by(&self, id_output: &str) -> bool {
        parse_groups(id_output).any(|g| g == self.group)
    }
}

/// Whether octal permission bits `actual` grant everything `wanted` does.
///
/// Unparsable modes never cover.
#[must_use]
pub fn mode_covers(actual: &str, wanted: &str) -> bool {
    match (u32::from_str_radix(actual.trim(), 8), u32::from_str_radix(wanted.trim(), 8)) {
        (Ok(actual), Ok(wanted)) => actual & wanted == wanted,
        _ => false,
    }
}

/// Split `id -nG` output into group names.
pub fn parse_groups(id_output: &str) -> impl Iterator<Item = &str> {
    id_output.split_whitespace()
}

/// Groups the deploying user is added to by default.
#[must_use]
pub fn default_groups() -> Vec<String> {
    ["dialout", "gpio", "i2c"].iter().map(ToString::to_string).collect()
}
