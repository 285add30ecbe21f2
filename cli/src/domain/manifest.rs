//! Dependency manifest parsing (`requirements.txt` style).
//!
//! One entry per line: `name[comparator version]  [# comment]`. Comments are
//! kept as free text and never interpreted.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::error::ManifestError;

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[A-Za-z0-9][A-Za-z0-9._\-]*(?:\[[A-Za-z0-9,._\-]+\])?)\s*(?:(?P<cmp>[=<>!~]{1,3})\s*(?P<version>[^\s#]+))?\s*(?:#\s*(?P<comment>.*))?$",
    )
    .expect("valid manifest regex")
});

/// Version comparator accepted in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparator {
    /// `==`
    #[serde(rename = "==")]
    Exact,
    /// `>=`
    #[serde(rename = ">=")]
    AtLeast,
}

impl Comparator {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "==",
            Self::AtLeast => ">=",
        }
    }
}

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub name: String,
    pub constraint: Option<(Comparator, String)>,
    pub comment: Option<String>,
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some((cmp, version)) = &self.constraint {
            write!(f, "{}{version}", cmp.as_str())?;
        }
        Ok(())
    }
}

/// Ordered list of manifest entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyManifest {
    pub entries: Vec<ManifestEntry>,
}

impl DependencyManifest {
    /// Parse manifest text. Blank lines and whole-line comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first malformed line, numbered from 1.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut entries = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            entries.push(parse_entry(idx + 1, line)?);
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry(line: usize, text: &str) -> Result<ManifestEntry, ManifestError> {
    let caps = ENTRY_RE.captures(text).ok_or_else(|| ManifestError::InvalidEntry {
        line,
        text: text.to_string(),
    })?;

    let constraint = match (caps.name("cmp"), caps.name("version")) {
        (Some(cmp), Some(version)) => {
            let comparator = match cmp.as_str() {
                "==" => Comparator::Exact,
                ">=" => Comparator::AtLeast,
                other => {
                    return Err(ManifestError::UnsupportedComparator {
                        line,
                        comparator: other.to_string(),
                    });
                }
            };
            Some((comparator, version.as_str().to_string()))
        }
        _ => None,
    };

    let comment = caps
        .name("comment")
        .map(|c| c.as_str().trim().to_string())
        .filter(|c| !c.is_empty());

    Ok(ManifestEntry {
        name: caps["name"].to_string(),
        constraint,
        comment,
    })
}
