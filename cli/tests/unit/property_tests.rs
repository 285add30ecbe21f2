//! Property-based tests for idempotent line application, manifest parsing
//! and shell quoting.

use proptest::prelude::*;

use cane_deploy::domain::boot_config::plan_directives;
use cane_deploy::domain::manifest::Comparator;
use cane_deploy::domain::{
    ConfigDirective, DependencyManifest, PeripheralConflict, ensure_line_present, exact_line, shell,
};

/// Undo POSIX quoting as produced by `shell::quote` (plain words and
/// single-quoted strings with `'\''` escapes).
fn unquote(quoted: &str) -> String {
    let mut out = String::new();
    let mut chars = quoted.chars().peekable();
    let mut in_quotes = false;
    while let Some(c) = chars.next() {
        match c {
            '\'' => in_quotes = !in_quotes,
            '\\' if !in_quotes => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn config_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_]{1,12}=[a-z0-9,-]{1,12}",
        "# [ -~]{0,30}",
        Just(String::new()),
        Just("[all]".to_string()),
    ]
}

// ============================================================================
// ensure_line_present() / plan_directives()
// ============================================================================

proptest! {
    /// Applying a line twice is byte-identical to applying it once.
    #[test]
    fn prop_ensure_line_present_is_idempotent(
        lines in prop::collection::vec(config_line(), 0..12),
        trailing_newline in any::<bool>(),
        line in "[a-z_]{1,12}=[a-z0-9-]{1,8}",
    ) {
        let mut content = lines.join("\n");
        if trailing_newline && !content.is_empty() {
            content.push('\n');
        }
        let once = ensure_line_present(&content, &line, exact_line(&line));
        let twice = ensure_line_present(&once, &line, exact_line(&line));
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.lines().any(|l| l.trim() == line));
        prop_assert!(once.starts_with(&content));
    }

    /// The line is appended only when no line already equals it.
    #[test]
    fn prop_ensure_line_present_never_duplicates(
        lines in prop::collection::vec(config_line(), 0..12),
        line in "[a-z_]{1,12}=[a-z0-9-]{1,8}",
    ) {
        let content = lines.join("\n");
        let before = content.lines().filter(|l| l.trim() == line).count();
        let out = ensure_line_present(&content, &line, exact_line(&line));
        let after = out.lines().filter(|l| l.trim() == line).count();
        prop_assert_eq!(after, before.max(1));
    }

    /// After appending the planned text, a second plan changes nothing.
    #[test]
    fn prop_directive_plan_converges(
        lines in prop::collection::vec(config_line(), 0..12),
    ) {
        let content = lines.join("\n");
        let conflict = PeripheralConflict::default();
        let first = plan_directives(&content, conflict.resolve());
        let applied = format!("{content}{}", first.append);
        let second = plan_directives(&applied, conflict.resolve());
        prop_assert!(!second.changes_file());
        prop_assert_eq!(second.present.len(), 2);
    }
}

#[test]
fn test_directive_plan_reports_same_key_line_but_not_multi_valued() {
    let content = "enable_uart=0\ndtoverlay=vc4-kms-v3d\n";
    let enable = ConfigDirective::new("enable_uart=1").expect("directive");
    let disable = ConfigDirective::new("dtoverlay=disable-bt").expect("directive");
    let plan = plan_directives(content, [&enable, &disable]);
    assert_eq!(plan.same_key_lines, vec!["enable_uart=0".to_string()]);
    assert_eq!(plan.append, "enable_uart=1\ndtoverlay=disable-bt\n");
}

// ============================================================================
// DependencyManifest::parse()
// ============================================================================

proptest! {
    /// Well-formed entries parse in order with their constraint intact.
    #[test]
    fn prop_manifest_parses_well_formed_entries(
        entries in prop::collection::vec(
            (
                "[a-z][a-z0-9_-]{0,15}",
                prop::option::of((prop_oneof![Just("=="), Just(">=")], "[0-9]{1,2}(\\.[0-9]{1,2}){0,2}")),
                prop::option::of("[a-zA-Z ]{1,20}"),
            ),
            1..10,
        ),
    ) {
        let text: String = entries
            .iter()
            .map(|(name, constraint, comment)| {
                let mut line = name.clone();
                if let Some((cmp, version)) = constraint {
                    line.push_str(cmp);
                    line.push_str(version);
                }
                if let Some(c) = comment {
                    line.push_str("  # ");
                    line.push_str(c);
                }
                line.push('\n');
                line
            })
            .collect();

        let manifest = DependencyManifest::parse(&text).expect("well-formed manifest");
        prop_assert_eq!(manifest.len(), entries.len());
        for (parsed, (name, constraint, _)) in manifest.entries.iter().zip(&entries) {
            prop_assert_eq!(&parsed.name, name);
            let expected = constraint.as_ref().map(|(cmp, version)| {
                let cmp = if *cmp == "==" { Comparator::Exact } else { Comparator::AtLeast };
                (cmp, version.clone())
            });
            prop_assert_eq!(&parsed.constraint, &expected);
        }
    }

    /// Comments and blank lines never produce entries.
    #[test]
    fn prop_manifest_skips_comment_lines(comments in prop::collection::vec("#[ -~]{0,30}", 0..10)) {
        let text = comments.join("\n\n");
        let manifest = DependencyManifest::parse(&text).expect("comments only");
        prop_assert!(manifest.is_empty());
    }
}

// ============================================================================
// shell::quote()
// ============================================================================

proptest! {
    /// Quoting is reversible by a POSIX shell.
    #[test]
    fn prop_quote_round_trips_through_posix_rules(arg in "[ -~]{0,40}") {
        let quoted = shell::quote(&arg);
        prop_assert_eq!(unquote(&quoted), arg);
    }

    /// Plain words are passed through untouched.
    #[test]
    fn prop_quote_leaves_plain_words(arg in "[A-Za-z0-9_./=-]{1,40}") {
        let quoted = shell::quote(&arg);
        prop_assert_eq!(quoted.as_ref(), arg.as_str());
    }
}
