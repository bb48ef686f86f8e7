//! Sanity-checks a proposed correction before it reaches the caller: a
//! correction that is a no-op, empty, implausibly long, or itself one of
//! the commands the Safety Classifier would flag as Critical is worse
//! than no correction at all.

use once_cell::sync::Lazy;
use regex::Regex;
use regex::RegexBuilder;

const MAX_CORRECTION_CHARS: usize = 500;

fn builtin(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| unreachable!("invalid builtin deny-list regex {pattern:?}: {e}"))
}

static DENY_LIST: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        builtin(r"rm\s+-[a-z]*r[a-z]*f[a-z]*\s+/\s*$"),
        builtin(r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:"),
        builtin(r"dd\s+if=/dev/zero\s+of=/dev/sd[a-z0-9]*"),
        builtin(r"mkfs\.\S+"),
    ]
});

fn matches_deny_list(candidate: &str) -> bool {
    DENY_LIST.iter().any(|pattern| pattern.is_match(candidate))
}

/// Returns `Some(candidate)` when the correction survives every check,
/// `None` when it should be dropped (the caller keeps the provider's
/// explanation regardless).
pub fn sanitize(original: &str, candidate: &str) -> Option<String> {
    let trimmed = candidate.trim();

    if trimmed.is_empty() {
        return None;
    }
    if trimmed == original.trim() {
        return None;
    }
    if trimmed.chars().count() > MAX_CORRECTION_CHARS {
        return None;
    }
    if matches_deny_list(trimmed) {
        return None;
    }

    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_plausible_correction() {
        assert_eq!(sanitize("rm file", "rm -i file").as_deref(), Some("rm -i file"));
    }

    #[test]
    fn rejects_identical_to_original() {
        assert_eq!(sanitize("ls -la", "ls -la"), None);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(sanitize("ls -la", "   "), None);
    }

    #[test]
    fn rejects_overly_long_corrections() {
        let long = "x".repeat(501);
        assert_eq!(sanitize("ls -la", &long), None);
    }

    #[test]
    fn rejects_deny_list_entries() {
        assert_eq!(sanitize("ls", "rm -rf /"), None);
        assert_eq!(sanitize("ls", ":(){ :|:& };:"), None);
        assert_eq!(sanitize("ls", "dd if=/dev/zero of=/dev/sda"), None);
        assert_eq!(sanitize("ls", "mkfs.ext4 /dev/sdb1"), None);
    }
}
