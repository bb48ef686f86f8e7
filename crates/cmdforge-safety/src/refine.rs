//! Target-aware classification for the three families that need more than
//! a fixed pattern match: `rm`, `dd`, and `chmod`. Each needs the actual
//! argument
//! inspected rather than a fixed regex, so they are handled here instead
//! of in [`super::patterns::TABLE`].

use cmdforge_core::model::DangerLevel;

fn last_non_flag<'a>(tokens: &'a [String]) -> Option<&'a str> {
    tokens.iter().rev().find(|t| !t.starts_with('-')).map(String::as_str)
}

fn has_short_flag(tokens: &[String], letters: &[char]) -> bool {
    tokens
        .iter()
        .skip(1)
        .any(|t| t.starts_with('-') && !t.starts_with("--") && letters.iter().any(|c| t.contains(*c)))
}

fn has_long_flag(tokens: &[String], name: &str) -> bool {
    tokens.iter().skip(1).any(|t| t == name)
}

/// `rm`: file deletion at the filesystem root is Critical; a recursive
/// delete scoped to `/tmp`, `./`, or an unexpanded relative path is
/// downgraded to Dangerous; one reaching through `$HOME`/`$USER`/`~` or a
/// wildcard is Dangerous; anything else recursive stays Critical as the
/// conservative default.
pub fn classify_rm(tokens: &[String]) -> Option<(DangerLevel, &'static str)> {
    if tokens.first().map(String::as_str) != Some("rm") {
        return None;
    }
    let recursive = has_short_flag(tokens, &['r', 'R']) || has_long_flag(tokens, "--recursive");
    if !recursive {
        return None;
    }
    let force = has_short_flag(tokens, &['f']) || has_long_flag(tokens, "--force");
    let target = last_non_flag(tokens).unwrap_or("");

    let is_root = target == "/" || target == "/*";
    let is_scoped = target.starts_with("/tmp")
        || target.starts_with("./")
        || (!target.starts_with('/') && !target.starts_with('$') && !target.contains('~'));
    let is_expansion = target.contains('*') || target.starts_with("$HOME") || target.starts_with("$USER") || target.contains('~');

    let level = if is_root {
        DangerLevel::Critical
    } else if is_scoped {
        DangerLevel::Dangerous
    } else if is_expansion {
        DangerLevel::Dangerous
    } else if force {
        DangerLevel::Critical
    } else {
        DangerLevel::Dangerous
    };

    Some((level, "recursively deletes files"))
}

/// `dd`: writing to a `/dev/*` target is Critical; writing to an ordinary
/// regular file is not destructive enough to flag at all.
pub fn classify_dd(tokens: &[String]) -> Option<(DangerLevel, &'static str)> {
    if tokens.first().map(String::as_str) != Some("dd") {
        return None;
    }
    let of_arg = tokens.iter().skip(1).find(|t| t.starts_with("of="))?;
    let path = &of_arg["of=".len()..];
    if path.starts_with("/dev/") {
        Some((DangerLevel::Critical, "writes raw data to a block device"))
    } else {
        None
    }
}

fn is_weak_mode(mode: &str) -> bool {
    let numeric = mode.len() == 3 && mode.starts_with('7') && mode.chars().all(|c| c.is_ascii_digit());
    let symbolic = (mode.starts_with('a') || mode.starts_with('o')) && mode.contains("+w");
    numeric || symbolic
}

/// `chmod`: weakening permissions is Warning by default, upgraded to
/// Dangerous when the target sits under a system directory.
pub fn classify_chmod(tokens: &[String]) -> Option<(DangerLevel, &'static str)> {
    if tokens.first().map(String::as_str) != Some("chmod") {
        return None;
    }
    let mode = tokens.get(1)?;
    if !is_weak_mode(mode) {
        return None;
    }
    let target = tokens.iter().skip(2).find(|t| !t.starts_with('-'))?;
    const SYSTEM_DIRS: [&str; 5] = ["/etc", "/usr", "/bin", "/sbin", "/boot"];
    let level = if SYSTEM_DIRS.iter().any(|d| target.starts_with(d)) {
        DangerLevel::Dangerous
    } else {
        DangerLevel::Warning
    };
    Some((level, "weakens file permissions"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::split;

    #[test]
    fn rm_root_is_critical() {
        let (level, _) = classify_rm(&split("rm -rf /")).unwrap();
        assert_eq!(level, DangerLevel::Critical);
    }

    #[test]
    fn rm_relative_path_is_downgraded() {
        let (level, _) = classify_rm(&split("rm -rf ./build")).unwrap();
        assert_eq!(level, DangerLevel::Dangerous);
    }

    #[test]
    fn rm_home_expansion_is_dangerous() {
        let (level, _) = classify_rm(&split("rm -rf $HOME/.cache")).unwrap();
        assert_eq!(level, DangerLevel::Dangerous);
    }

    #[test]
    fn dd_to_device_is_critical() {
        let (level, _) = classify_dd(&split("dd if=/dev/zero of=/dev/sda")).unwrap();
        assert_eq!(level, DangerLevel::Critical);
    }

    #[test]
    fn dd_to_regular_file_is_not_flagged() {
        assert!(classify_dd(&split("dd if=/dev/zero of=/tmp/out.img")).is_none());
    }

    #[test]
    fn chmod_system_dir_is_dangerous() {
        let (level, _) = classify_chmod(&split("chmod 777 /etc/passwd")).unwrap();
        assert_eq!(level, DangerLevel::Dangerous);
    }

    #[test]
    fn chmod_elsewhere_is_warning() {
        let (level, _) = classify_chmod(&split("chmod 777 ./script.sh")).unwrap();
        assert_eq!(level, DangerLevel::Warning);
    }
}
