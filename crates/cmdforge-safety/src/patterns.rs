//! The base pattern table, grouped the way
//! `vtcode-core`'s `command_safety` groups its registry rules: destructive
//! filesystem operations, system control, privilege escalation,
//! firewall/network, and device writes. Simple patterns are declarative
//! (a regex plus a fixed level); `rm`/`dd`/`chmod` need their target
//! argument inspected, so those three are handled by dedicated functions
//! in [`super::refine`] instead of forced into the declarative shape.

use cmdforge_core::model::DangerLevel;
use once_cell::sync::Lazy;
use regex::Regex;

pub struct PatternEntry {
    pub id: &'static str,
    pub description: &'static str,
    pub level: DangerLevel,
    regex: Regex,
}

impl PatternEntry {
    pub fn is_match(&self, command: &str) -> bool {
        self.regex.is_match(command)
    }
}

fn entry(id: &'static str, description: &'static str, level: DangerLevel, pattern: &str) -> PatternEntry {
    PatternEntry {
        id,
        description,
        level,
        regex: Regex::new(pattern).unwrap_or_else(|e| panic!("invalid builtin pattern {id}: {e}")),
    }
}

/// Patterns checked by straight regex match, no target-aware refinement.
/// Declaration order doubles as match order, so warnings accumulate in a
/// stable, predictable sequence.
pub static TABLE: Lazy<Vec<PatternEntry>> = Lazy::new(|| {
    vec![
        // System control.
        entry(
            "system-shutdown",
            "shuts down, reboots, or halts the system",
            DangerLevel::Critical,
            r"(?i)^\s*(sudo\s+)?(shutdown|reboot|halt|poweroff)\b",
        ),
        entry(
            "mkfs-partition",
            "creates a filesystem or repartitions a device",
            DangerLevel::Critical,
            r"(?i)^\s*(sudo\s+)?(mkfs(\.\w+)?|fdisk|parted|sfdisk|gdisk)\b",
        ),
        entry(
            "kill-init",
            "kills the init/systemd process",
            DangerLevel::Critical,
            r"(?i)^\s*(sudo\s+)?(kill(all)?|pkill)\b.*\b(1|systemd|init)\b",
        ),
        // Privilege escalation.
        entry(
            "privilege-escalation",
            "elevates privileges via sudo, doas, or su",
            DangerLevel::Dangerous,
            r"(?i)^\s*(sudo|doas|su)\b",
        ),
        // Firewall / network service control.
        entry(
            "firewall-flush",
            "flushes firewall rules",
            DangerLevel::Dangerous,
            r"(?i)\biptables\b.*-F\b|\bufw\s+disable\b",
        ),
        entry(
            "network-service-stop",
            "stops ssh or networking services",
            DangerLevel::Dangerous,
            r"(?i)\b(systemctl|service)\s+stop\s+(ssh|sshd|network(ing)?)\b",
        ),
        // Device writes.
        entry(
            "device-write-redirect",
            "writes directly to a device node",
            DangerLevel::Warning,
            r"(?i)>\s*/dev/(?!null|zero|random|urandom)\S",
        ),
        // Filesystem moves/copies into system directories.
        entry(
            "move-into-system-dir",
            "moves or copies into a system directory",
            DangerLevel::Warning,
            r"(?i)^\s*(sudo\s+)?(mv|cp)\b.*\s(/etc|/usr|/bin|/sbin)(/|\s|$)",
        ),
        entry(
            "change-ownership",
            "changes file ownership",
            DangerLevel::Warning,
            r"(?i)^\s*(sudo\s+)?(chown|chgrp)\b",
        ),
        // Remote code execution via pipe-to-shell.
        entry(
            "pipe-to-shell",
            "pipes a network fetch into a shell",
            DangerLevel::Warning,
            r"(?i)(curl|wget)\b[^|]*\|\s*(sudo\s+)?(sh|bash|zsh)\b",
        ),
        // Environment mutation.
        entry(
            "path-mutation",
            "unsets or overwrites the PATH environment variable",
            DangerLevel::Warning,
            r"(?i)(^|;|&&)\s*(unset\s+PATH|export\s+PATH=|PATH=)",
        ),
        entry(
            "umask-weaken",
            "sets an overly permissive umask",
            DangerLevel::Warning,
            r"(?i)^\s*umask\s+0*0\b",
        ),
    ]
});
