//! `DryRun` — never spawns anything. Parses the command,
//! predicts what would happen, and runs a per-family structural sanity
//! check over argument arity.

use cmdforge_core::model::Command;
use cmdforge_core::model::DryRunResult;
use cmdforge_core::model::FindingSeverity;
use cmdforge_core::model::ValidationFinding;

use crate::lexer;

fn known_description(program: &str) -> Option<&'static str> {
    Some(match program {
        "rm" => "deletes files or directories",
        "cp" => "copies files or directories",
        "mv" => "moves or renames files or directories",
        "mkdir" => "creates a directory",
        "git" => "runs a git subcommand",
        "ls" => "lists directory contents",
        "cat" => "prints file contents",
        "kill" | "pkill" | "killall" => "sends a signal to a process",
        "sudo" | "doas" | "su" => "runs a command with elevated privileges",
        "ssh" => "opens a remote shell connection",
        "curl" | "wget" => "fetches a remote resource",
        _ => return None,
    })
}

fn family_hazards(program: &str, args: &[String]) -> Vec<String> {
    let mut hazards = Vec::new();
    match program {
        "rm" => hazards.push("rm is destructive: matched files are unrecoverable".to_string()),
        "sudo" | "doas" | "su" => hazards.push("runs with elevated privileges".to_string()),
        "ssh" => hazards.push("opens a connection to a remote host".to_string()),
        "curl" | "wget" if args.iter().any(|a| a == "|") => hazards.push("pipes a network fetch into a shell".to_string()),
        _ => {}
    }
    hazards
}

fn structural_findings(program: &str, args: &[String]) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    let non_flag_count = args.iter().filter(|a| !a.starts_with('-')).count();

    match program {
        "cp" | "mv" if non_flag_count < 2 => findings.push(ValidationFinding {
            severity: FindingSeverity::Error,
            text: format!("{program} requires at least two arguments (source and destination)"),
        }),
        "mkdir" if non_flag_count < 1 => findings.push(ValidationFinding {
            severity: FindingSeverity::Error,
            text: "mkdir requires at least one directory argument".to_string(),
        }),
        "kill" | "pkill" | "killall" if non_flag_count < 1 => findings.push(ValidationFinding {
            severity: FindingSeverity::Error,
            text: format!("{program} requires at least one pid or name argument"),
        }),
        _ => {}
    }

    if program == "rm" {
        let combined_flags: String = args.iter().filter(|a| a.starts_with('-') && !a.starts_with("--")).cloned().collect();
        if combined_flags.contains('r') && combined_flags.contains('f') {
            findings.push(ValidationFinding {
                severity: FindingSeverity::Warn,
                text: "recursive, forced delete: no confirmation prompt will occur inside the shell itself".to_string(),
            });
        }
    }

    findings
}

pub fn dry_run(command: &Command, default_working_directory: &std::path::Path) -> DryRunResult {
    let tokens = match lexer::tokenize(&command.generated) {
        Ok(t) if !t.is_empty() => t,
        Ok(_) => {
            return DryRunResult {
                command_id: command.id,
                analysis: "parsing failed".to_string(),
                predictions: vec!["command is empty after tokenization".to_string()],
                findings: vec![ValidationFinding {
                    severity: FindingSeverity::Error,
                    text: "empty command".to_string(),
                }],
            }
        }
        Err(e) => {
            return DryRunResult {
                command_id: command.id,
                analysis: "parsing failed".to_string(),
                predictions: vec![format!("could not parse command: {e}")],
                findings: vec![ValidationFinding {
                    severity: FindingSeverity::Error,
                    text: e.to_string(),
                }],
            }
        }
    };

    let program = tokens[0].as_str();
    let args = &tokens[1..];

    let analysis = known_description(program).unwrap_or("will execute the specified command").to_string();

    let mut predictions = Vec::new();
    match which::which(program) {
        Ok(path) => predictions.push(format!("executable resolves to {}", path.display())),
        Err(_) => predictions.push(format!("executable '{program}' was not found on PATH")),
    }

    let working_dir = command.working_directory.as_deref().unwrap_or(default_working_directory);
    if working_dir.is_dir() {
        predictions.push(format!("working directory {} exists", working_dir.display()));
    } else {
        predictions.push(format!("working directory {} does not exist", working_dir.display()));
    }
    predictions.push(format!("timeout is {:?}", command.timeout));
    predictions.extend(family_hazards(program, args));

    DryRunResult {
        command_id: command.id,
        analysis,
        predictions,
        findings: structural_findings(program, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdforge_core::model::Context;
    use std::path::PathBuf;
    use std::time::Duration;

    fn context() -> Context {
        Context {
            working_directory: PathBuf::from("/tmp"),
            files: Vec::new(),
            truncated: false,
            git: None,
            environment: Default::default(),
            gathered_at: chrono::Utc::now(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn never_spawns_and_flags_cp_arity() {
        let cmd = Command::new(1, "copy it", "cp onlyone", context(), Duration::from_secs(5));
        let result = dry_run(&cmd, std::path::Path::new("/tmp"));
        assert!(result.findings.iter().any(|f| f.text.contains("at least two arguments")));
    }

    #[test]
    fn rm_rf_gets_a_warning_finding() {
        let cmd = Command::new(1, "clean", "rm -rf /tmp/scratch", context(), Duration::from_secs(5));
        let result = dry_run(&cmd, std::path::Path::new("/tmp"));
        assert!(result.findings.iter().any(|f| matches!(f.severity, FindingSeverity::Warn)));
    }

    #[test]
    fn unclosed_quote_reports_parse_failure() {
        let cmd = Command::new(1, "broken", "echo 'oops", context(), Duration::from_secs(5));
        let result = dry_run(&cmd, std::path::Path::new("/tmp"));
        assert_eq!(result.analysis, "parsing failed");
    }
}
