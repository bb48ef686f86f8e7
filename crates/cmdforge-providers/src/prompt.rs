//! Prompt construction shared by every vendor module.

use cmdforge_core::model::Context;

/// Context detail beyond this is summarized rather than listed — vendors
/// charge per token and the file list is the least essential part of the
/// prompt.
const MAX_FILES_LISTED: usize = 40;
const MAX_FILE_NAME_CHARS: usize = 80;

pub fn truncate_for_prompt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push('\u{2026}');
    truncated
}

fn sanitize_single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

fn file_list_block(context: &Context) -> String {
    if context.files.is_empty() {
        return "(empty directory)".to_string();
    }

    let mut lines: Vec<String> = context
        .files
        .iter()
        .take(MAX_FILES_LISTED)
        .map(|f| {
            let name = truncate_for_prompt(&sanitize_single_line(&f.name), MAX_FILE_NAME_CHARS);
            if f.is_directory {
                format!("{name}/")
            } else {
                format!("{name} ({} bytes)", f.size)
            }
        })
        .collect();

    if context.files.len() > MAX_FILES_LISTED || context.truncated {
        lines.push(format!("... {} more entries not shown", context.files.len().saturating_sub(MAX_FILES_LISTED)));
    }

    lines.join("\n")
}

fn git_block(context: &Context) -> String {
    match &context.git {
        None => "not a git repository".to_string(),
        Some(git) => {
            let branch = git.current_branch.as_deref().unwrap_or("(detached HEAD)");
            let dirty = if git.has_uncommitted_changes { "dirty" } else { "clean" };
            format!("branch {branch}, working tree {dirty}")
        }
    }
}

/// System prompt for command generation (C3 `generate_command`).
pub fn system_prompt_for_generation(context: &Context) -> String {
    format!(
        "You translate a user's natural-language request into a single shell command to run on their machine.\n\
         Working directory: {}\n\
         Git state: {}\n\
         Files in the working directory:\n{}\n\n\
         Reply with a JSON object of the shape {{\"command\": string, \"explanation\": string, \"confidence\": number between 0 and 1, \"alternatives\": array of strings}}. \
         Reply with that JSON object only, no surrounding prose.",
        context.working_directory.display(),
        git_block(context),
        file_list_block(context),
    )
}

/// System prompt for judging a completed execution (C7 `validate_result`).
pub fn system_prompt_for_validation() -> String {
    "You judge whether a shell command's execution satisfied the user's original intent. \
     You will be given the intent, the command that ran, and its combined stdout/stderr/exit-code output. \
     Reply with a JSON object of the shape {\"is_correct\": bool, \"explanation\": string, \"suggestions\": array of strings, \"corrected_command\": string or null}. \
     Reply with that JSON object only, no surrounding prose."
        .to_string()
}

pub fn validation_user_message(command: &str, combined_output: &str, intent: &str) -> String {
    format!(
        "INTENT:\n{intent}\n\nCOMMAND:\n{command}\n\nOUTPUT:\n{combined_output}",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn context_with(files: Vec<&str>) -> Context {
        Context {
            working_directory: PathBuf::from("/home/user/project"),
            files: files
                .into_iter()
                .map(|name| cmdforge_core::model::FileEntry {
                    name: name.to_string(),
                    is_directory: false,
                    size: 10,
                    modified_at: None,
                })
                .collect(),
            truncated: false,
            git: None,
            environment: BTreeMap::new(),
            gathered_at: Utc::now(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn truncation_appends_ellipsis_only_when_needed() {
        assert_eq!(truncate_for_prompt("short", 10), "short");
        assert_eq!(truncate_for_prompt("abcdefghij", 5), "abcde\u{2026}");
    }

    #[test]
    fn generation_prompt_includes_working_directory_and_files() {
        let context = context_with(vec!["a.txt", "b.rs"]);
        let prompt = system_prompt_for_generation(&context);
        assert!(prompt.contains("/home/user/project"));
        assert!(prompt.contains("a.txt"));
        assert!(prompt.contains("not a git repository"));
    }

    #[test]
    fn file_list_notes_truncation_beyond_the_cap() {
        let names: Vec<String> = (0..50).map(|i| format!("file{i}.txt")).collect();
        let mut context = context_with(Vec::new());
        context.files = names
            .iter()
            .map(|name| cmdforge_core::model::FileEntry {
                name: name.clone(),
                is_directory: false,
                size: 1,
                modified_at: None,
            })
            .collect();
        let block = file_list_block(&context);
        assert!(block.contains("more entries not shown"));
    }
}
