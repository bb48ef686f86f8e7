//! Minimal whitespace tokenizer used only for the classifier's family-
//! specific refinement rules (§4.4). This is intentionally simpler than
//! `cmdforge-exec`'s quote-respecting lexer: the classifier only needs to
//! locate the executable name and its non-flag arguments, never to spawn
//! anything, so a best-effort split is sufficient and keeps this crate free
//! of an `cmdforge-exec` dependency.
pub fn split(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}
