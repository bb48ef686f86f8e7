//! Environment-variable precedence chain.

/// Candidate variable names in precedence order, provider/kind uppercased.
pub fn candidates(provider: &str, kind: &str) -> Vec<String> {
    let p = provider.to_uppercase();
    let k = kind.to_uppercase();
    vec![
        format!("{p}_{k}_API_KEY"),
        format!("{p}_API_KEY"),
        format!("{p}_{k}_KEY"),
        format!("{p}_KEY"),
        format!("{p}_{k}_TOKEN"),
        format!("{p}_TOKEN"),
    ]
}

/// First non-empty candidate, or `None` if every one is unset/empty.
pub fn resolve(provider: &str, kind: &str) -> Option<String> {
    candidates(provider, kind).into_iter().find_map(|name| std::env::var(&name).ok().filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_order_matches_spec() {
        assert_eq!(
            candidates("openai", "api_key"),
            vec![
                "OPENAI_API_KEY_API_KEY",
                "OPENAI_API_KEY",
                "OPENAI_API_KEY_KEY",
                "OPENAI_KEY",
                "OPENAI_API_KEY_TOKEN",
                "OPENAI_TOKEN",
            ]
        );
    }

    #[test]
    fn first_non_empty_wins() {
        std::env::remove_var("ACME_TOKEN_API_KEY");
        std::env::remove_var("ACME_API_KEY");
        std::env::set_var("ACME_TOKEN_KEY", "from-key-var");
        std::env::set_var("ACME_KEY", "should-not-win");

        assert_eq!(resolve("acme", "token").as_deref(), Some("from-key-var"));

        std::env::remove_var("ACME_TOKEN_KEY");
        std::env::remove_var("ACME_KEY");
    }
}
