//! Quote-respecting command-line lexer. Single and double
//! quotes suppress whitespace splitting; a tab is equivalent to a space;
//! an unclosed quote is an error rather than a silently absorbed token.

#[derive(Debug, PartialEq, Eq)]
pub struct UnclosedQuote(pub char);

impl std::fmt::Display for UnclosedQuote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unclosed {} quote", self.0)
    }
}

pub fn tokenize(input: &str) -> Result<Vec<String>, UnclosedQuote> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    in_token = true;
                }
                ' ' | '\t' => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if let Some(q) = quote {
        return Err(UnclosedQuote(q));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_tabs() {
        assert_eq!(tokenize("echo\thello world").unwrap(), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn quotes_suppress_splitting() {
        assert_eq!(tokenize("echo 'hello world' done").unwrap(), vec!["echo", "hello world", "done"]);
        assert_eq!(tokenize(r#"echo "a b" c"#).unwrap(), vec!["echo", "a b", "c"]);
    }

    #[test]
    fn unclosed_quote_is_an_error() {
        assert_eq!(tokenize("echo 'unterminated").unwrap_err(), UnclosedQuote('\''));
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert_eq!(tokenize("   ").unwrap(), Vec::<String>::new());
    }
}
