//! Utility functions for notification channels

/// Maximum length for mail bodies echoed into logs
pub const MAX_BODY_LENGTH: usize = 4000;

/// Truncate a string to the specified maximum length
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated]", &s[..end])
    }
}

/// Splits a free-form recipient field into individual addresses.
///
/// Tokens are separated by commas or newlines and trimmed; anything
/// without an `@` is silently dropped.
///
/// # Examples
///
/// ```
/// use ace_notify::utils::parse_email_tokens;
///
/// let tokens = parse_email_tokens("a@bank.example, b@bank.example\nnot-an-address");
/// assert_eq!(tokens, vec!["a@bank.example", "b@bank.example"]);
/// ```
pub fn parse_email_tokens(raw: &str) -> Vec<String> {
    raw.split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.contains('@'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 5), "hello... [truncated]");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "告警内容";
        let out = truncate_string(s, 4);
        assert!(out.ends_with("[truncated]"));
    }

    #[test]
    fn tokens_split_on_commas_and_newlines() {
        let tokens = parse_email_tokens("a@x.example,b@x.example\n c@x.example ");
        assert_eq!(tokens, vec!["a@x.example", "b@x.example", "c@x.example"]);
    }

    #[test]
    fn tokens_without_at_are_dropped() {
        let tokens = parse_email_tokens("ops team, ops@x.example, ,\n");
        assert_eq!(tokens, vec!["ops@x.example"]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(parse_email_tokens("").is_empty());
        assert!(parse_email_tokens(" , \n , ").is_empty());
    }
}
