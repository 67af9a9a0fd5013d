//! Shared text helpers for the comment grammar.

/// Collapses every run of whitespace to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips one pair of surrounding double quotes and unescapes `\"`.
pub fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\\\"", "\"")
    } else {
        trimmed.to_string()
    }
}

/// Splits on any of `separators` that sit outside double quotes and
/// parentheses.
pub fn split_top_level<'a>(text: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if in_quotes {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && separators.contains(&ch) => {
                parts.push(&text[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Byte index of the last `.` outside double quotes and parentheses.
pub fn last_top_level_dot(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut found = None;

    for (idx, ch) in text.char_indices() {
        if in_quotes {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => found = Some(idx),
            _ => {}
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_top_level_respects_quotes_and_parens() {
        let parts = split_top_level(r#"required; default: "a;b", parser: p.Parse(1, 2)"#, &[';', ',']);
        assert_eq!(
            parts,
            vec!["required", r#" default: "a;b""#, " parser: p.Parse(1, 2)"]
        );
    }

    #[test]
    fn test_last_top_level_dot() {
        assert_eq!(last_top_level_dot("pkg.Func"), Some(3));
        assert_eq!(last_top_level_dot(r#""a.b/c".F"#), Some(7));
        assert_eq!(last_top_level_dot("Parse(1.5)"), None);
        assert_eq!(last_top_level_dot("Func"), None);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""guest""#), "guest");
        assert_eq!(unquote(r#""say \"hi\"""#), r#"say "hi""#);
        assert_eq!(unquote("plain"), "plain");
    }
}
