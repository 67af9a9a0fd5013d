//! Parenthesized attribute blocks: `(required; default: "x"; aka: a, b)`.
//!
//! [`extract_attribute_block`] isolates at most one block that either opens
//! the text or closes it; a block in the middle of a sentence is prose.
//! [`parse_attributes`] decodes the block content into a [`ParsedParam`].

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use cmdspec_core::{FunctionRef, ParsedParam};

use super::util::{collapse_whitespace, last_top_level_dot, split_top_level, unquote};

/// An extracted attribute block and the text around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBlock {
    /// Block content without the outer parentheses.
    pub content: String,
    /// Remaining text with the block removed and whitespace collapsed.
    pub remainder: String,
}

/// Locates a leading or trailing parenthesized block.
///
/// Nesting is tracked, so `(parser: pkg.Parse(10))` is taken whole. Text
/// whose candidate block is unbalanced yields `None` and stays prose.
pub fn extract_attribute_block(text: &str) -> Option<AttributeBlock> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('(') {
        if let Some(close) = matching_close(trimmed) {
            return Some(AttributeBlock {
                content: trimmed[1..close].trim().to_string(),
                remainder: collapse_whitespace(&trimmed[close + 1..]),
            });
        }
    }

    if trimmed.ends_with(')') {
        if let Some(open) = matching_open(trimmed) {
            return Some(AttributeBlock {
                content: trimmed[open + 1..trimmed.len() - 1].trim().to_string(),
                remainder: collapse_whitespace(&trimmed[..open]),
            });
        }
    }

    None
}

/// Byte index of the `)` closing the `(` at index 0.
fn matching_close(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;
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
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte index of the `(` opening the `)` at the end of `text`.
fn matching_open(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    for (pos, &(idx, ch)) in chars.iter().enumerate().rev() {
        let escaped_quote = ch == '"' && pos > 0 && chars[pos - 1].1 == '\\';
        if ch == '"' && !escaped_quote {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        match ch {
            ')' => depth += 1,
            '(' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

struct AttributePatterns {
    env_default: Regex,
    from_parent: Regex,
}

static PATTERNS: LazyLock<AttributePatterns> = LazyLock::new(|| AttributePatterns {
    // default from environment HOME [fallback: /tmp]
    env_default: Regex::new(
        r"(?i)^default\s+from\s+(?:environment|env)\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s+fallback:\s*(.+))?$",
    )
    .expect("static regex must compile"),
    from_parent: Regex::new(r"(?i)^from:?\s*parent$").expect("static regex must compile"),
});

/// Which attribute a bare continuation token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    None,
    Aka,
    EnvDefault,
}

/// Decodes an attribute block into `into`.
///
/// Attributes are separated by `;` or `,` and may appear in any order.
/// Bare tokens after `aka:` extend the alias list; `fallback:` after an
/// environment default supplies its literal fallback. Unknown attributes
/// are ignored.
pub fn parse_attributes(block: &str, into: &mut ParsedParam) {
    let mut continuation = Continuation::None;

    for raw in split_top_level(block, &[';', ',']) {
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }
        let lower = token.to_ascii_lowercase();

        if lower == "required" {
            into.required = true;
            continuation = Continuation::None;
        } else if lower == "global" || lower == "inherited" {
            into.inherited = true;
            continuation = Continuation::None;
        } else if PATTERNS.from_parent.is_match(token) {
            into.from_parent = true;
            continuation = Continuation::None;
        } else if let Some(value) = keyword_value(token, "parser:") {
            into.parser = parse_function_ref(value);
            continuation = Continuation::None;
        } else if let Some(value) = keyword_value(token, "generator:") {
            into.generator = parse_function_ref(value);
            continuation = Continuation::None;
        } else if let Some(value) = keyword_value(token, "aka:") {
            push_alias(into, value);
            continuation = Continuation::Aka;
        } else if let Some(caps) = PATTERNS.env_default.captures(token) {
            into.env_var = Some(caps[1].to_string());
            if let Some(fallback) = caps.get(2) {
                into.default = Some(unquote(fallback.as_str()));
            }
            continuation = Continuation::EnvDefault;
        } else if let Some(value) = keyword_value(token, "default:") {
            into.default = Some(unquote(value));
            continuation = Continuation::None;
        } else if let (Continuation::EnvDefault, Some(value)) =
            (continuation, keyword_value(token, "fallback:"))
        {
            into.default = Some(unquote(value));
            continuation = Continuation::None;
        } else if continuation == Continuation::Aka && is_alias_token(token) {
            push_alias(into, token);
        } else {
            debug!(attribute = token, "Ignoring unrecognized attribute");
            continuation = Continuation::None;
        }
    }
}

/// Parses `Func`, `pkg.Func` or `"import/path".Func`.
///
/// The qualifier ends at the last `.` outside quotes and parentheses, so
/// call-like references such as `pkg.Parse(1.5)` keep their arguments.
pub fn parse_function_ref(raw: &str) -> Option<FunctionRef> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Some(dot) = last_top_level_dot(trimmed) else {
        return Some(FunctionRef::local(trimmed));
    };
    let qualifier = trimmed[..dot].trim();
    let name = trimmed[dot + 1..].trim();
    if name.is_empty() || qualifier.is_empty() {
        return None;
    }
    if qualifier.starts_with('"') && qualifier.ends_with('"') && qualifier.len() >= 2 {
        Some(FunctionRef::imported(&unquote(qualifier), name))
    } else {
        Some(FunctionRef::qualified(qualifier, name))
    }
}

fn keyword_value<'a>(token: &'a str, keyword: &str) -> Option<&'a str> {
    let head = token.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| token[keyword.len()..].trim())
}

fn is_alias_token(token: &str) -> bool {
    !token.contains(':') && !token.contains(char::is_whitespace)
}

/// Flag names never contain whitespace, so `aka: nm x2` names two aliases.
fn push_alias(into: &mut ParsedParam, value: &str) {
    for word in value.split_whitespace() {
        let alias = word.trim_start_matches('-');
        if !alias.is_empty() {
            into.aliases.push(alias.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_block_is_extracted() {
        let block = extract_attribute_block("Description (required)").unwrap();
        assert_eq!(block.content, "required");
        assert_eq!(block.remainder, "Description");
    }

    #[test]
    fn test_leading_block_is_extracted() {
        let block = extract_attribute_block("(required; global)   The  user").unwrap();
        assert_eq!(block.content, "required; global");
        assert_eq!(block.remainder, "The user");
    }

    #[test]
    fn test_middle_block_is_prose() {
        assert_eq!(extract_attribute_block("Description (required) text"), None);
    }

    #[test]
    fn test_nested_parens_are_kept_whole() {
        let block = extract_attribute_block("Level (parser: levels.Parse(strict))").unwrap();
        assert_eq!(block.content, "parser: levels.Parse(strict)");
        assert_eq!(block.remainder, "Level");
    }

    #[test]
    fn test_unbalanced_block_is_not_extracted() {
        assert_eq!(extract_attribute_block("Description (a) b)"), None);
        assert_eq!(extract_attribute_block("(required text"), None);
    }

    #[test]
    fn test_parse_all_attribute_kinds() {
        let mut p = ParsedParam::default();
        parse_attributes(
            r#"required; global; parser: "example.com/lv".Parse; generator: gen.Names; aka: usr, u; default: "guest""#,
            &mut p,
        );
        assert!(p.required);
        assert!(p.inherited);
        assert_eq!(p.parser, Some(FunctionRef::imported("example.com/lv", "Parse")));
        assert_eq!(p.generator, Some(FunctionRef::qualified("gen", "Names")));
        assert_eq!(p.aliases, vec!["usr", "u"]);
        assert_eq!(p.default.as_deref(), Some("guest"));
    }

    #[test]
    fn test_comma_only_delimited_aka_list() {
        let mut p = ParsedParam::default();
        parse_attributes("aka: b, a, required", &mut p);
        assert_eq!(p.aliases, vec!["b", "a"]);
        assert!(p.required);
    }

    #[test]
    fn test_space_separated_aka_names_distinct_aliases() {
        let mut p = ParsedParam::default();
        parse_attributes("aka: nm x2", &mut p);
        assert_eq!(p.aliases, vec!["nm", "x2"]);
    }

    #[test]
    fn test_env_default_with_fallback() {
        let mut p = ParsedParam::default();
        parse_attributes("default from environment APP_HOME fallback: \"/tmp\"", &mut p);
        assert_eq!(p.env_var.as_deref(), Some("APP_HOME"));
        assert_eq!(p.default.as_deref(), Some("/tmp"));

        let mut q = ParsedParam::default();
        parse_attributes("default from env TOKEN, fallback: none", &mut q);
        assert_eq!(q.env_var.as_deref(), Some("TOKEN"));
        assert_eq!(q.default.as_deref(), Some("none"));
    }

    #[test]
    fn test_from_parent_and_unknown_tokens() {
        let mut p = ParsedParam::default();
        parse_attributes("from: parent; shiny: yes; experimental", &mut p);
        assert!(p.from_parent);
        assert!(!p.required);
    }

    #[test]
    fn test_function_ref_forms() {
        assert_eq!(parse_function_ref("ParseLevel"), Some(FunctionRef::local("ParseLevel")));
        assert_eq!(
            parse_function_ref("pkg.Parse(1.5)"),
            Some(FunctionRef::qualified("pkg", "Parse(1.5)"))
        );
        assert_eq!(parse_function_ref(""), None);
        assert_eq!(parse_function_ref("pkg."), None);
    }
}
