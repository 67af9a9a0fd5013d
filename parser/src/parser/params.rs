//! Parameter detail parsing.
//!
//! One description string (the text after `name:` in a `Flags:` block, or a
//! signature comment) is scanned for an attribute block, a `default:` token,
//! a positional marker `@N`, a vararg marker `...` / `min...max`, and flag
//! tokens. Whatever remains becomes the description.

use regex::Regex;
use std::sync::LazyLock;

use cmdspec_core::{ParsedParam, normalize_flag_names};

use super::attributes::{extract_attribute_block, parse_attributes};
use super::util::{collapse_whitespace, unquote};

struct ParamPatterns {
    default_key: Regex,
    positional: Regex,
    vararg: Regex,
    flag: Regex,
    empty_brackets: Regex,
    repeated_commas: Regex,
}

static PATTERNS: LazyLock<ParamPatterns> = LazyLock::new(|| ParamPatterns {
    default_key: Regex::new(r"(?i)\bdefault:").expect("static regex must compile"),
    // @1, @2 ...
    positional: Regex::new(r"(?:^|\s)@(\d+)\b").expect("static regex must compile"),
    // ..., 1..., ...3, 1...3
    vararg: Regex::new(r"(?:^|\s)(\d+)?\.\.\.(\d+)?(?:\s|$)").expect("static regex must compile"),
    // -n, --name, -dry-run
    flag: Regex::new(r"(?:^|[\s,(\[|/])(-{1,2}[A-Za-z0-9][\w-]*)").expect("static regex must compile"),
    empty_brackets: Regex::new(r"\(\s*[,;]?\s*\)|\[\s*[,;]?\s*\]").expect("static regex must compile"),
    repeated_commas: Regex::new(r"\s*,(?:\s*,)+").expect("static regex must compile"),
});

/// Parses one parameter description into a [`ParsedParam`].
///
/// # Examples
///
/// ```
/// use cmdspec_parser::parser::parse_param_details;
///
/// let p = parse_param_details(r#"-n --name (default: "guest") The user name"#);
/// assert_eq!(p.flags, vec!["name", "n"]);
/// assert_eq!(p.default.as_deref(), Some("guest"));
/// assert_eq!(p.description.as_deref(), Some("The user name"));
/// ```
pub fn parse_param_details(text: &str) -> ParsedParam {
    let mut parsed = ParsedParam::default();

    let working = match extract_attribute_block(text) {
        Some(block) => {
            parse_attributes(&block.content, &mut parsed);
            block.remainder
        }
        None => text.trim().to_string(),
    };

    let description = scan_inline_details(&working, &mut parsed);
    if !description.is_empty() && parsed.description.is_none() {
        parsed.description = Some(description);
    }
    parsed.flags = normalize_flag_names(std::mem::take(&mut parsed.flags));
    parsed
}

/// `true` when the text carries a positional or vararg marker.
pub fn has_positional_or_vararg_marker(text: &str) -> bool {
    PATTERNS.positional.is_match(text) || PATTERNS.vararg.is_match(text)
}

/// Pulls default, positional, vararg and flag tokens out of `text`, filling
/// `into`, and returns the cleaned-up leftover description.
fn scan_inline_details(text: &str, into: &mut ParsedParam) -> String {
    // The default value is cut out first so that its own punctuation
    // (`default: foo()`) survives the bracket cleanup below.
    let mut remaining = text.to_string();
    if let Some((start, end, value)) = find_default(&remaining) {
        if into.default.is_none() {
            into.default = Some(value);
        }
        remaining.replace_range(start..end, " ");
    }

    // Positions are 1-based; `@0` is dropped.
    if let Some(caps) = PATTERNS.positional.captures(&remaining) {
        if let Some(index) = caps[1].parse::<u32>().ok().filter(|i| *i > 0) {
            into.positional = true;
            into.position = Some(index);
        }
    }
    remaining = PATTERNS.positional.replace_all(&remaining, " ").into_owned();

    if let Some(caps) = PATTERNS.vararg.captures(&remaining) {
        into.vararg = true;
        into.positional = true;
        into.var_min = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        into.var_max = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
    }
    remaining = PATTERNS.vararg.replace_all(&remaining, " ").into_owned();

    for caps in PATTERNS.flag.captures_iter(&remaining) {
        into.flags.push(caps[1].trim_start_matches('-').to_string());
    }
    remaining = PATTERNS
        .flag
        .replace_all(&remaining, |caps: &regex::Captures<'_>| {
            let whole = &caps[0];
            let flag = &caps[1];
            whole[..whole.len() - flag.len()].to_string()
        })
        .into_owned();

    clean_description(&remaining)
}

/// Locates `default: <value>` and returns the byte range to excise plus the
/// unquoted value.
///
/// The value is a double-quoted string, or a run of non-space characters
/// that stops at a `,`/`;` or at a `)` closing a paren opened before it.
fn find_default(text: &str) -> Option<(usize, usize, String)> {
    let key = PATTERNS.default_key.find(text)?;
    let after = &text[key.end()..];
    let value_start = key.end() + (after.len() - after.trim_start().len());
    let rest = &text[value_start..];

    let mut end = value_start;
    if rest.starts_with('"') {
        let mut escaped = false;
        for (idx, ch) in rest.char_indices().skip(1) {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => {
                    end = value_start + idx + 1;
                    break;
                }
                _ => {}
            }
        }
        if end == value_start {
            end = text.len();
        }
    } else {
        let mut depth = 0usize;
        end = text.len();
        for (idx, ch) in rest.char_indices() {
            match ch {
                '(' => depth += 1,
                ')' if depth == 0 => {
                    end = value_start + idx;
                    break;
                }
                ')' => depth -= 1,
                ',' | ';' if depth == 0 => {
                    end = value_start + idx;
                    break;
                }
                _ if ch.is_whitespace() && depth == 0 => {
                    end = value_start + idx;
                    break;
                }
                _ => {}
            }
        }
    }

    let value = unquote(&text[value_start..end]);
    if value.is_empty() {
        return None;
    }
    Some((key.start(), end, value))
}

/// Collapses whitespace and strips punctuation orphaned by token removal.
fn clean_description(text: &str) -> String {
    let without_brackets = PATTERNS.empty_brackets.replace_all(text, " ");
    let commas = PATTERNS.repeated_commas.replace_all(&without_brackets, ",");
    let collapsed = collapse_whitespace(&commas).replace(" ,", ",");
    collapsed
        .trim_start_matches(|ch: char| ch.is_whitespace() || matches!(ch, ',' | ';' | ':' | '|' | '/' | '-'))
        .trim_end_matches(|ch: char| ch.is_whitespace() || matches!(ch, ',' | ';' | '|' | '/'))
        .to_string()
}
