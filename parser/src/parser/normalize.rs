//! Doc-comment normalization.

use regex::Regex;
use std::sync::LazyLock;

use super::IndexedLine;

/// Strips comment markers and line-ending noise from a raw doc comment.
///
/// When every non-blank line starts with `//`, one marker and one following
/// space are removed per line; a tab after the marker is kept because it is
/// the indentation of `Flags:` entries. Block comment fences (`/*`, `*/`)
/// are dropped, also when they wrap a single line (`/* text */`). Already-stripped text passes through unchanged apart from
/// line endings and trailing whitespace.
pub fn normalize_comment(raw: &str) -> String {
    // SAFETY: These regexes are compile-time constants and are validated by tests.
    static LINE_MARKER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*//").expect("static regex must compile"));
    static BLOCK_FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*(/\*+|\*+/)\s*$").expect("static regex must compile"));
    static INLINE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*/\*+\s?(.*?)\s*\*+/\s*$").expect("static regex must compile")
    });

    let replaced = raw.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<String> = replaced
        .lines()
        .filter(|line| !BLOCK_FENCE_RE.is_match(line))
        .map(|line| INLINE_BLOCK_RE.replace(line, "$1").into_owned())
        .collect();

    let all_marked = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .all(|line| LINE_MARKER_RE.is_match(line));

    let mut normalized: Vec<String> = Vec::with_capacity(lines.len());
    for line in &lines {
        let text = if all_marked {
            let without = LINE_MARKER_RE.replace(line, "");
            match without.strip_prefix(' ') {
                Some(rest) => rest.to_string(),
                None => without.into_owned(),
            }
        } else {
            line.to_string()
        };
        normalized.push(text.trim_end().to_string());
    }

    normalized.join("\n")
}

pub(super) fn to_indexed_lines(normalized: &str) -> Vec<IndexedLine> {
    normalized
        .lines()
        .enumerate()
        .map(|(index, text)| IndexedLine {
            index,
            text: text.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_line_markers_but_keeps_tabs() {
        let raw = "// Run is a subcommand `app run`\n//\n// Flags:\n//\n//\tname: -n the name\n";
        let normalized = normalize_comment(raw);
        assert_eq!(
            normalized,
            "Run is a subcommand `app run`\n\nFlags:\n\n\tname: -n the name"
        );
    }

    #[test]
    fn test_plain_text_passes_through() {
        let raw = "Run is a subcommand `app run`\r\n  indented line  \r\n";
        assert_eq!(
            normalize_comment(raw),
            "Run is a subcommand `app run`\n  indented line"
        );
    }

    #[test]
    fn test_block_fences_are_dropped() {
        let raw = "/*\nRun is a subcommand `app run`\n*/";
        assert_eq!(normalize_comment(raw), "Run is a subcommand `app run`");
    }

    #[test]
    fn test_single_line_block_comment_is_unwrapped() {
        assert_eq!(normalize_comment("/* User name */"), "User name");
        assert_eq!(normalize_comment("/** id of the record */"), "id of the record");
    }
}
