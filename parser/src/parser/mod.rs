//! Doc-comment directive scanner.
//!
//! Reads one function's documentation comment and recognizes the command
//! specification language embedded in it:
//!
//! - the declaration line, `Name is a subcommand `app sub` that does X`
//! - a `Flags:` block of indented `name: details` entries
//! - legacy `flag name ...` / `param name ...` lines
//! - implicit `name: @1 ...` / `name: ... rest` parameter lines
//! - an `Aliases: a, b` line
//!
//! Everything else is extended help text.
//!
//! The scanner is a small state machine over [`ScanState`]. The primary
//! entry point is [`DocParser::new`] followed by [`DocParser::parse`];
//! parameter text is handed to [`parse_param_details`].

mod attributes;
mod diagnostics;
mod normalize;
mod params;
mod util;

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use cmdspec_core::{ParsedParam, overlay};

pub use attributes::{AttributeBlock, extract_attribute_block, parse_attributes, parse_function_ref};
pub use diagnostics::{Warning, WarningKind, sort_warnings};
pub use normalize::normalize_comment;
pub use params::{has_positional_or_vararg_marker, parse_param_details};

#[derive(Debug, Clone)]
pub(crate) struct IndexedLine {
    pub(crate) index: usize,
    pub(crate) text: String,
}

/// Scanner states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No declaration line seen yet.
    SeekingDeclaration,
    Normal,
    InFlagsBlock,
}

/// Everything recognized in one doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDirective {
    /// Whether the subcommand declaration marker was found.
    pub is_command: bool,
    /// Root command name; empty when the marker had no backtick sequence.
    pub command: String,
    /// Subcommand path below the root command.
    pub sequence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_help: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Parameter entries keyed by identifier.
    #[serde(default)]
    pub params: BTreeMap<String, ParsedParam>,
}

static PATTERNS: LazyLock<CommentPatterns> = LazyLock::new(CommentPatterns::new);

struct CommentPatterns {
    declaration: Regex,
    aliases: Regex,
    param_split: Regex,
    implicit_param: Regex,
}

impl CommentPatterns {
    fn new() -> Self {
        // All regexes here are compile-time constants. An expect() failure indicates
        // a programmer error in the pattern, not a runtime condition.
        Self {
            // Run is a subcommand `app run` that runs things
            declaration: Regex::new(r"is a subcommand\s*(?:`([^`]*)`)?\s*(.*)$")
                .expect("static regex must compile"),
            aliases: Regex::new(r"^[Aa]liases:\s*(.*)$").expect("static regex must compile"),
            // name: rest  |  name rest  |  name
            param_split: Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)(?::\s*|\s+|$)(.*)$")
                .expect("static regex must compile"),
            implicit_param: Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*):\s+(.+)$")
                .expect("static regex must compile"),
        }
    }
}

/// Scanner for one function's doc comment.
pub struct DocParser {
    function: String,
    raw_doc: String,
    warnings: Vec<Warning>,
}

impl DocParser {
    /// Creates a scanner; `function` names the declaration in warnings.
    pub fn new(function: &str, doc: &str) -> Self {
        Self {
            function: function.to_string(),
            raw_doc: doc.to_string(),
            warnings: Vec::new(),
        }
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Scans the comment.
    pub fn parse(&mut self) -> CommentDirective {
        self.warnings.clear();
        let normalized = normalize::normalize_comment(&self.raw_doc);
        let lines = normalize::to_indexed_lines(&normalized);

        let mut directive = CommentDirective::default();
        let mut help: Vec<String> = Vec::new();
        let mut state = ScanState::SeekingDeclaration;
        let mut warned_spaces = false;
        let mut cursor = 0;

        while cursor < lines.len() {
            let line = &lines[cursor];
            let trimmed = line.text.trim();

            if state == ScanState::InFlagsBlock {
                if trimmed.is_empty() {
                    cursor += 1;
                    continue;
                }
                if line.text.starts_with([' ', '\t']) {
                    if line.text.starts_with(' ') && !warned_spaces {
                        warned_spaces = true;
                        self.warn(
                            WarningKind::SpaceIndentedFlags,
                            format!(
                                "line {}: Flags block entries should be indented with a tab",
                                line.index + 1
                            ),
                        );
                    }
                    if !self.record_param_line(trimmed, &mut directive) {
                        push_help(&mut help, trimmed);
                    }
                    cursor += 1;
                    continue;
                }
                // Unindented: the block is over, reprocess as a normal line.
                state = ScanState::Normal;
                continue;
            }

            cursor += 1;

            if state == ScanState::SeekingDeclaration {
                if let Some(caps) = PATTERNS.declaration.captures(trimmed) {
                    directive.is_command = true;
                    let mut tokens = caps
                        .get(1)
                        .map(|m| m.as_str().split_whitespace().map(String::from).collect::<Vec<_>>())
                        .unwrap_or_default()
                        .into_iter();
                    directive.command = tokens.next().unwrap_or_default();
                    directive.sequence = tokens.collect();
                    directive.description = caps.get(2).and_then(|m| short_description(m.as_str()));
                    state = ScanState::Normal;
                    continue;
                }
            }

            if trimmed == "Flags:" {
                state = ScanState::InFlagsBlock;
                let next_is_blank = lines
                    .get(cursor)
                    .is_none_or(|next| next.text.trim().is_empty());
                if !next_is_blank {
                    self.warn(
                        WarningKind::MissingBlankAfterFlags,
                        format!("line {}: expected a blank line after 'Flags:'", line.index + 1),
                    );
                }
                continue;
            }

            if let Some(rest) = trimmed
                .strip_prefix("flag ")
                .or_else(|| trimmed.strip_prefix("param "))
            {
                if !self.record_param_line(rest.trim(), &mut directive) {
                    push_help(&mut help, trimmed);
                }
                continue;
            }

            if let Some(caps) = PATTERNS.aliases.captures(trimmed) {
                directive.aliases.extend(
                    caps[1]
                        .split([',', ';'])
                        .flat_map(str::split_whitespace)
                        .map(String::from),
                );
                continue;
            }

            if let Some(caps) = PATTERNS.implicit_param.captures(trimmed) {
                if has_positional_or_vararg_marker(&caps[2]) {
                    self.record_param_line(trimmed, &mut directive);
                    continue;
                }
            }

            if trimmed.is_empty() {
                if !help.is_empty() {
                    push_help(&mut help, "");
                }
                continue;
            }
            push_help(&mut help, trimmed);
        }

        while help.last().is_some_and(|l| l.is_empty()) {
            help.pop();
        }
        if !help.is_empty() {
            directive.extended_help = Some(help.join("\n"));
        }

        debug!(
            function = %self.function,
            command = %directive.command,
            sequence = ?directive.sequence,
            params = directive.params.len(),
            "Scanned doc comment"
        );
        directive
    }

    /// Splits `name: details` and merges the details into the entry for
    /// `name`. Returns `false` when the line does not start with an
    /// identifier.
    fn record_param_line(&mut self, text: &str, directive: &mut CommentDirective) -> bool {
        let Some(caps) = PATTERNS.param_split.captures(text) else {
            debug!(function = %self.function, line = text, "Parameter line without identifier");
            return false;
        };
        let name = caps[1].to_string();
        let parsed = parse_param_details(&caps[2]);
        let entry = directive.params.remove(&name).unwrap_or_default();
        directive.params.insert(name, overlay(entry, parsed));
        true
    }

    fn warn(&mut self, kind: WarningKind, message: String) {
        self.warnings.push(Warning::new(kind, &self.function, message));
    }
}

fn push_help(help: &mut Vec<String>, line: &str) {
    if line.is_empty() && help.last().is_some_and(|l| l.is_empty()) {
        return;
    }
    help.push(line.to_string());
}

/// Text after the backtick sequence: `that X` and `-- X` lose their prefix,
/// anything else is kept verbatim.
fn short_description(trailing: &str) -> Option<String> {
    let trimmed = trailing.trim();
    let text = trimmed
        .strip_prefix("that ")
        .or_else(|| trimmed.strip_prefix("-- "))
        .unwrap_or(trimmed)
        .trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Scans a doc comment without a function context.
///
/// # Examples
///
/// ```
/// use cmdspec_parser::parser::parse_comment;
///
/// let (directive, warnings) = parse_comment(
///     "Add is a subcommand `app remote add` that adds a remote\n\nFlags:\n\n\tname: -n the remote name\n",
/// );
/// assert_eq!(directive.command, "app");
/// assert_eq!(directive.sequence, vec!["remote", "add"]);
/// assert_eq!(directive.description.as_deref(), Some("adds a remote"));
/// assert_eq!(directive.params["name"].flags, vec!["n"]);
/// assert!(warnings.is_empty());
/// ```
pub fn parse_comment(doc: &str) -> (CommentDirective, Vec<Warning>) {
    let mut parser = DocParser::new("<comment>", doc);
    let directive = parser.parse();
    (directive, parser.into_warnings())
}
