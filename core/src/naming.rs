//! Identifier generation: collision-free struct names, kebab-case flag
//! names, and the canonical ordering of flag lists.

use std::collections::HashSet;

/// Word used when a seed sanitizes to nothing or starts with a digit.
pub const FALLBACK_WORD: &str = "Cmd";

/// Names never handed out by a fresh [`NameAllocator`].
pub const RESERVED_NAMES: &[&str] = &[
    "Context",
    "Execute",
    "Flag",
    "FlagSet",
    "Main",
    "RootCmd",
    "Usage",
    "UserError",
];

/// Hands out unique generated identifiers.
///
/// Each seed is sanitized into a PascalCase token; if that token is taken
/// (or reserved), numeric suffixes starting at 2 are tried in turn. The
/// result depends only on the sequence of allocations.
///
/// # Examples
///
/// ```
/// use cmdspec_core::NameAllocator;
///
/// let mut names = NameAllocator::new();
/// assert_eq!(names.allocate("foo-bar"), "FooBar");
/// assert_eq!(names.allocate("foo_bar"), "FooBar2");
/// assert_eq!(names.allocate("main"), "Main2");
/// assert_eq!(names.allocate("2fa"), "Cmd2fa");
/// ```
#[derive(Debug, Clone)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    /// Creates an allocator seeded with [`RESERVED_NAMES`].
    pub fn new() -> Self {
        Self::with_reserved(std::iter::empty::<&str>())
    }

    /// Creates an allocator seeded with [`RESERVED_NAMES`] plus `extra`.
    pub fn with_reserved<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut used: HashSet<String> = RESERVED_NAMES.iter().map(|s| s.to_string()).collect();
        used.extend(extra.into_iter().map(|s| s.as_ref().to_string()));
        Self { used }
    }

    /// Returns a fresh identifier derived from `seed`.
    pub fn allocate(&mut self, seed: &str) -> String {
        let base = sanitize_identifier(seed);
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut suffix = 2usize;
        loop {
            let candidate = format!("{base}{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns arbitrary text into a PascalCase identifier.
///
/// Every maximal run of ASCII letters and digits becomes one word with its
/// first letter upper-cased; everything else is a boundary.
pub fn sanitize_identifier(seed: &str) -> String {
    let mut out = String::with_capacity(seed.len());
    for word in seed
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }

    if out.is_empty() {
        return FALLBACK_WORD.to_string();
    }
    if out.starts_with(|ch: char| ch.is_ascii_digit()) {
        return format!("{FALLBACK_WORD}{out}");
    }
    out
}

/// Converts an identifier to kebab-case (`userName` -> `user-name`,
/// `HTTPServer` -> `http-server`, `dry_run` -> `dry-run`).
///
/// # Examples
///
/// ```
/// use cmdspec_core::to_kebab_case;
///
/// assert_eq!(to_kebab_case("userName"), "user-name");
/// assert_eq!(to_kebab_case("verbose"), "verbose");
/// ```
pub fn to_kebab_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.extend(ch.to_lowercase());
    }

    out.trim_end_matches('-').to_string()
}

/// Canonical flag list: leading dashes stripped, deduplicated, longest
/// first with alphabetical tie-break.
///
/// # Examples
///
/// ```
/// use cmdspec_core::normalize_flag_names;
///
/// let a = normalize_flag_names(vec!["-n".into(), "--name".into()]);
/// let b = normalize_flag_names(vec!["--name".into(), "-n".into(), "n".into()]);
/// assert_eq!(a, vec!["name", "n"]);
/// assert_eq!(a, b);
/// ```
pub fn normalize_flag_names(flags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out: Vec<String> = flags
        .into_iter()
        .map(|f| f.trim().trim_start_matches('-').to_string())
        .filter(|f| !f.is_empty())
        .filter(|f| seen.insert(f.clone()))
        .collect();
    out.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_identifier_words() {
        assert_eq!(sanitize_identifier("remote add"), "RemoteAdd");
        assert_eq!(sanitize_identifier("fooBar"), "FooBar");
        assert_eq!(sanitize_identifier("--"), FALLBACK_WORD);
        assert_eq!(sanitize_identifier(""), FALLBACK_WORD);
        assert_eq!(sanitize_identifier("9lives"), "Cmd9lives");
    }

    #[test]
    fn test_allocate_suffixes_increment() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate("x"), "X");
        assert_eq!(names.allocate("x"), "X2");
        assert_eq!(names.allocate("x"), "X3");
        assert_eq!(names.allocate("X2"), "X22");
    }

    #[test]
    fn test_allocate_respects_extra_reserved() {
        let mut names = NameAllocator::with_reserved(["Server"]);
        assert!(names.is_used("Server"));
        assert_eq!(names.allocate("server"), "Server2");
        assert_eq!(names.allocate("usage"), "Usage2");
    }

    #[test]
    fn test_allocation_is_order_dependent_only() {
        let seeds = ["foo-bar", "foo_bar", "foo.bar", "", "1"];
        let first: Vec<String> = {
            let mut a = NameAllocator::new();
            seeds.iter().map(|s| a.allocate(s)).collect()
        };
        let second: Vec<String> = {
            let mut a = NameAllocator::new();
            seeds.iter().map(|s| a.allocate(s)).collect()
        };
        assert_eq!(first, second);
        assert_eq!(first, vec!["FooBar", "FooBar2", "FooBar3", "Cmd", "Cmd1"]);
    }

    #[test]
    fn test_kebab_case_variants() {
        assert_eq!(to_kebab_case("HTTPServer"), "http-server");
        assert_eq!(to_kebab_case("dry_run"), "dry-run");
        assert_eq!(to_kebab_case("maxRetries2"), "max-retries2");
        assert_eq!(to_kebab_case("userID"), "user-id");
    }

    #[test]
    fn test_normalize_flag_names_sorting() {
        let flags = normalize_flag_names(vec![
            "-v".into(),
            "--verbose".into(),
            "-x".into(),
            "--debug".into(),
        ]);
        assert_eq!(flags, vec!["verbose", "debug", "v", "x"]);
    }
}
