//! Route path patterns.
//!
//! A pattern is a path template with literal text and named placeholders:
//!
//! | Placeholder | Matches |
//! |---|---|
//! | `{name}` | one or more characters other than `/` (a single segment) |
//! | `{name:regex}` | exactly `regex`, which may span segments |
//!
//! Patterns compile once, at registration, into a regex anchored at both
//! ends: `/a` never matches `/a/b`. Literal text is escaped, so `/feed.xml`
//! does not match `/feedxxml`.

use std::fmt::Write as _;

use regex::Regex;

use crate::error::{Error, Result};

const SEGMENT: &str = "[^/]+";

/// A compiled route pattern.
#[derive(Clone, Debug)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPattern`] for an unbalanced brace, an empty custom
    ///   regex, or a placeholder name that is not an identifier.
    /// - [`Error::InvalidRegex`] if a custom regex does not compile, or two
    ///   placeholders share a name.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidPattern {
            pattern: pattern.to_owned(),
            reason,
        };

        let mut re = String::with_capacity(pattern.len() + 16);
        re.push_str("^(?:");

        let mut rest = pattern;
        while let Some(at) = rest.find(['{', '}']) {
            let (literal, tail) = rest.split_at(at);
            re.push_str(&regex::escape(literal));

            if tail.starts_with('}') {
                return Err(invalid("unmatched `}`".to_owned()));
            }
            let close = closing_brace(tail)
                .ok_or_else(|| invalid("unclosed placeholder".to_owned()))?;

            let inner = &tail[1..close];
            let (name, custom) = match inner.split_once(':') {
                Some((name, custom)) => (name, custom),
                None => (inner, SEGMENT),
            };
            if !is_identifier(name) {
                return Err(invalid(format!("invalid placeholder name `{name}`")));
            }
            if custom.is_empty() {
                return Err(invalid(format!("empty regex for placeholder `{name}`")));
            }
            // A custom regex must stand on its own. Otherwise `x)|(.*` would
            // close the group early and escape the anchors.
            Regex::new(custom).map_err(|source| Error::InvalidRegex {
                pattern: pattern.to_owned(),
                source,
            })?;
            let _ = write!(re, "(?P<{name}>(?:{custom}))");

            rest = &tail[close + 1..];
        }
        re.push_str(&regex::escape(rest));
        re.push_str(")$");

        let regex = Regex::new(&re).map_err(|source| Error::InvalidRegex {
            pattern: pattern.to_owned(),
            source,
        })?;

        Ok(Self { source: pattern.to_owned(), regex })
    }

    /// The pattern as written at registration.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matches the whole of `path`, returning every named capture that
    /// participated in the match. Unnamed groups inside custom regexes are
    /// dropped.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.regex
                .capture_names()
                .flatten()
                .filter_map(|name| caps.name(name).map(|m| (name.to_owned(), m.as_str().to_owned())))
                .collect(),
        )
    }

    /// Whether the whole of `path` matches, without extracting captures.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The compiled regex. Two patterns with the same matcher are the same
    /// route, however they were written.
    pub(crate) fn matcher(&self) -> &str {
        self.regex.as_str()
    }
}

/// Byte offset of the `}` closing the placeholder that opens `s`.
///
/// Braces nest so custom regexes can use repetition counts
/// (`{id:[0-9]{4}}`); a backslash escapes the next character.
fn closing_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
