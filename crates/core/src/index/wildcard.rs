//! Shell-style wildcard patterns for term lookup.
//!
//! Supports:
//! - `*` - matches any sequence of characters
//! - `?` - matches any single character
//! - `[...]` - matches one character from the class, `[!...]` negates it
//!
//! Patterns are translated to an anchored regex once and then matched against
//! every indexed term. There is no sub-linear lookup; a wildcard query scans
//! the whole term dictionary.

use crate::error::{Result, SearchError};
use regex::Regex;

/// A compiled wildcard pattern.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    pattern: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compile a wildcard pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&glob_to_regex(pattern))
            .map_err(|e| SearchError::InvalidPattern(format!("{pattern}: {e}")))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The source pattern.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Check whether `term` matches the whole pattern.
    pub fn matches(&self, term: &str) -> bool {
        self.regex.is_match(term)
    }
}

/// Check if the pattern has any wildcard metacharacters
pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Translate a wildcard pattern into an anchored regex.
///
/// An unterminated `[` is matched literally.
fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("(?s)^");

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                // collapse runs of '*'
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let Some(close) = class_end(&chars, i) else {
                    out.push_str("\\[");
                    continue;
                };
                push_class(&mut out, &chars[i..close]);
                i = close + 1;
            }
            _ => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
    }

    out.push('$');
    out
}

/// Index of the `]` closing a class whose body starts at `start`.
///
/// A `]` right after `[` or `[!` belongs to the body.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

/// Emit a class body as explicit characters and `lo-hi` ranges.
///
/// Every character is escaped, so regex set operators like `--` or `&&`
/// never form. Reversed ranges are empty and dropped; a class left with
/// nothing matches no character, or any character when negated.
fn push_class(out: &mut String, body: &[char]) {
    let (negated, body) = match body.split_first() {
        Some((&'!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut items = String::new();
    let mut k = 0;
    while k < body.len() {
        if k + 2 < body.len() && body[k + 1] == '-' {
            let (lo, hi) = (body[k], body[k + 2]);
            if lo <= hi {
                push_class_char(&mut items, lo);
                items.push('-');
                push_class_char(&mut items, hi);
            }
            k += 3;
        } else {
            push_class_char(&mut items, body[k]);
            k += 1;
        }
    }

    match (items.is_empty(), negated) {
        (true, false) => out.push_str("[^\\s\\S]"),
        (true, true) => out.push('.'),
        (false, negated) => {
            out.push_str(if negated { "[^" } else { "[" });
            out.push_str(&items);
            out.push(']');
        }
    }
}

fn push_class_char(out: &mut String, ch: char) {
    if matches!(ch, '\\' | '[' | ']' | '&' | '~' | '^' | '-') {
        out.push('\\');
    }
    out.push(ch);
}
