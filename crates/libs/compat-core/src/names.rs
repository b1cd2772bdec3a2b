//! Display-name canonicalization and cross-document matching.
//!
//! Matching is deliberately unscored: the first candidate whose canonical form
//! equals, contains, or is contained in the searched name wins. Callers must
//! pass candidates in a meaningful stable order (declaration order of the
//! progress queue).

use std::fmt;

use serde::Serialize;

/// A display name reduced to its comparison key, e.g. `Linux Kernel 5.15+`
/// becomes `linux-5.15`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CanonicalName(String);

impl CanonicalName {
    pub fn new(display_name: &str) -> Self {
        Self(normalize_name(display_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Equality or containment in either direction.
    ///
    /// An empty key would be contained in everything, so it only matches
    /// another empty key.
    pub fn matches(&self, other: &CanonicalName) -> bool {
        if self.0.is_empty() || other.0.is_empty() {
            return self.0 == other.0;
        }
        self.0 == other.0 || self.0.contains(other.as_str()) || other.0.contains(self.as_str())
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let without_notes = strip_parentheticals(&lowered);
    let dashed = collapse_kernel(&without_notes);
    let unqualified = dashed.trim().trim_end_matches('+');

    let mut out = String::with_capacity(unqualified.len());
    let mut last_dash = false;
    for c in unqualified.chars() {
        if c.is_whitespace() || c == '-' {
            if !last_dash {
                out.push('-');
            }
            last_dash = true;
        } else {
            out.push(c);
            last_dash = false;
        }
    }
    out.trim_start_matches('-').trim_end_matches(['-', '+']).to_string()
}

/// Drops ` (note)` annotations together with the whitespace before them.
fn strip_parentheticals(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        out.push_str(rest[..open].trim_end());
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

fn collapse_kernel(name: &str) -> String {
    const QUALIFIER: &str = "kernel";
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(idx) = rest.find(QUALIFIER) {
        out.push_str(rest[..idx].trim_end());
        out.push('-');
        rest = rest[idx + QUALIFIER.len()..].trim_start();
    }
    out.push_str(rest);
    out
}

pub fn names_match(a: &str, b: &str) -> bool {
    CanonicalName::new(a).matches(&CanonicalName::new(b))
}

/// Index of the first candidate matching `name`, in candidate order.
pub fn find_match_index<T: AsRef<str>>(name: &str, candidates: &[T]) -> Option<usize> {
    let key = CanonicalName::new(name);
    candidates.iter().position(|candidate| key.matches(&CanonicalName::new(candidate.as_ref())))
}

pub fn find_match<'a, T: AsRef<str>>(name: &str, candidates: &'a [T]) -> Option<&'a T> {
    find_match_index(name, candidates).map(|idx| &candidates[idx])
}
