use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use regex_automata::Input;
use regex_automata::dfa::{Automaton, StartKind, dense};

use crate::{Error, Result};

/// Predicate over names.
///
/// The `*IgnoreCase` variants compare the lowercase forms of both sides.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StringMatcher {
    Equals(String),
    EqualsIgnoreCase(String),
    StartsWith(String),
    StartsWithIgnoreCase(String),
    EndsWith(String),
    EndsWithIgnoreCase(String),
    Contains(String),
    ContainsIgnoreCase(String),
    Matches(Pattern),
}

impl StringMatcher {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Equals(s) => value == s,
            Self::EqualsIgnoreCase(s) => value.to_lowercase() == s.to_lowercase(),
            Self::StartsWith(s) => value.starts_with(s.as_str()),
            Self::StartsWithIgnoreCase(s) => value.to_lowercase().starts_with(&s.to_lowercase()),
            Self::EndsWith(s) => value.ends_with(s.as_str()),
            Self::EndsWithIgnoreCase(s) => value.to_lowercase().ends_with(&s.to_lowercase()),
            Self::Contains(s) => value.contains(s.as_str()),
            Self::ContainsIgnoreCase(s) => value.to_lowercase().contains(&s.to_lowercase()),
            Self::Matches(pattern) => pattern.is_match(value),
        }
    }
}

/// A regular expression that must match the whole input.
///
/// Compiled once to a dense DFA. Equality, ordering and hashing use the
/// source text.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    dfa: Arc<dense::DFA<Vec<u32>>>,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        let anchored = format!("^(?:{source})$");
        let dfa = dense::DFA::builder()
            .configure(dense::DFA::config().start_kind(StartKind::Unanchored))
            .build(&anchored)
            .map_err(|e| Error::invalid(format!("invalid pattern `{source}`: {e}")))?;
        Ok(Self {
            source: source.to_string(),
            dfa: Arc::new(dfa),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.dfa
            .try_search_fwd(&Input::new(value))
            .is_ok_and(|found| found.is_some())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl PartialOrd for Pattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source.cmp(&other.source)
    }
}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}
