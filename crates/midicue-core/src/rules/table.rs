//! Rules and status-bucketed rule tables.

use super::selector::Selector;
use crate::event::EventKey;
use crate::template::{CommandTemplate, OutputTemplate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// A selector plus the action fired when it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule<A> {
    pub name: String,
    pub description: String,
    pub selector: Selector,
    pub action: A,
}

impl<A> Rule<A> {
    pub fn new(name: impl Into<String>, selector: Selector, action: A) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            selector,
            action,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Launches an external command.
pub type CommandRule = Rule<CommandTemplate>;

/// Emits outbound MIDI.
pub type TranslationRule = Rule<OutputTemplate>;

/// Rules grouped by status code, declaration order kept within each bucket.
///
/// Immutable once built. Every build gets a fresh generation token so
/// memoized lookups can tell tables apart.
#[derive(Debug, Clone)]
pub struct RuleTable<A> {
    buckets: HashMap<u8, Vec<Rule<A>>>,
    len: usize,
    generation: u64,
}

impl<A> RuleTable<A> {
    pub fn new(rules: impl IntoIterator<Item = Rule<A>>) -> Self {
        let mut buckets: HashMap<u8, Vec<Rule<A>>> = HashMap::new();
        let mut len = 0;
        for rule in rules {
            buckets.entry(rule.selector.status).or_default().push(rule);
            len += 1;
        }
        Self {
            buckets,
            len,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bucket(&self, status: u8) -> &[Rule<A>] {
        self.buckets.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Uncached first-match scan. Returns the position within the status bucket.
    pub fn scan(&self, key: &EventKey) -> Option<usize> {
        self.bucket(key.status)
            .iter()
            .position(|rule| rule.selector.matches(key))
    }

    pub(crate) fn get(&self, status: u8, position: usize) -> Option<&Rule<A>> {
        self.bucket(status).get(position)
    }

    /// All rules. Bucket order is unspecified; order within a bucket is kept.
    pub fn iter(&self) -> impl Iterator<Item = &Rule<A>> {
        self.buckets.values().flatten()
    }
}

impl<A> Default for RuleTable<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A> FromIterator<Rule<A>> for RuleTable<A> {
    fn from_iter<I: IntoIterator<Item = Rule<A>>>(iter: I) -> Self {
        Self::new(iter)
    }
}
