//! Exact-string and regex dispatch over priority chains

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace};

use super::chain::{EntryId, PriorityChain};

/// Prefix that marks a pattern key in its text form
const PATTERN_PREFIX: &str = "re:";

/// Errors that can occur while registering handlers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The pattern does not compile as a regular expression
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// What a chain is registered under.
///
/// Keys compare by their raw text: two patterns that happen to match the same
/// candidates are still separate keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DispatchKey {
    /// Matches a candidate equal to the string
    Exact(String),
    /// Regex tested against the start of a candidate
    Pattern(String),
}

impl DispatchKey {
    pub fn exact(s: impl Into<String>) -> Self {
        DispatchKey::Exact(s.into())
    }

    pub fn pattern(p: impl Into<String>) -> Self {
        DispatchKey::Pattern(p.into())
    }

    /// The raw key text, without the `re:` marker
    pub fn as_str(&self) -> &str {
        match self {
            DispatchKey::Exact(s) | DispatchKey::Pattern(s) => s,
        }
    }
}

impl FromStr for DispatchKey {
    type Err = std::convert::Infallible;

    /// `re:<pattern>` parses as a pattern key, anything else as an exact key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.strip_prefix(PATTERN_PREFIX) {
            Some(pattern) => DispatchKey::Pattern(pattern.to_string()),
            None => DispatchKey::Exact(s.to_string()),
        })
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchKey::Exact(s) => f.write_str(s),
            DispatchKey::Pattern(p) => write!(f, "{}{}", PATTERN_PREFIX, p),
        }
    }
}

#[derive(Debug, Clone)]
struct PatternChain<H> {
    matcher: Regex,
    chain: PriorityChain<H>,
}

impl<H> PatternChain<H> {
    /// Whether the pattern matches at the very start of `candidate`.
    ///
    /// Leftmost-first search reports the earliest starting match, so a match
    /// at offset 0 exists exactly when the first match found starts there.
    fn matches(&self, candidate: &str) -> bool {
        self.matcher.find(candidate).is_some_and(|m| m.start() == 0)
    }
}

fn compile(pattern: &str) -> Result<Regex, DispatchError> {
    Regex::new(pattern).map_err(|e| DispatchError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Maps exact strings and regex patterns to handler chains.
///
/// The registry never calls its handlers; it only answers which apply to a
/// candidate and in what order. Chains are created on first registration and
/// are kept, possibly empty, for the life of the registry.
#[derive(Debug, Clone)]
pub struct PatternDispatchRegistry<H> {
    exact: HashMap<String, PriorityChain<H>>,
    /// Kept in registration order, which is the order lookups report them
    patterns: IndexMap<String, PatternChain<H>>,
    /// Ids are unique across every chain of the registry
    next_id: u64,
}

impl<H> Default for PatternDispatchRegistry<H> {
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            patterns: IndexMap::new(),
            next_id: 0,
        }
    }
}

impl<H> PatternDispatchRegistry<H> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler under `key`.
    ///
    /// A malformed pattern fails with [`DispatchError::InvalidPattern`] and
    /// leaves the registry unchanged. The returned id is unique within the
    /// registry, so it only ever unregisters this entry.
    pub fn register(
        &mut self,
        key: DispatchKey,
        handler: H,
        priority: i64,
    ) -> Result<EntryId, DispatchError> {
        let id = EntryId::new(self.next_id);
        match &key {
            DispatchKey::Exact(s) => self
                .exact
                .entry(s.clone())
                .or_default()
                .insert(handler, priority, id),
            DispatchKey::Pattern(p) => match self.patterns.get_mut(p) {
                Some(pattern) => pattern.chain.insert(handler, priority, id),
                None => {
                    let matcher = compile(p)?;
                    let mut chain = PriorityChain::new();
                    chain.insert(handler, priority, id);
                    self.patterns
                        .insert(p.clone(), PatternChain { matcher, chain });
                }
            },
        }
        self.next_id += 1;
        debug!(key = %key, priority, id = id.index(), "registered handler");
        Ok(id)
    }

    /// Remove one entry; the key's chain stays registered even when emptied
    pub fn unregister(&mut self, key: &DispatchKey, id: EntryId) -> Option<H> {
        let removed = self.chain_mut(key)?.remove(id);
        if removed.is_some() {
            debug!(key = %key, id = id.index(), "unregistered handler");
        }
        removed
    }

    /// The chain registered under `key`, if any
    pub fn chain(&self, key: &DispatchKey) -> Option<&PriorityChain<H>> {
        match key {
            DispatchKey::Exact(s) => self.exact.get(s),
            DispatchKey::Pattern(p) => self.patterns.get(p).map(|pc| &pc.chain),
        }
    }

    fn chain_mut(&mut self, key: &DispatchKey) -> Option<&mut PriorityChain<H>> {
        match key {
            DispatchKey::Exact(s) => self.exact.get_mut(s),
            DispatchKey::Pattern(p) => self.patterns.get_mut(p).map(|pc| &mut pc.chain),
        }
    }

    /// Chains that apply to `candidate`: the exact chain first, then every
    /// pattern matching at the start of `candidate`, in registration order
    pub fn lookup<'a>(&'a self, candidate: &'a str) -> impl Iterator<Item = &'a PriorityChain<H>> + 'a {
        trace!(candidate, "dispatch lookup");
        self.exact.get(candidate).into_iter().chain(
            self.patterns
                .values()
                .filter(move |pc| pc.matches(candidate))
                .map(|pc| &pc.chain),
        )
    }

    /// Handlers that apply to `candidate`, in chain order and then priority
    /// order. Empty when nothing matches.
    pub fn flatten<'a>(&'a self, candidate: &'a str) -> impl Iterator<Item = &'a H> + 'a {
        self.lookup(candidate).flat_map(PriorityChain::iter)
    }

    /// Every registered key, exact keys first
    pub fn keys(&self) -> impl Iterator<Item = DispatchKey> + '_ {
        self.exact
            .keys()
            .cloned()
            .map(DispatchKey::Exact)
            .chain(self.patterns.keys().cloned().map(DispatchKey::Pattern))
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
