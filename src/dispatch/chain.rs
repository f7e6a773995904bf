//! Priority-ordered handler chains

use std::iter::Map;
use std::slice;

/// Identifies one entry within a [`PriorityChain`], or within every chain of
/// a registry when the registry hands them out.
///
/// Ids are handed out in insertion order and never reused, so they double as
/// the insertion index that breaks priority ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    pub(super) fn new(index: u64) -> Self {
        EntryId(index)
    }

    /// Insertion index of the entry within its chain
    pub fn index(self) -> u64 {
        self.0
    }
}

/// A handler with its dispatch metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerEntry<H> {
    handler: H,
    priority: i64,
    id: EntryId,
}

impl<H> HandlerEntry<H> {
    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn id(&self) -> EntryId {
        self.id
    }
}

/// Handlers kept in dispatch order: higher priority first, and among equal
/// priorities, earlier registration first.
///
/// Iteration borrows the chain, so it cannot change while an iteration is in
/// progress. Each new call to [`iter`](Self::iter) sees the current contents.
#[derive(Debug, Clone)]
pub struct PriorityChain<H> {
    entries: Vec<HandlerEntry<H>>,
    next_id: u64,
}

impl<H> Default for PriorityChain<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<H> PriorityChain<H> {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a handler, returning the id that can later remove it
    pub fn add(&mut self, handler: H, priority: i64) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.insert(handler, priority, id);
        id
    }

    /// Insert with an id from an outside counter that only grows
    pub(super) fn insert(&mut self, handler: H, priority: i64, id: EntryId) {
        // New ids are always the largest, so the entry goes after every
        // existing entry of the same or higher priority
        let at = self.entries.partition_point(|e| e.priority >= priority);
        self.entries.insert(
            at,
            HandlerEntry {
                handler,
                priority,
                id,
            },
        );
    }

    /// Remove an entry, keeping the relative order of the rest
    pub fn remove(&mut self, id: EntryId) -> Option<H> {
        let at = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(at).handler)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handlers in dispatch order
    pub fn iter(&self) -> Iter<'_, H> {
        let handler: fn(&HandlerEntry<H>) -> &H = HandlerEntry::handler;
        self.entries.iter().map(handler)
    }

    /// Entries with their priority and id, in dispatch order
    pub fn entries(&self) -> &[HandlerEntry<H>] {
        &self.entries
    }
}

/// Iterator over the handlers of a [`PriorityChain`]
pub type Iter<'a, H> = Map<slice::Iter<'a, HandlerEntry<H>>, fn(&HandlerEntry<H>) -> &H>;

impl<'a, H> IntoIterator for &'a PriorityChain<H> {
    type Item = &'a H;
    type IntoIter = Iter<'a, H>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handlers(chain: &PriorityChain<&'static str>) -> Vec<&'static str> {
        chain.iter().copied().collect()
    }

    #[test]
    fn test_higher_priority_first() {
        let mut chain = PriorityChain::new();
        chain.add("low", 1);
        chain.add("high", 10);
        chain.add("mid", 5);
        assert_eq!(handlers(&chain), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut chain = PriorityChain::new();
        chain.add("a", 4);
        chain.add("b", 2);
        chain.add("c", 4);
        chain.add("d", 2);
        assert_eq!(handlers(&chain), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_negative_priorities() {
        let mut chain = PriorityChain::new();
        chain.add("default", 0);
        chain.add("fallback", -5);
        chain.add("first", 1);
        assert_eq!(handlers(&chain), vec!["first", "default", "fallback"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut chain = PriorityChain::new();
        let a = chain.add("a", 1);
        let b = chain.add("b", 1);
        chain.add("c", 1);
        chain.add("d", 0);

        assert_eq!(chain.remove(b), Some("b"));
        assert_eq!(handlers(&chain), vec!["a", "c", "d"]);
        assert_eq!(chain.remove(b), None);
        assert_eq!(chain.remove(a), Some("a"));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut chain = PriorityChain::new();
        let first = chain.add("x", 0);
        chain.remove(first);
        let second = chain.add("y", 0);
        assert_ne!(first, second);
        assert!(second.index() > first.index());
    }

    #[test]
    fn test_readd_after_remove_goes_last_among_equals() {
        let mut chain = PriorityChain::new();
        let a = chain.add("a", 3);
        chain.add("b", 3);
        chain.remove(a);
        chain.add("a", 3);
        assert_eq!(handlers(&chain), vec!["b", "a"]);
    }

    #[test]
    fn test_iteration_is_restartable_and_live() {
        let mut chain = PriorityChain::new();
        chain.add("a", 1);

        let first: Vec<_> = chain.iter().copied().collect();
        let again: Vec<_> = chain.iter().copied().collect();
        assert_eq!(first, again);

        // A fresh iteration reflects mutations made since the last one
        chain.add("b", 2);
        assert_eq!(handlers(&chain), vec!["b", "a"]);
    }

    #[test]
    fn test_entries_expose_metadata() {
        let mut chain = PriorityChain::new();
        let id = chain.add("h", 7);
        let entry = &chain.entries()[0];
        assert_eq!(entry.handler(), &"h");
        assert_eq!(entry.priority(), 7);
        assert_eq!(entry.id(), id);
    }

    #[test]
    fn test_into_iterator() {
        let mut chain = PriorityChain::new();
        chain.add(1, 0);
        chain.add(2, 1);
        let mut seen = Vec::new();
        for h in &chain {
            seen.push(*h);
        }
        assert_eq!(seen, vec![2, 1]);
        assert!(!chain.is_empty());
    }
}
