//! Character trie over lowercased property names.
//!
//! Nodes live in a flat arena and refer to their children by [`NodeId`],
//! so the structure is a strict tree with no shared ownership. Each node
//! keeps its children sorted by character, which makes lookups a binary
//! search and gives collection a fixed visiting order.

use crate::index::types::{BuildStats, CollisionPolicy, Match, PropertyId};

/// Handle of a node inside the arena; an index into the node vector
pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    /// Child links, sorted by character
    children: Vec<(char, NodeId)>,
    /// Entities whose full lowercased name ends here
    matches: Vec<Match>,
}

impl TrieNode {
    fn child(&self, ch: char) -> Option<NodeId> {
        self.children
            .binary_search_by_key(&ch, |&(c, _)| c)
            .ok()
            .map(|i| self.children[i].1)
    }
}

/// Lowercase `text` one character at a time.
///
/// Unlike `str::to_lowercase`, the result does not depend on the position of
/// a character (no final-sigma rule), so every prefix of a folded name is the
/// fold of the corresponding prefix of that name.
pub fn fold_key(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Result of storing one payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertOutcome {
    /// First payload for this id at the node
    Inserted,
    /// The same id was already stored here and got refreshed
    Replaced,
    /// The node already held a different entity
    Collided,
}

/// Prefix index answering "which names start with this text".
///
/// Built once (see [`PrefixIndex::build`]) and read-only afterwards; the
/// type holds no interior mutability and can be shared across threads.
#[derive(Debug, Clone)]
pub struct PrefixIndex {
    nodes: Vec<TrieNode>,
    policy: CollisionPolicy,
    match_count: usize,
    pub(crate) stats: BuildStats,
}

impl Default for PrefixIndex {
    fn default() -> Self {
        Self::empty(CollisionPolicy::default())
    }
}

impl PrefixIndex {
    /// Create an index containing only the root node
    pub fn empty(policy: CollisionPolicy) -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            policy,
            match_count: 0,
            stats: BuildStats::default(),
        }
    }

    /// Store `payload` at the node spelled by `key`, creating missing links.
    ///
    /// `key` must already be lowercased and non-empty.
    pub(crate) fn insert(&mut self, key: &str, payload: Match) -> InsertOutcome {
        let mut current = ROOT;
        for ch in key.chars() {
            current = self.child_or_insert(current, ch);
        }

        let policy = self.policy;
        let node = &mut self.nodes[current];

        if let Some(existing) = node.matches.iter_mut().find(|m| m.id == payload.id) {
            *existing = payload;
            return InsertOutcome::Replaced;
        }

        if node.matches.is_empty() {
            node.matches.push(payload);
            self.match_count += 1;
            return InsertOutcome::Inserted;
        }

        match policy {
            CollisionPolicy::KeepAll => {
                node.matches.push(payload);
                self.match_count += 1;
            }
            CollisionPolicy::LastWriteWins => {
                self.match_count -= node.matches.len();
                node.matches.clear();
                node.matches.push(payload);
                self.match_count += 1;
            }
        }
        InsertOutcome::Collided
    }

    fn child_or_insert(&mut self, parent: NodeId, ch: char) -> NodeId {
        let children = &self.nodes[parent].children;
        match children.binary_search_by_key(&ch, |&(c, _)| c) {
            Ok(pos) => children[pos].1,
            Err(pos) => {
                let id = self.nodes.len();
                self.nodes.push(TrieNode::default());
                self.nodes[parent].children.insert(pos, (ch, id));
                id
            }
        }
    }

    /// Walk from the root along `key`; `None` if some character has no link
    fn locate(&self, key: &str) -> Option<NodeId> {
        let mut current = ROOT;
        for ch in key.chars() {
            current = self.nodes[current].child(ch)?;
        }
        Some(current)
    }

    /// Every entity whose name starts with `text`, ignoring case.
    ///
    /// Results are ordered by lowercased name (a node's own matches come
    /// before those of its descendants, children in ascending character
    /// order); entities sharing one name keep their insertion order.
    pub fn query(&self, text: &str) -> Vec<Match> {
        self.query_with_limit(text, 0)
    }

    /// Like [`PrefixIndex::query`] but stops after `limit` matches (0 = unlimited)
    pub fn query_with_limit(&self, text: &str, limit: usize) -> Vec<Match> {
        if text.is_empty() {
            return Vec::new();
        }

        match self.locate(&fold_key(text)) {
            Some(node) => self.collect(node, limit),
            None => Vec::new(),
        }
    }

    /// True if at least one indexed name starts with `text`
    pub fn contains_prefix(&self, text: &str) -> bool {
        !text.is_empty() && self.locate(&fold_key(text)).is_some()
    }

    /// Ids of every entity whose name starts with `text`
    pub fn query_ids(&self, text: &str) -> Vec<PropertyId> {
        self.query(text).into_iter().map(|m| m.id).collect()
    }

    /// Pre-order walk with an explicit stack so depth never grows the call stack
    fn collect(&self, start: NodeId, limit: usize) -> Vec<Match> {
        let mut results = Vec::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            for m in &node.matches {
                if limit > 0 && results.len() >= limit {
                    return results;
                }
                results.push(m.clone());
            }
            // Reversed so the smallest character is popped first
            stack.extend(node.children.iter().rev().map(|&(_, child)| child));
        }

        results
    }

    /// Number of match payloads stored
    pub fn len(&self) -> usize {
        self.match_count
    }

    pub fn is_empty(&self) -> bool {
        self.match_count == 0
    }

    /// Number of trie nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }
}
