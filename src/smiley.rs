//! Smiley tries keyed by dialect.
//!
//! Each dialect (usually a protocol name such as `"aim"` or `"jabber"`)
//! owns a character trie of emoticon tokens. Lookups walk the trie from
//! the current input position and report the longest token that ends on
//! a node carrying a handle. A lookup that finds nothing in its dialect
//! retries once against the default trie.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::entity;

/// Opaque reference to a host-side smiley image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SmileyHandle(pub u32);

#[derive(Debug, Default, Clone)]
struct Node {
    edges: SmallVec<[(char, usize); 4]>,
    handle: Option<SmileyHandle>,
}

/// Character trie of tokens for one dialect.
///
/// Nodes live in an arena; index 0 is the root.
#[derive(Debug, Clone)]
pub struct SmileyTree {
    nodes: Vec<Node>,
}

impl Default for SmileyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SmileyTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    #[inline]
    fn child(&self, node: usize, ch: char) -> Option<usize> {
        self.nodes[node]
            .edges
            .iter()
            .find(|&&(c, _)| c == ch)
            .map(|&(_, idx)| idx)
    }

    /// Add `token`, replacing the handle if it already exists.
    pub fn insert(&mut self, token: &str, handle: SmileyHandle) {
        let mut node = 0;
        for ch in token.chars() {
            node = match self.child(node, ch) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].edges.push((ch, next));
                    next
                }
            };
        }
        self.nodes[node].handle = Some(handle);
    }

    /// Remove `token`, returning its handle. Nodes are left in place.
    pub fn remove(&mut self, token: &str) -> Option<SmileyHandle> {
        let node = self.find(token)?;
        self.nodes[node].handle.take()
    }

    /// Exact lookup of an unescaped token.
    pub fn get(&self, token: &str) -> Option<SmileyHandle> {
        self.find(token).and_then(|node| self.nodes[node].handle)
    }

    fn find(&self, token: &str) -> Option<usize> {
        token
            .chars()
            .try_fold(0, |node, ch| self.child(node, ch))
    }

    /// Length in bytes of the longest token at the start of `text`, or 0.
    ///
    /// An entity in `text` is matched as the single character it stands
    /// for, so `&lt;3` matches the token `<3`. A literal `<` ends the walk.
    pub fn longest_match(&self, text: &str) -> usize {
        let bytes = text.as_bytes();
        let mut node = 0;
        let mut pos = 0;
        let mut best = 0;

        while pos < bytes.len() {
            let (ch, width) = match bytes[pos] {
                b'<' => break,
                b'&' => entity::resolve(&bytes[pos..]).unwrap_or(('&', 1)),
                _ => match text[pos..].chars().next() {
                    Some(ch) => (ch, ch.len_utf8()),
                    None => break,
                },
            };
            match self.child(node, ch) {
                Some(next) => node = next,
                None => break,
            }
            pos += width;
            if self.nodes[node].handle.is_some() {
                best = pos;
            }
        }

        best
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].edges.is_empty()
    }
}

/// All smiley tries known to an editing session.
///
/// # Example
/// ```
/// use imhtml::smiley::{SmileyHandle, SmileyRegistry};
///
/// let mut smileys = SmileyRegistry::new();
/// smileys.associate(None, ":)", SmileyHandle(1));
/// smileys.associate(Some("aim"), ":-)", SmileyHandle(2));
///
/// assert_eq!(smileys.longest_match(Some("aim"), ":-) hi"), 3);
/// // Falls back to the default dialect.
/// assert_eq!(smileys.longest_match(Some("aim"), ":) hi"), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct SmileyRegistry {
    default: SmileyTree,
    dialects: FxHashMap<String, SmileyTree>,
}

impl SmileyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn tree(&self, dialect: Option<&str>) -> Option<&SmileyTree> {
        dialect.and_then(|d| self.dialects.get(d))
    }

    /// Register `token` for `dialect` (`None` is the default dialect).
    pub fn associate(&mut self, dialect: Option<&str>, token: &str, handle: SmileyHandle) {
        match dialect {
            Some(d) => self.dialects.entry(d.to_string()).or_default().insert(token, handle),
            None => self.default.insert(token, handle),
        }
    }

    pub fn remove(&mut self, dialect: Option<&str>, token: &str) -> Option<SmileyHandle> {
        match dialect {
            Some(d) => self.dialects.get_mut(d)?.remove(token),
            None => self.default.remove(token),
        }
    }

    /// Exact lookup, trying `dialect` first and then the default dialect.
    pub fn get(&self, dialect: Option<&str>, token: &str) -> Option<SmileyHandle> {
        self.tree(dialect)
            .and_then(|t| t.get(token))
            .or_else(|| self.default.get(token))
    }

    /// Longest token at the start of `text`, trying `dialect` first and
    /// then the default dialect once.
    pub fn longest_match(&self, dialect: Option<&str>, text: &str) -> usize {
        match self.tree(dialect).map(|t| t.longest_match(text)) {
            Some(len) if len > 0 => len,
            _ => self.default.longest_match(text),
        }
    }

    /// Forget every dialect and the default tokens.
    pub fn remove_all(&mut self) {
        self.dialects.clear();
        self.default = SmileyTree::new();
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_empty() && self.dialects.values().all(SmileyTree::is_empty)
    }
}
