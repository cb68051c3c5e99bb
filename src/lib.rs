//! # tourney-rs
//!
//! Word frequency ranking over a tournament-ordered binary search tree.
//!
//! Keys are ordered as a BST (byte-lexicographic) while occurrence counts are
//! max-heap ordered, so the most frequent words sit near the root and a whole
//! tier of equally frequent words can be peeled off in a single sweep.
//!
//! ## Example
//!
//! ```rust
//! use tourney_rs::TourneyTree;
//!
//! let mut tree = TourneyTree::new();
//! for word in ["cat", "dog", "cat", "bird", "dog", "cat"] {
//!     tree.insert(word.as_bytes()).unwrap();
//! }
//!
//! let tiers: Vec<Vec<(String, u64)>> = tree
//!     .drain_tiers()
//!     .map(|tier| {
//!         tier.into_iter()
//!             .map(|e| (String::from_utf8_lossy(&e.key).into_owned(), e.count))
//!             .collect()
//!     })
//!     .collect();
//!
//! assert_eq!(tiers[0], vec![("cat".to_string(), 3)]);
//! assert_eq!(tiers[1], vec![("dog".to_string(), 2)]);
//! assert_eq!(tiers[2], vec![("bird".to_string(), 1)]);
//! assert!(tree.is_empty());
//! ```

pub mod corpus;
pub mod dot;
mod error;
pub mod report;
pub mod token;

pub use error::{Error, Result};

use std::cmp::Ordering;
use std::mem;
use std::ops::{Index, IndexMut};

// =============================================================================
// Handles and slots
// =============================================================================

/// Node handle: index into the arena. `NULL` marks an absent child.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct NodeId(u32);

impl NodeId {
    const NULL: NodeId = NodeId(u32::MAX);

    #[inline]
    fn is_null(self) -> bool {
        self == Self::NULL
    }

    #[inline]
    fn idx(self) -> usize {
        debug_assert!(!self.is_null());
        self.0 as usize
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::NULL
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Dir {
    Left,
    Right,
}

/// Where a subtree root is bound: the tree root, or one child field of a parent.
///
/// Every restructuring helper returns the new subtree root and the caller
/// rebinds it through the slot it came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Slot {
    Root,
    Left(NodeId),
    Right(NodeId),
}

impl Slot {
    #[inline]
    fn child_of(parent: NodeId, dir: Dir) -> Self {
        match dir {
            Dir::Left => Slot::Left(parent),
            Dir::Right => Slot::Right(parent),
        }
    }
}

/// Slot of the last node on a descent path.
#[inline]
fn path_slot(path: &[(NodeId, Dir)]) -> Slot {
    path.last()
        .map_or(Slot::Root, |&(parent, dir)| Slot::child_of(parent, dir))
}

// =============================================================================
// Node arena
// =============================================================================
//
// Nodes live in one `Vec` and are addressed by `NodeId`. Released slots go on
// a free list and are reused by the next allocation; releasing a node moves
// its key out so the key storage is not held by a dead slot.

#[derive(Clone, Debug)]
struct Node {
    key: Box<[u8]>,
    count: u64,
    left: NodeId,
    right: NodeId,
}

impl Node {
    #[inline]
    fn child(&self, dir: Dir) -> NodeId {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }
}

#[derive(Clone, Default)]
struct NodeArena {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
}

impl NodeArena {
    /// Allocates a detached leaf with count 1.
    ///
    /// Both the key copy and the arena slot are reserved fallibly before
    /// anything is written, so a failure leaves the arena untouched.
    fn alloc(&mut self, key: &[u8]) -> Result<NodeId> {
        let mut owned = Vec::new();
        owned.try_reserve_exact(key.len())?;
        owned.extend_from_slice(key);
        let node = Node {
            key: owned.into_boxed_slice(),
            count: 1,
            left: NodeId::NULL,
            right: NodeId::NULL,
        };

        if let Some(id) = self.free.pop() {
            self.nodes[id.idx()] = node;
            return Ok(id);
        }

        let idx = self.nodes.len();
        if idx >= NodeId::NULL.0 as usize {
            return Err(Error::ArenaFull(idx));
        }
        self.nodes.try_reserve(1)?;
        self.nodes.push(node);
        Ok(NodeId(idx as u32))
    }

    /// Returns a detached node's slot to the free list, handing back its payload.
    fn release(&mut self, id: NodeId) -> Entry {
        let node = &mut self.nodes[id.idx()];
        let entry = Entry {
            key: mem::take(&mut node.key),
            count: node.count,
        };
        node.count = 0;
        node.left = NodeId::NULL;
        node.right = NodeId::NULL;
        self.free.push(id);
        entry
    }

    /// Exchanges `(key, count)` between two nodes, leaving links in place.
    fn swap_payload(&mut self, a: NodeId, b: NodeId) {
        debug_assert_ne!(a, b);
        let key = mem::take(&mut self[a].key);
        let count = self[a].count;
        let other = &mut self[b];
        let key = mem::replace(&mut other.key, key);
        let count = mem::replace(&mut other.count, count);
        let node = &mut self[a];
        node.key = key;
        node.count = count;
    }

    /// Rotates left at `x` and returns the new subtree root (`x.right`).
    #[inline]
    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let pivot = self[x].right;
        debug_assert!(!pivot.is_null(), "rotate_left without right child");
        self[x].right = self[pivot].left;
        self[pivot].left = x;
        pivot
    }

    /// Rotates right at `x` and returns the new subtree root (`x.left`).
    #[inline]
    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let pivot = self[x].left;
        debug_assert!(!pivot.is_null(), "rotate_right without left child");
        self[x].left = self[pivot].right;
        self[pivot].right = x;
        pivot
    }

    /// Lifts the child of `x` on side `dir` above `x`.
    ///
    /// Afterwards `x` is the returned root's child on the opposite side.
    #[inline]
    fn promote(&mut self, x: NodeId, dir: Dir) -> NodeId {
        match dir {
            Dir::Left => self.rotate_right(x),
            Dir::Right => self.rotate_left(x),
        }
    }

    /// Side holding the child with the larger count, ties going right.
    fn heavier_child(&self, id: NodeId) -> Option<(Dir, u64)> {
        let node = &self[id];
        match (node.left.is_null(), node.right.is_null()) {
            (true, true) => None,
            (true, false) => Some((Dir::Right, self[node.right].count)),
            (false, true) => Some((Dir::Left, self[node.left].count)),
            (false, false) => {
                let (l, r) = (self[node.left].count, self[node.right].count);
                if l > r {
                    Some((Dir::Left, l))
                } else {
                    Some((Dir::Right, r))
                }
            }
        }
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()]
    }
}

impl IndexMut<NodeId> for NodeArena {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.idx()]
    }
}

/// Where a lifted subtree root leaves the node it was lifted over.
#[inline]
fn demoted_slot(new_root: NodeId, lifted: Dir) -> Slot {
    match lifted {
        Dir::Left => Slot::Right(new_root),
        Dir::Right => Slot::Left(new_root),
    }
}

// =============================================================================
// TourneyTree
// =============================================================================

/// A word removed from the tree, with the count it had when removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: Box<[u8]>,
    pub count: u64,
}

/// Binary search tree on byte-string keys that is also a max-heap on a
/// per-key occurrence count.
///
/// Invariants after every public operation:
/// - keys in a left subtree are smaller than the node's key, keys in a right
///   subtree are larger;
/// - a node's count is at least the count of each child.
///
/// Height is not bounded: every traversal uses an explicit stack.
#[derive(Clone, Default)]
pub struct TourneyTree {
    arena: NodeArena,
    root: NodeId,
    len: usize,
}

/// Sweep frames for tier extraction.
#[derive(Clone, Copy, Debug)]
enum Sweep {
    /// Sweep the subtree bound at the slot.
    Visit(Slot),
    /// The left subtree is swept; remove the node if it still carries the
    /// tier count.
    Take(Slot),
    /// The node survived with a lower count; restore heap order below it.
    Settle(Slot),
}

impl TourneyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }

    /// Count at the root, which is the maximum count in the tree.
    pub fn max_count(&self) -> Option<u64> {
        (!self.root.is_null()).then(|| self.arena[self.root].count)
    }

    #[inline]
    fn slot(&self, slot: Slot) -> NodeId {
        match slot {
            Slot::Root => self.root,
            Slot::Left(parent) => self.arena[parent].left,
            Slot::Right(parent) => self.arena[parent].right,
        }
    }

    #[inline]
    fn bind(&mut self, slot: Slot, id: NodeId) {
        match slot {
            Slot::Root => self.root = id,
            Slot::Left(parent) => self.arena[parent].left = id,
            Slot::Right(parent) => self.arena[parent].right = id,
        }
    }

    fn find(&self, key: &[u8]) -> Option<(Slot, NodeId)> {
        let mut slot = Slot::Root;
        let mut cur = self.root;
        while !cur.is_null() {
            let node = &self.arena[cur];
            let dir = match key.cmp(&*node.key) {
                Ordering::Equal => return Some((slot, cur)),
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
            };
            slot = Slot::child_of(cur, dir);
            cur = node.child(dir);
        }
        None
    }

    pub fn get(&self, key: &[u8]) -> Option<u64> {
        self.find(key).map(|(_, id)| self.arena[id].count)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find(key).is_some()
    }

    /// Records one occurrence of `key` and returns its count afterwards.
    ///
    /// A new key becomes a leaf with count 1. While unwinding the descent path,
    /// a child whose count is strictly greater than its parent's is rotated
    /// above it; equal counts never rotate, so among equally frequent keys the
    /// one that got there first stays on top.
    ///
    /// On allocation failure nothing is linked and the tree is unchanged.
    pub fn insert(&mut self, key: &[u8]) -> Result<u64> {
        let mut path: Vec<(NodeId, Dir)> = Vec::new();
        let mut cur = self.root;
        while !cur.is_null() {
            let node = &self.arena[cur];
            let dir = match key.cmp(&*node.key) {
                Ordering::Equal => break,
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
            };
            path.push((cur, dir));
            cur = node.child(dir);
        }

        let count = if cur.is_null() {
            let id = self.arena.alloc(key)?;
            self.bind(path_slot(&path), id);
            self.len += 1;
            1
        } else {
            let node = &mut self.arena[cur];
            node.count += 1;
            node.count
        };

        // Only the parent of the subtree root that just changed can be out of
        // heap order; once a level is fine the rest of the path is too.
        while let Some((parent, dir)) = path.pop() {
            let child = self.arena[parent].child(dir);
            if self.arena[child].count <= self.arena[parent].count {
                break;
            }
            let root = self.arena.promote(parent, dir);
            self.bind(path_slot(&path), root);
        }

        Ok(count)
    }

    /// Removes `key` and returns the count it had, or `None` if it is absent.
    ///
    /// The node is rotated down until it is a leaf, lifting the child with
    /// the larger count at each step (the right child on ties), then unlinked.
    pub fn remove(&mut self, key: &[u8]) -> Option<u64> {
        let (mut slot, target) = self.find(key)?;
        while let Some((dir, _)) = self.arena.heavier_child(target) {
            let root = self.arena.promote(target, dir);
            self.bind(slot, root);
            slot = demoted_slot(root, dir);
        }
        self.bind(slot, NodeId::NULL);
        self.len -= 1;
        Some(self.arena.release(target).count)
    }

    /// Removes every key whose count equals the current maximum.
    ///
    /// The result is sorted by key and empty only if the tree was empty. The
    /// remaining keys keep both orderings, so the next call returns the next
    /// lower tier.
    pub fn extract_max_tier(&mut self) -> Vec<Entry> {
        let mut tier = Vec::new();
        let Some(max) = self.max_count() else {
            return tier;
        };

        // Nodes carrying `max` form a connected region around the root, so a
        // node below `max` ends the sweep of its subtree.
        let mut stack = vec![Sweep::Visit(Slot::Root)];
        while let Some(frame) = stack.pop() {
            match frame {
                Sweep::Visit(slot) => {
                    let id = self.slot(slot);
                    if id.is_null() || self.arena[id].count != max {
                        continue;
                    }
                    stack.push(Sweep::Take(slot));
                    stack.push(Sweep::Visit(Slot::Left(id)));
                }
                Sweep::Take(slot) => {
                    let id = self.slot(slot);
                    let node = &self.arena[id];
                    if node.count != max {
                        stack.push(Sweep::Settle(slot));
                        stack.push(Sweep::Visit(Slot::Right(id)));
                        continue;
                    }
                    let (left, right) = (node.left, node.right);
                    match (left.is_null(), right.is_null()) {
                        // Leaf, or left child only (already swept).
                        (_, true) => {
                            self.bind(slot, left);
                            tier.push(self.detach(id));
                        }
                        (true, false) => {
                            self.bind(slot, right);
                            tier.push(self.detach(id));
                            stack.push(Sweep::Visit(slot));
                        }
                        (false, false) => {
                            // Swap payloads with the in-order successor, then
                            // unlink the successor node, which now holds this
                            // entry and has no left child.
                            let (succ_slot, succ) = self.leftmost(Slot::Right(id));
                            self.arena.swap_payload(id, succ);
                            let succ_right = self.arena[succ].right;
                            self.bind(succ_slot, succ_right);
                            tier.push(self.detach(succ));
                            stack.push(Sweep::Take(slot));
                        }
                    }
                }
                Sweep::Settle(slot) => self.sift_down(slot),
            }
        }

        debug_assert!(tier.windows(2).all(|w| w[0].key < w[1].key));
        tier
    }

    /// Yields tiers from the most to the least frequent until the tree is empty.
    pub fn drain_tiers(&mut self) -> DrainTiers<'_> {
        DrainTiers { tree: self }
    }

    fn detach(&mut self, id: NodeId) -> Entry {
        self.len -= 1;
        self.arena.release(id)
    }

    fn leftmost(&self, mut slot: Slot) -> (Slot, NodeId) {
        let mut id = self.slot(slot);
        loop {
            let left = self.arena[id].left;
            if left.is_null() {
                return (slot, id);
            }
            slot = Slot::Left(id);
            id = left;
        }
    }

    /// Rotates the node bound at `slot` down while a child outranks it.
    /// Both of its subtrees must already be heap ordered.
    fn sift_down(&mut self, mut slot: Slot) {
        let id = self.slot(slot);
        while let Some((dir, count)) = self.arena.heavier_child(id) {
            if count <= self.arena[id].count {
                break;
            }
            let root = self.arena.promote(id, dir);
            self.bind(slot, root);
            slot = demoted_slot(root, dir);
        }
    }

    /// Sum of all counts.
    pub fn total_occurrences(&self) -> u64 {
        let mut total = 0u64;
        let mut stack: Vec<NodeId> = Vec::new();
        if !self.root.is_null() {
            stack.push(self.root);
        }
        while let Some(id) = stack.pop() {
            let node = &self.arena[id];
            total += node.count;
            for child in [node.left, node.right] {
                if !child.is_null() {
                    stack.push(child);
                }
            }
        }
        total
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        if !self.root.is_null() {
            stack.push((self.root, 1));
        }
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.arena[id];
            for child in [node.left, node.right] {
                if !child.is_null() {
                    stack.push((child, depth + 1));
                }
            }
        }
        height
    }

    /// Keys with their counts, in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            arena: &self.arena,
            stack: Vec::new(),
            next: self.root,
        }
    }
}

impl std::fmt::Debug for TourneyTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, c)| (String::from_utf8_lossy(k), c)))
            .finish()
    }
}

pub struct DrainTiers<'a> {
    tree: &'a mut TourneyTree,
}

impl Iterator for DrainTiers<'_> {
    type Item = Vec<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.tree.is_empty() {
            return None;
        }
        Some(self.tree.extract_max_tier())
    }
}

pub struct Iter<'a> {
    arena: &'a NodeArena,
    stack: Vec<NodeId>,
    next: NodeId,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], u64);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        while !self.next.is_null() {
            self.stack.push(self.next);
            self.next = arena[self.next].left;
        }
        let id = self.stack.pop()?;
        let node = &arena[id];
        self.next = node.right;
        Some((&node.key[..], node.count))
    }
}


#[cfg(test)]
mod proptests;
