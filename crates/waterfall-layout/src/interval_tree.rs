#![forbid(unsafe_code)]

//! Augmented red-black interval tree for vertical overlap queries.
//!
//! Each placed item contributes one closed span `[low, high]` (its top and
//! bottom edge). Spans are keyed by `low`; items that start at the same
//! offset (one per column is common) share a node and are kept as an ordered
//! entry list on it.
//!
//! # Layout
//!
//! Nodes live in an arena (`Vec<Node>`) and link to each other by index.
//! Absent children are `None` rather than a shared nil node, and freed slots
//! are recycled through a free list. A separate `id -> node` index makes
//! [`IntervalTree::remove`] independent of the span's coordinates.
//!
//! # Operations
//!
//! | Operation | Time |
//! |-----------|------|
//! | `insert(low, high, id)` | O(log n) |
//! | `remove(id)` | O(log n) |
//! | `search(lo, hi, f)` | O(log n + m) |
//! | `validate()` | O(n) |
//!
//! # Invariants
//!
//! 1. The root is black and no red node has a red child.
//! 2. Every root-to-leaf path holds the same number of black nodes.
//! 3. `node.high` is the greatest `high` among the node's entries.
//! 4. `node.max` is the greatest `high` in the node's subtree.
//! 5. `len()` equals the number of live ids.

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};

/// Stable identifier of an item indexed by the tree.
pub type ItemId = usize;

type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    id: ItemId,
    high: f64,
}

#[derive(Debug, Clone)]
struct Node {
    low: f64,
    high: f64,
    max: f64,
    color: Color,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    entries: SmallVec<[Entry; 2]>,
}

/// Red-black interval tree keyed by span start.
#[derive(Debug, Clone, Default)]
pub struct IntervalTree {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    index: FxHashMap<ItemId, NodeId>,
}

/// A broken structural invariant found by [`IntervalTree::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum TreeInvariantError {
    /// The root node is red.
    RedRoot,
    /// A red node has a red child.
    RedRedEdge {
        /// Start offset of the red parent.
        low: f64,
    },
    /// Two paths below this node hold different black counts.
    BlackHeightMismatch {
        /// Start offset of the node.
        low: f64,
    },
    /// A node's key violates search-tree ordering.
    OutOfOrder {
        /// Start offset of the misplaced node.
        low: f64,
    },
    /// A child does not point back at its parent.
    BrokenParentLink {
        /// Start offset of the child.
        low: f64,
    },
    /// A live node holds no entries.
    EmptyNode {
        /// Start offset of the node.
        low: f64,
    },
    /// `high` differs from the greatest entry end.
    StaleHigh {
        /// Start offset of the node.
        low: f64,
    },
    /// `max` differs from the greatest end in the subtree.
    StaleMax {
        /// Start offset of the node.
        low: f64,
        /// Value recomputed from the subtree.
        expected: f64,
        /// Value cached on the node.
        actual: f64,
    },
    /// An id is missing from, or points elsewhere in, the id index.
    IndexMismatch {
        /// The offending id.
        id: ItemId,
    },
    /// The id index and the stored entries disagree on size.
    SizeMismatch {
        /// Ids in the index.
        indexed: usize,
        /// Entries reachable from the root.
        stored: usize,
    },
}

impl fmt::Display for TreeInvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot => write!(f, "root node is red"),
            Self::RedRedEdge { low } => write!(f, "red node at {low} has a red child"),
            Self::BlackHeightMismatch { low } => {
                write!(f, "black height differs between subtrees of node at {low}")
            }
            Self::OutOfOrder { low } => write!(f, "node at {low} violates key ordering"),
            Self::BrokenParentLink { low } => {
                write!(f, "node at {low} does not point back at its parent")
            }
            Self::EmptyNode { low } => write!(f, "node at {low} has no entries"),
            Self::StaleHigh { low } => write!(f, "node at {low} caches a stale high"),
            Self::StaleMax {
                low,
                expected,
                actual,
            } => write!(f, "node at {low} caches max {actual}, subtree max is {expected}"),
            Self::IndexMismatch { id } => write!(f, "item {id} is not indexed at its node"),
            Self::SizeMismatch { indexed, stored } => {
                write!(f, "index holds {indexed} ids but tree stores {stored} entries")
            }
        }
    }
}

impl std::error::Error for TreeInvariantError {}

impl IntervalTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live ids.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the tree holds no spans.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether `id` is currently indexed.
    #[inline]
    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// Drop every span and release the arena.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.index.clear();
    }

    /// Index the span `[low, high]` under `id`.
    ///
    /// Returns `false` without changing the tree when `id` is already indexed
    /// or either bound is NaN.
    pub fn insert(&mut self, low: f64, high: f64, id: ItemId) -> bool {
        if low.is_nan() || high.is_nan() || self.index.contains_key(&id) {
            return false;
        }

        let mut parent = None;
        let mut go_left = false;
        let mut cursor = self.root;
        while let Some(n) = cursor {
            let (node_low, node_left, node_right) =
                (self.nodes[n].low, self.nodes[n].left, self.nodes[n].right);
            if low == node_low {
                let node = &mut self.nodes[n];
                node.entries.push(Entry { id, high });
                if high > node.high {
                    node.high = high;
                    self.propagate_max(Some(n));
                }
                self.index.insert(id, n);
                return true;
            }
            parent = Some(n);
            go_left = low < node_low;
            cursor = if go_left { node_left } else { node_right };
        }

        let z = self.alloc(Node {
            low,
            high,
            max: high,
            color: Color::Red,
            left: None,
            right: None,
            parent,
            entries: smallvec![Entry { id, high }],
        });
        match parent {
            None => self.root = Some(z),
            Some(p) if go_left => self.nodes[p].left = Some(z),
            Some(p) => self.nodes[p].right = Some(z),
        }
        self.index.insert(id, z);
        self.propagate_max(parent);
        self.insert_fixup(z);
        true
    }

    /// Remove the span indexed under `id`.
    ///
    /// Returns `false` when `id` is unknown.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let Some(n) = self.index.remove(&id) else {
            return false;
        };

        let node = &mut self.nodes[n];
        if node.entries.len() > 1 {
            node.entries.retain(|entry| entry.id != id);
            node.high = node
                .entries
                .iter()
                .map(|entry| entry.high)
                .fold(f64::NEG_INFINITY, f64::max);
            self.propagate_max(Some(n));
            return true;
        }

        self.delete_node(n);
        true
    }

    /// Report every span overlapping `[lo, hi]` as `callback(id, low)`.
    ///
    /// A span `[low, high]` overlaps when `low <= hi && high >= lo`. Nothing is
    /// reported for a degenerate query (`lo > hi` or NaN bounds).
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn search<F>(&self, lo: f64, hi: f64, mut callback: F)
    where
        F: FnMut(ItemId, f64),
    {
        if !(lo <= hi) {
            return;
        }
        let Some(root) = self.root else {
            return;
        };

        let mut stack: SmallVec<[NodeId; 64]> = smallvec![root];
        while let Some(n) = stack.pop() {
            let node = &self.nodes[n];
            // Nothing below this node reaches down to `lo`.
            if lo > node.max {
                continue;
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
            if node.low <= hi {
                for entry in &node.entries {
                    if entry.high >= lo {
                        callback(entry.id, node.low);
                    }
                }
                if let Some(right) = node.right {
                    stack.push(right);
                }
            }
        }
    }

    /// Collecting variant of [`IntervalTree::search`], ordered by `(low, id)`.
    #[must_use]
    pub fn query(&self, lo: f64, hi: f64) -> Vec<(ItemId, f64)> {
        let mut hits = Vec::new();
        self.search(lo, hi, |id, low| hits.push((id, low)));
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits
    }

    /// Walk the whole tree and check every structural invariant.
    pub fn validate(&self) -> Result<(), TreeInvariantError> {
        let Some(root) = self.root else {
            return if self.index.is_empty() {
                Ok(())
            } else {
                Err(TreeInvariantError::SizeMismatch {
                    indexed: self.index.len(),
                    stored: 0,
                })
            };
        };

        if self.nodes[root].color == Color::Red {
            return Err(TreeInvariantError::RedRoot);
        }
        if self.nodes[root].parent.is_some() {
            return Err(TreeInvariantError::BrokenParentLink {
                low: self.nodes[root].low,
            });
        }

        let mut stored = 0;
        self.validate_node(root, None, None, &mut stored)?;
        if stored != self.index.len() {
            return Err(TreeInvariantError::SizeMismatch {
                indexed: self.index.len(),
                stored,
            });
        }
        Ok(())
    }

    /// Returns the black height of the subtree rooted at `n`.
    fn validate_node(
        &self,
        n: NodeId,
        lower: Option<f64>,
        upper: Option<f64>,
        stored: &mut usize,
    ) -> Result<usize, TreeInvariantError> {
        let node = &self.nodes[n];
        let low = node.low;

        if lower.is_some_and(|bound| low <= bound) || upper.is_some_and(|bound| low >= bound) {
            return Err(TreeInvariantError::OutOfOrder { low });
        }
        if node.entries.is_empty() {
            return Err(TreeInvariantError::EmptyNode { low });
        }
        let entry_high = node
            .entries
            .iter()
            .map(|entry| entry.high)
            .fold(f64::NEG_INFINITY, f64::max);
        if entry_high != node.high {
            return Err(TreeInvariantError::StaleHigh { low });
        }
        for entry in &node.entries {
            if self.index.get(&entry.id) != Some(&n) {
                return Err(TreeInvariantError::IndexMismatch { id: entry.id });
            }
        }
        *stored += node.entries.len();

        let mut expected_max = node.high;
        let mut heights = [1usize; 2];
        for (slot, child) in [node.left, node.right].into_iter().enumerate() {
            let Some(c) = child else {
                continue;
            };
            let child_node = &self.nodes[c];
            if child_node.parent != Some(n) {
                return Err(TreeInvariantError::BrokenParentLink {
                    low: child_node.low,
                });
            }
            if node.color == Color::Red && child_node.color == Color::Red {
                return Err(TreeInvariantError::RedRedEdge { low });
            }
            let (lo_bound, hi_bound) = if slot == 0 {
                (lower, Some(low))
            } else {
                (Some(low), upper)
            };
            heights[slot] = self.validate_node(c, lo_bound, hi_bound, stored)?;
            expected_max = expected_max.max(child_node.max);
        }

        if heights[0] != heights[1] {
            return Err(TreeInvariantError::BlackHeightMismatch { low });
        }
        if expected_max != node.max {
            return Err(TreeInvariantError::StaleMax {
                low,
                expected: expected_max,
                actual: node.max,
            });
        }
        Ok(heights[0] + usize::from(node.color == Color::Black))
    }

    // --- Arena and augmentation helpers -----------------------------------

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, n: NodeId) {
        let node = &mut self.nodes[n];
        node.entries.clear();
        node.left = None;
        node.right = None;
        node.parent = None;
        self.free.push(n);
    }

    #[inline]
    fn is_red(&self, n: Option<NodeId>) -> bool {
        n.is_some_and(|n| self.nodes[n].color == Color::Red)
    }

    #[inline]
    fn paint(&mut self, n: Option<NodeId>, color: Color) {
        if let Some(n) = n {
            self.nodes[n].color = color;
        }
    }

    fn refresh_max(&mut self, n: NodeId) {
        let node = &self.nodes[n];
        let mut max = node.high;
        if let Some(left) = node.left {
            max = max.max(self.nodes[left].max);
        }
        if let Some(right) = node.right {
            max = max.max(self.nodes[right].max);
        }
        self.nodes[n].max = max;
    }

    /// Recompute `max` from `from` up to the root.
    fn propagate_max(&mut self, from: Option<NodeId>) {
        let mut cursor = from;
        while let Some(n) = cursor {
            self.refresh_max(n);
            cursor = self.nodes[n].parent;
        }
    }

    fn minimum(&self, mut n: NodeId) -> NodeId {
        while let Some(left) = self.nodes[n].left {
            n = left;
        }
        n
    }

    /// Point `parent`'s link to `old` (or the root) at `new`.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) if self.nodes[p].left == Some(old) => self.nodes[p].left = new,
            Some(p) => self.nodes[p].right = new,
        }
    }

    fn transplant(&mut self, u: NodeId, v: Option<NodeId>) {
        let parent = self.nodes[u].parent;
        self.replace_child(parent, u, v);
        if let Some(v) = v {
            self.nodes[v].parent = parent;
        }
    }

    // --- Rotations -----------------------------------------------------------

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].right else {
            return;
        };
        let inner = self.nodes[y].left;
        self.nodes[x].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }
        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));
        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
        self.refresh_max(x);
        self.refresh_max(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].left else {
            return;
        };
        let inner = self.nodes[y].right;
        self.nodes[x].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }
        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));
        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
        self.refresh_max(x);
        self.refresh_max(y);
    }

    // --- Rebalancing ---------------------------------------------------------

    fn insert_fixup(&mut self, mut z: NodeId) {
        loop {
            let Some(p) = self.nodes[z].parent else {
                break;
            };
            if self.nodes[p].color != Color::Red {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let Some(g) = self.nodes[p].parent else {
                break;
            };

            if self.nodes[g].left == Some(p) {
                let uncle = self.nodes[g].right;
                if self.is_red(uncle) {
                    self.nodes[p].color = Color::Black;
                    self.paint(uncle, Color::Black);
                    self.nodes[g].color = Color::Red;
                    z = g;
                    continue;
                }
                if self.nodes[p].right == Some(z) {
                    z = p;
                    self.rotate_left(z);
                }
                let Some(p) = self.nodes[z].parent else {
                    break;
                };
                let Some(g) = self.nodes[p].parent else {
                    break;
                };
                self.nodes[p].color = Color::Black;
                self.nodes[g].color = Color::Red;
                self.rotate_right(g);
            } else {
                let uncle = self.nodes[g].left;
                if self.is_red(uncle) {
                    self.nodes[p].color = Color::Black;
                    self.paint(uncle, Color::Black);
                    self.nodes[g].color = Color::Red;
                    z = g;
                    continue;
                }
                if self.nodes[p].left == Some(z) {
                    z = p;
                    self.rotate_right(z);
                }
                let Some(p) = self.nodes[z].parent else {
                    break;
                };
                let Some(g) = self.nodes[p].parent else {
                    break;
                };
                self.nodes[p].color = Color::Black;
                self.nodes[g].color = Color::Red;
                self.rotate_left(g);
            }
        }
        self.paint(self.root, Color::Black);
    }

    /// Unlink node `z` (successor splice) and restore the coloring rules.
    fn delete_node(&mut self, z: NodeId) {
        let (z_left, z_right) = (self.nodes[z].left, self.nodes[z].right);
        let mut removed_color = self.nodes[z].color;
        let x;
        let x_parent;

        match (z_left, z_right) {
            (None, _) => {
                x = z_right;
                x_parent = self.nodes[z].parent;
                self.transplant(z, z_right);
            }
            (Some(_), None) => {
                x = z_left;
                x_parent = self.nodes[z].parent;
                self.transplant(z, z_left);
            }
            (Some(left), Some(right)) => {
                let y = self.minimum(right);
                removed_color = self.nodes[y].color;
                x = self.nodes[y].right;
                if self.nodes[y].parent == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = self.nodes[y].parent;
                    self.transplant(y, x);
                    self.nodes[y].right = Some(right);
                    self.nodes[right].parent = Some(y);
                }
                self.transplant(z, Some(y));
                self.nodes[y].left = Some(left);
                self.nodes[left].parent = Some(y);
                self.nodes[y].color = self.nodes[z].color;
            }
        }

        // The successor (if moved) is an ancestor of `x_parent`, so one upward
        // pass refreshes every affected `max`.
        self.propagate_max(x_parent);
        if removed_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }
        self.release(z);
    }

    fn delete_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while x != self.root && !self.is_red(x) {
            let Some(p) = parent else {
                break;
            };

            if self.nodes[p].left == x {
                let Some(mut w) = self.nodes[p].right else {
                    break;
                };
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_left(p);
                    let Some(next) = self.nodes[p].right else {
                        break;
                    };
                    w = next;
                }
                if !self.is_red(self.nodes[w].left) && !self.is_red(self.nodes[w].right) {
                    self.nodes[w].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if !self.is_red(self.nodes[w].right) {
                        self.paint(self.nodes[w].left, Color::Black);
                        self.nodes[w].color = Color::Red;
                        self.rotate_right(w);
                        let Some(next) = self.nodes[p].right else {
                            break;
                        };
                        w = next;
                    }
                    self.nodes[w].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    self.paint(self.nodes[w].right, Color::Black);
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let Some(mut w) = self.nodes[p].left else {
                    break;
                };
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_right(p);
                    let Some(next) = self.nodes[p].left else {
                        break;
                    };
                    w = next;
                }
                if !self.is_red(self.nodes[w].left) && !self.is_red(self.nodes[w].right) {
                    self.nodes[w].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if !self.is_red(self.nodes[w].left) {
                        self.paint(self.nodes[w].right, Color::Black);
                        self.nodes[w].color = Color::Red;
                        self.rotate_left(w);
                        let Some(next) = self.nodes[p].left else {
                            break;
                        };
                        w = next;
                    }
                    self.nodes[w].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    self.paint(self.nodes[w].left, Color::Black);
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }
        self.paint(x, Color::Black);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(hits: &[(ItemId, f64)]) -> Vec<ItemId> {
        let mut ids: Vec<_> = hits.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids
    }

    // ─── Queries ───────────────────────────────────────────────────

    #[test]
    fn overlapping_spans_are_reported() {
        let mut tree = IntervalTree::new();
        tree.insert(0.0, 10.0, 1);
        tree.insert(5.0, 15.0, 2);
        tree.insert(20.0, 30.0, 3);

        assert_eq!(ids(&tree.query(8.0, 12.0)), vec![1, 2]);
        assert_eq!(ids(&tree.query(15.0, 20.0)), vec![2, 3]);
        assert_eq!(ids(&tree.query(31.0, 40.0)), Vec::<ItemId>::new());
    }

    #[test]
    fn search_reports_node_low() {
        let mut tree = IntervalTree::new();
        tree.insert(40.0, 90.0, 7);
        let mut seen = Vec::new();
        tree.search(50.0, 60.0, |id, low| seen.push((id, low)));
        assert_eq!(seen, vec![(7, 40.0)]);
    }

    #[test]
    fn degenerate_query_is_empty() {
        let mut tree = IntervalTree::new();
        tree.insert(0.0, 100.0, 0);
        assert!(tree.query(12.0, 8.0).is_empty());
        assert!(tree.query(f64::NAN, 8.0).is_empty());
    }

    #[test]
    fn empty_tree_queries_nothing() {
        let tree = IntervalTree::new();
        assert!(tree.query(0.0, 1000.0).is_empty());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn zero_height_span_is_a_point() {
        let mut tree = IntervalTree::new();
        tree.insert(50.0, 50.0, 4);
        assert_eq!(ids(&tree.query(50.0, 50.0)), vec![4]);
        assert_eq!(ids(&tree.query(0.0, 49.0)), Vec::<ItemId>::new());
    }

    #[test]
    fn query_is_sorted_by_low_then_id() {
        let mut tree = IntervalTree::new();
        tree.insert(20.0, 30.0, 5);
        tree.insert(0.0, 30.0, 9);
        tree.insert(0.0, 10.0, 2);
        let hits = tree.query(0.0, 100.0);
        assert_eq!(hits, vec![(2, 0.0), (9, 0.0), (5, 20.0)]);
    }

    // ─── Shared-start entries ──────────────────────────────────────

    #[test]
    fn same_low_spans_share_a_node() {
        let mut tree = IntervalTree::new();
        tree.insert(0.0, 100.0, 0);
        tree.insert(0.0, 250.0, 1);
        tree.insert(0.0, 80.0, 2);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(ids(&tree.query(200.0, 300.0)), vec![1]);
        tree.validate().unwrap();
    }

    #[test]
    fn removing_tallest_entry_shrinks_high() {
        let mut tree = IntervalTree::new();
        tree.insert(0.0, 100.0, 0);
        tree.insert(0.0, 250.0, 1);
        tree.insert(300.0, 310.0, 2);

        assert!(tree.remove(1));
        tree.validate().unwrap();
        assert!(tree.query(150.0, 250.0).is_empty());
        assert_eq!(ids(&tree.query(50.0, 60.0)), vec![0]);
    }

    #[test]
    fn duplicate_id_is_ignored() {
        let mut tree = IntervalTree::new();
        assert!(tree.insert(0.0, 10.0, 1));
        assert!(!tree.insert(0.0, 10.0, 1));
        assert!(!tree.insert(50.0, 60.0, 1));
        assert_eq!(tree.len(), 1);
        assert!(tree.query(50.0, 60.0).is_empty());
    }

    #[test]
    fn nan_bounds_are_rejected() {
        let mut tree = IntervalTree::new();
        assert!(!tree.insert(f64::NAN, 10.0, 1));
        assert!(!tree.insert(0.0, f64::NAN, 1));
        assert!(tree.is_empty());
    }

    // ─── Removal ───────────────────────────────────────────────────

    #[test]
    fn unknown_remove_is_noop() {
        let mut tree = IntervalTree::new();
        tree.insert(0.0, 10.0, 1);
        assert!(!tree.remove(42));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn remove_then_reinsert_reuses_slot() {
        let mut tree = IntervalTree::new();
        for id in 0..8 {
            tree.insert(id as f64 * 10.0, id as f64 * 10.0 + 5.0, id);
        }
        let arena = tree.nodes.len();
        assert!(tree.remove(3));
        assert!(tree.insert(1000.0, 1005.0, 3));
        assert_eq!(tree.nodes.len(), arena);
        tree.validate().unwrap();
    }

    #[test]
    fn sequential_inserts_stay_balanced() {
        let mut tree = IntervalTree::new();
        for id in 0..1024 {
            let low = id as f64 * 10.0;
            tree.insert(low, low + 25.0, id);
        }
        tree.validate().unwrap();
        assert_eq!(tree.len(), 1024);
        assert_eq!(ids(&tree.query(5000.0, 5000.0)), vec![498, 499, 500]);
    }

    #[test]
    fn removing_everything_empties_tree() {
        let mut tree = IntervalTree::new();
        for id in 0..200 {
            let low = ((id * 37) % 200) as f64;
            tree.insert(low, low + 3.0, id);
        }
        for id in (0..200).rev() {
            assert!(tree.remove(id));
            tree.validate().unwrap();
        }
        assert!(tree.is_empty());
        assert!(tree.root.is_none());
    }

    #[test]
    fn clear_resets_everything() {
        let mut tree = IntervalTree::new();
        tree.insert(0.0, 1.0, 0);
        tree.insert(2.0, 3.0, 1);
        tree.clear();
        assert!(tree.is_empty());
        assert!(!tree.contains(0));
        assert!(tree.query(0.0, 10.0).is_empty());
        assert!(tree.insert(0.0, 1.0, 0));
    }

    #[test]
    fn validate_detects_stale_max() {
        let mut tree = IntervalTree::new();
        tree.insert(0.0, 10.0, 0);
        tree.insert(5.0, 15.0, 1);
        let root = tree.root.unwrap();
        tree.nodes[root].max = 1.0;
        assert!(matches!(
            tree.validate(),
            Err(TreeInvariantError::StaleMax { .. })
        ));
    }

    #[test]
    fn validate_detects_red_root() {
        let mut tree = IntervalTree::new();
        tree.insert(0.0, 10.0, 0);
        let root = tree.root.unwrap();
        tree.nodes[root].color = Color::Red;
        assert_eq!(tree.validate(), Err(TreeInvariantError::RedRoot));
    }
}
