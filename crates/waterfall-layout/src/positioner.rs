#![forbid(unsafe_code)]

//! Shortest-column masonry positioner.
//!
//! [`Positioner`] owns one layout generation: a fixed column count and width,
//! the running height of every column, and the rectangle of every placed
//! item. Placed spans are indexed in an [`IntervalTree`] so the visible set can
//! be found without scanning every item.
//!
//! # Placement order
//!
//! Items must be placed in strictly increasing id order. Each column's item
//! list is then sorted by id, which is what lets [`Positioner::update`] find
//! the first changed item with a binary search and replay only the items
//! below it. Out-of-order placement is rejected with
//! [`PlacementError::OutOfOrder`].
//!
//! # Example
//!
//! ```
//! use waterfall_layout::{ColumnGeometry, Positioner};
//!
//! let mut positioner = Positioner::new(ColumnGeometry::new(2, 100.0), 10.0, 10.0);
//! positioner.set(0, 50.0).unwrap();
//! positioner.set(1, 80.0).unwrap();
//! positioner.set(2, 20.0).unwrap();
//!
//! // Item 2 lands under item 0, the shorter column.
//! let pos = positioner.get(2).unwrap();
//! assert_eq!((pos.column, pos.left, pos.top), (0, 0.0, 60.0));
//! ```

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{trace, warn};
use waterfall_core::geometry::ItemRect;

use crate::columns::ColumnGeometry;
use crate::interval_tree::{IntervalTree, ItemId};

/// Cached placement of one item.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemPosition {
    /// Left edge in pixels.
    pub left: f64,
    /// Top edge in pixels.
    pub top: f64,
    /// Measured height in pixels.
    pub height: f64,
    /// Column index the item was placed in.
    pub column: usize,
}

impl ItemPosition {
    /// Bottom edge (exclusive of the row gutter).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementError {
    /// `id` does not come after the last placed id.
    OutOfOrder {
        /// The rejected id.
        id: ItemId,
        /// The most recently placed id.
        last: ItemId,
    },
    /// The height is negative, infinite or NaN.
    InvalidHeight {
        /// The rejected id.
        id: ItemId,
        /// The offending height.
        height: f64,
    },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfOrder { id, last } => {
                write!(f, "item {id} placed after item {last}; ids must increase")
            }
            Self::InvalidHeight { id, height } => {
                write!(f, "item {id} has invalid height {height}")
            }
        }
    }
}

impl std::error::Error for PlacementError {}

#[inline]
fn valid_height(height: f64) -> bool {
    height.is_finite() && height >= 0.0
}

/// One masonry layout generation.
#[derive(Debug, Clone)]
pub struct Positioner {
    geometry: ColumnGeometry,
    column_gutter: f64,
    row_gutter: f64,
    /// Running bottom offset (including the trailing row gutter) per column.
    column_heights: Vec<f64>,
    items: FxHashMap<ItemId, ItemPosition>,
    /// Ids per column in placement order (ascending).
    column_items: Vec<Vec<ItemId>>,
    tree: IntervalTree,
    last_id: Option<ItemId>,
}

impl Positioner {
    /// Create an empty generation. A zero column count is raised to one.
    #[must_use]
    pub fn new(geometry: ColumnGeometry, column_gutter: f64, row_gutter: f64) -> Self {
        let geometry = ColumnGeometry::new(geometry.count.max(1), geometry.width);
        Self {
            geometry,
            column_gutter,
            row_gutter,
            column_heights: vec![0.0; geometry.count],
            items: FxHashMap::default(),
            column_items: vec![Vec::new(); geometry.count],
            tree: IntervalTree::new(),
            last_id: None,
        }
    }

    /// Build a new generation that replays `prev`'s heights in id order.
    ///
    /// Used when the column geometry changes but measured heights are still
    /// valid (for instance when only the column count changed).
    #[must_use]
    pub fn reseeded(
        geometry: ColumnGeometry,
        column_gutter: f64,
        row_gutter: f64,
        prev: &Positioner,
    ) -> Self {
        let mut next = Self::new(geometry, column_gutter, row_gutter);
        for (id, pos) in prev.all() {
            if let Err(err) = next.set(id, pos.height) {
                warn!(target: "waterfall.positioner", %err, "reseed skipped item");
            }
        }
        next
    }

    /// Place `id` at the bottom of the shortest column.
    ///
    /// Ties go to the lowest column index.
    pub fn set(&mut self, id: ItemId, height: f64) -> Result<ItemPosition, PlacementError> {
        if let Some(last) = self.last_id
            && id <= last
        {
            warn!(target: "waterfall.positioner", id, last, "out-of-order placement rejected");
            return Err(PlacementError::OutOfOrder { id, last });
        }
        if !valid_height(height) {
            warn!(target: "waterfall.positioner", id, height, "invalid height rejected");
            return Err(PlacementError::InvalidHeight { id, height });
        }

        let column = self.shortest_column_index();
        let top = self.column_heights[column];
        let position = ItemPosition {
            left: column as f64 * (self.geometry.width + self.column_gutter),
            top,
            height,
            column,
        };
        self.column_heights[column] = top + height + self.row_gutter;
        self.column_items[column].push(id);
        self.items.insert(id, position);
        self.tree.insert(top, top + height, id);
        self.last_id = Some(id);
        Ok(position)
    }

    /// Revise heights of already placed items and cascade the change.
    ///
    /// Only items below a changed item in the same column move. Unknown ids
    /// and invalid heights are skipped. Returns the number of items whose
    /// `top` was recomputed.
    pub fn update(&mut self, changes: &[(ItemId, f64)]) -> usize {
        let mut first_changed: SmallVec<[Option<ItemId>; 8]> =
            SmallVec::from_elem(None, self.geometry.count);

        for &(id, height) in changes {
            if !valid_height(height) {
                warn!(target: "waterfall.positioner", id, height, "invalid height ignored");
                continue;
            }
            let Some(position) = self.items.get_mut(&id) else {
                continue;
            };
            position.height = height;
            self.tree.remove(id);
            self.tree.insert(position.top, position.top + height, id);

            let slot = &mut first_changed[position.column];
            if slot.is_none_or(|current| id < current) {
                *slot = Some(id);
            }
        }

        let mut moved = 0;
        for (column, first) in first_changed.into_iter().enumerate() {
            let Some(first) = first else {
                continue;
            };
            let list = &self.column_items[column];
            let Ok(start) = list.binary_search(&first) else {
                continue;
            };
            let Some(anchor) = self.items.get(&first) else {
                continue;
            };
            let mut running = anchor.top + anchor.height + self.row_gutter;

            for &id in &list[start + 1..] {
                let Some(position) = self.items.get_mut(&id) else {
                    continue;
                };
                position.top = running;
                running += position.height + self.row_gutter;
                self.tree.remove(id);
                self.tree.insert(position.top, position.top + position.height, id);
                moved += 1;
            }
            self.column_heights[column] = running;
        }

        trace!(target: "waterfall.positioner", changes = changes.len(), moved, "update cascaded");
        moved
    }

    /// Report items overlapping `[lo, hi]` as `callback(id, left, top)`.
    pub fn range<F>(&self, lo: f64, hi: f64, mut callback: F)
    where
        F: FnMut(ItemId, f64, f64),
    {
        self.tree.search(lo, hi, |id, low| {
            if let Some(position) = self.items.get(&id) {
                callback(id, position.left, low);
            }
        });
    }

    /// Total scroll height estimate for `item_count` items.
    ///
    /// Unmeasured items are assumed to be `default_height` tall and spread
    /// evenly across columns.
    #[must_use]
    pub fn estimate_height(&self, item_count: usize, default_height: f64) -> f64 {
        let tallest = self.tallest_column();
        let measured = self.items.len();
        if measured >= item_count {
            return tallest;
        }
        let rows = (item_count - measured).div_ceil(self.geometry.count);
        tallest + rows as f64 * default_height
    }

    /// Height of the shortest column.
    #[must_use]
    pub fn shortest_column(&self) -> f64 {
        self.column_heights
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Height of the tallest column.
    #[must_use]
    pub fn tallest_column(&self) -> f64 {
        self.column_heights.iter().copied().fold(0.0, f64::max)
    }

    /// Bottom edge of the lowest item, without the trailing row gutter.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        if self.items.is_empty() {
            0.0
        } else {
            self.tallest_column() - self.row_gutter
        }
    }

    /// Reset to an empty generation with the same geometry.
    pub fn clear(&mut self) {
        self.column_heights.fill(0.0);
        self.items.clear();
        self.column_items.iter_mut().for_each(Vec::clear);
        self.tree.clear();
        self.last_id = None;
    }

    /// Cached placement of `id`.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<ItemPosition> {
        self.items.get(&id).copied()
    }

    /// Full rectangle of `id`, including the column width.
    #[must_use]
    pub fn rect(&self, id: ItemId) -> Option<ItemRect> {
        self.items
            .get(&id)
            .map(|pos| ItemRect::new(pos.left, pos.top, self.geometry.width, pos.height))
    }

    /// Every placement, ordered by id.
    #[must_use]
    pub fn all(&self) -> Vec<(ItemId, ItemPosition)> {
        let mut all: Vec<_> = self.items.iter().map(|(id, pos)| (*id, *pos)).collect();
        all.sort_unstable_by_key(|(id, _)| *id);
        all
    }

    /// Number of placed items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been placed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Column geometry of this generation.
    #[inline]
    pub fn geometry(&self) -> ColumnGeometry {
        self.geometry
    }

    /// Number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.geometry.count
    }

    /// Width of each column.
    #[inline]
    pub fn column_width(&self) -> f64 {
        self.geometry.width
    }

    /// Current height of every column.
    #[inline]
    pub fn column_heights(&self) -> &[f64] {
        &self.column_heights
    }

    /// Ids placed in `column`, in placement order.
    #[must_use]
    pub fn column_items(&self, column: usize) -> &[ItemId] {
        self.column_items.get(column).map_or(&[], Vec::as_slice)
    }

    /// The spatial index backing [`Positioner::range`].
    #[inline]
    pub fn tree(&self) -> &IntervalTree {
        &self.tree
    }

    fn shortest_column_index(&self) -> usize {
        let mut best = 0;
        for (column, height) in self.column_heights.iter().enumerate().skip(1) {
            if *height < self.column_heights[best] {
                best = column;
            }
        }
        best
    }
}
