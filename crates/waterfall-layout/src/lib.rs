#![forbid(unsafe_code)]

//! Masonry layout primitives.
//!
//! - [`IntervalTree`] - augmented red-black tree answering "which spans
//!   overlap this window?" in O(log n + m)
//! - [`Positioner`] - shortest-column placement with incremental re-layout
//! - [`columns`] - column count and width selection
//!
//! ```
//! use waterfall_layout::{ColumnSpec, Positioner};
//!
//! let geometry = ColumnSpec::new(200.0).with_gutter(10.0).layout(630.0);
//! let mut positioner = Positioner::new(geometry, 10.0, 10.0);
//! for (id, height) in [120.0, 80.0, 200.0, 60.0].into_iter().enumerate() {
//!     positioner.set(id, height).unwrap();
//! }
//!
//! let mut visible = Vec::new();
//! positioner.range(0.0, 100.0, |id, _left, _top| visible.push(id));
//! visible.sort_unstable();
//! assert_eq!(visible, vec![0, 1, 2, 3]);
//! ```

pub mod columns;
pub mod interval_tree;
pub mod positioner;

pub use columns::{ColumnGeometry, ColumnMode, ColumnSpec, layout};
pub use interval_tree::{IntervalTree, ItemId, TreeInvariantError};
pub use positioner::{ItemPosition, PlacementError, Positioner};
