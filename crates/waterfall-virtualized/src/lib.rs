#![forbid(unsafe_code)]

//! Virtualized masonry grids.
//!
//! Only items that intersect the viewport (plus overscan) are rendered. The
//! rest are tracked as geometry by a [`waterfall_layout::Positioner`], and
//! items that have never been measured are rendered invisibly in small
//! batches until the visible window is filled.
//!
//! ```
//! use waterfall_virtualized::{MasonryConfig, MasonryController, Viewport};
//!
//! let mut grid = MasonryController::new(MasonryConfig::default(), Viewport::new(800.0, 600.0));
//! grid.set_items(0..1_000u32);
//!
//! while grid.needs_recompute() {
//!     let plan = grid.recompute();
//!     let heights: Vec<(usize, f64)> = plan.unmeasured().map(|item| (item.index, 240.0)).collect();
//!     grid.commit(&heights);
//! }
//!
//! // Enough items are placed to fill the window; the rest wait for scrolling.
//! assert!(grid.measured() > 0);
//! assert!(grid.measured() < grid.len());
//! ```

pub mod config;
pub mod controller;

pub use config::{MasonryConfig, OVERSCAN_PIXEL_THRESHOLD};
pub use controller::{
    Commit, ControllerStats, MasonryController, Phase, RenderItem, RenderPlan, ScrollAlign,
    Viewport,
};
