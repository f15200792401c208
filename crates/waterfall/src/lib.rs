#![forbid(unsafe_code)]

//! Waterfall public facade crate.
//!
//! Re-exports the layout engine and the virtualization controller, and offers
//! a prelude plus a crate-wide [`Error`] for callers that place items
//! directly.
//!
//! ```
//! use waterfall::prelude::*;
//!
//! let geometry = ColumnSpec::new(300.0).with_gutter(20.0).with_mode(ColumnMode::Max).layout(1000.0);
//! let positioner = waterfall::place(geometry, 20.0, 20.0, &[120.0, 80.0, 200.0, 60.0, 90.0])?;
//! assert_eq!(positioner.column_count(), 4);
//! assert_eq!(positioner.get(4).map(|p| p.column), Some(3));
//! # Ok::<(), waterfall::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use waterfall_core::debounce::{DebounceAction, DebounceConfig, Debouncer};
pub use waterfall_core::geometry::{ItemRect, Span};

// --- Layout re-exports -----------------------------------------------------

pub use waterfall_layout::{
    ColumnGeometry, ColumnMode, ColumnSpec, IntervalTree, ItemId, ItemPosition, PlacementError,
    Positioner, TreeInvariantError,
};

// --- Virtualization re-exports ---------------------------------------------

#[cfg(feature = "virtualized")]
pub use waterfall_virtualized::{
    Commit, ControllerStats, MasonryConfig, MasonryController, Phase, RenderItem, RenderPlan,
    ScrollAlign, Viewport,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for waterfall callers.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// An item could not be placed.
    Placement(PlacementError),
    /// The spatial index failed its self-check.
    Index(TreeInvariantError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placement(err) => write!(f, "{err}"),
            Self::Index(err) => write!(f, "interval index corrupted: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Placement(err) => Some(err),
            Self::Index(err) => Some(err),
        }
    }
}

impl From<PlacementError> for Error {
    fn from(err: PlacementError) -> Self {
        Self::Placement(err)
    }
}

impl From<TreeInvariantError> for Error {
    fn from(err: TreeInvariantError) -> Self {
        Self::Index(err)
    }
}

/// Standard result type for waterfall APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Place `heights` in list order into a fresh generation.
///
/// Item `i` receives id `i`. Fails on the first invalid height.
pub fn place(
    geometry: ColumnGeometry,
    column_gutter: f64,
    row_gutter: f64,
    heights: &[f64],
) -> Result<Positioner> {
    let mut positioner = Positioner::new(geometry, column_gutter, row_gutter);
    for (id, height) in heights.iter().enumerate() {
        positioner.set(id, *height)?;
    }
    Ok(positioner)
}

/// Check a generation's spatial index against its invariants.
pub fn verify(positioner: &Positioner) -> Result<()> {
    positioner.tree().validate()?;
    Ok(())
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ColumnGeometry, ColumnMode, ColumnSpec, Error, ItemPosition, Positioner, Result, Span,
    };

    #[cfg(feature = "virtualized")]
    pub use crate::{MasonryConfig, MasonryController, RenderPlan, ScrollAlign, Viewport};

    pub use crate::{core, layout};

    #[cfg(feature = "virtualized")]
    pub use crate::virtualized;
}

pub use waterfall_core as core;
pub use waterfall_layout as layout;
#[cfg(feature = "virtualized")]
pub use waterfall_virtualized as virtualized;
