#![forbid(unsafe_code)]

//! Column count and width selection.
//!
//! Given the container width and a preferred ("bench") item width, decide how
//! many columns to show and how wide each one is. The decision is a pure
//! function of its inputs so a host can recompute it on every resize and
//! compare against the previous [`ColumnGeometry`] before discarding a layout.
//!
//! # Modes
//!
//! | Mode | Bias |
//! |------|------|
//! | [`ColumnMode::Max`] | Add a column and shrink widths rather than leave a gap |
//! | [`ColumnMode::Min`] | Drop a column and grow widths rather than overflow |
//! | [`ColumnMode::Prefer`] | Stay near the bench width; add a column only past half a column of slack |
//!
//! `Prefer` provides hysteresis: while a container is dragged wider, the count
//! only steps up once the leftover space exceeds half a bench width, so it does
//! not flip back and forth every few pixels.
//!
//! # Example
//!
//! ```
//! use waterfall_layout::{ColumnMode, ColumnSpec};
//!
//! let spec = ColumnSpec::new(300.0).with_gutter(20.0).with_mode(ColumnMode::Max);
//! let geometry = spec.layout(1000.0);
//! assert_eq!(geometry.count, 4);
//! assert_eq!(geometry.width, 235.0);
//! ```

/// How to resolve leftover or missing width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnMode {
    /// Prefer more, narrower columns that fill the container.
    Max,
    /// Prefer fewer, wider columns that fill the container.
    Min,
    /// Stay near the bench width with hysteresis.
    #[default]
    Prefer,
}

/// Column count and width of one layout generation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnGeometry {
    /// Number of columns.
    pub count: usize,
    /// Width of each column in pixels.
    pub width: f64,
}

impl ColumnGeometry {
    /// Create a geometry.
    #[inline]
    pub const fn new(count: usize, width: f64) -> Self {
        Self { count, width }
    }

    /// Total width covered by the columns and the gutters between them.
    #[inline]
    pub fn display_width(&self, gutter: f64) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.count as f64 * (self.width + gutter) - gutter
        }
    }
}

/// Column preferences.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSpec {
    /// Preferred column width.
    pub bench_width: f64,
    /// Horizontal space between columns.
    pub gutter: f64,
    /// Lower bound on the column count (at least one).
    pub min_columns: usize,
    /// Upper bound on the column count.
    pub max_columns: usize,
    /// Resolution mode.
    pub mode: ColumnMode,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            bench_width: 240.0,
            gutter: 16.0,
            min_columns: 1,
            max_columns: 9,
            mode: ColumnMode::Prefer,
        }
    }
}

impl ColumnSpec {
    /// Preferences with the given bench width and default bounds.
    #[must_use]
    pub fn new(bench_width: f64) -> Self {
        Self {
            bench_width,
            ..Self::default()
        }
    }

    /// Set the gutter.
    #[must_use]
    pub fn with_gutter(mut self, gutter: f64) -> Self {
        self.gutter = gutter;
        self
    }

    /// Set the column count bounds.
    #[must_use]
    pub fn with_bounds(mut self, min_columns: usize, max_columns: usize) -> Self {
        self.min_columns = min_columns;
        self.max_columns = max_columns;
        self
    }

    /// Set the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ColumnMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolve geometry for a container width.
    #[must_use]
    pub fn layout(&self, container_width: f64) -> ColumnGeometry {
        layout(
            container_width,
            self.bench_width,
            self.gutter,
            self.min_columns,
            self.max_columns,
            self.mode,
        )
    }
}

/// Width of `count` columns that exactly span `container_width`, never
/// negative.
#[inline]
fn fill_width(container_width: f64, gutter: f64, count: usize) -> f64 {
    ((container_width + gutter) / count as f64 - gutter).max(0.0)
}

/// Decide column count and width.
///
/// `min_col` is raised to one and `max_col` to `min_col`.
#[must_use]
pub fn layout(
    container_width: f64,
    bench_width: f64,
    gutter: f64,
    min_col: usize,
    max_col: usize,
    mode: ColumnMode,
) -> ColumnGeometry {
    let min_col = min_col.max(1);
    let max_col = max_col.max(min_col);

    let pitch = bench_width + gutter;
    let fit = if pitch > 0.0 && container_width.is_finite() {
        ((container_width - gutter) / pitch).floor().max(0.0) as usize
    } else {
        min_col
    };
    let cols = fit.clamp(min_col, max_col);
    let display_width = ColumnGeometry::new(cols, bench_width).display_width(gutter);
    let bench = ColumnGeometry::new(cols, bench_width);

    match mode {
        ColumnMode::Max => {
            if display_width < container_width && cols < max_col {
                ColumnGeometry::new(cols + 1, fill_width(container_width, gutter, cols + 1))
            } else {
                bench
            }
        }
        ColumnMode::Min => {
            if display_width > container_width && cols > min_col {
                ColumnGeometry::new(cols - 1, fill_width(container_width, gutter, cols - 1))
            } else {
                bench
            }
        }
        ColumnMode::Prefer => {
            if cols == max_col {
                return bench;
            }
            let diff = container_width - display_width;
            if diff > bench_width / 2.0 {
                ColumnGeometry::new(cols + 1, fill_width(container_width, gutter, cols + 1))
            } else {
                ColumnGeometry::new(cols, fill_width(container_width, gutter, cols))
            }
        }
    }
}
