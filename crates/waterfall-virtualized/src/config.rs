#![forbid(unsafe_code)]

//! Controller configuration.

use waterfall_core::debounce::DebounceConfig;
use waterfall_layout::ColumnSpec;

/// Overscan values above this are pixels; at or below it they are multiples
/// of the container height.
pub const OVERSCAN_PIXEL_THRESHOLD: f64 = 10.0;

/// Configuration for a [`MasonryController`](crate::MasonryController).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MasonryConfig {
    /// Column preferences; `columns.gutter` is the horizontal gutter.
    pub columns: ColumnSpec,
    /// Vertical gap between items. `None` reuses the column gutter.
    pub row_gutter: Option<f64>,
    /// Extra margin around the viewport, in pixels when above
    /// [`OVERSCAN_PIXEL_THRESHOLD`], otherwise as a container height multiple.
    pub overscan: f64,
    /// Unmeasured items rendered per pass.
    pub measure_batch: usize,
    /// Assumed height of unmeasured items when sizing the scroll container.
    pub item_height_estimate: f64,
    /// Leading items whose identity must stay stable to keep the layout.
    pub stable_prefix: usize,
    /// Debounce applied to scroll samples.
    pub scroll_debounce: DebounceConfig,
    /// Replay measured heights instead of re-measuring when only the column
    /// count changes.
    pub reseed_heights_on_resize: bool,
}

impl Default for MasonryConfig {
    fn default() -> Self {
        Self {
            columns: ColumnSpec::default(),
            row_gutter: None,
            overscan: 2.0,
            measure_batch: 20,
            item_height_estimate: 300.0,
            stable_prefix: 5,
            scroll_debounce: DebounceConfig::default(),
            reseed_heights_on_resize: false,
        }
    }
}

impl MasonryConfig {
    /// Set the column preferences.
    #[must_use]
    pub fn with_columns(mut self, columns: ColumnSpec) -> Self {
        self.columns = columns;
        self
    }

    /// Set the row gutter.
    #[must_use]
    pub fn with_row_gutter(mut self, row_gutter: f64) -> Self {
        self.row_gutter = Some(row_gutter);
        self
    }

    /// Set the overscan.
    #[must_use]
    pub fn with_overscan(mut self, overscan: f64) -> Self {
        self.overscan = overscan;
        self
    }

    /// Set the unmeasured-item cap per pass (at least one).
    #[must_use]
    pub fn with_measure_batch(mut self, measure_batch: usize) -> Self {
        self.measure_batch = measure_batch.max(1);
        self
    }

    /// Set the height assumed for unmeasured items.
    #[must_use]
    pub fn with_item_height_estimate(mut self, height: f64) -> Self {
        self.item_height_estimate = height;
        self
    }

    /// Set the stable prefix length.
    #[must_use]
    pub fn with_stable_prefix(mut self, stable_prefix: usize) -> Self {
        self.stable_prefix = stable_prefix;
        self
    }

    /// Set the scroll debounce.
    #[must_use]
    pub fn with_scroll_debounce(mut self, debounce: DebounceConfig) -> Self {
        self.scroll_debounce = debounce;
        self
    }

    /// Enable or disable height reseeding on column count changes.
    #[must_use]
    pub fn with_reseed_heights_on_resize(mut self, reseed: bool) -> Self {
        self.reseed_heights_on_resize = reseed;
        self
    }

    /// Horizontal gutter between columns.
    #[inline]
    pub fn column_gutter(&self) -> f64 {
        self.columns.gutter
    }

    /// Effective vertical gutter between items.
    #[inline]
    pub fn row_gutter(&self) -> f64 {
        self.row_gutter.unwrap_or(self.columns.gutter)
    }

    /// Overscan margin in pixels for a container of the given height.
    #[must_use]
    pub fn expand(&self, container_height: f64) -> f64 {
        if self.overscan > OVERSCAN_PIXEL_THRESHOLD {
            self.overscan
        } else {
            container_height * self.overscan
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overscan_switches_between_proportional_and_pixels() {
        let config = MasonryConfig::default();
        assert_eq!(config.expand(500.0), 1000.0);

        let config = config.with_overscan(10.0);
        assert_eq!(config.expand(500.0), 5000.0);

        let config = config.with_overscan(10.5);
        assert_eq!(config.expand(500.0), 10.5);

        let config = config.with_overscan(0.0);
        assert_eq!(config.expand(500.0), 0.0);
    }

    #[test]
    fn row_gutter_defaults_to_column_gutter() {
        let config = MasonryConfig::default().with_columns(ColumnSpec::new(200.0).with_gutter(12.0));
        assert_eq!(config.row_gutter(), 12.0);
        assert_eq!(config.with_row_gutter(4.0).row_gutter(), 4.0);
        assert_eq!(config.column_gutter(), 12.0);
    }

    #[test]
    fn measure_batch_is_at_least_one() {
        assert_eq!(MasonryConfig::default().with_measure_batch(0).measure_batch, 1);
        assert_eq!(MasonryConfig::default().measure_batch, 20);
    }
}
