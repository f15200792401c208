#![forbid(unsafe_code)]

//! Scroll-driven virtualization over a masonry [`Positioner`].
//!
//! [`MasonryController`] owns the item list, the current layout generation
//! and the scroll debouncer. The host drives it with a simple loop:
//!
//! 1. Feed input: [`set_items`](MasonryController::set_items),
//!    [`resize`](MasonryController::resize),
//!    [`on_scroll`](MasonryController::on_scroll) and
//!    [`tick`](MasonryController::tick).
//! 2. While [`needs_recompute`](MasonryController::needs_recompute) is set,
//!    call [`recompute`](MasonryController::recompute) and render the plan.
//!    Placed items are drawn at their offsets; unmeasured items are drawn
//!    invisibly at the column width.
//! 3. Report measured heights with [`commit`](MasonryController::commit).
//!
//! # State Machine
//!
//! ```text
//!            scroll fires / resize / items change
//!   ┌──────┐ ───────────────────────────────────▶ ┌───────────┐
//!   │ Idle │                                      │ Recompute │
//!   └──────┘ ◀─────────────────────────────────── └───────────┘
//!                  recompute() produced a plan
//! ```
//!
//! A commit moves back to `Recompute` when unmeasured items remain and the
//! placed content does not reach the bottom of the visible window, or when a
//! placed item changed height.
//!
//! # Invariants
//!
//! - Items are placed strictly in list order. Heights reported ahead of the
//!   next unplaced index are parked until the gap is measured.
//! - The layout is discarded when the column geometry changes or when an item
//!   inside the stable prefix changes identity.
//! - A plan never contains more than `measure_batch` unmeasured items.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Measurement for an index past the list | Rejected, logged |
//! | Non-finite or negative height | Rejected, logged |
//! | Same geometry after resize | Layout kept |
//! | List shrinks below the placed count | Layout cleared |

use std::ops::Range;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};
use waterfall_core::debounce::{DebounceAction, Debouncer};
use waterfall_core::geometry::Span;
use waterfall_layout::{ColumnGeometry, ItemId, ItemPosition, Positioner};

use crate::config::MasonryConfig;

/// Host container state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    /// Container width in pixels.
    pub width: f64,
    /// Container height in pixels.
    pub height: f64,
    /// Scroll offset of the scrolling element.
    pub scroll_top: f64,
    /// Distance from the top of the scrolling element to the grid.
    pub container_offset: f64,
}

impl Viewport {
    /// Viewport of the given size scrolled to the top.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_top: 0.0,
            container_offset: 0.0,
        }
    }

    /// Set the scroll offset.
    #[must_use]
    pub fn with_scroll_top(mut self, scroll_top: f64) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    /// Set the container offset.
    #[must_use]
    pub fn with_container_offset(mut self, offset: f64) -> Self {
        self.container_offset = offset;
        self
    }
}

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing to do until the next input.
    #[default]
    Idle,
    /// A new render plan is due.
    Recompute,
}

/// One item the host should render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem<K> {
    /// Position in the item list.
    pub index: usize,
    /// The item's key.
    pub key: K,
    /// Left offset.
    pub left: f64,
    /// Top offset.
    pub top: f64,
    /// Column width.
    pub width: f64,
    /// Measured height, `None` while unmeasured.
    pub height: Option<f64>,
    /// `false` for items rendered only to be measured.
    pub visible: bool,
}

/// Output of one recompute pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan<K> {
    /// Placed items in the window (by index), then unmeasured items.
    pub items: Vec<RenderItem<K>>,
    /// Window used for culling, in grid coordinates.
    pub window: Span,
    /// Height to give the scroll container.
    pub estimated_height: f64,
    /// Index range spanned by the visible items.
    pub rendered_range: Option<Range<usize>>,
}

impl<K> RenderPlan<K> {
    /// Items drawn at their layout offsets.
    pub fn visible(&self) -> impl Iterator<Item = &RenderItem<K>> {
        self.items.iter().filter(|item| item.visible)
    }

    /// Items rendered for measurement.
    pub fn unmeasured(&self) -> impl Iterator<Item = &RenderItem<K>> {
        self.items.iter().filter(|item| !item.visible)
    }
}

/// Outcome of [`MasonryController::commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Commit<K> {
    /// Newly placed items, now visible at their offsets.
    pub placed: Vec<RenderItem<K>>,
    /// Placed items whose height changed.
    pub updated: usize,
    /// Measurements waiting for an earlier index.
    pub parked: usize,
    /// Measurements dropped as invalid.
    pub rejected: usize,
    /// Whether another recompute is due.
    pub needs_recompute: bool,
}

/// Scroll alignment for [`MasonryController::scroll_to_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollAlign {
    /// Item top at the viewport top.
    Start,
    /// Item centered in the viewport.
    Center,
    /// Item bottom at the viewport bottom.
    End,
    /// Keep the offset if the item is fully visible, else the nearest edge.
    #[default]
    Auto,
}

/// Counters since construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerStats {
    /// Recompute passes run.
    pub passes: u64,
    /// Layout generations discarded.
    pub clears: u64,
    /// Items placed.
    pub placed: u64,
    /// Height changes applied to placed items.
    pub updates: u64,
    /// Scroll samples received.
    pub scroll_samples: u64,
}

/// Virtualization controller for a masonry grid keyed by `K`.
#[derive(Debug, Clone)]
pub struct MasonryController<K> {
    config: MasonryConfig,
    viewport: Viewport,
    keys: Vec<K>,
    positioner: Positioner,
    /// Heights reported ahead of the next unplaced index.
    parked: FxHashMap<ItemId, f64>,
    scroll: Debouncer<f64>,
    phase: Phase,
    stats: ControllerStats,
}

impl<K: Clone + PartialEq> MasonryController<K> {
    /// Create a controller with no items.
    #[must_use]
    pub fn new(config: MasonryConfig, viewport: Viewport) -> Self {
        let geometry = config.columns.layout(viewport.width);
        Self {
            config,
            viewport,
            keys: Vec::new(),
            positioner: Positioner::new(geometry, config.column_gutter(), config.row_gutter()),
            parked: FxHashMap::default(),
            scroll: Debouncer::new(config.scroll_debounce),
            phase: Phase::Recompute,
            stats: ControllerStats::default(),
        }
    }

    /// Replace the item list.
    ///
    /// Returns `true` when the layout was discarded, either because a key in
    /// the stable prefix changed or because the list is now shorter than the
    /// number of placed items.
    pub fn set_items<I>(&mut self, keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
    {
        let keys: Vec<K> = keys.into_iter().collect();
        let prefix = self
            .config
            .stable_prefix
            .min(self.keys.len())
            .min(keys.len());
        let diverged = self.keys[..prefix] != keys[..prefix];
        let shrunk = keys.len() < self.positioner.len();

        self.keys = keys;
        let len = self.keys.len();
        self.parked.retain(|index, _| *index < len);
        self.phase = Phase::Recompute;

        if diverged || shrunk {
            debug!(
                target: "waterfall.controller",
                diverged,
                shrunk,
                items = len,
                "item identity changed; layout cleared"
            );
            self.clear_layout();
            return true;
        }
        false
    }

    /// Apply a new container size. Returns `true` when the column geometry
    /// changed.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.viewport.width = width;
        self.viewport.height = height;
        self.phase = Phase::Recompute;

        let current = self.positioner.geometry();
        let next = self.config.columns.layout(width);
        if next == current {
            return false;
        }

        let (column_gutter, row_gutter) = (self.config.column_gutter(), self.config.row_gutter());
        if self.config.reseed_heights_on_resize && next.width == current.width {
            self.positioner = Positioner::reseeded(next, column_gutter, row_gutter, &self.positioner);
            debug!(
                target: "waterfall.controller",
                from = current.count,
                to = next.count,
                placed = self.positioner.len(),
                "column count changed; heights reseeded"
            );
        } else {
            self.positioner = Positioner::new(next, column_gutter, row_gutter);
            self.parked.clear();
            self.stats.clears += 1;
            debug!(
                target: "waterfall.controller",
                columns = next.count,
                width = next.width,
                "geometry changed; layout cleared"
            );
        }
        true
    }

    /// Set the distance from the scrolling element's top to the grid.
    pub fn set_container_offset(&mut self, offset: f64) {
        if self.viewport.container_offset != offset {
            self.viewport.container_offset = offset;
            self.phase = Phase::Recompute;
        }
    }

    /// Feed a scroll sample at the current time.
    pub fn on_scroll(&mut self, scroll_top: f64) -> bool {
        self.on_scroll_at(scroll_top, Instant::now())
    }

    /// Feed a scroll sample at a specific time.
    ///
    /// Returns `true` when the debounced offset was applied.
    pub fn on_scroll_at(&mut self, scroll_top: f64, now: Instant) -> bool {
        self.stats.scroll_samples += 1;
        let action = self.scroll.call_at(scroll_top, now);
        self.apply_scroll(action)
    }

    /// Release a debounced scroll sample whose deadline has passed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Release a debounced scroll sample as of `now`.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let action = self.scroll.poll_at(now);
        self.apply_scroll(action)
    }

    /// Time until a pending scroll sample is released.
    #[must_use]
    pub fn time_until_scroll(&self, now: Instant) -> Option<Duration> {
        self.scroll.time_until_due(now)
    }

    /// Jump to an offset immediately, dropping any pending sample.
    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        self.scroll.cancel();
        self.viewport.scroll_top = scroll_top;
        self.phase = Phase::Recompute;
    }

    /// Window of grid coordinates that should be rendered.
    #[must_use]
    pub fn visible_window(&self) -> Span {
        let Viewport {
            height,
            scroll_top,
            container_offset,
            ..
        } = self.viewport;
        let expand = self.config.expand(height);
        Span::new(
            scroll_top - container_offset - expand,
            scroll_top + height - container_offset + expand,
        )
    }

    /// Build the render plan for the current window and return to idle.
    pub fn recompute(&mut self) -> RenderPlan<K> {
        let window = self.visible_window();
        let width = self.positioner.column_width();

        let mut hits: Vec<(ItemId, f64, f64)> = Vec::new();
        self.positioner
            .range(window.low, window.high, |id, left, top| hits.push((id, left, top)));
        hits.sort_unstable_by_key(|(id, _, _)| *id);
        let rendered_range = hits
            .first()
            .zip(hits.last())
            .map(|(first, last)| first.0..last.0 + 1);

        let mut items = Vec::with_capacity(hits.len() + self.config.measure_batch);
        for (index, left, top) in hits {
            let (Some(key), Some(position)) = (self.keys.get(index), self.positioner.get(index))
            else {
                continue;
            };
            items.push(RenderItem {
                index,
                key: key.clone(),
                left,
                top,
                width,
                height: Some(position.height),
                visible: true,
            });
        }
        let visible = items.len();

        let unmeasured = (self.positioner.len()..self.keys.len())
            .filter(|index| !self.parked.contains_key(index))
            .take(self.config.measure_batch);
        for index in unmeasured {
            let Some(key) = self.keys.get(index) else {
                break;
            };
            items.push(RenderItem {
                index,
                key: key.clone(),
                left: 0.0,
                top: 0.0,
                width,
                height: None,
                visible: false,
            });
        }

        self.stats.passes += 1;
        self.phase = Phase::Idle;
        trace!(
            target: "waterfall.controller",
            low = window.low,
            high = window.high,
            visible,
            unmeasured = items.len() - visible,
            "recompute"
        );

        RenderPlan {
            items,
            window,
            estimated_height: self.estimated_height(),
            rendered_range,
        }
    }

    /// Report measured heights as `(index, height)` pairs.
    ///
    /// Heights for placed items that differ from the cached height cascade
    /// through [`Positioner::update`] first. Heights for unplaced items are
    /// then placed in list order, parking any that arrive ahead of a gap.
    pub fn commit(&mut self, measurements: &[(usize, f64)]) -> Commit<K> {
        let mut updates: Vec<(ItemId, f64)> = Vec::new();
        let mut rejected = 0;

        for &(index, height) in measurements {
            if index >= self.keys.len() || !height.is_finite() || height < 0.0 {
                warn!(
                    target: "waterfall.controller",
                    index,
                    height,
                    items = self.keys.len(),
                    "measurement rejected"
                );
                rejected += 1;
                continue;
            }
            match self.positioner.get(index) {
                Some(position) if position.height != height => updates.push((index, height)),
                Some(_) => {}
                None => {
                    self.parked.insert(index, height);
                }
            }
        }

        // Column heights must be current before new items pick a column.
        let updated = updates.len();
        if updated > 0 {
            let moved = self.positioner.update(&updates);
            debug!(target: "waterfall.controller", updated, moved, "placed items remeasured");
        }

        let width = self.positioner.column_width();
        let mut placed = Vec::new();
        let mut next = self.positioner.len();
        while let Some(height) = self.parked.remove(&next) {
            let Some(key) = self.keys.get(next) else {
                break;
            };
            match self.positioner.set(next, height) {
                Ok(position) => placed.push(RenderItem {
                    index: next,
                    key: key.clone(),
                    left: position.left,
                    top: position.top,
                    width,
                    height: Some(position.height),
                    visible: true,
                }),
                Err(err) => {
                    warn!(target: "waterfall.controller", %err, "placement rejected");
                    rejected += 1;
                    break;
                }
            }
            next += 1;
        }

        self.stats.placed += placed.len() as u64;
        self.stats.updates += updated as u64;

        let needs_recompute = self.needs_measurement() || updated > 0;
        if needs_recompute {
            self.phase = Phase::Recompute;
        }
        trace!(
            target: "waterfall.controller",
            placed = placed.len(),
            updated,
            parked = self.parked.len(),
            needs_recompute,
            "commit"
        );

        Commit {
            placed,
            updated,
            parked: self.parked.len(),
            rejected,
            needs_recompute,
        }
    }

    /// Scroll offset that brings `index` into view, `None` if it is not
    /// placed yet. The result is clamped to the scrollable range.
    #[must_use]
    pub fn scroll_to_index(&self, index: usize, align: ScrollAlign) -> Option<f64> {
        let position = self.positioner.get(index)?;
        let Viewport {
            height,
            scroll_top,
            container_offset,
            ..
        } = self.viewport;
        let item = Span::from_extent(position.top + container_offset, position.height);
        let view = Span::from_extent(scroll_top, height);

        let target = match align {
            ScrollAlign::Start => item.low,
            ScrollAlign::End => item.high - height,
            ScrollAlign::Center => item.low - (height - position.height) / 2.0,
            ScrollAlign::Auto => {
                if view.contains_span(&item) {
                    scroll_top
                } else if item.low < scroll_top {
                    item.low
                } else {
                    item.high - height
                }
            }
        };
        let max = (self.estimated_height() + container_offset - height).max(0.0);
        Some(target.clamp(0.0, max))
    }

    /// Height to give the scroll container.
    #[must_use]
    pub fn estimated_height(&self) -> f64 {
        self.positioner
            .estimate_height(self.keys.len(), self.config.item_height_estimate)
    }

    /// Whether the host should call [`recompute`](Self::recompute).
    #[inline]
    pub fn needs_recompute(&self) -> bool {
        self.phase == Phase::Recompute
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Cached placement of the item at `index`.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<ItemPosition> {
        self.positioner.get(index)
    }

    /// Number of items in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of placed items.
    #[inline]
    pub fn measured(&self) -> usize {
        self.positioner.len()
    }

    /// The item keys.
    #[inline]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Column geometry of the current generation.
    #[inline]
    pub fn geometry(&self) -> ColumnGeometry {
        self.positioner.geometry()
    }

    /// The current layout generation.
    #[inline]
    pub fn positioner(&self) -> &Positioner {
        &self.positioner
    }

    /// Active configuration.
    #[inline]
    pub fn config(&self) -> &MasonryConfig {
        &self.config
    }

    /// Current viewport.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Counters.
    #[inline]
    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    /// Whether unmeasured items remain and placed content ends above the
    /// bottom of the window.
    fn needs_measurement(&self) -> bool {
        self.positioner.len() < self.keys.len()
            && self.positioner.shortest_column() < self.visible_window().high
    }

    fn apply_scroll(&mut self, action: DebounceAction<f64>) -> bool {
        let DebounceAction::Fire {
            value,
            waited,
            forced,
        } = action
        else {
            return false;
        };
        self.viewport.scroll_top = value;
        self.phase = Phase::Recompute;
        trace!(
            target: "waterfall.controller",
            scroll_top = value,
            waited_us = waited.as_micros() as u64,
            forced,
            "scroll applied"
        );
        true
    }

    fn clear_layout(&mut self) {
        self.positioner.clear();
        self.parked.clear();
        self.stats.clears += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use waterfall_layout::ColumnSpec;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Three 100px columns, no gutters, no overscan, 200px tall viewport.
    fn config() -> MasonryConfig {
        MasonryConfig::default()
            .with_columns(ColumnSpec::new(100.0).with_gutter(0.0))
            .with_overscan(0.0)
    }

    fn controller(items: u32) -> MasonryController<u32> {
        controller_with(config(), items)
    }

    fn controller_with(config: MasonryConfig, items: u32) -> MasonryController<u32> {
        let mut c = MasonryController::new(config, Viewport::new(300.0, 200.0));
        c.set_items(0..items);
        c
    }

    fn measure_all(c: &mut MasonryController<u32>, height: f64) {
        while c.measured() < c.len() {
            let plan = c.recompute();
            let batch: Vec<(usize, f64)> = plan.unmeasured().map(|i| (i.index, height)).collect();
            c.commit(&batch);
        }
    }

    #[test]
    fn first_pass_requests_one_batch() {
        let mut c = controller(50);
        assert_eq!(c.geometry(), ColumnGeometry::new(3, 100.0));
        assert!(c.needs_recompute());

        let plan = c.recompute();
        assert_eq!(plan.items.len(), 20);
        assert!(plan.items.iter().all(|i| !i.visible && i.width == 100.0));
        let indices: Vec<usize> = plan.items.iter().map(|i| i.index).collect();
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
        assert_eq!(plan.rendered_range, None);
        assert_eq!(plan.estimated_height, 17.0 * 300.0);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn commit_places_items_in_list_order() {
        let mut c = controller(50);
        c.recompute();
        let batch: Vec<(usize, f64)> = (0..20).map(|i| (i, 100.0)).collect();
        let commit = c.commit(&batch);

        assert_eq!(commit.placed.len(), 20);
        assert_eq!(commit.rejected, 0);
        let third = &commit.placed[3];
        assert_eq!((third.left, third.top, third.visible), (0.0, 100.0, true));
        // Column heights are 700/700/600, well past the 200px window.
        assert!(!commit.needs_recompute);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn plan_lists_window_items_then_next_batch() {
        let mut c = controller(50);
        let batch: Vec<(usize, f64)> = (0..20).map(|i| (i, 100.0)).collect();
        c.commit(&batch);

        let plan = c.recompute();
        let visible: Vec<usize> = plan.visible().map(|i| i.index).collect();
        // Rows at 0, 100 and 200 touch the closed window [0, 200].
        assert_eq!(visible, (0..9).collect::<Vec<_>>());
        assert_eq!(plan.rendered_range, Some(0..9));
        let unmeasured: Vec<usize> = plan.unmeasured().map(|i| i.index).collect();
        assert_eq!(unmeasured, (20..40).collect::<Vec<_>>());
    }

    #[test]
    fn out_of_order_heights_wait_for_the_gap() {
        let mut c = controller(10);
        let commit = c.commit(&[(2, 50.0), (1, 60.0)]);
        assert!(commit.placed.is_empty());
        assert_eq!(commit.parked, 2);

        let plan = c.recompute();
        let unmeasured: Vec<usize> = plan.unmeasured().map(|i| i.index).collect();
        assert_eq!(unmeasured, vec![0, 3, 4, 5, 6, 7, 8, 9]);

        let commit = c.commit(&[(0, 40.0)]);
        let placed: Vec<usize> = commit.placed.iter().map(|i| i.index).collect();
        assert_eq!(placed, vec![0, 1, 2]);
        assert_eq!(commit.parked, 0);
        assert_eq!(c.position(1).map(|p| p.height), Some(60.0));
    }

    #[test]
    fn short_content_asks_for_another_pass() {
        let mut c = controller_with(config().with_measure_batch(2), 10);
        let plan = c.recompute();
        assert_eq!(plan.unmeasured().count(), 2);

        let commit = c.commit(&[(0, 10.0), (1, 10.0)]);
        // Third column is still empty, so content does not reach the window bottom.
        assert!(commit.needs_recompute);
        assert!(c.needs_recompute());
    }

    #[test]
    fn finished_list_goes_idle() {
        let mut c = controller(4);
        measure_all(&mut c, 10.0);
        assert_eq!(c.measured(), 4);
        assert!(!c.needs_recompute());
        let plan = c.recompute();
        assert_eq!(plan.unmeasured().count(), 0);
        assert_eq!(plan.estimated_height, 20.0);
    }

    #[test]
    fn remeasured_item_moves_later_items_in_its_column() {
        let mut c = controller(9);
        measure_all(&mut c, 100.0);
        let below = c.position(3).unwrap();
        let beside = c.position(4).unwrap();

        let commit = c.commit(&[(0, 150.0), (1, 100.0)]);
        assert_eq!(commit.updated, 1);
        assert!(commit.needs_recompute);
        assert_eq!(c.position(3).unwrap().top, below.top + 50.0);
        assert_eq!(c.position(4).unwrap(), beside);
    }

    #[test]
    fn remeasure_applies_before_new_placements() {
        let mut c = controller(9);
        c.commit(&[(0, 100.0), (1, 100.0), (2, 100.0)]);

        let commit = c.commit(&[(0, 300.0), (3, 50.0)]);
        assert_eq!(commit.updated, 1);
        let reported = &commit.placed[0];
        let actual = c.position(3).unwrap();
        // Column 0 grew to 300, so item 3 goes under item 1.
        assert_eq!(actual.column, 1);
        assert_eq!((reported.left, reported.top), (actual.left, actual.top));
        assert_eq!((actual.left, actual.top), (100.0, 100.0));
    }

    #[test]
    #[traced_test]
    fn invalid_measurements_are_rejected() {
        let mut c = controller(3);
        let commit = c.commit(&[(0, f64::NAN), (7, 10.0), (1, -5.0)]);
        assert_eq!(commit.rejected, 3);
        assert_eq!(c.measured(), 0);
        assert!(logs_contain("measurement rejected"));
    }

    #[test]
    #[traced_test]
    fn prefix_divergence_clears_layout() {
        let mut c = controller(10);
        measure_all(&mut c, 50.0);
        assert_eq!(c.measured(), 10);

        let mut keys: Vec<u32> = (0..10).collect();
        keys[2] = 99;
        assert!(c.set_items(keys));
        assert_eq!(c.measured(), 0);
        assert_eq!(c.stats().clears, 1);
        assert!(logs_contain("layout cleared"));
    }

    #[test]
    fn divergence_past_prefix_keeps_layout() {
        let mut c = controller(10);
        measure_all(&mut c, 50.0);
        let mut keys: Vec<u32> = (0..12).collect();
        keys[7] = 99;
        assert!(!c.set_items(keys));
        assert_eq!(c.measured(), 10);
        assert_eq!(c.len(), 12);
    }

    #[test]
    fn shrinking_below_placed_count_clears() {
        let mut c = controller(10);
        measure_all(&mut c, 50.0);
        assert!(!c.set_items(0..10));
        assert!(c.set_items(0..6));
        assert_eq!(c.measured(), 0);
    }

    #[test]
    fn resize_with_same_geometry_keeps_layout() {
        let mut c = controller(10);
        measure_all(&mut c, 50.0);
        assert!(!c.resize(300.0, 400.0));
        assert_eq!(c.measured(), 10);
        assert_eq!(c.viewport().height, 400.0);
        assert!(c.needs_recompute());
    }

    #[test]
    #[traced_test]
    fn resize_with_new_geometry_clears() {
        let mut c = controller(10);
        measure_all(&mut c, 50.0);
        assert!(c.resize(400.0, 200.0));
        assert_eq!(c.geometry(), ColumnGeometry::new(4, 100.0));
        assert_eq!(c.measured(), 0);
        assert!(logs_contain("geometry changed"));
    }

    #[test]
    fn reseed_keeps_heights_when_only_count_changes() {
        let mut c = controller_with(config().with_reseed_heights_on_resize(true), 10);
        measure_all(&mut c, 50.0);
        assert!(c.resize(200.0, 200.0));
        assert_eq!(c.geometry(), ColumnGeometry::new(2, 100.0));
        assert_eq!(c.measured(), 10);
        assert_eq!(c.position(2).map(|p| p.column), Some(0));
        assert_eq!(c.stats().clears, 0);
    }

    #[test]
    fn scroll_samples_are_debounced() {
        let mut c = controller(10);
        c.recompute();
        let t0 = Instant::now();

        assert!(!c.on_scroll_at(100.0, t0));
        assert!(!c.on_scroll_at(500.0, t0 + ms(5)));
        assert_eq!(c.viewport().scroll_top, 0.0);
        assert!(!c.needs_recompute());
        assert!(c.time_until_scroll(t0 + ms(5)).is_some());

        assert!(c.tick_at(t0 + ms(30)));
        assert_eq!(c.viewport().scroll_top, 500.0);
        assert!(c.needs_recompute());
        assert_eq!(c.stats().scroll_samples, 2);
    }

    #[test]
    fn window_accounts_for_offset_and_overscan() {
        let mut c = controller_with(config().with_overscan(0.5), 10);
        c.set_container_offset(50.0);
        c.set_scroll_top(500.0);
        assert_eq!(c.visible_window(), Span::new(350.0, 750.0));

        let mut c = controller_with(config().with_overscan(40.0), 10);
        c.set_scroll_top(100.0);
        assert_eq!(c.visible_window(), Span::new(60.0, 340.0));
    }

    #[test]
    fn scroll_to_index_alignments() {
        let mut c = controller(30);
        measure_all(&mut c, 100.0);
        // Item 9 sits in row 3: [300, 400]. Content is 1000px tall.
        assert_eq!(c.scroll_to_index(9, ScrollAlign::Start), Some(300.0));
        assert_eq!(c.scroll_to_index(9, ScrollAlign::End), Some(200.0));
        assert_eq!(c.scroll_to_index(9, ScrollAlign::Center), Some(250.0));
        assert_eq!(c.scroll_to_index(9, ScrollAlign::Auto), Some(200.0));
        assert_eq!(c.scroll_to_index(29, ScrollAlign::Start), Some(800.0));
        assert_eq!(c.scroll_to_index(30, ScrollAlign::Start), None);

        c.set_scroll_top(250.0);
        assert_eq!(c.scroll_to_index(9, ScrollAlign::Auto), Some(250.0));
        assert_eq!(c.scroll_to_index(0, ScrollAlign::Auto), Some(0.0));
    }

    #[test]
    fn stats_count_passes_and_placements() {
        let mut c = controller(5);
        measure_all(&mut c, 10.0);
        let stats = c.stats();
        assert_eq!(stats.passes, 1);
        assert_eq!(stats.placed, 5);
        assert_eq!(stats.clears, 0);
    }
}
