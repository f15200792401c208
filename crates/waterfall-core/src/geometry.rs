#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All coordinates are CSS-style pixels in the scroll container's content
//! space: `y` grows downward and the first row of items starts at `0.0`.

/// A closed vertical interval `[low, high]`.
///
/// Used both for item extents and for the visible window. A span whose
/// `low > high` is degenerate and overlaps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Top edge (inclusive).
    pub low: f64,
    /// Bottom edge (inclusive).
    pub high: f64,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Span starting at `top` and covering `height` pixels.
    #[inline]
    pub fn from_extent(top: f64, height: f64) -> Self {
        Self::new(top, top + height)
    }

    /// Length of the span, `0.0` when degenerate.
    #[inline]
    pub fn len(&self) -> f64 {
        (self.high - self.low).max(0.0)
    }

    /// Whether the span is degenerate (`low > high`) or not a number.
    ///
    /// A zero-length span (`low == high`) is not empty: it still overlaps
    /// anything containing its single point.
    #[inline]
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn is_empty(&self) -> bool {
        !(self.low <= self.high)
    }

    /// Standard closed-interval overlap test: `a.low <= b.high && a.high >= b.low`.
    #[inline]
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.low <= other.high && self.high >= other.low
    }

    /// Whether `other` lies entirely within this span.
    #[inline]
    pub fn contains_span(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && other.low >= self.low && other.high <= self.high
    }

    /// Grow the span by `amount` on both ends.
    #[inline]
    pub fn expand(&self, amount: f64) -> Span {
        Span::new(self.low - amount, self.high + amount)
    }
}

/// The rectangle an item occupies in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRect {
    /// Left edge in pixels.
    pub left: f64,
    /// Top edge in pixels.
    pub top: f64,
    /// Column width in pixels.
    pub width: f64,
    /// Measured height in pixels.
    pub height: f64,
}

impl ItemRect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Vertical extent of the rectangle.
    #[inline]
    pub fn vertical_span(&self) -> Span {
        Span::from_extent(self.top, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemRect, Span};

    #[test]
    fn span_overlap_is_closed() {
        let a = Span::new(0.0, 10.0);
        assert!(a.overlaps(&Span::new(10.0, 20.0)));
        assert!(a.overlaps(&Span::new(-5.0, 0.0)));
        assert!(!a.overlaps(&Span::new(10.5, 20.0)));
    }

    #[test]
    fn degenerate_span_overlaps_nothing() {
        let bad = Span::new(12.0, 8.0);
        assert!(bad.is_empty());
        assert!(!bad.overlaps(&Span::new(0.0, 100.0)));
        assert!(!Span::new(0.0, 100.0).overlaps(&bad));
        assert_eq!(bad.len(), 0.0);
    }

    #[test]
    fn zero_length_span_is_a_point() {
        let point = Span::new(5.0, 5.0);
        assert!(!point.is_empty());
        assert!(point.overlaps(&Span::new(0.0, 5.0)));
    }

    #[test]
    fn nan_span_is_empty() {
        assert!(Span::new(f64::NAN, 1.0).is_empty());
    }

    #[test]
    fn extent_and_containment() {
        let view = Span::from_extent(100.0, 400.0);
        assert_eq!(view, Span::new(100.0, 500.0));
        assert!(view.contains_span(&Span::from_extent(100.0, 400.0)));
        assert!(view.contains_span(&Span::from_extent(250.0, 0.0)));
        assert!(!view.contains_span(&Span::from_extent(450.0, 60.0)));
        assert!(!view.contains_span(&Span::new(300.0, 200.0)));
    }

    #[test]
    fn expand_grows_both_edges() {
        assert_eq!(Span::new(10.0, 20.0).expand(5.0), Span::new(5.0, 25.0));
    }

    #[test]
    fn rect_edges() {
        let rect = ItemRect::new(240.0, 100.0, 220.0, 50.0);
        assert_eq!(rect.right(), 460.0);
        assert_eq!(rect.bottom(), 150.0);
        assert_eq!(rect.vertical_span(), Span::new(100.0, 150.0));
    }
}
