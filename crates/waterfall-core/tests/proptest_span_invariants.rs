//! Property-based invariant tests for [`Span`] and the debouncer.
//!
//! 1. Overlap is symmetric.
//! 2. Overlap agrees with a point-sampling oracle on integer spans.
//! 3. Expanding a span never loses an overlap.
//! 4. The debouncer never holds a sample past `max_wait`.

use std::time::{Duration, Instant};

use proptest::prelude::*;
use waterfall_core::debounce::{DebounceAction, DebounceConfig, Debouncer};
use waterfall_core::geometry::Span;

fn span_strategy() -> impl Strategy<Value = Span> {
    (-500i32..500, -500i32..500).prop_map(|(a, b)| Span::new(f64::from(a), f64::from(b)))
}

proptest! {
    #[test]
    fn overlap_symmetric(a in span_strategy(), b in span_strategy()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }
}

proptest! {
    #[test]
    fn overlap_matches_point_oracle(a in span_strategy(), b in span_strategy()) {
        let shared_point = (-500i32..500).any(|p| {
            let p = f64::from(p);
            !a.is_empty() && !b.is_empty()
                && p >= a.low && p <= a.high && p >= b.low && p <= b.high
        });
        prop_assert_eq!(a.overlaps(&b), shared_point, "a={:?} b={:?}", a, b);
    }
}

proptest! {
    #[test]
    fn expand_preserves_overlap(a in span_strategy(), b in span_strategy(), grow in 0u16..200) {
        if a.overlaps(&b) {
            prop_assert!(a.expand(f64::from(grow)).overlaps(&b));
        }
    }
}

proptest! {
    #[test]
    fn debounce_respects_max_wait(gaps in prop::collection::vec(0u64..20, 1..64)) {
        let max_wait = Duration::from_millis(50);
        let config = DebounceConfig::default()
            .with_wait(Duration::from_millis(25))
            .with_max_wait(Some(max_wait));
        let mut debouncer = Debouncer::new(config);
        let t0 = Instant::now();
        let mut now = t0;
        let mut burst_start: Option<Instant> = None;

        for (i, gap) in gaps.iter().enumerate() {
            now += Duration::from_millis(*gap);
            if let DebounceAction::Fire { value, .. } = debouncer.poll_at(now) {
                prop_assert!(value < i as f64);
                burst_start = None;
            }
            let start = *burst_start.get_or_insert(now);
            match debouncer.call_at(i as f64, now) {
                DebounceAction::Fire { value, waited, .. } => {
                    prop_assert_eq!(value, i as f64);
                    prop_assert!(waited <= max_wait + Duration::from_millis(20));
                    burst_start = None;
                }
                DebounceAction::Pending => {
                    prop_assert!(now.duration_since(start) < max_wait);
                }
                DebounceAction::Idle => prop_assert!(false, "call never reports idle"),
            }
        }
    }
}
