//! Property-based invariant tests for pixel-space geometry.
//!
//! 1. Intersection is commutative.
//! 2. Intersection fits within both inputs.
//! 3. Inflate then deflate restores the original rectangle.
//! 4. Centering preserves size and center.

use guide_core::geometry::{Rect, Size};
use proptest::prelude::*;

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (
        -2000i32..2000,
        -2000i32..2000,
        0i32..1500,
        0i32..1500,
    )
        .prop_map(|(x, y, w, h)| Rect::new(x as f64, y as f64, w as f64, h as f64))
}

proptest! {
    #[test]
    fn intersection_commutative(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.intersection_opt(&b), b.intersection_opt(&a));
    }

    #[test]
    fn intersection_within_both(a in rect_strategy(), b in rect_strategy()) {
        if let Some(i) = a.intersection_opt(&b) {
            prop_assert!(a.contains_rect(&i), "a={:?} i={:?}", a, i);
            prop_assert!(b.contains_rect(&i), "b={:?} i={:?}", b, i);
            prop_assert!(!i.is_empty());
        }
    }

    #[test]
    fn inflate_deflate_roundtrip(r in rect_strategy(), pad in 0i32..200) {
        let pad = pad as f64;
        prop_assert_eq!(r.inflate(pad).inflate(-pad), r);
    }

    #[test]
    fn centered_keeps_size_and_center(r in rect_strategy(), w in 0i32..500, h in 0i32..500) {
        let size = Size::new(w as f64, h as f64);
        let c = r.centered(size);
        prop_assert_eq!(c.size(), size);
        prop_assert!((c.center().x - r.center().x).abs() < 1e-9);
        prop_assert!((c.center().y - r.center().y).abs() < 1e-9);
    }
}
