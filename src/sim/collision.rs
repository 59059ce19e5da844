//! Horizontal overlap tests and collision verdicts
//!
//! All collision in the game is one-dimensional: the actor and every obstacle
//! share a row, so only their horizontal extents matter.

use serde::{Deserialize, Serialize};

/// A horizontal pixel interval, half-open: `[left, right)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub left: f32,
    pub right: f32,
}

impl Extent {
    pub fn new(left: f32, width: f32) -> Self {
        Self {
            left,
            right: left + width,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// True when the two extents share at least one pixel
    ///
    /// Touching edges (`a.right == b.left`) do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Extent) -> bool {
        self.left < other.right && other.left < self.right
    }
}

/// Result of asking a lane whether the actor is safe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Actor is safe this frame
    Clear,
    /// Actor must lose a life
    Collision,
    /// Actor claimed the goal slot with this index
    Goal { slot: usize },
}

impl Verdict {
    pub fn is_collision(&self) -> bool {
        matches!(self, Verdict::Collision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_partial() {
        let a = Extent::new(0.0, 40.0);
        let b = Extent::new(30.0, 40.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_overlap_containment() {
        let log = Extent::new(100.0, 160.0);
        let actor = Extent::new(140.0, 40.0);
        assert!(log.overlaps(&actor));
        assert!(actor.overlaps(&log));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Extent::new(0.0, 40.0);
        let b = Extent::new(40.0, 40.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_one_pixel_overlap() {
        let a = Extent::new(0.0, 40.0);
        let b = Extent::new(39.0, 40.0);
        assert!(a.overlaps(&b));
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(
            al in -500.0f32..500.0, aw in 1.0f32..300.0,
            bl in -500.0f32..500.0, bw in 1.0f32..300.0,
        ) {
            let a = Extent::new(al, aw);
            let b = Extent::new(bl, bw);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_overlap_is_reflexive(l in -500.0f32..500.0, w in 1.0f32..300.0) {
            let a = Extent::new(l, w);
            prop_assert!(a.overlaps(&a));
        }

        #[test]
        fn prop_separated_extents_never_overlap(
            l in -500.0f32..500.0, w in 1.0f32..300.0,
            gap in 0.0f32..200.0, w2 in 1.0f32..300.0,
        ) {
            let a = Extent::new(l, w);
            let b = Extent::new(a.right + gap, w2);
            prop_assert!(!a.overlaps(&b));
        }
    }
}
