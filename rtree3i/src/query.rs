//! Ready-made box predicates for the `*_matching` queries of
//! [`RTreeMap`](crate::RTreeMap).
//!
//! Every predicate here is upward-monotone: whenever it accepts a box it
//! also accepts all boxes containing that box, which is what makes pruning
//! whole subtrees sound.

use crate::bounding_box::BoundingBox;

/// Accepts every box.
pub fn all() -> impl Fn(&BoundingBox) -> bool + Clone {
    |_| true
}

/// Accepts boxes whose interior overlaps the interior of `query`.
pub fn intersecting(query: BoundingBox) -> impl Fn(&BoundingBox) -> bool + Clone {
    move |mbb| mbb.intersects_closed(&query)
}

/// Accepts boxes that overlap or touch `query`.
pub fn touching(query: BoundingBox) -> impl Fn(&BoundingBox) -> bool + Clone {
    move |mbb| mbb.intersects_open(&query)
}

/// Accepts boxes that fully contain `query`.
pub fn containing(query: BoundingBox) -> impl Fn(&BoundingBox) -> bool + Clone {
    move |mbb| mbb.contains(&query)
}
