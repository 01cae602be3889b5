//! Strategies partitioning an overflowing node into two nodes.

use std::fmt::Debug;

use itertools::Itertools;

use crate::bounding_box::{BoundingBox, Measure};
use crate::errors::{RTreeError, RTreeResult};
use crate::group::{Group, Groups};

/// Partitions the children of an overflowing node into two groups.
///
/// A splitter works on the boxes of the children only and answers with
/// indices into `boxes`; the tree moves the children accordingly. Every
/// index must appear in exactly one of the two groups, and neither group may
/// be empty.
pub trait Splitter: Debug + Send + Sync {
    /// Splits `boxes` into two groups, each holding at least `min_size`
    /// items where possible.
    ///
    /// # Errors
    ///
    /// Returns [`RTreeError::InvalidSplit`] when fewer than two boxes are
    /// given.
    fn split(&self, boxes: &[BoundingBox], min_size: usize) -> RTreeResult<Groups<usize>>;
}

/// Guttman's quadratic-cost split.
///
/// The two boxes that would waste the most volume together seed the groups.
/// The remaining boxes are then handed out one at a time to the group that
/// stays smallest, keeping the groups balanced so that each ends up with at
/// least half of the boxes, rounded down.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticSplitter;

impl Splitter for QuadraticSplitter {
    fn split(&self, boxes: &[BoundingBox], _min_size: usize) -> RTreeResult<Groups<usize>> {
        check_splittable(boxes)?;

        let (seed1, seed2) = worst_combination(boxes);
        log::trace!("Quadratic split seeded with {} and {}", boxes[seed1], boxes[seed2]);

        let mut group1 = vec![seed1];
        let mut group2 = vec![seed2];
        let mut mbb1 = boxes[seed1];
        let mut mbb2 = boxes[seed2];
        let mut remaining: Vec<usize> = (0..boxes.len())
            .filter(|&i| i != seed1 && i != seed2)
            .collect();
        let min_group_size = boxes.len() / 2;

        while !remaining.is_empty() {
            let (pos1, volume1) = best_candidate(boxes, &remaining, &mbb1);
            let (pos2, volume2) = best_candidate(boxes, &remaining, &mbb2);
            let first_is_smaller = volume1 <= volume2;

            let to_first = if first_is_smaller {
                group2.len() + remaining.len() > min_group_size
            } else {
                group1.len() + remaining.len() == min_group_size
            };

            if to_first {
                let item = remaining.remove(pos1);
                mbb1 = mbb1.add(&boxes[item]);
                group1.push(item);
            } else {
                let item = remaining.remove(pos2);
                mbb2 = mbb2.add(&boxes[item]);
                group2.push(item);
            }
        }

        index_groups(boxes, group1, group2)
    }
}

/// Finds the pair of boxes whose union has the largest volume. The first
/// such pair in index order wins.
fn worst_combination(boxes: &[BoundingBox]) -> (usize, usize) {
    (0..boxes.len())
        .tuple_combinations()
        .map(|(i, j)| ((i, j), boxes[i].add(&boxes[j]).volume()))
        .fold(None, |worst: Option<((usize, usize), Measure)>, (pair, volume)| match worst {
            Some((_, max)) if volume <= max => worst,
            _ => Some((pair, volume)),
        })
        .map(|(pair, _)| pair)
        .unwrap_or((0, 1))
}

/// Returns the position in `remaining` of the box that grows `mbb` the
/// least, along with the volume `mbb` would reach.
fn best_candidate(boxes: &[BoundingBox], remaining: &[usize], mbb: &BoundingBox) -> (usize, Measure) {
    remaining
        .iter()
        .map(|&item| mbb.add(&boxes[item]).volume())
        .enumerate()
        .min_by_key(|&(_, volume)| volume)
        .unwrap_or((0, 0))
}

/// The R*-tree split.
///
/// Boxes are sorted by each of the six box coordinates in turn and every
/// split point leaving at least `min_size` boxes on both sides becomes a
/// candidate. The sort key whose candidates have the smallest total margin
/// wins, and among its candidates the one with the least overlap between
/// both groups, then the least total volume, is chosen.
#[derive(Debug, Clone, Copy, Default)]
pub struct RStarSplitter;

type SortKey = fn(&BoundingBox) -> i32;

const SORT_KEYS: [(&str, SortKey); 6] = [
    ("x1", BoundingBox::x1),
    ("x2", BoundingBox::x2),
    ("y1", BoundingBox::y1),
    ("y2", BoundingBox::y2),
    ("z1", BoundingBox::z1),
    ("z2", BoundingBox::z2),
];

impl Splitter for RStarSplitter {
    fn split(&self, boxes: &[BoundingBox], min_size: usize) -> RTreeResult<Groups<usize>> {
        check_splittable(boxes)?;
        let min_size = min_size.clamp(1, boxes.len() / 2);

        let mut best_axis: Option<(&str, Vec<Groups<usize>>, Measure)> = None;
        for (name, key) in SORT_KEYS {
            let mut order: Vec<usize> = (0..boxes.len()).collect();
            order.sort_by_key(|&i| key(&boxes[i]));

            let candidates = (min_size..=boxes.len() - min_size)
                .map(|at| index_groups(boxes, order[..at].to_vec(), order[at..].to_vec()))
                .collect::<RTreeResult<Vec<_>>>()?;
            let margin: Measure = candidates.iter().map(Groups::margin_sum).sum();

            match &best_axis {
                Some((_, _, least)) if margin >= *least => {}
                _ => best_axis = Some((name, candidates, margin)),
            }
        }

        let (name, candidates, margin) = best_axis
            .ok_or_else(|| RTreeError::InvalidSplit("no split candidates".to_string()))?;
        log::trace!("R* split along {} with margin sum {}", name, margin);

        candidates
            .into_iter()
            .min_by_key(|groups| (groups.intersection_volume(), groups.volume_sum()))
            .ok_or_else(|| RTreeError::InvalidSplit("no split candidates".to_string()))
    }
}

fn check_splittable(boxes: &[BoundingBox]) -> RTreeResult<()> {
    if boxes.len() < 2 {
        log::error!("Cannot split {} items", boxes.len());
        return Err(RTreeError::InvalidSplit(format!(
            "at least 2 items are required, got {}",
            boxes.len()
        )));
    }
    Ok(())
}

fn index_groups(boxes: &[BoundingBox], first: Vec<usize>, second: Vec<usize>) -> RTreeResult<Groups<usize>> {
    let first = Group::of(first, |&i| boxes[i])
        .ok_or_else(|| RTreeError::InvalidSplit("first group is empty".to_string()))?;
    let second = Group::of(second, |&i| boxes[i])
        .ok_or_else(|| RTreeError::InvalidSplit("second group is empty".to_string()))?;
    Ok(Groups::new(first, second))
}
