//! Strategies choosing the child node a new box descends into.

use std::fmt::Debug;

use itertools::Itertools;

use crate::bounding_box::{BoundingBox, Measure};

/// Chooses which of a branch's children receives a box being inserted.
///
/// Implementations must be pure and deterministic: the same inputs always
/// produce the same index. `candidates` is never empty, and the returned
/// index must be within its bounds.
pub trait Selector: Debug + Send + Sync {
    /// Returns the index of the candidate box that should receive `target`.
    ///
    /// `leaves` is true when the candidates are the boxes of leaf nodes.
    fn select(&self, target: &BoundingBox, candidates: &[BoundingBox], leaves: bool) -> usize;
}

/// Guttman's choice: the candidate that needs the least volume enlargement,
/// ties broken by the smaller resulting volume and then by position.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalVolumeIncreaseSelector;

impl Selector for MinimalVolumeIncreaseSelector {
    fn select(&self, target: &BoundingBox, candidates: &[BoundingBox], _leaves: bool) -> usize {
        let index = candidates
            .iter()
            .position_min_by_key(|candidate| volume_increase_key(candidate, target))
            .unwrap_or(0);
        log::trace!("Volume increase selector chose candidate {} for {}", index, target);
        index
    }
}

/// The candidate whose enlarged box overlaps the other candidates the least,
/// ties broken by volume enlargement, then resulting volume, then position.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalOverlapVolumeSelector;

impl Selector for MinimalOverlapVolumeSelector {
    fn select(&self, target: &BoundingBox, candidates: &[BoundingBox], _leaves: bool) -> usize {
        let index = candidates
            .iter()
            .enumerate()
            .map(|(i, candidate)| {
                let enlarged = candidate.add(target);
                let overlap: Measure = candidates
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, other)| enlarged.intersection_volume(other))
                    .sum();
                let (increase, volume) = volume_increase_key(candidate, target);
                (overlap, increase, volume)
            })
            .position_min()
            .unwrap_or(0);
        log::trace!("Overlap selector chose candidate {} for {}", index, target);
        index
    }
}

/// The R*-tree choice: minimal overlap just above the leaves, minimal
/// volume increase higher up.
#[derive(Debug, Clone, Copy, Default)]
pub struct RStarSelector;

impl Selector for RStarSelector {
    fn select(&self, target: &BoundingBox, candidates: &[BoundingBox], leaves: bool) -> usize {
        if leaves {
            MinimalOverlapVolumeSelector.select(target, candidates, leaves)
        } else {
            MinimalVolumeIncreaseSelector.select(target, candidates, leaves)
        }
    }
}

fn volume_increase_key(candidate: &BoundingBox, target: &BoundingBox) -> (Measure, Measure) {
    let enlarged = candidate.add(target);
    (enlarged.volume() - candidate.volume(), enlarged.volume())
}
