//! Two-way partitions produced by splitters.

use crate::bounding_box::{BoundingBox, Measure};
use crate::errors::{RTreeError, RTreeResult};

/// A non-empty list of items together with their minimum bounding box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group<T> {
    items: Vec<T>,
    mbb: BoundingBox,
}

impl<T> Group<T> {
    /// Creates a group, computing its bounding box with `box_of`.
    ///
    /// Returns `None` when `items` is empty, since an empty group has no
    /// bounding box.
    pub fn of<F>(items: Vec<T>, box_of: F) -> Option<Group<T>>
    where
        F: Fn(&T) -> BoundingBox,
    {
        let boxes: Vec<BoundingBox> = items.iter().map(&box_of).collect();
        let mbb = BoundingBox::mbb(&boxes)?;
        Some(Group { items, mbb })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn mbb(&self) -> &BoundingBox {
        &self.mbb
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A partition of items into exactly two groups, with the statistics the
/// R*-tree split heuristics compare candidates by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Groups<T> {
    first: Group<T>,
    second: Group<T>,
    margin_sum: Measure,
    volume_sum: Measure,
}

impl<T> Groups<T> {
    pub fn new(first: Group<T>, second: Group<T>) -> Self {
        let margin_sum = first.mbb.surface_area() + second.mbb.surface_area();
        let volume_sum = first.mbb.volume() + second.mbb.volume();
        Groups {
            first,
            second,
            margin_sum,
            volume_sum,
        }
    }

    pub fn first(&self) -> &Group<T> {
        &self.first
    }

    pub fn second(&self) -> &Group<T> {
        &self.second
    }

    pub fn into_groups(self) -> (Group<T>, Group<T>) {
        (self.first, self.second)
    }

    /// Sum of the surface areas of both group boxes.
    pub fn margin_sum(&self) -> Measure {
        self.margin_sum
    }

    /// Sum of the volumes of both group boxes.
    pub fn volume_sum(&self) -> Measure {
        self.volume_sum
    }

    /// Volume of the overlap between both group boxes.
    pub fn intersection_volume(&self) -> Measure {
        self.first.mbb.intersection_volume(&self.second.mbb)
    }
}

impl Groups<usize> {
    /// Moves `items` into two lists following this partition of their
    /// indices.
    ///
    /// Fails if the partition does not use every index exactly once, which
    /// can only happen with a faulty [`Splitter`](crate::Splitter).
    pub(crate) fn distribute<X>(&self, items: Vec<X>) -> RTreeResult<(Vec<X>, Vec<X>)> {
        let count = items.len();
        if self.first.len() + self.second.len() != count {
            return Err(RTreeError::InvalidSplit(format!(
                "partition covers {} of {} items",
                self.first.len() + self.second.len(),
                count
            )));
        }

        let mut slots: Vec<Option<X>> = items.into_iter().map(Some).collect();
        let mut take = |indices: &[usize]| -> RTreeResult<Vec<X>> {
            indices
                .iter()
                .map(|&index| {
                    slots
                        .get_mut(index)
                        .and_then(Option::take)
                        .ok_or_else(|| {
                            RTreeError::InvalidSplit(format!(
                                "index {} is out of range or used twice",
                                index
                            ))
                        })
                })
                .collect()
        };
        let first = take(&self.first.items)?;
        let second = take(&self.second.items)?;
        Ok((first, second))
    }
}
