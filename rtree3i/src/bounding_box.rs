use std::fmt::{Display, Formatter};

use crate::errors::{RTreeError, RTreeResult};

/// Integer type used for volumes, surface areas and their sums.
///
/// Coordinates are `i32`, so a single extent fits in 33 bits and a volume in
/// 99 bits. `i128` holds every volume, area and realistic sum of them exactly.
pub type Measure = i128;

/// A 3D axis-aligned bounding box with integer coordinates.
///
/// `BoundingBox` is defined by its minimum corner (x1, y1, z1) and maximum
/// corner (x2, y2, z2). A box may be flat on any axis, making it a face, a
/// line or a point. The minimum is never greater than the maximum on any
/// axis; this is checked by [`BoundingBox::create`].
///
/// # Examples
///
/// ```rust
/// use rtree3i::BoundingBox;
///
/// let a = BoundingBox::create(0, 0, 0, 2, 2, 2).unwrap();
/// let b = BoundingBox::create(1, 1, 1, 3, 3, 3).unwrap();
///
/// assert!(a.intersects_closed(&b));
/// assert_eq!(a.intersection_volume(&b), 1);
/// assert_eq!(a.add(&b), BoundingBox::create(0, 0, 0, 3, 3, 3).unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "BoxFields")
)]
pub struct BoundingBox {
    x1: i32,
    y1: i32,
    z1: i32,
    x2: i32,
    y2: i32,
    z2: i32,
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BoundingBox({}, {}, {}, {}, {}, {})",
            self.x1, self.y1, self.z1, self.x2, self.y2, self.z2
        )
    }
}

impl BoundingBox {
    /// Creates a new bounding box with the specified coordinates.
    ///
    /// # Arguments
    ///
    /// * `x1`, `y1`, `z1` - Minimum corner
    /// * `x2`, `y2`, `z2` - Maximum corner
    ///
    /// # Errors
    ///
    /// Returns [`RTreeError::InvalidBox`] if the minimum is greater than the
    /// maximum on any axis.
    pub fn create(x1: i32, y1: i32, z1: i32, x2: i32, y2: i32, z2: i32) -> RTreeResult<BoundingBox> {
        if x1 > x2 || y1 > y2 || z1 > z2 {
            log::error!(
                "Rejecting box ({}, {}, {}) to ({}, {}, {})",
                x1, y1, z1, x2, y2, z2
            );
            return Err(RTreeError::InvalidBox { x1, y1, z1, x2, y2, z2 });
        }
        Ok(BoundingBox { x1, y1, z1, x2, y2, z2 })
    }

    /// Creates a box covering a single point.
    pub fn point(x: i32, y: i32, z: i32) -> BoundingBox {
        BoundingBox {
            x1: x,
            y1: y,
            z1: z,
            x2: x,
            y2: y,
            z2: z,
        }
    }

    /// Creates the smallest box spanning two arbitrary corners.
    ///
    /// Unlike [`BoundingBox::create`] the corners may be given in any order.
    pub fn spanning(a: [i32; 3], b: [i32; 3]) -> BoundingBox {
        BoundingBox {
            x1: a[0].min(b[0]),
            y1: a[1].min(b[1]),
            z1: a[2].min(b[2]),
            x2: a[0].max(b[0]),
            y2: a[1].max(b[1]),
            z2: a[2].max(b[2]),
        }
    }

    /// Returns the minimum bounding box of a sequence of boxes, or `None` if
    /// the sequence is empty.
    pub fn mbb<'a, I>(boxes: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = &'a BoundingBox>,
    {
        let mut iter = boxes.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, b| acc.add(b)))
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn z1(&self) -> i32 {
        self.z1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn z2(&self) -> i32 {
        self.z2
    }

    fn extents(&self) -> (Measure, Measure, Measure) {
        (
            (self.x2 as i64 - self.x1 as i64) as Measure,
            (self.y2 as i64 - self.y1 as i64) as Measure,
            (self.z2 as i64 - self.z1 as i64) as Measure,
        )
    }

    /// Returns the volume of the box. Flat boxes have zero volume.
    pub fn volume(&self) -> Measure {
        let (dx, dy, dz) = self.extents();
        dx * dy * dz
    }

    /// Returns the surface area of the box.
    pub fn surface_area(&self) -> Measure {
        let (dx, dy, dz) = self.extents();
        2 * (dx * dy + dy * dz + dx * dz)
    }

    /// Returns the minimum bounding box containing both this box and `other`.
    pub fn add(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            z1: self.z1.min(other.z1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
            z2: self.z2.max(other.z2),
        }
    }

    /// Checks if the interiors of both boxes overlap on every axis.
    ///
    /// Boxes that merely touch along a face, edge or corner do not have a
    /// closed intersection.
    pub fn intersects_closed(&self, other: &BoundingBox) -> bool {
        self.x1 < other.x2
            && self.x2 > other.x1
            && self.y1 < other.y2
            && self.y2 > other.y1
            && self.z1 < other.z2
            && self.z2 > other.z1
    }

    /// Checks if both boxes overlap or touch on every axis.
    pub fn intersects_open(&self, other: &BoundingBox) -> bool {
        self.x1 <= other.x2
            && self.x2 >= other.x1
            && self.y1 <= other.y2
            && self.y2 >= other.y1
            && self.z1 <= other.z2
            && self.z2 >= other.z1
    }

    /// Checks if this box fully contains `other`. Equal bounds count as contained.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.x1 <= other.x1
            && self.x2 >= other.x2
            && self.y1 <= other.y1
            && self.y2 >= other.y2
            && self.z1 <= other.z1
            && self.z2 >= other.z2
    }

    /// Checks if this box is fully contained by `other`.
    pub fn contained_by(&self, other: &BoundingBox) -> bool {
        other.contains(self)
    }

    /// Returns the volume of the intersection of both boxes, or zero if they
    /// have no closed intersection.
    pub fn intersection_volume(&self, other: &BoundingBox) -> Measure {
        if !self.intersects_closed(other) {
            return 0;
        }
        BoundingBox {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            z1: self.z1.max(other.z1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
            z2: self.z2.min(other.z2),
        }
        .volume()
    }

    /// Returns how much the volume of this box grows when `other` is added to it.
    pub fn volume_increase(&self, other: &BoundingBox) -> Measure {
        self.add(other).volume() - self.volume()
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct BoxFields {
    x1: i32,
    y1: i32,
    z1: i32,
    x2: i32,
    y2: i32,
    z2: i32,
}

#[cfg(feature = "serde")]
impl TryFrom<BoxFields> for BoundingBox {
    type Error = RTreeError;

    fn try_from(f: BoxFields) -> RTreeResult<Self> {
        BoundingBox::create(f.x1, f.y1, f.z1, f.x2, f.y2, f.z2)
    }
}
