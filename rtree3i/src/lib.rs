//! # rtree3i - Persistent R-Tree Map over 3D Integer Boxes
//!
//! This crate provides an immutable, persistent R-tree map. Keys are indexed
//! by an axis-aligned box with `i32` coordinates derived from each key, and
//! every update returns a new map that shares all untouched subtrees with
//! the previous one.
//!
//! ## Features
//!
//! - **Persistent**: Every version stays valid and queryable after updates
//! - **Structural Sharing**: Updates rebuild only the root-to-leaf path
//! - **Guttman and R\*-tree Heuristics**: Quadratic and R\* node splitting,
//!   volume-increase and overlap-based child selection
//! - **Pluggable Strategies**: Custom [`Selector`] and [`Splitter`] implementations
//! - **Lazy Queries**: [`Selection`] prunes subtrees by box predicate and never
//!   materializes intermediate results
//! - **Thread Safe**: Snapshots are `Send + Sync`; [`SharedRTreeMap`] publishes
//!   versions across threads
//!
//! ## Quick Start
//!
//! ```rust
//! use rtree3i::{query, BoundingBox, Configuration, RTreeMap};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Index device names by their position
//! let map = RTreeMap::create_with(Configuration::default(), |pos: &(i32, i32, i32)| {
//!     BoundingBox::point(pos.0, pos.1, pos.2)
//! });
//! let map = map
//!     .put((0, 64, 0), "lamp")?
//!     .put((3, 64, 1), "lever")?
//!     .put((100, 70, 100), "door")?;
//!
//! // Find everything within a region
//! let region = BoundingBox::create(-5, 60, -5, 5, 68, 5)?;
//! let nearby: Vec<&&str> = map.values_matching(query::touching(region)).collect();
//! assert_eq!(nearby.len(), 2);
//!
//! // Older versions are unaffected by updates
//! let without_lamp = map.remove(&(0, 64, 0))?;
//! assert_eq!(without_lamp.size(), 2);
//! assert_eq!(map.size(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## R*-tree Configuration
//!
//! ```rust
//! use rtree3i::{BoundingBox, Configuration, Entry, RTreeMap};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let configuration = Configuration::builder().star().max_children(8).build()?;
//! let map = RTreeMap::create(configuration)
//!     .put_all((0..100).map(|i| Entry::new(BoundingBox::point(i, i, i), i)))?;
//! assert_eq!(map.size(), 100);
//! # Ok(())
//! # }
//! ```

// Core R-Tree modules
pub mod bounding_box;
mod bucket;
pub mod entry;
pub mod errors;
mod node;
pub mod rtree_map;
pub mod selection;

// Balancing strategies
pub mod configuration;
pub mod group;
pub mod selector;
pub mod splitter;

// Queries and sharing
pub mod query;
pub mod shared;

// Re-export R-Tree types
pub use bounding_box::{BoundingBox, Measure};
pub use entry::Entry;
pub use errors::{RTreeError, RTreeResult};
pub use rtree_map::RTreeMap;
pub use selection::{Selection, SelectionIter};
pub use shared::SharedRTreeMap;

// Re-export strategy types
pub use configuration::{Configuration, ConfigurationBuilder, DEFAULT_FILLING_FACTOR, DEFAULT_MAX_CHILDREN};
pub use group::{Group, Groups};
pub use selector::{MinimalOverlapVolumeSelector, MinimalVolumeIncreaseSelector, RStarSelector, Selector};
pub use splitter::{QuadraticSplitter, RStarSplitter, Splitter};
