//! The persistent tree nodes.
//!
//! Nodes are never modified once built. Insertion and removal rebuild the
//! nodes on the path from the root to the affected leaf and share every
//! other subtree with the previous version through [`Arc`].

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use smallvec::{smallvec, SmallVec};

use crate::bounding_box::BoundingBox;
use crate::bucket::Bucket;
use crate::configuration::Configuration;
use crate::entry::Entry;
use crate::errors::{RTreeError, RTreeResult};

/// One or two nodes replacing a node after an insertion.
pub(crate) type Nodes<K, V> = SmallVec<[Arc<Node<K, V>>; 2]>;

/// A tree node.
///
/// Leaves hold buckets, branches hold child nodes, and both cache the
/// bounding box and the number of entries below them. Neither kind is ever
/// empty, and all leaves of one tree sit at the same depth.
pub(crate) enum Node<K, V> {
    Leaf {
        mbb: BoundingBox,
        size: usize,
        buckets: Vec<Arc<Bucket<K, V>>>,
    },
    Branch {
        mbb: BoundingBox,
        size: usize,
        children: Vec<Arc<Node<K, V>>>,
    },
}

/// An item travelling down the tree towards the leaf that will hold it.
pub(crate) enum Insertion<K, V> {
    /// A single entry, whose key maps to `mbb`.
    Entry {
        mbb: BoundingBox,
        entry: Arc<Entry<K, V>>,
    },
    /// A whole bucket orphaned by a removal.
    Bucket(Arc<Bucket<K, V>>),
}

impl<K, V> Insertion<K, V> {
    pub fn mbb(&self) -> &BoundingBox {
        match self {
            Insertion::Entry { mbb, .. } => mbb,
            Insertion::Bucket(bucket) => bucket.mbb(),
        }
    }

    pub fn to_bucket(&self) -> Arc<Bucket<K, V>> {
        match self {
            Insertion::Entry { mbb, entry } => Arc::new(Bucket::of(*mbb, entry.clone())),
            Insertion::Bucket(bucket) => bucket.clone(),
        }
    }
}

/// Outcome of removing from a node.
pub(crate) enum Removal<K, V> {
    /// Nothing matched; the node stays as it is.
    Unchanged,
    /// The node was rebuilt without the removed entries.
    Replaced {
        node: Arc<Node<K, V>>,
        orphans: Vec<Arc<Bucket<K, V>>>,
        removed: usize,
    },
    /// The node fell below the minimum fill and dissolved. Its remaining
    /// buckets must be inserted again from the root.
    Dissolved {
        orphans: Vec<Arc<Bucket<K, V>>>,
        removed: usize,
    },
}

impl<K, V> Node<K, V> {
    /// Builds a leaf, or `None` if `buckets` is empty.
    pub fn leaf(buckets: Vec<Arc<Bucket<K, V>>>) -> Option<Arc<Node<K, V>>> {
        let mbb = BoundingBox::mbb(buckets.iter().map(|bucket| bucket.mbb()))?;
        let size = buckets.iter().map(|bucket| bucket.len()).sum();
        Some(Arc::new(Node::Leaf { mbb, size, buckets }))
    }

    /// Builds a branch, or `None` if `children` is empty.
    pub fn branch(children: Vec<Arc<Node<K, V>>>) -> Option<Arc<Node<K, V>>> {
        let mbb = BoundingBox::mbb(children.iter().map(|child| child.mbb()))?;
        let size = children.iter().map(|child| child.size()).sum();
        Some(Arc::new(Node::Branch {
            mbb,
            size,
            children,
        }))
    }

    pub fn mbb(&self) -> &BoundingBox {
        match self {
            Node::Leaf { mbb, .. } | Node::Branch { mbb, .. } => mbb,
        }
    }

    /// Number of entries in this subtree.
    pub fn size(&self) -> usize {
        match self {
            Node::Leaf { size, .. } | Node::Branch { size, .. } => *size,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Number of levels from this node down to the leaves, counting both.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut node = self;
        while let Node::Branch { children, .. } = node {
            match children.first() {
                Some(child) => node = child,
                None => break,
            }
            depth += 1;
        }
        depth
    }

    /// Checks whether a bucket with exactly `mbb` exists in this subtree.
    pub fn contains_bucket(&self, mbb: &BoundingBox) -> bool {
        if !self.mbb().contains(mbb) {
            return false;
        }
        match self {
            Node::Leaf { buckets, .. } => buckets.iter().any(|bucket| bucket.mbb() == mbb),
            Node::Branch { children, .. } => children.iter().any(|child| child.contains_bucket(mbb)),
        }
    }

    fn find_bucket(&self, mbb: &BoundingBox) -> Option<&Bucket<K, V>> {
        if !self.mbb().contains(mbb) {
            return None;
        }
        match self {
            Node::Leaf { buckets, .. } => buckets
                .iter()
                .find(|bucket| bucket.mbb() == mbb)
                .map(|bucket| &**bucket),
            Node::Branch { children, .. } => {
                children.iter().find_map(|child| child.find_bucket(mbb))
            }
        }
    }

    /// Removes from the bucket with exactly `mbb`.
    ///
    /// `remove_from` answers `None` when the bucket holds nothing to remove,
    /// and otherwise the bucket left after the removal, if any. Every child
    /// whose box contains `mbb` is searched.
    pub fn remove<F>(&self, mbb: &BoundingBox, remove_from: &F, config: &Configuration) -> Removal<K, V>
    where
        F: Fn(&Bucket<K, V>) -> Option<Option<Bucket<K, V>>>,
    {
        match self {
            Node::Leaf { buckets, .. } => {
                let index = match buckets.iter().position(|bucket| bucket.mbb() == mbb) {
                    Some(index) => index,
                    None => return Removal::Unchanged,
                };
                let remaining = match remove_from(&buckets[index]) {
                    Some(remaining) => remaining,
                    None => return Removal::Unchanged,
                };

                let mut buckets = buckets.clone();
                match remaining {
                    Some(bucket) => buckets[index] = Arc::new(bucket),
                    None => {
                        buckets.remove(index);
                    }
                }

                if buckets.len() >= config.min_children() {
                    match Node::leaf(buckets) {
                        Some(node) => Removal::Replaced {
                            node,
                            orphans: Vec::new(),
                            removed: 1,
                        },
                        None => Removal::Dissolved {
                            orphans: Vec::new(),
                            removed: 1,
                        },
                    }
                } else {
                    Removal::Dissolved {
                        orphans: buckets,
                        removed: 1,
                    }
                }
            }
            Node::Branch { children, .. } => {
                let mut changed = false;
                let mut next = Vec::with_capacity(children.len());
                let mut orphans = Vec::new();
                let mut removed = 0;

                for child in children {
                    if !child.mbb().contains(mbb) {
                        next.push(child.clone());
                        continue;
                    }
                    match child.remove(mbb, remove_from, config) {
                        Removal::Unchanged => next.push(child.clone()),
                        Removal::Replaced {
                            node,
                            orphans: child_orphans,
                            removed: child_removed,
                        } => {
                            changed = true;
                            next.push(node);
                            orphans.extend(child_orphans);
                            removed += child_removed;
                        }
                        Removal::Dissolved {
                            orphans: child_orphans,
                            removed: child_removed,
                        } => {
                            changed = true;
                            orphans.extend(child_orphans);
                            removed += child_removed;
                        }
                    }
                }

                if !changed {
                    return Removal::Unchanged;
                }
                match Node::branch(next) {
                    Some(node) => Removal::Replaced {
                        node,
                        orphans,
                        removed,
                    },
                    None => Removal::Dissolved { orphans, removed },
                }
            }
        }
    }

    fn write_tree(&self, f: &mut Formatter<'_>, margin: &str) -> std::fmt::Result
    where
        K: Debug,
        V: Debug,
    {
        writeln!(f, "{}mbb={}", margin, self.mbb())?;
        let inner = format!("{}  ", margin);
        match self {
            Node::Leaf { buckets, .. } => {
                for bucket in buckets {
                    writeln!(f, "{}{:?}", inner, bucket)?;
                }
            }
            Node::Branch { children, .. } => {
                for child in children {
                    child.write_tree(f, &inner)?;
                }
            }
        }
        Ok(())
    }
}

impl<K: PartialEq, V> Node<K, V> {
    /// Inserts `item`, returning the node that replaces this one, or two
    /// nodes if this one had to be split.
    pub fn put(&self, item: &Insertion<K, V>, config: &Configuration) -> RTreeResult<Nodes<K, V>> {
        match self {
            Node::Leaf { buckets, .. } => {
                let mut buckets = buckets.clone();
                match buckets.iter().position(|bucket| bucket.mbb() == item.mbb()) {
                    Some(index) => {
                        let updated = match item {
                            Insertion::Entry { entry, .. } => buckets[index].put(entry.clone()),
                            Insertion::Bucket(bucket) => buckets[index].merge(bucket),
                        };
                        buckets[index] = Arc::new(updated);
                    }
                    None => buckets.push(item.to_bucket()),
                }

                if buckets.len() <= config.max_children() {
                    Ok(smallvec![Node::leaf(buckets).ok_or_else(empty_node)?])
                } else {
                    split(buckets, |bucket| *bucket.mbb(), Node::leaf, config, "leaf")
                }
            }
            Node::Branch { children, .. } => {
                let index = select_child_for_put(children, item.mbb(), config);
                let replacements = children[index].put(item, config)?;

                let mut children = children.clone();
                children.splice(index..=index, replacements);

                if children.len() <= config.max_children() {
                    Ok(smallvec![Node::branch(children).ok_or_else(empty_node)?])
                } else {
                    split(children, |child| *child.mbb(), Node::branch, config, "branch")
                }
            }
        }
    }

    /// Finds the entry for `key`, whose box is `mbb`.
    pub fn get(&self, mbb: &BoundingBox, key: &K) -> Option<&Entry<K, V>> {
        self.find_bucket(mbb).and_then(|bucket| bucket.get(key))
    }
}

impl<K: PartialEq, V: PartialEq> Node<K, V> {
    pub fn contains(&self, mbb: &BoundingBox, key: &K, value: &V) -> bool {
        self.find_bucket(mbb)
            .map_or(false, |bucket| bucket.contains(key, value))
    }
}

impl<K: Debug, V: Debug> Debug for Node<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.write_tree(f, "")
    }
}

/// Chooses the child of a branch that receives a new box.
///
/// A child that already holds a bucket with exactly this box always wins, so
/// keys sharing a box end up in one bucket. Otherwise the first child that
/// already contains the box is taken, and only then the selector decides.
fn select_child_for_put<K, V>(
    children: &[Arc<Node<K, V>>],
    mbb: &BoundingBox,
    config: &Configuration,
) -> usize {
    if let Some(index) = children.iter().position(|child| child.contains_bucket(mbb)) {
        return index;
    }
    if let Some(index) = children.iter().position(|child| child.mbb().contains(mbb)) {
        return index;
    }

    let boxes: Vec<BoundingBox> = children.iter().map(|child| *child.mbb()).collect();
    let leaves = children.first().map_or(false, |child| child.is_leaf());
    let index = config.selector().select(mbb, &boxes, leaves);
    if index < children.len() {
        index
    } else {
        log::warn!(
            "Selector returned index {} for {} candidates, using the first",
            index,
            children.len()
        );
        0
    }
}

fn split<T, K, V>(
    items: Vec<T>,
    box_of: fn(&T) -> BoundingBox,
    build: fn(Vec<T>) -> Option<Arc<Node<K, V>>>,
    config: &Configuration,
    kind: &str,
) -> RTreeResult<Nodes<K, V>> {
    let boxes: Vec<BoundingBox> = items.iter().map(box_of).collect();
    let groups = config.splitter().split(&boxes, config.min_children())?;
    let (first, second) = groups.distribute(items)?;
    log::debug!(
        "Split {} of {} children into {} and {}",
        kind,
        boxes.len(),
        first.len(),
        second.len()
    );
    Ok(smallvec![
        build(first).ok_or_else(empty_node)?,
        build(second).ok_or_else(empty_node)?
    ])
}

fn empty_node() -> RTreeError {
    RTreeError::InvalidSplit("split produced an empty node".to_string())
}
