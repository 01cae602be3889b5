use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::bounding_box::BoundingBox;
use crate::bucket::Bucket;
use crate::configuration::Configuration;
use crate::entry::Entry;
use crate::errors::{RTreeError, RTreeResult};
use crate::node::{Insertion, Node, Removal};
use crate::query;
use crate::selection::{Selection, SelectionIter};

type KeyBox<K> = Arc<dyn Fn(&K) -> BoundingBox + Send + Sync>;

/// An immutable, persistent R-tree map from keys to values, indexed by a
/// three-dimensional integer box derived from each key.
///
/// Every modifying operation returns a new map and leaves `self` untouched.
/// Only the nodes on the path from the root to the modified leaf are
/// rebuilt; all other subtrees are shared between both versions, so old
/// snapshots stay valid and cheap to keep. Cloning a map is O(1).
///
/// Keys sharing the same box are kept together in one bucket. The key-to-box
/// function must be pure: a key has to map to the same box for as long as it
/// is stored in the map.
///
/// # Examples
///
/// ```rust
/// use rtree3i::{query, BoundingBox, Configuration, RTreeMap};
///
/// # fn main() -> rtree3i::RTreeResult<()> {
/// let empty = RTreeMap::create(Configuration::default());
/// let map = empty
///     .put(BoundingBox::create(0, 0, 0, 1, 1, 1)?, "a")?
///     .put(BoundingBox::create(5, 5, 5, 6, 6, 6)?, "b")?;
///
/// assert_eq!(map.size(), 2);
/// assert!(empty.is_empty());
/// assert_eq!(map.get(&BoundingBox::create(5, 5, 5, 6, 6, 6)?), Some(&"b"));
///
/// let near_origin = map.values_matching(query::intersecting(BoundingBox::create(0, 0, 0, 2, 2, 2)?));
/// assert_eq!(near_origin.collect::<Vec<_>>(), vec![&"a"]);
/// # Ok(())
/// # }
/// ```
pub struct RTreeMap<K, V> {
    root: Option<Arc<Node<K, V>>>,
    configuration: Configuration,
    key_box: KeyBox<K>,
}

impl<K, V> Clone for RTreeMap<K, V> {
    fn clone(&self) -> Self {
        RTreeMap {
            root: self.root.clone(),
            configuration: self.configuration.clone(),
            key_box: self.key_box.clone(),
        }
    }
}

impl<V> RTreeMap<BoundingBox, V> {
    /// Creates an empty map whose keys are boxes.
    pub fn create(configuration: Configuration) -> Self {
        RTreeMap::create_with(configuration, |key: &BoundingBox| *key)
    }
}

impl<K, V> RTreeMap<K, V> {
    /// Creates an empty map that derives the box of each key with `key_box`.
    pub fn create_with<F>(configuration: Configuration, key_box: F) -> Self
    where
        F: Fn(&K) -> BoundingBox + Send + Sync + 'static,
    {
        RTreeMap {
            root: None,
            configuration,
            key_box: Arc::new(key_box),
        }
    }

    fn with_root(&self, root: Option<Arc<Node<K, V>>>) -> Self {
        RTreeMap {
            root,
            configuration: self.configuration.clone(),
            key_box: self.key_box.clone(),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Returns the box a key is indexed under.
    pub fn key_box(&self, key: &K) -> BoundingBox {
        (self.key_box)(key)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of entries. Runs in constant time.
    pub fn size(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.size())
    }

    /// Returns the minimum bounding box of all entries, or `None` if the map
    /// is empty.
    pub fn mbb(&self) -> Option<BoundingBox> {
        self.root.as_ref().map(|root| *root.mbb())
    }

    /// Returns the number of levels of the tree, 0 for an empty map.
    pub fn calculate_depth(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.depth())
    }

    /// Checks whether both maps are the same version, i.e. share the same
    /// root node.
    ///
    /// Empty maps have no root, so two empty maps are the same version only
    /// if one was derived from the other and they share the key-to-box
    /// function. Empty maps created separately never are.
    pub fn ptr_eq(&self, other: &RTreeMap<K, V>) -> bool {
        match (&self.root, &other.root) {
            (Some(this), Some(that)) => Arc::ptr_eq(this, that),
            (None, None) => Arc::ptr_eq(&self.key_box, &other.key_box),
            _ => false,
        }
    }

    pub fn keys(&self) -> Selection<'_, K, V, &K> {
        self.keys_matching(query::all())
    }

    pub fn values(&self) -> Selection<'_, K, V, &V> {
        self.values_matching(query::all())
    }

    pub fn entries(&self) -> Selection<'_, K, V, &Entry<K, V>> {
        self.entries_matching(query::all())
    }

    /// Selects the keys of all entries whose box satisfies `box_predicate`.
    ///
    /// The predicate is also used to prune subtrees and must therefore be
    /// upward-monotone, see [`query`].
    pub fn keys_matching<'a, P>(&'a self, box_predicate: P) -> Selection<'a, K, V, &'a K>
    where
        P: Fn(&BoundingBox) -> bool + 'a,
    {
        Selection::new(self.root.as_ref(), box_predicate, Entry::key)
    }

    /// Selects the values of all entries whose box satisfies
    /// `box_predicate`.
    pub fn values_matching<'a, P>(&'a self, box_predicate: P) -> Selection<'a, K, V, &'a V>
    where
        P: Fn(&BoundingBox) -> bool + 'a,
    {
        Selection::new(self.root.as_ref(), box_predicate, Entry::value)
    }

    /// Selects all entries whose box satisfies `box_predicate`.
    pub fn entries_matching<'a, P>(&'a self, box_predicate: P) -> Selection<'a, K, V, &'a Entry<K, V>>
    where
        P: Fn(&BoundingBox) -> bool + 'a,
    {
        Selection::new(self.root.as_ref(), box_predicate, |entry| entry)
    }

    /// Selects the entries whose box lies entirely within `query`.
    pub fn entries_within(&self, query: BoundingBox) -> Selection<'_, K, V, &Entry<K, V>> {
        let key_box = self.key_box.clone();
        self.entries_matching(query::touching(query))
            .filter(move |entry| query.contains(&key_box(entry.key())))
    }

    /// Returns an iterator over all entries.
    pub fn iter(&self) -> SelectionIter<'_, K, V, &Entry<K, V>> {
        self.entries().iter()
    }

    fn remove_with<F>(&self, mbb: &BoundingBox, remove_from: &F) -> RTreeResult<Self>
    where
        K: PartialEq,
        F: Fn(&Bucket<K, V>) -> Option<Option<Bucket<K, V>>>,
    {
        let root = match &self.root {
            Some(root) if root.mbb().contains(mbb) => root,
            _ => return Ok(self.clone()),
        };

        match root.remove(mbb, remove_from, &self.configuration) {
            Removal::Unchanged => Ok(self.clone()),
            Removal::Replaced {
                node,
                orphans,
                removed,
            } => self.reinsert(Some(collapse(node)), orphans, removed),
            Removal::Dissolved { orphans, removed } => self.reinsert(None, orphans, removed),
        }
    }

    fn reinsert(
        &self,
        root: Option<Arc<Node<K, V>>>,
        orphans: Vec<Arc<Bucket<K, V>>>,
        removed: usize,
    ) -> RTreeResult<Self>
    where
        K: PartialEq,
    {
        if !orphans.is_empty() {
            log::debug!(
                "Removed {} entries, reinserting {} orphaned buckets",
                removed,
                orphans.len()
            );
        }
        let root = orphans.into_iter().try_fold(root, |root, bucket| {
            insert(root.as_ref(), &Insertion::Bucket(bucket), &self.configuration).map(Some)
        })?;
        Ok(self.with_root(root))
    }
}

impl<K: PartialEq, V> RTreeMap<K, V> {
    /// Returns a map in which `key` maps to `value`, replacing any previous
    /// value of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RTreeError::InvalidSplit`] if the configured splitter
    /// produces an invalid partition.
    pub fn put(&self, key: K, value: V) -> RTreeResult<Self> {
        self.put_entry(Entry::new(key, value))
    }

    pub fn put_entry(&self, entry: Entry<K, V>) -> RTreeResult<Self> {
        let mbb = (self.key_box)(entry.key());
        let item = Insertion::Entry {
            mbb,
            entry: Arc::new(entry),
        };
        let root = insert(self.root.as_ref(), &item, &self.configuration)?;
        Ok(self.with_root(Some(root)))
    }

    pub fn put_all<I>(&self, entries: I) -> RTreeResult<Self>
    where
        I: IntoIterator<Item = Entry<K, V>>,
    {
        entries
            .into_iter()
            .try_fold(self.clone(), |map, entry| map.put_entry(entry))
    }

    /// Returns a map without the entry for `key`. Removing a missing key
    /// returns a map sharing the root of this one.
    pub fn remove(&self, key: &K) -> RTreeResult<Self> {
        let mbb = (self.key_box)(key);
        self.remove_with(&mbb, &|bucket: &Bucket<K, V>| {
            bucket.get(key).map(|_| bucket.remove_key(key))
        })
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_entry(key).map(Entry::value)
    }

    pub fn get_entry(&self, key: &K) -> Option<&Entry<K, V>> {
        let mbb = (self.key_box)(key);
        self.root.as_ref().and_then(|root| root.get(&mbb, key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get_entry(key).is_some()
    }
}

impl<K: PartialEq, V: PartialEq> RTreeMap<K, V> {
    /// Returns a map without the entry for `key`, but only if its value
    /// equals `value`.
    pub fn remove_exact(&self, key: &K, value: &V) -> RTreeResult<Self> {
        let mbb = (self.key_box)(key);
        self.remove_with(&mbb, &|bucket: &Bucket<K, V>| {
            if bucket.contains(key, value) {
                Some(bucket.remove_entry(key, value))
            } else {
                None
            }
        })
    }

    pub fn remove_entry(&self, entry: &Entry<K, V>) -> RTreeResult<Self> {
        self.remove_exact(entry.key(), entry.value())
    }

    pub fn remove_all<I>(&self, entries: I) -> RTreeResult<Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Entry<K, V>>,
    {
        entries
            .into_iter()
            .try_fold(self.clone(), |map, entry| map.remove_entry(entry.borrow()))
    }

    /// Checks whether the map holds exactly this entry.
    pub fn contains(&self, entry: &Entry<K, V>) -> bool {
        let mbb = (self.key_box)(entry.key());
        self.root
            .as_ref()
            .map_or(false, |root| root.contains(&mbb, entry.key(), entry.value()))
    }
}

impl<'a, K, V> IntoIterator for &'a RTreeMap<K, V> {
    type Item = &'a Entry<K, V>;
    type IntoIter = SelectionIter<'a, K, V, &'a Entry<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Debug, V: Debug> Debug for RTreeMap<K, V> {
    /// Prints the tree, one node per line with its bounding box, indented by
    /// depth.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{:?}", root),
            None => write!(f, "empty"),
        }
    }
}

/// Inserts `item` below `root`, growing the tree by one level when the root
/// splits.
fn insert<K: PartialEq, V>(
    root: Option<&Arc<Node<K, V>>>,
    item: &Insertion<K, V>,
    configuration: &Configuration,
) -> RTreeResult<Arc<Node<K, V>>> {
    let root = match root {
        Some(root) => root,
        None => {
            return Node::leaf(vec![item.to_bucket()]).ok_or_else(|| {
                RTreeError::InvalidSplit("could not start a leaf".to_string())
            })
        }
    };

    let mut nodes = root.put(item, configuration)?;
    let grown = if nodes.len() == 1 {
        nodes.pop()
    } else {
        log::debug!("Root split, tree grows to depth {}", root.depth() + 1);
        Node::branch(nodes.into_vec())
    };
    grown.ok_or_else(|| RTreeError::InvalidSplit("insertion produced no root".to_string()))
}

/// Replaces a branch root with a single child by that child until the root
/// has at least two children or is a leaf.
fn collapse<K, V>(mut root: Arc<Node<K, V>>) -> Arc<Node<K, V>> {
    loop {
        let child = match &*root {
            Node::Branch { children, .. } if children.len() == 1 => children[0].clone(),
            _ => return root,
        };
        root = child;
    }
}
