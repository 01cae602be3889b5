//! Lazy queries over the entries of a tree.

use std::ops::ControlFlow;
use std::rc::Rc;
use std::sync::Arc;

use crate::bounding_box::BoundingBox;
use crate::bucket::Bucket;
use crate::entry::Entry;
use crate::node::Node;

type BoxPredicate<'a> = Rc<dyn Fn(&BoundingBox) -> bool + 'a>;
type ItemPredicate<'a, T> = Rc<dyn Fn(&T) -> bool + 'a>;

/// A lazy view over the entries of one [`RTreeMap`](crate::RTreeMap)
/// snapshot, mapped to keys, values or whole entries.
///
/// Nothing is computed until a terminal operation runs. Each terminal
/// operation walks the tree once and skips every subtree whose bounding box
/// fails the box predicate the selection was created with. That predicate
/// must be upward-monotone: if it accepts a box it must accept every box
/// containing it, otherwise matching entries may be missed.
///
/// Terminal operations borrow the selection, so it can be evaluated any
/// number of times.
///
/// # Examples
///
/// ```rust
/// use rtree3i::{query, BoundingBox, RTreeMap};
///
/// let map = RTreeMap::create(Default::default())
///     .put(BoundingBox::point(0, 0, 0), "origin").unwrap()
///     .put(BoundingBox::point(9, 9, 9), "far").unwrap();
///
/// let near = map.values_matching(query::touching(BoundingBox::create(0, 0, 0, 1, 1, 1).unwrap()));
/// assert_eq!(near.collect::<Vec<_>>(), vec![&"origin"]);
/// assert_eq!(map.values().filter(|v| v.len() > 3).count(), 1);
/// ```
pub struct Selection<'a, K, V, T> {
    root: Option<&'a Arc<Node<K, V>>>,
    box_predicate: BoxPredicate<'a>,
    mapper: fn(&'a Entry<K, V>) -> T,
    filter: Option<ItemPredicate<'a, T>>,
}

impl<'a, K, V, T> Clone for Selection<'a, K, V, T> {
    fn clone(&self) -> Self {
        Selection {
            root: self.root,
            box_predicate: self.box_predicate.clone(),
            mapper: self.mapper,
            filter: self.filter.clone(),
        }
    }
}

impl<'a, K, V, T: 'a> Selection<'a, K, V, T> {
    /// Creates a selection over the tree under `root`. A missing root gives
    /// the empty selection.
    pub(crate) fn new<P>(root: Option<&'a Arc<Node<K, V>>>, box_predicate: P, mapper: fn(&'a Entry<K, V>) -> T) -> Self
    where
        P: Fn(&BoundingBox) -> bool + 'a,
    {
        Selection {
            root,
            box_predicate: Rc::new(box_predicate),
            mapper,
            filter: None,
        }
    }

    /// Returns a selection that additionally requires `predicate` to hold.
    ///
    /// Filters compose: every filter of the chain must accept an item.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + 'a,
    {
        let filter: ItemPredicate<'a, T> = match self.filter {
            Some(previous) => Rc::new(move |item: &T| previous(item) && predicate(item)),
            None => Rc::new(predicate),
        };
        Selection {
            root: self.root,
            box_predicate: self.box_predicate,
            mapper: self.mapper,
            filter: Some(filter),
        }
    }

    /// Walks the selected items until `visit` breaks.
    fn walk<B, F>(&self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(T) -> ControlFlow<B>,
    {
        let root = match self.root {
            Some(root) => root,
            None => return ControlFlow::Continue(()),
        };
        let mapper = self.mapper;
        let filter = self.filter.as_deref();
        visit_node(root, &*self.box_predicate, &mut |entry| {
            let item = mapper(entry);
            match filter {
                Some(accepts) if !accepts(&item) => ControlFlow::Continue(()),
                _ => visit(item),
            }
        })
    }

    pub fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(T),
    {
        let _ = self.walk::<(), _>(|item| {
            action(item);
            ControlFlow::Continue(())
        });
    }

    /// Checks whether any selected item satisfies `predicate`. Stops at the
    /// first match.
    pub fn any_match<P>(&self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        self.walk(|item| {
            if predicate(&item) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break()
    }

    /// Checks whether every selected item satisfies `predicate`. True for an
    /// empty selection.
    pub fn all_match<P>(&self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        self.walk(|item| {
            if predicate(&item) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        })
        .is_continue()
    }

    /// Checks that no selected item satisfies `predicate`. True for an
    /// empty selection.
    pub fn none_match<P>(&self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        !self.any_match(predicate)
    }

    pub fn count(&self) -> usize {
        let mut count = 0;
        self.for_each(|_| count += 1);
        count
    }

    pub fn is_empty(&self) -> bool {
        !self.any_match(|_| true)
    }

    pub fn is_not_empty(&self) -> bool {
        self.any_match(|_| true)
    }

    /// Combines the selected items with `op`, starting from `identity`.
    pub fn reduce<F>(&self, identity: T, op: F) -> T
    where
        F: FnMut(T, T) -> T,
    {
        self.fold(identity, op)
    }

    /// Folds the selected items into an accumulator of any type.
    pub fn fold<R, F>(&self, init: R, op: F) -> R
    where
        F: FnMut(R, T) -> R,
    {
        self.iter().fold(init, op)
    }

    /// Collects the selected items into any [`FromIterator`] collection.
    pub fn collect<C>(&self) -> C
    where
        C: FromIterator<T>,
    {
        self.iter().collect()
    }

    /// Collects the selected items into a container built by `supplier`.
    pub fn collect_with<R, S, F>(&self, supplier: S, mut accumulator: F) -> R
    where
        S: FnOnce() -> R,
        F: FnMut(&mut R, T),
    {
        let mut container = supplier();
        self.for_each(|item| accumulator(&mut container, item));
        container
    }

    /// Returns a lazy iterator over the selected items, visiting them in
    /// the same order as the terminal operations.
    pub fn iter(&self) -> SelectionIter<'a, K, V, T> {
        SelectionIter {
            box_predicate: self.box_predicate.clone(),
            mapper: self.mapper,
            filter: self.filter.clone(),
            nodes: self
                .root
                .map(|root| vec![std::slice::from_ref(root).iter()])
                .unwrap_or_default(),
            buckets: (&[]).iter(),
            entries: (&[]).iter(),
        }
    }
}

impl<'a, K, V, T: 'a> IntoIterator for Selection<'a, K, V, T> {
    type Item = T;
    type IntoIter = SelectionIter<'a, K, V, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn visit_node<'a, K, V, B>(
    node: &'a Arc<Node<K, V>>,
    box_predicate: &dyn Fn(&BoundingBox) -> bool,
    visit: &mut dyn FnMut(&'a Entry<K, V>) -> ControlFlow<B>,
) -> ControlFlow<B> {
    if !box_predicate(node.mbb()) {
        return ControlFlow::Continue(());
    }
    match &**node {
        Node::Leaf { buckets, .. } => {
            for bucket in buckets.iter().filter(|bucket| box_predicate(bucket.mbb())) {
                for entry in bucket.entries() {
                    visit(entry)?;
                }
            }
        }
        Node::Branch { children, .. } => {
            for child in children {
                visit_node(child, box_predicate, visit)?;
            }
        }
    }
    ControlFlow::Continue(())
}

/// Iterator over the items of a [`Selection`].
///
/// Walks the tree depth first with an explicit stack, pruning subtrees the
/// same way the terminal operations do.
pub struct SelectionIter<'a, K, V, T> {
    box_predicate: BoxPredicate<'a>,
    mapper: fn(&'a Entry<K, V>) -> T,
    filter: Option<ItemPredicate<'a, T>>,
    nodes: Vec<std::slice::Iter<'a, Arc<Node<K, V>>>>,
    buckets: std::slice::Iter<'a, Arc<Bucket<K, V>>>,
    entries: std::slice::Iter<'a, Arc<Entry<K, V>>>,
}

impl<'a, K, V, T> Iterator for SelectionIter<'a, K, V, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(entry) = self.entries.next() {
                let item = (self.mapper)(entry);
                match &self.filter {
                    Some(accepts) if !accepts(&item) => continue,
                    _ => return Some(item),
                }
            }

            if let Some(bucket) = self.buckets.next() {
                if (self.box_predicate)(bucket.mbb()) {
                    self.entries = bucket.entries().iter();
                }
                continue;
            }

            let next = self.nodes.last_mut()?.next();
            match next {
                None => {
                    self.nodes.pop();
                }
                Some(node) if (self.box_predicate)(node.mbb()) => match &**node {
                    Node::Leaf { buckets, .. } => self.buckets = buckets.iter(),
                    Node::Branch { children, .. } => self.nodes.push(children.iter()),
                },
                Some(_) => {}
            }
        }
    }
}
