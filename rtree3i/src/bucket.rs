//! Entries that share one exact bounding box.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::bounding_box::BoundingBox;
use crate::entry::Entry;

/// Entry storage of a bucket. Box collisions are rare, so one inline slot
/// covers the common case without a heap allocation.
type BucketEntries<K, V> = SmallVec<[Arc<Entry<K, V>>; 1]>;

/// A non-empty list of entries whose keys all map to the same box.
///
/// Buckets are immutable: every modifying operation returns a new bucket
/// that shares the untouched entries with this one.
pub(crate) struct Bucket<K, V> {
    mbb: BoundingBox,
    entries: BucketEntries<K, V>,
}

impl<K, V> Clone for Bucket<K, V> {
    fn clone(&self) -> Self {
        Bucket {
            mbb: self.mbb,
            entries: self.entries.clone(),
        }
    }
}

impl<K: Debug, V: Debug> Debug for Bucket<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket")
            .field("box", &self.mbb)
            .field("entries", &self.entries)
            .finish()
    }
}

impl<K, V> Bucket<K, V> {
    /// Creates a bucket holding a single entry.
    pub fn of(mbb: BoundingBox, entry: Arc<Entry<K, V>>) -> Self {
        let mut entries = BucketEntries::new();
        entries.push(entry);
        Bucket { mbb, entries }
    }

    pub fn mbb(&self) -> &BoundingBox {
        &self.mbb
    }

    pub fn entries(&self) -> &[Arc<Entry<K, V>>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn without<F>(&self, matches: F) -> Option<Bucket<K, V>>
    where
        F: Fn(&Entry<K, V>) -> bool,
    {
        let entries: BucketEntries<K, V> = self
            .entries
            .iter()
            .filter(|entry| !matches(entry))
            .cloned()
            .collect();
        if entries.is_empty() {
            None
        } else {
            Some(Bucket {
                mbb: self.mbb,
                entries,
            })
        }
    }
}

impl<K: PartialEq, V> Bucket<K, V> {
    /// Returns a bucket where `entry` replaces the entry with the same key,
    /// or is appended if no such entry exists.
    pub fn put(&self, entry: Arc<Entry<K, V>>) -> Bucket<K, V> {
        let mut entries = self.entries.clone();
        match entries.iter().position(|e| e.key() == entry.key()) {
            Some(index) => entries[index] = entry,
            None => entries.push(entry),
        }
        Bucket {
            mbb: self.mbb,
            entries,
        }
    }

    /// Returns a bucket holding the entries of both buckets. Entries of
    /// `other` win on key collisions.
    pub fn merge(&self, other: &Bucket<K, V>) -> Bucket<K, V> {
        other
            .entries
            .iter()
            .fold(self.clone(), |bucket, entry| bucket.put(entry.clone()))
    }

    /// Returns the bucket without the entry for `key`, or `None` if that
    /// entry was the last one. An absent key yields an identical bucket.
    pub fn remove_key(&self, key: &K) -> Option<Bucket<K, V>> {
        self.without(|entry| entry.key() == key)
    }

    pub fn get(&self, key: &K) -> Option<&Entry<K, V>> {
        self.entries
            .iter()
            .find(|entry| entry.key() == key)
            .map(|entry| &**entry)
    }
}

impl<K: PartialEq, V: PartialEq> Bucket<K, V> {
    /// Returns the bucket without the exact entry, or `None` if that entry
    /// was the last one. A mismatched value yields an identical bucket.
    pub fn remove_entry(&self, key: &K, value: &V) -> Option<Bucket<K, V>> {
        self.without(|entry| entry.matches(key, value))
    }

    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.entries.iter().any(|entry| entry.matches(key, value))
    }
}
