/// A key-value pair stored in an [`RTreeMap`](crate::RTreeMap).
///
/// Two entries are equal when both their keys and their values are equal.
/// Hosts that only need keys can use `()` as the value type.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry with the specified key and value.
    pub fn new(key: K, value: V) -> Self {
        Entry { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry, returning its key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    /// Checks whether this entry has the given key and value.
    pub(crate) fn matches(&self, key: &K, value: &V) -> bool
    where
        K: PartialEq,
        V: PartialEq,
    {
        self.key == *key && self.value == *value
    }
}

impl<K, V> From<(K, V)> for Entry<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Entry::new(key, value)
    }
}
