use super::Named;
use std::collections::BTreeMap;
use std::ops::Bound;

/// A collection of items ordered by name.
///
/// Items sharing a name are kept adjacent, in insertion order.
/// Lookups return the first item with a given name, and [`NameMap::successor`] walks the collection in order,
/// which is how same-named items are enumerated one at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct NameMap<T> {
    entries: BTreeMap<String, Vec<T>>,
    len: usize,
}
impl<T: Named> NameMap<T> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            len: 0,
        }
    }

    /// Inserts an item after any existing items of the same name.
    pub fn insert(&mut self, item: T) -> &mut T {
        self.len += 1;

        let group = self.entries.entry(item.name().to_string()).or_default();
        group.push(item);

        let last = group.len() - 1;
        &mut group[last]
    }

    /// Returns the first item with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&T> {
        self.entries.get(name).and_then(|group| group.first())
    }

    /// Returns true if at least one item has the given name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns every item with the given name, in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[T] {
        self.entries.get(name).map_or(&[], Vec::as_slice)
    }

    /// Returns the item following `item` in name order.
    ///
    /// `item` must be a reference into this map; any other reference yields `None`.
    #[must_use]
    pub fn successor(&self, item: &T) -> Option<&T> {
        let name = item.name();
        let group = self.entries.get(name)?;
        let index = group.iter().position(|other| std::ptr::eq(other, item))?;

        if let Some(next) = group.get(index + 1) {
            return Some(next);
        }

        self.entries
            .range::<str, _>((Bound::Excluded(name), Bound::Unbounded))
            .find_map(|(_, group)| group.first())
    }

    /// Returns the first item in name order.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.entries.values().find_map(|group| group.first())
    }

    /// Iterates over all items in name order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values().flatten()
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if len == 0
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes all items.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
    }
}
impl<T: Named> Default for NameMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<'a, T: Named> IntoIterator for &'a NameMap<T> {
    type Item = &'a T;
    type IntoIter = std::iter::Flatten<std::collections::btree_map::Values<'a, String, Vec<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values().flatten()
    }
}
