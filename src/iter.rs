use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::{Link, Node};
use crate::raw::RawTree;

/// An ascending iterator over the entries of a map.
///
/// Also serves as a position: [`find`](crate::TreeMap::find) returns an
/// iterator starting at the found entry, and two iterators compare equal
/// when they point at the same entry. An exhausted iterator equals
/// [`end`](crate::TreeMap::end).
pub struct Iter<'a, K, V> {
    current: Link<K, V>,
    marker: PhantomData<&'a Node<K, V>>,
}

/// A mutable ascending iterator over the entries of a map.
pub struct IterMut<'a, K, V> {
    current: Link<K, V>,
    marker: PhantomData<&'a mut Node<K, V>>,
}

/// An owning iterator over the entries of a map, in ascending order.
pub struct IntoIter<K, V> {
    tree: RawTree<K, V>,
}

// Safety: iterators hand out the same references a `&Map` / `&mut Map` would
unsafe impl<'a, K: Sync, V: Sync> Send for Iter<'a, K, V> {}
unsafe impl<'a, K: Sync, V: Sync> Sync for Iter<'a, K, V> {}
unsafe impl<'a, K: Sync, V: Send> Send for IterMut<'a, K, V> {}
unsafe impl<'a, K: Sync, V: Sync> Sync for IterMut<'a, K, V> {}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(current: Link<K, V>) -> Self {
        Self {
            current,
            marker: PhantomData,
        }
    }

    /// Returns the entry the iterator points at without advancing.
    pub fn peek(&self) -> Option<(&'a K, &'a V)> {
        self.current.map(|node_ptr| {
            let node = unsafe { &*node_ptr.as_ptr() };
            (&node.key, &node.value)
        })
    }

    /// Returns true once the iterator is past the last entry.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.current?;
        self.current = Node::successor(node_ptr);
        let node = unsafe { &*node_ptr.as_ptr() };
        Some((&node.key, &node.value))
    }
}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self::new(self.current)
    }
}

impl<'a, K, V> PartialEq for Iter<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}

impl<'a, K, V> Eq for Iter<'a, K, V> {}

impl<'a, K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(current: Link<K, V>) -> Self {
        Self {
            current,
            marker: PhantomData,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.current?;
        self.current = Node::successor(node_ptr);
        // Safety: every node is visited once, so the value borrows are disjoint
        let node = unsafe { &mut *node_ptr.as_ptr() };
        Some((&node.key, &mut node.value))
    }
}

impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(tree: RawTree<K, V>) -> Self {
        Self { tree }
    }
}

impl<K: Ord, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        // The remaining nodes are freed on drop, so balance is irrelevant here
        self.tree.pop_first().map(|(entry, _)| entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<K: Ord, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K: Ord, V> FusedIterator for IntoIter<K, V> {}
