use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;

use crate::iter::{IntoIter, Iter, IterMut};
use crate::node::{Link, NodePtr, NodeRef};
use crate::raw::{Inserted, RawTree};

mod private {
    pub trait Sealed {}
}

/// Strategy that keeps a [`TreeMap`] in shape after structural changes.
///
/// Implemented by [`Avl`](crate::Avl) and [`Unbalanced`](crate::Unbalanced);
/// the trait is sealed.
pub trait Balance: private::Sealed {
    /// Called after a new leaf was attached.
    #[doc(hidden)]
    fn inserted<K, V>(tree: &mut RawTree<K, V>, node_ptr: NodePtr<K, V>);

    /// Called after a node was unlinked; `rebalance_from` is the lowest
    /// surviving node whose subtree changed.
    #[doc(hidden)]
    fn removed<K, V>(tree: &mut RawTree<K, V>, rebalance_from: Link<K, V>);

    /// Called after the tree was reshaped by rotations alone.
    #[doc(hidden)]
    fn reshaped<K, V>(tree: &mut RawTree<K, V>);

    #[doc(hidden)]
    #[cfg(any(test, feature = "consistency_check"))]
    fn check_consistency<K, V>(tree: &RawTree<K, V>);
}

impl private::Sealed for crate::Avl {}
impl private::Sealed for crate::Unbalanced {}

/// An ordered map on a binary search tree with parent links.
///
/// The balancing strategy `B` decides what happens after each structural
/// change. Use the [`AvlTreeMap`](crate::AvlTreeMap) and
/// [`BstMap`](crate::BstMap) aliases rather than naming `B` directly.
///
/// ```
/// use rotree::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(2, "two");
/// map.insert(1, "one");
/// map.insert(3, "three");
/// assert_eq!(map.get(&1), Some(&"one"));
/// assert_eq!(map.root().map(|root| *root.key()), Some(2));
/// map.remove(&1);
/// assert!(map.find(&1) == map.end());
/// ```
pub struct TreeMap<K, V, B> {
    pub(crate) tree: RawTree<K, V>,
    marker: PhantomData<B>,
}

impl<K, V, B: Balance> TreeMap<K, V, B> {
    /// Creates an empty map.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            tree: RawTree::new(),
            marker: PhantomData,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.tree.first())
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.tree.first())
    }

    /// Returns an iterator positioned at the smallest entry.
    pub fn begin(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    /// Returns the past-the-end iterator.
    pub fn end(&self) -> Iter<'_, K, V> {
        Iter::new(None)
    }

    /// Returns the root node for diagnostic inspection of the tree shape.
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.tree.root.map(NodeRef::new)
    }

    /// Returns the first key-value pair in the map.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.iter().peek()
    }

    /// Returns the last key-value pair in the map.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        Iter::new(self.tree.last()).peek()
    }

    /// Returns whether no node's subtree heights differ by more than one.
    ///
    /// Heights are recomputed from the links, so this checks the actual
    /// shape rather than any cached state.
    pub fn is_balanced(&self) -> bool {
        self.tree.measure().1
    }
}

impl<K: Ord, V, B: Balance> TreeMap<K, V, B> {
    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .find(key)
            .map(|node_ptr| &mut unsafe { &mut *node_ptr.as_ptr() }.value)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).peek()
    }

    /// Returns true if the map contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).is_some()
    }

    /// Returns an iterator positioned at `key`, or [`end`](Self::end) if the
    /// key is absent.
    pub fn find<Q>(&self, key: &Q) -> Iter<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Iter::new(self.tree.find(key))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key was present its value is overwritten in place and the old
    /// value is returned; the tree shape does not change.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.tree.insert(key, value) {
            Inserted::Replaced(old_value) => Some(old_value),
            Inserted::Created(node_ptr) => {
                B::inserted(&mut self.tree, node_ptr);
                None
            }
        }
    }

    /// Removes a key from the map.
    /// Returns the value at the key if the key was previously in the map.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map.
    /// Returns the stored key and value if the key was previously in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (entry, rebalance_from) = self.tree.remove(key)?;
        B::removed(&mut self.tree, rebalance_from);
        debug_assert!(self.tree.find(key).is_none());
        Some(entry)
    }

    /// Returns true if both maps hold exactly the same keys, ignoring values.
    pub fn same_keys<W, C: Balance>(&self, other: &TreeMap<K, W, C>) -> bool {
        self.tree.same_keys(&other.tree)
    }

    /// Reshapes `other` with rotations until its link structure matches
    /// this map's. Every key keeps the value `other` stored for it.
    ///
    /// Does nothing and returns `false` if the key sets differ.
    ///
    /// ```
    /// use rotree::BstMap;
    /// let shape: BstMap<_, _> = [(2, ()), (1, ()), (3, ())].into_iter().collect();
    /// let mut chain: BstMap<_, _> = [(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
    /// assert!(shape.transform(&mut chain));
    /// assert_eq!(chain.root().map(|root| *root.value()), Some('b'));
    /// ```
    pub fn transform<W>(&self, other: &mut TreeMap<K, W, B>) -> bool {
        let transformed = self.tree.transform(&mut other.tree);
        if transformed {
            B::reshaped(&mut other.tree);
        }
        transformed
    }

    /// Panics if any tree invariant is violated.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency();
        B::check_consistency(&self.tree);
    }
}

impl<K, V, B: Balance> Default for TreeMap<K, V, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, B> Clone for TreeMap<K, V, B> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            marker: PhantomData,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance> fmt::Debug for TreeMap<K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, B: Balance> PartialEq for TreeMap<K, V, B> {
    /// Maps are equal when they hold equal entries, whatever their shape.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, B: Balance> Eq for TreeMap<K, V, B> {}

impl<K: Ord, V, B: Balance> FromIterator<(K, V)> for TreeMap<K, V, B> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, B: Balance> Extend<(K, V)> for TreeMap<K, V, B> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, B: Balance> IntoIterator for &'a TreeMap<K, V, B> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, B: Balance> IntoIterator for &'a mut TreeMap<K, V, B> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K: Ord, V, B> IntoIterator for TreeMap<K, V, B> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.tree)
    }
}
