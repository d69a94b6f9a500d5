use std::cmp;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

pub type NodePtr<K, V> = NonNull<Node<K, V>>;
pub type Link<K, V> = Option<NodePtr<K, V>>;

pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
    pub(crate) parent: Link<K, V>,
    /// Leaf nodes have height 1. Only maintained by the AVL map.
    pub(crate) height: usize,
}

impl<K, V> Node<K, V> {
    pub(crate) fn create(parent: Link<K, V>, key: K, value: V) -> NodePtr<K, V> {
        let boxed = Box::new(Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 1,
        });
        // Safety: `Box::into_raw` never returns null
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    /// Frees the node and hands back its key and value.
    ///
    /// # Safety
    ///
    /// `node_ptr` must come from `Node::create` and must not be used afterwards.
    pub(crate) unsafe fn destroy(node_ptr: NodePtr<K, V>) -> (K, V) {
        let boxed = Box::from_raw(node_ptr.as_ptr());
        (boxed.key, boxed.value)
    }

    /// Returns the leftmost node of the subtree rooted at `node_ptr`.
    pub(crate) fn leftmost(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        while let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
            node_ptr = left_ptr;
        }
        node_ptr
    }

    /// Returns the rightmost node of the subtree rooted at `node_ptr`.
    pub(crate) fn rightmost(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        while let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
            node_ptr = right_ptr;
        }
        node_ptr
    }

    /// Returns the in-order successor of `node_ptr`, if any.
    pub(crate) fn successor(node_ptr: NodePtr<K, V>) -> Link<K, V> {
        unsafe {
            if let Some(right_ptr) = node_ptr.as_ref().right {
                return Some(Self::leftmost(right_ptr));
            }
            let mut current = node_ptr;
            let mut parent = current.as_ref().parent;
            while let Some(parent_ptr) = parent {
                if parent_ptr.as_ref().right != Some(current) {
                    break;
                }
                current = parent_ptr;
                parent = parent_ptr.as_ref().parent;
            }
            parent
        }
    }

    /// Cached height of an optional subtree, 0 if absent.
    pub(crate) fn height_of(link: Link<K, V>) -> usize {
        match link {
            None => 0,
            Some(node_ptr) => unsafe { node_ptr.as_ref().height },
        }
    }

    pub(crate) fn left_height(node_ptr: NodePtr<K, V>) -> usize {
        Self::height_of(unsafe { node_ptr.as_ref().left })
    }

    pub(crate) fn right_height(node_ptr: NodePtr<K, V>) -> usize {
        Self::height_of(unsafe { node_ptr.as_ref().right })
    }

    /// Recomputes the cached height of a single node from its children.
    pub(crate) fn adjust_height(mut node_ptr: NodePtr<K, V>) {
        let height = 1 + cmp::max(Self::left_height(node_ptr), Self::right_height(node_ptr));
        unsafe { node_ptr.as_mut().height = height };
    }
}

/// A read-only view of a single tree node.
///
/// Obtained through `root()` on a map; meant for diagnostics such as tree
/// printers that need the link structure rather than the ordered entries.
pub struct NodeRef<'a, K, V> {
    node_ptr: NodePtr<K, V>,
    marker: PhantomData<&'a Node<K, V>>,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) fn new(node_ptr: NodePtr<K, V>) -> Self {
        Self {
            node_ptr,
            marker: PhantomData,
        }
    }

    fn node(&self) -> &'a Node<K, V> {
        // Safety: the node lives as long as the borrow of its map
        unsafe { &*self.node_ptr.as_ptr() }
    }

    pub fn key(&self) -> &'a K {
        &self.node().key
    }

    pub fn value(&self) -> &'a V {
        &self.node().value
    }

    /// Returns the cached subtree height (1 for a leaf).
    ///
    /// Heights are only maintained by [`AvlTreeMap`](crate::AvlTreeMap); for
    /// a [`BstMap`](crate::BstMap) the value carries no meaning.
    pub fn height(&self) -> usize {
        self.node().height
    }

    pub fn left(&self) -> Option<Self> {
        self.node().left.map(Self::new)
    }

    pub fn right(&self) -> Option<Self> {
        self.node().right.map(Self::new)
    }

    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(Self::new)
    }
}

impl<'a, K, V> Clone for NodeRef<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for NodeRef<'a, K, V> {}

impl<'a, K, V> PartialEq for NodeRef<'a, K, V> {
    /// Two views are equal when they refer to the same node.
    fn eq(&self, other: &Self) -> bool {
        self.node_ptr == other.node_ptr
    }
}

impl<'a, K, V> Eq for NodeRef<'a, K, V> {}

// Safety: a view only hands out shared references into its map
unsafe impl<'a, K: Sync, V: Sync> Send for NodeRef<'a, K, V> {}
unsafe impl<'a, K: Sync, V: Sync> Sync for NodeRef<'a, K, V> {}

impl<'a, K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}
