use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::node::{Link, Node, NodePtr};

type LinkPtr<K, V> = NonNull<Link<K, V>>;

/// Owner of the nodes shared by every map flavour.
///
/// Holds the structural operations of an unbalanced search tree. Balancing
/// is layered on top by the map's [`Balance`](crate::Balance) strategy.
pub struct RawTree<K, V> {
    pub(crate) root: Link<K, V>,
    pub(crate) num_nodes: usize,
    marker: PhantomData<Box<Node<K, V>>>,
}

// Safety: the tree owns its nodes exclusively, like a `Box`
unsafe impl<K: Send, V: Send> Send for RawTree<K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for RawTree<K, V> {}

pub(crate) enum Inserted<K, V> {
    /// The key was present; holds the previous value.
    Replaced(V),
    /// A new leaf was attached.
    Created(NodePtr<K, V>),
}

enum InsertPos<K, V> {
    Occupied(NodePtr<K, V>),
    Vacant(Link<K, V>, LinkPtr<K, V>),
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl<K, V> RawTree<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
            marker: PhantomData,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn len(&self) -> usize {
        self.num_nodes
    }

    pub(crate) fn first(&self) -> Link<K, V> {
        self.root.map(Node::leftmost)
    }

    pub(crate) fn last(&self) -> Link<K, V> {
        self.root.map(Node::rightmost)
    }

    pub(crate) fn clear(&mut self) {
        self.postorder(|node_ptr| unsafe {
            Node::destroy(node_ptr);
        });
        self.root = None;
        self.num_nodes = 0;
    }

    /// Points `node_ptr.left` at `child` and `child.parent` back at `node_ptr`.
    pub(crate) fn set_left(mut node_ptr: NodePtr<K, V>, child: Link<K, V>) {
        unsafe {
            node_ptr.as_mut().left = child;
            if let Some(mut child_ptr) = child {
                child_ptr.as_mut().parent = Some(node_ptr);
            }
        }
    }

    /// Points `node_ptr.right` at `child` and `child.parent` back at `node_ptr`.
    pub(crate) fn set_right(mut node_ptr: NodePtr<K, V>, child: Link<K, V>) {
        unsafe {
            node_ptr.as_mut().right = child;
            if let Some(mut child_ptr) = child {
                child_ptr.as_mut().parent = Some(node_ptr);
            }
        }
    }

    /// Puts `new` into the slot `old` occupies below `parent` (the root slot
    /// when `parent` is `None`). `old`'s own links are left untouched.
    pub(crate) fn replace_child(&mut self, parent: Link<K, V>, old: NodePtr<K, V>, new: Link<K, V>) {
        unsafe {
            if let Some(mut new_ptr) = new {
                new_ptr.as_mut().parent = parent;
            }
            match parent {
                None => self.root = new,
                Some(mut parent_ptr) => {
                    if parent_ptr.as_ref().left == Some(old) {
                        parent_ptr.as_mut().left = new;
                    } else {
                        debug_assert!(parent_ptr.as_ref().right == Some(old));
                        parent_ptr.as_mut().right = new;
                    }
                }
            }
        }
    }

    /// Detaches `node_ptr` from the tree without freeing it.
    ///
    /// Returns the lowest surviving node whose subtree changed shape, which
    /// is where rebalancing has to start.
    pub(crate) fn unlink(&mut self, node_ptr: NodePtr<K, V>) -> Link<K, V> {
        debug_assert!(self.num_nodes >= 1);
        self.num_nodes -= 1;
        unsafe {
            let parent = node_ptr.as_ref().parent;
            match (node_ptr.as_ref().left, node_ptr.as_ref().right) {
                (Some(left_ptr), Some(right_ptr)) => {
                    // Promote the in-order predecessor
                    let pred_ptr = Node::rightmost(left_ptr);
                    debug_assert!(pred_ptr.as_ref().right.is_none());
                    let mut rebalance_from = pred_ptr;
                    if pred_ptr != left_ptr {
                        if let Some(pred_parent_ptr) = pred_ptr.as_ref().parent {
                            Self::set_right(pred_parent_ptr, pred_ptr.as_ref().left);
                            rebalance_from = pred_parent_ptr;
                        }
                        Self::set_left(pred_ptr, Some(left_ptr));
                    }
                    Self::set_right(pred_ptr, Some(right_ptr));
                    self.replace_child(parent, node_ptr, Some(pred_ptr));
                    Some(rebalance_from)
                }
                (child, None) | (None, child) => {
                    self.replace_child(parent, node_ptr, child);
                    parent
                }
            }
        }
    }

    /// Recomputes every cached height bottom-up.
    pub(crate) fn recompute_heights(&mut self) {
        self.postorder(Node::adjust_height);
    }

    /// Computes the tree height from scratch and whether every node's
    /// subtrees differ in height by at most one. Cached heights are ignored.
    pub(crate) fn measure(&self) -> (usize, bool) {
        let mut heights: Vec<usize> = Vec::new();
        let mut balanced = true;
        self.postorder(|node_ptr| {
            let node = unsafe { node_ptr.as_ref() };
            // Subtree heights were pushed left first, then right
            let right_height = match node.right {
                Some(_) => heights.pop().unwrap_or(0),
                None => 0,
            };
            let left_height = match node.left {
                Some(_) => heights.pop().unwrap_or(0),
                None => 0,
            };
            if left_height.abs_diff(right_height) > 1 {
                balanced = false;
            }
            heights.push(1 + cmp::max(left_height, right_height));
        });
        (heights.pop().unwrap_or(0), balanced)
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn preorder<F: FnMut(NodePtr<K, V>)>(&self, f: F) {
        self.traverse(f, |_| {}, |_| {});
    }

    pub(crate) fn postorder<F: FnMut(NodePtr<K, V>)>(&self, f: F) {
        self.traverse(|_| {}, |_| {}, f);
    }

    fn traverse<Pre, In, Post>(&self, mut preorder: Pre, mut inorder: In, mut postorder: Post)
    where
        Pre: FnMut(NodePtr<K, V>),
        In: FnMut(NodePtr<K, V>),
        Post: FnMut(NodePtr<K, V>),
    {
        if let Some(mut node_ptr) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        preorder(node_ptr);
                        if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                            node_ptr = left_ptr;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(node_ptr);
                        if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                            node_ptr = right_ptr;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        // Post order traversal is used for node deletion,
                        // so make sure not to use node pointer after postorder call.
                        if let Some(parent_ptr) = unsafe { node_ptr.as_ref().parent } {
                            if Some(node_ptr) == unsafe { parent_ptr.as_ref().left } {
                                dir = Direction::FromLeft;
                            } else {
                                dir = Direction::FromRight;
                            }
                            postorder(node_ptr);
                            node_ptr = parent_ptr;
                        } else {
                            postorder(node_ptr);
                            break;
                        }
                    }
                }
            }
        }
    }
}

impl<K: Ord, V> RawTree<K, V> {
    pub(crate) fn find<Q>(&self, key: &Q) -> Link<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match key.cmp(node_ptr.as_ref().key.borrow()) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            }
        }
        current
    }

    fn find_insert_pos(&mut self, key: &K) -> InsertPos<K, V> {
        let mut parent: Link<K, V> = None;
        let mut link_ptr: LinkPtr<K, V> = unsafe { LinkPtr::new_unchecked(&mut self.root) };
        unsafe {
            while let Some(mut node_ptr) = *link_ptr.as_ref() {
                match key.cmp(&node_ptr.as_ref().key) {
                    Ordering::Equal => return InsertPos::Occupied(node_ptr),
                    Ordering::Less => {
                        link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().left);
                    }
                    Ordering::Greater => {
                        link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().right);
                    }
                }
                parent = Some(node_ptr);
            }
        }
        InsertPos::Vacant(parent, link_ptr)
    }

    /// Stores the pair, overwriting the value in place if the key exists.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Inserted<K, V> {
        match self.find_insert_pos(&key) {
            InsertPos::Occupied(mut node_ptr) => {
                let old_value = mem::replace(unsafe { &mut node_ptr.as_mut().value }, value);
                Inserted::Replaced(old_value)
            }
            InsertPos::Vacant(parent, mut link_ptr) => {
                let node_ptr = Node::create(parent, key, value);
                unsafe {
                    *link_ptr.as_mut() = Some(node_ptr);
                }
                self.num_nodes += 1;
                Inserted::Created(node_ptr)
            }
        }
    }

    /// Unlinks and frees the node holding `key`.
    ///
    /// Returns the removed pair and the node rebalancing starts from.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<((K, V), Link<K, V>)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node_ptr = self.find(key)?;
        let rebalance_from = self.unlink(node_ptr);
        let entry = unsafe { Node::destroy(node_ptr) };
        Some((entry, rebalance_from))
    }

    /// Unlinks and frees the smallest node.
    pub(crate) fn pop_first(&mut self) -> Option<((K, V), Link<K, V>)> {
        let node_ptr = self.first()?;
        let rebalance_from = self.unlink(node_ptr);
        let entry = unsafe { Node::destroy(node_ptr) };
        Some((entry, rebalance_from))
    }

    /// Panics unless order, link symmetry and node count hold.
    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn check_consistency(&self) {
        unsafe {
            // Check root link
            if let Some(root_node_ptr) = self.root {
                assert!(root_node_ptr.as_ref().parent.is_none());
            }

            // Check tree nodes
            let mut num_nodes = 0;
            self.preorder(|node_ptr| {
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    assert!(left_ptr.as_ref().parent == Some(node_ptr));
                    assert!(left_ptr.as_ref().key < node_ptr.as_ref().key);
                }
                if let Some(right_ptr) = node_ptr.as_ref().right {
                    assert!(right_ptr.as_ref().parent == Some(node_ptr));
                    assert!(right_ptr.as_ref().key > node_ptr.as_ref().key);
                }
                num_nodes += 1;
            });
            assert_eq!(num_nodes, self.num_nodes);

            // Check global order, not just parent-child pairs
            let mut previous: Link<K, V> = None;
            let mut current = self.first();
            while let Some(node_ptr) = current {
                if let Some(previous_ptr) = previous {
                    assert!(previous_ptr.as_ref().key < node_ptr.as_ref().key);
                }
                previous = current;
                current = Node::successor(node_ptr);
            }
        }
    }
}

impl<K: Clone, V: Clone> Clone for RawTree<K, V> {
    /// Deep copy that keeps the exact shape and cached heights.
    fn clone(&self) -> Self {
        let mut tree = Self::new();
        let Some(root_ptr) = self.root else {
            return tree;
        };
        let mut stack: Vec<(NodePtr<K, V>, Link<K, V>, Side)> = vec![(root_ptr, None, Side::Left)];
        while let Some((src_ptr, dst_parent, side)) = stack.pop() {
            let src = unsafe { src_ptr.as_ref() };
            let mut dst_ptr = Node::create(dst_parent, src.key.clone(), src.value.clone());
            unsafe { dst_ptr.as_mut().height = src.height };
            match (dst_parent, side) {
                (None, _) => tree.root = Some(dst_ptr),
                (Some(parent_ptr), Side::Left) => Self::set_left(parent_ptr, Some(dst_ptr)),
                (Some(parent_ptr), Side::Right) => Self::set_right(parent_ptr, Some(dst_ptr)),
            }
            tree.num_nodes += 1;
            if let Some(right_ptr) = src.right {
                stack.push((right_ptr, Some(dst_ptr), Side::Right));
            }
            if let Some(left_ptr) = src.left {
                stack.push((left_ptr, Some(dst_ptr), Side::Left));
            }
        }
        tree
    }
}

impl<K, V> Drop for RawTree<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}
