//! Rotation primitives and rotation-only shape transformation.

use std::cmp::Ordering;

use log::{debug, trace};

use crate::iter::Iter;
use crate::node::NodePtr;
use crate::raw::RawTree;

impl<K, V> RawTree<K, V> {
    /// Lifts the right child of `node_ptr` into its place.
    ///
    /// ```text
    ///     n            c
    ///    / \          / \
    ///   a   c   ->   n   e
    ///      / \      / \
    ///     d   e    a   d
    /// ```
    ///
    /// No-op without a right child. Cached heights are not touched.
    pub(crate) fn rotate_left(&mut self, node_ptr: NodePtr<K, V>) {
        unsafe {
            if let Some(right_ptr) = node_ptr.as_ref().right {
                let parent = node_ptr.as_ref().parent;
                Self::set_right(node_ptr, right_ptr.as_ref().left);
                self.replace_child(parent, node_ptr, Some(right_ptr));
                Self::set_left(right_ptr, Some(node_ptr));
            }
        }
    }

    /// Lifts the left child of `node_ptr` into its place.
    ///
    /// No-op without a left child. Cached heights are not touched.
    pub(crate) fn rotate_right(&mut self, node_ptr: NodePtr<K, V>) {
        unsafe {
            if let Some(left_ptr) = node_ptr.as_ref().left {
                let parent = node_ptr.as_ref().parent;
                Self::set_left(node_ptr, left_ptr.as_ref().right);
                self.replace_child(parent, node_ptr, Some(left_ptr));
                Self::set_right(left_ptr, Some(node_ptr));
            }
        }
    }

    /// Rotates the whole tree into a chain of right children.
    pub(crate) fn flatten(&mut self) {
        let mut current = self.root;
        while let Some(mut node_ptr) = current {
            while let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                self.rotate_right(node_ptr);
                node_ptr = left_ptr;
            }
            current = unsafe { node_ptr.as_ref().right };
        }
    }
}

impl<K: Ord, V> RawTree<K, V> {
    /// Returns whether both trees hold the same keys. Values are ignored.
    pub(crate) fn same_keys<W>(&self, other: &RawTree<K, W>) -> bool {
        self.num_nodes == other.num_nodes
            && Iter::new(self.first())
                .map(|(key, _)| key)
                .eq(Iter::new(other.first()).map(|(key, _)| key))
    }

    /// Rotates `other` until it has the shape of `self`.
    ///
    /// Returns `false` without touching `other` if the key sets differ.
    pub(crate) fn transform<W>(&self, other: &mut RawTree<K, W>) -> bool {
        if !self.same_keys(other) {
            debug!("transform skipped, key sets differ");
            return false;
        }
        let (Some(target_root), Some(_)) = (self.root, other.root) else {
            return true;
        };

        other.flatten();
        trace!("transform: flattened {} nodes", other.num_nodes);

        // Every position starts out as a monotone chain, so matching its key
        // only ever rotates in one direction. The first pair aligns the root.
        let mut stack = Vec::new();
        if let Some(other_root) = other.root {
            stack.push((other_root, target_root));
        }
        let mut rotations = 0usize;
        while let Some((mut node_ptr, target_ptr)) = stack.pop() {
            let target = unsafe { target_ptr.as_ref() };
            loop {
                let ordering = unsafe { node_ptr.as_ref().key.cmp(&target.key) };
                let lifted = match ordering {
                    Ordering::Equal => break,
                    Ordering::Less => unsafe { node_ptr.as_ref().right },
                    Ordering::Greater => unsafe { node_ptr.as_ref().left },
                };
                let Some(lifted_ptr) = lifted else {
                    debug_assert!(false, "subtree key sets diverged");
                    break;
                };
                if ordering == Ordering::Less {
                    other.rotate_left(node_ptr);
                } else {
                    other.rotate_right(node_ptr);
                }
                node_ptr = lifted_ptr;
                rotations += 1;
            }

            let node = unsafe { node_ptr.as_ref() };
            if let (Some(left_ptr), Some(target_left_ptr)) = (node.left, target.left) {
                stack.push((left_ptr, target_left_ptr));
            }
            if let (Some(right_ptr), Some(target_right_ptr)) = (node.right, target.right) {
                stack.push((right_ptr, target_right_ptr));
            }
        }
        trace!("transform: aligned shape with {} rotations", rotations);
        true
    }
}
