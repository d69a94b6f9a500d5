//! AVL balancing: height maintenance and rotation-based rebalancing.

use log::trace;

use crate::map::{Balance, TreeMap};
use crate::node::{Link, Node, NodePtr};
use crate::raw::RawTree;

/// Keeps every node's subtree heights within one of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Avl;

/// An ordered map implemented with an AVL tree.
///
/// ```
/// use rotree::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// for key in 1..=7 {
///     map.insert(key, key * key);
/// }
/// assert_eq!(map.height(), 3);
/// assert!(map.is_balanced());
/// ```
pub type AvlTreeMap<K, V> = TreeMap<K, V, Avl>;

impl<K, V> TreeMap<K, V, Avl> {
    /// Returns the height of the tree; 0 when empty, 1 for a single entry.
    pub fn height(&self) -> usize {
        Node::height_of(self.tree.root)
    }
}

impl Balance for Avl {
    fn inserted<K, V>(tree: &mut RawTree<K, V>, node_ptr: NodePtr<K, V>) {
        debug_assert_eq!(unsafe { node_ptr.as_ref().height }, 1);
        rebalance_once(tree, unsafe { node_ptr.as_ref().parent });
    }

    fn removed<K, V>(tree: &mut RawTree<K, V>, rebalance_from: Link<K, V>) {
        rebalance(tree, rebalance_from);
    }

    fn reshaped<K, V>(tree: &mut RawTree<K, V>) {
        tree.recompute_heights();
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn check_consistency<K, V>(tree: &RawTree<K, V>) {
        tree.preorder(|node_ptr| {
            let left_height = Node::left_height(node_ptr);
            let right_height = Node::right_height(node_ptr);

            // Check height
            assert_eq!(
                unsafe { node_ptr.as_ref().height },
                1 + std::cmp::max(left_height, right_height)
            );

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);
        });
        let (height, balanced) = tree.measure();
        assert!(balanced);
        assert_eq!(height, Node::height_of(tree.root));
    }
}

/// Shape of an imbalance at the node being rebalanced, named by the path
/// from it to its taller child and that child's taller child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Imbalance {
    LeftLeft,
    LeftRight,
    RightRight,
    RightLeft,
}

impl Imbalance {
    /// Returns the imbalance at `node_ptr` together with its taller child,
    /// or `None` if the node satisfies the AVL condition.
    fn classify<K, V>(node_ptr: NodePtr<K, V>) -> Option<(Self, NodePtr<K, V>)> {
        let left_height = Node::left_height(node_ptr);
        let right_height = Node::right_height(node_ptr);
        debug_assert!(left_height <= right_height + 2);
        debug_assert!(right_height <= left_height + 2);
        unsafe {
            if left_height > right_height + 1 {
                let left_ptr = node_ptr.as_ref().left?;
                // Ties go to the outer grandchild
                if Node::right_height(left_ptr) > Node::left_height(left_ptr) {
                    Some((Self::LeftRight, left_ptr))
                } else {
                    Some((Self::LeftLeft, left_ptr))
                }
            } else if right_height > left_height + 1 {
                let right_ptr = node_ptr.as_ref().right?;
                if Node::left_height(right_ptr) > Node::right_height(right_ptr) {
                    Some((Self::RightLeft, right_ptr))
                } else {
                    Some((Self::RightRight, right_ptr))
                }
            } else {
                None
            }
        }
    }
}

/// Rebalances nodes starting from given position up to the root node.
fn rebalance<K, V>(tree: &mut RawTree<K, V>, start_from: Link<K, V>) {
    let mut current = start_from;
    while let Some(node_ptr) = current {
        let parent = unsafe { node_ptr.as_ref().parent };
        rebalance_node(tree, node_ptr);
        current = parent;
    }
}

/// Rebalances nodes starting from given position up to the root node.
/// Stops after first rebalance operation.
/// This is enough to restore balance after a single insert operation.
fn rebalance_once<K, V>(tree: &mut RawTree<K, V>, start_from: Link<K, V>) {
    let mut current = start_from;
    while let Some(node_ptr) = current {
        let parent = unsafe { node_ptr.as_ref().parent };
        let did_rebalance = rebalance_node(tree, node_ptr);
        if did_rebalance {
            break;
        }
        current = parent;
    }
}

/// Restores AVL condition (balance) at given node if necessary and adjusts height.
/// Resulting balance will be +1, 0 or -1 height difference between left and right subtree.
/// Initial balance must not exceed +2 or -2, which always holds after a single update.
/// Returns whether rebalancing had been necessary.
fn rebalance_node<K, V>(tree: &mut RawTree<K, V>, node_ptr: NodePtr<K, V>) -> bool {
    let Some((imbalance, child_ptr)) = Imbalance::classify(node_ptr) else {
        Node::adjust_height(node_ptr);
        return false;
    };
    trace!("rebalancing {:?} imbalance", imbalance);

    match imbalance {
        Imbalance::LeftLeft => tree.rotate_right(node_ptr),
        Imbalance::RightRight => tree.rotate_left(node_ptr),
        Imbalance::LeftRight => {
            tree.rotate_left(child_ptr);
            tree.rotate_right(node_ptr);
        }
        Imbalance::RightLeft => {
            tree.rotate_right(child_ptr);
            tree.rotate_left(node_ptr);
        }
    }

    // Demoted nodes first, then the new subtree root above them
    Node::adjust_height(node_ptr);
    if matches!(imbalance, Imbalance::LeftRight | Imbalance::RightLeft) {
        Node::adjust_height(child_ptr);
    }
    if let Some(top_ptr) = unsafe { node_ptr.as_ref().parent } {
        Node::adjust_height(top_ptr);
    }
    true
}
