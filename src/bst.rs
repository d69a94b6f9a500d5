use crate::map::{Balance, TreeMap};
use crate::node::{Link, NodePtr};
use crate::raw::RawTree;

/// Leaves the tree exactly as insertions and removals shape it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Unbalanced;

/// An ordered map on a plain, unbalanced binary search tree.
///
/// Its shape only changes through insertion, removal and
/// [`transform`](TreeMap::transform), which makes it the natural target for
/// rotation-based reshaping.
pub type BstMap<K, V> = TreeMap<K, V, Unbalanced>;

impl Balance for Unbalanced {
    fn inserted<K, V>(_tree: &mut RawTree<K, V>, _node_ptr: NodePtr<K, V>) {}

    fn removed<K, V>(_tree: &mut RawTree<K, V>, _rebalance_from: Link<K, V>) {}

    fn reshaped<K, V>(_tree: &mut RawTree<K, V>) {}

    #[cfg(any(test, feature = "consistency_check"))]
    fn check_consistency<K, V>(_tree: &RawTree<K, V>) {}
}
