//! Ordered maps on binary search trees with parent links.
//!
//! [`AvlTreeMap`] keeps its tree height-balanced with AVL rotations.
//! [`BstMap`] is the same map without balancing. Both can reshape another map
//! holding the same keys into their own link structure using rotations only,
//! see [`TreeMap::transform`].
//!
//! ```
//! use rotree::{AvlTreeMap, BstMap};
//!
//! let avl: AvlTreeMap<_, _> = (1..=15).map(|key| (key, ())).collect();
//! assert_eq!(avl.height(), 4);
//! assert!(avl.is_balanced());
//!
//! let shape: BstMap<_, _> = [4, 2, 6, 1, 3, 5, 7].into_iter().map(|key| (key, ())).collect();
//! let mut chain: BstMap<_, _> = (1..=7).map(|key| (key, key * 10)).collect();
//! assert!(!chain.is_balanced());
//!
//! assert!(shape.transform(&mut chain));
//! assert!(chain.is_balanced());
//! assert_eq!(chain.root().map(|root| *root.value()), Some(40));
//! ```

mod avl;
mod bst;
mod iter;
mod map;
mod node;
mod raw;
mod rotate;

pub use avl::{Avl, AvlTreeMap};
pub use bst::{BstMap, Unbalanced};
pub use iter::{IntoIter, Iter, IterMut};
pub use map::{Balance, TreeMap};
pub use node::NodeRef;
