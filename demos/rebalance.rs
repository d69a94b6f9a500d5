//! Replays a series of removals that exercise every rebalancing case and
//! finishes with a rotation-only reshape.
//!
//! Run with `RUST_LOG=rotree=trace cargo run --example rebalance` to see
//! each rotation as it happens.

use std::fmt::Display;

use rotree::{AvlTreeMap, BstMap, NodeRef};

fn print_tree<K: Display, V>(title: &str, root: Option<NodeRef<'_, K, V>>) {
    println!("{title}:");
    match root {
        Some(root) => print_node(root, String::new(), true),
        None => println!("  (empty)"),
    }
    println!();
}

fn print_node<K: Display, V>(node: NodeRef<'_, K, V>, prefix: String, is_last: bool) {
    let branch = if is_last { "└── " } else { "├── " };
    println!("  {prefix}{branch}{} (h={})", node.key(), node.height());
    let prefix = prefix + if is_last { "    " } else { "│   " };
    let children: Vec<_> = [node.left(), node.right()].into_iter().flatten().collect();
    for (index, child) in children.iter().enumerate() {
        print_node(*child, prefix.clone(), index + 1 == children.len());
    }
}

fn main() {
    env_logger::init();

    let mut map = AvlTreeMap::new();
    map.insert(9, "nine");
    map.remove(&9);
    print_tree("remove root with no children", map.root());

    map.insert(9, "nine");
    map.insert(1, "one");
    map.remove(&9);
    print_tree("remove root with left child", map.root());

    map.insert(9, "nine");
    map.remove(&1);
    print_tree("remove root with right child", map.root());

    map.insert(8, "eight");
    map.insert(10, "ten");
    map.remove(&9);
    print_tree("remove root with two children", map.root());

    for (key, value) in [(5, "five"), (30, "thirty"), (4, "four"), (6, "six"), (1, "one")] {
        map.insert(key, value);
    }
    map.remove(&10);
    print_tree("left-left rotation", map.root());

    map.insert(50, "fifty");
    map.remove(&4);
    print_tree("right-right rotation", map.root());

    let mut map = AvlTreeMap::new();
    for key in [15, 10, 20, 7, 11, 89, 13] {
        map.insert(key, ());
    }
    map.remove(&20);
    print_tree("left-right rotation", map.root());

    map.insert(14, ());
    map.remove(&10);
    print_tree("right-left rotation", map.root());

    let shape: BstMap<_, _> = [4, 2, 6, 1, 3, 5, 7].into_iter().map(|key| (key, ())).collect();
    let mut chain: BstMap<_, _> = (1..=7).map(|key| (key, key * 10)).collect();
    print_tree("before transform", chain.root());
    if shape.transform(&mut chain) {
        print_tree("after transform", chain.root());
    }
    println!("values kept: {:?}", chain);
}
