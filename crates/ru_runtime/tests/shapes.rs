use ru_core::{ObjectId, SymbolTable};
use ru_runtime::{AttrSlot, ShapeTree, SlotKind};

#[test]
fn transitions_are_canonical() {
    let mut syms = SymbolTable::new();
    let a = syms.intern("@a");
    let mut tree = ShapeTree::new();
    let root = tree.root_for(ObjectId(1));

    let (m1, p1) = tree.add_attribute(root, a, SlotKind::Boxed);
    let nodes = tree.node_count();
    let (m2, p2) = tree.add_attribute(root, a, SlotKind::Boxed);
    assert_eq!(m1, m2);
    assert_eq!(p1, p2);
    assert_eq!(tree.node_count(), nodes);
}

#[test]
fn positions_follow_depth() {
    let mut syms = SymbolTable::new();
    let names = ["@a", "@b", "@c"].map(|n| syms.intern(n));
    let mut tree = ShapeTree::new();
    let mut map = tree.root_for(ObjectId(1));
    assert_eq!(tree.depth(map), 0);
    for (i, name) in names.iter().enumerate() {
        let (next, pos) = tree.add_attribute(map, *name, SlotKind::Boxed);
        assert_eq!(pos, i);
        assert_eq!(tree.depth(next), i + 1);
        map = next;
    }
    assert_eq!(
        tree.find_attribute(map, names[1]),
        Some(AttrSlot {
            position: 1,
            kind: SlotKind::Boxed
        })
    );
}

#[test]
fn parent_does_not_see_child_attributes() {
    let mut syms = SymbolTable::new();
    let a = syms.intern("@a");
    let b = syms.intern("@b");
    let mut tree = ShapeTree::new();
    let root = tree.root_for(ObjectId(1));
    let (with_a, _) = tree.add_attribute(root, a, SlotKind::Int);
    let (with_ab, _) = tree.add_attribute(with_a, b, SlotKind::Int);

    assert!(tree.find_attribute(with_a, b).is_none());
    assert!(tree.find_attribute(with_ab, b).is_some());
    assert!(tree.find_attribute(root, a).is_none());
}

#[test]
fn roots_are_per_class() {
    let mut tree = ShapeTree::new();
    let r1 = tree.root_for(ObjectId(1));
    let r2 = tree.root_for(ObjectId(2));
    assert_ne!(r1, r2);
    assert_eq!(tree.root_for(ObjectId(1)), r1);
    assert_eq!(tree.class_of(r2), ObjectId(2));
}

#[test]
fn downgrade_appends_a_boxed_slot() {
    let mut syms = SymbolTable::new();
    let a = syms.intern("@a");
    let mut tree = ShapeTree::new();
    let root = tree.root_for(ObjectId(1));
    let (int_map, int_pos) = tree.add_attribute(root, a, SlotKind::Int);
    let (boxed_map, boxed_pos) = tree.add_attribute(int_map, a, SlotKind::Boxed);

    assert_eq!(int_pos, 0);
    assert_eq!(boxed_pos, 1);
    assert_eq!(
        tree.find_attribute(boxed_map, a),
        Some(AttrSlot {
            position: 1,
            kind: SlotKind::Boxed
        })
    );
    let live = tree.attributes(boxed_map);
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].0, a);
}

#[test]
#[should_panic(expected = "already present")]
fn duplicate_attribute_is_fatal() {
    let mut syms = SymbolTable::new();
    let a = syms.intern("@a");
    let mut tree = ShapeTree::new();
    let root = tree.root_for(ObjectId(1));
    let (map, _) = tree.add_attribute(root, a, SlotKind::Boxed);
    tree.add_attribute(map, a, SlotKind::Int);
}

#[test]
fn flags_have_their_own_namespace() {
    let mut syms = SymbolTable::new();
    let a = syms.intern("a");
    let mut tree = ShapeTree::new();
    let root = tree.root_for(ObjectId(1));
    let (map, _) = tree.add_attribute(root, a, SlotKind::Boxed);
    let (map, pos) = tree.add_attribute(map, a, SlotKind::Flag);

    assert_eq!(pos, 1);
    assert_eq!(tree.find_attribute(map, a).map(|s| s.kind), Some(SlotKind::Boxed));
    assert_eq!(tree.find_flag(map, a).map(|s| s.kind), Some(SlotKind::Flag));
    assert_eq!(tree.attributes(map).len(), 1);
    assert_eq!(tree.flags(map).len(), 1);
}

#[test]
fn rebase_preserves_positions() {
    let mut syms = SymbolTable::new();
    let names = ["@x", "@y", "@z"].map(|n| syms.intern(n));
    let mut tree = ShapeTree::new();
    let mut map = tree.root_for(ObjectId(1));
    map = tree.add_attribute(map, names[0], SlotKind::Int).0;
    map = tree.add_attribute(map, names[1], SlotKind::Float).0;
    map = tree.add_attribute(map, names[0], SlotKind::Boxed).0;
    map = tree.add_attribute(map, names[2], SlotKind::Flag).0;

    let rebased = tree.rebase(map, ObjectId(7));
    assert_ne!(rebased, map);
    assert_eq!(tree.class_of(rebased), ObjectId(7));
    assert_eq!(tree.depth(rebased), tree.depth(map));
    for name in names {
        assert_eq!(tree.find_attribute(rebased, name), tree.find_attribute(map, name));
        assert_eq!(tree.find_flag(rebased, name), tree.find_flag(map, name));
    }
    // Rebasing the same history twice lands on the same node.
    assert_eq!(tree.rebase(map, ObjectId(7)), rebased);
}
