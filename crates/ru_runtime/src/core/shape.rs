//! Shape tree and transition cache.
//!
//! A shape ("map") describes an object's class plus the ordered history of
//! attributes added to it. Nodes live in an append-only arena and are never
//! mutated, so a `MapId` can be shared by any number of objects and compared
//! by index to check "same class, same attribute history".
//!
//! Each runtime owns exactly one `ShapeTree`; two runtimes never share nodes.

use ru_core::value::{FastHashMap, fast_map_new};
use ru_core::{MapId, ObjectId, Symbol};
use tracing::trace;

use crate::errors::messages;

/// Physical representation of an attribute slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Any value, stored as its NaN-boxed bits.
    Boxed,
    /// Integer payload stored raw.
    Int,
    /// Float payload stored raw.
    Float,
    /// Boolean flag. Flags live in their own namespace.
    Flag,
}

impl SlotKind {
    #[inline]
    pub fn is_unboxed(self) -> bool {
        matches!(self, SlotKind::Int | SlotKind::Float)
    }
}

/// Resolved location of an attribute inside an object's storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttrSlot {
    pub position: usize,
    pub kind: SlotKind,
}

#[derive(Clone, Debug)]
pub enum Shape {
    Root {
        class: ObjectId,
    },
    Attr {
        prev: MapId,
        name: Symbol,
        kind: SlotKind,
        position: usize,
    },
}

pub struct ShapeTree {
    nodes: Vec<Shape>,
    roots: FastHashMap<ObjectId, MapId>,
    /// (map, name, kind) -> child map. Insert-only.
    transitions: FastHashMap<(MapId, Symbol, SlotKind), MapId>,
}

impl ShapeTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(256),
            roots: fast_map_new(),
            transitions: fast_map_new(),
        }
    }

    #[inline]
    pub fn get(&self, map: MapId) -> &Shape {
        self.nodes.get(map.index()).expect(messages::FOREIGN_MAP)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, shape: Shape) -> MapId {
        let id = MapId(self.nodes.len() as u32);
        self.nodes.push(shape);
        id
    }

    /// The attribute-free node for `class`, created on first request.
    pub fn root_for(&mut self, class: ObjectId) -> MapId {
        if let Some(&root) = self.roots.get(&class) {
            return root;
        }
        let root = self.push(Shape::Root { class });
        self.roots.insert(class, root);
        trace!(?class, ?root, "shape root created");
        root
    }

    /// Number of attribute nodes between `map` and its root.
    pub fn depth(&self, map: MapId) -> usize {
        match self.get(map) {
            Shape::Root { .. } => 0,
            Shape::Attr { position, .. } => position + 1,
        }
    }

    /// Extend `map` with one attribute.
    ///
    /// The result is canonical for `(map, name, kind)`. The only case where
    /// `name` may already be reachable from `map` is a downgrade of an
    /// unboxed attribute to `SlotKind::Boxed`; anything else is a caller bug.
    pub fn add_attribute(&mut self, map: MapId, name: Symbol, kind: SlotKind) -> (MapId, usize) {
        if let Some(&next) = self.transitions.get(&(map, name, kind)) {
            return (next, self.depth(next) - 1);
        }

        let existing = if kind == SlotKind::Flag {
            self.find_flag(map, name)
        } else {
            self.find_attribute(map, name)
        };
        match existing {
            None => {}
            Some(slot) if kind == SlotKind::Boxed && slot.kind.is_unboxed() => {}
            Some(slot) => panic!(
                "{} ({:?} at position {}, {:?})",
                messages::DUPLICATE_TRANSITION,
                name,
                slot.position,
                slot.kind
            ),
        }

        let position = self.depth(map);
        let next = self.push(Shape::Attr {
            prev: map,
            name,
            kind,
            position,
        });
        self.transitions.insert((map, name, kind), next);
        trace!(from = ?map, to = ?next, ?name, ?kind, position, "shape transition");
        (next, position)
    }

    fn find_node(&self, map: MapId, name: Symbol, flags: bool) -> Option<AttrSlot> {
        let mut cur = map;
        loop {
            match self.get(cur) {
                Shape::Root { .. } => return None,
                Shape::Attr {
                    prev,
                    name: n,
                    kind,
                    position,
                } => {
                    if *n == name && (*kind == SlotKind::Flag) == flags {
                        return Some(AttrSlot {
                            position: *position,
                            kind: *kind,
                        });
                    }
                    cur = *prev;
                }
            }
        }
    }

    /// Most recent slot for attribute `name`, walking toward the root.
    pub fn find_attribute(&self, map: MapId, name: Symbol) -> Option<AttrSlot> {
        self.find_node(map, name, false)
    }

    pub fn find_flag(&self, map: MapId, name: Symbol) -> Option<AttrSlot> {
        self.find_node(map, name, true)
    }

    pub fn class_of(&self, map: MapId) -> ObjectId {
        let mut cur = map;
        loop {
            match self.get(cur) {
                Shape::Root { class } => return *class,
                Shape::Attr { prev, .. } => cur = *prev,
            }
        }
    }

    /// Every attribute node from root to `map`, oldest first.
    fn chain(&self, map: MapId) -> Vec<(Symbol, SlotKind, usize)> {
        let mut out = Vec::with_capacity(self.depth(map));
        let mut cur = map;
        while let Shape::Attr {
            prev,
            name,
            kind,
            position,
        } = self.get(cur)
        {
            out.push((*name, *kind, *position));
            cur = *prev;
        }
        out.reverse();
        out
    }

    /// Rebuild the attribute history of `map` on top of `new_class`'s root.
    /// Every name keeps its position and kind.
    pub fn rebase(&mut self, map: MapId, new_class: ObjectId) -> MapId {
        let chain = self.chain(map);
        let mut cur = self.root_for(new_class);
        for (name, kind, position) in chain {
            let (next, pos) = self.add_attribute(cur, name, kind);
            assert_eq!(pos, position, "{}", messages::POSITION_MISMATCH);
            cur = next;
        }
        trace!(from = ?map, to = ?cur, ?new_class, "shape rebased");
        cur
    }

    /// Live attributes of `map` (newest node per name, flags excluded),
    /// ordered by the position each name was first added at.
    pub fn attributes(&self, map: MapId) -> Vec<(Symbol, AttrSlot)> {
        self.live_nodes(map, false)
    }

    pub fn flags(&self, map: MapId) -> Vec<(Symbol, AttrSlot)> {
        self.live_nodes(map, true)
    }

    fn live_nodes(&self, map: MapId, flags: bool) -> Vec<(Symbol, AttrSlot)> {
        // name -> (newest slot, oldest position)
        let mut live: FastHashMap<Symbol, (AttrSlot, usize)> = fast_map_new();
        let mut cur = map;
        while let Shape::Attr {
            prev,
            name,
            kind,
            position,
        } = self.get(cur)
        {
            if (*kind == SlotKind::Flag) == flags {
                live.entry(*name)
                    .and_modify(|(_, first)| *first = *position)
                    .or_insert((
                        AttrSlot {
                            position: *position,
                            kind: *kind,
                        },
                        *position,
                    ));
            }
            cur = *prev;
        }
        let mut out: Vec<_> = live.into_iter().collect();
        out.sort_unstable_by_key(|(_, (_, first))| *first);
        out.into_iter().map(|(name, (slot, _))| (name, slot)).collect()
    }
}

impl Default for ShapeTree {
    fn default() -> Self {
        Self::new()
    }
}
