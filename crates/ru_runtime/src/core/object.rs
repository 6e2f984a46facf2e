//! Per-instance attribute storage.
//!
//! An `RObject` is a map pointer plus one raw 64-bit cell per attribute node
//! in its map's history. How a cell is interpreted is decided by the node's
//! `SlotKind`, never by the cell itself.

use ru_core::{MapId, Value};
use smallvec::SmallVec;

use super::shape::{AttrSlot, SlotKind};
use crate::errors::messages;
use crate::runtime::RuntimeConfig;

pub struct RObject {
    pub(crate) map: MapId,
    pub(crate) storage: SmallVec<[u64; 4]>,
}

impl RObject {
    pub fn new(root: MapId) -> Self {
        Self {
            map: root,
            storage: SmallVec::new(),
        }
    }

    #[inline]
    pub fn map(&self) -> MapId {
        self.map
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub(crate) fn read(&self, slot: AttrSlot) -> Value {
        decode(slot.kind, self.storage[slot.position])
    }

    #[inline]
    pub(crate) fn write(&mut self, slot: AttrSlot, value: Value) {
        self.storage[slot.position] = encode(slot.kind, value);
    }

    /// Move to `map`, which must be the child of the current map that adds
    /// the slot at `position`.
    pub(crate) fn grow(&mut self, map: MapId, position: usize) {
        assert_eq!(position, self.storage.len(), "{}", messages::STORAGE_OUT_OF_SYNC);
        self.map = map;
        self.storage.push(0);
    }
}

/// Representation a fresh attribute gets for its first value.
pub fn select_kind(value: Value, config: &RuntimeConfig) -> SlotKind {
    if value.is_int() && config.unbox_ints {
        SlotKind::Int
    } else if value.is_f64() && config.unbox_floats {
        SlotKind::Float
    } else {
        SlotKind::Boxed
    }
}

/// Whether `value` can be stored in a slot of `kind` without a downgrade.
pub fn fits(kind: SlotKind, value: Value) -> bool {
    match kind {
        SlotKind::Boxed => true,
        SlotKind::Int => value.is_int(),
        SlotKind::Float => value.is_f64(),
        SlotKind::Flag => value.is_bool(),
    }
}

#[inline]
fn encode(kind: SlotKind, value: Value) -> u64 {
    match kind {
        SlotKind::Boxed => value.to_bits(),
        SlotKind::Int => value.as_i64() as u64,
        SlotKind::Float => value.as_f64().to_bits(),
        SlotKind::Flag => value.is_truthy() as u64,
    }
}

#[inline]
fn decode(kind: SlotKind, raw: u64) -> Value {
    match kind {
        SlotKind::Boxed => Value::from_bits(raw),
        SlotKind::Int => Value::from_i64(raw as i64),
        SlotKind::Float => Value::from_f64(f64::from_bits(raw)),
        SlotKind::Flag => Value::from_bool(raw != 0),
    }
}
