//! Instance variables and flags.
//!
//! Shaped objects keep attributes in `RObject` storage laid out by the shape
//! tree; modules keep them in their own `CellDict`s. Immediate values have
//! no attributes at all.

use ru_core::{ObjectId, Symbol, Value};
use tracing::trace;

use crate::core::object::{fits, select_kind};
use crate::core::{AttrSlot, SlotKind};
use crate::errors::RuntimeError;

use super::Runtime;
use super::cache::AttrCache;

impl Runtime {
    /// Instance variable `name` of `target`; `None` when never assigned.
    pub fn get_attribute(&self, target: Value, name: Symbol) -> Option<Value> {
        if !target.is_heap() {
            return None;
        }
        let id = target.as_obj_id();
        if target.is_module() {
            return self.heap.module(id).instance_variables.get(name);
        }
        let obj = self.heap.object(id);
        self.shapes
            .find_attribute(obj.map(), name)
            .map(|slot| obj.read(slot))
    }

    pub fn set_attribute(&mut self, target: Value, name: Symbol, value: Value) -> Result<(), RuntimeError> {
        self.check_writable(target)?;
        let id = target.as_obj_id();
        if target.is_module() {
            return self
                .heap
                .module_mut(id)
                .instance_variables
                .set(name, value)
                .map_err(|_| RuntimeError::ReadOnlyVariable {
                    name: self.symbol_name(name).to_string(),
                });
        }
        self.write_object_attribute(id, name, value);
        Ok(())
    }

    fn check_writable(&self, target: Value) -> Result<(), RuntimeError> {
        if !target.is_heap() || self.is_frozen(target) {
            return Err(RuntimeError::Frozen {
                class: self.module_name(self.nonsingleton_class_of(target)),
            });
        }
        Ok(())
    }

    /// Store into an object's storage, extending or downgrading its map as
    /// needed. Returns the slot that now holds `name`.
    fn write_object_attribute(&mut self, id: ObjectId, name: Symbol, value: Value) -> AttrSlot {
        let map = self.heap.object(id).map();
        let kind = match self.shapes.find_attribute(map, name) {
            Some(slot) if fits(slot.kind, value) => {
                self.heap.object_mut(id).write(slot, value);
                return slot;
            }
            Some(slot) => {
                trace!(?id, ?name, from = ?slot.kind, "attribute downgraded to boxed");
                SlotKind::Boxed
            }
            None => select_kind(value, &self.config),
        };
        let (next, position) = self.shapes.add_attribute(map, name, kind);
        let slot = AttrSlot { position, kind };
        let obj = self.heap.object_mut(id);
        obj.grow(next, position);
        obj.write(slot, value);
        slot
    }

    /// Copy every instance variable of `src` onto `dst`, by name.
    pub fn copy_attributes(&mut self, dst: Value, src: Value) -> Result<(), RuntimeError> {
        let pairs: Vec<(Symbol, Value)> = self
            .instance_variable_names(src)
            .into_iter()
            .filter_map(|name| self.get_attribute(src, name).map(|v| (name, v)))
            .collect();
        for (name, value) in pairs {
            self.set_attribute(dst, name, value)?;
        }
        Ok(())
    }

    /// Assigned instance variable names, in definition order.
    pub fn instance_variable_names(&self, target: Value) -> Vec<Symbol> {
        if !target.is_heap() {
            return Vec::new();
        }
        let id = target.as_obj_id();
        if target.is_module() {
            return self.heap.module(id).instance_variables.keys().collect();
        }
        self.shapes
            .attributes(self.heap.object(id).map())
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    pub fn set_flag(&mut self, target: Value, name: Symbol) {
        self.write_flag(target, name, true);
    }

    /// Clear a flag. A flag that was never set stays absent.
    pub fn unset_flag(&mut self, target: Value, name: Symbol) {
        self.write_flag(target, name, false);
    }

    fn write_flag(&mut self, target: Value, name: Symbol, on: bool) {
        if !target.is_heap() {
            return;
        }
        let id = target.as_obj_id();
        if target.is_module() {
            let flags = &mut self.heap.module_mut(id).flags;
            if !on && !flags.contains(name) {
                return;
            }
            if flags.set(name, Value::from_bool(on)).is_err() {
                unreachable!("flags are never virtual");
            }
            return;
        }
        let map = self.heap.object(id).map();
        match self.shapes.find_flag(map, name) {
            Some(slot) => self.heap.object_mut(id).write(slot, Value::from_bool(on)),
            None if on => {
                let (next, position) = self.shapes.add_attribute(map, name, SlotKind::Flag);
                let obj = self.heap.object_mut(id);
                obj.grow(next, position);
                obj.write(
                    AttrSlot {
                        position,
                        kind: SlotKind::Flag,
                    },
                    Value::TRUE,
                );
            }
            None => {}
        }
    }

    pub fn get_flag(&self, target: Value, name: Symbol) -> bool {
        if !target.is_heap() {
            return false;
        }
        let id = target.as_obj_id();
        if target.is_module() {
            return self
                .heap
                .module(id)
                .flags
                .get(name)
                .is_some_and(|v| v.is_truthy());
        }
        let obj = self.heap.object(id);
        self.shapes
            .find_flag(obj.map(), name)
            .is_some_and(|slot| obj.read(slot).as_bool())
    }

    pub fn freeze(&mut self, target: Value) {
        let frozen = self.sym_frozen;
        self.set_flag(target, frozen);
    }

    /// Immediates are always frozen.
    pub fn is_frozen(&self, target: Value) -> bool {
        !target.is_heap() || self.get_flag(target, self.sym_frozen)
    }

    /// `get_attribute` for a shaped object through a call-site cache.
    pub fn get_attribute_cached(&self, obj: ObjectId, name: Symbol, cache: &mut AttrCache) -> Option<Value> {
        let object = self.heap.object(obj);
        let map = object.map();
        if let Some(slot) = cache.lookup(map) {
            return Some(object.read(slot));
        }
        let slot = self.shapes.find_attribute(map, name)?;
        cache.fill(map, slot);
        Some(object.read(slot))
    }

    /// `set_attribute` for a shaped object through a call-site cache. A hit
    /// still has to respect the slot's kind; a value that doesn't fit takes
    /// the slow path and refills the cache with the downgraded slot.
    pub fn set_attribute_cached(
        &mut self,
        obj: ObjectId,
        name: Symbol,
        value: Value,
        cache: &mut AttrCache,
    ) -> Result<(), RuntimeError> {
        let target = Value::object(obj);
        self.check_writable(target)?;
        let map = self.heap.object(obj).map();
        if let Some(slot) = cache.lookup(map) {
            if fits(slot.kind, value) {
                self.heap.object_mut(obj).write(slot, value);
                return Ok(());
            }
        }
        let slot = self.write_object_attribute(obj, name, value);
        cache.fill(self.heap.object(obj).map(), slot);
        Ok(())
    }
}
