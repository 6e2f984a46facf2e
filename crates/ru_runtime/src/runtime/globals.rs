//! Global variables (`$name`).

use ru_core::{Symbol, Value};

use crate::core::{CellDict, CellRef, Getter, Setter};
use crate::errors::RuntimeError;

use super::Runtime;
use super::cache::GlobalCache;

impl Runtime {
    pub fn globals(&self) -> &CellDict {
        &self.globals
    }

    pub fn get_global(&self, name: Symbol) -> Option<Value> {
        self.globals.get(name)
    }

    pub fn set_global(&mut self, name: Symbol, value: Value) -> Result<(), RuntimeError> {
        self.globals
            .set(name, value)
            .map_err(|_| RuntimeError::ReadOnlyVariable {
                name: self.symbols.name(name).to_string(),
            })
    }

    /// Returns whether the global was bound.
    pub fn delete_global(&mut self, name: Symbol) -> bool {
        self.globals.delete(name)
    }

    /// Bind `name` to computed accessors. Without a setter, assignment fails
    /// with `ReadOnlyVariable`.
    pub fn define_virtual_global(&mut self, name: Symbol, getter: Getter, setter: Option<Setter>) {
        self.globals.define_virtual(name, getter, setter);
    }

    pub fn global_cell(&self, name: Symbol) -> Option<CellRef> {
        self.globals.cell(name)
    }

    /// `get_global` through a call-site cache keyed on the dictionary version.
    pub fn get_global_cached(&self, name: Symbol, cache: &mut GlobalCache) -> Option<Value> {
        let version = self.globals.version();
        if let Some(binding) = cache.lookup(version) {
            return binding.as_ref().map(|b| b.value());
        }
        let binding = self.globals.binding(name).cloned();
        let value = binding.as_ref().map(|b| b.value());
        cache.fill(version, binding);
        value
    }
}
