//! Class-variable resolution.
//!
//! Class variables are stored in each module's own `CellDict`. Writes walk
//! the ancestor list from the furthest ancestor inward and land on the first
//! module that already binds the name; reads walk from the nearest ancestor
//! outward. A fresh binding on a module evicts stale copies from everything
//! that includes or inherits from it.

use ru_core::value::fast_set_new;
use ru_core::{ObjectId, Symbol, Value};
use tracing::debug;

use crate::core::CellDict;
use crate::errors::RuntimeError;

use super::Runtime;

fn store(dict: &mut CellDict, name: Symbol, value: Value) {
    if dict.set(name, value).is_err() {
        unreachable!("class variables are never virtual");
    }
}

impl Runtime {
    pub fn set_class_var(&mut self, module: ObjectId, name: Symbol, value: Value) {
        let ancestors = self.ancestors(module);
        let target = ancestors
            .iter()
            .rev()
            .copied()
            .find(|&anc| self.heap.module(anc).class_variables.contains(name))
            .unwrap_or(module);
        store(&mut self.heap.module_mut(target).class_variables, name, value);
        if target == module {
            let descendants = self.heap.module(module).descendants.clone();
            if !descendants.is_empty() {
                debug!(?module, ?name, count = descendants.len(), "evicting shadowed class variables");
            }
            for d in descendants {
                self.remove_class_var(d, name);
            }
        }
    }

    /// Own binding first, then the ancestors nearest to furthest.
    pub fn find_class_var(&self, module: ObjectId, name: Symbol) -> Option<Value> {
        let md = self.heap.module(module);
        if let Some(v) = md.class_variables.get(name) {
            return Some(v);
        }
        self.ancestors(module)
            .into_iter()
            .skip(1)
            .find_map(|anc| self.heap.module(anc).class_variables.get(name))
    }

    /// Delete the local binding on `module` and on every descendant.
    pub fn remove_class_var(&mut self, module: ObjectId, name: Symbol) {
        let mut pending = vec![module];
        let mut seen = fast_set_new();
        while let Some(cur) = pending.pop() {
            if !seen.insert(cur) {
                continue;
            }
            let md = self.heap.module_mut(cur);
            md.class_variables.delete(name);
            pending.extend(md.descendants.iter().copied());
        }
    }

    pub fn class_var_defined(&self, module: ObjectId, name: Symbol) -> bool {
        self.find_class_var(module, name).is_some()
    }

    /// Names bound directly on `module`, in definition order.
    pub fn class_variables(&self, module: ObjectId) -> Vec<Symbol> {
        self.heap.module(module).class_variables.keys().collect()
    }

    fn class_var_symbol(&mut self, name: &str) -> Result<Symbol, RuntimeError> {
        let valid = name.len() > 2
            && name.starts_with("@@")
            && !name[2..].starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(RuntimeError::WrongClassVarName(name.to_string()));
        }
        Ok(self.intern(name))
    }

    /// `class_variable_set`: validates the name, then `set_class_var`.
    pub fn class_variable_set(&mut self, module: ObjectId, name: &str, value: Value) -> Result<Value, RuntimeError> {
        let sym = self.class_var_symbol(name)?;
        self.set_class_var(module, sym, value);
        Ok(value)
    }

    /// `class_variable_get`: like `find_class_var` but a miss is an error.
    pub fn class_variable_get(&mut self, module: ObjectId, name: &str) -> Result<Value, RuntimeError> {
        let sym = self.class_var_symbol(name)?;
        self.find_class_var(module, sym)
            .ok_or_else(|| RuntimeError::ClassVarNotDefined {
                name: name.to_string(),
                module: self.module_name(module),
            })
    }

    /// `remove_class_variable`: only a binding local to `module` can be
    /// removed; its value is returned.
    pub fn remove_class_variable(&mut self, module: ObjectId, name: &str) -> Result<Value, RuntimeError> {
        let sym = self.class_var_symbol(name)?;
        let Some(value) = self.heap.module(module).class_variables.get(sym) else {
            return Err(RuntimeError::ClassVarNotDefined {
                name: name.to_string(),
                module: self.module_name(module),
            });
        };
        self.remove_class_var(module, sym);
        Ok(value)
    }
}
