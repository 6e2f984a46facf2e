//! Interned names.
//!
//! Attribute, method, constant and variable names are interned once per
//! runtime so that shape walks and table lookups compare integers instead of
//! strings.

use ahash::RandomState;
use indexmap::IndexSet;
use std::fmt;

use crate::value::fast_hasher;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub fn from_index(idx: usize) -> Self {
        Symbol(idx as u32)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Append-only interner. A symbol's index never changes once handed out.
pub struct SymbolTable {
    names: IndexSet<Box<str>, RandomState>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            names: IndexSet::with_hasher(fast_hasher()),
        }
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(idx) = self.names.get_index_of(name) {
            return Symbol::from_index(idx);
        }
        let (idx, _) = self.names.insert_full(Box::from(name));
        Symbol::from_index(idx)
    }

    /// Look a name up without interning it.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.names.get_index_of(name).map(Symbol::from_index)
    }

    /// Text of an interned symbol.
    ///
    /// Panics if `sym` was produced by a different table.
    pub fn name(&self, sym: Symbol) -> &str {
        self.names
            .get_index(sym.index())
            .map(|s| &**s)
            .expect("symbol does not belong to this table")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut t = SymbolTable::new();
        let a = t.intern("@a");
        let b = t.intern("@b");
        assert_ne!(a, b);
        assert_eq!(t.intern("@a"), a);
        assert_eq!(t.name(b), "@b");
        assert_eq!(t.lookup("@c"), None);
        assert_eq!(t.len(), 2);
    }
}
