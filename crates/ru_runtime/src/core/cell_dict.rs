//! Versioned name -> value dictionary.
//!
//! Used for globals, class variables, and the instance variables and flags
//! of modules. The version tag is replaced whenever the key set (or the kind
//! of a binding) changes, and is left alone when a value is written through
//! an existing cell. Callers can cache a resolved binding against the tag and
//! keep reading through the cell for as long as the tag matches.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::RandomState;
use indexmap::IndexMap;
use ru_core::value::fast_hasher;
use ru_core::{Symbol, Value};
use thiserror::Error;
use tracing::trace;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Opaque change token. Only equality is meaningful; every call to `fresh`
/// yields a tag no other dictionary has ever held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VersionTag(u64);

impl VersionTag {
    pub fn fresh() -> Self {
        VersionTag(NEXT_VERSION.fetch_add(1, Ordering::Relaxed))
    }
}

/// Boxed value holder with stable identity.
pub struct ValueCell {
    value: Cell<Value>,
}

impl ValueCell {
    pub fn new(value: Value) -> Self {
        Self {
            value: Cell::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> Value {
        self.value.get()
    }

    #[inline]
    pub fn set(&self, value: Value) {
        self.value.set(value)
    }
}

pub type CellRef = Rc<ValueCell>;
pub type Getter = Rc<dyn Fn() -> Value>;
pub type Setter = Rc<dyn Fn(Value)>;

#[derive(Clone)]
pub enum Binding {
    /// Written once, never through a cell yet.
    Raw(Value),
    /// Written more than once; later writes go through the cell.
    Cell(CellRef),
    /// Computed pseudo-variable.
    Virtual {
        getter: Getter,
        setter: Option<Setter>,
    },
}

impl Binding {
    pub fn value(&self) -> Value {
        match self {
            Binding::Raw(v) => *v,
            Binding::Cell(cell) => cell.get(),
            Binding::Virtual { getter, .. } => getter(),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Raw(v) => write!(f, "Raw({:?})", v),
            Binding::Cell(cell) => write!(f, "Cell({:?})", cell.get()),
            Binding::Virtual { setter, .. } => {
                write!(f, "Virtual(setter={})", setter.is_some())
            }
        }
    }
}

/// Write to a virtual binding that has no setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("read-only variable")]
pub struct ReadOnly;

pub struct CellDict {
    values: IndexMap<Symbol, Binding, RandomState>,
    version: VersionTag,
}

impl CellDict {
    pub fn new() -> Self {
        Self {
            values: IndexMap::with_hasher(fast_hasher()),
            version: VersionTag::fresh(),
        }
    }

    #[inline]
    pub fn version(&self) -> VersionTag {
        self.version
    }

    fn mutated(&mut self) {
        let old = self.version;
        self.version = VersionTag::fresh();
        trace!(?old, new = ?self.version, "dict version bumped");
    }

    pub fn binding(&self, name: Symbol) -> Option<&Binding> {
        self.values.get(&name)
    }

    pub fn get(&self, name: Symbol) -> Option<Value> {
        self.values.get(&name).map(Binding::value)
    }

    /// Stable handle for `name`, once its binding has been promoted to a cell.
    pub fn cell(&self, name: Symbol) -> Option<CellRef> {
        match self.values.get(&name) {
            Some(Binding::Cell(cell)) => Some(cell.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, name: Symbol, value: Value) -> Result<(), ReadOnly> {
        let promoted = match self.values.get(&name) {
            Some(Binding::Cell(cell)) => {
                cell.set(value);
                return Ok(());
            }
            Some(Binding::Virtual { setter, .. }) => {
                let setter = setter.as_ref().ok_or(ReadOnly)?;
                setter(value);
                return Ok(());
            }
            Some(Binding::Raw(_)) => Binding::Cell(Rc::new(ValueCell::new(value))),
            None => Binding::Raw(value),
        };
        self.values.insert(name, promoted);
        self.mutated();
        Ok(())
    }

    /// Remove `name`. Returns whether a binding was present.
    pub fn delete(&mut self, name: Symbol) -> bool {
        if self.values.shift_remove(&name).is_some() {
            self.mutated();
            true
        } else {
            false
        }
    }

    pub fn define_virtual(&mut self, name: Symbol, getter: Getter, setter: Option<Setter>) {
        self.values.insert(name, Binding::Virtual { getter, setter });
        self.mutated();
    }

    #[inline]
    pub fn contains(&self, name: Symbol) -> bool {
        self.values.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.values.keys().copied()
    }
}

impl Default for CellDict {
    fn default() -> Self {
        Self::new()
    }
}
