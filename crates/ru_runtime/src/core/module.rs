//! Module and class records.
//!
//! A record only knows its own tables; anything that has to look at other
//! modules (ancestor walks, inclusion, class-variable resolution) lives on
//! `Runtime`, which owns the heap they are stored in.

use std::fmt;
use std::rc::Rc;

use ahash::RandomState;
use indexmap::IndexMap;
use ru_core::value::fast_hasher;
use ru_core::{ObjectId, Symbol, Value};

use super::cell_dict::{CellDict, VersionTag};
use crate::Runtime;
use crate::errors::RuntimeError;

pub type NativeFn = Rc<dyn Fn(&mut Runtime, Value, &[Value]) -> Result<Value, RuntimeError>>;

#[derive(Clone)]
pub enum MethodBody {
    Native(NativeFn),
    /// Returns the named instance variable (nil when unset).
    AttrReader(Symbol),
    /// Stores its single argument into the named instance variable.
    AttrWriter(Symbol),
    /// Placeholder left by `undef_method`; stops lookup.
    Undefined,
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Native(_) => write!(f, "Native"),
            MethodBody::AttrReader(s) => write!(f, "AttrReader({:?})", s),
            MethodBody::AttrWriter(s) => write!(f, "AttrWriter({:?})", s),
            MethodBody::Undefined => write!(f, "Undefined"),
        }
    }
}

#[derive(Debug)]
pub struct Method {
    pub name: Symbol,
    /// Module whose table the method was defined in.
    pub owner: ObjectId,
    pub body: MethodBody,
}

pub type MethodRef = Rc<Method>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleKind {
    Module,
    Class {
        superclass: Option<ObjectId>,
        is_singleton: bool,
        /// Object a singleton class belongs to.
        attached: Option<Value>,
    },
}

pub struct RModule {
    pub(crate) name: Option<String>,
    pub(crate) kind: ModuleKind,
    pub(crate) version: VersionTag,
    pub(crate) methods: IndexMap<Symbol, MethodRef, RandomState>,
    pub(crate) constants: IndexMap<Symbol, Value, RandomState>,
    pub(crate) class_variables: CellDict,
    pub(crate) instance_variables: CellDict,
    pub(crate) flags: CellDict,
    /// Most recently included first.
    pub(crate) included_modules: Vec<ObjectId>,
    /// Modules and classes that included (or inherit from) this one. Used
    /// only for invalidation; never owns anything.
    pub(crate) descendants: Vec<ObjectId>,
    pub(crate) singleton: Option<ObjectId>,
}

impl RModule {
    pub fn new(name: Option<String>, kind: ModuleKind) -> Self {
        Self {
            name,
            kind,
            version: VersionTag::fresh(),
            methods: IndexMap::with_hasher(fast_hasher()),
            constants: IndexMap::with_hasher(fast_hasher()),
            class_variables: CellDict::new(),
            instance_variables: CellDict::new(),
            flags: CellDict::new(),
            included_modules: Vec::new(),
            descendants: Vec::new(),
            singleton: None,
        }
    }

    pub(crate) fn mutated(&mut self) {
        self.version = VersionTag::fresh();
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, ModuleKind::Class { .. })
    }

    pub fn is_singleton(&self) -> bool {
        matches!(
            self.kind,
            ModuleKind::Class {
                is_singleton: true,
                ..
            }
        )
    }

    pub fn superclass(&self) -> Option<ObjectId> {
        match self.kind {
            ModuleKind::Class { superclass, .. } => superclass,
            ModuleKind::Module => None,
        }
    }

    pub fn attached(&self) -> Option<Value> {
        match self.kind {
            ModuleKind::Class { attached, .. } => attached,
            ModuleKind::Module => None,
        }
    }

    /// Replaced on every method-table, constant-table or inclusion change.
    pub fn version(&self) -> VersionTag {
        self.version
    }

    pub fn included_modules(&self) -> &[ObjectId] {
        &self.included_modules
    }

    pub fn descendants(&self) -> &[ObjectId] {
        &self.descendants
    }

    /// Singleton class, if it has been materialized.
    pub fn singleton(&self) -> Option<ObjectId> {
        self.singleton
    }

    pub fn local_method(&self, name: Symbol) -> Option<&MethodRef> {
        self.methods.get(&name)
    }

    pub fn local_const(&self, name: Symbol) -> Option<Value> {
        self.constants.get(&name).copied()
    }

    pub fn class_variables(&self) -> &CellDict {
        &self.class_variables
    }

    pub fn instance_variables(&self) -> &CellDict {
        &self.instance_variables
    }
}
