//! Object-model core: shapes, object storage, versioned dictionaries and
//! the module/class registry.

#![allow(clippy::new_without_default)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::len_without_is_empty)]

pub mod core;
pub mod errors;

// Object-space context and its operations
mod runtime;

// Re-exports from core/
pub use self::core::{
    AttrSlot, Binding, CellDict, CellRef, Getter, Heap, HeapStats, ManagedObject, Method, MethodBody, MethodRef,
    ModuleKind, NativeFn, RModule, RObject, Setter, Shape, ShapeTree, SlotKind, ValueCell, VersionTag,
};
pub use self::core::cell_dict::ReadOnly;

// Re-exports from runtime/
pub use runtime::{AttrCache, GlobalCache, Runtime, RuntimeConfig, WellKnownClasses};

pub use errors::RuntimeError;
pub use ru_core::{MapId, ObjectId, Symbol, Value};
