//! Core object-model infrastructure.
//!
//! This module contains the data structures the runtime is built on:
//! - `ShapeTree` - Canonical layout descriptors and the transition cache
//! - `RObject` - Per-instance attribute storage
//! - `CellDict` - Versioned name -> value dictionary
//! - `RModule` - Method, constant and class-variable tables
//! - `Heap` - Arena holding objects and modules

pub mod cell_dict;
pub mod heap;
pub mod module;
pub mod object;
pub mod shape;

pub use cell_dict::{Binding, CellDict, CellRef, Getter, Setter, ValueCell, VersionTag};
pub use heap::{Heap, HeapStats, ManagedObject};
pub use module::{Method, MethodBody, MethodRef, ModuleKind, NativeFn, RModule};
pub use object::RObject;
pub use shape::{AttrSlot, Shape, ShapeTree, SlotKind};
