//! Core types for the ru runtime.
//!
//! This crate contains the fundamental types shared by every runtime layer:
//! - `Value` - NaN-boxed runtime value representation
//! - `ObjectId` / `MapId` - Handles into the heap and the shape tree
//! - `Symbol` / `SymbolTable` - Interned names

pub mod handle;
pub mod symbol;
pub mod value;

pub use handle::{MapId, ObjectId};
pub use symbol::{Symbol, SymbolTable};
pub use value::{FastHashMap, FastHashSet, Value};
