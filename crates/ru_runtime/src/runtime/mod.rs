//! Runtime module - the object-space context.
//!
//! `Runtime` owns every table the object model needs (heap, shape tree,
//! symbols, globals) so that independent runtimes never share state. Its
//! operations are split across submodules by concern.

mod attributes;
mod cache;
mod class_vars;
mod config;
mod dispatch;
mod globals;
mod registry;
mod singleton;

pub use cache::{AttrCache, GlobalCache};
pub use config::RuntimeConfig;

// The Runtime struct and bootstrap live in core.rs
mod core;
pub use self::core::{Runtime, WellKnownClasses};
