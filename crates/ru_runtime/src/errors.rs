//! Error types and common message constants used throughout the runtime.

use thiserror::Error;

/// Messages for invariant violations. These indicate a bug in the caller and
/// are only ever used in panics.
pub mod messages {
    pub const NOT_AN_OBJECT: &str = "handle does not refer to a plain object";
    pub const NOT_A_MODULE: &str = "handle does not refer to a module";
    pub const DANGLING_HANDLE: &str = "handle does not refer to a live heap object";
    pub const FOREIGN_MAP: &str = "map does not belong to this shape tree";
    pub const DUPLICATE_TRANSITION: &str = "attribute transition requested for a name already present";
    pub const POSITION_MISMATCH: &str = "rebased attribute landed at a different position";
    pub const STORAGE_OUT_OF_SYNC: &str = "object storage length differs from shape depth";
}

/// Language-level errors raised by this core. Lookup misses are never errors;
/// they come back as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("{name} is a read-only variable")]
    ReadOnlyVariable { name: String },

    #[error("undefined method `{name}' for {class}")]
    NoMethod { name: String, class: String },

    #[error("undefined method `{name}' for class `{module}'")]
    UndefinedMethod { name: String, module: String },

    #[error("method `{name}' not defined in {module}")]
    MethodNotDefined { name: String, module: String },

    #[error("class variable {name} not defined for {module}")]
    ClassVarNotDefined { name: String, module: String },

    #[error("constant {module}::{name} not defined")]
    ConstNotDefined { name: String, module: String },

    #[error("wrong constant name {0}")]
    WrongConstName(String),

    #[error("`{0}' is not allowed as a class variable name")]
    WrongClassVarName(String),

    #[error("cyclic include detected")]
    CyclicInclude,

    #[error("{name} is not a {expected}")]
    WrongKind { name: String, expected: &'static str },

    #[error("wrong argument type {given} (expected {expected})")]
    WrongArgumentType { given: String, expected: &'static str },

    #[error("superclass mismatch for class {0}")]
    SuperclassMismatch(String),

    #[error("wrong number of arguments (given {given}, expected {expected})")]
    ArgumentCount { given: usize, expected: usize },

    #[error("can't modify frozen {class}")]
    Frozen { class: String },

    #[error("can't define singleton")]
    NoSingleton,
}
