//! Runtime value representation.
//!
//! Values are NaN-boxed into a single `u64`: every non-NaN bit pattern is a
//! float, and the quiet-NaN space above `TAG_BASE` carries a 4-bit tag plus a
//! 48-bit payload (immediate int, bool, heap handle or symbol index).

use crate::handle::ObjectId;
use crate::symbol::Symbol;
use ahash::RandomState;
use hashbrown::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;
pub type FastHashSet<K> = HashSet<K, RandomState>;

pub fn fast_hasher() -> RandomState {
    RandomState::with_seeds(0, 0, 0, 0)
}

pub fn fast_map_new<K: Eq + Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(fast_hasher())
}

pub fn fast_set_new<K: Eq + Hash>() -> FastHashSet<K> {
    HashSet::with_hasher(fast_hasher())
}

// NaN-Boxing constants
pub const QNAN: u64 = 0x7ff8000000000000;
pub const TAG_BASE: u64 = 0xfff0000000000000;
pub const TAG_MASK: u64 = 0x000f000000000000;
pub const PAYLOAD_MASK: u64 = 0x0000ffffffffffff;

pub const TAG_INT: u64 = 0x0001;
pub const TAG_BOOL: u64 = 0x0002;
pub const TAG_NIL: u64 = 0x0003;
pub const TAG_OBJECT: u64 = 0x0004;
pub const TAG_MODULE: u64 = 0x0005;
pub const TAG_SYMBOL: u64 = 0x0006;

/// Largest integer that fits the 48-bit immediate payload.
pub const INT_MAX: i64 = (1 << 47) - 1;
/// Smallest integer that fits the 48-bit immediate payload.
pub const INT_MIN: i64 = -(1 << 47);

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Value(u64);

impl Default for Value {
    fn default() -> Self {
        Self::NIL
    }
}

impl Value {
    pub const NIL: Value = Value(TAG_BASE | (TAG_NIL << 48));
    pub const TRUE: Value = Value(TAG_BASE | (TAG_BOOL << 48) | 1);
    pub const FALSE: Value = Value(TAG_BASE | (TAG_BOOL << 48));

    #[inline(always)]
    pub fn from_f64(f: f64) -> Self {
        // Collapse every NaN onto one pattern so it can't be mistaken for a tag.
        if f.is_nan() {
            return Self(QNAN);
        }
        Self(f.to_bits())
    }

    /// Box an integer. Values outside `INT_MIN..=INT_MAX` are truncated to
    /// 48 bits; callers holding wider integers must check `fits_int` first.
    #[inline(always)]
    pub fn from_i64(i: i64) -> Self {
        Self(TAG_BASE | (TAG_INT << 48) | (i as u64 & PAYLOAD_MASK))
    }

    #[inline(always)]
    pub fn fits_int(i: i64) -> bool {
        (INT_MIN..=INT_MAX).contains(&i)
    }

    #[inline(always)]
    pub fn from_bool(b: bool) -> Self {
        if b { Self::TRUE } else { Self::FALSE }
    }

    #[inline(always)]
    fn from_handle(tag: u64, payload: u64) -> Self {
        Self(TAG_BASE | (tag << 48) | (payload & PAYLOAD_MASK))
    }

    pub fn object(id: ObjectId) -> Self {
        Self::from_handle(TAG_OBJECT, id.0 as u64)
    }

    pub fn module(id: ObjectId) -> Self {
        Self::from_handle(TAG_MODULE, id.0 as u64)
    }

    pub fn symbol(sym: Symbol) -> Self {
        Self::from_handle(TAG_SYMBOL, sym.index() as u64)
    }

    /// Raw bit pattern, as stored in a boxed attribute slot.
    #[inline(always)]
    pub fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuild a value from bits previously produced by `to_bits`.
    #[inline(always)]
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline(always)]
    pub fn is_f64(&self) -> bool {
        // -inf is exactly TAG_BASE; tag 0 is never handed out.
        (self.0 & TAG_BASE) != TAG_BASE || self.0 == TAG_BASE
    }
    #[inline(always)]
    pub fn is_int(&self) -> bool {
        (self.0 & 0xffff000000000000) == 0xfff1000000000000
    }
    #[inline(always)]
    pub fn is_bool(&self) -> bool {
        !self.is_f64() && self.get_tag() == TAG_BOOL
    }
    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }
    #[inline(always)]
    pub fn is_symbol(&self) -> bool {
        !self.is_f64() && self.get_tag() == TAG_SYMBOL
    }
    #[inline(always)]
    pub fn is_module(&self) -> bool {
        !self.is_f64() && self.get_tag() == TAG_MODULE
    }
    /// True for anything that lives on the heap (plain objects and modules).
    #[inline(always)]
    pub fn is_heap(&self) -> bool {
        !self.is_f64() && matches!(self.get_tag(), TAG_OBJECT | TAG_MODULE)
    }

    /// Ruby truthiness: everything except nil and false.
    #[inline(always)]
    pub fn is_truthy(&self) -> bool {
        *self != Self::NIL && *self != Self::FALSE
    }

    #[inline(always)]
    pub fn as_f64(self) -> f64 {
        f64::from_bits(self.0)
    }

    #[inline(always)]
    pub fn as_i64(&self) -> i64 {
        let val = (self.0 & PAYLOAD_MASK) as i64;
        // Sign extend from 48 bits
        if (val & 0x0000800000000000) != 0 {
            val | -0x0001000000000000
        } else {
            val
        }
    }

    #[inline(always)]
    pub fn as_bool(&self) -> bool {
        (self.0 & 1) != 0
    }

    #[inline(always)]
    pub fn as_obj_id(&self) -> ObjectId {
        ObjectId((self.0 & PAYLOAD_MASK) as usize)
    }

    #[inline(always)]
    pub fn as_symbol(&self) -> Symbol {
        Symbol::from_index((self.0 & PAYLOAD_MASK) as usize)
    }

    pub fn get_tag(&self) -> u64 {
        if self.is_f64() {
            0
        } else {
            (self.0 & TAG_MASK) >> 48
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_f64() {
            return write!(f, "Float({})", self.as_f64());
        }
        match self.get_tag() {
            TAG_INT => write!(f, "Int({})", self.as_i64()),
            TAG_BOOL => write!(f, "Bool({})", self.as_bool()),
            TAG_NIL => write!(f, "Nil"),
            TAG_OBJECT => write!(f, "Object(id={:?})", self.as_obj_id()),
            TAG_MODULE => write!(f, "Module(id={:?})", self.as_obj_id()),
            TAG_SYMBOL => write!(f, "{:?}", self.as_symbol()),
            tag => write!(f, "Unknown(tag={})", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints_sign_extend() {
        for i in [0, 1, -1, INT_MAX, INT_MIN, 42, -42] {
            let v = Value::from_i64(i);
            assert!(v.is_int());
            assert_eq!(v.as_i64(), i);
        }
        assert!(!Value::fits_int(INT_MAX + 1));
    }

    #[test]
    fn immediates_are_distinct() {
        assert_ne!(Value::NIL, Value::FALSE);
        assert!(!Value::NIL.is_truthy());
        assert!(!Value::FALSE.is_truthy());
        assert!(Value::from_i64(0).is_truthy());
        assert!(Value::from_f64(f64::NAN).is_f64());
        let neg_inf = Value::from_f64(f64::NEG_INFINITY);
        assert!(neg_inf.is_f64() && !neg_inf.is_heap());
        assert_eq!(neg_inf.as_f64(), f64::NEG_INFINITY);
        let obj = Value::object(ObjectId(7));
        let module = Value::module(ObjectId(7));
        assert_ne!(obj, module);
        assert!(obj.is_heap() && module.is_heap());
        assert_eq!(module.as_obj_id(), ObjectId(7));
    }
}
