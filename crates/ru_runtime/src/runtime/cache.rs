//! Single-entry inline caches.
//!
//! A call site owns one cache and hands it to the `*_cached` accessors on
//! `Runtime`. A hit skips the shape walk or dictionary lookup; a miss falls
//! back to the slow path and refills the entry.

use ru_core::MapId;

use crate::core::{AttrSlot, Binding, VersionTag};

/// Remembers where one attribute lives for one map.
#[derive(Clone, Copy, Debug, Default)]
pub struct AttrCache {
    entry: Option<(MapId, AttrSlot)>,
}

impl AttrCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn lookup(&self, map: MapId) -> Option<AttrSlot> {
        match self.entry {
            Some((cached, slot)) if cached == map => Some(slot),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn fill(&mut self, map: MapId, slot: AttrSlot) {
        self.entry = Some((map, slot));
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn is_filled(&self) -> bool {
        self.entry.is_some()
    }
}

/// Remembers the binding a global resolved to under one dictionary version.
/// A cached miss is kept too, so repeated reads of an unset global stay cheap.
#[derive(Clone, Debug, Default)]
pub struct GlobalCache {
    entry: Option<(VersionTag, Option<Binding>)>,
}

impl GlobalCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn lookup(&self, version: VersionTag) -> Option<&Option<Binding>> {
        match &self.entry {
            Some((cached, binding)) if *cached == version => Some(binding),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn fill(&mut self, version: VersionTag, binding: Option<Binding>) {
        self.entry = Some((version, binding));
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn is_filled(&self) -> bool {
        self.entry.is_some()
    }
}
